//! Map camera seam and per-session view state

use crate::core::error::Result;
use crate::core::geo::{Coordinate, EdgePadding, Region, RegionDelta};
use std::time::Duration;

/// Camera control exposed by the map provider.
///
/// Calls start an animation and return immediately; the caller is
/// responsible for holding the camera lock until it settles.
pub trait MapCamera {
    fn animate_to_region(&mut self, region: Region, duration: Duration) -> Result<()>;

    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        padding: EdgePadding,
        animated: bool,
    ) -> Result<()>;
}

/// Camera state remembered for the lifetime of one map screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Last region reported by the map or targeted by a move
    pub current_region: Option<Region>,
    /// Filter signature the camera currently frames
    pub last_signature: Option<String>,
}

impl ViewState {
    /// Zoom extents used to recenter without changing zoom.
    pub fn current_delta(&self) -> Option<RegionDelta> {
        self.current_region.map(|r| r.delta())
    }
}
