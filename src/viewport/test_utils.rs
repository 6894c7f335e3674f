//! Shared test utilities for viewport tests
//!
//! [`RecordingCamera`] records every camera call so tests can assert on what
//! the map was asked to do. Clones share the same log.

use crate::core::error::{Error, Result};
use crate::core::geo::{Coordinate, EdgePadding, Region};
use crate::viewport::camera::MapCamera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    Animate(Region),
    Fit { count: usize, padding: EdgePadding },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCamera {
    calls: Arc<Mutex<Vec<CameraCall>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingCamera {
    pub fn calls(&self) -> Vec<CameraCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes the next camera call fail without recording it.
    pub fn fail_next(&mut self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: CameraCall) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Camera("map view detached".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl MapCamera for RecordingCamera {
    fn animate_to_region(&mut self, region: Region, _duration: Duration) -> Result<()> {
        self.record(CameraCall::Animate(region))
    }

    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        padding: EdgePadding,
        _animated: bool,
    ) -> Result<()> {
        self.record(CameraCall::Fit {
            count: coordinates.len(),
            padding,
        })
    }
}
