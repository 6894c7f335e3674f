//! Choosing how to frame a filter result
//!
//! Planning is pure: it looks at the criteria and the filtered entries and
//! decides which camera move (if any) frames them. Timing and locking are the
//! fitter's job.

use crate::core::campground::CampgroundEntry;
use crate::core::filter::FilterCriteria;
use crate::core::geo::{Coordinate, Region, RegionDelta};

/// Fraction of the visible span the center is shifted south for a single
/// result, which puts the marker on the upper-third line of the map.
pub const UPPER_THIRD_OFFSET: f64 = 1.0 / 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FitKind {
    #[strum(serialize = "show-all")]
    ShowAll,
    #[strum(serialize = "single")]
    Single,
    #[strum(serialize = "bounds")]
    Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitPlan {
    /// No filter is active: frame every mappable entry in the dataset
    ShowAll { coordinates: Vec<Coordinate> },
    /// One result: fixed zoom, then open its detail sheet
    Single { id: String, region: Region },
    /// Several results: frame their bounding box
    Bounds { coordinates: Vec<Coordinate> },
}

impl FitPlan {
    pub fn kind(&self) -> FitKind {
        match self {
            FitPlan::ShowAll { .. } => FitKind::ShowAll,
            FitPlan::Single { .. } => FitKind::Single,
            FitPlan::Bounds { .. } => FitKind::Bounds,
        }
    }
}

/// A filter change handed to the fitter
#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub signature: String,
    /// `None` when there is nothing to frame
    pub plan: Option<FitPlan>,
}

impl FitRequest {
    pub fn from_results(
        criteria: &FilterCriteria<'_>,
        filtered: &[&CampgroundEntry],
        all: &[CampgroundEntry],
        single_result_delta: f64,
    ) -> Self {
        Self {
            signature: criteria.signature(),
            plan: plan_fit(criteria, filtered, all, single_result_delta),
        }
    }
}

/// Region that puts `target` in the upper third of the visible map.
pub fn single_result_region(target: Coordinate, delta: f64) -> Region {
    let mut region = Region::centered(target, RegionDelta::uniform(delta));
    region.latitude -= delta * UPPER_THIRD_OFFSET;
    region
}

/// Decides how to frame `filtered`.
///
/// Entries without coordinates are ignored. Returns `None` when a filter is
/// active but nothing it matched can be placed on the map.
pub fn plan_fit(
    criteria: &FilterCriteria<'_>,
    filtered: &[&CampgroundEntry],
    all: &[CampgroundEntry],
    single_result_delta: f64,
) -> Option<FitPlan> {
    if !criteria.is_active() {
        let coordinates: Vec<Coordinate> = all
            .iter()
            .filter(|e| e.is_displayable())
            .filter_map(|e| e.coordinate)
            .collect();
        return (!coordinates.is_empty()).then_some(FitPlan::ShowAll { coordinates });
    }

    let mappable: Vec<(&CampgroundEntry, Coordinate)> = filtered
        .iter()
        .filter_map(|e| e.coordinate.map(|c| (*e, c)))
        .collect();

    match mappable.as_slice() {
        [] => None,
        [(entry, target)] => Some(FitPlan::Single {
            id: entry.id().to_string(),
            region: single_result_region(*target, single_result_delta),
        }),
        many => Some(FitPlan::Bounds {
            coordinates: many.iter().map(|(_, c)| *c).collect(),
        }),
    }
}
