//! Coordinates, map regions and bounding boxes
//!
//! Regions follow the map-provider convention: a center point plus the
//! latitude/longitude span (delta) visible on screen.

use serde::{Deserialize, Serialize};

/// Smallest span the camera is allowed to zoom to (roughly street level)
pub const MIN_DELTA: f64 = 0.002;

/// Largest span the camera is allowed to zoom out to
pub const MAX_DELTA: f64 = 120.0;

/// A validated WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// Visible span of the map, independent of where it is centered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionDelta {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl RegionDelta {
    pub fn uniform(delta: f64) -> Self {
        Self {
            latitude_delta: delta,
            longitude_delta: delta,
        }
    }

    /// Scales both spans, clamped to [`MIN_DELTA`]..=[`MAX_DELTA`].
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            latitude_delta: (self.latitude_delta * factor).clamp(MIN_DELTA, MAX_DELTA),
            longitude_delta: (self.longitude_delta * factor).clamp(MIN_DELTA, MAX_DELTA),
        }
    }
}

/// Camera target: center plus visible span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn centered(center: Coordinate, delta: RegionDelta) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            latitude_delta: delta.latitude_delta,
            longitude_delta: delta.longitude_delta,
        }
    }

    pub fn delta(&self) -> RegionDelta {
        RegionDelta {
            latitude_delta: self.latitude_delta,
            longitude_delta: self.longitude_delta,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Same center, spans scaled by `factor` (< 1.0 zooms in).
    pub fn zoomed(&self, factor: f64) -> Self {
        Self::centered(self.center(), self.delta().scaled(factor))
    }
}

/// Screen-space padding applied when fitting coordinates, in points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for EdgePadding {
    /// Bottom padding clears the search bar and the collapsed bottom sheet.
    fn default() -> Self {
        Self {
            top: 80,
            right: 50,
            bottom: 300,
            left: 50,
        }
    }
}

/// Axis-aligned bounds over a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Returns `None` for an empty input.
    pub fn from_coordinates<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        coordinates.into_iter().fold(None, |bounds, c| {
            Some(match bounds {
                None => Self {
                    min_latitude: c.latitude,
                    max_latitude: c.latitude,
                    min_longitude: c.longitude,
                    max_longitude: c.longitude,
                },
                Some(b) => Self {
                    min_latitude: b.min_latitude.min(c.latitude),
                    max_latitude: b.max_latitude.max(c.latitude),
                    min_longitude: b.min_longitude.min(c.longitude),
                    max_longitude: b.max_longitude.max(c.longitude),
                },
            })
        })
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: (self.min_latitude + self.max_latitude) / 2.0,
            longitude: (self.min_longitude + self.max_longitude) / 2.0,
        }
    }

    /// Region covering the box, with spans grown by `margin` (1.2 = 20% larger).
    pub fn to_region(&self, margin: f64) -> Region {
        let lat_span = (self.max_latitude - self.min_latitude) * margin;
        let lng_span = (self.max_longitude - self.min_longitude) * margin;
        Region::centered(
            self.center(),
            RegionDelta {
                latitude_delta: lat_span.clamp(MIN_DELTA, MAX_DELTA),
                longitude_delta: lng_span.clamp(MIN_DELTA, MAX_DELTA),
            },
        )
    }
}
