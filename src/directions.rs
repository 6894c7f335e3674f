//! Links that hand a campground off to an external map app
//!
//! Every link comes as a pair: a native URI scheme to try first and a web URL
//! that always works. The web platform and app/platform combinations with no
//! native app (Apple Maps on Android) only get the web URL.

use crate::core::campground::CampgroundEntry;
use crate::core::geo::Coordinate;
use crate::prefs::MapApp;
use serde::Serialize;
use std::fmt::Write;
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    #[default]
    Ios,
    Android,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DirectionsAction {
    /// Turn-by-turn to the coordinate
    Directions,
    /// Search the app for the place by name
    Search,
}

/// Where to send the user
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsTarget {
    /// Human-readable "name, city, state"
    pub label: String,
    pub coordinate: Option<Coordinate>,
}

impl DirectionsTarget {
    pub fn from_entry(entry: &CampgroundEntry) -> Self {
        let label = match entry.name() {
            Some(name) if !name.is_empty() => format!("{name}, {}, {}", entry.city, entry.state),
            _ => format!("{}, {}", entry.city, entry.state),
        };
        Self {
            label,
            coordinate: entry.coordinate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapLinks {
    /// App URI scheme, if the app can exist on this platform
    pub native: Option<String>,
    /// Fallback that opens in a browser
    pub web: String,
}

/// Percent-encodes `input` for use in a query value.
///
/// Keeps RFC 3986 unreserved characters and encodes every other byte of the
/// UTF-8 representation.
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            // Writing to a String cannot fail
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

fn lat_lng(c: Coordinate) -> String {
    format!("{},{}", c.latitude, c.longitude)
}

/// Builds the links for `target`.
///
/// A directions request for a target without a coordinate falls back to a
/// search by label.
pub fn build_urls(
    target: &DirectionsTarget,
    app: MapApp,
    platform: Platform,
    action: DirectionsAction,
) -> MapLinks {
    let destination = match action {
        DirectionsAction::Directions => target.coordinate,
        DirectionsAction::Search => None,
    };
    let query = percent_encode(&target.label);

    let (native, web) = match (app, destination) {
        (MapApp::Apple, Some(c)) => (
            format!("maps://?daddr={}", lat_lng(c)),
            format!("https://maps.apple.com/?daddr={}", lat_lng(c)),
        ),
        (MapApp::Apple, None) => (
            format!("maps://?q={query}"),
            format!("https://maps.apple.com/?q={query}"),
        ),
        (MapApp::Google, Some(c)) => (
            match platform {
                Platform::Android => format!("google.navigation:q={}", lat_lng(c)),
                _ => format!("comgooglemaps://?daddr={}&directionsmode=driving", lat_lng(c)),
            },
            format!(
                "https://www.google.com/maps/dir/?api=1&destination={}",
                lat_lng(c)
            ),
        ),
        (MapApp::Google, None) => (
            match platform {
                Platform::Android => format!("geo:0,0?q={query}"),
                _ => format!("comgooglemaps://?q={query}"),
            },
            format!("https://www.google.com/maps/search/?api=1&query={query}"),
        ),
        (MapApp::Waze, Some(c)) => (
            format!("waze://?ll={}&navigate=yes", lat_lng(c)),
            format!("https://waze.com/ul?ll={}&navigate=yes", lat_lng(c)),
        ),
        (MapApp::Waze, None) => (
            format!("waze://?q={query}"),
            format!("https://waze.com/ul?q={query}"),
        ),
    };

    let has_native = match (platform, app) {
        (Platform::Web, _) | (Platform::Android, MapApp::Apple) => false,
        _ => true,
    };

    MapLinks {
        native: has_native.then_some(native),
        web,
    }
}
