//! Campground entry data structures and record validation
//!
//! Source records come from a hand-curated JSON dataset and are not uniform:
//! older records use snake_case keys, a single `trail` object instead of a
//! `trails` array, a contributor given as a plain string, or hookup codes
//! (`F`/`P`) instead of words. [`CampgroundEntry::from_record`] validates a raw
//! record once at load time so the rest of the crate works with a typed model.
//!
//! # Displayability
//!
//! An entry whose `campground` payload is missing or has no name is kept in
//! the dataset (so "all" counts reconcile) but is never listed, searched or
//! shown as a marker. See [`CampgroundEntry::is_displayable`].
//!
//! # Example
//!
//! ```
//! use rvtrails::core::campground::{Campground, CampgroundEntry, HookupType};
//!
//! let entry = CampgroundEntry::new(
//!     "Tucson",
//!     "AZ",
//!     HookupType::Full,
//!     Some(Campground::named("Catalina State Park")),
//! );
//! assert_eq!(entry.id(), "tucson-az-catalina-state-park");
//! assert!(entry.is_displayable());
//! ```

use crate::core::geo::Coordinate;
use crate::core::ids::generate_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Utility connection category at a campground site
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum HookupType {
    /// Water, electric and sewer at the site
    #[strum(serialize = "full")]
    Full,
    /// Electric and/or water only
    #[strum(serialize = "partial")]
    Partial,
}

impl HookupType {
    /// Parses a stored hookup value: `full`/`partial` or the single-letter codes
    /// `F`/`P` used in the printed guide. Case-insensitive.
    pub fn parse_code(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "f" => Some(Self::Full),
            "partial" | "p" => Some(Self::Partial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Campground {
    pub name: String,
    /// Ownership/operator category (state park, county park, private, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// HTML fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Campground {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Trail {
    pub name: String,
    /// HTML fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Title of the contributor's own blog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_link: Option<String>,
}

/// Reasons a raw record is dropped entirely at load time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),

    #[error("unrecognized hookup type '{0}'")]
    InvalidHookupType(String),
}

/// One physical location in the directory
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampgroundEntry {
    pub city: String,
    pub state: String,
    pub hookup_type: HookupType,
    pub campground: Option<Campground>,
    pub trails: Vec<Trail>,
    /// Absent when the source had no usable latitude/longitude pair
    #[serde(flatten)]
    pub coordinate: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<Contributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_post_link: Option<String>,
    /// Driving directions to the campground
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directions: Option<String>,
    /// Anything else the guide notes about the stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    /// Geocoder place ID the coordinate was resolved from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,

    // Cached fields for search performance
    /// Cached stable ID, see [`crate::core::ids::generate_id`]
    #[serde(skip)]
    id: String,
    /// Cached lowercase campground name (empty when not displayable)
    #[serde(skip)]
    name_lowercase: String,
    #[serde(skip)]
    city_lowercase: String,
    #[serde(skip)]
    state_lowercase: String,
}

impl CampgroundEntry {
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        hookup_type: HookupType,
        campground: Option<Campground>,
    ) -> Self {
        let mut entry = Self {
            city: city.into(),
            state: state.into(),
            hookup_type,
            campground,
            trails: Vec::new(),
            coordinate: None,
            contributor: None,
            blog_post: None,
            blog_post_link: None,
            directions: None,
            other: None,
            place_id: None,
            id: String::new(),
            name_lowercase: String::new(),
            city_lowercase: String::new(),
            state_lowercase: String::new(),
        };
        entry.rebuild_caches();
        entry
    }

    pub fn with_coordinate(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinate = Coordinate::new(latitude, longitude);
        self
    }

    pub fn with_trail(mut self, trail: Trail) -> Self {
        self.trails.push(trail);
        self
    }

    /// Rebuilds the cached ID and lowercase search fields.
    /// Must be called after any field modification.
    pub fn rebuild_caches(&mut self) {
        self.id = generate_id(&self.city, &self.state, self.name());
        self.name_lowercase = self.name().map(str::to_lowercase).unwrap_or_default();
        self.city_lowercase = self.city.to_lowercase();
        self.state_lowercase = self.state.to_lowercase();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.campground.as_ref().map(|c| c.name.as_str())
    }

    /// Entries without a campground payload are never listed, searched or mapped.
    pub fn is_displayable(&self) -> bool {
        self.campground.is_some()
    }

    /// Displayable and has a valid coordinate.
    pub fn is_mappable(&self) -> bool {
        self.is_displayable() && self.coordinate.is_some()
    }

    /// Case-insensitive substring match on name, city or state.
    /// `needle` must already be lower-case.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name_lowercase.contains(needle)
            || self.city_lowercase.contains(needle)
            || self.state_lowercase.contains(needle)
    }

    /// Validates one raw dataset record.
    ///
    /// City, state and a recognizable hookup value are required; a missing
    /// hookup value defaults to full hookups. Everything else is optional and
    /// dropped quietly when malformed: a nameless campground becomes `None`, a
    /// non-numeric or out-of-range coordinate becomes `None`.
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

        let city = non_empty_str(obj, &["city"]).ok_or(RecordError::MissingField("city"))?;
        let state = non_empty_str(obj, &["state"]).ok_or(RecordError::MissingField("state"))?;

        let hookup_type = match non_empty_str(obj, &["hookupType", "hookup_type", "hookup_code"]) {
            Some(raw) => HookupType::parse_code(raw)
                .ok_or_else(|| RecordError::InvalidHookupType(raw.to_string()))?,
            None => HookupType::Full,
        };

        let mut campground = obj.get("campground").and_then(parse_campground);
        if let Some(cg) = campground.as_mut()
            && cg.notes.is_none()
        {
            cg.notes = non_empty_str(obj, &["cgNotes", "cg_notes"]).map(str::to_string);
        }

        let mut entry = Self::new(city, state, hookup_type, campground);
        entry.trails = parse_trails(obj);
        entry.coordinate = match (
            obj.get("latitude").and_then(parse_number),
            obj.get("longitude").and_then(parse_number),
        ) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
            _ => None,
        };
        entry.contributor = parse_contributor(obj);
        entry.blog_post = optional_string(obj, &["blogPost", "blog_post"]);
        entry.blog_post_link = optional_string(obj, &["blogPostLink", "blog_post_link"]);
        entry.directions = optional_string(obj, &["directions"]);
        entry.other = optional_string(obj, &["other"]);
        entry.place_id = optional_string(obj, &["placeId", "place_id"]);
        Ok(entry)
    }
}

/// First non-blank string among `keys`, trimmed.
fn non_empty_str<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn optional_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    non_empty_str(obj, keys).map(str::to_string)
}

/// Accepts JSON numbers and numeric strings.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_campground(value: &Value) -> Option<Campground> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(Campground::named(name.trim())),
        Value::Object(obj) => Some(Campground {
            name: non_empty_str(obj, &["name"])?.to_string(),
            kind: optional_string(obj, &["type", "kind"]),
            info: optional_string(obj, &["info"]),
            notes: optional_string(obj, &["notes"]),
            link: optional_string(obj, &["link"]),
        }),
        _ => None,
    }
}

fn parse_trail(value: &Value) -> Option<Trail> {
    let obj = value.as_object()?;
    Some(Trail {
        name: non_empty_str(obj, &["name"])?.to_string(),
        description: optional_string(obj, &["description"]),
        distance: optional_string(obj, &["distance"]),
        surface: optional_string(obj, &["surface"]),
        link: optional_string(obj, &["link"]),
    })
}

/// `trails` array wins over the legacy single `trail` object. Record-level
/// trail notes belong to the first trail.
fn parse_trails(obj: &Map<String, Value>) -> Vec<Trail> {
    let mut trails: Vec<Trail> = match obj.get("trails") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_trail).collect(),
        _ => obj.get("trail").and_then(parse_trail).into_iter().collect(),
    };
    if let (Some(first), Some(notes)) = (
        trails.first_mut(),
        optional_string(obj, &["trailNotes", "trail_notes"]),
    ) {
        first.description = Some(match first.description.take() {
            Some(description) if !description.contains(&notes) => {
                format!("{description}\n\n{notes}")
            }
            Some(description) => description,
            None => notes,
        });
    }
    trails
}

/// Contributor blog fields may sit on the contributor object or at record level.
fn parse_contributor(obj: &Map<String, Value>) -> Option<Contributor> {
    let mut contributor = match obj.get("contributor")? {
        Value::String(name) if !name.trim().is_empty() => Contributor {
            name: name.trim().to_string(),
            ..Contributor::default()
        },
        Value::Object(c) => Contributor {
            name: non_empty_str(c, &["name"])?.to_string(),
            location: optional_string(c, &["location"]),
            blog: optional_string(c, &["blog"]),
            blog_link: optional_string(c, &["blogLink", "blog_link"]),
        },
        _ => return None,
    };
    if contributor.blog.is_none() {
        contributor.blog = optional_string(obj, &["contributorBlog", "contributor_blog"]);
    }
    if contributor.blog_link.is_none() {
        contributor.blog_link =
            optional_string(obj, &["contributorBlogLink", "contributor_blog_link"]);
    }
    Some(contributor)
}
