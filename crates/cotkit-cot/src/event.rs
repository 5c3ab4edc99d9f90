//! CoT event and point structures

use crate::detail::DetailNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version assumed when an `<event>` carries no `version` attribute
pub const DEFAULT_VERSION: &str = "2.0";

/// CoT Event represents a parsed Cursor on Target message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// CoT type (e.g., "a-f-G" for atom-friendly-ground)
    #[serde(rename = "type")]
    pub event_type: String,
    /// CoT version (typically "2.0")
    pub version: String,
    /// Unique identifier of the entity this event describes
    pub uid: String,
    /// Event timestamp
    pub time: DateTime<Utc>,
    /// Event start time
    pub start: DateTime<Utc>,
    /// Event stale time (when the event becomes invalid)
    pub stale: DateTime<Utc>,
    /// How the event was generated (e.g., "h-e" for human-entered)
    pub how: String,
    /// Operational exercise indicator
    pub opex: Option<String>,
    /// Quality of service hints
    pub qos: Option<String>,
    /// Access control marking
    pub access: Option<String>,
    /// Classification caveat
    pub caveat: Option<String>,
    /// Releasability marking
    #[serde(rename = "releasableTo")]
    pub releasable_to: Option<String>,
    /// Geographic location and accuracy
    pub point: Point,
    /// Set once a `<point>` element has been read into `point`
    #[serde(default)]
    pub has_point: bool,
    /// Root of the `<detail>` subtree, if the message had one
    pub detail: Option<DetailNode>,
}

impl Default for Event {
    /// An event with no identity, the zero point and all timestamps set to now.
    fn default() -> Self {
        let now = Utc::now();
        Self {
            event_type: String::new(),
            version: DEFAULT_VERSION.to_string(),
            uid: String::new(),
            time: now,
            start: now,
            stale: now,
            how: String::new(),
            opex: None,
            qos: None,
            access: None,
            caveat: None,
            releasable_to: None,
            point: Point::ZERO,
            has_point: false,
            detail: None,
        }
    }
}

impl Event {
    /// Placeholder held by pooled parse contexts. Unlike [`Event::default`]
    /// it neither reads the clock nor allocates.
    pub(crate) fn blank() -> Self {
        Self {
            event_type: String::new(),
            version: String::new(),
            uid: String::new(),
            time: DateTime::<Utc>::MIN_UTC,
            start: DateTime::<Utc>::MIN_UTC,
            stale: DateTime::<Utc>::MIN_UTC,
            how: String::new(),
            opex: None,
            qos: None,
            access: None,
            caveat: None,
            releasable_to: None,
            point: Point::ZERO,
            has_point: false,
            detail: None,
        }
    }

    /// True when a `<point>` was read and its latitude and longitude are
    /// finite. The zero point of an event without one does not count.
    pub fn has_valid_point(&self) -> bool {
        self.has_point && self.point.is_valid()
    }

    /// True when the event carries an identity (`type` and `uid`) and a
    /// valid point. Events returned from a rejected parse are never valid.
    pub fn is_valid(&self) -> bool {
        !self.event_type.is_empty() && !self.uid.is_empty() && self.has_valid_point()
    }

    /// First direct child of the detail root with the given element name
    pub fn detail_child(&self, name: &str) -> Option<&DetailNode> {
        self.detail.as_ref().and_then(|d| d.first_child(name))
    }
}

/// Geographic point with accuracy metrics.
///
/// `hae`, `ce` and `le` hold [`Point::UNKNOWN`] when the producer did not
/// supply a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Height above ellipsoid in meters
    pub hae: f64,
    /// Circular error in meters
    pub ce: f64,
    /// Linear error in meters
    pub le: f64,
}

impl Point {
    /// Sentinel for an unknown altitude or error figure
    pub const UNKNOWN: f64 = 9_999_999.0;

    /// Point used by events that did not carry a `<point>`
    pub const ZERO: Point = Point {
        lat: 0.0,
        lon: 0.0,
        hae: Point::UNKNOWN,
        ce: Point::UNKNOWN,
        le: Point::UNKNOWN,
    };

    /// Create a new Point with unknown altitude and accuracy
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Point::ZERO
        }
    }

    /// Create a new Point with specified altitude and accuracy
    pub fn with_accuracy(lat: f64, lon: f64, hae: f64, ce: f64, le: f64) -> Self {
        Self {
            lat,
            lon,
            hae,
            ce,
            le,
        }
    }

    /// True when latitude and longitude are both finite
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Height above ellipsoid, if known
    pub fn altitude(&self) -> Option<f64> {
        known(self.hae)
    }

    /// Circular error, if known
    pub fn circular_error(&self) -> Option<f64> {
        known(self.ce)
    }

    /// Linear error, if known
    pub fn linear_error(&self) -> Option<f64> {
        known(self.le)
    }
}

fn known(value: f64) -> Option<f64> {
    (value != Point::UNKNOWN).then_some(value)
}
