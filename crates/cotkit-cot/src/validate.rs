//! Validation for parsed CoT events
//!
//! The parser only enforces what it needs to build an event. These checks are
//! for consumers that want to refuse implausible reports before routing them.

use crate::event::{Event, Point};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid circular error: {0} (must be positive)")]
    InvalidCircularError(f64),

    #[error("Invalid linear error: {0} (must be positive)")]
    InvalidLinearError(f64),

    #[error("Invalid timestamp order: stale ({0}) is before start ({1})")]
    InvalidTimestampOrder(String, String),

    #[error("Invalid CoT type format: {0:?}")]
    InvalidCotType(String),

    #[error("Empty UID")]
    EmptyUid,
}

/// Validates a CoT Event
pub fn validate_event(event: &Event) -> Result<(), ValidationError> {
    if event.uid.is_empty() {
        return Err(ValidationError::EmptyUid);
    }

    // Dash-separated atoms, e.g. "a-f-G" or "b-m-p-s-p-i"
    if event.event_type.split('-').any(str::is_empty) {
        return Err(ValidationError::InvalidCotType(event.event_type.clone()));
    }

    if event.stale < event.start {
        return Err(ValidationError::InvalidTimestampOrder(
            event.stale.to_rfc3339(),
            event.start.to_rfc3339(),
        ));
    }

    validate_point(&event.point)
}

/// Validates a Point. Unknown error figures are accepted.
pub fn validate_point(point: &Point) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(ValidationError::InvalidLatitude(point.lat));
    }

    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(ValidationError::InvalidLongitude(point.lon));
    }

    if point.ce < 0.0 {
        return Err(ValidationError::InvalidCircularError(point.ce));
    }

    if point.le < 0.0 {
        return Err(ValidationError::InvalidLinearError(point.le));
    }

    Ok(())
}
