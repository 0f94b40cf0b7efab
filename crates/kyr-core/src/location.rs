//! Location boundary.
//!
//! Positioning and reverse geocoding are external collaborators, so both sit
//! behind traits. [`DemoGeocoder`] keeps the demo behaviour of resolving every
//! position to San Francisco, California.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::states;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

pub trait PositionSource {
    fn current_position(&self) -> Result<Coordinates, LocationError>;
}

pub trait Geocoder {
    fn locate(&self, coordinates: Coordinates) -> Result<LocationData, LocationError>;
}

/// A position supplied up front, e.g. by a client that already asked the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coordinates>);

impl PositionSource for FixedPosition {
    fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0
            .ok_or_else(|| LocationError::Unavailable("no position supplied".into()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoGeocoder;

impl Geocoder for DemoGeocoder {
    fn locate(&self, coordinates: Coordinates) -> Result<LocationData, LocationError> {
        Ok(LocationData {
            state: "CA".to_string(),
            city: Some("San Francisco".to_string()),
            coordinates: Some(coordinates),
        })
    }
}

/// Detect the user's state. Returns `None` on any failure so callers can ask
/// for a manual selection instead. Postal codes are expanded to full names.
pub fn detect_location(source: &dyn PositionSource, geocoder: &dyn Geocoder) -> Option<LocationData> {
    let located = source
        .current_position()
        .and_then(|coords| geocoder.locate(coords));
    match located {
        Ok(mut data) => {
            if let Some(name) = states::state_name_for_code(&data.state) {
                data.state = name.to_string();
            }
            tracing::info!(state = %data.state, "location detected");
            Some(data)
        }
        Err(e) => {
            tracing::warn!("location detection failed: {e}");
            None
        }
    }
}
