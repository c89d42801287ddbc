//! Delivery location parsing. Storefront clients send either a `{lat, lng}`
//! object or the text their map widget displays, e.g. `"Lat: 12.97, Lng: 77.59"`.

use serde::Deserialize;
use thiserror::Error;

use crate::types::Location;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("expected \"Lat: <x>, Lng: <y>\", got '{0}'")]
    Malformed(String),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Point(Location),
    Text(String),
}

impl LocationInput {
    /// `Ok(None)` for blank text, which clients send when no pin was dropped
    pub fn resolve(&self) -> Result<Option<Location>, LocationError> {
        match self {
            LocationInput::Point(point) => validate(*point).map(Some),
            LocationInput::Text(text) if text.trim().is_empty() => Ok(None),
            LocationInput::Text(text) => parse(text).map(Some),
        }
    }
}

pub fn parse(text: &str) -> Result<Location, LocationError> {
    let malformed = || LocationError::Malformed(text.to_string());

    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(malformed());
    }

    let mut lat = None;
    let mut lng = None;
    for part in parts {
        let (label, value) = part.split_once(':').ok_or_else(malformed)?;
        let value: f64 = value.trim().parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }

        let slot = match label.trim().to_ascii_lowercase().as_str() {
            "lat" | "latitude" => &mut lat,
            "lng" | "lon" | "long" | "longitude" => &mut lng,
            _ => return Err(malformed()),
        };
        if slot.replace(value).is_some() {
            return Err(malformed());
        }
    }

    match (lat, lng) {
        (Some(lat), Some(lng)) => validate(Location { lat, lng }),
        _ => Err(malformed()),
    }
}

fn validate(point: Location) -> Result<Location, LocationError> {
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(LocationError::LatitudeOutOfRange(point.lat));
    }
    if !(-180.0..=180.0).contains(&point.lng) {
        return Err(LocationError::LongitudeOutOfRange(point.lng));
    }
    Ok(point)
}
