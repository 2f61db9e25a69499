use serde::{Deserialize, Serialize};

use crate::error::MapChatError;

// --- Geo Types ---

/// A point on the map in degrees.
///
/// Consumers assume `lat` in [-90, 90] and `lng` in [-180, 180]; nothing in the
/// link grammar enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }

    /// Display name used when no real place name is available.
    pub fn fallback_label(&self) -> String {
        format!("Location ({:.4}, {:.4})", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Haversine great-circle distance between two lat/lng points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// A navigable place reference extracted from (or rendered into) message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceLink {
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,
}

impl PlaceLink {
    pub fn new(name: impl Into<String>, coordinates: Coordinates, zoom: Option<u32>) -> Self {
        Self {
            name: name.into(),
            coordinates,
            zoom,
        }
    }
}

// --- Map View ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    #[default]
    Standard,
    Satellite,
    Relief,
    Dark,
}

impl MapStyle {
    pub const ALL: [MapStyle; 4] = [
        MapStyle::Standard,
        MapStyle::Satellite,
        MapStyle::Relief,
        MapStyle::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Standard => "standard",
            MapStyle::Satellite => "satellite",
            MapStyle::Relief => "relief",
            MapStyle::Dark => "dark",
        }
    }
}

impl std::fmt::Display for MapStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MapStyle {
    type Err = MapChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MapStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| MapChatError::Validation(format!("unknown map style '{s}'")))
    }
}

/// The authoritative "where is the map right now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub center: Coordinates,
    pub zoom: f64,
    pub map_style: MapStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_name: Option<String>,
}

impl MapViewState {
    pub fn new(center: Coordinates, zoom: f64, map_style: MapStyle) -> Self {
        Self {
            center,
            zoom,
            map_style,
            resolved_name: None,
        }
    }

    /// Human-readable location: the resolved name when known, else the coordinates.
    pub fn location_label(&self) -> String {
        self.resolved_name
            .clone()
            .unwrap_or_else(|| self.center.fallback_label())
    }
}
