use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MapChatError;
use crate::types::{Coordinates, MapStyle, MapViewState};

/// Thresholds and bounds the viewport reconciler enforces.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Center movement (degrees, either axis) that must be exceeded to count as a change.
    pub center_epsilon: f64,
    /// Zoom delta that must be reached to count as a change.
    pub zoom_epsilon: f64,
    /// Substitute `Coordinates::fallback_label` when a name lookup fails.
    pub fallback_names: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 3.0,
            max_zoom: 18.0,
            center_epsilon: 0.001,
            zoom_epsilon: 0.1,
            fallback_names: true,
        }
    }
}

impl ViewportSettings {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Reverse-geocoding endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "mapchat/1.0".to_string(),
            accept_language: "en".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every value has a default; only malformed values are errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub initial_center: Coordinates,
    pub initial_zoom: f64,
    pub initial_style: MapStyle,
    pub viewport: ViewportSettings,
    pub geocoder: GeocoderConfig,
    /// Delay between activating a rendered link and invoking navigation.
    pub link_activation_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // New York City
            initial_center: Coordinates::new(40.7128, -74.0060),
            initial_zoom: 13.0,
            initial_style: MapStyle::Standard,
            viewport: ViewportSettings::default(),
            geocoder: GeocoderConfig::default(),
            link_activation_delay: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, MapChatError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MapChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let viewport = ViewportSettings {
            min_zoom: parse_or(&get, "MAPCHAT_MIN_ZOOM", defaults.viewport.min_zoom)?,
            max_zoom: parse_or(&get, "MAPCHAT_MAX_ZOOM", defaults.viewport.max_zoom)?,
            center_epsilon: parse_or(&get, "MAPCHAT_CENTER_EPSILON", defaults.viewport.center_epsilon)?,
            zoom_epsilon: parse_or(&get, "MAPCHAT_ZOOM_EPSILON", defaults.viewport.zoom_epsilon)?,
            fallback_names: parse_or(&get, "MAPCHAT_FALLBACK_NAMES", defaults.viewport.fallback_names)?,
        };
        if !(viewport.min_zoom <= viewport.max_zoom) {
            return Err(MapChatError::Config(format!(
                "MAPCHAT_MIN_ZOOM ({}) must not exceed MAPCHAT_MAX_ZOOM ({})",
                viewport.min_zoom, viewport.max_zoom
            )));
        }

        let initial_center = Coordinates::new(
            parse_or(&get, "MAPCHAT_CENTER_LAT", defaults.initial_center.lat)?,
            parse_or(&get, "MAPCHAT_CENTER_LNG", defaults.initial_center.lng)?,
        );
        if !initial_center.is_finite() {
            return Err(MapChatError::Config("initial center must be finite".to_string()));
        }
        let initial_zoom = viewport.clamp_zoom(parse_or(&get, "MAPCHAT_ZOOM", defaults.initial_zoom)?);

        let geocoder = GeocoderConfig {
            base_url: get("GEOCODER_URL").unwrap_or(defaults.geocoder.base_url),
            user_agent: get("GEOCODER_USER_AGENT").unwrap_or(defaults.geocoder.user_agent),
            accept_language: get("GEOCODER_LANGUAGE").unwrap_or(defaults.geocoder.accept_language),
            timeout: Duration::from_secs(parse_or(
                &get,
                "GEOCODER_TIMEOUT_SECS",
                defaults.geocoder.timeout.as_secs(),
            )?),
        };

        Ok(Self {
            initial_center,
            initial_zoom,
            initial_style: parse_or(&get, "MAPCHAT_MAP_STYLE", defaults.initial_style)?,
            viewport,
            geocoder,
            link_activation_delay: Duration::from_millis(parse_or(
                &get,
                "LINK_ACTIVATION_DELAY_MS",
                defaults.link_activation_delay.as_millis() as u64,
            )?),
        })
    }

    /// The view the map starts with.
    pub fn initial_view(&self) -> MapViewState {
        MapViewState::new(self.initial_center, self.initial_zoom, self.initial_style)
    }

    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            lat = self.initial_center.lat,
            lng = self.initial_center.lng,
            zoom = self.initial_zoom,
            style = %self.initial_style,
            "  initial view"
        );
        tracing::info!(
            min_zoom = self.viewport.min_zoom,
            max_zoom = self.viewport.max_zoom,
            center_epsilon = self.viewport.center_epsilon,
            zoom_epsilon = self.viewport.zoom_epsilon,
            fallback_names = self.viewport.fallback_names,
            "  viewport"
        );
        tracing::info!(
            url = self.geocoder.base_url.as_str(),
            user_agent = self.geocoder.user_agent.as_str(),
            language = self.geocoder.accept_language.as_str(),
            timeout_secs = self.geocoder.timeout.as_secs(),
            "  geocoder"
        );
        tracing::info!(
            delay_ms = self.link_activation_delay.as_millis() as u64,
            "  link activation"
        );
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, MapChatError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MapChatError::Config(format!("{key} has invalid value '{raw}': {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, MapChatError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.viewport.center_epsilon, 0.001);
        assert_eq!(config.link_activation_delay, Duration::from_millis(100));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("MAPCHAT_CENTER_LAT", "51.5074"),
            ("MAPCHAT_CENTER_LNG", "-0.1278"),
            ("MAPCHAT_MAP_STYLE", "dark"),
            ("MAPCHAT_FALLBACK_NAMES", "false"),
            ("GEOCODER_URL", "http://localhost:8080"),
            ("LINK_ACTIVATION_DELAY_MS", "0"),
        ])
        .unwrap();
        assert_eq!(config.initial_center, Coordinates::new(51.5074, -0.1278));
        assert_eq!(config.initial_style, MapStyle::Dark);
        assert!(!config.viewport.fallback_names);
        assert_eq!(config.geocoder.base_url, "http://localhost:8080");
        assert_eq!(config.link_activation_delay, Duration::ZERO);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("MAPCHAT_ZOOM", "  ")]).unwrap();
        assert_eq!(config.initial_zoom, 13.0);
    }

    #[test]
    fn initial_zoom_is_clamped() {
        let config = config_from(&[("MAPCHAT_ZOOM", "25")]).unwrap();
        assert_eq!(config.initial_zoom, 18.0);
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let err = config_from(&[("MAPCHAT_CENTER_LAT", "north")]).unwrap_err();
        assert!(matches!(err, MapChatError::Config(msg) if msg.contains("MAPCHAT_CENTER_LAT")));
    }

    #[test]
    fn inverted_zoom_bounds_are_rejected() {
        let err = config_from(&[("MAPCHAT_MIN_ZOOM", "12"), ("MAPCHAT_MAX_ZOOM", "4")]).unwrap_err();
        assert!(matches!(err, MapChatError::Config(_)));
    }

    #[test]
    fn unknown_style_is_rejected() {
        assert!(config_from(&[("MAPCHAT_MAP_STYLE", "terrain")]).is_err());
    }
}
