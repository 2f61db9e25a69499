use async_trait::async_trait;
use mapchat_common::{Coordinates, GeocoderConfig};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ResolveError, Result};

/// Turns coordinates into a human-readable place name.
///
/// Lookups may take arbitrarily long and complete in any order; the reconciler only
/// cares about the outcome.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, at: Coordinates) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Nominatim reverse geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    pedestrian: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimReverse {
    /// `display_name` when present, otherwise the most useful address parts.
    fn place_name(self) -> Option<String> {
        if let Some(name) = self.display_name.filter(|n| !n.trim().is_empty()) {
            return Some(name);
        }

        let address = self.address?;
        let parts: Vec<String> = [
            address.road.or(address.pedestrian),
            address.city.or(address.town).or(address.village),
            address.state,
            address.country,
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Reverse geocoding against a Nominatim-compatible `/reverse` endpoint.
pub struct NominatimResolver {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    accept_language: String,
}

impl NominatimResolver {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

#[async_trait]
impl NameResolver for NominatimResolver {
    async fn resolve(&self, at: Coordinates) -> Result<String> {
        let url = format!("{}/reverse", self.base_url);
        debug!(lat = at.lat, lng = at.lng, "Reverse geocoding request");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept-Language", self.accept_language.as_str())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ResolveError::Status(resp.status().as_u16()));
        }

        let body: NominatimReverse = resp.json().await?;
        body.place_name().ok_or(ResolveError::NoResult {
            lat: at.lat,
            lng: at.lng,
        })
    }
}

// ---------------------------------------------------------------------------
// Offline
// ---------------------------------------------------------------------------

/// Names every place after its rounded coordinates. Never fails, never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateResolver;

#[async_trait]
impl NameResolver for CoordinateResolver {
    async fn resolve(&self, at: Coordinates) -> Result<String> {
        Ok(at.fallback_label())
    }
}
