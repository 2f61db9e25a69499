/// Result type alias for name lookups.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding service returned status {0}")]
    Status(u16),

    #[error("No place name for {lat}, {lng}")]
    NoResult { lat: f64, lng: f64 },
}
