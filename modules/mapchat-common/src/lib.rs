pub mod types;
pub mod config;
pub mod error;

pub use types::*;
pub use config::{Config, GeocoderConfig, ViewportSettings};
pub use error::MapChatError;
