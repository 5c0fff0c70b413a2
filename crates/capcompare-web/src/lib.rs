//! HTTP surface for the capcompare dashboard backend.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
