//! SignDeck API Library
//!
//! HTTP surface over the plan, feature and quota resolvers in
//! `signdeck-billing`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError, LogFormat};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
