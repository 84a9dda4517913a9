//! # swaggerkit core
//!
//! Configuration binding, generator and UI setup, and the tower middleware
//! serving the generated documents.
//!
//! This crate is not meant to be used directly. Use `swaggerkit` instead.

mod app;
pub mod config;
mod error;
pub mod health;
pub mod middleware;
pub mod options;
mod provider;
mod response;
mod server;
mod setup;

// Public API
pub use app::{init_tracing, SwaggerKit};
pub use config::{apply_env_overrides, load_dotenv, load_dotenv_from, Settings};
pub use error::{ApiError, ConfigError, Result, SwaggerError};
pub use health::{HealthCheck, HealthCheckBuilder, HealthCheckResult, HealthStatus};
pub use middleware::{SwaggerLayer, SwaggerService};
pub use options::{AuthOption, ContactOption, DocOption, FeatureOption, SwaggerOption};
pub use provider::SwaggerProvider;
pub use response::{Html, IntoResponse, Json, RawJson, Response};
pub use server::{NotFound, Server};
pub use setup::{add_swagger, document_url, use_swagger_ui, BEARER_SCHEME, OAUTH2_SCHEME};
