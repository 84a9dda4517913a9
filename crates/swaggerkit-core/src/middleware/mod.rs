//! Tower middleware serving the Swagger routes
//!
//! [`SwaggerLayer`] wraps any service that answers with a [`Response`]. It
//! handles `GET` on its own routes and forwards every other request to the
//! wrapped service.
//!
//! ```rust,ignore
//! use swaggerkit_core::middleware::SwaggerLayer;
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(SwaggerLayer::new(&ui, provider, Some(health))?)
//!     .service(app);
//! ```
//!
//! [`Response`]: crate::response::Response

mod swagger_layer;

pub use swagger_layer::{SwaggerLayer, SwaggerService};

use http::{Method, StatusCode};
use std::time::Instant;
use tracing::{error, info};

/// Log request completion
pub(crate) fn log_request(method: &Method, path: &str, status: StatusCode, start: Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    }
}
