//! # swaggerkit
//!
//! Configuration-driven OpenAPI documentation for hyper and tower services.
//!
//! A `SwaggerOption` settings section describes the published documents,
//! the authentication schemes and a few feature toggles. swaggerkit turns it
//! into generator options, generates one OpenAPI document per configured
//! version and serves them, together with a Swagger UI page, from a tower
//! layer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use swaggerkit::prelude::*;
//!
//! #[derive(Serialize, Schema)]
//! struct Order {
//!     id: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     load_dotenv();
//!     let settings = Settings::from_file("appsettings.json")?;
//!
//!     SwaggerKit::from_settings(&settings)?
//!         .describe(
//!             ApiDescription::get("/orders/{order_id}")
//!                 .controller("OrderController")
//!                 .action("get_order")
//!                 .parameter(ApiParameter::path("order_id"))
//!                 .returns::<Order>(200, "The order"),
//!         )
//!         .run("127.0.0.1:8080")
//!         .await
//! }
//! ```
//!
//! ## Extension points
//!
//! - [`DocumentFilter`] / [`OperationFilter`]: add them to a
//!   [`FilterRegistry`], or mark the type with `#[document_filter]` /
//!   `#[operation_filter]` to have it discovered at startup
//! - `<exe-stem>.xml` next to the executable: XML documentation comments
//!   merged into operations, tags and schemas

// Re-export core functionality
pub use swaggerkit_core::*;

// Re-export the document generator
pub use swaggerkit_openapi::*;

// Re-export macros
pub use swaggerkit_macros::{document_filter, operation_filter};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

/// Prelude module - import everything you need with `use swaggerkit::prelude::*`
pub mod prelude {
    // Configuration
    pub use swaggerkit_core::{
        load_dotenv, load_dotenv_from, AuthOption, ContactOption, DocOption, FeatureOption,
        Settings, SwaggerOption,
    };

    // Setup and middleware
    pub use swaggerkit_core::{
        add_swagger, init_tracing, use_swagger_ui, ApiError, HealthCheckBuilder, HealthStatus,
        Result, Server, SwaggerError, SwaggerKit, SwaggerLayer, SwaggerProvider,
    };

    // Document generation
    pub use swaggerkit_openapi::{
        ApiDescription, ApiInfo, ApiParameter, DocumentFilter, DocumentFilterContext,
        FilterRegistry, OpenApiSpec, Operation, OperationFilter, OperationFilterContext, Schema,
        SwaggerGenOptions, SwaggerGenerator, SwaggerUiOptions,
    };

    pub use swaggerkit_macros::{document_filter, operation_filter};

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use tower::Layer;
    pub use tracing::{debug, error, info, trace, warn};
}
