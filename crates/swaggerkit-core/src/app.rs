//! SwaggerKit application builder

use crate::config::Settings;
use crate::error::Result;
use crate::health::{HealthCheckBuilder, HealthStatus};
use crate::middleware::SwaggerLayer;
use crate::options::SwaggerOption;
use crate::provider::SwaggerProvider;
use crate::server::{NotFound, Server};
use crate::setup::{add_swagger, use_swagger_ui};
use std::future::Future;
use swaggerkit_openapi::{ApiDescription, DocumentFilter, FilterRegistry, OperationFilter};
use tower::Layer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the default tracing subscriber unless one is already set
///
/// `RUST_LOG` wins over the built-in `info,swaggerkit=debug` filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,swaggerkit=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Wires configuration, operation descriptions and filters into a [`SwaggerLayer`]
///
/// # Example
///
/// ```rust,ignore
/// use swaggerkit::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let settings = Settings::from_file("appsettings.json")?;
///     let layer = SwaggerKit::from_settings(&settings)?
///         .describe(ApiDescription::get("/orders").controller("OrderController"))
///         .build()?;
///
///     let service = layer.layer(my_app);
///     Server::new(service).run("127.0.0.1:8080").await
/// }
/// ```
pub struct SwaggerKit {
    option: SwaggerOption,
    filters: FilterRegistry,
    descriptions: Vec<ApiDescription>,
    health: HealthCheckBuilder,
}

impl SwaggerKit {
    /// Default options, with filter discovery enabled
    pub fn new() -> Self {
        init_tracing();

        Self {
            option: SwaggerOption::default(),
            filters: FilterRegistry::discovered(),
            descriptions: Vec::new(),
            health: HealthCheckBuilder::new(true),
        }
    }

    /// Bind `SwaggerOption` from `settings`, with `SWAGGER_*` overrides
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let option = settings.swagger_option()?;
        Ok(Self::new().option(option))
    }

    pub fn option(mut self, option: SwaggerOption) -> Self {
        self.option = option;
        self
    }

    pub fn swagger_option(&self) -> &SwaggerOption {
        &self.option
    }

    /// Add one operation to document
    pub fn describe(mut self, description: ApiDescription) -> Self {
        self.descriptions.push(description);
        self
    }

    pub fn describe_all<I>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = ApiDescription>,
    {
        self.descriptions.extend(descriptions);
        self
    }

    /// Replace the filter registry, including its discovery setting
    pub fn filters(mut self, registry: FilterRegistry) -> Self {
        self.filters = registry;
        self
    }

    pub fn document_filter<F: DocumentFilter>(mut self, filter: F) -> Self {
        self.filters = self.filters.document_filter(filter);
        self
    }

    pub fn operation_filter<F: OperationFilter>(mut self, filter: F) -> Self {
        self.filters = self.filters.operation_filter(filter);
        self
    }

    /// Register a check reported by the health endpoint
    pub fn health_check<F, Fut>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HealthStatus> + Send + 'static,
    {
        self.health = self.health.add_check(name, check);
        self
    }

    pub fn health_version(mut self, version: impl Into<String>) -> Self {
        self.health = self.health.version(version);
        self
    }

    /// Generate every document and build the middleware
    ///
    /// Generation errors, such as an operation without a tag, abort here.
    pub fn build(self) -> Result<SwaggerLayer> {
        let generator = add_swagger(&self.option, self.filters);
        let provider = SwaggerProvider::build(generator, &self.descriptions)?;
        let ui = use_swagger_ui(&self.option);
        let health = self
            .option
            .features
            .health_check_endpoint
            .then(|| self.health.build());

        info!(
            documents = provider.document_names().count(),
            operations = self.descriptions.len(),
            prefix = %self.option.route_prefix,
            "Swagger middleware ready"
        );
        SwaggerLayer::new(&ui, provider, health)
    }

    /// Serve the Swagger routes alone; anything else answers 404
    pub async fn run(self, addr: &str) -> Result<()> {
        let service = self.build()?.layer(NotFound);
        Server::new(service).run(addr).await
    }
}

impl Default for SwaggerKit {
    fn default() -> Self {
        Self::new()
    }
}
