//! Swagger UI, document JSON and health routes as a tower layer

use super::log_request;
use crate::error::{ApiError, SwaggerError};
use crate::health::HealthCheck;
use crate::provider::SwaggerProvider;
use crate::response::{Html, IntoResponse, RawJson, Response};
use http::{Method, Request};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use swaggerkit_openapi::{generate_swagger_html, SwaggerGenError, SwaggerUiOptions};
use tower::{Layer, Service};
use tracing::debug;

/// Path of the health endpoint
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ui,
    Document,
    Health,
}

/// What a matched request resolves to
enum Target {
    Ui,
    Document(String),
    Health,
}

struct SwaggerState {
    routes: matchit::Router<Route>,
    ui_html: String,
    provider: SwaggerProvider,
    health: Option<HealthCheck>,
}

impl SwaggerState {
    fn resolve(&self, method: &Method, path: &str) -> Option<Target> {
        if method != Method::GET {
            return None;
        }
        let matched = self.routes.at(path).ok()?;
        Some(match matched.value {
            Route::Ui => Target::Ui,
            Route::Health => Target::Health,
            Route::Document => Target::Document(matched.params.get("document")?.to_string()),
        })
    }

    async fn respond(&self, target: Target) -> Response {
        match target {
            Target::Ui => Html(self.ui_html.clone()).into_response(),
            Target::Document(name) => self
                .provider
                .get_swagger(&name)
                .map(RawJson)
                .map_err(ApiError::from)
                .into_response(),
            Target::Health => match &self.health {
                Some(health) => health.execute().await.into_response(),
                None => ApiError::not_found("Health endpoint disabled").into_response(),
            },
        }
    }
}

/// Layer adding the Swagger routes in front of a service
///
/// Routes, relative to the request path:
///
/// - `GET /{prefix}`, `/{prefix}/`, `/{prefix}/index.html`: the Swagger UI
/// - `GET /{prefix}/{document}/swagger.json`: a generated document
/// - `GET /health`: the health report, when a [`HealthCheck`] is given
#[derive(Clone)]
pub struct SwaggerLayer {
    state: Arc<SwaggerState>,
}

impl SwaggerLayer {
    /// Build the route table and render the UI page
    ///
    /// Fails when two routes collide, for example a `health` prefix while
    /// the health endpoint is enabled.
    pub fn new(
        ui: &SwaggerUiOptions,
        provider: SwaggerProvider,
        health: Option<HealthCheck>,
    ) -> Result<Self, SwaggerError> {
        let prefix = ui.route_prefix.trim_matches('/');
        let base = if prefix.is_empty() {
            String::new()
        } else {
            format!("/{}", prefix)
        };

        let mut routes = matchit::Router::new();
        let mut ui_paths = vec![format!("{}/", base), format!("{}/index.html", base)];
        if !base.is_empty() {
            ui_paths.insert(0, base.clone());
        }
        for path in ui_paths {
            insert(&mut routes, path, Route::Ui)?;
        }
        insert(&mut routes, format!("{}/:document/swagger.json", base), Route::Document)?;
        if health.is_some() {
            insert(&mut routes, HEALTH_PATH.to_string(), Route::Health)?;
        }

        let ui_html = generate_swagger_html(ui).map_err(SwaggerGenError::from)?;

        debug!(
            prefix = %base,
            documents = ui.urls.len(),
            health = health.is_some(),
            "Swagger routes registered"
        );

        Ok(Self {
            state: Arc::new(SwaggerState {
                routes,
                ui_html,
                provider,
                health,
            }),
        })
    }
}

fn insert(routes: &mut matchit::Router<Route>, path: String, route: Route) -> Result<(), SwaggerError> {
    routes
        .insert(path.clone(), route)
        .map_err(|err| SwaggerError::route(path, err))
}

impl fmt::Debug for SwaggerLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwaggerLayer")
            .field("documents", &self.state.provider.document_names().collect::<Vec<_>>())
            .field("health", &self.state.health.is_some())
            .finish()
    }
}

impl<S> Layer<S> for SwaggerLayer {
    type Service = SwaggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SwaggerService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Service produced by [`SwaggerLayer`]
#[derive(Clone)]
pub struct SwaggerService<S> {
    inner: S,
    state: Arc<SwaggerState>,
}

impl<S, B> Service<Request<B>> for SwaggerService<S>
where
    S: Service<Request<B>, Response = Response>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let Some(target) = self.state.resolve(req.method(), req.uri().path()) else {
            return Box::pin(self.inner.call(req));
        };

        let state = self.state.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        Box::pin(async move {
            let start = Instant::now();
            let response = state.respond(target).await;
            log_request(&method, &path, response.status(), start);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthCheckBuilder, HealthStatus};
    use bytes::Bytes;
    use http::{header, StatusCode};
    use http_body_util::{BodyExt, Full};
    use std::convert::Infallible;
    use swaggerkit_openapi::{ApiDescription, ApiInfo, SwaggerGenOptions};
    use tower::{service_fn, ServiceExt};

    fn provider() -> SwaggerProvider {
        let mut options = SwaggerGenOptions::new();
        options.swagger_doc("v1", ApiInfo::new("Orders", "v1"));
        SwaggerProvider::build(
            Some(options),
            &[ApiDescription::get("/orders").controller("OrderController")],
        )
        .unwrap()
    }

    fn ui(prefix: &str) -> SwaggerUiOptions {
        let mut ui = SwaggerUiOptions::new();
        ui.route_prefix(prefix)
            .swagger_endpoint(format!("/{}/v1/swagger.json", prefix), "Orders v1");
        ui
    }

    async fn send(layer: &SwaggerLayer, request: Request<()>) -> Response {
        let inner = service_fn(|_req: Request<()>| async {
            Ok::<_, Infallible>(http::Response::new(Full::new(Bytes::from_static(b"inner"))))
        });
        layer.layer(inner).oneshot(request).await.unwrap()
    }

    async fn get(layer: &SwaggerLayer, method: Method, path: &str) -> (StatusCode, String) {
        let request = Request::builder().method(method).uri(path).body(()).unwrap();
        let response = send(layer, request).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_ui_is_served_on_all_paths() {
        let layer = SwaggerLayer::new(&ui("docs"), provider(), None).unwrap();
        for path in ["/docs", "/docs/", "/docs/index.html"] {
            let (status, body) = get(&layer, Method::GET, path).await;
            assert_eq!(status, StatusCode::OK, "{}", path);
            assert!(body.contains("/docs/v1/swagger.json"), "{}", path);
        }
    }

    #[tokio::test]
    async fn test_ui_content_type() {
        let layer = SwaggerLayer::new(&ui("docs"), provider(), None).unwrap();
        let request = Request::get("/docs").body(()).unwrap();
        let response = send(&layer, request).await;
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_document_json() {
        let layer = SwaggerLayer::new(&ui("docs"), provider(), None).unwrap();
        let (status, body) = get(&layer, Method::GET, "/docs/v1/swagger.json").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["info"]["title"], "Orders");
        assert!(json["paths"]["/orders"]["get"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_document_is_404() {
        let layer = SwaggerLayer::new(&ui("docs"), provider(), None).unwrap();
        let (status, body) = get(&layer, Method::GET, "/docs/v9/swagger.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn test_other_requests_pass_through() {
        let layer = SwaggerLayer::new(&ui("docs"), provider(), None).unwrap();
        assert_eq!(get(&layer, Method::GET, "/orders").await.1, "inner");
        assert_eq!(get(&layer, Method::POST, "/docs").await.1, "inner");
        assert_eq!(get(&layer, Method::GET, "/health").await.1, "inner");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let health = HealthCheckBuilder::new(true).build();
        let layer = SwaggerLayer::new(&ui("docs"), provider(), Some(health)).unwrap();
        let (status, body) = get(&layer, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"healthy\""));

        let failing = HealthCheckBuilder::new(false)
            .add_check("db", || async { HealthStatus::unhealthy("down") })
            .build();
        let layer = SwaggerLayer::new(&ui("docs"), provider(), Some(failing)).unwrap();
        let (status, _) = get(&layer, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_empty_prefix_serves_at_root() {
        let layer = SwaggerLayer::new(&ui(""), provider(), None).unwrap();
        assert_eq!(get(&layer, Method::GET, "/").await.0, StatusCode::OK);
        assert_eq!(get(&layer, Method::GET, "/v1/swagger.json").await.0, StatusCode::OK);
    }

    #[test]
    fn test_route_conflict_is_an_error() {
        let health = HealthCheckBuilder::default().build();
        let err = SwaggerLayer::new(&ui("health"), SwaggerProvider::default(), Some(health));
        assert!(matches!(err, Err(SwaggerError::Route { .. })));
    }
}
