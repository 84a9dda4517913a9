//! HTTP server implementation

use crate::error::{ApiError, SwaggerError};
use crate::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tokio::net::TcpListener;
use tower::{Service, ServiceExt};
use tracing::{error, info};

/// Serves a tower service over HTTP/1
pub struct Server<S> {
    service: S,
}

impl<S> Server<S>
where
    S: Service<http::Request<Incoming>, Response = Response, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Bind `addr` and serve until the listener fails
    pub async fn run(self, addr: &str) -> Result<(), SwaggerError> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted on `listener`
    pub async fn serve(self, listener: TcpListener) -> Result<(), SwaggerError> {
        info!("Swagger server running on http://{}", listener.local_addr()?);

        loop {
            let (stream, _remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let service = self.service.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    service.clone().oneshot(req)
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Connection error: {}", err);
                }
            });
        }
    }
}

/// Inner service answering every request with a JSON 404
///
/// Used when the Swagger routes are served on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl<B> Service<http::Request<B>> for NotFound {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let response = ApiError::not_found(format!(
            "No route found for {} {}",
            req.method(),
            req.uri().path()
        ))
        .into_response();
        ready(Ok(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_not_found_fallback() {
        let request = http::Request::get("/missing").body(()).unwrap();
        let response = NotFound.oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Server::new(NotFound).serve(listener));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 404"));
        assert!(raw.contains("No route found for GET /nothing"));
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let result = Server::new(NotFound).run("not-an-address").await;
        assert!(matches!(result, Err(SwaggerError::Addr(_))));
    }
}
