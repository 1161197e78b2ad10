//! Traced HTTP client that injects trace context into outgoing requests.
//!
//! Wraps `reqwest::Client`; every request runs inside an `outgoing_http` span
//! carrying method, URL (without query) and the response status.

use crate::http::simple_otel;
use std::time::Duration;
use tracing::{field::Empty, Instrument, Level};

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client with a per-request timeout covering connect + response.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(inner))
    }

    /// Execute a built request inside an `outgoing_http` span, injecting a
    /// `traceparent` header.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let mut url = req.url().clone();
        url.set_query(None);

        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.url = %url,
            http.status_code = Empty,
            error = Empty,
            otel.kind = "client",
        );

        simple_otel::inject_trace_context(req.headers_mut(), &span);

        let inner = self.inner.clone();
        async move {
            let response = inner.execute(req).await.inspect_err(|_| {
                tracing::Span::current().record("error", true);
            })?;
            let status = response.status();
            let span = tracing::Span::current();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }
            Ok(response)
        }
        .instrument(span)
        .await
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    /// Request builder on the underlying client; finish with [`TracedClient::execute`].
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn injects_traceparent_header() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/ping").header_exists("traceparent");
            then.status(200).body("ok");
        });

        let client = TracedClient::from(reqwest::Client::new());
        let resp = client.get(&server.url("/ping")).await.unwrap();

        assert!(resp.status().is_success());
        m.assert();
    }

    #[tokio::test]
    async fn request_builder_headers_survive_execute() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/userinfo")
                .header("authorization", "Bearer abc")
                .header_exists("traceparent");
            then.status(200);
        });

        let client = TracedClient::default();
        let req = client
            .request(reqwest::Method::GET, &server.url("/userinfo"))
            .header(reqwest::header::AUTHORIZATION, "Bearer abc")
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        m.assert();
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fail");
            then.status(503);
        });

        let client = TracedClient::with_timeout(Duration::from_secs(2)).unwrap();
        let req = client
            .request(reqwest::Method::POST, &server.url("/fail"))
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();
        assert_eq!(resp.status().as_u16(), 503);
    }

    #[tokio::test]
    async fn transport_errors_surface_as_reqwest_errors() {
        let client = TracedClient::with_timeout(Duration::from_millis(500)).unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let result = client.get("http://127.0.0.1:9/unreachable").await;
        assert!(result.is_err());
    }
}
