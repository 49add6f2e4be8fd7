//! Test client over an in-memory app.

use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use serde_json::Value;
use trellis_pipeline::App;

/// A client dispatching requests against an [`App`] in memory.
///
/// # Example
///
/// ```ignore
/// let mut app = App::new();
/// server.add_controllers(&mut app, controllers)?;
///
/// let client = TestClient::new(app);
/// let response = client.get("/api").send().await;
/// assert_eq!(response.status_code(), 200);
/// ```
#[must_use]
pub struct TestClient {
    app: App,
}

impl TestClient {
    /// Creates a client over a fully registered app.
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Starts a GET request.
    pub fn get(&self, uri: &str) -> TestRequestBuilder<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: &str) -> TestRequestBuilder<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: &str) -> TestRequestBuilder<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: &str) -> TestRequestBuilder<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: &str) -> TestRequestBuilder<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with an arbitrary method.
    pub fn request(&self, method: Method, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder {
            app: &self.app,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }
}

/// Builder for one in-memory request.
#[must_use]
pub struct TestRequestBuilder<'a> {
    app: &'a App,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TestRequestBuilder<'_> {
    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a bearer `Authorization` header.
    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {token}"))
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: &Value) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).unwrap_or_default());
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self
    }

    /// Dispatches the request and collects the response.
    pub async fn send(self) -> TestResponse {
        let mut builder = http::Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder
            .body(self.body)
            .unwrap_or_else(|_| http::Request::new(Bytes::new()));

        TestResponse::from_response(self.app.dispatch(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unrouted_request_is_404() {
        let client = TestClient::new(App::new());
        let response = client.get("/missing").send().await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json()["message"], "Cannot GET /missing");
    }

    #[tokio::test]
    async fn test_json_body_round_trip() {
        let client = TestClient::new(App::new());
        // Even a 404 path exercises body parsing; malformed bodies are 400.
        let response = client
            .post("/missing")
            .json(&serde_json::json!({"a": 1}))
            .send()
            .await;
        assert_eq!(response.status_code(), 404);
    }
}
