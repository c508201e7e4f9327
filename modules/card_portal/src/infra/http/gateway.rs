//! Request gateway: the only place that talks HTTP.
//!
//! Every outgoing call gets the configured base URL, JSON content type, the
//! session's bearer token when there is one, and uniform error extraction.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, field, instrument, warn, Span};
use url::Url;

use crate::config::PortalConfig;
use crate::contract::error::ApiError;

/// Supplies the bearer token for outgoing requests, if any.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// No session at all; used for anonymous gateways and tests.
pub struct NoToken;

impl TokenSource for NoToken {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// A relative API call: method, path, query, optional JSON body, header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::precondition(format!("Cannot encode request body: {e}")))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Override or add a header; wins over the gateway defaults.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A successful response body, read exactly once.
#[derive(Debug, Clone)]
pub struct Payload {
    status: StatusCode,
    json: Option<Value>,
    text: String,
}

impl Payload {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 204 and for any body that was empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = self
            .json
            .ok_or_else(|| ApiError::decode(format!("expected a JSON body (HTTP {})", self.status)))?;
        serde_json::from_value(value).map_err(|e| ApiError::decode(e.to_string()))
    }

    /// Like [`decode`](Self::decode), but an empty body is `None`.
    pub fn decode_optional<T: DeserializeOwned>(self) -> Result<Option<T>, ApiError> {
        if self.is_empty() {
            return Ok(None);
        }
        self.decode().map(Some)
    }

    /// Human-readable body: a JSON string, a JSON `message` field, or plain text.
    pub fn message(&self) -> Option<String> {
        let from_json = match &self.json {
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => message_field(v),
            None => None,
        };
        from_json
            .or_else(|| (self.json.is_none() && !self.is_empty()).then(|| self.text.trim().to_string()))
    }
}

fn message_field(v: &Value) -> Option<String> {
    v.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

pub struct RequestGateway {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl RequestGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url)
            .map_err(|e| ApiError::precondition(format!("Invalid API base URL '{base_url}': {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(cfg: &PortalConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::transport(format!("Cannot build HTTP client: {e}")))?;
        Self::new(client, &cfg.api_base_url, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", self.base_url, path);
        Url::parse(&joined)
            .map_err(|e| ApiError::precondition(format!("Invalid request URL '{joined}': {e}")))
    }

    fn headers_for(&self, req: &ApiRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.bearer_token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("stored token is not a valid header value, sending anonymously"),
            }
        }
        for (name, value) in &req.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Send a request and return the raw payload of a 2xx response.
    #[instrument(
        name = "card_portal.http.request",
        skip_all,
        fields(http.method = %req.method, http.path = %req.path, http.status_code = field::Empty)
    )]
    pub async fn send(&self, req: ApiRequest) -> Result<Payload, ApiError> {
        let url = self.url_for(&req.path)?;
        let headers = self.headers_for(&req);

        let mut builder = self
            .client
            .request(req.method.clone(), url)
            .query(&req.query)
            .headers(headers);
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "request failed before a response arrived");
            ApiError::from(e)
        })?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        // One read, one parse attempt, whatever the status.
        let text = if status == StatusCode::NO_CONTENT {
            String::new()
        } else {
            response.text().await.map_err(ApiError::from)?
        };
        let json = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        if !status.is_success() {
            let err = json
                .as_ref()
                .and_then(message_field)
                .map(|m| ApiError::status(status.as_u16(), m))
                .unwrap_or_else(|| ApiError::generic_status(status.as_u16()));
            debug!(status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }

        debug!(status = status.as_u16(), empty = text.is_empty(), "request succeeded");
        Ok(Payload { status, json, text })
    }

    /// Send and decode a JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        self.send(req).await?.decode()
    }

    /// Send and decode a JSON body if the server sent one. Mutations use this:
    /// a 204 or empty 2xx is still a success.
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
    ) -> Result<Option<T>, ApiError> {
        self.send(req).await?.decode_optional()
    }

    /// Send and ignore whatever body came back.
    pub async fn execute(&self, req: ApiRequest) -> Result<(), ApiError> {
        self.send(req).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    struct FixedToken(&'static str);

    impl TokenSource for FixedToken {
        fn bearer_token(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn gateway(server: &MockServer, tokens: Arc<dyn TokenSource>) -> RequestGateway {
        RequestGateway::new(reqwest::Client::new(), &server.url("/api"), tokens).unwrap()
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = RequestGateway::new(reqwest::Client::new(), "not a url", Arc::new(NoToken))
            .err()
            .unwrap();
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn attaches_bearer_token_and_json_content_type() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/api/auth/me")
                .header("authorization", "Bearer t0k3n")
                .header("content-type", "application/json");
            then.status(200).json_body(json!({"ok": true}));
        });

        let gw = gateway(&server, Arc::new(FixedToken("t0k3n")));
        let v: Value = gw.fetch(ApiRequest::get("/auth/me")).await.unwrap();

        m.assert();
        assert_eq!(v["ok"], true);
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let server = MockServer::start();
        let with_auth = server.mock(|when, then| {
            when.method(GET).path("/api/ping").header_exists("authorization");
            then.status(500);
        });
        let without_auth = server.mock(|when, then| {
            when.method(GET).path("/api/ping");
            then.status(200).json_body(json!({}));
        });

        let gw = gateway(&server, Arc::new(NoToken));
        gw.execute(ApiRequest::get("/ping")).await.unwrap();

        with_auth.assert_hits(0);
        without_auth.assert();
    }

    #[tokio::test]
    async fn content_type_can_be_overridden() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/raw")
                .header("content-type", "text/plain");
            then.status(200).body("done");
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let req = ApiRequest::post("/raw")
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let payload = gw.send(req).await.unwrap();

        m.assert();
        assert_eq!(payload.message().as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn no_content_returns_empty_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/card/3");
            then.status(204);
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let payload = gw.send(ApiRequest::delete("/card/3")).await.unwrap();

        assert!(payload.is_empty());
        assert!(payload.json().is_none());
    }

    #[tokio::test]
    async fn empty_success_body_does_not_fail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/api/user/1/toggleLock");
            then.status(200);
        });

        let gw = gateway(&server, Arc::new(NoToken));
        assert!(gw.execute(ApiRequest::patch("/user/1/toggleLock")).await.is_ok());
    }

    #[tokio::test]
    async fn fetch_optional_treats_no_content_as_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/api/cardBlock/5/approve");
            then.status(204);
        });
        server.mock(|when, then| {
            when.method(PATCH).path("/api/user/1/toggleLock");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(PATCH).path("/api/user/2/toggleLock");
            then.status(200).json_body(json!({"id": 2}));
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let approved: Option<Value> = gw
            .fetch_optional(ApiRequest::patch("/cardBlock/5/approve"))
            .await
            .unwrap();
        let toggled: Option<Value> = gw
            .fetch_optional(ApiRequest::patch("/user/1/toggleLock"))
            .await
            .unwrap();
        let with_body: Option<Value> = gw
            .fetch_optional(ApiRequest::patch("/user/2/toggleLock"))
            .await
            .unwrap();

        assert!(approved.is_none());
        assert!(toggled.is_none());
        assert_eq!(with_body.unwrap()["id"], 2);
    }

    #[tokio::test]
    async fn server_message_becomes_error_reason() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401)
                .json_body(json!({"message": "Invalid email or password"}));
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let err = gw.execute(ApiRequest::post("/auth/login")).await.unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn malformed_error_body_yields_generic_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/card");
            then.status(500).body("<html>oops</html>");
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let err = gw.execute(ApiRequest::get("/card")).await.unwrap_err();

        assert_eq!(err, ApiError::generic_status(500));
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[tokio::test]
    async fn error_body_without_message_yields_generic_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/user");
            then.status(403).json_body(json!({"error": "Forbidden", "message": ""}));
        });

        let gw = gateway(&server, Arc::new(NoToken));
        let err = gw.execute(ApiRequest::get("/user")).await.unwrap_err();

        assert_eq!(err.to_string(), "Request failed with status 403");
    }

    #[tokio::test]
    async fn query_pairs_are_encoded() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/cardBlock/5/approve")
                .query_param("comment", "looks ok & fine");
            then.status(200).json_body(json!({}));
        });

        let gw = gateway(&server, Arc::new(NoToken));
        gw.execute(ApiRequest::patch("/cardBlock/5/approve").query([("comment", "looks ok & fine")]))
            .await
            .unwrap();

        m.assert();
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is practically never served on test hosts.
        let gw = RequestGateway::new(reqwest::Client::new(), "http://127.0.0.1:9/api", Arc::new(NoToken))
            .unwrap();
        let err = gw.execute(ApiRequest::get("/auth/me")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[tokio::test]
    async fn success_with_wrong_shape_is_a_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/user/1");
            then.status(200).json_body(json!([1, 2, 3]));
        });

        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            id: i64,
        }

        let gw = gateway(&server, Arc::new(NoToken));
        let err = gw.fetch::<Expected>(ApiRequest::get("/user/1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
