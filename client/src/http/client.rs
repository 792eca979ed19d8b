use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tower::{Layer, ServiceExt, service_fn};
use tracing::{debug, info, warn};

use shared::types::client_config::ApiConfig;

use crate::http::response::{ApiResult, interpret};
use crate::http::timeout::{TimeoutError, TimeoutLayer};
use crate::session::TokenStore;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Transport codes attached to results that never reached the backend.
pub mod codes {
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const UNREACHABLE: &str = "UNREACHABLE";
    pub const CANCELLED: &str = "CANCELLED";
    pub const CONNECTION_ERROR: &str = "CONNECTION_ERROR";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

/// Per-call settings. Everything is optional; the default is a bodiless
/// `GET` with the client's default timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Bytes>,
    pub headers: HeaderMap,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
    /// Cancels the call from outside. A cancelled call still resolves to
    /// an [`ApiResult`].
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    pub fn header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client bound to one API origin.
///
/// Cheap to clone; clones share the connection pool and the token store.
/// The stored bearer token, if any, is attached to every request. The
/// client never changes session state itself: callers decide what a 401
/// means for them.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: HttpsClient,
    base_url: String,
    default_timeout: Duration,
    tokens: Arc<dyn TokenStore>,
}

enum SendError {
    Cancelled,
    TimedOut(Duration),
    Transport(hyper_util::client::legacy::Error),
}

impl ApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        let http = Client::builder(TokioExecutor::new()).build(connector);
        let base_url = config.resolved_base_url();

        info!("API client targeting {}", base_url);

        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                default_timeout: config.timeout(),
                tokens,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Absolute URL for `path` (which should start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        match RequestOptions::new(method).json(body) {
            Ok(options) => self.request(path, options).await,
            Err(e) => {
                warn!("Failed to encode request body for {}: {}", path, e);
                ApiResult::failure(0, format!("Failed to encode request: {}", e))
                    .with_code(codes::INVALID_REQUEST)
            }
        }
    }

    /// Perform one request against the API origin.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResult<T> {
        let url = self.url(path);
        let timeout = options.timeout.unwrap_or(self.inner.default_timeout);
        let method = options.method.clone();
        let cancel = options.cancel.clone();

        let req = match self.build_request(&url, options) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to build {} {}: {}", method, url, e);
                return ApiResult::failure(0, format!("Invalid request: {}", e))
                    .with_code(codes::INVALID_REQUEST);
            }
        };

        debug!("{} {} (timeout {:?})", method, path, timeout);

        // Headers and body share one deadline and one cancellation point.
        let http = self.inner.http.clone();
        let exchange = service_fn(move |req: Request<Full<Bytes>>| {
            let http = http.clone();
            async move {
                let response = http.request(req).await?;
                let status = response.status();
                let body = match response.into_body().collect().await {
                    Ok(collected) => String::from_utf8(collected.to_bytes().to_vec())
                        .map_err(|e| format!("response was not UTF-8: {}", e)),
                    Err(e) => Err(e.to_string()),
                };
                Ok::<_, hyper_util::client::legacy::Error>((status, body))
            }
        });

        let service = TimeoutLayer::new(timeout).layer(exchange);
        let call = async {
            service.oneshot(req).await.map_err(|e| match e {
                TimeoutError::Elapsed(d) => SendError::TimedOut(d),
                TimeoutError::Inner(e) => SendError::Transport(e),
            })
        };

        let exchanged = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(SendError::Cancelled),
                res = call => res,
            },
            None => call.await,
        };

        let (status, body): (StatusCode, Result<String, String>) = match exchanged {
            Ok(exchanged) => exchanged,
            Err(e) => return self.connectivity_failure(&method, path, e),
        };

        let result = interpret(status, body);
        if result.is_success() {
            debug!("{} {} -> {}", method, path, result.status);
        } else {
            warn!(
                "{} {} -> {} ({})",
                method,
                path,
                result.status,
                result.error.as_deref().unwrap_or("no message")
            );
        }

        result
    }

    fn build_request(&self, url: &str, options: RequestOptions) -> Result<Request<Full<Bytes>>, http::Error> {
        let mut builder = Request::builder()
            .method(options.method)
            .uri(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in options.headers.iter() {
                headers.insert(name.clone(), value.clone());
            }

            if let Some(token) = self.inner.tokens.get() {
                match HeaderValue::from_str(&format!("Bearer {}", token)) {
                    Ok(mut value) => {
                        value.set_sensitive(true);
                        headers.insert(AUTHORIZATION, value);
                    }
                    Err(_) => warn!("Stored token is not a valid header value; sending without it"),
                }
            }
        }

        builder.body(Full::new(options.body.unwrap_or_default()))
    }

    fn connectivity_failure<T>(&self, method: &Method, path: &str, err: SendError) -> ApiResult<T> {
        let base = &self.inner.base_url;

        match err {
            SendError::Cancelled => {
                debug!("{} {} cancelled", method, path);
                ApiResult::failure(0, "Request was cancelled").with_code(codes::CANCELLED)
            }
            SendError::TimedOut(d) => {
                warn!("{} {} timed out after {:?}", method, path, d);
                ApiResult::failure(
                    0,
                    format!(
                        "Request timed out after {} ms. Check that the backend ({}) is running and try again.",
                        d.as_millis(),
                        base
                    ),
                )
                .with_code(codes::TIMEOUT)
            }
            SendError::Transport(e) if e.is_connect() => {
                warn!("{} {} could not connect: {}", method, path, e);
                ApiResult::failure(
                    0,
                    format!(
                        "Cannot reach the backend ({}). Check that it is running and reachable.",
                        base
                    ),
                )
                .with_code(codes::UNREACHABLE)
            }
            SendError::Transport(e) => {
                warn!("{} {} failed: {}", method, path, e);
                ApiResult::failure(0, format!("Connection error: {}", e))
                    .with_code(codes::CONNECTION_ERROR)
            }
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("default_timeout", &self.inner.default_timeout)
            .finish_non_exhaustive()
    }
}
