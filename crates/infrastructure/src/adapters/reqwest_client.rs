//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Request paths are resolved against the configured API base URL.

use std::time::{Duration, Instant};

use agenda_application::ports::{HttpClient, HttpClientError, HttpFuture};
use agenda_domain::{ApiRequest, ApiResponse, ClientSettings, Header, Headers, HttpMethod};
use reqwest::{Client, Method, Url};

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpClient` port from the
/// application layer. It sends exactly what it is given and never retries.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    default_timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client for `settings`.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "Agenda/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the client cannot be created.
    pub fn new(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        let base_url = settings
            .validate()
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("Agenda/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self::with_client(client, base_url, settings.timeout_ms))
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, default_timeout_ms: u64) -> Self {
        Self {
            client,
            base_url,
            default_timeout_ms,
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Joins the base URL and the request path, then appends the query.
    fn build_url(&self, request: &ApiRequest) -> Result<Url, HttpClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = format!("{base}{}", request.path);
        if !request.query.is_empty() {
            let query = serde_urlencoded::to_string(&request.query)
                .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
            url.push(if request.path.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        Url::parse(&url).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {url}")))
    }

    /// Maps reqwest errors to domain `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

/// reqwest hides the interesting part of connect errors in the source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &ApiRequest) -> HttpFuture<'_> {
        let method = request.method;
        let url = self.build_url(request);
        let headers = request.headers.clone();
        let body = request.body.clone();
        let timeout_ms = request.timeout_ms.unwrap_or(self.default_timeout_ms);

        Box::pin(async move {
            let url = url?;
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .timeout(Duration::from_millis(timeout_ms))
                .header("Accept", "application/json");

            for header in headers.iter() {
                builder = builder.header(&header.name, &header.value);
            }

            if let Some(body) = &body {
                let encoded = serde_json::to_vec(body)
                    .map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
                if !headers.contains("Content-Type") {
                    builder = builder.header("Content-Type", "application/json");
                }
                builder = builder.body(encoded);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: Headers = response
                .headers()
                .iter()
                .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
                .collect();

            let body = response
                .text()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            Ok(ApiResponse {
                status,
                headers: response_headers,
                body,
                duration: start.elapsed(),
            })
        })
    }
}
