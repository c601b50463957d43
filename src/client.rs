use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::{
    config::ConfigClient,
    errors::{Error, RequestError, Result},
    http::parse_request_error_parts,
    options::OptionsClient,
    sessions::SessionsClient,
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};

/// Client configuration. All fields optional; `base_url` defaults to
/// [`DEFAULT_BASE_URL`](crate::DEFAULT_BASE_URL). Basic Auth is applied when a
/// username is set.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Bring your own `reqwest::Client` (connection pool reuse, proxies).
    pub http_client: Option<reqwest::Client>,
    /// Override the connect timeout (defaults to 5s).
    pub connect_timeout: Option<Duration>,
    /// Override the request timeout (defaults to 60s).
    pub timeout: Option<Duration>,
}

/// Entry point for the SDK. Cheap to clone; all sub-clients share one
/// connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl Client {
    pub fn new(cfg: Config) -> Result<Self> {
        let base_url = cfg
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|err| Error::Config(format!("invalid base url: {err}")))?;

        let connect_timeout = cfg.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let request_timeout = cfg.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .map_err(|err| {
                    Error::Request(RequestError {
                        status: None,
                        message: "failed to build http client".to_string(),
                        source: Some(err),
                    })
                })?,
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                username: cfg.username.filter(|s| !s.trim().is_empty()),
                password: cfg.password,
                http,
                request_timeout,
            }),
        })
    }

    /// Session CRUD and message operations.
    pub fn sessions(&self) -> SessionsClient {
        SessionsClient {
            inner: self.inner.clone(),
        }
    }

    /// Read-side catalogs: providers, agents, commands.
    pub fn config(&self) -> ConfigClient {
        ConfigClient {
            inner: self.inner.clone(),
        }
    }

    /// Choice-list providers for UI dropdowns.
    pub fn options(&self) -> OptionsClient {
        OptionsClient::new(self.clone())
    }
}

impl ClientInner {
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| Error::Config(format!("invalid request url: {err}")))?;
        let mut builder = self
            .http
            .request(method, url)
            .timeout(self.request_timeout);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }
        Ok(builder)
    }

    /// Send exactly once; no retry policy. Transport failures and non-2xx
    /// statuses both surface as [`RequestError`].
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<reqwest::Response> {
        let start = Instant::now();
        let resp = builder.send().await.map_err(|err| {
            tracing::warn!(method = %method, path, error = %err, "transport error");
            Error::Request(RequestError::transport(err))
        })?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(
                method = %method,
                path,
                status = %status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );
            return Ok(resp);
        }

        tracing::warn!(method = %method, path, status = %status, "request failed");
        let body = resp.text().await.unwrap_or_default();
        Err(parse_request_error_parts(status, body).into())
    }

    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<T> {
        let resp = self.send(builder, method, path).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| Error::Request(RequestError::transport(err)))?;
        serde_json::from_slice(&bytes).map_err(Error::Serialization)
    }

    /// Execute and discard the response body.
    pub(crate) async fn execute_empty(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<()> {
        self.send(builder, method, path).await.map(|_| ())
    }

    /// Execute and parse the body leniently: non-JSON or empty bodies become
    /// `Value::Null` rather than an error.
    pub(crate) async fn execute_value(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<serde_json::Value> {
        let resp = self.send(builder, method, path).await?;
        let body = resp
            .text()
            .await
            .map_err(|err| Error::Request(RequestError::transport(err)))?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        let result = Client::new(Config {
            base_url: Some("not a url".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = Client::new(Config {
            base_url: Some("http://localhost:4096/".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.inner.base_url, "http://localhost:4096");
    }
}
