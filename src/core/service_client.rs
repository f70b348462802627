// src/core/service_client.rs
//! Authenticated HTTP client shared by every backend integration. One
//! instance per backend; the bearer token, when present, is attached to
//! every request.

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, trace, warn, Level};

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    base: Url,
    bearer_token: Option<String>,
}

impl ServiceClient {
    /// Create new service client for `base_url`
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .with_context(|| format!("Invalid service URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Service URL cannot hold a path: {}", base_url);
        }

        Ok(Self {
            client,
            base_url,
            base,
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// URL made of the base path followed by `segments`, each one
    /// percent-encoded so caller-supplied ids stay a single segment
    pub fn segment_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a URL built with `segment_url`, parse JSON response
    pub async fn get_json_url<R>(&self, operation: &'static str, url: Url) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let response = self.send(operation, self.client.get(url)).await?;

        response
            .json::<R>()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// POST JSON, parse JSON response
    pub async fn post_json<T, R>(
        &self,
        operation: &'static str,
        endpoint: &str,
        payload: &T,
    ) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(endpoint)).json(payload);
        let response = self.send(operation, request).await?;

        response
            .json::<R>()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// POST JSON for a call whose response body only matters for logs
    pub async fn post_json_discard<T>(
        &self,
        operation: &'static str,
        endpoint: &str,
        payload: &T,
    ) -> Result<(), ApiError>
    where
        T: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(endpoint)).json(payload);
        let response = self.send(operation, request).await?;

        let body = response.text().await.unwrap_or_default();
        debug!("{} response body: {}", operation, body);
        Ok(())
    }

    /// GET, 404 maps to `None` and is not logged as a failure
    pub async fn get_json_optional<R>(
        &self,
        operation: &'static str,
        endpoint: &str,
    ) -> Result<Option<R>, ApiError>
    where
        R: DeserializeOwned,
    {
        let request = self.client.get(self.url(endpoint));
        let response = self
            .send_expecting(operation, request, &[StatusCode::NOT_FOUND])
            .await;

        let response = match response {
            Ok(response) => response,
            Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => return Ok(None),
            Err(e) => return Err(e),
        };

        response
            .json::<R>()
            .await
            .map(Some)
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// GET with query parameters, parse JSON response
    pub async fn get_json_query<R, Q>(
        &self,
        operation: &'static str,
        url: Url,
        query: &Q,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.client.get(url).query(query);
        let response = self.send(operation, request).await?;

        response
            .json::<R>()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// GET, return the raw body text
    pub async fn get_text(&self, operation: &'static str, endpoint: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .get(self.url(endpoint))
            .header(reqwest::header::ACCEPT, "text/plain");
        let response = self.send(operation, request).await?;

        response
            .text()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
        self.send_expecting(operation, request, &[]).await
    }

    /// Send `request`; non-success statuses become `ApiError::Status`.
    /// Statuses listed in `expected` are still errors but only logged at debug.
    async fn send_expecting(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Response, ApiError> {
        let request = match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;

        let status = response.status();
        trace!("{} response status: {}", operation, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let level = failure_level(status, expected);
        if level == Level::DEBUG {
            debug!("{} returned {}", operation, status);
        } else if level == Level::WARN {
            warn!("{}: token expired or invalid", operation);
        } else {
            error!("{} error response {}: {}", operation, status, body);
        }

        Err(ApiError::Status {
            operation,
            status,
            body,
        })
    }
}

/// Log level for a non-success response
fn failure_level(status: StatusCode, expected: &[StatusCode]) -> Level {
    if expected.contains(&status) {
        Level::DEBUG
    } else if status == StatusCode::UNAUTHORIZED {
        Level::WARN
    } else {
        Level::ERROR
    }
}
