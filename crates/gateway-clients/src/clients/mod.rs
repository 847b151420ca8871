//! HTTP clients for the platform services.
//!
//! - `directory`: users of a tenant and its subtenants
//! - `assets`: the asset hierarchy that holds one asset per application
//! - `files`: JSON configuration files attached to assets
//!
//! All three share [`HttpService`], which attaches the service credential,
//! maps HTTP statuses to [`ClientError`] and retries transient failures.

pub mod assets;
pub mod config;
pub mod directory;
pub mod files;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::{ClientError, ClientResult};
use crate::retry::{with_retry_if, RetryConfig};
use config::ServiceEndpoint;

/// Page size requested from paginated list endpoints.
pub(crate) const PAGE_SIZE: u32 = 100;

/// Pagination block returned by the directory and asset list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    pub number: u32,
    pub total_pages: u32,
}

impl Page {
    /// Whether another page follows this one.
    pub(crate) fn has_next(page: Option<&Page>) -> bool {
        page.map(|p| p.number + 1 < p.total_pages).unwrap_or(false)
    }
}

/// Authenticated, retrying access to one platform service.
#[derive(Clone)]
pub(crate) struct HttpService {
    name: &'static str,
    client: Client,
    endpoint: ServiceEndpoint,
    retry: RetryConfig,
}

impl HttpService {
    pub(crate) fn new(
        name: &'static str,
        endpoint: ServiceEndpoint,
        timeout: Duration,
        retry: RetryConfig,
    ) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name,
            client,
            endpoint,
            retry,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        self.endpoint.url(path)
    }

    /// Full URL of `prefix` followed by `segments`, each percent-encoded
    /// as a single path segment.
    pub(crate) fn segment_url(&self, prefix: &str, segments: &[&str]) -> ClientResult<Url> {
        let raw = self.endpoint.url(prefix);
        let mut url =
            Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(raw.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send the request produced by `build`, rebuilding it for every attempt.
    ///
    /// Returns the response only when its status is a success.
    pub(crate) async fn send<F>(&self, build: F) -> ClientResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        with_retry_if(
            &self.retry,
            || {
                let mut request = build(&self.client);
                if let Some(ref api_key) = self.endpoint.api_key {
                    request = request.bearer_auth(api_key);
                }
                let name = self.name;
                async move {
                    let response = request.send().await?;
                    check_status(name, response).await
                }
            },
            ClientError::is_retryable,
        )
        .await
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T, F>(&self, build: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = self.send(build).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

async fn check_status(service: &'static str, response: Response) -> ClientResult<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        error!(service, "Platform authentication failed");
        return Err(ClientError::AuthenticationFailed);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(response.url().path().to_string()));
    }

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(service, status = status.as_u16(), %message, "Platform API error");
        return Err(ClientError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}
