/// Container-cluster API client
use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::error::ApiError;
use crate::config::ClientConfig;

const REGION_HEADER: &str = "X-Region";
const RESOURCE_GROUP_HEADER: &str = "X-Auth-Resource-Group";

/// Account context a request is scoped to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterTarget {
    pub region: Option<String>,
    pub resource_group: Option<String>,
}

/// Shared request plumbing for the containerv1 APIs
#[derive(Clone)]
pub struct ContainerClient {
    client: Client,
    endpoint: Url,
    target: ClusterTarget,
}

impl ContainerClient {
    /// Create a client with a transport built from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = config.get_token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid API token format")?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let target = ClusterTarget {
            region: config.region.clone(),
            resource_group: config.resource_group.clone(),
        };

        Ok(Self::with_http_client(client, &config.endpoint)?.with_target(target))
    }

    /// Create a client on top of an externally configured transport
    pub fn with_http_client(client: Client, endpoint: &str) -> Result<Self, ApiError> {
        let endpoint =
            Url::parse(endpoint).map_err(|_| ApiError::InvalidEndpoint(endpoint.to_string()))?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self {
            client,
            endpoint,
            target: ClusterTarget::default(),
        })
    }

    /// Scope every request to the given region and resource group
    pub fn with_target(mut self, target: ClusterTarget) -> Self {
        self.target = target;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve path segments against the base endpoint.
    ///
    /// Segments are percent-encoded, so an identifier can never span more
    /// than one path component.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(region) = &self.target.region {
            builder = builder.header(REGION_HEADER, region);
        }
        if let Some(group) = &self.target.resource_group {
            builder = builder.header(RESOURCE_GROUP_HEADER, group);
        }
        builder
    }

    /// Make a GET request and decode the response body
    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        let response = self.request(Method::GET, url).send().await?;
        Self::decode(response).await
    }

    /// Make a POST request and decode the response body
    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Make a POST request whose response body is not needed
    pub(crate) async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        Self::check(response).await
    }

    /// Make a PATCH request whose response body is not needed
    pub(crate) async fn patch<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        let response = self.request(Method::PATCH, url).json(body).send().await?;
        Self::check(response).await
    }

    /// Make a DELETE request
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check(response).await
    }

    /// Succeed on any 2xx, ignoring the body
    async fn check(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, body))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, body));
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { source, body })
    }
}
