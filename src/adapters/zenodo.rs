use crate::domain::model::{
    BucketObject, Deposition, DepositionId, DepositionMetadata, MetadataEnvelope,
};
use crate::domain::ports::DepositionApi;
use crate::utils::error::{Result, UploadError};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://zenodo.org/api";
pub const SANDBOX_BASE_URL: &str = "https://sandbox.zenodo.org/api";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Zenodo REST API v1 client. The token travels as the `access_token`
/// query parameter on every request, bucket uploads included.
#[derive(Clone)]
pub struct ZenodoClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl std::fmt::Debug for ZenodoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenodoClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ZenodoClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, access_token, None)
    }

    pub fn with_timeout(
        base_url: &str,
        access_token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(UploadError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            access_token: access_token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn depositions(&self) -> Url {
        self.endpoint(&["deposit", "depositions"])
    }

    fn deposition(&self, id: DepositionId, action: Option<&str>) -> Url {
        let id = id.to_string();
        match action {
            Some(action) => self.endpoint(&["deposit", "depositions", &id, "actions", action]),
            None => self.endpoint(&["deposit", "depositions", &id]),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("access_token", self.access_token.as_str())])
    }

    async fn send(&self, request: RequestBuilder, operation: &'static str) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        tracing::debug!("{} -> HTTP {}", operation, response.status());
        Ok(response)
    }
}

async fn ensure_success(response: Response, operation: &'static str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(UploadError::UnexpectedStatus {
        operation,
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// `{bucket_url}/{filename}`, with the file name percent-encoded as a single segment.
pub fn object_url(bucket_url: &str, filename: &str) -> Result<Url> {
    let mut url = Url::parse(bucket_url)?;
    url.path_segments_mut()
        .map_err(|_| UploadError::MalformedResponse {
            operation: "upload file",
            message: format!("bucket URL '{}' cannot take a file name", bucket_url),
        })?
        .pop_if_empty()
        .push(filename);
    Ok(url)
}

/// Id of the draft named by a `latest_draft` link: its last non-empty path segment.
pub fn draft_id_from_link(link: &str) -> Result<DepositionId> {
    let malformed = |message: String| UploadError::MalformedResponse {
        operation: "new version",
        message,
    };

    let url = Url::parse(link).map_err(|e| malformed(format!("latest_draft '{}': {}", link, e)))?;
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| malformed(format!("latest_draft '{}' has no path", link)))?;

    segment
        .parse()
        .map_err(|_| malformed(format!("latest_draft '{}' does not end in an id", link)))
}

#[async_trait]
impl DepositionApi for ZenodoClient {
    async fn validate_token(&self) -> Result<bool> {
        let url = self.depositions();
        tracing::debug!("GET {}", url);
        let response = self
            .send(self.client.get(url), "list depositions")
            .await?;
        if response.status() != StatusCode::OK {
            tracing::warn!("Token check answered HTTP {}", response.status());
            return Ok(false);
        }
        Ok(true)
    }

    async fn create_deposition(&self) -> Result<(DepositionId, String)> {
        let url = self.depositions();
        tracing::debug!("POST {}", url);
        let response = self
            .send(
                self.client.post(url).json(&serde_json::json!({})),
                "create deposition",
            )
            .await?;
        let response = ensure_success(response, "create deposition").await?;
        let deposition: Deposition = read_json(response).await?;

        let bucket = deposition
            .links
            .bucket
            .ok_or_else(|| UploadError::MalformedResponse {
                operation: "create deposition",
                message: "response has no links.bucket".to_string(),
            })?;
        Ok((deposition.id, bucket))
    }

    async fn get_deposition(&self, id: DepositionId) -> Result<Deposition> {
        let url = self.deposition(id, None);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url), "get deposition").await?;
        let response = ensure_success(response, "get deposition").await?;
        read_json(response).await
    }

    async fn upload_file(
        &self,
        bucket_url: &str,
        path: &Path,
        filename: &str,
    ) -> Result<BucketObject> {
        let url = object_url(bucket_url, filename)?;
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        tracing::debug!("PUT {} ({} bytes, streamed)", url, size);

        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file));
        let response = self.send(request, "upload file").await?;
        let response = ensure_success(response, "upload file").await?;
        read_json(response).await
    }

    async fn new_version(&self, id: DepositionId) -> Result<DepositionId> {
        let url = self.deposition(id, Some("newversion"));
        tracing::debug!("POST {}", url);
        let response = self.send(self.client.post(url), "new version").await?;
        let response = ensure_success(response, "new version").await?;
        let deposition: Deposition = read_json(response).await?;

        let link = deposition
            .links
            .latest_draft
            .ok_or_else(|| UploadError::MalformedResponse {
                operation: "new version",
                message: "response has no links.latest_draft".to_string(),
            })?;
        draft_id_from_link(&link)
    }

    async fn set_metadata(&self, id: DepositionId, metadata: &DepositionMetadata) -> Result<()> {
        let url = self.deposition(id, None);
        tracing::debug!("PUT {}", url);
        let response = self
            .send(
                self.client.put(url).json(&MetadataEnvelope { metadata }),
                "update metadata",
            )
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::InvalidMetadata { status, body });
        }
        Ok(())
    }

    async fn publish(&self, id: DepositionId) -> Result<Deposition> {
        let url = self.deposition(id, Some("publish"));
        tracing::debug!("POST {}", url);
        let response = self.send(self.client.post(url), "publish").await?;
        let response = ensure_success(response, "publish").await?;
        read_json(response).await
    }
}
