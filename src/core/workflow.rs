use crate::domain::model::{DepositionId, DepositionMetadata, PublishOutcome, UploadPlan};
use crate::domain::ports::DepositionApi;
use crate::utils::error::{Result, UploadError};
use std::path::{Path, PathBuf};

/// What to upload and where: a local file and, for a new version, the
/// deposition it supersedes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    pub path: Option<PathBuf>,
    pub deposition_id: Option<DepositionId>,
}

impl UploadRequest {
    pub fn new_deposition(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            deposition_id: None,
        }
    }

    pub fn new_version(deposition_id: DepositionId) -> Self {
        Self {
            path: None,
            deposition_id: Some(deposition_id),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Final path component, as the file is named inside the bucket.
pub fn upload_filename(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| UploadError::InvalidConfigValueError {
            field: "path".to_string(),
            value: path.display().to_string(),
            reason: "Path has no usable file name".to_string(),
        })
}

/// Checks that `path` names a regular file and returns its bucket name.
pub async fn inspect_upload_source(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(UploadError::InvalidConfigValueError {
            field: "path".to_string(),
            value: path.display().to_string(),
            reason: "Not a regular file".to_string(),
        });
    }
    upload_filename(path)
}

pub struct UploadWorkflow<A: DepositionApi> {
    api: A,
    metadata: DepositionMetadata,
}

impl<A: DepositionApi> UploadWorkflow<A> {
    pub fn new(api: A, metadata: DepositionMetadata) -> Self {
        Self { api, metadata }
    }

    /// Token check, new deposition or new version, metadata, publish.
    ///
    /// The upload source is checked before the first remote change, so a bad
    /// `path` never leaves an empty deposition or an open draft behind.
    pub async fn run(&self, request: &UploadRequest) -> Result<PublishOutcome> {
        self.check_token().await?;

        let source = match request.path.as_deref() {
            Some(path) => Some((path, inspect_upload_source(path).await?)),
            None => None,
        };

        let deposition_id = match (request.deposition_id, source) {
            (Some(existing), source) => {
                tracing::info!("Deposition {} given, creating a new version", existing);
                self.create_new_version(existing, source).await?
            }
            (None, Some((path, filename))) => {
                tracing::info!("No deposition given, creating a new deposition");
                self.upload_new_file(path, &filename).await?
            }
            (None, None) => {
                return Err(UploadError::MissingConfigError {
                    field: "path".to_string(),
                })
            }
        };

        tracing::info!("📝 Updating metadata of deposition {}", deposition_id);
        self.api.set_metadata(deposition_id, &self.metadata).await?;

        tracing::info!("🚀 Publishing deposition {}", deposition_id);
        let published = self.api.publish(deposition_id).await?;
        if !published.is_published() {
            tracing::warn!(
                "Publish of deposition {} returned state {:?}",
                deposition_id,
                published.state
            );
        }

        Ok(PublishOutcome {
            deposition_id,
            doi: published.doi,
            html_url: published.links.html,
        })
    }

    /// Validates the token and the local file without changing anything remotely.
    pub async fn dry_run(&self, request: &UploadRequest) -> Result<UploadPlan> {
        self.check_token().await?;

        let filename = match request.path.as_deref() {
            Some(path) => Some(inspect_upload_source(path).await?),
            None => None,
        };

        match (request.deposition_id, filename) {
            (Some(deposition_id), filename) => Ok(UploadPlan::NewVersion {
                deposition_id,
                filename,
            }),
            (None, Some(filename)) => Ok(UploadPlan::NewDeposition { filename }),
            (None, None) => Err(UploadError::MissingConfigError {
                field: "path".to_string(),
            }),
        }
    }

    async fn check_token(&self) -> Result<()> {
        tracing::debug!("Validating access token");
        if !self.api.validate_token().await? {
            return Err(UploadError::InvalidToken);
        }
        tracing::info!("✅ Access token accepted");
        Ok(())
    }

    async fn upload_new_file(&self, path: &Path, filename: &str) -> Result<DepositionId> {
        let (deposition_id, bucket_url) = self.api.create_deposition().await?;
        tracing::info!("📦 Created deposition {}", deposition_id);

        let object = self.api.upload_file(&bucket_url, path, filename).await?;
        tracing::info!(
            "📤 Uploaded {} ({} bytes, checksum {})",
            object.key,
            object.size.unwrap_or_default(),
            object.checksum.as_deref().unwrap_or("n/a")
        );

        Ok(deposition_id)
    }

    async fn create_new_version(
        &self,
        existing: DepositionId,
        source: Option<(&Path, String)>,
    ) -> Result<DepositionId> {
        let draft_id = self.api.new_version(existing).await?;
        tracing::info!("🆕 New draft {} created from deposition {}", draft_id, existing);

        if let Some((path, filename)) = source {
            let draft = self.api.get_deposition(draft_id).await?;
            let bucket_url =
                draft
                    .links
                    .bucket
                    .ok_or_else(|| UploadError::MalformedResponse {
                        operation: "get deposition",
                        message: format!("draft {} has no links.bucket", draft_id),
                    })?;

            let object = self.api.upload_file(&bucket_url, path, &filename).await?;
            tracing::info!("📤 Uploaded {} into draft {}", object.key, draft_id);
        }

        Ok(draft_id)
    }
}
