use crate::domain::model::{BucketObject, Deposition, DepositionId, DepositionMetadata};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Remote operations the upload workflow needs from a deposition service.
#[async_trait]
pub trait DepositionApi: Send + Sync {
    /// True iff listing depositions with the configured token answers 200.
    async fn validate_token(&self) -> Result<bool>;

    /// Creates an empty deposition, returning its id and bucket URL.
    async fn create_deposition(&self) -> Result<(DepositionId, String)>;

    async fn get_deposition(&self, id: DepositionId) -> Result<Deposition>;

    async fn upload_file(&self, bucket_url: &str, path: &Path, filename: &str)
        -> Result<BucketObject>;

    /// Requests a new draft version and returns the draft's id.
    async fn new_version(&self, id: DepositionId) -> Result<DepositionId>;

    /// Fails with `UploadError::InvalidMetadata` on any status other than 200.
    async fn set_metadata(&self, id: DepositionId, metadata: &DepositionMetadata) -> Result<()>;

    async fn publish(&self, id: DepositionId) -> Result<Deposition>;
}
