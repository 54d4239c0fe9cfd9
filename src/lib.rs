pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::zenodo::ZenodoClient;
pub use config::{toml_config::TomlConfig, Overrides, UploadSettings};
pub use crate::core::workflow::{UploadRequest, UploadWorkflow};
pub use domain::model::{DepositionId, DepositionMetadata, PublishOutcome, UploadPlan};
pub use domain::ports::DepositionApi;
pub use utils::error::{Result, UploadError};
