pub mod toml_config;

use crate::adapters::zenodo::{DEFAULT_BASE_URL, SANDBOX_BASE_URL};
use crate::core::workflow::UploadRequest;
use crate::domain::model::{DepositionId, DepositionMetadata};
use crate::utils::error::{Result, UploadError};
use crate::utils::validation::{validate_path, validate_required_field, validate_url, Validate};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "zenodo-upload")]
#[command(about = "Upload a file to Zenodo, optionally as a new version of an existing deposition")]
pub struct CliConfig {
    /// The path to the file you are uploading
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// The deposition_id of the existing file in Zenodo
    #[arg(long = "depo_id", alias = "depo-id", value_name = "DEPO")]
    pub depo_id: Option<DepositionId>,

    /// Zenodo personal access token
    #[arg(long, env = "ZENODO_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// TOML file with [zenodo] and [metadata] sections
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API root, e.g. https://zenodo.org/api
    #[arg(long, conflicts_with = "sandbox")]
    pub base_url: Option<String>,

    /// Use the Zenodo sandbox instead of production
    #[arg(long)]
    pub sandbox: bool,

    /// Check the token and the file, then stop before changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Everything the upload needs once flags, environment and config file are merged.
#[derive(Clone)]
pub struct UploadSettings {
    pub base_url: String,
    pub access_token: String,
    pub timeout: Option<Duration>,
    pub metadata: DepositionMetadata,
    pub request: UploadRequest,
}

impl std::fmt::Debug for UploadSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSettings")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("metadata", &self.metadata)
            .field("request", &self.request)
            .finish()
    }
}

/// Command-line values that take part in settings resolution.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub path: Option<PathBuf>,
    pub deposition_id: Option<DepositionId>,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub sandbox: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            path: self.path.clone(),
            deposition_id: self.depo_id,
            token: self.token.clone(),
            base_url: self.base_url.clone(),
            sandbox: self.sandbox,
        }
    }

    /// 載入 TOML（若有指定）並與命令列參數合併
    pub fn resolve(&self) -> Result<UploadSettings> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        UploadSettings::resolve(self.overrides(), file)
    }
}

impl UploadSettings {
    /// Command line and environment win over the file, the file wins over
    /// built-in defaults.
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Result<Self> {
        file.validate()?;

        let base_url = if overrides.sandbox {
            SANDBOX_BASE_URL.to_string()
        } else {
            overrides
                .base_url
                .or_else(|| file.zenodo.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        };

        let access_token = overrides
            .token
            .filter(|token| !token.trim().is_empty())
            .or_else(|| file.access_token().map(str::to_string));
        let access_token = validate_required_field(
            "access_token (--token, ZENODO_ACCESS_TOKEN or zenodo.access_token)",
            &access_token,
        )?
        .clone();

        let settings = Self {
            base_url,
            access_token,
            timeout: file.zenodo.timeout_seconds.map(Duration::from_secs),
            metadata: file.metadata.unwrap_or_default(),
            request: UploadRequest {
                path: overrides.path,
                deposition_id: overrides.deposition_id,
            },
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for UploadSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        self.metadata.validate()?;

        match &self.request.path {
            Some(path) => validate_path("path", &path.to_string_lossy())?,
            None if self.request.deposition_id.is_none() => {
                return Err(UploadError::MissingConfigError {
                    field: "path (--path is required unless --depo_id is given)".to_string(),
                });
            }
            None => {}
        }
        Ok(())
    }
}
