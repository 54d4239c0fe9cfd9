use crate::domain::model::{DepositionMetadata, UploadType, IMAGE_TYPES, PUBLICATION_TYPES};
use crate::utils::error::{Result, UploadError};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub zenodo: ZenodoSection,
    pub metadata: Option<DepositionMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZenodoSection {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| UploadError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| UploadError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ZENODO_ACCESS_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 取得 token；仍含未替換的 ${VAR} 時視為未設定
    pub fn access_token(&self) -> Option<&str> {
        self.zenodo
            .access_token
            .as_deref()
            .filter(|token| !token.contains("${"))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.zenodo.base_url {
            validate_url("zenodo.base_url", base_url)?;
        }
        if self.zenodo.timeout_seconds == Some(0) {
            return Err(UploadError::InvalidConfigValueError {
                field: "zenodo.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }
        if let Some(metadata) = &self.metadata {
            metadata.validate()?;
        }
        Ok(())
    }
}

impl Validate for DepositionMetadata {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("metadata.title", &self.title)?;
        validate_non_empty_string("metadata.description", &self.description)?;

        if self.creators.is_empty() {
            return Err(UploadError::InvalidConfigValueError {
                field: "metadata.creators".to_string(),
                value: "[]".to_string(),
                reason: "At least one creator is required".to_string(),
            });
        }
        for creator in &self.creators {
            validate_non_empty_string("metadata.creators.name", &creator.name)?;
        }

        match self.upload_type {
            UploadType::Publication => validate_subtype(
                "metadata.publication_type",
                self.publication_type.as_deref(),
                PUBLICATION_TYPES,
            ),
            UploadType::Image => validate_subtype(
                "metadata.image_type",
                self.image_type.as_deref(),
                IMAGE_TYPES,
            ),
            _ => Ok(()),
        }
    }
}

fn validate_subtype(field_name: &str, value: Option<&str>, allowed: &[&str]) -> Result<()> {
    let value = value.ok_or_else(|| UploadError::MissingConfigError {
        field: field_name.to_string(),
    })?;
    if !allowed.contains(&value) {
        return Err(UploadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[zenodo]
base_url = "https://sandbox.zenodo.org/api"
access_token = "abc123"
timeout_seconds = 30

[metadata]
title = "Survey results"
upload_type = "dataset"
description = "Raw survey exports"
publication_date = "2024-07-28"
keywords = ["survey", "raw"]

[[metadata.creators]]
name = "Doe, Jane"
affiliation = "Example University"
orcid = "0000-0002-1825-0097"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.zenodo.base_url.as_deref(),
            Some("https://sandbox.zenodo.org/api")
        );
        assert_eq!(config.access_token(), Some("abc123"));
        assert_eq!(config.zenodo.timeout_seconds, Some(30));

        let metadata = config.metadata.as_ref().unwrap();
        assert_eq!(metadata.upload_type, UploadType::Dataset);
        assert_eq!(metadata.creators[0].orcid.as_deref(), Some("0000-0002-1825-0097"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.metadata.is_none());
        assert!(config.access_token().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ZENODO_UPLOAD_TEST_TOKEN", "from-env");

        let config = TomlConfig::from_toml_str(
            r#"
[zenodo]
access_token = "${ZENODO_UPLOAD_TEST_TOKEN}"
"#,
        )
        .unwrap();
        assert_eq!(config.access_token(), Some("from-env"));

        std::env::remove_var("ZENODO_UPLOAD_TEST_TOKEN");
    }

    #[test]
    fn test_unset_env_var_means_no_token() {
        let config = TomlConfig::from_toml_str(
            r#"
[zenodo]
access_token = "${ZENODO_UPLOAD_TEST_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert!(config.access_token().is_none());
    }

    #[test]
    fn test_unknown_upload_type_is_rejected() {
        let result = TomlConfig::from_toml_str(
            r#"
[metadata]
title = "x"
upload_type = "mixtape"
description = "x"
creators = [{ name = "x" }]
"#,
        );
        assert!(matches!(result, Err(UploadError::ConfigError { .. })));
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[zenodo]
base_url = "zenodo.org/api"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[metadata]
title = "x"
upload_type = "poster"
description = "x"
creators = []
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_publication_and_image_need_a_subtype() {
        let config = TomlConfig::from_toml_str(
            r#"
[metadata]
title = "Paper"
upload_type = "publication"
description = "x"
creators = [{ name = "x" }]
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, UploadError::MissingConfigError { ref field } if field == "metadata.publication_type")
        );

        let config = TomlConfig::from_toml_str(
            r#"
[metadata]
title = "Paper"
upload_type = "publication"
publication_type = "article"
description = "x"
creators = [{ name = "x" }]
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());

        let config = TomlConfig::from_toml_str(
            r#"
[metadata]
title = "Figure"
upload_type = "image"
image_type = "painting"
description = "x"
creators = [{ name = "x" }]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(UploadError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[zenodo]\naccess_token = \"file-token\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.access_token(), Some("file-token"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TomlConfig::from_file("/definitely/not/zenodo.toml").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
