use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Access token invalid")]
    InvalidToken,

    #[error("Error in metadata (HTTP {status}): {body}")]
    InvalidMetadata { status: u16, body: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{operation} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {operation}: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl UploadError {
    /// Process exit code for this error. Configuration problems use 2,
    /// everything that happens once requests start flowing uses 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            UploadError::ConfigError { .. }
            | UploadError::MissingConfigError { .. }
            | UploadError::InvalidConfigValueError { .. } => 2,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            UploadError::InvalidToken => "Access token invalid".to_string(),
            UploadError::InvalidMetadata { .. } => {
                "Error in Metadata. Check that upload_type and other fields are valid.".to_string()
            }
            UploadError::ApiError(e) if e.is_timeout() => {
                "The Zenodo API did not answer in time".to_string()
            }
            UploadError::ApiError(e) if e.is_connect() => {
                "Could not connect to the Zenodo API".to_string()
            }
            UploadError::IoError(e) => format!("Could not read the upload file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            UploadError::InvalidToken => {
                "Create a personal access token with deposit:write and deposit:actions scopes and pass it via --token or ZENODO_ACCESS_TOKEN"
            }
            UploadError::InvalidMetadata { .. } => {
                "Review the [metadata] section of the config file; some upload types need extra fields"
            }
            UploadError::ApiError(_) => "Check network connectivity and the --base-url setting",
            UploadError::UrlError(_) => "Check the --base-url setting",
            UploadError::IoError(_) => "Check that --path points to a readable file",
            UploadError::SerializationError(_) | UploadError::MalformedResponse { .. } => {
                "The API answered with an unexpected payload; make sure --base-url points at a Zenodo API root"
            }
            UploadError::UnexpectedStatus { status, .. } if *status == 404 => {
                "Check that the deposition id exists and belongs to the token's account"
            }
            UploadError::UnexpectedStatus { .. } => "Inspect the response body above and retry",
            UploadError::ConfigError { .. }
            | UploadError::MissingConfigError { .. }
            | UploadError::InvalidConfigValueError { .. } => {
                "Fix the command-line flags or the TOML config file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
