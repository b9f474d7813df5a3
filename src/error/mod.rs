use std::fmt::Display;
use thiserror::Error;

pub mod codes;

pub use codes::ErrorCode;

/// The unified error type for cepdist
#[derive(Error, Debug)]
pub enum CepDistError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Provider error: {message}")]
    Provider {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CepDistError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Validation { source: src, .. }
            | Self::Provider { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Validation { message, .. }
            | Self::Provider { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Validation { .. } => 2,
            Self::Provider { .. } => 3,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Validation { code, .. }
            | Self::Provider { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Validation { message, field, .. } => {
                if let Some(f) = field {
                    format!("Validation error for '{}': {}", f, message)
                } else {
                    format!("Validation error: {}", message)
                }
            }
            Self::Provider { message, .. } => format!("Lookup service problem: {}", message),
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut msg = format!("{}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        msg
    }
}

/// Failure of an external collaborator call (location, postal lookup, geocoding)
///
/// "Not found" is never an error: collaborators report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an out-of-range coordinate ({lat}, {lon})")]
    OutOfRange {
        service: &'static str,
        lat: f64,
        lon: f64,
    },

    #[error("{0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Shorthand for an unavailable provider
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Transport { .. } => ErrorCode::PROVIDER_TRANSPORT,
            Self::Status { .. } => ErrorCode::PROVIDER_HTTP_STATUS,
            Self::Decode { .. } => ErrorCode::PROVIDER_DECODE,
            Self::OutOfRange { .. } => ErrorCode::PROVIDER_OUT_OF_RANGE,
            Self::Unavailable(_) => ErrorCode::PROVIDER_UNAVAILABLE,
        }
    }
}

/// Type alias for Results using CepDistError
pub type Result<T> = std::result::Result<T, CepDistError>;

impl From<ProviderError> for CepDistError {
    fn from(err: ProviderError) -> Self {
        CepDistError::Provider {
            code: err.code(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::io::Error> for CepDistError {
    fn from(err: std::io::Error) -> Self {
        CepDistError::Other {
            code: ErrorCode::OTHER_IO,
            message: "I/O operation failed".to_string(),
            source: None,
        }
        .with_source(err)
    }
}

impl From<toml::de::Error> for CepDistError {
    fn from(err: toml::de::Error) -> Self {
        CepDistError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for CepDistError {
    fn from(err: serde_json::Error) -> Self {
        CepDistError::other("Failed to serialize output").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation_and_chaining() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err = CepDistError::config_with_code(ErrorCode::CONFIG_PATH_ERROR, "Cannot read file")
            .with_source(io_err)
            .with_context("while loading configuration");

        assert_eq!(err.code(), ErrorCode::CONFIG_PATH_ERROR);
        assert!(err.to_string().contains("[E1006]"));
        assert!(err.user_message().contains("Cannot read file"));
        assert!(err.developer_message().contains("caused by: config.toml"));
    }

    #[test]
    fn test_error_codes_and_exit_codes() {
        let err = CepDistError::validation_with_code(
            ErrorCode::VALIDATION_POSTAL_CODE_FORMAT,
            "bad cep",
            Some("cep".to_string()),
        );
        assert_eq!(err.code(), ErrorCode::VALIDATION_POSTAL_CODE_FORMAT);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.user_message(), "Validation error for 'cep': bad cep");

        assert_eq!(CepDistError::other("boom").exit_code(), 1);
    }

    #[test]
    fn test_provider_error_conversion() {
        let err: CepDistError = ProviderError::Status {
            service: "viacep",
            status: 503,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::PROVIDER_HTTP_STATUS);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("viacep responded with HTTP 503"));
    }
}
