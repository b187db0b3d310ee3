use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("File '{path}' not found")]
    InputNotFound { path: String },

    #[error("Required column '{column}' is missing (columns: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Malformed table at row {row}: {message}")]
    MalformedTable { row: usize, message: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InputNotFound { .. }
            | EtlError::MissingColumn { .. }
            | EtlError::MalformedTable { .. }
            | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::ApiError(_) | EtlError::HttpStatus { .. } => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a single failed request never aborts a lookup
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::InputNotFound { path } => {
                format!("Check that '{}' exists or pass another file with --input", path)
            }
            EtlError::MissingColumn { column, .. } => format!(
                "Make sure the CSV header contains a '{}' column or use --link-column",
                column
            ),
            EtlError::MalformedTable { .. } | EtlError::CsvError(_) => {
                "Check that the input is a comma-separated file with a consistent header".to_string()
            }
            EtlError::ApiError(_) | EtlError::HttpStatus { .. } => {
                "Check network connectivity; the site may also be blocking automated requests"
                    .to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the command line flags and the TOML settings file".to_string()
            }
            EtlError::IoError(_) => "Check file permissions and available disk space".to_string(),
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Re-run with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::InputNotFound { path } => format!("Error: File '{}' not found!", path),
            other => format!("Error processing CSV: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let err = EtlError::InputNotFound {
            path: "books.csv".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "Error: File 'books.csv' not found!");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_network_errors_are_recoverable() {
        let err = EtlError::HttpStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.severity() < ErrorSeverity::High);
    }
}
