use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Image analysis unavailable: {message}")]
    AnalysisUnavailable { message: String },

    #[error("Comparable search unavailable: {message}")]
    ScrapeUnavailable { message: String },

    #[error("Copy generation unavailable: {message}")]
    GenerationUnavailable { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Collaborator,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PricerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PricerError::InvalidQuery { .. } | PricerError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            PricerError::AnalysisUnavailable { .. }
            | PricerError::ScrapeUnavailable { .. }
            | PricerError::GenerationUnavailable { .. } => ErrorCategory::Collaborator,
            PricerError::ConfigError { .. } | PricerError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            PricerError::IoError(_)
            | PricerError::SerializationError(_)
            | PricerError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // collaborators are worth retrying by the caller
            ErrorCategory::Collaborator => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Collaborator
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PricerError::InvalidQuery { .. } => "Provide at least a brand or an item type",
            PricerError::AnalysisUnavailable { .. } => {
                "Retry later or pass --brand/--type explicitly"
            }
            PricerError::ScrapeUnavailable { .. } => {
                "Check the listings source and retry the search"
            }
            PricerError::GenerationUnavailable { .. } => {
                "Retry later or fall back to the template copy writer"
            }
            PricerError::IoError(_) => "Check that the file exists and is readable",
            PricerError::SerializationError(_) => "Make sure the listings file is valid JSON",
            PricerError::CsvError(_) => "Make sure the listings file is valid CSV with a header row",
            PricerError::ConfigError { .. } | PricerError::InvalidConfigValueError { .. } => {
                "Fix the pricing configuration file and try again"
            }
            PricerError::ValidationError { .. } => "Check the input values and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PricerError::InvalidQuery { .. } => {
                "The item could not be identified well enough to search for comparables".to_string()
            }
            PricerError::AnalysisUnavailable { .. } => "The photo could not be analyzed".to_string(),
            PricerError::ScrapeUnavailable { .. } => {
                "Market prices could not be retrieved".to_string()
            }
            PricerError::GenerationUnavailable { .. } => {
                "The listing text could not be generated".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_are_retryable() {
        let err = PricerError::ScrapeUnavailable {
            message: "timeout".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Collaborator);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_query_is_not_retryable() {
        let err = PricerError::InvalidQuery {
            message: "no brand or type".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("no brand or type"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: PricerError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = PricerError::InvalidConfigValueError {
            field: "sale_speed.fast".to_string(),
            value: "0".to_string(),
            reason: "Value must be a positive, finite number".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.severity() < ErrorSeverity::Critical);
        assert!(err.severity() > ErrorSeverity::Medium);
    }
}
