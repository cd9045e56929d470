use std::fmt;
use thiserror::Error;

/// Why a quote was skipped without contacting the carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoQuoteReason {
    DomesticDestination,
    MissingPostcode,
}

impl fmt::Display for NoQuoteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomesticDestination => write!(f, "destination is in the store's base country"),
            Self::MissingPostcode => write!(f, "destination postcode is empty"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("No InXpress quote applicable: {0}")]
    NoQuoteApplicable(NoQuoteReason),

    #[error("Shipping options and rates are not available from InXpress. Please try again.")]
    TransportFailure { detail: String },

    #[error("InXpress: {message}")]
    CarrierRejected { message: String },

    #[error("Unable to get the shipping cost for InXpress. Please try again.")]
    MalformedResponse,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown unit of measure: {unit}")]
    UnknownUnit { unit: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotApplicable,
    Carrier,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuoteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoQuoteApplicable(_) => ErrorCategory::NotApplicable,
            Self::CarrierRejected { .. } | Self::MalformedResponse => ErrorCategory::Carrier,
            Self::TransportFailure { .. } | Self::Http(_) => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::UnknownUnit { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotApplicable => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Carrier | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Skipped quotes are a normal outcome and never reach the reporting sink.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::NoQuoteApplicable(_))
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NoQuoteApplicable(reason) => format!("No InXpress rate offered: {}", reason),
            Self::Http(_) | Self::TransportFailure { .. } => {
                "Shipping options and rates are not available from InXpress. Please try again."
                    .to_string()
            }
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::NotApplicable => {
                "InXpress only quotes international orders with a destination postcode"
            }
            ErrorCategory::Carrier => {
                "Check the InXpress account id and the destination address, then retry"
            }
            ErrorCategory::Network => {
                "Check network connectivity to the InXpress endpoint or raise carrier.timeout_seconds"
            }
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
