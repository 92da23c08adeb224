//! Error types for iam-preflight.
//!
//! Every AWS API failure is fatal to the run: the tool is a preflight check
//! and aborts rather than retrying or reporting partial results.

use thiserror::Error;

/// Result type alias for iam-preflight operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for iam-preflight.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable AWS credentials were resolved from the default chain.
    #[error("Unable to resolve AWS credentials: {0}")]
    CredentialsUnavailable(String),

    /// An AWS API call failed.
    #[error("AWS API call '{operation}' failed: {message}")]
    Api {
        /// API operation name (e.g. `GetAccountAuthorizationDetails`)
        operation: &'static str,
        /// Error message from the SDK
        message: String,
    },

    /// The calling principal was not found in the fetched account details.
    #[error("IAM user '{0}' not found in account authorization details")]
    PrincipalNotFound(String),

    /// The calling principal is not an IAM user (e.g. an assumed role or
    /// the account root), which this check cannot audit.
    #[error("Caller '{0}' is not an IAM user; only user principals can be audited")]
    UnsupportedPrincipal(String),

    /// A policy document could not be URL-decoded.
    #[error("Failed to decode policy document '{policy}': {message}")]
    PolicyDecode {
        /// Policy name or ARN
        policy: String,
        /// Decode error message
        message: String,
    },

    /// A policy document could not be parsed as JSON.
    #[error("Failed to parse policy document '{policy}': {source}")]
    PolicyParse {
        /// Policy name or ARN
        policy: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A granted action string could not be turned into a match pattern.
    #[error("Invalid grant pattern '{pattern}': {source}")]
    InvalidGrant {
        /// The grant string as found in the policy document
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new API error from an SDK error.
    pub fn api(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Api {
            operation,
            message: err.to_string(),
        }
    }

    /// Returns the error code for CLI exit status.
    ///
    /// Exit code 1 is reserved for a completed audit that found missing
    /// permissions, so failures start at 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CredentialsUnavailable(_) | Error::Api { .. } => 3,
            Error::PrincipalNotFound(_) | Error::UnsupportedPrincipal(_) => 4,
            Error::PolicyDecode { .. } | Error::PolicyParse { .. } => 5,
            _ => 2,
        }
    }
}
