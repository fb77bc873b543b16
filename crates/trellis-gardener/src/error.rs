use std::time::Duration;

use thiserror::Error;

/// Errors raised while building a shoot spec from a runtime.
///
/// Pipeline stages return these verbatim; the converter never wraps or
/// re-stringifies them on the way out.
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("kubernetes version {0:?} is not a valid version string")]
    InvalidVersion(String),

    #[error("provider config could not be built: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("no audit log configuration for provider {provider}")]
    MissingProviderConfig { provider: String },

    #[error("no audit log configuration for provider {provider} in region {region}")]
    MissingRegionConfig { provider: String, region: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit log configuration is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remote API failure taxonomy. Conflicts and forbidden responses are
/// routine with Gardener and treated as transient by every caller.
#[derive(Debug, Error)]
pub enum GardenApiError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("api error: {0}")]
    Api(String),
}

impl GardenApiError {
    /// Transient failures cause a backoff-requeue instead of a terminal
    /// failure condition.
    pub fn is_transient(&self) -> bool {
        matches!(self, GardenApiError::Conflict(_) | GardenApiError::Forbidden(_))
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// kube errors often have terse `Display` impls but useful detail in the
/// source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
