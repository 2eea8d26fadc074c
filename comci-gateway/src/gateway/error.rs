//! Gateway error taxonomy.

use crate::provider::ProviderError;
use crate::timetable::{LookupError, StructureError};

/// Errors surfaced by gateway operations.
///
/// Every variant maps to one HTTP status in the web layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Missing or malformed request parameter
    #[error("{0}")]
    InvalidArgument(String),

    /// Provider data has no entry for the requested grade/class
    #[error("{0}")]
    NotFound(String),

    /// Provider returned nothing usable, or did not answer in time
    #[error("{0}")]
    UpstreamFailure(String),

    /// Any other provider failure
    #[error("{0}")]
    Internal(String),
}

impl From<ProviderError> for GatewayError {
    fn from(e: ProviderError) -> Self {
        GatewayError::Internal(e.to_string())
    }
}

impl From<LookupError> for GatewayError {
    fn from(e: LookupError) -> Self {
        GatewayError::NotFound(e.to_string())
    }
}

impl From<StructureError> for GatewayError {
    fn from(e: StructureError) -> Self {
        GatewayError::UpstreamFailure(e.to_string())
    }
}
