//! The travel backend seam.
//!
//! Tools talk to a [`TravelApi`]; production wires in
//! [`RestTravelClient`](crate::rest_client::RestTravelClient), tests wire in
//! a canned implementation.

use async_trait::async_trait;
use concierge_core::tool::ToolOutput;

use crate::types::{AvailabilityRequest, AvailabilityResponse, HealthStatus, Hotel, HotelsResponse};

#[derive(Debug, Clone, thiserror::Error)]
pub enum TravelApiError {
    #[error("{message} ({code}, status {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl TravelApiError {
    /// The failure a tool reports for this backend error.
    ///
    /// `timeout_hint` is the user-facing text for the timeout case, which
    /// differs between a search and a catalog lookup.
    pub fn to_output(&self, timeout_hint: &str) -> ToolOutput {
        match self {
            TravelApiError::Api { code, message, .. } => ToolOutput::failure(code, message),
            TravelApiError::Timeout(_) => ToolOutput::failure("TIMEOUT", timeout_hint),
            TravelApiError::Network(_) => ToolOutput::failure(
                "NETWORK_ERROR",
                "Failed to connect to the API. Please check network connectivity.",
            ),
            TravelApiError::Decode(reason) => ToolOutput::failure("EXECUTION_ERROR", reason),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TravelApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Read-only access to hotel catalog and availability.
#[async_trait]
pub trait TravelApi: Send + Sync {
    /// Full hotel catalog. `refresh` bypasses the backend cache.
    async fn hotels(&self, refresh: bool) -> Result<HotelsResponse, TravelApiError>;

    async fn hotel(&self, code: &str) -> Result<Hotel, TravelApiError>;

    async fn search_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, TravelApiError>;

    async fn health(&self) -> Result<HealthStatus, TravelApiError>;
}

/// Status code to error code, used when the body names no specific code.
pub fn code_for_status(status: u16) -> String {
    match status {
        400 => "VALIDATION_ERROR".into(),
        404 => "NOT_FOUND".into(),
        500 => "SERVER_ERROR".into(),
        504 => "GATEWAY_TIMEOUT".into(),
        other => format!("HTTP_{other}"),
    }
}
