//! Travel tools for Concierge.
//!
//! Three read-only tools over the hotel backend: live availability search,
//! catalog browsing, and single-property details. All of them reach the
//! backend through a [`TravelApi`], so the agent can be exercised against a
//! canned implementation.

pub mod accommodation_info;
pub mod accommodation_list;
pub mod api;
pub mod dates;
pub mod locations;
pub mod rest_client;
pub mod search_accommodation;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use concierge_core::error::ToolError;
use concierge_core::tool::{ToolOutput, ToolRegistry};
use std::sync::Arc;

pub use accommodation_info::AccommodationInfoTool;
pub use accommodation_list::AccommodationListTool;
pub use api::{TravelApi, TravelApiError};
pub use rest_client::RestTravelClient;
pub use search_accommodation::SearchAccommodationTool;

/// Registry with every travel tool, in the order the model sees them.
pub fn travel_registry(api: Arc<dyn TravelApi>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchAccommodationTool::new(api.clone())));
    registry.register(Box::new(AccommodationListTool::new(api.clone())));
    registry.register(Box::new(AccommodationInfoTool::new(api)));
    registry
}

/// Serialize a tool's typed payload into a success output.
pub(crate) fn to_payload<T: serde::Serialize>(
    tool_name: &str,
    payload: &T,
) -> Result<ToolOutput, ToolError> {
    serde_json::to_value(payload)
        .map(ToolOutput::success)
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: e.to_string(),
        })
}
