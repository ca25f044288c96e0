//! Details of one catalog property by code.

use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolOutput, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::accommodation_list::PropertySummary;
use crate::api::{TravelApi, TravelApiError};
use crate::to_payload;

pub struct AccommodationInfoTool {
    api: Arc<dyn TravelApi>,
}

impl AccommodationInfoTool {
    pub fn new(api: Arc<dyn TravelApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoInput {
    product_code: String,
}

/// The backend has no media, descriptions or room catalog; those stay empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertyInfo {
    property: PropertySummary,
    images: Vec<serde_json::Value>,
    videos: Vec<serde_json::Value>,
    localized_descriptions: Vec<serde_json::Value>,
    rooms: Vec<serde_json::Value>,
    attributes: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct InfoPayload {
    count: usize,
    properties: Vec<PropertyInfo>,
}

#[async_trait]
impl Tool for AccommodationInfoTool {
    fn name(&self) -> &str {
        "get_accommodation_info"
    }

    fn description(&self) -> &str {
        "[CATALOG] Get full details of ONE specific hotel by its code. Use when the user wants \
         more information about a hotel already identified. Requires productCode (obtained \
         from get_accommodation_list)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "productCode": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The hotel/accommodation code to retrieve"
                }
            },
            "required": ["productCode"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let input: InfoInput = parse_arguments(arguments)?;
        if input.product_code.trim().is_empty() {
            return Err(ToolError::InvalidArguments("productCode must not be empty".into()));
        }

        let hotel = match self.api.hotel(&input.product_code).await {
            Ok(hotel) => hotel,
            Err(e @ TravelApiError::Api { status: 404, .. }) => {
                tracing::debug!(code = %input.product_code, error = %e, "Hotel not found");
                return Ok(ToolOutput::failure(
                    "NOT_FOUND",
                    format!("Hotel with code '{}' was not found", input.product_code),
                ));
            }
            Err(e) => return Ok(e.to_output("The request timed out. Please try again later.")),
        };

        let payload = InfoPayload {
            count: 1,
            properties: vec![PropertyInfo {
                property: PropertySummary::from(hotel),
                images: Vec::new(),
                videos: Vec::new(),
                localized_descriptions: Vec::new(),
                rooms: Vec::new(),
                attributes: Vec::new(),
            }],
        };

        to_payload(self.name(), &payload)
    }
}
