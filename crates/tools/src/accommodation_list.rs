//! Static hotel catalog browsing. No dates, no prices.

use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolOutput, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::TravelApi;
use crate::locations::normalize;
use crate::to_payload;
use crate::types::Hotel;

pub struct AccommodationListTool {
    api: Arc<dyn TravelApi>,
}

impl AccommodationListTool {
    pub fn new(api: Arc<dyn TravelApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PropertyType {
    Hotel,
    Apartment,
    Hostel,
    Resort,
    Villa,
    Guesthouse,
    Bnb,
}

impl PropertyType {
    /// Backend `PROPERTY_TYPE_*` values that count as this type.
    fn backend_types(self) -> &'static [&'static str] {
        match self {
            PropertyType::Hotel => &["PROPERTY_TYPE_HOTEL", "PROPERTY_TYPE_UNSPECIFIED"],
            PropertyType::Apartment => &["PROPERTY_TYPE_APARTMENT", "PROPERTY_TYPE_APARTHOTEL"],
            PropertyType::Hostel => &["PROPERTY_TYPE_HOSTEL"],
            PropertyType::Resort => &["PROPERTY_TYPE_RESORT"],
            PropertyType::Villa => &["PROPERTY_TYPE_VILLA"],
            PropertyType::Guesthouse => &[
                "PROPERTY_TYPE_GUESTHOUSE",
                "PROPERTY_TYPE_BED_AND_BREAKFAST",
            ],
            PropertyType::Bnb => &["PROPERTY_TYPE_BED_AND_BREAKFAST"],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInput {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    min_stars: Option<u8>,
    #[serde(default)]
    max_stars: Option<u8>,
    #[serde(default)]
    property_type: Option<PropertyType>,
    #[serde(default)]
    refresh: bool,
}

impl ListInput {
    fn validate(&self) -> Result<(), ToolError> {
        for (field, stars) in [("minStars", self.min_stars), ("maxStars", self.max_stars)] {
            if let Some(s) = stars
                && !(1..=5).contains(&s)
            {
                return Err(ToolError::InvalidArguments(format!(
                    "{field} must be between 1 and 5, got {s}"
                )));
            }
        }
        Ok(())
    }

    fn matches(&self, hotel: &Hotel) -> bool {
        if let Some(location) = &self.location {
            let term = normalize(location);
            let hit = normalize(&hotel.location.city).contains(&term)
                || normalize(hotel.location.region.as_deref().unwrap_or("")).contains(&term)
                || normalize(&hotel.location.country).contains(&term);
            if !hit {
                return false;
            }
        }

        let stars = hotel.stars.unwrap_or(0);
        if self.min_stars.is_some_and(|min| stars < min) {
            return false;
        }
        if self.max_stars.is_some_and(|max| stars > max) {
            return false;
        }

        if let Some(kind) = self.property_type {
            let actual = hotel.property_type.as_deref().unwrap_or("PROPERTY_TYPE_HOTEL");
            if !kind.backend_types().contains(&actual) {
                return false;
            }
        }

        true
    }
}

// --- Model-facing property shape, shared with accommodation_info ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PropertySummary {
    supplier_code: SupplierCode,
    name: String,
    chain: Option<String>,
    #[serde(rename = "type")]
    property_type: String,
    status: String,
    category_rating: Option<u8>,
    category_unit: String,
    coordinates: Option<Coordinates>,
    last_modified: Option<String>,
    contact_info: ContactInfo,
    contact: Contact,
    transport_hubs: Vec<Hub>,
    product_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SupplierCode {
    code: String,
    number: u32,
}

#[derive(Debug, Serialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactInfo {
    country: String,
    city: String,
    region: Option<String>,
    zip_code: Option<String>,
    line1: Option<String>,
    line2: Option<String>,
    district: Option<String>,
}

#[derive(Debug, Serialize)]
struct Contact {
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Hub {
    location_code: String,
    location_type: String,
    distance_km: Option<f64>,
    time_minutes: Option<u32>,
}

impl From<Hotel> for PropertySummary {
    fn from(hotel: Hotel) -> Self {
        Self {
            supplier_code: SupplierCode {
                code: hotel.code,
                number: 0,
            },
            name: hotel.name,
            chain: hotel.chain,
            property_type: hotel
                .property_type
                .unwrap_or_else(|| "PROPERTY_TYPE_HOTEL".into()),
            status: hotel
                .status
                .unwrap_or_else(|| "PRODUCT_STATUS_ACTIVATED".into()),
            category_rating: hotel.stars,
            category_unit: hotel
                .category_unit
                .unwrap_or_else(|| "CATEGORY_UNIT_STARS".into()),
            coordinates: hotel.coordinates.map(|c| Coordinates {
                latitude: c.latitude,
                longitude: c.longitude,
            }),
            last_modified: hotel.last_modified,
            contact_info: ContactInfo {
                country: hotel.location.country,
                city: hotel.location.city,
                region: hotel.location.region,
                zip_code: hotel.location.postal_code,
                line1: hotel.location.address,
                line2: hotel.location.address2,
                district: hotel.location.district,
            },
            contact: Contact {
                phone: hotel.contact.phone,
                email: hotel.contact.email,
                website: hotel.contact.website,
            },
            transport_hubs: hotel
                .transport_hubs
                .into_iter()
                .map(|h| Hub {
                    location_code: h.code,
                    location_type: h.kind,
                    distance_km: h.distance_km,
                    time_minutes: h.time_minutes,
                })
                .collect(),
            product_codes: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListPayload {
    count: usize,
    last_updated: Option<String>,
    properties: Vec<PropertySummary>,
}

#[async_trait]
impl Tool for AccommodationListTool {
    fn name(&self) -> &str {
        "get_accommodation_list"
    }

    fn description(&self) -> &str {
        "[STATIC CATALOG] Browse the supplier's hotel list. NO availability, NO prices, NO dates. \
         Only use when the user asks which hotels exist or explores categories, types or star \
         ratings without any time reference. Never use when the user mentions availability, \
         dates (explicit or relative), prices, or a number of guests."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location filter (city, region, or country). Example: \"Mallorca\", \"Barcelona\", \"Spain\""
                },
                "minStars": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 5,
                    "description": "Minimum star rating (1-5)"
                },
                "maxStars": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 5,
                    "description": "Maximum star rating (1-5)"
                },
                "propertyType": {
                    "type": "string",
                    "enum": ["hotel", "apartment", "hostel", "resort", "villa", "guesthouse", "bnb"],
                    "description": "Filter by property type"
                },
                "refresh": {
                    "type": "boolean",
                    "default": false,
                    "description": "Force refresh from source (default: false, uses cache)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let input: ListInput = parse_arguments(arguments)?;
        input.validate()?;

        let catalog = match self.api.hotels(input.refresh).await {
            Ok(catalog) => catalog,
            Err(e) => return Ok(e.to_output("The request timed out. Please try again later.")),
        };

        let properties: Vec<PropertySummary> = catalog
            .hotels
            .into_iter()
            .filter(|h| input.matches(h))
            .map(PropertySummary::from)
            .collect();

        let payload = ListPayload {
            count: properties.len(),
            last_updated: catalog.last_updated,
            properties,
        };

        to_payload(self.name(), &payload)
    }
}
