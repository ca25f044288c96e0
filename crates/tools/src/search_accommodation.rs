//! Live availability search: dates, guests, destination to priced rooms.

use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolOutput, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::TravelApi;
use crate::dates::{nights, parse_stay_date};
use crate::locations::{country_for_city, resolve_city_code};
use crate::to_payload;
use crate::types::{AvailabilityRequest, CancellationPolicy, Room};

const MAX_GUESTS: i64 = 20;

pub struct SearchAccommodationTool {
    api: Arc<dyn TravelApi>,
}

impl SearchAccommodationTool {
    pub fn new(api: Arc<dyn TravelApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput {
    destination: String,
    check_in: String,
    check_out: String,
    #[serde(default = "default_guests")]
    guests: i64,
    #[serde(default = "default_rooms")]
    rooms: u32,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_guests() -> i64 {
    2
}
fn default_rooms() -> u32 {
    1
}
fn default_currency() -> String {
    "EUR".into()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload {
    search_id: String,
    expires_at: Option<String>,
    results_count: usize,
    results: Vec<RoomResult>,
    travellers: Vec<Traveller>,
}

#[derive(Debug, Serialize)]
struct Traveller {
    id: i64,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomResult {
    result_id: String,
    hotel_code: Option<String>,
    hotel: Option<HotelSummary>,
    room_code: String,
    room_name: String,
    original_room_name: Option<String>,
    total_price: Money,
    nights: i64,
    price_per_night: f64,
    refundable: bool,
    cancellation_deadline: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cancellation_penalties: Vec<Penalty>,
    bookability: &'static str,
    meal_plan: Option<String>,
    meal_plan_description: Option<String>,
    beds: Vec<crate::types::Bed>,
    remaining_units: Option<u32>,
    services: Vec<crate::types::RoomService>,
}

#[derive(Debug, Serialize)]
struct Money {
    amount: f64,
    currency: String,
}

#[derive(Debug, Serialize)]
struct Penalty {
    from: String,
    to: String,
    amount: f64,
    currency: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HotelSummary {
    code: String,
    name: String,
    stars: Option<u8>,
    chain: Option<String>,
    location: Option<LocationSummary>,
    contact: Option<crate::types::RoomHotelContact>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationSummary {
    city: String,
    region: Option<String>,
    country: String,
    address: Option<String>,
    postal_code: Option<String>,
    coordinates: Option<serde_json::Value>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn unix_to_iso(seconds: &str) -> String {
    seconds
        .parse::<i64>()
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Refundability, deadline and penalty windows of a room's policy.
fn cancellation_terms(policy: Option<&CancellationPolicy>) -> (bool, Option<String>, Vec<Penalty>) {
    match policy {
        None => (true, None, Vec::new()),
        Some(CancellationPolicy::Simple { refundable, deadline }) => {
            (*refundable, deadline.clone(), Vec::new())
        }
        Some(CancellationPolicy::Complex { complex_cancel_penalties }) => {
            let penalties: Vec<Penalty> = complex_cancel_penalties
                .iter()
                .flat_map(|p| p.cancel_penalties.iter())
                .map(|p| Penalty {
                    from: p.datetime_range.as_ref().map(|r| unix_to_iso(&r.start.seconds)).unwrap_or_default(),
                    to: p.datetime_range.as_ref().map(|r| unix_to_iso(&r.end.seconds)).unwrap_or_default(),
                    amount: p.value.as_ref().and_then(|v| v.value.parse().ok()).unwrap_or(0.0),
                    currency: p
                        .value
                        .as_ref()
                        .and_then(|v| v.currency.as_ref())
                        .map(|c| c.iso_currency.trim_start_matches("ISO_CURRENCY_").to_string())
                        .unwrap_or_else(|| "EUR".into()),
                })
                .collect();
            (!penalties.is_empty(), None, penalties)
        }
    }
}

fn format_room(room: Room, nights: i64) -> RoomResult {
    let total: f64 = room.price.total.parse().unwrap_or(0.0);
    let price_per_night = if nights > 0 {
        round_cents(total / nights as f64)
    } else {
        total
    };
    let (refundable, cancellation_deadline, cancellation_penalties) =
        cancellation_terms(room.cancellation_policy.as_ref());

    let hotel_code = room
        .hotel
        .as_ref()
        .map(|h| h.code.clone())
        .or(room.hotel_code.clone());

    let hotel = room.hotel.map(|h| HotelSummary {
        code: h.code,
        name: h.name,
        stars: h.stars,
        chain: h.chain,
        location: h.location.map(|l| LocationSummary {
            city: l.city,
            region: l.region,
            country: l.country,
            address: l.address,
            postal_code: l.postal_code,
            coordinates: l.coordinates,
        }),
        contact: h.contact,
    });

    let (meal_plan, meal_plan_description) = match room.meal_plan {
        Some(plan) => (Some(plan.code), Some(plan.description).filter(|d| !d.is_empty())),
        None => (None, None),
    };

    RoomResult {
        result_id: room.room_code.clone(),
        hotel_code,
        hotel,
        room_code: room.room_code,
        room_name: room.room_name,
        original_room_name: room.original_room_name,
        total_price: Money {
            amount: total,
            currency: room.price.currency,
        },
        nights,
        price_per_night,
        refundable,
        cancellation_deadline,
        cancellation_penalties,
        bookability: "immediate",
        meal_plan,
        meal_plan_description,
        beds: room.beds,
        remaining_units: room.remaining_units,
        services: room.services,
    }
}

#[async_trait]
impl Tool for SearchAccommodationTool {
    fn name(&self) -> &str {
        "search_accommodation"
    }

    fn description(&self) -> &str {
        "[LIVE SEARCH] Search accommodation with real-time AVAILABILITY and current prices. \
         Use whenever the user mentions availability, prices, explicit or relative dates \
         (\"next week\", \"tomorrow\", \"this weekend\"), a number of guests, or wants to book. \
         Requires checkIn and checkOut as YYYY-MM-DD; convert relative dates to absolute ones. \
         Returns a searchId plus priced room options."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "Destination city name or city code (e.g., \"Madrid\", \"MAD\", \"Barcelona\", \"BCN\")"
                },
                "checkIn": {
                    "type": "string",
                    "description": "Check-in date (YYYY-MM-DD)"
                },
                "checkOut": {
                    "type": "string",
                    "description": "Check-out date (YYYY-MM-DD)"
                },
                "guests": {
                    "type": "integer",
                    "description": "Number of guests",
                    "default": 2
                },
                "rooms": {
                    "type": "integer",
                    "description": "Number of rooms",
                    "default": 1
                },
                "currency": {
                    "type": "string",
                    "description": "Currency code (EUR, USD, GBP)",
                    "default": "EUR"
                }
            },
            "required": ["destination", "checkIn", "checkOut"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let input: SearchInput = parse_arguments(arguments)?;

        let Some(check_in) = parse_stay_date(&input.check_in) else {
            return Ok(ToolOutput::failure(
                "INVALID_DATE_FORMAT",
                "Check-in date must be in YYYY-MM-DD format",
            ));
        };
        let Some(check_out) = parse_stay_date(&input.check_out) else {
            return Ok(ToolOutput::failure(
                "INVALID_DATE_FORMAT",
                "Check-out date must be in YYYY-MM-DD format",
            ));
        };
        if check_out <= check_in {
            return Ok(ToolOutput::failure(
                "INVALID_DATE_RANGE",
                "Check-out date must be after check-in date",
            ));
        }
        if !(1..=MAX_GUESTS).contains(&input.guests) {
            return Ok(ToolOutput::failure(
                "INVALID_GUESTS",
                "Number of guests must be between 1 and 20",
            ));
        }

        let city = resolve_city_code(&input.destination);
        let Some((city_code, country_code)) = city.and_then(|c| country_for_city(c).map(|k| (c, k))) else {
            return Ok(ToolOutput::failure(
                "INVALID_DESTINATION",
                format!(
                    "Unknown destination: \"{}\". Please use a valid city name (e.g., Madrid, Barcelona, Paris) or city code (e.g., MAD, BCN, PAR).",
                    input.destination
                ),
            ));
        };

        debug!(
            city_code,
            guests = input.guests,
            rooms = input.rooms,
            "Searching accommodation"
        );

        let request = AvailabilityRequest {
            start_date: input.check_in.clone(),
            end_date: input.check_out.clone(),
            adults: input.guests as u32,
            currency: input.currency,
            city_code: city_code.into(),
            country_code: country_code.into(),
        };

        let response = match self.api.search_availability(&request).await {
            Ok(response) => response,
            Err(e) => {
                return Ok(e.to_output(
                    "The search request timed out. Try reducing the date range or try again later.",
                ));
            }
        };

        let stay = nights(check_in, check_out);
        let results: Vec<RoomResult> = response
            .rooms
            .into_iter()
            .map(|room| format_room(room, stay))
            .collect();

        let payload = SearchPayload {
            search_id: response.search_id,
            expires_at: None,
            results_count: results.len(),
            results,
            travellers: (0..input.guests)
                .map(|id| Traveller { id, kind: "adult" })
                .collect(),
        };

        to_payload(self.name(), &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TravelApiError;
    use crate::testing::StubTravelApi;
    use crate::types::AvailabilityResponse;

    fn room(code: &str, total: &str) -> Room {
        serde_json::from_value(serde_json::json!({
            "roomCode": code,
            "roomName": "Double Superior",
            "hotel": {
                "code": "H-MAD-1",
                "name": "Hotel Prado",
                "stars": 4,
                "location": {"city": "Madrid", "country": "ES"}
            },
            "price": {"total": total, "currency": "EUR"},
            "mealPlan": {"code": "BB", "description": "Bed and breakfast"}
        }))
        .unwrap()
    }

    fn tool_with(api: StubTravelApi) -> (SearchAccommodationTool, Arc<StubTravelApi>) {
        let api = Arc::new(api);
        (SearchAccommodationTool::new(api.clone()), api)
    }

    fn failure_code(output: &ToolOutput) -> &str {
        match output {
            ToolOutput::Failure { code, .. } => code,
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_search() {
        let (tool, api) = tool_with(StubTravelApi::with_availability(AvailabilityResponse {
            search_id: "abc".into(),
            rooms: vec![room("R1", "300.00"), room("R2", "450.50")],
        }));

        let output = tool
            .execute(serde_json::json!({
                "destination": "Madrid",
                "checkIn": "2026-11-02",
                "checkOut": "2026-11-05"
            }))
            .await
            .unwrap();

        let value = output.structured().unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["searchId"], "abc");
        assert_eq!(value["resultsCount"], 2);
        assert_eq!(value["results"][0]["resultId"], "R1");
        assert_eq!(value["results"][0]["hotelCode"], "H-MAD-1");
        assert_eq!(value["results"][0]["nights"], 3);
        assert_eq!(value["results"][0]["pricePerNight"], 100.0);
        assert_eq!(value["results"][1]["pricePerNight"], 150.17);
        assert_eq!(value["results"][0]["mealPlan"], "BB");
        assert_eq!(value["results"][0]["refundable"], true);
        assert_eq!(value["travellers"].as_array().unwrap().len(), 2);

        let sent = api.availability_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].city_code, "MAD");
        assert_eq!(sent[0].country_code, "ES");
        assert_eq!(sent[0].adults, 2);
        assert_eq!(sent[0].currency, "EUR");
    }

    #[tokio::test]
    async fn bad_date_format() {
        let (tool, api) = tool_with(StubTravelApi::default());
        let output = tool
            .execute(serde_json::json!({
                "destination": "Madrid",
                "checkIn": "02/11/2026",
                "checkOut": "2026-11-05"
            }))
            .await
            .unwrap();
        assert_eq!(failure_code(&output), "INVALID_DATE_FORMAT");
        assert!(api.availability_requests().is_empty());
    }

    #[tokio::test]
    async fn checkout_before_checkin() {
        let (tool, _) = tool_with(StubTravelApi::default());
        let output = tool
            .execute(serde_json::json!({
                "destination": "Madrid",
                "checkIn": "2026-11-05",
                "checkOut": "2026-11-05"
            }))
            .await
            .unwrap();
        assert_eq!(failure_code(&output), "INVALID_DATE_RANGE");
    }

    #[tokio::test]
    async fn guests_out_of_range() {
        let (tool, _) = tool_with(StubTravelApi::default());
        for guests in [0, 21] {
            let output = tool
                .execute(serde_json::json!({
                    "destination": "Madrid",
                    "checkIn": "2026-11-02",
                    "checkOut": "2026-11-05",
                    "guests": guests
                }))
                .await
                .unwrap();
            assert_eq!(failure_code(&output), "INVALID_GUESTS");
        }
    }

    #[tokio::test]
    async fn unknown_destination() {
        let (tool, _) = tool_with(StubTravelApi::default());
        let output = tool
            .execute(serde_json::json!({
                "destination": "Atlantis",
                "checkIn": "2026-11-02",
                "checkOut": "2026-11-05"
            }))
            .await
            .unwrap();
        assert_eq!(failure_code(&output), "INVALID_DESTINATION");
    }

    #[tokio::test]
    async fn backend_timeout_becomes_failure() {
        let (tool, _) = tool_with(StubTravelApi::failing(TravelApiError::Timeout("slow".into())));
        let output = tool
            .execute(serde_json::json!({
                "destination": "BCN",
                "checkIn": "2026-11-02",
                "checkOut": "2026-11-05"
            }))
            .await
            .unwrap();
        assert_eq!(failure_code(&output), "TIMEOUT");
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid() {
        let (tool, _) = tool_with(StubTravelApi::default());
        let err = tool
            .execute(serde_json::json!({"destination": "Madrid"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn complex_policy_lists_penalties() {
        let policy: CancellationPolicy = serde_json::from_value(serde_json::json!({
            "complex_cancel_penalties": {"cancel_penalties": [{
                "datetime_range": {"start": {"seconds": "0"}, "end": {"seconds": "86400"}},
                "value": {"value": "25.5", "currency": {"iso_currency": "ISO_CURRENCY_USD"}}
            }]}
        }))
        .unwrap();
        let (refundable, deadline, penalties) = cancellation_terms(Some(&policy));
        assert!(refundable);
        assert!(deadline.is_none());
        assert_eq!(penalties[0].from, "1970-01-01T00:00:00.000Z");
        assert_eq!(penalties[0].to, "1970-01-02T00:00:00.000Z");
        assert_eq!(penalties[0].amount, 25.5);
        assert_eq!(penalties[0].currency, "USD");
    }
}
