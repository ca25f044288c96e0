//! Wire types of the travel REST backend.
//!
//! The hotel catalog is served with Spanish field names; availability
//! results use camelCase English.

use serde::{Deserialize, Serialize};

// --- Catalog (GET /api/hotels) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportHub {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "distanciaKm", default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(rename = "tiempoMinutos", default, skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelLocation {
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "direccion", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "direccion2", default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(rename = "distrito", default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(rename = "codigoPostal", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelContact {
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelCoordinates {
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cadena", default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(rename = "estrellas", default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
    #[serde(rename = "categoryUnit", default, skip_serializing_if = "Option::is_none")]
    pub category_unit: Option<String>,
    /// `PROPERTY_TYPE_*`; absent means a plain hotel
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(rename = "ubicacion")]
    pub location: HotelLocation,
    #[serde(rename = "contacto", default)]
    pub contact: HotelContact,
    #[serde(rename = "coordenadas", default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<HotelCoordinates>,
    #[serde(rename = "transportHubs", default, skip_serializing_if = "Vec::is_empty")]
    pub transport_hubs: Vec<TransportHub>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "lastModified", default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelsResponse {
    pub hotels: Vec<Hotel>,
    #[serde(default)]
    pub total_hotels: usize,
    #[serde(default)]
    pub last_updated: Option<String>,
}

// --- Availability (POST /api/availability) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub start_date: String,
    pub end_date: String,
    pub adults: u32,
    pub currency: String,
    pub city_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub search_id: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPrice {
    /// Decimal amount as a string
    pub total: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomService {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHotelLocation {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomHotelContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomHotel {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RoomHotelLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<RoomHotelContact>,
}

/// A penalty window of a complex cancellation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPenalty {
    #[serde(default)]
    pub datetime_range: Option<PenaltyRange>,
    #[serde(default)]
    pub value: Option<PenaltyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyRange {
    pub start: ProtoTimestamp,
    pub end: ProtoTimestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtoTimestamp {
    /// Unix seconds, string-encoded
    pub seconds: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyValue {
    pub value: String,
    #[serde(default)]
    pub currency: Option<PenaltyCurrency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyCurrency {
    pub iso_currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelPenalties {
    #[serde(default)]
    pub cancel_penalties: Vec<CancelPenalty>,
}

/// Rooms carry either a simple refundable flag or the raw penalty schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CancellationPolicy {
    Simple {
        refundable: bool,
        #[serde(default)]
        deadline: Option<String>,
    },
    Complex {
        #[serde(default)]
        complex_cancel_penalties: Option<CancelPenalties>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_code: String,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_room_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel: Option<RoomHotel>,
    pub price: RoomPrice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<MealPlan>,
    #[serde(default)]
    pub beds: Vec<Bed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_units: Option<u32>,
    #[serde(default)]
    pub services: Vec<RoomService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<CancellationPolicy>,
}

// --- Health (GET /health) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}
