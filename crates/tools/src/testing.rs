//! Canned travel backend for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::api::{TravelApi, TravelApiError};
use crate::types::{
    AvailabilityRequest, AvailabilityResponse, HealthStatus, Hotel, HotelContact, HotelLocation,
    HotelsResponse,
};

#[derive(Default)]
pub(crate) struct StubTravelApi {
    hotels: Vec<Hotel>,
    availability: Option<AvailabilityResponse>,
    error: Option<TravelApiError>,
    requests: Mutex<Vec<AvailabilityRequest>>,
    refreshes: Mutex<Vec<bool>>,
}

impl StubTravelApi {
    pub fn with_hotels(hotels: Vec<Hotel>) -> Self {
        Self {
            hotels,
            ..Self::default()
        }
    }

    pub fn with_availability(response: AvailabilityResponse) -> Self {
        Self {
            availability: Some(response),
            ..Self::default()
        }
    }

    pub fn failing(error: TravelApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn availability_requests(&self) -> Vec<AvailabilityRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> Vec<bool> {
        self.refreshes.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), TravelApiError> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TravelApi for StubTravelApi {
    async fn hotels(&self, refresh: bool) -> Result<HotelsResponse, TravelApiError> {
        self.refreshes.lock().unwrap().push(refresh);
        self.check()?;
        Ok(HotelsResponse {
            hotels: self.hotels.clone(),
            total_hotels: self.hotels.len(),
            last_updated: Some("2026-10-01T00:00:00Z".into()),
        })
    }

    async fn hotel(&self, code: &str) -> Result<Hotel, TravelApiError> {
        self.check()?;
        self.hotels
            .iter()
            .find(|h| h.code == code)
            .cloned()
            .ok_or_else(|| TravelApiError::Api {
                status: 404,
                code: "NOT_FOUND".into(),
                message: "Hotel not found".into(),
            })
    }

    async fn search_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, TravelApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.check()?;
        Ok(self.availability.clone().unwrap_or(AvailabilityResponse {
            search_id: "empty".into(),
            rooms: Vec::new(),
        }))
    }

    async fn health(&self) -> Result<HealthStatus, TravelApiError> {
        self.check()?;
        Ok(HealthStatus {
            status: "ok".into(),
            service: None,
            version: None,
        })
    }
}

pub(crate) fn hotel(
    code: &str,
    name: &str,
    city: &str,
    region: Option<&str>,
    country: &str,
    stars: Option<u8>,
    property_type: Option<&str>,
) -> Hotel {
    Hotel {
        code: code.into(),
        name: name.into(),
        chain: None,
        stars,
        category_unit: None,
        property_type: property_type.map(String::from),
        location: HotelLocation {
            city: city.into(),
            region: region.map(String::from),
            country: country.into(),
            address: None,
            address2: None,
            district: None,
            postal_code: None,
        },
        contact: HotelContact::default(),
        coordinates: None,
        transport_hubs: Vec::new(),
        status: None,
        last_modified: None,
    }
}
