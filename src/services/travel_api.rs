use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::models::flight::{FlightOffer, FlightSearchResponse};
use crate::models::hotel::{HotelOffersResponse, HotelSearchParams};
use crate::models::search::FlightSearchParams;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum TravelApiError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for TravelApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelApiError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            TravelApiError::HttpError(err) => write!(f, "HTTP error: {}", err),
            TravelApiError::ResponseError(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for TravelApiError {}

impl From<reqwest::Error> for TravelApiError {
    fn from(err: reqwest::Error) -> Self {
        TravelApiError::HttpError(err)
    }
}

/// Pricing-context wrapper the provider expects around a single offer
/// for seatmap and ancillary lookups.
#[derive(Debug, Serialize)]
pub struct PricingContext {
    pub data: PricingContextData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingContextData {
    #[serde(rename = "type")]
    pub kind: String,
    pub flight_offers: Vec<FlightOffer>,
}

impl PricingContext {
    pub fn for_offer(offer: FlightOffer) -> Self {
        PricingContext {
            data: PricingContextData {
                kind: "flight-offers-pricing".to_string(),
                flight_offers: vec![offer],
            },
        }
    }
}

/// Outbound flight search payload: the provider only takes the core
/// fields; passenger breakdown and cabin stay client-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderSearchRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_date: &'a str,
    adults: u32,
}

/// Thin wrapper over the travel-data backend: base URL, fixed 30s
/// timeout, request/response logging. One attempt per call, no retry.
#[derive(Clone)]
pub struct TravelApiClient {
    client: Client,
    base_url: String,
}

impl TravelApiClient {
    pub fn new() -> Result<Self, TravelApiError> {
        let base_url = env::var("TRAVEL_API_BASE_URL")
            .map_err(|_| TravelApiError::EnvironmentError("TRAVEL_API_BASE_URL not set".to_string()))?;
        Ok(Self::with_base_url(base_url))
    }

    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        TravelApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, TravelApiError> {
        let url = format!("{}{}", self.base_url, path);
        println!("[API REQUEST] POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        println!("[API RESPONSE] {} from {}", status, url);

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Travel data backend request failed")
                .to_string();
            eprintln!("[API ERROR] {} from {}: {}", status, url, message);
            return Err(TravelApiError::ResponseError(message));
        }

        Ok(response.json().await?)
    }

    pub async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> Result<FlightSearchResponse, TravelApiError> {
        let request = ProviderSearchRequest {
            origin: &params.origin,
            destination: &params.destination,
            departure_date: &params.departure_date,
            adults: params.adults,
        };
        let value = self.post_json("/flights/search", &request).await?;
        serde_json::from_value(value)
            .map_err(|err| TravelApiError::ResponseError(format!("Malformed search response: {}", err)))
    }

    /// Seatmap lookup for one offer. Provider-shaped payload is passed
    /// through untyped; callers pick out the deck/seat arrays.
    pub async fn get_seatmaps(&self, offer: FlightOffer) -> Result<Value, TravelApiError> {
        self.post_json("/flights/seatmaps", &PricingContext::for_offer(offer))
            .await
    }

    pub async fn get_ancillaries(&self, offer: FlightOffer) -> Result<Value, TravelApiError> {
        self.post_json("/flights/ancillaries", &PricingContext::for_offer(offer))
            .await
    }

    /// Hotel offers by city. Wired through but not production-ready.
    pub async fn search_hotels(
        &self,
        params: &HotelSearchParams,
    ) -> Result<HotelOffersResponse, TravelApiError> {
        let value = self.post_json("/hotels/offers-by-city", params).await?;
        serde_json::from_value(value)
            .map_err(|err| TravelApiError::ResponseError(format!("Malformed hotel response: {}", err)))
    }
}
