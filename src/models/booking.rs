use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::flight::FlightOffer;

/// Which extras tab a selection should open on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrasTab {
    Details,
    Seats,
    Meals,
    Passenger,
}

impl Default for ExtrasTab {
    fn default() -> Self {
        ExtrasTab::Details
    }
}

/// The chosen offer plus the tab to open, handed from search results
/// to the payment and ticket views. Stored server-side under a
/// short-lived id rather than in browser storage, so a stale blob from
/// a previous session can never leak into a new booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedFlight {
    pub offer: FlightOffer,
    #[serde(default)]
    pub tab: ExtrasTab,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub selection_id: String,
    pub selected: SelectedFlight,
    pub user_id: Option<ObjectId>,
    pub status: String,
    /// Set at payment time, printed on the ticket.
    pub passenger_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Audit row written when a traveler picks an offer. Best-effort only.
#[derive(Debug, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub flight_details: BookedFlightDetails,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookedFlightDetails {
    pub offer_id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub price: String,
    pub currency: String,
}

/// Usage-analytics row written on every search. Best-effort only.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub search_params: crate::models::search::FlightSearchParams,
    pub created_at: Option<DateTime<Utc>>,
}

/// Singleton configuration row backing the live markup.
#[derive(Debug, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub markup_value: f64,
    pub updated_at: Option<DateTime<Utc>>,
}
