use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::booking::ExtrasTab;
use crate::models::flight::{parse_flight_time, FlightOffer, Itinerary};
use crate::services::travel_api::TravelApiClient;

/// Combined payload for the extras view. Each side is fetched
/// independently; a failed fetch leaves that side None and the tab
/// renders its "unavailable" state.
#[derive(Debug, Serialize)]
pub struct ExtrasBundle {
    pub seatmap: Option<Value>,
    pub ancillaries: Option<Value>,
}

/// Fetch seat map and ancillaries concurrently. A failure in one call
/// never blocks the other; both are captured and logged.
pub async fn fetch_extras(api: &TravelApiClient, offer: FlightOffer) -> ExtrasBundle {
    let (seatmap, ancillaries) = tokio::join!(
        api.get_seatmaps(offer.clone()),
        api.get_ancillaries(offer)
    );

    let seatmap = match seatmap {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Seatmap fetch error: {}", err);
            None
        }
    };
    let ancillaries = match ancillaries {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Ancillary fetch error: {}", err);
            None
        }
    };

    ExtrasBundle { seatmap, ancillaries }
}

// --- Seat map -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapResponse {
    #[serde(default)]
    pub data: Vec<SeatMapDeckList>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapDeckList {
    #[serde(default)]
    pub decks: Vec<Deck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub seats: Vec<Seat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub number: String,
    #[serde(default)]
    pub characteristics_codes: Vec<String>,
    #[serde(default)]
    pub traveler_pricing: Vec<SeatPricing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPricing {
    pub seat_availability_status: String,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.traveler_pricing
            .first()
            .map_or(false, |p| p.seat_availability_status == "AVAILABLE")
    }
}

/// Parse decks out of a provider seatmap payload. Missing structure is
/// a data-shape problem, not an error: an empty list means the seats
/// tab shows "unavailable".
pub fn parse_decks(seatmap: &Value) -> Vec<Deck> {
    match serde_json::from_value::<SeatMapResponse>(seatmap.clone()) {
        Ok(response) => response
            .data
            .into_iter()
            .next()
            .map(|d| d.decks)
            .unwrap_or_default(),
        Err(err) => {
            eprintln!("Seatmap data not structured as expected: {}", err);
            Vec::new()
        }
    }
}

// --- Layovers -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layover {
    /// Airport where the wait happens (arrival of the earlier segment).
    pub airport: String,
    pub minutes: i64,
    /// "Xh Ym", clamped at zero.
    pub display: String,
    /// Set when segments overlap or the gap is zero; the provider sent
    /// inconsistent times and we refuse to show negative waits.
    pub data_warning: bool,
}

pub fn format_wait(minutes: i64) -> String {
    let clamped = minutes.max(0);
    format!("{}h {}m", clamped / 60, clamped % 60)
}

/// Wait times between consecutive segments of an itinerary: next
/// departure minus current arrival, in minutes.
pub fn layovers(itinerary: &Itinerary) -> Vec<Layover> {
    itinerary
        .segments
        .windows(2)
        .filter_map(|pair| {
            let arrival = parse_flight_time(&pair[0].arrival.at)?;
            let departure = parse_flight_time(&pair[1].departure.at)?;
            let minutes = (departure - arrival).num_minutes();
            Some(Layover {
                airport: pair[0].arrival.iata_code.clone(),
                minutes: minutes.max(0),
                display: format_wait(minutes),
                data_warning: minutes <= 0,
            })
        })
        .collect()
}

// --- Selection state ----------------------------------------------------

/// Transient selection state while the extras view is open: current
/// tab, at most one seat, at most one meal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtrasSession {
    pub tab: ExtrasTab,
    pub seat: Option<Seat>,
    pub meal: Option<String>,
}

/// What the footer "continue" action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(ExtrasTab),
    Finalized,
}

impl ExtrasSession {
    pub fn new(tab: ExtrasTab) -> Self {
        ExtrasSession {
            tab,
            ..Default::default()
        }
    }

    /// Selecting an unavailable seat is a no-op; selecting an available
    /// one replaces any prior choice.
    pub fn select_seat(&mut self, seat: &Seat) {
        if seat.is_available() {
            self.seat = Some(seat.clone());
        }
    }

    pub fn select_meal(&mut self, meal: &str) {
        self.meal = Some(meal.to_string());
    }

    /// Details -> Seats -> Meals -> Passenger; the passenger tab is the
    /// terminal step and finalizes instead of moving on.
    pub fn advance(&mut self) -> Advance {
        let next = match self.tab {
            ExtrasTab::Details => ExtrasTab::Seats,
            ExtrasTab::Seats => ExtrasTab::Meals,
            ExtrasTab::Meals => ExtrasTab::Passenger,
            ExtrasTab::Passenger => return Advance::Finalized,
        };
        self.tab = next;
        Advance::Moved(next)
    }
}
