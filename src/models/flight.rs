use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single flight offer as returned by the travel-data provider.
/// Fields the provider may omit are explicit Options so nothing in the
/// pipeline has to reach into untyped JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    pub itineraries: Vec<Itinerary>,
    pub price: Price,
    #[serde(default)]
    pub validating_airline_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler_pricings: Option<Vec<TravelerPricing>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// ISO-8601 duration, e.g. "PT7H30M".
    pub duration: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub carrier_code: String,
    pub number: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    /// Provider timestamp, local time without offset: "2026-03-20T08:15:00".
    pub at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub currency: String,
    /// Decimal string, e.g. "50000.00". Kept as received.
    pub total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    #[serde(default)]
    pub fare_details_by_segment: Vec<FareDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_checked_bags: Option<CheckedBags>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedBags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
}

/// Provider search response: the offer list plus lookup dictionaries
/// (carrier code -> display name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSearchResponse {
    #[serde(default)]
    pub data: Vec<FlightOffer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionaries: Option<Dictionaries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionaries {
    #[serde(default)]
    pub carriers: HashMap<String, String>,
}

impl FlightOffer {
    pub fn first_itinerary(&self) -> Option<&Itinerary> {
        self.itineraries.first()
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.itineraries.first().and_then(|i| i.segments.first())
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.itineraries.first().and_then(|i| i.segments.last())
    }

    /// Displayed origin is the first segment's departure code.
    pub fn origin(&self) -> Option<&str> {
        self.first_segment().map(|s| s.departure.iata_code.as_str())
    }

    /// Displayed destination is the last segment's arrival code.
    pub fn destination(&self) -> Option<&str> {
        self.last_segment().map(|s| s.arrival.iata_code.as_str())
    }

    pub fn raw_total(&self) -> f64 {
        self.price.total.parse().unwrap_or(0.0)
    }

    /// Checked-baggage allowance on the first segment, if priced.
    pub fn first_segment_bags(&self) -> Option<&CheckedBags> {
        self.traveler_pricings
            .as_ref()
            .and_then(|tp| tp.first())
            .and_then(|tp| tp.fare_details_by_segment.first())
            .and_then(|fd| fd.included_checked_bags.as_ref())
    }
}

impl CheckedBags {
    pub fn has_allowance(&self) -> bool {
        self.quantity.unwrap_or(0) > 0 || self.weight.unwrap_or(0.0) > 0.0
    }
}

/// Offer enriched with the markup applied at render time. The base
/// price never changes once the offer is fetched; only the adjustment
/// and the derived total move with the live markup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOffer {
    #[serde(flatten)]
    pub offer: FlightOffer,
    pub base_price: f64,
    /// Percentage markup in effect when this response was built.
    pub adjustment: f64,
    pub display_total: f64,
}

impl DisplayOffer {
    pub fn from_offer(offer: FlightOffer, markup: f64) -> Self {
        let base_price = offer.raw_total();
        // Multiply before dividing so round percentages stay exact:
        // 50000 at 130% must display 115000, not 114999.99999999999.
        let display_total = base_price * (100.0 + markup) / 100.0;
        DisplayOffer {
            offer,
            base_price,
            adjustment: markup,
            display_total,
        }
    }
}

/// Provider timestamps come without a zone offset; some gateways add
/// one. Accept both.
pub fn parse_flight_time(at: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(at)
                .map(|dt| dt.naive_local())
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(code: &str, at: &str) -> FlightEndpoint {
        FlightEndpoint {
            iata_code: code.to_string(),
            at: at.to_string(),
            terminal: None,
        }
    }

    fn segment(from: (&str, &str), to: (&str, &str)) -> Segment {
        Segment {
            departure: endpoint(from.0, from.1),
            arrival: endpoint(to.0, to.1),
            carrier_code: "AI".to_string(),
            number: "101".to_string(),
            duration: "PT2H".to_string(),
        }
    }

    fn offer(total: &str, segments: Vec<Segment>) -> FlightOffer {
        FlightOffer {
            id: "1".to_string(),
            itineraries: vec![Itinerary {
                duration: "PT3H".to_string(),
                segments,
            }],
            price: Price {
                currency: "INR".to_string(),
                total: total.to_string(),
            },
            validating_airline_codes: vec![],
            traveler_pricings: None,
        }
    }

    #[test]
    fn origin_and_destination_span_all_segments() {
        let o = offer(
            "50000",
            vec![
                segment(("DEL", "2026-03-20T08:00:00"), ("BOM", "2026-03-20T10:00:00")),
                segment(("BOM", "2026-03-20T12:00:00"), ("GOI", "2026-03-20T13:00:00")),
            ],
        );
        assert_eq!(o.origin(), Some("DEL"));
        assert_eq!(o.destination(), Some("GOI"));
    }

    #[test]
    fn display_offer_keeps_base_price_under_markup() {
        let display = DisplayOffer::from_offer(offer("50000", vec![]), 130.0);
        assert_eq!(display.base_price, 50000.0);
        assert_eq!(display.display_total, 115000.0);
    }

    #[test]
    fn parses_offsetless_provider_timestamps() {
        let t = parse_flight_time("2026-03-20T08:15:00").unwrap();
        assert_eq!(t.format("%H:%M").to_string(), "08:15");
        assert!(parse_flight_time("not a date").is_none());
    }

    #[test]
    fn baggage_allowance_checks_quantity_and_weight() {
        let by_quantity = CheckedBags {
            quantity: Some(1),
            weight: None,
            weight_unit: None,
        };
        let by_weight = CheckedBags {
            quantity: None,
            weight: Some(20.0),
            weight_unit: Some("KG".to_string()),
        };
        let none = CheckedBags {
            quantity: Some(0),
            weight: Some(0.0),
            weight_unit: None,
        };
        assert!(by_quantity.has_allowance());
        assert!(by_weight.has_allowance());
        assert!(!none.has_allowance());
    }
}
