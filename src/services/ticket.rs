use chrono::{NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::models::flight::{parse_flight_time, FlightOffer};
use crate::services::filter_engine::parse_iso_duration;

/// Fixed tax rate applied at payment time: 26.5% of the base fare.
pub const TAX_RATE: f64 = 0.265;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub currency: String,
    pub base_fare: f64,
    pub taxes: f64,
    pub total: f64,
}

impl PaymentSummary {
    pub fn from_offer(offer: &FlightOffer) -> Self {
        let base_fare = offer.raw_total();
        let taxes = base_fare * TAX_RATE;
        PaymentSummary {
            currency: offer.price.currency.clone(),
            base_fare,
            taxes,
            total: base_fare + taxes,
        }
    }
}

/// Screen layout: the interactive boarding-pass card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardingPass {
    pub pnr: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops_label: String,
    pub seat: String,
    pub airline: String,
}

/// Print layout: the formal e-ticket document. Same source selection,
/// different fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ETicket {
    pub ticket_number: String,
    pub agency_reference: String,
    pub pnr: String,
    pub date_of_issue: String,
    pub passenger_name: String,
    pub segments: Vec<TicketSegment>,
    pub summary: PaymentSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSegment {
    pub carrier: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
}

/// Both layouts in one response; the client picks per output medium.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBundle {
    pub boarding_pass: BoardingPass,
    pub e_ticket: ETicket,
}

pub fn generate_pnr() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
        .collect()
}

pub fn generate_ticket_number() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..10).map(|_| char::from(rng.gen_range(b'0'..=b'9'))).collect();
    format!("098{}", digits)
}

fn generate_agency_ref() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            char::from(CHARSET[rng.gen_range(0..CHARSET.len())])
        })
        .collect()
}

/// "PT7H30M" -> "7h 30m".
pub fn format_duration(iso: &str) -> String {
    let minutes = parse_iso_duration(iso);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn fmt_date(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%d %b %y").to_string()).unwrap_or_default()
}

fn fmt_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}

fn stops_label(segment_count: usize) -> String {
    match segment_count.saturating_sub(1) {
        0 => "Non-Stop".to_string(),
        1 => "1 Stop".to_string(),
        n => format!("{} Stops", n),
    }
}

/// Derive both ticket layouts from a confirmed selection. All fields
/// come from the persisted offer; nothing is re-fetched.
pub fn build_ticket(offer: &FlightOffer, passenger_name: &str) -> Option<TicketBundle> {
    let itinerary = offer.first_itinerary()?;
    let first = itinerary.segments.first()?;
    let last = itinerary.segments.last()?;

    let pnr = generate_pnr();
    let airline = offer
        .validating_airline_codes
        .first()
        .cloned()
        .unwrap_or_else(|| first.carrier_code.clone());

    let boarding_pass = BoardingPass {
        pnr: pnr.clone(),
        origin: first.departure.iata_code.clone(),
        destination: last.arrival.iata_code.clone(),
        departure_date: fmt_date(parse_flight_time(&first.departure.at)),
        departure_time: fmt_time(parse_flight_time(&first.departure.at)),
        arrival_date: fmt_date(parse_flight_time(&last.arrival.at)),
        arrival_time: fmt_time(parse_flight_time(&last.arrival.at)),
        duration: format_duration(&itinerary.duration),
        stops_label: stops_label(itinerary.segments.len()),
        seat: "10A".to_string(),
        airline,
    };

    let segments = itinerary
        .segments
        .iter()
        .map(|seg| TicketSegment {
            carrier: seg.carrier_code.clone(),
            flight_number: seg.number.clone(),
            origin: seg.departure.iata_code.clone(),
            destination: seg.arrival.iata_code.clone(),
            departure: seg.departure.at.clone(),
            arrival: seg.arrival.at.clone(),
            duration: format_duration(&seg.duration),
        })
        .collect();

    let e_ticket = ETicket {
        ticket_number: generate_ticket_number(),
        agency_reference: generate_agency_ref(),
        pnr,
        date_of_issue: Utc::now().format("%d/%m/%Y").to_string(),
        passenger_name: passenger_name.to_string(),
        segments,
        summary: PaymentSummary::from_offer(offer),
    };

    Some(TicketBundle {
        boarding_pass,
        e_ticket,
    })
}
