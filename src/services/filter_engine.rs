use serde::{Deserialize, Serialize};

use crate::models::flight::{parse_flight_time, DisplayOffer, FlightOffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    /// Bucket a departure hour: morning [6,12), afternoon [12,18),
    /// evening [18,24), night [0,6).
    pub fn from_hour(hour: u32) -> TimeSlot {
        match hour {
            6..=11 => TimeSlot::Morning,
            12..=17 => TimeSlot::Afternoon,
            18..=23 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Recommendation,
    Price,
    Duration,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Recommendation
    }
}

/// Sidebar filter state. `Default` is the cleared state: every filter
/// a no-op, so applying it returns the input list unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub airlines: Vec<String>,
    pub max_stops: Option<u32>,
    pub time_slots: Vec<TimeSlot>,
    pub baggage_only: bool,
    pub max_price: Option<f64>,
}

impl FilterConfig {
    fn keep(&self, offer: &FlightOffer, markup: f64) -> bool {
        if !self.airlines.is_empty() {
            let carrier = offer.first_segment().map(|s| s.carrier_code.as_str());
            if !carrier.map_or(false, |c| self.airlines.iter().any(|a| a == c)) {
                return false;
            }
        }

        if let Some(max_stops) = self.max_stops {
            let stops = offer
                .first_itinerary()
                .map(|i| i.segments.len().saturating_sub(1))
                .unwrap_or(0);
            if stops as u32 > max_stops {
                return false;
            }
        }

        if !self.time_slots.is_empty() {
            let slot = offer
                .first_segment()
                .and_then(|s| parse_flight_time(&s.departure.at))
                .map(|t| TimeSlot::from_hour(chrono::Timelike::hour(&t)));
            if !slot.map_or(false, |s| self.time_slots.contains(&s)) {
                return false;
            }
        }

        if self.baggage_only {
            if !offer.first_segment_bags().map_or(false, |b| b.has_allowance()) {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            // Same multiply-then-divide order as DisplayOffer, so the
            // filter sees exactly the price the traveler sees.
            let adjusted = offer.raw_total() * (100.0 + markup) / 100.0;
            if adjusted > max_price {
                return false;
            }
        }

        true
    }
}

/// Total minutes in an ISO-8601 "PTxHyM" duration. Either component may
/// be missing; anything unparseable counts as zero.
pub fn parse_iso_duration(iso: &str) -> i64 {
    let rest = match iso.strip_prefix("PT") {
        Some(rest) => rest,
        None => return 0,
    };
    let mut minutes = 0i64;
    let mut number = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
        } else {
            let value: i64 = number.parse().unwrap_or(0);
            match ch {
                'H' => minutes += value * 60,
                'M' => minutes += value,
                _ => {}
            }
            number.clear();
        }
    }
    minutes
}

/// Pure filter + sort pass over a raw offer list. Filters compose by
/// AND; sort runs after filtering and is stable, so ties keep provider
/// order and Recommendation leaves the list untouched.
pub fn apply_filters(
    offers: &[FlightOffer],
    markup: f64,
    config: &FilterConfig,
    sort_by: SortBy,
) -> Vec<FlightOffer> {
    let mut filtered: Vec<FlightOffer> = offers
        .iter()
        .filter(|offer| config.keep(offer, markup))
        .cloned()
        .collect();

    match sort_by {
        SortBy::Price => {
            filtered.sort_by(|a, b| a.raw_total().total_cmp(&b.raw_total()));
        }
        SortBy::Duration => {
            filtered.sort_by_key(|o| {
                o.first_itinerary()
                    .map(|i| parse_iso_duration(&i.duration))
                    .unwrap_or(0)
            });
        }
        SortBy::Recommendation => {}
    }

    filtered
}

/// Attach the current markup to every offer for display. Repricing is
/// always done here, never written back into stored offers, so a markup
/// change re-prices every visible offer from its untouched base fare.
pub fn to_display_offers(offers: Vec<FlightOffer>, markup: f64) -> Vec<DisplayOffer> {
    offers
        .into_iter()
        .map(|offer| DisplayOffer::from_offer(offer, markup))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flight::{
        CheckedBags, FareDetails, FlightEndpoint, Itinerary, Price, Segment, TravelerPricing,
    };

    fn segment(carrier: &str, dep_at: &str) -> Segment {
        Segment {
            departure: FlightEndpoint {
                iata_code: "DEL".to_string(),
                at: dep_at.to_string(),
                terminal: None,
            },
            arrival: FlightEndpoint {
                iata_code: "BOM".to_string(),
                at: "2026-03-20T23:59:00".to_string(),
                terminal: None,
            },
            carrier_code: carrier.to_string(),
            number: "101".to_string(),
            duration: "PT2H".to_string(),
        }
    }

    fn offer(id: &str, total: &str, duration: &str, segments: Vec<Segment>) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            itineraries: vec![Itinerary {
                duration: duration.to_string(),
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

    fn with_bags(mut o: FlightOffer, quantity: u32) -> FlightOffer {
        o.traveler_pricings = Some(vec![TravelerPricing {
            fare_details_by_segment: vec![FareDetails {
                included_checked_bags: Some(CheckedBags {
                    quantity: Some(quantity),
                    weight: None,
                    weight_unit: None,
                }),
            }],
        }]);
        o
    }

    fn sample() -> Vec<FlightOffer> {
        vec![
            offer("a", "52000", "PT5H30M", vec![segment("AI", "2026-03-20T07:00:00")]),
            offer(
                "b",
                "48000",
                "PT9H15M",
                vec![
                    segment("6E", "2026-03-20T13:30:00"),
                    segment("6E", "2026-03-20T18:00:00"),
                ],
            ),
            offer("c", "61000", "PT2H05M", vec![segment("UK", "2026-03-20T22:10:00")]),
            offer("d", "48000", "PT4H", vec![segment("AI", "2026-03-20T02:45:00")]),
        ]
    }

    #[test]
    fn output_is_a_subset_and_order_preserved() {
        let offers = sample();
        let out = apply_filters(&offers, 0.0, &FilterConfig::default(), SortBy::Recommendation);
        let ids: Vec<&str> = out.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn airline_filter_matches_first_segment_carrier() {
        let config = FilterConfig {
            airlines: vec!["AI".to_string()],
            ..Default::default()
        };
        let out = apply_filters(&sample(), 0.0, &config, SortBy::Recommendation);
        assert!(out.iter().all(|o| o.first_segment().unwrap().carrier_code == "AI"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn stops_filter_counts_segments_minus_one() {
        let config = FilterConfig {
            max_stops: Some(0),
            ..Default::default()
        };
        let out = apply_filters(&sample(), 0.0, &config, SortBy::Recommendation);
        let ids: Vec<&str> = out.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn time_slots_bucket_first_departure_hour() {
        let config = FilterConfig {
            time_slots: vec![TimeSlot::Morning, TimeSlot::Night],
            ..Default::default()
        };
        let out = apply_filters(&sample(), 0.0, &config, SortBy::Recommendation);
        let ids: Vec<&str> = out.iter().map(|o| o.id.as_str()).collect();
        // a departs 07:00 (morning), d departs 02:45 (night)
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn baggage_filter_requires_positive_allowance() {
        let offers = vec![
            with_bags(offer("a", "100", "PT1H", vec![segment("AI", "2026-03-20T07:00:00")]), 1),
            with_bags(offer("b", "100", "PT1H", vec![segment("AI", "2026-03-20T08:00:00")]), 0),
            offer("c", "100", "PT1H", vec![segment("AI", "2026-03-20T09:00:00")]),
        ];
        let config = FilterConfig {
            baggage_only: true,
            ..Default::default()
        };
        let out = apply_filters(&offers, 0.0, &config, SortBy::Recommendation);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn price_filter_applies_markup_before_comparing() {
        let config = FilterConfig {
            max_price: Some(115000.0),
            ..Default::default()
        };
        // 52000 * 2.3 = 119600 > 115000, 48000 * 2.3 = 110400 <= 115000
        let out = apply_filters(&sample(), 130.0, &config, SortBy::Recommendation);
        let ids: Vec<&str> = out.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn price_cap_is_exact_at_round_percentages() {
        let offers = vec![offer("a", "50000", "PT1H", vec![segment("AI", "2026-03-20T07:00:00")])];
        let config = FilterConfig {
            max_price: Some(55000.0),
            ..Default::default()
        };
        // 50000 at 10% markup is exactly the cap; it must stay in.
        let out = apply_filters(&offers, 10.0, &config, SortBy::Recommendation);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn price_sort_is_ascending_and_stable() {
        let out = apply_filters(&sample(), 0.0, &FilterConfig::default(), SortBy::Price);
        let totals: Vec<f64> = out.iter().map(|o| o.raw_total()).collect();
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        // b and d tie at 48000; b came first in provider order
        assert_eq!(out[0].id, "b");
        assert_eq!(out[1].id, "d");
    }

    #[test]
    fn duration_sort_uses_parsed_minutes() {
        let out = apply_filters(&sample(), 0.0, &FilterConfig::default(), SortBy::Duration);
        let ids: Vec<&str> = out.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn filters_compose_by_and() {
        let config = FilterConfig {
            airlines: vec!["AI".to_string()],
            time_slots: vec![TimeSlot::Morning],
            ..Default::default()
        };
        let out = apply_filters(&sample(), 0.0, &config, SortBy::Recommendation);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn empty_result_is_valid_and_clearing_restores_everything() {
        let offers = sample();
        let config = FilterConfig {
            airlines: vec!["ZZ".to_string()],
            ..Default::default()
        };
        assert!(apply_filters(&offers, 0.0, &config, SortBy::Recommendation).is_empty());

        // Clearing filters means going back to the default config.
        let restored = apply_filters(&offers, 0.0, &FilterConfig::default(), SortBy::Recommendation);
        assert_eq!(restored.len(), offers.len());
    }

    #[test]
    fn repricing_moves_display_totals_but_not_base() {
        let offers = sample();
        let before = to_display_offers(offers.clone(), 130.0);
        let after = to_display_offers(offers, 150.0);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.base_price, a.base_price);
            assert_eq!(a.display_total, a.base_price * 250.0 / 100.0);
            assert_eq!(b.display_total, b.base_price * 230.0 / 100.0);
        }
    }

    #[test]
    fn iso_duration_components_are_optional() {
        assert_eq!(parse_iso_duration("PT7H30M"), 450);
        assert_eq!(parse_iso_duration("PT45M"), 45);
        assert_eq!(parse_iso_duration("PT3H"), 180);
        assert_eq!(parse_iso_duration("garbage"), 0);
    }

    #[test]
    fn hour_buckets_match_the_sidebar_windows() {
        assert_eq!(TimeSlot::from_hour(6), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_hour(11), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_hour(12), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(17), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(18), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_hour(23), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_hour(0), TimeSlot::Night);
        assert_eq!(TimeSlot::from_hour(5), TimeSlot::Night);
    }
}
