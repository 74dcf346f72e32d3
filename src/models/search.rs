use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Round,
    OneWay,
}

impl Default for TripType {
    fn default() -> Self {
        TripType::Round
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CabinClass {
    Economy,
    #[serde(rename = "Premium Economy")]
    PremiumEconomy,
    Business,
    #[serde(rename = "First Class")]
    FirstClass,
}

impl Default for CabinClass {
    fn default() -> Self {
        CabinClass::Economy
    }
}

/// Trip parameters collected by the search form. Created once per
/// submit, reused unmodified for date-slider re-queries, replaced by
/// the next search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchParams {
    pub origin: String,
    pub destination: String,
    /// "YYYY-MM-DD"
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default)]
    pub trip_type: TripType,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub cabin: CabinClass,
}

impl FlightSearchParams {
    /// Airport codes arrive free-form; the provider wants them uppercase.
    pub fn normalize(&mut self) {
        self.origin = self.origin.trim().to_uppercase();
        self.destination = self.destination.trim().to_uppercase();
    }

    /// Mirrors the submit-button enable condition: origin, destination
    /// and departure date always required, return date only for round
    /// trips.
    pub fn validate(&self) -> Result<(), String> {
        if self.origin.is_empty() || self.destination.is_empty() || self.departure_date.is_empty()
        {
            return Err("Please fill in all required flight fields".to_string());
        }
        if self.trip_type == TripType::Round
            && self.return_date.as_deref().unwrap_or("").is_empty()
        {
            return Err("Return date is required for round trips".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip() -> FlightSearchParams {
        FlightSearchParams {
            origin: "DEL".to_string(),
            destination: "BOM".to_string(),
            departure_date: "2026-03-20".to_string(),
            return_date: Some("2026-03-25".to_string()),
            trip_type: TripType::Round,
            adults: 1,
            children: 0,
            infants: 0,
            cabin: CabinClass::Economy,
        }
    }

    #[test]
    fn complete_round_trip_validates() {
        assert!(round_trip().validate().is_ok());
    }

    #[test]
    fn round_trip_requires_return_date() {
        let mut params = round_trip();
        params.return_date = None;
        assert!(params.validate().is_err());

        params.return_date = Some(String::new());
        assert!(params.validate().is_err());
    }

    #[test]
    fn one_way_ignores_return_date() {
        let mut params = round_trip();
        params.return_date = None;
        params.trip_type = TripType::OneWay;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn missing_core_fields_block_submission() {
        let mut params = round_trip();
        params.origin = String::new();
        assert!(params.validate().is_err());

        let mut params = round_trip();
        params.departure_date = String::new();
        assert!(params.validate().is_err());
    }

    #[test]
    fn normalize_uppercases_codes() {
        let mut params = round_trip();
        params.origin = " del ".to_string();
        params.destination = "bom".to_string();
        params.normalize();
        assert_eq!(params.origin, "DEL");
        assert_eq!(params.destination, "BOM");
    }
}
