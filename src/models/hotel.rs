use serde::{Deserialize, Serialize};

/// Hotel search is wired through but not production-ready; the shapes
/// below match what the provider returns today.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchParams {
    pub city_code: String,
    /// "YYYY-MM-DD"
    pub check_in_date: String,
    pub check_out_date: String,
    pub adults: u32,
}

impl HotelSearchParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.city_code.is_empty() || self.check_in_date.is_empty() || self.check_out_date.is_empty() {
            return Err("cityCode, checkInDate and checkOutDate are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOffersResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}
