use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::services::calendar::build_month;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
    /// Dates before this are disabled even when today allows them.
    /// Used for the return-date picker, floored at the departure date.
    pub min_date: Option<String>,
    pub selected: Option<String>,
}

pub async fn month_grid(query: web::Query<MonthQuery>) -> impl Responder {
    let min_date = match parse_opt_date(query.min_date.as_deref()) {
        Ok(date) => date,
        Err(msg) => return HttpResponse::BadRequest().body(msg),
    };
    let selected = match parse_opt_date(query.selected.as_deref()) {
        Ok(date) => date,
        Err(msg) => return HttpResponse::BadRequest().body(msg),
    };

    let today = Utc::now().date_naive();

    // A disabled day cannot be selected.
    if let Some(date) = selected {
        let floor = match min_date {
            Some(min) if min > today => min,
            _ => today,
        };
        if date < floor {
            return HttpResponse::BadRequest().body("Selected date is not available");
        }
    }

    match build_month(query.year, query.month, today, min_date, selected) {
        Some(grid) => HttpResponse::Ok().json(grid),
        None => HttpResponse::BadRequest().body("Invalid year or month"),
    }
}

fn parse_opt_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("Invalid date: {}", raw)),
    }
}
