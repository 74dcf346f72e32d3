use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::booking::SearchLog;
use crate::models::flight::{Dictionaries, DisplayOffer, FlightOffer};
use crate::models::search::FlightSearchParams;
use crate::services::extras::fetch_extras;
use crate::services::filter_engine::{apply_filters, to_display_offers, FilterConfig, SortBy};
use crate::services::pricing::MarkupStore;
use crate::services::travel_api::TravelApiClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub params: FlightSearchParams,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub sort_by: SortBy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub data: Vec<DisplayOffer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionaries: Option<Dictionaries>,
    /// Raw offers returned by the provider, before filtering.
    pub total: usize,
    /// Offers surviving the active filters. Zero is a valid state; the
    /// client renders its empty panel with a clear-filters action.
    pub matched: usize,
    pub markup: f64,
    /// Echo of the exact params used, so a client that fired a newer
    /// search can discard this response if it arrives late.
    pub params: FlightSearchParams,
}

/// Offer payload for the extras endpoints: the pricing-context wrapper
/// the provider wants, accepted as-is from the client.
#[derive(Debug, Deserialize)]
pub struct ExtrasRequest {
    pub data: ExtrasRequestData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrasRequestData {
    #[serde(rename = "type")]
    pub kind: String,
    pub flight_offers: Vec<FlightOffer>,
}

impl ExtrasRequest {
    fn into_offer(self) -> Option<FlightOffer> {
        self.data.flight_offers.into_iter().next()
    }
}

pub async fn search(
    db: web::Data<Arc<Client>>,
    api: web::Data<TravelApiClient>,
    markup_store: web::Data<MarkupStore>,
    claims: Option<Claims>,
    input: web::Json<SearchRequest>,
) -> impl Responder {
    let SearchRequest {
        mut params,
        filters,
        sort_by,
    } = input.into_inner();

    params.normalize();
    if let Err(msg) = params.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    println!(
        "Flight search: {} -> {} on {}",
        params.origin, params.destination, params.departure_date
    );

    let response = match api.search_flights(&params).await {
        Ok(response) => response,
        Err(err) => {
            eprintln!("Flight search failed: {}", err);
            return HttpResponse::BadGateway().body(err.to_string());
        }
    };

    // Usage analytics are fire-and-forget: a logging failure must never
    // block or surface to the traveler.
    spawn_search_log(db.get_ref().clone(), params.clone(), claims);

    let markup = markup_store.current();
    let total = response.data.len();
    let filtered = apply_filters(&response.data, markup, &filters, sort_by);
    let matched = filtered.len();

    HttpResponse::Ok().json(SearchResults {
        data: to_display_offers(filtered, markup),
        dictionaries: response.dictionaries,
        total,
        matched,
        markup,
        params,
    })
}

fn spawn_search_log(client: Arc<Client>, params: FlightSearchParams, claims: Option<Claims>) {
    tokio::spawn(async move {
        let collection: mongodb::Collection<SearchLog> =
            client.database("Travel").collection("SearchLogs");
        let log = SearchLog {
            id: None,
            user_id: claims.and_then(|c| ObjectId::parse_str(&c.user_id).ok()),
            search_params: params,
            created_at: Some(Utc::now()),
        };
        if let Err(err) = collection.insert_one(&log).await {
            eprintln!("Failed to log search: {:?}", err);
        }
    });
}

/// Seat map and ancillaries in one round trip, fetched concurrently.
/// Either side failing comes back as null with the other intact.
pub async fn extras(
    api: web::Data<TravelApiClient>,
    input: web::Json<ExtrasRequest>,
) -> impl Responder {
    let offer = match input.into_inner().into_offer() {
        Some(offer) => offer,
        None => return HttpResponse::BadRequest().body("flightOffers must contain one offer"),
    };

    let bundle = fetch_extras(&api, offer).await;
    HttpResponse::Ok().json(bundle)
}

pub async fn seatmaps(
    api: web::Data<TravelApiClient>,
    input: web::Json<ExtrasRequest>,
) -> impl Responder {
    let offer = match input.into_inner().into_offer() {
        Some(offer) => offer,
        None => return HttpResponse::BadRequest().body("flightOffers must contain one offer"),
    };

    match api.get_seatmaps(offer).await {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => {
            eprintln!("Seatmap fetch error: {}", err);
            HttpResponse::BadGateway().body(err.to_string())
        }
    }
}

pub async fn ancillaries(
    api: web::Data<TravelApiClient>,
    input: web::Json<ExtrasRequest>,
) -> impl Responder {
    let offer = match input.into_inner().into_offer() {
        Some(offer) => offer,
        None => return HttpResponse::BadRequest().body("flightOffers must contain one offer"),
    };

    match api.get_ancillaries(offer).await {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => {
            eprintln!("Ancillary fetch error: {}", err);
            HttpResponse::BadGateway().body(err.to_string())
        }
    }
}
