use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::booking::{
    Booking, BookedFlightDetails, ExtrasTab, SelectedFlight, Selection,
};
use crate::models::flight::FlightOffer;
use crate::services::ticket::{build_ticket, PaymentSummary};

fn selections(client: &Client) -> Collection<Selection> {
    client.database("Travel").collection("Selections")
}

fn bookings(client: &Client) -> Collection<Booking> {
    client.database("Travel").collection("Bookings")
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub offer: FlightOffer,
    #[serde(default)]
    pub tab: ExtrasTab,
    /// Carrier-code dictionary from the search response, used to write
    /// an airline name into the audit row. Codes stand in when absent.
    #[serde(default)]
    pub carriers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    pub selection_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub passenger_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub status: String,
    pub summary: PaymentSummary,
}

/// Stored selection as the client sees it. `selected` is null for
/// missing or expired ids, which the client treats as nothing chosen.
#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub selected: Option<SelectedFlight>,
}

pub async fn select(
    db: web::Data<Arc<Client>>,
    claims: Option<Claims>,
    input: web::Json<SelectRequest>,
) -> impl Responder {
    let SelectRequest {
        offer,
        tab,
        carriers,
    } = input.into_inner();

    let user_id = claims.and_then(|c| ObjectId::parse_str(&c.user_id).ok());
    let selection_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let selection = Selection {
        id: None,
        selection_id: selection_id.clone(),
        selected: SelectedFlight {
            offer: offer.clone(),
            tab,
        },
        user_id,
        status: "Pending".to_string(),
        passenger_name: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    if let Err(err) = selections(&db).insert_one(&selection).await {
        eprintln!("Failed to store selection: {:?}", err);
        return HttpResponse::InternalServerError().body("Failed to store selection");
    }

    spawn_booking_audit(db.get_ref().clone(), offer, carriers, user_id);

    HttpResponse::Ok().json(SelectResponse { selection_id })
}

fn spawn_booking_audit(
    client: Arc<Client>,
    offer: FlightOffer,
    carriers: HashMap<String, String>,
    user_id: Option<ObjectId>,
) {
    tokio::spawn(async move {
        let code = offer.validating_airline_codes.first().cloned();
        let airline = code
            .as_ref()
            .and_then(|c| carriers.get(c).cloned())
            .or(code)
            .unwrap_or_else(|| "Unknown".to_string());
        let now = Utc::now();

        let booking = Booking {
            id: None,
            user_id,
            flight_details: BookedFlightDetails {
                offer_id: offer.id.clone(),
                airline,
                origin: offer.origin().unwrap_or("").to_string(),
                destination: offer.destination().unwrap_or("").to_string(),
                price: offer.price.total.clone(),
                currency: offer.price.currency.clone(),
            },
            status: "Pending".to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        if let Err(err) = bookings(&client).insert_one(&booking).await {
            eprintln!("Failed to record booking: {:?}", err);
        }
    });
}

pub async fn get_selection(
    db: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let selection_id = path.into_inner();

    match selections(&db)
        .find_one(doc! { "selection_id": &selection_id })
        .await
    {
        Ok(Some(selection)) => HttpResponse::Ok().json(SelectionView {
            selected: Some(selection.selected),
        }),
        Ok(None) => HttpResponse::NotFound().json(SelectionView { selected: None }),
        Err(err) => {
            eprintln!("Selection lookup failed: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to load selection")
        }
    }
}

/// Mock capture. Computes the summary with the fixed tax rate and marks
/// the selection Confirmed. No card details are accepted or charged.
pub async fn payment(
    db: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<PaymentRequest>,
) -> impl Responder {
    let selection_id = path.into_inner();
    let passenger_name = input.into_inner().passenger_name;

    let selection = match selections(&db)
        .find_one(doc! { "selection_id": &selection_id })
        .await
    {
        Ok(Some(selection)) => selection,
        Ok(None) => return HttpResponse::NotFound().body("Selection not found"),
        Err(err) => {
            eprintln!("Selection lookup failed: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to load selection");
        }
    };

    let summary = PaymentSummary::from_offer(&selection.selected.offer);

    let mut update = doc! {
        "status": "Confirmed",
        "updated_at": Utc::now().to_rfc3339(),
    };
    if let Some(ref name) = passenger_name {
        update.insert("passenger_name", name.clone());
    }

    match selections(&db)
        .update_one(
            doc! { "selection_id": &selection_id },
            doc! { "$set": update },
        )
        .await
    {
        Ok(_) => HttpResponse::Ok().json(PaymentResponse {
            status: "Confirmed".to_string(),
            summary,
        }),
        Err(err) => {
            eprintln!("Failed to confirm selection: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to confirm payment")
        }
    }
}

pub async fn ticket(db: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let selection_id = path.into_inner();

    let selection = match selections(&db)
        .find_one(doc! { "selection_id": &selection_id })
        .await
    {
        Ok(Some(selection)) => selection,
        Ok(None) => return HttpResponse::NotFound().body("Selection not found"),
        Err(err) => {
            eprintln!("Selection lookup failed: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to load selection");
        }
    };

    if selection.status != "Confirmed" {
        return HttpResponse::BadRequest().body("Selection has not been paid for");
    }

    let passenger = selection
        .passenger_name
        .as_deref()
        .unwrap_or("GUEST TRAVELER");

    match build_ticket(&selection.selected.offer, passenger) {
        Some(bundle) => HttpResponse::Ok().json(bundle),
        None => HttpResponse::UnprocessableEntity().body("Offer has no usable itinerary"),
    }
}
