use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::pricing::{update_markup, MarkupStore};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupView {
    pub markup_value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupInput {
    pub markup_value: f64,
}

pub async fn get_markup(store: web::Data<MarkupStore>) -> impl Responder {
    HttpResponse::Ok().json(MarkupView {
        markup_value: store.current(),
    })
}

/// Admin-only. Persists the markup and publishes it to every live
/// handler before responding, so the next search prices with it.
pub async fn set_markup(
    db: web::Data<Arc<Client>>,
    store: web::Data<MarkupStore>,
    input: web::Json<MarkupInput>,
) -> impl Responder {
    let markup = input.markup_value;
    if !markup.is_finite() || markup < 0.0 {
        return HttpResponse::BadRequest().body("markupValue must be a non-negative number");
    }

    match update_markup(&db, &store, markup).await {
        Ok(()) => {
            println!("Pricing markup updated to {}%", markup);
            HttpResponse::Ok().json(MarkupView {
                markup_value: markup,
            })
        }
        Err(err) => {
            eprintln!("Failed to persist markup: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update markup")
        }
    }
}
