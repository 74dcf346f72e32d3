use actix_web::{web, HttpResponse, Responder};

use crate::models::hotel::HotelSearchParams;
use crate::services::travel_api::TravelApiClient;

pub async fn offers_by_city(
    api: web::Data<TravelApiClient>,
    input: web::Json<HotelSearchParams>,
) -> impl Responder {
    let params = input.into_inner();
    if let Err(msg) = params.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    println!(
        "Hotel search: {} {} -> {}",
        params.city_code, params.check_in_date, params.check_out_date
    );

    match api.search_hotels(&params).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => {
            eprintln!("Hotel search failed: {}", err);
            HttpResponse::BadGateway().body(err.to_string())
        }
    }
}
