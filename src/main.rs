use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;

use hifi_travels_api::db;
use hifi_travels_api::middleware;
use hifi_travels_api::routes;
use hifi_travels_api::services::pricing::{init_markup_store, spawn_markup_poller};
use hifi_travels_api::services::travel_api::TravelApiClient;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let markup_store = init_markup_store(&client).await;
    spawn_markup_poller(client.clone(), markup_store.clone());

    let travel_api = match TravelApiClient::new() {
        Ok(api) => api,
        Err(err) => {
            eprintln!("Travel provider configuration error: {}", err);
            std::process::exit(1);
        }
    };

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(markup_store.clone()))
            .app_data(web::Data::new(travel_api.clone()))
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::auth::signup))
                            .route("/signin", web::post().to(routes::auth::signin))
                            .route("/admin/signin", web::post().to(routes::auth::admin_signin))
                            .service(
                                web::scope("").wrap(middleware::auth::AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::auth::user_session),
                                ),
                            ),
                    )
                    .service(
                        web::scope("/flights")
                            .route("/search", web::post().to(routes::flights::search))
                            .route("/extras", web::post().to(routes::flights::extras))
                            .route("/seatmaps", web::post().to(routes::flights::seatmaps))
                            .route(
                                "/ancillaries",
                                web::post().to(routes::flights::ancillaries),
                            ),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("/select", web::post().to(routes::bookings::select))
                            .route(
                                "/selection/{id}",
                                web::get().to(routes::bookings::get_selection),
                            )
                            .route(
                                "/payment/{id}",
                                web::post().to(routes::bookings::payment),
                            )
                            .route("/ticket/{id}", web::get().to(routes::bookings::ticket)),
                    )
                    .service(
                        web::scope("/pricing")
                            .route("/markup", web::get().to(routes::pricing::get_markup))
                            // Admin-only write path
                            .service(
                                web::scope("")
                                    .wrap(middleware::admin::RequireAdmin)
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route(
                                        "/markup",
                                        web::put().to(routes::pricing::set_markup),
                                    ),
                            ),
                    )
                    .route(
                        "/calendar/month",
                        web::get().to(routes::calendar::month_grid),
                    )
                    .service(
                        web::scope("/hotels").route(
                            "/offers-by-city",
                            web::post().to(routes::hotels::offers_by_city),
                        ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
