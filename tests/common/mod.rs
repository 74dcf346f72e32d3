use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::options::ClientOptions;
use std::sync::Arc;

use hifi_travels_api::middleware::auth::{AuthMiddleware, Claims};
use hifi_travels_api::middleware::admin::RequireAdmin;
use hifi_travels_api::routes;
use hifi_travels_api::services::pricing::{MarkupStore, DEFAULT_MARKUP};
use hifi_travels_api::services::travel_api::TravelApiClient;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    pub markup_store: MarkupStore,
    pub travel_api: TravelApiClient,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        // Short timeouts so tests without a database fail fast instead
        // of hanging on server selection.
        let mut options = ClientOptions::parse(&mongo_uri)
            .await
            .expect("Failed to parse test MongoDB URI");
        options.connect_timeout = Some(std::time::Duration::from_secs(1));
        options.server_selection_timeout = Some(std::time::Duration::from_secs(1));

        let client = Arc::new(
            mongodb::Client::with_options(options).expect("Failed to create test MongoDB client"),
        );

        Self {
            client,
            markup_store: MarkupStore::new(DEFAULT_MARKUP),
            // Nothing listens here; provider-dependent calls fail fast.
            travel_api: TravelApiClient::with_base_url("http://127.0.0.1:9".to_string()),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
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
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(self.markup_store.clone()))
            .app_data(web::Data::new(self.travel_api.clone()))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::auth::signup))
                            .route("/signin", web::post().to(routes::auth::signin))
                            .route("/admin/signin", web::post().to(routes::auth::admin_signin))
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
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
                            .service(
                                web::scope("")
                                    .wrap(RequireAdmin)
                                    .wrap(AuthMiddleware)
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
    }
}

/// Bearer token signed with the middleware's development fallback key.
pub fn bearer_token(is_admin: bool) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: "tester@example.com".to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(1)).timestamp() as usize,
        user_id: "507f1f77bcf86cd799439011".to_string(),
        is_admin,
    };

    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token");

    format!("Bearer {}", token)
}
