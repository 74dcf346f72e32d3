use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::account::{User, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

/// Admin logins don't get query-parameter handoffs: the console URL is
/// returned alongside a separate short-lived token the console
/// validates itself.
#[derive(Debug, Serialize)]
pub struct AdminSigninResponse {
    auth_token: String,
    console_url: String,
}

fn users_collection(client: &Client) -> mongodb::Collection<User> {
    client.database("Account").collection("Users")
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<SignupInput>) -> impl Responder {
    let client = data.into_inner();
    let collection = users_collection(&client);
    let input = input.into_inner();

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }

    let curr_time = Utc::now();
    let user = User {
        id: None,
        email: input.email,
        password: bcrypt::hash(input.password, bcrypt::DEFAULT_COST).unwrap_or("".to_string()),
        full_name: input.full_name,
        is_admin: false,
        last_signin: None,
        failed_signins: None,
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            let user_id = match result.inserted_id.as_object_id() {
                Some(id) => id,
                None => return HttpResponse::InternalServerError().body("Failed to create user"),
            };
            match generate_token(&user.email, user_id, false, 24) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            }
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().body("User already exists")
                    } else {
                        println!("Error code: {}", code);
                        HttpResponse::InternalServerError().body("Failed to create user")
                    }
                }
                _ => HttpResponse::InternalServerError().body("Failed to create user"),
            },
            _ => HttpResponse::InternalServerError().body("Failed to create user"),
        },
    }
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<SigninInput>) -> impl Responder {
    let client = data.into_inner();
    let collection = users_collection(&client);
    let input = input.into_inner();

    match collection.find_one(doc! { "email": &input.email }).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_rfc3339(),
                        "failed_signins": 0
                    }
                };

                if let Err(err) = collection
                    .update_one(doc! { "email": &input.email }, update)
                    .await
                {
                    eprintln!("Failed to update document: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to sign in.");
                }

                let user_id = match user.id {
                    Some(id) => id,
                    None => return HttpResponse::InternalServerError().body("Failed to sign in."),
                };
                match generate_token(&input.email, user_id, user.is_admin, 24) {
                    Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                    Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! {
                    "$set": { "failed_signins": failed_signins }
                };

                match collection
                    .update_one(doc! { "email": &input.email }, update)
                    .await
                {
                    Ok(_) => HttpResponse::Unauthorized().body("Invalid credentials"),
                    Err(err) => {
                        eprintln!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to process signin")
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

/// Admin console entry: same credential check plus the is_admin flag,
/// answered with a 15-minute token and the console address.
pub async fn admin_signin(
    data: web::Data<Arc<Client>>,
    input: web::Json<SigninInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = users_collection(&client);
    let input = input.into_inner();

    let user = match collection.find_one(doc! { "email": &input.email }).await {
        Ok(Some(user)) => user,
        Ok(None) => return HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to process signin");
        }
    };

    if !bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    if !user.is_admin {
        return HttpResponse::Forbidden().body("Access Denied. You do not have admin privileges.");
    }

    let console_base = std::env::var("ADMIN_CONSOLE_URL")
        .unwrap_or_else(|_| "http://localhost:5173/admin".to_string());
    let console_url = match url::Url::parse(&console_base) {
        Ok(url) => url.to_string(),
        Err(err) => {
            eprintln!("Invalid ADMIN_CONSOLE_URL: {:?}", err);
            return HttpResponse::InternalServerError().body("Admin console misconfigured");
        }
    };

    let user_id = match user.id {
        Some(id) => id,
        None => return HttpResponse::InternalServerError().body("Failed to sign in."),
    };
    // Short lifetime on purpose: the token only has to survive the
    // redirect to the console.
    match generate_token_minutes(&input.email, user_id, true, 15) {
        Ok(token) => HttpResponse::Ok().json(AdminSigninResponse {
            auth_token: token,
            console_url,
        }),
        Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
    }
}

pub async fn user_session(claims: Claims, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = users_collection(&client);

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let user_session = UserSession {
                id: user.id.unwrap_or_default(),
                email: user.email,
                full_name: user.full_name.unwrap_or_default(),
                is_admin: user.is_admin,
                created_at: user.created_at.unwrap_or_default(),
            };
            HttpResponse::Ok().json(user_session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.unwrap().is_match(email)
}

fn generate_token(
    email: &str,
    user_id: ObjectId,
    is_admin: bool,
    hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign_claims(email, user_id, is_admin, Duration::hours(hours))
}

fn generate_token_minutes(
    email: &str,
    user_id: ObjectId,
    is_admin: bool,
    minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign_claims(email, user_id, is_admin, Duration::minutes(minutes))
}

fn sign_claims(
    email: &str,
    user_id: ObjectId,
    is_admin: bool,
    lifetime: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    // Same fallback the middleware uses, so dev tokens verify.
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + lifetime).timestamp() as usize,
        user_id: user_id.to_string(),
        is_admin,
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}
