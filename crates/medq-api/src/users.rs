use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use medq_db::StoreGateway;
use medq_types::api::{RegisterRequest, RegisterResponse};
use medq_types::models::UserRole;
use rand_core::OsRng;
use tracing::{error, info};

use crate::{AppState, run_store};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.name.len() < 3 || req.name.len() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("Password hashing failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let name = req.name.clone();
    let created = run_store(&state, move |store| {
        store.try_insert_user_or_exists(&name, &password_hash, UserRole::Client)
    })
    .await?;

    // An existing name is left as it was and still reported as success.
    let status = if created {
        info!("Registered client {}", req.name);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RegisterResponse {
            name: req.name,
            created,
        }),
    ))
}

/// Hash with Argon2id and a random salt, PHC string format.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Creates the doctor account at startup. Blocking; call before serving.
pub fn seed_doctor(store: &StoreGateway, name: &str, password: &str) -> bool {
    match hash_password(password) {
        Ok(hash) => store.insert_user_or_exists(name, &hash, UserRole::Doctor),
        Err(e) => {
            error!("Can't hash doctor password: {}", e);
            false
        }
    }
}
