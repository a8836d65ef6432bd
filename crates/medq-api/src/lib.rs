pub mod messages;
pub mod middleware;
pub mod routes;
pub mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use medq_db::{StoreError, StoreGateway, StoreResult};
use tracing::error;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: StoreGateway,
}

/// Runs a store call on the blocking pool and maps its failure to a status code.
pub(crate) async fn run_store<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&StoreGateway) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| store_error_status(&e))
}

fn store_error_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::MessageTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => {
            error!("Store error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
