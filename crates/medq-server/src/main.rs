use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use medq_api::AppStateInner;
use medq_api::routes;
use medq_api::users::seed_doctor;
use medq_db::{StoreConfig, StoreGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "medq=debug,medq_api=debug,medq_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("MEDQ_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MEDQ_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;
    let store_config = StoreConfig::from_env();

    // Init store. A failed bootstrap leaves a degraded gateway that retries on use.
    let store = tokio::task::spawn_blocking(move || StoreGateway::connect(store_config)).await?;

    match (
        std::env::var("MEDQ_DOCTOR_USERNAME"),
        std::env::var("MEDQ_DOCTOR_PASSWORD"),
    ) {
        (Ok(name), Ok(password)) => {
            let seed_store = store.clone();
            let seeded =
                tokio::task::spawn_blocking(move || seed_doctor(&seed_store, &name, &password))
                    .await?;
            if !seeded {
                warn!("Doctor account could not be seeded");
            }
        }
        _ => warn!("MEDQ_DOCTOR_USERNAME/MEDQ_DOCTOR_PASSWORD not set, no doctor account seeded"),
    }

    let app = routes::router(Arc::new(AppStateInner { store }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("medq listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
