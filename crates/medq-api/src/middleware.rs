use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use medq_types::models::UserRole;
use tracing::debug;

use crate::{AppState, run_store};

/// Set by the authenticating proxy in front of this service.
pub const CALLER_HEADER: &str = "x-medq-user";

/// The participant a request acts for.
#[derive(Debug, Clone)]
pub struct Caller {
    pub name: String,
    pub role: UserRole,
}

impl Caller {
    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }
}

/// Resolve the caller named in `x-medq-user` against the users table.
pub async fn require_caller(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let name = req
        .headers()
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    let lookup = name.clone();
    let user = run_store(&state, move |store| store.try_get_user(&lookup))
        .await?
        .ok_or_else(|| {
            debug!("Rejecting request for unknown user {}", name);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(Caller {
        name: user.name,
        role: user.role,
    });
    Ok(next.run(req).await)
}
