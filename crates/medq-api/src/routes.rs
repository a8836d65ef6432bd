use axum::{Router, middleware, routing::post};

use crate::middleware::require_caller;
use crate::{AppState, messages, users};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users", post(users::register))
        .with_state(state.clone());

    let caller_routes = Router::new()
        .route("/send_message", post(messages::send_message))
        .route("/updates", post(messages::get_updates))
        .route("/messages/{message_id}/answer", post(messages::answer_message))
        .route("/chats/{author_name}/answer", post(messages::answer_chat))
        .layer(middleware::from_fn_with_state(state.clone(), require_caller))
        .with_state(state);

    Router::new().merge(public_routes).merge(caller_routes)
}
