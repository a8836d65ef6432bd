use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use medq_types::api::{
    AnswerResponse, SendMessageRequest, SendMessageResponse, UpdatesRequest, UpdatesResponse,
};
use medq_types::models::{MAX_MESSAGE_CHARS, UserRole};
use tracing::{debug, info, warn};

use crate::middleware::Caller;
use crate::{AppState, run_store};

/// Clients write into their own thread. Doctors reply into the recipient's
/// thread, which closes out everything the client had queued up to the reply.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.message_text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let id = if caller.is_doctor() {
        let recipient = req
            .recipient
            .filter(|r| !r.is_empty())
            .ok_or(StatusCode::BAD_REQUEST)?;

        let lookup = recipient.clone();
        let client = run_store(&state, move |store| store.try_get_user(&lookup))
            .await?
            .filter(|u| u.role == UserRole::Client)
            .ok_or_else(|| {
                warn!("Doctor {} replied to unknown client {}", caller.name, recipient);
                StatusCode::NOT_FOUND
            })?;

        let text = req.message_text;
        let id = run_store(&state, move |store| store.try_insert_reply(&client.name, &text))
            .await?;

        info!("Doctor {} answered {} (message {})", caller.name, recipient, id);
        id
    } else {
        let author = caller.name.clone();
        let text = req.message_text;
        let id = run_store(&state, move |store| store.try_insert_message(&author, &text, false))
            .await?;

        debug!("Queued message {} from {}", id, caller.name);
        id
    };

    Ok((StatusCode::CREATED, Json(SendMessageResponse { id })))
}

/// Doctors poll the queue; clients poll their own thread.
pub async fn get_updates(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<UpdatesRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let new_messages = run_store(&state, move |store| match (caller.role, req.after_id) {
        (UserRole::Doctor, Some(after_id)) => store.try_get_queue_after(after_id),
        (UserRole::Doctor, None) => store.try_get_queue(req.last_message_id),
        (UserRole::Client, Some(after_id)) => {
            store.try_get_new_messages_after(&caller.name, after_id)
        }
        (UserRole::Client, None) => {
            store.try_get_new_messages(&caller.name, req.last_message_id)
        }
    })
    .await?;

    Ok(Json(UpdatesResponse { new_messages }))
}

/// Queue -> Answered for a single message. Doctors only.
pub async fn answer_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, StatusCode> {
    if !caller.is_doctor() {
        return Err(StatusCode::FORBIDDEN);
    }

    let answered = run_store(&state, move |store| store.answer_message(message_id)).await?;

    Ok(Json(AnswerResponse { answered }))
}

/// Close out a client's whole thread. Doctors only.
pub async fn answer_chat(
    State(state): State<AppState>,
    Path(author_name): Path<String>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, StatusCode> {
    if !caller.is_doctor() {
        return Err(StatusCode::FORBIDDEN);
    }

    let changed = run_store(&state, move |store| {
        store.try_mark_messages_as_answered(&author_name)
    })
    .await?;
    debug!("Doctor {} closed a thread ({} messages)", caller.name, changed);

    Ok(StatusCode::NO_CONTENT)
}
