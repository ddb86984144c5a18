//! Form page handlers
//!
//! GET renders the caller's session; POST runs one interaction and renders
//! the result. User-facing failures are part of the page, not HTTP errors.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

use super::page;
use crate::error::{ApiError, ApiResult};
use crate::session::store::{session_cookie, session_id_from_headers, SessionHandle};
use crate::session::{Action, Interaction, Upload};
use crate::AppState;

/// Attach the session cookie when the session is new.
fn with_cookie(html: String, handle: &SessionHandle) -> Response {
    let mut response = Html(html).into_response();
    if handle.created {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, session_cookie(handle.id));
    }
    response
}

/// GET /
pub async fn show_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = state.store.get_or_create(session_id_from_headers(&headers));
    let session = handle.state.lock().await;
    let html = page::render(&session, None);
    drop(session);
    with_cookie(html, &handle)
}

/// Collect the multipart fields into an interaction.
///
/// An empty file field (no file chosen) is not an upload.
async fn read_interaction(mut multipart: Multipart) -> ApiResult<Interaction> {
    let mut interaction = Interaction::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    interaction.upload = Some(Upload {
                        name: file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "link" => interaction.link = field.text().await?,
            "start" => interaction.start = field.text().await?,
            "end" => interaction.end = field.text().await?,
            "action" => interaction.action = Action::parse(&field.text().await?),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(interaction)
}

/// POST /
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Response> {
    let interaction = read_interaction(multipart).await?;
    let handle = state.store.get_or_create(session_id_from_headers(&headers));

    let mut session = handle.state.clone().lock_owned().await;
    let controller = state.controller.clone();
    let (session, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = controller.handle(&mut session, interaction);
        (session, outcome)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Session task failed: {}", e)))?;

    let html = page::render(&session, outcome.notice());
    drop(session);
    Ok(with_cookie(html, &handle))
}
