//! Result audio download endpoint

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::session::store::session_id_from_headers;
use crate::session::TrackKind;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    download: Option<String>,
}

impl AudioQuery {
    fn wants_download(&self) -> bool {
        matches!(self.download.as_deref(), Some("1") | Some("true"))
    }
}

/// GET /audio/:kind
///
/// Serves vocals, melody or the (trimmed) original from the caller's last
/// separation. `?download=1` makes it an attachment.
pub async fn serve_track(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<AudioQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let kind = TrackKind::parse(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown track: {}", kind)))?;

    let session = session_id_from_headers(&headers)
        .and_then(|id| state.store.get(id))
        .ok_or_else(|| ApiError::NotFound("No active session".to_string()))?;
    let session = session.lock().await;

    let track = session
        .results()
        .map(|r| r.track(kind))
        .ok_or_else(|| ApiError::NotFound("No separation results yet".to_string()))?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, track.content_type)],
        track.bytes.clone(),
    )
        .into_response();

    if query.wants_download() {
        let disposition = format!("attachment; filename=\"{}\"", track.file_name);
        let value = HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::Internal(format!("Bad file name header: {}", e)))?;
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
