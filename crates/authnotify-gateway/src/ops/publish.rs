//! `POST /v1/publish`: broadcast entry point for producers running in
//! another process (the registration service, scripts).
//!
//! Requires `Authorization: Bearer <token>` signed with the gateway secret.
//! The body is a notification in wire format; the response is the
//! [`PublishReport`](crate::realtime::PublishReport) as JSON.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use authnotify_core::error::NotifyError;
use authnotify_core::Notification;

use crate::app_state::AppState;
use crate::transport::credential::{admit, bearer_token};

fn error_response(status: StatusCode, err: &NotifyError) -> Response {
    let body = json!({
        "code": err.client_code().as_str(),
        "msg": err.to_string(),
    });
    (status, Json(body)).into_response()
}

pub async fn publish(State(app): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let publisher = match admit(app.validator(), bearer_token(&headers)) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::info!(reason = e.label(), "publish rejected");
            return error_response(StatusCode::UNAUTHORIZED, &NotifyError::from(e));
        }
    };

    let event = match Notification::from_json(&body).and_then(|ev| ev.check().map(|()| ev)) {
        Ok(ev) => ev,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    tracing::debug!(%publisher, kind = event.kind(), "publish requested");
    let report = app.broadcaster().publish(&event).await;
    (StatusCode::OK, Json(report)).into_response()
}
