//! Content negotiation: the API only speaks JSON.

use axum::{
    extract::Request,
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Reject every non-`OPTIONS` request that does not accept JSON.
pub async fn require_json(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS && !accepts_json(request.headers()) {
        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            "rejecting request without a JSON Accept header"
        );
        return AppError::not_acceptable("Requests are only accepted with Accept of json")
            .into_response();
    }

    next.run(request).await
}

/// True when some `Accept` header lists `application/json` as a media range.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|range| range.split(';').next())
        .any(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}
