//! Administrative operations on the books collection.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};

use subtle::ConstantTimeEq;

use shelf_http::error::AppError;
use shelf_kernel::settings::Environment;

use crate::modules::books::models::{SeedReport, SeedRequest};
use crate::modules::books::{seed, BooksState};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/seed", post(seed_books))
        .with_state(state)
}

/// Purge the collection and regenerate it with fake books
async fn seed_books(
    State(state): State<BooksState>,
    headers: HeaderMap,
    payload: Result<Json<SeedRequest>, JsonRejection>,
) -> Result<Json<SeedReport>, AppError> {
    authorize(&state, &headers)?;

    let Json(request) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let max_amount = state.admin.max_seed_amount;
    if request.amount > max_amount {
        return Err(AppError::validation(
            vec![serde_json::json!({
                "field": "amount",
                "error": format!("must not exceed {}", max_amount),
            })],
            format!("Amount must not exceed {}", max_amount),
        ));
    }

    tracing::warn!(amount = request.amount, "seeding books collection, existing books will be deleted");
    let report = seed::seed(state.store.as_ref(), request.amount).await?;
    Ok(Json(report))
}

/// A configured token must match; without one only local deployments may seed.
fn authorize(state: &BooksState, headers: &HeaderMap) -> Result<(), AppError> {
    match state.admin.seed_token.as_deref() {
        Some(expected) => {
            let presented = headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok());

            if presented.is_some_and(|token| token_matches(token, expected)) {
                Ok(())
            } else {
                Err(AppError::unauthorized("A valid X-Admin-Token header is required"))
            }
        }
        None if state.environment == Environment::Local => Ok(()),
        None => Err(AppError::forbidden(
            "Seeding is disabled: no admin token configured",
        )),
    }
}

fn token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
