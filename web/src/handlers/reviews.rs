//! Review endpoints.
//!
//! - POST /api/reviews - Rate a visit
//! - GET /api/clients/:id/reviews - A client's submitted reviews
//!
//! A review never targets an invoice directly: the platform picks the
//! client's most recent invoice at the named restaurant and writes the
//! rating there, at most once.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use the_knife_core::types::{ClientId, InvoiceId, Rating, RestaurantId, Review, VisitType};

use crate::extractors::AppJson;
use crate::state::AppState;
use crate::WebResult;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to rate a visit.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// Reviewing client.
    pub client_id: String,
    /// Reviewed restaurant.
    pub restaurant_id: String,
    /// Rating from 0 to 5 in half-point steps, e.g. `4.5`.
    pub rating: f64,
    /// Kind of visit, e.g. `COUPLE` or `BUSINESS`. Defaults to `COUPLE`.
    pub visit_type: Option<String>,
}

/// Response after submitting a review.
#[derive(Debug, Serialize)]
pub struct ReviewSubmittedResponse {
    /// Invoice the rating landed on.
    pub invoice_id: InvoiceId,
}

// ============================================================================
// Handlers
// ============================================================================

/// Rate the client's latest visit to a restaurant.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reviews \
///   -H "Content-Type: application/json" \
///   -d '{
///     "client_id": "04821733Z",
///     "restaurant_id": "R0042",
///     "rating": 4.5,
///     "visit_type": "COUPLE"
///   }'
/// ```
pub async fn submit_review(
    State(state): State<AppState>,
    AppJson(request): AppJson<SubmitReviewRequest>,
) -> WebResult<(StatusCode, Json<ReviewSubmittedResponse>)> {
    let rating = Rating::try_from_value(request.rating)?;
    let visit_type = request
        .visit_type
        .as_deref()
        .map(VisitType::from_str)
        .transpose()?;

    let invoice_id = state
        .reviews
        .submit(
            &ClientId::new(request.client_id),
            &RestaurantId::new(request.restaurant_id),
            rating,
            visit_type,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewSubmittedResponse { invoice_id }),
    ))
}

/// List a client's reviews, most recent visit first.
pub async fn list_client_reviews(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> WebResult<Json<Vec<Review>>> {
    let reviews = state
        .reviews
        .list_by_client(&ClientId::new(client_id))
        .await?;
    Ok(Json(reviews))
}
