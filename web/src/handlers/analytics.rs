//! Per-restaurant analytics endpoints.
//!
//! - GET /api/restaurants/:id/analytics/average-spend
//! - GET /api/restaurants/:id/analytics/busiest-day
//! - GET /api/restaurants/:id/analytics/top-dishes
//! - GET /api/restaurants/:id/analytics/pending-reviews
//!
//! These never fail on an unknown restaurant; it simply looks like one
//! with no activity.

use axum::{
    extract::{Path, State},
    Json,
};
use the_knife_core::types::{AverageSpend, BusiestDay, PendingReview, RestaurantId, TopDish};

use crate::state::AppState;
use crate::WebResult;

/// Average spend per diner, over reservation-backed invoices.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/restaurants/R0042/analytics/average-spend
/// # {"average_per_head":41.25,"invoice_count":16}
/// ```
pub async fn average_spend(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<AverageSpend>> {
    let spend = state
        .analytics
        .average_spend(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(spend))
}

/// The weekday with the most confirmed reservations.
pub async fn busiest_day(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<BusiestDay>> {
    let day = state
        .analytics
        .busiest_day(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(day))
}

/// The three most-ordered dishes across all invoices.
pub async fn top_dishes(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<Vec<TopDish>>> {
    let dishes = state
        .analytics
        .top_dishes(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(dishes))
}

/// Invoices still waiting for a review, newest first.
pub async fn pending_reviews(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<Vec<PendingReview>>> {
    let pending = state
        .analytics
        .pending_reviews(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(pending))
}
