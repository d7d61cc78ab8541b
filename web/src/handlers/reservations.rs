//! Reservation endpoints.
//!
//! - POST /api/reservations - Book a visit
//! - PUT /api/reservations/:id - Amend party size, date or time
//! - POST /api/reservations/:id/cancel - Cancel, keeping the record
//! - GET /api/clients/:id/reservations - A client's bookings
//! - GET /api/restaurants/:id/reservations - A restaurant's bookings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use the_knife_core::types::{
    parse_date, parse_time, ClientId, ClientReservation, ReservationId, RestaurantId,
    RestaurantReservation,
};

use crate::extractors::AppJson;
use crate::state::AppState;
use crate::WebResult;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to book a visit.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    /// Booking client.
    pub client_id: String,
    /// Restaurant to book at.
    pub restaurant_id: String,
    /// Number of diners, 1 through 99.
    pub party_size: i16,
    /// Visit date, `YYYY-MM-DD`.
    pub date: String,
    /// Visit time, `HH:MM` or `HH:MM:SS`.
    pub time: String,
}

/// Request to amend a reservation.
#[derive(Debug, Deserialize)]
pub struct UpdateReservationRequest {
    /// Number of diners, 1 through 99.
    pub party_size: i16,
    /// Visit date, `YYYY-MM-DD`.
    pub date: String,
    /// Visit time, `HH:MM` or `HH:MM:SS`.
    pub time: String,
}

/// Response after booking a visit.
#[derive(Debug, Serialize)]
pub struct ReservationCreatedResponse {
    /// Generated reservation ID.
    pub id: ReservationId,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book a visit.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reservations \
///   -H "Content-Type: application/json" \
///   -d '{
///     "client_id": "04821733Z",
///     "restaurant_id": "R0042",
///     "party_size": 2,
///     "date": "2025-06-21",
///     "time": "20:30"
///   }'
/// ```
pub async fn create_reservation(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateReservationRequest>,
) -> WebResult<(StatusCode, Json<ReservationCreatedResponse>)> {
    let date = parse_date(&request.date)?;
    let time = parse_time(&request.time)?;

    let id = state
        .reservations
        .create(
            &ClientId::new(request.client_id),
            &RestaurantId::new(request.restaurant_id),
            request.party_size,
            date,
            time,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReservationCreatedResponse { id })))
}

/// Amend a reservation's party size, date or time.
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
    AppJson(request): AppJson<UpdateReservationRequest>,
) -> WebResult<StatusCode> {
    let date = parse_date(&request.date)?;
    let time = parse_time(&request.time)?;

    state
        .reservations
        .update(
            &ReservationId::new(reservation_id),
            request.party_size,
            date,
            time,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Cancel a reservation.
///
/// The record stays behind with a `CANCELLED` status. Cancelling twice
/// is acknowledged without complaint.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
) -> WebResult<StatusCode> {
    state
        .reservations
        .cancel(&ReservationId::new(reservation_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a client's reservations, most recent visit first.
pub async fn list_client_reservations(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> WebResult<Json<Vec<ClientReservation>>> {
    let reservations = state
        .reservations
        .list_by_client(&ClientId::new(client_id))
        .await?;
    Ok(Json(reservations))
}

/// List a restaurant's reservations, most recent visit first.
pub async fn list_restaurant_reservations(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<Vec<RestaurantReservation>>> {
    let reservations = state
        .reservations
        .list_by_restaurant(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(reservations))
}
