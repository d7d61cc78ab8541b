//! Invoice endpoints.
//!
//! - POST /api/reservations/:id/invoice - Settle a reservation
//! - POST /api/invoices - Bill a walk-in or import an external record
//! - GET /api/clients/:id/invoices - A client's billing history
//! - GET /api/restaurants/:id/invoices - A restaurant's billing history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use the_knife_core::types::{
    ClientId, ClientInvoice, Invoice, InvoiceId, Money, OrderLine, Rating, ReservationId,
    RestaurantId, RestaurantInvoice, VisitType,
};

use crate::extractors::AppJson;
use crate::state::AppState;
use crate::WebResult;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create an invoice directly, without going through a
/// reservation.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Billed client.
    pub client_id: String,
    /// Issuing restaurant.
    pub restaurant_id: String,
    /// Reservation to attach, if the visit was booked. Must belong to
    /// the same client and restaurant and not be settled already.
    pub reservation_id: Option<String>,
    /// Total billed, in euros.
    pub total_eur: f64,
    /// Dishes ordered during the visit.
    #[serde(default)]
    pub order_lines: Vec<OrderLineRequest>,
}

/// One dish-and-quantity entry in an invoice request.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    /// Name of the ordered dish.
    pub dish_name: String,
    /// Number of units ordered, at least 1.
    pub quantity: i32,
}

/// An invoice as returned by the creation endpoints.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Billed client.
    pub client_id: ClientId,
    /// Issuing restaurant.
    pub restaurant_id: RestaurantId,
    /// Reservation this invoice settles, if any.
    pub reservation_id: Option<ReservationId>,
    /// Total billed, in euros.
    pub total_eur: f64,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Review rating, once submitted.
    pub rating: Option<Rating>,
    /// Review visit type, once submitted.
    pub visit_type: Option<VisitType>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            client_id: invoice.client_id,
            restaurant_id: invoice.restaurant_id,
            reservation_id: invoice.reservation_id,
            total_eur: invoice.total.as_eur(),
            invoice_date: invoice.invoice_date,
            rating: invoice.rating,
            visit_type: invoice.visit_type,
        }
    }
}

/// An invoice row in a client's billing history.
#[derive(Debug, Serialize)]
pub struct ClientInvoiceResponse {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Issuing restaurant.
    pub restaurant_id: RestaurantId,
    /// Restaurant display name.
    pub restaurant_name: String,
    /// Restaurant city.
    pub restaurant_city: String,
    /// Reservation the invoice settles, if any.
    pub reservation_id: Option<ReservationId>,
    /// Total billed, in euros.
    pub total_eur: f64,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Review rating, if one was submitted.
    pub rating: Option<Rating>,
    /// Review visit type, if one was submitted.
    pub visit_type: Option<VisitType>,
}

impl From<ClientInvoice> for ClientInvoiceResponse {
    fn from(invoice: ClientInvoice) -> Self {
        Self {
            id: invoice.id,
            restaurant_id: invoice.restaurant_id,
            restaurant_name: invoice.restaurant_name,
            restaurant_city: invoice.restaurant_city,
            reservation_id: invoice.reservation_id,
            total_eur: invoice.total.as_eur(),
            invoice_date: invoice.invoice_date,
            rating: invoice.rating,
            visit_type: invoice.visit_type,
        }
    }
}

/// An invoice row in a restaurant's billing history.
#[derive(Debug, Serialize)]
pub struct RestaurantInvoiceResponse {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Billed client.
    pub client_id: ClientId,
    /// Client display name.
    pub client_name: String,
    /// Reservation the invoice settles, if any.
    pub reservation_id: Option<ReservationId>,
    /// Total billed, in euros.
    pub total_eur: f64,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Review rating, if one was submitted.
    pub rating: Option<Rating>,
    /// Review visit type, if one was submitted.
    pub visit_type: Option<VisitType>,
}

impl From<RestaurantInvoice> for RestaurantInvoiceResponse {
    fn from(invoice: RestaurantInvoice) -> Self {
        Self {
            id: invoice.id,
            client_id: invoice.client_id,
            client_name: invoice.client_name,
            reservation_id: invoice.reservation_id,
            total_eur: invoice.total.as_eur(),
            invoice_date: invoice.invoice_date,
            rating: invoice.rating,
            visit_type: invoice.visit_type,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Settle a reservation into an invoice.
///
/// The restaurant synthesizes the total at the till. Calling this twice
/// for the same reservation returns the same invoice; there is never a
/// second one.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reservations/RES12345/invoice
/// ```
pub async fn invoice_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
) -> WebResult<Json<InvoiceResponse>> {
    let invoice = state
        .invoices
        .create_from_reservation(&ReservationId::new(reservation_id))
        .await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Create an invoice directly.
///
/// Covers walk-ins and imported records. A reservation may be attached
/// as long as it belongs to the same client and restaurant and has no
/// invoice yet.
pub async fn create_invoice(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateInvoiceRequest>,
) -> WebResult<(StatusCode, Json<InvoiceResponse>)> {
    let total = Money::from_eur(request.total_eur)?;
    let reservation_id = request.reservation_id.map(ReservationId::new);
    let lines: Vec<OrderLine> = request
        .order_lines
        .into_iter()
        .map(|line| OrderLine {
            dish_name: line.dish_name,
            quantity: line.quantity,
        })
        .collect();

    let invoice = state
        .invoices
        .create_direct(
            &ClientId::new(request.client_id),
            &RestaurantId::new(request.restaurant_id),
            reservation_id.as_ref(),
            total,
            &lines,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}

/// List a client's invoices, most recent first.
pub async fn list_client_invoices(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> WebResult<Json<Vec<ClientInvoiceResponse>>> {
    let invoices = state
        .invoices
        .list_by_client(&ClientId::new(client_id))
        .await?;
    Ok(Json(
        invoices.into_iter().map(ClientInvoiceResponse::from).collect(),
    ))
}

/// List a restaurant's invoices, most recent first.
pub async fn list_restaurant_invoices(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<Vec<RestaurantInvoiceResponse>>> {
    let invoices = state
        .invoices
        .list_by_restaurant(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(
        invoices
            .into_iter()
            .map(RestaurantInvoiceResponse::from)
            .collect(),
    ))
}
