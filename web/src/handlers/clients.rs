//! Client account endpoints.
//!
//! - POST /api/clients - Register a client under a caller-chosen ID
//! - GET /api/clients - Search by name fragment or exact ID
//! - GET /api/clients/:id - Fetch a profile
//! - PUT /api/clients/:id - Update a profile
//! - DELETE /api/clients/:id - Delete the account and everything it owns

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use the_knife_core::types::{Client, ClientId};

use crate::extractors::AppJson;
use crate::state::AppState;
use crate::WebResult;

// ============================================================================
// Request Types
// ============================================================================

/// Request to register a client.
///
/// The ID is chosen by the caller and is opaque to the platform; an
/// official document number works as well as anything else.
#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    /// Caller-chosen identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Education bracket.
    pub education: Option<String>,
    /// Single-character demographic category.
    pub sex: Option<String>,
    /// Age in years.
    pub age: Option<i16>,
}

/// Request to update a client profile. The ID comes from the path and
/// cannot change.
#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Education bracket.
    pub education: Option<String>,
    /// Single-character demographic category.
    pub sex: Option<String>,
    /// Age in years.
    pub age: Option<i16>,
}

/// Query parameters for client search.
#[derive(Debug, Deserialize)]
pub struct ClientSearchQuery {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Exact client ID.
    pub id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new client.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/clients \
///   -H "Content-Type: application/json" \
///   -d '{"id": "04821733Z", "name": "Amaia Etxeberria", "phone": "+34 600 000 000"}'
/// ```
pub async fn register_client(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterClientRequest>,
) -> WebResult<(StatusCode, Json<Client>)> {
    let client = Client {
        id: ClientId::new(request.id),
        name: request.name,
        phone: request.phone,
        email: request.email,
        education: request.education,
        sex: request.sex,
        age: request.age,
    };

    state.clients.register(&client).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// Search clients by name fragment, exact ID, or both.
///
/// Without parameters this lists every client.
pub async fn search_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientSearchQuery>,
) -> WebResult<Json<Vec<Client>>> {
    let clients = state
        .clients
        .search(query.name.as_deref(), query.id.as_deref())
        .await?;
    Ok(Json(clients))
}

/// Fetch a client profile by ID.
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> WebResult<Json<Client>> {
    let client = state.clients.get(&ClientId::new(client_id)).await?;
    Ok(Json(client))
}

/// Update a client profile.
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    AppJson(request): AppJson<UpdateClientRequest>,
) -> WebResult<StatusCode> {
    let client = Client {
        id: ClientId::new(client_id),
        name: request.name,
        phone: request.phone,
        email: request.email,
        education: request.education,
        sex: request.sex,
        age: request.age,
    };

    state.clients.update(&client).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a client account.
///
/// Takes the client's reviews, invoices, order lines, reservations and
/// allergen links along in one transaction. Restaurants are untouched.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> WebResult<StatusCode> {
    state.clients.delete(&ClientId::new(client_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
