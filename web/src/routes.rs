//! Router configuration.
//!
//! Builds the complete Axum router: health probes at the root, the
//! resource endpoints under `/api`, and the shared middleware stack.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{analytics, catalog, clients, health, invoices, reservations, reviews};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
///
/// # Returns
///
/// Configured Axum router ready to serve requests.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Catalog
        .route("/restaurants", get(catalog::list_restaurants))
        .route("/restaurants/:id", get(catalog::get_restaurant))
        .route("/restaurants/:id/dishes", get(catalog::list_dishes))
        .route("/allergens", get(catalog::list_allergens))
        // Clients
        .route("/clients", post(clients::register_client))
        .route("/clients", get(clients::search_clients))
        .route("/clients/:id", get(clients::get_client))
        .route("/clients/:id", put(clients::update_client))
        .route("/clients/:id", delete(clients::delete_client))
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/:id", put(reservations::update_reservation))
        .route(
            "/reservations/:id/cancel",
            post(reservations::cancel_reservation),
        )
        .route(
            "/clients/:id/reservations",
            get(reservations::list_client_reservations),
        )
        .route(
            "/restaurants/:id/reservations",
            get(reservations::list_restaurant_reservations),
        )
        // Invoices
        .route(
            "/reservations/:id/invoice",
            post(invoices::invoice_reservation),
        )
        .route("/invoices", post(invoices::create_invoice))
        .route("/clients/:id/invoices", get(invoices::list_client_invoices))
        .route(
            "/restaurants/:id/invoices",
            get(invoices::list_restaurant_invoices),
        )
        // Reviews
        .route("/reviews", post(reviews::submit_review))
        .route("/clients/:id/reviews", get(reviews::list_client_reviews))
        // Analytics
        .route(
            "/restaurants/:id/analytics/average-spend",
            get(analytics::average_spend),
        )
        .route(
            "/restaurants/:id/analytics/busiest-day",
            get(analytics::busiest_day),
        )
        .route(
            "/restaurants/:id/analytics/top-dishes",
            get(analytics::top_dishes),
        )
        .route(
            "/restaurants/:id/analytics/pending-reviews",
            get(analytics::pending_reviews),
        );

    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
        .with_state(state)
}
