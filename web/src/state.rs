//! Shared application state for web handlers.

use sqlx::PgPool;
use the_knife_postgres::{
    AnalyticsStore, CatalogStore, ClientStore, InvoiceStore, ReservationStore, ReviewStore,
};

/// Application state handed to every handler.
///
/// One store per resource area, all sharing a single connection pool.
/// The pool itself stays reachable for readiness probes.
#[derive(Clone)]
pub struct AppState {
    /// Client registration, search and deletion.
    pub clients: ClientStore,
    /// Restaurants, menus and the allergen catalog.
    pub catalog: CatalogStore,
    /// Reservation lifecycle.
    pub reservations: ReservationStore,
    /// Invoice creation and listings.
    pub invoices: InvoiceStore,
    /// Review submission and listings.
    pub reviews: ReviewStore,
    /// Per-restaurant reporting queries.
    pub analytics: AnalyticsStore,
    pool: PgPool,
}

impl AppState {
    /// Build the state from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientStore::new(pool.clone()),
            catalog: CatalogStore::new(pool.clone()),
            reservations: ReservationStore::new(pool.clone()),
            invoices: InvoiceStore::new(pool.clone()),
            reviews: ReviewStore::new(pool.clone()),
            analytics: AnalyticsStore::new(pool.clone()),
            pool,
        }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
