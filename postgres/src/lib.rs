//! PostgreSQL storage for The Knife reservation-and-review platform.
//!
//! This crate owns the relational schema (see `migrations/`) and exposes
//! one store per aggregate: clients (including the cascade delete),
//! reservations, invoices, reviews, the restaurant/dish/allergen catalog
//! and the analytics queries. Stores speak the domain types from
//! `the-knife-core` and report failures through its error taxonomy.
//!
//! All multi-row writes run inside a transaction; idempotency and
//! at-most-once rules are enforced by the schema (a partial unique index
//! on `invoices.reservation_id`, guarded updates on the rating column)
//! rather than by read-then-write sequences, so they hold under
//! concurrent callers.
//!
//! # Example
//!
//! ```ignore
//! use the_knife_postgres::reservations::ReservationStore;
//!
//! async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ReservationStore::new(pool);
//!     let bookings = store.list_by_client(&"04821733Z".into()).await?;
//!     println!("{} bookings", bookings.len());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use sqlx::PgPool;
use the_knife_core::error::{DomainError, Result};

pub mod analytics;
pub mod catalog;
pub mod clients;
pub mod invoices;
pub mod reservations;
pub mod reviews;

pub use analytics::AnalyticsStore;
pub use catalog::CatalogStore;
pub use clients::ClientStore;
pub use invoices::InvoiceStore;
pub use reservations::ReservationStore;
pub use reviews::ReviewStore;

/// Run database migrations.
///
/// # Errors
///
/// Returns [`DomainError::Store`] if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::Store(format!("Migration failed: {e}")))?;
    Ok(())
}
