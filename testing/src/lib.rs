//! # The Knife Testing
//!
//! Testing utilities for The Knife platform.
//!
//! This crate provides:
//! - A disposable `PostgreSQL` container with the schema applied
//! - Fixture seeding for clients, restaurants, dishes and allergens
//! - Tracing initialization for test binaries
//!
//! ## Example
//!
//! ```ignore
//! use the_knife_testing::{TestDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let db = TestDatabase::start().await;
//!     let client = fixtures::seed_client(&db.pool(), "00000001A", "Ada").await;
//!     let restaurant = fixtures::seed_restaurant(&db.pool(), "REST-1", "Chez Ada", 2).await;
//!
//!     // Exercise stores against db.pool()
//! }
//! ```

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;

/// Initialize tracing for a test binary. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
