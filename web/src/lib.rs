//! HTTP API for the reservation platform.
//!
//! This crate exposes the storage layer over Axum: request handlers and
//! their wire types, the router, error translation to JSON responses,
//! and correlation-ID middleware for request tracing.
//!
//! The surface splits into:
//! - **Catalog**: restaurants, menus and the allergen list (read-only)
//! - **Clients**: registration, search, profile updates and deletion
//! - **Reservations**: booking, amending and cancelling visits
//! - **Invoices**: settling reservations and direct billing
//! - **Reviews**: one rating per invoice, newest invoice first
//! - **Analytics**: per-restaurant reporting endpoints
//!
//! # Example
//!
//! ```ignore
//! use the_knife_web::{build_router, AppState};
//!
//! let state = AppState::new(pool);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;

/// Result type for web handlers.
pub type WebResult<T> = Result<T, AppError>;
