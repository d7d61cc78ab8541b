//! # The Knife Core
//!
//! Domain types for The Knife, a restaurant reservation-and-review
//! platform. This crate is storage- and transport-agnostic: it holds the
//! identifier formats, value objects, entities, read models and the error
//! taxonomy that the `postgres` stores and the `web` layer share.
//!
//! ## Core Concepts
//!
//! - **Reservation**: a booked visit, cancellable by status flip
//! - **Invoice**: the billing record for one visit; at most one per
//!   reservation
//! - **Review**: a rating-and-visit-type pair embedded in exactly one
//!   invoice
//! - **Identifier generation**: short uppercase-alphanumeric codes drawn
//!   from an explicit randomness source with bounded retries
//!
//! ## Example
//!
//! ```
//! use std::collections::HashSet;
//!
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use the_knife_core::id::{self, IdKind};
//! use the_knife_core::types::{Rating, VisitType};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let reservation_id = id::generate(IdKind::Reservation, &mut rng, &HashSet::new())?;
//! assert_eq!(reservation_id.len(), 8);
//!
//! let rating = Rating::try_from_value(4.5)?;
//! assert_eq!(VisitType::default(), VisitType::Couple);
//! # Ok::<(), the_knife_core::DomainError>(())
//! ```

// Re-export commonly used time types
pub use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub mod error;
pub mod id;
pub mod types;

pub use error::{DomainError, Result};
pub use types::{
    Allergen, AverageSpend, BusiestDay, Client, ClientId, ClientInvoice, ClientReservation, Dish,
    DishListing, DishType, Invoice, InvoiceId, Money, OrderLine, PendingReview, Rating,
    Reservation, ReservationId, ReservationStatus, Restaurant, RestaurantId, RestaurantInvoice,
    RestaurantReservation, Review, TopDish, VisitType,
};
