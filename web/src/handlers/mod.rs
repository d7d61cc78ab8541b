//! HTTP request handlers, one module per resource area.

pub mod analytics;
pub mod catalog;
pub mod clients;
pub mod health;
pub mod invoices;
pub mod reservations;
pub mod reviews;
