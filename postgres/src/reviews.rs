//! Review storage: at most one review per invoice.
//!
//! A review lives on the invoice row it rates. Submission targets the
//! client's most recent invoice at the restaurant and writes through a
//! guarded update, so two concurrent submissions for the same invoice
//! resolve to one winner and one conflict.

use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::types::{ClientId, InvoiceId, Rating, RestaurantId, Review, VisitType};

use crate::invoices;

/// Store for reviews carried on invoice rows.
#[derive(Clone)]
pub struct ReviewStore {
    pool: PgPool,
}

impl ReviewStore {
    /// Create a new review store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Review the client's most recent visit to a restaurant. The
    /// review lands on the latest invoice by billing date, insertion
    /// order breaking ties. Returns the reviewed invoice's id.
    ///
    /// An omitted visit type defaults to [`VisitType::Couple`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Precondition`] when the client has no
    /// invoice at the restaurant, [`DomainError::Conflict`] when the
    /// latest invoice is already reviewed, and [`DomainError::Store`]
    /// on database failure.
    #[tracing::instrument(skip(self, rating, visit_type))]
    pub async fn submit(
        &self,
        client_id: &ClientId,
        restaurant_id: &RestaurantId,
        rating: Rating,
        visit_type: Option<VisitType>,
    ) -> Result<InvoiceId> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Store(format!("Failed to begin transaction: {e}")))?;

        let latest: Option<(String, Option<i16>)> = sqlx::query_as(
            r"
            SELECT id, rating
            FROM invoices
            WHERE client_id = $1 AND restaurant_id = $2
            ORDER BY invoice_date DESC, created_at DESC
            LIMIT 1
            ",
        )
        .bind(client_id.as_str())
        .bind(restaurant_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to find latest invoice: {e}")))?;

        let Some((invoice_id, existing_rating)) = latest else {
            return Err(DomainError::precondition(format!(
                "client {client_id} has no invoice at restaurant {restaurant_id} to review"
            )));
        };
        if existing_rating.is_some() {
            return Err(DomainError::conflict(format!(
                "invoice {invoice_id} is already reviewed"
            )));
        }

        // The rating IS NULL guard makes the loser of a concurrent
        // submission see zero affected rows rather than overwrite.
        let result = sqlx::query(
            r"
            UPDATE invoices
            SET rating = $2,
                visit_type = $3
            WHERE id = $1 AND rating IS NULL
            ",
        )
        .bind(&invoice_id)
        .bind(i16::from(rating.half_points()))
        .bind(visit_type.unwrap_or_default().as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to submit review: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::conflict(format!(
                "invoice {invoice_id} is already reviewed"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Store(format!("Failed to commit review: {e}")))?;

        tracing::info!(
            invoice_id = %invoice_id,
            client_id = %client_id,
            restaurant_id = %restaurant_id,
            rating = rating.value(),
            "Review submitted"
        );
        metrics::counter!("reviews.submitted").increment(1);

        Ok(InvoiceId::new(invoice_id))
    }

    /// List a client's reviews, newest visit first, with the
    /// restaurant's name and city joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r"
            SELECT i.id,
                   i.restaurant_id,
                   r.name AS restaurant_name,
                   r.city AS restaurant_city,
                   i.rating,
                   i.visit_type,
                   i.invoice_date
            FROM invoices i
            JOIN restaurants r ON r.id = i.restaurant_id
            WHERE i.client_id = $1 AND i.rating IS NOT NULL
            ORDER BY i.invoice_date DESC, i.created_at DESC
            ",
        )
        .bind(client_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list reviews: {e}")))?;

        rows.iter()
            .map(|row| {
                let rating = invoices::rating_from_storage(row.get("rating"))?.ok_or_else(|| {
                    DomainError::Store("review row without a rating in storage".into())
                })?;
                let visit_type =
                    invoices::visit_type_from_storage(row.get("visit_type"))?.unwrap_or_default();
                Ok(Review {
                    invoice_id: InvoiceId::new(row.get::<String, _>("id")),
                    restaurant_id: RestaurantId::new(row.get::<String, _>("restaurant_id")),
                    restaurant_name: row.get("restaurant_name"),
                    restaurant_city: row.get("restaurant_city"),
                    rating,
                    visit_type,
                    invoice_date: row.get("invoice_date"),
                })
            })
            .collect()
    }
}
