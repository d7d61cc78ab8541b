//! Restaurant analytics read from the operational tables.
//!
//! Every query here keys on a restaurant and answers a question the
//! owner dashboard asks: how much a head spends, which weekday fills
//! the room, what gets ordered, and who still owes a review. An
//! unknown restaurant is indistinguishable from one with no activity
//! and yields empty or zeroed results.

use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::types::{
    AverageSpend, BusiestDay, ClientId, InvoiceId, PendingReview, ReservationStatus, RestaurantId,
    TopDish,
};

/// How many dishes the most-ordered ranking returns.
const TOP_DISH_COUNT: i64 = 3;

/// Store for restaurant-facing aggregations.
#[derive(Clone)]
pub struct AnalyticsStore {
    pool: PgPool,
}

impl AnalyticsStore {
    /// Create a new analytics store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Average spend per head across the restaurant's
    /// reservation-backed invoices. Direct invoices carry no party size
    /// and stay out of the average.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn average_spend(&self, restaurant_id: &RestaurantId) -> Result<AverageSpend> {
        let (average_per_head, invoice_count): (f64, i64) = sqlx::query_as(
            r"
            SELECT COALESCE(AVG(i.total_cents::float8 / 100.0 / res.party_size), 0.0),
                   COUNT(*)
            FROM invoices i
            JOIN reservations res ON res.id = i.reservation_id
            WHERE i.restaurant_id = $1
            ",
        )
        .bind(restaurant_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to compute average spend: {e}")))?;

        Ok(AverageSpend {
            average_per_head,
            invoice_count,
        })
    }

    /// The weekday with the most confirmed reservations. Cancelled
    /// reservations do not count; ties break toward the earlier
    /// weekday, Monday first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn busiest_day(&self, restaurant_id: &RestaurantId) -> Result<BusiestDay> {
        let row: Option<(i32, i64)> = sqlx::query_as(
            r"
            SELECT EXTRACT(ISODOW FROM date)::int AS isodow,
                   COUNT(*) AS reservation_count
            FROM reservations
            WHERE restaurant_id = $1 AND status = $2
            GROUP BY isodow
            ORDER BY reservation_count DESC, isodow
            LIMIT 1
            ",
        )
        .bind(restaurant_id.as_str())
        .bind(ReservationStatus::Confirmed.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to compute busiest day: {e}")))?;

        match row {
            Some((isodow, reservation_count)) => Ok(BusiestDay {
                weekday: Some(weekday_name(isodow)?.to_string()),
                reservation_count,
            }),
            None => Ok(BusiestDay {
                weekday: None,
                reservation_count: 0,
            }),
        }
    }

    /// The restaurant's most-ordered dishes by total units across all
    /// invoices, at most three entries. A dish renamed off the menu
    /// keeps its ordered name and loses its course.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn top_dishes(&self, restaurant_id: &RestaurantId) -> Result<Vec<TopDish>> {
        let rows = sqlx::query(
            r"
            SELECT ol.dish_name,
                   d.dish_type,
                   SUM(ol.quantity) AS total_quantity
            FROM order_lines ol
            LEFT JOIN dishes d
                ON d.restaurant_id = ol.restaurant_id AND d.name = ol.dish_name
            WHERE ol.restaurant_id = $1
            GROUP BY ol.dish_name, d.dish_type
            ORDER BY total_quantity DESC, ol.dish_name
            LIMIT $2
            ",
        )
        .bind(restaurant_id.as_str())
        .bind(TOP_DISH_COUNT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to compute top dishes: {e}")))?;

        rows.iter()
            .map(|row| {
                let dish_type = row
                    .get::<Option<String>, _>("dish_type")
                    .map(|raw| {
                        raw.parse().map_err(|_| {
                            DomainError::Store(format!("invalid dish type {raw} in storage"))
                        })
                    })
                    .transpose()?;
                Ok(TopDish {
                    dish_name: row.get("dish_name"),
                    dish_type,
                    total_quantity: row.get("total_quantity"),
                })
            })
            .collect()
    }

    /// Invoices at the restaurant still waiting for a review, newest
    /// visit first, with the client's name joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn pending_reviews(&self, restaurant_id: &RestaurantId) -> Result<Vec<PendingReview>> {
        let rows = sqlx::query(
            r"
            SELECT i.id,
                   i.client_id,
                   c.name AS client_name,
                   i.invoice_date
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            WHERE i.restaurant_id = $1 AND i.rating IS NULL
            ORDER BY i.invoice_date DESC, i.created_at DESC
            ",
        )
        .bind(restaurant_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list pending reviews: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| PendingReview {
                invoice_id: InvoiceId::new(row.get::<String, _>("id")),
                client_id: ClientId::new(row.get::<String, _>("client_id")),
                client_name: row.get("client_name"),
                invoice_date: row.get("invoice_date"),
            })
            .collect())
    }
}

/// English name for an ISO weekday number, Monday being 1.
fn weekday_name(isodow: i32) -> Result<&'static str> {
    match isodow {
        1 => Ok("Monday"),
        2 => Ok("Tuesday"),
        3 => Ok("Wednesday"),
        4 => Ok("Thursday"),
        5 => Ok("Friday"),
        6 => Ok("Saturday"),
        7 => Ok("Sunday"),
        other => Err(DomainError::Store(format!(
            "invalid weekday number {other} in storage"
        ))),
    }
}
