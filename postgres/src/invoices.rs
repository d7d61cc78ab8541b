//! Invoice storage: reservation settlement and direct billing.
//!
//! At most one invoice per reservation, enforced by a partial unique
//! index on `invoices.reservation_id`. Settling the same reservation
//! twice returns the existing invoice instead of failing, no matter
//! how the calls interleave.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::id::{self, IdKind};
use the_knife_core::types::{
    ClientId, ClientInvoice, Invoice, InvoiceId, Money, OrderLine, Rating, ReservationId,
    ReservationStatus, RestaurantId, RestaurantInvoice, VisitType,
};

use crate::{catalog, clients, reservations};

/// Cheapest meal the platform synthesizes for a settled reservation,
/// in cents.
const MIN_SYNTHETIC_TOTAL_CENTS: i64 = 3_000;

/// Priciest synthesized meal, in cents.
const MAX_SYNTHETIC_TOTAL_CENTS: i64 = 15_000;

/// Name of the partial unique index guarding one-invoice-per-reservation.
const RESERVATION_UNIQUE_CONSTRAINT: &str = "uq_invoices_reservation";

/// Store for invoices and their order lines.
#[derive(Clone)]
pub struct InvoiceStore {
    pool: PgPool,
}

impl InvoiceStore {
    /// Create a new invoice store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle a reservation into an invoice. The total is synthesized
    /// in the 30 to 150 euro range and the invoice is dated today.
    ///
    /// Idempotent: if the reservation is already invoiced, the existing
    /// invoice comes back unchanged. Concurrent calls race through
    /// `ON CONFLICT DO NOTHING` on the reservation index; losers read
    /// the winner's row back.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the reservation does not
    /// exist, [`DomainError::Precondition`] when it is cancelled, and
    /// [`DomainError::Store`] on database failure.
    #[tracing::instrument(skip(self))]
    pub async fn create_from_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Invoice> {
        let reservation = reservations::fetch(&self.pool, reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("reservation", reservation_id.as_str()))?;

        if reservation.status == ReservationStatus::Cancelled {
            return Err(DomainError::precondition(format!(
                "reservation {reservation_id} is cancelled and cannot be invoiced"
            )));
        }

        if let Some(existing) = self.find_by_reservation(reservation_id).await? {
            return Ok(existing);
        }

        let total = {
            let mut rng = rand::thread_rng();
            Money::from_cents(rng.gen_range(MIN_SYNTHETIC_TOTAL_CENTS..=MAX_SYNTHETIC_TOTAL_CENTS))
        };
        let invoice_date = Utc::now().date_naive();

        let mut excluded = HashSet::new();
        for _ in 0..id::MAX_ATTEMPTS {
            let candidate = {
                let mut rng = rand::thread_rng();
                id::generate(IdKind::Invoice, &mut rng, &excluded)?
            };

            let insert = sqlx::query(
                r"
                INSERT INTO invoices (id, client_id, restaurant_id, reservation_id, total_cents, invoice_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (reservation_id) WHERE reservation_id IS NOT NULL DO NOTHING
                RETURNING created_at
                ",
            )
            .bind(&candidate)
            .bind(reservation.client_id.as_str())
            .bind(reservation.restaurant_id.as_str())
            .bind(reservation_id.as_str())
            .bind(total.cents())
            .bind(invoice_date)
            .fetch_optional(&self.pool)
            .await;

            match insert {
                Ok(Some(row)) => {
                    tracing::info!(
                        invoice_id = %candidate,
                        reservation_id = %reservation_id,
                        total = %total,
                        "Invoice created from reservation"
                    );
                    metrics::counter!("invoices.created", "source" => "reservation").increment(1);
                    return Ok(Invoice {
                        id: InvoiceId::new(candidate),
                        client_id: reservation.client_id.clone(),
                        restaurant_id: reservation.restaurant_id.clone(),
                        reservation_id: Some(reservation_id.clone()),
                        total,
                        invoice_date,
                        created_at: row.get("created_at"),
                        rating: None,
                        visit_type: None,
                    });
                }
                Ok(None) => {
                    // A concurrent call invoiced this reservation first.
                    if let Some(existing) = self.find_by_reservation(reservation_id).await? {
                        return Ok(existing);
                    }
                    continue;
                }
                Err(e) => {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            metrics::counter!("id.collisions", "kind" => "invoice").increment(1);
                            excluded.insert(candidate);
                            continue;
                        }
                        if db_err.is_foreign_key_violation() {
                            return Err(DomainError::not_found(
                                "reservation",
                                reservation_id.as_str(),
                            ));
                        }
                    }
                    return Err(DomainError::Store(format!("Failed to insert invoice: {e}")));
                }
            }
        }

        Err(DomainError::Store(format!(
            "invoice id generation exhausted after {} attempts",
            id::MAX_ATTEMPTS
        )))
    }

    /// Record an invoice with an explicit total and itemized order
    /// lines, written in a single transaction so a failed line insert
    /// leaves nothing behind.
    ///
    /// When a reservation is attached it must belong to the same client
    /// and restaurant, and must not be invoiced yet.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a negative total, an
    /// empty dish name, a quantity below 1, or a reservation booked by a
    /// different client or restaurant; [`DomainError::NotFound`] when
    /// the client, restaurant or reservation does not exist;
    /// [`DomainError::Conflict`] when the reservation is already
    /// invoiced; and [`DomainError::Store`] on database failure.
    #[tracing::instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_direct(
        &self,
        client_id: &ClientId,
        restaurant_id: &RestaurantId,
        reservation_id: Option<&ReservationId>,
        total: Money,
        lines: &[OrderLine],
    ) -> Result<Invoice> {
        if total.is_negative() {
            return Err(DomainError::validation("invoice total must not be negative"));
        }
        for line in lines {
            if line.dish_name.trim().is_empty() {
                return Err(DomainError::validation("order line dish name must not be empty"));
            }
            if line.quantity < 1 {
                return Err(DomainError::validation(format!(
                    "order line {}: quantity must be at least 1",
                    line.dish_name
                )));
            }
        }

        if !clients::exists(&self.pool, client_id).await? {
            return Err(DomainError::not_found("client", client_id.as_str()));
        }
        if !catalog::restaurant_exists(&self.pool, restaurant_id).await? {
            return Err(DomainError::not_found("restaurant", restaurant_id.as_str()));
        }
        if let Some(rid) = reservation_id {
            let reservation = reservations::fetch(&self.pool, rid)
                .await?
                .ok_or_else(|| DomainError::not_found("reservation", rid.as_str()))?;
            if reservation.client_id != *client_id || reservation.restaurant_id != *restaurant_id {
                return Err(DomainError::validation(format!(
                    "reservation {rid} belongs to a different client or restaurant"
                )));
            }
            if self.find_by_reservation(rid).await?.is_some() {
                return Err(DomainError::conflict(format!(
                    "reservation {rid} is already invoiced"
                )));
            }
        }

        let invoice_date = Utc::now().date_naive();

        let mut excluded = HashSet::new();
        for _ in 0..id::MAX_ATTEMPTS {
            let candidate = {
                let mut rng = rand::thread_rng();
                id::generate(IdKind::Invoice, &mut rng, &excluded)?
            };

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| DomainError::Store(format!("Failed to begin transaction: {e}")))?;

            let insert = sqlx::query(
                r"
                INSERT INTO invoices (id, client_id, restaurant_id, reservation_id, total_cents, invoice_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING created_at
                ",
            )
            .bind(&candidate)
            .bind(client_id.as_str())
            .bind(restaurant_id.as_str())
            .bind(reservation_id.map(ReservationId::as_str))
            .bind(total.cents())
            .bind(invoice_date)
            .fetch_one(&mut *tx)
            .await;

            let created_at: DateTime<Utc> = match insert {
                Ok(row) => row.get("created_at"),
                Err(e) => {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            if db_err.constraint() == Some(RESERVATION_UNIQUE_CONSTRAINT) {
                                return Err(DomainError::conflict(format!(
                                    "reservation {} is already invoiced",
                                    reservation_id.map_or("?", ReservationId::as_str)
                                )));
                            }
                            metrics::counter!("id.collisions", "kind" => "invoice").increment(1);
                            excluded.insert(candidate);
                            continue;
                        }
                        if db_err.is_foreign_key_violation() {
                            return Err(direct_fk_to_not_found(
                                &**db_err,
                                client_id,
                                restaurant_id,
                                reservation_id,
                            ));
                        }
                    }
                    return Err(DomainError::Store(format!("Failed to insert invoice: {e}")));
                }
            };

            for line in lines {
                sqlx::query(
                    r"
                    INSERT INTO order_lines (invoice_id, restaurant_id, dish_name, quantity)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(&candidate)
                .bind(restaurant_id.as_str())
                .bind(&line.dish_name)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::Store(format!("Failed to insert order line: {e}")))?;
            }

            tx.commit()
                .await
                .map_err(|e| DomainError::Store(format!("Failed to commit invoice: {e}")))?;

            tracing::info!(
                invoice_id = %candidate,
                client_id = %client_id,
                restaurant_id = %restaurant_id,
                total = %total,
                line_count = lines.len(),
                "Invoice created"
            );
            metrics::counter!("invoices.created", "source" => "direct").increment(1);

            return Ok(Invoice {
                id: InvoiceId::new(candidate),
                client_id: client_id.clone(),
                restaurant_id: restaurant_id.clone(),
                reservation_id: reservation_id.cloned(),
                total,
                invoice_date,
                created_at,
                rating: None,
                visit_type: None,
            });
        }

        Err(DomainError::Store(format!(
            "invoice id generation exhausted after {} attempts",
            id::MAX_ATTEMPTS
        )))
    }

    /// Fetch the invoice settling a reservation, `None` when the
    /// reservation is not invoiced yet.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn find_by_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Invoice>> {
        sqlx::query(
            r"
            SELECT id, client_id, restaurant_id, reservation_id, total_cents,
                   invoice_date, created_at, rating, visit_type
            FROM invoices
            WHERE reservation_id = $1
            ",
        )
        .bind(reservation_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to get invoice: {e}")))?
        .map(|row| row_to_invoice(&row))
        .transpose()
    }

    /// List a client's invoices, newest billing first, with the
    /// restaurant's name and city joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<ClientInvoice>> {
        let rows = sqlx::query(
            r"
            SELECT i.id,
                   i.restaurant_id,
                   r.name AS restaurant_name,
                   r.city AS restaurant_city,
                   i.reservation_id,
                   i.total_cents,
                   i.invoice_date,
                   i.rating,
                   i.visit_type
            FROM invoices i
            JOIN restaurants r ON r.id = i.restaurant_id
            WHERE i.client_id = $1
            ORDER BY i.invoice_date DESC, i.created_at DESC
            ",
        )
        .bind(client_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list invoices: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(ClientInvoice {
                    id: InvoiceId::new(row.get::<String, _>("id")),
                    restaurant_id: RestaurantId::new(row.get::<String, _>("restaurant_id")),
                    restaurant_name: row.get("restaurant_name"),
                    restaurant_city: row.get("restaurant_city"),
                    reservation_id: row
                        .get::<Option<String>, _>("reservation_id")
                        .map(ReservationId::new),
                    total: Money::from_cents(row.get("total_cents")),
                    invoice_date: row.get("invoice_date"),
                    rating: rating_from_storage(row.get("rating"))?,
                    visit_type: visit_type_from_storage(row.get("visit_type"))?,
                })
            })
            .collect()
    }

    /// List a restaurant's invoices, newest billing first, with the
    /// client's name joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn list_by_restaurant(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<RestaurantInvoice>> {
        let rows = sqlx::query(
            r"
            SELECT i.id,
                   i.client_id,
                   c.name AS client_name,
                   i.reservation_id,
                   i.total_cents,
                   i.invoice_date,
                   i.rating,
                   i.visit_type
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            WHERE i.restaurant_id = $1
            ORDER BY i.invoice_date DESC, i.created_at DESC
            ",
        )
        .bind(restaurant_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list invoices: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(RestaurantInvoice {
                    id: InvoiceId::new(row.get::<String, _>("id")),
                    client_id: ClientId::new(row.get::<String, _>("client_id")),
                    client_name: row.get("client_name"),
                    reservation_id: row
                        .get::<Option<String>, _>("reservation_id")
                        .map(ReservationId::new),
                    total: Money::from_cents(row.get("total_cents")),
                    invoice_date: row.get("invoice_date"),
                    rating: rating_from_storage(row.get("rating"))?,
                    visit_type: visit_type_from_storage(row.get("visit_type"))?,
                })
            })
            .collect()
    }

    /// List the order lines itemized on an invoice.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the invoice does not
    /// exist.
    pub async fn order_lines(&self, invoice_id: &InvoiceId) -> Result<Vec<OrderLine>> {
        let (exists,): (bool,) =
            sqlx::query_as(r"SELECT EXISTS (SELECT 1 FROM invoices WHERE id = $1)")
                .bind(invoice_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::Store(format!("Failed to check invoice: {e}")))?;
        if !exists {
            return Err(DomainError::not_found("invoice", invoice_id.as_str()));
        }

        let rows = sqlx::query(
            r"
            SELECT dish_name, quantity
            FROM order_lines
            WHERE invoice_id = $1
            ORDER BY dish_name
            ",
        )
        .bind(invoice_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list order lines: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| OrderLine {
                dish_name: row.get("dish_name"),
                quantity: row.get("quantity"),
            })
            .collect())
    }
}

/// Map a foreign key violation on a direct insert to the entity that
/// vanished between the existence checks and the write.
fn direct_fk_to_not_found(
    db_err: &dyn sqlx::error::DatabaseError,
    client_id: &ClientId,
    restaurant_id: &RestaurantId,
    reservation_id: Option<&ReservationId>,
) -> DomainError {
    match db_err.constraint() {
        Some(c) if c.contains("reservation") => DomainError::not_found(
            "reservation",
            reservation_id.map_or("?", ReservationId::as_str),
        ),
        Some(c) if c.contains("client") => DomainError::not_found("client", client_id.as_str()),
        Some(c) if c.contains("restaurant") => {
            DomainError::not_found("restaurant", restaurant_id.as_str())
        }
        _ => DomainError::Store(format!("Foreign key violation: {db_err}")),
    }
}

/// Decode a stored half-point rating, `None` for an unreviewed invoice.
pub(crate) fn rating_from_storage(value: Option<i16>) -> Result<Option<Rating>> {
    value
        .map(|half_points| {
            u8::try_from(half_points)
                .ok()
                .and_then(Rating::from_half_points)
                .ok_or_else(|| {
                    DomainError::Store(format!("invalid rating {half_points} in storage"))
                })
        })
        .transpose()
}

/// Decode a stored visit type, `None` for an unreviewed invoice.
pub(crate) fn visit_type_from_storage(value: Option<String>) -> Result<Option<VisitType>> {
    value
        .map(|raw| {
            raw.parse::<VisitType>()
                .map_err(|_| DomainError::Store(format!("invalid visit type {raw} in storage")))
        })
        .transpose()
}

/// Convert a database row to an `Invoice`.
fn row_to_invoice(row: &sqlx::postgres::PgRow) -> Result<Invoice> {
    Ok(Invoice {
        id: InvoiceId::new(row.get::<String, _>("id")),
        client_id: ClientId::new(row.get::<String, _>("client_id")),
        restaurant_id: RestaurantId::new(row.get::<String, _>("restaurant_id")),
        reservation_id: row
            .get::<Option<String>, _>("reservation_id")
            .map(ReservationId::new),
        total: Money::from_cents(row.get("total_cents")),
        invoice_date: row.get("invoice_date"),
        created_at: row.get("created_at"),
        rating: rating_from_storage(row.get("rating"))?,
        visit_type: visit_type_from_storage(row.get("visit_type"))?,
    })
}
