//! Reservation storage: create, update, cancel and list booked visits.
//!
//! Cancellation flips the row's status instead of deleting it, so
//! invoices can keep pointing at the reservation and analytics keep
//! their history.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::id::{self, IdKind};
use the_knife_core::types::{
    ClientId, ClientReservation, Reservation, ReservationId, ReservationStatus, RestaurantId,
    RestaurantReservation, validate_party_size,
};

use crate::{catalog, clients};

/// Store for booked visits.
#[derive(Clone)]
pub struct ReservationStore {
    pool: PgPool,
}

/// Fetch a reservation row, `None` when absent.
pub(crate) async fn fetch<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &ReservationId,
) -> Result<Option<Reservation>> {
    sqlx::query(
        r"
        SELECT id, client_id, restaurant_id, party_size, date, time, status
        FROM reservations
        WHERE id = $1
        ",
    )
    .bind(id.as_str())
    .fetch_optional(executor)
    .await
    .map_err(|e| DomainError::Store(format!("Failed to get reservation: {e}")))?
    .map(|row| row_to_reservation(&row))
    .transpose()
}

impl ReservationStore {
    /// Create a new reservation store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Book a visit. Returns the allocated reservation id; the
    /// reservation starts out CONFIRMED.
    ///
    /// The id comes from the generator in `the-knife-core`; a collision
    /// with an existing row fails the insert on the primary key, and the
    /// store re-draws with the collided candidate excluded, a bounded
    /// number of times.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an out-of-range party
    /// size, [`DomainError::NotFound`] when the client or restaurant
    /// does not exist, and [`DomainError::Store`] on database failure or
    /// exhausted id generation.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        client_id: &ClientId,
        restaurant_id: &RestaurantId,
        party_size: i16,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<ReservationId> {
        validate_party_size(party_size)?;

        if !clients::exists(&self.pool, client_id).await? {
            return Err(DomainError::not_found("client", client_id.as_str()));
        }
        if !catalog::restaurant_exists(&self.pool, restaurant_id).await? {
            return Err(DomainError::not_found("restaurant", restaurant_id.as_str()));
        }

        let mut excluded = HashSet::new();
        for _ in 0..id::MAX_ATTEMPTS {
            let candidate = {
                let mut rng = rand::thread_rng();
                id::generate(IdKind::Reservation, &mut rng, &excluded)?
            };

            let insert = sqlx::query(
                r"
                INSERT INTO reservations (id, client_id, restaurant_id, party_size, date, time, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(&candidate)
            .bind(client_id.as_str())
            .bind(restaurant_id.as_str())
            .bind(party_size)
            .bind(date)
            .bind(time)
            .bind(ReservationStatus::Confirmed.as_str())
            .execute(&self.pool)
            .await;

            match insert {
                Ok(_) => {
                    tracing::info!(
                        reservation_id = %candidate,
                        client_id = %client_id,
                        restaurant_id = %restaurant_id,
                        party_size = party_size,
                        "Reservation created"
                    );
                    metrics::counter!("reservations.created").increment(1);
                    return Ok(ReservationId::new(candidate));
                }
                Err(e) => {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            metrics::counter!("id.collisions", "kind" => "reservation")
                                .increment(1);
                            excluded.insert(candidate);
                            continue;
                        }
                        if db_err.is_foreign_key_violation() {
                            return Err(fk_to_not_found(&**db_err, client_id, restaurant_id));
                        }
                    }
                    return Err(DomainError::Store(format!(
                        "Failed to insert reservation: {e}"
                    )));
                }
            }
        }

        Err(DomainError::Store(format!(
            "reservation id generation exhausted after {} attempts",
            id::MAX_ATTEMPTS
        )))
    }

    /// Replace a reservation's party size, date and time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an out-of-range party
    /// size and [`DomainError::NotFound`] when the reservation does not
    /// exist.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: &ReservationId,
        party_size: i16,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<()> {
        validate_party_size(party_size)?;

        let result = sqlx::query(
            r"
            UPDATE reservations
            SET party_size = $2,
                date = $3,
                time = $4
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(party_size)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to update reservation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("reservation", id.as_str()));
        }

        Ok(())
    }

    /// Cancel a reservation by flipping its status. Cancelling an
    /// already-cancelled reservation is an acknowledged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the reservation does not
    /// exist.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: &ReservationId) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE reservations
            SET status = $2
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(ReservationStatus::Cancelled.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to cancel reservation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("reservation", id.as_str()));
        }

        tracing::info!(reservation_id = %id, "Reservation cancelled");
        metrics::counter!("reservations.cancelled").increment(1);

        Ok(())
    }

    /// List a client's reservations, newest visit first, with the
    /// restaurant's name and city joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<ClientReservation>> {
        let rows = sqlx::query(
            r"
            SELECT res.id,
                   res.restaurant_id,
                   r.name AS restaurant_name,
                   r.city AS restaurant_city,
                   res.party_size,
                   res.date,
                   res.time,
                   res.status
            FROM reservations res
            JOIN restaurants r ON r.id = res.restaurant_id
            WHERE res.client_id = $1
            ORDER BY res.date DESC, res.time DESC
            ",
        )
        .bind(client_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list reservations: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(ClientReservation {
                    id: ReservationId::new(row.get::<String, _>("id")),
                    restaurant_id: RestaurantId::new(row.get::<String, _>("restaurant_id")),
                    restaurant_name: row.get("restaurant_name"),
                    restaurant_city: row.get("restaurant_city"),
                    party_size: row.get("party_size"),
                    date: row.get("date"),
                    time: row.get("time"),
                    status: status_from_row(row)?,
                })
            })
            .collect()
    }

    /// List a restaurant's reservations, newest visit first, with the
    /// client's name joined in.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn list_by_restaurant(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<RestaurantReservation>> {
        let rows = sqlx::query(
            r"
            SELECT res.id,
                   res.client_id,
                   c.name AS client_name,
                   res.party_size,
                   res.date,
                   res.time,
                   res.status
            FROM reservations res
            JOIN clients c ON c.id = res.client_id
            WHERE res.restaurant_id = $1
            ORDER BY res.date DESC, res.time DESC
            ",
        )
        .bind(restaurant_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list reservations: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(RestaurantReservation {
                    id: ReservationId::new(row.get::<String, _>("id")),
                    client_id: ClientId::new(row.get::<String, _>("client_id")),
                    client_name: row.get("client_name"),
                    party_size: row.get("party_size"),
                    date: row.get("date"),
                    time: row.get("time"),
                    status: status_from_row(row)?,
                })
            })
            .collect()
    }
}

/// Map a foreign key violation on insert to the entity that vanished
/// between the existence check and the write.
fn fk_to_not_found(
    db_err: &dyn sqlx::error::DatabaseError,
    client_id: &ClientId,
    restaurant_id: &RestaurantId,
) -> DomainError {
    match db_err.constraint() {
        Some(c) if c.contains("client") => DomainError::not_found("client", client_id.as_str()),
        Some(c) if c.contains("restaurant") => {
            DomainError::not_found("restaurant", restaurant_id.as_str())
        }
        _ => DomainError::Store(format!("Foreign key violation: {db_err}")),
    }
}

fn status_from_row(row: &sqlx::postgres::PgRow) -> Result<ReservationStatus> {
    let status: String = row.get("status");
    ReservationStatus::from_str(&status)
        .map_err(|_| DomainError::Store(format!("invalid reservation status {status} in storage")))
}

/// Convert a database row to a `Reservation`.
fn row_to_reservation(row: &sqlx::postgres::PgRow) -> Result<Reservation> {
    Ok(Reservation {
        id: ReservationId::new(row.get::<String, _>("id")),
        client_id: ClientId::new(row.get::<String, _>("client_id")),
        restaurant_id: RestaurantId::new(row.get::<String, _>("restaurant_id")),
        party_size: row.get("party_size"),
        date: row.get("date"),
        time: row.get("time"),
        status: status_from_row(row)?,
    })
}
