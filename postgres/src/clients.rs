//! Client storage, including the cascade delete that removes a client
//! together with every row that depends on it.

use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::types::{Client, ClientId};

/// Store for registered clients.
#[derive(Clone)]
pub struct ClientStore {
    pool: PgPool,
}

/// Returns `true` if a client row with this id exists.
pub(crate) async fn exists<'e>(executor: impl sqlx::PgExecutor<'e>, id: &ClientId) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
        .bind(id.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to check client: {e}")))?;
    Ok(exists)
}

impl ClientStore {
    /// Create a new client store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new client.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the id, name or phone is
    /// empty, [`DomainError::Conflict`] when the id is already
    /// registered, and [`DomainError::Store`] on database failure.
    #[tracing::instrument(skip(self, client), fields(client_id = %client.id))]
    pub async fn register(&self, client: &Client) -> Result<()> {
        if client.id.as_str().is_empty() {
            return Err(DomainError::validation("client id must not be empty"));
        }
        if client.name.is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        if client.phone.is_empty() {
            return Err(DomainError::validation("client phone must not be empty"));
        }

        sqlx::query(
            r"
            INSERT INTO clients (id, name, phone, email, education, sex, age)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(client.id.as_str())
        .bind(&client.name)
        .bind(&client.phone)
        .bind(client.email.as_deref())
        .bind(client.education.as_deref())
        .bind(client.sex.as_deref())
        .bind(client.age)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::conflict(format!(
                        "client {} is already registered",
                        client.id
                    ));
                }
            }
            DomainError::Store(format!("Failed to register client: {e}"))
        })?;

        tracing::info!(client_id = %client.id, "Client registered");
        metrics::counter!("clients.registered").increment(1);

        Ok(())
    }

    /// Get a client by id.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when no such client exists.
    pub async fn get(&self, id: &ClientId) -> Result<Client> {
        let row = sqlx::query(
            r"
            SELECT id, name, phone, email, education, sex, age
            FROM clients
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to get client: {e}")))?
        .ok_or_else(|| DomainError::not_found("client", id.as_str()))?;

        Ok(row_to_client(&row))
    }

    /// Search clients by partial name and/or exact id. Both filters
    /// optional; no filter lists everyone, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn search(&self, name: Option<&str>, id: Option<&str>) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, phone, email, education, sex, age
            FROM clients
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR id = $2)
            ORDER BY name, id
            ",
        )
        .bind(name)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to search clients: {e}")))?;

        Ok(rows.iter().map(row_to_client).collect())
    }

    /// Replace a client's contact and demographic fields.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the name or phone is
    /// empty and [`DomainError::NotFound`] when the client does not
    /// exist.
    #[tracing::instrument(skip(self, client), fields(client_id = %client.id))]
    pub async fn update(&self, client: &Client) -> Result<()> {
        if client.name.is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        if client.phone.is_empty() {
            return Err(DomainError::validation("client phone must not be empty"));
        }

        let result = sqlx::query(
            r"
            UPDATE clients
            SET name = $2,
                phone = $3,
                email = $4,
                education = $5,
                sex = $6,
                age = $7
            WHERE id = $1
            ",
        )
        .bind(client.id.as_str())
        .bind(&client.name)
        .bind(&client.phone)
        .bind(client.email.as_deref())
        .bind(client.education.as_deref())
        .bind(client.sex.as_deref())
        .bind(client.age)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to update client: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("client", client.id.as_str()));
        }

        Ok(())
    }

    /// Delete a client and every row that depends on it, in one
    /// transaction.
    ///
    /// Children go first so the RESTRICT foreign keys never fire: order
    /// lines of the client's invoices, then the invoices, then the
    /// reservations, then the allergen preferences, then the client row
    /// itself. A failure anywhere rolls the whole delete back.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the client does not exist
    /// and [`DomainError::Store`] on database failure.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &ClientId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Store(format!("Failed to begin transaction: {e}")))?;

        if !exists(&mut *tx, id).await? {
            return Err(DomainError::not_found("client", id.as_str()));
        }

        let order_lines = sqlx::query(
            r"
            DELETE FROM order_lines
            WHERE invoice_id IN (SELECT id FROM invoices WHERE client_id = $1)
            ",
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to delete order lines: {e}")))?
        .rows_affected();

        let invoices = sqlx::query("DELETE FROM invoices WHERE client_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to delete invoices: {e}")))?
            .rows_affected();

        let reservations = sqlx::query("DELETE FROM reservations WHERE client_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to delete reservations: {e}")))?
            .rows_affected();

        let allergens = sqlx::query("DELETE FROM client_allergens WHERE client_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to delete allergen preferences: {e}")))?
            .rows_affected();

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to delete client: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Store(format!("Failed to commit delete: {e}")))?;

        tracing::info!(
            client_id = %id,
            order_lines = order_lines,
            invoices = invoices,
            reservations = reservations,
            allergen_preferences = allergens,
            "Client deleted with all dependents"
        );
        metrics::counter!("clients.deleted").increment(1);

        Ok(())
    }
}

/// Convert a database row to a `Client`.
fn row_to_client(row: &sqlx::postgres::PgRow) -> Client {
    Client {
        id: ClientId::new(row.get::<String, _>("id")),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        education: row.get("education"),
        sex: row.get("sex"),
        age: row.get("age"),
    }
}
