//! Read access to the restaurant, dish and allergen catalog.
//!
//! The catalog is seeded out of band; this store only queries it. The
//! allergen filter answers the question a diner actually asks: "which
//! restaurants have at least one dish I can eat", and per-dish listings
//! can be annotated against the same allergen.

use std::str::FromStr;

use sqlx::{PgPool, Row};
use the_knife_core::error::{DomainError, Result};
use the_knife_core::types::{Allergen, DishListing, DishType, Money, Restaurant, RestaurantId};

/// Store for the restaurant, dish and allergen catalog.
#[derive(Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

/// Returns `true` if a restaurant row with this id exists.
pub(crate) async fn restaurant_exists<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &RestaurantId,
) -> Result<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(executor)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to check restaurant: {e}")))?;
    Ok(exists)
}

impl CatalogStore {
    /// Create a new catalog store on the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List restaurants, best first: Michelin stars descending, then
    /// name. When `free_of_allergen` is set, only restaurants with at
    /// least one dish free of that allergen are returned.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn restaurants(&self, free_of_allergen: Option<&str>) -> Result<Vec<Restaurant>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, city, region, cuisine, budget_tier, michelin_stars, chain
            FROM restaurants
            WHERE $1::text IS NULL OR EXISTS (
                SELECT 1 FROM dishes d
                WHERE d.restaurant_id = restaurants.id
                  AND NOT EXISTS (
                      SELECT 1
                      FROM dish_allergens da
                      JOIN allergens a ON a.id = da.allergen_id
                      WHERE da.restaurant_id = d.restaurant_id
                        AND da.dish_name = d.name
                        AND a.name = UPPER($1)
                  )
            )
            ORDER BY michelin_stars DESC, name
            ",
        )
        .bind(free_of_allergen)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list restaurants: {e}")))?;

        Ok(rows.iter().map(row_to_restaurant).collect())
    }

    /// Get a restaurant by id.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when no such restaurant exists.
    pub async fn restaurant(&self, id: &RestaurantId) -> Result<Restaurant> {
        let row = sqlx::query(
            r"
            SELECT id, name, city, region, cuisine, budget_tier, michelin_stars, chain
            FROM restaurants
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to get restaurant: {e}")))?
        .ok_or_else(|| DomainError::not_found("restaurant", id.as_str()))?;

        Ok(row_to_restaurant(&row))
    }

    /// List a restaurant's menu in course order (starters, mains,
    /// desserts, drinks), priciest first within each course. When
    /// `allergen` is set, every dish is annotated with whether it is
    /// free of that allergen.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the restaurant does not
    /// exist and [`DomainError::Store`] on database failure.
    pub async fn dishes(
        &self,
        restaurant_id: &RestaurantId,
        allergen: Option<&str>,
    ) -> Result<Vec<DishListing>> {
        if !restaurant_exists(&self.pool, restaurant_id).await? {
            return Err(DomainError::not_found("restaurant", restaurant_id.as_str()));
        }

        let rows = sqlx::query(
            r"
            SELECT d.name,
                   d.dish_type,
                   d.price_cents,
                   CASE WHEN $2::text IS NULL THEN NULL
                        ELSE NOT EXISTS (
                            SELECT 1
                            FROM dish_allergens da
                            JOIN allergens a ON a.id = da.allergen_id
                            WHERE da.restaurant_id = d.restaurant_id
                              AND da.dish_name = d.name
                              AND a.name = UPPER($2)
                        )
                   END AS allergen_free
            FROM dishes d
            WHERE d.restaurant_id = $1
            ORDER BY CASE d.dish_type
                         WHEN 'STARTER' THEN 0
                         WHEN 'MAIN' THEN 1
                         WHEN 'DESSERT' THEN 2
                         ELSE 3
                     END,
                     d.price_cents DESC
            ",
        )
        .bind(restaurant_id.as_str())
        .bind(allergen)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Store(format!("Failed to list dishes: {e}")))?;

        rows.iter()
            .map(|row| {
                let dish_type: String = row.get("dish_type");
                Ok(DishListing {
                    name: row.get("name"),
                    dish_type: DishType::from_str(&dish_type).map_err(|_| {
                        DomainError::Store(format!("invalid dish type {dish_type} in storage"))
                    })?,
                    price: Money::from_cents(row.get("price_cents")),
                    allergen_free: row.get("allergen_free"),
                })
            })
            .collect()
    }

    /// List the allergen catalog, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on database failure.
    pub async fn allergens(&self) -> Result<Vec<Allergen>> {
        let rows = sqlx::query("SELECT id, name FROM allergens ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Store(format!("Failed to list allergens: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| Allergen {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

/// Convert a database row to a `Restaurant`.
fn row_to_restaurant(row: &sqlx::postgres::PgRow) -> Restaurant {
    Restaurant {
        id: RestaurantId::new(row.get::<String, _>("id")),
        name: row.get("name"),
        city: row.get("city"),
        region: row.get("region"),
        cuisine: row.get("cuisine"),
        budget_tier: row.get("budget_tier"),
        michelin_stars: row.get("michelin_stars"),
        chain: row.get("chain"),
    }
}
