//! Fixture rows for integration tests.
//!
//! Seeding writes rows directly instead of going through the stores,
//! so tests can arrange state without exercising the code under test.
//! Restaurants and dishes are seeded this way in production too; the
//! catalog is read-only for the platform.

#![allow(clippy::expect_used)] // Fixtures fail loudly on a broken test environment

use sqlx::PgPool;
use the_knife_core::types::{ClientId, DishType, RestaurantId};

/// Insert a client with a placeholder phone number.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn seed_client(pool: &PgPool, id: &str, name: &str) -> ClientId {
    sqlx::query(
        r"
        INSERT INTO clients (id, name, phone)
        VALUES ($1, $2, '+33 1 00 00 00 00')
        ",
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await
    .expect("Failed to seed client");

    ClientId::new(id)
}

/// Insert a restaurant in Paris with the given Michelin stars.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn seed_restaurant(
    pool: &PgPool,
    id: &str,
    name: &str,
    michelin_stars: i16,
) -> RestaurantId {
    sqlx::query(
        r"
        INSERT INTO restaurants (id, name, city, region, cuisine, budget_tier, michelin_stars)
        VALUES ($1, $2, 'Paris', 'Île-de-France', 'French', 2, $3)
        ",
    )
    .bind(id)
    .bind(name)
    .bind(michelin_stars)
    .execute(pool)
    .await
    .expect("Failed to seed restaurant");

    RestaurantId::new(id)
}

/// Insert a dish on a restaurant's menu.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn seed_dish(
    pool: &PgPool,
    restaurant_id: &RestaurantId,
    name: &str,
    dish_type: DishType,
    price_cents: i64,
) {
    sqlx::query(
        r"
        INSERT INTO dishes (restaurant_id, name, dish_type, price_cents)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(restaurant_id.as_str())
    .bind(name)
    .bind(dish_type.as_str())
    .bind(price_cents)
    .execute(pool)
    .await
    .expect("Failed to seed dish");
}

/// Mark a dish as containing a catalog allergen, by allergen name.
///
/// # Panics
///
/// Panics if the insert fails or the allergen is not in the catalog.
pub async fn seed_dish_allergen(
    pool: &PgPool,
    restaurant_id: &RestaurantId,
    dish_name: &str,
    allergen: &str,
) {
    let result = sqlx::query(
        r"
        INSERT INTO dish_allergens (restaurant_id, dish_name, allergen_id)
        SELECT $1, $2, a.id
        FROM allergens a
        WHERE a.name = $3
        ",
    )
    .bind(restaurant_id.as_str())
    .bind(dish_name)
    .bind(allergen)
    .execute(pool)
    .await
    .expect("Failed to seed dish allergen");

    assert!(
        result.rows_affected() == 1,
        "Unknown allergen {allergen} in fixture"
    );
}

/// Record a client's allergen preference, by allergen name.
///
/// # Panics
///
/// Panics if the insert fails or the allergen is not in the catalog.
pub async fn seed_client_allergen(pool: &PgPool, client_id: &ClientId, allergen: &str) {
    let result = sqlx::query(
        r"
        INSERT INTO client_allergens (client_id, allergen_id)
        SELECT $1, a.id
        FROM allergens a
        WHERE a.name = $2
        ",
    )
    .bind(client_id.as_str())
    .bind(allergen)
    .execute(pool)
    .await
    .expect("Failed to seed client allergen");

    assert!(
        result.rows_affected() == 1,
        "Unknown allergen {allergen} in fixture"
    );
}
