//! Restaurant catalog endpoints.
//!
//! Read-only queries over the seeded catalog:
//! - GET /api/restaurants - List restaurants, best first
//! - GET /api/restaurants/:id - Get one restaurant
//! - GET /api/restaurants/:id/dishes - Menu listing
//! - GET /api/allergens - The allergen catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use the_knife_core::types::{Allergen, DishListing, DishType, Restaurant, RestaurantId};

use crate::state::AppState;
use crate::WebResult;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Optional allergen filter carried in the query string.
#[derive(Debug, Deserialize)]
pub struct AllergenQuery {
    /// Allergen name, e.g. `GLUTEN`.
    pub allergen: Option<String>,
}

/// A dish row in a menu listing.
#[derive(Debug, Serialize)]
pub struct DishResponse {
    /// Dish name.
    pub name: String,
    /// Menu course.
    pub dish_type: DishType,
    /// Menu price in euros.
    pub price_eur: f64,
    /// Whether the dish avoids the queried allergen. Absent when no
    /// allergen filter was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergen_free: Option<bool>,
}

impl From<DishListing> for DishResponse {
    fn from(dish: DishListing) -> Self {
        Self {
            name: dish.name,
            dish_type: dish.dish_type,
            price_eur: dish.price.as_eur(),
            allergen_free: dish.allergen_free,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List restaurants, Michelin stars first, then by name.
///
/// With `?allergen=`, restaurants whose whole menu contains that
/// allergen are dropped from the listing.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/restaurants?allergen=GLUTEN
/// ```
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<AllergenQuery>,
) -> WebResult<Json<Vec<Restaurant>>> {
    let restaurants = state.catalog.restaurants(query.allergen.as_deref()).await?;
    Ok(Json(restaurants))
}

/// Get one restaurant by ID.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/restaurants/R0042
/// ```
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> WebResult<Json<Restaurant>> {
    let restaurant = state
        .catalog
        .restaurant(&RestaurantId::new(restaurant_id))
        .await?;
    Ok(Json(restaurant))
}

/// List a restaurant's menu, grouped by course and priciest first.
///
/// With `?allergen=`, every dish is annotated with `allergen_free`
/// instead of being filtered out, so the menu stays complete.
pub async fn list_dishes(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Query(query): Query<AllergenQuery>,
) -> WebResult<Json<Vec<DishResponse>>> {
    let dishes = state
        .catalog
        .dishes(&RestaurantId::new(restaurant_id), query.allergen.as_deref())
        .await?;
    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

/// List the allergen catalog alphabetically.
pub async fn list_allergens(State(state): State<AppState>) -> WebResult<Json<Vec<Allergen>>> {
    let allergens = state.catalog.allergens().await?;
    Ok(Json(allergens))
}
