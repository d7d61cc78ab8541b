//! Domain types for the restaurant reservation-and-review platform.
//!
//! This module contains the identifier newtypes, value objects, entities
//! and the read models served over HTTP. Storage code maps rows into these
//! types; handlers translate them into response bodies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a client.
///
/// Client identifiers are opaque to the platform: callers supply them at
/// registration time (the generated form is eight digits plus one
/// uppercase letter, see [`crate::id`]).
///
/// # Examples
///
/// ```
/// use the_knife_core::types::ClientId;
///
/// let id = ClientId::new("04821733Z");
/// assert_eq!(id.as_str(), "04821733Z");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new `ClientId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ClientId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a restaurant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantId(String);

impl RestaurantId {
    /// Creates a new `RestaurantId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `RestaurantId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RestaurantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RestaurantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RestaurantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a reservation (eight uppercase-alphanumeric
/// characters, allocated by the platform).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(String);

impl ReservationId {
    /// Creates a new `ReservationId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ReservationId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReservationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReservationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ReservationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for an invoice (same format as reservation
/// identifiers).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Creates a new `InvoiceId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `InvoiceId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InvoiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InvoiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for InvoiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents an amount of money in euro cents.
///
/// Stored and computed as an integer; conversion to and from the decimal
/// euro representation happens only at the serialization boundary.
///
/// # Examples
///
/// ```
/// use the_knife_core::types::Money;
///
/// let price = Money::from_eur(34.50).unwrap();
/// assert_eq!(price.cents(), 3450);
/// assert_eq!(price.to_string(), "34.50 EUR");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a `Money` value from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Parses a decimal euro amount, rounding to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the amount is not finite
    /// or falls outside the representable range.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_eur(eur: f64) -> Result<Self> {
        // Half of i64::MAX cents keeps every later sum representable.
        const LIMIT: f64 = 46_000_000_000_000_000.0;
        if !eur.is_finite() || !(-LIMIT..=LIMIT).contains(&eur) {
            return Err(DomainError::validation(format!(
                "amount {eur} is not a representable euro value"
            )));
        }
        Ok(Self((eur * 100.0).round() as i64))
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the amount as a decimal euro value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_eur(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts with overflow checking.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02} EUR", cents / 100, cents % 100)
    }
}

// ============================================================================
// Rating Value Object (half-point steps between 0 and 5)
// ============================================================================

/// A review rating: one of the eleven half-point steps from 0.0 to 5.0.
///
/// Stored internally (and in the database) as the number of half points,
/// so equality checks never touch floating point. Serializes as the
/// decimal value, e.g. `4.5`.
///
/// # Examples
///
/// ```
/// use the_knife_core::types::Rating;
///
/// let rating = Rating::try_from_value(4.5).unwrap();
/// assert_eq!(rating.half_points(), 9);
/// assert!(Rating::try_from_value(4.3).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// Highest legal number of half points (a 5.0 rating).
    pub const MAX_HALF_POINTS: u8 = 10;

    /// Creates a `Rating` from a half-point count, `None` above 10.
    #[must_use]
    pub const fn from_half_points(half_points: u8) -> Option<Self> {
        if half_points <= Self::MAX_HALF_POINTS {
            Some(Self(half_points))
        } else {
            None
        }
    }

    /// Parses a decimal rating value.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] unless the value is one of
    /// 0, 0.5, 1, ..., 5.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn try_from_value(value: f64) -> Result<Self> {
        let doubled = value * 2.0;
        if value.is_finite() && (0.0..=10.0).contains(&doubled) {
            let rounded = doubled.round();
            if (doubled - rounded).abs() < 1e-9 {
                return Ok(Self(rounded as u8));
            }
        }
        Err(DomainError::validation(format!(
            "rating must be between 0 and 5 in half-point steps, got {value}"
        )))
    }

    /// Returns the number of half points (0 through 10).
    #[must_use]
    pub const fn half_points(self) -> u8 {
        self.0
    }

    /// Returns the decimal value (0.0 through 5.0).
    #[must_use]
    pub fn value(self) -> f32 {
        f32::from(self.0) / 2.0
    }

    /// All eleven legal ratings in ascending order.
    #[must_use]
    pub fn all() -> [Self; 11] {
        [
            Self(0),
            Self(1),
            Self(2),
            Self(3),
            Self(4),
            Self(5),
            Self(6),
            Self(7),
            Self(8),
            Self(9),
            Self(10),
        ]
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for Rating {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f32(self.value())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_from_value(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Closed Enumerations
// ============================================================================

/// The kind of visit a review describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitType {
    /// Dining alone.
    Solo,
    /// Dining as a couple. The default when a review omits the visit type.
    #[default]
    Couple,
    /// Dining with a group of friends.
    Group,
    /// Family visit.
    Family,
    /// Business meal.
    Business,
}

impl VisitType {
    /// Returns the canonical storage form of the visit type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "SOLO",
            Self::Couple => "COUPLE",
            Self::Group => "GROUP",
            Self::Family => "FAMILY",
            Self::Business => "BUSINESS",
        }
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VisitType {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "SOLO" => Ok(Self::Solo),
            "COUPLE" => Ok(Self::Couple),
            "GROUP" => Ok(Self::Group),
            "FAMILY" => Ok(Self::Family),
            "BUSINESS" => Ok(Self::Business),
            other => Err(DomainError::validation(format!(
                "unknown visit type {other}"
            ))),
        }
    }
}

/// Menu course a dish belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DishType {
    /// Starter course.
    Starter,
    /// Main course.
    Main,
    /// Dessert.
    Dessert,
    /// Drink.
    Drink,
}

impl DishType {
    /// Returns the canonical storage form of the dish type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "STARTER",
            Self::Main => "MAIN",
            Self::Dessert => "DESSERT",
            Self::Drink => "DRINK",
        }
    }

    /// Position of this course in a menu listing (starters first,
    /// drinks last).
    #[must_use]
    pub const fn menu_order(self) -> u8 {
        match self {
            Self::Starter => 0,
            Self::Main => 1,
            Self::Dessert => 2,
            Self::Drink => 3,
        }
    }
}

impl fmt::Display for DishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DishType {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "STARTER" => Ok(Self::Starter),
            "MAIN" => Ok(Self::Main),
            "DESSERT" => Ok(Self::Dessert),
            "DRINK" => Ok(Self::Drink),
            other => Err(DomainError::validation(format!("unknown dish type {other}"))),
        }
    }
}

/// Lifecycle status of a reservation.
///
/// Cancellation flips the status instead of deleting the row, so
/// invoices and analytics keep their history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// The reservation stands.
    Confirmed,
    /// The reservation was cancelled by the client.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the canonical storage form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown reservation status {other}"
            ))),
        }
    }
}

// ============================================================================
// Field Parsing & Validation
// ============================================================================

/// Smallest party a reservation may book.
pub const MIN_PARTY_SIZE: i16 = 1;

/// Largest party a reservation may book.
pub const MAX_PARTY_SIZE: i16 = 99;

/// Parses an ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when the input is not a valid
/// calendar date in that format.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("invalid date {input}, expected YYYY-MM-DD")))
}

/// Parses a wall-clock time, accepting `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when the input matches neither
/// format.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| DomainError::validation(format!("invalid time {input}, expected HH:MM")))
}

/// Checks that a party size lies in the bookable range.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] outside 1 through 99.
pub fn validate_party_size(party_size: i16) -> Result<()> {
    if (MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(&party_size) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "party size must be between {MIN_PARTY_SIZE} and {MAX_PARTY_SIZE}, got {party_size}"
        )))
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// A registered client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Opaque client identifier.
    pub id: ClientId,
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email, if provided.
    pub email: Option<String>,
    /// Education bracket, if provided.
    pub education: Option<String>,
    /// Single-character demographic category, if provided.
    pub sex: Option<String>,
    /// Age in years, if provided.
    pub age: Option<i16>,
}

/// A restaurant in the catalog. Seeded out of band and read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant identifier.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// City the restaurant is in.
    pub city: String,
    /// Administrative region.
    pub region: String,
    /// Cuisine label, e.g. "Basque".
    pub cuisine: String,
    /// Price bracket from 1 (cheap) to 4 (luxury).
    pub budget_tier: i16,
    /// Michelin stars, 0 through 3.
    pub michelin_stars: i16,
    /// Chain the restaurant belongs to, if any.
    pub chain: Option<String>,
}

/// A dish on a restaurant's menu, identified by name within the
/// restaurant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    /// Restaurant this dish belongs to.
    pub restaurant_id: RestaurantId,
    /// Dish name, unique per restaurant.
    pub name: String,
    /// Menu course.
    pub dish_type: DishType,
    /// Menu price.
    pub price: Money,
}

/// A booked visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Client who booked.
    pub client_id: ClientId,
    /// Restaurant booked at.
    pub restaurant_id: RestaurantId,
    /// Number of diners, 1 through 99.
    pub party_size: i16,
    /// Visit date.
    pub date: NaiveDate,
    /// Visit time.
    pub time: NaiveTime,
    /// Lifecycle status.
    pub status: ReservationStatus,
}

/// A billing record for one visit.
///
/// The rating and visit type start out empty and are written at most
/// once by the review flow; an invoice with a rating IS the review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Client billed.
    pub client_id: ClientId,
    /// Restaurant that issued the invoice.
    pub restaurant_id: RestaurantId,
    /// Reservation this invoice settles, when it stems from one.
    pub reservation_id: Option<ReservationId>,
    /// Total billed.
    pub total: Money,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Insertion instant, the tie-breaker for same-day orderings.
    pub created_at: DateTime<Utc>,
    /// Review rating, once submitted.
    pub rating: Option<Rating>,
    /// Review visit type, once submitted.
    pub visit_type: Option<VisitType>,
}

/// One dish-and-quantity entry within an invoice.
///
/// The dish name is free text: order lines reference menu items by name
/// and survive menu edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Name of the ordered dish.
    pub dish_name: String,
    /// Number of units ordered, at least 1.
    pub quantity: i32,
}

/// An entry in the allergen catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    /// Catalog identifier.
    pub id: i16,
    /// Allergen name, unique in the catalog.
    pub name: String,
}

// ============================================================================
// Read Models
// ============================================================================

/// A client-facing reservation row, carrying the restaurant's name and
/// city alongside the booking fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Restaurant booked at.
    pub restaurant_id: RestaurantId,
    /// Restaurant display name.
    pub restaurant_name: String,
    /// Restaurant city.
    pub restaurant_city: String,
    /// Number of diners.
    pub party_size: i16,
    /// Visit date.
    pub date: NaiveDate,
    /// Visit time.
    pub time: NaiveTime,
    /// Lifecycle status.
    pub status: ReservationStatus,
}

/// A restaurant-facing reservation row, carrying the client's name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantReservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Client who booked.
    pub client_id: ClientId,
    /// Client display name.
    pub client_name: String,
    /// Number of diners.
    pub party_size: i16,
    /// Visit date.
    pub date: NaiveDate,
    /// Visit time.
    pub time: NaiveTime,
    /// Lifecycle status.
    pub status: ReservationStatus,
}

/// A client-facing invoice row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInvoice {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Restaurant that issued the invoice.
    pub restaurant_id: RestaurantId,
    /// Restaurant display name.
    pub restaurant_name: String,
    /// Restaurant city.
    pub restaurant_city: String,
    /// Reservation the invoice settles, if any.
    pub reservation_id: Option<ReservationId>,
    /// Total billed.
    pub total: Money,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Review rating, if one was submitted.
    pub rating: Option<Rating>,
    /// Review visit type, if one was submitted.
    pub visit_type: Option<VisitType>,
}

/// A restaurant-facing invoice row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInvoice {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Client billed.
    pub client_id: ClientId,
    /// Client display name.
    pub client_name: String,
    /// Reservation the invoice settles, if any.
    pub reservation_id: Option<ReservationId>,
    /// Total billed.
    pub total: Money,
    /// Billing date.
    pub invoice_date: NaiveDate,
    /// Review rating, if one was submitted.
    pub rating: Option<Rating>,
    /// Review visit type, if one was submitted.
    pub visit_type: Option<VisitType>,
}

/// A review as presented by the API: the rated invoice joined with the
/// restaurant it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Invoice carrying this review.
    pub invoice_id: InvoiceId,
    /// Reviewed restaurant.
    pub restaurant_id: RestaurantId,
    /// Restaurant display name.
    pub restaurant_name: String,
    /// Restaurant city.
    pub restaurant_city: String,
    /// Submitted rating.
    pub rating: Rating,
    /// Submitted visit type.
    pub visit_type: VisitType,
    /// Date of the reviewed visit.
    pub invoice_date: NaiveDate,
}

/// A dish row in a menu listing, optionally annotated against an
/// allergen filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishListing {
    /// Dish name.
    pub name: String,
    /// Menu course.
    pub dish_type: DishType,
    /// Menu price.
    pub price: Money,
    /// Whether the dish is free of the queried allergen. `None` when no
    /// allergen filter was supplied.
    pub allergen_free: Option<bool>,
}

// ============================================================================
// Analytics Read Models
// ============================================================================

/// Average spend per diner at a restaurant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageSpend {
    /// Mean of invoice total divided by reservation party size, in
    /// euros. Zero when no reservation-backed invoices exist.
    pub average_per_head: f64,
    /// Number of invoices the average is drawn from.
    pub invoice_count: i64,
}

/// The weekday a restaurant receives the most reservations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestDay {
    /// English weekday name, `None` when the restaurant has no
    /// reservations at all.
    pub weekday: Option<String>,
    /// Reservation count on that weekday.
    pub reservation_count: i64,
}

/// One entry in a restaurant's most-ordered-dishes ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDish {
    /// Ordered dish name.
    pub dish_name: String,
    /// Menu course, when the name still matches a menu dish.
    pub dish_type: Option<DishType>,
    /// Total units ordered across all invoices.
    pub total_quantity: i64,
}

/// An invoice still waiting for its review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Unreviewed invoice.
    pub invoice_id: InvoiceId,
    /// Client who could be nudged.
    pub client_id: ClientId,
    /// Client display name.
    pub client_name: String,
    /// Date of the unreviewed visit.
    pub invoice_date: NaiveDate,
}
