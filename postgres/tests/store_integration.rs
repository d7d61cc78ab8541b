//! Integration tests for the postgres stores using testcontainers.
//!
//! These tests run against a real `PostgreSQL` database to validate the
//! consistency rules the platform is built around: idempotent invoicing,
//! at-most-one review per invoice, and all-or-nothing cascade deletion.
//!
//! # Requirements
//!
//! Docker must be running. Each test starts its own `PostgreSQL`
//! container and applies the schema migrations.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use the_knife_core::DomainError;
use the_knife_core::types::{
    Client, ClientId, DishType, Money, OrderLine, Rating, ReservationStatus, VisitType,
    parse_date, parse_time,
};
use the_knife_postgres::{
    AnalyticsStore, CatalogStore, ClientStore, InvoiceStore, ReservationStore, ReviewStore,
};
use the_knife_testing::{TestDatabase, fixtures};

/// All stores wired to one containerized database.
struct TestStores {
    db: TestDatabase,
    clients: ClientStore,
    catalog: CatalogStore,
    reservations: ReservationStore,
    invoices: InvoiceStore,
    reviews: ReviewStore,
    analytics: AnalyticsStore,
}

/// Start a container and build every store on its pool.
async fn setup() -> TestStores {
    let db = TestDatabase::start().await;
    let pool = db.pool();
    TestStores {
        clients: ClientStore::new(pool.clone()),
        catalog: CatalogStore::new(pool.clone()),
        reservations: ReservationStore::new(pool.clone()),
        invoices: InvoiceStore::new(pool.clone()),
        reviews: ReviewStore::new(pool.clone()),
        analytics: AnalyticsStore::new(pool),
        db,
    }
}

fn rating(value: f64) -> Rating {
    Rating::try_from_value(value).expect("test rating should be legal")
}

fn date(s: &str) -> NaiveDate {
    parse_date(s).expect("test date should parse")
}

fn time(s: &str) -> NaiveTime {
    parse_time(s).expect("test time should parse")
}

async fn count_where(pool: &PgPool, sql: &str, key: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(sql)
        .bind(key)
        .fetch_one(pool)
        .await
        .expect("Failed to count rows");
    n
}

#[tokio::test]
#[ignore] // Requires Docker - run with: cargo test --test store_integration -- --ignored
async fn test_invoice_from_reservation_is_idempotent() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000001A", "Ada Lovelace").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-1", "Chez Ada", 2).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-03-14"), time("19:30"))
        .await
        .expect("Failed to create reservation");

    let first = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Failed to create invoice");
    let second = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Repeat conversion should succeed");

    assert_eq!(first.id, second.id);
    assert_eq!(first.total, second.total);
    assert!(first.total.cents() >= 3_000 && first.total.cents() <= 15_000);

    let n = count_where(
        &pool,
        "SELECT COUNT(*) FROM invoices WHERE reservation_id = $1",
        reservation.as_str(),
    )
    .await;
    assert_eq!(n, 1, "exactly one invoice row must reference the reservation");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_invoice_conversions_converge() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000002B", "Grace Hopper").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-2", "Le Compilateur", 1).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 4, date("2025-04-01"), time("20:00"))
        .await
        .expect("Failed to create reservation");

    let (a, b) = tokio::join!(
        stores.invoices.create_from_reservation(&reservation),
        stores.invoices.create_from_reservation(&reservation),
    );
    let a = a.expect("Concurrent conversion should succeed");
    let b = b.expect("Concurrent conversion should succeed");

    assert_eq!(a.id, b.id, "both racers must observe the same invoice");

    let n = count_where(
        &pool,
        "SELECT COUNT(*) FROM invoices WHERE reservation_id = $1",
        reservation.as_str(),
    )
    .await;
    assert_eq!(n, 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_cancelled_reservation_refuses_invoicing() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000003C", "Margaret Hamilton").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-3", "Apollo", 3).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 3, date("2025-05-20"), time("12:30"))
        .await
        .expect("Failed to create reservation");
    stores
        .reservations
        .cancel(&reservation)
        .await
        .expect("Failed to cancel reservation");

    let err = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect_err("Invoicing a cancelled reservation must fail");
    assert!(matches!(err, DomainError::Precondition(_)));

    let n = count_where(
        &pool,
        "SELECT COUNT(*) FROM invoices WHERE reservation_id = $1",
        reservation.as_str(),
    )
    .await;
    assert_eq!(n, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_cancel_is_a_visible_status_flip_and_idempotent() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000004D", "Katherine Johnson").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-4", "Trajectoire", 0).await;

    let older = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-03-14"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let newer = stores
        .reservations
        .create(&client, &restaurant, 5, date("2025-03-20"), time("13:00"))
        .await
        .expect("Failed to create reservation");

    stores
        .reservations
        .cancel(&older)
        .await
        .expect("Failed to cancel reservation");
    // Second cancel is an acknowledged no-op.
    stores
        .reservations
        .cancel(&older)
        .await
        .expect("Repeat cancel should be acknowledged");

    let listed = stores
        .reservations
        .list_by_client(&client)
        .await
        .expect("Failed to list reservations");
    assert_eq!(listed.len(), 2, "cancellation must not remove the row");
    assert_eq!(listed[0].id, newer, "listing is newest visit first");
    assert_eq!(listed[0].status, ReservationStatus::Confirmed);
    assert_eq!(listed[1].id, older);
    assert_eq!(listed[1].status, ReservationStatus::Cancelled);
    assert_eq!(listed[1].restaurant_name, "Trajectoire");

    let err = stores
        .reservations
        .cancel(&"MISSING1".into())
        .await
        .expect_err("Cancelling an unknown reservation must fail");
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_reservation_validation_and_missing_references() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000005E", "Annie Easley").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-5", "Fusée", 1).await;

    let err = stores
        .reservations
        .create(&client, &restaurant, 0, date("2025-06-01"), time("19:00"))
        .await
        .expect_err("Party size zero must be rejected");
    assert!(matches!(err, DomainError::Validation(_)));

    let err = stores
        .reservations
        .create(&"99999999Z".into(), &restaurant, 2, date("2025-06-01"), time("19:00"))
        .await
        .expect_err("Unknown client must be rejected");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = stores
        .reservations
        .create(&client, &"NOWHERE".into(), 2, date("2025-06-01"), time("19:00"))
        .await
        .expect_err("Unknown restaurant must be rejected");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = stores
        .reservations
        .update(&"MISSING1".into(), 2, date("2025-06-02"), time("18:00"))
        .await
        .expect_err("Updating an unknown reservation must fail");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-06-01"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    stores
        .reservations
        .update(&reservation, 6, date("2025-06-02"), time("18:00"))
        .await
        .expect("Failed to update reservation");

    let listed = stores
        .reservations
        .list_by_client(&client)
        .await
        .expect("Failed to list reservations");
    assert_eq!(listed[0].party_size, 6);
    assert_eq!(listed[0].date, date("2025-06-02"));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_review_requires_an_invoice() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000006F", "Dorothy Vaughan").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-6", "Machine Room", 0).await;

    // A reservation alone is not enough; the visit must be invoiced.
    stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-02-01"), time("19:00"))
        .await
        .expect("Failed to create reservation");

    let err = stores
        .reviews
        .submit(&client, &restaurant, rating(4.0), None)
        .await
        .expect_err("Review without an invoice must fail");
    assert!(matches!(err, DomainError::Precondition(_)));

    let reviews = stores
        .reviews
        .list_by_client(&client)
        .await
        .expect("Failed to list reviews");
    assert!(reviews.is_empty(), "nothing may be written on failure");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_at_most_one_review_per_invoice() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000007G", "Radia Perlman").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-7", "Spanning Tree", 1).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-01-10"), time("20:00"))
        .await
        .expect("Failed to create reservation");
    let invoice = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Failed to create invoice");

    let reviewed = stores
        .reviews
        .submit(&client, &restaurant, rating(4.5), Some(VisitType::Couple))
        .await
        .expect("First review should succeed");
    assert_eq!(reviewed, invoice.id);

    let err = stores
        .reviews
        .submit(&client, &restaurant, rating(3.0), Some(VisitType::Solo))
        .await
        .expect_err("Second review of the same invoice must fail");
    assert!(matches!(err, DomainError::Conflict(_)));

    let reviews = stores
        .reviews
        .list_by_client(&client)
        .await
        .expect("Failed to list reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, rating(4.5), "the losing write must not overwrite");
    assert_eq!(reviews[0].visit_type, VisitType::Couple);
    assert_eq!(reviews[0].restaurant_name, "Spanning Tree");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_review_submissions_pick_one_winner() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000008H", "Barbara Liskov").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-8", "Substitution", 2).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-01-15"), time("19:30"))
        .await
        .expect("Failed to create reservation");
    stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Failed to create invoice");

    let (a, b) = tokio::join!(
        stores
            .reviews
            .submit(&client, &restaurant, rating(5.0), Some(VisitType::Family)),
        stores
            .reviews
            .submit(&client, &restaurant, rating(1.0), Some(VisitType::Business)),
    );

    assert_eq!(
        usize::from(a.is_ok()) + usize::from(b.is_ok()),
        1,
        "exactly one concurrent submission must win"
    );
    let expected = if a.is_ok() { rating(5.0) } else { rating(1.0) };
    let loser_err = if a.is_ok() { b.unwrap_err() } else { a.unwrap_err() };
    assert!(matches!(loser_err, DomainError::Conflict(_)));

    let reviews = stores
        .reviews
        .list_by_client(&client)
        .await
        .expect("Failed to list reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, expected);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_review_lands_on_latest_invoice() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000009I", "Frances Allen").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-9", "Optimiseur", 1).await;

    let early = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-01-05"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let late = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-01-06"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    stores
        .invoices
        .create_from_reservation(&early)
        .await
        .expect("Failed to create invoice");
    let latest_invoice = stores
        .invoices
        .create_from_reservation(&late)
        .await
        .expect("Failed to create invoice");

    let reviewed = stores
        .reviews
        .submit(&client, &restaurant, rating(2.5), None)
        .await
        .expect("Review should succeed");
    assert_eq!(reviewed, latest_invoice.id, "the latest visit gets the review");

    let reviews = stores
        .reviews
        .list_by_client(&client)
        .await
        .expect("Failed to list reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].invoice_id, latest_invoice.id);
    assert_eq!(reviews[0].visit_type, VisitType::Couple, "omitted visit type defaults");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_direct_invoice_writes_lines_atomically() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000010J", "Ada Yonath").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-10", "Ribosome", 2).await;

    let bad_lines = vec![
        OrderLine { dish_name: "Confit de Canard".to_string(), quantity: 2 },
        OrderLine { dish_name: "Tarte Tatin".to_string(), quantity: 0 },
    ];
    let err = stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(5_400), &bad_lines)
        .await
        .expect_err("A zero-quantity line must be rejected");
    assert!(matches!(err, DomainError::Validation(_)));

    assert_eq!(
        count_where(&pool, "SELECT COUNT(*) FROM invoices WHERE client_id = $1", client.as_str())
            .await,
        0,
        "a rejected invoice must leave no rows behind"
    );
    assert_eq!(
        count_where(
            &pool,
            "SELECT COUNT(*) FROM order_lines WHERE restaurant_id = $1",
            restaurant.as_str()
        )
        .await,
        0
    );

    let lines = vec![
        OrderLine { dish_name: "Confit de Canard".to_string(), quantity: 2 },
        OrderLine { dish_name: "Tarte Tatin".to_string(), quantity: 1 },
    ];
    let invoice = stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(5_400), &lines)
        .await
        .expect("Failed to create direct invoice");
    assert_eq!(invoice.total, Money::from_cents(5_400));
    assert!(invoice.reservation_id.is_none());

    let stored = stores
        .invoices
        .order_lines(&invoice.id)
        .await
        .expect("Failed to list order lines");
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().any(|l| l.dish_name == "Confit de Canard" && l.quantity == 2));
    assert!(stored.iter().any(|l| l.dish_name == "Tarte Tatin" && l.quantity == 1));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_direct_invoice_reservation_rules() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000011K", "Ruth Teitelbaum").await;
    let other = fixtures::seed_client(&pool, "00000012L", "Marlyn Meltzer").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-11", "ENIAC", 0).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-02-20"), time("12:00"))
        .await
        .expect("Failed to create reservation");

    // Another client cannot bill against this reservation.
    let err = stores
        .invoices
        .create_direct(&other, &restaurant, Some(&reservation), Money::from_cents(2_000), &[])
        .await
        .expect_err("Billing another client's reservation must fail");
    assert!(matches!(err, DomainError::Validation(_)));

    let direct = stores
        .invoices
        .create_direct(&client, &restaurant, Some(&reservation), Money::from_cents(2_000), &[])
        .await
        .expect("Failed to create direct invoice");
    assert_eq!(direct.reservation_id.as_ref(), Some(&reservation));

    // The reservation is now settled; a second invoice may not claim it.
    let err = stores
        .invoices
        .create_direct(&client, &restaurant, Some(&reservation), Money::from_cents(2_000), &[])
        .await
        .expect_err("Double-settling a reservation must fail");
    assert!(matches!(err, DomainError::Conflict(_)));

    // The idempotent conversion path returns the existing invoice.
    let converted = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Conversion should return the settled invoice");
    assert_eq!(converted.id, direct.id);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_cascade_delete_removes_every_client_row() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000013M", "Jean Bartik").await;
    let survivor = fixtures::seed_client(&pool, "00000014N", "Betty Holberton").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-12", "Relais", 1).await;
    fixtures::seed_client_allergen(&pool, &client, "GLUTEN").await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-03-01"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Failed to create invoice");
    let lines = vec![OrderLine { dish_name: "Soupe".to_string(), quantity: 3 }];
    let direct = stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(2_700), &lines)
        .await
        .expect("Failed to create direct invoice");

    let keep = stores
        .reservations
        .create(&survivor, &restaurant, 4, date("2025-03-02"), time("20:00"))
        .await
        .expect("Failed to create reservation");

    stores
        .clients
        .delete(&client)
        .await
        .expect("Failed to delete client");

    for (table, sql) in [
        ("invoices", "SELECT COUNT(*) FROM invoices WHERE client_id = $1"),
        ("reservations", "SELECT COUNT(*) FROM reservations WHERE client_id = $1"),
        ("client_allergens", "SELECT COUNT(*) FROM client_allergens WHERE client_id = $1"),
        ("clients", "SELECT COUNT(*) FROM clients WHERE id = $1"),
    ] {
        assert_eq!(
            count_where(&pool, sql, client.as_str()).await,
            0,
            "no {table} row may survive the cascade"
        );
    }
    assert_eq!(
        count_where(
            &pool,
            "SELECT COUNT(*) FROM order_lines WHERE invoice_id = $1",
            direct.id.as_str()
        )
        .await,
        0,
        "the deleted client's order lines must be gone"
    );

    let err = stores
        .clients
        .get(&client)
        .await
        .expect_err("Deleted client must be gone");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = stores
        .clients
        .delete(&client)
        .await
        .expect_err("Repeat delete must report the absence");
    assert!(matches!(err, DomainError::NotFound { .. }));

    // Unrelated rows survive.
    let remaining = stores
        .reservations
        .list_by_restaurant(&restaurant)
        .await
        .expect("Failed to list reservations");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_full_lifecycle_scenario() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000015O", "Mary Jackson").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-13", "Soufflerie", 2).await;

    let reservation = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-07-14"), time("21:00"))
        .await
        .expect("Failed to create reservation");

    let invoice = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Failed to create invoice");
    let again = stores
        .invoices
        .create_from_reservation(&reservation)
        .await
        .expect("Repeat conversion should succeed");
    assert_eq!(invoice.id, again.id);

    let reviewed = stores
        .reviews
        .submit(&client, &restaurant, rating(4.5), Some(VisitType::Couple))
        .await
        .expect("Review should succeed");
    assert_eq!(reviewed, invoice.id);

    let err = stores
        .reviews
        .submit(&client, &restaurant, rating(3.0), Some(VisitType::Solo))
        .await
        .expect_err("Second review must fail");
    assert!(matches!(err, DomainError::Conflict(_)));

    let reviews = stores
        .reviews
        .list_by_client(&client)
        .await
        .expect("Failed to list reviews");
    assert_eq!(reviews[0].rating, rating(4.5));

    stores
        .clients
        .delete(&client)
        .await
        .expect("Failed to delete client");
    assert_eq!(
        count_where(&pool, "SELECT COUNT(*) FROM reservations WHERE id = $1", reservation.as_str())
            .await,
        0
    );
    assert_eq!(
        count_where(&pool, "SELECT COUNT(*) FROM invoices WHERE id = $1", invoice.id.as_str())
            .await,
        0
    );
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_client_registration_and_search() {
    let stores = setup().await;

    let ada = Client {
        id: ClientId::new("00000020T"),
        name: "Ada Lovelace".to_string(),
        phone: "+33 6 12 34 56 78".to_string(),
        email: Some("ada@example.org".to_string()),
        education: None,
        sex: Some("F".to_string()),
        age: Some(36),
    };
    stores
        .clients
        .register(&ada)
        .await
        .expect("Failed to register client");

    let err = stores
        .clients
        .register(&ada)
        .await
        .expect_err("Duplicate registration must fail");
    assert!(matches!(err, DomainError::Conflict(_)));

    let fetched = stores
        .clients
        .get(&ada.id)
        .await
        .expect("Failed to get client");
    assert_eq!(fetched, ada);

    let by_name = stores
        .clients
        .search(Some("lovelace"), None)
        .await
        .expect("Failed to search clients");
    assert_eq!(by_name.len(), 1, "name search is case-insensitive");
    assert_eq!(by_name[0].id, ada.id);

    let by_id = stores
        .clients
        .search(None, Some("00000020T"))
        .await
        .expect("Failed to search clients");
    assert_eq!(by_id.len(), 1);

    let mut renamed = ada.clone();
    renamed.name = "Ada King".to_string();
    stores
        .clients
        .update(&renamed)
        .await
        .expect("Failed to update client");
    let fetched = stores
        .clients
        .get(&ada.id)
        .await
        .expect("Failed to get client");
    assert_eq!(fetched.name, "Ada King");

    let mut ghost = ada.clone();
    ghost.id = ClientId::new("99999999Z");
    let err = stores
        .clients
        .update(&ghost)
        .await
        .expect_err("Updating an unknown client must fail");
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_restaurant_listing_and_allergen_filter() {
    let stores = setup().await;
    let pool = stores.db.pool();

    let boulangerie = fixtures::seed_restaurant(&pool, "REST-20", "Le Pain", 1).await;
    let pasta_bar = fixtures::seed_restaurant(&pool, "REST-21", "Pasta Bar", 3).await;
    fixtures::seed_dish(&pool, &boulangerie, "Tartine", DishType::Starter, 800).await;
    fixtures::seed_dish(&pool, &boulangerie, "Salade Verte", DishType::Starter, 700).await;
    fixtures::seed_dish(&pool, &pasta_bar, "Penne", DishType::Main, 1_400).await;
    fixtures::seed_dish_allergen(&pool, &boulangerie, "Tartine", "GLUTEN").await;
    fixtures::seed_dish_allergen(&pool, &pasta_bar, "Penne", "GLUTEN").await;

    let all = stores
        .catalog
        .restaurants(None)
        .await
        .expect("Failed to list restaurants");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, pasta_bar, "more stars lists first");
    assert_eq!(all[1].id, boulangerie);

    // Only Le Pain keeps a dish free of gluten; matching ignores case.
    let gluten_free = stores
        .catalog
        .restaurants(Some("gluten"))
        .await
        .expect("Failed to filter restaurants");
    assert_eq!(gluten_free.len(), 1);
    assert_eq!(gluten_free[0].id, boulangerie);

    let annotated = stores
        .catalog
        .dishes(&boulangerie, Some("gluten"))
        .await
        .expect("Failed to list dishes");
    assert_eq!(annotated.len(), 2);
    assert_eq!(annotated[0].name, "Tartine", "same course orders by price descending");
    assert_eq!(annotated[0].allergen_free, Some(false));
    assert_eq!(annotated[1].name, "Salade Verte");
    assert_eq!(annotated[1].allergen_free, Some(true));

    let plain = stores
        .catalog
        .dishes(&boulangerie, None)
        .await
        .expect("Failed to list dishes");
    assert!(plain.iter().all(|d| d.allergen_free.is_none()));

    let err = stores
        .catalog
        .dishes(&"NOWHERE".into(), None)
        .await
        .expect_err("Unknown restaurant must fail");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let catalog = stores
        .catalog
        .allergens()
        .await
        .expect("Failed to list allergens");
    assert_eq!(catalog.len(), 14);
    assert_eq!(catalog[0].name, "CELERY", "catalog lists by name");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_average_spend_per_head() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000030U", "Hedy Lamarr").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-30", "Fréquence", 2).await;

    let empty = stores
        .analytics
        .average_spend(&restaurant)
        .await
        .expect("Failed to compute average spend");
    assert_eq!(empty.invoice_count, 0);
    assert!((empty.average_per_head - 0.0).abs() < f64::EPSILON);

    let duo = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-02-01"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let quartet = stores
        .reservations
        .create(&client, &restaurant, 4, date("2025-02-02"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let i1 = stores
        .invoices
        .create_from_reservation(&duo)
        .await
        .expect("Failed to create invoice");
    let i2 = stores
        .invoices
        .create_from_reservation(&quartet)
        .await
        .expect("Failed to create invoice");

    // A walk-in invoice has no party size and must stay out.
    stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(9_900), &[])
        .await
        .expect("Failed to create direct invoice");

    let spend = stores
        .analytics
        .average_spend(&restaurant)
        .await
        .expect("Failed to compute average spend");
    assert_eq!(spend.invoice_count, 2);
    let expected = (i1.total.as_eur() / 2.0 + i2.total.as_eur() / 4.0) / 2.0;
    assert!(
        (spend.average_per_head - expected).abs() < 1e-6,
        "expected {expected}, got {}",
        spend.average_per_head
    );
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_busiest_day_counts_confirmed_only() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000031V", "Sophie Wilson").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-31", "Acorn", 1).await;
    let quiet = fixtures::seed_restaurant(&pool, "REST-32", "Silence", 0).await;

    // Three Fridays, two Mondays.
    let fridays = ["2025-03-07", "2025-03-14", "2025-03-21"];
    let mut friday_ids = Vec::new();
    for day in fridays {
        let id = stores
            .reservations
            .create(&client, &restaurant, 2, date(day), time("19:00"))
            .await
            .expect("Failed to create reservation");
        friday_ids.push(id);
    }
    for day in ["2025-03-10", "2025-03-17"] {
        stores
            .reservations
            .create(&client, &restaurant, 2, date(day), time("12:00"))
            .await
            .expect("Failed to create reservation");
    }

    let busy = stores
        .analytics
        .busiest_day(&restaurant)
        .await
        .expect("Failed to compute busiest day");
    assert_eq!(busy.weekday.as_deref(), Some("Friday"));
    assert_eq!(busy.reservation_count, 3);

    // Cancelling one Friday forces a tie; the earlier weekday wins it.
    stores
        .reservations
        .cancel(&friday_ids[0])
        .await
        .expect("Failed to cancel reservation");
    let tied = stores
        .analytics
        .busiest_day(&restaurant)
        .await
        .expect("Failed to compute busiest day");
    assert_eq!(tied.weekday.as_deref(), Some("Monday"));
    assert_eq!(tied.reservation_count, 2);

    let none = stores
        .analytics
        .busiest_day(&quiet)
        .await
        .expect("Failed to compute busiest day");
    assert_eq!(none.weekday, None);
    assert_eq!(none.reservation_count, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_top_dishes_ranking() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000032W", "Lynn Conway").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-33", "VLSI", 2).await;
    fixtures::seed_dish(&pool, &restaurant, "Confit de Canard", DishType::Main, 2_800).await;
    fixtures::seed_dish(&pool, &restaurant, "Tarte Tatin", DishType::Dessert, 900).await;

    let lines = vec![
        OrderLine { dish_name: "Confit de Canard".to_string(), quantity: 3 },
        OrderLine { dish_name: "Tarte Tatin".to_string(), quantity: 3 },
        OrderLine { dish_name: "Bavette".to_string(), quantity: 2 },
        OrderLine { dish_name: "Soupe".to_string(), quantity: 1 },
    ];
    stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(12_000), &lines)
        .await
        .expect("Failed to create invoice");
    let more = vec![OrderLine { dish_name: "Confit de Canard".to_string(), quantity: 2 }];
    stores
        .invoices
        .create_direct(&client, &restaurant, None, Money::from_cents(5_600), &more)
        .await
        .expect("Failed to create invoice");

    let top = stores
        .analytics
        .top_dishes(&restaurant)
        .await
        .expect("Failed to compute top dishes");
    assert_eq!(top.len(), 3, "ranking stops at three dishes");
    assert_eq!(top[0].dish_name, "Confit de Canard");
    assert_eq!(top[0].total_quantity, 5, "quantities sum across invoices");
    assert_eq!(top[0].dish_type, Some(DishType::Main));
    assert_eq!(top[1].dish_name, "Tarte Tatin");
    assert_eq!(top[1].total_quantity, 3);
    assert_eq!(top[2].dish_name, "Bavette");
    assert_eq!(top[2].dish_type, None, "an off-menu name keeps no course");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_pending_reviews_listing() {
    let stores = setup().await;
    let pool = stores.db.pool();
    let client = fixtures::seed_client(&pool, "00000033X", "Shafi Goldwasser").await;
    let restaurant = fixtures::seed_restaurant(&pool, "REST-34", "Zero Knowledge", 3).await;

    let early = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-04-01"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let late = stores
        .reservations
        .create(&client, &restaurant, 2, date("2025-04-02"), time("19:00"))
        .await
        .expect("Failed to create reservation");
    let unreviewed = stores
        .invoices
        .create_from_reservation(&early)
        .await
        .expect("Failed to create invoice");
    stores
        .invoices
        .create_from_reservation(&late)
        .await
        .expect("Failed to create invoice");

    // The review lands on the later invoice; the earlier one stays open.
    stores
        .reviews
        .submit(&client, &restaurant, rating(4.0), None)
        .await
        .expect("Review should succeed");

    let pending = stores
        .analytics
        .pending_reviews(&restaurant)
        .await
        .expect("Failed to list pending reviews");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].invoice_id, unreviewed.id);
    assert_eq!(pending[0].client_name, "Shafi Goldwasser");
}
