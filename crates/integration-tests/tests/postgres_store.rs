//! Store tests against a migrated `PostgreSQL` database.
//!
//! Run with: cargo test -p filament-shop-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use filament_shop_core::{
    Email, FilamentType, Money, NewOrder, OrderStatus, ProductInput, Role, ShippingAddress,
};
use filament_shop_integration_tests::{database_url, unique_email};
use filament_shop_storefront::db::{
    self, CatalogStore, OrderStore, PgStore, ProfileStore, RepositoryError,
};

async fn store() -> PgStore {
    let url = database_url().expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    PgStore::new(db::create_pool(&url).await.expect("Failed to connect"))
}

fn input(name: &str, stock: u32) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        filament_type: FilamentType::Asa,
        color: "Grey".to_owned(),
        hex: "#808080".to_owned(),
        price: Money::from_cents(2750),
        weight: "1kg".to_owned(),
        description: String::new(),
        image: String::new(),
        available: true,
        brand: Some("Polymaker".to_owned()),
        stock,
    }
}

#[tokio::test]
#[ignore = "Requires migrated PostgreSQL database"]
async fn test_compare_and_set_stock_is_conditional() {
    let store = store().await;
    let product = store.create_product(input("CAS ASA", 4)).await.unwrap();

    assert!(!store.compare_and_set_stock(&product.id, 3, 0).await.unwrap());
    assert!(store.compare_and_set_stock(&product.id, 4, 1).await.unwrap());

    let reloaded = store.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.stock, 1);
    assert_eq!(reloaded.price, Money::from_cents(2750));
    assert_eq!(reloaded.brand.as_deref(), Some("Polymaker"));

    assert!(store.delete_product(&product.id).await.unwrap());
    assert!(!store.delete_product(&product.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires migrated PostgreSQL database"]
async fn test_order_round_trip_and_status_update() {
    let store = store().await;
    let email = Email::parse(&unique_email("orders")).unwrap();

    let order = store
        .create_order(NewOrder {
            order_number: "ORD-INTEGRATION".to_owned(),
            customer_name: "Arta".to_owned(),
            customer_email: email.clone(),
            total: Money::from_cents(5500),
            date: chrono::Utc::now(),
            status: OrderStatus::Created,
            items: Vec::new(),
            address: ShippingAddress::FreeText("Prishtinë".to_owned()),
        })
        .await
        .unwrap();

    let updated = store
        .update_order_status(&order.id, OrderStatus::Shipping)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipping);

    let page = store.list_orders(Some(&email), 0, 15).await.unwrap();
    assert_eq!(page.orders.len(), 1);
    assert_eq!(page.orders[0].id, order.id);
    assert_eq!(page.orders[0].total, Money::from_cents(5500));
    assert_eq!(page.next_offset, None);
}

#[tokio::test]
#[ignore = "Requires migrated PostgreSQL database"]
async fn test_duplicate_profile_email_conflicts() {
    let store = store().await;
    let email = Email::parse(&unique_email("profile")).unwrap();

    store.create_profile("Arta", &email, Role::User).await.unwrap();
    let err = store
        .create_profile("Arta", &email, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}
