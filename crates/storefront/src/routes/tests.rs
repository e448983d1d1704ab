//! Router tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

use filament_shop_core::{FilamentType, Money, Product, ProductId, ProductInput};

use crate::app;
use crate::db::{MemoryStore, SharedStore};
use crate::middleware::auth::{AUTH_EMAIL_HEADER, AUTH_GROUPS_HEADER, AUTH_NAME_HEADER};
use crate::services::{DisabledNotifier, ImageResolver};
use crate::state::AppState;

const ADMIN: &str = "ops@filament.shop";

struct TestApp {
    store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    fn new(products: Vec<Product>) -> Self {
        let store = Arc::new(MemoryStore::with_products(products));
        let images = ImageResolver::new(Some(
            Url::parse("https://cdn.filament.shop/public/").unwrap(),
        ));
        let state = AppState::new(
            Arc::clone(&store) as SharedStore,
            Arc::new(DisabledNotifier),
            images,
        );
        Self {
            store,
            router: app(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

fn request(method: Method, uri: &str, caller: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((email, groups)) = caller {
        builder = builder
            .header(AUTH_EMAIL_HEADER, email)
            .header(AUTH_GROUPS_HEADER, groups);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn user(email: &str) -> Option<(&str, &str)> {
    Some((email, "customers"))
}

fn admin() -> Option<(&'static str, &'static str)> {
    Some((ADMIN, "ADMINS"))
}

fn product(id: &str, name: &str, cents: u64, stock: u32) -> Product {
    Product::from_input(ProductId::new(id), product_input(name, cents, stock))
}

fn product_input(name: &str, cents: u64, stock: u32) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        filament_type: FilamentType::Petg,
        color: "Orange".to_owned(),
        hex: "#FF8800".to_owned(),
        price: Money::from_cents(cents),
        weight: "1kg".to_owned(),
        description: "Tough and glossy".to_owned(),
        image: "product-images/petg-orange.png".to_owned(),
        available: true,
        brand: None,
        stock,
    }
}

fn checkout_body(product_id: &str, quantity: u32) -> Value {
    json!({
        "customerName": "Arta Krasniqi",
        "customerEmail": "arta@example.com",
        "items": [{ "productId": product_id, "quantity": quantity }],
        "address": "Rr. Nënë Tereza 1, Prishtinë",
        "total": 999
    })
}

fn address_body(street: &str) -> Value {
    json!({
        "firstName": "Arta",
        "lastName": "Krasniqi",
        "country": "Kosovë",
        "city": "Tjetër",
        "customCity": "Gjakovë",
        "address": street,
        "postalCode": "50000",
        "phone": "+38344000000"
    })
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, _) = app
        .send(request(Method::GET, "/health/ready", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let app = TestApp::new(Vec::new());
    let mut req = request(Method::GET, "/health", None, None);
    req.headers_mut()
        .insert("x-request-id", "edge-123".parse().unwrap());

    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "edge-123");
}

#[tokio::test]
async fn test_catalog_lists_sorted_with_image_urls() {
    let app = TestApp::new(vec![
        product("b", "Silk Gold", 2500, 2),
        product("a", "Galaxy Black", 1999, 10),
    ]);

    let (status, body) = app
        .send(request(Method::GET, "/api/products", None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], "Galaxy Black");
    assert_eq!(products[0]["type"], "PETG");
    assert_eq!(products[0]["price"], "19.99");
    assert_eq!(
        products[0]["imageUrl"],
        "https://cdn.filament.shop/public/product-images/petg-orange.png"
    );
}

#[tokio::test]
async fn test_product_detail_and_missing() {
    let app = TestApp::new(vec![product("a", "Galaxy Black", 1999, 10)]);

    let (status, body) = app
        .send(request(Method::GET, "/api/products/a", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 10);

    let (status, body) = app
        .send(request(Method::GET, "/api/products/zzz", None, None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: product");
}

#[tokio::test]
async fn test_guest_checkout_reserves_stock() {
    let app = TestApp::new(vec![product("p", "Galaxy Black", 500, 10)]);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/orders",
            None,
            Some(checkout_body("p", 3)),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "OK");
    assert!(!body["orderId"].as_str().unwrap().is_empty());
    assert_eq!(app.store.stock_of(&ProductId::new("p")).await, Some(7));
}

#[tokio::test]
async fn test_checkout_failures_still_answer_200() {
    let app = TestApp::new(vec![product("q", "Silk Gold", 2500, 0)]);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/orders",
            None,
            Some(checkout_body("q", 1)),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["orderId"], "");
    assert_eq!(
        body["message"],
        "Sasia e kërkuar për \"Silk Gold\" tejkalon stokun."
    );

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(malformed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_signed_in_checkout_uses_identity_email_and_history_is_scoped() {
    let app = TestApp::new(vec![product("p", "Galaxy Black", 500, 10)]);

    let mut body = checkout_body("p", 1);
    body["customerEmail"] = json!("someone-else@example.com");
    let (_, placed) = app
        .send(request(
            Method::POST,
            "/api/orders",
            user("arta@example.com"),
            Some(body),
        ))
        .await;
    assert_eq!(placed["ok"], true);

    app.send(request(
        Method::POST,
        "/api/orders",
        None,
        Some(json!({
            "customerName": "Besa",
            "customerEmail": "besa@example.com",
            "items": [{ "productId": "p", "quantity": 1 }],
            "address": "Tiranë"
        })),
    ))
    .await;

    let (status, mine) = app
        .send(request(
            Method::GET,
            "/api/orders",
            user("arta@example.com"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders = mine["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["customerEmail"], "arta@example.com");
    assert_eq!(orders[0]["id"], placed["orderId"]);
    assert_eq!(orders[0]["status"], "KRIJUAR");
    assert_eq!(mine["nextCursor"], Value::Null);

    let (_, all) = app
        .send(request(Method::GET, "/api/orders", admin(), None))
        .await;
    assert_eq!(all["orders"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .send(request(Method::GET, "/api/orders", None, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_history_pages_by_cursor() {
    let app = TestApp::new(vec![product("p", "Galaxy Black", 500, 100)]);
    for _ in 0..16 {
        let (_, body) = app
            .send(request(
                Method::POST,
                "/api/orders",
                None,
                Some(checkout_body("p", 1)),
            ))
            .await;
        assert_eq!(body["ok"], true);
    }

    let (_, first) = app
        .send(request(Method::GET, "/api/orders", admin(), None))
        .await;
    assert_eq!(first["orders"].as_array().unwrap().len(), 15);
    assert_eq!(first["nextCursor"], "15");

    let (_, second) = app
        .send(request(Method::GET, "/api/orders?cursor=15", admin(), None))
        .await;
    assert_eq!(second["orders"].as_array().unwrap().len(), 1);
    assert_eq!(second["nextCursor"], Value::Null);

    let (status, _) = app
        .send(request(Method::GET, "/api/orders?cursor=abc", admin(), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cursor_beyond_bigint_is_bad_request() {
    let app = TestApp::new(Vec::new());

    let (status, body) = app
        .send(request(
            Method::GET,
            "/api/orders?cursor=9223372036854775808",
            admin(),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad request: invalid cursor");

    let (status, _) = app
        .send(request(
            Method::GET,
            "/api/orders?cursor=9223372036854775807",
            admin(),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_account_requires_identity() {
    let app = TestApp::new(Vec::new());
    let (status, body) = app
        .send(request(Method::GET, "/api/account", None, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().starts_with("Unauthorized"));
}

#[tokio::test]
async fn test_account_profile_created_once_with_role_from_groups() {
    let app = TestApp::new(Vec::new());

    let mut req = request(Method::GET, "/api/account", user("arta@example.com"), None);
    req.headers_mut()
        .insert(AUTH_NAME_HEADER, "Arta K".parse().unwrap());
    let (status, first) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["name"], "Arta K");
    assert_eq!(first["role"], "user");
    assert_eq!(first["addresses"], json!([]));

    let (_, again) = app
        .send(request(
            Method::GET,
            "/api/account",
            Some(("arta@example.com", "ADMINS")),
            None,
        ))
        .await;
    assert_eq!(again["id"], first["id"]);
    assert_eq!(again["role"], "admin");
}

#[tokio::test]
async fn test_address_book_lifecycle() {
    let app = TestApp::new(Vec::new());
    let caller = user("arta@example.com");

    let (status, book) = app
        .send(request(
            Method::POST,
            "/api/account/addresses",
            caller,
            Some(address_body("Rr. Ismail Qemali 5")),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book[0]["isDefault"], true);
    let first_id = book[0]["id"].as_str().unwrap().to_owned();

    let (_, book) = app
        .send(request(
            Method::POST,
            "/api/account/addresses",
            caller,
            Some(address_body("Rr. Skënderbeu 2")),
        ))
        .await;
    assert_eq!(book.as_array().unwrap().len(), 2);
    assert_eq!(book[1]["isDefault"], false);
    let second_id = book[1]["id"].as_str().unwrap().to_owned();

    let (status, book) = app
        .send(request(
            Method::POST,
            &format!("/api/account/addresses/{second_id}/default"),
            caller,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book[0]["isDefault"], false);
    assert_eq!(book[1]["isDefault"], true);

    let mut edited = address_body("Rr. Skënderbeu 20");
    edited["id"] = json!("ignored");
    let (status, book) = app
        .send(request(
            Method::PUT,
            &format!("/api/account/addresses/{second_id}"),
            caller,
            Some(edited),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book[1]["address"], "Rr. Skënderbeu 20");
    assert_eq!(book[1]["id"], second_id.as_str());
    assert_eq!(book[0]["isDefault"], true);

    let (status, book) = app
        .send(request(
            Method::DELETE,
            &format!("/api/account/addresses/{first_id}"),
            caller,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book.as_array().unwrap().len(), 1);
    assert_eq!(book[0]["isDefault"], true);

    let (_, profile) = app
        .send(request(Method::GET, "/api/account", caller, None))
        .await;
    assert_eq!(profile["addresses"], book);

    let (status, _) = app
        .send(request(
            Method::DELETE,
            "/api/account/addresses/missing",
            caller,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let app = TestApp::new(vec![product("p", "Galaxy Black", 500, 10)]);
    let body = serde_json::to_value(product_input("New", 100, 1)).unwrap();

    let (status, _) = app
        .send(request(
            Method::POST,
            "/api/admin/products",
            user("arta@example.com"),
            Some(body.clone()),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(request(Method::POST, "/api/admin/products", None, Some(body)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(request(
            Method::DELETE,
            "/api/admin/products/p",
            user("arta@example.com"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.stock_of(&ProductId::new("p")).await, Some(10));
}

#[tokio::test]
async fn test_admin_manages_catalog() {
    let app = TestApp::new(Vec::new());

    let (status, created) = app
        .send(request(
            Method::POST,
            "/api/admin/products",
            admin(),
            Some(serde_json::to_value(product_input("Matte White", 2200, 4)).unwrap()),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();

    let (status, updated) = app
        .send(request(
            Method::PUT,
            &format!("/api/admin/products/{id}"),
            admin(),
            Some(serde_json::to_value(product_input("Matte White", 2200, 40)).unwrap()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 40);

    let mut bad = serde_json::to_value(product_input("Matte White", 2200, 4)).unwrap();
    bad["hex"] = json!("white");
    let (status, body) = app
        .send(request(
            Method::PUT,
            &format!("/api/admin/products/{id}"),
            admin(),
            Some(bad),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hex"));

    let (status, _) = app
        .send(request(
            Method::PUT,
            "/api/admin/products/missing",
            admin(),
            Some(serde_json::to_value(product_input("X", 100, 1)).unwrap()),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(request(
            Method::DELETE,
            &format!("/api/admin/products/{id}"),
            admin(),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(request(
            Method::DELETE,
            &format!("/api/admin/products/{id}"),
            admin(),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_updates_order_status() {
    let app = TestApp::new(vec![product("p", "Galaxy Black", 500, 10)]);
    let (_, placed) = app
        .send(request(
            Method::POST,
            "/api/orders",
            None,
            Some(checkout_body("p", 1)),
        ))
        .await;
    let order_id = placed["orderId"].as_str().unwrap().to_owned();
    let uri = format!("/api/admin/orders/{order_id}/status");

    let (status, order) = app
        .send(request(
            Method::PUT,
            &uri,
            admin(),
            Some(json!({ "status": "Në dërgim" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "NE_DERGIM");

    let (status, order) = app
        .send(request(
            Method::PUT,
            &uri,
            admin(),
            Some(json!({ "status": "DOREZUAR" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "DOREZUAR");

    let (status, _) = app
        .send(request(
            Method::PUT,
            &uri,
            admin(),
            Some(json!({ "status": "LOST" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(request(
            Method::PUT,
            "/api/admin/orders/missing/status",
            admin(),
            Some(json!({ "status": "ANULUAR" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
