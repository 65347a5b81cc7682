mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_first_request_gets_guest_session() {
    let app = TestApp::new();

    let first = app.get("/api/cart", None).await;
    assert_eq!(first.status, StatusCode::OK);
    let session = first.session.clone().expect("session header");
    assert!(session.starts_with("sess"));
    assert!(first
        .set_cookie
        .as_deref()
        .is_some_and(|c| c.starts_with(&format!("duka_session={session}"))));
    assert_eq!(first.data()["summary"]["is_empty"], true);

    let again = app.get("/api/cart", Some(&session)).await;
    assert_eq!(again.status, StatusCode::OK);
    assert!(again.session.is_none());
    assert_eq!(again.data()["id"], first.data()["id"]);
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() {
    let app = TestApp::new();
    let mut builder = axum::http::Request::builder().uri("/health");
    builder = builder.header("x-request-id", "req-42");
    let response = tower::ServiceExt::oneshot(
        app.router(),
        builder.body(axum::body::Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = tower::ServiceExt::oneshot(
        app.router(),
        axum::http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    assert!(!response.headers().contains_key("x-session-id"));
}

#[tokio::test]
async fn test_add_update_remove_totals() {
    let app = TestApp::new();
    let shirt = app.seed_product("Kitenge Shirt", 100_000, 10);
    let kikoi = app.seed_product("Kikoi", 50_000, 10);
    let session = app.guest_session().await;

    let added = app
        .post(
            "/api/cart/items",
            Some(&session),
            &json!({ "product_id": shirt.id, "quantity": 2 }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);

    let added = app
        .post("/api/cart/items", Some(&session), &json!({ "product_id": kikoi.id }))
        .await;
    let summary = &added.data()["summary"];
    assert_eq!(summary["cart_total"]["amount"], 250_000);
    assert_eq!(summary["total_items"], 3);
    assert_eq!(summary["total_unique_items"], 2);

    let kikoi_line = added.data()["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == json!(kikoi.id))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let updated = app
        .patch(
            &format!("/api/cart/items/{kikoi_line}"),
            Some(&session),
            &json!({ "quantity": 3 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["summary"]["cart_total"]["amount"], 350_000);

    let zeroed = app
        .patch(
            &format!("/api/cart/items/{kikoi_line}"),
            Some(&session),
            &json!({ "quantity": 0 }),
        )
        .await;
    assert_eq!(zeroed.data()["items"].as_array().unwrap().len(), 1);
    assert_eq!(zeroed.data()["summary"]["total_items"], 2);

    let cleared = app.delete("/api/cart", Some(&session)).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.data()["summary"]["is_empty"], true);
}

#[tokio::test]
async fn test_cart_errors() {
    let app = TestApp::new();
    let shirt = app.seed_product("Kitenge Shirt", 100_000, 1);
    let session = app.guest_session().await;

    let too_many = app
        .post(
            "/api/cart/items",
            Some(&session),
            &json!({ "product_id": shirt.id, "quantity": 5 }),
        )
        .await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .post(
            "/api/cart/items",
            Some(&session),
            &json!({ "product_id": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error_code(), "not_found");

    let missing_line = app
        .delete(
            &format!("/api/cart/items/{}", uuid::Uuid::new_v4()),
            Some(&session),
        )
        .await;
    assert_eq!(missing_line.status, StatusCode::NOT_FOUND);

    let garbage_id = app.delete("/api/cart/items/not-a-uuid", Some(&session)).await;
    assert_eq!(garbage_id.status, StatusCode::NOT_FOUND);

    let bad_body = app
        .post("/api/cart/items", Some(&session), &json!({ "quantity": 1 }))
        .await;
    assert_eq!(bad_body.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_body.error_code(), "bad_request");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let app = TestApp::new();
    let shirt = app.seed_product("Kitenge Shirt", 100_000, 10);
    let first = app.guest_session().await;
    let second = app.guest_session().await;
    assert_ne!(first, second);

    app.post("/api/cart/items", Some(&first), &json!({ "product_id": shirt.id }))
        .await;
    let other = app.get("/api/cart", Some(&second)).await;
    assert_eq!(other.data()["summary"]["is_empty"], true);
}

#[tokio::test]
async fn test_wishlist_move_to_cart() {
    let app = TestApp::new();
    let shirt = app.seed_product("Kitenge Shirt", 100_000, 10);
    let session = app.guest_session().await;

    let saved = app
        .post("/api/wishlist", Some(&session), &json!({ "product_id": shirt.id }))
        .await;
    assert_eq!(saved.status, StatusCode::OK);
    let again = app
        .post("/api/wishlist", Some(&session), &json!({ "product_id": shirt.id }))
        .await;
    assert_eq!(again.data().as_array().unwrap().len(), 1);

    let moved = app
        .post(
            &format!("/api/wishlist/{}/move-to-cart", shirt.id),
            Some(&session),
            &json!({}),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.data()["summary"]["total_items"], 1);

    let list = app.get("/api/wishlist", Some(&session)).await;
    assert!(list.data().as_array().unwrap().is_empty());

    let gone = app
        .delete(&format!("/api/wishlist/{}", shirt.id), Some(&session))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
