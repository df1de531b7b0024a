//! Integration tests for the cart REST API
//!
//! These tests drive the real router end to end and cover:
//! - Cart resolution and session-cookie minting
//! - Line-item reconciliation (coalescing, spec distinctness)
//! - Partial updates, removal and clearing
//! - The guest-to-user merge flow
//! - Error handling (missing products, invalid quantity)

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

// Import from the main crate
use storefront_cart::cart::AppState;
use storefront_cart::router::create_app_router;

/// Helper function to create a test app instance
fn create_test_app() -> axum::Router {
    let state = Arc::new(AppState::new());
    create_app_router(state)
}

/// Helper function to send a request and get status, headers and JSON body.
///
/// `headers` carries identity: ("cookie", "cart_session=...") for the guest
/// session and ("x-user-id", ...) for the authenticated user.
async fn send_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let response_headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, response_headers, body)
}

/// Fetches one active product id from the seeded catalog.
async fn first_product(app: &axum::Router) -> Value {
    let (status, _, body) = send_request(app, "GET", "/products", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().first().unwrap().clone()
}

fn cookie(session: &str) -> String {
    format!("cart_session={session}")
}

#[tokio::test]
async fn test_get_cart_mints_a_session_cookie() {
    let app = create_test_app();

    let (status, headers, body) = send_request(&app, "GET", "/cart", &[], None).await;

    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers.get("set-cookie").unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("cart_session="));
    assert!(set_cookie.contains("HttpOnly"));

    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 0);
    assert_eq!(body["itemCount"], 0);
}

#[tokio::test]
async fn test_existing_session_is_not_reissued() {
    let app = create_test_app();
    let session = cookie("known-session");

    let (status, headers, _) =
        send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get("set-cookie").is_none());
}

#[tokio::test]
async fn test_repeated_resolution_returns_the_same_cart() {
    let app = create_test_app();
    let session = cookie("stable-session");

    let (_, _, first) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    let (_, _, second) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_reconciliation_scenario() {
    let app = create_test_app();
    let session = cookie("scenario");
    let product = first_product(&app).await;
    let product_id = product["id"].as_str().unwrap();

    // Add 2x size M.
    let (status, _, item) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product_id, "quantity": 2, "specs": { "size": "M" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["quantity"], 2);
    assert_eq!(item["name"], product["name"]);
    let size_m_item_id = item["id"].as_str().unwrap().to_string();

    // Add 3 more of the same selection: still one line, quantity 5.
    let (status, _, item) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product_id, "quantity": 3, "specs": { "size": "M" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["id"].as_str().unwrap(), size_m_item_id);
    assert_eq!(item["quantity"], 5);

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["itemCount"], 5);

    // A different spec map opens a second line.
    let (status, _, _) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product_id, "quantity": 1, "specs": { "size": "L" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["itemCount"], 6);

    // Removing the size-M line leaves only the size-L one.
    let (status, _, _) = send_request(
        &app,
        "DELETE",
        &format!("/cart/items/{size_m_item_id}"),
        &[("cookie", &session)],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["itemCount"], 1);
}

#[tokio::test]
async fn test_totals_reflect_price_times_quantity() {
    let app = create_test_app();
    let session = cookie("totals");
    let product = first_product(&app).await;
    let price = product["price"].as_u64().unwrap();

    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product["id"], "quantity": 3 })),
    )
    .await;

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["total"].as_u64().unwrap(), 3 * price);
    assert_eq!(cart["itemCount"], 3);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let app = create_test_app();

    let (status, _, _) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &cookie("s"))],
        Some(json!({ "productId": "00000000-0000-4000-8000-000000000000", "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let app = create_test_app();
    let session = cookie("zero-qty");
    let product = first_product(&app).await;

    let (status, _, _) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product["id"], "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Failed adds leave the cart untouched.
    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_item_quantity() {
    let app = create_test_app();
    let session = cookie("update");
    let product = first_product(&app).await;

    let (_, _, item) = send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product["id"], "quantity": 1 })),
    )
    .await;
    let item_id = item["id"].as_str().unwrap();

    let (status, _, updated) = send_request(
        &app,
        "PATCH",
        &format!("/cart/items/{item_id}"),
        &[("cookie", &session)],
        Some(json!({ "quantity": 7 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 7);

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["itemCount"], 7);
}

#[tokio::test]
async fn test_update_foreign_item_is_not_found() {
    let app = create_test_app();

    let (status, _, _) = send_request(
        &app,
        "PATCH",
        "/cart/items/00000000-0000-4000-8000-000000000000",
        &[("cookie", &cookie("lonely"))],
        Some(json!({ "quantity": 2 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart_is_idempotent() {
    let app = create_test_app();
    let session = cookie("clear");
    let product = first_product(&app).await;

    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &session)],
        Some(json!({ "productId": product["id"], "quantity": 2 })),
    )
    .await;

    let (status, _, _) =
        send_request(&app, "DELETE", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Clearing again still succeeds.
    let (status, _, _) =
        send_request(&app, "DELETE", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, cart) = send_request(&app, "GET", "/cart", &[("cookie", &session)], None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_user_cart_takes_precedence() {
    let app = create_test_app();
    let guest_session = cookie("precedence-guest");
    let user_session = cookie("precedence-user");

    // A guest cart for session A, and a user cart resolved under session B.
    let (_, _, guest_cart) =
        send_request(&app, "GET", "/cart", &[("cookie", &guest_session)], None).await;
    let (_, _, user_cart) = send_request(
        &app,
        "GET",
        "/cart",
        &[("cookie", &user_session), ("x-user-id", "user-1")],
        None,
    )
    .await;
    assert_ne!(guest_cart["id"], user_cart["id"]);

    // Carrying both identities resolves to the user cart.
    let (_, _, resolved) = send_request(
        &app,
        "GET",
        "/cart",
        &[("cookie", &guest_session), ("x-user-id", "user-1")],
        None,
    )
    .await;
    assert_eq!(resolved["id"], user_cart["id"]);
}

#[tokio::test]
async fn test_merge_folds_guest_cart_into_user_cart() {
    let app = create_test_app();
    let guest_session = cookie("merge-guest");
    let user_session = cookie("merge-user");
    let products = {
        let (_, _, body) = send_request(&app, "GET", "/products", &[], None).await;
        body.as_array().unwrap().clone()
    };
    let shared = &products[0];
    let extra = &products[1];

    // Guest cart: 2x shared (size M) and 1x extra.
    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &guest_session)],
        Some(json!({ "productId": shared["id"], "quantity": 2, "specs": { "size": "M" } })),
    )
    .await;
    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &guest_session)],
        Some(json!({ "productId": extra["id"], "quantity": 1 })),
    )
    .await;

    // User cart: 3x shared with the same specs.
    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &user_session), ("x-user-id", "user-9")],
        Some(json!({ "productId": shared["id"], "quantity": 3, "specs": { "size": "M" } })),
    )
    .await;

    // The client merges right after authenticating.
    let (status, _, merged) = send_request(
        &app,
        "POST",
        "/cart/merge",
        &[("cookie", &guest_session), ("x-user-id", "user-9")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Shared selection coalesced (2+3), extra line cloned over.
    let items = merged["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(merged["itemCount"], 6);
    let shared_line = items
        .iter()
        .find(|i| i["productId"] == shared["id"])
        .unwrap();
    assert_eq!(shared_line["quantity"], 5);

    // The guest cart is now empty.
    let (_, _, guest_cart) =
        send_request(&app, "GET", "/cart", &[("cookie", &guest_session)], None).await;
    assert_eq!(guest_cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_merge_twice_does_not_double_count() {
    let app = create_test_app();
    let guest_session = cookie("remerge-guest");
    let product = first_product(&app).await;

    send_request(
        &app,
        "POST",
        "/cart/items",
        &[("cookie", &guest_session)],
        Some(json!({ "productId": product["id"], "quantity": 4 })),
    )
    .await;

    let identity = [
        ("cookie", guest_session.as_str()),
        ("x-user-id", "user-11"),
    ];
    let (_, _, first) = send_request(&app, "POST", "/cart/merge", &identity, None).await;
    assert_eq!(first["itemCount"], 4);

    let (_, _, second) = send_request(&app, "POST", "/cart/merge", &identity, None).await;
    assert_eq!(second["itemCount"], 4);
}

#[tokio::test]
async fn test_merge_requires_an_authenticated_user() {
    let app = create_test_app();

    let (status, _, _) = send_request(
        &app,
        "POST",
        "/cart/merge",
        &[("cookie", &cookie("anon"))],
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_lookup_endpoints() {
    let app = create_test_app();
    let product = first_product(&app).await;
    let id = product["id"].as_str().unwrap();

    let (status, _, body) =
        send_request(&app, "GET", &format!("/products/{id}"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], product["name"]);

    let (status, _, _) = send_request(
        &app,
        "GET",
        "/products/00000000-0000-4000-8000-000000000000",
        &[],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
