//! REST API handlers for shopping cart operations
//!
//! This module implements the HTTP endpoints for cart resolution, line-item
//! reconciliation and the guest-to-user merge.

use super::error::CartError;
use super::helpers::format_item_summary;
use super::models::{CartView, NewItemInput, UpdateItemInput};
use super::state::SharedState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:id", patch(update_item).delete(remove_item))
        .route("/cart/merge", post(merge_cart))
}

// =============================================================================
// Request identity
// =============================================================================

/// Reads the authenticated user id placed in `x-user-id` by the upstream
/// auth middleware, if any.
fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Returns the anonymous session id from the `cart_session` cookie, minting
/// a fresh one when the cookie is absent. The boolean flags a new session
/// whose cookie still has to be set on the response.
fn session_id(headers: &HeaderMap) -> (String, bool) {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some(value) = pair.trim().strip_prefix("cart_session=") {
                if !value.is_empty() {
                    return (value.to_string(), false);
                }
            }
        }
    }

    (Uuid::new_v4().simple().to_string(), true)
}

/// Attaches the session cookie to the response when the session is new.
fn with_session_cookie(mut response: Response, session: &str, is_new_session: bool) -> Response {
    if is_new_session {
        let cookie = format!("cart_session={session}; Path=/; HttpOnly");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

// =============================================================================
// Handlers
// =============================================================================

/// Endpoint: GET /cart
/// Resolves (or lazily creates) the caller's cart and returns it with the
/// derived total and item count.
async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let user = user_id(&headers);
    let (session, is_new_session) = session_id(&headers);

    let cart = state.carts.resolve(user.as_deref(), Some(&session));

    let response = Json(CartView::from(&cart)).into_response();
    with_session_cookie(response, &session, is_new_session)
}

/// Endpoint: POST /cart/items
/// Adds a product selection to the caller's cart, coalescing with an
/// existing line for the same (product, variant, specs) triple.
async fn add_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<NewItemInput>,
) -> Result<Response, CartError> {
    if payload.quantity < 1 {
        return Err(CartError::InvalidQuantity);
    }

    // Snapshot lookup happens before any mutation: a missing or inactive
    // product fails the request with the cart untouched.
    let product = state
        .catalog
        .find_active(payload.product_id)
        .ok_or(CartError::ProductNotFound(payload.product_id))?;

    let user = user_id(&headers);
    let (session, is_new_session) = session_id(&headers);
    let cart = state.carts.resolve(user.as_deref(), Some(&session));

    let item = state.carts.add_item(cart.id, payload, &product)?;

    let response = (StatusCode::CREATED, Json(item)).into_response();
    Ok(with_session_cookie(response, &session, is_new_session))
}

/// Endpoint: PATCH /cart/items/:id
/// Applies a partial update (quantity) to one line item of the caller's cart.
async fn update_item(
    State(state): State<SharedState>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateItemInput>,
) -> Result<Response, CartError> {
    let user = user_id(&headers);
    let (session, is_new_session) = session_id(&headers);
    let cart = state.carts.resolve(user.as_deref(), Some(&session));

    let item = state.carts.update_item(cart.id, item_id, payload)?;

    let response = Json(item).into_response();
    Ok(with_session_cookie(response, &session, is_new_session))
}

/// Endpoint: DELETE /cart/items/:id
/// Removes one line item from the caller's cart.
async fn remove_item(
    State(state): State<SharedState>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, CartError> {
    let user = user_id(&headers);
    let (session, is_new_session) = session_id(&headers);
    let cart = state.carts.resolve(user.as_deref(), Some(&session));

    state.carts.remove_item(cart.id, item_id)?;

    let response = StatusCode::NO_CONTENT.into_response();
    Ok(with_session_cookie(response, &session, is_new_session))
}

/// Endpoint: DELETE /cart
/// Empties the caller's cart. Succeeds on an already-empty cart.
async fn clear_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, CartError> {
    let user = user_id(&headers);
    let (session, is_new_session) = session_id(&headers);
    let cart = state.carts.resolve(user.as_deref(), Some(&session));

    state.carts.clear(cart.id)?;

    let response = StatusCode::NO_CONTENT.into_response();
    Ok(with_session_cookie(response, &session, is_new_session))
}

/// Endpoint: POST /cart/merge
/// Folds the caller's anonymous session cart into their user cart. The
/// client invokes this explicitly right after authenticating; login itself
/// does not trigger a merge.
async fn merge_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, CartError> {
    let user = user_id(&headers).ok_or(CartError::Unauthenticated)?;
    let (session, is_new_session) = session_id(&headers);

    let target = state.carts.resolve(Some(&user), None);

    let cart = match state.carts.find_by_session(&session) {
        Some(source) if source.id != target.id => state.carts.merge(source.id, target.id)?,
        _ => target,
    };

    tracing::info!(
        cart = %cart.id,
        user = %user,
        "merged guest cart: {}",
        format_item_summary(&cart.items)
    );

    let response = Json(CartView::from(&cart)).into_response();
    Ok(with_session_cookie(response, &session, is_new_session))
}
