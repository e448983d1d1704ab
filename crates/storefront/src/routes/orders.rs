//! Checkout and order history handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use filament_shop_core::Order;

use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::{PlaceOrderRequest, PlaceOrderResponse, place_order};
use crate::state::AppState;

/// Orders per page in the history list.
pub const PAGE_SIZE: u64 = 15;

/// Place an order.
///
/// Always answers 200 with `{ok, orderId, message}`, including for malformed
/// bodies. A signed-in caller's identity email replaces the submitted one.
#[instrument(skip_all)]
pub async fn place(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    payload: std::result::Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Json<PlaceOrderResponse> {
    let mut request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::info!(error = %rejection, "unreadable checkout body");
            return Json(PlaceOrderResponse::failure(rejection.body_text()));
        }
    };

    if let Some(identity) = identity {
        request.customer_email = identity.email.into_inner();
        if request.customer_name.trim().is_empty()
            && let Some(name) = identity.name
        {
            request.customer_name = name;
        }
    }

    Json(place_order(state.store().as_ref(), state.notifier(), request).await)
}

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    /// Opaque continuation token from a previous page.
    pub cursor: Option<String>,
}

/// One page of order history.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub next_cursor: Option<String>,
}

/// List orders newest first. Admins see every order; others see their own.
#[instrument(skip_all, fields(email = %identity.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let offset = parse_cursor(query.cursor.as_deref())
        .ok_or_else(|| AppError::BadRequest("invalid cursor".to_string()))?;
    let customer = (!identity.is_admin()).then_some(&identity.email);

    let page = state
        .store()
        .list_orders(customer, offset, PAGE_SIZE)
        .await?;

    Ok(Json(OrderListResponse {
        orders: page.orders,
        next_cursor: page.next_offset.map(|n| n.to_string()),
    }))
}

/// Decode a page cursor into a row offset. Offsets must fit a `BIGINT`.
fn parse_cursor(cursor: Option<&str>) -> Option<u64> {
    match cursor {
        None | Some("") => Some(0),
        Some(cursor) => cursor
            .parse::<u64>()
            .ok()
            .filter(|offset| i64::try_from(*offset).is_ok()),
    }
}
