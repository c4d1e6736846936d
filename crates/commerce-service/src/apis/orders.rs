//! Order endpoints for the SA Commerce API.
//!
//! Creation is called by the checkout flow; listing, status updates, and
//! deletion back the admin dashboard; the payment endpoint is invoked by
//! payment-webhook handlers.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
};
use commerce_order::{OrderError, OrderFilter};
use commerce_types::{
	CreateOrderRequest, ErrorResponse, Order, OrderListQuery, OrderListResponse,
	PaymentStatusUpdateRequest, StatusUpdateRequest,
};

use crate::server::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handles POST /api/orders requests.
pub async fn create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	match state.orders.create_order(request).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Handles GET /api/orders/{id} requests.
pub async fn get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match state.orders.get_order(&id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Handles GET /api/orders requests (admin listing).
///
/// Supports 1-based `page`, `pageSize`, and optional `status` and
/// `orderType` filters. A page past the end of the data returns an empty
/// list with the correct total.
pub async fn list_orders(
	Query(query): Query<OrderListQuery>,
	State(state): State<AppState>,
) -> Result<Json<OrderListResponse>, ApiError> {
	let page = query.page.unwrap_or(1).max(1);
	let page_size = query.page_size.unwrap_or(state.default_page_size).max(1);
	let filter = OrderFilter {
		status: query.status,
		order_type: query.order_type,
	};

	match state.orders.list_orders(page, page_size, &filter).await {
		Ok(result) => Ok(Json(OrderListResponse {
			orders: result.orders,
			total: result.total,
			page,
			page_size,
		})),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Handles POST /api/orders/{id}/status requests.
pub async fn update_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, ApiError> {
	match state
		.orders
		.record_status(&id, request.status, request.message)
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order status update failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Handles POST /api/orders/{id}/payment requests.
pub async fn update_payment_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<PaymentStatusUpdateRequest>,
) -> Result<Json<Order>, ApiError> {
	match state
		.orders
		.record_payment_status(&id, request.payment_status)
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Payment status update failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Handles DELETE /api/orders/{id} requests.
pub async fn delete_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
	match state.orders.delete_order(&id).await {
		Ok(()) => Ok(StatusCode::NO_CONTENT),
		Err(e) => {
			tracing::warn!("Order deletion failed: {}", e);
			Err(order_error(e))
		},
	}
}

/// Converts a service-level order error into an HTTP error response.
fn order_error(error: OrderError) -> ApiError {
	match error {
		OrderError::Validation(fields) => (
			StatusCode::BAD_REQUEST,
			Json(ErrorResponse {
				error: "VALIDATION_FAILED".to_string(),
				message: error_message(&fields),
				details: Some(fields),
			}),
		),
		OrderError::NotFound(id) => (
			StatusCode::NOT_FOUND,
			Json(ErrorResponse {
				error: "ORDER_NOT_FOUND".to_string(),
				message: format!("No order found with id {}", id),
				details: None,
			}),
		),
		OrderError::IdentifierExhausted { .. } => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse {
				error: "IDENTIFIER_ALLOCATION_FAILED".to_string(),
				message: "Could not allocate a unique order identifier".to_string(),
				details: None,
			}),
		),
		// Backend details stay in the logs, not in the response
		OrderError::Storage(_) => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse {
				error: "INTERNAL_ERROR".to_string(),
				message: "An internal error occurred".to_string(),
				details: None,
			}),
		),
	}
}

fn error_message(fields: &[String]) -> String {
	format!("Missing or invalid fields: {}", fields.join(", "))
}
