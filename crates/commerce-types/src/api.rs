//! API types for the SA Commerce HTTP endpoints.
//!
//! Request and response payloads exchanged with the storefront and the
//! admin dashboard. Wire naming matches the persisted format: camelCase
//! keys, lowercase enumerated values.

use crate::{
	Order, OrderItem, OrderStatus, OrderType, PaymentStatus, ShippingAddress, SupportTicket,
	TicketStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payload for creating an order from the checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
	/// Purchasing account.
	pub user_id: String,
	/// Line items being purchased.
	pub items: Vec<OrderItem>,
	/// Total charged, computed by the caller.
	pub total_amount: Decimal,
	pub shipping_address: ShippingAddress,
	pub payment_method: String,
	pub order_type: OrderType,
}

/// Payload for recording a status change on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
	/// The status the order moves to.
	pub status: OrderStatus,
	/// Customer-facing note; a canned per-status message is used when absent.
	#[serde(default)]
	pub message: Option<String>,
}

/// Payload for recording a payment state change (webhook-driven).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdateRequest {
	pub payment_status: PaymentStatus,
}

/// Query parameters for the admin order listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
	/// 1-based page number. Defaults to the first page.
	#[serde(default)]
	pub page: Option<u32>,
	/// Records per page. Defaults to the server-side page size.
	#[serde(default)]
	pub page_size: Option<u32>,
	/// Restrict to a single fulfilment status.
	#[serde(default)]
	pub status: Option<OrderStatus>,
	/// Restrict to a single order classification.
	#[serde(default)]
	pub order_type: Option<OrderType>,
}

/// One page of orders, newest first, plus the total matching count for
/// pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
	pub orders: Vec<Order>,
	/// Total records matching the filter, across all pages.
	pub total: u64,
	pub page: u32,
	pub page_size: u32,
}

/// Payload for opening a support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
	pub user_id: String,
	pub subject: String,
	pub message: String,
	pub email: String,
}

/// Payload for an admin reply to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponseRequest {
	/// State the ticket moves to (e.g. resolved once answered).
	pub status: TicketStatus,
	pub admin_response: String,
}

/// Query parameters for the admin ticket listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListQuery {
	#[serde(default)]
	pub page: Option<u32>,
	#[serde(default)]
	pub page_size: Option<u32>,
}

/// One page of support tickets, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListResponse {
	pub tickets: Vec<SupportTicket>,
	pub total: u64,
	pub page: u32,
	pub page_size: u32,
}

/// Standard error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable machine-readable error code.
	pub error: String,
	/// Human-readable explanation.
	pub message: String,
	/// Offending fields for validation failures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Vec<String>>,
}
