//! Order types for the SA Commerce service.
//!
//! This module defines the persisted order record together with its line
//! items, shipping details, and append-only tracking history. Field names
//! and enumerated values serialize exactly as the storefront persists them:
//! camelCase fields with lowercase status values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents one persisted purchase transaction.
///
/// An order is created by the checkout flow with a fully populated item
/// list and shipping address. The two human-readable identifiers
/// (`tracking_number`, `order_number`) are assigned exactly once at
/// creation and are immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Opaque unique identifier assigned by the storage layer.
	pub id: String,
	/// Reference to the purchasing account.
	pub user_id: String,
	/// Ordered sequence of line items. Never empty.
	pub items: Vec<OrderItem>,
	/// Total charged for the order.
	pub total_amount: Decimal,
	/// Delivery destination and contact details.
	pub shipping_address: ShippingAddress,
	/// Free-text payment method label (e.g. "card").
	pub payment_method: String,
	/// Current payment state.
	pub payment_status: PaymentStatus,
	/// Current fulfilment state.
	pub status: OrderStatus,
	/// Customer-facing shipment identifier, `SA` + YYMMDD + 4 digits.
	pub tracking_number: String,
	/// Append-only history of status changes communicated to the customer.
	pub tracking_updates: Vec<TrackingUpdate>,
	/// Customer-facing order identifier, `ORD-` + 6-digit sequence.
	pub order_number: String,
	/// Classifies the whole order, independent of per-item type.
	pub order_type: OrderType,
	/// Timestamp set at creation.
	pub created_at: DateTime<Utc>,
	/// Timestamp bumped on every mutation.
	pub updated_at: DateTime<Utc>,
}

/// One line item within an order.
///
/// Exactly one of `course_id`/`product_id` is populated, matching `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	/// Display title of the purchased item.
	pub title: String,
	/// Unit price. Non-negative.
	pub price: Decimal,
	/// Number of units. Positive.
	pub quantity: u32,
	/// Whether this line refers to a course or a physical product.
	#[serde(rename = "type")]
	pub kind: LineItemKind,
	/// Course reference, present when `kind` is `course`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub course_id: Option<String>,
	/// Product reference, present when `kind` is `product`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub product_id: Option<String>,
}

impl OrderItem {
	/// Line subtotal: unit price times quantity.
	pub fn subtotal(&self) -> Decimal {
		self.price * Decimal::from(self.quantity)
	}
}

/// Structured delivery destination. All fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
	pub name: String,
	pub email: String,
	pub phone_no: String,
	pub street: String,
	pub city: String,
	pub province: String,
	pub postal_code: String,
}

/// One entry in an order's tracking history.
///
/// Entries are appended when the order's status changes and are never
/// modified or removed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
	/// The status the order moved to.
	pub status: OrderStatus,
	/// Human-readable note shown to the customer.
	pub message: String,
	/// When the change was recorded.
	pub timestamp: DateTime<Utc>,
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Order has been created but not yet picked up for processing.
	Pending,
	/// Order is being prepared.
	Processing,
	/// Order has left the warehouse.
	Shipped,
	/// Order reached the customer.
	Delivered,
	/// Order was cancelled.
	Cancelled,
}

impl OrderStatus {
	/// Canned customer-facing message used when a status change is
	/// recorded without an explicit message.
	pub fn default_tracking_message(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Order received and awaiting processing",
			OrderStatus::Processing => "Order is being processed",
			OrderStatus::Shipped => "Order has been shipped",
			OrderStatus::Delivered => "Order has been delivered",
			OrderStatus::Cancelled => "Order has been cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Processing => write!(f, "processing"),
			OrderStatus::Shipped => write!(f, "shipped"),
			OrderStatus::Delivered => write!(f, "delivered"),
			OrderStatus::Cancelled => write!(f, "cancelled"),
		}
	}
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	Pending,
	Completed,
	Failed,
	Refunded,
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentStatus::Pending => write!(f, "pending"),
			PaymentStatus::Completed => write!(f, "completed"),
			PaymentStatus::Failed => write!(f, "failed"),
			PaymentStatus::Refunded => write!(f, "refunded"),
		}
	}
}

/// Classification of a whole order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
	Product,
	Course,
}

impl fmt::Display for OrderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderType::Product => write!(f, "product"),
			OrderType::Course => write!(f, "course"),
		}
	}
}

/// Classification of a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemKind {
	Course,
	Product,
}

impl fmt::Display for LineItemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LineItemKind::Course => write!(f, "course"),
			LineItemKind::Product => write!(f, "product"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn order_status_serializes_lowercase() {
		let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
		assert_eq!(json, "\"shipped\"");
		let back: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
		assert_eq!(back, OrderStatus::Cancelled);
	}

	#[test]
	fn item_kind_uses_type_key_on_the_wire() {
		let item = OrderItem {
			title: "Logo Design".into(),
			price: Decimal::new(150, 0),
			quantity: 1,
			kind: LineItemKind::Course,
			course_id: Some("C1".into()),
			product_id: None,
		};
		let value = serde_json::to_value(&item).unwrap();
		assert_eq!(value["type"], "course");
		assert_eq!(value["courseId"], "C1");
		assert!(value.get("productId").is_none());
	}

	#[test]
	fn subtotal_multiplies_price_by_quantity() {
		let item = OrderItem {
			title: "Sticker pack".into(),
			price: Decimal::new(250, 1),
			quantity: 4,
			kind: LineItemKind::Product,
			course_id: None,
			product_id: Some("P9".into()),
		};
		assert_eq!(item.subtotal(), Decimal::new(100, 0));
	}
}
