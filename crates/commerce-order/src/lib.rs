//! Order record management for the SA Commerce service.
//!
//! This module owns the lifecycle of a purchase order: creation with
//! computed identifiers, status transitions with an append-only tracking
//! history, payment state changes, admin listing with filters and
//! pagination, and destructive deletion.
//!
//! The identifier-generation path is the one place that needs explicit
//! concurrency control. Order numbers come from an atomically incremented
//! sequence counter, never from a count of existing records, and both
//! generated identifiers are claimed in unique index namespaces with a
//! bounded retry on conflict.

pub mod numbering;

use chrono::Utc;
use commerce_storage::{StorageError, StorageService};
use commerce_types::{
	CreateOrderRequest, LineItemKind, Order, OrderStatus, OrderType, PaymentStatus, TrackingUpdate,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Namespace holding the order records themselves.
const ORDERS_NAMESPACE: &str = "orders";
/// Unique index claiming each issued tracking number.
const TRACKING_INDEX_NAMESPACE: &str = "tracking_numbers";
/// Unique index claiming each issued order number.
const ORDER_NUMBER_INDEX_NAMESPACE: &str = "order_numbers";
/// Name of the sequence counter behind order numbers.
const ORDER_SEQUENCE: &str = "orders";

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// Error that occurs when a creation request is missing or misusing
	/// fields. Carries every offending field name.
	#[error("Validation failed for fields: {}", .0.join(", "))]
	Validation(Vec<String>),
	/// Error that occurs when the requested order does not exist.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// Error that occurs when identifier generation keeps hitting taken
	/// values and the attempt budget runs out.
	#[error("Could not allocate a unique {kind} after {attempts} attempts")]
	IdentifierExhausted { kind: &'static str, attempts: u32 },
	/// Error that occurs in the storage layer.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Filter predicates for the admin order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
	/// Restrict to orders currently in this fulfilment status.
	pub status: Option<OrderStatus>,
	/// Restrict to orders of this classification.
	pub order_type: Option<OrderType>,
}

/// One page of the admin order listing.
#[derive(Debug)]
pub struct OrderPage {
	/// The page slice, newest first. Bounded by the page size.
	pub orders: Vec<Order>,
	/// Total records matching the filter across all pages.
	pub total: u64,
}

/// Service that manages the order lifecycle against a storage backend.
pub struct OrderService {
	storage: Arc<StorageService>,
	/// Attempt budget for claiming a generated identifier.
	max_claim_attempts: u32,
}

impl OrderService {
	/// Creates a new OrderService over the given storage.
	pub fn new(storage: Arc<StorageService>, max_claim_attempts: u32) -> Self {
		Self {
			storage,
			// A zero budget would make every creation fail outright
			max_claim_attempts: max_claim_attempts.max(1),
		}
	}

	/// Creates an order from a checkout request.
	///
	/// Validates the request, reporting every offending field at once,
	/// then generates and claims the two customer-facing identifiers and
	/// persists the record. New orders start `pending`/`pending` with an
	/// empty tracking history.
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
		validate_create(&request)?;

		let computed: Decimal = request.items.iter().map(|i| i.subtotal()).sum();
		if computed != request.total_amount {
			// Totals are computed client-side and trusted; surface drift
			// without rejecting until the product owner rules otherwise.
			tracing::warn!(
				declared = %request.total_amount,
				computed = %computed,
				"order total does not match the sum of line item subtotals"
			);
		}

		let now = Utc::now();
		let id = Uuid::new_v4().to_string();

		let tracking_number = self.claim_tracking_number(&id, now).await?;
		let order_number = match self.claim_order_number(&id).await {
			Ok(number) => number,
			Err(e) => {
				self.release_claim(TRACKING_INDEX_NAMESPACE, &tracking_number)
					.await;
				return Err(e);
			},
		};

		let order = Order {
			id: id.clone(),
			user_id: request.user_id,
			items: request.items,
			total_amount: request.total_amount,
			shipping_address: request.shipping_address,
			payment_method: request.payment_method,
			payment_status: PaymentStatus::Pending,
			status: OrderStatus::Pending,
			tracking_number,
			tracking_updates: Vec::new(),
			order_number,
			order_type: request.order_type,
			created_at: now,
			updated_at: now,
		};

		if let Err(e) = self.storage.store(ORDERS_NAMESPACE, &id, &order).await {
			self.release_claim(TRACKING_INDEX_NAMESPACE, &order.tracking_number)
				.await;
			self.release_claim(ORDER_NUMBER_INDEX_NAMESPACE, &order.order_number)
				.await;
			return Err(e.into());
		}

		tracing::info!(
			order_number = %order.order_number,
			tracking_number = %order.tracking_number,
			order_type = %order.order_type,
			"created order"
		);
		Ok(order)
	}

	/// Fetches an order by its storage id.
	pub async fn get_order(&self, id: &str) -> Result<Order, OrderError> {
		match self.storage.retrieve(ORDERS_NAMESPACE, id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => Err(OrderError::NotFound(id.to_string())),
			Err(e) => Err(e.into()),
		}
	}

	/// Records a status change on an order.
	///
	/// Appends one `{status, message, timestamp}` entry to the tracking
	/// history and updates the current status. The history is append-only;
	/// prior entries are never modified or removed. When no message is
	/// given, a canned per-status message is used.
	///
	/// Transitions are deliberately unconstrained: any status may follow
	/// any other, and the history keeps the full audit trail either way.
	pub async fn record_status(
		&self,
		id: &str,
		status: OrderStatus,
		message: Option<String>,
	) -> Result<Order, OrderError> {
		let mut order = self.get_order(id).await?;

		let now = Utc::now();
		let message = message
			.filter(|m| !m.trim().is_empty())
			.unwrap_or_else(|| status.default_tracking_message().to_string());

		order.tracking_updates.push(TrackingUpdate {
			status,
			message,
			timestamp: now,
		});
		order.status = status;
		order.updated_at = now;

		self.storage.update(ORDERS_NAMESPACE, id, &order).await?;

		tracing::info!(order_number = %order.order_number, status = %status, "recorded order status");
		Ok(order)
	}

	/// Records a payment state change, e.g. from a payment webhook.
	pub async fn record_payment_status(
		&self,
		id: &str,
		payment_status: PaymentStatus,
	) -> Result<Order, OrderError> {
		let mut order = self.get_order(id).await?;

		order.payment_status = payment_status;
		order.updated_at = Utc::now();

		self.storage.update(ORDERS_NAMESPACE, id, &order).await?;

		tracing::info!(order_number = %order.order_number, payment_status = %payment_status, "recorded payment status");
		Ok(order)
	}

	/// Returns one page of orders, newest first, with the total matching
	/// count for pagination controls.
	///
	/// `page` is 1-based. A page past the end of the data returns an
	/// empty slice with the correct total, not an error.
	pub async fn list_orders(
		&self,
		page: u32,
		page_size: u32,
		filter: &OrderFilter,
	) -> Result<OrderPage, OrderError> {
		let ids = self.storage.list_ids(ORDERS_NAMESPACE).await?;

		let mut orders = Vec::with_capacity(ids.len());
		for id in ids {
			match self.storage.retrieve::<Order>(ORDERS_NAMESPACE, &id).await {
				Ok(order) => orders.push(order),
				// Deleted between the listing and the read
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e.into()),
			}
		}

		orders.retain(|o| {
			filter.status.is_none_or(|s| o.status == s)
				&& filter.order_type.is_none_or(|t| o.order_type == t)
		});

		// Newest first; order number as a stable tie-break for records
		// created within the same instant.
		orders.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.order_number.cmp(&a.order_number))
		});

		let total = orders.len() as u64;
		let page = page.max(1);
		let page_size = page_size.max(1);
		let start = (page as usize - 1) * page_size as usize;
		let orders = orders
			.into_iter()
			.skip(start)
			.take(page_size as usize)
			.collect();

		Ok(OrderPage { orders, total })
	}

	/// Deletes an order together with its identifier-index entries.
	///
	/// Destructive and irreversible; there is no soft delete.
	pub async fn delete_order(&self, id: &str) -> Result<(), OrderError> {
		let order = self.get_order(id).await?;

		self.storage.remove(ORDERS_NAMESPACE, id).await?;
		self.storage
			.remove(TRACKING_INDEX_NAMESPACE, &order.tracking_number)
			.await?;
		self.storage
			.remove(ORDER_NUMBER_INDEX_NAMESPACE, &order.order_number)
			.await?;

		tracing::info!(order_number = %order.order_number, "deleted order");
		Ok(())
	}

	/// Generates tracking number candidates until one is claimed.
	///
	/// The 4-digit random suffix makes same-day collisions plausible
	/// under load, so each candidate is claimed in the unique index and a
	/// conflict triggers a fresh candidate, up to the attempt budget.
	async fn claim_tracking_number(
		&self,
		order_id: &str,
		created_at: chrono::DateTime<Utc>,
	) -> Result<String, OrderError> {
		for attempt in 1..=self.max_claim_attempts {
			let candidate = numbering::tracking_number(created_at);
			match self
				.storage
				.store_new(TRACKING_INDEX_NAMESPACE, &candidate, &order_id)
				.await
			{
				Ok(()) => return Ok(candidate),
				Err(StorageError::Duplicate(_)) => {
					tracing::warn!(%candidate, attempt, "tracking number already taken, retrying");
				},
				Err(e) => return Err(e.into()),
			}
		}

		Err(OrderError::IdentifierExhausted {
			kind: "tracking number",
			attempts: self.max_claim_attempts,
		})
	}

	/// Draws sequence values until the formatted order number is claimed.
	///
	/// The atomic counter makes conflicts impossible in the normal path;
	/// the claim-with-retry is the safety net for an index seeded by an
	/// earlier deployment or a counter reset.
	async fn claim_order_number(&self, order_id: &str) -> Result<String, OrderError> {
		for attempt in 1..=self.max_claim_attempts {
			let sequence = self.storage.next_sequence(ORDER_SEQUENCE).await?;
			let candidate = numbering::order_number(sequence);
			match self
				.storage
				.store_new(ORDER_NUMBER_INDEX_NAMESPACE, &candidate, &order_id)
				.await
			{
				Ok(()) => return Ok(candidate),
				Err(StorageError::Duplicate(_)) => {
					tracing::warn!(%candidate, attempt, "order number already taken, retrying");
				},
				Err(e) => return Err(e.into()),
			}
		}

		Err(OrderError::IdentifierExhausted {
			kind: "order number",
			attempts: self.max_claim_attempts,
		})
	}

	/// Best-effort removal of an identifier claim after a failed creation.
	async fn release_claim(&self, namespace: &str, id: &str) {
		if let Err(e) = self.storage.remove(namespace, id).await {
			tracing::warn!(namespace, id, error = %e, "failed to release identifier claim");
		}
	}
}

/// Checks a creation request, collecting every offending field name.
fn validate_create(request: &CreateOrderRequest) -> Result<(), OrderError> {
	let mut fields = Vec::new();

	if is_blank(&request.user_id) {
		fields.push("userId".to_string());
	}

	if request.items.is_empty() {
		fields.push("items".to_string());
	}
	for (i, item) in request.items.iter().enumerate() {
		if is_blank(&item.title) {
			fields.push(format!("items[{}].title", i));
		}
		if item.price < Decimal::ZERO {
			fields.push(format!("items[{}].price", i));
		}
		if item.quantity == 0 {
			fields.push(format!("items[{}].quantity", i));
		}
		match item.kind {
			LineItemKind::Course => {
				if item.course_id.as_deref().is_none_or(is_blank) {
					fields.push(format!("items[{}].courseId", i));
				}
				if item.product_id.is_some() {
					fields.push(format!("items[{}].productId", i));
				}
			},
			LineItemKind::Product => {
				if item.product_id.as_deref().is_none_or(is_blank) {
					fields.push(format!("items[{}].productId", i));
				}
				if item.course_id.is_some() {
					fields.push(format!("items[{}].courseId", i));
				}
			},
		}
	}

	if request.total_amount < Decimal::ZERO {
		fields.push("totalAmount".to_string());
	}
	if is_blank(&request.payment_method) {
		fields.push("paymentMethod".to_string());
	}

	let address = &request.shipping_address;
	for (value, name) in [
		(&address.name, "shippingAddress.name"),
		(&address.email, "shippingAddress.email"),
		(&address.phone_no, "shippingAddress.phoneNo"),
		(&address.street, "shippingAddress.street"),
		(&address.city, "shippingAddress.city"),
		(&address.province, "shippingAddress.province"),
		(&address.postal_code, "shippingAddress.postalCode"),
	] {
		if is_blank(value) {
			fields.push(name.to_string());
		}
	}

	if fields.is_empty() {
		Ok(())
	} else {
		Err(OrderError::Validation(fields))
	}
}

fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

#[cfg(test)]
mod tests {
	use super::*;
	use commerce_storage::implementations::memory::MemoryStorage;
	use commerce_types::{OrderItem, ShippingAddress};
	use regex::Regex;

	fn service() -> (Arc<StorageService>, OrderService) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let orders = OrderService::new(Arc::clone(&storage), 8);
		(storage, orders)
	}

	fn shipping_address() -> ShippingAddress {
		ShippingAddress {
			name: "Amina Khan".into(),
			email: "amina@example.com".into(),
			phone_no: "+92-300-1234567".into(),
			street: "12 Mall Road".into(),
			city: "Lahore".into(),
			province: "Punjab".into(),
			postal_code: "54000".into(),
		}
	}

	fn course_request() -> CreateOrderRequest {
		CreateOrderRequest {
			user_id: "U1".into(),
			items: vec![OrderItem {
				title: "Logo Design".into(),
				price: Decimal::new(150, 0),
				quantity: 1,
				kind: LineItemKind::Course,
				course_id: Some("C1".into()),
				product_id: None,
			}],
			total_amount: Decimal::new(150, 0),
			shipping_address: shipping_address(),
			payment_method: "card".into(),
			order_type: OrderType::Course,
		}
	}

	fn product_request() -> CreateOrderRequest {
		CreateOrderRequest {
			user_id: "U2".into(),
			items: vec![OrderItem {
				title: "Sticker pack".into(),
				price: Decimal::new(25, 0),
				quantity: 2,
				kind: LineItemKind::Product,
				course_id: None,
				product_id: Some("P7".into()),
			}],
			total_amount: Decimal::new(50, 0),
			shipping_address: shipping_address(),
			payment_method: "cod".into(),
			order_type: OrderType::Product,
		}
	}

	#[tokio::test]
	async fn creation_sets_defaults_and_identifiers() {
		let (_, orders) = service();

		let order = orders.create_order(course_request()).await.unwrap();

		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.payment_status, PaymentStatus::Pending);
		assert!(order.tracking_updates.is_empty());

		assert_eq!(order.tracking_number.len(), 12);
		let expected_prefix = format!("SA{}", order.created_at.format("%y%m%d"));
		assert!(order.tracking_number.starts_with(&expected_prefix));
		assert!(Regex::new(r"^SA\d{10}$")
			.unwrap()
			.is_match(&order.tracking_number));

		assert!(Regex::new(r"^ORD-\d{6}$")
			.unwrap()
			.is_match(&order.order_number));
		assert_eq!(order.order_number, "ORD-000001");
	}

	#[tokio::test]
	async fn order_numbers_are_distinct_and_strictly_increasing() {
		let (_, orders) = service();

		let mut suffixes = Vec::new();
		for _ in 0..6 {
			let order = orders.create_order(course_request()).await.unwrap();
			let suffix: u64 = order.order_number["ORD-".len()..].parse().unwrap();
			suffixes.push(suffix);
		}

		for pair in suffixes.windows(2) {
			assert!(pair[1] > pair[0], "sequence must be strictly increasing");
		}
		let mut deduped = suffixes.clone();
		deduped.dedup();
		assert_eq!(deduped, suffixes);
	}

	#[tokio::test]
	async fn rereading_an_order_is_stable() {
		let (_, orders) = service();

		let created = orders.create_order(course_request()).await.unwrap();
		let first = orders.get_order(&created.id).await.unwrap();
		let second = orders.get_order(&created.id).await.unwrap();

		assert_eq!(first.tracking_number, second.tracking_number);
		assert_eq!(first.order_number, second.order_number);
		assert_eq!(first.tracking_updates, second.tracking_updates);
	}

	#[tokio::test]
	async fn status_update_appends_to_history() {
		let (_, orders) = service();
		let created = orders.create_order(course_request()).await.unwrap();

		let updated = orders
			.record_status(
				&created.id,
				OrderStatus::Shipped,
				Some("Package dispatched".into()),
			)
			.await
			.unwrap();

		assert_eq!(updated.status, OrderStatus::Shipped);
		assert_eq!(updated.tracking_updates.len(), 1);
		let entry = &updated.tracking_updates[0];
		assert_eq!(entry.status, OrderStatus::Shipped);
		assert_eq!(entry.message, "Package dispatched");
		assert!(entry.timestamp >= created.created_at);
	}

	#[tokio::test]
	async fn history_is_append_only() {
		let (_, orders) = service();
		let created = orders.create_order(course_request()).await.unwrap();

		let after_first = orders
			.record_status(&created.id, OrderStatus::Processing, None)
			.await
			.unwrap();
		let after_second = orders
			.record_status(&created.id, OrderStatus::Shipped, Some("On its way".into()))
			.await
			.unwrap();

		assert_eq!(
			after_second.tracking_updates.len(),
			after_first.tracking_updates.len() + 1
		);
		// Prior entries are unchanged, deep equality on the prefix
		assert_eq!(
			&after_second.tracking_updates[..after_first.tracking_updates.len()],
			&after_first.tracking_updates[..]
		);
	}

	#[tokio::test]
	async fn missing_message_falls_back_to_canned_text() {
		let (_, orders) = service();
		let created = orders.create_order(course_request()).await.unwrap();

		let updated = orders
			.record_status(&created.id, OrderStatus::Delivered, None)
			.await
			.unwrap();

		assert_eq!(
			updated.tracking_updates[0].message,
			"Order has been delivered"
		);
	}

	#[tokio::test]
	async fn payment_status_can_be_recorded() {
		let (_, orders) = service();
		let created = orders.create_order(course_request()).await.unwrap();

		let updated = orders
			.record_payment_status(&created.id, PaymentStatus::Completed)
			.await
			.unwrap();

		assert_eq!(updated.payment_status, PaymentStatus::Completed);
		assert!(updated.updated_at >= created.updated_at);
		// Payment changes do not touch the fulfilment history
		assert!(updated.tracking_updates.is_empty());
	}

	#[tokio::test]
	async fn listing_pages_split_as_expected() {
		let (_, orders) = service();
		for _ in 0..25 {
			orders.create_order(course_request()).await.unwrap();
		}

		let filter = OrderFilter::default();
		let page1 = orders.list_orders(1, 10, &filter).await.unwrap();
		let page2 = orders.list_orders(2, 10, &filter).await.unwrap();
		let page3 = orders.list_orders(3, 10, &filter).await.unwrap();
		let page4 = orders.list_orders(4, 10, &filter).await.unwrap();

		assert_eq!(page1.orders.len(), 10);
		assert_eq!(page2.orders.len(), 10);
		assert_eq!(page3.orders.len(), 5);
		assert!(page4.orders.is_empty());
		for page in [&page1, &page2, &page3, &page4] {
			assert_eq!(page.total, 25);
		}

		// Newest first: the most recent order number leads the listing
		assert_eq!(page1.orders[0].order_number, "ORD-000025");
		assert_eq!(page3.orders.last().unwrap().order_number, "ORD-000001");
	}

	#[tokio::test]
	async fn listing_applies_filters() {
		let (_, orders) = service();
		let course = orders.create_order(course_request()).await.unwrap();
		orders.create_order(product_request()).await.unwrap();
		orders.create_order(product_request()).await.unwrap();

		orders
			.record_status(&course.id, OrderStatus::Shipped, None)
			.await
			.unwrap();

		let by_type = orders
			.list_orders(
				1,
				10,
				&OrderFilter {
					order_type: Some(OrderType::Product),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(by_type.total, 2);
		assert!(by_type
			.orders
			.iter()
			.all(|o| o.order_type == OrderType::Product));

		let by_status = orders
			.list_orders(
				1,
				10,
				&OrderFilter {
					status: Some(OrderStatus::Shipped),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(by_status.total, 1);
		assert_eq!(by_status.orders[0].id, course.id);
	}

	#[tokio::test]
	async fn order_number_conflict_is_retried_with_a_fresh_number() {
		let (storage, orders) = service();

		// Simulate a number already claimed by an earlier writer: the
		// counter will hand out 1 first, which is already taken.
		storage
			.store_new("order_numbers", "ORD-000001", &"earlier-writer")
			.await
			.unwrap();

		let order = orders.create_order(course_request()).await.unwrap();
		assert_eq!(order.order_number, "ORD-000002");

		// The pre-existing claim is untouched
		let claimed: String = storage
			.retrieve("order_numbers", "ORD-000001")
			.await
			.unwrap();
		assert_eq!(claimed, "earlier-writer");
	}

	#[tokio::test]
	async fn validation_reports_every_offending_field() {
		let (_, orders) = service();

		let mut request = course_request();
		request.items.clear();
		request.payment_method = "".into();
		request.shipping_address.email = "  ".into();

		let err = orders.create_order(request).await.unwrap_err();
		match err {
			OrderError::Validation(fields) => {
				assert!(fields.contains(&"items".to_string()));
				assert!(fields.contains(&"paymentMethod".to_string()));
				assert!(fields.contains(&"shippingAddress.email".to_string()));
			},
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn item_reference_must_match_its_kind() {
		let (_, orders) = service();

		let mut request = course_request();
		request.items[0].course_id = None;
		request.items[0].product_id = Some("P1".into());

		let err = orders.create_order(request).await.unwrap_err();
		match err {
			OrderError::Validation(fields) => {
				assert!(fields.contains(&"items[0].courseId".to_string()));
				assert!(fields.contains(&"items[0].productId".to_string()));
			},
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn missing_order_is_a_not_found_error() {
		let (_, orders) = service();

		let err = orders.get_order("no-such-id").await.unwrap_err();
		assert!(matches!(err, OrderError::NotFound(id) if id == "no-such-id"));
	}

	#[tokio::test]
	async fn deletion_removes_record_and_identifier_claims() {
		let (storage, orders) = service();
		let order = orders.create_order(course_request()).await.unwrap();

		orders.delete_order(&order.id).await.unwrap();

		let err = orders.get_order(&order.id).await.unwrap_err();
		assert!(matches!(err, OrderError::NotFound(_)));
		assert!(!storage
			.exists("tracking_numbers", &order.tracking_number)
			.await
			.unwrap());
		assert!(!storage
			.exists("order_numbers", &order.order_number)
			.await
			.unwrap());
	}
}
