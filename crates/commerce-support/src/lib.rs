//! Support ticket management for the SA Commerce service.
//!
//! Tickets are created by customers and mutated only by admins, who
//! attach a response and move the ticket through its states. There are
//! no generated identifiers beyond the storage-level id.

use chrono::Utc;
use commerce_storage::{StorageError, StorageService};
use commerce_types::{CreateTicketRequest, SupportTicket, TicketStatus};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Namespace holding the ticket records.
const TICKETS_NAMESPACE: &str = "tickets";

/// Errors that can occur during ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
	/// Error that occurs when a creation request has missing fields.
	/// Carries every offending field name.
	#[error("Validation failed for fields: {}", .0.join(", "))]
	Validation(Vec<String>),
	/// Error that occurs when the requested ticket does not exist.
	#[error("Ticket not found: {0}")]
	NotFound(String),
	/// Error that occurs in the storage layer.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// One page of the admin ticket listing.
#[derive(Debug)]
pub struct TicketPage {
	/// The page slice, newest first.
	pub tickets: Vec<SupportTicket>,
	/// Total tickets across all pages.
	pub total: u64,
}

/// Service that manages support tickets against a storage backend.
pub struct TicketService {
	storage: Arc<StorageService>,
}

impl TicketService {
	/// Creates a new TicketService over the given storage.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Opens a ticket from a customer request. New tickets start
	/// `pending` with no admin response.
	pub async fn create_ticket(
		&self,
		request: CreateTicketRequest,
	) -> Result<SupportTicket, TicketError> {
		let mut fields = Vec::new();
		for (value, name) in [
			(&request.user_id, "userId"),
			(&request.subject, "subject"),
			(&request.message, "message"),
			(&request.email, "email"),
		] {
			if value.trim().is_empty() {
				fields.push(name.to_string());
			}
		}
		if !fields.is_empty() {
			return Err(TicketError::Validation(fields));
		}

		let now = Utc::now();
		let ticket = SupportTicket {
			id: Uuid::new_v4().to_string(),
			user_id: request.user_id,
			subject: request.subject,
			message: request.message,
			email: request.email,
			status: TicketStatus::Pending,
			admin_response: None,
			created_at: now,
			updated_at: now,
		};

		self.storage
			.store(TICKETS_NAMESPACE, &ticket.id, &ticket)
			.await?;

		tracing::info!(ticket_id = %ticket.id, "opened support ticket");
		Ok(ticket)
	}

	/// Fetches a ticket by id.
	pub async fn get_ticket(&self, id: &str) -> Result<SupportTicket, TicketError> {
		match self.storage.retrieve(TICKETS_NAMESPACE, id).await {
			Ok(ticket) => Ok(ticket),
			Err(StorageError::NotFound) => Err(TicketError::NotFound(id.to_string())),
			Err(e) => Err(e.into()),
		}
	}

	/// Records an admin reply, setting the response text and the
	/// admin-chosen status.
	pub async fn respond(
		&self,
		id: &str,
		status: TicketStatus,
		response: String,
	) -> Result<SupportTicket, TicketError> {
		if response.trim().is_empty() {
			return Err(TicketError::Validation(vec!["adminResponse".to_string()]));
		}

		let mut ticket = self.get_ticket(id).await?;
		ticket.admin_response = Some(response);
		ticket.status = status;
		ticket.updated_at = Utc::now();

		self.storage.update(TICKETS_NAMESPACE, id, &ticket).await?;

		tracing::info!(ticket_id = %ticket.id, status = %status, "responded to support ticket");
		Ok(ticket)
	}

	/// Returns one page of tickets, newest first, with the total count.
	/// `page` is 1-based; a page past the end returns an empty slice.
	pub async fn list_tickets(&self, page: u32, page_size: u32) -> Result<TicketPage, TicketError> {
		let ids = self.storage.list_ids(TICKETS_NAMESPACE).await?;

		let mut tickets = Vec::with_capacity(ids.len());
		for id in ids {
			match self
				.storage
				.retrieve::<SupportTicket>(TICKETS_NAMESPACE, &id)
				.await
			{
				Ok(ticket) => tickets.push(ticket),
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e.into()),
			}
		}

		tickets.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.id.cmp(&a.id))
		});

		let total = tickets.len() as u64;
		let page = page.max(1);
		let page_size = page_size.max(1);
		let tickets = tickets
			.into_iter()
			.skip((page as usize - 1) * page_size as usize)
			.take(page_size as usize)
			.collect();

		Ok(TicketPage { tickets, total })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use commerce_storage::implementations::memory::MemoryStorage;

	fn service() -> TicketService {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		TicketService::new(storage)
	}

	fn request() -> CreateTicketRequest {
		CreateTicketRequest {
			user_id: "U1".into(),
			subject: "Invoice copy".into(),
			message: "Please resend the invoice for my last order.".into(),
			email: "amina@example.com".into(),
		}
	}

	#[tokio::test]
	async fn new_tickets_start_pending_without_response() {
		let tickets = service();

		let ticket = tickets.create_ticket(request()).await.unwrap();
		assert_eq!(ticket.status, TicketStatus::Pending);
		assert!(ticket.admin_response.is_none());

		let fetched = tickets.get_ticket(&ticket.id).await.unwrap();
		assert_eq!(fetched.subject, "Invoice copy");
	}

	#[tokio::test]
	async fn missing_fields_are_reported_together() {
		let tickets = service();

		let mut bad = request();
		bad.subject = "".into();
		bad.email = "  ".into();

		let err = tickets.create_ticket(bad).await.unwrap_err();
		match err {
			TicketError::Validation(fields) => {
				assert_eq!(fields, vec!["subject".to_string(), "email".to_string()]);
			},
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn responding_sets_text_and_status() {
		let tickets = service();
		let ticket = tickets.create_ticket(request()).await.unwrap();

		let updated = tickets
			.respond(
				&ticket.id,
				TicketStatus::Resolved,
				"Invoice re-sent to your email.".into(),
			)
			.await
			.unwrap();

		assert_eq!(updated.status, TicketStatus::Resolved);
		assert_eq!(
			updated.admin_response.as_deref(),
			Some("Invoice re-sent to your email.")
		);
		assert!(updated.updated_at >= ticket.created_at);
	}

	#[tokio::test]
	async fn responding_to_missing_ticket_is_not_found() {
		let tickets = service();

		let err = tickets
			.respond("missing", TicketStatus::Closed, "done".into())
			.await
			.unwrap_err();
		assert!(matches!(err, TicketError::NotFound(id) if id == "missing"));
	}

	#[tokio::test]
	async fn listing_paginates_newest_first() {
		let tickets = service();
		for i in 0..5 {
			let mut r = request();
			r.subject = format!("Ticket {}", i);
			tickets.create_ticket(r).await.unwrap();
		}

		let page1 = tickets.list_tickets(1, 3).await.unwrap();
		let page2 = tickets.list_tickets(2, 3).await.unwrap();
		let page3 = tickets.list_tickets(3, 3).await.unwrap();

		assert_eq!(page1.tickets.len(), 3);
		assert_eq!(page2.tickets.len(), 2);
		assert!(page3.tickets.is_empty());
		assert_eq!(page1.total, 5);
		assert_eq!(page3.total, 5);
	}
}
