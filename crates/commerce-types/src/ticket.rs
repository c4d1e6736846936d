//! Support ticket types for the SA Commerce service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-submitted help request.
///
/// Created by a customer; mutated only by an admin, who can attach a
/// response and move the ticket through its states.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
	/// Opaque unique identifier assigned by the storage layer.
	pub id: String,
	/// Reference to the submitting account.
	pub user_id: String,
	/// Short summary of the request.
	pub subject: String,
	/// Full description of the request.
	pub message: String,
	/// Contact address for replies.
	pub email: String,
	/// Current ticket state.
	pub status: TicketStatus,
	/// Admin reply, once one has been given.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_response: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// State of a support ticket. New tickets start `pending`; the remaining
/// states are admin-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
	Pending,
	InProgress,
	Resolved,
	Closed,
}

impl fmt::Display for TicketStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TicketStatus::Pending => write!(f, "pending"),
			TicketStatus::InProgress => write!(f, "in-progress"),
			TicketStatus::Resolved => write!(f, "resolved"),
			TicketStatus::Closed => write!(f, "closed"),
		}
	}
}
