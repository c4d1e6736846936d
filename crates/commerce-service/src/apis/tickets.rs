//! Support ticket endpoints for the SA Commerce API.
//!
//! Creation is customer-facing; retrieval, listing, and responding back
//! the admin dashboard.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
};
use commerce_support::TicketError;
use commerce_types::{
	CreateTicketRequest, ErrorResponse, SupportTicket, TicketListQuery, TicketListResponse,
	TicketResponseRequest,
};

use crate::server::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handles POST /api/tickets requests.
pub async fn create_ticket(
	State(state): State<AppState>,
	Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<SupportTicket>), ApiError> {
	match state.tickets.create_ticket(request).await {
		Ok(ticket) => Ok((StatusCode::CREATED, Json(ticket))),
		Err(e) => {
			tracing::warn!("Ticket creation failed: {}", e);
			Err(ticket_error(e))
		},
	}
}

/// Handles GET /api/tickets/{id} requests.
pub async fn get_ticket(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<SupportTicket>, ApiError> {
	match state.tickets.get_ticket(&id).await {
		Ok(ticket) => Ok(Json(ticket)),
		Err(e) => {
			tracing::warn!("Ticket retrieval failed: {}", e);
			Err(ticket_error(e))
		},
	}
}

/// Handles GET /api/tickets requests (admin listing).
pub async fn list_tickets(
	Query(query): Query<TicketListQuery>,
	State(state): State<AppState>,
) -> Result<Json<TicketListResponse>, ApiError> {
	let page = query.page.unwrap_or(1).max(1);
	let page_size = query.page_size.unwrap_or(state.default_page_size).max(1);

	match state.tickets.list_tickets(page, page_size).await {
		Ok(result) => Ok(Json(TicketListResponse {
			tickets: result.tickets,
			total: result.total,
			page,
			page_size,
		})),
		Err(e) => {
			tracing::warn!("Ticket listing failed: {}", e);
			Err(ticket_error(e))
		},
	}
}

/// Handles POST /api/tickets/{id}/response requests.
pub async fn respond(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<TicketResponseRequest>,
) -> Result<Json<SupportTicket>, ApiError> {
	match state
		.tickets
		.respond(&id, request.status, request.admin_response)
		.await
	{
		Ok(ticket) => Ok(Json(ticket)),
		Err(e) => {
			tracing::warn!("Ticket response failed: {}", e);
			Err(ticket_error(e))
		},
	}
}

/// Converts a service-level ticket error into an HTTP error response.
fn ticket_error(error: TicketError) -> ApiError {
	match error {
		TicketError::Validation(fields) => (
			StatusCode::BAD_REQUEST,
			Json(ErrorResponse {
				error: "VALIDATION_FAILED".to_string(),
				message: format!("Missing or invalid fields: {}", fields.join(", ")),
				details: Some(fields),
			}),
		),
		TicketError::NotFound(id) => (
			StatusCode::NOT_FOUND,
			Json(ErrorResponse {
				error: "TICKET_NOT_FOUND".to_string(),
				message: format!("No ticket found with id {}", id),
				details: None,
			}),
		),
		TicketError::Storage(_) => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse {
				error: "INTERNAL_ERROR".to_string(),
				message: "An internal error occurred".to_string(),
				details: None,
			}),
		),
	}
}
