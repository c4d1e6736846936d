//! HTTP server for the SA Commerce API.
//!
//! This module provides the router and shared state for the HTTP
//! endpoints exposed to the storefront and the admin dashboard.

use axum::{
	routing::{get, post},
	Router,
};
use commerce_config::ApiConfig;
use commerce_order::OrderService;
use commerce_support::TicketService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Order lifecycle service.
	pub orders: Arc<OrderService>,
	/// Support ticket service.
	pub tickets: Arc<TicketService>,
	/// Page size used when a listing request does not specify one.
	pub default_page_size: u32,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for every endpoint.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route(
					"/orders",
					post(apis::orders::create_order).get(apis::orders::list_orders),
				)
				.route(
					"/orders/{id}",
					get(apis::orders::get_order).delete(apis::orders::delete_order),
				)
				.route("/orders/{id}/status", post(apis::orders::update_status))
				.route(
					"/orders/{id}/payment",
					post(apis::orders::update_payment_status),
				)
				.route(
					"/tickets",
					post(apis::tickets::create_ticket).get(apis::tickets::list_tickets),
				)
				.route("/tickets/{id}", get(apis::tickets::get_ticket))
				.route("/tickets/{id}/response", post(apis::tickets::respond)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("SA Commerce API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
