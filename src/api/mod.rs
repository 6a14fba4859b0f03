pub mod health;
pub mod instruments;
pub mod orders;
pub mod portfolio;

use crate::db::Repository;
use crate::service::{OrderService, PortfolioService};
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub orders: Arc<OrderService>,
    pub portfolio: Arc<PortfolioService>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>) -> Self {
        let orders = Arc::new(OrderService::new(repo.clone()));
        let portfolio = Arc::new(PortfolioService::new(repo.clone()));
        Self {
            repo,
            orders,
            portfolio,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/:id", get(orders::get_orders))
        .route("/api/orders/:id/cancel", patch(orders::cancel_order))
        .route("/api/portfolio/:user_id", get(portfolio::get_portfolio))
        .route("/api/instruments", get(instruments::get_instruments))
        .route(
            "/api/instruments/search",
            get(instruments::search_instruments),
        )
        .layer(cors)
        .with_state(state)
}
