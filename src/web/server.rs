//! Axum HTTP server exposing the calculator.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::config::WebConfig;
use crate::events::bus::EventBus;
use crate::pricing::PricingCalculator;
use crate::tariffs::TariffBook;

use super::routes;

/// Shared state for all web routes.
#[derive(Clone)]
pub struct AppState {
    pub calculator: PricingCalculator<TariffBook>,
    pub event_bus: Arc<EventBus>,
}

pub fn router(state: AppState) -> Router {
    Router::new().merge(routes::api_routes()).with_state(state)
}

pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    pub fn new(config: WebConfig, calculator: PricingCalculator<TariffBook>, event_bus: Arc<EventBus>) -> Self {
        Self {
            config,
            state: AppState {
                calculator,
                event_bus,
            },
        }
    }

    /// Start the HTTP server.
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.port));
        info!(port = self.config.port, "web api starting");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
