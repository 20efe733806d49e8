use std::sync::Arc;

use coursemart_payments::PaymentGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursemart_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The configured payment provider.
    pub gateway: Arc<dyn PaymentGateway>,
}
