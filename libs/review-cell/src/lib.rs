pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::gate::ReviewGate;
use crate::services::queries::ClinicQueries;

/// Shared state for the review routes.
pub struct ReviewState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<ReviewGate>,
    pub queries: Arc<ClinicQueries>,
}
