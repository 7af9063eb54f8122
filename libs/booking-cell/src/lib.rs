pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::ledger::BookingLedger;
use crate::services::slots::SlotCalculator;

/// Shared state for the booking routes.
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<BookingLedger>,
    pub slots: Arc<SlotCalculator>,
}
