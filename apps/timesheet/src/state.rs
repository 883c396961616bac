use std::sync::Arc;

use crate::config::Config;
use crate::timesheet::template::TimesheetTemplate;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Validated once at startup; every export stamps a fresh sheet from it.
    pub template: Arc<TimesheetTemplate>,
    pub config: Config,
}
