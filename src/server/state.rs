//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::app::AppContext;
use crate::scraper::Harvester;

/// Shared application state.
pub struct AppState {
    /// Drives one browser session per request.
    pub harvester: Harvester,
    /// Items returned when a request omits `number`.
    pub default_number: usize,
}

impl AppState {
    pub fn new(ctx: &AppContext) -> Arc<Self> {
        Arc::new(Self {
            harvester: ctx.harvester.clone(),
            default_number: ctx.config.server.default_number,
        })
    }
}
