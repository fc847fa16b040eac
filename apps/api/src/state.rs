use std::sync::Arc;

use crate::config::Config;
use crate::store::WellnessStore;
use crate::streak::Clock;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence. Default: PgStore.
    pub store: Arc<dyn WellnessStore>,
    /// Wall clock for streak dates. Default: SystemClock (UTC).
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}
