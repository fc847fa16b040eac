use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::response::Response;
use serde_json::Value;

use crate::config::Config;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::streak::clock::FixedClock;

/// App state over an in-memory store, with the clock pinned to noon UTC on
/// `today`.
pub fn test_state(store: Arc<MemoryStore>, today: &str) -> AppState {
    AppState {
        store,
        clock: Arc::new(FixedClock::at(today, 12)),
        config: Config::for_tests(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
