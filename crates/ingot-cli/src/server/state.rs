//! Application state for the web server.

use std::sync::Arc;

use ingot::Ingot;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The ingestion engine, shared by all requests.
    pub ingot: Arc<Ingot>,
    /// Largest accepted request body in bytes.
    pub max_file_size: usize,
}

impl AppState {
    pub fn new(ingot: Ingot, max_file_size: usize) -> Self {
        Self {
            ingot: Arc::new(ingot),
            max_file_size,
        }
    }
}
