//! HTTP API over the ingestion engine.

mod app;
mod error;
mod handlers;
mod owner;
mod state;

pub use app::run_server;
pub use state::AppState;
