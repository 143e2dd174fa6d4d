//! HTTP API module.
//!
//! The axum server, the JSON view types it returns, and the log stream
//! shared with the rest of the pipeline.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, sink_from_config, start_server, AppState};
pub use types::*;
pub use logs::*;
