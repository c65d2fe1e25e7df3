//! HTTP API module
//!
//! REST endpoints for operators (test alerts, queue control, stats) and
//! the SSE stream overlay renderers connect to.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
