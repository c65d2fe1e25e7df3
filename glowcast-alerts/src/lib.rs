//! # Glowcast Alert Dispatcher (glowcast-alerts)
//!
//! Turns incoming platform events into time-ordered presentations (alert,
//! speech, sound, image, video) delivered to the local UI and to external
//! overlay renderers over an embedded HTTP/SSE server.
//!
//! **Architecture:** one single-flight delivery queue per presentation
//! channel (alerts, speech), a fire-and-forget overlay broadcast, and an
//! operator-facing REST surface.

pub mod api;
pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod overlay;
pub mod queue;

pub use error::{Error, Result};
