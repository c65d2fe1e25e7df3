//! # Glowcast Common Library
//!
//! Shared code for the Glowcast alert dispatcher including:
//! - Alert payload and event-action configuration types
//! - Speech item types
//! - Overlay event enum and EventBus
//! - Tuning parameters for queue timing
//! - Common error type

pub mod alert;
pub mod error;
pub mod events;
pub mod speech;
pub mod tuning;

pub use error::{Error, Result};
pub use tuning::AlertTuning;
