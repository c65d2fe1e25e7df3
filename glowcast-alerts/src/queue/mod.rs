//! Single-flight delivery queues
//!
//! Two independent queues serialize presentation: the alert delivery
//! queue self-times each item from its computed display duration, while
//! the speech queue suspends on an externally signaled completion (with a
//! timeout fallback, because the remote renderer is not trusted to always
//! report back). No ordering is guaranteed between the two queues.

pub mod alert;
pub mod sink;
pub mod speech;

pub use alert::AlertQueue;
pub use sink::{AlertSink, OverlaySink, UiSink};
pub use speech::SpeechQueue;
