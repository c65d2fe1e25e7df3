//! Database access layer
//!
//! Sqlite-backed storage for event action configurations. The dispatch
//! pipeline only reads; configuration writes happen through the
//! operator-facing settings surface, which is outside this service.

pub mod event_actions;
pub mod init;

pub use event_actions::SqliteEventActionRepository;
