//! Database initialization
//!
//! Creates the event_actions table when missing. The schema mirrors the
//! four presentation groups of [`EventActionConfig`]; one row per
//! (channel, event type) pair.
//!
//! [`EventActionConfig`]: glowcast_common::alert::EventActionConfig

use crate::error::Result;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Create required tables if they do not exist
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_actions (
            channel_id              TEXT NOT NULL,
            event_type              TEXT NOT NULL,
            is_enabled              INTEGER NOT NULL DEFAULT 1,

            text_enabled            INTEGER NOT NULL DEFAULT 0,
            text_template           TEXT,
            text_duration_ms        INTEGER,
            text_position           TEXT,

            sound_enabled           INTEGER NOT NULL DEFAULT 0,
            sound_file_path         TEXT,
            sound_volume            REAL,

            image_enabled           INTEGER NOT NULL DEFAULT 0,
            image_file_path         TEXT,
            image_duration_ms       INTEGER,
            image_width             INTEGER,
            image_height            INTEGER,

            video_enabled           INTEGER NOT NULL DEFAULT 0,
            video_file_path         TEXT,
            video_width             INTEGER,
            video_height            INTEGER,

            browser_source_channel  TEXT,

            PRIMARY KEY (channel_id, event_type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
