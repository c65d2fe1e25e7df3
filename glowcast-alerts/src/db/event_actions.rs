//! Event action configuration queries

use crate::builder::EventActionRepository;
use crate::error::Result;
use glowcast_common::alert::EventActionConfig;
use sqlx::{Pool, Sqlite};
use tracing::debug;

/// Sqlite-backed event action repository
#[derive(Clone)]
pub struct SqliteEventActionRepository {
    pool: Pool<Sqlite>,
}

impl SqliteEventActionRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventActionRepository for SqliteEventActionRepository {
    async fn get_by_event_type(
        &self,
        channel_id: &str,
        event_type: &str,
    ) -> Result<Option<EventActionConfig>> {
        let config = sqlx::query_as::<_, EventActionConfig>(
            r#"
            SELECT channel_id, event_type, is_enabled,
                   text_enabled, text_template, text_duration_ms, text_position,
                   sound_enabled, sound_file_path, sound_volume,
                   image_enabled, image_file_path, image_duration_ms, image_width, image_height,
                   video_enabled, video_file_path, video_width, video_height,
                   browser_source_channel
            FROM event_actions
            WHERE channel_id = ? AND event_type = ?
            "#,
        )
        .bind(channel_id)
        .bind(event_type)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            channel_id,
            event_type,
            found = config.is_some(),
            "event action lookup"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        init_schema(&pool).await.expect("schema");
        pool
    }

    #[tokio::test]
    async fn test_lookup_missing_returns_none() {
        let pool = test_pool().await;
        let repo = SqliteEventActionRepository::new(pool);

        let config = repo.get_by_event_type("chan-1", "follow").await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn test_row_maps_to_config() {
        let pool = test_pool().await;

        sqlx::query(
            r#"
            INSERT INTO event_actions (
                channel_id, event_type, is_enabled,
                text_enabled, text_template, text_duration_ms,
                sound_enabled, sound_file_path, sound_volume,
                browser_source_channel
            ) VALUES (?, ?, 1, 1, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind("chan-1")
        .bind("subscription")
        .bind("{name} subscribed!")
        .bind(5000i64)
        .bind("sub.mp3")
        .bind(0.8f64)
        .bind("secondary")
        .execute(&pool)
        .await
        .unwrap();

        let repo = SqliteEventActionRepository::new(pool);
        let config = repo
            .get_by_event_type("chan-1", "subscription")
            .await
            .unwrap()
            .expect("config row");

        assert!(config.is_enabled);
        assert!(config.text_enabled);
        assert_eq!(config.text_template.as_deref(), Some("{name} subscribed!"));
        assert_eq!(config.text_duration_ms, Some(5000));
        assert!(config.sound_enabled);
        assert_eq!(config.sound_volume, Some(0.8));
        assert!(!config.image_enabled);
        assert!(!config.video_enabled);
        assert_eq!(config.delivery_channel(), "secondary");
    }
}
