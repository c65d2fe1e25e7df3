//! Alert payload and event-action configuration types
//!
//! An [`AlertPayload`] is the immutable description of one presentable
//! event. It is created once by the alert builder, enqueued once, consumed
//! exactly once by the delivery queue, then discarded. Each of the four
//! presentation blocks (text/sound/image/video) is optional; presence of a
//! block encodes the "enabled and valid" decision already made upstream,
//! so nothing downstream performs further lookups.

use crate::tuning::AlertTuning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical routing name used when a configuration does not name one
pub const DEFAULT_DELIVERY_CHANNEL: &str = "default";

/// Per-(channel, event-type) alert configuration
///
/// Owned by the storage layer; read-only to the dispatch pipeline. Four
/// independently togglable presentation groups plus a master switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EventActionConfig {
    pub channel_id: String,
    pub event_type: String,

    /// Master switch; false short-circuits the builder entirely
    pub is_enabled: bool,

    // Text group
    pub text_enabled: bool,
    pub text_template: Option<String>,
    pub text_duration_ms: Option<i64>,
    pub text_position: Option<String>,

    // Sound group
    pub sound_enabled: bool,
    pub sound_file_path: Option<String>,
    pub sound_volume: Option<f64>,

    // Image group
    pub image_enabled: bool,
    pub image_file_path: Option<String>,
    pub image_duration_ms: Option<i64>,
    pub image_width: Option<i64>,
    pub image_height: Option<i64>,

    // Video group
    pub video_enabled: bool,
    pub video_file_path: Option<String>,
    pub video_width: Option<i64>,
    pub video_height: Option<i64>,

    /// Logical overlay channel this alert routes to (default "default")
    pub browser_source_channel: Option<String>,
}

impl EventActionConfig {
    /// True if at least one presentation group is switched on
    pub fn any_type_enabled(&self) -> bool {
        self.text_enabled || self.sound_enabled || self.image_enabled || self.video_enabled
    }

    /// Resolved delivery channel, falling back to the default
    pub fn delivery_channel(&self) -> String {
        self.browser_source_channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_DELIVERY_CHANNEL)
            .to_string()
    }
}

/// Output of the template formatter collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormattedEvent {
    pub html: String,
    pub plain_text: String,
    pub emoji: String,
    /// Template variables extracted from the raw event ({name}, {amount}, ...)
    pub variables: HashMap<String, String>,
}

/// Rendered text block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// Template output with variables substituted
    pub rendered: String,
    pub duration_ms: u64,
    pub position: Option<String>,
}

/// Resolved sound block (file already validated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundBlock {
    pub file_path: String,
    /// 0.0-1.0
    pub volume: f64,
}

/// Resolved image block (file already validated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    pub file_path: String,
    pub duration_ms: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Resolved video block (file already validated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoBlock {
    pub file_path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Immutable description of one presentable alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub event_type: String,
    pub channel_id: String,
    /// Logical overlay channel this alert routes to
    pub delivery_channel: String,
    pub formatted: FormattedEvent,
    pub text: Option<TextBlock>,
    pub sound: Option<SoundBlock>,
    pub image: Option<ImageBlock>,
    pub video: Option<VideoBlock>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AlertPayload {
    /// Presentation duration for this payload
    ///
    /// Longest natural lifetime among the present blocks, floored at
    /// `min_display_ms`. Video length is unknown at this layer, so a
    /// present video block contributes the configured worst-case estimate
    /// (`assumed_video_duration_ms`).
    pub fn display_duration_ms(&self, tuning: &AlertTuning) -> u64 {
        let text = self.text.as_ref().map(|t| t.duration_ms).unwrap_or(0);
        let image = self.image.as_ref().map(|i| i.duration_ms).unwrap_or(0);
        let video = if self.video.is_some() {
            tuning.assumed_video_duration_ms
        } else {
            0
        };
        tuning
            .min_display_ms
            .max(text)
            .max(image)
            .max(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_payload() -> AlertPayload {
        AlertPayload {
            event_type: "follow".to_string(),
            channel_id: "chan-1".to_string(),
            delivery_channel: DEFAULT_DELIVERY_CHANNEL.to_string(),
            formatted: FormattedEvent::default(),
            text: None,
            sound: None,
            image: None,
            video: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_duration_longest_block_wins() {
        let mut payload = bare_payload();
        payload.text = Some(TextBlock {
            rendered: "hello".to_string(),
            duration_ms: 3000,
            position: None,
        });
        payload.image = Some(ImageBlock {
            file_path: "a.png".to_string(),
            duration_ms: 7000,
            width: None,
            height: None,
        });

        assert_eq!(payload.display_duration_ms(&AlertTuning::default()), 7000);
    }

    #[test]
    fn test_duration_video_uses_assumed_estimate() {
        let mut payload = bare_payload();
        payload.video = Some(VideoBlock {
            file_path: "clip.mp4".to_string(),
            width: None,
            height: None,
        });

        assert_eq!(payload.display_duration_ms(&AlertTuning::default()), 10_000);
    }

    #[test]
    fn test_duration_floors_at_minimum() {
        let payload = bare_payload();
        assert_eq!(payload.display_duration_ms(&AlertTuning::default()), 1000);

        // A short text block still floors at the minimum
        let mut short = bare_payload();
        short.text = Some(TextBlock {
            rendered: "hi".to_string(),
            duration_ms: 250,
            position: None,
        });
        assert_eq!(short.display_duration_ms(&AlertTuning::default()), 1000);
    }

    #[test]
    fn test_delivery_channel_resolution() {
        let mut config = EventActionConfig {
            channel_id: "chan-1".to_string(),
            event_type: "follow".to_string(),
            is_enabled: true,
            text_enabled: true,
            text_template: Some("{name} followed".to_string()),
            text_duration_ms: Some(5000),
            text_position: None,
            sound_enabled: false,
            sound_file_path: None,
            sound_volume: None,
            image_enabled: false,
            image_file_path: None,
            image_duration_ms: None,
            image_width: None,
            image_height: None,
            video_enabled: false,
            video_file_path: None,
            video_width: None,
            video_height: None,
            browser_source_channel: None,
        };

        assert_eq!(config.delivery_channel(), "default");

        config.browser_source_channel = Some("".to_string());
        assert_eq!(config.delivery_channel(), "default");

        config.browser_source_channel = Some("secondary".to_string());
        assert_eq!(config.delivery_channel(), "secondary");
    }

    #[test]
    fn test_any_type_enabled() {
        let mut config = EventActionConfig {
            channel_id: "chan-1".to_string(),
            event_type: "follow".to_string(),
            is_enabled: true,
            text_enabled: false,
            text_template: None,
            text_duration_ms: None,
            text_position: None,
            sound_enabled: false,
            sound_file_path: None,
            sound_volume: None,
            image_enabled: false,
            image_file_path: None,
            image_duration_ms: None,
            image_width: None,
            image_height: None,
            video_enabled: false,
            video_file_path: None,
            video_width: None,
            video_height: None,
            browser_source_channel: None,
        };

        assert!(!config.any_type_enabled());

        config.sound_enabled = true;
        assert!(config.any_type_enabled());
    }

    #[test]
    fn test_payload_serialization_round_trip() {
        let mut payload = bare_payload();
        payload.text = Some(TextBlock {
            rendered: "somebody followed".to_string(),
            duration_ms: 5000,
            position: Some("top".to_string()),
        });

        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("\"event_type\":\"follow\""));
        assert!(json.contains("\"delivery_channel\":\"default\""));

        let back: AlertPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.text.unwrap().duration_ms, 5000);
        assert!(back.sound.is_none());
    }
}
