//! Alert builder
//!
//! Turns a raw platform event plus its per-event-type configuration into
//! an immutable [`AlertPayload`], or nothing at all. "Nothing" is the
//! normal outcome for disabled or empty configurations and for malformed
//! events; the builder never raises toward event ingestion.

use crate::error::Result;
use crate::media::{self, MediaKind};
use glowcast_common::alert::{
    AlertPayload, EventActionConfig, FormattedEvent, ImageBlock, SoundBlock, TextBlock, VideoBlock,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Raw event as received from the streaming platform
///
/// The `data` map is platform-specific and opaque to the pipeline; the
/// template formatter extracts whatever variables it understands from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub event_type: String,
    pub channel_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Template formatting collaborator
///
/// Turns raw platform payloads and operator-authored templates into
/// renderable text.
pub trait TemplateFormatter: Send + Sync {
    /// Format a raw event into html/plain-text/emoji plus template variables
    fn format_event(&self, event: &PlatformEvent) -> Result<FormattedEvent>;

    /// Substitute `{variable}` references in an operator-authored template
    fn process_template(&self, template: &str, variables: &HashMap<String, String>) -> Result<String>;
}

/// Per-event-type configuration lookup collaborator
#[async_trait::async_trait]
pub trait EventActionRepository: Send + Sync {
    async fn get_by_event_type(
        &self,
        channel_id: &str,
        event_type: &str,
    ) -> Result<Option<EventActionConfig>>;
}

/// Default formatter: flattens top-level event data into `{key}` variables
///
/// Production deployments plug in a platform-aware formatter; this one is
/// enough for test alerts and for platforms whose payloads are flat JSON
/// objects.
pub struct BasicFormatter;

impl TemplateFormatter for BasicFormatter {
    fn format_event(&self, event: &PlatformEvent) -> Result<FormattedEvent> {
        let mut variables = HashMap::new();
        variables.insert("event_type".to_string(), event.event_type.clone());

        if let Some(map) = event.data.as_object() {
            for (key, value) in map {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                variables.insert(key.clone(), rendered);
            }
        }

        let plain_text = variables
            .get("message")
            .cloned()
            .unwrap_or_else(|| event.event_type.clone());

        Ok(FormattedEvent {
            html: html_escape(&plain_text),
            plain_text,
            emoji: variables.get("emoji").cloned().unwrap_or_default(),
            variables,
        })
    }

    fn process_template(&self, template: &str, variables: &HashMap<String, String>) -> Result<String> {
        let mut out = template.to_string();
        for (key, value) in variables {
            out = out.replace(&format!("{{{key}}}"), value);
        }
        Ok(out)
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Builds alert payloads from platform events
pub struct AlertBuilder {
    formatter: Box<dyn TemplateFormatter>,
    /// Relative media paths in configurations resolve against this root
    media_root: PathBuf,
}

impl AlertBuilder {
    pub fn new(formatter: Box<dyn TemplateFormatter>, media_root: PathBuf) -> Self {
        Self {
            formatter,
            media_root,
        }
    }

    /// Build a payload for `event`, or `None` when there is nothing to show
    ///
    /// `None` covers: absent configuration, master switch off, no
    /// presentation group enabled, and formatter failure. A media file
    /// that fails validation drops only its own block; the remaining
    /// groups still ship.
    pub fn build(
        &self,
        event: &PlatformEvent,
        config: Option<&EventActionConfig>,
    ) -> Option<AlertPayload> {
        let config = match config {
            Some(c) if c.is_enabled => c,
            Some(_) => {
                debug!(event_type = %event.event_type, "alert config disabled; skipping");
                return None;
            }
            None => {
                debug!(event_type = %event.event_type, "no alert config; skipping");
                return None;
            }
        };

        // Empty alerts must never reach the queue
        if !config.any_type_enabled() {
            debug!(event_type = %event.event_type, "no presentation type enabled; skipping");
            return None;
        }

        let formatted = match self.formatter.format_event(event) {
            Ok(f) => f,
            Err(e) => {
                warn!(event_type = %event.event_type, error = %e, "event formatting failed; skipping alert");
                return None;
            }
        };

        let payload = AlertPayload {
            event_type: event.event_type.clone(),
            channel_id: event.channel_id.clone(),
            delivery_channel: config.delivery_channel(),
            text: self.build_text(config, &formatted),
            sound: self.build_sound(config),
            image: self.build_image(config),
            video: self.build_video(config),
            formatted,
            timestamp: chrono::Utc::now(),
        };

        Some(payload)
    }

    fn build_text(&self, config: &EventActionConfig, formatted: &FormattedEvent) -> Option<TextBlock> {
        if !config.text_enabled {
            return None;
        }

        let template = config.text_template.as_deref().unwrap_or("{message}");
        let rendered = match self.formatter.process_template(template, &formatted.variables) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "template processing failed; dropping text block");
                return None;
            }
        };

        Some(TextBlock {
            rendered,
            duration_ms: config.text_duration_ms.unwrap_or(0).max(0) as u64,
            position: config.text_position.clone(),
        })
    }

    fn build_sound(&self, config: &EventActionConfig) -> Option<SoundBlock> {
        if !config.sound_enabled {
            return None;
        }
        let file_path = self.validated_path(config.sound_file_path.as_deref(), MediaKind::Sound)?;
        Some(SoundBlock {
            file_path,
            volume: config.sound_volume.unwrap_or(1.0).clamp(0.0, 1.0),
        })
    }

    fn build_image(&self, config: &EventActionConfig) -> Option<ImageBlock> {
        if !config.image_enabled {
            return None;
        }
        let file_path = self.validated_path(config.image_file_path.as_deref(), MediaKind::Image)?;
        Some(ImageBlock {
            file_path,
            duration_ms: config.image_duration_ms.unwrap_or(0).max(0) as u64,
            width: config.image_width.and_then(|w| u32::try_from(w).ok()),
            height: config.image_height.and_then(|h| u32::try_from(h).ok()),
        })
    }

    fn build_video(&self, config: &EventActionConfig) -> Option<VideoBlock> {
        if !config.video_enabled {
            return None;
        }
        let file_path = self.validated_path(config.video_file_path.as_deref(), MediaKind::Video)?;
        Some(VideoBlock {
            file_path,
            width: config.video_width.and_then(|w| u32::try_from(w).ok()),
            height: config.video_height.and_then(|h| u32::try_from(h).ok()),
        })
    }

    /// Resolve and validate a configured media path; `None` drops the block
    fn validated_path(&self, configured: Option<&str>, kind: MediaKind) -> Option<String> {
        let configured = match configured {
            Some(p) if !p.is_empty() => p,
            _ => {
                warn!(%kind, "media enabled but no file configured; dropping block");
                return None;
            }
        };

        let resolved = if Path::new(configured).is_absolute() {
            PathBuf::from(configured)
        } else {
            self.media_root.join(configured)
        };

        if media::validate(&resolved, kind) {
            Some(resolved.to_string_lossy().to_string())
        } else {
            warn!(%kind, path = %resolved.display(), "media file missing or invalid; dropping block");
            None
        }
    }
}
