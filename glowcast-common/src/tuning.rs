//! Timing parameters for the dispatch queues
//!
//! These started life as hard-coded constants; they are configuration
//! knobs here, with the original defaults preserved. Tests shorten them
//! to keep async tests fast.

use serde::{Deserialize, Serialize};

/// Queue timing knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertTuning {
    /// Floor for alert display duration
    pub min_display_ms: u64,

    /// Worst-case estimate used when a payload carries video; true video
    /// length is unknown to the dispatch layer
    pub assumed_video_duration_ms: u64,

    /// How long the speech queue waits for the renderer's completion
    /// signal before advancing anyway
    pub speech_timeout_ms: u64,

    /// Gap between consecutive speech items to avoid overlapping renders
    pub speech_gap_ms: u64,

    /// Maximum pending speech items; oldest pending is evicted on overflow
    pub speech_max_pending: usize,
}

impl Default for AlertTuning {
    fn default() -> Self {
        Self {
            min_display_ms: 1000,
            assumed_video_duration_ms: 10_000,
            speech_timeout_ms: 30_000,
            speech_gap_ms: 100,
            speech_max_pending: 10,
        }
    }
}
