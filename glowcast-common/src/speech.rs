//! Speech item types
//!
//! A [`SpeechItem`] describes one queued speech request. The payload is a
//! tagged enum: either pre-rendered audio bytes or text plus voice
//! parameters for client-side synthesis in the overlay renderer. The enum
//! guarantees exactly one of the two shapes is populated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider-dependent speech payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SpeechPayload {
    /// Pre-rendered audio, played back verbatim by the renderer
    Audio {
        /// Encoded audio bytes (base64 over the wire)
        #[serde(with = "audio_data")]
        data: Vec<u8>,
        /// Container/codec hint, e.g. "mp3" or "ogg"
        format: String,
    },

    /// Client-side synthesis via the renderer's speech engine
    Synthesis {
        text: String,
        voice: String,
        /// Speaking rate multiplier (1.0 = normal)
        rate: f32,
        /// Pitch multiplier (1.0 = normal)
        pitch: f32,
        /// 0.0-1.0
        volume: f32,
    },
}

/// Immutable description of one queued speech request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechItem {
    /// Unique per item; used for correlation in logs and stats
    pub id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub payload: SpeechPayload,
}

impl SpeechItem {
    /// New pre-rendered audio item
    pub fn audio(data: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            payload: SpeechPayload::Audio {
                data,
                format: format.into(),
            },
        }
    }

    /// New client-synthesized item
    pub fn synthesis(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            payload: SpeechPayload::Synthesis {
                text: text.into(),
                voice: voice.into(),
                rate: 1.0,
                pitch: 1.0,
                volume: 1.0,
            },
        }
    }
}

/// Base64 (de)serialization for audio bytes
///
/// JSON is the overlay wire format; raw byte arrays would serialize as
/// integer lists, so audio data travels base64-encoded.
mod audio_data {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(s)
            .map_err(serde::de::Error::custom)
    }
}
