//! HTTP request handlers
//!
//! Operator control endpoints plus the overlay's completion callback.
//! Operator-initiated calls are the only place pipeline failures surface
//! as human-readable messages; everything else degrades silently.

use crate::api::server::AppContext;
use crate::builder::PlatformEvent;
use crate::overlay::TransportStats;
use axum::{extract::State, http::StatusCode, Json};
use glowcast_common::events::OverlayEvent;
use glowcast_common::speech::{SpeechItem, SpeechPayload};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct TestAlertResponse {
    queued: bool,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct AlertQueueStatusResponse {
    length: usize,
    draining: bool,
}

#[derive(Debug, Serialize)]
pub struct EnqueueSpeechResponse {
    status: String,
    item_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SpeechEnabledRequest {
    enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SpeechQueueStatusResponse {
    length: usize,
    enabled: bool,
    active_item_id: Option<Uuid>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "alert_dispatcher".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Alert Queue Endpoints
// ============================================================================

/// POST /alerts/test - Build and enqueue an alert for a supplied event
///
/// The operator-facing probe for alert configuration; returns a
/// human-readable message rather than a raw error.
pub async fn send_test_alert(
    State(ctx): State<AppContext>,
    Json(event): Json<PlatformEvent>,
) -> Result<Json<TestAlertResponse>, (StatusCode, Json<StatusResponse>)> {
    let config = match ctx
        .repo
        .get_by_event_type(&event.channel_id, &event.event_type)
        .await
    {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "event action lookup failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            ));
        }
    };

    match ctx.builder.build(&event, config.as_ref()) {
        Some(payload) => {
            info!(event_type = %event.event_type, "test alert queued");
            ctx.alert_queue.enqueue(payload);
            Ok(Json(TestAlertResponse {
                queued: true,
                message: format!("Alert for '{}' queued", event.event_type),
            }))
        }
        None => Ok(Json(TestAlertResponse {
            queued: false,
            message: format!(
                "No alert produced for '{}': configuration missing, disabled, or empty",
                event.event_type
            ),
        })),
    }
}

/// POST /alerts/clear - Emergency stop for the alert queue
pub async fn clear_alerts(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.alert_queue.clear();

    // Tell the UI and every renderer to drop the current render
    let cleared = OverlayEvent::QueueCleared {
        timestamp: chrono::Utc::now(),
    };
    ctx.ui_bus.emit_lossy(cleared.clone());
    ctx.transport.broadcast(cleared);

    Json(StatusResponse {
        status: "cleared".to_string(),
    })
}

/// GET /alerts/queue - Alert queue observability
pub async fn alert_queue_status(State(ctx): State<AppContext>) -> Json<AlertQueueStatusResponse> {
    Json(AlertQueueStatusResponse {
        length: ctx.alert_queue.len(),
        draining: ctx.alert_queue.is_draining(),
    })
}

// ============================================================================
// Speech Queue Endpoints
// ============================================================================

/// POST /speech - Enqueue a speech item
pub async fn enqueue_speech(
    State(ctx): State<AppContext>,
    Json(payload): Json<SpeechPayload>,
) -> Json<EnqueueSpeechResponse> {
    let item = SpeechItem {
        id: Uuid::new_v4(),
        timestamp: chrono::Utc::now(),
        payload,
    };
    let item_id = item.id;
    ctx.speech_queue.enqueue(item);

    Json(EnqueueSpeechResponse {
        status: "accepted".to_string(),
        item_id,
    })
}

/// POST /speech/enabled - Enable or disable the speech queue
pub async fn set_speech_enabled(
    State(ctx): State<AppContext>,
    Json(request): Json<SpeechEnabledRequest>,
) -> Json<StatusResponse> {
    ctx.speech_queue.set_enabled(request.enabled);
    Json(StatusResponse {
        status: if request.enabled { "enabled" } else { "disabled" }.to_string(),
    })
}

/// GET /speech/queue - Speech queue observability
pub async fn speech_queue_status(State(ctx): State<AppContext>) -> Json<SpeechQueueStatusResponse> {
    Json(SpeechQueueStatusResponse {
        length: ctx.speech_queue.len(),
        enabled: ctx.speech_queue.is_enabled(),
        active_item_id: ctx.speech_queue.active_item().map(|i| i.id),
    })
}

// ============================================================================
// Overlay Endpoints
// ============================================================================

/// POST /overlay/speech/complete - Renderer playback-finished callback
///
/// Late or duplicate callbacks are harmless no-ops.
pub async fn speech_complete(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.speech_queue.notify_completion();
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// GET /overlay/stats - Transport observability
pub async fn overlay_stats(State(ctx): State<AppContext>) -> Json<TransportStats> {
    Json(ctx.transport.stats())
}
