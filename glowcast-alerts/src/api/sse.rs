//! Server-Sent Events (SSE) stream for overlay renderers
//!
//! Streams alert and speech events to connected overlay pages. The
//! stream owns a connection guard so the transport's renderer count
//! stays accurate when a browser source disconnects.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// GET /overlay/events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New overlay renderer connected");

    let (mut rx, guard) = ctx.transport.subscribe();

    let stream = async_stream::stream! {
        // Moved into the stream so disconnect drops it
        let _guard = guard;

        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        yield Ok(Event::default().event(event.event_type()).data(json));
                    }
                    Err(e) => {
                        warn!("Failed to serialize overlay event: {}", e);
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    // Slow renderer; resume from the current position
                    warn!(skipped, "overlay renderer lagged behind event stream");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
