use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use productmap_app::domain::MapEvent;
use productmap_app::AppContext;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// GET /events
///
/// Starts with the current session state, then relays every `MapEvent`.
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = ctx.events.subscribe();
    let initial = MapEvent::SessionStateChanged {
        state: ctx.placement.state().await,
    };
    tracing::debug!(subscribers = ctx.events.subscriber_count(), "SSE client connected");

    let stream = async_stream::stream! {
        if let Some(event) = to_sse(&initial) {
            yield Ok(event);
        }

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(event) = to_sse(&event) {
                        yield Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE client lagged behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("keep-alive"))
}

fn to_sse(event: &MapEvent) -> Option<Event> {
    match Event::default().event(event.event_type()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
