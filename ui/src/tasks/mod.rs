//! Cognitive game engines, their metrics and their views.

use std::{cell::RefCell, rc::Rc};

use futures_channel::mpsc::UnboundedSender;
use serde::Serialize;
use tracing::info;

use crate::core::analytics::{GameKind, GameSession, SessionSink};
use crate::core::{platform, timing};

pub mod lifecycle;
pub mod nback;
pub mod speed_match;
pub mod stroop;

pub use lifecycle::{GameError, GameState, RepeatPolicy};

/// Sender into a view's event coroutine, filled in once the coroutine exists.
pub(crate) type EventSlot<E> = Rc<RefCell<Option<UnboundedSender<E>>>>;

pub(crate) fn event_slot<E>() -> EventSlot<E> {
    Rc::new(RefCell::new(None))
}

/// Deliver `event` to the view's coroutine after `delay_ms`.
pub(crate) fn schedule_event<E: 'static>(slot: &EventSlot<E>, delay_ms: u64, event: E) {
    if let Some(sender) = slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            timing::sleep_ms(delay_ms).await;
            let _ = sender.unbounded_send(event);
        });
    }
}

/// Build the session summary for a finished run and hand it to the sink.
pub(crate) fn report_session<M: Serialize>(
    sink: &SessionSink,
    game: GameKind,
    score: i32,
    metrics: &M,
) -> Result<(), String> {
    let session = GameSession::new(game, score, metrics)
        .map_err(|err| format!("Failed to serialise metrics: {err}"))?;
    sink.record(&session)
        .map_err(|err| format!("Failed to save session: {err}"))?;
    info!(game = game.id(), score, "session recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::MemorySink;
    use crate::tasks::speed_match::{SpeedMatchConfig, SpeedMatchEngine};

    #[test]
    fn report_session_forwards_engine_metrics() {
        let memory = MemorySink::default();
        let sink = SessionSink::new(memory.clone());

        let mut engine = SpeedMatchEngine::seeded(SpeedMatchConfig::default(), 3).unwrap();
        engine.start_game();
        engine.submit_answer(true).unwrap();
        engine.end_game();
        let metrics = engine.metrics();

        report_session(&sink, GameKind::SpeedMatch, metrics.score, &metrics).unwrap();

        let sessions = memory.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].game, GameKind::SpeedMatch);
        assert_eq!(sessions[0].score, engine.score());
        let stored: crate::tasks::speed_match::SpeedMatchMetrics =
            sessions[0].metrics_as().unwrap();
        assert_eq!(stored, metrics);
    }
}
