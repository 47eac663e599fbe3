//! Session summaries and the sink that receives them when a game ends.
//!
//! Views never reach into global state to report results. The app root
//! provides a [`SessionSink`] through Dioxus context; views build a
//! [`GameSession`] from the engine's stats and hand it over.

use std::{cell::RefCell, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use super::platform::platform_string;
use super::storage::{StorageError, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    DualNBack,
    Stroop,
    SpeedMatch,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::DualNBack, GameKind::Stroop, GameKind::SpeedMatch];

    pub fn id(self) -> &'static str {
        match self {
            Self::DualNBack => "dual_n_back",
            Self::Stroop => "stroop",
            Self::SpeedMatch => "speed_match",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DualNBack => "Dual N-Back",
            Self::Stroop => "Stroop",
            Self::SpeedMatch => "Speed Match",
        }
    }
}

/// Summary of one finished run. `metrics` holds the game-specific metrics struct as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSession {
    pub id: String,
    pub game: GameKind,
    pub score: i32,
    pub metrics: serde_json::Value,
    pub created_at: String,
    pub platform: String,
}

impl GameSession {
    pub fn new<M: Serialize + ?Sized>(
        game: GameKind,
        score: i32,
        metrics: &M,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            game,
            score,
            metrics: serde_json::to_value(metrics)?,
            created_at: now_rfc3339(),
            platform: platform_string(),
        })
    }

    pub fn metrics_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.metrics.clone()).ok()
    }

    pub fn created_at_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.created_at, &Rfc3339).ok()
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Receiver of finished sessions.
pub trait AnalyticsSink {
    fn record(&mut self, session: &GameSession) -> Result<(), StorageError>;
}

/// Persists sessions through the local [`Store`].
#[derive(Debug, Clone)]
pub struct LocalSessionSink {
    store: Store,
}

impl LocalSessionSink {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl AnalyticsSink for LocalSessionSink {
    fn record(&mut self, session: &GameSession) -> Result<(), StorageError> {
        self.store.append_session(session)
    }
}

/// In-memory sink; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    sessions: Rc<RefCell<Vec<GameSession>>>,
}

impl MemorySink {
    pub fn sessions(&self) -> Vec<GameSession> {
        self.sessions.borrow().clone()
    }
}

impl AnalyticsSink for MemorySink {
    fn record(&mut self, session: &GameSession) -> Result<(), StorageError> {
        self.sessions.borrow_mut().push(session.clone());
        Ok(())
    }
}

/// Cloneable handle provided to views through context.
#[derive(Clone)]
pub struct SessionSink(Rc<RefCell<dyn AnalyticsSink>>);

impl SessionSink {
    pub fn new<S: AnalyticsSink + 'static>(sink: S) -> Self {
        Self(Rc::new(RefCell::new(sink)))
    }

    /// Local persistent sink, or an in-memory one when storage is unavailable.
    pub fn local() -> Self {
        match Store::local() {
            Ok(store) => Self::new(LocalSessionSink::new(store)),
            Err(err) => {
                warn!("session storage unavailable, keeping results in memory: {err}");
                Self::new(MemorySink::default())
            }
        }
    }

    pub fn record(&self, session: &GameSession) -> Result<(), StorageError> {
        self.0.borrow_mut().record(session)
    }
}

impl PartialEq for SessionSink {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::test_support::temp_store;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Snippet {
        accuracy: u32,
    }

    #[test]
    fn session_carries_metrics_and_timestamp() {
        let session = GameSession::new(GameKind::Stroop, 412, &json!({ "accuracy": 85 })).unwrap();
        assert_eq!(session.game, GameKind::Stroop);
        assert_eq!(session.metrics_as::<Snippet>(), Some(Snippet { accuracy: 85 }));
        assert!(session.created_at_time().is_some());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn memory_sink_shares_buffer_across_clones() {
        let memory = MemorySink::default();
        let sink = SessionSink::new(memory.clone());
        let session = GameSession::new(GameKind::SpeedMatch, 50, &json!({})).unwrap();

        sink.record(&session).unwrap();
        sink.clone().record(&session).unwrap();

        assert_eq!(memory.sessions().len(), 2);
        assert_eq!(memory.sessions()[0].score, 50);
    }

    #[test]
    fn local_sink_writes_to_store() {
        let store = temp_store();
        let sink = SessionSink::new(LocalSessionSink::new(store.clone()));
        let session = GameSession::new(GameKind::DualNBack, 25, &json!({ "level": 2 })).unwrap();

        sink.record(&session).unwrap();

        assert_eq!(store.load_sessions().unwrap(), vec![session]);
    }

    #[test]
    fn game_ids_are_stable() {
        let ids: Vec<_> = GameKind::ALL.iter().map(|kind| kind.id()).collect();
        assert_eq!(ids, ["dual_n_back", "stroop", "speed_match"]);
        let encoded = serde_json::to_string(&GameKind::SpeedMatch).unwrap();
        assert_eq!(encoded, "\"speed_match\"");
    }
}
