mod detail;
pub use detail::ResultsDetailPanel;

mod list;
pub use list::ResultsList;

mod utils;
pub(crate) use utils::*;

use crate::core::analytics::{GameKind, GameSession};
use crate::core::storage::{self, StorageError, Store};

/// Stored sessions for the results page, newest first, or the load error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsState {
    pub sessions: Vec<GameSession>,
    pub error: Option<String>,
}

impl ResultsState {
    pub fn load() -> Self {
        Self::from_result(storage::load_sessions())
    }

    pub fn from_store(store: &Store) -> Self {
        Self::from_result(store.load_sessions())
    }

    fn from_result(result: Result<Vec<GameSession>, StorageError>) -> Self {
        match result {
            Ok(mut sessions) => {
                sessions.sort_by(|a, b| {
                    b.created_at_time()
                        .cmp(&a.created_at_time())
                        .then_with(|| b.created_at.cmp(&a.created_at))
                });
                Self {
                    sessions,
                    error: None,
                }
            }
            Err(err) => Self {
                sessions: Vec::new(),
                error: Some(format!("Couldn't load sessions: {err}")),
            },
        }
    }

    pub fn find(&self, id: &str) -> Option<&GameSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn best_score(&self, game: GameKind) -> Option<i32> {
        self.sessions
            .iter()
            .filter(|session| session.game == game)
            .map(|session| session.score)
            .max()
    }

    pub fn count(&self, game: GameKind) -> usize {
        self.sessions.iter().filter(|session| session.game == game).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::test_support::temp_store;
    use serde_json::json;

    fn session(game: GameKind, score: i32, created_at: &str) -> GameSession {
        let mut session = GameSession::new(game, score, &json!({})).unwrap();
        session.created_at = created_at.to_string();
        session
    }

    #[test]
    fn sessions_are_listed_newest_first() {
        let store = temp_store();
        store
            .append_session(&session(GameKind::Stroop, 300, "2025-03-01T09:00:00Z"))
            .unwrap();
        store
            .append_session(&session(GameKind::DualNBack, 40, "2025-03-02T09:00:00Z"))
            .unwrap();
        store
            .append_session(&session(GameKind::Stroop, 520, "2025-02-27T18:30:00Z"))
            .unwrap();

        let state = ResultsState::from_store(&store);
        assert!(state.error.is_none());
        let games: Vec<GameKind> = state.sessions.iter().map(|s| s.game).collect();
        assert_eq!(
            games,
            vec![GameKind::DualNBack, GameKind::Stroop, GameKind::Stroop]
        );
        assert_eq!(state.best_score(GameKind::Stroop), Some(520));
        assert_eq!(state.best_score(GameKind::SpeedMatch), None);
        assert_eq!(state.count(GameKind::Stroop), 2);
    }

    #[test]
    fn load_errors_are_reported() {
        let state = ResultsState::from_result(Err(StorageError::Unavailable("offline".into())));
        assert!(state.sessions.is_empty());
        assert!(state.error.unwrap().contains("offline"));
    }
}
