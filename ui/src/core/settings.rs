//! Per-game configuration, persisted next to the session log.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::{StorageError, Store, SETTINGS_KEY};
use crate::tasks::lifecycle::{GameError, RepeatPolicy};
use crate::tasks::nback::NBackConfig;
use crate::tasks::speed_match::SpeedMatchConfig;
use crate::tasks::stroop::StroopConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub nback: NBackConfig,
    pub stroop: StroopConfig,
    pub speed_match: SpeedMatchConfig,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), GameError> {
        self.nback.validate()?;
        self.stroop.validate()?;
        self.speed_match.validate()
    }

    /// Apply one repeat policy to every game.
    pub fn with_repeat_policy(mut self, policy: RepeatPolicy) -> Self {
        self.nback.repeat_policy = policy;
        self.stroop.repeat_policy = policy;
        self.speed_match.repeat_policy = policy;
        self
    }

    /// Stored settings, or defaults when missing, unreadable or invalid.
    pub fn load(store: &Store) -> Self {
        match store.load::<GameSettings>(SETTINGS_KEY) {
            Ok(Some(settings)) => match settings.validate() {
                Ok(()) => settings,
                Err(err) => {
                    warn!("ignoring stored settings: {err}");
                    Self::default()
                }
            },
            Ok(None) => {
                debug!("no stored settings, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!("failed to read settings, using defaults: {err}");
                Self::default()
            }
        }
    }

    pub fn load_or_default() -> Self {
        match Store::local() {
            Ok(store) => Self::load(&store),
            Err(err) => {
                warn!("settings storage unavailable: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &Store) -> Result<(), StorageError> {
        store.save(SETTINGS_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::test_support::temp_store;

    #[test]
    fn defaults_match_game_rules() {
        let settings = GameSettings::default();
        assert_eq!(settings.nback.n, 2);
        assert_eq!(settings.nback.total_rounds, 20);
        assert_eq!(settings.stroop.total_rounds, 20);
        assert_eq!(settings.speed_match.duration_secs, 60);
        assert_eq!(settings.nback.repeat_policy, RepeatPolicy::Reject);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let settings: GameSettings =
            serde_json::from_str(r#"{ "nback": { "n": 3 }, "stroop": { "repeat_policy": "rescore" } }"#)
                .unwrap();
        assert_eq!(settings.nback.n, 3);
        assert_eq!(settings.nback.total_rounds, 20);
        assert_eq!(settings.stroop.repeat_policy, RepeatPolicy::Rescore);
        assert_eq!(settings.speed_match.duration_secs, 60);
    }

    #[test]
    fn round_trips_through_store() {
        let store = temp_store();
        assert_eq!(GameSettings::load(&store), GameSettings::default());

        let mut settings = GameSettings::default().with_repeat_policy(RepeatPolicy::Rescore);
        settings.nback.n = 4;
        settings.save(&store).unwrap();

        assert_eq!(GameSettings::load(&store), settings);
    }

    #[test]
    fn invalid_stored_settings_fall_back() {
        let store = temp_store();
        store
            .write_raw(SETTINGS_KEY, r#"{ "nback": { "n": 0 } }"#)
            .unwrap();
        assert_eq!(GameSettings::load(&store), GameSettings::default());

        store.write_raw(SETTINGS_KEY, "[1, 2").unwrap();
        assert_eq!(GameSettings::load(&store), GameSettings::default());
    }
}
