//! Lifecycle shared by every game engine: `Idle → Playing → Ended`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    #[default]
    Idle,
    Playing,
    Ended,
}

impl GameState {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// How an engine treats a second answer to the same stimulus within one round.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// Reject repeated answers with [`GameError::AlreadyAnswered`].
    #[default]
    Reject,
    /// Score every repeated answer again (legacy web behaviour).
    Rescore,
}

impl RepeatPolicy {
    pub fn allows_repeats(self) -> bool {
        matches!(self, Self::Rescore)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game has not been started")]
    NotStarted,

    #[error("game is not in progress")]
    NotPlaying,

    #[error("this stimulus was already answered")]
    AlreadyAnswered,

    #[error("this round was already evaluated")]
    AlreadyEvaluated,

    #[error("no stimulus is currently shown")]
    NoActiveStimulus,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Guard for `submit_*`/`evaluate_*` calls.
pub(crate) fn ensure_playing(state: GameState) -> Result<(), GameError> {
    if state.is_playing() {
        Ok(())
    } else {
        Err(GameError::NotPlaying)
    }
}

/// Guard for `next_*` calls. `Ok(false)` means the game has already ended.
pub(crate) fn ensure_started(state: GameState) -> Result<bool, GameError> {
    match state {
        GameState::Idle => Err(GameError::NotStarted),
        GameState::Playing => Ok(true),
        GameState::Ended => Ok(false),
    }
}

/// Rounded percentage with a zero denominator mapping to `0`.
pub(crate) fn percent(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        0
    } else {
        (numerator as f64 / denominator as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_follow_state() {
        assert_eq!(ensure_playing(GameState::Idle), Err(GameError::NotPlaying));
        assert_eq!(ensure_playing(GameState::Playing), Ok(()));
        assert_eq!(ensure_started(GameState::Idle), Err(GameError::NotStarted));
        assert_eq!(ensure_started(GameState::Ended), Ok(false));
    }

    #[test]
    fn percent_handles_zero_denominator() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
    }
}
