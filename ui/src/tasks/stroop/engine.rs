//! Stroop colour-word engine.
//!
//! A colour name is printed in some ink colour; the player must name the ink,
//! not the word. Correct answers earn `50` base points plus up to `50` bonus
//! points that shrink linearly over the first second; wrong answers cost `20`.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::StroopMetrics;
use crate::core::timing::InstantStamp;
use crate::tasks::lifecycle::{
    ensure_playing, ensure_started, percent, GameError, GameState, RepeatPolicy,
};

pub const CONGRUENT_PROBABILITY: f64 = 0.5;
pub const BASE_POINTS: f64 = 50.0;
/// Reaction times at or above this earn no speed bonus.
pub const BONUS_WINDOW_MS: f64 = 1000.0;
pub const BONUS_DIVISOR: f64 = 20.0;
pub const WRONG_ANSWER_POINTS: i32 = -20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl InkColor {
    pub const PALETTE: [InkColor; 4] = [InkColor::Red, InkColor::Blue, InkColor::Green, InkColor::Yellow];

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
        }
    }

    /// CSS colour used to paint the ink.
    pub fn css(self) -> &'static str {
        match self {
            Self::Red => "#e5484d",
            Self::Blue => "#3e63dd",
            Self::Green => "#30a46c",
            Self::Yellow => "#f5d90a",
        }
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StroopTrial {
    pub text: InkColor,
    pub color: InkColor,
    pub is_congruent: bool,
}

impl StroopTrial {
    pub fn new(text: InkColor, color: InkColor) -> Self {
        Self {
            text,
            color,
            is_congruent: text == color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StroopResponse {
    pub round: usize,
    pub reaction_time_ms: f64,
    pub correct: bool,
    pub stimulus: StroopTrial,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StroopAnswer {
    pub is_correct: bool,
    pub points: i32,
    pub reaction_time_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StroopStats {
    pub score: i32,
    pub round: usize,
    pub total: usize,
    pub accuracy: u32,
    pub avg_rt_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub total_rounds: usize,
    pub repeat_policy: RepeatPolicy,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            total_rounds: 20,
            repeat_policy: RepeatPolicy::default(),
        }
    }
}

impl StroopConfig {
    pub fn new(total_rounds: usize) -> Result<Self, GameError> {
        let config = Self {
            total_rounds,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_repeat_policy(mut self, repeat_policy: RepeatPolicy) -> Self {
        self.repeat_policy = repeat_policy;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.total_rounds == 0 {
            return Err(GameError::InvalidConfig("stroop needs at least one round".into()));
        }
        Ok(())
    }
}

/// Points for one answer. Negative reaction times (clock skew) count as zero.
pub fn answer_points(is_correct: bool, reaction_time_ms: f64) -> i32 {
    if !is_correct {
        return WRONG_ANSWER_POINTS;
    }
    let rt = reaction_time_ms.max(0.0);
    let bonus = (BONUS_WINDOW_MS - rt).max(0.0) / BONUS_DIVISOR;
    (BASE_POINTS + bonus).round() as i32
}

pub trait StroopSequencer {
    fn next_trial(&mut self) -> StroopTrial;
}

#[derive(Debug, Clone)]
pub struct RandomStroopSequencer<R> {
    rng: R,
}

impl<R: Rng> RandomStroopSequencer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self) -> InkColor {
        InkColor::PALETTE[self.rng.gen_range(0..InkColor::PALETTE.len())]
    }
}

impl RandomStroopSequencer<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StroopSequencer for RandomStroopSequencer<R> {
    fn next_trial(&mut self) -> StroopTrial {
        let text = self.pick();
        if self.rng.gen_bool(CONGRUENT_PROBABILITY) {
            return StroopTrial::new(text, text);
        }
        let mut color = self.pick();
        while color == text {
            color = self.pick();
        }
        StroopTrial::new(text, color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTrial {
    trial: StroopTrial,
    shown_at: InstantStamp,
    answered: bool,
}

#[derive(Debug, Clone)]
pub struct StroopEngine<S = RandomStroopSequencer<StdRng>> {
    config: StroopConfig,
    sequencer: S,
    state: GameState,
    score: i32,
    current_round: usize,
    current: Option<ActiveTrial>,
    history: Vec<StroopResponse>,
}

impl StroopEngine {
    pub fn new(config: StroopConfig) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomStroopSequencer::from_entropy())
    }

    pub fn seeded(config: StroopConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomStroopSequencer::seeded(seed))
    }
}

impl Default for StroopEngine {
    fn default() -> Self {
        Self::assemble(StroopConfig::default(), RandomStroopSequencer::from_entropy())
    }
}

impl<S: StroopSequencer> StroopEngine<S> {
    pub fn with_sequencer(config: StroopConfig, sequencer: S) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::assemble(config, sequencer))
    }

    fn assemble(config: StroopConfig, sequencer: S) -> Self {
        Self {
            config,
            sequencer,
            state: GameState::Idle,
            score: 0,
            current_round: 0,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn history(&self) -> &[StroopResponse] {
        &self.history
    }

    pub fn current(&self) -> Option<StroopTrial> {
        self.current.map(|active| active.trial)
    }

    /// Whether the trial on screen still awaits its first answer.
    pub fn awaiting_answer(&self) -> bool {
        self.state.is_playing() && self.current.is_some_and(|active| !active.answered)
    }

    pub fn start_game(&mut self, now: InstantStamp) -> Option<StroopTrial> {
        self.reset_run();
        self.state = GameState::Playing;
        debug!(total = self.config.total_rounds, "stroop started");
        self.advance(now)
    }

    /// Show the next trial, stamping its presentation time with `now`.
    pub fn next_round(&mut self, now: InstantStamp) -> Result<Option<StroopTrial>, GameError> {
        if !ensure_started(self.state)? {
            return Ok(None);
        }
        Ok(self.advance(now))
    }

    pub fn abort(&mut self) {
        self.reset_run();
        self.state = GameState::Idle;
        debug!("stroop aborted");
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.current_round = 0;
        self.current = None;
        self.history.clear();
    }

    fn advance(&mut self, now: InstantStamp) -> Option<StroopTrial> {
        if self.current_round >= self.config.total_rounds {
            self.state = GameState::Ended;
            self.current = None;
            debug!(score = self.score, "stroop ended");
            return None;
        }

        let trial = self.sequencer.next_trial();
        self.current = Some(ActiveTrial {
            trial,
            shown_at: now,
            answered: false,
        });
        self.current_round += 1;
        Some(trial)
    }

    pub fn submit_answer(
        &mut self,
        selected: InkColor,
        at: InstantStamp,
    ) -> Result<StroopAnswer, GameError> {
        ensure_playing(self.state)?;
        let repeats_allowed = self.config.repeat_policy.allows_repeats();
        let active = self.current.as_mut().ok_or(GameError::NoActiveStimulus)?;
        if active.answered && !repeats_allowed {
            return Err(GameError::AlreadyAnswered);
        }
        active.answered = true;

        let stimulus = active.trial;
        let reaction_time_ms = at.millis_since(active.shown_at).max(0.0);
        let is_correct = selected == stimulus.color;
        let points = answer_points(is_correct, reaction_time_ms);

        self.history.push(StroopResponse {
            round: self.current_round,
            reaction_time_ms,
            correct: is_correct,
            stimulus,
        });
        self.score += points;

        Ok(StroopAnswer {
            is_correct,
            points,
            reaction_time_ms,
        })
    }

    pub fn stats(&self) -> StroopStats {
        let correct = self.history.iter().filter(|response| response.correct).count();
        let avg_rt_ms = if self.history.is_empty() {
            0
        } else {
            let total: f64 = self.history.iter().map(|r| r.reaction_time_ms).sum();
            (total / self.history.len() as f64).round() as u32
        };

        StroopStats {
            score: self.score,
            round: self.current_round,
            total: self.config.total_rounds,
            accuracy: percent(correct as u32, self.current_round as u32),
            avg_rt_ms,
        }
    }

    pub fn metrics(&self) -> StroopMetrics {
        StroopMetrics::from_responses(self.stats(), &self.history)
    }
}
