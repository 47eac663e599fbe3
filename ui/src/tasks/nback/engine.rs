//! Dual N-Back engine: a 3×3 position stream paired with a spoken-letter stream.
//!
//! Each round shows one grid cell and plays one letter. The player reports a
//! match on either channel when the current item equals the one presented
//! `n` rounds earlier. Scoring:
//!
//! - hit: `+10`
//! - false alarm: `-5`
//! - miss (genuine match left unreported when the round is evaluated): `-5`
//!
//! The engine is synchronous. The view owns the round timer and must call
//! [`NBackEngine::evaluate_round`] before [`NBackEngine::next_round`] so that
//! misses are charged.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::NBackMetrics;
use crate::tasks::lifecycle::{ensure_playing, ensure_started, GameError, GameState, RepeatPolicy};

pub const GRID_CELLS: usize = 9;

/// Consonant-heavy alphabet, picked to keep spoken letters easy to tell apart.
pub const LETTERS: [char; 11] = ['C', 'F', 'H', 'K', 'L', 'N', 'P', 'Q', 'R', 'S', 'T'];

/// Chance that a channel is forced to repeat the n-back item.
pub const MATCH_PROBABILITY: f64 = 0.3;
/// Chance of redrawing a candidate that accidentally equals the n-back item.
pub const COLLISION_RESAMPLE_PROBABILITY: f64 = 0.9;
pub const MAX_COLLISION_RESAMPLES: usize = 3;

pub const HIT_POINTS: i32 = 10;
pub const FALSE_ALARM_PENALTY: i32 = 5;
pub const MISS_PENALTY: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchChannel {
    Position,
    Audio,
}

impl MatchChannel {
    pub const ALL: [MatchChannel; 2] = [MatchChannel::Position, MatchChannel::Audio];
}

/// One presented round. `round` is the zero-based index in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub position: usize,
    pub letter: char,
    pub round: usize,
}

impl RoundRecord {
    pub fn matches(&self, other: &RoundRecord, channel: MatchChannel) -> bool {
        match channel {
            MatchChannel::Position => self.position == other.position,
            MatchChannel::Audio => self.letter == other.letter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NBackConfig {
    pub n: usize,
    pub total_rounds: usize,
    pub repeat_policy: RepeatPolicy,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            n: 2,
            total_rounds: 20,
            repeat_policy: RepeatPolicy::default(),
        }
    }
}

impl NBackConfig {
    pub fn new(n: usize, total_rounds: usize) -> Result<Self, GameError> {
        let config = Self {
            n,
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
        if self.n == 0 {
            return Err(GameError::InvalidConfig("n-back level must be at least 1".into()));
        }
        if self.total_rounds == 0 {
            return Err(GameError::InvalidConfig("dual n-back needs at least one round".into()));
        }
        Ok(())
    }
}

/// Source of `(position, letter)` pairs for new rounds.
pub trait NBackSequencer {
    fn next_round(&mut self, history: &[RoundRecord], n: usize) -> (usize, char);
}

/// Default sequencer: forces matches with [`MATCH_PROBABILITY`] per channel and
/// otherwise tries (without guarantee) to avoid accidental n-back repeats.
#[derive(Debug, Clone)]
pub struct RandomNBackSequencer<R> {
    rng: R,
}

impl<R: Rng> RandomNBackSequencer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn draw<T, F>(&mut self, target: Option<T>, mut sample: F) -> T
    where
        T: Copy + PartialEq,
        F: FnMut(&mut R) -> T,
    {
        let Some(target) = target else {
            return sample(&mut self.rng);
        };

        if self.rng.gen_bool(MATCH_PROBABILITY) {
            return target;
        }

        let mut candidate = sample(&mut self.rng);
        let mut resamples = 0;
        while candidate == target
            && resamples < MAX_COLLISION_RESAMPLES
            && self.rng.gen_bool(COLLISION_RESAMPLE_PROBABILITY)
        {
            candidate = sample(&mut self.rng);
            resamples += 1;
        }
        candidate
    }
}

impl RandomNBackSequencer<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NBackSequencer for RandomNBackSequencer<R> {
    fn next_round(&mut self, history: &[RoundRecord], n: usize) -> (usize, char) {
        let target = if n > 0 && history.len() >= n {
            history.get(history.len() - n).copied()
        } else {
            None
        };

        let position = self.draw(target.map(|t| t.position), |rng| {
            rng.gen_range(0..GRID_CELLS)
        });
        let letter = self.draw(target.map(|t| t.letter), |rng| {
            LETTERS[rng.gen_range(0..LETTERS.len())]
        });
        (position, letter)
    }
}

/// Signal-detection counts for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTally {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Hit,
    FalseAlarm,
    /// Not enough history yet to judge the claim; score untouched.
    Ignored,
}

impl SubmitOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }

    pub fn points(self) -> i32 {
        match self {
            Self::Hit => HIT_POINTS,
            Self::FalseAlarm => -FALSE_ALARM_PENALTY,
            Self::Ignored => 0,
        }
    }
}

/// Result of charging misses at the end of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReview {
    pub missed: Vec<MatchChannel>,
    pub penalty: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NBackStats {
    pub score: i32,
    pub round: usize,
    pub total: usize,
    pub level: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RoundInputs {
    position: bool,
    audio: bool,
    evaluated: bool,
}

impl RoundInputs {
    fn answered(&self, channel: MatchChannel) -> bool {
        match channel {
            MatchChannel::Position => self.position,
            MatchChannel::Audio => self.audio,
        }
    }

    fn mark(&mut self, channel: MatchChannel) {
        match channel {
            MatchChannel::Position => self.position = true,
            MatchChannel::Audio => self.audio = true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NBackEngine<S = RandomNBackSequencer<StdRng>> {
    config: NBackConfig,
    sequencer: S,
    state: GameState,
    history: Vec<RoundRecord>,
    score: i32,
    current_round: usize,
    inputs: RoundInputs,
    position_tally: ChannelTally,
    audio_tally: ChannelTally,
}

impl NBackEngine {
    pub fn new(config: NBackConfig) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomNBackSequencer::from_entropy())
    }

    pub fn seeded(config: NBackConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomNBackSequencer::seeded(seed))
    }
}

impl Default for NBackEngine {
    fn default() -> Self {
        Self::assemble(NBackConfig::default(), RandomNBackSequencer::from_entropy())
    }
}

impl<S: NBackSequencer> NBackEngine<S> {
    /// Build an engine over `sequencer`. Fails on an invalid `config`.
    pub fn with_sequencer(config: NBackConfig, sequencer: S) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::assemble(config, sequencer))
    }

    fn assemble(config: NBackConfig, sequencer: S) -> Self {
        Self {
            config,
            sequencer,
            state: GameState::Idle,
            history: Vec::new(),
            score: 0,
            current_round: 0,
            inputs: RoundInputs::default(),
            position_tally: ChannelTally::default(),
            audio_tally: ChannelTally::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn current(&self) -> Option<&RoundRecord> {
        self.history.last()
    }

    pub fn tally(&self, channel: MatchChannel) -> ChannelTally {
        match channel {
            MatchChannel::Position => self.position_tally,
            MatchChannel::Audio => self.audio_tally,
        }
    }

    /// Reset the run and present the first round.
    pub fn start_game(&mut self) -> Option<RoundRecord> {
        self.reset_run();
        self.state = GameState::Playing;
        debug!(
            n = self.config.n,
            total = self.config.total_rounds,
            "dual n-back started"
        );
        self.advance()
    }

    /// Present the next round, or `None` once the round budget is spent.
    pub fn next_round(&mut self) -> Result<Option<RoundRecord>, GameError> {
        if !ensure_started(self.state)? {
            return Ok(None);
        }
        Ok(self.advance())
    }

    /// Discard the run and return to `Idle`.
    pub fn abort(&mut self) {
        self.reset_run();
        self.state = GameState::Idle;
        debug!("dual n-back aborted");
    }

    fn reset_run(&mut self) {
        self.history.clear();
        self.score = 0;
        self.current_round = 0;
        self.inputs = RoundInputs::default();
        self.position_tally = ChannelTally::default();
        self.audio_tally = ChannelTally::default();
    }

    fn advance(&mut self) -> Option<RoundRecord> {
        if self.current_round >= self.config.total_rounds {
            self.state = GameState::Ended;
            debug!(score = self.score, "dual n-back ended");
            return None;
        }

        let (position, letter) = self.sequencer.next_round(&self.history, self.config.n);
        let record = RoundRecord {
            position: position % GRID_CELLS,
            letter,
            round: self.current_round,
        };
        self.history.push(record);
        self.current_round += 1;
        self.inputs = RoundInputs::default();
        Some(record)
    }

    /// Current item and the item `n` rounds back, once enough history exists.
    fn n_back_pair(&self) -> Option<(RoundRecord, RoundRecord)> {
        let len = self.history.len();
        if len <= self.config.n {
            return None;
        }
        Some((self.history[len - 1], self.history[len - 1 - self.config.n]))
    }

    /// Whether the current round genuinely repeats the n-back item on `channel`.
    pub fn is_target(&self, channel: MatchChannel) -> bool {
        self.n_back_pair()
            .map(|(current, previous)| current.matches(&previous, channel))
            .unwrap_or(false)
    }

    pub fn submit_match(&mut self, channel: MatchChannel) -> Result<SubmitOutcome, GameError> {
        ensure_playing(self.state)?;

        if self.n_back_pair().is_none() {
            return Ok(SubmitOutcome::Ignored);
        }

        let first_answer = !self.inputs.answered(channel);
        if !self.config.repeat_policy.allows_repeats() {
            if self.inputs.evaluated {
                return Err(GameError::AlreadyEvaluated);
            }
            if !first_answer {
                return Err(GameError::AlreadyAnswered);
            }
        }
        self.inputs.mark(channel);

        let outcome = if self.is_target(channel) {
            SubmitOutcome::Hit
        } else {
            SubmitOutcome::FalseAlarm
        };

        if first_answer {
            let tally = self.tally_mut(channel);
            match outcome {
                SubmitOutcome::Hit => tally.hits += 1,
                SubmitOutcome::FalseAlarm => tally.false_alarms += 1,
                SubmitOutcome::Ignored => {}
            }
        }

        self.score += outcome.points();
        Ok(outcome)
    }

    /// Charge a miss for every genuine match that went unreported this round.
    pub fn evaluate_round(&mut self) -> Result<RoundReview, GameError> {
        ensure_playing(self.state)?;

        let Some((current, previous)) = self.n_back_pair() else {
            return Ok(RoundReview::default());
        };

        let first_evaluation = !self.inputs.evaluated;
        if !first_evaluation && !self.config.repeat_policy.allows_repeats() {
            return Err(GameError::AlreadyEvaluated);
        }
        self.inputs.evaluated = true;

        let mut review = RoundReview::default();
        for channel in MatchChannel::ALL {
            let is_match = current.matches(&previous, channel);
            let answered = self.inputs.answered(channel);

            if is_match && !answered {
                review.missed.push(channel);
                review.penalty -= MISS_PENALTY;
                if first_evaluation {
                    self.tally_mut(channel).misses += 1;
                }
            } else if !is_match && !answered && first_evaluation {
                self.tally_mut(channel).correct_rejections += 1;
            }
        }

        self.score += review.penalty;
        Ok(review)
    }

    pub fn stats(&self) -> NBackStats {
        NBackStats {
            score: self.score,
            round: self.current_round,
            total: self.config.total_rounds,
            level: self.config.n,
        }
    }

    pub fn metrics(&self) -> NBackMetrics {
        NBackMetrics::from_tallies(
            self.stats(),
            self.position_tally,
            self.audio_tally,
        )
    }

    fn tally_mut(&mut self, channel: MatchChannel) -> &mut ChannelTally {
        match channel {
            MatchChannel::Position => &mut self.position_tally,
            MatchChannel::Audio => &mut self.audio_tally,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed list of rounds.
    struct Scripted(VecDeque<(usize, char)>);

    impl Scripted {
        fn new(rounds: &[(usize, char)]) -> Self {
            Self(rounds.iter().copied().collect())
        }
    }

    impl NBackSequencer for Scripted {
        fn next_round(&mut self, _history: &[RoundRecord], _n: usize) -> (usize, char) {
            self.0.pop_front().unwrap_or((0, 'C'))
        }
    }

    fn scripted(n: usize, rounds: &[(usize, char)]) -> NBackEngine<Scripted> {
        let config = NBackConfig::new(n, rounds.len()).unwrap();
        NBackEngine::with_sequencer(config, Scripted::new(rounds)).unwrap()
    }

    fn play_to_round(engine: &mut NBackEngine<Scripted>, rounds: usize) {
        engine.start_game().unwrap();
        for _ in 1..rounds {
            engine.next_round().unwrap().unwrap();
        }
    }

    #[test]
    fn position_hit_two_back() {
        let mut engine = scripted(2, &[(3, 'A'), (5, 'B'), (3, 'C')]);
        play_to_round(&mut engine, 3);

        let outcome = engine.submit_match(MatchChannel::Position).unwrap();
        assert!(outcome.is_hit());
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.tally(MatchChannel::Position).hits, 1);
    }

    #[test]
    fn audio_false_alarm_costs_five() {
        let mut engine = scripted(2, &[(3, 'A'), (5, 'B'), (3, 'C')]);
        play_to_round(&mut engine, 3);

        let outcome = engine.submit_match(MatchChannel::Audio).unwrap();
        assert_eq!(outcome, SubmitOutcome::FalseAlarm);
        assert_eq!(engine.score(), -5);
    }

    #[test]
    fn claims_without_enough_history_are_ignored() {
        let mut engine = scripted(2, &[(3, 'A'), (3, 'A'), (3, 'A')]);
        engine.start_game().unwrap();
        assert_eq!(
            engine.submit_match(MatchChannel::Position).unwrap(),
            SubmitOutcome::Ignored
        );
        engine.next_round().unwrap();
        // history.len() == n is still not enough.
        assert_eq!(
            engine.submit_match(MatchChannel::Audio).unwrap(),
            SubmitOutcome::Ignored
        );
        assert_eq!(engine.evaluate_round().unwrap(), RoundReview::default());
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn evaluate_round_charges_misses() {
        let mut engine = scripted(2, &[(3, 'A'), (5, 'B'), (3, 'A')]);
        play_to_round(&mut engine, 3);

        let review = engine.evaluate_round().unwrap();
        assert_eq!(review.missed, vec![MatchChannel::Position, MatchChannel::Audio]);
        assert_eq!(review.penalty, -10);
        assert_eq!(engine.score(), -10);
        assert_eq!(engine.tally(MatchChannel::Audio).misses, 1);
    }

    #[test]
    fn answered_matches_are_not_missed() {
        let mut engine = scripted(1, &[(4, 'K'), (4, 'L')]);
        play_to_round(&mut engine, 2);

        assert!(engine.submit_match(MatchChannel::Position).unwrap().is_hit());
        let review = engine.evaluate_round().unwrap();
        assert!(review.missed.is_empty());
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.tally(MatchChannel::Audio).correct_rejections, 1);
    }

    #[test]
    fn repeated_claims_are_rejected_by_default() {
        let mut engine = scripted(2, &[(3, 'A'), (5, 'B'), (3, 'C')]);
        play_to_round(&mut engine, 3);

        engine.submit_match(MatchChannel::Position).unwrap();
        assert_eq!(
            engine.submit_match(MatchChannel::Position),
            Err(GameError::AlreadyAnswered)
        );
        assert_eq!(engine.score(), 10);

        engine.evaluate_round().unwrap();
        assert_eq!(engine.evaluate_round(), Err(GameError::AlreadyEvaluated));
        assert_eq!(
            engine.submit_match(MatchChannel::Audio),
            Err(GameError::AlreadyEvaluated)
        );
    }

    #[test]
    fn rescore_policy_applies_every_repeat() {
        let rounds = [(3, 'A'), (5, 'B'), (3, 'C')];
        let config = NBackConfig::new(2, 3)
            .unwrap()
            .with_repeat_policy(RepeatPolicy::Rescore);
        let mut engine = NBackEngine::with_sequencer(config, Scripted::new(&rounds)).unwrap();
        play_to_round(&mut engine, 3);

        engine.submit_match(MatchChannel::Position).unwrap();
        engine.submit_match(MatchChannel::Position).unwrap();
        engine.submit_match(MatchChannel::Audio).unwrap();
        engine.submit_match(MatchChannel::Audio).unwrap();
        assert_eq!(engine.score(), 10 + 10 - 5 - 5);
        // Signal detection only counts the first claim per channel.
        assert_eq!(engine.tally(MatchChannel::Position).hits, 1);
        assert_eq!(engine.tally(MatchChannel::Audio).false_alarms, 1);
    }

    #[test]
    fn run_terminates_after_total_rounds() {
        let config = NBackConfig::new(2, 5).unwrap();
        let mut engine = NBackEngine::seeded(config, 7).unwrap();

        assert!(engine.start_game().is_some());
        let mut presented = 1;
        while engine.next_round().unwrap().is_some() {
            presented += 1;
            assert_eq!(engine.history().len(), presented);
        }
        assert_eq!(presented, 5);
        assert_eq!(engine.state(), GameState::Ended);
        assert_eq!(engine.next_round(), Ok(None));
        assert_eq!(
            engine.submit_match(MatchChannel::Position),
            Err(GameError::NotPlaying)
        );
    }

    #[test]
    fn calls_before_start_fail_fast() {
        let mut engine = NBackEngine::seeded(NBackConfig::default(), 1).unwrap();
        assert_eq!(engine.next_round(), Err(GameError::NotStarted));
        assert_eq!(engine.evaluate_round(), Err(GameError::NotPlaying));
        assert_eq!(
            engine.submit_match(MatchChannel::Audio),
            Err(GameError::NotPlaying)
        );
    }

    #[test]
    fn start_game_resets_a_finished_run() {
        let mut engine = scripted(1, &[(2, 'C'), (2, 'C'), (0, 'F'), (1, 'H')]);
        play_to_round(&mut engine, 2);
        engine.submit_match(MatchChannel::Position).unwrap();
        assert_eq!(engine.score(), 10);

        engine.start_game().unwrap();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.stats().round, 1);
        assert_eq!(engine.tally(MatchChannel::Position), ChannelTally::default());
    }

    #[test]
    fn stats_report_level_and_progress() {
        let config = NBackConfig::new(3, 12).unwrap();
        let mut engine = NBackEngine::seeded(config, 3).unwrap();
        engine.start_game();
        engine.next_round().unwrap();
        let stats = engine.stats();
        assert_eq!(
            stats,
            NBackStats {
                score: 0,
                round: 2,
                total: 12,
                level: 3
            }
        );
    }

    #[test]
    fn abort_discards_the_whole_run() {
        let mut engine = scripted(1, &[(2, 'C'), (2, 'C'), (0, 'F')]);
        play_to_round(&mut engine, 3);
        engine.submit_match(MatchChannel::Audio).unwrap();
        assert_ne!(engine.score(), 0);

        engine.abort();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.history().len(), engine.stats().round);
        assert_eq!(
            engine.stats(),
            NBackStats {
                score: 0,
                round: 0,
                total: 3,
                level: 1
            }
        );
        assert_eq!(engine.tally(MatchChannel::Audio), ChannelTally::default());
        assert_eq!(engine.next_round(), Err(GameError::NotStarted));
    }

    #[test]
    fn engines_refuse_invalid_configs() {
        let zero_level = NBackConfig {
            n: 0,
            ..NBackConfig::default()
        };
        assert!(matches!(
            NBackEngine::seeded(zero_level, 1),
            Err(GameError::InvalidConfig(_))
        ));

        let no_rounds = NBackConfig {
            total_rounds: 0,
            ..NBackConfig::default()
        };
        assert!(matches!(
            NBackEngine::with_sequencer(no_rounds, Scripted::new(&[])),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            NBackConfig::new(0, 20),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(matches!(
            NBackConfig::new(2, 0),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn random_sequencer_forces_roughly_thirty_percent_matches() {
        let mut sequencer = RandomNBackSequencer::seeded(42);
        let n = 2;
        let mut history = Vec::new();
        let mut position_matches = 0;
        let mut letter_matches = 0;
        let rounds = 5000;

        for round in 0..rounds {
            let (position, letter) = sequencer.next_round(&history, n);
            assert!(position < GRID_CELLS);
            assert!(LETTERS.contains(&letter));
            if round >= n {
                let back: &RoundRecord = &history[round - n];
                position_matches += usize::from(back.position == position);
                letter_matches += usize::from(back.letter == letter);
            }
            history.push(RoundRecord {
                position,
                letter,
                round,
            });
        }

        let judged = (rounds - n) as f64;
        let position_rate = position_matches as f64 / judged;
        let letter_rate = letter_matches as f64 / judged;
        assert!((0.25..0.37).contains(&position_rate), "{position_rate}");
        assert!((0.25..0.37).contains(&letter_rate), "{letter_rate}");
    }
}
