//! Speed Match engine: is the reference symbol among the five options?
//!
//! The game is round-based; the session length is a countdown owned by the
//! view, which calls [`SpeedMatchEngine::end_game`] when time runs out.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::SpeedMatchMetrics;
use crate::tasks::lifecycle::{
    ensure_playing, ensure_started, percent, GameError, GameState, RepeatPolicy,
};

pub const SYMBOLS: [char; 14] = [
    '★', '●', '■', '▲', '◆', '♥', '♣', '♠', '☀', '☂', '♪', '✿', '⬢', '✚',
];
pub const OPTION_COUNT: usize = 5;
pub const PRESENT_PROBABILITY: f64 = 0.5;
pub const CORRECT_POINTS: i32 = 50;
pub const WRONG_POINTS: i32 = -20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedMatchSet {
    pub reference: char,
    pub options: [char; OPTION_COUNT],
    pub is_present: bool,
}

impl SpeedMatchSet {
    pub fn contains_reference(&self) -> bool {
        self.options.contains(&self.reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedMatchAnswer {
    pub correct: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedMatchStats {
    pub score: i32,
    pub matches: u32,
    pub errors: u32,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMatchConfig {
    pub duration_secs: u32,
    pub repeat_policy: RepeatPolicy,
}

impl Default for SpeedMatchConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            repeat_policy: RepeatPolicy::default(),
        }
    }
}

impl SpeedMatchConfig {
    pub fn new(duration_secs: u32) -> Result<Self, GameError> {
        let config = Self {
            duration_secs,
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
        if self.duration_secs == 0 {
            return Err(GameError::InvalidConfig("speed match needs a positive duration".into()));
        }
        Ok(())
    }
}

pub trait SetSequencer {
    fn next_set(&mut self) -> SpeedMatchSet;
}

#[derive(Debug, Clone)]
pub struct RandomSetSequencer<R> {
    rng: R,
}

impl<R: Rng> RandomSetSequencer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSetSequencer<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SetSequencer for RandomSetSequencer<R> {
    fn next_set(&mut self) -> SpeedMatchSet {
        let reference = SYMBOLS[self.rng.gen_range(0..SYMBOLS.len())];
        let is_present = self.rng.gen_bool(PRESENT_PROBABILITY);

        let pool: Vec<char> = SYMBOLS.iter().copied().filter(|&s| s != reference).collect();
        let fillers_needed = if is_present { OPTION_COUNT - 1 } else { OPTION_COUNT };

        // Slots not covered by fillers keep the reference.
        let mut options = [reference; OPTION_COUNT];
        for (slot, symbol) in options
            .iter_mut()
            .zip(pool.choose_multiple(&mut self.rng, fillers_needed))
        {
            *slot = *symbol;
        }
        options.shuffle(&mut self.rng);

        SpeedMatchSet {
            reference,
            options,
            is_present,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSet {
    set: SpeedMatchSet,
    answered: bool,
}

#[derive(Debug, Clone)]
pub struct SpeedMatchEngine<S = RandomSetSequencer<StdRng>> {
    config: SpeedMatchConfig,
    sequencer: S,
    state: GameState,
    score: i32,
    matches: u32,
    errors: u32,
    sets_shown: usize,
    current: Option<ActiveSet>,
}

impl SpeedMatchEngine {
    pub fn new(config: SpeedMatchConfig) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomSetSequencer::from_entropy())
    }

    pub fn seeded(config: SpeedMatchConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_sequencer(config, RandomSetSequencer::seeded(seed))
    }
}

impl Default for SpeedMatchEngine {
    fn default() -> Self {
        Self::assemble(SpeedMatchConfig::default(), RandomSetSequencer::from_entropy())
    }
}

impl<S: SetSequencer> SpeedMatchEngine<S> {
    pub fn with_sequencer(config: SpeedMatchConfig, sequencer: S) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::assemble(config, sequencer))
    }

    fn assemble(config: SpeedMatchConfig, sequencer: S) -> Self {
        Self {
            config,
            sequencer,
            state: GameState::Idle,
            score: 0,
            matches: 0,
            errors: 0,
            sets_shown: 0,
            current: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn current(&self) -> Option<SpeedMatchSet> {
        self.current.map(|active| active.set)
    }

    pub fn sets_shown(&self) -> usize {
        self.sets_shown
    }

    pub fn start_game(&mut self) -> Option<SpeedMatchSet> {
        self.reset_run();
        self.state = GameState::Playing;
        debug!(duration_secs = self.config.duration_secs, "speed match started");
        Some(self.advance())
    }

    pub fn next_set(&mut self) -> Result<Option<SpeedMatchSet>, GameError> {
        if !ensure_started(self.state)? {
            return Ok(None);
        }
        Ok(Some(self.advance()))
    }

    /// Countdown expired: no further sets are dealt.
    pub fn end_game(&mut self) {
        if self.state.is_playing() {
            self.state = GameState::Ended;
            self.current = None;
            debug!(score = self.score, "speed match ended");
        }
    }

    pub fn abort(&mut self) {
        self.reset_run();
        self.state = GameState::Idle;
        debug!("speed match aborted");
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.matches = 0;
        self.errors = 0;
        self.sets_shown = 0;
        self.current = None;
    }

    fn advance(&mut self) -> SpeedMatchSet {
        let set = self.sequencer.next_set();
        self.current = Some(ActiveSet {
            set,
            answered: false,
        });
        self.sets_shown += 1;
        set
    }

    pub fn submit_answer(&mut self, user_says_present: bool) -> Result<SpeedMatchAnswer, GameError> {
        ensure_playing(self.state)?;
        let repeats_allowed = self.config.repeat_policy.allows_repeats();
        let active = self.current.as_mut().ok_or(GameError::NoActiveStimulus)?;
        if active.answered && !repeats_allowed {
            return Err(GameError::AlreadyAnswered);
        }
        active.answered = true;

        let answer = if user_says_present == active.set.is_present {
            self.matches += 1;
            SpeedMatchAnswer {
                correct: true,
                points: CORRECT_POINTS,
            }
        } else {
            self.errors += 1;
            SpeedMatchAnswer {
                correct: false,
                points: WRONG_POINTS,
            }
        };
        self.score += answer.points;
        Ok(answer)
    }

    pub fn stats(&self) -> SpeedMatchStats {
        SpeedMatchStats {
            score: self.score,
            matches: self.matches,
            errors: self.errors,
            accuracy: percent(self.matches, self.matches + self.errors),
        }
    }

    pub fn metrics(&self) -> SpeedMatchMetrics {
        SpeedMatchMetrics::from_stats(self.stats(), self.sets_shown, self.config.duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(SpeedMatchSet);

    impl SetSequencer for Fixed {
        fn next_set(&mut self) -> SpeedMatchSet {
            self.0
        }
    }

    fn absent_set() -> SpeedMatchSet {
        SpeedMatchSet {
            reference: '★',
            options: ['●', '■', '▲', '◆', '♥'],
            is_present: false,
        }
    }

    fn engine_with(set: SpeedMatchSet) -> SpeedMatchEngine<Fixed> {
        SpeedMatchEngine::with_sequencer(SpeedMatchConfig::default(), Fixed(set)).unwrap()
    }

    #[test]
    fn saying_present_on_absent_set_is_an_error() {
        let mut engine = engine_with(absent_set());
        engine.start_game();

        let answer = engine.submit_answer(true).unwrap();
        assert_eq!(
            answer,
            SpeedMatchAnswer {
                correct: false,
                points: -20
            }
        );
        assert_eq!(engine.stats().errors, 1);
        assert_eq!(engine.score(), -20);
    }

    #[test]
    fn correct_answers_add_fifty() {
        let mut engine = engine_with(absent_set());
        engine.start_game();
        assert!(engine.submit_answer(false).unwrap().correct);
        engine.next_set().unwrap();
        assert!(engine.submit_answer(false).unwrap().correct);
        engine.next_set().unwrap();
        engine.submit_answer(true).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.score, 80);
        assert_eq!(stats.matches, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.accuracy, 67);
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        let mut engine = SpeedMatchEngine::seeded(SpeedMatchConfig::default(), 5).unwrap();
        assert_eq!(engine.stats().accuracy, 0);
        engine.start_game();
        assert_eq!(engine.stats().accuracy, 0);
    }

    #[test]
    fn one_answer_per_set_by_default() {
        let mut engine = engine_with(absent_set());
        engine.start_game();
        engine.submit_answer(false).unwrap();
        assert_eq!(engine.submit_answer(false), Err(GameError::AlreadyAnswered));

        let config = SpeedMatchConfig::default().with_repeat_policy(RepeatPolicy::Rescore);
        let mut legacy = SpeedMatchEngine::with_sequencer(config, Fixed(absent_set())).unwrap();
        legacy.start_game();
        legacy.submit_answer(false).unwrap();
        legacy.submit_answer(false).unwrap();
        assert_eq!(legacy.score(), 100);
    }

    #[test]
    fn end_game_stops_dealing() {
        let mut engine = SpeedMatchEngine::seeded(SpeedMatchConfig::default(), 9).unwrap();
        assert_eq!(engine.next_set(), Err(GameError::NotStarted));

        engine.start_game();
        assert!(engine.next_set().unwrap().is_some());
        engine.end_game();

        assert_eq!(engine.state(), GameState::Ended);
        assert_eq!(engine.next_set(), Ok(None));
        assert_eq!(engine.submit_answer(true), Err(GameError::NotPlaying));
        assert_eq!(engine.sets_shown(), 2);
    }

    #[test]
    fn random_sets_respect_presence() {
        let mut sequencer = RandomSetSequencer::seeded(77);
        let mut present = 0;
        for _ in 0..500 {
            let set = sequencer.next_set();
            assert_eq!(set.contains_reference(), set.is_present);

            let mut sorted = set.options.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), OPTION_COUNT, "duplicates in {:?}", set.options);
            assert!(set.options.iter().all(|symbol| SYMBOLS.contains(symbol)));
            present += usize::from(set.is_present);
        }
        assert!((200..=300).contains(&present), "present={present}");
    }

    #[test]
    fn abort_resets_counters() {
        let mut engine = engine_with(absent_set());
        engine.start_game();
        engine.submit_answer(true).unwrap();
        engine.next_set().unwrap();

        engine.abort();
        assert_eq!(
            engine.stats(),
            SpeedMatchStats {
                score: 0,
                matches: 0,
                errors: 0,
                accuracy: 0
            }
        );
        assert_eq!(engine.sets_shown(), 0);
        assert_eq!(engine.current(), None);
    }

    #[test]
    fn invalid_duration_is_rejected() {
        assert!(matches!(
            SpeedMatchConfig::new(0),
            Err(GameError::InvalidConfig(_))
        ));
        let config = SpeedMatchConfig {
            duration_secs: 0,
            ..SpeedMatchConfig::default()
        };
        assert!(matches!(
            SpeedMatchEngine::seeded(config, 1),
            Err(GameError::InvalidConfig(_))
        ));
    }
}
