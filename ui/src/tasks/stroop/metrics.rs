//! Metric definitions for Stroop summaries.

use serde::{Deserialize, Serialize};

use super::engine::{StroopResponse, StroopStats};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StroopMetrics {
    pub score: i32,
    pub rounds: usize,
    pub answered: usize,
    /// Percent correct over presented rounds (unanswered rounds count as wrong).
    pub accuracy: u32,
    pub mean_rt_ms: f64,
    pub median_rt_ms: f64,
    pub congruent_mean_rt_ms: f64,
    pub incongruent_mean_rt_ms: f64,
    pub congruent_accuracy: f64,
    pub incongruent_accuracy: f64,
    /// Slow-down caused by word/ink conflict: incongruent minus congruent mean RT (correct trials).
    pub interference_ms: f64,
}

impl StroopMetrics {
    pub fn from_responses(stats: StroopStats, responses: &[StroopResponse]) -> Self {
        let mut all_rts: Vec<f64> = responses.iter().map(|r| r.reaction_time_ms).collect();
        all_rts.sort_by(|a, b| a.total_cmp(b));

        let (congruent, incongruent): (Vec<&StroopResponse>, Vec<&StroopResponse>) =
            responses.iter().partition(|r| r.stimulus.is_congruent);

        let congruent_mean_rt_ms = mean(&correct_rts(&congruent));
        let incongruent_mean_rt_ms = mean(&correct_rts(&incongruent));
        let interference_ms = if congruent_mean_rt_ms > 0.0 && incongruent_mean_rt_ms > 0.0 {
            incongruent_mean_rt_ms - congruent_mean_rt_ms
        } else {
            0.0
        };

        Self {
            score: stats.score,
            rounds: stats.round,
            answered: responses.len(),
            accuracy: stats.accuracy,
            mean_rt_ms: mean(&all_rts),
            median_rt_ms: median(&all_rts),
            congruent_mean_rt_ms,
            incongruent_mean_rt_ms,
            congruent_accuracy: condition_accuracy(&congruent),
            incongruent_accuracy: condition_accuracy(&incongruent),
            interference_ms,
        }
    }
}

fn correct_rts(responses: &[&StroopResponse]) -> Vec<f64> {
    responses
        .iter()
        .filter(|r| r.correct)
        .map(|r| r.reaction_time_ms)
        .collect()
}

fn condition_accuracy(responses: &[&StroopResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let correct = responses.iter().filter(|r| r.correct).count();
    correct as f64 / responses.len() as f64 * 100.0
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        len if len % 2 == 1 => sorted[len / 2],
        len => (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::stroop::engine::{InkColor, StroopTrial};

    fn response(round: usize, rt: f64, correct: bool, congruent: bool) -> StroopResponse {
        let stimulus = if congruent {
            StroopTrial::new(InkColor::Red, InkColor::Red)
        } else {
            StroopTrial::new(InkColor::Red, InkColor::Green)
        };
        StroopResponse {
            round,
            reaction_time_ms: rt,
            correct,
            stimulus,
        }
    }

    #[test]
    fn interference_compares_correct_trials() {
        let responses = vec![
            response(1, 400.0, true, true),
            response(2, 500.0, true, true),
            response(3, 650.0, true, false),
            response(4, 750.0, true, false),
            response(5, 300.0, false, false),
        ];
        let stats = StroopStats {
            score: 300,
            round: 5,
            total: 20,
            accuracy: 80,
            avg_rt_ms: 520,
        };

        let metrics = StroopMetrics::from_responses(stats, &responses);
        assert_eq!(metrics.congruent_mean_rt_ms, 450.0);
        assert_eq!(metrics.incongruent_mean_rt_ms, 700.0);
        assert_eq!(metrics.interference_ms, 250.0);
        assert_eq!(metrics.median_rt_ms, 500.0);
        assert_eq!(metrics.congruent_accuracy, 100.0);
        assert!((metrics.incongruent_accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.answered, 5);
    }

    #[test]
    fn empty_run_has_zero_metrics() {
        let stats = StroopStats {
            score: 0,
            round: 0,
            total: 20,
            accuracy: 0,
            avg_rt_ms: 0,
        };
        let metrics = StroopMetrics::from_responses(stats, &[]);
        assert_eq!(metrics, StroopMetrics::default());
    }

    #[test]
    fn median_handles_even_lengths() {
        assert_eq!(median(&[100.0, 200.0, 300.0, 400.0]), 250.0);
        assert_eq!(median(&[]), 0.0);
    }
}
