//! Metric definitions and aggregation helpers for Dual N-Back runs.

use serde::{Deserialize, Serialize};

use super::engine::{ChannelTally, NBackStats};

/// Signal-detection summary for one stream (position or audio).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChannelMetrics {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
    pub target_trials: u32,
    pub non_target_trials: u32,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    /// Percent of judged rounds answered correctly (hits + correct rejections).
    pub accuracy: f64,
    pub d_prime: f64,
    pub criterion: f64,
}

impl ChannelMetrics {
    pub fn from_tally(tally: ChannelTally) -> Self {
        let target_trials = tally.hits + tally.misses;
        let non_target_trials = tally.false_alarms + tally.correct_rejections;
        let judged = target_trials + non_target_trials;

        let hit_rate = ratio(tally.hits, target_trials);
        let false_alarm_rate = ratio(tally.false_alarms, non_target_trials);
        let accuracy = ratio(tally.hits + tally.correct_rejections, judged) * 100.0;

        let (d_prime, criterion) = if judged == 0 {
            (0.0, 0.0)
        } else {
            signal_detection_indices(
                tally.hits,
                tally.false_alarms,
                target_trials,
                non_target_trials,
            )
        };

        Self {
            hits: tally.hits,
            misses: tally.misses,
            false_alarms: tally.false_alarms,
            correct_rejections: tally.correct_rejections,
            target_trials,
            non_target_trials,
            hit_rate,
            false_alarm_rate,
            accuracy,
            d_prime,
            criterion,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NBackMetrics {
    pub level: usize,
    pub rounds: usize,
    pub score: i32,
    pub position: ChannelMetrics,
    pub audio: ChannelMetrics,
    /// Mean of both channel accuracies, in percent.
    pub accuracy: f64,
}

impl NBackMetrics {
    pub fn from_tallies(stats: NBackStats, position: ChannelTally, audio: ChannelTally) -> Self {
        let position = ChannelMetrics::from_tally(position);
        let audio = ChannelMetrics::from_tally(audio);
        let accuracy = (position.accuracy + audio.accuracy) / 2.0;

        Self {
            level: stats.level,
            rounds: stats.round,
            score: stats.score,
            position,
            audio,
            accuracy,
        }
    }

    pub fn total_hits(&self) -> u32 {
        self.position.hits + self.audio.hits
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn signal_detection_indices(
    hits: u32,
    false_alarms: u32,
    target_trials: u32,
    non_target_trials: u32,
) -> (f64, f64) {
    let hit_trials = target_trials.max(1) as f64;
    let non_target_trials = non_target_trials.max(1) as f64;

    // Log-linear correction keeps z-scores finite when a rate is 0 or 1.
    let adjusted_hit_rate = (hits as f64 + 0.5) / (hit_trials + 1.0);
    let adjusted_fa_rate = (false_alarms as f64 + 0.5) / (non_target_trials + 1.0);

    let z_hit = inverse_normal_cdf(adjusted_hit_rate.clamp(1e-6, 1.0 - 1e-6));
    let z_fa = inverse_normal_cdf(adjusted_fa_rate.clamp(1e-6, 1.0 - 1e-6));

    (z_hit - z_fa, -0.5 * (z_hit + z_fa))
}

/// Acklam's rational approximation of the standard normal quantile function.
/// Maximum error ~4.5e-4 across (0, 1).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        return tail((-2.0 * p.ln()).sqrt());
    }
    if p > P_HIGH {
        return -tail((-2.0 * (1.0 - p).ln()).sqrt());
    }

    let q = p - 0.5;
    let r = q * q;
    (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
        / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
}
