//! Evaluation harness: greedy runs, raw observations, derived statistics.
//!
//! Evaluation happens in two phases. Collection runs the agent greedily and
//! appends every per-step observation to an [`EvaluationRecord`] without any
//! averaging. Summary then derives comfort, fairness and accuracy figures
//! from the record.
//!
//! ## Accuracy
//!
//! | Component | Weight | Definition |
//! |-----------|--------|------------|
//! | thermal comfort | 0.4 | `1 − mean|comfort − target(vote)|`, per group, averaged |
//! | temperature control | 0.3 | fraction of temperatures in `[20, 26]` |
//! | preference prediction | 0.3 | fraction of preferences matching `expected(vote)`, averaged |

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::QAgent;
use crate::env::ThermalEnv;
use crate::rollout::rollout;
use crate::GameError;

/// Comfort strictly above this counts as satisfied.
pub const SATISFACTION_THRESHOLD: f64 = 0.6;

/// Temperatures treated as compliant (ASHRAE band).
pub const COMPLIANCE_BAND: (f64, f64) = (20.0, 26.0);

const THERMAL_WEIGHT: f64 = 0.4;
const CONTROL_WEIGHT: f64 = 0.3;
const PREFERENCE_WEIGHT: f64 = 0.3;

/// Raw per-step observations, flattened across all evaluation episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub temperatures: Vec<f64>,
    pub comfort_primary: Vec<f64>,
    pub comfort_secondary: Vec<f64>,
    pub sensation_primary: Vec<i8>,
    pub sensation_secondary: Vec<i8>,
    pub preference_primary: Vec<i8>,
    pub preference_secondary: Vec<i8>,
}

impl EvaluationRecord {
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Every series must hold one sample per recorded step.
    fn check_lengths(&self) -> Result<(), GameError> {
        let expected = self.temperatures.len();
        let lengths = [
            ("comfort_primary", self.comfort_primary.len()),
            ("comfort_secondary", self.comfort_secondary.len()),
            ("sensation_primary", self.sensation_primary.len()),
            ("sensation_secondary", self.sensation_secondary.len()),
            ("preference_primary", self.preference_primary.len()),
            ("preference_secondary", self.preference_secondary.len()),
        ];
        match lengths.iter().find(|&&(_, found)| found != expected) {
            Some(&(field, found)) => Err(GameError::RecordLengthMismatch {
                field,
                expected,
                found,
            }),
            None => Ok(()),
        }
    }

    /// Derive every statistic of an [`EvaluationSummary`].
    ///
    /// # Errors
    ///
    /// [`GameError::EmptyEvaluation`] if nothing was recorded,
    /// [`GameError::RecordLengthMismatch`] if the series disagree in length.
    pub fn summarize(self, population_ratio: f64) -> Result<EvaluationSummary, GameError> {
        if self.is_empty() {
            return Err(GameError::EmptyEvaluation);
        }
        self.check_lengths()?;

        let mean_temperature = mean(&self.temperatures);
        let std_temperature = std_dev(&self.temperatures, mean_temperature);
        let mean_comfort_primary = mean(&self.comfort_primary);
        let mean_comfort_secondary = mean(&self.comfort_secondary);

        let satisfied = |samples: &[f64]| {
            samples.iter().filter(|&&c| c > SATISFACTION_THRESHOLD).count()
        };
        let satisfaction_primary = satisfied(&self.comfort_primary) as f64 / self.len() as f64;
        let satisfaction_secondary = satisfied(&self.comfort_secondary) as f64 / self.len() as f64;
        let satisfaction_overall = (satisfied(&self.comfort_primary)
            + satisfied(&self.comfort_secondary)) as f64
            / (self.comfort_primary.len() + self.comfort_secondary.len()) as f64;

        let thermal_comfort_accuracy = (thermal_comfort_accuracy(
            &self.comfort_primary,
            &self.sensation_primary,
        ) + thermal_comfort_accuracy(
            &self.comfort_secondary,
            &self.sensation_secondary,
        )) / 2.0;

        let (low, high) = COMPLIANCE_BAND;
        let temperature_control_accuracy = self
            .temperatures
            .iter()
            .filter(|t| (low..=high).contains(*t))
            .count() as f64
            / self.len() as f64;

        let preference_accuracy = (preference_accuracy(
            &self.preference_primary,
            &self.sensation_primary,
        ) + preference_accuracy(
            &self.preference_secondary,
            &self.sensation_secondary,
        )) / 2.0;

        let overall_accuracy = THERMAL_WEIGHT * thermal_comfort_accuracy
            + CONTROL_WEIGHT * temperature_control_accuracy
            + PREFERENCE_WEIGHT * preference_accuracy;

        Ok(EvaluationSummary {
            population_ratio,
            samples: self.len(),
            mean_temperature,
            std_temperature,
            mean_comfort_primary,
            mean_comfort_secondary,
            fairness_gap: (mean_comfort_primary - mean_comfort_secondary).abs(),
            satisfaction_primary,
            satisfaction_secondary,
            satisfaction_overall,
            temperature_stability: 1.0 / (1.0 + std_temperature),
            thermal_comfort_accuracy,
            temperature_control_accuracy,
            preference_accuracy,
            overall_accuracy,
            record: self,
        })
    }
}

/// Statistics of one evaluation, plus the raw record they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub population_ratio: f64,
    /// Steps recorded across all episodes
    pub samples: usize,
    pub mean_temperature: f64,
    /// Population standard deviation
    pub std_temperature: f64,
    pub mean_comfort_primary: f64,
    pub mean_comfort_secondary: f64,
    pub fairness_gap: f64,
    pub satisfaction_primary: f64,
    pub satisfaction_secondary: f64,
    pub satisfaction_overall: f64,
    /// `1 / (1 + std_temperature)`
    pub temperature_stability: f64,
    pub thermal_comfort_accuracy: f64,
    pub temperature_control_accuracy: f64,
    pub preference_accuracy: f64,
    pub overall_accuracy: f64,
    pub record: EvaluationRecord,
}

/// Run `agent` greedily for `episodes × steps_per_episode` steps at the given
/// population ratio and summarize.
///
/// The agent is held in evaluation mode for the whole call; its epsilon is
/// restored on return whether or not evaluation succeeds. The environment
/// keeps the new population ratio afterwards.
///
/// # Errors
///
/// Invalid ratio, an environment/agent error, or an empty budget.
pub fn evaluate_agent(
    agent: &mut QAgent,
    env: &mut ThermalEnv,
    population_ratio: f64,
    episodes: usize,
    steps_per_episode: usize,
) -> Result<EvaluationSummary, GameError> {
    let mut guard = agent.evaluation_mode();
    env.set_population_ratio(population_ratio)?;
    if episodes == 0 || steps_per_episode == 0 {
        return Err(GameError::EmptyEvaluation);
    }

    let mut record = EvaluationRecord::default();

    for _ in 0..episodes {
        let trajectory = rollout(&mut *guard, env, steps_per_episode)?;
        for step in trajectory.steps {
            let info = step.info;
            record.temperatures.push(step.next_observation);
            record.comfort_primary.push(info.primary.comfort);
            record.comfort_secondary.push(info.secondary.comfort);
            record.sensation_primary.push(info.primary.sensation);
            record.sensation_secondary.push(info.secondary.sensation);
            record.preference_primary.push(info.primary.preference.signal());
            record.preference_secondary.push(info.secondary.preference.signal());
        }
    }

    let summary = record.summarize(population_ratio)?;
    info!(
        variant = guard.shaping().name(),
        ratio = population_ratio,
        fairness_gap = summary.fairness_gap,
        overall_accuracy = summary.overall_accuracy,
        "evaluation finished"
    );
    Ok(summary)
}

/// Comfort a sensation vote implies.
pub fn target_comfort(vote: i8) -> f64 {
    match vote.unsigned_abs() {
        0 | 1 => 0.8,
        2 => 0.4,
        _ => 0.1,
    }
}

/// Preference a sensation vote implies: hot votes want cooler, cold votes
/// want warmer.
pub fn expected_preference(vote: i8) -> i8 {
    if vote > 1 {
        -1
    } else if vote < -1 {
        1
    } else {
        0
    }
}

/// `1 − mean|comfort − target(vote)|`, clamped to `[0, 1]`.
pub fn thermal_comfort_accuracy(comforts: &[f64], votes: &[i8]) -> f64 {
    if comforts.is_empty() {
        return 0.0;
    }
    let error: f64 = comforts
        .iter()
        .zip(votes)
        .map(|(&c, &v)| (c - target_comfort(v)).abs())
        .sum::<f64>()
        / comforts.len() as f64;
    (1.0 - error).clamp(0.0, 1.0)
}

/// Fraction of preference signals matching what the votes imply.
pub fn preference_accuracy(preferences: &[i8], votes: &[i8]) -> f64 {
    if preferences.is_empty() {
        return 0.0;
    }
    let hits = preferences
        .iter()
        .zip(votes)
        .filter(|&(&p, &v)| p == expected_preference(v))
        .count();
    hits as f64 / preferences.len() as f64
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
