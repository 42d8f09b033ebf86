//! Experiments: train and evaluate the three controllers side by side.
//!
//! Each run owns its environment, agent and random streams, all derived from
//! the experiment seed, the variant and the population ratio. Runs share
//! nothing, so the three variants of a comparison execute in parallel and
//! produce exactly what a sequential execution would.
//!
//! ```text
//!                     ┌─▶ biased   ─┐
//!  (ratio, config) ───┼─▶ hybrid   ─┼──▶ VariantComparison
//!                     └─▶ fairness ─┘
//! ```

use serde::{Deserialize, Serialize};
use thermal_core::ComfortModel;
use tracing::info;

use crate::agent::{QAgent, RewardShaping};
use crate::config::ExperimentConfig;
use crate::env::ThermalEnv;
use crate::evaluate::{evaluate_agent, EvaluationSummary};
use crate::train::{train_agent, EpisodeMetrics};
use crate::GameError;

/// The three reward-shaping controllers under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentVariant {
    Biased,
    Hybrid,
    Fairness,
}

impl AgentVariant {
    pub const ALL: [AgentVariant; 3] = [
        AgentVariant::Biased,
        AgentVariant::Hybrid,
        AgentVariant::Fairness,
    ];

    /// Reward shaping this variant trains with.
    pub fn shaping(self, cfg: &ExperimentConfig) -> RewardShaping {
        match self {
            AgentVariant::Biased => RewardShaping::Biased {
                group: cfg.biased_group.clone(),
            },
            AgentVariant::Hybrid => RewardShaping::Blended,
            AgentVariant::Fairness => RewardShaping::Fairness {
                weight: cfg.fairness_weight,
            },
        }
    }

    fn stream(self) -> u64 {
        match self {
            AgentVariant::Biased => 1,
            AgentVariant::Hybrid => 2,
            AgentVariant::Fairness => 3,
        }
    }
}

/// Training history and evaluation of one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub variant: AgentVariant,
    /// Ratio the agent was trained at
    pub training_ratio: f64,
    pub training: EpisodeMetrics,
    /// Learned greedy action per state after training
    pub greedy_actions: Vec<usize>,
    pub evaluation: EvaluationSummary,
}

/// All three variants evaluated at one population ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub population_ratio: f64,
    pub biased: VariantReport,
    pub hybrid: VariantReport,
    pub fairness: VariantReport,
}

impl VariantComparison {
    /// Relative reduction of the fairness gap, fairness vs biased.
    pub fn fairness_gap_reduction(&self) -> Option<f64> {
        relative_improvement(
            self.biased.evaluation.fairness_gap,
            self.fairness.evaluation.fairness_gap,
        )
    }

    /// Relative reduction of the fairness gap, hybrid vs biased.
    pub fn hybrid_gap_reduction(&self) -> Option<f64> {
        relative_improvement(
            self.biased.evaluation.fairness_gap,
            self.hybrid.evaluation.fairness_gap,
        )
    }

    pub fn report(&self, variant: AgentVariant) -> &VariantReport {
        match variant {
            AgentVariant::Biased => &self.biased,
            AgentVariant::Hybrid => &self.hybrid,
            AgentVariant::Fairness => &self.fairness,
        }
    }
}

/// `(baseline − value) / baseline`.
///
/// `None` when the baseline is zero (or not finite): the relative change is
/// undefined there.
pub fn relative_improvement(baseline: f64, value: f64) -> Option<f64> {
    if baseline == 0.0 || !baseline.is_finite() {
        None
    } else {
        Some((baseline - value) / baseline)
    }
}

/// Seed for one run, distinct per variant and ratio.
fn run_seed(seed: u64, variant: AgentVariant, ratio: f64) -> u64 {
    seed ^ variant.stream().wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ ratio.to_bits().rotate_left(17)
}

/// Train one variant and evaluate it at `ratio`.
///
/// The biased variant trains at the ratio that isolates its group; the
/// others train at `ratio` itself. Evaluation uses a fresh environment.
pub fn run_variant(
    variant: AgentVariant,
    ratio: f64,
    cfg: &ExperimentConfig,
    model: &ComfortModel,
) -> Result<VariantReport, GameError> {
    cfg.validate()?;

    let seed = run_seed(cfg.seed, variant, ratio);
    let agent_cfg = cfg.agent.clone().with_shaping(variant.shaping(cfg));
    let shaping = agent_cfg.shaping.bind(&cfg.env)?;
    let training_ratio = shaping.isolating_ratio().unwrap_or(ratio);

    let mut agent = QAgent::new(agent_cfg, &cfg.env, seed.wrapping_add(0xA6E7))?;
    let mut train_env = ThermalEnv::new(cfg.env.clone(), model, training_ratio, seed)?;
    let training = train_agent(
        &mut agent,
        &mut train_env,
        cfg.train_episodes,
        cfg.steps_per_episode,
    )?;
    let greedy_actions = agent.table().greedy_policy();

    let mut eval_env = ThermalEnv::new(cfg.env.clone(), model, ratio, seed.wrapping_add(0xE7A1))?;
    let evaluation = evaluate_agent(
        &mut agent,
        &mut eval_env,
        ratio,
        cfg.eval_episodes,
        cfg.eval_steps,
    )?;

    Ok(VariantReport {
        variant,
        training_ratio,
        training,
        greedy_actions,
        evaluation,
    })
}

/// Run all three variants at `ratio`, in parallel.
pub fn compare_variants(
    ratio: f64,
    cfg: &ExperimentConfig,
    model: &ComfortModel,
) -> Result<VariantComparison, GameError> {
    let run = |variant: AgentVariant| run_variant(variant, ratio, cfg, model);
    let (biased, (hybrid, fairness)) = rayon::join(
        || run(AgentVariant::Biased),
        || rayon::join(|| run(AgentVariant::Hybrid), || run(AgentVariant::Fairness)),
    );
    let (biased, hybrid, fairness) = (biased?, hybrid?, fairness?);

    let comparison = VariantComparison {
        population_ratio: ratio,
        biased,
        hybrid,
        fairness,
    };
    info!(
        ratio,
        biased_gap = comparison.biased.evaluation.fairness_gap,
        hybrid_gap = comparison.hybrid.evaluation.fairness_gap,
        fairness_gap = comparison.fairness.evaluation.fairness_gap,
        "variants compared"
    );
    Ok(comparison)
}

/// One comparison per population ratio, in input order.
pub fn sweep_population_ratios(
    ratios: &[f64],
    cfg: &ExperimentConfig,
    model: &ComfortModel,
) -> Result<Vec<VariantComparison>, GameError> {
    ratios
        .iter()
        .map(|&ratio| compare_variants(ratio, cfg, model))
        .collect()
}
