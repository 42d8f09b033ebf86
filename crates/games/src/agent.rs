//! Tabular Q-learning agent with pluggable reward shaping.
//!
//! One [`QAgent`] type covers all three controllers. They share the table,
//! the epsilon-greedy selection and the Bellman update, and differ only in
//! which reward reaches `update`:
//!
//! | Shaping | Reward fed to the update |
//! |---------|--------------------------|
//! | [`RewardShaping::Blended`] | environment's population-weighted reward |
//! | [`RewardShaping::Biased`] | the target group's own comfort |
//! | [`RewardShaping::Fairness`] | `(cA + cB)/2 − w·|cA − cB|` |
//!
//! # Modes
//!
//! An agent is in [`AgentMode::Training`] unless the caller holds an
//! [`EvaluationGuard`]. While the guard lives, epsilon is zero and `update`
//! is refused; dropping the guard restores both, including on unwind.

use std::ops::{Deref, DerefMut};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thermal_core::CoreError;
use tracing::trace;

use crate::config::{AgentConfig, EnvConfig};
use crate::env::ThermalTransition;
use crate::policy::{Policy, QTable};
use crate::GameError;

// ============================================================================
// Reward Shaping
// ============================================================================

/// Which reward signal an agent learns from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardShaping {
    /// Population-weighted comfort, straight from the environment.
    Blended,
    /// Only the named group's comfort counts.
    Biased { group: String },
    /// Mean comfort minus `weight` times the comfort gap.
    Fairness { weight: f64 },
}

impl RewardShaping {
    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            RewardShaping::Blended => "hybrid",
            RewardShaping::Biased { .. } => "biased",
            RewardShaping::Fairness { .. } => "fairness",
        }
    }

    /// Resolve group labels against an environment's configuration.
    ///
    /// # Errors
    ///
    /// A biased target that is neither of the environment's groups.
    pub fn bind(&self, env: &EnvConfig) -> Result<BoundShaping, GameError> {
        Ok(match self {
            RewardShaping::Blended => BoundShaping::Blended,
            RewardShaping::Biased { group } if *group == env.primary_group => BoundShaping::Primary,
            RewardShaping::Biased { group } if *group == env.secondary_group => {
                BoundShaping::Secondary
            }
            RewardShaping::Biased { group } => {
                return Err(CoreError::UnknownGroup {
                    label: group.clone(),
                }
                .into())
            }
            RewardShaping::Fairness { weight } => BoundShaping::Fairness { weight: *weight },
        })
    }
}

/// A [`RewardShaping`] with its target group resolved to a side of the
/// environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundShaping {
    Blended,
    Primary,
    Secondary,
    Fairness { weight: f64 },
}

impl BoundShaping {
    /// Reward to feed into the update for this transition.
    pub fn reward(&self, transition: &ThermalTransition) -> f64 {
        let primary = transition.info.primary.comfort;
        let secondary = transition.info.secondary.comfort;
        match *self {
            BoundShaping::Blended => transition.reward,
            BoundShaping::Primary => primary,
            BoundShaping::Secondary => secondary,
            BoundShaping::Fairness { weight } => {
                calculate_fairness_reward(primary, secondary, weight)
            }
        }
    }

    /// Population ratio at which the environment reflects only the biased
    /// agent's group, if this shaping is biased.
    pub fn isolating_ratio(&self) -> Option<f64> {
        match self {
            BoundShaping::Primary => Some(1.0),
            BoundShaping::Secondary => Some(0.0),
            _ => None,
        }
    }
}

/// Mean comfort of the two groups, penalized by their absolute gap.
pub fn calculate_fairness_reward(comfort_a: f64, comfort_b: f64, weight: f64) -> f64 {
    (comfort_a + comfort_b) / 2.0 - weight * (comfort_a - comfort_b).abs()
}

// ============================================================================
// Agent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    Training,
    Evaluation,
}

/// Epsilon-greedy tabular Q-learner over discretized temperatures.
#[derive(Debug, Clone)]
pub struct QAgent {
    config: AgentConfig,
    table: QTable,
    bounds: (f64, f64),
    epsilon: f64,
    updates: u64,
    mode: AgentMode,
    rng: ChaCha8Rng,
}

impl QAgent {
    /// Create an agent whose state space spans `env`'s temperature bounds.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] if either config fails validation.
    pub fn new(config: AgentConfig, env: &EnvConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        env.validate()?;

        Ok(Self {
            table: QTable::new(config.state_bins, config.action_count),
            bounds: (env.min_temp, env.max_temp),
            epsilon: config.initial_epsilon,
            updates: 0,
            mode: AgentMode::Training,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn shaping(&self) -> &RewardShaping {
        &self.config.shaping
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Total learning updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Map a temperature to a state index in `[0, state_bins)`.
    ///
    /// Clamps to the bounds, scales linearly and rounds to the nearest bin,
    /// so the mapping is monotone non-decreasing.
    pub fn discretize_state(&self, temperature: f64) -> usize {
        let (min, max) = self.bounds;
        let last = (self.config.state_bins - 1) as f64;
        let t = temperature.clamp(min, max);
        let scaled = ((t - min) / (max - min) * last).round();
        (scaled.clamp(0.0, last)) as usize
    }

    /// Epsilon-greedy action for a state.
    ///
    /// The greedy branch takes the first maximal action (see
    /// [`QTable::best_action`]).
    pub fn choose_action(&mut self, state: usize) -> Result<usize, GameError> {
        let greedy = self.table.best_action(state)?;
        if self.epsilon > 0.0 && self.rng.gen::<f64>() < self.epsilon {
            Ok(self.rng.gen_range(0..self.config.action_count))
        } else {
            Ok(greedy)
        }
    }

    /// Bellman update for one transition, then the epsilon schedule.
    ///
    /// Epsilon decays once every `decay_interval` updates and never drops
    /// below `min_epsilon`.
    ///
    /// # Errors
    ///
    /// [`GameError::LearningDisabled`] in evaluation mode; index errors from
    /// the table.
    pub fn update(
        &mut self,
        state: usize,
        action: usize,
        reward: f64,
        next_state: usize,
    ) -> Result<(), GameError> {
        if self.mode == AgentMode::Evaluation {
            return Err(GameError::LearningDisabled);
        }

        self.table.bellman_update(
            state,
            action,
            reward,
            next_state,
            self.config.learning_rate,
            self.config.discount,
        )?;

        self.updates += 1;
        if self.updates % self.config.decay_interval == 0 {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
            trace!(updates = self.updates, epsilon = self.epsilon, "epsilon decayed");
        }
        Ok(())
    }

    /// Switch to evaluation mode until the returned guard is dropped.
    pub fn evaluation_mode(&mut self) -> EvaluationGuard<'_> {
        let saved_epsilon = self.epsilon;
        let saved_mode = self.mode;
        self.epsilon = 0.0;
        self.mode = AgentMode::Evaluation;
        EvaluationGuard {
            agent: self,
            saved_epsilon,
            saved_mode,
        }
    }
}

/// Acting on a raw temperature: discretize, then choose.
impl Policy<f64, usize> for QAgent {
    fn act(&mut self, temperature: &f64) -> Result<usize, GameError> {
        let state = self.discretize_state(*temperature);
        self.choose_action(state)
    }
}

/// Scoped evaluation mode: greedy actions, no learning.
///
/// Restores the agent's epsilon and mode when dropped.
pub struct EvaluationGuard<'a> {
    agent: &'a mut QAgent,
    saved_epsilon: f64,
    saved_mode: AgentMode,
}

impl Deref for EvaluationGuard<'_> {
    type Target = QAgent;

    fn deref(&self) -> &QAgent {
        self.agent
    }
}

impl DerefMut for EvaluationGuard<'_> {
    fn deref_mut(&mut self) -> &mut QAgent {
        self.agent
    }
}

impl Drop for EvaluationGuard<'_> {
    fn drop(&mut self) {
        self.agent.epsilon = self.saved_epsilon;
        self.agent.mode = self.saved_mode;
    }
}
