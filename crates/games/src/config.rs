//! Run configuration: environment, agent and experiment parameters.
//!
//! Every struct has reference defaults, `with_*` builders, and a
//! `from_json` loader. Missing JSON fields fall back to the defaults, so a
//! document only needs to name what it changes:
//!
//! ```rust
//! use thermal_games::config::AgentConfig;
//!
//! let cfg = AgentConfig::from_json(r#"{ "learning_rate": 0.2 }"#).unwrap();
//! assert_eq!(cfg.learning_rate, 0.2);
//! assert_eq!(cfg.state_bins, 50);
//! ```

use serde::{Deserialize, Serialize};
use thermal_core::{PRIMARY_GROUP, SECONDARY_GROUP};

use crate::agent::RewardShaping;
use crate::env::ACTIONS;
use crate::GameError;

fn invalid(reason: impl Into<String>) -> GameError {
    GameError::InvalidConfig {
        reason: reason.into(),
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Physical parameters of the controlled space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Hard lower bound on temperature.
    pub min_temp: f64,
    /// Hard upper bound on temperature.
    pub max_temp: f64,
    /// Range `reset` samples from.
    pub reset_range: (f64, f64),
    /// Outside this band the blended reward is penalized.
    pub acceptable_band: (f64, f64),
    /// Subtracted from the blended reward outside the acceptable band.
    pub out_of_band_penalty: f64,
    /// Std of the Gaussian noise added to every action's delta.
    pub action_noise_std: f64,
    /// Group the population ratio refers to.
    pub primary_group: String,
    /// The remaining `1 - ratio` of occupants.
    pub secondary_group: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            min_temp: 15.0,
            max_temp: 30.0,
            reset_range: (18.0, 28.0),
            acceptable_band: (18.0, 28.0),
            out_of_band_penalty: 0.3,
            action_noise_std: 0.1,
            primary_group: PRIMARY_GROUP.to_string(),
            secondary_group: SECONDARY_GROUP.to_string(),
        }
    }
}

impl EnvConfig {
    /// Set the hard temperature bounds.
    pub fn with_bounds(mut self, min_temp: f64, max_temp: f64) -> Self {
        self.min_temp = min_temp;
        self.max_temp = max_temp;
        self
    }

    /// Set the range `reset` draws from.
    pub fn with_reset_range(mut self, low: f64, high: f64) -> Self {
        self.reset_range = (low, high);
        self
    }

    /// Set the two populations sharing the space.
    pub fn with_groups(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_group = primary.into();
        self.secondary_group = secondary.into();
        self
    }

    /// Set the action noise standard deviation.
    pub fn with_action_noise(mut self, std: f64) -> Self {
        self.action_noise_std = std;
        self
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that bounds and sub-ranges nest properly.
    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.min_temp.is_finite() && self.max_temp.is_finite() && self.min_temp < self.max_temp)
        {
            return Err(invalid("min_temp must be below max_temp"));
        }
        let inside = |(low, high): (f64, f64)| {
            self.min_temp <= low && low <= high && high <= self.max_temp
        };
        if !inside(self.reset_range) {
            return Err(invalid("reset_range must lie within the temperature bounds"));
        }
        if !inside(self.acceptable_band) {
            return Err(invalid("acceptable_band must lie within the temperature bounds"));
        }
        if !(self.action_noise_std >= 0.0 && self.action_noise_std.is_finite()) {
            return Err(invalid("action_noise_std must be non-negative"));
        }
        if self.out_of_band_penalty < 0.0 {
            return Err(invalid("out_of_band_penalty must be non-negative"));
        }
        if self.primary_group == self.secondary_group {
            return Err(invalid("primary and secondary groups must differ"));
        }
        Ok(())
    }
}

// ============================================================================
// Agent
// ============================================================================

/// Hyperparameters of a tabular Q-learning agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of temperature buckets.
    pub state_bins: usize,
    /// Must equal the environment's action set size.
    pub action_count: usize,
    /// Step size α of the Bellman update.
    pub learning_rate: f64,
    /// Discount γ.
    pub discount: f64,
    pub initial_epsilon: f64,
    pub min_epsilon: f64,
    /// Multiplier applied to epsilon every `decay_interval` updates.
    pub epsilon_decay: f64,
    pub decay_interval: u64,
    /// Which reward the agent learns from.
    pub shaping: RewardShaping,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_bins: 50,
            action_count: ACTIONS.len(),
            learning_rate: 0.1,
            discount: 0.95,
            initial_epsilon: 1.0,
            min_epsilon: 0.01,
            epsilon_decay: 0.995,
            decay_interval: 500,
            shaping: RewardShaping::Blended,
        }
    }
}

impl AgentConfig {
    /// Set the reward-shaping strategy.
    pub fn with_shaping(mut self, shaping: RewardShaping) -> Self {
        self.shaping = shaping;
        self
    }

    /// Set learning rate and discount.
    pub fn with_learning(mut self, learning_rate: f64, discount: f64) -> Self {
        self.learning_rate = learning_rate;
        self.discount = discount;
        self
    }

    /// Set the exploration schedule.
    pub fn with_exploration(
        mut self,
        initial: f64,
        min: f64,
        decay: f64,
        decay_interval: u64,
    ) -> Self {
        self.initial_epsilon = initial;
        self.min_epsilon = min;
        self.epsilon_decay = decay;
        self.decay_interval = decay_interval;
        self
    }

    /// Set the number of temperature buckets.
    pub fn with_state_bins(mut self, state_bins: usize) -> Self {
        self.state_bins = state_bins;
        self
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.state_bins < 2 {
            return Err(invalid("state_bins must be at least 2"));
        }
        if self.action_count != ACTIONS.len() {
            return Err(invalid(format!(
                "action_count must be {} (fixed action set)",
                ACTIONS.len()
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(invalid("learning_rate must be in (0, 1]"));
        }
        if !(0.0..1.0).contains(&self.discount) {
            return Err(invalid("discount must be in [0, 1)"));
        }
        if !(0.0 <= self.min_epsilon
            && self.min_epsilon <= self.initial_epsilon
            && self.initial_epsilon <= 1.0)
        {
            return Err(invalid("epsilons must satisfy 0 <= min <= initial <= 1"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(invalid("epsilon_decay must be in (0, 1]"));
        }
        if self.decay_interval == 0 {
            return Err(invalid("decay_interval must be positive"));
        }
        if let RewardShaping::Fairness { weight } = self.shaping {
            if !(weight >= 0.0 && weight.is_finite()) {
                return Err(invalid("fairness weight must be non-negative"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Experiment
// ============================================================================

/// Budget and seeds for comparing the three reward-shaping variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Root seed; every run derives its own streams from it.
    pub seed: u64,
    pub train_episodes: usize,
    pub steps_per_episode: usize,
    pub eval_episodes: usize,
    pub eval_steps: usize,
    /// Weight used by the fairness-aware variant.
    pub fairness_weight: f64,
    /// Group the biased variant serves.
    pub biased_group: String,
    /// Shared hyperparameters; `shaping` is overridden per variant.
    pub agent: AgentConfig,
    pub env: EnvConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            train_episodes: 2000,
            steps_per_episode: 100,
            eval_episodes: 100,
            eval_steps: 100,
            fairness_weight: 0.6,
            biased_group: PRIMARY_GROUP.to_string(),
            agent: AgentConfig::default(),
            env: EnvConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set training and evaluation budgets.
    pub fn with_budget(
        mut self,
        train_episodes: usize,
        steps_per_episode: usize,
        eval_episodes: usize,
        eval_steps: usize,
    ) -> Self {
        self.train_episodes = train_episodes;
        self.steps_per_episode = steps_per_episode;
        self.eval_episodes = eval_episodes;
        self.eval_steps = eval_steps;
        self
    }

    pub fn with_fairness_weight(mut self, weight: f64) -> Self {
        self.fairness_weight = weight;
        self
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        self.env.validate()?;
        self.agent.validate()?;
        if self.eval_episodes == 0 || self.eval_steps == 0 {
            return Err(invalid("evaluation budget must be non-zero"));
        }
        if !(self.fairness_weight >= 0.0 && self.fairness_weight.is_finite()) {
            return Err(invalid("fairness_weight must be non-negative"));
        }
        if self.biased_group != self.env.primary_group
            && self.biased_group != self.env.secondary_group
        {
            return Err(invalid(format!(
                "biased_group {} is not one of the environment's groups",
                self.biased_group
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EnvConfig::default().validate().is_ok());
        assert!(AgentConfig::default().validate().is_ok());
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = ExperimentConfig::from_json(
            r#"{ "seed": 7, "agent": { "shaping": { "kind": "fairness", "weight": 0.3 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.agent.shaping, RewardShaping::Fairness { weight: 0.3 });
        assert_eq!(cfg.env, EnvConfig::default());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = AgentConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { .. }));
    }

    #[test]
    fn test_validation_failures() {
        assert!(EnvConfig::default().with_bounds(30.0, 15.0).validate().is_err());
        assert!(EnvConfig::default()
            .with_reset_range(10.0, 20.0)
            .validate()
            .is_err());
        assert!(EnvConfig::default()
            .with_groups("male", "male")
            .validate()
            .is_err());
        assert!(AgentConfig::default()
            .with_exploration(0.1, 0.5, 0.99, 10)
            .validate()
            .is_err());
        assert!(AgentConfig::default()
            .with_learning(0.1, 1.0)
            .validate()
            .is_err());

        let mut wrong_actions = AgentConfig::default();
        wrong_actions.action_count = 4;
        assert!(wrong_actions.validate().is_err());

        let mut unknown_bias = ExperimentConfig::default();
        unknown_bias.biased_group = "robot".to_string();
        assert!(unknown_bias.validate().is_err());
    }
}
