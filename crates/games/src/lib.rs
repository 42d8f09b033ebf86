//! # Thermal Games
//!
//! This crate trains tabular Q-learning thermostats for a space shared by two
//! occupant groups, and measures how fairly each controller treats them.
//!
//! ## Core Components
//!
//! - [`ThermalEnv`]: temperature dynamics, blended reward, per-group readings
//! - [`QAgent`]: epsilon-greedy Q-learner with a [`RewardShaping`] strategy
//! - [`train_agent`]: episodes of interaction with learning
//! - [`evaluate_agent`]: greedy runs summarized into comfort, fairness and
//!   accuracy statistics
//! - [`compare_variants`]: biased, hybrid and fairness-aware controllers side
//!   by side, run in parallel
//!
//! ## Example
//!
//! ```rust
//! use thermal_core::ComfortModel;
//! use thermal_games::config::{AgentConfig, EnvConfig};
//! use thermal_games::{evaluate_agent, train_agent, QAgent, RewardShaping, ThermalEnv};
//!
//! let model = ComfortModel::reference();
//! let env_cfg = EnvConfig::default();
//!
//! let shaping = RewardShaping::Fairness { weight: 0.6 };
//! let mut agent = QAgent::new(AgentConfig::default().with_shaping(shaping), &env_cfg, 7).unwrap();
//! let mut env = ThermalEnv::new(env_cfg, &model, 0.5, 11).unwrap();
//!
//! let history = train_agent(&mut agent, &mut env, 50, 50).unwrap();
//! assert_eq!(history.len(), 50);
//!
//! let summary = evaluate_agent(&mut agent, &mut env, 0.5, 5, 50).unwrap();
//! assert!((0.0..=1.0).contains(&summary.overall_accuracy));
//! ```
//!
//! ## Swappable Reward
//!
//! ```text
//!          ┌──────────┐  transition   ┌───────────────┐  reward  ┌──────────┐
//!   Act ──▶│   Env    │──────────────▶│ RewardShaping │─────────▶│  QTable  │
//!          └──────────┘               └───────────────┘          └──────────┘
//! ```
//!
//! Swap the shaping → different controller, same table and update rule.

pub mod agent;
pub mod config;
pub mod env;
mod error;
pub mod evaluate;
pub mod experiment;
pub mod policy;
pub mod rollout;
pub mod train;

pub use agent::{calculate_fairness_reward, AgentMode, EvaluationGuard, QAgent, RewardShaping};
pub use config::{AgentConfig, EnvConfig, ExperimentConfig};
pub use env::{Env, GroupReading, StepInfo, ThermalEnv, Transition, ACTIONS};
pub use error::GameError;
pub use evaluate::{evaluate_agent, EvaluationRecord, EvaluationSummary};
pub use experiment::{
    compare_variants, relative_improvement, run_variant, sweep_population_ratios, AgentVariant,
    VariantComparison, VariantReport,
};
pub use policy::{Policy, QTable};
pub use rollout::{rollout, Step, Trajectory};
pub use train::{train_agent, EpisodeMetrics};
