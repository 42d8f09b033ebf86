//! Training loop: repeated agent/environment interaction with learning.
//!
//! Each episode resets the environment, then runs a fixed number of steps.
//! Every step feeds the agent's shaped reward into its Bellman update, and
//! every episode appends one row of means to [`EpisodeMetrics`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::QAgent;
use crate::env::ThermalEnv;
use crate::GameError;

/// How often training progress is logged, in episodes.
const PROGRESS_INTERVAL: usize = 100;

/// Per-episode means, one entry per episode in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    /// Mean environment (blended) reward
    pub rewards: Vec<f64>,
    /// Mean primary-group comfort
    pub comfort_primary: Vec<f64>,
    /// Mean secondary-group comfort
    pub comfort_secondary: Vec<f64>,
    /// `|mean primary − mean secondary|` over the episode
    pub fairness_gaps: Vec<f64>,
    /// Mean temperature
    pub temperatures: Vec<f64>,
}

impl EpisodeMetrics {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Mean of the last `n` entries of a series (all of it if shorter).
    pub fn tail_mean(series: &[f64], n: usize) -> Option<f64> {
        let tail = &series[series.len().saturating_sub(n)..];
        if tail.is_empty() {
            None
        } else {
            Some(tail.iter().sum::<f64>() / tail.len() as f64)
        }
    }
}

#[derive(Default)]
struct EpisodeSums {
    reward: f64,
    comfort_primary: f64,
    comfort_secondary: f64,
    temperature: f64,
}

/// Train `agent` in `env` for `episodes × steps_per_episode` steps.
///
/// The agent's [`RewardShaping`](crate::agent::RewardShaping) decides which
/// reward reaches the update: blended, one group's comfort, or the
/// fairness-penalized mean. The metrics always record the environment's
/// blended reward so runs stay comparable.
///
/// # Errors
///
/// [`GameError::EmptyEpisode`] if episodes are requested with no steps.
/// Any error from the environment or the agent aborts training. The agent
/// keeps whatever it learned up to that point.
pub fn train_agent(
    agent: &mut QAgent,
    env: &mut ThermalEnv,
    episodes: usize,
    steps_per_episode: usize,
) -> Result<EpisodeMetrics, GameError> {
    if episodes > 0 && steps_per_episode == 0 {
        return Err(GameError::EmptyEpisode);
    }
    let shaping = agent.shaping().bind(env.config())?;
    if let Some(ratio) = shaping.isolating_ratio() {
        if env.population_ratio() != ratio {
            warn!(
                expected = ratio,
                actual = env.population_ratio(),
                "biased agent trained on a mixed population"
            );
        }
    }

    info!(
        variant = agent.shaping().name(),
        episodes,
        steps_per_episode,
        ratio = env.population_ratio(),
        "training started"
    );

    let mut metrics = EpisodeMetrics::default();
    let steps = steps_per_episode as f64;

    for episode in 0..episodes {
        let mut state = agent.discretize_state(env.reset());
        let mut sums = EpisodeSums::default();

        for _ in 0..steps_per_episode {
            let action = agent.choose_action(state)?;
            let transition = env.step(action)?;
            let next_state = agent.discretize_state(transition.observation);

            agent.update(state, action, shaping.reward(&transition), next_state)?;

            sums.reward += transition.reward;
            sums.comfort_primary += transition.info.primary.comfort;
            sums.comfort_secondary += transition.info.secondary.comfort;
            sums.temperature += transition.observation;
            state = next_state;
        }

        let comfort_primary = sums.comfort_primary / steps;
        let comfort_secondary = sums.comfort_secondary / steps;
        metrics.rewards.push(sums.reward / steps);
        metrics.comfort_primary.push(comfort_primary);
        metrics.comfort_secondary.push(comfort_secondary);
        metrics
            .fairness_gaps
            .push((comfort_primary - comfort_secondary).abs());
        metrics.temperatures.push(sums.temperature / steps);

        if (episode + 1) % PROGRESS_INTERVAL == 0 {
            debug!(
                episode = episode + 1,
                reward = EpisodeMetrics::tail_mean(&metrics.rewards, PROGRESS_INTERVAL),
                gap = EpisodeMetrics::tail_mean(&metrics.fairness_gaps, PROGRESS_INTERVAL),
                epsilon = agent.epsilon(),
                "training progress"
            );
        }
    }

    info!(
        variant = agent.shaping().name(),
        updates = agent.updates(),
        epsilon = agent.epsilon(),
        "training finished"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RewardShaping;
    use crate::config::{AgentConfig, EnvConfig};
    use thermal_core::ComfortModel;

    fn setup(shaping: RewardShaping, ratio: f64) -> (QAgent, ThermalEnv) {
        let env_cfg = EnvConfig::default();
        let agent = QAgent::new(AgentConfig::default().with_shaping(shaping), &env_cfg, 1).unwrap();
        let env = ThermalEnv::new(env_cfg, &ComfortModel::reference(), ratio, 2).unwrap();
        (agent, env)
    }

    #[test]
    fn test_metrics_one_row_per_episode() {
        let (mut agent, mut env) = setup(RewardShaping::Blended, 0.5);
        let metrics = train_agent(&mut agent, &mut env, 12, 20).unwrap();

        assert_eq!(metrics.len(), 12);
        assert_eq!(metrics.comfort_primary.len(), 12);
        assert_eq!(metrics.fairness_gaps.len(), 12);
        assert_eq!(metrics.temperatures.len(), 12);
        assert_eq!(agent.updates(), 240);

        for i in 0..12 {
            let gap = (metrics.comfort_primary[i] - metrics.comfort_secondary[i]).abs();
            assert!((metrics.fairness_gaps[i] - gap).abs() < 1e-12);
            assert!((15.0..=30.0).contains(&metrics.temperatures[i]));
        }
    }

    #[test]
    fn test_zero_episodes() {
        let (mut agent, mut env) = setup(RewardShaping::Fairness { weight: 0.6 }, 0.5);
        let metrics = train_agent(&mut agent, &mut env, 0, 100).unwrap();
        assert!(metrics.is_empty());
        assert_eq!(agent.updates(), 0);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let (mut agent, mut env) = setup(RewardShaping::Blended, 0.5);
        assert!(matches!(
            train_agent(&mut agent, &mut env, 3, 0),
            Err(GameError::EmptyEpisode)
        ));
        assert_eq!(agent.updates(), 0);

        // No episodes, no steps: nothing to record, nothing wrong
        assert!(train_agent(&mut agent, &mut env, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_biased_unknown_group_aborts() {
        let (mut agent, mut env) = setup(
            RewardShaping::Biased {
                group: "robot".into(),
            },
            1.0,
        );
        assert!(train_agent(&mut agent, &mut env, 1, 1).is_err());
    }

    #[test]
    fn test_tail_mean() {
        assert_eq!(EpisodeMetrics::tail_mean(&[], 3), None);
        assert_eq!(EpisodeMetrics::tail_mean(&[1.0, 2.0, 3.0, 5.0], 2), Some(4.0));
        assert_eq!(EpisodeMetrics::tail_mean(&[2.0], 10), Some(2.0));
    }
}
