//! Rollout: Execute a policy in an environment.
//!
//! The rollout function combines a policy and an environment to produce a
//! trajectory. It never learns; training interleaves updates with steps and
//! lives in [`crate::train`].
//!
//! ```text
//!    ┌──────────┐     ┌──────────┐
//!    │  Policy  │────▶│   Env    │
//!    └──────────┘     └──────────┘
//!         │                │
//!         ▼                ▼
//!    ┌──────────────────────────────┐
//!    │          Trajectory          │
//!    │ [(o₀,a₀,r₀,i₀), (o₁,a₁,r₁,i₁)…]│
//!    └──────────────────────────────┘
//! ```

use crate::env::{Env, Transition};
use crate::policy::Policy;
use crate::GameError;

/// A single step in a trajectory.
#[derive(Debug, Clone)]
pub struct Step<Obs, Act, Info> {
    /// Observation the action was chosen from
    pub observation: Obs,
    /// Action taken
    pub action: Act,
    /// Reward received
    pub reward: f64,
    /// Observation after the action
    pub next_observation: Obs,
    /// Environment diagnostics for this step
    pub info: Info,
}

/// A trajectory is a sequence of steps from a rollout.
#[derive(Debug, Clone)]
pub struct Trajectory<Obs, Act, Info> {
    /// The steps in the trajectory
    pub steps: Vec<Step<Obs, Act, Info>>,
}

impl<Obs, Act, Info> Trajectory<Obs, Act, Info> {
    /// Create a new empty trajectory.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the trajectory.
    pub fn push(&mut self, step: Step<Obs, Act, Info>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<Obs, Act, Info> Default for Trajectory<Obs, Act, Info> {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute a policy in an environment for exactly `steps` steps.
///
/// Resets the environment first. Any error from the policy or the
/// environment aborts the rollout and is returned.
pub fn rollout<P, E>(
    policy: &mut P,
    env: &mut E,
    steps: usize,
) -> Result<Trajectory<E::Obs, E::Act, E::Info>, GameError>
where
    E: Env,
    E::Obs: Clone,
    P: Policy<E::Obs, E::Act>,
{
    let mut trajectory = Trajectory::new();
    let mut obs = env.reset();

    for _ in 0..steps {
        let action = policy.act(&obs)?;
        let Transition {
            observation: next_obs,
            reward,
            info,
        } = env.step(&action)?;

        trajectory.push(Step {
            observation: obs,
            action,
            reward,
            next_observation: next_obs.clone(),
            info,
        });
        obs = next_obs;
    }

    Ok(trajectory)
}
