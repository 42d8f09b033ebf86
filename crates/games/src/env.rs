//! Environments: temperature dynamics and occupant feedback.
//!
//! An environment defines how the world evolves in response to actions.
//! Training and evaluation loops only see the [`Env`] trait; the thermal
//! dynamics live in [`ThermalEnv`].
//!
//! ```text
//!        ┌──────────────┐
//!  Act ─▶│  ThermalEnv  │─▶ (temperature', blended reward, group readings)
//!        │  temperature │
//!        │  ratio r     │
//!        └──────────────┘
//! ```
//!
//! The blended reward is `r · comfort(primary) + (1 − r) · comfort(secondary)`,
//! minus a fixed penalty when the new temperature leaves the acceptable band.
//! Per-group readings travel alongside it so that agents with their own
//! reward shaping never need to reverse-engineer the blend.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use thermal_core::{ComfortModel, Preference, PreferenceProfile};

use crate::config::EnvConfig;
use crate::GameError;

/// Temperature deltas, indexed by action.
pub const ACTIONS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Environment transition result.
#[derive(Debug, Clone)]
pub struct Transition<Obs, Info> {
    /// Observation after the action
    pub observation: Obs,
    /// Reward received
    pub reward: f64,
    /// Diagnostics that are not part of the reward
    pub info: Info,
}

/// An environment defines world dynamics.
///
/// Episodes have a fixed length chosen by the caller, so there is no
/// terminal flag.
pub trait Env {
    /// Observation type (what the agent sees)
    type Obs;
    /// Action type
    type Act;
    /// Per-step diagnostics
    type Info;

    /// Start a new episode and return the first observation.
    fn reset(&mut self) -> Self::Obs;

    /// Apply an action.
    fn step(&mut self, action: &Self::Act) -> Result<Transition<Self::Obs, Self::Info>, GameError>;

    /// Size of the action set.
    fn action_count(&self) -> usize;
}

// ============================================================================
// Thermal Environment
// ============================================================================

/// One group's response to a temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupReading {
    /// Comfort in `[0, 1]`
    pub comfort: f64,
    /// Sensation vote in `[-3, 3]`
    pub sensation: i8,
    /// Requested direction of change
    pub preference: Preference,
}

/// Readings for both populations after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub primary: GroupReading,
    pub secondary: GroupReading,
}

/// Result of [`ThermalEnv::step`].
pub type ThermalTransition = Transition<f64, StepInfo>;

/// A single space shared by two occupant groups.
///
/// Owns its current temperature, its population mix, and the random stream
/// used for reset sampling, action noise and sensation votes.
#[derive(Debug, Clone)]
pub struct ThermalEnv {
    config: EnvConfig,
    primary: PreferenceProfile,
    secondary: PreferenceProfile,
    ratio: f64,
    temperature: f64,
    rng: ChaCha8Rng,
}

impl ThermalEnv {
    /// Create an environment for the configured pair of groups.
    ///
    /// `ratio` is the fraction of occupants belonging to the primary group.
    ///
    /// # Errors
    ///
    /// Invalid config, a ratio outside `[0, 1]`, or a group the model does
    /// not know.
    pub fn new(
        config: EnvConfig,
        model: &ComfortModel,
        ratio: f64,
        seed: u64,
    ) -> Result<Self, GameError> {
        config.validate()?;
        check_ratio(ratio)?;

        let primary = model.profile(&config.primary_group)?.clone();
        let secondary = model.profile(&config.secondary_group)?.clone();
        let (low, high) = config.reset_range;

        Ok(Self {
            primary,
            secondary,
            ratio,
            temperature: (low + high) / 2.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Fraction of occupants in the primary group.
    pub fn population_ratio(&self) -> f64 {
        self.ratio
    }

    /// Change the population mix.
    pub fn set_population_ratio(&mut self, ratio: f64) -> Result<(), GameError> {
        check_ratio(ratio)?;
        self.ratio = ratio;
        Ok(())
    }

    /// Force the current temperature, clamped to the bounds.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(self.config.min_temp, self.config.max_temp);
    }

    /// Temperature delta for an action index.
    pub fn action_delta(action: usize) -> Result<f64, GameError> {
        ACTIONS
            .get(action)
            .copied()
            .ok_or(GameError::InvalidAction {
                action,
                count: ACTIONS.len(),
            })
    }

    /// Draw a fresh temperature from the reset range.
    pub fn reset(&mut self) -> f64 {
        let (low, high) = self.config.reset_range;
        self.temperature = if low < high {
            self.rng.gen_range(low..high)
        } else {
            low
        };
        self.temperature
    }

    /// Apply an action, returning the new temperature, blended reward and
    /// both groups' readings.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidAction`] if `action` is not an index into [`ACTIONS`].
    pub fn step(&mut self, action: usize) -> Result<ThermalTransition, GameError> {
        let delta = Self::action_delta(action)?;
        let noise: f64 = self.rng.sample::<f64, _>(StandardNormal) * self.config.action_noise_std;

        self.set_temperature(self.temperature + delta + noise);
        let temp = self.temperature;

        let info = StepInfo {
            primary: read(&self.primary, temp, &mut self.rng),
            secondary: read(&self.secondary, temp, &mut self.rng),
        };

        let mut reward = self.ratio * info.primary.comfort + (1.0 - self.ratio) * info.secondary.comfort;
        let (band_low, band_high) = self.config.acceptable_band;
        if !(band_low..=band_high).contains(&temp) {
            reward -= self.config.out_of_band_penalty;
        }

        Ok(Transition {
            observation: temp,
            reward,
            info,
        })
    }
}

impl Env for ThermalEnv {
    type Obs = f64;
    type Act = usize;
    type Info = StepInfo;

    fn reset(&mut self) -> f64 {
        ThermalEnv::reset(self)
    }

    fn step(&mut self, action: &usize) -> Result<ThermalTransition, GameError> {
        ThermalEnv::step(self, *action)
    }

    fn action_count(&self) -> usize {
        ACTIONS.len()
    }
}

fn check_ratio(ratio: f64) -> Result<(), GameError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(GameError::InvalidRatio { ratio })
    }
}

fn read(profile: &PreferenceProfile, temp: f64, rng: &mut ChaCha8Rng) -> GroupReading {
    GroupReading {
        comfort: profile.comfort(temp),
        sensation: profile.sensation(temp, rng),
        preference: profile.preference(temp),
    }
}
