//! Preference profiles: how one occupant group perceives temperature.
//!
//! A profile answers three questions about a temperature:
//!
//! - **comfort**: how satisfied the group is, in `[0, 1]`
//! - **sensation**: what the group would vote on the 7-point scale, in `[-3, 3]`
//! - **preference**: whether the group wants it cooler, warmer, or unchanged
//!
//! ```text
//!   comfort
//!   1.0 ┤━━╮
//!   0.8 ┤   ╲
//!       │    ╲
//!   0.4 ┤     ╲___
//!       │         ╲___
//!   0.1 ┤             ━━━━━━
//!       └──┬──┬──┬──┬──┬──▶ |t - optimal|
//!          0  1  2  3  4
//! ```

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Scale applied to `(t - optimal) * sensitivity` before rounding to a vote.
pub const SENSATION_SCALE: f64 = 0.5;

/// Standard deviation of the noise added to every sensation vote.
pub const SENSATION_NOISE_STD: f64 = 0.2;

/// Deviation (in degrees) beyond which a group asks for a change.
pub const PREFERENCE_DEADBAND: f64 = 1.0;

/// What a group would ask the thermostat to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    /// Temperature is more than one degree above optimal.
    WantsCooler,
    /// Within one degree of optimal.
    Neutral,
    /// Temperature is more than one degree below optimal.
    WantsWarmer,
}

impl Preference {
    /// Signed encoding: -1 cooler, 0 neutral, +1 warmer.
    pub fn signal(self) -> i8 {
        match self {
            Preference::WantsCooler => -1,
            Preference::Neutral => 0,
            Preference::WantsWarmer => 1,
        }
    }
}

/// Thermal preference parameters for one occupant group.
///
/// Immutable once built. The `off_optimum_penalty` multiplies comfort whenever
/// the temperature is not exactly optimal; `1.0` means no penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    optimal: f64,
    comfortable_range: (f64, f64),
    sensitivity: f64,
    off_optimum_penalty: f64,
}

impl PreferenceProfile {
    /// Create a profile without an off-optimum penalty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProfile`] if `low <= optimal <= high` does
    /// not hold or `sensitivity` is not positive.
    pub fn new(
        label: &str,
        optimal: f64,
        comfortable_range: (f64, f64),
        sensitivity: f64,
    ) -> Result<Self, CoreError> {
        let (low, high) = comfortable_range;
        let invalid = |reason: &str| CoreError::InvalidProfile {
            label: label.to_string(),
            reason: reason.to_string(),
        };

        if !optimal.is_finite() || !low.is_finite() || !high.is_finite() {
            return Err(invalid("temperatures must be finite"));
        }
        if !(low <= optimal && optimal <= high) {
            return Err(invalid("optimal temperature must lie in the comfortable range"));
        }
        if !(sensitivity > 0.0 && sensitivity.is_finite()) {
            return Err(invalid("sensitivity must be positive"));
        }

        Ok(Self {
            optimal,
            comfortable_range,
            sensitivity,
            off_optimum_penalty: 1.0,
        })
    }

    /// Set the multiplicative penalty applied whenever deviation is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProfile`] unless `penalty` is in `(0, 1]`.
    pub fn with_off_optimum_penalty(mut self, label: &str, penalty: f64) -> Result<Self, CoreError> {
        if !(penalty > 0.0 && penalty <= 1.0) {
            return Err(CoreError::InvalidProfile {
                label: label.to_string(),
                reason: format!("off-optimum penalty {penalty} must be in (0, 1]"),
            });
        }
        self.off_optimum_penalty = penalty;
        Ok(self)
    }

    /// Build from calibration constants already known to be consistent.
    pub(crate) fn from_parts(
        optimal: f64,
        comfortable_range: (f64, f64),
        sensitivity: f64,
        off_optimum_penalty: f64,
    ) -> Self {
        Self {
            optimal,
            comfortable_range,
            sensitivity,
            off_optimum_penalty,
        }
    }

    pub fn optimal(&self) -> f64 {
        self.optimal
    }

    pub fn comfortable_range(&self) -> (f64, f64) {
        self.comfortable_range
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn off_optimum_penalty(&self) -> f64 {
        self.off_optimum_penalty
    }

    /// Whether `temp` lies inside the comfortable range (inclusive).
    pub fn is_comfortable(&self, temp: f64) -> bool {
        let (low, high) = self.comfortable_range;
        (low..=high).contains(&temp)
    }

    /// Comfort score in `[0, 1]`, piecewise-linear in `|temp - optimal|`.
    pub fn comfort(&self, temp: f64) -> f64 {
        let deviation = (temp - self.optimal).abs();
        let mut score = base_comfort(deviation);
        if deviation > 0.0 {
            score *= self.off_optimum_penalty;
        }
        score.clamp(0.0, 1.0)
    }

    /// Noisy sensation vote in `[-3, 3]`.
    ///
    /// Two calls with the same temperature may disagree: the vote models the
    /// spread of individual responses, so it draws from `rng`.
    pub fn sensation<R: Rng + ?Sized>(&self, temp: f64, rng: &mut R) -> i8 {
        let noise: f64 = rng.sample::<f64, _>(StandardNormal) * SENSATION_NOISE_STD;
        let raw = (temp - self.optimal) * self.sensitivity * SENSATION_SCALE + noise;
        raw.round().clamp(-3.0, 3.0) as i8
    }

    /// Which way the group would like the temperature to move.
    pub fn preference(&self, temp: f64) -> Preference {
        if temp > self.optimal + PREFERENCE_DEADBAND {
            Preference::WantsCooler
        } else if temp < self.optimal - PREFERENCE_DEADBAND {
            Preference::WantsWarmer
        } else {
            Preference::Neutral
        }
    }
}

/// Comfort before any group-specific penalty.
fn base_comfort(deviation: f64) -> f64 {
    if deviation <= 1.0 {
        1.0 - 0.2 * deviation
    } else if deviation <= 2.0 {
        0.8 - 0.4 * (deviation - 1.0)
    } else if deviation <= 4.0 {
        0.4 - 0.15 * (deviation - 2.0)
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn profile() -> PreferenceProfile {
        PreferenceProfile::new("test", 22.0, (20.0, 24.0), 1.0).unwrap()
    }

    #[test]
    fn test_base_comfort_brackets() {
        assert!((base_comfort(0.0) - 1.0).abs() < 1e-12);
        assert!((base_comfort(1.0) - 0.8).abs() < 1e-12);
        assert!((base_comfort(2.0) - 0.4).abs() < 1e-12);
        assert!((base_comfort(3.0) - 0.25).abs() < 1e-12);
        assert!((base_comfort(4.0) - 0.1).abs() < 1e-12);
        assert!((base_comfort(9.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_penalty_skips_exact_optimum() {
        let p = profile().with_off_optimum_penalty("test", 0.9).unwrap();
        assert_eq!(p.comfort(22.0), 1.0);
        assert!((p.comfort(23.0) - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_preference_deadband() {
        let p = profile();
        assert_eq!(p.preference(22.0), Preference::Neutral);
        assert_eq!(p.preference(23.0), Preference::Neutral);
        assert_eq!(p.preference(23.01), Preference::WantsCooler);
        assert_eq!(p.preference(20.99), Preference::WantsWarmer);
        assert_eq!(Preference::WantsCooler.signal(), -1);
        assert_eq!(Preference::WantsWarmer.signal(), 1);
    }

    #[test]
    fn test_sensation_stays_on_scale() {
        let p = profile();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for t in [0.0, 10.0, 22.0, 30.0, 60.0] {
            for _ in 0..50 {
                let vote = p.sensation(t, &mut rng);
                assert!((-3..=3).contains(&vote));
            }
        }
        assert_eq!(p.sensation(60.0, &mut rng), 3);
        assert_eq!(p.sensation(-20.0, &mut rng), -3);
    }

    #[test]
    fn test_invalid_profiles_rejected() {
        assert!(PreferenceProfile::new("x", 30.0, (20.0, 24.0), 1.0).is_err());
        assert!(PreferenceProfile::new("x", 22.0, (20.0, 24.0), 0.0).is_err());
        assert!(profile().with_off_optimum_penalty("x", 1.5).is_err());
        assert!(profile().with_off_optimum_penalty("x", 0.0).is_err());
    }

    #[test]
    fn test_comfortable_range_inclusive() {
        let p = profile();
        assert!(p.is_comfortable(20.0));
        assert!(p.is_comfortable(24.0));
        assert!(!p.is_comfortable(24.5));
    }
}
