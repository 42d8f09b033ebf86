//! The comfort model: a registry of group label → [`PreferenceProfile`].
//!
//! Every query names the group it is about. Groups are plain string labels,
//! so adding a third population is a matter of registering another profile.
//!
//! # Example
//!
//! ```rust
//! use thermal_core::{ComfortModel, Preference};
//!
//! let model = ComfortModel::reference();
//!
//! // At 22°C the cooler-preferring group is perfectly comfortable...
//! assert_eq!(model.comfort_score(22.0, "male").unwrap(), 1.0);
//!
//! // ...while the warmer-preferring group is two degrees off and penalized.
//! let female = model.comfort_score(22.0, "female").unwrap();
//! assert!((female - 0.36).abs() < 1e-9);
//! assert_eq!(model.preference_signal(22.0, "female").unwrap(), Preference::WantsWarmer);
//! ```

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::profile::{Preference, PreferenceProfile};
use crate::CoreError;

/// Label of the cooler-preferring group in the reference configuration.
pub const PRIMARY_GROUP: &str = "male";

/// Label of the warmer-preferring group in the reference configuration.
pub const SECONDARY_GROUP: &str = "female";

/// Maps occupant groups to their thermal preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComfortModel {
    profiles: BTreeMap<String, PreferenceProfile>,
}

impl ComfortModel {
    /// An empty model with no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// The calibrated two-group model.
    ///
    /// `male`: optimal 22.0, range 20–24, sensitivity 1.0.
    /// `female`: optimal 24.0, range 22–26, sensitivity 1.2, comfort × 0.9
    /// whenever off optimum.
    pub fn reference() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            PRIMARY_GROUP.to_string(),
            PreferenceProfile::from_parts(22.0, (20.0, 24.0), 1.0, 1.0),
        );
        profiles.insert(
            SECONDARY_GROUP.to_string(),
            PreferenceProfile::from_parts(24.0, (22.0, 26.0), 1.2, 0.9),
        );
        Self { profiles }
    }

    /// Register (or replace) a group's profile.
    pub fn with_profile(mut self, label: impl Into<String>, profile: PreferenceProfile) -> Self {
        self.profiles.insert(label.into(), profile);
        self
    }

    /// Look up a group's profile.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownGroup`] if no profile is registered for `label`.
    pub fn profile(&self, label: &str) -> Result<&PreferenceProfile, CoreError> {
        self.profiles
            .get(label)
            .ok_or_else(|| CoreError::UnknownGroup {
                label: label.to_string(),
            })
    }

    /// Registered group labels, in sorted order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Comfort in `[0, 1]` for `group` at `temp`.
    pub fn comfort_score(&self, temp: f64, group: &str) -> Result<f64, CoreError> {
        Ok(self.profile(group)?.comfort(temp))
    }

    /// Noisy sensation vote in `[-3, 3]` for `group` at `temp`.
    pub fn sensation_vote<R: Rng + ?Sized>(
        &self,
        temp: f64,
        group: &str,
        rng: &mut R,
    ) -> Result<i8, CoreError> {
        Ok(self.profile(group)?.sensation(temp, rng))
    }

    /// Which way `group` wants the temperature to move.
    pub fn preference_signal(&self, temp: f64, group: &str) -> Result<Preference, CoreError> {
        Ok(self.profile(group)?.preference(temp))
    }
}
