//! # Core - Thermal Comfort Foundations
//!
//! This crate provides the comfort model shared by the environment and the
//! learning agents:
//!
//! - **Profiles**: per-group optimal temperature, comfortable range,
//!   sensitivity and off-optimum penalty
//! - **Comfort model**: a label → profile registry answering comfort,
//!   sensation and preference queries
//! - **Errors**: contract violations (unknown group, inconsistent profile)
//!
//! ## Design Philosophy
//!
//! The model is a pure function library. The only non-determinism is the
//! sensation vote's noise, and the caller owns the random stream it draws
//! from, so a seeded run is reproducible end to end.

pub mod comfort;
pub mod error;
pub mod profile;

pub use comfort::{ComfortModel, PRIMARY_GROUP, SECONDARY_GROUP};
pub use error::CoreError;
pub use profile::{Preference, PreferenceProfile, SENSATION_NOISE_STD, SENSATION_SCALE};
