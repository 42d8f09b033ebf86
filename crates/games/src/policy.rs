//! Policies: Observation → Action mappings, and the Q-table behind them.
//!
//! A policy decides what action to take given an observation. The tabular
//! agents in this crate observe a discretized state index and answer with an
//! action index, so their policy is `usize → usize` backed by a [`QTable`].
//!
//! ```text
//!          ┌──────────┐
//!  state ─▶│  Policy  │─▶ action
//!          └────┬─────┘
//!               │ reads
//!          ┌────▼─────┐
//!          │  QTable  │  states × actions
//!          └──────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::GameError;

/// A policy maps observations to actions.
///
/// `act` takes `&mut self` because stochastic policies own their random
/// stream.
pub trait Policy<Obs, Act> {
    /// Select an action given an observation.
    fn act(&mut self, obs: &Obs) -> Result<Act, GameError>;
}

// ============================================================================
// Q-Table
// ============================================================================

/// Dense `states × actions` table of action values, zero-initialized.
///
/// Indices are checked on every access; an out-of-range index is a caller
/// bug and surfaces as an error rather than a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: Vec<f64>,
    states: usize,
    actions: usize,
}

impl QTable {
    /// Create a zero-filled table.
    pub fn new(states: usize, actions: usize) -> Self {
        Self {
            values: vec![0.0; states * actions],
            states,
            actions,
        }
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    fn check_state(&self, state: usize) -> Result<(), GameError> {
        if state < self.states {
            Ok(())
        } else {
            Err(GameError::StateOutOfBounds {
                state,
                bins: self.states,
            })
        }
    }

    fn index(&self, state: usize, action: usize) -> Result<usize, GameError> {
        self.check_state(state)?;
        if action >= self.actions {
            return Err(GameError::InvalidAction {
                action,
                count: self.actions,
            });
        }
        Ok(state * self.actions + action)
    }

    /// Value of `(state, action)`.
    pub fn value(&self, state: usize, action: usize) -> Result<f64, GameError> {
        Ok(self.values[self.index(state, action)?])
    }

    /// Overwrite the value of `(state, action)`.
    pub fn set(&mut self, state: usize, action: usize, value: f64) -> Result<(), GameError> {
        let idx = self.index(state, action)?;
        self.values[idx] = value;
        Ok(())
    }

    /// All action values for a state.
    pub fn row(&self, state: usize) -> Result<&[f64], GameError> {
        self.check_state(state)?;
        let start = state * self.actions;
        Ok(&self.values[start..start + self.actions])
    }

    /// Highest action value in a state.
    pub fn max_value(&self, state: usize) -> Result<f64, GameError> {
        Ok(self
            .row(state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Greedy action for a state.
    ///
    /// Ties go to the lowest action index: the scan keeps the first maximum
    /// it finds.
    pub fn best_action(&self, state: usize) -> Result<usize, GameError> {
        let mut best_action = 0;
        let mut best_value = f64::NEG_INFINITY;

        for (action, &value) in self.row(state)?.iter().enumerate() {
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        Ok(best_action)
    }

    /// Tabular Bellman update; returns the new value.
    ///
    /// `Q[s,a] += α · (r + γ · max Q[s',·] − Q[s,a])`
    pub fn bellman_update(
        &mut self,
        state: usize,
        action: usize,
        reward: f64,
        next_state: usize,
        learning_rate: f64,
        discount: f64,
    ) -> Result<f64, GameError> {
        let idx = self.index(state, action)?;
        let target = reward + discount * self.max_value(next_state)?;
        let current = self.values[idx];
        let updated = current + learning_rate * (target - current);
        self.values[idx] = updated;
        Ok(updated)
    }

    /// Greedy action for every state, with the same tie-break as
    /// [`QTable::best_action`].
    pub fn greedy_policy(&self) -> Vec<usize> {
        (0..self.states)
            .map(|s| self.best_action(s).unwrap_or(0))
            .collect()
    }
}
