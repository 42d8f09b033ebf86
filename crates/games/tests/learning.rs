//! Learning-core tests: discretization, Bellman updates, exploration
//! schedule, and evaluation-mode scoping.

use std::panic::{self, AssertUnwindSafe};

use thermal_core::ComfortModel;
use thermal_games::config::{AgentConfig, EnvConfig};
use thermal_games::{evaluate_agent, AgentMode, GameError, QAgent, ThermalEnv, ACTIONS};

fn agent(config: AgentConfig) -> QAgent {
    QAgent::new(config, &EnvConfig::default(), 5).unwrap()
}

// ============================================================================
// Discretization
// ============================================================================

#[test]
fn discretize_monotone_and_in_range() {
    let agent = agent(AgentConfig::default());
    let bins = agent.config().state_bins;
    let mut previous = 0;
    for i in 0..=4000 {
        let t = 0.0 + i as f64 * 0.01;
        let s = agent.discretize_state(t);
        assert!(s < bins);
        assert!(s >= previous, "not monotone at {t}");
        previous = s;
    }
    assert_eq!(agent.discretize_state(0.0), 0);
    assert_eq!(agent.discretize_state(40.0), bins - 1);
}

// ============================================================================
// Environment bounds
// ============================================================================

#[test]
fn step_always_within_bounds() {
    let mut env = ThermalEnv::new(EnvConfig::default(), &ComfortModel::reference(), 0.5, 17).unwrap();
    env.reset();
    for i in 0..2000 {
        // Long pushes in one direction, then the other
        let action = if (i / 100) % 2 == 0 { ACTIONS.len() - 1 } else { 0 };
        let trans = env.step(action).unwrap();
        assert!((15.0..=30.0).contains(&trans.observation));
        assert!((0.0..=1.0).contains(&trans.info.primary.comfort));
        assert!((-3..=3).contains(&trans.info.secondary.sensation));
    }
}

// ============================================================================
// Bellman Update
// ============================================================================

#[test]
fn update_moves_toward_target_by_alpha() {
    let cfg = AgentConfig::default().with_learning(0.25, 0.9);
    let mut agent = agent(cfg);

    // Give state 7 a nonzero value; state 8 stays untouched.
    agent.update(7, 3, 2.0, 8).unwrap();
    let next_max = agent.table().max_value(8).unwrap();
    let before = agent.table().value(4, 1).unwrap();

    agent.update(4, 1, 1.0, 7).unwrap();
    let target = 1.0 + 0.9 * agent.table().max_value(7).unwrap();
    let after = agent.table().value(4, 1).unwrap();

    assert_eq!(next_max, 0.0);
    assert!((after - (before + 0.25 * (target - before))).abs() < 1e-12);
    assert!((target - after).abs() < (target - before).abs());
}

#[test]
fn constant_reward_self_loop_converges() {
    let cfg = AgentConfig::default()
        .with_learning(0.1, 0.95)
        .with_exploration(0.0, 0.0, 1.0, 500);
    let mut agent = agent(cfg);

    for _ in 0..10_000 {
        agent.update(10, 2, 1.0, 10).unwrap();
    }

    let value = agent.table().value(10, 2).unwrap();
    assert!((value - 1.0 / (1.0 - 0.95)).abs() < 1e-6, "value = {value}");
}

#[test]
fn update_rejects_bad_indices() {
    let mut agent = agent(AgentConfig::default());
    assert!(matches!(
        agent.update(50, 0, 1.0, 0),
        Err(GameError::StateOutOfBounds { .. })
    ));
    assert!(matches!(
        agent.update(0, 5, 1.0, 0),
        Err(GameError::InvalidAction { .. })
    ));
    assert!(matches!(
        agent.update(0, 0, 1.0, 99),
        Err(GameError::StateOutOfBounds { .. })
    ));
}

// ============================================================================
// Exploration Schedule
// ============================================================================

#[test]
fn epsilon_never_below_floor() {
    let cfg = AgentConfig::default().with_exploration(1.0, 0.05, 0.5, 3);
    let mut agent = agent(cfg);

    let mut previous = agent.epsilon();
    for n in 1..=300u64 {
        agent.update(0, 0, 0.0, 1).unwrap();
        let eps = agent.epsilon();
        assert!(eps >= 0.05 && eps <= 1.0);
        if n % 3 != 0 {
            assert_eq!(eps, previous, "decayed off-interval at update {n}");
        }
        previous = eps;
    }
    assert_eq!(agent.epsilon(), 0.05);
}

// ============================================================================
// Evaluation Mode
// ============================================================================

#[test]
fn evaluation_restores_epsilon_on_success() {
    let mut agent = agent(AgentConfig::default());
    for _ in 0..1000 {
        agent.update(0, 0, 0.5, 0).unwrap();
    }
    let before = agent.epsilon();

    let mut env = ThermalEnv::new(EnvConfig::default(), &ComfortModel::reference(), 0.5, 3).unwrap();
    evaluate_agent(&mut agent, &mut env, 0.5, 2, 10).unwrap();

    assert_eq!(agent.epsilon(), before);
    assert_eq!(agent.mode(), AgentMode::Training);
    assert_eq!(agent.updates(), 1000);
}

#[test]
fn evaluation_restores_epsilon_on_failure() {
    let mut agent = agent(AgentConfig::default());
    let before = agent.epsilon();
    let mut env = ThermalEnv::new(EnvConfig::default(), &ComfortModel::reference(), 0.5, 3).unwrap();

    let err = evaluate_agent(&mut agent, &mut env, 0.5, 0, 10).unwrap_err();
    assert!(matches!(err, GameError::EmptyEvaluation));
    assert_eq!(agent.epsilon(), before);

    let err = evaluate_agent(&mut agent, &mut env, 1.5, 1, 10).unwrap_err();
    assert!(matches!(err, GameError::InvalidRatio { .. }));
    assert_eq!(agent.epsilon(), before);
    assert_eq!(agent.mode(), AgentMode::Training);
}

#[test]
fn degenerate_budgets_rejected_before_running() {
    let mut agent = agent(AgentConfig::default());
    let before = agent.epsilon();
    let mut env = ThermalEnv::new(EnvConfig::default(), &ComfortModel::reference(), 0.5, 3).unwrap();

    // Would spin for usize::MAX empty episodes, or overflow a pre-sized
    // buffer, if the budget were not checked first.
    for (episodes, steps) in [(usize::MAX, 0), (0, usize::MAX)] {
        let err = evaluate_agent(&mut agent, &mut env, 0.5, episodes, steps).unwrap_err();
        assert!(matches!(err, GameError::EmptyEvaluation));
    }
    assert_eq!(agent.epsilon(), before);
}

#[test]
fn guard_restores_epsilon_on_panic() {
    let mut agent = agent(AgentConfig::default());
    let before = agent.epsilon();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let guard = agent.evaluation_mode();
        assert_eq!(guard.epsilon(), 0.0);
        panic!("evaluation blew up");
    }));

    assert!(result.is_err());
    assert_eq!(agent.epsilon(), before);
    assert_eq!(agent.mode(), AgentMode::Training);
}

#[test]
fn evaluation_is_greedy() {
    let mut agent = agent(AgentConfig::default());
    let mut env = ThermalEnv::new(EnvConfig::default(), &ComfortModel::reference(), 0.5, 3).unwrap();

    // Untrained table: every greedy choice is action 0 (first maximum), so
    // the temperature is driven to the lower bound.
    let summary = evaluate_agent(&mut agent, &mut env, 0.5, 1, 60).unwrap();
    assert_eq!(*summary.record.temperatures.last().unwrap(), 15.0);
}
