//! Population ratio sweep: biased vs hybrid vs fairness-aware thermostats
//!
//! Run with: cargo run --release -p thermal-games --example ratio_sweep
//!
//! Optionally pass an experiment config as JSON:
//!   cargo run --release -p thermal-games --example ratio_sweep -- config.json
//!
//! Set RUST_LOG=thermal_games=debug to watch training progress.

use thermal_core::ComfortModel;
use thermal_games::{sweep_population_ratios, AgentVariant, ExperimentConfig, GameError};
use tracing_subscriber::EnvFilter;

const RATIOS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

fn load_config() -> Result<ExperimentConfig, GameError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| GameError::InvalidConfig {
                reason: format!("cannot read {path}: {e}"),
            })?;
            ExperimentConfig::from_json(&json)
        }
        None => Ok(ExperimentConfig::default()),
    }
}

fn main() -> Result<(), GameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("thermal_games=info")),
        )
        .init();

    println!("=== Thermal Fairness: Population Ratio Sweep ===\n");

    let cfg = load_config()?;
    let model = ComfortModel::reference();

    println!("Groups:");
    for label in model.groups() {
        let profile = model.profile(label)?;
        let (low, high) = profile.comfortable_range();
        println!(
            "  {label:<8} optimum {:.1}°C, comfortable {low:.0}-{high:.0}°C",
            profile.optimal()
        );
    }
    println!(
        "\nBudget: {} training episodes × {} steps, {} evaluation episodes × {} steps\n",
        cfg.train_episodes, cfg.steps_per_episode, cfg.eval_episodes, cfg.eval_steps
    );

    let sweep = sweep_population_ratios(&RATIOS, &cfg, &model)?;

    // -------------------------------------------------------------------------
    // Per-variant table
    // -------------------------------------------------------------------------
    println!(
        "{:>6}  {:<9} {:>7} {:>8} {:>8} {:>7} {:>7} {:>8}",
        "ratio", "variant", "temp", "comfort", "comfort", "gap", "sat", "accuracy"
    );
    println!(
        "{:>6}  {:<9} {:>7} {:>8} {:>8} {:>7} {:>7} {:>8}",
        "", "", "", "primary", "second.", "", "all", ""
    );
    println!("{}", "-".repeat(70));

    for comparison in &sweep {
        for variant in AgentVariant::ALL {
            let e = &comparison.report(variant).evaluation;
            println!(
                "{:>6.1}  {:<9} {:>7.2} {:>8.3} {:>8.3} {:>7.3} {:>7.3} {:>8.3}",
                comparison.population_ratio,
                format!("{variant:?}").to_lowercase(),
                e.mean_temperature,
                e.mean_comfort_primary,
                e.mean_comfort_secondary,
                e.fairness_gap,
                e.satisfaction_overall,
                e.overall_accuracy,
            );
        }
        println!();
    }

    // -------------------------------------------------------------------------
    // Gap reduction relative to the biased controller
    // -------------------------------------------------------------------------
    println!("Fairness gap reduction vs biased:");
    let fmt = |r: Option<f64>| match r {
        Some(r) => format!("{:+.1}%", r * 100.0),
        None => "n/a".to_string(),
    };
    for comparison in &sweep {
        println!(
            "  ratio {:.1}: fairness {:>8}, hybrid {:>8}",
            comparison.population_ratio,
            fmt(comparison.fairness_gap_reduction()),
            fmt(comparison.hybrid_gap_reduction()),
        );
    }

    Ok(())
}
