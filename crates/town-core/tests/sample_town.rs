//! Tests against the sample town shipped at the repository root.

use std::path::Path;

use town_core::{Instruction, ScriptedAgentFactory, Sink, StepController, TownConfig};

const ROOT: &str = "../..";

/// Test that the sample config and agent files load.
#[test]
fn test_sample_town_loads() {
    let config =
        TownConfig::from_file(&Path::new(ROOT).join("town.toml")).expect("Failed to load config");
    let profiles = config
        .load_profiles(Path::new(ROOT))
        .expect("Failed to load profiles");

    assert_eq!(profiles.len(), 4);
    assert!(profiles.iter().all(|p| p.validate().is_ok()));
    assert!(profiles.iter().all(|p| p.path.is_some()));
    assert!(config.simulation.user_role < profiles.len());
}

/// Test a short scripted run over the sample town.
#[test]
fn test_sample_town_runs() {
    let config =
        TownConfig::from_file(&Path::new(ROOT).join("town.toml")).expect("Failed to load config");
    // No paths, so nothing is checkpointed into the source tree
    let profiles: Vec<_> = config
        .load_profiles(Path::new(ROOT))
        .expect("Failed to load profiles")
        .into_iter()
        .map(|mut p| {
            p.path = None;
            p
        })
        .collect();

    let controller = StepController::from_config(&config.simulation);
    let mut factory = ScriptedAgentFactory::new(config.scripted.clone());
    let mut ctx = controller
        .init(&profiles, config.simulation.user_role, &mut factory, Sink::detached())
        .expect("Failed to init run");

    for _ in 0..10 {
        controller
            .step(&mut ctx, Instruction::Continue)
            .expect("Tick should succeed");
        assert!(ctx.observations().tick_sizes().len() <= controller.window());
    }
    assert_eq!(ctx.tick(), 10);
    assert_eq!(ctx.simulated_names(), ["Theo", "June", "Oskar"]);
}
