use std::path::PathBuf;

use rewardtree_core::{AnnotationMap, PhaseStepper};
use rewardtree_sim::load_yaml;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/rewardtree-sim/examples/needle.scenario.yaml"));
    let print_json = std::env::args().any(|arg| arg == "--json");

    let spec = load_yaml(&path).expect("failed to load scenario YAML");
    let mut started = spec.start().expect("failed to start scenario");

    // Reveal the first iteration phase by phase on a scratch copy of the engine,
    // the way a renderer would, without disturbing the real run.
    let mut preview = started.run.engine().clone();
    let mut preview_rng = rand::thread_rng();
    let mut stepper = PhaseStepper::new();
    let mut annotations = AnnotationMap::new();
    for _ in 0..4 {
        let Some(phase) = stepper
            .advance(&mut preview, &mut preview_rng, &mut annotations)
            .expect("preview iteration failed")
        else {
            break;
        };
        let marked: Vec<usize> = {
            let mut ids: Vec<usize> = annotations.iter().map(|(id, _)| id.index()).collect();
            ids.sort_unstable();
            ids
        };
        println!("preview {:<13} highlighted={marked:?}", phase.label());
    }

    let mut ticks = 0;
    while !started.run.is_finished() {
        started.run.tick().expect("tick failed");
        ticks += 1;
    }

    let report = started.finish().expect("comparison failed");
    let comparison = &report.comparison;

    println!("seed={} ticks={ticks}", report.seed);
    println!(
        "best_possible={:.1} planted_leaf={:?}",
        report.best_possible,
        report.planted_leaf.map(|id| id.index())
    );
    println!(
        "mcts_reward={:.1} iterations={} root_mean={}",
        comparison.mcts_reward(),
        comparison.mcts.iterations,
        comparison
            .mcts
            .root_mean
            .map_or_else(|| "--".to_string(), |mean| format!("{mean:.2}"))
    );
    println!(
        "greedy_reward={:.1} steps={}",
        comparison.greedy_reward(),
        comparison.greedy.steps
    );
    println!("winner={:?}", comparison.winner);

    if print_json {
        let json = comparison
            .mcts
            .snapshot
            .to_json_pretty()
            .expect("snapshot serialization failed");
        println!("{json}");
    }
}
