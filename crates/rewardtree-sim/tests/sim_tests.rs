use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rewardtree_core::{SearchConfig, Tree, TreeError};
use rewardtree_sim::{
    ComparisonConfig, ComparisonRun, GreedyHeuristic, GreedyWalk, RewardRange, RngStreams,
    SimError, TreeGenerator, Winner, compare, run_greedy,
};

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn leaf_rewards(tree: &Tree) -> Vec<f64> {
    tree.leaves()
        .into_iter()
        .map(|id| tree.node(id).expect("leaf").reward().expect("leaf reward"))
        .collect()
}

#[test]
fn generated_tree_has_complete_shape() {
    let generator = TreeGenerator::new(RewardRange::STANDARD).expect("valid range");
    let tree = generator.generate(4, &mut rng(1)).expect("depth 4");

    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.leaves().len(), 16);
    assert_eq!(tree.node_count(), 31);
    for reward in leaf_rewards(&tree) {
        assert!((1.0..=9.0).contains(&reward));
        assert!(((reward * 10.0).round() - reward * 10.0).abs() < 1e-9);
    }
}

#[test]
fn generation_is_deterministic_for_fixed_seed() {
    let generator = TreeGenerator::new(RewardRange::CONTRAST).expect("valid range");
    let a = generator.generate(3, &mut rng(42)).expect("tree");
    let b = generator.generate(3, &mut rng(42)).expect("tree");

    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(leaf_rewards(&a).len(), 8);
}

#[test]
fn raw_rewards_skip_rounding() {
    let generator = TreeGenerator::new(RewardRange::new(0.0, 1.0).expect("range"))
        .expect("valid range")
        .with_decimals(None);
    let tree = generator.generate(5, &mut rng(3)).expect("tree");

    let unrounded = leaf_rewards(&tree)
        .into_iter()
        .filter(|reward| ((reward * 10.0).round() - reward * 10.0).abs() > 1e-9)
        .count();
    assert!(unrounded > 0);
}

#[test]
fn planted_mode_plants_exactly_one_dominant_leaf() {
    let generator = TreeGenerator::new(RewardRange::STANDARD)
        .expect("valid range")
        .with_planted(RewardRange::PLANTED)
        .expect("planted above base");

    for seed in 0..20 {
        let generated = generator
            .generate_detailed(4, &mut rng(seed))
            .expect("tree");
        let planted = generated.planted_leaf.expect("planted leaf recorded");
        let planted_reward = generated
            .tree
            .node(planted)
            .expect("planted node")
            .reward()
            .expect("leaf reward");

        assert!(planted_reward >= 15.0);
        let above_base = leaf_rewards(&generated.tree)
            .into_iter()
            .filter(|reward| *reward > 9.0)
            .count();
        assert_eq!(above_base, 1);
        assert_eq!(generated.tree.max_leaf_reward(), planted_reward);
    }
}

#[test]
fn planted_leaf_strictly_beats_every_other_leaf_after_rounding() {
    let base = RewardRange::new(8.9, 9.0).expect("range");

    let touching = TreeGenerator::new(base)
        .expect("valid range")
        .with_planted(RewardRange::new(9.0, 9.0).expect("range"));
    assert!(matches!(touching, Err(SimError::PlantedRangeOverlaps { .. })));

    let collapses = TreeGenerator::new(base)
        .expect("valid range")
        .with_planted(RewardRange::new(9.04, 9.2).expect("range"));
    assert!(matches!(collapses, Err(SimError::PlantedRangeOverlaps { .. })));

    TreeGenerator::new(base)
        .expect("valid range")
        .with_decimals(None)
        .with_planted(RewardRange::new(9.04, 9.2).expect("range"))
        .expect("unrounded planted range sits above the base");

    let rounded_late = TreeGenerator::new(base)
        .expect("valid range")
        .with_decimals(None)
        .with_planted(RewardRange::new(9.04, 9.2).expect("range"))
        .expect("unrounded planted range sits above the base")
        .with_decimals(Some(1))
        .generate(3, &mut rng(0));
    assert!(matches!(
        rounded_late,
        Err(SimError::PlantedRangeOverlaps { .. })
    ));

    let generator = TreeGenerator::new(base)
        .expect("valid range")
        .with_planted(RewardRange::new(9.1, 9.2).expect("range"))
        .expect("planted above base");
    for seed in 0..50 {
        let generated = generator
            .generate_detailed(4, &mut rng(seed))
            .expect("tree");
        let planted = generated.planted_leaf.expect("planted leaf recorded");
        let planted_reward = generated
            .tree
            .node(planted)
            .expect("planted node")
            .reward()
            .expect("leaf reward");
        for leaf in generated.tree.leaves() {
            if leaf == planted {
                continue;
            }
            let reward = generated
                .tree
                .node(leaf)
                .expect("leaf")
                .reward()
                .expect("leaf reward");
            assert!(reward < planted_reward, "seed {seed}: {reward} ties {planted_reward}");
        }
    }
}

#[test]
fn rounding_skips_values_too_large_to_scale() {
    let generator = TreeGenerator::new(RewardRange::new(1e307, 1e307).expect("range"))
        .expect("valid range")
        .with_decimals(Some(5));
    let tree = generator.generate(1, &mut rng(0)).expect("tree");
    assert!(leaf_rewards(&tree).iter().all(|reward| *reward == 1e307));
}

#[test]
fn generator_rejects_bad_inputs() {
    assert!(matches!(
        RewardRange::new(5.0, 1.0),
        Err(SimError::InvalidRewardRange { .. })
    ));
    assert!(matches!(
        TreeGenerator::new(RewardRange::CONTRAST)
            .expect("valid range")
            .with_planted(RewardRange::new(10.0, 20.0).expect("range")),
        Err(SimError::PlantedRangeOverlaps { .. })
    ));

    let err = TreeGenerator::new(RewardRange::STANDARD)
        .expect("valid range")
        .generate(0, &mut rng(0))
        .expect_err("depth 0 is invalid");
    assert!(matches!(
        err,
        SimError::Tree(TreeError::InvalidDepth { depth: 0, .. })
    ));
}

#[test]
fn noisy_oracle_without_noise_follows_subtree_means() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0, 9.0, 0.0, 3.0, 3.0, 4.0, 4.0]).expect("tree");
    let outcome = run_greedy(&tree, GreedyHeuristic::NoisyOracle { noise: 0.0 }, &mut rng(0))
        .expect("greedy runs");

    // root: left mean 3.0 < right mean 3.5; then right-right mean 4.0; then first of the tie
    assert_eq!(outcome.steps, 3);
    assert_eq!(outcome.final_reward, 4.0);
    assert_eq!(outcome.leaf, tree.leaves()[6]);
    assert_eq!(outcome.path.len(), 4);
}

#[test]
fn greedy_rejects_negative_noise() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0]).expect("tree");
    let err = GreedyWalk::new(&tree, GreedyHeuristic::NoisyOracle { noise: -1.0 })
        .expect_err("negative noise");
    assert!(matches!(err, SimError::InvalidNoise { .. }));
}

#[test]
fn greedy_walk_steps_one_level_at_a_time() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0, 3.0, 4.0]).expect("tree");
    let mut walk = GreedyWalk::new(&tree, GreedyHeuristic::RolloutSample).expect("walk");
    let mut rng = rng(5);

    assert!(walk.outcome(&tree).is_none());
    assert!(walk.step(&tree, &mut rng).expect("step 1").is_some());
    assert!(!walk.is_done());
    assert!(walk.step(&tree, &mut rng).expect("step 2").is_some());
    assert!(walk.is_done());
    assert_eq!(walk.step(&tree, &mut rng).expect("done"), None);
    assert_eq!(walk.steps(), 2);

    let outcome = walk.outcome(&tree).expect("finished walk");
    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.leaf, walk.current());
}

proptest! {
    #[test]
    fn rollout_greedy_always_takes_depth_steps(depth in 1u32..=6, seed in any::<u64>()) {
        let generator = TreeGenerator::new(RewardRange::CONTRAST).expect("valid range");
        let tree = generator.generate(depth, &mut rng(seed)).expect("tree");
        let before = tree.snapshot();

        let outcome = run_greedy(&tree, GreedyHeuristic::RolloutSample, &mut rng(seed ^ 1))
            .expect("greedy runs");

        prop_assert_eq!(outcome.steps, depth);
        prop_assert!(leaf_rewards(&tree).contains(&outcome.final_reward));
        prop_assert_eq!(tree.snapshot(), before);
    }
}

#[test]
fn winner_requires_strictly_greater_reward() {
    assert_eq!(Winner::decide(4.0, 3.9), Winner::Mcts);
    assert_eq!(Winner::decide(1.0, 2.0), Winner::Greedy);
    assert_eq!(Winner::decide(2.5, 2.5), Winner::Tie);
}

#[test]
fn comparison_rejects_zero_iterations_before_running() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0]).expect("tree");
    let config = ComparisonConfig {
        search: SearchConfig {
            iterations: 0,
            ..SearchConfig::default()
        },
        greedy: GreedyHeuristic::RolloutSample,
    };
    let err = compare(&tree, &config, rng(0), rng(1)).expect_err("zero budget");
    assert!(matches!(err, SimError::ZeroIterations));
}

#[test]
fn shallow_search_reports_uninformed_recommendation() {
    let tree = TreeGenerator::new(RewardRange::STANDARD)
        .expect("valid range")
        .generate(4, &mut rng(8))
        .expect("tree");
    let starved = ComparisonConfig {
        search: SearchConfig {
            iterations: 1,
            ..SearchConfig::default()
        },
        greedy: GreedyHeuristic::RolloutSample,
    };
    let comparison = compare(&tree, &starved, rng(0), rng(1)).expect("comparison");
    assert_eq!(comparison.mcts.path.len(), 5);
    assert_eq!(comparison.mcts.informed_steps, 1);
    assert!(!comparison.mcts.fully_informed());

    let small = Tree::from_leaf_rewards(&[1.0, 2.0, 3.0, 4.0]).expect("tree");
    let comparison = compare(&small, &ComparisonConfig::default(), rng(0), rng(1))
        .expect("comparison");
    assert!(comparison.mcts.fully_informed());
}

#[test]
fn comparison_uses_independent_snapshots() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0, 3.0, 4.0]).expect("tree");
    let config = ComparisonConfig::default();
    let mut run = ComparisonRun::new(&tree, &config, rng(2), rng(3)).expect("run");

    while !run.is_finished() {
        run.tick().expect("tick");
    }

    assert_eq!(run.mcts_tree().node(run.mcts_tree().root_id()).expect("root").visits(), 100);
    assert!(run.greedy_tree().nodes().all(|(_, node)| node.visits() == 0));
    assert!(tree.nodes().all(|(_, node)| node.visits() == 0));

    let comparison = run.finish().expect("finish");
    assert_eq!(comparison.mcts_reward(), 4.0);
    assert_eq!(comparison.mcts.iterations, 100);
    assert_eq!(comparison.greedy.steps, 2);
}

#[test]
fn ticks_advance_mcts_by_batch_and_greedy_by_one() {
    let tree = Tree::from_leaf_rewards(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).expect("tree");
    let config = ComparisonConfig {
        search: SearchConfig {
            iterations: 10,
            batch_size: 4,
            ..SearchConfig::default()
        },
        greedy: GreedyHeuristic::RolloutSample,
    };
    let mut run = ComparisonRun::new(&tree, &config, rng(0), rng(1)).expect("run");

    let mut reports = Vec::new();
    while !run.is_finished() {
        reports.push(run.tick().expect("tick"));
    }

    let batches: Vec<usize> = reports.iter().map(|r| r.mcts_iterations).collect();
    let greedy_steps = reports.iter().filter(|r| r.greedy_step.is_some()).count();
    assert_eq!(batches, vec![4, 4, 2]);
    assert_eq!(greedy_steps, 3);
    assert_eq!(run.greedy_walk().steps(), 3);
}

#[test]
fn tick_pacing_does_not_change_the_verdict() {
    let streams = RngStreams::from_seed(77);
    let tree = TreeGenerator::new(RewardRange::CONTRAST)
        .expect("valid range")
        .generate(4, &mut streams.generation.clone())
        .expect("tree");

    let direct = compare(
        &tree,
        &ComparisonConfig::default(),
        streams.mcts.clone(),
        streams.greedy.clone(),
    )
    .expect("direct comparison");

    let paced_config = ComparisonConfig {
        search: SearchConfig {
            batch_size: 3,
            ..SearchConfig::default()
        },
        ..ComparisonConfig::default()
    };
    let mut paced = ComparisonRun::new(&tree, &paced_config, streams.mcts, streams.greedy)
        .expect("paced run");
    for _ in 0..5 {
        paced.tick().expect("tick");
    }
    let paced = paced.finish().expect("paced comparison");

    assert_eq!(direct, paced);
}
