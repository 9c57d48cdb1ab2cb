//! Baking, serialization and validation against a live simulation
//!
//! Run tests with: cargo test --test `bake_pipeline`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wind_sim_core::bake::{trace_streamline, TraceEnd};
use wind_sim_core::{
    bake, bake_with_report, Aabb, BakeConfig, BaseFn, BoxObstacles, ConstantFn, DeltaField, Dim,
    SplineFn, Unobstructed, Vec3, WindConfig, WindSimulation, WindSource,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_points(bounds: &Aabb, count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.random_range(bounds.min.x..bounds.max.x),
                rng.random_range(bounds.min.y..bounds.max.y),
                rng.random_range(bounds.min.z..bounds.max.z),
            )
        })
        .collect()
}

/// A seed in uniform +z flow traces a straight line and bakes to +z wind.
#[test]
fn test_straight_line_trace() {
    init_tracing();
    let mut sim = WindSimulation::with_dim(Dim::new(8, 8, 8), 1.0);
    sim.build_for_scene(&Unobstructed, Vec3::zeros());
    sim.velocity_mut().fill(Vec3::new(0.0, 0.0, 1.0));
    let config = BakeConfig::default();

    let seed = Vec3::new(2.0, 2.0, 2.0);
    let line = trace_streamline(&sim, &Unobstructed, seed, &config);

    assert_eq!(line.end, TraceEnd::OutOfBounds);
    assert!(line.is_usable());
    for pair in line.points.windows(2) {
        assert!(pair[1].z >= pair[0].z, "z must never decrease");
        assert_eq!((pair[1].x, pair[1].y), (2.0, 2.0));
    }

    let spline = BaseFn::Spline(line.to_spline(&sim, &config));
    let wind = spline.evaluate(sim.cell_to_world(seed));
    assert!(wind.z > 0.0, "Expected +z wind at the seed, got {wind:?}");
}

#[test]
fn test_constant_round_trip() {
    let original = BaseFn::Constant(ConstantFn::new(Vec3::new(1.0, -2.0, 0.5), 3.5));
    let decoded = BaseFn::from_bytes(&original.to_bytes().unwrap()).unwrap();

    let bounds = Aabb::new(Vec3::new(-50.0, -50.0, -50.0), Vec3::new(50.0, 50.0, 50.0));
    for point in random_points(&bounds, 10, 11) {
        assert_eq!(original.evaluate(point), decoded.evaluate(point));
    }
}

#[test]
fn test_spline_round_trip() {
    let points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.5, 0.0),
        Vec3::new(2.0, 1.5, 0.5),
        Vec3::new(3.0, 2.0, 1.5),
        Vec3::new(4.0, 2.0, 3.0),
    ];
    let forces = vec![1.0, 1.5, 2.0, 1.5, 1.0];
    let original = BaseFn::Spline(SplineFn::new(points, forces, 3, 20));
    let decoded = BaseFn::from_bytes(&original.to_bytes().unwrap()).unwrap();

    let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(5.0, 3.0, 4.0));
    let mut nonzero = 0;
    for point in random_points(&bounds, 10, 12) {
        let expected = original.evaluate(point);
        assert_eq!(expected, decoded.evaluate(point));
        if expected != Vec3::zeros() {
            nonzero += 1;
        }
    }
    assert!(nonzero > 0, "Round trip should be checked where the spline has influence");
}

#[test]
fn test_wind_source_round_trip() {
    let mut sim = WindSimulation::with_dim(Dim::new(12, 6, 12), 1.0);
    sim.build_for_scene(&Unobstructed, Vec3::new(-6.0, 0.0, -6.0));
    sim.velocity_mut().fill(Vec3::new(1.0, 0.0, 0.5));

    let source = bake(&sim, &Unobstructed, &BakeConfig::default());
    assert!(!source.is_empty());

    let decoded = WindSource::from_bytes(&source.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.position, source.position);
    assert_eq!(decoded.scale, source.scale);
    assert_eq!(decoded.len(), source.len());
    for point in random_points(&source.bounds(), 10, 13) {
        assert_eq!(source.evaluate(point), decoded.evaluate(point));
    }
}

/// Simulate a channel with a block, bake it and measure how far off the bake is.
#[test]
fn test_channel_bake_and_validate() {
    init_tracing();
    let mut sim = WindSimulation::with_dim(Dim::new(16, 8, 8), 1.0);
    let scene = BoxObstacles::new().with_box(Aabb::new(
        Vec3::new(8.0, 0.0, 3.0),
        Vec3::new(10.0, 4.0, 5.0),
    ));
    sim.build_for_scene(&scene, Vec3::zeros());
    for j in 1..=8 {
        for k in 1..=8 {
            sim.add_velocity_source(1, j, k, Vec3::new(30.0, 0.0, 0.0));
        }
    }
    sim.step_n(1.0 / 30.0, 30, &WindConfig::default());
    assert!(sim.max_speed() > 0.0);

    let config = BakeConfig {
        stride: 2,
        ..BakeConfig::default()
    };
    let (source, report) = bake_with_report(&sim, &scene, &config);
    assert_eq!(report.accepted + report.discarded, report.seeds);
    assert_eq!(report.accepted, source.len());
    assert!(report.obstructed_seeds > 0, "The block covers lattice cells");

    let delta = DeltaField::build(&sim, &source);
    let plot = delta.box_plot().expect("free cells exist");
    assert_eq!(plot.count, delta.sample_count());
    assert!(plot.min <= plot.q1 && plot.q1 <= plot.median);
    assert!(plot.median <= plot.q3 && plot.q3 <= plot.max);
    assert!(plot.lower_whisker >= plot.min && plot.upper_whisker <= plot.max);
    assert!(delta.error().is_finite());
    assert!(delta.max_error() >= delta.error());
}

/// A calm simulation bakes to nothing and its delta is exactly zero.
#[test]
fn test_calm_bake_is_empty() {
    let mut sim = WindSimulation::with_dim(Dim::new(8, 8, 8), 2.0);
    sim.build_for_scene(&Unobstructed, Vec3::zeros());
    let (source, report) = bake_with_report(&sim, &Unobstructed, &BakeConfig::default());

    assert!(source.is_empty());
    assert_eq!(report.discarded, report.seeds);
    assert!(report.trace_length.is_none());
    assert_eq!(DeltaField::build(&sim, &source).error(), 0.0);
}
