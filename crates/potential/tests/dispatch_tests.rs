use potential::units::G_CODE;
use potential::{
    calculate_potential, Dispatcher, KernelKind, KernelTable, Method, Octree, Particles, Plan,
    PotentialConfig, PotentialError, PotentialEvaluator, SmallSystemPolicy, Softening,
};

fn gen_cloud(seed: u64, n: usize, size: f32) -> (Vec<f32>, Vec<f32>, Vec<f32>, Vec<f32>) {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(seed);
    let mut coord = || (0..n).map(|_| (rng.gen::<f32>() - 0.5) * size).collect::<Vec<_>>();
    let x = coord();
    let y = coord();
    let z = coord();
    let m = (0..n).map(|_| 1e6 * (0.5 + rng.gen::<f32>())).collect();
    (m, x, y, z)
}

#[test]
fn two_bodies_are_left_at_zero_by_default() {
    let m = [1e10f32, 1e10];
    let x = [0.0f32, 1.0];
    let y = [0.0f32, 0.0];
    let z = [0.0f32, 0.0];
    let mut out = [123.0f32; 2];
    calculate_potential(&m, &x, &y, &z, &mut out).unwrap();
    assert_eq!(out, [0.0, 0.0]);
}

#[test]
fn plan_follows_threshold_and_policy() {
    let auto = Dispatcher::default();
    assert_eq!(auto.plan(0), Plan::Skip);
    assert_eq!(auto.plan(1000), Plan::Skip);
    assert_eq!(auto.plan(1001), Plan::Tree);

    let exact_small = Dispatcher::new(PotentialConfig {
        small_system: SmallSystemPolicy::Exact,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(exact_small.plan(2), Plan::Exact);
    assert_eq!(exact_small.plan(5000), Plan::Tree);

    let tree = Dispatcher::new(PotentialConfig {
        method: Method::Tree,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(tree.plan(2), Plan::Tree);

    let exact = Dispatcher::new(PotentialConfig {
        method: Method::Exact,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(exact.plan(100_000), Plan::Exact);
}

#[test]
fn large_systems_go_through_the_tree_in_physical_units() {
    let n = 1500;
    let (m, x, y, z) = gen_cloud(1, n, 100.0);
    let particles = Particles::new(&m, &x, &y, &z).unwrap();

    let dispatcher = Dispatcher::default();
    let pot = dispatcher.compute(&particles).unwrap();
    assert_eq!(pot.len(), n);
    assert!(pot.iter().all(|&p| p < 0.0));

    let config = dispatcher.config();
    let table = KernelTable::build(config.kernel_length);
    let tree = Octree::build(&particles, config).unwrap();
    let evaluator = PotentialEvaluator::new(&tree, Softening::new(&table, config.softening_length() as f32));
    let mut code = vec![0.0f32; n];
    evaluator.potentials(&mut code).unwrap();

    for i in 0..n {
        let want = code[i] * G_CODE as f32;
        assert!((pot[i] - want).abs() <= 1e-6 * want.abs(), "particle {i}");
    }
}

#[test]
fn exact_policy_agrees_with_tree() {
    let n = 1200;
    let (m, x, y, z) = gen_cloud(2, n, 50.0);
    let particles = Particles::new(&m, &x, &y, &z).unwrap();

    let tree = Dispatcher::default().compute(&particles).unwrap();
    let exact = Dispatcher::new(PotentialConfig {
        method: Method::Exact,
        ..Default::default()
    })
    .unwrap()
    .compute(&particles)
    .unwrap();

    for i in 0..n {
        let rel = ((tree[i] - exact[i]) / exact[i]).abs();
        assert!(rel < 0.02, "particle {i}: {rel}");
    }
}

#[test]
fn small_systems_can_use_the_exact_sum() {
    let m = [1e10f32, 1e10];
    let x = [0.0f32, 1.0];
    let y = [0.0f32, 0.0];
    let z = [0.0f32, 0.0];
    let particles = Particles::new(&m, &x, &y, &z).unwrap();
    let dispatcher = Dispatcher::new(PotentialConfig {
        small_system: SmallSystemPolicy::Exact,
        ..Default::default()
    })
    .unwrap();
    let pot = dispatcher.compute(&particles).unwrap();
    assert!(pot[0] < 0.0 && pot[1] < 0.0);
    assert!((pot[0] - pot[1]).abs() <= 1e-6 * pot[0].abs());
}

#[test]
fn plummer_exact_sum_excludes_self() {
    let m = [2.0f32, 3.0];
    let x = [0.0f32, 4.0];
    let y = [0.0f32, 0.0];
    let z = [0.0f32, 0.0];
    let particles = Particles::new(&m, &x, &y, &z).unwrap();
    let config = PotentialConfig {
        method: Method::Exact,
        exact_kernel: KernelKind::Plummer,
        softening_scale: 3.0,
        gravitational_constant: 1.0,
        ..Default::default()
    };
    let pot = Dispatcher::new(config).unwrap().compute(&particles).unwrap();
    // sqrt(4^2 + 3^2) = 5
    assert!((pot[0] + 3.0 / 5.0).abs() < 1e-6);
    assert!((pot[1] + 2.0 / 5.0).abs() < 1e-6);
}

#[test]
fn tree_failure_is_reported_not_replaced() {
    let n = 1500;
    let (m, x, y, z) = gen_cloud(3, n, 100.0);
    let particles = Particles::new(&m, &x, &y, &z).unwrap();
    let dispatcher = Dispatcher::new(PotentialConfig {
        node_pool_factor: 1,
        node_pool_slack: 0,
        small_system: SmallSystemPolicy::Exact,
        ..Default::default()
    })
    .unwrap();
    let err = dispatcher.compute(&particles).unwrap_err();
    assert!(matches!(err, PotentialError::CapacityExceeded { capacity: 1500, .. }), "{err:?}");
}

#[test]
fn coincident_large_system_is_rejected() {
    let n = 1200;
    let m = vec![1.0f32; n];
    let c = vec![4.0f32; n];
    let mut out = vec![0.0f32; n];
    let err = calculate_potential(&m, &c, &c, &c, &mut out).unwrap_err();
    assert!(matches!(err, PotentialError::DegenerateGeometry { .. }), "{err:?}");
}

#[test]
fn invalid_buffers_are_rejected() {
    let m = [1.0f32, 1.0];
    let x = [0.0f32, 1.0];
    let y = [0.0f32];
    let z = [0.0f32, 0.0];
    let mut out = [0.0f32; 2];
    let err = calculate_potential(&m, &x, &y, &z, &mut out).unwrap_err();
    assert!(matches!(err, PotentialError::InvalidInput(_)));

    let bad_mass = [1.0f32, -1.0];
    let err = Particles::new(&bad_mass, &x, &x, &z).unwrap_err();
    assert!(matches!(err, PotentialError::InvalidInput(_)));

    let nan = [0.0f32, f32::NAN];
    assert!(Particles::new(&m, &x, &nan, &z).is_err());

    let particles = Particles::new(&m, &x, &x, &z).unwrap();
    let mut short = [0.0f32; 1];
    let err = Dispatcher::default().compute_into(&particles, &mut short).unwrap_err();
    assert!(matches!(err, PotentialError::InvalidInput(_)));
}

#[test]
fn empty_input_yields_empty_output() {
    let empty: [f32; 0] = [];
    let mut out: [f32; 0] = [];
    calculate_potential(&empty, &empty, &empty, &empty, &mut out).unwrap();

    let particles = Particles::new(&empty, &empty, &empty, &empty).unwrap();
    let tree = Dispatcher::new(PotentialConfig {
        method: Method::Tree,
        ..Default::default()
    })
    .unwrap();
    assert!(tree.compute(&particles).unwrap().is_empty());
}

#[test]
fn bad_parameters_are_rejected() {
    for config in [
        PotentialConfig {
            opening_angle: 0.0,
            ..Default::default()
        },
        PotentialConfig {
            softening_scale: -1.0,
            ..Default::default()
        },
        PotentialConfig {
            kernel_length: 1,
            ..Default::default()
        },
        PotentialConfig {
            node_pool_factor: 0,
            ..Default::default()
        },
        PotentialConfig {
            gravitational_constant: f64::NAN,
            ..Default::default()
        },
    ] {
        let err = Dispatcher::new(config).unwrap_err();
        assert!(matches!(err, PotentialError::InvalidParameter(_)));
    }
}
