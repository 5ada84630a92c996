use granula_engine::{
    build_grid, resolve, IntegrationScheme, Particle, ParticleSpec, ResolveParams, SimConfig,
    SimError, Simulation, Spawner, SpawnerConfig, Vec3, World,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RADIUS: f64 = 0.5;

fn params(sub_steps: u32, scheme: IntegrationScheme) -> ResolveParams {
    ResolveParams {
        cell_size: 2.0 * RADIUS,
        sub_steps,
        dt: 1.0 / 60.0,
        search_radius: 2,
        scheme,
        gravity: Vec3::ZERO,
    }
}

/// 100 particles on a jittered lattice, no two touching
fn scattered_world() -> World {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut world = World::new(Vec3::ZERO);
    for x in 0..5 {
        for y in 0..5 {
            for z in 0..4 {
                let jitter = Vec3::new(
                    rng.random_range(-0.2..0.2),
                    rng.random_range(-0.2..0.2),
                    rng.random_range(-0.2..0.2),
                );
                let pos = Vec3::new(x as f64, y as f64, z as f64) * 3.0 + jitter;
                world.add_particle(Particle::new(pos, RADIUS));
            }
        }
    }
    world
}

fn distance(world: &World, a: usize, b: usize) -> f64 {
    (world.get(a).unwrap().position() - world.get(b).unwrap().position()).length()
}

fn max_overlap(world: &World) -> f64 {
    let ps = world.particles();
    let mut worst = 0.0f64;
    for i in 0..ps.len() {
        for j in (i + 1)..ps.len() {
            let d = (ps[i].position() - ps[j].position()).length();
            worst = worst.max(ps[i].radius + ps[j].radius - d);
        }
    }
    worst
}

#[test]
fn touching_pair_moves_half_the_overlap_each() {
    let d = 0.7;
    let mut world = World::new(Vec3::ZERO);
    world.add_particle(Particle::new(Vec3::ZERO, RADIUS));
    world.add_particle(Particle::new(Vec3::new(d, 0.0, 0.0), RADIUS));
    let grid = build_grid(&world, 1.0).unwrap();
    resolve(&mut world, &grid, &params(1, IntegrationScheme::PositionBased)).unwrap();

    let shift = (2.0 * RADIUS - d) / 2.0;
    assert!((world.get(0).unwrap().position().x + shift).abs() < 1e-12);
    assert!((world.get(1).unwrap().position().x - (d + shift)).abs() < 1e-12);
}

#[test]
fn frozen_partner_makes_the_other_take_the_full_overlap() {
    let d = 0.7;
    let mut world = World::new(Vec3::ZERO);
    world.add_particle(Particle::new(Vec3::ZERO, RADIUS));
    let mut wall = Particle::new(Vec3::new(d, 0.0, 0.0), RADIUS);
    wall.frozen = true;
    world.add_particle(wall);
    let grid = build_grid(&world, 1.0).unwrap();
    resolve(&mut world, &grid, &params(1, IntegrationScheme::VelocityBased)).unwrap();

    assert!((world.get(0).unwrap().position().x + (2.0 * RADIUS - d)).abs() < 1e-12);
    assert_eq!(world.get(0).unwrap().velocity, Vec3::ZERO);
    assert_eq!(world.get(1).unwrap(), wall);
}

#[test]
fn grid_build_is_repeatable() {
    let world = scattered_world();
    assert_eq!(build_grid(&world, 1.0).unwrap(), build_grid(&world, 1.0).unwrap());
}

#[cfg(feature = "parallel")]
#[test]
fn grid_and_spawner_ignore_thread_count() {
    let pool = |n| rayon::ThreadPoolBuilder::new().num_threads(n).build().unwrap();
    let world = scattered_world();
    let config = SpawnerConfig { seed: 77, ..SpawnerConfig::default() };

    let (grid_1, batch_1) = pool(1).install(|| {
        (build_grid(&world, 0.5).unwrap(), Spawner::new(config.clone()).unwrap().next_batch(300))
    });
    let (grid_4, batch_4) = pool(4).install(|| {
        (build_grid(&world, 0.5).unwrap(), Spawner::new(config.clone()).unwrap().next_batch(300))
    });
    assert_eq!(grid_1, grid_4);
    assert_eq!(batch_1, batch_4);
}

#[test]
fn separated_particles_are_not_disturbed() {
    let mut world = scattered_world();
    let before = world.particles().to_vec();
    let grid = build_grid(&world, 1.0).unwrap();
    let stats = resolve(&mut world, &grid, &params(8, IntegrationScheme::PositionBased)).unwrap();

    assert_eq!(stats.contacts, 0);
    assert_eq!(world.particles(), &before[..]);
}

#[test]
fn forced_overlap_is_pushed_out() {
    let mut world = scattered_world();
    let anchor = world.get(1).unwrap().position();
    let mut moved = world.get(0).unwrap();
    moved.position_current = anchor + Vec3::new(0.6, 0.0, 0.0);
    moved.position_previous = moved.position_current;
    world.set(0, moved).unwrap();
    assert!(distance(&world, 0, 1) < 2.0 * RADIUS);

    let grid = build_grid(&world, 1.0).unwrap();
    let stats = resolve(&mut world, &grid, &params(16, IntegrationScheme::VelocityBased)).unwrap();

    assert!(stats.contacts > 0);
    assert!(max_overlap(&world) < 1e-6);
    // pushes started from rest never turn into speed
    assert!(world.particles().iter().all(|p| p.velocity == Vec3::ZERO));
}

#[test]
fn velocity_based_particle_rests_on_frozen_ground() {
    let config = SimConfig { scheme: IntegrationScheme::VelocityBased, ..SimConfig::default() };
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn(ParticleSpec::new(Vec3::ZERO, 1.0).frozen()).unwrap();
    let ball = sim.spawn(ParticleSpec::new(Vec3::new(0.0, 1.5, 0.0), 0.5)).unwrap();

    for n in 0..5000 {
        sim.step().unwrap();
        let p = sim.get_particle(ball).unwrap();
        assert!((p.position().y - 1.5).abs() < 1e-3, "step {n}: y = {}", p.position().y);
        assert!(p.velocity.length() < 1e-6, "step {n}: v = {:?}", p.velocity);
    }
}

#[test]
fn projectile_follows_free_fall() {
    let config = SimConfig {
        gravity: [0.0, -9.8, 0.0],
        sub_steps: 1,
        sim_dt: 0.1,
        scheme: IntegrationScheme::VelocityBased,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    let id = sim.spawn(ParticleSpec::new(Vec3::new(0.0, 10.0, 0.0), 0.5)).unwrap();
    for n in 1..=12u32 {
        let snap = sim.tick(0.1);
        assert!(snap.stepped);
        let t = 0.1 * n as f64;
        let y = sim.get_particle(id).unwrap().position().y;
        assert!((y - (10.0 - 0.5 * 9.8 * t * t)).abs() < 1e-9, "tick {n}: y = {y}");
    }
}

#[test]
fn pendulum_keeps_its_length() {
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    let pivot = sim.spawn(ParticleSpec::new(Vec3::new(0.0, 5.0, 0.0), 0.1).frozen()).unwrap();
    let bob = sim.spawn(ParticleSpec::new(Vec3::new(2.0, 5.0, 0.0), 0.1)).unwrap();
    sim.link(pivot, bob, None).unwrap();

    for _ in 0..90 {
        sim.step().unwrap();
        assert!((distance(sim.world(), pivot, bob) - 2.0).abs() < 1e-9);
    }
    assert_eq!(sim.get_particle(pivot).unwrap().position(), Vec3::new(0.0, 5.0, 0.0));
    // it swung down
    assert!(sim.get_particle(bob).unwrap().position().y < 5.0);
}

#[test]
fn config_json_round_trips_and_rejects_garbage() {
    let config = SimConfig {
        sub_steps: 3,
        search_radius: Some(4),
        scheme: IntegrationScheme::VelocityBased,
        spawner: SpawnerConfig { seed: 9, material_count: 5, ..SpawnerConfig::default() },
        ..SimConfig::default()
    };
    let sim = Simulation::from_config_json(&config.to_json()).unwrap();
    assert_eq!(sim.config(), &config);

    for bad in [r#"{"cellSize": -2}"#, r#"{"subSteps": 0}"#, r#"{"gravity": [0, 1]}"#, "{"] {
        assert!(matches!(
            Simulation::from_config_json(bad),
            Err(SimError::InvalidConfiguration(_))
        ));
    }
}
