use flocking::boid::STUN_DURATION;
use flocking::grid_path::{self, DEMO_LETTERS};
use flocking::{Boid, Flock, SimulationParams, Vector2D};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn p(x: f32, y: f32) -> Vector2D {
    Vector2D::new(x, y).unwrap()
}

fn steady_params() -> SimulationParams {
    SimulationParams {
        heading_jitter_degrees: 0.0,
        seed: Some(99),
        ..SimulationParams::default()
    }
}

#[test]
fn close_stationary_boids_push_apart() {
    let params = SimulationParams {
        cohesion_factor: 0.0,
        ..steady_params()
    };
    let mut flock = Flock::new(params).unwrap();
    let a = flock.insert_boid(Boid::new(p(100.0, 100.0), Vector2D::ZERO));
    let b = flock.insert_boid(Boid::new(p(105.0, 100.0), Vector2D::ZERO));

    flock.tick(1.0).unwrap();

    let a = flock.boid(a).unwrap().position();
    let b = flock.boid(b).unwrap().position();
    assert!(a.distance(b) > 5.0);
    assert!(a.x() < 100.0);
    assert!(b.x() > 105.0);
}

#[test]
fn lone_boid_coasts() {
    let mut flock = Flock::new(steady_params()).unwrap();
    let id = flock.insert_boid(Boid::new(p(400.0, 300.0), p(2.0, 0.0)));

    for tick in 1..=10 {
        flock.tick(1.0).unwrap();
        let boid = flock.boid(id).unwrap();
        assert_eq!(boid.desired_force(), Vector2D::ZERO);
        assert_eq!(boid.velocity(), p(2.0, 0.0));
        assert!((boid.position().x() - (400.0 + 2.0 * tick as f32)).abs() < 1e-3);
    }
}

#[test]
fn boid_leaving_the_arena_reappears_on_the_other_side() {
    let params = steady_params();
    let mut flock = Flock::new(params.clone()).unwrap();
    let id = flock.insert_boid(Boid::new(p(params.arena_width - 1.0, 300.0), p(2.0, 0.0)));

    flock.tick(1.0).unwrap();

    let position = flock.boid(id).unwrap().position();
    assert!(position.x().abs() < 1e-6);
    assert_eq!(position.y(), 300.0);
}

#[test]
fn neighbor_queries_match_brute_force() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let mut flock = Flock::new(steady_params()).unwrap();
    for _ in 0..300 {
        let position = p(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0));
        let velocity = Vector2D::random(&mut rng, 2.0).unwrap();
        flock.insert_boid(Boid::new(position, velocity));
    }

    let radius = flock.params().neighbor_radius();
    for index in (0..300).step_by(7) {
        let mut found: Vec<usize> = flock
            .neighbors_of(index)
            .unwrap()
            .iter()
            .map(|n| n.index)
            .collect();
        found.sort_unstable();

        let me = &flock.boids()[index];
        let expected: Vec<usize> = flock
            .boids()
            .iter()
            .enumerate()
            .filter(|&(other, boid)| {
                other != index
                    && me.position().distance_squared(boid.position()) < radius * radius
                    && flocking::physics::in_field_of_view(me.position(), me.velocity(), boid.position())
            })
            .map(|(other, _)| other)
            .collect();

        assert_eq!(found, expected, "neighbors of boid {index}");
    }
}

#[test]
fn boid_flying_into_a_wall_is_stunned_then_recovers() {
    let mut flock = Flock::new(steady_params()).unwrap();
    let wall = [p(200.0, 100.0), p(300.0, 100.0), p(300.0, 300.0), p(200.0, 300.0)];
    let wall_id = flock.create_obstacle(&wall, None).unwrap();
    let id = flock.insert_boid(Boid::new(p(150.0, 200.0), p(3.0, 0.0)));

    let mut stunned_at = None;
    for tick in 0..250 {
        flock.tick(1.0).unwrap();
        if stunned_at.is_none() && flock.boid(id).unwrap().is_stunned() {
            stunned_at = Some(tick);
        }
    }

    let stunned_at = stunned_at.expect("boid never hit the wall");
    assert!((stunned_at as f32) < 250.0 - STUN_DURATION - 2.0);

    let boid = flock.boid(id).unwrap();
    assert!(!boid.is_stunned());
    assert!(!flock.obstacle(wall_id).unwrap().contains_point(boid.position()));
    assert!(boid.velocity().x() < 0.0);
}

#[test]
fn demo_scene_stays_in_bounds() {
    let params = SimulationParams {
        seed: Some(5),
        ..SimulationParams::default()
    };
    let mut flock = Flock::new(params.clone()).unwrap();
    for obstacle in grid_path::demo_obstacles(params.grid_size).unwrap() {
        flock.add_obstacle(obstacle);
    }
    assert_eq!(flock.obstacles().len(), DEMO_LETTERS.len());

    for tick in 0..400 {
        if tick % 2 == 0 && flock.boids().len() < 120 {
            flock.create_boid(100.0, 100.0).unwrap();
        }
        flock.tick(1.0).unwrap();

        for boid in flock.boids() {
            let position = boid.position();
            assert!((0.0..=params.arena_width).contains(&position.x()));
            assert!((0.0..=params.arena_height).contains(&position.y()));
            assert!(boid.velocity().magnitude() <= params.max_speed + 1e-3);
        }
    }
    assert_eq!(flock.tick_count(), 400);
    assert_eq!(flock.stats().boids, 120);
}

#[test]
fn json_parameters_drive_a_reproducible_flock() {
    let json = r#"{ "seed": 31, "boid_count": 50, "max_speed": 4.0 }"#;
    let run = || {
        let params = SimulationParams::from_json(json).unwrap();
        let mut flock = Flock::new(params).unwrap();
        flock.spawn_boids(50, p(640.0, 360.0)).unwrap();
        for _ in 0..30 {
            flock.tick(1.0).unwrap();
        }
        flock.boids().iter().map(Boid::position).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn injected_rng_is_used_for_spawning() {
    let params = steady_params();
    let mut a = Flock::with_rng(params.clone(), SmallRng::seed_from_u64(8)).unwrap();
    let mut b = Flock::with_rng(params.clone(), SmallRng::seed_from_u64(8)).unwrap();
    let ia = a.create_boid(100.0, 100.0).unwrap();
    let ib = b.create_boid(100.0, 100.0).unwrap();

    let va = a.boid(ia).unwrap().velocity();
    assert_eq!(va, b.boid(ib).unwrap().velocity());
    assert!(va.magnitude() >= params.min_speed - 1e-4);
    assert!(va.magnitude() <= params.max_speed + 1e-4);
}
