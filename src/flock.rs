/*
 * Flock Module
 *
 * This module owns the whole simulation state and advances it one tick at a
 * time:
 * 1. Rebuild the quadtree from the current boid positions
 * 2. For each boid, in order, gather the neighbors it can see
 * 3. Compute separation, alignment and cohesion from those neighbors
 * 4. Eject the boid from any obstacle it has entered (stunning it) and
 *    compute avoidance from the obstacle edges around it
 * 5. Blend the forces into the desired force and integrate
 *
 * Boids are updated in place while iterating, so a boid may see neighbors
 * that already moved this tick. The quadtree only hands out candidates;
 * distances are always measured against the live positions.
 */

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::boid::Boid;
use crate::debug::TickStats;
use crate::error::FlockError;
use crate::obstacle::Obstacle;
use crate::params::SimulationParams;
use crate::physics::{self, Neighbor};
use crate::quadtree::QuadTree;
use crate::vector::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoidId(usize);

impl BoidId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(usize);

impl ObstacleId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Flock<R: Rng = SmallRng> {
    params: SimulationParams,
    boids: Vec<Boid>,
    obstacles: Vec<Obstacle>,
    quadtree: QuadTree,
    rng: R,
    stats: TickStats,
    tick_count: u64,

    // Scratch buffers reused across boids and ticks
    candidates: Vec<usize>,
    neighbors: Vec<Neighbor>,
    edge_points: Vec<Vector2D>,
}

impl Flock<SmallRng> {
    // Seeded from `params.seed` when set, otherwise from OS entropy
    pub fn new(params: SimulationParams) -> Result<Self, FlockError> {
        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(params, rng)
    }
}

impl<R: Rng> Flock<R> {
    pub fn with_rng(params: SimulationParams, rng: R) -> Result<Self, FlockError> {
        params.validate()?;
        let quadtree = build_quadtree(&params);
        Ok(Self {
            params,
            boids: Vec::new(),
            obstacles: Vec::new(),
            quadtree,
            rng,
            stats: TickStats::default(),
            tick_count: 0,
            candidates: Vec::new(),
            neighbors: Vec::new(),
            edge_points: Vec::new(),
        })
    }

    // Boids ------------------------------------------------------------------

    /// Spawn a boid at (x, y) with a random heading and a speed inside the
    /// configured band.
    pub fn create_boid(&mut self, x: f32, y: f32) -> Result<BoidId, FlockError> {
        let boid = Boid::spawn(x, y, &self.params, &mut self.rng)?;
        Ok(self.insert_boid(boid))
    }

    pub fn insert_boid(&mut self, boid: Boid) -> BoidId {
        self.boids.push(boid);
        BoidId(self.boids.len() - 1)
    }

    pub fn spawn_boids(&mut self, count: usize, at: Vector2D) -> Result<Vec<BoidId>, FlockError> {
        (0..count).map(|_| self.create_boid(at.x(), at.y())).collect()
    }

    // Ids of boids after the removed one shift down by one
    pub fn remove_boid(&mut self, id: BoidId) -> Option<Boid> {
        (id.0 < self.boids.len()).then(|| self.boids.remove(id.0))
    }

    pub fn boid(&self, id: BoidId) -> Option<&Boid> {
        self.boids.get(id.0)
    }

    pub fn boid_mut(&mut self, id: BoidId) -> Option<&mut Boid> {
        self.boids.get_mut(id.0)
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    // Obstacles --------------------------------------------------------------

    pub fn create_obstacle(
        &mut self,
        vertices: &[Vector2D],
        hole: Option<&[Vector2D]>,
    ) -> Result<ObstacleId, FlockError> {
        let obstacle = Obstacle::new(vertices, hole)?;
        Ok(self.add_obstacle(obstacle))
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> ObstacleId {
        info!(
            vertices = obstacle.segments().len(),
            has_hole = obstacle.hole().is_some(),
            "obstacle added"
        );
        self.obstacles.push(obstacle);
        ObstacleId(self.obstacles.len() - 1)
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    // Configuration and introspection ----------------------------------------

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Replace the configuration. The quadtree is rebuilt when the arena or
    /// the node shape changed; boids and obstacles are kept.
    pub fn set_params(&mut self, params: SimulationParams) -> Result<(), FlockError> {
        params.validate()?;
        let reshaped = params.arena_bounds() != self.params.arena_bounds()
            || params.quadtree_max_objects != self.params.quadtree_max_objects
            || params.quadtree_max_depth != self.params.quadtree_max_depth;
        if reshaped {
            self.quadtree = build_quadtree(&params);
        }
        info!(reshaped, "simulation parameters updated");
        self.params = params;
        Ok(())
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn quadtree(&self) -> &QuadTree {
        &self.quadtree
    }

    /// Neighbors the boid at `index` would react to right now: within the
    /// neighbor radius, not itself, and inside its field of view.
    pub fn neighbors_of(&mut self, index: usize) -> Option<Vec<Neighbor>> {
        if index >= self.boids.len() {
            return None;
        }
        self.quadtree.update(self.boids.iter().map(Boid::position));
        let mut neighbors = Vec::new();
        collect_neighbors(
            &self.boids,
            &self.quadtree,
            &self.params,
            index,
            &mut self.candidates,
            &mut neighbors,
        );
        Some(neighbors)
    }

    // Simulation -------------------------------------------------------------

    /// Advance the simulation by `delta` time units.
    ///
    /// Fails only when `delta` is negative, not finite, or so large that a
    /// boid could travel past the f32 range; the state is left untouched in
    /// that case.
    pub fn tick(&mut self, delta: f32) -> Result<(), FlockError> {
        if !self.time_step_fits(delta) {
            return Err(FlockError::InvalidTimeStep(delta));
        }
        let started = Instant::now();

        self.quadtree.update(self.boids.iter().map(Boid::position));

        let mut stats = TickStats {
            tick: self.tick_count + 1,
            boids: self.boids.len(),
            quadtree_nodes: self.quadtree.node_count(),
            ..TickStats::default()
        };

        for index in 0..self.boids.len() {
            stats.candidates += collect_neighbors(
                &self.boids,
                &self.quadtree,
                &self.params,
                index,
                &mut self.candidates,
                &mut self.neighbors,
            );
            stats.neighbors += self.neighbors.len();

            let boid = &mut self.boids[index];
            let mut forces = physics::flocking_forces(boid, &self.neighbors, &self.params)?;

            self.edge_points.clear();
            let threshold = self.params.avoidance_threshold;
            for obstacle in &self.obstacles {
                if !obstacle.is_near_bounds(boid.position(), threshold) {
                    continue;
                }
                if obstacle.contains_point(boid.position()) {
                    boid.stun(obstacle.push_to_nearest_edge(boid.position()))?;
                    stats.collisions += 1;
                }
                self.edge_points
                    .extend(obstacle.nearest_points_within(boid.position(), threshold));
            }
            forces.avoidance =
                physics::avoidance(boid, &self.edge_points, self.params.acceleration_limit)?;

            boid.set_desired_force(forces.combine(&self.params)?);
            boid.integrate(delta, &self.params, &mut self.rng)?;
            if boid.is_stunned() {
                stats.stunned += 1;
            }
        }

        self.tick_count += 1;
        stats.duration = started.elapsed();
        debug!(
            tick = stats.tick,
            boids = stats.boids,
            candidates = stats.candidates,
            neighbors = stats.neighbors,
            collisions = stats.collisions,
            stunned = stats.stunned,
            "flock tick"
        );
        self.stats = stats;
        Ok(())
    }

    // The largest coordinate, speed and force a tick of `delta` can reach
    // must stay finite, so no vector step inside the loop can fail
    fn time_step_fits(&self, delta: f32) -> bool {
        if !delta.is_finite() || delta < 0.0 {
            return false;
        }
        let params = &self.params;
        let force = (params.separation_factor.abs()
            + params.alignment_factor.abs()
            + params.cohesion_factor.abs()
            + 1.0)
            * params.acceleration_limit;
        let speed = self
            .boids
            .iter()
            .map(|boid| boid.velocity().magnitude())
            .fold(params.max_speed, f32::max)
            + force * delta;

        let coordinate = |point: Vector2D| point.x().abs().max(point.y().abs());
        let extent = self
            .boids
            .iter()
            .map(|boid| coordinate(boid.position()))
            .chain(self.obstacles.iter().flat_map(|obstacle| obstacle.vertices().map(coordinate)))
            .fold(params.arena_width.max(params.arena_height), f32::max);

        let reach = (extent * (self.boids.len() + 1) as f32 + speed * delta) * 4.0;
        reach.is_finite()
    }
}

fn build_quadtree(params: &SimulationParams) -> QuadTree {
    QuadTree::new(
        params.arena_bounds(),
        params.quadtree_max_objects,
        params.quadtree_max_depth,
    )
}

// Fill `out` with the visible neighbors of boids[index]; returns how many
// candidates the quadtree produced
fn collect_neighbors(
    boids: &[Boid],
    quadtree: &QuadTree,
    params: &SimulationParams,
    index: usize,
    candidates: &mut Vec<usize>,
    out: &mut Vec<Neighbor>,
) -> usize {
    let current = &boids[index];
    let radius = params.neighbor_radius();
    let radius_squared = radius * radius;

    candidates.clear();
    out.clear();
    quadtree.retrieve_into(current.position(), radius, candidates);

    for &other in candidates.iter() {
        if other == index {
            continue;
        }
        let Some(candidate) = boids.get(other) else {
            continue;
        };
        let distance_squared = current.position().distance_squared(candidate.position());
        if distance_squared >= radius_squared {
            continue;
        }
        if !physics::in_field_of_view(current.position(), current.velocity(), candidate.position()) {
            continue;
        }
        out.push(Neighbor {
            index: other,
            position: candidate.position(),
            velocity: candidate.velocity(),
            distance_squared,
        });
    }
    candidates.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Vector2D {
        Vector2D::new(x, y).unwrap()
    }

    fn quiet_params() -> SimulationParams {
        SimulationParams {
            heading_jitter_degrees: 0.0,
            seed: Some(7),
            ..SimulationParams::default()
        }
    }

    #[test]
    fn rejects_bad_time_steps() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock.insert_boid(Boid::new(p(10.0, 10.0), p(1.0, 0.0)));
        for delta in [-1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(flock.tick(delta), Err(FlockError::InvalidTimeStep(_))));
        }
        assert_eq!(flock.tick_count(), 0);
        assert_eq!(flock.boids()[0].position(), p(10.0, 10.0));
    }

    #[test]
    fn separation_reaches_past_the_other_rule_radii() {
        let params = SimulationParams {
            separation_radius: 100.0,
            alignment_radius: 30.0,
            cohesion_radius: 30.0,
            alignment_factor: 0.0,
            cohesion_factor: 0.0,
            min_speed: 0.0,
            ..quiet_params()
        };
        let mut flock = Flock::new(params).unwrap();
        let left = flock.insert_boid(Boid::new(p(100.0, 100.0), Vector2D::ZERO));
        let right = flock.insert_boid(Boid::new(p(150.0, 100.0), Vector2D::ZERO));

        flock.tick(1.0).unwrap();

        assert!(flock.boid(left).unwrap().velocity().x() < 0.0);
        assert!(flock.boid(right).unwrap().velocity().x() > 0.0);
    }

    #[test]
    fn overflowing_time_step_is_rejected_before_any_boid_moves() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock.insert_boid(Boid::new(p(10.0, 100.0), p(1.5, 0.0)));
        flock.insert_boid(Boid::new(p(50.0, 100.0), p(3.0, 0.0)));
        let before: Vec<_> = flock.boids().iter().map(|b| (b.position(), b.velocity())).collect();

        assert!(matches!(flock.tick(1.2e38), Err(FlockError::InvalidTimeStep(_))));
        assert_eq!(flock.tick_count(), 0);
        let after: Vec<_> = flock.boids().iter().map(|b| (b.position(), b.velocity())).collect();
        assert_eq!(before, after);

        flock.tick(1e6).unwrap();
        assert_eq!(flock.tick_count(), 1);
    }

    #[test]
    fn rejects_invalid_params() {
        let params = SimulationParams {
            max_speed: -1.0,
            ..SimulationParams::default()
        };
        assert!(Flock::new(params).is_err());

        let mut flock = Flock::new(quiet_params()).unwrap();
        let broken = SimulationParams {
            arena_width: 0.0,
            ..quiet_params()
        };
        assert!(flock.set_params(broken).is_err());
        assert_eq!(flock.params().arena_width, quiet_params().arena_width);
    }

    #[test]
    fn create_and_remove_boids() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        let ids = flock.spawn_boids(3, p(100.0, 100.0)).unwrap();
        assert_eq!(ids, vec![BoidId(0), BoidId(1), BoidId(2)]);
        assert!(flock.boids().iter().all(|b| b.position() == p(100.0, 100.0)));

        let removed = flock.remove_boid(BoidId(1)).unwrap();
        assert_eq!(removed.position(), p(100.0, 100.0));
        assert_eq!(flock.boids().len(), 2);
        assert!(flock.remove_boid(BoidId(5)).is_none());
        assert!(flock.create_boid(f32::NAN, 0.0).is_err());
    }

    #[test]
    fn degenerate_obstacles_are_rejected() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        let err = flock.create_obstacle(&[p(0.0, 0.0), p(1.0, 0.0)], None).unwrap_err();
        assert!(matches!(err, FlockError::DegeneratePolygon { vertices: 2 }));
        assert!(flock.obstacles().is_empty());
    }

    #[test]
    fn neighbors_exclude_self_far_and_hidden_boids() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock.insert_boid(Boid::new(p(200.0, 200.0), p(1.0, 0.0)));
        flock.insert_boid(Boid::new(p(230.0, 200.0), p(1.0, 0.0)));
        flock.insert_boid(Boid::new(p(170.0, 200.0), p(1.0, 0.0)));
        flock.insert_boid(Boid::new(p(400.0, 200.0), p(1.0, 0.0)));

        let neighbors = flock.neighbors_of(0).unwrap();
        let seen: Vec<usize> = neighbors.iter().map(|n| n.index).collect();
        assert_eq!(seen, vec![1]);
        assert_eq!(neighbors[0].distance_squared, 900.0);
        assert!(flock.neighbors_of(9).is_none());
    }

    #[test]
    fn boid_inside_an_obstacle_is_ejected_and_stunned() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock
            .create_obstacle(
                &[p(100.0, 100.0), p(200.0, 100.0), p(200.0, 200.0), p(100.0, 200.0)],
                None,
            )
            .unwrap();
        let id = flock.insert_boid(Boid::new(p(195.0, 150.0), p(-2.0, 0.0)));

        flock.tick(1.0).unwrap();

        let boid = flock.boid(id).unwrap();
        assert!(boid.is_stunned());
        assert_eq!(flock.stats().collisions, 1);
        assert_eq!(flock.stats().stunned, 1);
        // Reflected off the right edge and moving outward
        assert!(boid.velocity().x() > 0.0);
        assert!(boid.position().x() >= 200.0);
    }

    #[test]
    fn obstacle_ahead_pushes_back() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock
            .create_obstacle(
                &[p(300.0, 100.0), p(400.0, 100.0), p(400.0, 300.0), p(300.0, 300.0)],
                None,
            )
            .unwrap();
        let id = flock.insert_boid(Boid::new(p(250.0, 200.0), p(2.0, 0.0)));

        flock.tick(1.0).unwrap();

        let boid = flock.boid(id).unwrap();
        assert!(!boid.is_stunned());
        assert!(boid.desired_force().x() < 0.0);
        assert!(boid.velocity().x() < 2.0);
    }

    #[test]
    fn same_seed_same_flight() {
        let params = SimulationParams {
            seed: Some(1234),
            ..SimulationParams::default()
        };
        let mut a = Flock::new(params.clone()).unwrap();
        let mut b = Flock::new(params).unwrap();
        for flock in [&mut a, &mut b] {
            flock.spawn_boids(30, p(300.0, 300.0)).unwrap();
            for _ in 0..20 {
                flock.tick(1.0).unwrap();
            }
        }
        let positions_a: Vec<Vector2D> = a.boids().iter().map(Boid::position).collect();
        let positions_b: Vec<Vector2D> = b.boids().iter().map(Boid::position).collect();
        assert_eq!(positions_a, positions_b);
        assert_eq!(a.tick_count(), 20);
    }

    #[test]
    fn stats_follow_the_tick() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        flock.insert_boid(Boid::new(p(200.0, 200.0), p(1.0, 0.0)));
        flock.insert_boid(Boid::new(p(210.0, 200.0), p(1.0, 0.0)));
        flock.tick(1.0).unwrap();

        let stats = flock.stats();
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.boids, 2);
        assert!(stats.candidates >= stats.neighbors);
        assert_eq!(flock.quadtree().len(), 2);
    }

    #[test]
    fn reshaping_the_arena_rebuilds_the_index() {
        let mut flock = Flock::new(quiet_params()).unwrap();
        let params = SimulationParams {
            arena_width: 400.0,
            arena_height: 300.0,
            ..quiet_params()
        };
        flock.set_params(params).unwrap();
        assert_eq!(flock.quadtree().bounds().width, 400.0);
        assert_eq!(flock.quadtree().bounds().height, 300.0);
    }
}
