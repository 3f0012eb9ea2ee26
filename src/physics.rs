/*
 * Physics Module
 *
 * This module holds the steering rules of the flock:
 * separation, alignment and cohesion between boids, plus avoidance of
 * obstacle edges. Each rule is a pure function of one boid and what it can
 * see, clamped to the acceleration limit; `SteeringForces::combine` blends
 * them into the desired force the boid integrates.
 *
 * Notes:
 * - Neighbor lists are snapshots taken before the rules run, distances are
 *   carried squared and only rooted when a rule needs the weighting
 * - Zero distances are replaced by EPSILON so weighting never divides by 0
 * - A rule with nothing to react to returns the zero vector
 */

use std::f32::consts::{PI, TAU};

use crate::boid::Boid;
use crate::error::VectorError;
use crate::params::SimulationParams;
use crate::vector::Vector2D;

// Stand-in for a zero distance when weighting by inverse distance
pub const EPSILON: f32 = 1e-5;
// Half-angle of the vision cone, measured from the heading
pub const FIELD_OF_VIEW: f32 = 0.75 * PI;

// What a boid knows about one neighbor during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub distance_squared: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringForces {
    pub separation: Vector2D,
    pub alignment: Vector2D,
    pub cohesion: Vector2D,
    pub avoidance: Vector2D,
}

impl SteeringForces {
    // Weighted sum of the flocking rules; avoidance is added unweighted
    pub fn combine(&self, params: &SimulationParams) -> Result<Vector2D, VectorError> {
        let mut desired = Vector2D::ZERO;
        desired
            .scaled_add(self.separation, params.separation_factor)?
            .scaled_add(self.alignment, params.alignment_factor)?
            .scaled_add(self.cohesion, params.cohesion_factor)?
            .add_vector(self.avoidance)?;
        Ok(desired)
    }
}

/// Whether `target` lies inside the vision cone of a boid at `position`
/// flying with `velocity`.
///
/// A boid with zero velocity has no heading and sees all around; a target
/// on top of the boid is always visible.
pub fn in_field_of_view(position: Vector2D, velocity: Vector2D, target: Vector2D) -> bool {
    let offset = target - position;
    if velocity.is_zero() || offset.is_zero() {
        return true;
    }

    let mut difference = (velocity.angle() - offset.angle()).abs() % TAU;
    if difference > PI {
        difference = TAU - difference;
    }
    difference <= FIELD_OF_VIEW
}

// Steer away from close neighbors, closer ones weigh more
pub fn separation(
    boid: &Boid,
    neighbors: &[Neighbor],
    radius: f32,
    limit: f32,
) -> Result<Vector2D, VectorError> {
    let radius_squared = radius * radius;
    let mut steering = Vector2D::ZERO;
    let mut count = 0;

    for neighbor in neighbors.iter().filter(|n| n.distance_squared < radius_squared) {
        let distance = neighbor.distance_squared.sqrt().max(EPSILON);
        let away = (boid.position() - neighbor.position).normalized();
        steering.scaled_add(away, 1.0 / distance)?;
        count += 1;
    }

    if count == 0 {
        return Ok(Vector2D::ZERO);
    }
    steering
        .divide_by(count as f32)?
        .normalize()
        .clamp_max(limit)?;
    Ok(steering)
}

// Match the average heading of nearby boids
pub fn alignment(
    boid: &Boid,
    neighbors: &[Neighbor],
    radius: f32,
    limit: f32,
) -> Result<Vector2D, VectorError> {
    let radius_squared = radius * radius;
    let mut average = Vector2D::ZERO;
    let mut count = 0;

    for neighbor in neighbors.iter().filter(|n| n.distance_squared < radius_squared) {
        average.add_vector(neighbor.velocity)?;
        count += 1;
    }

    if count == 0 {
        return Ok(Vector2D::ZERO);
    }
    average
        .divide_by(count as f32)?
        .normalize()
        .sub_vector(boid.velocity())?
        .clamp_max(limit)?;
    Ok(average)
}

// Head for the center of nearby boids
pub fn cohesion(
    boid: &Boid,
    neighbors: &[Neighbor],
    radius: f32,
    limit: f32,
) -> Result<Vector2D, VectorError> {
    let radius_squared = radius * radius;
    let mut center = Vector2D::ZERO;
    let mut count = 0;

    for neighbor in neighbors.iter().filter(|n| n.distance_squared < radius_squared) {
        center.add_vector(neighbor.position)?;
        count += 1;
    }

    if count == 0 {
        return Ok(Vector2D::ZERO);
    }
    center
        .divide_by(count as f32)?
        .sub_vector(boid.position())?
        .normalize()
        .sub_vector(boid.velocity())?
        .clamp_max(limit)?;
    Ok(center)
}

/// Push away from obstacle edge points the boid can see.
///
/// `points` are the nearest boundary points of every obstacle close enough
/// to matter; points behind the boid are ignored.
pub fn avoidance(boid: &Boid, points: &[Vector2D], limit: f32) -> Result<Vector2D, VectorError> {
    let position = boid.position();
    let mut steering = Vector2D::ZERO;
    let mut count = 0;

    for &point in points {
        if !in_field_of_view(position, boid.velocity(), point) {
            continue;
        }
        let distance = position.distance(point).max(EPSILON);
        steering.scaled_add((position - point).normalized(), 1.0 / distance)?;
        count += 1;
    }

    if count == 0 {
        return Ok(Vector2D::ZERO);
    }
    steering
        .normalize()
        .divide_by(count as f32)?
        .clamp_max(limit)?;
    Ok(steering)
}

// Separation, alignment and cohesion for one boid; avoidance is left at zero
pub fn flocking_forces(
    boid: &Boid,
    neighbors: &[Neighbor],
    params: &SimulationParams,
) -> Result<SteeringForces, VectorError> {
    let limit = params.acceleration_limit;
    Ok(SteeringForces {
        separation: separation(boid, neighbors, params.separation_radius, limit)?,
        alignment: alignment(boid, neighbors, params.alignment_radius, limit)?,
        cohesion: cohesion(boid, neighbors, params.cohesion_radius, limit)?,
        avoidance: Vector2D::ZERO,
    })
}
