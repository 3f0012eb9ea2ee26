/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that holds every tunable
 * constant of the flock: speed band, perception radii, rule weights,
 * obstacle avoidance reach, arena size and quadtree shape. Parameters can be
 * edited live from the viewer UI or loaded from a JSON document; either way
 * they go through `validate` before the simulation accepts them.
 */

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::FlockError;
use crate::quadtree::Rect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    // Speed band for free-flying boids
    pub min_speed: f32,
    pub max_speed: f32,

    // Perception radii
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,

    // Rule weights used when blending the steering forces
    pub separation_factor: f32,
    pub alignment_factor: f32,
    pub cohesion_factor: f32,

    // Obstacles closer than this (bounding box first, then edges) repel
    pub avoidance_threshold: f32,
    // Per-rule steering clamp
    pub acceleration_limit: f32,
    // Random heading wobble per tick, in degrees either side
    pub heading_jitter_degrees: f32,

    pub grid_size: f32,
    pub arena_width: f32,
    pub arena_height: f32,

    pub quadtree_max_objects: usize,
    pub quadtree_max_depth: usize,

    // Host spawning: target population and ticks between two spawns
    pub boid_count: usize,
    pub spawn_interval: u32,

    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            min_speed: 1.5,
            max_speed: 3.0,
            separation_radius: 20.0,
            alignment_radius: 60.0,
            cohesion_radius: 60.0,
            separation_factor: 1.5,
            alignment_factor: 1.0,
            cohesion_factor: 1.6,
            avoidance_threshold: 100.0,
            acceleration_limit: 0.1,
            heading_jitter_degrees: 2.0,
            grid_size: 40.0,
            arena_width: 1280.0,
            arena_height: 720.0,
            quadtree_max_objects: 10,
            quadtree_max_depth: 4,
            boid_count: 200,
            spawn_interval: 1,
            seed: None,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), FlockError> {
        let finite = [
            self.min_speed,
            self.max_speed,
            self.separation_radius,
            self.alignment_radius,
            self.cohesion_radius,
            self.separation_factor,
            self.alignment_factor,
            self.cohesion_factor,
            self.avoidance_threshold,
            self.acceleration_limit,
            self.heading_jitter_degrees,
            self.grid_size,
            self.arena_width,
            self.arena_height,
        ];
        if finite.iter().any(|value| !value.is_finite()) {
            return Err(FlockError::InvalidConfig("parameters must be finite numbers"));
        }
        if self.min_speed < 0.0 || self.min_speed > self.max_speed {
            return Err(FlockError::InvalidConfig(
                "speed band must satisfy 0 <= min_speed <= max_speed",
            ));
        }
        if self.separation_radius <= 0.0 || self.alignment_radius <= 0.0 || self.cohesion_radius <= 0.0 {
            return Err(FlockError::InvalidConfig("perception radii must be positive"));
        }
        if self.avoidance_threshold < 0.0 || self.acceleration_limit < 0.0 || self.heading_jitter_degrees < 0.0 {
            return Err(FlockError::InvalidConfig(
                "avoidance threshold, acceleration limit and jitter must not be negative",
            ));
        }
        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(FlockError::InvalidConfig("arena must have a positive size"));
        }
        if self.grid_size <= 0.0 {
            return Err(FlockError::InvalidConfig("grid size must be positive"));
        }
        if self.quadtree_max_objects == 0 {
            return Err(FlockError::InvalidConfig("quadtree nodes must hold at least one object"));
        }
        Ok(())
    }

    // Parse a JSON document; missing fields keep their defaults
    pub fn from_json(source: &str) -> Result<Self, FlockError> {
        let params: SimulationParams = serde_json::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, FlockError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn arena_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.arena_width, self.arena_height)
    }

    // Neighbor query reach: the widest of the three rule radii
    pub fn neighbor_radius(&self) -> f32 {
        self.separation_radius
            .max(self.alignment_radius)
            .max(self.cohesion_radius)
    }

    // Get parameter ranges for UI sliders
    pub fn get_boid_count_range() -> RangeInclusive<usize> {
        0..=2000
    }

    pub fn get_speed_range() -> RangeInclusive<f32> {
        0.0..=10.0
    }

    pub fn get_weight_range() -> RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn get_radius_range() -> RangeInclusive<f32> {
        5.0..=150.0
    }

    pub fn get_avoidance_range() -> RangeInclusive<f32> {
        0.0..=200.0
    }

    pub fn get_acceleration_range() -> RangeInclusive<f32> {
        0.01..=1.0
    }

    pub fn get_jitter_range() -> RangeInclusive<f32> {
        0.0..=10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_speed_band() {
        let params = SimulationParams {
            min_speed: 4.0,
            max_speed: 2.0,
            ..SimulationParams::default()
        };
        assert!(matches!(params.validate(), Err(FlockError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_positive_radius_and_nan() {
        let params = SimulationParams {
            separation_radius: 0.0,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());

        let params = SimulationParams {
            cohesion_factor: f32::NAN,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let params = SimulationParams::from_json(r#"{ "max_speed": 5.0, "seed": 9 }"#).unwrap();
        assert_eq!(params.max_speed, 5.0);
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.cohesion_radius, SimulationParams::default().cohesion_radius);
    }

    #[test]
    fn json_rejects_unknown_fields_and_invalid_values() {
        assert!(matches!(
            SimulationParams::from_json(r#"{ "warp_factor": 9 }"#),
            Err(FlockError::ConfigFormat(_))
        ));
        assert!(matches!(
            SimulationParams::from_json(r#"{ "arena_width": -1.0 }"#),
            Err(FlockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn neighbor_radius_covers_every_rule() {
        let params = SimulationParams {
            alignment_radius: 40.0,
            cohesion_radius: 70.0,
            ..SimulationParams::default()
        };
        assert_eq!(params.neighbor_radius(), 70.0);

        let wide_separation = SimulationParams {
            separation_radius: 100.0,
            alignment_radius: 30.0,
            cohesion_radius: 30.0,
            ..SimulationParams::default()
        };
        assert_eq!(wide_separation.neighbor_radius(), 100.0);
    }
}
