/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure of the flocking crate.
 * The simulation core (vectors, quadtree, obstacles, boids, steering and the
 * flock itself) has no graphics dependency; the nannou viewer modules are
 * only compiled with the `viewer` feature.
 */

// Re-export key components for easier access
pub use boid::{Boid, MotionState};
pub use debug::{DebugInfo, TickStats};
pub use error::{FlockError, VectorError};
pub use flock::{BoidId, Flock, ObstacleId};
pub use grid_path::{GridPath, Letter};
pub use obstacle::{Obstacle, Segment};
pub use params::SimulationParams;
pub use physics::{Neighbor, SteeringForces};
pub use quadtree::{QuadTree, Rect};
pub use vector::Vector2D;

// Define modules
pub mod boid;
pub mod debug;
pub mod error;
pub mod flock;
pub mod grid_path;
pub mod obstacle;
pub mod params;
pub mod physics;
pub mod quadtree;
pub mod vector;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod input;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;

// Constants
pub const BOID_SIZE: f32 = 6.0;
// Where the viewer drops new boids
pub const SPAWN_POINT: (f32, f32) = (100.0, 100.0);
