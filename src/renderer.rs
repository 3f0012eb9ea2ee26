/*
 * Renderer Module
 *
 * This module draws the simulation: the background grid, the obstacle
 * outlines and every boid as a small triangle pointing along its velocity.
 *
 * The simulation uses screen-style coordinates with the origin in the
 * top-left corner and y growing downward; nannou puts the origin in the
 * window center with y growing upward, so every point goes through
 * `to_screen` first.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::boid::Boid;
use crate::obstacle::Obstacle;
use crate::params::SimulationParams;
use crate::vector::Vector2D;
use crate::BOID_SIZE;

const BACKGROUND: (f32, f32, f32) = (0.12, 0.13, 0.17);
const OBSTACLE_STROKE: f32 = 3.0;

// Arena coordinates to nannou window coordinates
pub fn to_screen(point: Vector2D, params: &SimulationParams) -> Point2 {
    pt2(
        point.x() - params.arena_width / 2.0,
        params.arena_height / 2.0 - point.y(),
    )
}

/// Boid colour as RGB: red right after a crash, fading to yellow while it
/// recovers. Free boids are yellow.
pub fn boid_color(boid: &Boid) -> (f32, f32, f32) {
    (1.0, boid.recovery_progress(), 0.0)
}

// Triangle corners in arena coordinates, nose first
fn boid_triangle(boid: &Boid) -> [Vector2D; 3] {
    let scale = BOID_SIZE / 10.0;
    let (sin, cos) = boid.heading().sin_cos();
    let corner = |x: f32, y: f32| {
        let (x, y) = (x * scale, y * scale);
        let offset = Vector2D::new(x * cos - y * sin, x * sin + y * cos).unwrap_or_default();
        boid.position() + offset
    };
    [corner(16.0, 0.0), corner(-10.0, -10.0), corner(-10.0, 10.0)]
}

// Obstacles are stroked, never filled: the outer ring plus the hole ring if
// there is one, so the grid shows through both
fn obstacle_rings(obstacle: &Obstacle, params: &SimulationParams) -> Vec<Vec<Point2>> {
    let mut rings = vec![obstacle.vertices().map(|v| to_screen(v, params)).collect()];
    if let Some(hole) = obstacle.hole() {
        rings.push(hole.iter().map(|&v| to_screen(v, params)).collect());
    }
    rings
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let params = model.flock.params();
    let (r, g, b) = BACKGROUND;
    draw.background().color(rgb(r, g, b));

    draw_grid(&draw, params);

    for obstacle in model.flock.obstacles() {
        for ring in obstacle_rings(obstacle, params) {
            draw.polyline()
                .weight(OBSTACLE_STROKE)
                .join_round()
                .points_closed(ring)
                .color(WHITE);
        }
    }

    for boid in model.flock.boids() {
        let [nose, left, right] = boid_triangle(boid);
        let (red, green, blue) = boid_color(boid);
        draw.tri()
            .points(
                to_screen(nose, params),
                to_screen(left, params),
                to_screen(right, params),
            )
            .color(rgb(red, green, blue));
    }

    // Errors here mean the frame is being torn down; nothing to recover
    let _ = draw.to_frame(app, &frame);
    let _ = model.egui.draw_to_frame(&frame);
}

// Lines every `grid_size` units across the whole arena
fn draw_grid(draw: &Draw, params: &SimulationParams) {
    let color = rgba(1.0, 1.0, 1.0, 0.08);
    let (half_w, half_h) = (params.arena_width / 2.0, params.arena_height / 2.0);

    let mut x = 0.0;
    while x <= params.arena_width {
        draw.line()
            .start(pt2(x - half_w, half_h))
            .end(pt2(x - half_w, -half_h))
            .weight(1.0)
            .color(color);
        x += params.grid_size;
    }

    let mut y = 0.0;
    while y <= params.arena_height {
        draw.line()
            .start(pt2(-half_w, half_h - y))
            .end(pt2(half_w, half_h - y))
            .weight(1.0)
            .color(color);
        y += params.grid_size;
    }
}
