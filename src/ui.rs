/*
 * UI Module
 *
 * This module contains the egui control panel of the viewer. It exposes the
 * flocking weights, perception radii, speed band and spawning controls, and
 * shows the statistics of the last tick.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SimulationParams;

// Draw the panel; returns true when any parameter was edited this frame
pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    paused: &mut bool,
    debug_info: &DebugInfo,
) -> bool {
    let before = params.clone();
    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Boid Parameters", |ui| {
                ui.add(egui::Slider::new(&mut params.boid_count, SimulationParams::get_boid_count_range()).text("Number of Boids"));
                ui.add(egui::Slider::new(&mut params.min_speed, SimulationParams::get_speed_range()).text("Min Speed"));
                ui.add(egui::Slider::new(&mut params.max_speed, SimulationParams::get_speed_range()).text("Max Speed"));
                ui.add(egui::Slider::new(&mut params.heading_jitter_degrees, SimulationParams::get_jitter_range()).text("Heading Jitter (deg)"));
            });

            ui.collapsing("Flocking Behavior", |ui| {
                ui.add(egui::Slider::new(&mut params.separation_factor, SimulationParams::get_weight_range()).text("Separation Weight"));
                ui.add(egui::Slider::new(&mut params.alignment_factor, SimulationParams::get_weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut params.cohesion_factor, SimulationParams::get_weight_range()).text("Cohesion Weight"));
                ui.add(egui::Slider::new(&mut params.separation_radius, SimulationParams::get_radius_range()).text("Separation Radius"));
                ui.add(egui::Slider::new(&mut params.alignment_radius, SimulationParams::get_radius_range()).text("Alignment Radius"));
                ui.add(egui::Slider::new(&mut params.cohesion_radius, SimulationParams::get_radius_range()).text("Cohesion Radius"));
                ui.add(egui::Slider::new(&mut params.acceleration_limit, SimulationParams::get_acceleration_range()).text("Acceleration Limit"));
            });

            ui.collapsing("Obstacles", |ui| {
                ui.add(egui::Slider::new(&mut params.avoidance_threshold, SimulationParams::get_avoidance_range()).text("Avoidance Threshold"));
            });

            ui.collapsing("Statistics", |ui| {
                let stats = &debug_info.last_tick;
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Tick: {}", stats.tick));
                ui.label(format!("Boids: {}", stats.boids));
                ui.label(format!("Quadtree nodes: {}", stats.quadtree_nodes));
                ui.label(format!("Avg neighbors: {:.2}", stats.average_neighbors()));
                ui.label(format!("Candidate hit rate: {:.0}%", stats.candidate_hit_rate() * 100.0));
                ui.label(format!("Collisions: {}", stats.collisions));
                ui.label(format!("Stunned: {}", stats.stunned));
                ui.label(format!("Tick time: {:.3} ms", stats.duration.as_secs_f64() * 1000.0));
            });

            ui.checkbox(paused, "Pause Simulation (Space, '.' steps)");
        });

    *params != before
}
