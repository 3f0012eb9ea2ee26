/*
 * Application Module
 *
 * This module defines the viewer model and its update loop. The viewer is a
 * thin host around `Flock`: it owns the window and the egui panel, feeds
 * parameter edits back into the simulation, drips new boids in at the spawn
 * point until the target population is reached, and ticks the flock once
 * per frame unless paused.
 */

use std::path::Path;

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{error, info, warn};

use crate::debug::DebugInfo;
use crate::flock::{BoidId, Flock};
use crate::grid_path;
use crate::input::{key_pressed, raw_window_event};
use crate::params::SimulationParams;
use crate::renderer::view;
use crate::ui;
use crate::SPAWN_POINT;

// Frame rate one tick unit is calibrated against
const REFERENCE_FPS: f32 = 60.0;
// Longest frame fed to the simulation, so a stalled window does not teleport boids
const MAX_TICK_DELTA: f32 = 3.0;

// Main model for the application
pub struct Model {
    pub flock: Flock,
    // Working copy edited by the UI, pushed into the flock when it changes
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub paused: bool,
    pub step_requested: bool,
    pub ticks_since_spawn: u32,
}

// Parameters from the JSON file named by the first argument, or the defaults
pub fn load_params() -> SimulationParams {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationParams::default();
    };
    match read_params(Path::new(&path)) {
        Ok(params) => {
            info!(%path, "loaded simulation parameters");
            params
        }
        Err(err) => {
            warn!(%path, %err, "falling back to default parameters");
            SimulationParams::default()
        }
    }
}

fn read_params(path: &Path) -> Result<SimulationParams, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    Ok(SimulationParams::from_json(&source)?)
}

fn fatal(context: &str, err: impl std::fmt::Debug) -> ! {
    error!(?err, "{context}");
    std::process::exit(1);
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let params = load_params();

    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(params.arena_width as u32, params.arena_height as u32)
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .unwrap_or_else(|err| fatal("failed to open window", err));

    let window = app
        .window(window_id)
        .unwrap_or_else(|| fatal("window closed during startup", "missing window"));
    let egui = Egui::from_window(&window);

    let mut flock = Flock::new(params.clone()).unwrap_or_else(|err| fatal("invalid parameters", err));
    match grid_path::demo_obstacles(params.grid_size) {
        Ok(obstacles) => {
            for obstacle in obstacles {
                flock.add_obstacle(obstacle);
            }
        }
        Err(err) => warn!(%err, "skipping demo obstacles"),
    }

    Model {
        flock,
        params,
        egui,
        debug_info: DebugInfo::default(),
        paused: false,
        step_requested: false,
        ticks_since_spawn: 0,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.record_frame(update.since_last);
    model.debug_info.fps = app.fps();
    model.debug_info.paused = model.paused;

    if ui::update_ui(&mut model.egui, &mut model.params, &mut model.paused, &model.debug_info) {
        apply_params(model);
    }

    let step = std::mem::take(&mut model.step_requested);
    if model.paused && !step {
        return;
    }

    spawn_boids(model);

    let delta = (update.since_last.as_secs_f32() * REFERENCE_FPS).min(MAX_TICK_DELTA);
    if let Err(err) = model.flock.tick(delta) {
        warn!(%err, "skipped simulation tick");
    }
    model.debug_info.last_tick = *model.flock.stats();
}

fn apply_params(model: &mut Model) {
    if let Err(err) = model.flock.set_params(model.params.clone()) {
        warn!(%err, "rejected parameter change");
        model.params = model.flock.params().clone();
    }
}

// One new boid every `spawn_interval` ticks until the target count; extra boids are dropped
fn spawn_boids(model: &mut Model) {
    let target = model.params.boid_count;
    while model.flock.boids().len() > target {
        let last = BoidId::from_index(model.flock.boids().len() - 1);
        model.flock.remove_boid(last);
    }

    if model.flock.boids().len() >= target {
        return;
    }
    model.ticks_since_spawn += 1;
    if model.ticks_since_spawn < model.params.spawn_interval {
        return;
    }
    model.ticks_since_spawn = 0;

    let (x, y) = SPAWN_POINT;
    if let Err(err) = model.flock.create_boid(x, y) {
        warn!(%err, "failed to spawn boid");
    }
}
