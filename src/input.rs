/*
 * Input Module
 *
 * This module handles user input events for the viewer.
 *
 * Features:
 * - Space toggles pause
 * - Period advances exactly one tick while paused
 * - Raw window events are forwarded to egui
 */

use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use tracing::debug;

use crate::app::Model;

// Key pressed event handler
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    match key {
        Key::Space => {
            model.paused = !model.paused;
            debug!(paused = model.paused, "toggled pause");
        }
        Key::Period if model.paused => {
            model.step_requested = true;
        }
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    model.egui.handle_raw_event(event);
}
