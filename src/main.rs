/*
 * Boid Flocking Simulation
 *
 * Entry point of the viewer. Logging is configured through RUST_LOG, e.g.
 * `RUST_LOG=flocking=debug` prints a summary line for every tick. An
 * optional first argument names a JSON file with simulation parameters.
 */

use flocking::app::{model, update};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn main() {
    init_tracing();
    nannou::app(model).update(update).run();
}
