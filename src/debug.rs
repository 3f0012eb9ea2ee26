/*
 * Debug Information Module
 *
 * This module defines the per-tick statistics recorded by the flock and the
 * DebugInfo struct the viewer shows next to the parameter controls.
 *
 * Includes metrics for:
 * - Tick counter and tick duration
 * - Quadtree candidates versus neighbors actually kept
 * - Obstacle collisions and currently stunned boids
 * - FPS and frame time of the host
 */

use std::time::Duration;

// Counters gathered during one `Flock::tick`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub boids: usize,
    pub quadtree_nodes: usize,
    // Ids returned by the quadtree before exact filtering
    pub candidates: usize,
    // Neighbors that passed the distance and field of view filters
    pub neighbors: usize,
    pub collisions: usize,
    pub stunned: usize,
    pub duration: Duration,
}

impl TickStats {
    // Share of quadtree candidates that turned out to be real neighbors
    pub fn candidate_hit_rate(&self) -> f32 {
        if self.candidates == 0 {
            0.0
        } else {
            self.neighbors as f32 / self.candidates as f32
        }
    }

    pub fn average_neighbors(&self) -> f32 {
        if self.boids == 0 {
            0.0
        } else {
            self.neighbors as f32 / self.boids as f32
        }
    }
}

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub last_tick: TickStats,
    pub paused: bool,
}

impl DebugInfo {
    pub fn record_frame(&mut self, frame_time: Duration) {
        self.frame_time = frame_time;
        let seconds = frame_time.as_secs_f32();
        if seconds > 0.0 {
            self.fps = 1.0 / seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_handle_empty_ticks() {
        let stats = TickStats::default();
        assert_eq!(stats.candidate_hit_rate(), 0.0);
        assert_eq!(stats.average_neighbors(), 0.0);

        let stats = TickStats {
            boids: 4,
            candidates: 20,
            neighbors: 8,
            ..TickStats::default()
        };
        assert_eq!(stats.candidate_hit_rate(), 0.4);
        assert_eq!(stats.average_neighbors(), 2.0);
    }

    #[test]
    fn frame_time_sets_fps() {
        let mut info = DebugInfo::default();
        info.record_frame(Duration::from_millis(20));
        assert!((info.fps - 50.0).abs() < 1e-3);
        info.record_frame(Duration::ZERO);
        assert!((info.fps - 50.0).abs() < 1e-3);
    }
}
