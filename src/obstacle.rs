/*
 * Obstacle Module
 *
 * A solid polygonal obstacle built from a closed ring of boundary segments.
 * Boids never enter an obstacle on purpose: the simulation steers them away
 * from nearby edges and, if one still ends up inside, ejects it back onto the
 * boundary using the queries below.
 *
 * An optional hole ring is carried for drawing only; collision queries look
 * at the outer ring alone.
 */

use tracing::warn;

use crate::error::FlockError;
use crate::quadtree::Rect;
use crate::vector::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vector2D,
    pub end: Vector2D,
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    segments: Vec<Segment>,
    hole: Option<Vec<Vector2D>>,
    bounds: Rect,
}

impl Obstacle {
    pub fn new(vertices: &[Vector2D], hole: Option<&[Vector2D]>) -> Result<Self, FlockError> {
        if vertices.len() < 3 {
            return Err(FlockError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }

        let segments = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(&start, &end)| Segment { start, end })
            .collect();

        let hole = match hole {
            Some(ring) if ring.len() >= 3 => Some(ring.to_vec()),
            Some(ring) => {
                warn!(points = ring.len(), "ignoring obstacle hole with fewer than 3 points");
                None
            }
            None => None,
        };

        Ok(Self {
            segments,
            hole,
            bounds: bounding_box(vertices),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    // Outer ring vertices in construction order
    pub fn vertices(&self) -> impl Iterator<Item = Vector2D> + '_ {
        self.segments.iter().map(|segment| segment.start)
    }

    pub fn hole(&self) -> Option<&[Vector2D]> {
        self.hole.as_deref()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Closest point to `point` on the segment `start..end`.
    ///
    /// The projection parameter is clamped to [0, 1]; a zero-length segment
    /// returns `start`.
    pub fn nearest_point_on_segment(point: Vector2D, start: Vector2D, end: Vector2D) -> Vector2D {
        let start_to_point = point - start;
        let start_to_end = end - start;
        let length_squared = start_to_end.magnitude_squared();
        if length_squared == 0.0 {
            return start;
        }
        let t = start_to_point.dot(start_to_end) / length_squared;
        start.lerp(end, t)
    }

    pub fn distance_to_edge(&self, point: Vector2D) -> f32 {
        point.distance(self.push_to_nearest_edge(point))
    }

    pub fn is_near_edge(&self, point: Vector2D, threshold: f32) -> bool {
        self.segments.iter().any(|segment| {
            let nearest = Self::nearest_point_on_segment(point, segment.start, segment.end);
            point.distance(nearest) < threshold
        })
    }

    // Ray-casting parity test: cast a ray toward +x and count edge crossings
    pub fn contains_point(&self, point: Vector2D) -> bool {
        let (px, py) = (point.x(), point.y());
        let mut inside = false;
        for segment in &self.segments {
            let (ax, ay) = (segment.start.x(), segment.start.y());
            let (bx, by) = (segment.end.x(), segment.end.y());
            if (ay > py) != (by > py) {
                let crossing_x = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < crossing_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    // Per-edge nearest points lying strictly within `radius`
    pub fn nearest_points_within(&self, point: Vector2D, radius: f32) -> Vec<Vector2D> {
        let radius_squared = radius * radius;
        self.segments
            .iter()
            .map(|segment| Self::nearest_point_on_segment(point, segment.start, segment.end))
            .filter(|nearest| nearest.distance_squared(point) < radius_squared)
            .collect()
    }

    /// Global nearest boundary point, used to eject a point that has
    /// penetrated the polygon.
    pub fn push_to_nearest_edge(&self, point: Vector2D) -> Vector2D {
        let mut best = point;
        let mut best_distance = f32::INFINITY;
        for segment in &self.segments {
            let nearest = Self::nearest_point_on_segment(point, segment.start, segment.end);
            let distance = nearest.distance_squared(point);
            if distance < best_distance {
                best_distance = distance;
                best = nearest;
            }
        }
        best
    }

    // O(1) pre-filter against the bounding box before any per-segment work
    pub fn is_near_bounds(&self, point: Vector2D, radius: f32) -> bool {
        self.bounds.distance_squared_to(point) < radius * radius
    }

    pub fn resolve_collision(&self, point: Vector2D) -> Vector2D {
        if self.contains_point(point) {
            self.push_to_nearest_edge(point)
        } else {
            point
        }
    }

    pub fn resolve_collisions(&self, points: &[Vector2D]) -> Vec<Vector2D> {
        points.iter().map(|&point| self.resolve_collision(point)).collect()
    }
}

fn bounding_box(vertices: &[Vector2D]) -> Rect {
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for vertex in vertices {
        min_x = min_x.min(vertex.x());
        min_y = min_y.min(vertex.y());
        max_x = max_x.max(vertex.x());
        max_y = max_y.max(vertex.y());
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}
