/*
 * Grid Path Module
 *
 * A small turtle-style builder for polygons that live on the background grid.
 * Each move walks a whole number of grid cells in one of eight directions
 * and records the vertex it lands on, so outlines such as the demo letters
 * can be written as a short chain of moves.
 *
 * The cursor is kept in integer grid cells and only converted to arena
 * coordinates when the ring is taken out, which keeps the vertices exactly
 * on grid intersections.
 */

use tracing::info;

use crate::error::FlockError;
use crate::obstacle::Obstacle;
use crate::vector::Vector2D;

#[derive(Debug, Clone)]
pub struct GridPath {
    origin: Vector2D,
    step: f32,
    cursor: (i32, i32),
    cells: Vec<(i32, i32)>,
}

impl GridPath {
    pub fn new(origin: Vector2D, step: f32) -> Self {
        Self {
            origin,
            step,
            cursor: (0, 0),
            cells: vec![(0, 0)],
        }
    }

    fn walk(mut self, dx: i32, dy: i32, steps: i32) -> Self {
        self.cursor.0 += dx * steps;
        self.cursor.1 += dy * steps;
        self.cells.push(self.cursor);
        self
    }

    // y grows downward, so "top" decreases y
    pub fn top(self, steps: i32) -> Self {
        self.walk(0, -1, steps)
    }

    pub fn top_right(self, steps: i32) -> Self {
        self.walk(1, -1, steps)
    }

    pub fn right(self, steps: i32) -> Self {
        self.walk(1, 0, steps)
    }

    pub fn bottom_right(self, steps: i32) -> Self {
        self.walk(1, 1, steps)
    }

    pub fn bottom(self, steps: i32) -> Self {
        self.walk(0, 1, steps)
    }

    pub fn bottom_left(self, steps: i32) -> Self {
        self.walk(-1, 1, steps)
    }

    pub fn left(self, steps: i32) -> Self {
        self.walk(-1, 0, steps)
    }

    pub fn top_left(self, steps: i32) -> Self {
        self.walk(-1, -1, steps)
    }

    // Visited cells, starting cell included
    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    pub fn is_closed(&self) -> bool {
        self.cells.len() > 1 && self.cells.first() == self.cells.last()
    }

    /// Arena-space vertices of the path.
    ///
    /// A path that walks back onto its starting cell drops the repeated
    /// closing vertex, since obstacles close their ring implicitly.
    pub fn into_ring(self) -> Result<Vec<Vector2D>, FlockError> {
        let closed = self.is_closed();
        let mut cells = self.cells;
        if closed {
            cells.pop();
        }

        let mut ring = Vec::with_capacity(cells.len());
        for (cx, cy) in cells {
            let offset = Vector2D::new(cx as f32 * self.step, cy as f32 * self.step)?;
            ring.push(self.origin + offset);
        }
        Ok(ring)
    }
}

// Block letters of the demo scene, drawn on a 4x5 (or so) cell grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    J,
    R,
    C,
}

impl Letter {
    pub fn outline(self, origin: Vector2D, grid_size: f32) -> GridPath {
        let path = GridPath::new(origin, grid_size);
        match self {
            Letter::J => path
                .right(4)
                .bottom(1)
                .left(1)
                .bottom(3)
                .bottom_left(1)
                .left(1)
                .top_left(1)
                .right(2)
                .top(3)
                .left(1)
                .top_left(1),
            Letter::R => path
                .right(3)
                .bottom_right(1)
                .bottom(1)
                .bottom_left(1)
                .left(1)
                .bottom_right(2)
                .left(1)
                .top_left(2)
                .bottom(2)
                .left(1)
                .top(5),
            Letter::C => path
                .right(2)
                .bottom_left(1)
                .left(1)
                .bottom(3)
                .right(2)
                .bottom_right(1)
                .left(3)
                .top_left(1)
                .top(3)
                .top_right(1),
        }
    }

    // Counter of the letter, only R has one
    pub fn hole(self, origin: Vector2D, grid_size: f32) -> Result<Option<GridPath>, FlockError> {
        match self {
            Letter::R => {
                let start = origin + Vector2D::new(grid_size, grid_size)?;
                Ok(Some(
                    GridPath::new(start, grid_size)
                        .right(2)
                        .bottom(1)
                        .left(2)
                        .top(1),
                ))
            }
            Letter::J | Letter::C => Ok(None),
        }
    }

    pub fn obstacle(self, origin: Vector2D, grid_size: f32) -> Result<Obstacle, FlockError> {
        let outline = self.outline(origin, grid_size).into_ring()?;
        let hole = match self.hole(origin, grid_size)? {
            Some(path) => Some(path.into_ring()?),
            None => None,
        };
        Obstacle::new(&outline, hole.as_deref())
    }
}

// Letters of the demo scene with the top-left corner of each
pub const DEMO_LETTERS: [(Letter, f32, f32); 3] = [
    (Letter::J, 240.0, 280.0),
    (Letter::R, 440.0, 280.0),
    (Letter::C, 680.0, 280.0),
];

pub fn demo_obstacles(grid_size: f32) -> Result<Vec<Obstacle>, FlockError> {
    let obstacles = DEMO_LETTERS
        .iter()
        .map(|&(letter, x, y)| letter.obstacle(Vector2D::new(x, y)?, grid_size))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = obstacles.len(), grid_size, "built demo obstacles");
    Ok(obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Vector2D {
        Vector2D::new(x, y).unwrap()
    }

    #[test]
    fn moves_walk_whole_cells() {
        let path = GridPath::new(p(10.0, 10.0), 5.0)
            .right(2)
            .bottom_right(1)
            .top(3);
        assert_eq!(path.cells(), &[(0, 0), (2, 0), (3, 1), (3, -2)]);
        assert!(!path.is_closed());

        let ring = path.into_ring().unwrap();
        assert_eq!(ring, vec![p(10.0, 10.0), p(20.0, 10.0), p(25.0, 15.0), p(25.0, 0.0)]);
    }

    #[test]
    fn closed_paths_drop_the_repeated_vertex() {
        let path = GridPath::new(p(0.0, 0.0), 1.0).right(1).bottom(1).left(1).top(1);
        assert!(path.is_closed());
        assert_eq!(path.into_ring().unwrap().len(), 4);
    }

    #[test]
    fn letters_are_closed_polygons() {
        for letter in [Letter::J, Letter::R, Letter::C] {
            let outline = letter.outline(p(0.0, 0.0), 40.0);
            assert!(outline.is_closed(), "{letter:?} outline does not close");
            let obstacle = letter.obstacle(p(0.0, 0.0), 40.0).unwrap();
            assert!(obstacle.segments().len() >= 3);
            let segments = obstacle.segments();
            for (i, segment) in segments.iter().enumerate() {
                assert_eq!(segment.end, segments[(i + 1) % segments.len()].start);
            }
        }
    }

    #[test]
    fn only_r_has_a_hole() {
        let origin = p(440.0, 280.0);
        let r = Letter::R.obstacle(origin, 40.0).unwrap();
        let hole = r.hole().unwrap();
        assert_eq!(hole, &[p(480.0, 320.0), p(560.0, 320.0), p(560.0, 360.0), p(480.0, 360.0)]);
        assert!(Letter::J.obstacle(origin, 40.0).unwrap().hole().is_none());
        assert!(Letter::C.obstacle(origin, 40.0).unwrap().hole().is_none());
    }

    #[test]
    fn letter_bodies_are_solid() {
        // Inside the J's top bar and outside past its right edge
        let j = Letter::J.obstacle(p(240.0, 280.0), 40.0).unwrap();
        assert!(j.contains_point(p(300.0, 300.0)));
        assert!(!j.contains_point(p(420.0, 300.0)));

        let demo = demo_obstacles(40.0).unwrap();
        assert_eq!(demo.len(), DEMO_LETTERS.len());
    }
}
