/*
 * QuadTree Module
 *
 * This module defines the QuadTree used for neighbor lookups. It partitions
 * the arena into four quadrants recursively so a radius query only has to
 * look at the branches its query box can touch.
 *
 * The tree is rebuilt from scratch every tick:
 * - entries are agent indices plus the position they were inserted with,
 *   so the tree never owns agent data
 * - there is no incremental move/remove, stale positions cannot leak
 *   across ticks
 *
 * Coordinates are screen-style: y grows downward, so "top" means smaller y.
 * Quadrant numbering is 0 = top-right, 1 = top-left, 2 = bottom-left,
 * 3 = bottom-right.
 */

use crate::vector::Vector2D;

// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    // Square of side 2 * half_extent centered on `center`
    pub fn centered(center: Vector2D, half_extent: f32) -> Self {
        Self {
            x: center.x() - half_extent,
            y: center.y() - half_extent,
            width: half_extent * 2.0,
            height: half_extent * 2.0,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, point: Vector2D) -> bool {
        point.x() >= self.left()
            && point.x() <= self.right()
            && point.y() >= self.top()
            && point.y() <= self.bottom()
    }

    // Squared distance from the point to the closest point of the rectangle (0 inside)
    pub fn distance_squared_to(&self, point: Vector2D) -> f32 {
        let dx = point.x() - point.x().clamp(self.left(), self.right());
        let dy = point.y() - point.y().clamp(self.top(), self.bottom());
        dx * dx + dy * dy
    }

    fn quadrants(&self) -> [Rect; 4] {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        [
            Rect::new(self.x + half_width, self.y, half_width, half_height),
            Rect::new(self.x, self.y, half_width, half_height),
            Rect::new(self.x, self.y + half_height, half_width, half_height),
            Rect::new(self.x + half_width, self.y + half_height, half_width, half_height),
        ]
    }

    // Quadrant strictly containing the point. Points on a dividing line or
    // outside the rectangle straddle and get None.
    fn point_quadrant(&self, point: Vector2D) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        let (mid_x, mid_y) = (self.center_x(), self.center_y());
        quadrant_index(
            point.x() < mid_x,
            point.x() > mid_x,
            point.y() < mid_y,
            point.y() > mid_y,
        )
    }

    // Quadrant whose side of both dividing lines holds the whole region
    fn region_quadrant(&self, region: &Rect) -> Option<usize> {
        let (mid_x, mid_y) = (self.center_x(), self.center_y());
        quadrant_index(
            region.right() <= mid_x,
            region.left() >= mid_x,
            region.bottom() <= mid_y,
            region.top() >= mid_y,
        )
    }
}

#[inline]
fn quadrant_index(left: bool, right: bool, top: bool, bottom: bool) -> Option<usize> {
    if right && top {
        Some(0)
    } else if left && top {
        Some(1)
    } else if left && bottom {
        Some(2)
    } else if right && bottom {
        Some(3)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: usize,
    point: Vector2D,
}

#[derive(Debug)]
struct Node {
    bounds: Rect,
    objects: Vec<Entry>,
    children: Option<Box<[Node; 4]>>,
    depth: usize,
}

impl Node {
    fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            objects: Vec::new(),
            children: None,
            depth,
        }
    }

    fn insert(&mut self, entry: Entry, max_objects: usize, max_depth: usize) {
        let bounds = self.bounds;

        if let Some(children) = self.children.as_mut() {
            if let Some(quadrant) = bounds.point_quadrant(entry.point) {
                children[quadrant].insert(entry, max_objects, max_depth);
                return;
            }
        }

        self.objects.push(entry);

        if self.objects.len() > max_objects && self.depth < max_depth {
            let depth = self.depth;
            let children = self.children.get_or_insert_with(|| {
                let [a, b, c, d] = bounds.quadrants();
                Box::new([
                    Node::new(a, depth + 1),
                    Node::new(b, depth + 1),
                    Node::new(c, depth + 1),
                    Node::new(d, depth + 1),
                ])
            });

            // Push everything that fits a single quadrant down, keep straddlers
            for entry in std::mem::take(&mut self.objects) {
                match bounds.point_quadrant(entry.point) {
                    Some(quadrant) => children[quadrant].insert(entry, max_objects, max_depth),
                    None => self.objects.push(entry),
                }
            }
        }
    }

    fn retrieve(&self, region: &Rect, out: &mut Vec<usize>) {
        out.extend(self.objects.iter().map(|entry| entry.id));

        if let Some(children) = &self.children {
            match self.bounds.region_quadrant(region) {
                Some(quadrant) => children[quadrant].retrieve(region, out),
                // The region crosses a dividing line; fall back to every branch
                None => {
                    for child in children.iter() {
                        child.retrieve(region, out);
                    }
                }
            }
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(Node::node_count).sum())
    }

    fn max_depth_reached(&self) -> usize {
        self.children.as_ref().map_or(self.depth, |children| {
            children
                .iter()
                .map(Node::max_depth_reached)
                .max()
                .unwrap_or(self.depth)
        })
    }
}

#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    max_objects: usize,
    max_depth: usize,
    len: usize,
}

impl QuadTree {
    pub fn new(bounds: Rect, max_objects: usize, max_depth: usize) -> Self {
        Self {
            root: Node::new(bounds, 0),
            max_objects,
            max_depth,
            len: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    pub fn clear(&mut self) {
        self.root = Node::new(self.root.bounds, 0);
        self.len = 0;
    }

    pub fn insert(&mut self, id: usize, point: Vector2D) {
        self.root
            .insert(Entry { id, point }, self.max_objects, self.max_depth);
        self.len += 1;
    }

    /// Ids of every entry that may lie within `radius` of `point`.
    ///
    /// The result is a superset of the true neighbor set: callers still
    /// filter by exact squared distance.
    pub fn retrieve(&self, point: Vector2D, radius: f32) -> Vec<usize> {
        let mut out = Vec::new();
        self.retrieve_into(point, radius, &mut out);
        out
    }

    // Same as `retrieve` but appends into a caller-owned buffer
    pub fn retrieve_into(&self, point: Vector2D, radius: f32, out: &mut Vec<usize>) {
        let region = Rect::centered(point, radius.max(0.0));
        self.root.retrieve(&region, out);
    }

    // Clear and reinsert every position, using its index as the id
    pub fn update<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vector2D>,
    {
        self.clear();
        for (id, point) in positions.into_iter().enumerate() {
            self.insert(id, point);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn depth(&self) -> usize {
        self.root.max_depth_reached()
    }
}
