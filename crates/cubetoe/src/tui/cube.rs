//! Cube geometry: rotation, projection and hit testing.
//!
//! World coordinates are centred on the cube with y pointing up and z
//! towards the viewer. The board lives on the front face (z = +half), row 0
//! at the top. Projection is orthographic; everything returned here is in
//! world units and is mapped to terminal cells by [`Viewport`].

use derive_new::new;
use ratatui::layout::{Position as TermPosition, Rect};

/// Edge length of the cube in world units.
pub const CUBE_SIZE: f64 = 300.0;
/// Backwards tilt about the X axis.
pub const TILT_X_DEGREES: f64 = 15.0;
/// Sideways turn about the Y axis.
pub const TILT_Y_DEGREES: f64 = -20.0;
/// Projection scale.
pub const SCALE: f64 = 0.9;

/// Half-size of the square of world space that must always be visible.
const VIEW_EXTENT: f64 = 300.0;

/// A point or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Vec3 {
    /// Right.
    pub x: f64,
    /// Up.
    pub y: f64,
    /// Towards the viewer.
    pub z: f64,
}

/// A projected point in world units, y up.
pub type Point2 = (f64, f64);

/// Pose of the cube for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubeTransform {
    /// Flip rotation about Y, in degrees.
    pub flip_degrees: f64,
    /// Screen-space displacement, used by the shake.
    pub offset: Point2,
}

impl CubeTransform {
    /// The pose at rest.
    pub fn resting() -> Self {
        Self::default()
    }

    /// Pose with the given flip angle and shake offset.
    pub fn with(flip_degrees: f64, offset: Point2) -> Self {
        Self {
            flip_degrees,
            offset,
        }
    }

    /// Applies flip, then the Y tilt, then the X tilt.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let (x, z) = rotate_y(v.x, v.z, self.flip_degrees.to_radians());
        let (x, z) = rotate_y(x, z, TILT_Y_DEGREES.to_radians());
        let tilt_x = TILT_X_DEGREES.to_radians();
        let y = v.y * tilt_x.cos() - z * tilt_x.sin();
        let z = v.y * tilt_x.sin() + z * tilt_x.cos();
        Vec3 { x, y, z }
    }

    /// Projects a world point onto the screen plane.
    pub fn project(&self, v: Vec3) -> Point2 {
        let r = self.rotate(v);
        (r.x * SCALE + self.offset.0, r.y * SCALE + self.offset.1)
    }

    /// Rotates a face normal; positive z faces the viewer.
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.rotate(normal)
    }

    /// Depth of a face centre after rotation, larger is nearer.
    pub fn depth(&self, center: Vec3) -> f64 {
        self.rotate(center).z
    }
}

fn rotate_y(x: f64, z: f64, angle: f64) -> (f64, f64) {
    (
        x * angle.cos() + z * angle.sin(),
        -x * angle.sin() + z * angle.cos(),
    )
}

/// The six faces of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// Carries the board.
    Front,
    /// Opposite the board.
    Back,
    /// y+.
    Top,
    /// y-.
    Bottom,
    /// x+.
    Right,
    /// x-.
    Left,
}

struct FaceDef {
    kind: FaceKind,
    corners: [usize; 4],
    normal: Vec3,
    center: Vec3,
}

/// A face ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFace {
    /// Which face this is.
    pub kind: FaceKind,
    /// Projected corners in drawing order.
    pub corners: [Point2; 4],
    /// Depth used for ordering.
    pub depth: f64,
}

fn half() -> f64 {
    CUBE_SIZE / 2.0
}

fn vertices() -> [Vec3; 8] {
    let h = half();
    [
        Vec3::new(-h, h, h),
        Vec3::new(h, h, h),
        Vec3::new(h, -h, h),
        Vec3::new(-h, -h, h),
        Vec3::new(-h, h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(-h, -h, -h),
    ]
}

fn faces() -> [FaceDef; 6] {
    let h = half();
    [
        FaceDef {
            kind: FaceKind::Front,
            corners: [0, 1, 2, 3],
            normal: Vec3::new(0.0, 0.0, 1.0),
            center: Vec3::new(0.0, 0.0, h),
        },
        FaceDef {
            kind: FaceKind::Back,
            corners: [5, 4, 7, 6],
            normal: Vec3::new(0.0, 0.0, -1.0),
            center: Vec3::new(0.0, 0.0, -h),
        },
        FaceDef {
            kind: FaceKind::Top,
            corners: [0, 1, 5, 4],
            normal: Vec3::new(0.0, 1.0, 0.0),
            center: Vec3::new(0.0, h, 0.0),
        },
        FaceDef {
            kind: FaceKind::Bottom,
            corners: [3, 2, 6, 7],
            normal: Vec3::new(0.0, -1.0, 0.0),
            center: Vec3::new(0.0, -h, 0.0),
        },
        FaceDef {
            kind: FaceKind::Right,
            corners: [1, 2, 6, 5],
            normal: Vec3::new(1.0, 0.0, 0.0),
            center: Vec3::new(h, 0.0, 0.0),
        },
        FaceDef {
            kind: FaceKind::Left,
            corners: [0, 3, 7, 4],
            normal: Vec3::new(-1.0, 0.0, 0.0),
            center: Vec3::new(-h, 0.0, 0.0),
        },
    ]
}

impl ProjectedFace {
    /// Lines splitting the face into a 3x3 grid.
    ///
    /// Projection is affine, so interpolating the projected corners is exact.
    pub fn grid(&self) -> Vec<(Point2, Point2)> {
        let [a, b, c, d] = self.corners;
        [1.0 / 3.0, 2.0 / 3.0]
            .into_iter()
            .flat_map(|t| [(lerp(a, b, t), lerp(d, c, t)), (lerp(a, d, t), lerp(b, c, t))])
            .collect()
    }
}

fn lerp(p: Point2, q: Point2, t: f64) -> Point2 {
    (p.0 + (q.0 - p.0) * t, p.1 + (q.1 - p.1) * t)
}

/// Faces turned towards the viewer, farthest first.
pub fn visible_faces(transform: &CubeTransform) -> Vec<ProjectedFace> {
    let projected = vertices().map(|v| transform.project(v));
    let mut visible: Vec<ProjectedFace> = faces()
        .into_iter()
        .filter(|face| transform.transform_normal(face.normal).z > -0.01)
        .map(|face| ProjectedFace {
            kind: face.kind,
            corners: face.corners.map(|i| projected[i]),
            depth: transform.depth(face.center),
        })
        .collect();
    visible.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    visible
}

fn cell_size() -> f64 {
    CUBE_SIZE / 3.0
}

/// Centre of board cell `index` on the front face.
pub fn cell_center(index: usize) -> Vec3 {
    let (row, col) = (index / 3, index % 3);
    let h = half();
    let cell = cell_size();
    Vec3::new(
        -h + col as f64 * cell + cell / 2.0,
        h - row as f64 * cell - cell / 2.0,
        h,
    )
}

/// Projected outline of board cell `index`, shrunk by `inset` (0 is full).
pub fn cell_quad(index: usize, inset: f64, transform: &CubeTransform) -> [Point2; 4] {
    let c = cell_center(index);
    let r = cell_size() / 2.0 * (1.0 - inset);
    [
        Vec3::new(c.x - r, c.y + r, c.z),
        Vec3::new(c.x + r, c.y + r, c.z),
        Vec3::new(c.x + r, c.y - r, c.z),
        Vec3::new(c.x - r, c.y - r, c.z),
    ]
    .map(|v| transform.project(v))
}

/// Board cell under a projected point, if any.
pub fn cell_at(point: Point2, transform: &CubeTransform) -> Option<usize> {
    (0..9).find(|&index| point_in_polygon(point, &cell_quad(index, 0.0, transform)))
}

/// Even-odd point in polygon test.
pub fn point_in_polygon(point: Point2, polygon: &[Point2]) -> bool {
    let (x, y) = point;
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, &(xi, yi)) in polygon.iter().enumerate() {
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Two strokes of an X in cell `index`.
pub fn x_strokes(index: usize, transform: &CubeTransform) -> [(Point2, Point2); 2] {
    let c = cell_center(index);
    let s = cell_size() * 0.32;
    [
        (
            transform.project(Vec3::new(c.x - s, c.y + s, c.z)),
            transform.project(Vec3::new(c.x + s, c.y - s, c.z)),
        ),
        (
            transform.project(Vec3::new(c.x + s, c.y + s, c.z)),
            transform.project(Vec3::new(c.x - s, c.y - s, c.z)),
        ),
    ]
}

/// Closed outline of an O in cell `index`, as `segments` points.
pub fn o_outline(index: usize, segments: usize, transform: &CubeTransform) -> Vec<Point2> {
    let c = cell_center(index);
    let r = cell_size() * 0.32;
    (0..segments)
        .map(|i| {
            let a = i as f64 / segments as f64 * std::f64::consts::TAU;
            transform.project(Vec3::new(c.x + r * a.cos(), c.y + r * a.sin(), c.z))
        })
        .collect()
}

/// Stroke through the first and last cell of a winning line.
pub fn line_stroke(first: usize, last: usize, transform: &CubeTransform) -> (Point2, Point2) {
    (
        transform.project(cell_center(first)),
        transform.project(cell_center(last)),
    )
}

/// Ease-out cubic: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Maps terminal cells to world coordinates for a canvas area.
///
/// Assumes braille markers (2x4 dots per cell) which are close to square, so
/// the cube keeps its proportions whatever the terminal size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    area: Rect,
    half_width: f64,
    half_height: f64,
}

impl Viewport {
    /// Creates a viewport covering `area`.
    pub fn new(area: Rect) -> Self {
        let dots_w = f64::from(area.width.max(1)) * 2.0;
        let dots_h = f64::from(area.height.max(1)) * 4.0;
        let per_dot = (2.0 * VIEW_EXTENT / dots_w).max(2.0 * VIEW_EXTENT / dots_h);
        Self {
            area,
            half_width: dots_w * per_dot / 2.0,
            half_height: dots_h * per_dot / 2.0,
        }
    }

    /// Canvas area in terminal cells.
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Horizontal canvas bounds.
    pub fn x_bounds(&self) -> [f64; 2] {
        [-self.half_width, self.half_width]
    }

    /// Vertical canvas bounds.
    pub fn y_bounds(&self) -> [f64; 2] {
        [-self.half_height, self.half_height]
    }

    /// World coordinates at the centre of terminal cell (`column`, `row`).
    pub fn to_world(&self, column: u16, row: u16) -> Option<Point2> {
        if self.area.width == 0
            || self.area.height == 0
            || !self.area.contains(TermPosition::new(column, row))
        {
            return None;
        }
        let fx = (f64::from(column - self.area.x) + 0.5) / f64::from(self.area.width);
        let fy = (f64::from(row - self.area.y) + 0.5) / f64::from(self.area.height);
        Some((
            -self.half_width + fx * 2.0 * self.half_width,
            self.half_height - fy * 2.0 * self.half_height,
        ))
    }

    /// Board cell under terminal cell (`column`, `row`).
    pub fn cell_at(&self, column: u16, row: u16, transform: &CubeTransform) -> Option<usize> {
        self.to_world(column, row)
            .and_then(|point| cell_at(point, transform))
    }

    /// Terminal cell nearest to a world point.
    pub fn to_terminal(&self, point: Point2) -> Option<(u16, u16)> {
        let fx = (point.0 + self.half_width) / (2.0 * self.half_width);
        let fy = (self.half_height - point.1) / (2.0 * self.half_height);
        if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
            return None;
        }
        let column = self.area.x + (fx * f64::from(self.area.width)) as u16;
        let row = self.area.y + (fy * f64::from(self.area.height)) as u16;
        Some((column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resting_cube_shows_front_right_top() {
        let faces = visible_faces(&CubeTransform::resting());
        let kinds: HashSet<_> = faces.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            HashSet::from([FaceKind::Front, FaceKind::Right, FaceKind::Top])
        );
        assert_eq!(faces.last().map(|f| f.kind), Some(FaceKind::Front));
    }

    #[test]
    fn test_front_grid_separates_cells() {
        let transform = CubeTransform::resting();
        let front = visible_faces(&transform)
            .into_iter()
            .find(|f| f.kind == FaceKind::Front)
            .unwrap();
        let grid = front.grid();
        assert_eq!(grid.len(), 4);
        // The first vertical line passes between columns 0 and 1.
        let (top, bottom) = grid[0];
        let mid = lerp(top, bottom, 0.5);
        let left = transform.project(cell_center(3));
        let right = transform.project(cell_center(4));
        assert!(left.0 < mid.0 && mid.0 < right.0);
    }

    #[test]
    fn test_half_flip_shows_back() {
        let kinds: Vec<_> = visible_faces(&CubeTransform::with(180.0, (0.0, 0.0)))
            .into_iter()
            .map(|f| f.kind)
            .collect();
        assert!(kinds.contains(&FaceKind::Back));
        assert!(!kinds.contains(&FaceKind::Front));
    }

    #[test]
    fn test_cell_centres_hit_their_cell() {
        for transform in [
            CubeTransform::resting(),
            CubeTransform::with(0.0, (9.0, -4.0)),
            CubeTransform::with(25.0, (0.0, 0.0)),
        ] {
            for index in 0..9 {
                let centre = transform.project(cell_center(index));
                assert_eq!(cell_at(centre, &transform), Some(index));
            }
        }
    }

    #[test]
    fn test_outside_board_hits_nothing() {
        let transform = CubeTransform::resting();
        assert_eq!(cell_at((1_000.0, 1_000.0), &transform), None);
        assert_eq!(cell_at((-280.0, 0.0), &transform), None);
    }

    #[test]
    fn test_top_row_projects_above_bottom_row() {
        let t = CubeTransform::resting();
        assert!(t.project(cell_center(1)).1 > t.project(cell_center(7)).1);
        assert!(t.project(cell_center(5)).0 > t.project(cell_center(3)).0);
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(point_in_polygon((0.5, 0.5), &square));
        assert!(!point_in_polygon((1.5, 0.5), &square));
        assert!(!point_in_polygon((0.5, 0.5), &[]));
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_viewport_round_trip_hits_cells() {
        let viewport = Viewport::new(Rect::new(2, 1, 80, 30));
        let transform = CubeTransform::resting();
        for index in 0..9 {
            let centre = transform.project(cell_center(index));
            let (column, row) = viewport.to_terminal(centre).unwrap();
            assert_eq!(viewport.cell_at(column, row, &transform), Some(index));
        }
        assert_eq!(viewport.to_world(0, 0), None);
    }
}
