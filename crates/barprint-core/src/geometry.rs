//! Path geometry: affine transforms and closed outlines.
//!
//! A [`Path`] is a flat list of [`PathCommand`]s in the usual
//! move/line/quad/cubic/close vocabulary.  Everything this crate draws is
//! a filled area, so paths are expected to consist of closed subpaths.

use serde::{Deserialize, Serialize};

use crate::types::{Point, Rect};

/// A 2x3 affine matrix mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub const fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    #[must_use]
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Apply `self` first, then `next`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self {
            a: next.a.mul_add(self.a, next.c * self.b),
            b: next.b.mul_add(self.a, next.d * self.b),
            c: next.a.mul_add(self.c, next.c * self.d),
            d: next.b.mul_add(self.c, next.d * self.d),
            e: next.a.mul_add(self.e, next.c.mul_add(self.f, next.e)),
            f: next.b.mul_add(self.e, next.d.mul_add(self.f, next.f)),
        }
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a.mul_add(p.x, self.c.mul_add(p.y, self.e)),
            self.b.mul_add(p.x, self.d.mul_add(p.y, self.f)),
        )
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One path-construction command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bézier: control point, end point.
    QuadTo(Point, Point),
    /// Cubic Bézier: two control points, end point.
    CubicTo(Point, Point, Point),
    Close,
}

/// A path command with quadratics already promoted to cubics.
///
/// This is the vocabulary of the PostScript and PDF path operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// A sequence of subpaths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path(Vec<PathCommand>);

impl Path {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub const fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self(commands)
    }

    /// A closed axis-aligned rectangle, wound clockwise in y-down space.
    #[must_use]
    pub fn rect(rect: Rect) -> Self {
        let mut path = Self::new();
        path.push_rect(rect);
        path
    }

    pub fn push_rect(&mut self, rect: Rect) {
        self.0.extend([
            PathCommand::MoveTo(Point::new(rect.x, rect.y)),
            PathCommand::LineTo(Point::new(rect.right(), rect.y)),
            PathCommand::LineTo(Point::new(rect.right(), rect.bottom())),
            PathCommand::LineTo(Point::new(rect.x, rect.bottom())),
            PathCommand::Close,
        ]);
    }

    pub fn move_to(&mut self, p: Point) {
        self.0.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.0.push(PathCommand::LineTo(p));
    }

    pub fn quad_to(&mut self, control: Point, end: Point) {
        self.0.push(PathCommand::QuadTo(control, end));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        self.0.push(PathCommand::CubicTo(c1, c2, end));
    }

    pub fn close(&mut self) {
        self.0.push(PathCommand::Close);
    }

    /// Append all subpaths of `other`.
    pub fn append(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }

    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A copy of the path with every point mapped through `transform`.
    ///
    /// Affine maps preserve Bézier curves, so control points are mapped
    /// like any other point.
    #[must_use]
    pub fn transformed(&self, transform: &Affine) -> Self {
        let t = |p: Point| transform.apply(p);
        Self(
            self.0
                .iter()
                .map(|cmd| match *cmd {
                    PathCommand::MoveTo(p) => PathCommand::MoveTo(t(p)),
                    PathCommand::LineTo(p) => PathCommand::LineTo(t(p)),
                    PathCommand::QuadTo(c, p) => PathCommand::QuadTo(t(c), t(p)),
                    PathCommand::CubicTo(c1, c2, p) => PathCommand::CubicTo(t(c1), t(c2), t(p)),
                    PathCommand::Close => PathCommand::Close,
                })
                .collect(),
        )
    }

    /// Bounding box of all points, control points included.
    ///
    /// Returns `None` for a path without points.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.0.iter().flat_map(|cmd| match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
            PathCommand::QuadTo(c, p) => vec![c, p],
            PathCommand::CubicTo(c1, c2, p) => vec![c1, c2, p],
            PathCommand::Close => Vec::new(),
        });
        let first = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// The path as [`Segment`]s, with each quadratic promoted to the
    /// equivalent cubic.
    ///
    /// For a quadratic from `p0` with control `q` to `p`, the cubic
    /// controls are `p0 + 2/3 (q - p0)` and `p + 2/3 (q - p)`.  The
    /// promotion is exact.
    #[must_use]
    pub fn cubic_segments(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut current = Point::new(0.0, 0.0);
        let mut subpath_start = current;

        for cmd in &self.0 {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    current = p;
                    subpath_start = p;
                    out.push(Segment::MoveTo(p));
                }
                PathCommand::LineTo(p) => {
                    current = p;
                    out.push(Segment::LineTo(p));
                }
                PathCommand::QuadTo(q, p) => {
                    let c1 = current.lerp(q, 2.0 / 3.0);
                    let c2 = p.lerp(q, 2.0 / 3.0);
                    current = p;
                    out.push(Segment::CubicTo(c1, c2, p));
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    current = p;
                    out.push(Segment::CubicTo(c1, c2, p));
                }
                PathCommand::Close => {
                    current = subpath_start;
                    out.push(Segment::Close);
                }
            }
        }
        out
    }
}
