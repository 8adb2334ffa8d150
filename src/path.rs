//! The interpreter's path model, and its conversion to Cairo paths.

use crate::error::RenderingError;

/// One point of a subpath.
///
/// A point with `curve` set is the first of three points that together form a
/// cubic Bézier segment: two control points and the end point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub curve: bool,
}

/// A sequence of connected points, starting at a move-to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subpath {
    points: Vec<PathPoint>,
    closed: bool,
}

impl Subpath {
    pub fn new(points: Vec<PathPoint>, closed: bool) -> Subpath {
        Subpath { points, closed }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A path in user space, as built by the path construction operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GfxPath {
    subpaths: Vec<Subpath>,
}

impl GfxPath {
    pub fn new() -> GfxPath {
        GfxPath::default()
    }

    pub fn from_subpaths(subpaths: Vec<Subpath>) -> GfxPath {
        GfxPath { subpaths }
    }

    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.points.is_empty())
    }

    pub fn clear(&mut self) {
        self.subpaths.clear();
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(Subpath {
            points: vec![PathPoint { x, y, curve: false }],
            closed: false,
        });
    }

    /// Adds a line segment; starts a new subpath at the point if there is no current point.
    ///
    /// After [`GfxPath::close_path`] the current point is the start of the
    /// closed subpath, so the line goes from there.
    pub fn line_to(&mut self, x: f64, y: f64) {
        match self.current_subpath() {
            Some(s) => s.points.push(PathPoint { x, y, curve: false }),
            None => self.move_to(x, y),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        if self.current_subpath().is_none() {
            self.move_to(x1, y1);
        }

        if let Some(s) = self.current_subpath() {
            s.points.push(PathPoint {
                x: x1,
                y: y1,
                curve: true,
            });
            s.points.push(PathPoint {
                x: x2,
                y: y2,
                curve: true,
            });
            s.points.push(PathPoint {
                x: x3,
                y: y3,
                curve: false,
            });
        }
    }

    pub fn close_path(&mut self) {
        if let Some(s) = self.subpaths.last_mut() {
            if !s.points.is_empty() {
                s.closed = true;
            }
        }
    }

    /// The subpath that takes the next segment, or `None` without a current point.
    ///
    /// Closed subpaths take no more points; a new one is started at the closed
    /// subpath's first point.
    fn current_subpath(&mut self) -> Option<&mut Subpath> {
        let last = self.subpaths.last()?;
        let start = *last.points.first()?;

        if last.closed {
            self.move_to(start.x, start.y);
        }

        self.subpaths.last_mut()
    }

    /// Feeds the path into `cr` as its current path, without painting it.
    ///
    /// Subpaths with no points are skipped.  A curve that is missing some of its
    /// points ends its subpath.
    pub fn to_cairo_context(&self, cr: &cairo::Context) -> Result<(), RenderingError> {
        for subpath in &self.subpaths {
            let points = &subpath.points;

            let Some(first) = points.first() else {
                continue;
            };

            cr.move_to(first.x, first.y);

            let mut j = 1;
            while j < points.len() {
                if points[j].curve {
                    if j + 2 >= points.len() {
                        break;
                    }

                    let (p1, p2, p3) = (points[j], points[j + 1], points[j + 2]);
                    cr.curve_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
                    j += 3;
                } else {
                    cr.line_to(points[j].x, points[j].y);
                    j += 1;
                }
            }

            if subpath.closed {
                cr.close_path();
            }
        }

        // Out-of-range coordinates put the context in an error state; catch it
        // here rather than at the next drawing call.
        cr.status().map_err(|e| e.into())
    }
}
