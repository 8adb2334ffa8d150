//! Affine transforms for the page's coordinate systems.
//!
//! The interpreter hands over matrices as six numbers `[a b c d e f]`, in the
//! order used by page-description languages.  [`Transform`] keeps them with
//! Cairo's field names, so that `a = xx`, `b = yx`, `c = xy`, `d = yy`,
//! `e = x0`, `f = y0`.  A point `(x, y)` maps to
//! `(a*x + c*y + e, b*x + d*y + f)`.

/// A 2D transformation matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    #[inline]
    pub fn new_unchecked(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    /// Builds a transform from `[a b c d e f]`.
    #[inline]
    pub fn from_array(m: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = m;
        Self::new_unchecked(a, b, c, d, e, f)
    }

    /// The transform as `[a b c d e f]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 6] {
        [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0]
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Self::new_unchecked(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// The matrix a `cm` operator with `m` leaves behind: points go through
    /// `m` first and then through `self`.
    #[must_use]
    pub fn pre_transform(&self, m: &Transform) -> Self {
        let (xx, yx) = self.transform_distance(m.xx, m.yx);
        let (xy, yy) = self.transform_distance(m.xy, m.yy);
        let (x0, y0) = self.transform_point(m.x0, m.y0);

        Self::new_unchecked(xx, yx, xy, yy, x0, y0)
    }

    /// Whether the matrix has an inverse that can be computed in floating point.
    #[inline]
    pub fn is_invertible(&self) -> bool {
        let det = self.xx * self.yy - self.xy * self.yx;
        det != 0.0 && det.is_finite()
    }

    /// Whether the matrix maps axis-aligned rectangles to axis-aligned
    /// rectangles without swapping the axes.
    pub fn is_rectilinear(&self) -> bool {
        self.xy == 0.0 && self.yx == 0.0
    }

    #[inline]
    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.xx + dy * self.xy, dx * self.yx + dy * self.yy)
    }

    #[inline]
    pub fn transform_point(&self, px: f64, py: f64) -> (f64, f64) {
        let (x, y) = self.transform_distance(px, py);
        (x + self.x0, y + self.y0)
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

impl From<cairo::Matrix> for Transform {
    #[inline]
    fn from(m: cairo::Matrix) -> Self {
        Self::new_unchecked(m.xx(), m.yx(), m.xy(), m.yy(), m.x0(), m.y0())
    }
}

impl From<Transform> for cairo::Matrix {
    #[inline]
    fn from(t: Transform) -> cairo::Matrix {
        cairo::Matrix::new(t.xx, t.yx, t.xy, t.yy, t.x0, t.y0)
    }
}
