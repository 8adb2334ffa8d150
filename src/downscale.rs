//! Box-filter downscaling of stencil masks.
//!
//! Cairo's minification of mask surfaces looks poor, so stencil masks that
//! land on an axis-aligned device rectangle smaller than their pixel size are
//! scaled down here, and Cairo only has to place them on whole device pixels.
//!
//! The destination rectangle is snapped to integer device coordinates.  To
//! keep the aspect ratio right after snapping, the source gets some fully
//! transparent padding rows above ("head") and below ("tail") the image rows,
//! split according to how far each image edge is from its pixel boundary.
//! Each destination pixel is the exact average of the block of padded source
//! pixels that falls on it; block sizes are distributed by Bresenham steps.

use crate::transform::Transform;

/// Device coordinates beyond this are left to Cairo, which cannot address
/// them with its 24.8 fixed-point numbers anyway.
const MAX_DEVICE_COORD: f64 = (1 << 30) as f64;

/// Rounds half-way cases up, like `floor(x + 0.5)`.
#[inline]
fn round(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Whether every value can be snapped to an integer device coordinate without
/// losing range.
fn in_device_range(values: &[f64]) -> bool {
    values
        .iter()
        .all(|v| v.is_finite() && v.abs() <= MAX_DEVICE_COORD)
}

/// Splits `total` items into `parts` consecutive runs whose sizes differ by at
/// most one, with the longer runs spread evenly.
pub fn bresenham_steps(total: usize, parts: usize) -> impl Iterator<Item = usize> {
    let (p, q) = if parts == 0 {
        (0, 0)
    } else {
        (total / parts, total % parts)
    };

    let mut t = 0;

    (0..parts).map(move |_| {
        let mut step = p;
        t += q;
        if t >= parts {
            t -= parts;
            step += 1;
        }
        step
    })
}

/// The source rows that make up one destination row, in padded order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RowSpan {
    pub head: usize,
    pub image: usize,
    pub tail: usize,
}

impl RowSpan {
    #[inline]
    pub fn len(&self) -> usize {
        self.head + self.image + self.tail
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Distributes the padded rows `head_pad + height + tail_pad` over `scaled_height`
/// destination rows, and says how many of each kind every destination row takes.
pub fn row_spans(
    height: usize,
    scaled_height: usize,
    head_pad: usize,
    tail_pad: usize,
) -> Vec<RowSpan> {
    let mut head_left = head_pad;
    let mut image_left = height;
    let mut tail_left = tail_pad;

    bresenham_steps(head_pad + height + tail_pad, scaled_height)
        .map(|mut n| {
            let head = n.min(head_left);
            head_left -= head;
            n -= head;

            let image = n.min(image_left);
            image_left -= image;
            n -= image;

            let tail = n.min(tail_left);
            tail_left -= tail;

            RowSpan { head, image, tail }
        })
        .collect()
}

/// Where and how big a prescaled mask is in device space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Prescale {
    /// Device column where the first source column starts.
    pub tx: i32,

    /// Device row where the first source row starts.
    pub ty2: i32,

    pub scaled_width: usize,
    pub scaled_height: usize,
    pub head_pad: usize,
    pub tail_pad: usize,

    /// The x scale is negative, so columns go right to left.
    pub x_flipped: bool,

    /// The y scale is positive, so rows go bottom to top in device space.
    pub y_up: bool,
}

impl Prescale {
    /// Computes the device rectangle of a `width` by `height` mask drawn in the
    /// unit square under `m`, the full user-to-device matrix.
    ///
    /// Returns `None` when the mask should be left to Cairo: the matrix shears
    /// or rotates, is degenerate, puts the mask out of device range, or the
    /// mask is not being shrunk.
    pub fn compute(m: &Transform, width: usize, height: usize) -> Option<Prescale> {
        if !m.is_rectilinear() || width == 0 || height == 0 {
            return None;
        }

        let x_scale = m.xx;
        let y_scale = m.yy;

        if x_scale == 0.0 || y_scale == 0.0 || !x_scale.is_finite() || !y_scale.is_finite() {
            return None;
        }

        if !in_device_range(&[m.x0, m.y0, m.x0 + x_scale, m.y0 + y_scale]) {
            return None;
        }

        let (tx, tx2) = if x_scale >= 0.0 {
            (round(m.x0 - 0.01), round(m.x0 + x_scale + 0.01) - 1)
        } else {
            (round(m.x0 + 0.01) - 1, round(m.x0 + x_scale - 0.01))
        };

        let scaled_width = usize::try_from((tx2 - tx).unsigned_abs()).ok()? + 1;

        let (ty, ty2) = if y_scale >= 0.0 {
            (
                (m.y0 + 0.01).floor() as i64,
                (m.y0 + y_scale - 0.01).ceil() as i64,
            )
        } else {
            (
                (m.y0 - 0.01).ceil() as i64,
                (m.y0 + y_scale + 0.01).floor() as i64,
            )
        };

        // A zero-height result would draw nothing; a one-pixel stripe is closer
        // to what the page means.
        let scaled_height = usize::try_from((ty2 - ty).unsigned_abs()).ok()?.max(1);

        if scaled_width > width || scaled_height > height {
            return None;
        }

        let h = height as f64;
        let total_pad = h * (scaled_height as f64 / y_scale.abs()) - h;

        // Very thin footprints would need more padding rows than can be counted.
        if total_pad.is_nan() || total_pad >= f64::from(i32::MAX) {
            return None;
        }

        let total_pad = round(total_pad);

        let (head_pad, tail_pad) = if total_pad > 0 {
            let tail_error = (m.y0 - ty as f64).abs();
            let head_error = (ty2 as f64 - (m.y0 + y_scale)).abs();
            let sum = tail_error + head_error;

            let tail_fraction = if sum > 0.0 { tail_error / sum } else { 0.0 };
            let tail_pad = round(total_pad as f64 * tail_fraction).clamp(0, total_pad);

            (
                usize::try_from(total_pad - tail_pad).ok()?,
                usize::try_from(tail_pad).ok()?,
            )
        } else {
            (0, 0)
        };

        let tx = i32::try_from(tx).ok()?;
        let ty2 = i32::try_from(ty2).ok()?;

        Some(Prescale {
            tx,
            ty2,
            scaled_width,
            scaled_height,
            head_pad,
            tail_pad,
            x_flipped: x_scale < 0.0,
            y_up: y_scale > 0.0,
        })
    }

    /// Averages a `width` by `height` coverage buffer, one byte per pixel, into
    /// `out`, which has `scaled_height` rows of `out_stride` bytes.
    ///
    /// Padding rows count as zero coverage.
    pub fn downscale(
        &self,
        coverage: &[u8],
        width: usize,
        height: usize,
        out: &mut [u8],
        out_stride: usize,
    ) {
        let rows = row_spans(height, self.scaled_height, self.head_pad, self.tail_pad);
        let columns: Vec<usize> = bresenham_steps(width, self.scaled_width).collect();

        let mut src_row = 0;

        for (y, span) in rows.iter().enumerate() {
            let n = span.len().max(1) as u64;
            let dest = &mut out[y * out_stride..y * out_stride + self.scaled_width];

            let mut x_src = 0;
            for (d, &m) in dest.iter_mut().zip(columns.iter()) {
                let mut acc = 0u64;

                for r in src_row..src_row + span.image {
                    let start = r * width + x_src;
                    acc += coverage[start..start + m]
                        .iter()
                        .map(|&c| u64::from(c))
                        .sum::<u64>();
                }

                *d = (acc / (n * m.max(1) as u64)) as u8;
                x_src += m;
            }

            src_row += span.image;
        }
    }

    /// Changes the context's transform so that one unit is one device pixel and
    /// the prescaled mask, drawn at the origin, covers its device rectangle.
    pub fn place(&self, cr: &cairo::Context) {
        let m = cr.matrix();

        cr.scale(1.0 / m.xx(), 1.0 / m.yy());

        if self.x_flipped {
            cr.translate(f64::from(self.tx) + 1.0 - m.x0(), f64::from(self.ty2) - m.y0());
            cr.scale(-1.0, 1.0);
        } else {
            cr.translate(f64::from(self.tx) - m.x0(), f64::from(self.ty2) - m.y0());
        }

        if self.y_up {
            cr.scale(1.0, -1.0);
        }
    }
}
