//! The interpreter's graphics state, as seen by a backend.
//!
//! The interpreter owns a stack of these and passes the current one to every
//! callback.  Backends read from it; they never keep a reference to it.

use crate::color::Rgb;
use crate::font::FontRef;
use crate::path::GfxPath;
use crate::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    ProjectingSquare,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// An integer operand that is not a valid value for a state parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidStateValue(pub i64);

impl TryFrom<i64> for LineCap {
    type Error = InvalidStateValue;

    fn try_from(v: i64) -> Result<LineCap, InvalidStateValue> {
        match v {
            0 => Ok(LineCap::Butt),
            1 => Ok(LineCap::Round),
            2 => Ok(LineCap::ProjectingSquare),
            _ => Err(InvalidStateValue(v)),
        }
    }
}

impl TryFrom<i64> for LineJoin {
    type Error = InvalidStateValue;

    fn try_from(v: i64) -> Result<LineJoin, InvalidStateValue> {
        match v {
            0 => Ok(LineJoin::Miter),
            1 => Ok(LineJoin::Round),
            2 => Ok(LineJoin::Bevel),
            _ => Err(InvalidStateValue(v)),
        }
    }
}

impl From<LineCap> for cairo::LineCap {
    fn from(c: LineCap) -> cairo::LineCap {
        match c {
            LineCap::Butt => cairo::LineCap::Butt,
            LineCap::Round => cairo::LineCap::Round,
            LineCap::ProjectingSquare => cairo::LineCap::Square,
        }
    }
}

impl From<LineJoin> for cairo::LineJoin {
    fn from(j: LineJoin) -> cairo::LineJoin {
        match j {
            LineJoin::Miter => cairo::LineJoin::Miter,
            LineJoin::Round => cairo::LineJoin::Round,
            LineJoin::Bevel => cairo::LineJoin::Bevel,
        }
    }
}

/// Text rendering mode, a value from 0 to 7.
///
/// Bit 0 turns filling off, bits 0-1 together select stroking, and bit 2
/// adds the glyph outlines to the clipping path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TextRenderMode(u8);

impl TextRenderMode {
    pub const FILL: TextRenderMode = TextRenderMode(0);
    pub const STROKE: TextRenderMode = TextRenderMode(1);
    pub const FILL_STROKE: TextRenderMode = TextRenderMode(2);
    pub const INVISIBLE: TextRenderMode = TextRenderMode(3);
    pub const FILL_CLIP: TextRenderMode = TextRenderMode(4);
    pub const STROKE_CLIP: TextRenderMode = TextRenderMode(5);
    pub const FILL_STROKE_CLIP: TextRenderMode = TextRenderMode(6);
    pub const CLIP: TextRenderMode = TextRenderMode(7);

    /// Keeps the three meaningful bits.
    pub fn new(mode: u8) -> TextRenderMode {
        TextRenderMode(mode & 7)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Mode 3 neither paints nor clips.
    pub fn is_invisible(self) -> bool {
        self.0 == 3
    }

    pub fn fills(self) -> bool {
        self.0 & 1 == 0
    }

    pub fn strokes(self) -> bool {
        matches!(self.0 & 3, 1 | 2)
    }

    pub fn clips(self) -> bool {
        self.0 & 4 != 0
    }
}

/// Everything a backend may look at when a callback runs.
#[derive(Debug, Clone)]
pub struct GfxState {
    /// User space to device space.
    pub ctm: Transform,

    pub line_width: f64,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,

    pub fill_color: Rgb,
    pub stroke_color: Rgb,
    pub fill_opacity: f64,
    pub stroke_opacity: f64,

    pub font: Option<FontRef>,
    pub font_size: f64,
    pub text_matrix: Transform,

    /// Horizontal scaling as a fraction; 1.0 is 100%.
    pub horiz_scaling: f64,
    pub render: TextRenderMode,

    /// The path under construction.
    pub path: GfxPath,
}

impl Default for GfxState {
    fn default() -> GfxState {
        GfxState::new(Transform::identity())
    }
}

impl GfxState {
    pub fn new(ctm: Transform) -> GfxState {
        GfxState {
            ctm,
            line_width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            fill_color: Rgb::new(0.0, 0.0, 0.0),
            stroke_color: Rgb::new(0.0, 0.0, 0.0),
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            font: None,
            font_size: 0.0,
            text_matrix: Transform::identity(),
            horiz_scaling: 1.0,
            render: TextRenderMode::FILL,
            path: GfxPath::new(),
        }
    }

    /// Concatenates `m` onto the CTM, as the `cm` operator does.
    pub fn concat_ctm(&mut self, m: &Transform) {
        self.ctm = self.ctm.pre_transform(m);
    }

    /// The matrix that maps glyph space, scaled to one unit per em, to user space.
    ///
    /// Glyph space has y going up while Cairo fonts have it going down, so the
    /// y axis is flipped here.
    pub fn font_matrix(&self) -> Transform {
        let m = &self.text_matrix;
        let size = self.font_size;
        let h = self.horiz_scaling;

        Transform::new_unchecked(
            m.xx * size * h,
            m.yx * size * h,
            -m.xy * size,
            -m.yy * size,
            0.0,
            0.0,
        )
    }
}
