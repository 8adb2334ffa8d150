//! Recorded drawing operations, and a small interpreter that replays them.
//!
//! A trace is a JSON document with the page size and a list of operations
//! that mirror the operators of a page description:
//!
//! ```json
//! {
//!   "width": 100,
//!   "height": 100,
//!   "ops": [
//!     { "op": "fill_color", "components": [1, 0, 0] },
//!     { "op": "rect", "x": 10, "y": 10, "width": 50, "height": 50 },
//!     { "op": "fill" }
//!   ]
//! }
//! ```
//!
//! Coordinates are in a y-up page space whose origin is the bottom-left corner
//! of the page.  The [`Replayer`] keeps a graphics-state stack, just like a
//! content-stream interpreter, and drives any [`OutputDev`] with it.

use std::error;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::color::{ColorSpace, DeviceColorMap, DeviceColorSpace, Rgb};
use crate::error::RenderingError;
use crate::font::{FontKind, FontRef};
use crate::image::{ImageData, StencilMask};
use crate::output_dev::{BBox, Capabilities, OutputDev};
use crate::state::{GfxState, LineCap, LineJoin, TextRenderMode};
use crate::transform::Transform;

/// A recorded page.
#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    pub width: u32,
    pub height: u32,

    /// Color painted under the page; transparent when missing.
    #[serde(default)]
    pub background: Option<[f64; 3]>,

    pub ops: Vec<Op>,
}

impl Trace {
    pub fn from_json(s: &str) -> Result<Trace, ReplayError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Page space to device space: y goes up on the page and down on the device.
    pub fn default_ctm(&self) -> Transform {
        Transform::new_unchecked(1.0, 0.0, 0.0, -1.0, 0.0, f64::from(self.height))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceName {
    Gray,
    Rgb,
    Cmyk,
}

impl From<ColorSpaceName> for DeviceColorSpace {
    fn from(c: ColorSpaceName) -> DeviceColorSpace {
        match c {
            ColorSpaceName::Gray => DeviceColorSpace::Gray,
            ColorSpaceName::Rgb => DeviceColorSpace::Rgb,
            ColorSpaceName::Cmyk => DeviceColorSpace::Cmyk,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontKindName {
    #[default]
    Type1,
    TrueType,
    Cid,
    Type3,
}

impl From<FontKindName> for FontKind {
    fn from(k: FontKindName) -> FontKind {
        match k {
            FontKindName::Type1 => FontKind::Type1,
            FontKindName::TrueType => FontKind::TrueType,
            FontKindName::Cid => FontKind::Cid,
            FontKindName::Type3 => FontKind::Type3,
        }
    }
}

fn default_bits() -> u8 {
    8
}

fn default_advance() -> f64 {
    0.6
}

/// A continuous-tone image with its samples.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpaceName,

    #[serde(default = "default_bits")]
    pub bits: u8,

    /// Optional `[min, max]` pair per component.
    #[serde(default)]
    pub decode: Option<Vec<(f64, f64)>>,

    pub data: Vec<u8>,
}

impl ImageSpec {
    fn color_map(&self) -> DeviceColorMap {
        let map = DeviceColorMap::new(self.color_space.into(), self.bits);

        match self.decode {
            Some(ref decode) => map.with_decode(decode),
            None => map,
        }
    }
}

/// A 1-bit stencil with its samples.
#[derive(Debug, Clone, Deserialize)]
pub struct MaskSpec {
    pub width: u32,
    pub height: u32,

    #[serde(default)]
    pub invert: bool,

    pub data: Vec<u8>,
}

impl MaskSpec {
    fn stencil(&self) -> StencilMask<'_> {
        StencilMask::new(&self.data, self.width, self.height, self.invert)
    }
}

/// One recorded operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Save,
    Restore,
    Concat {
        matrix: [f64; 6],
    },

    LineWidth {
        width: f64,
    },
    Dash {
        array: Vec<f64>,
        #[serde(default)]
        offset: f64,
    },
    LineCap {
        cap: i64,
    },
    LineJoin {
        join: i64,
    },
    MiterLimit {
        limit: f64,
    },

    /// Gray, RGB or CMYK depending on the number of components.
    FillColor {
        components: Vec<f64>,
    },
    StrokeColor {
        components: Vec<f64>,
    },
    FillOpacity {
        opacity: f64,
    },
    StrokeOpacity {
        opacity: f64,
    },

    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    },
    ClosePath,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    Fill,
    EoFill,
    Stroke,

    /// Clips with the current path once it has been painted or ended.
    Clip,
    EoClip,
    EndPath,

    BeginText,
    EndText,
    Font {
        name: String,
        #[serde(default)]
        kind: FontKindName,
        size: f64,
    },
    TextMatrix {
        matrix: [f64; 6],
    },
    HorizScaling {
        scale: f64,
    },
    RenderMode {
        mode: u8,
    },

    /// Shows `text` starting at `(x, y)` in text space, advancing `advance`
    /// ems per character.
    ShowText {
        text: String,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default = "default_advance")]
        advance: f64,
    },

    /// A glyph of a Type 3 font: `ops` drawn in glyph space, which `matrix`
    /// maps to user space.
    Type3Glyph {
        code: u32,
        matrix: [f64; 6],
        ops: Vec<Op>,
    },

    Image {
        image: ImageSpec,
        #[serde(default)]
        mask_colors: Option<Vec<u16>>,
    },
    ImageMask {
        mask: MaskSpec,
    },
    MaskedImage {
        image: ImageSpec,
        mask: MaskSpec,
    },
    SoftMaskedImage {
        image: ImageSpec,
        mask: ImageSpec,
    },

    BeginGroup {
        #[serde(default)]
        bbox: Option<BBox>,
        #[serde(default)]
        color_space: Option<ColorSpaceName>,
        #[serde(default)]
        isolated: bool,
        #[serde(default)]
        knockout: bool,
        #[serde(default)]
        for_soft_mask: bool,
    },
    EndGroup,
    PaintGroup,
    SoftMask {
        #[serde(default)]
        alpha: bool,
        #[serde(default)]
        backdrop: Vec<f64>,
    },
    ClearSoftMask,
}

/// Errors from reading or replaying a trace.
#[derive(Debug)]
pub enum ReplayError {
    /// The trace is not valid JSON, or does not describe operations.
    Parse(serde_json::Error),

    /// An operation has an operand that makes no sense, like an unknown line cap.
    BadOperand(String),

    /// The backend failed.
    Rendering(RenderingError),
}

impl error::Error for ReplayError {}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ReplayError::Parse(ref e) => write!(f, "invalid trace: {e}"),
            ReplayError::BadOperand(ref s) => write!(f, "bad operand: {s}"),
            ReplayError::Rendering(ref e) => write!(f, "{e}"),
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> ReplayError {
        ReplayError::Parse(e)
    }
}

impl From<RenderingError> for ReplayError {
    fn from(e: RenderingError) -> ReplayError {
        ReplayError::Rendering(e)
    }
}

fn components_to_rgb(components: &[f64]) -> Result<Rgb, ReplayError> {
    let space = match components.len() {
        1 => DeviceColorSpace::Gray,
        3 => DeviceColorSpace::Rgb,
        4 => DeviceColorSpace::Cmyk,
        n => {
            return Err(ReplayError::BadOperand(format!(
                "a color has 1, 3 or 4 components, not {n}"
            )))
        }
    };

    Ok(space.to_rgb(components))
}

#[derive(Debug, Copy, Clone)]
enum PendingClip {
    Winding,
    EvenOdd,
}

/// Drives an [`OutputDev`] with the operations of a trace.
///
/// The graphics state always follows every operation, but the device is only
/// called for the kinds of content its [`Capabilities`] say it draws: an
/// images-only device sees no paths, clips, text or transparency groups.
pub struct Replayer<'d> {
    dev: &'d mut dyn OutputDev,
    caps: Capabilities,
    state: GfxState,
    stack: Vec<GfxState>,
    pending_clip: Option<PendingClip>,
}

impl<'d> Replayer<'d> {
    pub fn new(dev: &'d mut dyn OutputDev) -> Replayer<'d> {
        let caps = dev.capabilities();

        Replayer {
            dev,
            caps,
            state: GfxState::default(),
            stack: Vec::new(),
            pending_clip: None,
        }
    }

    pub fn state(&self) -> &GfxState {
        &self.state
    }

    /// Replays a whole page, bracketed by `start_page` and `end_page`.
    pub fn replay(&mut self, trace: &Trace) -> Result<(), ReplayError> {
        let ctm = trace.default_ctm();

        self.state = GfxState::new(ctm);
        self.stack.clear();
        self.pending_clip = None;

        self.dev.start_page(1, &self.state)?;
        self.dev.set_default_ctm(&ctm)?;
        self.dev.update_all(&self.state)?;

        self.run(&trace.ops)?;

        self.dev.end_page()?;
        Ok(())
    }

    /// Runs operations against the current state.
    pub fn run(&mut self, ops: &[Op]) -> Result<(), ReplayError> {
        for op in ops {
            self.op(op)?;
        }

        Ok(())
    }

    fn end_path(&mut self) -> Result<(), ReplayError> {
        match self.pending_clip.take() {
            _ if !self.caps.draws_vectors() => (),
            Some(PendingClip::Winding) => self.dev.clip(&self.state)?,
            Some(PendingClip::EvenOdd) => self.dev.eo_clip(&self.state)?,
            None => (),
        }

        self.state.path.clear();
        Ok(())
    }

    fn save(&mut self) -> Result<(), ReplayError> {
        self.stack.push(self.state.clone());
        self.dev.save_state(&self.state)?;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), ReplayError> {
        let state = self
            .stack
            .pop()
            .ok_or_else(|| ReplayError::BadOperand(String::from("restore without save")))?;

        // The current path is not part of the saved state.
        let path = std::mem::take(&mut self.state.path);
        self.state = state;
        self.state.path = path;

        self.dev.restore_state(&self.state)?;
        Ok(())
    }

    fn show_text(&mut self, text: &str, x: f64, y: f64, advance: f64) -> Result<(), ReplayError> {
        let chars: Vec<char> = text.chars().collect();
        let step = advance * self.state.font_size * self.state.horiz_scaling;
        let (dx, dy) = self.state.text_matrix.transform_distance(step, 0.0);

        self.dev.begin_string(&self.state, chars.len())?;

        for (i, &c) in chars.iter().enumerate() {
            let (px, py) = self
                .state
                .text_matrix
                .transform_point(x + step * i as f64, y);

            self.dev
                .draw_char(&self.state, px, py, dx, dy, 0.0, 0.0, u32::from(c), &[c])?;
        }

        self.dev.end_string(&self.state)?;
        Ok(())
    }

    fn type3_glyph(&mut self, code: u32, matrix: &[f64; 6], ops: &[Op]) -> Result<(), ReplayError> {
        self.stack.push(self.state.clone());
        self.state.concat_ctm(&Transform::from_array(*matrix));

        self.dev.begin_type3_char(&self.state, code, &[])?;
        let result = self.run(ops);
        self.dev.end_type3_char(&self.state)?;

        if let Some(state) = self.stack.pop() {
            self.state = state;
        }

        result
    }

    fn op(&mut self, op: &Op) -> Result<(), ReplayError> {
        let vectors = self.caps.draws_vectors();
        let text = self.caps.draws_text();
        let groups = self.caps.supports_transparency_groups();
        let dev = &mut *self.dev;

        match *op {
            Op::Save => self.save()?,
            Op::Restore => self.restore()?,

            Op::Concat { ref matrix } => {
                let m = Transform::from_array(*matrix);
                self.state.concat_ctm(&m);
                dev.update_ctm(&self.state, &m)?;
            }

            Op::LineWidth { width } => {
                self.state.line_width = width;
                dev.update_line_width(&self.state)?;
            }

            Op::Dash { ref array, offset } => {
                self.state.dash = array.clone();
                self.state.dash_offset = offset;
                dev.update_line_dash(&self.state)?;
            }

            Op::LineCap { cap } => {
                self.state.line_cap = LineCap::try_from(cap)
                    .map_err(|e| ReplayError::BadOperand(format!("line cap {}", e.0)))?;
                dev.update_line_cap(&self.state)?;
            }

            Op::LineJoin { join } => {
                self.state.line_join = LineJoin::try_from(join)
                    .map_err(|e| ReplayError::BadOperand(format!("line join {}", e.0)))?;
                dev.update_line_join(&self.state)?;
            }

            Op::MiterLimit { limit } => {
                self.state.miter_limit = limit;
                dev.update_miter_limit(&self.state)?;
            }

            Op::FillColor { ref components } => {
                self.state.fill_color = components_to_rgb(components)?;
                dev.update_fill_color(&self.state)?;
            }

            Op::StrokeColor { ref components } => {
                self.state.stroke_color = components_to_rgb(components)?;
                dev.update_stroke_color(&self.state)?;
            }

            Op::FillOpacity { opacity } => {
                self.state.fill_opacity = opacity;
                dev.update_fill_opacity(&self.state)?;
            }

            Op::StrokeOpacity { opacity } => {
                self.state.stroke_opacity = opacity;
                dev.update_stroke_opacity(&self.state)?;
            }

            Op::MoveTo { x, y } => self.state.path.move_to(x, y),
            Op::LineTo { x, y } => self.state.path.line_to(x, y),
            Op::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => self.state.path.curve_to(x1, y1, x2, y2, x3, y3),
            Op::ClosePath => self.state.path.close_path(),

            Op::Rect {
                x,
                y,
                width,
                height,
            } => {
                let path = &mut self.state.path;
                path.move_to(x, y);
                path.line_to(x + width, y);
                path.line_to(x + width, y + height);
                path.line_to(x, y + height);
                path.close_path();
            }

            Op::Fill => {
                if vectors {
                    dev.fill(&self.state)?;
                }
                self.end_path()?;
            }

            Op::EoFill => {
                if vectors {
                    dev.eo_fill(&self.state)?;
                }
                self.end_path()?;
            }

            Op::Stroke => {
                if vectors {
                    dev.stroke(&self.state)?;
                }
                self.end_path()?;
            }

            Op::Clip => self.pending_clip = Some(PendingClip::Winding),
            Op::EoClip => self.pending_clip = Some(PendingClip::EvenOdd),
            Op::EndPath => self.end_path()?,

            Op::BeginText => self.state.text_matrix = Transform::identity(),
            Op::EndText if text => dev.end_text_object(&self.state)?,
            Op::EndText => (),

            Op::Font {
                ref name,
                kind,
                size,
            } => {
                self.state.font = Some(FontRef::new(name, kind.into()));
                self.state.font_size = size;
                if text {
                    dev.update_font(&self.state)?;
                }
            }

            Op::TextMatrix { ref matrix } => {
                self.state.text_matrix = Transform::from_array(*matrix);
                if text {
                    dev.update_font(&self.state)?;
                }
            }

            Op::HorizScaling { scale } => {
                self.state.horiz_scaling = scale;
                if text {
                    dev.update_font(&self.state)?;
                }
            }

            Op::RenderMode { mode } => self.state.render = TextRenderMode::new(mode),

            Op::ShowText { .. } | Op::Type3Glyph { .. } if !text => (),

            Op::ShowText {
                text: ref string,
                x,
                y,
                advance,
            } => self.show_text(string, x, y, advance)?,

            Op::Type3Glyph {
                code,
                ref matrix,
                ref ops,
            } => self.type3_glyph(code, matrix, ops)?,

            Op::Image {
                ref image,
                ref mask_colors,
            } => {
                let map = image.color_map();
                let data = image_data(image, &map);
                dev.draw_image(&self.state, &data, mask_colors.as_deref())?;
            }

            Op::ImageMask { ref mask } => dev.draw_image_mask(&self.state, &mask.stencil())?,

            Op::MaskedImage {
                ref image,
                ref mask,
            } => {
                let map = image.color_map();
                let data = image_data(image, &map);
                dev.draw_masked_image(&self.state, &data, &mask.stencil())?;
            }

            Op::SoftMaskedImage {
                ref image,
                ref mask,
            } => {
                let map = image.color_map();
                let mask_map = mask.color_map();
                let data = image_data(image, &map);
                let mask_data = image_data(mask, &mask_map);
                dev.draw_soft_masked_image(&self.state, &data, &mask_data)?;
            }

            Op::BeginGroup { .. }
            | Op::EndGroup
            | Op::PaintGroup
            | Op::SoftMask { .. }
            | Op::ClearSoftMask
                if !groups => {}

            Op::BeginGroup {
                bbox,
                color_space,
                isolated,
                knockout,
                for_soft_mask,
            } => {
                let bbox = bbox.unwrap_or([0.0, 0.0, 0.0, 0.0]);
                let cs = color_space.map(|c| Rc::new(DeviceColorSpace::from(c)) as Rc<dyn ColorSpace>);
                dev.begin_transparency_group(
                    &self.state,
                    &bbox,
                    cs,
                    isolated,
                    knockout,
                    for_soft_mask,
                )?;
            }

            Op::EndGroup => dev.end_transparency_group(&self.state)?,
            Op::PaintGroup => dev.paint_transparency_group(&self.state, &[0.0; 4])?,

            Op::SoftMask { alpha, ref backdrop } => {
                dev.set_soft_mask(&self.state, &[0.0; 4], alpha, backdrop)?
            }

            Op::ClearSoftMask => dev.clear_soft_mask(&self.state)?,
        }

        Ok(())
    }
}

fn image_data<'a>(image: &'a ImageSpec, map: &'a DeviceColorMap) -> ImageData<'a> {
    ImageData {
        data: &image.data,
        width: image.width,
        height: image.height,
        color_map: map,
    }
}
