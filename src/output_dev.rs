//! The interface between a content-stream interpreter and a rendering backend.
//!
//! The interpreter calls the methods of [`OutputDev`] in document order, passing
//! its current [`GfxState`] to each.  Every method has an empty default body,
//! so a backend implements only what it cares about.

use std::rc::Rc;

use crate::color::ColorSpace;
use crate::error::DeviceResult;
use crate::image::{ImageData, StencilMask};
use crate::state::GfxState;
use crate::transform::Transform;

/// What a backend does with the content it is given.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capabilities {
    /// Draws everything: paths, text, images, groups and soft masks.
    Full,

    /// Only looks at images; vector content and text are ignored.
    ImagesOnly,
}

impl Capabilities {
    pub fn draws_vectors(self) -> bool {
        self == Capabilities::Full
    }

    pub fn draws_text(self) -> bool {
        self == Capabilities::Full
    }

    pub fn supports_transparency_groups(self) -> bool {
        self == Capabilities::Full
    }
}

/// A rectangle in user space, given as `[x0, y0, x1, y1]`.
pub type BBox = [f64; 4];

#[allow(unused_variables)]
pub trait OutputDev {
    fn capabilities(&self) -> Capabilities;

    /// Whether device space has y going down, as in Cairo.
    fn upside_down(&self) -> bool {
        true
    }

    /// Whether text arrives one character at a time through [`OutputDev::draw_char`].
    fn use_draw_char(&self) -> bool {
        true
    }

    /// Whether the interpreter should run the glyph procedures of Type 3 fonts
    /// between [`OutputDev::begin_type3_char`] and [`OutputDev::end_type3_char`].
    fn interpret_type3_chars(&self) -> bool {
        true
    }

    // Lifecycle

    fn start_doc(&mut self) -> DeviceResult {
        Ok(())
    }

    fn start_page(&mut self, page_num: u32, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn end_page(&mut self) -> DeviceResult {
        Ok(())
    }

    // Graphics state

    fn save_state(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn restore_state(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    /// Sets the page's base transformation; it is concatenated onto the current one.
    fn set_default_ctm(&mut self, ctm: &Transform) -> DeviceResult {
        Ok(())
    }

    fn update_all(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    /// `m` has just been concatenated onto `state.ctm`.
    fn update_ctm(&mut self, state: &GfxState, m: &Transform) -> DeviceResult {
        Ok(())
    }

    fn update_line_dash(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_line_join(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_line_cap(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_miter_limit(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_line_width(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_fill_color(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_stroke_color(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_fill_opacity(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_stroke_opacity(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn update_font(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    // Path painting

    fn stroke(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn fill(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn eo_fill(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn clip(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn eo_clip(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    // Text

    fn begin_string(&mut self, state: &GfxState, len: usize) -> DeviceResult {
        Ok(())
    }

    /// One character of the current string; `(x, y)` is the pen position and
    /// `(origin_x, origin_y)` the offset of the glyph origin from it.
    #[allow(clippy::too_many_arguments)]
    fn draw_char(
        &mut self,
        state: &GfxState,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        origin_x: f64,
        origin_y: f64,
        code: u32,
        unicode: &[char],
    ) -> DeviceResult {
        Ok(())
    }

    fn end_string(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn end_text_object(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn begin_type3_char(&mut self, state: &GfxState, code: u32, unicode: &[char]) -> DeviceResult {
        Ok(())
    }

    fn end_type3_char(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    /// The `d0` operator of a Type 3 glyph procedure.
    fn type3_d0(&mut self, state: &GfxState, wx: f64, wy: f64) -> DeviceResult {
        Ok(())
    }

    /// The `d1` operator of a Type 3 glyph procedure.
    #[allow(clippy::too_many_arguments)]
    fn type3_d1(
        &mut self,
        state: &GfxState,
        wx: f64,
        wy: f64,
        llx: f64,
        lly: f64,
        urx: f64,
        ury: f64,
    ) -> DeviceResult {
        Ok(())
    }

    // Images

    fn draw_image_mask(&mut self, state: &GfxState, mask: &StencilMask<'_>) -> DeviceResult {
        Ok(())
    }

    /// `mask_colors` holds `[min, max]` pairs, one per color component.
    fn draw_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask_colors: Option<&[u16]>,
    ) -> DeviceResult {
        Ok(())
    }

    fn draw_masked_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask: &StencilMask<'_>,
    ) -> DeviceResult {
        Ok(())
    }

    fn draw_soft_masked_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask: &ImageData<'_>,
    ) -> DeviceResult {
        Ok(())
    }

    // Transparency

    fn begin_transparency_group(
        &mut self,
        state: &GfxState,
        bbox: &BBox,
        color_space: Option<Rc<dyn ColorSpace>>,
        isolated: bool,
        knockout: bool,
        for_soft_mask: bool,
    ) -> DeviceResult {
        Ok(())
    }

    fn end_transparency_group(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }

    fn paint_transparency_group(&mut self, state: &GfxState, bbox: &BBox) -> DeviceResult {
        Ok(())
    }

    /// Turns the last ended group into the soft mask for what is painted next.
    ///
    /// With `alpha` the group's alpha is the mask; otherwise its luminosity over
    /// `backdrop` is, with `backdrop` given in the group's color space.
    fn set_soft_mask(
        &mut self,
        state: &GfxState,
        bbox: &BBox,
        alpha: bool,
        backdrop: &[f64],
    ) -> DeviceResult {
        Ok(())
    }

    fn clear_soft_mask(&mut self, state: &GfxState) -> DeviceResult {
        Ok(())
    }
}
