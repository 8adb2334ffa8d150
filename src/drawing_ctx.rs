//! The Cairo rendering backend.
//!
//! [`CairoOutputDev`] turns the callbacks of an interpreter into drawing on a
//! `cairo::Context` that the caller provides with [`CairoOutputDev::set_cairo`].
//! Cairo keeps most of the graphics state itself; the fill and stroke paints
//! and their opacities are kept here, because they must survive Cairo's own
//! save/restore and text and image painting switch sources all the time.

use std::rc::Rc;

use crate::color::{ColorSpace, Rgb};
use crate::config::DeviceConfig;
use crate::downscale::Prescale;
use crate::error::{DeviceResult, ErrorReporter, LogReporter, RenderingError, Severity};
use crate::font::{CairoFont, FontEngine, FontKind};
use crate::group::{self, GroupFrame, GroupStack};
use crate::image::{self, ImageData, StencilMask};
use crate::log::PageTarget;
use crate::output_dev::{BBox, Capabilities, OutputDev};
use crate::pdfcairo_log;
use crate::session::Session;
use crate::state::GfxState;
use crate::text::{GlyphRun, TextClip};
use crate::transform::Transform;

/// Cairo cannot make surfaces without pixels; such images draw nothing.
fn no_pixels(width: u32, height: u32) -> bool {
    width == 0 || height == 0
}

/// Runs `f` between `cr.save()` and `cr.restore()`.
///
/// The context is restored only if `f` succeeds; on error the context is in an
/// unknown state anyway and the render is abandoned.
pub fn with_saved_cr<O, F>(cr: &cairo::Context, f: F) -> Result<O, RenderingError>
where
    F: FnOnce() -> Result<O, RenderingError>,
{
    cr.save()?;
    match f() {
        Ok(o) => {
            cr.restore()?;
            Ok(o)
        }

        Err(e) => Err(e),
    }
}

fn solid_pattern(color: Rgb, opacity: f64) -> cairo::SolidPattern {
    cairo::SolidPattern::from_rgba(color.r, color.g, color.b, opacity)
}

/// Draws everything it is given onto a Cairo context.
pub struct CairoOutputDev {
    session: Session,
    config: DeviceConfig,
    font_engine: Box<dyn FontEngine>,
    reporter: Box<dyn ErrorReporter>,

    cr: Option<cairo::Context>,

    /// Matrix of the context when it was bound; Type 3 glyphs are drawn relative to it.
    orig_matrix: cairo::Matrix,

    fill_color: Rgb,
    stroke_color: Rgb,
    fill_opacity: f64,
    stroke_opacity: f64,
    fill_pattern: cairo::SolidPattern,
    stroke_pattern: cairo::SolidPattern,

    current_font: Option<Rc<dyn CairoFont>>,
    need_font_update: bool,

    /// Present between `begin_string` and `end_string` while a font is available.
    glyphs: Option<GlyphRun>,
    text_clip: TextClip,

    groups: GroupStack,

    /// Soft mask waiting for the next `paint_transparency_group`.
    mask: Option<cairo::Pattern>,
}

impl CairoOutputDev {
    pub fn new(
        session: Session,
        config: DeviceConfig,
        font_engine: Box<dyn FontEngine>,
    ) -> CairoOutputDev {
        let black = Rgb::new(0.0, 0.0, 0.0);

        CairoOutputDev {
            reporter: Box::new(LogReporter::new(session.clone())),
            session,
            config,
            font_engine,

            cr: None,
            orig_matrix: cairo::Matrix::identity(),

            fill_color: black,
            stroke_color: black,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            fill_pattern: solid_pattern(black, 1.0),
            stroke_pattern: solid_pattern(black, 1.0),

            current_font: None,
            need_font_update: true,
            glyphs: None,
            text_clip: TextClip::new(),

            groups: GroupStack::new(),
            mask: None,
        }
    }

    /// Replaces the default reporter, which writes to the session log.
    pub fn with_error_reporter(mut self, reporter: Box<dyn ErrorReporter>) -> CairoOutputDev {
        self.reporter = reporter;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Binds the backend to a context, or unbinds it with `None`.
    ///
    /// The context's current matrix is remembered for drawing Type 3 glyphs.
    pub fn set_cairo(&mut self, cr: Option<cairo::Context>) {
        if let Some(ref old) = self.cr {
            if let Err(e) = old.status() {
                pdfcairo_log!(self.session, "(cairo context error: {})", e);
            }
        }

        if let Some(ref cr) = cr {
            pdfcairo_log!(self.session, "(binding to {})", PageTarget::new(cr));
            self.orig_matrix = cr.matrix();
        }

        self.cr = cr;
    }

    pub fn cairo(&self) -> Option<&cairo::Context> {
        self.cr.as_ref()
    }

    pub fn fill_color(&self) -> Rgb {
        self.fill_color
    }

    pub fn stroke_color(&self) -> Rgb {
        self.stroke_color
    }

    pub fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    pub fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    /// Number of transparency groups begun and not yet consumed.
    pub fn group_depth(&self) -> usize {
        self.groups.depth()
    }

    pub fn has_soft_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Turns a failed allocation into a report, so that the rest of the page
    /// still renders.  Other errors are passed on.
    pub(crate) fn skip_if_out_of_memory(&self, what: &str, result: DeviceResult) -> DeviceResult {
        match result {
            Err(RenderingError::OutOfMemory(msg)) => {
                self.reporter.report(
                    Severity::Error,
                    &format!("not enough memory for {what}: {msg}; skipped"),
                );
                Ok(())
            }

            other => other,
        }
    }

    /// Concatenates `m` onto the context's matrix.
    ///
    /// Cairo refuses singular matrices by going into an error state for good,
    /// so those are reported and left out.
    fn concat_matrix(&self, cr: &cairo::Context, m: &Transform) {
        if m.is_invertible() {
            cr.transform((*m).into());
        } else {
            self.reporter.report(
                Severity::Warning,
                &format!("ignoring singular transformation {:?}", m.to_array()),
            );
        }
    }

    fn apply_stroke_params(&self, cr: &cairo::Context, state: &GfxState) -> DeviceResult {
        self.apply_line_dash(cr, state);
        cr.set_line_join(state.line_join.into());
        cr.set_line_cap(state.line_cap.into());
        self.apply_line_width(cr, state)
    }

    fn apply_line_dash(&self, cr: &cairo::Context, state: &GfxState) {
        let valid = state.dash.iter().all(|&d| d >= 0.0 && d.is_finite())
            && (state.dash.is_empty() || state.dash.iter().any(|&d| d > 0.0));

        if valid {
            cr.set_dash(&state.dash, state.dash_offset);
        } else {
            pdfcairo_log!(self.session, "(invalid dash array {:?}; drawing solid)", state.dash);
            cr.set_dash(&[], 0.0);
        }
    }

    /// A line width of zero means the thinnest line the device can show.
    fn apply_line_width(&self, cr: &cairo::Context, state: &GfxState) -> DeviceResult {
        let width = if state.line_width == 0.0 {
            let (x, y) = cr.device_to_user_distance(1.0, 1.0)?;
            x.abs().min(y.abs())
        } else {
            state.line_width
        };

        cr.set_line_width(width);
        Ok(())
    }

    fn draw_image_mask_regular(&self, cr: &cairo::Context, mask: &StencilMask<'_>) -> DeviceResult {
        let surface = image::stencil_surface(mask)?;
        let pattern = image::unit_square_pattern(&surface, self.config.mask_filter.into());

        cr.mask(&pattern)?;
        Ok(())
    }

    fn draw_image_mask_prescaled(
        &self,
        cr: &cairo::Context,
        mask: &StencilMask<'_>,
        prescale: &Prescale,
    ) -> DeviceResult {
        let surface = image::prescaled_stencil_surface(mask, prescale)?;
        let pattern = cairo::SurfacePattern::create(&surface);
        pattern.set_filter(self.config.mask_filter.into());

        pdfcairo_log!(
            self.session,
            "(prescaled image mask {}x{} to {}x{})",
            mask.width,
            mask.height,
            prescale.scaled_width,
            prescale.scaled_height
        );

        with_saved_cr(cr, || {
            prescale.place(cr);
            cr.mask(&pattern)?;
            Ok(())
        })
    }

    fn draw_stencil(&self, cr: &cairo::Context, mask: &StencilMask<'_>) -> DeviceResult {
        cr.set_source(&self.fill_pattern)?;

        // Cairo draws scaled-up 1x1 surfaces badly; fill the unit square instead.
        if mask.width == 1 && mask.height == 1 {
            if image::stencil_coverage(mask)?.first() == Some(&255) {
                with_saved_cr(cr, || {
                    cr.rectangle(0.0, 0.0, 1.0, 1.0);
                    cr.fill()?;
                    Ok(())
                })?;
            }

            return Ok(());
        }

        if self.config.prescale_images {
            let m = Transform::from(cr.matrix());

            if let Some(prescale) = Prescale::compute(&m, mask.width as usize, mask.height as usize) {
                return self.draw_image_mask_prescaled(cr, mask, &prescale);
            }
        }

        self.draw_image_mask_regular(cr, mask)
    }

    fn draw_color_image(
        &self,
        cr: &cairo::Context,
        image: &ImageData<'_>,
        mask_colors: Option<&[u16]>,
    ) -> DeviceResult {
        let surface = image::color_surface(image, mask_colors)?;
        let pattern = image::unit_square_pattern(&surface, self.config.image_filter.into());

        cr.set_source(&pattern)?;
        cr.paint()?;
        Ok(())
    }

    fn draw_color_image_through(
        &self,
        cr: &cairo::Context,
        image: &ImageData<'_>,
        mask: &cairo::ImageSurface,
        mask_filter: cairo::Filter,
    ) -> DeviceResult {
        let surface = image::color_surface(image, None)?;
        let pattern = image::unit_square_pattern(&surface, self.config.image_filter.into());
        let mask_pattern = image::unit_square_pattern(mask, mask_filter);

        cr.set_source(&pattern)?;
        cr.mask(&mask_pattern)?;
        Ok(())
    }
}

impl OutputDev for CairoOutputDev {
    fn capabilities(&self) -> Capabilities {
        Capabilities::Full
    }

    fn start_doc(&mut self) -> DeviceResult {
        self.font_engine.reset();
        self.current_font = None;
        self.need_font_update = true;
        Ok(())
    }

    fn start_page(&mut self, page_num: u32, _state: &GfxState) -> DeviceResult {
        pdfcairo_log!(self.session, "(start page {})", page_num);

        self.glyphs = None;
        self.text_clip.clear();
        self.need_font_update = true;
        Ok(())
    }

    fn save_state(&mut self, _state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(save)");
        cr.save()?;
        Ok(())
    }

    fn restore_state(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(cr) = self.cr.clone() {
            pdfcairo_log!(self.session, "(restore)");
            cr.restore()?;
        }

        // Kept here, not in the context, so restore() did not bring them back.
        self.update_fill_color(state)?;
        self.update_stroke_color(state)?;
        self.update_fill_opacity(state)?;
        self.update_stroke_opacity(state)
    }

    fn set_default_ctm(&mut self, ctm: &Transform) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        self.concat_matrix(&cr, ctm);
        Ok(())
    }

    fn update_all(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(cr) = self.cr.clone() {
            self.apply_stroke_params(&cr, state)?;
            cr.set_miter_limit(state.miter_limit);
        }

        self.update_fill_color(state)?;
        self.update_stroke_color(state)?;
        self.update_fill_opacity(state)?;
        self.update_stroke_opacity(state)?;
        self.need_font_update = true;
        Ok(())
    }

    fn update_ctm(&mut self, state: &GfxState, m: &Transform) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        self.concat_matrix(&cr, m);

        // Dashes and widths are in user space, so they change with the CTM.
        self.apply_stroke_params(&cr, state)
    }

    fn update_line_dash(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(ref cr) = self.cr {
            self.apply_line_dash(cr, state);
        }
        Ok(())
    }

    fn update_line_join(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(ref cr) = self.cr {
            cr.set_line_join(state.line_join.into());
        }
        Ok(())
    }

    fn update_line_cap(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(ref cr) = self.cr {
            cr.set_line_cap(state.line_cap.into());
        }
        Ok(())
    }

    fn update_miter_limit(&mut self, state: &GfxState) -> DeviceResult {
        if let Some(ref cr) = self.cr {
            cr.set_miter_limit(state.miter_limit);
        }
        Ok(())
    }

    fn update_line_width(&mut self, state: &GfxState) -> DeviceResult {
        pdfcairo_log!(self.session, "(line width {})", state.line_width);

        match self.cr {
            Some(ref cr) => self.apply_line_width(cr, state),
            None => Ok(()),
        }
    }

    fn update_fill_color(&mut self, state: &GfxState) -> DeviceResult {
        self.fill_color = state.fill_color;
        self.fill_pattern = solid_pattern(self.fill_color, self.fill_opacity);

        pdfcairo_log!(self.session, "(fill color {:?})", self.fill_color);
        Ok(())
    }

    fn update_stroke_color(&mut self, state: &GfxState) -> DeviceResult {
        self.stroke_color = state.stroke_color;
        self.stroke_pattern = solid_pattern(self.stroke_color, self.stroke_opacity);

        pdfcairo_log!(self.session, "(stroke color {:?})", self.stroke_color);
        Ok(())
    }

    fn update_fill_opacity(&mut self, state: &GfxState) -> DeviceResult {
        self.fill_opacity = state.fill_opacity;
        self.fill_pattern = solid_pattern(self.fill_color, self.fill_opacity);

        pdfcairo_log!(self.session, "(fill opacity {})", self.fill_opacity);
        Ok(())
    }

    fn update_stroke_opacity(&mut self, state: &GfxState) -> DeviceResult {
        self.stroke_opacity = state.stroke_opacity;
        self.stroke_pattern = solid_pattern(self.stroke_color, self.stroke_opacity);

        pdfcairo_log!(self.session, "(stroke opacity {})", self.stroke_opacity);
        Ok(())
    }

    fn update_font(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        self.need_font_update = false;
        self.current_font = None;

        let font = match state.font {
            Some(ref font) if font.kind != FontKind::Type3 => font,
            _ => return Ok(()),
        };

        pdfcairo_log!(self.session, "(font {})", font.name);

        let matrix = state.font_matrix();
        if !matrix.is_invertible() {
            pdfcairo_log!(self.session, "(font matrix {:?} is singular)", matrix.to_array());
            return Ok(());
        }

        match self.font_engine.font(font) {
            Some(f) => {
                cr.set_font_face(f.font_face());
                cr.set_font_matrix(matrix.into());
                self.current_font = Some(f);
            }

            None => {
                self.reporter.report(
                    Severity::Warning,
                    &format!("could not load font {}; its text is skipped", font.name),
                );
            }
        }

        Ok(())
    }

    fn stroke(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(stroke)");
        state.path.to_cairo_context(&cr)?;
        cr.set_source(&self.stroke_pattern)?;
        cr.stroke()?;
        Ok(())
    }

    fn fill(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(fill)");
        state.path.to_cairo_context(&cr)?;
        cr.set_fill_rule(cairo::FillRule::Winding);
        cr.set_source(&self.fill_pattern)?;
        cr.fill()?;
        Ok(())
    }

    fn eo_fill(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(fill even-odd)");
        state.path.to_cairo_context(&cr)?;
        cr.set_fill_rule(cairo::FillRule::EvenOdd);
        cr.set_source(&self.fill_pattern)?;
        cr.fill()?;
        Ok(())
    }

    fn clip(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(clip)");
        state.path.to_cairo_context(&cr)?;
        cr.set_fill_rule(cairo::FillRule::Winding);
        cr.clip();
        Ok(())
    }

    fn eo_clip(&mut self, state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(clip even-odd)");
        state.path.to_cairo_context(&cr)?;
        cr.set_fill_rule(cairo::FillRule::EvenOdd);
        cr.clip();
        Ok(())
    }

    fn begin_string(&mut self, state: &GfxState, len: usize) -> DeviceResult {
        if self.need_font_update {
            self.update_font(state)?;
        }

        if self.cr.is_none() || self.current_font.is_none() {
            return Ok(());
        }

        self.glyphs = Some(GlyphRun::with_capacity(len));
        Ok(())
    }

    fn draw_char(
        &mut self,
        _state: &GfxState,
        x: f64,
        y: f64,
        _dx: f64,
        _dy: f64,
        origin_x: f64,
        origin_y: f64,
        code: u32,
        unicode: &[char],
    ) -> DeviceResult {
        if let (Some(font), Some(glyphs)) = (self.current_font.as_ref(), self.glyphs.as_mut()) {
            glyphs.push(font.glyph(code, unicode), x - origin_x, y - origin_y);
        }

        Ok(())
    }

    fn end_string(&mut self, state: &GfxState) -> DeviceResult {
        // May come without a begin_string, or after one that found no font.
        let Some(glyphs) = self.glyphs.take() else { return Ok(()) };
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        let render = state.render;

        // Invisible text is used for searchable scans; nothing to draw.
        if render.is_invisible() || glyphs.is_empty() {
            return Ok(());
        }

        if render.fills() {
            pdfcairo_log!(self.session, "(fill string of {} glyphs)", glyphs.len());
            cr.set_source(&self.fill_pattern)?;
            cr.show_glyphs(glyphs.as_slice())?;
        }

        if render.strokes() {
            pdfcairo_log!(self.session, "(stroke string of {} glyphs)", glyphs.len());
            cr.set_source(&self.stroke_pattern)?;
            cr.new_path();
            cr.glyph_path(glyphs.as_slice());
            cr.stroke()?;
        }

        if render.clips() {
            pdfcairo_log!(self.session, "(clip string of {} glyphs)", glyphs.len());
            self.text_clip.add(&cr, glyphs.as_slice())?;
        }

        Ok(())
    }

    fn end_text_object(&mut self, _state: &GfxState) -> DeviceResult {
        match self.cr.clone() {
            Some(cr) => self.text_clip.apply(&cr),
            None => {
                self.text_clip.clear();
                Ok(())
            }
        }
    }

    fn begin_type3_char(&mut self, state: &GfxState, code: u32, _unicode: &[char]) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(type 3 glyph {})", code);

        // The glyph procedure's operators concatenate onto the CTM the
        // interpreter tracks, which starts from the page's base matrix.
        cr.save()?;
        cr.set_matrix(self.orig_matrix);
        self.concat_matrix(&cr, &state.ctm);
        Ok(())
    }

    fn end_type3_char(&mut self, _state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        cr.restore()?;
        Ok(())
    }

    fn draw_image_mask(&mut self, _state: &GfxState, mask: &StencilMask<'_>) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(self.session, "(image mask {}x{})", mask.width, mask.height);

        if no_pixels(mask.width, mask.height) {
            return Ok(());
        }

        let result = self.draw_stencil(&cr, mask);
        self.skip_if_out_of_memory("image mask", result)
    }

    fn draw_image(
        &mut self,
        _state: &GfxState,
        image: &ImageData<'_>,
        mask_colors: Option<&[u16]>,
    ) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(
            self.session,
            "(image {}x{}{})",
            image.width,
            image.height,
            if mask_colors.is_some() { " with color key" } else { "" }
        );

        if no_pixels(image.width, image.height) {
            return Ok(());
        }

        let result = self.draw_color_image(&cr, image, mask_colors);
        self.skip_if_out_of_memory("image", result)
    }

    fn draw_masked_image(
        &mut self,
        _state: &GfxState,
        image: &ImageData<'_>,
        mask: &StencilMask<'_>,
    ) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(
            self.session,
            "(masked image {}x{}, mask {}x{})",
            image.width,
            image.height,
            mask.width,
            mask.height
        );

        if no_pixels(image.width, image.height) || no_pixels(mask.width, mask.height) {
            return Ok(());
        }

        let result = image::stencil_surface(mask).and_then(|stencil| {
            self.draw_color_image_through(&cr, image, &stencil, self.config.mask_filter.into())
        });
        self.skip_if_out_of_memory("masked image", result)
    }

    fn draw_soft_masked_image(
        &mut self,
        _state: &GfxState,
        image: &ImageData<'_>,
        mask: &ImageData<'_>,
    ) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(
            self.session,
            "(soft-masked image {}x{}, mask {}x{})",
            image.width,
            image.height,
            mask.width,
            mask.height
        );

        if no_pixels(image.width, image.height) || no_pixels(mask.width, mask.height) {
            return Ok(());
        }

        let result = image::gray_surface(mask).and_then(|gray| {
            self.draw_color_image_through(&cr, image, &gray, self.config.image_filter.into())
        });
        self.skip_if_out_of_memory("soft-masked image", result)
    }

    fn begin_transparency_group(
        &mut self,
        _state: &GfxState,
        _bbox: &BBox,
        color_space: Option<Rc<dyn ColorSpace>>,
        isolated: bool,
        knockout: bool,
        for_soft_mask: bool,
    ) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        pdfcairo_log!(
            self.session,
            "(push group{})",
            if for_soft_mask { " for soft mask" } else { "" }
        );

        self.groups
            .push(GroupFrame::new(color_space, isolated, knockout));
        cr.push_group();
        Ok(())
    }

    fn end_transparency_group(&mut self, _state: &GfxState) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        self.groups.check_can_end()?;

        pdfcairo_log!(self.session, "(pop group)");
        let pattern = cr.pop_group()?;
        self.groups.end(pattern)
    }

    fn paint_transparency_group(&mut self, _state: &GfxState, _bbox: &BBox) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        let (_frame, group) = self.groups.pop_ended()?;
        cr.set_source(&group)?;

        match self.mask.take() {
            Some(mask) => {
                pdfcairo_log!(self.session, "(paint group through soft mask)");
                cr.mask(&mask)?;
            }

            None => {
                pdfcairo_log!(self.session, "(paint group with opacity {})", self.fill_opacity);
                cr.paint_with_alpha(self.fill_opacity)?;
            }
        }

        Ok(())
    }

    fn set_soft_mask(
        &mut self,
        _state: &GfxState,
        _bbox: &BBox,
        alpha: bool,
        backdrop: &[f64],
    ) -> DeviceResult {
        let Some(cr) = self.cr.clone() else { return Ok(()) };

        let (frame, group) = self.groups.pop_ended()?;

        if alpha {
            pdfcairo_log!(self.session, "(alpha soft mask)");
            self.mask = Some(group);
            return Ok(());
        }

        let backdrop = group::backdrop_rgb(frame.color_space.as_deref(), backdrop);
        pdfcairo_log!(self.session, "(luminosity soft mask over {:?})", backdrop);

        match group::luminosity_mask(&cr, &group, backdrop) {
            Ok(mask) => {
                self.mask = Some(mask);
                Ok(())
            }

            Err(e) => {
                self.mask = None;
                self.skip_if_out_of_memory("soft mask", Err(e))
            }
        }
    }

    fn clear_soft_mask(&mut self, _state: &GfxState) -> DeviceResult {
        if self.mask.take().is_some() {
            pdfcairo_log!(self.session, "(dropping unused soft mask)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::ToyFontEngine;

    fn device_on(cr: &cairo::Context) -> CairoOutputDev {
        let mut dev = CairoOutputDev::new(
            Session::new_for_test_suite(),
            DeviceConfig::default(),
            Box::new(ToyFontEngine::new()),
        );
        dev.set_cairo(Some(cr.clone()));
        dev
    }

    #[test]
    fn zero_line_width_is_one_device_pixel() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        cr.scale(4.0, 2.0);

        let mut dev = device_on(&cr);
        let mut state = GfxState::default();
        state.line_width = 0.0;
        dev.update_line_width(&state).unwrap();

        assert_eq!(cr.line_width(), 0.25);
    }

    #[test]
    fn invalid_dashes_draw_solid() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();

        let mut dev = device_on(&cr);
        let mut state = GfxState::default();

        state.dash = vec![0.0, 0.0];
        dev.update_line_dash(&state).unwrap();
        assert_eq!(cr.dash_count(), 0);

        state.dash = vec![3.0, 1.0];
        state.dash_offset = 1.0;
        dev.update_line_dash(&state).unwrap();
        assert_eq!(cr.dash(), (vec![3.0, 1.0], 1.0));

        assert!(cr.status().is_ok());
    }

    #[test]
    fn singular_ctm_is_ignored() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();

        let mut dev = device_on(&cr);
        let state = GfxState::default();
        dev.update_ctm(&state, &Transform::new_scale(0.0, 1.0))
            .unwrap();

        assert!(cr.status().is_ok());
        assert_eq!(cr.matrix(), cairo::Matrix::identity());
    }

    #[test]
    fn set_cairo_remembers_matrix_for_type3_glyphs() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        cr.translate(0.0, 10.0);

        let mut dev = device_on(&cr);
        cr.scale(5.0, 5.0);

        let mut state = GfxState::default();
        state.ctm = Transform::new_scale(2.0, -2.0);

        dev.begin_type3_char(&state, 65, &[]).unwrap();
        assert_eq!(cr.matrix(), cairo::Matrix::new(2.0, 0.0, 0.0, -2.0, 0.0, 10.0));

        dev.end_type3_char(&state).unwrap();
        assert_eq!(cr.matrix(), cairo::Matrix::new(5.0, 0.0, 0.0, 5.0, 0.0, 10.0));
    }

    #[test]
    fn unbound_device_does_nothing() {
        let mut dev = CairoOutputDev::new(
            Session::new_for_test_suite(),
            DeviceConfig::default(),
            Box::new(ToyFontEngine::new()),
        );
        let state = GfxState::default();

        dev.save_state(&state).unwrap();
        dev.fill(&state).unwrap();
        dev.end_transparency_group(&state).unwrap();
        dev.restore_state(&state).unwrap();
        assert!(dev.cairo().is_none());
    }
}
