//! A backend that extracts the images of a page instead of drawing the page.
//!
//! Every image is rendered on its own surface, at one device pixel per image
//! pixel, together with the quadrilateral it would cover on the page.

use crate::config::DeviceConfig;
use crate::drawing_ctx::CairoOutputDev;
use crate::error::{DeviceResult, ErrorReporter, RenderingError};
use crate::font::{CairoFont, FontEngine, FontRef};
use crate::image::{ImageData, StencilMask};
use crate::output_dev::{Capabilities, OutputDev};
use crate::pdfcairo_log;
use crate::session::Session;
use crate::state::GfxState;
use crate::transform::Transform;

use std::rc::Rc;

/// An image extracted from a page.
#[derive(Debug)]
pub struct CairoImage {
    surface: cairo::ImageSurface,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CairoImage {
    pub fn new(surface: cairo::ImageSurface, x1: f64, y1: f64, x2: f64, y2: f64) -> CairoImage {
        CairoImage {
            surface,
            x1,
            y1,
            x2,
            y2,
        }
    }

    pub fn surface(&self) -> &cairo::ImageSurface {
        &self.surface
    }

    pub fn into_surface(self) -> cairo::ImageSurface {
        self.surface
    }

    /// Device-space position of the image: `(x1, y1)` is where its top-left
    /// corner lands and `(x2, y2)` where its bottom-right corner does.
    pub fn rect(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }
}

/// Text is not drawn while capturing images.
struct NoFonts;

impl FontEngine for NoFonts {
    fn font(&mut self, _font: &FontRef) -> Option<Rc<dyn CairoFont>> {
        None
    }
}

/// Collects the images of the pages it is given.
pub struct CairoImageOutputDev {
    inner: CairoOutputDev,
    images: Vec<CairoImage>,
}

impl CairoImageOutputDev {
    pub fn new(session: Session, config: DeviceConfig) -> CairoImageOutputDev {
        CairoImageOutputDev {
            inner: CairoOutputDev::new(session, config, Box::new(NoFonts)),
            images: Vec::new(),
        }
    }

    pub fn with_error_reporter(self, reporter: Box<dyn ErrorReporter>) -> CairoImageOutputDev {
        CairoImageOutputDev {
            inner: self.inner.with_error_reporter(reporter),
            images: self.images,
        }
    }

    /// The images captured so far, in drawing order.
    pub fn images(&self) -> &[CairoImage] {
        &self.images
    }

    /// Hands the captured images over to the caller and starts a new list.
    pub fn take_images(&mut self) -> Vec<CairoImage> {
        std::mem::take(&mut self.images)
    }

    fn image_surface(width: u32, height: u32) -> Result<cairo::ImageSurface, RenderingError> {
        let too_big = || RenderingError::OutOfMemory(format!("image of {width}x{height} pixels"));

        let w = i32::try_from(width).map_err(|_| too_big())?;
        let h = i32::try_from(height).map_err(|_| too_big())?;

        Ok(cairo::ImageSurface::create(cairo::Format::ARgb32, w, h)?)
    }

    /// Draws one image with `draw` on a fresh surface and records it.
    fn capture<F>(&mut self, state: &GfxState, width: u32, height: u32, draw: F) -> DeviceResult
    where
        F: FnOnce(&mut CairoOutputDev) -> DeviceResult,
    {
        if width == 0 || height == 0 {
            pdfcairo_log!(self.inner.session(), "(skipping empty {}x{} image)", width, height);
            return Ok(());
        }

        let surface = match Self::image_surface(width, height) {
            Ok(s) => s,
            Err(e) => return self.inner.skip_if_out_of_memory("captured image", Err(e)),
        };

        let cr = cairo::Context::new(&surface)?;

        // The unit square covers the whole surface, with the first image row on top.
        cr.translate(0.0, f64::from(height));
        cr.scale(f64::from(width), -f64::from(height));

        self.inner.set_cairo(Some(cr));
        let result = draw(&mut self.inner);
        self.inner.set_cairo(None);
        result?;

        let (x1, y1) = state.ctm.transform_point(0.0, 1.0);
        let (x2, y2) = state.ctm.transform_point(1.0, 0.0);

        pdfcairo_log!(
            self.inner.session(),
            "(captured {}x{} image at ({}, {}) - ({}, {}))",
            width,
            height,
            x1,
            y1,
            x2,
            y2
        );

        self.images.push(CairoImage::new(surface, x1, y1, x2, y2));
        Ok(())
    }
}

impl OutputDev for CairoImageOutputDev {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ImagesOnly
    }

    // Stencil masks are painted with the fill color, so the fill paint has to
    // follow the interpreter's state stack.

    fn save_state(&mut self, state: &GfxState) -> DeviceResult {
        self.inner.save_state(state)
    }

    fn restore_state(&mut self, state: &GfxState) -> DeviceResult {
        self.inner.restore_state(state)
    }

    fn set_default_ctm(&mut self, ctm: &Transform) -> DeviceResult {
        self.inner.set_default_ctm(ctm)
    }

    fn update_all(&mut self, state: &GfxState) -> DeviceResult {
        self.inner.update_all(state)
    }

    fn update_fill_color(&mut self, state: &GfxState) -> DeviceResult {
        self.inner.update_fill_color(state)
    }

    fn update_fill_opacity(&mut self, state: &GfxState) -> DeviceResult {
        self.inner.update_fill_opacity(state)
    }

    fn draw_image_mask(&mut self, state: &GfxState, mask: &StencilMask<'_>) -> DeviceResult {
        self.capture(state, mask.width, mask.height, |dev| {
            dev.draw_image_mask(state, mask)
        })
    }

    fn draw_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask_colors: Option<&[u16]>,
    ) -> DeviceResult {
        self.capture(state, image.width, image.height, |dev| {
            dev.draw_image(state, image, mask_colors)
        })
    }

    fn draw_masked_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask: &StencilMask<'_>,
    ) -> DeviceResult {
        if mask.width == 0 || mask.height == 0 {
            return Ok(());
        }

        self.capture(state, image.width, image.height, |dev| {
            dev.draw_masked_image(state, image, mask)
        })
    }

    fn draw_soft_masked_image(
        &mut self,
        state: &GfxState,
        image: &ImageData<'_>,
        mask: &ImageData<'_>,
    ) -> DeviceResult {
        if mask.width == 0 || mask.height == 0 {
            return Ok(());
        }

        self.capture(state, image.width, image.height, |dev| {
            dev.draw_soft_masked_image(state, image, mask)
        })
    }
}
