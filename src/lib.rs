//! Render the drawing operations of a page-description interpreter with Cairo.
//!
//! An interpreter for a page-description language walks a page's content
//! and calls the methods of the [`OutputDev`] trait: graphics state changes,
//! paths to fill and stroke, glyphs, images, transparency groups.  This crate
//! provides two implementations of that trait:
//!
//! * [`CairoOutputDev`] draws everything onto a `cairo::Context`.
//!
//! * [`CairoImageOutputDev`] ignores everything but images, and renders each
//!   image on a surface of its own, together with where it would be on the
//!   page.
//!
//! Fonts come from a [`FontEngine`]; image samples are decoded through an
//! [`ImageColorMap`].  Both are small traits so that the interpreter can plug
//! in its own font and color machinery.  [`ToyFontEngine`] and
//! [`DeviceColorMap`] are simple implementations for the device color spaces
//! and for system fonts.
//!
//! # Example
//!
//! ```
//! use pdfcairo::{
//!     CairoOutputDev, DeviceConfig, GfxState, OutputDev, Rgb, Session, ToyFontEngine, Transform,
//! };
//!
//! let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 100, 100).unwrap();
//! let cr = cairo::Context::new(&surface).unwrap();
//!
//! let mut dev = CairoOutputDev::new(
//!     Session::new(),
//!     DeviceConfig::default(),
//!     Box::new(ToyFontEngine::new()),
//! );
//! dev.set_cairo(Some(cr));
//!
//! // A y-up page of 100x100 units
//! let mut state = GfxState::new(Transform::new_unchecked(1.0, 0.0, 0.0, -1.0, 0.0, 100.0));
//! dev.set_default_ctm(&state.ctm).unwrap();
//! dev.update_all(&state).unwrap();
//!
//! state.fill_color = Rgb::new(0.0, 0.5, 0.0);
//! dev.update_fill_color(&state).unwrap();
//!
//! state.path.move_to(10.0, 10.0);
//! state.path.line_to(90.0, 10.0);
//! state.path.line_to(50.0, 90.0);
//! state.path.close_path();
//! dev.fill(&state).unwrap();
//!
//! dev.set_cairo(None);
//! ```
//!
//! # Logging
//!
//! Set the `PDFCAIRO_LOG` environment variable to get a trace of what the
//! backend does on standard output.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![warn(trivial_casts)]

pub use crate::color::{ColorSpace, DeviceColorMap, DeviceColorSpace, ImageColorMap, Rgb};
pub use crate::config::{DeviceConfig, ImageFilter};
pub use crate::drawing_ctx::CairoOutputDev;
pub use crate::error::{DeviceResult, ErrorReporter, LogReporter, RenderingError, Severity};
pub use crate::font::{CairoFont, FontEngine, FontKind, FontRef, ToyFont, ToyFontEngine};
pub use crate::image::{ImageData, StencilMask};
pub use crate::image_capture::{CairoImage, CairoImageOutputDev};
pub use crate::image_stream::ImageStream;
pub use crate::output_dev::{BBox, Capabilities, OutputDev};
pub use crate::path::{GfxPath, PathPoint, Subpath};
pub use crate::session::Session;
pub use crate::state::{GfxState, InvalidStateValue, LineCap, LineJoin, TextRenderMode};
pub use crate::trace::{Op, ReplayError, Replayer, Trace};
pub use crate::transform::Transform;

mod color;
mod config;
mod downscale;
mod drawing_ctx;
mod error;
mod font;
mod group;
mod image;
mod image_capture;
mod image_stream;
mod log;
mod output_dev;
mod path;
mod session;
mod state;
mod surface_utils;
mod text;
mod trace;
mod transform;

#[doc(hidden)]
pub mod bench_only {
    pub use crate::downscale::{bresenham_steps, row_spans, Prescale, RowSpan};
    pub use crate::group::luminosity_to_alpha;
    pub use crate::image::stencil_coverage;
    pub use crate::surface_utils::{
        shared_surface::{ExclusiveImageSurface, SharedImageSurface},
        ImageSurfaceDataExt, Pixel, PixelOps,
    };
}

#[doc(hidden)]
pub mod tests_only {
    pub use crate::drawing_ctx::with_saved_cr;
    pub use crate::group::{backdrop_rgb, luminosity_mask, GroupFrame, GroupStack};
    pub use crate::image::{
        color_surface, gray_surface, stencil_surface, unit_square_matrix, unit_square_pattern,
    };
    pub use crate::log::PageTarget;
    pub use crate::surface_utils::shared_surface::SharedImageSurface;
    pub use crate::surface_utils::{Pixel, PixelOps};
    pub use crate::text::{GlyphRun, TextClip};
}
