//! Utilities for logging messages from the library.

use std::fmt;

use once_cell::sync::Lazy;

#[doc(hidden)]
#[macro_export]
macro_rules! pdfcairo_log {
    (
        $session:expr,
        $($arg:tt)+
    ) => {
        if $session.log_enabled() {
            println!("{}", format_args!($($arg)+));
        }
    };
}

/// Whether the `PDFCAIRO_LOG` environment variable was set when the process first asked.
pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("PDFCAIRO_LOG").is_some());

    *ENABLED
}

/// What the log says about a page context handed to
/// [`crate::CairoOutputDev::set_cairo`].
///
/// The page's base matrix is the one every later `set_default_ctm` is
/// composed with, so it goes into the log together with the target kind and,
/// for image targets, the size in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PageTarget {
    pub surface_type: cairo::SurfaceType,
    pub pixel_size: Option<(i32, i32)>,
    pub base_matrix: [f64; 6],
}

impl PageTarget {
    pub fn new(cr: &cairo::Context) -> Self {
        let target = cr.target();
        let surface_type = target.type_();

        let pixel_size = cairo::ImageSurface::try_from(target)
            .ok()
            .map(|image| (image.width(), image.height()));

        let m = cr.matrix();

        Self {
            surface_type,
            pixel_size,
            base_matrix: [m.xx(), m.yx(), m.xy(), m.yy(), m.x0(), m.y0()],
        }
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} surface", self.surface_type)?;

        if let Some((w, h)) = self.pixel_size {
            write!(f, " {}x{}", w, h)?;
        }

        let [a, b, c, d, e, g] = self.base_matrix;
        write!(f, ", base matrix [{} {} {} {} {} {}]", a, b, c, d, e, g)
    }
}
