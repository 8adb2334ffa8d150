//! Settings for a rendering backend.

/// Resampling filter used when Cairo scales a continuous-tone image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ImageFilter {
    Fast,
    Good,
    Best,
    Nearest,
    #[default]
    Bilinear,
}

impl From<ImageFilter> for cairo::Filter {
    fn from(f: ImageFilter) -> cairo::Filter {
        match f {
            ImageFilter::Fast => cairo::Filter::Fast,
            ImageFilter::Good => cairo::Filter::Good,
            ImageFilter::Best => cairo::Filter::Best,
            ImageFilter::Nearest => cairo::Filter::Nearest,
            ImageFilter::Bilinear => cairo::Filter::Bilinear,
        }
    }
}

/// Options that stay fixed for the lifetime of a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Downscale stencil masks with the box filter when the transform allows it,
    /// instead of leaving minification to Cairo.
    pub prescale_images: bool,

    /// Filter for images and soft-masked images.
    pub image_filter: ImageFilter,

    /// Filter for stencil masks.
    pub mask_filter: ImageFilter,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            prescale_images: true,
            image_filter: ImageFilter::Bilinear,
            mask_filter: ImageFilter::Best,
        }
    }
}
