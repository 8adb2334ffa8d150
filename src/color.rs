//! Color conversion seams.
//!
//! Converting sample data to RGB belongs to a color-management layer outside
//! of this crate.  The backend only talks to it through [`ColorSpace`] and
//! [`ImageColorMap`]; [`DeviceColorSpace`] and [`DeviceColorMap`] implement
//! them for the three device color spaces, which is enough for simple callers
//! and for the test suite.

use std::fmt;

use crate::image_stream::ImageStream;

/// An RGB color with components in `[0.0, 1.0]`.
pub type Rgb = rgb::RGB<f64>;

/// Converts color components to RGB; used for soft-mask backdrops.
pub trait ColorSpace: fmt::Debug {
    fn num_components(&self) -> usize;

    /// `components` has at least [`ColorSpace::num_components`] values, each in `[0.0, 1.0]`.
    fn to_rgb(&self, components: &[f64]) -> Rgb;
}

/// Converts lines of unpacked image samples for the image-drawing operations.
///
/// Samples arrive one byte per component, as produced by [`ImageStream`].
pub trait ImageColorMap {
    fn num_components(&self) -> usize;

    fn bits_per_component(&self) -> u8;

    /// Writes one `0x00RRGGBB` value per pixel into `out`.
    fn rgb_line(&self, samples: &[u8], out: &mut [u32]);

    /// Writes one gray level per pixel into `out`.
    fn gray_line(&self, samples: &[u8], out: &mut [u8]);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace for DeviceColorSpace {
    fn num_components(&self) -> usize {
        match *self {
            DeviceColorSpace::Gray => 1,
            DeviceColorSpace::Rgb => 3,
            DeviceColorSpace::Cmyk => 4,
        }
    }

    fn to_rgb(&self, c: &[f64]) -> Rgb {
        let get = |i: usize| c.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0);

        match *self {
            DeviceColorSpace::Gray => Rgb::new(get(0), get(0), get(0)),
            DeviceColorSpace::Rgb => Rgb::new(get(0), get(1), get(2)),
            DeviceColorSpace::Cmyk => {
                let k = get(3);
                Rgb::new(
                    1.0 - (get(0) + k).min(1.0),
                    1.0 - (get(1) + k).min(1.0),
                    1.0 - (get(2) + k).min(1.0),
                )
            }
        }
    }
}

/// Decodes samples of a device color space with a given bit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceColorMap {
    space: DeviceColorSpace,
    bits: u8,
    decode: Vec<(f64, f64)>,
}

impl DeviceColorMap {
    /// A color map with the default decode ranges of `[0, 1]` per component.
    pub fn new(space: DeviceColorSpace, bits: u8) -> DeviceColorMap {
        let decode = vec![(0.0, 1.0); space.num_components()];
        DeviceColorMap {
            space,
            bits,
            decode,
        }
    }

    /// Replaces the decode ranges; missing entries keep `[0, 1]`.
    pub fn with_decode(mut self, decode: &[(f64, f64)]) -> DeviceColorMap {
        for (slot, range) in self.decode.iter_mut().zip(decode) {
            *slot = *range;
        }
        self
    }

    pub fn color_space(&self) -> DeviceColorSpace {
        self.space
    }

    fn pixel_rgb(&self, pixel: &[u8], components: &mut [f64]) -> Rgb {
        let max = f64::from(ImageStream::sample_max(self.bits));

        for (i, c) in components.iter_mut().enumerate() {
            let (dmin, dmax) = self.decode[i];
            let s = f64::from(pixel.get(i).copied().unwrap_or(0));
            *c = dmin + s / max * (dmax - dmin);
        }

        self.space.to_rgb(components)
    }
}

#[inline]
fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

impl ImageColorMap for DeviceColorMap {
    fn num_components(&self) -> usize {
        self.space.num_components()
    }

    fn bits_per_component(&self) -> u8 {
        self.bits
    }

    fn rgb_line(&self, samples: &[u8], out: &mut [u32]) {
        let n = self.num_components();
        let mut components = [0.0; 4];

        for (pixel, dest) in samples.chunks(n).zip(out.iter_mut()) {
            let rgb = self.pixel_rgb(pixel, &mut components[..n]);
            *dest = (u32::from(to_byte(rgb.r)) << 16)
                | (u32::from(to_byte(rgb.g)) << 8)
                | u32::from(to_byte(rgb.b));
        }
    }

    fn gray_line(&self, samples: &[u8], out: &mut [u8]) {
        let n = self.num_components();
        let mut components = [0.0; 4];

        for (pixel, dest) in samples.chunks(n).zip(out.iter_mut()) {
            let rgb = self.pixel_rgb(pixel, &mut components[..n]);
            *dest = to_byte(0.3 * rgb.r + 0.59 * rgb.g + 0.11 * rgb.b);
        }
    }
}
