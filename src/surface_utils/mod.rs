//! Various utilities for working with Cairo image surfaces.

pub mod shared_surface;

/// A pixel consisting of R, G, B and A values.
pub type Pixel = rgb::RGBA8;

pub trait PixelOps {
    fn to_luminosity_mask(&self) -> Self;
    fn to_u32(&self) -> u32;
    fn from_u32(x: u32) -> Self;
}

impl PixelOps for Pixel {
    /// Returns a mask pixel whose alpha is the luminosity of this pixel.
    ///
    /// Uses the weights 0.30, 0.59 and 0.11 for R, G and B, in 8.8 fixed point
    /// so that the weights add up to exactly 256.  White gives 255 and black
    /// gives 0.  Alpha is ignored; the color channels are taken as they are
    /// stored, premultiplied.
    #[inline]
    fn to_luminosity_mask(&self) -> Self {
        let r = u32::from(self.r);
        let g = u32::from(self.g);
        let b = u32::from(self.b);

        Self {
            r: 0,
            g: 0,
            b: 0,
            a: ((r * 77 + g * 151 + b * 28) >> 8) as u8,
        }
    }

    /// Returns the pixel value as a `u32`, in the same format as `cairo::Format::ARgb32`.
    #[inline]
    fn to_u32(&self) -> u32 {
        (u32::from(self.a) << 24)
            | (u32::from(self.r) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.b)
    }

    /// Converts a `u32` in the same format as `cairo::Format::ARgb32` into a `Pixel`.
    #[inline]
    fn from_u32(x: u32) -> Self {
        Self {
            r: ((x >> 16) & 0xFF) as u8,
            g: ((x >> 8) & 0xFF) as u8,
            b: (x & 0xFF) as u8,
            a: ((x >> 24) & 0xFF) as u8,
        }
    }
}

/// Extension methods for the bytes of a 32-bit Cairo image surface.
pub trait ImageSurfaceDataExt {
    /// Reads the pixel at the given coordinates. Assumes the `ARgb32` or `Rgb24` format.
    fn get_u32(&self, stride: usize, x: u32, y: u32) -> u32;

    /// Sets the pixel at the given coordinates. Assumes the `ARgb32` or `Rgb24` format.
    fn set_u32(&mut self, stride: usize, value: u32, x: u32, y: u32);

    #[inline]
    fn set_pixel(&mut self, stride: usize, pixel: Pixel, x: u32, y: u32) {
        self.set_u32(stride, pixel.to_u32(), x, y);
    }
}

impl ImageSurfaceDataExt for [u8] {
    #[inline]
    fn get_u32(&self, stride: usize, x: u32, y: u32) -> u32 {
        use byteorder::{ByteOrder, NativeEndian};
        let offset = y as usize * stride + x as usize * 4;
        NativeEndian::read_u32(&self[offset..offset + 4])
    }

    #[inline]
    fn set_u32(&mut self, stride: usize, value: u32, x: u32, y: u32) {
        use byteorder::{ByteOrder, NativeEndian};
        let offset = y as usize * stride + x as usize * 4;
        NativeEndian::write_u32(&mut self[offset..offset + 4], value);
    }
}
