//! Image surfaces with exclusive write access, and read-only snapshots of them.

use cairo::{self, ImageSurface};

use super::{ImageSurfaceDataExt, Pixel, PixelOps};

/// An image surface that nobody else references yet, so that its pixels can be
/// written directly.
///
/// The off-screen buffers of the image operations are built with this and
/// then handed to Cairo as the source of a surface pattern.
pub struct ExclusiveImageSurface {
    surface: ImageSurface,
    width: i32,
    height: i32,
    format: cairo::Format,
}

impl ExclusiveImageSurface {
    /// Creates a zero-filled surface.
    ///
    /// Fails with `cairo::Error::NoMemory` or `cairo::Error::InvalidSize` when
    /// the buffer cannot be allocated.
    pub fn new(
        width: i32,
        height: i32,
        format: cairo::Format,
    ) -> Result<ExclusiveImageSurface, cairo::Error> {
        let surface = ImageSurface::create(format, width, height)?;

        Ok(ExclusiveImageSurface {
            surface,
            width,
            height,
            format,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> cairo::Format {
        self.format
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.surface.stride() as usize
    }

    /// Calls `draw_fn` with the surface's bytes and its stride.
    pub fn modify(
        &mut self,
        draw_fn: &mut dyn FnMut(&mut [u8], usize),
    ) -> Result<(), cairo::BorrowError> {
        let stride = self.stride();
        let mut data = self.surface.data()?;
        draw_fn(&mut data, stride);
        Ok(())
    }

    /// Gives up exclusive access; the surface may now be used as a source.
    pub fn into_image_surface(self) -> ImageSurface {
        self.surface
    }
}

/// A read-only copy of the pixels of an image surface.
///
/// Reading the pixels of a surface that is still the target of a context
/// requires flushing it first; this takes care of that and keeps the bytes
/// around so that pixels can be inspected at leisure.
#[derive(Debug, Clone)]
pub struct SharedImageSurface {
    data: Vec<u8>,
    width: i32,
    height: i32,
    stride: usize,
    format: cairo::Format,
}

impl SharedImageSurface {
    pub fn from_surface(surface: &ImageSurface) -> Result<SharedImageSurface, cairo::BorrowError> {
        let mut data = Vec::new();
        surface.with_data(|bytes| data.extend_from_slice(bytes))?;

        Ok(SharedImageSurface {
            data,
            width: surface.width(),
            height: surface.height(),
            stride: surface.stride() as usize,
            format: surface.format(),
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn format(&self) -> cairo::Format {
        self.format
    }

    /// Returns the premultiplied pixel at the given coordinates.
    ///
    /// `A8` surfaces read as black with the stored alpha; `Rgb24` surfaces are opaque.
    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(x < self.width as u32);
        assert!(y < self.height as u32);

        match self.format {
            cairo::Format::A8 => Pixel::new(0, 0, 0, self.data[y as usize * self.stride + x as usize]),
            cairo::Format::Rgb24 => {
                let mut p = Pixel::from_u32(self.data.get_u32(self.stride, x, y));
                p.a = 255;
                p
            }
            _ => Pixel::from_u32(self.data.get_u32(self.stride, x, y)),
        }
    }

    #[inline]
    pub fn get_alpha(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).a
    }

    /// Iterates over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Pixel)> + '_ {
        let (w, h) = (self.width as u32, self.height as u32);
        (0..h).flat_map(move |y| (0..w).map(move |x| (x, y, self.get_pixel(x, y))))
    }

    /// Whether every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.pixels().all(|(_, _, p)| p.a == 0)
    }
}
