//! Conversion of image samples to Cairo surfaces.
//!
//! Every image is drawn in the unit square of user space; see
//! [`unit_square_matrix`] for how its pixels are laid out there.

use crate::color::ImageColorMap;
use crate::downscale::Prescale;
use crate::error::RenderingError;
use crate::image_stream::ImageStream;
use crate::surface_utils::shared_surface::ExclusiveImageSurface;
use crate::surface_utils::ImageSurfaceDataExt;

/// A continuous-tone image: packed samples plus the color map that decodes them.
#[derive(Copy, Clone)]
pub struct ImageData<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub color_map: &'a dyn ImageColorMap,
}

/// A 1-bit stencil.  A sample of 0 paints, unless `invert` is set.
#[derive(Debug, Copy, Clone)]
pub struct StencilMask<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub invert: bool,
}

impl<'a> StencilMask<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, invert: bool) -> StencilMask<'a> {
        StencilMask {
            data,
            width,
            height,
            invert,
        }
    }
}

/// The matrix that maps the unit square onto a `width` by `height` image.
///
/// The first image row is at the top of the square, at user y = 1, because
/// image space has y going down while user space has it going up.
pub fn unit_square_matrix(width: u32, height: u32) -> cairo::Matrix {
    let (w, h) = (f64::from(width), f64::from(height));
    cairo::Matrix::new(w, 0.0, 0.0, -h, 0.0, h)
}

/// A surface pattern for an image surface, set up for the unit square.
pub fn unit_square_pattern(
    surface: &cairo::ImageSurface,
    filter: cairo::Filter,
) -> cairo::SurfacePattern {
    let width = surface.width().max(0) as u32;
    let height = surface.height().max(0) as u32;

    let pattern = cairo::SurfacePattern::create(surface);
    pattern.set_matrix(unit_square_matrix(width, height));
    pattern.set_filter(filter);
    pattern
}

fn create_surface(
    width: u32,
    height: u32,
    format: cairo::Format,
) -> Result<ExclusiveImageSurface, RenderingError> {
    let too_big = || RenderingError::OutOfMemory(format!("image of {width}x{height} pixels"));

    let w = i32::try_from(width).map_err(|_| too_big())?;
    let h = i32::try_from(height).map_err(|_| too_big())?;

    Ok(ExclusiveImageSurface::new(w, h, format)?)
}

/// Coverage of a stencil, one byte per pixel: 255 where it paints, 0 elsewhere.
pub fn stencil_coverage(mask: &StencilMask<'_>) -> Result<Vec<u8>, RenderingError> {
    let width = mask.width as usize;
    let height = mask.height as usize;
    let invert = u8::from(mask.invert);

    let len = width
        .checked_mul(height)
        .ok_or_else(|| RenderingError::OutOfMemory(String::from("stencil mask size")))?;

    let mut coverage = Vec::new();
    coverage
        .try_reserve_exact(len)
        .map_err(|e| RenderingError::OutOfMemory(e.to_string()))?;

    let mut stream = ImageStream::new(mask.data, width, 1, 1);
    for _ in 0..height {
        let line = stream.next_line();
        coverage.extend(line.iter().map(|&pix| if pix ^ invert != 0 { 0 } else { 255 }));
    }

    Ok(coverage)
}

/// An `A8` surface with the stencil's coverage, at the stencil's size.
pub fn stencil_surface(mask: &StencilMask<'_>) -> Result<cairo::ImageSurface, RenderingError> {
    let coverage = stencil_coverage(mask)?;
    let width = mask.width as usize;

    let mut surface = create_surface(mask.width, mask.height, cairo::Format::A8)?;
    surface.modify(&mut |data, stride| {
        for (src, dest) in coverage.chunks(width.max(1)).zip(data.chunks_mut(stride)) {
            dest[..src.len()].copy_from_slice(src);
        }
    })?;

    Ok(surface.into_image_surface())
}

/// An `A8` surface with the stencil box-filtered down to `prescale`'s size.
pub fn prescaled_stencil_surface(
    mask: &StencilMask<'_>,
    prescale: &Prescale,
) -> Result<cairo::ImageSurface, RenderingError> {
    let coverage = stencil_coverage(mask)?;

    let mut surface = create_surface(
        prescale.scaled_width as u32,
        prescale.scaled_height as u32,
        cairo::Format::A8,
    )?;

    surface.modify(&mut |data, stride| {
        prescale.downscale(
            &coverage,
            mask.width as usize,
            mask.height as usize,
            data,
            stride,
        );
    })?;

    Ok(surface.into_image_surface())
}

/// Largest value of a color-key bound once samples are unpacked to a byte.
fn unpacked_key(bound: u16, bits: u8) -> u16 {
    if bits == 16 {
        bound >> 8
    } else {
        bound
    }
}

/// A surface with the image's colors.
///
/// Without `mask_colors` the surface is `Rgb24`.  With them it is `ARgb32`, and
/// pixels whose every component lies within its `[min, max]` pair are fully
/// transparent.  The bounds are in sample units for the image's bit depth.
pub fn color_surface(
    image: &ImageData<'_>,
    mask_colors: Option<&[u16]>,
) -> Result<cairo::ImageSurface, RenderingError> {
    let width = image.width as usize;
    let components = image.color_map.num_components();
    let bits = image.color_map.bits_per_component();

    let format = if mask_colors.is_some() {
        cairo::Format::ARgb32
    } else {
        cairo::Format::Rgb24
    };

    let mut surface = create_surface(image.width, image.height, format)?;
    let mut stream = ImageStream::new(image.data, width, components, bits);
    let mut rgb = vec![0u32; width];

    surface.modify(&mut |data, stride| {
        for y in 0..image.height {
            let line = stream.next_line();
            image.color_map.rgb_line(line, &mut rgb);

            for (x, (&color, pixel)) in rgb.iter().zip(line.chunks(components.max(1))).enumerate() {
                let value = match mask_colors {
                    Some(ranges) if is_keyed(pixel, ranges, bits) => 0,
                    _ => 0xff00_0000 | color,
                };

                data.set_u32(stride, value, x as u32, y);
            }
        }
    })?;

    Ok(surface.into_image_surface())
}

fn is_keyed(pixel: &[u8], ranges: &[u16], bits: u8) -> bool {
    pixel.iter().enumerate().all(|(i, &sample)| {
        let sample = u16::from(sample);
        match (ranges.get(2 * i), ranges.get(2 * i + 1)) {
            (Some(&min), Some(&max)) => {
                sample >= unpacked_key(min, bits) && sample <= unpacked_key(max, bits)
            }
            _ => false,
        }
    })
}

/// An `A8` surface whose alpha is the gray level of the image; for soft masks.
pub fn gray_surface(image: &ImageData<'_>) -> Result<cairo::ImageSurface, RenderingError> {
    let width = image.width as usize;
    let components = image.color_map.num_components();
    let bits = image.color_map.bits_per_component();

    let mut surface = create_surface(image.width, image.height, cairo::Format::A8)?;
    let mut stream = ImageStream::new(image.data, width, components, bits);

    surface.modify(&mut |data, stride| {
        for row in data.chunks_mut(stride).take(image.height as usize) {
            let line = stream.next_line();
            image.color_map.gray_line(line, &mut row[..width]);
        }
    })?;

    Ok(surface.into_image_surface())
}
