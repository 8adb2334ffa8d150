//! Transparency groups and soft masks.
//!
//! A transparency group is drawn off-screen with `cairo_push_group()`, then
//! either composited onto its backdrop or turned into a soft mask for the
//! next group.  The [`GroupStack`] tracks the frames between those steps.

use std::fmt;
use std::rc::Rc;

use crate::color::{ColorSpace, DeviceColorSpace, Rgb};
use crate::error::RenderingError;
use crate::surface_utils::{ImageSurfaceDataExt, Pixel, PixelOps};

/// One open transparency group.
pub struct GroupFrame {
    /// Color space in which the group is blended; soft-mask backdrops are given in it.
    pub color_space: Option<Rc<dyn ColorSpace>>,
    pub isolated: bool,
    pub knockout: bool,

    /// Set once the group has been ended.
    result: Option<cairo::Pattern>,
}

impl GroupFrame {
    pub fn new(color_space: Option<Rc<dyn ColorSpace>>, isolated: bool, knockout: bool) -> Self {
        GroupFrame {
            color_space,
            isolated,
            knockout,
            result: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.result.is_some()
    }
}

impl fmt::Debug for GroupFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupFrame")
            .field("color_space", &self.color_space)
            .field("isolated", &self.isolated)
            .field("knockout", &self.knockout)
            .field("ended", &self.is_ended())
            .finish()
    }
}

/// Open groups, innermost last.
#[derive(Debug, Default)]
pub struct GroupStack {
    frames: Vec<GroupFrame>,
}

impl GroupStack {
    pub fn new() -> GroupStack {
        GroupStack::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, frame: GroupFrame) {
        self.frames.push(frame);
    }

    /// Fails if there is no open group to end.
    pub fn check_can_end(&self) -> Result<(), RenderingError> {
        match self.frames.last() {
            Some(frame) if !frame.is_ended() => Ok(()),
            Some(_) => Err(RenderingError::InvalidState(String::from(
                "transparency group ended twice",
            ))),
            None => Err(RenderingError::InvalidState(String::from(
                "ending a transparency group that was never begun",
            ))),
        }
    }

    /// Stores the result of the innermost group.
    pub fn end(&mut self, result: cairo::Pattern) -> Result<(), RenderingError> {
        self.check_can_end()?;

        if let Some(frame) = self.frames.last_mut() {
            frame.result = Some(result);
        }

        Ok(())
    }

    /// Removes the innermost group, which must have been ended, and returns it with its result.
    pub fn pop_ended(&mut self) -> Result<(GroupFrame, cairo::Pattern), RenderingError> {
        match self.frames.last() {
            Some(frame) if frame.is_ended() => (),
            Some(_) => {
                return Err(RenderingError::InvalidState(String::from(
                    "using a transparency group that was not ended",
                )))
            }
            None => {
                return Err(RenderingError::InvalidState(String::from(
                    "no transparency group to use",
                )))
            }
        }

        let mut frame = self
            .frames
            .pop()
            .ok_or_else(|| RenderingError::InvalidState(String::from("empty group stack")))?;

        let result = frame
            .result
            .take()
            .ok_or_else(|| RenderingError::InvalidState(String::from("group has no result")))?;

        Ok((frame, result))
    }
}

/// Converts a backdrop color given in the group's color space to RGB.
///
/// Without a blending color space, the number of components picks one of the
/// device spaces.
pub fn backdrop_rgb(color_space: Option<&dyn ColorSpace>, backdrop: &[f64]) -> Rgb {
    match color_space {
        Some(cs) => cs.to_rgb(backdrop),
        None => match backdrop.len() {
            0 => Rgb::new(0.0, 0.0, 0.0),
            1 | 2 => DeviceColorSpace::Gray.to_rgb(backdrop),
            3 => DeviceColorSpace::Rgb.to_rgb(backdrop),
            _ => DeviceColorSpace::Cmyk.to_rgb(backdrop),
        },
    }
}

/// Device-space bounding box of the current clip, snapped outwards to whole pixels.
fn device_clip_extents(cr: &cairo::Context) -> Result<(i32, i32, i32, i32), RenderingError> {
    let (x1, y1, x2, y2) = cr.clip_extents()?;

    let corners = [
        cr.user_to_device(x1, y1),
        cr.user_to_device(x2, y1),
        cr.user_to_device(x1, y2),
        cr.user_to_device(x2, y2),
    ];

    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    Ok((
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    ))
}

/// Builds a luminosity soft mask from an ended group.
///
/// The group is rendered over an opaque `backdrop` into a buffer that covers
/// the clip, then every pixel's luminosity becomes its alpha.  The returned
/// pattern uses the group's own pattern matrix, so it lines up with whatever
/// is painted through it under the same transform.
pub fn luminosity_mask(
    cr: &cairo::Context,
    group: &cairo::Pattern,
    backdrop: Rgb,
) -> Result<cairo::Pattern, RenderingError> {
    let (x1, y1, x2, y2) = device_clip_extents(cr)?;
    let width = (x2 - x1).max(1);
    let height = (y2 - y1).max(1);

    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;

    // The group's surface starts at its own device position; make the mask's
    // pixels land on the same device pixels.
    let (x_offset, y_offset) = match cairo::SurfacePattern::try_from(group.clone()) {
        Ok(p) => p.surface()?.device_offset(),
        Err(_) => (f64::from(-x1), f64::from(-y1)),
    };
    surface.set_device_offset(x_offset, y_offset);

    {
        let mask_cr = cairo::Context::new(&surface)?;
        mask_cr.set_matrix(cr.matrix());

        mask_cr.set_source_rgb(backdrop.r, backdrop.g, backdrop.b);
        mask_cr.paint()?;

        mask_cr.set_source(group)?;
        mask_cr.paint()?;
    }

    surface.flush();

    {
        let stride = surface.stride() as usize;
        let mut data = surface.data()?;
        luminosity_to_alpha(&mut data, stride, width as u32, height as u32);
    }

    let mask = cairo::SurfacePattern::create(&surface);
    mask.set_matrix(group.matrix());

    Ok((*mask).clone())
}

/// Replaces every pixel of a 32-bit buffer with a black pixel whose alpha is
/// the original pixel's luminosity.
pub fn luminosity_to_alpha(data: &mut [u8], stride: usize, width: u32, height: u32) {
    for y in 0..height {
        for x in 0..width {
            let pixel = Pixel::from_u32(data.get_u32(stride, x, y));
            data.set_pixel(stride, pixel.to_luminosity_mask(), x, y);
        }
    }
}
