//! Glyph runs and the text clip they can add to.

use crate::error::RenderingError;

/// Glyphs collected between the start and the end of a text-showing operator.
#[derive(Debug, Default, Clone)]
pub struct GlyphRun {
    glyphs: Vec<cairo::Glyph>,
}

impl GlyphRun {
    pub fn new() -> GlyphRun {
        GlyphRun::default()
    }

    pub fn with_capacity(n: usize) -> GlyphRun {
        GlyphRun {
            glyphs: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, index: u32, x: f64, y: f64) {
        self.glyphs.push(cairo::Glyph::new(index.into(), x, y));
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn as_slice(&self) -> &[cairo::Glyph] {
        &self.glyphs
    }
}

/// The outlines of glyphs shown with a clipping render mode.
///
/// Outlines accumulate over a whole text object and become the clip at its end.
#[derive(Debug, Default)]
pub struct TextClip {
    path: Option<cairo::Path>,
}

impl TextClip {
    pub fn new() -> TextClip {
        TextClip::default()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_none()
    }

    /// Adds the outlines of `glyphs`, in the current font of `cr`.
    ///
    /// Leaves `cr` without a current path.
    pub fn add(&mut self, cr: &cairo::Context, glyphs: &[cairo::Glyph]) -> Result<(), RenderingError> {
        cr.new_path();

        if let Some(ref path) = self.path {
            cr.append_path(path);
        }

        cr.glyph_path(glyphs);
        self.path = Some(cr.copy_path()?);
        cr.new_path();

        Ok(())
    }

    /// Intersects the clip of `cr` with the accumulated outlines, and forgets them.
    ///
    /// Does nothing if no outlines were added.
    pub fn apply(&mut self, cr: &cairo::Context) -> Result<(), RenderingError> {
        if let Some(path) = self.path.take() {
            cr.new_path();
            cr.append_path(&path);
            cr.set_fill_rule(cairo::FillRule::Winding);
            cr.clip();
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_run_collects_positions() {
        let mut run = GlyphRun::new();
        assert!(run.is_empty());

        run.push(36, 10.0, 20.0);
        run.push(37, 16.5, 20.0);

        assert_eq!(run.len(), 2);
        assert_eq!(run.as_slice()[1].index(), 37);
        assert_eq!(run.as_slice()[1].x(), 16.5);
    }

    #[test]
    fn empty_text_clip_leaves_clip_alone() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();

        let mut clip = TextClip::new();
        clip.apply(&cr).unwrap();

        assert_eq!(cr.clip_extents().unwrap(), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn text_clip_restricts_drawing_to_glyphs() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 100, 100).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(40.0);

        let (glyphs, _) = cr
            .scaled_font()
            .text_to_glyphs(10.0, 60.0, "I")
            .unwrap();

        let mut clip = TextClip::new();
        clip.add(&cr, &glyphs).unwrap();
        assert!(!clip.is_empty());
        assert!(!cr.has_current_point().unwrap());

        clip.apply(&cr).unwrap();
        assert!(clip.is_empty());

        let (_, _, x2, y2) = cr.clip_extents().unwrap();
        assert!(x2 < 100.0);
        assert!(y2 <= 61.0);
    }
}
