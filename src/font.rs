//! Seam to the font subsystem.
//!
//! Rasterizing fonts is not this crate's business; the backend asks a
//! [`FontEngine`] for a [`CairoFont`], which provides a Cairo font face and
//! maps character codes to glyph indices in that face.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Font technologies as far as the backend cares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontKind {
    Type1,
    TrueType,
    Cid,

    /// Glyphs are content streams, drawn by the interpreter between
    /// `begin_type3_char` and `end_type3_char`.  They never have a font face.
    Type3,
}

/// Identifies a font resource of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRef {
    pub name: String,
    pub kind: FontKind,
}

impl FontRef {
    pub fn new(name: &str, kind: FontKind) -> FontRef {
        FontRef {
            name: name.to_string(),
            kind,
        }
    }
}

/// A font ready to be used with Cairo.
pub trait CairoFont {
    fn font_face(&self) -> &cairo::FontFace;

    /// Glyph index in [`CairoFont::font_face`] for a character code and the
    /// Unicode text it maps to; `unicode` may be empty.
    fn glyph(&self, code: u32, unicode: &[char]) -> u32;
}

/// Resolves document fonts to Cairo fonts.
pub trait FontEngine {
    /// Returns `None` when the font cannot be loaded; text in that font is skipped.
    fn font(&mut self, font: &FontRef) -> Option<Rc<dyn CairoFont>>;

    /// Drops everything cached for the previous document.
    fn reset(&mut self) {}
}

/// A font engine built on Cairo's toy font API.
///
/// It picks a system font by looking at the font's name and maps characters
/// through their Unicode values.  Good enough for previews and for tests; it
/// knows nothing about embedded font programs.
#[derive(Default)]
pub struct ToyFontEngine {
    cache: HashMap<FontRef, Rc<ToyFont>>,
}

impl ToyFontEngine {
    pub fn new() -> ToyFontEngine {
        ToyFontEngine::default()
    }
}

impl FontEngine for ToyFontEngine {
    fn font(&mut self, font: &FontRef) -> Option<Rc<dyn CairoFont>> {
        if font.kind == FontKind::Type3 {
            return None;
        }

        if let Some(f) = self.cache.get(font) {
            return Some(f.clone());
        }

        let toy = Rc::new(ToyFont::new(&font.name).ok()?);
        self.cache.insert(font.clone(), toy.clone());
        Some(toy)
    }

    fn reset(&mut self) {
        self.cache.clear();
    }
}

pub struct ToyFont {
    face: cairo::FontFace,
    scaled: cairo::ScaledFont,
    glyphs: RefCell<HashMap<u32, u32>>,
}

impl ToyFont {
    pub fn new(name: &str) -> Result<ToyFont, cairo::Error> {
        let (family, slant, weight) = toy_font_description(name);

        let face = cairo::FontFace::toy_create(family, slant, weight)?;
        let options = cairo::FontOptions::new()?;
        let scaled = cairo::ScaledFont::new(
            &face,
            &cairo::Matrix::identity(),
            &cairo::Matrix::identity(),
            &options,
        )?;

        Ok(ToyFont {
            face,
            scaled,
            glyphs: RefCell::new(HashMap::new()),
        })
    }

    fn lookup(&self, text: &str) -> u32 {
        match self.scaled.text_to_glyphs(0.0, 0.0, text) {
            Ok((glyphs, _clusters)) => glyphs.first().map(|g| g.index() as u32).unwrap_or(0),
            Err(_) => 0,
        }
    }
}

impl CairoFont for ToyFont {
    fn font_face(&self) -> &cairo::FontFace {
        &self.face
    }

    fn glyph(&self, code: u32, unicode: &[char]) -> u32 {
        if let Some(&index) = self.glyphs.borrow().get(&code) {
            return index;
        }

        let text: String = if unicode.is_empty() {
            char::from_u32(code).into_iter().collect()
        } else {
            unicode.iter().collect()
        };

        let index = if text.is_empty() { 0 } else { self.lookup(&text) };
        self.glyphs.borrow_mut().insert(code, index);
        index
    }
}

/// Guesses a toy font family, slant and weight from a font name like `Helvetica-BoldOblique`.
fn toy_font_description(name: &str) -> (&'static str, cairo::FontSlant, cairo::FontWeight) {
    let lower = name.to_ascii_lowercase();

    let family = if lower.contains("courier") || lower.contains("mono") {
        "monospace"
    } else if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
        "serif"
    } else {
        "sans-serif"
    };

    let slant = if lower.contains("italic") || lower.contains("oblique") {
        cairo::FontSlant::Italic
    } else {
        cairo::FontSlant::Normal
    };

    let weight = if lower.contains("bold") {
        cairo::FontWeight::Bold
    } else {
        cairo::FontWeight::Normal
    };

    (family, slant, weight)
}
