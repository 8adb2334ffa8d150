//! Helpers shared by the integration tests.

#![allow(dead_code)]

use pdfcairo::tests_only::SharedImageSurface;
use pdfcairo::{CairoOutputDev, DeviceConfig, GfxState, OutputDev, Session, ToyFontEngine, Transform};

/// A page of `width` by `height` device pixels, with a y-up page space whose
/// units are device pixels, and a backend drawing on it.
pub struct Page {
    pub surface: cairo::ImageSurface,
    pub dev: CairoOutputDev,
    pub state: GfxState,
    saved: Vec<GfxState>,
}

impl Page {
    pub fn new(width: i32, height: i32) -> Page {
        Page::with_config(width, height, DeviceConfig::default())
    }

    pub fn with_config(width: i32, height: i32, config: DeviceConfig) -> Page {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();

        let mut dev = CairoOutputDev::new(
            Session::new_for_test_suite(),
            config,
            Box::new(ToyFontEngine::new()),
        );
        dev.set_cairo(Some(cr));

        let ctm = Transform::new_unchecked(1.0, 0.0, 0.0, -1.0, 0.0, f64::from(height));
        let state = GfxState::new(ctm);

        dev.start_page(1, &state).unwrap();
        dev.set_default_ctm(&ctm).unwrap();
        dev.update_all(&state).unwrap();

        Page {
            surface,
            dev,
            state,
            saved: Vec::new(),
        }
    }

    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
        self.dev.save_state(&self.state).unwrap();
    }

    pub fn restore(&mut self) {
        self.state = self.saved.pop().unwrap();
        self.dev.restore_state(&self.state).unwrap();
    }

    pub fn concat(&mut self, m: Transform) {
        self.state.concat_ctm(&m);
        self.dev.update_ctm(&self.state, &m).unwrap();
    }

    /// Maps the unit square, where images are drawn, onto a rectangle of the page.
    pub fn place_unit_square(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.concat(Transform::new_unchecked(width, 0.0, 0.0, height, x, y));
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let path = &mut self.state.path;
        path.move_to(x, y);
        path.line_to(x + width, y);
        path.line_to(x + width, y + height);
        path.line_to(x, y + height);
        path.close_path();
    }

    pub fn fill(&mut self) {
        self.dev.fill(&self.state).unwrap();
        self.state.path.clear();
    }

    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.state.fill_color = pdfcairo::Rgb::new(r, g, b);
        self.dev.update_fill_color(&self.state).unwrap();
    }

    pub fn pixels(&self) -> SharedImageSurface {
        SharedImageSurface::from_surface(&self.surface).unwrap()
    }
}

pub fn assert_alpha_near(actual: u8, expected: u8, tolerance: u8) {
    assert!(
        actual.abs_diff(expected) <= tolerance,
        "alpha {actual} is not within {tolerance} of {expected}"
    );
}
