use pdfcairo::tests_only::Pixel;
use pdfcairo::{OutputDev, Rgb, Transform};
use proptest::prelude::*;

mod common;
use common::Page;

fn unit_rgb() -> impl Strategy<Value = Rgb> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn restore_brings_back_colors(before in unit_rgb(), inside in unit_rgb()) {
        let mut page = Page::new(1, 1);

        page.state.fill_color = before;
        page.state.stroke_color = before;
        page.dev.update_fill_color(&page.state).unwrap();
        page.dev.update_stroke_color(&page.state).unwrap();

        page.save();
        page.state.fill_color = inside;
        page.state.stroke_color = inside;
        page.dev.update_fill_color(&page.state).unwrap();
        page.dev.update_stroke_color(&page.state).unwrap();
        page.restore();

        prop_assert_eq!(page.dev.fill_color(), before);
        prop_assert_eq!(page.dev.stroke_color(), before);
    }

    #[test]
    fn restore_brings_back_opacities(before in 0.0..=1.0f64, inside in 0.0..=1.0f64) {
        let mut page = Page::new(1, 1);

        page.state.fill_opacity = before;
        page.state.stroke_opacity = before;
        page.dev.update_fill_opacity(&page.state).unwrap();
        page.dev.update_stroke_opacity(&page.state).unwrap();

        page.save();
        page.state.fill_opacity = inside;
        page.state.stroke_opacity = inside;
        page.dev.update_fill_opacity(&page.state).unwrap();
        page.dev.update_stroke_opacity(&page.state).unwrap();
        page.restore();

        prop_assert_eq!(page.dev.fill_opacity(), before);
        prop_assert_eq!(page.dev.stroke_opacity(), before);
    }
}

#[test]
fn restored_fill_color_is_drawn() {
    let mut page = Page::new(10, 10);
    page.set_fill_rgb(0.0, 1.0, 0.0);

    page.save();
    page.set_fill_rgb(1.0, 0.0, 0.0);
    page.restore();

    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill();

    assert_eq!(page.pixels().get_pixel(5, 5), Pixel::new(0, 255, 0, 255));
}

#[test]
fn restore_brings_back_ctm() {
    let mut page = Page::new(20, 20);

    page.save();
    page.concat(Transform::new_scale(2.0, 2.0));
    page.restore();

    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill();

    let pixels = page.pixels();
    assert_eq!(pixels.get_alpha(5, 15), 255);
    assert_eq!(pixels.get_alpha(15, 5), 0);
}

#[test]
fn fill_opacity_applies_to_fills() {
    let mut page = Page::new(10, 10);
    page.state.fill_opacity = 0.5;
    page.dev.update_fill_opacity(&page.state).unwrap();

    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill();

    common::assert_alpha_near(page.pixels().get_alpha(5, 5), 128, 1);
}

#[test]
fn singular_ctm_is_skipped() {
    let mut page = Page::new(10, 10);
    page.concat(Transform::new_scale(0.0, 0.0));

    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill();

    assert_eq!(page.pixels().get_alpha(5, 5), 255);
    assert!(
        page.dev.cairo().unwrap().status().is_ok(),
        "the context must not be put into an error state"
    );
}

#[test]
fn zero_width_lines_stay_visible_when_scaled_down() {
    let mut page = Page::new(20, 20);
    page.concat(Transform::new_scale(0.01, 0.01));
    page.state.line_width = 0.0;
    page.dev.update_line_width(&page.state).unwrap();

    page.state.path.move_to(0.0, 1000.0);
    page.state.path.line_to(2000.0, 1000.0);
    page.dev.stroke(&page.state).unwrap();

    let pixels = page.pixels();
    let column: u32 = (0..20).map(|y| u32::from(pixels.get_alpha(10, y))).sum();
    assert!(column > 0);
}

#[test]
fn unbound_device_ignores_everything() {
    let mut page = Page::new(10, 10);
    page.dev.set_cairo(None);

    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill();
    page.dev.save_state(&page.state).unwrap();
    page.dev.restore_state(&page.state).unwrap();

    assert!(page.dev.cairo().is_none());
    assert!(page.pixels().is_transparent());
}
