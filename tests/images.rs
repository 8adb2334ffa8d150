use pdfcairo::tests_only::Pixel;
use pdfcairo::{
    DeviceColorMap, DeviceColorSpace, DeviceConfig, ImageData, ImageFilter, OutputDev, StencilMask,
};

mod common;
use common::{assert_alpha_near, Page};

fn nearest() -> DeviceConfig {
    DeviceConfig {
        prescale_images: true,
        image_filter: ImageFilter::Nearest,
        mask_filter: ImageFilter::Nearest,
    }
}

fn page_with_unit_square(width: i32, height: i32, config: DeviceConfig) -> Page {
    let mut page = Page::with_config(width, height, config);
    page.place_unit_square(0.0, 0.0, f64::from(width), f64::from(height));
    page
}

#[test]
fn image_fills_unit_square_first_row_on_top() {
    let mut page = page_with_unit_square(20, 20, nearest());
    let map = DeviceColorMap::new(DeviceColorSpace::Rgb, 8);
    let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
    let image = ImageData {
        data: &data,
        width: 2,
        height: 2,
        color_map: &map,
    };

    page.dev.draw_image(&page.state, &image, None).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_pixel(5, 5), Pixel::new(255, 0, 0, 255));
    assert_eq!(pixels.get_pixel(15, 5), Pixel::new(0, 255, 0, 255));
    assert_eq!(pixels.get_pixel(5, 15), Pixel::new(0, 0, 255, 255));
    assert_eq!(pixels.get_pixel(15, 15), Pixel::new(255, 255, 255, 255));
}

#[test]
fn color_key_makes_matching_pixels_transparent() {
    let mut page = page_with_unit_square(20, 10, nearest());
    let map = DeviceColorMap::new(DeviceColorSpace::Gray, 8);
    let data = [5, 200];
    let image = ImageData {
        data: &data,
        width: 2,
        height: 1,
        color_map: &map,
    };

    page.dev.draw_image(&page.state, &image, Some(&[0, 10])).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_alpha(5, 5), 0);
    assert_eq!(pixels.get_pixel(15, 5), Pixel::new(200, 200, 200, 255));
}

#[test]
fn stencil_paints_fill_color() {
    let mut page = page_with_unit_square(20, 10, nearest());
    page.set_fill_rgb(0.0, 0.0, 1.0);

    let data = [0b0100_0000];
    let mask = StencilMask::new(&data, 2, 1, false);
    page.dev.draw_image_mask(&page.state, &mask).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_pixel(5, 5), Pixel::new(0, 0, 255, 255));
    assert_eq!(pixels.get_alpha(15, 5), 0);
}

#[test]
fn inverted_stencil_paints_the_complement() {
    let data: Vec<u8> = (0..8u8).map(|i| i.wrapping_mul(37) ^ 0x5a).collect();

    let render = |invert| {
        let mut page = page_with_unit_square(16, 16, nearest());
        let mask = StencilMask::new(&data, 8, 8, invert);
        page.dev.draw_image_mask(&page.state, &mask).unwrap();
        page.pixels()
    };

    let plain = render(false);
    let inverted = render(true);

    for (x, y, p) in plain.pixels() {
        assert_eq!(
            u32::from(p.a) + u32::from(inverted.get_alpha(x, y)),
            255,
            "pixel ({x}, {y})"
        );
    }
}

#[test]
fn one_pixel_stencil_fills_only_when_it_paints() {
    let mut page = page_with_unit_square(10, 10, nearest());
    let data = [0x00];
    page.dev
        .draw_image_mask(&page.state, &StencilMask::new(&data, 1, 1, false))
        .unwrap();
    assert_eq!(page.pixels().get_alpha(0, 0), 255);
    assert_eq!(page.pixels().get_alpha(9, 9), 255);

    let mut page = page_with_unit_square(10, 10, nearest());
    page.dev
        .draw_image_mask(&page.state, &StencilMask::new(&data, 1, 1, true))
        .unwrap();
    assert!(page.pixels().is_transparent());
}

/// A 16x16 checkerboard of single pixels.
fn checkerboard() -> Vec<u8> {
    (0..16).flat_map(|y| if y % 2 == 0 { [0xaa, 0xaa] } else { [0x55, 0x55] }).collect()
}

#[test]
fn prescaled_stencil_averages_coverage() {
    let data = checkerboard();
    let mut page = page_with_unit_square(4, 4, nearest());
    page.dev
        .draw_image_mask(&page.state, &StencilMask::new(&data, 16, 16, false))
        .unwrap();

    for (_x, _y, p) in page.pixels().pixels() {
        assert_alpha_near(p.a, 128, 1);
    }
}

#[test]
fn cairo_downscaled_stencil_is_close_to_prescaled() {
    let data = checkerboard();
    let config = DeviceConfig {
        prescale_images: false,
        mask_filter: ImageFilter::Best,
        ..nearest()
    };

    let mut page = page_with_unit_square(4, 4, config);
    page.dev
        .draw_image_mask(&page.state, &StencilMask::new(&data, 16, 16, false))
        .unwrap();

    let pixels = page.pixels();
    assert_alpha_near(pixels.get_alpha(1, 1), 128, 8);
    assert_alpha_near(pixels.get_alpha(2, 2), 128, 8);
}

#[test]
fn masked_image_shows_through_stencil() {
    let mut page = page_with_unit_square(20, 10, nearest());
    let map = DeviceColorMap::new(DeviceColorSpace::Rgb, 8);
    let data = [255, 0, 0, 255, 0, 0];
    let image = ImageData {
        data: &data,
        width: 2,
        height: 1,
        color_map: &map,
    };

    let bits = [0b0100_0000];
    let mask = StencilMask::new(&bits, 2, 1, false);
    page.dev.draw_masked_image(&page.state, &image, &mask).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_pixel(5, 5), Pixel::new(255, 0, 0, 255));
    assert_eq!(pixels.get_alpha(15, 5), 0);
}

#[test]
fn masked_image_and_stencil_may_differ_in_size() {
    let mut page = page_with_unit_square(20, 20, nearest());
    let map = DeviceColorMap::new(DeviceColorSpace::Gray, 8);
    let data = [0];
    let image = ImageData {
        data: &data,
        width: 1,
        height: 1,
        color_map: &map,
    };

    // Paints the top row only.
    let bits = [0b0000_0000, 0b1100_0000];
    let mask = StencilMask::new(&bits, 2, 2, false);
    page.dev.draw_masked_image(&page.state, &image, &mask).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_pixel(5, 5), Pixel::new(0, 0, 0, 255));
    assert_eq!(pixels.get_pixel(15, 5), Pixel::new(0, 0, 0, 255));
    assert_eq!(pixels.get_alpha(5, 15), 0);
    assert_eq!(pixels.get_alpha(15, 15), 0);
}

#[test]
fn soft_mask_gray_levels_become_alpha() {
    let mut page = page_with_unit_square(20, 10, nearest());
    let rgb = DeviceColorMap::new(DeviceColorSpace::Rgb, 8);
    let data = [0, 0, 255, 0, 0, 255];
    let image = ImageData {
        data: &data,
        width: 2,
        height: 1,
        color_map: &rgb,
    };

    let gray = DeviceColorMap::new(DeviceColorSpace::Gray, 8);
    let levels = [255, 0];
    let mask = ImageData {
        data: &levels,
        width: 2,
        height: 1,
        color_map: &gray,
    };

    page.dev.draw_soft_masked_image(&page.state, &image, &mask).unwrap();

    let pixels = page.pixels();
    assert_eq!(pixels.get_pixel(5, 5), Pixel::new(0, 0, 255, 255));
    assert_eq!(pixels.get_alpha(15, 5), 0);
}
