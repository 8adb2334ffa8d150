use pdfcairo::tests_only::{Pixel, SharedImageSurface};
use pdfcairo::{CairoImageOutputDev, DeviceConfig, Replayer, Session, Trace};

const PAGE: &str = r#"
{
  "width": 100,
  "height": 100,
  "ops": [
    { "op": "rect", "x": 0, "y": 0, "width": 100, "height": 100 },
    { "op": "fill" },

    { "op": "save" },
    { "op": "concat", "matrix": [40, 0, 0, 20, 10, 0] },
    { "op": "image",
      "image": { "width": 2, "height": 1, "color_space": "rgb",
                 "data": [255, 0, 0, 0, 0, 255] } },
    { "op": "restore" },

    { "op": "fill_color", "components": [0, 1, 0] },
    { "op": "save" },
    { "op": "concat", "matrix": [10, 0, 0, 10, 60, 60] },
    { "op": "image_mask", "mask": { "width": 2, "height": 2, "data": [64, 128] } },
    { "op": "restore" }
  ]
}
"#;

fn capture(json: &str) -> CairoImageOutputDev {
    let trace = Trace::from_json(json).unwrap();
    let mut dev = CairoImageOutputDev::new(Session::new_for_test_suite(), DeviceConfig::default());
    Replayer::new(&mut dev).replay(&trace).unwrap();
    dev
}

#[test]
fn captures_only_images() {
    let dev = capture(PAGE);
    assert_eq!(dev.images().len(), 2);
}

#[test]
fn records_where_images_land_on_the_device() {
    let dev = capture(PAGE);
    let images = dev.images();

    assert_eq!(images[0].rect(), (10.0, 80.0, 50.0, 100.0));
    assert_eq!(images[1].rect(), (60.0, 30.0, 70.0, 40.0));
}

#[test]
fn images_keep_their_own_resolution() {
    let mut dev = capture(PAGE);
    let images = dev.take_images();

    assert_eq!((images[0].width(), images[0].height()), (2, 1));

    let pixels = SharedImageSurface::from_surface(images[0].surface()).unwrap();
    assert_eq!(pixels.get_pixel(0, 0), Pixel::new(255, 0, 0, 255));
    assert_eq!(pixels.get_pixel(1, 0), Pixel::new(0, 0, 255, 255));
}

#[test]
fn stencils_are_captured_in_fill_color() {
    let mut dev = capture(PAGE);
    let images = dev.take_images();

    let pixels = SharedImageSurface::from_surface(images[1].surface()).unwrap();
    assert_eq!(pixels.get_pixel(0, 0), Pixel::new(0, 255, 0, 255));
    assert_eq!(pixels.get_alpha(1, 0), 0);
    assert_eq!(pixels.get_alpha(0, 1), 0);
    assert_eq!(pixels.get_pixel(1, 1), Pixel::new(0, 255, 0, 255));
}

#[test]
fn page_without_images_captures_nothing() {
    let dev = capture(r#"{ "width": 10, "height": 10, "ops": [ { "op": "stroke" } ] }"#);
    assert!(dev.images().is_empty());
}

#[test]
fn text_and_groups_do_not_disturb_capture() {
    let dev = capture(
        r#"{
          "width": 100,
          "height": 100,
          "ops": [
            { "op": "begin_text" },
            { "op": "font", "name": "Helvetica", "size": 24 },
            { "op": "render_mode", "mode": 7 },
            { "op": "show_text", "text": "clip", "x": 10, "y": 10 },
            { "op": "end_text" },

            { "op": "begin_group", "bbox": [0, 0, 100, 100], "isolated": true },
            { "op": "fill_color", "components": [1, 0, 0] },
            { "op": "save" },
            { "op": "concat", "matrix": [10, 0, 0, 10, 0, 0] },
            { "op": "image_mask", "mask": { "width": 1, "height": 1, "data": [0] } },
            { "op": "restore" },
            { "op": "end_group" },
            { "op": "paint_group" },

            { "op": "begin_group", "for_soft_mask": true },
            { "op": "end_group" },
            { "op": "soft_mask", "backdrop": [0] },

            { "op": "save" },
            { "op": "concat", "matrix": [20, 0, 0, 20, 50, 50] },
            { "op": "image",
              "image": { "width": 1, "height": 1, "color_space": "gray", "data": [255] } },
            { "op": "restore" },
            { "op": "clear_soft_mask" }
          ]
        }"#,
    );

    let images = dev.images();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].rect(), (0.0, 90.0, 10.0, 100.0));
    assert_eq!(images[1].rect(), (50.0, 30.0, 70.0, 50.0));

    let stencil = SharedImageSurface::from_surface(images[0].surface()).unwrap();
    assert_eq!(stencil.get_pixel(0, 0), Pixel::new(255, 0, 0, 255));

    let image = SharedImageSurface::from_surface(images[1].surface()).unwrap();
    assert_eq!(image.get_pixel(0, 0), Pixel::new(255, 255, 255, 255));
}
