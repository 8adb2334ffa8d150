use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdfcairo::bench_only::{luminosity_to_alpha, ImageSurfaceDataExt, Pixel, PixelOps};

const SIZE: u32 = 256;

/// A soft mask group rendered over a gray backdrop: a gradient in every channel.
fn make_group_buffer(size: u32) -> (Vec<u8>, usize) {
    let stride = size as usize * 4;
    let mut data = vec![0u8; stride * size as usize];

    for y in 0..size {
        for x in 0..size {
            let pixel = Pixel {
                r: x as u8,
                g: y as u8,
                b: (x ^ y) as u8,
                a: 255,
            };
            data.set_pixel(stride, pixel, x, y);
        }
    }

    (data, stride)
}

fn bench_pixel_ops(c: &mut Criterion) {
    c.bench_function("pixel_to_luminosity_mask", |b| {
        let pixels: Vec<Pixel> = (0..1024u32)
            .map(|i| Pixel::from_u32(i.wrapping_mul(0x0101_0101) | 0xff00_0000))
            .collect();
        b.iter(|| {
            let masked: Vec<Pixel> = black_box(&pixels)
                .iter()
                .map(|p| p.to_luminosity_mask())
                .collect();
            black_box(masked);
        })
    });

    c.bench_function("luminosity_to_alpha 256x256", |b| {
        let (source, stride) = make_group_buffer(SIZE);
        b.iter(|| {
            let mut data = source.clone();
            luminosity_to_alpha(black_box(&mut data), stride, SIZE, SIZE);
            black_box(data);
        })
    });
}

criterion_group!(benches, bench_pixel_ops);
criterion_main!(benches);
