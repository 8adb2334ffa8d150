use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfcairo::bench_only::{row_spans, stencil_coverage, Prescale};
use pdfcairo::{StencilMask, Transform};

const MASK_SIZE: usize = 2048;

fn make_mask(size: usize) -> Vec<u8> {
    let row_bytes = (size + 7) / 8;
    (0..row_bytes * size).map(|i| (i * 37 % 251) as u8).collect()
}

fn bench_downscale(c: &mut Criterion) {
    let data = make_mask(MASK_SIZE);
    let mask = StencilMask::new(&data, MASK_SIZE as u32, MASK_SIZE as u32, false);

    c.bench_function("stencil_coverage", |b| {
        b.iter(|| stencil_coverage(black_box(&mask)).unwrap())
    });

    let coverage = stencil_coverage(&mask).unwrap();
    let mut group = c.benchmark_group("prescale");

    for device_size in [64.0, 300.0, 1000.0] {
        let m = Transform::new_unchecked(device_size, 0.0, 0.0, -device_size, 0.0, device_size);
        let prescale = Prescale::compute(&m, MASK_SIZE, MASK_SIZE).unwrap();
        let mut out = vec![0u8; prescale.scaled_width * prescale.scaled_height];

        group.bench_with_input(
            BenchmarkId::from_parameter(device_size),
            &prescale,
            |b, prescale| {
                b.iter(|| {
                    prescale.downscale(
                        black_box(&coverage),
                        MASK_SIZE,
                        MASK_SIZE,
                        &mut out,
                        prescale.scaled_width,
                    )
                })
            },
        );
    }

    group.finish();

    c.bench_function("row_spans", |b| {
        b.iter(|| row_spans(black_box(MASK_SIZE), black_box(300), 3, 4))
    });
}

criterion_group!(benches, bench_downscale);
criterion_main!(benches);
