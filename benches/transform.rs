// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, Criterion};
use image_rs::{DynamicImage, GrayImage, Luma};
use layer_lens::domain::{LayerTransform, Point, Rotation};
use layer_lens::layer::{ImageLayer, Layer};
use layer_lens::stack::LayerStack;
use std::hint::black_box;

fn transform_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    let mut transform = LayerTransform::new();
    transform.set_orientation(Rotation::Deg90, 1024, 768);
    transform.zoom(0.5, 300.0, 200.0);
    transform.translate(12.0, -7.0);

    group.bench_function("to_local_from_local", |b| {
        b.iter(|| {
            let local = transform.to_local(black_box(Point::new(412.5, 233.25)));
            black_box(transform.from_local(local))
        });
    });

    group.bench_function("zoom_at_anchor", |b| {
        b.iter(|| {
            let mut t = transform.clone();
            t.zoom(black_box(2.0), 100.0, 100.0);
            black_box(t)
        });
    });

    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_query");

    let mut stack = LayerStack::default();
    for i in 0..8u8 {
        let buffer = GrayImage::from_fn(256, 256, |x, y| Luma([(x ^ y) as u8 ^ i]));
        stack.add_layer(Layer::image(
            format!("layer{}", i),
            ImageLayer::new(DynamicImage::ImageLuma8(buffer)),
        ));
    }
    stack.zoom_at(0.75, Point::new(64.0, 64.0));

    group.bench_function("query_pixel_8_layers", |b| {
        b.iter(|| black_box(stack.query_pixel(black_box(Point::new(100.5, 80.25)))));
    });

    group.bench_function("status_at_8_layers", |b| {
        b.iter(|| black_box(stack.status_at(black_box(Point::new(100.5, 80.25)))));
    });

    group.finish();
}

criterion_group!(benches, transform_benchmark, query_benchmark);
criterion_main!(benches);
