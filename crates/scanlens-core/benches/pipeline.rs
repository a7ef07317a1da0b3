//! Benchmarks for the ScanLens analyzer and enhancement pipeline.
//!
//! Run with: cargo bench -p scanlens-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scanlens_core::{Config, EnhancementPipeline, Frame, PipelineConfig, SharpnessAnalyzer};

/// Noisy synthetic document page.
fn document(width: u32, height: u32) -> Frame {
    let mut rng = StdRng::seed_from_u64(42);
    let img = RgbImage::from_fn(width, height, |x, y| {
        let ink = (y % 24 < 3) || (x % 31 == 0);
        let base: i16 = if ink { 40 } else { 215 };
        let v = (base + rng.gen_range(-20i16..=20)).clamp(0, 255) as u8;
        Rgb([v, v, v])
    });
    Frame::from_dynamic(DynamicImage::ImageRgb8(img))
}

fn benchmark_sharpness(c: &mut Criterion) {
    // Cost must not depend on frame resolution.
    let analyzer = SharpnessAnalyzer::default();
    let preview = document(1280, 720);
    let capture = document(4000, 3000);

    c.bench_function("sharpness_720p", |b| {
        b.iter(|| analyzer.compute(black_box(&preview)))
    });
    c.bench_function("sharpness_12mp", |b| {
        b.iter(|| analyzer.compute(black_box(&capture)))
    });
}

fn benchmark_quick(c: &mut Criterion) {
    let pipeline = EnhancementPipeline::new(&Config::default());
    let frame = document(640, 480);
    let options = PipelineConfig::quick();

    c.bench_function("enhance_quick_640x480", |b| {
        b.iter(|| pipeline.process(black_box(&frame), &options))
    });
}

fn benchmark_full(c: &mut Criterion) {
    let pipeline = EnhancementPipeline::new(&Config::default());
    let frame = document(640, 480);
    let options = PipelineConfig::full();

    let mut group = c.benchmark_group("enhance_full");
    group.sample_size(10);
    group.bench_function("640x480", |b| {
        b.iter(|| pipeline.process(black_box(&frame), &options))
    });
    group.finish();
}

criterion_group!(benches, benchmark_sharpness, benchmark_quick, benchmark_full);
criterion_main!(benches);
