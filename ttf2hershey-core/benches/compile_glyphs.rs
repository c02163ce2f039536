//! Glyph compilation benchmarks
//!
//! Measures whole-font loading (directory, tables and eager compilation of
//! every glyph) over a synthetic font, plus the curve flattener on its own.
//!
//! Run with: `cargo bench --bench compile_glyphs`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use ttf2hershey::builder::{ComponentSpec, FontBuilder, SimpleGlyphSpec};
use ttf2hershey::{construct_curve, ContourPoint, Font, LoadOptions};

/// Rounded outline with alternating on/off-curve points
fn ring(radius: f64, points: usize) -> SimpleGlyphSpec {
    let contour: Vec<(i32, i32, bool)> = (0..points)
        .map(|i| {
            let angle = i as f64 / points as f64 * std::f64::consts::TAU;
            let r = if i % 2 == 0 { radius } else { radius * 1.1 };
            (
                (r * angle.cos()).round() as i32,
                (r * angle.sin()).round() as i32,
                i % 2 == 0,
            )
        })
        .collect();
    SimpleGlyphSpec::new().contour(&contour)
}

fn synthetic_font(glyphs: u16) -> Vec<u8> {
    let mut builder = FontBuilder::new().empty();
    for i in 1..glyphs {
        builder = if i % 4 == 0 {
            builder.compound(vec![
                ComponentSpec::offset(i - 1, 50, 0),
                ComponentSpec::offset(i - 2, -50, 0),
            ])
        } else {
            builder.simple(ring(200.0 + f64::from(i), 16 + (i as usize % 24)))
        };
    }
    for (i, ch) in (' '..='~').enumerate() {
        builder = builder.map_char(ch, (i as u16 % glyphs.max(1)).max(1));
    }
    builder.build()
}

fn benchmark_font_load(c: &mut Criterion) {
    let data = synthetic_font(256);
    let mut group = c.benchmark_group("font_load");

    for precision in [0u32, 1, 4, 10] {
        let options = LoadOptions::default().with_precision(precision);
        group.bench_with_input(
            BenchmarkId::new("precision", precision),
            &precision,
            |b, _| b.iter(|| Font::load_with_options(black_box(data.clone()), options.clone())),
        );
    }
    group.finish();
}

fn benchmark_char_lookup(c: &mut Criterion) {
    let font = Font::load(synthetic_font(128)).expect("synthetic font loads");

    c.bench_function("glyph_index_for_char_printable", |b| {
        b.iter(|| {
            (' '..='~')
                .map(|ch| u32::from(font.glyph_index_for_char(black_box(ch))))
                .sum::<u32>()
        })
    });
}

fn benchmark_construct_curve(c: &mut Criterion) {
    let contour: Vec<ContourPoint> = (0..64)
        .map(|i| ContourPoint::new(i * 10, (i % 7) * 30, i % 3 == 0))
        .collect();

    let mut group = c.benchmark_group("construct_curve");
    for precision in [1u32, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("precision", precision),
            &precision,
            |b, &precision| b.iter(|| construct_curve(black_box(&contour), precision, 5)),
        );
    }
    group.finish();
}

criterion_group!(
    name = compile_benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(50);
    targets =
        benchmark_font_load,
        benchmark_char_lookup,
        benchmark_construct_curve
);

criterion_main!(compile_benches);
