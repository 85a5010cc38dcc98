// benches/geometry_benchmark.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;

use poly_outline::color::Color;
use poly_outline::geometry::{build_polygon, Placement, PolygonTemplate, VertexStreams};
use poly_outline::scene::{build_scene, tick_rotations};
use poly_outline::config::Config;

fn octagon() -> PolygonTemplate {
    let points = (0..8)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / 8.0;
            Vec2::new(angle.cos(), angle.sin())
        })
        .collect();
    PolygonTemplate::new(points).expect("regular octagon is a valid template")
}

fn geometry_benchmark_fn(c: &mut Criterion) {
    let template = octagon();
    let placement = Placement {
        offset: Vec2::new(100.0, -50.0),
        rotation: 0.25,
        size: 12.0,
    };
    let fill = Color::new(0x3c, 0xa4, 0xcb, 0xff);
    let outline = Color::new(0x48, 0x48, 0x48, 0xff);

    let mut group = c.benchmark_group("GeometryBuilder");

    group.bench_function("build_polygon_1000_octagons", |b| {
        b.iter(|| {
            let mut streams = VertexStreams::new();
            for _ in 0..1000 {
                black_box(build_polygon(
                    black_box(&mut streams),
                    black_box(&template),
                    black_box(&placement),
                    fill,
                    outline,
                ));
            }
            streams
        })
    });

    group.bench_function("tick_rotations_10000_instances", |b| {
        let mut config = Config::default();
        config.polygon_count = 10_000;
        let mut scene = build_scene(&config);
        b.iter(|| tick_rotations(black_box(&mut scene), 0.01))
    });

    group.finish();
}

criterion_group!(benches, geometry_benchmark_fn);
criterion_main!(benches);
