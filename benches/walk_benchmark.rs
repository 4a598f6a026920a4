use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seepaw_api::services::walk::{DistanceAccumulator, LocationFix};

// ~10 m of latitude at the mean Earth radius
const LAT_STEP_10M: f64 = 10.0 / 111_194.93;

/// Synthetic walk: fixes 10 m apart marching north, with a gentle wiggle in
/// longitude so the route is not a degenerate straight line.
fn synthetic_route(fix_count: usize) -> Vec<LocationFix> {
    let now = Utc::now();
    (0..fix_count)
        .map(|i| LocationFix {
            latitude: 37.42 + i as f64 * LAT_STEP_10M,
            longitude: -122.08 + ((i % 7) as f64) * 1e-5,
            timestamp: now,
        })
        .collect()
}

fn benchmark_distance_accumulation(c: &mut Criterion) {
    let short_route = synthetic_route(60); // one fix per second for a minute
    let long_route = synthetic_route(3600); // an hour-long walk

    let mut group = c.benchmark_group("distance_accumulation");

    group.bench_function("one_minute_walk", |b| {
        b.iter(|| {
            let mut acc = DistanceAccumulator::new();
            for fix in black_box(&short_route) {
                acc.add_fix(fix);
            }
            acc.total_meters()
        })
    });

    group.bench_function("one_hour_walk", |b| {
        b.iter(|| {
            let mut acc = DistanceAccumulator::new();
            for fix in black_box(&long_route) {
                acc.add_fix(fix);
            }
            acc.total_meters()
        })
    });

    group.finish();
}

fn benchmark_polyline_encoding(c: &mut Criterion) {
    let route = synthetic_route(3600);
    let coords: Vec<geo::Coord> = route
        .iter()
        .map(|f| geo::coord! { x: f.longitude, y: f.latitude })
        .collect();

    c.bench_function("polyline_encode_one_hour_route", |b| {
        b.iter(|| polyline::encode_coordinates(black_box(coords.iter().copied()), 5))
    });
}

criterion_group!(
    benches,
    benchmark_distance_accumulation,
    benchmark_polyline_encoding
);
criterion_main!(benches);
