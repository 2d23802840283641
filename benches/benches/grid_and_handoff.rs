// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reident_grid::{HashGrid2D, Point2};
use reident_tracker::glam::{Quat, Vec3};
use reident_tracker::{
    EntityKind, MatchQuery, SceneEntity, SceneSnapshot, TrackerConfig, tracker,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        v as f32 / (1u64 << 24) as f32
    }
}

fn gen_points(count: usize, extent: f32) -> Vec<Point2> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| Point2::new(rng.next_f32() * extent, rng.next_f32() * extent))
        .collect()
}

/// A city block: pedestrians, parked vehicles and some props.
fn gen_scene(count: usize, extent: f32) -> SceneSnapshot {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let mut scene = SceneSnapshot::new();
    for i in 0..count {
        let handle = ((i as u32) << 8) | 0x01;
        let position = Vec3::new(rng.next_f32() * extent, rng.next_f32() * extent, 0.0);
        let entity = match i % 4 {
            0 | 1 => SceneEntity::pedestrian(handle, position, 1.7),
            2 => SceneEntity::new(handle, EntityKind::Vehicle, position),
            _ => SceneEntity::new(handle, EntityKind::Object, position),
        };
        scene.insert(entity);
    }
    scene.set_controlled(Some(0x01));
    scene
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    for &n in &[256usize, 1024, 4096] {
        let points = gen_points(n, 200.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("rebuild_n{}", n), |b| {
            b.iter_batched(
                || HashGrid2D::<usize>::for_radius(0.5),
                |mut grid| {
                    for (i, p) in points.iter().copied().enumerate() {
                        grid.insert(p, i);
                    }
                    black_box(grid.len());
                },
                BatchSize::SmallInput,
            )
        });

        let mut grid = HashGrid2D::<usize>::for_radius(0.5);
        for (i, p) in points.iter().copied().enumerate() {
            grid.insert(p, i);
        }
        group.bench_function(format!("self_query_n{}", n), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for p in &points {
                    grid.visit_within(*p, 0.5, |_| hits += 1);
                }
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_tick_and_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker");
    for &n in &[256usize, 1024] {
        let mut scene = gen_scene(n, 200.0);
        let (mut producer, mut handoff) = tracker(&TrackerConfig::default()).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("tick_n{}", n), |b| {
            b.iter(|| black_box(producer.tick(&mut scene)))
        });
        group.bench_function(format!("tick_merge_n{}", n), |b| {
            b.iter(|| {
                producer.tick(&mut scene);
                black_box(handoff.pull_latest().map(|f| f.index().len()));
            })
        });

        let queries: Vec<MatchQuery> = scene
            .entities()
            .iter()
            .map(|e| MatchQuery::pedestrian(e.position, Quat::IDENTITY))
            .collect();
        producer.tick(&mut scene);
        let frame = handoff.pull_latest().unwrap();
        group.bench_function(format!("find_n{}", n), |b| {
            b.iter(|| {
                let found = queries.iter().filter(|q| frame.find(q).is_some()).count();
                black_box(found);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_grid, bench_tick_and_merge);
criterion_main!(benches);
