//! # ECS Benchmark
//!
//! Entity creation, attach, typed reads and signature queries.
//!
//! Run with: `cargo bench --package overture_core --bench ecs_benchmark`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use overture_core::{Component, Filter, World, WorldConfig};

const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}
impl Component for Position {}

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}
impl Component for Velocity {}

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Sleeping(u32);
impl Component for Sleeping {}

/// Every entity has a Position, half have a Velocity, a tenth are asleep.
fn populated_world(count: usize) -> World {
    let world = World::with_config(WorldConfig {
        initial_capacity: count,
        ..WorldConfig::default()
    });
    for i in 0..count {
        let e = world.create();
        world.attach(e, Position::default()).unwrap();
        if i % 2 == 0 {
            world.attach(e, Velocity { x: 1.0, y: 0.5, z: 0.0 }).unwrap();
        }
        if i % 10 == 0 {
            world.attach(e, Sleeping(1)).unwrap();
        }
    }
    world
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_entities");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let world = World::new();
                for _ in 0..count {
                    black_box(world.create());
                }
                world.len()
            });
        });
    }

    group.finish();
}

fn bench_attach(c: &mut Criterion) {
    c.bench_function("attach_position_10k", |b| {
        b.iter(|| {
            let world = World::new();
            for _ in 0..10_000 {
                let e = world.create();
                world.attach(e, Position::default()).unwrap();
            }
            world.len()
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let world = populated_world(ENTITY_COUNT);
    let moving = Filter::new().with::<Position>().with::<Velocity>().without::<Sleeping>();

    c.bench_function("query_position_velocity_100k", |b| {
        b.iter(|| black_box(world.query::<(Position, Velocity)>().unwrap().len()));
    });

    c.bench_function("filter_without_sleeping_100k", |b| {
        b.iter(|| black_box(world.run_filter(&moving).unwrap().len()));
    });
}

fn bench_integrate(c: &mut Criterion) {
    let world = populated_world(ENTITY_COUNT);

    c.bench_function("integrate_guards_100k", |b| {
        b.iter(|| {
            let velocities = world.read::<Velocity>().unwrap();
            let mut positions = world.write::<Position>().unwrap();
            for (e, v) in velocities.iter() {
                if let Some(p) = positions.get_mut(e) {
                    p.x += v.x;
                    p.y += v.y;
                    p.z += v.z;
                }
            }
        });
    });

    c.bench_function("integrate_per_entity_100k", |b| {
        b.iter(|| {
            for e in world.query::<(Position, Velocity)>().unwrap() {
                let v = world.get::<Velocity>(e).unwrap();
                world
                    .with_mut(e, |p: &mut Position| {
                        p.x += v.x;
                        p.y += v.y;
                        p.z += v.z;
                    })
                    .unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_create, bench_attach, bench_query, bench_integrate);
criterion_main!(benches);
