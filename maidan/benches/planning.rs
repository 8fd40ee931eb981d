//! Benchmark path planning, the simulator tick and frame encoding.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::hint::black_box;

use maidan::codec::{RobotCommand, TeamFrame};
use maidan::planning::{Mover, RrtConfig, find_path};
use maidan::sim::{InitialSetup, Simulator};
use maidan::{Point2, Pose, Team, WorldModel};

/// A wall of opponents across the field center.
fn wall_world(length: usize) -> WorldModel {
    let mut world = WorldModel::default();
    world.push_robot(Team::Blue, 1, 0.0, Pose::new(-2000.0, 0.0, 0.0));
    let spacing = 270.0;
    let mid = (length as f64 - 1.0) / 2.0;
    for k in 0..length {
        let y = (k as f64 - mid) * spacing;
        world.push_robot(Team::Yellow, k as u8, 0.0, Pose::new(0.0, y, 0.0));
    }
    world
}

fn bench_rrt(c: &mut Criterion) {
    let mut group = c.benchmark_group("rrt_wall");

    for length in [3usize, 5, 9].iter() {
        let world = wall_world(*length);
        let config = RrtConfig::from_world(&world, true);
        let mover = Mover::new(Team::Blue, 1);
        let start = Point2::new(-2000.0, 0.0);
        let goal = Point2::new(2000.0, 0.0);

        group.bench_with_input(BenchmarkId::from_parameter(length), length, |b, _| {
            let mut rng = SmallRng::seed_from_u64(7);
            b.iter(|| {
                let path = find_path(
                    black_box(&world),
                    mover,
                    black_box(start),
                    black_box(goal),
                    &config,
                    &mut rng,
                );
                black_box(path)
            })
        });
    }

    group.finish();
}

fn bench_simulator_tick(c: &mut Criterion) {
    let mut world = WorldModel::default();
    InitialSetup::MovingBall.apply(&mut world, Team::Blue, 0.0);
    let mut sim = Simulator::new();
    let mut now = 0.0;

    c.bench_function("simulator_tick_full_teams", |b| {
        b.iter(|| {
            now += 0.001;
            sim.tick(black_box(&mut world), now);
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let commands: Vec<RobotCommand> = (0..6u8)
        .map(|id| RobotCommand {
            id,
            is_dribbling: id % 2 == 0,
            is_charging: true,
            is_kicking: false,
            x: 120.0 * id as f64 - 300.0,
            y: 450.0,
            w: -1.5,
        })
        .collect();
    let mut frame = TeamFrame::new();

    c.bench_function("encode_team_frame", |b| {
        b.iter(|| {
            let result = frame.encode(black_box(&commands));
            black_box(result.is_ok())
        })
    });
}

criterion_group!(benches, bench_rrt, bench_simulator_tick, bench_encode);
criterion_main!(benches);
