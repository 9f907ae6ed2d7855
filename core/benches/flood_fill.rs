use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use sweeper_core::*;

fn bench_flood_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("flood_fill");

    for size in [16, 64, 255] {
        group.bench_function(format!("empty_{size}x{size}"), |b| {
            b.iter_batched(
                || {
                    let mut engine =
                        GameEngine::new(GameConfig::new((size, size), 0), 0, EventBus::new());
                    engine.setup();
                    engine
                },
                |mut engine| black_box(engine.step((size / 2, size / 2))),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_setup(c: &mut Criterion) {
    c.bench_function("setup_expert", |b| {
        let mut engine = GameEngine::new(GameConfig::EXPERT, 0, EventBus::new());
        b.iter(|| engine.setup());
    });
}

criterion_group!(benches, bench_flood_fill, bench_setup);
criterion_main!(benches);
