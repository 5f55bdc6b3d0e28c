use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bombz::core::{Level, Playfield, SimpleRng};
use bombz::engine::{
    Application, EventPool, EventQueue, HeadlessContext, ManualClock, Platform, RenderContext,
};
use bombz::game::{level_resource, BuiltinPlatform, Tiles};
use bombz::types::{Event, Keys};

fn level(n: u32) -> Level {
    let text = BuiltinPlatform::new(std::env::temp_dir())
        .load_text(&level_resource(n))
        .unwrap();
    Level::parse(&text, &mut SimpleRng::new(n)).unwrap()
}

fn bench_playfield_tick(c: &mut Criterion) {
    let mut field = Playfield::new(level(1));

    c.bench_function("playfield_tick", |b| {
        b.iter(|| {
            if field.outcome().is_over() {
                field = Playfield::new(level(1));
            }
            field.tick(black_box(Keys::RIGHT));
        })
    });
}

fn bench_level_tick_with_fuses(c: &mut Criterion) {
    // Level 7 starts with a lit bomb.
    let start = level(7);

    c.bench_function("level_tick_burning", |b| {
        let mut lvl = start.clone();
        b.iter(|| {
            if !lvl.tick() {
                lvl = start.clone();
            }
        })
    });
}

fn bench_batcher_fill(c: &mut Criterion) {
    let mut rc = HeadlessContext::new(120, 90);
    let size = rc.calculate_tile_size(20, 15);
    let tiles = Tiles::load(&mut rc, &BuiltinPlatform::new(std::env::temp_dir()), size).unwrap();
    let lvl = level(2);
    let mut batcher = rc.create_tile_batcher(20, 15, size, size);

    c.bench_function("tile_batcher_fill", |b| {
        b.iter(|| tiles.fill(&mut batcher, black_box(&lvl)))
    });

    tiles.fill(&mut batcher, &lvl);
    c.bench_function("tile_batcher_render", |b| {
        b.iter(|| batcher.render(&mut rc).unwrap())
    });
}

fn bench_event_round_trip(c: &mut Criterion) {
    let pool = EventPool::new();
    let queue = EventQueue::new();

    c.bench_function("event_push_pop", |b| {
        b.iter(|| {
            queue.push(pool.alloc(black_box(Event::Tap { x: 1, y: 2 })));
            queue.pop(Some(Duration::ZERO))
        })
    });

    let clock = Arc::new(ManualClock::new(0));
    let app = Application::with_clock("bench", clock.clone());
    c.bench_function("get_next_event_coalescing", |b| {
        b.iter(|| {
            clock.advance(black_box(25));
            app.push_event(Event::Resume);
            while app.get_next_event(40) == Event::Tick {}
        })
    });
}

criterion_group!(
    benches,
    bench_playfield_tick,
    bench_level_tick_with_fuses,
    bench_batcher_fill,
    bench_event_round_trip
);
criterion_main!(benches);
