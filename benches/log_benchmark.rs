//! LineLog benchmark: Measure bounded-history performance.
//!
//! Target: < 1µs per append at steady-state eviction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_buffer::{Buffer, BufferLine, LineLog, MAX_LINES};
use std::time::SystemTime;

fn line(n: usize) -> BufferLine {
    BufferLine::new(format!("0x{n:x}"), SystemTime::UNIX_EPOCH, "bench", "message body")
}

fn log_push_back_steady_state(c: &mut Criterion) {
    let log = LineLog::new();
    for n in 0..MAX_LINES {
        log.push_back(line(n));
    }

    c.bench_function("log_push_back_evicting", |b| {
        let mut n = MAX_LINES;
        b.iter(|| {
            log.push_back(black_box(line(n)));
            n += 1;
        });
    });
}

fn log_push_front_steady_state(c: &mut Criterion) {
    let log = LineLog::new();
    for n in 0..MAX_LINES {
        log.push_back(line(n));
    }

    c.bench_function("log_push_front_evicting", |b| {
        let mut n = MAX_LINES;
        b.iter(|| {
            log.push_front(black_box(line(n)));
            n += 1;
        });
    });
}

fn log_snapshot_full(c: &mut Criterion) {
    let log = LineLog::new();
    for n in 0..MAX_LINES {
        log.push_back(line(n));
    }

    c.bench_function("log_snapshot_200", |b| {
        b.iter(|| black_box(log.snapshot()));
    });
}

fn log_contains_miss(c: &mut Criterion) {
    let log = LineLog::new();
    for n in 0..MAX_LINES {
        log.push_back(line(n));
    }

    c.bench_function("log_contains_miss", |b| {
        b.iter(|| black_box(log.contains(black_box("0xmissing"))));
    });
}

fn buffer_add_line_full_path(c: &mut Criterion) {
    let buffer = Buffer::new("0xbench");

    c.bench_function("buffer_add_line", |b| {
        let mut n = 0;
        b.iter(|| {
            buffer.add_line(black_box(line(n))).unwrap();
            n += 1;
        });
    });
}

fn log_scale_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_scale");

    for capacity in [200, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("fill_to_capacity", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let log = LineLog::with_capacity(capacity);
                    for n in 0..capacity {
                        log.push_back(line(n));
                    }
                    black_box(log.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    log_push_back_steady_state,
    log_push_front_steady_state,
    log_snapshot_full,
    log_contains_miss,
    buffer_add_line_full_path,
    log_scale_comparison,
);
criterion_main!(benches);
