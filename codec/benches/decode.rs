//! Decode throughput for snapshot RLE, delta patches, and full frame application.

use std::hint::black_box;
use std::io::Cursor;

use codec::{
    decode_patches, decode_rle, delta_frame, encode_patches, encode_rle, BoardState, Grid, Patch,
    Score,
};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use wire::{encode_delta_frame, encode_snapshot_frame, read_frame};

/// A board with a few long runs, roughly what a live arena sends.
fn arena_grid() -> Grid {
    let mut cells = vec![0u8; codec::CELLS];
    for (idx, cell) in cells.iter_mut().enumerate() {
        *cell = match idx % 200 {
            0..=19 => 1,
            100..=109 => 2,
            150 => 5,
            _ => 0,
        };
    }
    Grid::from_cells(cells).expect("full board")
}

fn patches(count: u8) -> Vec<Patch> {
    (0..count).map(|i| Patch::new(i % 50, i % 20, i % 8)).collect()
}

fn bench_rle(c: &mut Criterion) {
    let text = encode_rle(&arena_grid());
    let mut group = c.benchmark_group("rle");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("decode_arena", |b| {
        b.iter(|| decode_rle(black_box(text.as_bytes())).expect("decode"));
    });
    group.bench_function("encode_arena", |b| {
        let grid = arena_grid();
        b.iter(|| encode_rle(black_box(&grid)));
    });
    group.finish();
}

fn bench_patches(c: &mut Criterion) {
    let packed = encode_patches(&patches(200));
    let mut group = c.benchmark_group("patches");
    group.throughput(Throughput::Bytes(packed.len() as u64));
    group.bench_function("decode_200", |b| {
        b.iter(|| decode_patches(black_box(&packed)).expect("decode"));
    });
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let grid = arena_grid();
    let text = encode_rle(&grid);
    let snapshot = encode_snapshot_frame(Score::new(1, 2), text.as_bytes()).expect("fits");
    let delta = delta_frame(1, Score::new(2, 2), &patches(64));
    let delta = encode_delta_frame(delta.sequence, delta.score, &delta.patches).expect("fits");

    let mut group = c.benchmark_group("apply");
    group.bench_function("read_and_apply_snapshot", |b| {
        let mut board = BoardState::new();
        b.iter(|| {
            let frame = read_frame(&mut Cursor::new(black_box(&snapshot))).expect("frame");
            board.apply_frame(&frame).expect("apply");
        });
    });
    group.bench_function("read_and_apply_delta", |b| {
        let mut board = BoardState::new();
        b.iter(|| {
            board.apply_snapshot(grid.clone(), Score::default());
            let frame = read_frame(&mut Cursor::new(black_box(&delta))).expect("frame");
            board.apply_frame(&frame).expect("apply");
        });
    });
    group.finish();
}

criterion_group!(benches, bench_rle, bench_patches, bench_apply);
criterion_main!(benches);
