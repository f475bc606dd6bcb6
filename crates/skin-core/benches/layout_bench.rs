//! Criterion benchmarks for layout cycling, arrow rotation and zoom sizing.
//!
//! Run with:
//! ```bash
//! cargo bench --package skin-core --bench layout_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skin_core::domain::layout::{DisplayRect, LayoutList, Rotation, SkinLayout};
use skin_core::domain::window::{fit_scale, zoom_to_rect, Size, MIN_SCALE};
use skin_core::keymap::KeyCode;

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Builds `n` layouts cycling through the four rotations.
fn build_layouts(n: usize) -> LayoutList {
    let layouts = (0..n)
        .map(|i| SkinLayout {
            name: format!("layout-{i}"),
            rotation: Rotation::from_quarter_turns(i as i32),
            dpad_rotation: Rotation::from_quarter_turns(i as i32),
            width: 1080,
            height: 1920,
            display: DisplayRect {
                x: 0,
                y: 0,
                width: 1080,
                height: 1920,
                rotation: Rotation::from_quarter_turns(i as i32),
            },
        })
        .collect();
    match LayoutList::new(layouts) {
        Ok(list) => list,
        Err(e) => panic!("fixture layouts must be valid: {e}"),
    }
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_layout_cycle(c: &mut Criterion) {
    let list = build_layouts(8);
    let mut group = c.benchmark_group("layout");

    group.bench_function("next_full_cycle", |b| {
        b.iter(|| {
            let mut index = 0;
            for _ in 0..list.len() {
                index = list.next_index(black_box(index));
            }
            index
        })
    });

    group.bench_function("prev_full_cycle", |b| {
        b.iter(|| {
            let mut index = 0;
            for _ in 0..list.len() {
                index = list.prev_index(black_box(index));
            }
            index
        })
    });

    group.bench_function("map_touch_rotated", |b| {
        let display = list.get(1).display;
        b.iter(|| display.map_to_framebuffer(black_box(500), black_box(900)))
    });

    group.finish();
}

fn bench_rotation_and_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");

    group.bench_function("rotate_arrow", |b| {
        b.iter(|| KeyCode::Left.rotate(black_box(-3)))
    });

    group.bench_function("zoom_to_rect", |b| {
        b.iter(|| {
            zoom_to_rect(
                black_box(1.0),
                black_box(0.5),
                Size::new(800, 600),
                Size::new(100, 100),
            )
        })
    });

    group.bench_function("fit_scale", |b| {
        b.iter(|| {
            fit_scale(
                Size::new(1080, 1920),
                black_box(Size::new(700, 900)),
                Some(Size::new(1824, 1026)),
                MIN_SCALE,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_layout_cycle, bench_rotation_and_sizing);
criterion_main!(benches);
