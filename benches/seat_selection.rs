//! Criterion benchmarks for seat selection and pricing on a full-size hall.
//!
//! Run with: cargo bench --bench seat_selection

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rust_decimal_macros::dec;

use box_office::ids::{PromotionId, ShowId};
use box_office::models::{Promotion, Show, ShowDefaults};
use box_office::services::{PriceRange, SeatSelection};

const ROWS: u32 = 20;
const COLS: u32 = 27;

fn hall() -> Show {
    let at = NaiveDate::from_ymd_opt(2030, 1, 1)
        .and_then(|d| d.and_hms_opt(19, 40, 0))
        .unwrap();
    Show::new(ShowId(0), "Bench", at, ROWS, COLS, &ShowDefaults::default())
}

fn tiered_promotion() -> Promotion {
    let multipliers = [dec!(0.5), dec!(0.75), dec!(1.5)];
    let ranges = [vec![0, 99], vec![100, 299], vec![400, 539]];
    Promotion::new(PromotionId(0), "Tiers", &multipliers, &ranges).unwrap()
}

fn bench_automatic(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_automatic");
    let range = PriceRange::new(dec!(5), dec!(10));

    group.bench_function("50_of_540", |b| {
        b.iter_batched(
            hall,
            |mut show| black_box(SeatSelection::automatic(&mut show, 50, range)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_interactive(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_interactive");
    let positions: Vec<String> = (1..=ROWS).map(|r| format!("M{}", r)).collect();

    // Каждое удержание сверх 4 вытесняет старейшее место
    group.bench_function("hold_20_evict_16", |b| {
        b.iter_batched(
            hall,
            |mut show| {
                let mut selection = SeatSelection::interactive(&show, 4).unwrap();
                for position in &positions {
                    black_box(selection.hold(&mut show, position).unwrap());
                }
                selection
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_seat_map(c: &mut Criterion) {
    let show = hall();
    c.bench_function("seat_map_render", |b| {
        b.iter(|| black_box(show.seat_map().to_string()));
    });
}

fn bench_promotion_lookup(c: &mut Criterion) {
    let promotion = tiered_promotion();
    c.bench_function("promotion_multiplier_for_all_seats", |b| {
        b.iter(|| {
            (0..ROWS * COLS)
                .filter_map(|id| promotion.multiplier_for(black_box(box_office::ids::SeatId(id))))
                .count()
        });
    });
}

criterion_group!(
    benches,
    bench_automatic,
    bench_interactive,
    bench_seat_map,
    bench_promotion_lookup
);
criterion_main!(benches);
