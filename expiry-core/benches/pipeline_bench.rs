//! Criterion benchmarks for the expiry engine hot paths.
//!
//! Benchmarks:
//! 1. Session resampling (minute bars → session bars) across intervals
//! 2. Indicator precompute (RSI + Bollinger)
//! 3. Full single-instrument pipeline

use chrono::{Duration, NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use expiry_core::calendar::monthly_expiries;
use expiry_core::domain::Bar;
use expiry_core::engine::{apply_indicators, resample, run_instrument, SessionSpec, StrategyParams};

// ── Helpers ──────────────────────────────────────────────────────────

/// `days` trading days of 375 one-minute bars each (09:15–15:29).
fn make_minute_bars(days: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let open = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
    let mut bars = Vec::with_capacity(days * 375);
    for d in 0..days {
        let date = base_date + Duration::days(d as i64);
        for m in 0..375 {
            let i = d * 375 + m;
            let close = 100.0 + (i as f64 * 0.01).sin() * 10.0;
            bars.push(Bar {
                timestamp: date.and_time(open) + Duration::minutes(m as i64),
                open: close - 0.05,
                high: close + 0.1,
                low: close - 0.1,
                close,
                volume: 1_000.0 + (i % 500) as f64,
            });
        }
    }
    bars
}

fn spec(interval: Duration) -> SessionSpec {
    SessionSpec::new(
        interval,
        NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
        NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
    )
    .unwrap()
}

// ── 1. Resample ──────────────────────────────────────────────────────

fn bench_resample(c: &mut Criterion) {
    let bars = make_minute_bars(250);
    let mut group = c.benchmark_group("resample");
    for minutes in [15i64, 60, 375] {
        let spec = spec(Duration::minutes(minutes));
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &spec, |b, spec| {
            b.iter(|| resample(black_box(&bars), spec))
        });
    }
    group.finish();
}

// ── 2. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let bars = make_minute_bars(250);
    let sessions = resample(&bars, &spec(Duration::minutes(15))).unwrap();
    let indicators = StrategyParams::default().indicators();
    c.bench_function("indicators_15min_250d", |b| {
        b.iter(|| apply_indicators(black_box(&sessions), &indicators))
    });
}

// ── 3. Full pipeline ─────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let bars = make_minute_bars(250);
    let first = bars[0].date();
    let last = bars[bars.len() - 1].date();
    let trading_days = bars.iter().map(Bar::date).collect();
    let expiries = monthly_expiries(first, last, &trading_days);
    let params = StrategyParams {
        session: spec(Duration::hours(1)),
        ..StrategyParams::default()
    };
    c.bench_function("run_instrument_1h_250d", |b| {
        b.iter(|| run_instrument(black_box(&bars), &expiries, &params))
    });
}

criterion_group!(benches, bench_resample, bench_indicators, bench_pipeline);
criterion_main!(benches);
