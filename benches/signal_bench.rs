use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossover_trader::strategy::signals::{ema, rolling_mean};
use crossover_trader::{Balances, Decider, DecisionConfig, RateObservation, RateSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn synthetic_series(len: usize) -> RateSeries {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let observations = (0..len)
        .map(|i| {
            // Slow sawtooth so crossovers actually happen
            let rate = dec!(30000) + Decimal::from((i % 240) as i64 - 120) * dec!(12.5);
            RateObservation::new(i.to_string(), rate, start + Duration::hours(i as i64))
        })
        .collect();
    RateSeries::new(observations).unwrap()
}

/// Full decision on one week of hourly rates
fn bench_decide(c: &mut Criterion) {
    let decider = Decider::new(DecisionConfig::default()).unwrap();
    let series = synthetic_series(168);
    let balances = Balances::new(dec!(1000), dec!(0.05));

    c.bench_function("decide_one_week_hourly", |b| {
        b.iter(|| decider.decide(black_box(&series), black_box(&balances)).unwrap());
    });
}

/// Rolling mean + EMA pass at increasing series lengths
fn bench_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_averages");

    for len in [168usize, 720, 2160] {
        let prices = synthetic_series(len).prices(Default::default());

        group.bench_with_input(BenchmarkId::from_parameter(len), &prices, |b, prices| {
            b.iter(|| {
                let rolled = rolling_mean(black_box(prices), 100);
                let short = ema(&rolled, 9);
                let long = ema(&rolled, 21);
                black_box((short, long))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decide, bench_moving_averages);
criterion_main!(benches);
