//! Property-based and scenario tests for the indicator engine.

use proptest::prelude::*;

use stockta_core::error::SeriesError;
use stockta_core::types::{Bar, BarSeries, Field, Timeframe, Value};
use stockta_indicators::{EngineSettings, IndicatorEngine, VwapMode};

const MINUTE: i64 = 60_000;

// ==================== Test Data Generators ====================

/// Random bars with `low <= close <= high` and strictly increasing timestamps.
fn arb_bars(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(
        (1.0..1000.0_f64, 0.0..0.05_f64, 0.0..0.05_f64, 0.0..1.0_f64, 0u64..1_000_000, 1i64..5),
        min_len..=max_len,
    )
    .prop_map(|rows| {
        let mut ts = 1_704_167_100_000;
        rows.into_iter()
            .map(|(base, up, down, position, volume, step)| {
                ts += step * MINUTE;
                let high = base * (1.0 + up);
                let low = base * (1.0 - down);
                let close = low + (high - low) * position;
                Bar::new(ts, base, high, low, close, volume)
            })
            .collect()
    })
}

fn build(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new("PROP", Timeframe::Minute1, bars).unwrap()
}

fn ramp(n: usize) -> BarSeries {
    build(
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * MINUTE, c, c, c, c, 10)
            })
            .collect(),
    )
}

// ==================== Engine Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// One record per bar, timestamps carried over in order
    #[test]
    fn prop_output_length(bars in arb_bars(0, 120)) {
        let series = build(bars);
        let records = IndicatorEngine::default().compute(&series);

        prop_assert_eq!(records.len(), series.len());
        for (record, ts) in records.iter().zip(series.timestamps()) {
            prop_assert_eq!(record.timestamp, ts);
        }
    }

    /// Absent exactly before the first index, present from it on
    #[test]
    fn prop_warm_up_placement(bars in arb_bars(1, 260)) {
        let series = build(bars);
        let engine = IndicatorEngine::default();
        let records = engine.compute(&series);

        for entry in engine.catalog() {
            for (i, record) in records.iter().enumerate() {
                prop_assert_eq!(record.is_defined(entry.field), i >= entry.first_index);
            }
        }
    }

    /// Bounded oscillators stay in range
    #[test]
    fn prop_oscillator_bounds(bars in arb_bars(40, 150)) {
        let records = IndicatorEngine::default().compute(&build(bars));
        let tol = 1e-9;

        for record in &records {
            if let Some(rsi) = record.real(Field::Rsi) {
                prop_assert!((-tol..=100.0 + tol).contains(&rsi));
            }
            if let Some(k) = record.real(Field::StochK) {
                prop_assert!((-tol..=100.0 + tol).contains(&k));
            }
            if let Some(wr) = record.real(Field::WilliamsR) {
                prop_assert!((-100.0 - tol..=tol).contains(&wr));
            }
            if let Some(adx) = record.real(Field::Adx) {
                prop_assert!((-tol..=100.0 + tol).contains(&adx));
            }
        }
    }

    /// OBV moves by exactly the bar's volume, or not at all on a tie
    #[test]
    fn prop_obv_steps(bars in arb_bars(2, 100)) {
        let series = build(bars);
        let records = IndicatorEngine::default().compute(&series);
        let closes = series.closes();
        let volumes = series.volumes();

        let obv = |i: usize| match records[i].get(Field::Obv) {
            Some(Value::Count(c)) => c,
            other => panic!("OBV must be a count, got {:?}", other),
        };
        prop_assert_eq!(obv(0), 0);
        for i in 1..records.len() {
            let step = obv(i) - obv(i - 1);
            let v = i128::from(volumes[i]);
            if closes[i] > closes[i - 1] {
                prop_assert_eq!(step, v);
            } else if closes[i] < closes[i - 1] {
                prop_assert_eq!(step, -v);
            } else {
                prop_assert_eq!(step, 0);
            }
        }
    }

    /// Recomputing the same series gives bit-identical records
    #[test]
    fn prop_idempotent(bars in arb_bars(0, 150)) {
        let series = build(bars);
        let engine = IndicatorEngine::default();

        prop_assert_eq!(engine.compute(&series), engine.compute(&series));
    }

    /// A bar's values depend only on the bars up to it
    #[test]
    fn prop_no_lookahead(bars in arb_bars(2, 150), cut in 0.0..1.0_f64) {
        let keep = 1 + ((bars.len() - 1) as f64 * cut) as usize;
        let engine = IndicatorEngine::default();
        let full = engine.compute(&build(bars.clone()));
        let prefix = engine.compute(&build(bars[..keep].to_vec()));

        prop_assert_eq!(&full[..keep], &prefix[..]);
    }

    /// Histogram is exactly macd - signal
    #[test]
    fn prop_macd_histogram(bars in arb_bars(34, 120)) {
        let records = IndicatorEngine::default().compute(&build(bars));

        for record in records.iter().skip(33) {
            let macd = record.real(Field::Macd).unwrap();
            let signal = record.real(Field::MacdSignal).unwrap();
            prop_assert_eq!(record.real(Field::MacdHistogram).unwrap(), macd - signal);
        }
    }
}

// ==================== Scenarios ====================

#[test]
fn test_ramp_sma_and_rsi() {
    let records = IndicatorEngine::default().compute(&ramp(30));

    assert!((records[19].real(Field::Sma20).unwrap() - 109.5).abs() < 1e-9);
    for record in &records[14..] {
        assert_eq!(record.real(Field::Rsi), Some(100.0));
    }
    assert!(records[13].get(Field::Rsi).is_none());
}

#[test]
fn test_single_bar_series() {
    let series = build(vec![Bar::new(0, 10.0, 11.0, 9.0, 10.5, 100)]);
    let engine = IndicatorEngine::default();
    let records = engine.compute(&series);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    for field in Field::ALL {
        let cumulative = matches!(field, Field::Obv | Field::AdLine | Field::Vwap);
        assert_eq!(record.is_defined(field), cumulative, "{}", field);
    }
    assert_eq!(record.get(Field::Obv), Some(Value::Count(0)));
}

#[test]
fn test_single_bar_rolling_vwap_is_absent() {
    let series = build(vec![Bar::new(0, 10.0, 11.0, 9.0, 10.5, 100)]);
    let engine = IndicatorEngine::new(EngineSettings {
        vwap: VwapMode::Rolling { window: 14 },
        ..EngineSettings::default()
    });
    let record = &engine.compute(&series)[0];

    assert!(record.get(Field::Vwap).is_none());
}

#[test]
fn test_duplicate_timestamp_is_rejected() {
    let bars = vec![
        Bar::new(MINUTE, 10.0, 10.0, 10.0, 10.0, 1),
        Bar::new(2 * MINUTE, 11.0, 11.0, 11.0, 11.0, 1),
        Bar::new(2 * MINUTE, 12.0, 12.0, 12.0, 12.0, 1),
    ];

    let err = BarSeries::new("DUP", Timeframe::Minute1, bars).unwrap_err();
    assert!(matches!(err, SeriesError::DuplicateTimestamp { index: 2, .. }));
}

#[test]
fn test_short_history_is_absent_not_error() {
    let records = IndicatorEngine::default().compute(&ramp(25));

    assert!(records.iter().all(|r| r.get(Field::Sma50).is_none()));
    assert!(records.iter().all(|r| r.get(Field::Macd).is_none()));
    assert!(records[24].get(Field::Sma20).is_some());
}

#[test]
fn test_flat_prices_resolve_degenerate_denominators() {
    let records = IndicatorEngine::default().compute(&build(
        (0..60)
            .map(|i| Bar::new(i * MINUTE, 50.0, 50.0, 50.0, 50.0, 100))
            .collect(),
    ));
    let last = records.last().unwrap();

    assert_eq!(last.real(Field::StochK), Some(0.0));
    assert_eq!(last.real(Field::WilliamsR), Some(0.0));
    assert_eq!(last.real(Field::Cci), Some(0.0));
    assert_eq!(last.real(Field::Adx), Some(0.0));
    assert_eq!(last.real(Field::Rsi), Some(100.0));
    assert_eq!(last.real(Field::AdLine), Some(0.0));
    assert_eq!(last.real(Field::BbUpper), last.real(Field::BbLower));
}

#[test]
fn test_record_serializes_only_defined_fields() {
    let records = IndicatorEngine::default().compute(&ramp(2));
    let json = serde_json::to_value(&records[1]).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object["timestamp"], MINUTE);
    assert_eq!(object["obv"], 10);
    assert!(!object.contains_key("sma20"));
}

#[test]
fn test_default_bollinger_uses_sample_std_dev() {
    let series = build(
        (0..20)
            .map(|i| {
                let c = 100.0 + (i % 5) as f64;
                Bar::new(i as i64 * MINUTE, c, c, c, c, 10)
            })
            .collect(),
    );
    let record = &IndicatorEngine::default().compute(&series)[19];

    // mean 102, sum of squares 40: sample std sqrt(40/19)
    let expected = 102.0 + 2.0 * (40.0_f64 / 19.0).sqrt();
    assert!((record.real(Field::BbUpper).unwrap() - expected).abs() < 1e-9);
}
