//! Integration tests for detector-facade

use detector_facade::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sequence_spi::Sequence;
use serde_json::json;

fn seq(values: Vec<f64>) -> Sequence {
    Sequence::from_values(1_700_000_000_000, 15_000, values)
}

fn build_json(kind: &str, kwargs: serde_json::Value) -> Box<dyn Detector> {
    build(&DetectorConfig::from_parts(kind, kwargs).unwrap()).unwrap()
}

#[test]
fn test_threshold_scenario() {
    let mut detector = build_json("threshold", json!({"high": 10.0}));
    let mask = detector.fit_predict(&seq(vec![5.0, 12.0, 8.0])).unwrap();
    assert_eq!(mask.flags, vec![false, true, false]);
}

#[test]
fn test_threshold_is_pointwise() {
    let mut rng = StdRng::seed_from_u64(17);
    let values: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..20.0)).collect();
    let open = build_json("threshold", json!({"high": 10.0}));
    let closed = build_json("threshold", json!({"high": 10.0, "closed": true}));

    let data = seq(values.clone());
    let open_mask = open.predict(&data).unwrap();
    let closed_mask = closed.predict(&data).unwrap();
    for (i, v) in values.iter().enumerate() {
        assert_eq!(open_mask.flags[i], *v > 10.0);
        assert_eq!(closed_mask.flags[i], *v >= 10.0);

        // the verdict of a point does not depend on its neighbours
        let single = open.predict(&seq(vec![*v])).unwrap();
        assert_eq!(single.flags[0], open_mask.flags[i]);
    }
}

#[test]
fn test_increase_scenario() {
    let mut detector = build_json("increase", json!({"side": "positive"}));
    let mask = detector
        .fit_predict(&seq((1..=10).map(|i| i as f64).collect()))
        .unwrap();
    assert_eq!(mask.flags, vec![true; 10]);
}

#[test]
fn test_iqr_scenario() {
    let mut detector = build_json("inter_quartile_range", json!({"outliers": [3, 3]}));
    let mask = detector.fit_predict(&seq(vec![1.0, 1.0, 1.0, 1.0, 100.0])).unwrap();
    assert_eq!(mask.flags, vec![false, false, false, false, true]);
}

#[test]
fn test_iqr_bounds_monotone_in_factors() {
    let mut rng = StdRng::seed_from_u64(3);
    let data = seq((0..300).map(|_| rng.gen_range(-50.0..50.0)).collect());

    let mut previous: Option<IqrBounds> = None;
    for step in 0..10 {
        let factor = step as f64 * 0.5;
        let mut detector = IqrDetector::new((Some(factor), Some(factor)));
        detector.fit(&data).unwrap();
        let bounds = detector.bounds().unwrap();
        if let Some(prev) = previous {
            assert!(bounds.upper >= prev.upper);
            assert!(bounds.lower <= prev.lower);
        }
        previous = Some(bounds);
    }
}

#[test]
fn test_iqr_larger_factor_flags_subset() {
    let mut rng = StdRng::seed_from_u64(8);
    let data = seq((0..300).map(|_| rng.gen_range(0.0f64..1.0).powi(4) * 100.0).collect());
    let mut tight = IqrDetector::new((Some(0.5), Some(0.5)));
    let mut loose = IqrDetector::new((Some(2.0), Some(2.0)));
    let tight_mask = tight.fit_predict(&data).unwrap();
    let loose_mask = loose.fit_predict(&data).unwrap();
    for (t, l) in tight_mask.flags.iter().zip(&loose_mask.flags) {
        assert!(!l || *t);
    }
}

#[test]
fn test_missing_values_never_flag() {
    let values = vec![1.0, f64::NAN, 1.0, 1.0, 100.0, f64::NAN];
    for kind in ["threshold", "inter_quartile_range", "spike", "esd_test"] {
        let kwargs = if kind == "threshold" {
            json!({"high": 0.0})
        } else {
            json!({})
        };
        let mut detector = build_json(kind, kwargs);
        let mask = detector.fit_predict(&seq(values.clone())).unwrap();
        assert!(!mask.flags[1], "{} flagged a missing point", kind);
        assert!(!mask.flags[5], "{} flagged a missing point", kind);
    }
}

#[test]
fn test_memory_leak_composition() {
    let config = DetectorConfig::AnyOf(AnyOfConfig {
        detectors: vec![
            DetectorConfig::Threshold(ThresholdConfig::new(Some(0.9), None)),
            DetectorConfig::Increase(IncreaseConfig::default()),
        ],
        minimum_length: 0,
    });
    let mut detector = build(&config).unwrap();

    let leaking = seq((0..50).map(|i| 0.3 + i as f64 * 0.005).collect());
    assert!(detector.fit_predict(&leaking).unwrap().any());

    let stable = seq((0..50).map(|i| if i % 2 == 0 { 0.31 } else { 0.29 }).collect());
    let mut detector = build(&config).unwrap();
    assert!(!detector.fit_predict(&stable).unwrap().any());
}

#[test]
fn test_config_roundtrip_through_json() {
    let config = DetectorConfig::Seasonal(SeasonalConfig {
        period: Some(24),
        side: Side::Positive,
        ..SeasonalConfig::default()
    });
    let text = serde_json::to_string(&config).unwrap();
    let back: DetectorConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}
