use crate::value::{
    Float64, GeoPoint, TextMode, Value, canonical_cmp, strict_order_cmp,
};
use std::cmp::Ordering;

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn set_of_sorts_and_dedupes() {
    let set = Value::set_of(vec![
        Value::Int(3),
        Value::Int(1),
        Value::Int(3),
        Value::Int(2),
    ]);

    assert_eq!(
        set,
        Value::Set(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn map_of_sorts_keys_and_keeps_last_write() {
    let map = Value::map_of(vec![
        ("b".to_string(), Value::Int(1)),
        ("a".to_string(), Value::Int(2)),
        ("b".to_string(), Value::Int(3)),
    ]);

    assert_eq!(
        map,
        Value::Map(vec![
            ("a".to_string(), Value::Int(2)),
            ("b".to_string(), Value::Int(3)),
        ])
    );
}

#[test]
fn strict_order_cmp_rejects_mixed_variants() {
    assert_eq!(strict_order_cmp(&Value::Int(1), &v_txt("1")), None);
    assert_eq!(
        strict_order_cmp(&Value::Int(1), &Value::Int(2)),
        Some(Ordering::Less)
    );
}

#[test]
fn canonical_cmp_is_total_across_variants() {
    // Mixed variants order by rank, deterministically.
    assert_eq!(canonical_cmp(&Value::Null, &Value::Bool(false)), Ordering::Less);
    assert_eq!(canonical_cmp(&Value::Int(9), &v_txt("a")), Ordering::Less);
    assert_eq!(canonical_cmp(&v_txt("a"), &v_txt("b")), Ordering::Less);
    assert_eq!(
        canonical_cmp(&Value::List(vec![]), &Value::List(vec![Value::Int(1)])),
        Ordering::Less
    );
}

#[test]
fn float_values_are_eq_and_ordered() {
    let a = Value::Float64(Float64::new(1.5));
    let b = Value::Float64(Float64::new(1.5));
    assert_eq!(a, b);

    assert_eq!(
        strict_order_cmp(
            &Value::Float64(Float64::new(1.0)),
            &Value::Float64(Float64::new(2.0)),
        ),
        Some(Ordering::Less)
    );
}

#[test]
fn text_contains_modes() {
    let value = v_txt("Hello World");

    assert_eq!(value.text_contains("world", TextMode::Ci), Some(true));
    assert_eq!(value.text_contains("world", TextMode::Cs), Some(false));
    assert_eq!(value.text_contains("World", TextMode::Cs), Some(true));
    assert_eq!(Value::Int(1).text_contains("1", TextMode::Cs), None);
}

#[test]
fn display_flattens_containers_and_records() {
    let record = Value::Record(vec![
        ("title".to_string(), v_txt("hello")),
        ("tags".to_string(), Value::List(vec![v_txt("a"), v_txt("b")])),
        ("rating".to_string(), Value::Int(5)),
    ]);

    assert_eq!(record.to_string(), "hello a b 5");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canonical_order_is_antisymmetric(a in any::<i64>(), b in any::<i64>()) {
            let left = Value::Int(a);
            let right = Value::Int(b);
            prop_assert_eq!(
                canonical_cmp(&left, &right),
                canonical_cmp(&right, &left).reverse()
            );
        }

        #[test]
        fn set_normalization_is_idempotent(items in proptest::collection::vec(any::<i64>(), 0..12)) {
            let once = Value::set_of(items.iter().copied().map(Value::Int).collect());
            let Value::Set(members) = once.clone() else {
                panic!("set_of must produce a set");
            };
            let twice = Value::set_of(members);
            prop_assert_eq!(once, twice);
        }
    }
}

#[test]
fn geo_distance_zero_at_same_point() {
    let here = GeoPoint::new(40.7128, -74.0060);
    assert!(here.distance_km(&here) < 1e-9);
}

#[test]
fn geo_distance_known_pair() {
    // New York to Los Angeles is roughly 3940 km great-circle.
    let nyc = GeoPoint::new(40.7128, -74.0060);
    let lax = GeoPoint::new(34.0522, -118.2437);

    let distance = nyc.distance_km(&lax);
    assert!((3900.0..4000.0).contains(&distance), "got {distance}");
}
