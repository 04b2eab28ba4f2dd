use crate::{
    condition::{Condition, ConditionNode, eval},
    error::Error,
    model::FieldType,
    test_fixtures::{Article, Flags, Inventory, User, Venue},
    value::{Float64, GeoPoint, Value},
};
use std::collections::BTreeMap;

fn vip_user() -> User {
    User {
        id: "u1".to_string(),
        age: 19,
        tags: vec!["vip".to_string(), "beta".to_string()],
    }
}

fn on_age(condition: ConditionNode) -> Condition<User> {
    Condition::from_node(ConditionNode::OnField {
        field: "age".to_string(),
        condition: Box::new(condition),
    })
}

fn on_tags(condition: ConditionNode) -> Condition<User> {
    Condition::from_node(ConditionNode::OnField {
        field: "tags".to_string(),
        condition: Box::new(condition),
    })
}

#[test]
fn typed_query_evaluation() {
    // And(age >= 18, tags any == "vip")
    let condition = Condition::<User>::and(vec![
        on_age(ConditionNode::GreaterThanOrEqual(Value::Int(18))),
        on_tags(ConditionNode::ListAnyElements(Box::new(
            ConditionNode::Equal(Value::Text("vip".to_string())),
        ))),
    ]);

    assert!(condition.apply(&vip_user()).unwrap());

    let minor = User {
        age: 17,
        ..vip_user()
    };
    assert!(!condition.apply(&minor).unwrap());
}

#[test]
fn constants_and_connectives() {
    let user = vip_user();

    assert!(!Condition::<User>::never().apply(&user).unwrap());
    assert!(Condition::<User>::always().apply(&user).unwrap());

    // Vacuous truth and falsity.
    assert!(Condition::<User>::and(vec![]).apply(&user).unwrap());
    assert!(!Condition::<User>::or(vec![]).apply(&user).unwrap());

    let yes = Condition::<User>::always();
    let no = Condition::<User>::never();
    assert!(!(yes.clone() & no.clone()).apply(&user).unwrap());
    assert!((yes.clone() | no.clone()).apply(&user).unwrap());
    assert!((!no).apply(&user).unwrap());
}

#[test]
fn short_circuit_skips_ill_typed_branches() {
    // The second branch would fail with IncompatibleRecord if reached.
    let bad = on_age(ConditionNode::GreaterThan(Value::Text("x".to_string())));

    let or = Condition::<User>::or(vec![Condition::always(), bad.clone()]);
    assert!(or.apply(&vip_user()).unwrap());

    let and = Condition::<User>::and(vec![Condition::never(), bad.clone()]);
    assert!(!and.apply(&vip_user()).unwrap());

    assert!(matches!(
        bad.apply(&vip_user()),
        Err(Error::IncompatibleRecord { .. })
    ));
}

#[test]
fn implication_combinators() {
    let adult = on_age(ConditionNode::GreaterThanOrEqual(Value::Int(18)));
    let vip = on_tags(ConditionNode::ListAnyElements(Box::new(
        ConditionNode::Equal(Value::Text("vip".to_string())),
    )));
    let beta = on_tags(ConditionNode::ListAnyElements(Box::new(
        ConditionNode::Equal(Value::Text("beta".to_string())),
    )));

    let user = vip_user();
    assert!(
        Condition::if_then(adult.clone(), vip.clone())
            .apply(&user)
            .unwrap()
    );

    // Vacuously true when the antecedent fails.
    let minor = User {
        age: 10,
        ..vip_user()
    };
    assert!(
        Condition::if_then(adult.clone(), vip.clone())
            .apply(&minor)
            .unwrap()
    );

    assert!(
        Condition::if_then_else(adult, vip, beta)
            .apply(&user)
            .unwrap()
    );
}

#[test]
fn null_tolerant_collectors() {
    let user = vip_user();
    let adult = on_age(ConditionNode::GreaterThanOrEqual(Value::Int(18)));

    assert!(
        Condition::<User>::and_not_null(vec![None, None])
            .apply(&user)
            .unwrap()
    );
    assert!(
        !Condition::<User>::or_not_null(vec![None])
            .apply(&user)
            .unwrap()
    );

    let single = Condition::and_not_null(vec![None, Some(adult.clone())]);
    assert_eq!(&single, &adult);
}

#[test]
fn membership_and_ranges() {
    let user = vip_user();

    assert!(
        on_age(ConditionNode::Inside(vec![Value::Int(18), Value::Int(19)]))
            .apply(&user)
            .unwrap()
    );
    assert!(
        on_age(ConditionNode::NotInside(vec![Value::Int(7)]))
            .apply(&user)
            .unwrap()
    );
    assert!(
        on_age(ConditionNode::LessThanOrEqual(Value::Int(19)))
            .apply(&user)
            .unwrap()
    );
    assert!(!on_age(ConditionNode::LessThan(Value::Int(19))).apply(&user).unwrap());
}

#[test]
fn string_contains_respects_case_flag() {
    let node = |ignore_case| {
        Condition::<User>::from_node(ConditionNode::OnField {
            field: "id".to_string(),
            condition: Box::new(ConditionNode::StringContains {
                value: "U1".to_string(),
                ignore_case,
            }),
        })
    };

    assert!(node(true).apply(&vip_user()).unwrap());
    assert!(!node(false).apply(&vip_user()).unwrap());
}

#[test]
fn regex_requires_full_match() {
    let matches = |pattern: &str, on: &str| {
        eval(
            &ConditionNode::RegexMatches {
                pattern: pattern.to_string(),
                ignore_case: false,
            },
            &Value::Text(on.to_string()),
            &FieldType::Text,
        )
        .unwrap()
    };

    assert!(!matches("foo", "foo bar"));
    assert!(matches("foo", "foo"));
    assert!(matches("fo+ bar", "foo bar"));
}

#[test]
fn invalid_regex_is_a_serialization_error() {
    let result = eval(
        &ConditionNode::RegexMatches {
            pattern: "(".to_string(),
            ignore_case: false,
        },
        &Value::Text("x".to_string()),
        &FieldType::Text,
    );

    assert!(matches!(result, Err(Error::Serialization { .. })));
}

fn article(title: &str, body: &str) -> Article {
    Article {
        title: title.to_string(),
        body: body.to_string(),
        rating: 42,
    }
}

fn search(query: &str, require_all: bool, distance: u8) -> Condition<Article> {
    Condition::from_node(ConditionNode::FullTextSearch {
        query: query.to_string(),
        require_all_terms: require_all,
        levenshtein_distance: distance,
    })
}

#[test]
fn full_text_term_order_is_insignificant() {
    let record = article("def", "abc");
    assert!(search("abc def", true, 2).apply(&record).unwrap());
}

#[test]
fn full_text_fuzzy_terms_use_levenshtein() {
    let record = article("hello world", "");
    assert!(search("hellp", true, 2).apply(&record).unwrap());
    assert!(!search("xyzzy", true, 2).apply(&record).unwrap());
}

#[test]
fn full_text_any_mode_matches_any_term() {
    let record = article("hello", "");
    assert!(search("hello missing", false, 2).apply(&record).unwrap());
    assert!(!search("hello missing", true, 2).apply(&record).unwrap());
}

#[test]
fn full_text_respects_the_text_index() {
    // `rating` is not in the text index, so its value is unsearchable.
    let record = article("hello", "world");
    assert!(!search("42", false, 0).apply(&record).unwrap());
    assert!(search("world", false, 0).apply(&record).unwrap());
}

#[test]
fn full_text_quoted_phrases_stay_together() {
    let record = article("the quick brown fox", "");
    assert!(search("\"quick brown\"", true, 2).apply(&record).unwrap());
    assert!(!search("\"brown quick\"", true, 2).apply(&record).unwrap());
}

#[test]
fn geo_distance_band_is_inclusive() {
    let nyc = GeoPoint::new(40.7128, -74.0060);
    let venue = Venue {
        name: "here".to_string(),
        location: nyc,
    };

    let within = |min_km: f64, max_km: f64| {
        Condition::<Venue>::from_node(ConditionNode::OnField {
            field: "location".to_string(),
            condition: Box::new(ConditionNode::GeoDistance {
                value: nyc,
                greater_than_km: Float64::new(min_km),
                less_than_km: Float64::new(max_km),
            }),
        })
    };

    assert!(within(0.0, 100_000.0).apply(&venue).unwrap());
    assert!(!within(1.0, 100_000.0).apply(&venue).unwrap());
}

#[test]
fn bit_predicates_use_unsigned_masks() {
    let flags = Flags { bits: 0b1010 };
    let on_bits = |condition: ConditionNode| {
        Condition::<Flags>::from_node(ConditionNode::OnField {
            field: "bits".to_string(),
            condition: Box::new(condition),
        })
    };

    assert!(
        on_bits(ConditionNode::IntBitsSet { mask: 0b1010 })
            .apply(&flags)
            .unwrap()
    );
    assert!(
        on_bits(ConditionNode::IntBitsClear { mask: 0b0101 })
            .apply(&flags)
            .unwrap()
    );
    assert!(
        on_bits(ConditionNode::IntBitsAnySet { mask: 0b0010 })
            .apply(&flags)
            .unwrap()
    );
    assert!(
        on_bits(ConditionNode::IntBitsAnyClear { mask: 0b0110 })
            .apply(&flags)
            .unwrap()
    );
    // A negative carrier uses two's-complement bits.
    let negative = Flags { bits: -1 };
    assert!(
        on_bits(ConditionNode::IntBitsSet { mask: u32::MAX })
            .apply(&negative)
            .unwrap()
    );
}

#[test]
fn element_quantifiers_have_vacuous_boundaries() {
    let empty = User {
        id: "u".to_string(),
        age: 1,
        tags: vec![],
    };

    let all = on_tags(ConditionNode::ListAllElements(Box::new(
        ConditionNode::Equal(Value::Text("vip".to_string())),
    )));
    let any = on_tags(ConditionNode::ListAnyElements(Box::new(
        ConditionNode::Equal(Value::Text("vip".to_string())),
    )));

    assert!(all.apply(&empty).unwrap());
    assert!(!any.apply(&empty).unwrap());
}

#[test]
fn deprecated_size_checks_still_evaluate() {
    let sized = on_tags(ConditionNode::ListSizesEquals(2));
    assert!(sized.apply(&vip_user()).unwrap());
}

#[test]
fn map_key_predicates() {
    let inventory = Inventory {
        counts: BTreeMap::from([("apples".to_string(), 3i64)]),
    };

    let on_counts = |condition: ConditionNode| {
        Condition::<Inventory>::from_node(ConditionNode::OnField {
            field: "counts".to_string(),
            condition: Box::new(condition),
        })
    };

    assert!(
        on_counts(ConditionNode::Exists {
            key: "apples".to_string()
        })
        .apply(&inventory)
        .unwrap()
    );
    assert!(
        !on_counts(ConditionNode::Exists {
            key: "pears".to_string()
        })
        .apply(&inventory)
        .unwrap()
    );

    // OnKey is false (not null-tolerant) when the key is missing.
    assert!(
        !on_counts(ConditionNode::OnKey {
            key: "pears".to_string(),
            condition: Box::new(ConditionNode::Always),
        })
        .apply(&inventory)
        .unwrap()
    );
    assert!(
        on_counts(ConditionNode::OnKey {
            key: "apples".to_string(),
            condition: Box::new(ConditionNode::GreaterThan(Value::Int(2))),
        })
        .apply(&inventory)
        .unwrap()
    );
}

#[test]
fn unknown_field_projection_fails() {
    let bad = Condition::<User>::from_node(ConditionNode::OnField {
        field: "nope".to_string(),
        condition: Box::new(ConditionNode::Always),
    });

    assert!(matches!(
        bad.apply(&vip_user()),
        Err(Error::IncompatibleRecord { .. })
    ));
}
