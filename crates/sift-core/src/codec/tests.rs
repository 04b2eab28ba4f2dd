use crate::{
    codec::{
        condition_from_canonical_json, decode_condition, decode_modification, decode_value,
        modification_from_canonical_json, to_canonical_json, value_from_canonical_json,
    },
    condition::{Condition, ConditionNode},
    error::Error,
    model::{FieldType, IntWidth},
    modification::{Modification, ModificationNode},
    path::FieldPath,
    test_fixtures::{Counter, Person, Profile, User},
    traits::{FieldValue, Record},
    value::Value,
};
use serde_json::json;

fn user() -> User {
    User {
        id: "u1".to_string(),
        age: 19,
        tags: vec!["vip".to_string(), "beta".to_string()],
    }
}

fn user_ty() -> FieldType {
    FieldType::Record(User::model())
}

fn age_gte_18_and_vip() -> Condition<User> {
    Condition::from_node(ConditionNode::And(vec![
        ConditionNode::OnField {
            field: "age".to_string(),
            condition: Box::new(ConditionNode::GreaterThanOrEqual(Value::Int(18))),
        },
        ConditionNode::OnField {
            field: "tags".to_string(),
            condition: Box::new(ConditionNode::ListAnyElements(Box::new(
                ConditionNode::Equal(Value::Text("vip".to_string())),
            ))),
        },
    ]))
}

#[test]
fn condition_wire_shape_uses_field_tags() {
    let encoded = serde_json::to_value(age_gte_18_and_vip()).unwrap();

    assert_eq!(
        encoded,
        json!({
            "And": [
                {"age": {"GreaterThanOrEqual": {"value": 18}}},
                {"tags": {"ListAnyElements": {"condition": {"Equal": {"value": "vip"}}}}},
            ]
        })
    );
}

#[test]
fn condition_round_trips_and_still_applies() {
    let original = age_gte_18_and_vip();
    let text = to_canonical_json(&original).unwrap();

    let decoded: Condition<User> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, original);
    assert!(decoded.apply(&user()).unwrap());
}

#[test]
fn payload_less_variants_encode_as_true() {
    let encoded = serde_json::to_value(Condition::<User>::always()).unwrap();
    assert_eq!(encoded, json!({"Always": true}));

    let nothing = serde_json::to_value(Modification::<User>::nothing()).unwrap();
    assert_eq!(nothing, json!({"Nothing": true}));

    // And they decode back.
    let decoded = decode_condition(&json!({"Always": true}), &user_ty()).unwrap();
    assert_eq!(decoded, ConditionNode::Always);
}

#[test]
fn zero_and_multi_key_objects_are_rejected() {
    let ty = user_ty();

    assert!(matches!(
        decode_condition(&json!({}), &ty),
        Err(Error::Serialization { .. })
    ));
    assert!(matches!(
        decode_condition(&json!({"Always": true, "Never": true}), &ty),
        Err(Error::Serialization { .. })
    ));
}

#[test]
fn unknown_tags_are_rejected() {
    let ty = user_ty();

    assert!(matches!(
        decode_condition(&json!({"Sometimes": true}), &ty),
        Err(Error::Serialization { .. })
    ));
    // A field name that is not on the model is an unknown tag too.
    assert!(matches!(
        decode_condition(&json!({"height": {"Equal": {"value": 1}}}), &ty),
        Err(Error::Serialization { .. })
    ));
}

#[test]
fn legacy_aliases_are_read_but_never_written() {
    let ty = FieldType::list_of(FieldType::Text);

    let decoded = decode_modification(
        &json!({"AppendList": {"items": ["x"]}}),
        &ty,
    )
    .unwrap();
    assert_eq!(
        decoded,
        ModificationNode::ListAppend(vec![Value::Text("x".to_string())])
    );

    let written = serde_json::to_value(&decoded).unwrap();
    assert_eq!(written, json!({"ListAppend": {"items": ["x"]}}));

    let search = decode_condition(
        &json!({"Search": {"value": "x"}}),
        &FieldType::Text,
    )
    .unwrap();
    assert_eq!(
        search,
        ConditionNode::StringContains {
            value: "x".to_string(),
            ignore_case: true,
        }
    );
}

#[test]
fn modification_wire_round_trip_with_field_tags() {
    let m = Modification::<Counter>::from_node(ModificationNode::Chain(vec![
        ModificationNode::OnField {
            field: "value".to_string(),
            modification: Box::new(ModificationNode::Increment(Value::Int(2))),
        },
        ModificationNode::OnField {
            field: "value".to_string(),
            modification: Box::new(ModificationNode::CoerceAtMost(Value::Int(10))),
        },
    ]));

    let encoded = serde_json::to_value(&m).unwrap();
    assert_eq!(
        encoded,
        json!({
            "Chain": [
                {"value": {"Increment": {"by": 2}}},
                {"value": {"CoerceAtMost": {"value": 10}}},
            ]
        })
    );

    let decoded: Modification<Counter> = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, m);
    assert_eq!(
        decoded.apply(&Counter { value: 7 }).unwrap(),
        Counter { value: 9 }
    );
}

#[test]
fn decode_defaults_for_optional_payload_keys() {
    let contains = decode_condition(
        &json!({"StringContains": {"value": "a"}}),
        &FieldType::Text,
    )
    .unwrap();
    assert_eq!(
        contains,
        ConditionNode::StringContains {
            value: "a".to_string(),
            ignore_case: true,
        }
    );

    let search = decode_condition(
        &json!({"FullTextSearch": {"query": "hello"}}),
        &FieldType::Text,
    )
    .unwrap();
    let ConditionNode::FullTextSearch {
        require_all_terms,
        levenshtein_distance,
        ..
    } = search
    else {
        panic!("expected FullTextSearch");
    };
    assert!(require_all_terms);
    assert_eq!(levenshtein_distance, 2);
}

#[test]
fn unknown_payload_keys_are_rejected() {
    assert!(
        decode_condition(
            &json!({"Equal": {"value": 1, "extra": 2}}),
            &FieldType::Int(IntWidth::W32),
        )
        .is_err()
    );
}

#[test]
fn value_round_trips_shape_directed() {
    let ty = user_ty();
    let value = user().to_value();

    let text = to_canonical_json(&value).unwrap();
    let decoded = value_from_canonical_json(&text, &ty).unwrap();
    assert_eq!(decoded, value);

    // Record payloads are objects keyed by field name.
    let encoded: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        encoded,
        json!({"id": "u1", "age": 19, "tags": ["vip", "beta"]})
    );
}

#[test]
fn temporal_and_identifier_values_round_trip() {
    let ts = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let ulid = ulid::Ulid::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV").unwrap();

    for (value, ty) in [
        (Value::Timestamp(ts), FieldType::Timestamp),
        (
            Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            FieldType::Date,
        ),
        (Value::Ulid(ulid), FieldType::Ulid),
    ] {
        let text = to_canonical_json(&value).unwrap();
        assert_eq!(value_from_canonical_json(&text, &ty).unwrap(), value);
    }
}

#[test]
fn set_values_normalize_on_decode() {
    let ty = FieldType::set_of(FieldType::Int(IntWidth::W32));
    let decoded = decode_value(&json!([3, 1, 3, 2]), &ty).unwrap();
    assert_eq!(
        decoded,
        Value::Set(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn integer_width_is_enforced_on_decode() {
    assert!(decode_value(&json!(300), &FieldType::Int(IntWidth::W8)).is_err());
    assert!(decode_value(&json!(300), &FieldType::Int(IntWidth::W16)).is_ok());
    assert!(decode_value(&json!(-1), &FieldType::Uint(IntWidth::W32)).is_err());
}

#[test]
fn nullable_fields_decode_missing_as_null() {
    let ty = FieldType::Record(Profile::model());
    let decoded = decode_value(&json!({}), &ty).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![("email".to_string(), Value::Null)])
    );

    // Missing non-nullable fields are malformed.
    let user_missing = decode_value(&json!({"id": "x"}), &user_ty());
    assert!(user_missing.is_err());
}

#[test]
fn generic_placeholders_surface_their_kind() {
    let result = decode_value(&json!(1), &FieldType::Param(0));
    assert_eq!(result, Err(Error::GenericPlaceholder { index: 0 }));
}

#[test]
fn paths_encode_as_dotted_strings() {
    let path = FieldPath::<Person, String>::parse("address.city").unwrap();
    let encoded = serde_json::to_value(&path).unwrap();
    assert_eq!(encoded, json!("address.city"));

    let decoded: FieldPath<Person, String> =
        serde_json::from_value(json!("address.city")).unwrap();
    assert_eq!(decoded, path);

    let root: FieldPath<Person, Person> = serde_json::from_value(json!("")).unwrap();
    assert_eq!(root, FieldPath::<Person, Person>::root());

    // Leaf shape mismatches are rejected.
    assert!(
        serde_json::from_value::<FieldPath<Person, i64>>(json!("address.city")).is_err()
    );
}

#[test]
fn canonical_text_helpers_cover_all_three_languages() {
    let ty = user_ty();

    let condition = condition_from_canonical_json(
        &to_canonical_json(&age_gte_18_and_vip()).unwrap(),
        &ty,
    )
    .unwrap();
    assert_eq!(&condition, age_gte_18_and_vip().node());

    let modification = modification_from_canonical_json(
        &to_canonical_json(&Modification::<User>::nothing()).unwrap(),
        &ty,
    )
    .unwrap();
    assert!(modification.is_nothing());
}

#[test]
fn nested_conditions_decode_through_nested_models() {
    let ty = FieldType::Record(Person::model());
    let decoded = decode_condition(
        &json!({"address": {"city": {"Equal": {"value": "NY"}}}}),
        &ty,
    )
    .unwrap();

    assert_eq!(
        decoded,
        ConditionNode::OnField {
            field: "address".to_string(),
            condition: Box::new(ConditionNode::OnField {
                field: "city".to_string(),
                condition: Box::new(ConditionNode::Equal(Value::Text("NY".to_string()))),
            }),
        }
    );
}
