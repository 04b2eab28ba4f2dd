use crate::{
    condition::{Condition, ConditionNode},
    model::{DefaultMarker, FieldType},
    path::{FieldPath, Property, parse_path},
    test_fixtures::{Address, Event, Person, Profile, User},
    traits::Record,
    value::Value,
};

fn person() -> Person {
    Person {
        name: "p".to_string(),
        address: Address {
            street: "a".to_string(),
            city: "NY".to_string(),
        },
    }
}

fn city_path() -> FieldPath<Person, String> {
    let address = Property::<Person, Address>::named("address").unwrap();
    let city = Property::<Address, String>::named("city").unwrap();
    address.path().then(city)
}

#[test]
fn property_get_and_set_are_functional() {
    let age = Property::<User, i32>::named("age").unwrap();
    let user = User {
        id: "u1".to_string(),
        age: 19,
        tags: vec!["vip".to_string()],
    };

    assert_eq!(age.get(&user).unwrap(), 19);

    let older = age.set(&user, 20).unwrap();
    assert_eq!(older.age, 20);
    assert_eq!(older.id, user.id);
    assert_eq!(older.tags, user.tags);
    // Original unchanged.
    assert_eq!(user.age, 19);
}

#[test]
fn property_rejects_wrong_shape_or_index() {
    assert!(Property::<User, String>::named("age").is_err());
    assert!(Property::<User, i32>::at(9).is_err());
    assert!(Property::<User, i32>::named("missing").is_err());
}

#[test]
fn nested_path_reads_and_writes_the_leaf() {
    let path = city_path();
    let before = person();

    assert_eq!(path.get(&before).unwrap(), Some("NY".to_string()));

    let after = path.set(&before, "LA".to_string()).unwrap();
    assert_eq!(after.address.city, "LA");
    assert_eq!(after.address.street, "a");
    assert_eq!(after.name, "p");
}

#[test]
fn lens_laws_hold_when_get_is_defined() {
    let path = city_path();
    let record = person();

    // set-then-get
    let written = path.set(&record, "SF".to_string()).unwrap();
    assert_eq!(path.get(&written).unwrap(), Some("SF".to_string()));

    // get-then-set
    let current = path.get(&record).unwrap().unwrap();
    assert_eq!(path.set(&record, current).unwrap(), record);
}

#[test]
fn display_forms() {
    assert_eq!(FieldPath::<Person, Person>::root().to_string(), "this");
    assert_eq!(city_path().to_string(), "address.city");

    let email = Property::<Profile, Option<String>>::named("email").unwrap();
    assert_eq!(email.path().not_null().to_string(), "email?");

    let tags = Property::<User, Vec<String>>::named("tags").unwrap();
    assert_eq!(tags.path().elements().to_string(), "tags.*");

    assert_eq!(FieldPath::<Person, Person>::root().wire_name(), "");
}

#[test]
fn parse_resolves_components_left_to_right() {
    let root = FieldType::Record(Person::model());

    let (steps, leaf) = parse_path(&root, "address.city").unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(leaf, FieldType::Text);

    let parsed = FieldPath::<Person, String>::parse("address.city").unwrap();
    assert_eq!(parsed, city_path());

    let (_, leaf) = parse_path(&FieldType::Record(User::model()), "tags.*").unwrap();
    assert_eq!(leaf, FieldType::Text);
}

#[test]
fn parse_rejects_bad_paths() {
    let root = FieldType::Record(Person::model());

    assert!(parse_path(&root, "missing").is_err());
    assert!(parse_path(&root, "name?").is_err()); // not nullable
    assert!(parse_path(&root, "name.*").is_err()); // not a collection
    assert!(FieldPath::<Person, i64>::parse("address.city").is_err()); // leaf mismatch
}

#[test]
fn empty_parse_is_identity() {
    let root = FieldType::Record(Person::model());
    let (steps, leaf) = parse_path(&root, "").unwrap();
    assert!(steps.is_empty());
    assert_eq!(leaf, root);
}

#[test]
fn not_null_narrows_and_preserves_absent_roots() {
    let email = Property::<Profile, Option<String>>::named("email")
        .unwrap()
        .path()
        .not_null();

    let absent = Profile { email: None };
    let present = Profile {
        email: Some("a@example.com".to_string()),
    };

    assert_eq!(email.get(&absent).unwrap(), None);
    assert_eq!(
        email.get(&present).unwrap(),
        Some("a@example.com".to_string())
    );

    // Writing through a null intermediate preserves the root.
    assert_eq!(email.set(&absent, "x".to_string()).unwrap(), absent);
    assert_eq!(
        email.set(&present, "x".to_string()).unwrap().email,
        Some("x".to_string())
    );
}

#[test]
fn list_elements_reads_first_and_sets_singleton() {
    let tags = Property::<User, Vec<String>>::named("tags")
        .unwrap()
        .path()
        .elements();

    let user = User {
        id: "u".to_string(),
        age: 1,
        tags: vec!["a".to_string(), "b".to_string()],
    };
    let empty = User {
        tags: vec![],
        ..user.clone()
    };

    assert_eq!(tags.get(&user).unwrap(), Some("a".to_string()));
    assert_eq!(tags.get(&empty).unwrap(), None);

    let replaced = tags.set(&user, "only".to_string()).unwrap();
    assert_eq!(replaced.tags, vec!["only".to_string()]);
}

#[test]
fn map_condition_wraps_through_every_step() {
    let email = Property::<Profile, Option<String>>::named("email")
        .unwrap()
        .path()
        .not_null();

    let condition = email.map_condition(Condition::from_node(ConditionNode::StringContains {
        value: "@example".to_string(),
        ignore_case: true,
    }));

    assert_eq!(
        condition.node(),
        &ConditionNode::OnField {
            field: "email".to_string(),
            condition: Box::new(ConditionNode::IfNotNull(Box::new(
                ConditionNode::StringContains {
                    value: "@example".to_string(),
                    ignore_case: true,
                }
            ))),
        }
    );

    // Null-safe navigation end to end.
    assert!(!condition.apply(&Profile { email: None }).unwrap());
    assert!(
        condition
            .apply(&Profile {
                email: Some("a@example.com".to_string())
            })
            .unwrap()
    );
}

#[test]
fn default_detection_distinguishes_static_and_dynamic() {
    let id = Property::<Event, ulid::Ulid>::named("id").unwrap();
    let created = Property::<Event, chrono::DateTime<chrono::Utc>>::named("created_at").unwrap();
    let name = Property::<Event, String>::named("name").unwrap();

    // Dynamic defaults differ across instantiations and classify by shape.
    assert_eq!(id.default(), None);
    assert_eq!(id.default_marker(), Some(DefaultMarker::FreshIdentifier));
    assert_eq!(created.default_marker(), Some(DefaultMarker::CurrentInstant));

    // Static default is stable across instantiations.
    assert_eq!(name.default(), Some(String::new()));
    assert_eq!(name.default_marker(), None);
}

#[test]
fn no_default_record_means_no_default_metadata() {
    let age = Property::<User, i32>::named("age").unwrap();
    assert_eq!(age.default(), None);
    assert_eq!(age.default_marker(), None);
}

#[test]
fn get_in_surfaces_shape_mismatches() {
    let steps = city_path();
    let wrong = Value::Int(3);
    assert!(crate::path::get_in(steps.steps(), &wrong).is_err());
}
