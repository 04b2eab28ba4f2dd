//! Shared record fixtures for unit tests. Models are hand-written the way
//! downstream crates would write them; fields are listed in declaration
//! order everywhere.

use crate::{
    impl_record_value,
    model::{Annotation, FieldType, IntWidth, RecordKind, RecordModel, TEXT_INDEX_ANNOTATION},
    traits::Record,
    value::GeoPoint,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use ulid::Ulid;

fn model_of(build: impl FnOnce() -> RecordModel, cell: &OnceLock<Arc<RecordModel>>) -> Arc<RecordModel> {
    Arc::clone(cell.get_or_init(|| Arc::new(build())))
}

///
/// User
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub id: String,
    pub age: i32,
    pub tags: Vec<String>,
}

impl_record_value!(User { id, age, tags });

impl Record for User {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.User", RecordKind::Struct)
                    .field("id", FieldType::Text)
                    .field("age", FieldType::Int(IntWidth::W32))
                    .field("tags", FieldType::list_of(FieldType::Text))
            },
            &MODEL,
        )
    }
}

///
/// Counter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Counter {
    pub value: i32,
}

impl_record_value!(Counter { value });

impl Record for Counter {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Counter", RecordKind::Struct)
                    .field("value", FieldType::Int(IntWidth::W32))
            },
            &MODEL,
        )
    }
}

///
/// Address / Person
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl_record_value!(Address { street, city });

impl Record for Address {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Address", RecordKind::Struct)
                    .field("street", FieldType::Text)
                    .field("city", FieldType::Text)
            },
            &MODEL,
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Person {
    pub name: String,
    pub address: Address,
}

impl_record_value!(Person { name, address });

impl Record for Person {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Person", RecordKind::Struct)
                    .field("name", FieldType::Text)
                    .field("address", FieldType::Record(Address::model()))
            },
            &MODEL,
        )
    }
}

///
/// Profile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    pub email: Option<String>,
}

impl_record_value!(Profile { email });

impl Record for Profile {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Profile", RecordKind::Struct)
                    .field("email", FieldType::option_of(FieldType::Text))
            },
            &MODEL,
        )
    }
}

///
/// Ticket
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ticket {
    pub status: String,
    pub priority: i32,
}

impl_record_value!(Ticket { status, priority });

impl Record for Ticket {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Ticket", RecordKind::Struct)
                    .field("status", FieldType::Text)
                    .field("priority", FieldType::Int(IntWidth::W32))
            },
            &MODEL,
        )
    }
}

///
/// Event
///
/// Carries dynamic defaults: a fresh ulid and the current instant.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub id: Ulid,
    pub created_at: DateTime<Utc>,
    pub name: String,
}

impl_record_value!(Event { id, created_at, name });

impl Default for Event {
    fn default() -> Self {
        Self {
            id: Ulid::new(),
            created_at: Utc::now(),
            name: String::new(),
        }
    }
}

impl Record for Event {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Event", RecordKind::Struct)
                    .optional_field("id", FieldType::Ulid)
                    .optional_field("created_at", FieldType::Timestamp)
                    .optional_field("name", FieldType::Text)
            },
            &MODEL,
        )
    }

    fn default_record() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Article
///
/// Declares a text index over title and body for the full-text fallback.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub rating: i32,
}

impl_record_value!(Article { title, body, rating });

impl Record for Article {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Article", RecordKind::Struct)
                    .field("title", FieldType::Text)
                    .field("body", FieldType::Text)
                    .field("rating", FieldType::Int(IntWidth::W32))
                    .annotation(Annotation::new(
                        TEXT_INDEX_ANNOTATION,
                        vec!["title".to_string(), "body".to_string()],
                    ))
            },
            &MODEL,
        )
    }
}

///
/// Venue
///

#[derive(Clone, Debug, PartialEq)]
pub struct Venue {
    pub name: String,
    pub location: GeoPoint,
}

impl_record_value!(Venue { name, location });

impl Record for Venue {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Venue", RecordKind::Struct)
                    .field("name", FieldType::Text)
                    .field("location", FieldType::Geo)
            },
            &MODEL,
        )
    }
}

///
/// Inventory
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Inventory {
    pub counts: BTreeMap<String, i64>,
}

impl_record_value!(Inventory { counts });

impl Record for Inventory {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Inventory", RecordKind::Struct)
                    .field("counts", FieldType::map_of(FieldType::Int(IntWidth::W64)))
            },
            &MODEL,
        )
    }
}

///
/// Flags
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Flags {
    pub bits: i32,
}

impl_record_value!(Flags { bits });

impl Record for Flags {
    fn model() -> Arc<RecordModel> {
        static MODEL: OnceLock<Arc<RecordModel>> = OnceLock::new();
        model_of(
            || {
                RecordModel::new("test.Flags", RecordKind::Struct)
                    .field("bits", FieldType::Int(IntWidth::W32))
            },
            &MODEL,
        )
    }
}
