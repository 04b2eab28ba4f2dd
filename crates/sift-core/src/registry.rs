use crate::{
    error::Error,
    model::{FieldType, IntWidth, RecordDescription},
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Serializer factory: resolves a serial name plus concrete type arguments
/// into a runtime shape. The owning registry is passed back in so entries
/// (virtual records in particular) can resolve their own references.
pub type Factory = Arc<dyn Fn(&Registry, &[FieldType]) -> Result<FieldType, Error> + Send + Sync>;

///
/// Registry
///
/// Directory from serial names to serializer factories. The only mutable
/// shared state in the core: writes are serialized behind a lock,
/// re-registration of a present name is a no-op, and readers observe the
/// old or new entry per name.
///

pub struct Registry {
    entries: RwLock<HashMap<String, Factory>>,
}

impl Registry {
    /// A registry pre-populated with the standard primitives, containers,
    /// and the core's own sum types under their canonical names.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self {
            entries: RwLock::new(HashMap::new()),
        };
        registry.populate_standard();
        registry
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Install a factory for `name`. Idempotent: re-registration of an
    /// already-present name is silently ignored.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Self, &[FieldType]) -> Result<FieldType, Error> + Send + Sync + 'static,
    {
        self.register_arc(name.into(), Arc::new(factory));
    }

    fn register_arc(&self, name: String, factory: Factory) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(name).or_insert(factory);
        }
    }

    /// Resolve a serial name with concrete type arguments.
    pub fn lookup(&self, name: &str, args: &[FieldType]) -> Result<FieldType, Error> {
        let factory = {
            let entries = self
                .entries
                .read()
                .map_err(|_| Error::serialization("registry lock poisoned"))?;
            entries.get(name).cloned()
        };

        // The factory runs outside the lock so virtual entries can resolve
        // their own type references reentrantly.
        match factory {
            Some(factory) => factory(self, args),
            None => Err(Error::serialization(format!(
                "unregistered serial name `{name}`"
            ))),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(name))
            .unwrap_or(false)
    }

    /// Install a virtual record, enum, or alias described at runtime. The
    /// description resolves lazily against whichever registry the lookup
    /// arrives through.
    pub fn register_virtual(&self, description: RecordDescription) {
        let name = description.serial_name.clone();
        self.register_arc(
            name,
            Arc::new(move |registry: &Self, _args: &[FieldType]| {
                description.resolve(registry)
            }),
        );
    }

    /// Derive a registry in which every record whose name matches `filter`
    /// is replaced by a virtual equivalent reconstructed from its model.
    /// Used to bridge process boundaries where generated record types are
    /// unavailable.
    pub fn virtualize(&self, filter: impl Fn(&str) -> bool) -> Result<Self, Error> {
        let derived = Self {
            entries: RwLock::new(HashMap::new()),
        };

        let snapshot: Vec<(String, Factory)> = {
            let entries = self
                .entries
                .read()
                .map_err(|_| Error::serialization("registry lock poisoned"))?;
            entries
                .iter()
                .map(|(name, factory)| (name.clone(), Arc::clone(factory)))
                .collect()
        };

        for (name, factory) in snapshot {
            if filter(&name) {
                if let Ok(FieldType::Record(model)) = self.lookup(&name, &[]) {
                    derived.register_virtual(RecordDescription::from_model(&model)?);
                    continue;
                }
            }
            derived.register_arc(name, factory);
        }

        Ok(derived)
    }

    fn populate_standard(&self) {
        let shapes: &[(&str, FieldType)] = &[
            ("Bool", FieldType::Bool),
            ("Int8", FieldType::Int(IntWidth::W8)),
            ("Int16", FieldType::Int(IntWidth::W16)),
            ("Int32", FieldType::Int(IntWidth::W32)),
            ("Int64", FieldType::Int(IntWidth::W64)),
            ("UInt8", FieldType::Uint(IntWidth::W8)),
            ("UInt16", FieldType::Uint(IntWidth::W16)),
            ("UInt32", FieldType::Uint(IntWidth::W32)),
            ("UInt64", FieldType::Uint(IntWidth::W64)),
            ("Float32", FieldType::Float32),
            ("Float64", FieldType::Float64),
            ("Char", FieldType::Char),
            ("String", FieldType::Text),
            ("RawString", FieldType::RawText),
            ("Instant", FieldType::Timestamp),
            ("LocalDate", FieldType::Date),
            ("LocalTime", FieldType::Time),
            ("Ulid", FieldType::Ulid),
            ("GeoPoint", FieldType::Geo),
            ("Unsupported", FieldType::Unsupported),
        ];

        for (name, shape) in shapes {
            let shape = shape.clone();
            self.register(*name, move |_registry, args| {
                expect_arity(args, 0)?;
                Ok(shape.clone())
            });
        }

        self.register("Option", |_registry, args| {
            expect_arity(args, 1)?;
            Ok(FieldType::option_of(args[0].clone()))
        });
        self.register("List", |_registry, args| {
            expect_arity(args, 1)?;
            Ok(FieldType::list_of(args[0].clone()))
        });
        self.register("Set", |_registry, args| {
            expect_arity(args, 1)?;
            Ok(FieldType::set_of(args[0].clone()))
        });
        self.register("Map", |_registry, args| {
            expect_arity(args, 2)?;
            if args[0] != FieldType::Text {
                return Err(Error::unsupported("Map with non-string keys"));
            }
            Ok(FieldType::map_of(args[1].clone()))
        });

        self.register("Pair", |_registry, args| {
            expect_arity(args, 2)?;
            Ok(tuple_shape(
                "Pair",
                &[("first", &args[0]), ("second", &args[1])],
            ))
        });
        self.register("Triple", |_registry, args| {
            expect_arity(args, 3)?;
            Ok(tuple_shape(
                "Triple",
                &[
                    ("first", &args[0]),
                    ("second", &args[1]),
                    ("third", &args[2]),
                ],
            ))
        });
        self.register("ClosedRange", |_registry, args| {
            expect_arity(args, 1)?;
            Ok(tuple_shape(
                "ClosedRange",
                &[("start", &args[0]), ("endInclusive", &args[0])],
            ))
        });

        // The core's own sum types. Their payloads are decoded by the
        // dedicated codec seeds, not by shape-directed value decoding, so
        // the directory records them as opaque shapes.
        for name in ["sift.Condition", "sift.Modification", "sift.Path"] {
            self.register(name, |_registry, _args| Ok(FieldType::Unsupported));
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_arity(args: &[FieldType], expected: usize) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::serialization(format!(
            "expected {expected} type arguments, found {}",
            args.len()
        )))
    }
}

fn tuple_shape(serial_name: &str, fields: &[(&str, &FieldType)]) -> FieldType {
    use crate::model::{RecordKind, RecordModel};

    let mut model = RecordModel::new(serial_name, RecordKind::Struct);
    for (name, ty) in fields {
        model = model.field(*name, (*ty).clone());
    }
    for (_, ty) in fields {
        model = model.param((*ty).clone());
    }

    FieldType::Record(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescription, RecordDescription, RecordKind, TypeRef};

    #[test]
    fn standard_shapes_are_pre_populated() {
        let registry = Registry::new();

        assert_eq!(
            registry.lookup("Int32", &[]).unwrap(),
            FieldType::Int(IntWidth::W32)
        );
        assert_eq!(registry.lookup("String", &[]).unwrap(), FieldType::Text);
        assert_eq!(
            registry.lookup("List", &[FieldType::Bool]).unwrap(),
            FieldType::list_of(FieldType::Bool)
        );
        assert_eq!(
            registry
                .lookup("Map", &[FieldType::Text, FieldType::Float64])
                .unwrap(),
            FieldType::map_of(FieldType::Float64)
        );
        assert!(registry.contains("sift.Condition"));
        assert!(registry.contains("sift.Modification"));
        assert!(registry.contains("sift.Path"));
    }

    #[test]
    fn arity_and_key_constraints_are_enforced() {
        let registry = Registry::new();

        assert!(registry.lookup("List", &[]).is_err());
        assert!(
            registry
                .lookup("Map", &[FieldType::Bool, FieldType::Bool])
                .is_err()
        );
        assert!(registry.lookup("made.Up", &[]).is_err());
    }

    #[test]
    fn registration_is_idempotent_first_writer_wins() {
        let registry = Registry::new();

        registry.register("custom.Width", |_, _| Ok(FieldType::Int(IntWidth::W8)));
        registry.register("custom.Width", |_, _| Ok(FieldType::Int(IntWidth::W64)));

        assert_eq!(
            registry.lookup("custom.Width", &[]).unwrap(),
            FieldType::Int(IntWidth::W8)
        );
    }

    fn box_description() -> RecordDescription {
        RecordDescription {
            serial_name: "virtual.Box".to_string(),
            kind: RecordKind::Struct,
            fields: vec![FieldDescription {
                name: "label".to_string(),
                ty: TypeRef::named("String"),
                optional: false,
                annotations: vec![],
                default: None,
                default_marker: None,
            }],
            variants: vec![],
            alias_of: None,
            annotations: vec![],
        }
    }

    #[test]
    fn virtual_records_resolve_through_the_registry() {
        let registry = Registry::new();
        registry.register_virtual(box_description());

        let FieldType::Record(model) = registry.lookup("virtual.Box", &[]).unwrap() else {
            panic!("expected a struct shape");
        };
        assert_eq!(model.serial_name, "virtual.Box");
        assert_eq!(model.fields[0].ty, FieldType::Text);
    }

    #[test]
    fn virtual_records_can_reference_each_other() {
        let registry = Registry::new();
        registry.register_virtual(box_description());
        registry.register_virtual(RecordDescription {
            serial_name: "virtual.Shelf".to_string(),
            kind: RecordKind::Struct,
            fields: vec![FieldDescription {
                name: "boxes".to_string(),
                ty: TypeRef::with_args("List", vec![TypeRef::named("virtual.Box")]),
                optional: false,
                annotations: vec![],
                default: None,
                default_marker: None,
            }],
            variants: vec![],
            alias_of: None,
            annotations: vec![],
        });

        let FieldType::Record(shelf) = registry.lookup("virtual.Shelf", &[]).unwrap() else {
            panic!("expected a struct shape");
        };
        let FieldType::List(element) = &shelf.fields[0].ty else {
            panic!("expected a list field");
        };
        assert_eq!(element.serial_name(), "virtual.Box");
    }

    #[test]
    fn virtualize_replaces_matching_records() {
        let registry = Registry::new();
        registry.register("app.User", |_, _| {
            Ok(FieldType::Record(Arc::new(
                crate::model::RecordModel::new("app.User", RecordKind::Struct)
                    .field("name", FieldType::Text),
            )))
        });

        let derived = registry
            .virtualize(|name| name.starts_with("app."))
            .unwrap();

        let FieldType::Record(model) = derived.lookup("app.User", &[]).unwrap() else {
            panic!("expected a struct shape");
        };
        assert_eq!(model.serial_name, "app.User");
        assert_eq!(model.fields[0].name, "name");

        // Untouched entries carry over.
        assert_eq!(derived.lookup("Bool", &[]).unwrap(), FieldType::Bool);
    }

    #[test]
    fn global_registry_is_shared() {
        let a = Registry::global();
        let b = Registry::global();
        assert!(std::ptr::eq(a, b));
        assert!(a.contains("String"));
    }
}
