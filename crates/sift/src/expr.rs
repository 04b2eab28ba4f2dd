use sift_core::{
    condition::{Condition, ConditionNode, GEO_DISTANCE_UNLIMITED_KM},
    modification::{Modification, ModificationNode},
    path::FieldPath,
    traits::FieldValue,
    value::{Float64, GeoPoint, RawText},
};
use std::collections::BTreeMap;

///
/// NumericValue
///
/// Marker for leaf shapes that support arithmetic modifications and the
/// bit predicates' 32-bit carrier.
///

pub trait NumericValue: FieldValue {}

impl NumericValue for i8 {}
impl NumericValue for i16 {}
impl NumericValue for i32 {}
impl NumericValue for i64 {}
impl NumericValue for u8 {}
impl NumericValue for u16 {}
impl NumericValue for u32 {}
impl NumericValue for u64 {}
impl NumericValue for f32 {}
impl NumericValue for f64 {}

///
/// PathExpr
///
/// Fluent condition and modification constructors on any typed path.
/// Every method wraps a leaf node through the path with `map_condition`
/// or `map_modification`, so the same expressions work at any depth.
///

pub trait PathExpr<Root: FieldValue, Leaf: FieldValue> {
    fn leaf_condition(&self, node: ConditionNode) -> Condition<Root>;
    fn leaf_modification(&self, node: ModificationNode) -> Modification<Root>;

    fn equals(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::Equal(value.to_value()))
    }

    fn not_equals(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::NotEqual(value.to_value()))
    }

    fn inside(&self, values: Vec<Leaf>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::Inside(
            values.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn not_inside(&self, values: Vec<Leaf>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::NotInside(
            values.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn gt(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::GreaterThan(value.to_value()))
    }

    fn lt(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::LessThan(value.to_value()))
    }

    fn gte(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::GreaterThanOrEqual(value.to_value()))
    }

    fn lte(&self, value: Leaf) -> Condition<Root> {
        self.leaf_condition(ConditionNode::LessThanOrEqual(value.to_value()))
    }

    fn assign(&self, value: Leaf) -> Modification<Root> {
        self.leaf_modification(ModificationNode::Assign(value.to_value()))
    }
}

impl<Root: FieldValue, Leaf: FieldValue> PathExpr<Root, Leaf> for FieldPath<Root, Leaf> {
    fn leaf_condition(&self, node: ConditionNode) -> Condition<Root> {
        self.map_condition(Condition::from_node(node))
    }

    fn leaf_modification(&self, node: ModificationNode) -> Modification<Root> {
        self.map_modification(Modification::from_node(node))
    }
}

///
/// NumericPathExpr
///

pub trait NumericPathExpr<Root: FieldValue, Leaf: NumericValue>: PathExpr<Root, Leaf> {
    fn increment(&self, by: Leaf) -> Modification<Root> {
        self.leaf_modification(ModificationNode::Increment(by.to_value()))
    }

    fn multiply(&self, by: Leaf) -> Modification<Root> {
        self.leaf_modification(ModificationNode::Multiply(by.to_value()))
    }

    fn coerce_at_most(&self, bound: Leaf) -> Modification<Root> {
        self.leaf_modification(ModificationNode::CoerceAtMost(bound.to_value()))
    }

    fn coerce_at_least(&self, bound: Leaf) -> Modification<Root> {
        self.leaf_modification(ModificationNode::CoerceAtLeast(bound.to_value()))
    }

    fn bits_clear(&self, mask: u32) -> Condition<Root> {
        self.leaf_condition(ConditionNode::IntBitsClear { mask })
    }

    fn bits_set(&self, mask: u32) -> Condition<Root> {
        self.leaf_condition(ConditionNode::IntBitsSet { mask })
    }

    fn bits_any_clear(&self, mask: u32) -> Condition<Root> {
        self.leaf_condition(ConditionNode::IntBitsAnyClear { mask })
    }

    fn bits_any_set(&self, mask: u32) -> Condition<Root> {
        self.leaf_condition(ConditionNode::IntBitsAnySet { mask })
    }
}

impl<Root: FieldValue, Leaf: NumericValue> NumericPathExpr<Root, Leaf>
    for FieldPath<Root, Leaf>
{
}

///
/// StringPathExpr
///

pub trait StringPathExpr<Root: FieldValue>: PathExpr<Root, String> {
    /// Substring match; case-insensitive unless stated otherwise.
    fn contains_string(&self, value: impl Into<String>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::StringContains {
            value: value.into(),
            ignore_case: true,
        })
    }

    fn contains_string_cased(&self, value: impl Into<String>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::StringContains {
            value: value.into(),
            ignore_case: false,
        })
    }

    /// Full-match regex.
    fn matches_regex(&self, pattern: impl Into<String>, ignore_case: bool) -> Condition<Root> {
        self.leaf_condition(ConditionNode::RegexMatches {
            pattern: pattern.into(),
            ignore_case,
        })
    }

    fn append(&self, suffix: impl Into<String>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::AppendString(suffix.into()))
    }
}

impl<Root: FieldValue> StringPathExpr<Root> for FieldPath<Root, String> {}

///
/// RawStringPathExpr
///

pub trait RawStringPathExpr<Root: FieldValue>: PathExpr<Root, RawText> {
    fn contains_raw_string(&self, value: impl Into<String>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::RawStringContains {
            value: value.into(),
            ignore_case: true,
        })
    }

    fn append_raw(&self, suffix: impl Into<String>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::AppendRawString(suffix.into()))
    }
}

impl<Root: FieldValue> RawStringPathExpr<Root> for FieldPath<Root, RawText> {}

///
/// RecordPathExpr — full-text over a whole record leaf
///

pub trait FullTextPathExpr<Root: FieldValue, Leaf: FieldValue>: PathExpr<Root, Leaf> {
    fn full_text_search(
        &self,
        query: impl Into<String>,
        require_all_terms: bool,
        levenshtein_distance: u8,
    ) -> Condition<Root> {
        self.leaf_condition(ConditionNode::FullTextSearch {
            query: query.into(),
            require_all_terms,
            levenshtein_distance,
        })
    }
}

impl<Root: FieldValue, Leaf: FieldValue> FullTextPathExpr<Root, Leaf>
    for FieldPath<Root, Leaf>
{
}

///
/// GeoPathExpr
///

pub trait GeoPathExpr<Root: FieldValue>: PathExpr<Root, GeoPoint> {
    /// Inclusive great-circle distance band around `center`.
    fn within_km(&self, center: GeoPoint, min_km: f64, max_km: f64) -> Condition<Root> {
        self.leaf_condition(ConditionNode::GeoDistance {
            value: center,
            greater_than_km: Float64::new(min_km),
            less_than_km: Float64::new(max_km),
        })
    }

    fn within_unlimited(&self, center: GeoPoint) -> Condition<Root> {
        self.within_km(center, 0.0, GEO_DISTANCE_UNLIMITED_KM)
    }
}

impl<Root: FieldValue> GeoPathExpr<Root> for FieldPath<Root, GeoPoint> {}

///
/// ListPathExpr / SetPathExpr
///

pub trait ListPathExpr<Root: FieldValue, E: FieldValue>: PathExpr<Root, Vec<E>> {
    fn all_elements(&self, condition: Condition<E>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::ListAllElements(Box::new(
            condition.into_node(),
        )))
    }

    fn any_elements(&self, condition: Condition<E>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::ListAnyElements(Box::new(
            condition.into_node(),
        )))
    }

    fn append_items(&self, items: Vec<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListAppend(
            items.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn remove_where(&self, condition: Condition<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListRemove(Box::new(
            condition.into_node(),
        )))
    }

    fn remove_instances(&self, items: Vec<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListRemoveInstances(
            items.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn drop_first(&self) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListDropFirst)
    }

    fn drop_last(&self) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListDropLast)
    }

    /// Apply `modification` to every element.
    fn for_each(&self, modification: Modification<E>) -> Modification<Root> {
        self.for_each_if(Condition::always(), modification)
    }

    /// Apply `modification` to the elements matching `condition`.
    fn for_each_if(
        &self,
        condition: Condition<E>,
        modification: Modification<E>,
    ) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ListPerElement {
            condition: Box::new(condition.into_node()),
            modification: Box::new(modification.into_node()),
        })
    }
}

impl<Root: FieldValue, E: FieldValue> ListPathExpr<Root, E> for FieldPath<Root, Vec<E>> {}

pub trait SetPathExpr<Root: FieldValue, E: FieldValue + Ord>:
    PathExpr<Root, std::collections::BTreeSet<E>>
{
    fn all_elements(&self, condition: Condition<E>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::SetAllElements(Box::new(
            condition.into_node(),
        )))
    }

    fn any_elements(&self, condition: Condition<E>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::SetAnyElements(Box::new(
            condition.into_node(),
        )))
    }

    fn append_items(&self, items: Vec<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetAppend(
            items.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn remove_where(&self, condition: Condition<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetRemove(Box::new(
            condition.into_node(),
        )))
    }

    fn remove_instances(&self, items: Vec<E>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetRemoveInstances(
            items.iter().map(FieldValue::to_value).collect(),
        ))
    }

    fn drop_first(&self) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetDropFirst)
    }

    fn drop_last(&self) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetDropLast)
    }

    fn for_each_if(
        &self,
        condition: Condition<E>,
        modification: Modification<E>,
    ) -> Modification<Root> {
        self.leaf_modification(ModificationNode::SetPerElement {
            condition: Box::new(condition.into_node()),
            modification: Box::new(modification.into_node()),
        })
    }
}

impl<Root: FieldValue, E: FieldValue + Ord> SetPathExpr<Root, E>
    for FieldPath<Root, std::collections::BTreeSet<E>>
{
}

///
/// MapPathExpr
///

pub trait MapPathExpr<Root: FieldValue, V: FieldValue>:
    PathExpr<Root, BTreeMap<String, V>>
{
    fn exists(&self, key: impl Into<String>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::Exists { key: key.into() })
    }

    fn on_key(&self, key: impl Into<String>, condition: Condition<V>) -> Condition<Root> {
        self.leaf_condition(ConditionNode::OnKey {
            key: key.into(),
            condition: Box::new(condition.into_node()),
        })
    }

    /// Merge entries, overwriting existing keys.
    fn combine(&self, entries: Vec<(String, V)>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::Combine(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        ))
    }

    /// Per-key modification; every named key must exist at apply time.
    fn modify_by_key(
        &self,
        entries: Vec<(String, Modification<V>)>,
    ) -> Modification<Root> {
        self.leaf_modification(ModificationNode::ModifyByKey(
            entries
                .into_iter()
                .map(|(key, modification)| (key, modification.into_node()))
                .collect(),
        ))
    }

    fn remove_keys(&self, keys: Vec<String>) -> Modification<Root> {
        self.leaf_modification(ModificationNode::RemoveKeys(keys))
    }
}

impl<Root: FieldValue, V: FieldValue> MapPathExpr<Root, V>
    for FieldPath<Root, BTreeMap<String, V>>
{
}
