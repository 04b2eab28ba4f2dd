use crate::value::{Float64, GeoPoint, Value};
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not};

/// Default `lessThanKilometers` bound: effectively unlimited.
pub const GEO_DISTANCE_UNLIMITED_KM: f64 = 100_000.0;

///
/// ConditionNode
///
/// Pure, backend-agnostic representation of boolean predicates over one
/// shape. This layer carries no schema validation, no planning, and no
/// execution state; interpretation happens in evaluation or in a backend
/// translator. `OnField` is keyed by field name and resolved against the
/// record model at evaluation time.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConditionNode {
    Never,
    Always,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),

    Equal(Value),
    NotEqual(Value),
    Inside(Vec<Value>),
    NotInside(Vec<Value>),
    GreaterThan(Value),
    LessThan(Value),
    GreaterThanOrEqual(Value),
    LessThanOrEqual(Value),

    StringContains {
        value: String,
        ignore_case: bool,
    },
    /// Substring match against the text inside a raw-string wrapper.
    RawStringContains {
        value: String,
        ignore_case: bool,
    },
    /// Full match, not substring.
    RegexMatches {
        pattern: String,
        ignore_case: bool,
    },
    FullTextSearch {
        query: String,
        require_all_terms: bool,
        levenshtein_distance: u8,
    },
    GeoDistance {
        value: GeoPoint,
        greater_than_km: Float64,
        less_than_km: Float64,
    },

    IntBitsClear {
        mask: u32,
    },
    IntBitsSet {
        mask: u32,
    },
    IntBitsAnyClear {
        mask: u32,
    },
    IntBitsAnySet {
        mask: u32,
    },

    ListAllElements(Box<Self>),
    ListAnyElements(Box<Self>),
    SetAllElements(Box<Self>),
    SetAnyElements(Box<Self>),
    /// Deprecated exact-size check, kept for wire compatibility.
    ListSizesEquals(usize),
    /// Deprecated exact-size check, kept for wire compatibility.
    SetSizesEquals(usize),

    Exists {
        key: String,
    },
    /// Key exists and the inner condition holds on its value.
    OnKey {
        key: String,
        condition: Box<Self>,
    },

    OnField {
        field: String,
        condition: Box<Self>,
    },
    IfNotNull(Box<Self>),
}

impl ConditionNode {
    /// Stable variant tag, equal to the wire tag (except `OnField`, whose
    /// wire tag is the field name).
    #[must_use]
    pub const fn variant_tag(&self) -> &'static str {
        match self {
            Self::Never => "Never",
            Self::Always => "Always",
            Self::And(_) => "And",
            Self::Or(_) => "Or",
            Self::Not(_) => "Not",
            Self::Equal(_) => "Equal",
            Self::NotEqual(_) => "NotEqual",
            Self::Inside(_) => "Inside",
            Self::NotInside(_) => "NotInside",
            Self::GreaterThan(_) => "GreaterThan",
            Self::LessThan(_) => "LessThan",
            Self::GreaterThanOrEqual(_) => "GreaterThanOrEqual",
            Self::LessThanOrEqual(_) => "LessThanOrEqual",
            Self::StringContains { .. } => "StringContains",
            Self::RawStringContains { .. } => "RawStringContains",
            Self::RegexMatches { .. } => "RegexMatches",
            Self::FullTextSearch { .. } => "FullTextSearch",
            Self::GeoDistance { .. } => "GeoDistance",
            Self::IntBitsClear { .. } => "IntBitsClear",
            Self::IntBitsSet { .. } => "IntBitsSet",
            Self::IntBitsAnyClear { .. } => "IntBitsAnyClear",
            Self::IntBitsAnySet { .. } => "IntBitsAnySet",
            Self::ListAllElements(_) => "ListAllElements",
            Self::ListAnyElements(_) => "ListAnyElements",
            Self::SetAllElements(_) => "SetAllElements",
            Self::SetAnyElements(_) => "SetAnyElements",
            Self::ListSizesEquals(_) => "ListSizesEquals",
            Self::SetSizesEquals(_) => "SetSizesEquals",
            Self::Exists { .. } => "Exists",
            Self::OnKey { .. } => "OnKey",
            Self::OnField { .. } => "OnField",
            Self::IfNotNull(_) => "IfNotNull",
        }
    }
}

impl BitAnd for ConditionNode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for ConditionNode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl Not for ConditionNode {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

///
/// Condition
///
/// Typed handle over a [`ConditionNode`]: the phantom pins the root shape
/// so construction, evaluation, and decoding agree on the record model.
/// Backends translate the node tree; they never subclass anything.
///

pub struct Condition<T> {
    node: ConditionNode,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Condition<T> {
    #[must_use]
    pub const fn from_node(node: ConditionNode) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn node(&self) -> &ConditionNode {
        &self.node
    }

    #[must_use]
    pub fn into_node(self) -> ConditionNode {
        self.node
    }

    #[must_use]
    pub const fn never() -> Self {
        Self::from_node(ConditionNode::Never)
    }

    #[must_use]
    pub const fn always() -> Self {
        Self::from_node(ConditionNode::Always)
    }

    #[must_use]
    pub fn and(conditions: Vec<Self>) -> Self {
        Self::from_node(ConditionNode::And(
            conditions.into_iter().map(Self::into_node).collect(),
        ))
    }

    #[must_use]
    pub fn or(conditions: Vec<Self>) -> Self {
        Self::from_node(ConditionNode::Or(
            conditions.into_iter().map(Self::into_node).collect(),
        ))
    }

    /// Material implication: `(if_ and then_) or not if_`.
    #[must_use]
    pub fn if_then(if_: Self, then_: Self) -> Self {
        let body = if_.node.clone() & then_.node;
        Self::from_node(body | !if_.node)
    }

    /// `(if_ and then_) or (not if_ and else_)`.
    #[must_use]
    pub fn if_then_else(if_: Self, then_: Self, else_: Self) -> Self {
        let when_true = if_.node.clone() & then_.node;
        let when_false = !if_.node & else_.node;
        Self::from_node(when_true | when_false)
    }

    /// Conjunction over present inputs; empty is vacuously `Always`, a
    /// singleton is returned as-is.
    #[must_use]
    pub fn and_not_null(conditions: Vec<Option<Self>>) -> Self {
        let mut nodes: Vec<ConditionNode> =
            conditions.into_iter().flatten().map(Self::into_node).collect();

        match nodes.len() {
            0 => Self::always(),
            1 => Self::from_node(nodes.remove(0)),
            _ => Self::from_node(ConditionNode::And(nodes)),
        }
    }

    /// Disjunction over present inputs; empty is `Never`.
    #[must_use]
    pub fn or_not_null(conditions: Vec<Option<Self>>) -> Self {
        let mut nodes: Vec<ConditionNode> =
            conditions.into_iter().flatten().map(Self::into_node).collect();

        match nodes.len() {
            0 => Self::never(),
            1 => Self::from_node(nodes.remove(0)),
            _ => Self::from_node(ConditionNode::Or(nodes)),
        }
    }
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<T> std::fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Condition").field(&self.node).finish()
    }
}

impl<T> PartialEq for Condition<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Condition<T> {}

impl<T> BitAnd for Condition<T> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_node(self.node & rhs.node)
    }
}

impl<T> BitOr for Condition<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_node(self.node | rhs.node)
    }
}

impl<T> Not for Condition<T> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_node(!self.node)
    }
}
