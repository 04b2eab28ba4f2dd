use crate::condition::ConditionNode;
use crate::value::Value;
use std::marker::PhantomData;

///
/// ModificationNode
///
/// Pure representation of total transformations of one shape. Like
/// conditions, nodes carry no schema or execution state; `OnField` is
/// keyed by field name and resolved at application time.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModificationNode {
    Nothing,
    /// Left-to-right composition.
    Chain(Vec<Self>),
    Assign(Value),
    IfNotNull(Box<Self>),

    CoerceAtMost(Value),
    CoerceAtLeast(Value),
    Increment(Value),
    Multiply(Value),

    AppendString(String),
    AppendRawString(String),

    ListAppend(Vec<Value>),
    SetAppend(Vec<Value>),
    ListRemove(Box<ConditionNode>),
    SetRemove(Box<ConditionNode>),
    ListRemoveInstances(Vec<Value>),
    SetRemoveInstances(Vec<Value>),
    ListDropFirst,
    ListDropLast,
    SetDropFirst,
    SetDropLast,
    ListPerElement {
        condition: Box<ConditionNode>,
        modification: Box<Self>,
    },
    SetPerElement {
        condition: Box<ConditionNode>,
        modification: Box<Self>,
    },

    /// Merge entries into a string-keyed map, overwriting existing keys.
    Combine(Vec<(String, Value)>),
    /// Apply per-key modifications; every key must already exist.
    ModifyByKey(Vec<(String, Self)>),
    /// Remove keys; absent keys are ignored.
    RemoveKeys(Vec<String>),

    OnField {
        field: String,
        modification: Box<Self>,
    },
}

impl ModificationNode {
    /// Stable variant tag, equal to the wire tag (except `OnField`, whose
    /// wire tag is the field name).
    #[must_use]
    pub const fn variant_tag(&self) -> &'static str {
        match self {
            Self::Nothing => "Nothing",
            Self::Chain(_) => "Chain",
            Self::Assign(_) => "Assign",
            Self::IfNotNull(_) => "IfNotNull",
            Self::CoerceAtMost(_) => "CoerceAtMost",
            Self::CoerceAtLeast(_) => "CoerceAtLeast",
            Self::Increment(_) => "Increment",
            Self::Multiply(_) => "Multiply",
            Self::AppendString(_) => "AppendString",
            Self::AppendRawString(_) => "AppendRawString",
            Self::ListAppend(_) => "ListAppend",
            Self::SetAppend(_) => "SetAppend",
            Self::ListRemove(_) => "ListRemove",
            Self::SetRemove(_) => "SetRemove",
            Self::ListRemoveInstances(_) => "ListRemoveInstances",
            Self::SetRemoveInstances(_) => "SetRemoveInstances",
            Self::ListDropFirst => "ListDropFirst",
            Self::ListDropLast => "ListDropLast",
            Self::SetDropFirst => "SetDropFirst",
            Self::SetDropLast => "SetDropLast",
            Self::ListPerElement { .. } => "ListPerElement",
            Self::SetPerElement { .. } => "SetPerElement",
            Self::Combine(_) => "Combine",
            Self::ModifyByKey(_) => "ModifyByKey",
            Self::RemoveKeys(_) => "RemoveKeys",
            Self::OnField { .. } => "OnField",
        }
    }

    /// Whether this modification is the identity: `Nothing`, or a `Chain`
    /// of identities. Callers use this to skip round-trips.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        match self {
            Self::Nothing => true,
            Self::Chain(children) => children.iter().all(Self::is_nothing),
            _ => false,
        }
    }
}

///
/// Modification
///
/// Typed handle over a [`ModificationNode`]; the phantom pins the root
/// shape. All application is functional: the input record is never
/// mutated.
///

pub struct Modification<T> {
    node: ModificationNode,
    _marker: PhantomData<fn(&T) -> T>,
}

impl<T> Modification<T> {
    #[must_use]
    pub const fn from_node(node: ModificationNode) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn node(&self) -> &ModificationNode {
        &self.node
    }

    #[must_use]
    pub fn into_node(self) -> ModificationNode {
        self.node
    }

    #[must_use]
    pub const fn nothing() -> Self {
        Self::from_node(ModificationNode::Nothing)
    }

    #[must_use]
    pub fn chain(modifications: Vec<Self>) -> Self {
        Self::from_node(ModificationNode::Chain(
            modifications.into_iter().map(Self::into_node).collect(),
        ))
    }

    /// Compose with a later modification.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        match self.node {
            ModificationNode::Chain(mut children) => {
                children.push(next.node);
                Self::from_node(ModificationNode::Chain(children))
            }
            node => Self::from_node(ModificationNode::Chain(vec![node, next.node])),
        }
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        self.node.is_nothing()
    }
}

impl<T> Clone for Modification<T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<T> std::fmt::Debug for Modification<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Modification").field(&self.node).finish()
    }
}

impl<T> PartialEq for Modification<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Modification<T> {}
