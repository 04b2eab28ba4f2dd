use crate::{
    condition::{ConditionNode, eval},
    model::FieldType,
    modification::ModificationNode,
    modification::apply::field_ty,
    modification::simplify::simplify,
    path::PathStep,
};

/// Whether a modification potentially writes the sub-record under `path`:
/// true when it touches an ancestor of, the exact target of, or a
/// descendant of the path. Permission layers use this to gate updates.
#[must_use]
pub fn affects(modification: &ModificationNode, path: &[PathStep]) -> bool {
    match modification {
        ModificationNode::Nothing => false,

        ModificationNode::Chain(children) => {
            children.iter().any(|child| affects(child, path))
        }

        ModificationNode::IfNotNull(inner) => {
            // Null narrowing is transparent to write extent.
            let rest = match path.first() {
                Some(PathStep::NotNull) => &path[1..],
                _ => path,
            };
            affects(inner, rest)
        }

        ModificationNode::OnField {
            field,
            modification,
        } => match path.first() {
            // The path targets this record or something above it; a field
            // write is a descendant write.
            None => true,
            Some(PathStep::Field { name, .. }) => {
                name == field && affects(modification, &path[1..])
            }
            Some(PathStep::NotNull) => affects(modification, &path[1..]),
            Some(_) => false,
        },

        ModificationNode::ListPerElement { modification, .. }
        | ModificationNode::SetPerElement { modification, .. } => match path.first() {
            None => true,
            Some(PathStep::ListElements | PathStep::SetElements) => {
                affects(modification, &path[1..])
            }
            Some(PathStep::NotNull) => affects(modification, &path[1..]),
            Some(PathStep::Field { .. }) => false,
        },

        // Every remaining variant writes the value at the current node,
        // an ancestor-or-equal of whatever the path still addresses.
        _ => true,
    }
}

/// Best-effort static check: does `condition` hold on the output of this
/// modification regardless of input? Sound but incomplete; anything not
/// dominated by an assignment answers `false`.
#[must_use]
pub fn guaranteed_after(
    modification: &ModificationNode,
    condition: &ConditionNode,
    ty: &FieldType,
) -> bool {
    let simplified = simplify(modification, ty);
    guaranteed(&simplified, condition, ty)
}

fn guaranteed(
    modification: &ModificationNode,
    condition: &ConditionNode,
    ty: &FieldType,
) -> bool {
    match condition {
        ConditionNode::Always => return true,
        ConditionNode::And(children) => {
            return children
                .iter()
                .all(|child| guaranteed(modification, child, ty));
        }
        _ => {}
    }

    match (modification, condition) {
        (ModificationNode::Assign(value), _) => {
            eval(condition, value, ty).unwrap_or(false)
        }

        (
            ModificationNode::OnField {
                field,
                modification: inner,
            },
            ConditionNode::OnField {
                field: wanted,
                condition: inner_condition,
            },
        ) if field == wanted => {
            guaranteed(inner, inner_condition, &field_ty(ty, field))
        }

        (
            ModificationNode::Chain(children),
            ConditionNode::OnField { field: wanted, .. },
        ) => {
            // After simplification a chain has no top-level Assign; only a
            // chain made purely of field writes is analyzable, and the
            // last write to the wanted field decides.
            if !children
                .iter()
                .all(|child| matches!(child, ModificationNode::OnField { .. }))
            {
                return false;
            }

            children
                .iter()
                .rev()
                .find_map(|child| match child {
                    ModificationNode::OnField { field, .. } if field == wanted => {
                        Some(guaranteed(child, condition, ty))
                    }
                    _ => None,
                })
                .unwrap_or(false)
        }

        _ => false,
    }
}
