use crate::{
    model::FieldType,
    modification::ModificationNode,
    modification::apply::{apply, element_ty, field_ty, map_value_ty},
};

/// Normalize a modification while preserving its `apply` semantics.
///
/// Rules, applied bottom-up:
/// - nested chains are flattened and identity children discarded;
/// - an `Assign` dominates: everything before the last `Assign` is
///   dropped, and subsequent modifications are folded into the assigned
///   value eagerly;
/// - sibling `OnField` runs are grouped by field, and each group's
///   combined chain is simplified recursively;
/// - per-element and per-key variants are simplified in place.
#[must_use]
pub fn simplify(modification: &ModificationNode, ty: &FieldType) -> ModificationNode {
    match modification {
        ModificationNode::Chain(children) => {
            let mut flat = Vec::with_capacity(children.len());
            flatten_into(children, ty, &mut flat);
            simplify_chain(flat, ty)
        }

        ModificationNode::IfNotNull(inner) => ModificationNode::IfNotNull(Box::new(
            simplify(inner, ty.unwrap_option()),
        )),

        ModificationNode::OnField {
            field,
            modification,
        } => ModificationNode::OnField {
            field: field.clone(),
            modification: Box::new(simplify(modification, &field_ty(ty, field))),
        },

        ModificationNode::ListPerElement {
            condition,
            modification,
        } => ModificationNode::ListPerElement {
            condition: condition.clone(),
            modification: Box::new(simplify(modification, element_ty(ty))),
        },
        ModificationNode::SetPerElement {
            condition,
            modification,
        } => ModificationNode::SetPerElement {
            condition: condition.clone(),
            modification: Box::new(simplify(modification, element_ty(ty))),
        },

        ModificationNode::ModifyByKey(entries) => ModificationNode::ModifyByKey(
            entries
                .iter()
                .map(|(key, inner)| (key.clone(), simplify(inner, map_value_ty(ty))))
                .collect(),
        ),

        other => other.clone(),
    }
}

/// Recursively flatten chain children, dropping identities.
fn flatten_into(children: &[ModificationNode], ty: &FieldType, out: &mut Vec<ModificationNode>) {
    for child in children {
        match simplify(child, ty) {
            ModificationNode::Nothing => {}
            ModificationNode::Chain(nested) => out.extend(nested),
            simplified => out.push(simplified),
        }
    }
}

fn simplify_chain(children: Vec<ModificationNode>, ty: &FieldType) -> ModificationNode {
    // Assign dominance: drop everything before the last Assign and fold
    // what follows into the assigned value. Folding is safe because
    // modifications are pure; it stops at the first non-applicable step.
    let last_assign = children
        .iter()
        .rposition(|child| matches!(child, ModificationNode::Assign(_)));

    if let Some(at) = last_assign {
        let ModificationNode::Assign(seed) = &children[at] else {
            unreachable!("rposition matched Assign");
        };

        let mut assigned = seed.clone();
        let mut remaining = Vec::new();
        let mut folding = true;
        for child in &children[at + 1..] {
            if folding {
                match apply(child, &assigned, ty) {
                    Ok(next) => {
                        assigned = next;
                        continue;
                    }
                    Err(_) => folding = false,
                }
            }
            remaining.push(child.clone());
        }

        if remaining.is_empty() {
            return ModificationNode::Assign(assigned);
        }

        let mut out = vec![ModificationNode::Assign(assigned)];
        out.extend(remaining);
        return ModificationNode::Chain(out);
    }

    let children = group_on_field_runs(children, ty);

    match children.len() {
        0 => ModificationNode::Nothing,
        1 => children.into_iter().next().unwrap_or(ModificationNode::Nothing),
        _ => ModificationNode::Chain(children),
    }
}

/// Group maximal runs of sibling `OnField` children by field name.
///
/// Disjoint fields commute, so merging within a run preserves order of
/// effect; non-`OnField` children act as barriers.
fn group_on_field_runs(
    children: Vec<ModificationNode>,
    ty: &FieldType,
) -> Vec<ModificationNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<(String, Vec<ModificationNode>)> = Vec::new();

    let flush = |run: &mut Vec<(String, Vec<ModificationNode>)>,
                 out: &mut Vec<ModificationNode>| {
        for (field, mut inners) in run.drain(..) {
            let inner_ty = field_ty(ty, &field);
            let inner = if inners.len() == 1 {
                inners.remove(0)
            } else {
                simplify(&ModificationNode::Chain(inners), &inner_ty)
            };
            out.push(ModificationNode::OnField {
                field,
                modification: Box::new(inner),
            });
        }
    };

    for child in children {
        match child {
            ModificationNode::OnField {
                field,
                modification,
            } => {
                if let Some((_, inners)) = run.iter_mut().find(|(name, _)| *name == field) {
                    inners.push(*modification);
                } else {
                    run.push((field, vec![*modification]));
                }
            }
            other => {
                flush(&mut run, &mut out);
                out.push(other);
            }
        }
    }
    flush(&mut run, &mut out);

    out
}
