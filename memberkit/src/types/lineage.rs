//! Type lineage and the relations derived from it.
//!
//! The lineage of a type lists every capability-set and ancestor reachable
//! from it, excluding the type itself: first the directly declared
//! capability-sets and their parents level by level, then the concrete
//! ancestor followed by its own lineage. Duplicates keep their first
//! position.

use std::collections::HashSet;

use super::builtins;
use super::type_info::TypeRef;
use crate::member::MemberRef;
use crate::value::Value;

/// Every capability-set and ancestor of `ty`, in lineage order.
pub fn lineage(ty: &TypeRef) -> Vec<TypeRef> {
    let mut result = vec![ty.clone()];

    // Breadth-first over capability-sets; `result` grows while we walk it.
    let mut i = 0;
    while i < result.len() {
        let declared = result[i].capability_sets().to_vec();
        result.extend(declared);
        i += 1;
    }

    if let Some(parent) = ty.superclass() {
        result.push(parent.clone());
        result.extend(lineage(parent));
    }

    let mut seen = HashSet::with_capacity(result.len());
    result.retain(|t| seen.insert(t.clone()));
    result.retain(|t| t != ty);
    result
}

/// Whether a value of type `child` can be used where `parent` is expected.
///
/// The builtin `Any` accepts every non-primitive type, capability-sets
/// included. Any other root class only accepts its own descendants.
pub fn is_assignable_from(parent: &TypeRef, child: &TypeRef) -> bool {
    if parent == child {
        return true;
    }
    if *parent == builtins::any() && !child.is_primitive() {
        return true;
    }
    lineage(child).contains(parent)
}

/// Whether an argument of type `arg` fits a parameter of type `param`.
///
/// An unknown argument type fits any parameter. A primitive parameter also
/// accepts its boxed counterpart.
pub fn compatible(param: &TypeRef, arg: Option<&TypeRef>) -> bool {
    let Some(arg) = arg else {
        return true;
    };
    if is_assignable_from(param, arg) {
        return true;
    }
    param.boxed().is_some_and(|boxed| boxed == arg)
}

/// Whether `value` fits a parameter of type `ty`. `Nothing` fits anything.
pub fn compatible_with_value(ty: &TypeRef, value: &Value) -> bool {
    compatible(ty, value.runtime_type().as_ref())
}

/// The most specific type shared by `a` and `b`.
///
/// Candidates are `a` followed by its lineage, in lineage order; the first one
/// that is `b` or in `b`'s lineage wins. Capability-sets from `a`'s lineage
/// are skipped unless `allow_capability_sets` is set. Falls back to `Any`.
pub fn common_supertype(
    a: Option<&TypeRef>,
    b: Option<&TypeRef>,
    allow_capability_sets: bool,
) -> TypeRef {
    let (a, b) = match (a, b) {
        (None, None) => return builtins::any(),
        (None, Some(b)) => return b.clone(),
        (Some(a), None) => return a.clone(),
        (Some(a), Some(b)) => (a, b),
    };
    if a == b {
        return a.clone();
    }

    let mut of_b: HashSet<TypeRef> = lineage(b).into_iter().collect();
    of_b.insert(b.clone());

    std::iter::once(a.clone())
        .chain(
            lineage(a)
                .into_iter()
                .filter(|t| allow_capability_sets || !t.is_capability_set()),
        )
        .find(|t| of_b.contains(t))
        .unwrap_or_else(builtins::any)
}

/// Public members of `ty` and its lineage.
///
/// Members declared by `ty` come first in declaration order, then inherited
/// members in lineage order. An inherited member whose signature was already
/// seen is skipped.
pub fn public_members(ty: &TypeRef) -> Vec<MemberRef> {
    let mut members: Vec<MemberRef> = Vec::new();
    let owners = std::iter::once(ty.clone()).chain(lineage(ty));
    for owner in owners {
        for member in owner.declared_members() {
            if !member.is_public() {
                continue;
            }
            if members.iter().any(|m| m.same_signature(&member)) {
                continue;
            }
            members.push(member);
        }
    }
    members
}
