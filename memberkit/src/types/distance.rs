//! Relatedness score between two types.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use super::indexer::Indexer;
use super::lineage::{is_assignable_from, lineage};
use super::type_info::TypeRef;

/// A relatedness score. `Infinite` orders after every finite score and
/// absorbs every addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Finite(i64),
    Infinite,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0);

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn value(self) -> Option<i64> {
        match self {
            Distance::Finite(v) => Some(v),
            Distance::Infinite => None,
        }
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, other: Distance) -> Distance {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => {
                a.checked_add(b).map_or(Distance::Infinite, Distance::Finite)
            }
            _ => Distance::Infinite,
        }
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Distance>>(iter: I) -> Distance {
        iter.fold(Distance::ZERO, Add::add)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(v) => write!(f, "{}", v),
            Distance::Infinite => write!(f, "inf"),
        }
    }
}

/// Distance between `a` and `b` in the lineage of the more specific one.
///
/// The score is `position(parent) - position(child)` inside `lineage(child)`,
/// where a type missing from the lineage sits at position -1. The child is
/// never part of its own lineage, so a direct capability-set scores 1 and a
/// root class compared with a capability-set scores 0. A primitive paired
/// with a non-primitive is replaced by its boxed type first.
pub fn distance(a: Option<&TypeRef>, b: Option<&TypeRef>) -> Distance {
    let (Some(a), Some(b)) = (a, b) else {
        return Distance::Infinite;
    };
    let (a, b) = normalize_primitive(a, b);
    if a == b {
        return Distance::ZERO;
    }

    let (parent, child) = if is_assignable_from(&a, &b) {
        (a, b)
    } else if is_assignable_from(&b, &a) {
        (b, a)
    } else {
        return Distance::Infinite;
    };

    let indexer = Indexer::new(&lineage(&child));
    Distance::Finite(position(&indexer, &parent) - position(&indexer, &child))
}

fn position(indexer: &Indexer<TypeRef>, ty: &TypeRef) -> i64 {
    indexer.index_of(ty).map_or(-1, |p| p as i64)
}

fn normalize_primitive(a: &TypeRef, b: &TypeRef) -> (TypeRef, TypeRef) {
    match (a.boxed(), b.boxed()) {
        (Some(boxed), None) => (boxed.clone(), b.clone()),
        (None, Some(boxed)) => (a.clone(), boxed.clone()),
        _ => (a.clone(), b.clone()),
    }
}
