//! Overload resolution by type distance.
//!
//! Candidates are scored by how far their parameter types are from the
//! desired argument types; the lowest score wins and the first candidate
//! wins ties. Candidate order is the locator's enumeration order (own members
//! in declaration order, then inherited members in lineage order), so ties
//! depend on how the host declared its members. `TieBreak::Lexicographic`
//! replaces that order with a sort by name and parameter type names.

use std::fmt;

use crate::config::TieBreak;
use crate::error::{MemberError, MemberResult};
use crate::member::{Member, MemberRef};
use crate::predicate::{BestMatch, MemberPredicate, Predicate, PredicateId};
use crate::types::{compatible, distance, Distance, TypeRef};
use crate::value::Value;

/// Candidate closest to `desired` by its first parameter.
///
/// Zero-parameter candidates score infinite and lose every tie against a
/// candidate with parameters. Returns the first candidate when nothing is
/// related, `None` only for an empty list.
pub fn best_fit(candidates: &[MemberRef], desired: Option<&TypeRef>) -> Option<MemberRef> {
    candidates
        .iter()
        .min_by_key(|candidate| match candidate.params().first() {
            Some(param) => (distance(desired, Some(param)), false),
            None => (Distance::Infinite, true),
        })
        .cloned()
}

/// Candidate whose parameters are closest to `desired`, position by position.
///
/// The score is the saturating sum of per-position distances; a candidate
/// with a different parameter count scores infinite.
pub fn best_fit_all(candidates: &[MemberRef], desired: &[Option<TypeRef>]) -> Option<MemberRef> {
    candidates
        .iter()
        .min_by_key(|candidate| score(candidate, desired))
        .cloned()
}

fn score(candidate: &Member, desired: &[Option<TypeRef>]) -> Distance {
    if candidate.param_count() != desired.len() {
        return Distance::Infinite;
    }
    candidate
        .params()
        .iter()
        .zip(desired)
        .map(|(param, arg)| distance(Some(param), arg.as_ref()))
        .sum()
}

/// Candidates in the order the tie-break asks for.
pub fn ordered(candidates: &[MemberRef], tie_break: TieBreak) -> Vec<MemberRef> {
    let mut ordered = candidates.to_vec();
    if tie_break == TieBreak::Lexicographic {
        // stable: equal keys keep their enumeration order
        ordered.sort_by(|a, b| {
            let params = |m: &Member| -> Vec<String> {
                m.params().iter().map(|p| p.name().to_string()).collect()
            };
            a.name()
                .cmp(b.name())
                .then_with(|| params(a).cmp(&params(b)))
        });
    }
    ordered
}

/// Argument shape a lookup is constrained to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgShape {
    /// No arguments: only zero-parameter members match.
    None,
    /// One argument of the given type; `None` is an unknown type.
    One(Option<TypeRef>),
    /// Explicit argument list; `None` entries are unknown types.
    Many(Vec<Option<TypeRef>>),
}

impl ArgShape {
    fn fits(&self, member: &Member) -> bool {
        match self {
            ArgShape::None => member.param_count() == 0,
            ArgShape::One(arg) => {
                member.param_count() == 1 && compatible(&member.params()[0], arg.as_ref())
            }
            ArgShape::Many(args) => {
                member.param_count() == args.len()
                    && member
                        .params()
                        .iter()
                        .zip(args)
                        .all(|(param, arg)| compatible(param, arg.as_ref()))
            }
        }
    }

    /// Cache key parts: a shape tag followed by the argument types.
    pub(crate) fn key_parts(&self) -> Vec<Value> {
        let as_value = |t: &Option<TypeRef>| t.clone().map_or(Value::Nothing, Value::Type);
        match self {
            ArgShape::None => vec![Value::from("none")],
            ArgShape::One(arg) => vec![Value::from("one"), as_value(arg)],
            ArgShape::Many(args) => {
                let mut parts = vec![Value::from("many")];
                parts.extend(args.iter().map(as_value));
                parts
            }
        }
    }
}

impl fmt::Display for ArgShape {
    /// The argument types as written in a signature; unknown types show as `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |t: &Option<TypeRef>| t.as_ref().map_or("?", |t| t.name()).to_string();
        let names: Vec<String> = match self {
            ArgShape::None => Vec::new(),
            ArgShape::One(arg) => vec![name(arg)],
            ArgShape::Many(args) => args.iter().map(name).collect(),
        };
        write!(f, "{}", names.join(", "))
    }
}

/// A caller's predicate constrained to an argument shape, breaking ties by
/// type distance.
pub struct SignaturePredicate {
    inner: Predicate,
    shape: ArgShape,
    tie_break: TieBreak,
}

impl SignaturePredicate {
    pub fn new(inner: Predicate, shape: ArgShape, tie_break: TieBreak) -> Self {
        SignaturePredicate {
            inner,
            shape,
            tie_break,
        }
    }

    pub fn inner(&self) -> &Predicate {
        &self.inner
    }

    pub fn shape(&self) -> &ArgShape {
        &self.shape
    }
}

impl MemberPredicate for SignaturePredicate {
    fn matches(&self, member: &Member) -> bool {
        self.inner.matches(member) && self.shape.fits(member)
    }

    fn id(&self) -> PredicateId {
        let shape = match &self.shape {
            ArgShape::None => "none".to_string(),
            other => format!("({})", other),
        };
        PredicateId::new("signature", format!("{}/{}/{}", self.inner.id(), shape, self.tie_break))
    }

    fn as_best_match(&self) -> Option<&dyn BestMatch> {
        Some(self)
    }
}

impl BestMatch for SignaturePredicate {
    fn best_match(&self, owner: &TypeRef, candidates: &[MemberRef]) -> MemberResult<MemberRef> {
        let duplicate = || MemberError::DuplicateCandidates {
            type_name: owner.name().to_string(),
            predicate: self.inner.to_string(),
        };
        let candidates = ordered(candidates, self.tie_break);
        let chosen = match &self.shape {
            ArgShape::None => return Err(duplicate()),
            ArgShape::One(arg) => best_fit(&candidates, arg.as_ref()),
            ArgShape::Many(args) => best_fit_all(&candidates, args),
        };
        chosen.ok_or_else(duplicate)
    }
}

impl fmt::Debug for SignaturePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignaturePredicate")
            .field("inner", &self.inner)
            .field("shape", &self.shape)
            .field("tie_break", &self.tie_break)
            .finish()
    }
}
