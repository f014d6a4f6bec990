//! Predicates selecting members by name or signature.
//!
//! A predicate always has a match test. It may also act as a tie-breaker
//! (`BestMatch`) when several members match, or as a post-processor
//! (`MemberFilter`) of the whole matched set. Predicates are identified by a
//! `PredicateId` so two independently built predicates with the same
//! configuration share cached resolutions.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::MemberResult;
use crate::member::{Member, MemberRef};
use crate::types::TypeRef;
use crate::value::Value;

/// Identity of a predicate: what kind it is and how it is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredicateId {
    pub kind: &'static str,
    pub config: String,
}

impl PredicateId {
    pub fn new(kind: &'static str, config: impl Into<String>) -> Self {
        PredicateId {
            kind,
            config: config.into(),
        }
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.config)
    }
}

/// A test over members.
pub trait MemberPredicate: Send + Sync {
    fn matches(&self, member: &Member) -> bool;

    fn id(&self) -> PredicateId;

    /// Tie-breaker used when several members match.
    fn as_best_match(&self) -> Option<&dyn BestMatch> {
        None
    }

    /// Post-processor of the non-empty matched set.
    fn as_filter(&self) -> Option<&dyn MemberFilter> {
        None
    }
}

/// Chooses one member among several matches.
pub trait BestMatch {
    /// `candidates` holds at least two members, in locator order.
    fn best_match(&self, owner: &TypeRef, candidates: &[MemberRef]) -> MemberResult<MemberRef>;
}

/// Rewrites the matched set once after scanning.
pub trait MemberFilter {
    fn filter(&self, matched: Vec<MemberRef>) -> Vec<MemberRef>;
}

/// Shared predicate handle. Equality and hashing use the predicate id.
#[derive(Clone)]
pub struct Predicate(Arc<dyn MemberPredicate>);

impl Predicate {
    pub fn new(predicate: impl MemberPredicate + 'static) -> Self {
        Predicate(Arc::new(predicate))
    }

    /// Members named exactly `name`.
    pub fn is_equal(name: impl Into<String>) -> Self {
        let name = name.into();
        Predicate::new(NameTest {
            kind: "is_equal",
            text: name,
            test: |name, text| name == text,
        })
    }

    /// Members whose name starts with `prefix`.
    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Predicate::new(NameTest {
            kind: "starts_with",
            text: prefix.into(),
            test: |name, text| name.starts_with(text),
        })
    }

    /// Members whose name ends with `suffix`.
    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Predicate::new(NameTest {
            kind: "ends_with",
            text: suffix.into(),
            test: |name, text| name.ends_with(text),
        })
    }

    /// A predicate from a closure. `label` is its identity: closures with
    /// different behavior must use different labels.
    pub fn from_fn<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Member) -> bool + Send + Sync + 'static,
    {
        Predicate::new(FnPredicate {
            label: label.into(),
            test: Box::new(test),
        })
    }

    /// Matches like `inner`, then keeps only the first member of each name.
    pub fn first_of_each_name(inner: Predicate) -> Self {
        Predicate::new(FirstOfEachName { inner })
    }

    pub fn matches(&self, member: &Member) -> bool {
        self.0.matches(member)
    }

    pub fn id(&self) -> PredicateId {
        self.0.id()
    }

    pub fn as_best_match(&self) -> Option<&dyn BestMatch> {
        self.0.as_best_match()
    }

    pub fn as_filter(&self) -> Option<&dyn MemberFilter> {
        self.0.as_filter()
    }

    /// Cache key part for this predicate.
    pub(crate) fn key_part(&self) -> Value {
        let id = self.id();
        Value::Tuple(vec![Value::from(id.kind), Value::Str(id.config)])
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.id())
    }
}

impl From<&str> for Predicate {
    fn from(name: &str) -> Self {
        Predicate::is_equal(name)
    }
}

impl From<String> for Predicate {
    fn from(name: String) -> Self {
        Predicate::is_equal(name)
    }
}

impl From<&Predicate> for Predicate {
    fn from(predicate: &Predicate) -> Self {
        predicate.clone()
    }
}

// ========== Builtin predicates ==========

struct NameTest {
    kind: &'static str,
    text: String,
    test: fn(&str, &str) -> bool,
}

impl MemberPredicate for NameTest {
    fn matches(&self, member: &Member) -> bool {
        (self.test)(member.name(), &self.text)
    }

    fn id(&self) -> PredicateId {
        PredicateId::new(self.kind, self.text.clone())
    }
}

struct FnPredicate {
    label: String,
    test: Box<dyn Fn(&Member) -> bool + Send + Sync>,
}

impl MemberPredicate for FnPredicate {
    fn matches(&self, member: &Member) -> bool {
        (self.test)(member)
    }

    fn id(&self) -> PredicateId {
        PredicateId::new("fn", self.label.clone())
    }
}

struct FirstOfEachName {
    inner: Predicate,
}

impl MemberPredicate for FirstOfEachName {
    fn matches(&self, member: &Member) -> bool {
        self.inner.matches(member)
    }

    fn id(&self) -> PredicateId {
        PredicateId::new("first_of_each_name", self.inner.id().to_string())
    }

    fn as_filter(&self) -> Option<&dyn MemberFilter> {
        Some(self)
    }
}

impl MemberFilter for FirstOfEachName {
    fn filter(&self, matched: Vec<MemberRef>) -> Vec<MemberRef> {
        let mut seen = HashSet::new();
        matched
            .into_iter()
            .filter(|m| seen.insert(m.name().to_string()))
            .collect()
    }
}
