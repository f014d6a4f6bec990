//! Member lookup by predicate.

use crate::error::{MemberError, MemberResult};
use crate::member::MemberRef;
use crate::predicate::Predicate;
use crate::types::{public_members, TypeRef};

/// The public members of a type that satisfy a predicate.
///
/// The scan happens once, on construction. If the predicate is a filter, the
/// non-empty matched set is passed through it exactly once.
#[derive(Debug)]
pub struct MemberLocator {
    owner: TypeRef,
    predicate: Predicate,
    matches: Vec<MemberRef>,
}

impl MemberLocator {
    pub fn new(owner: &TypeRef, predicate: impl Into<Predicate>) -> Self {
        let predicate = predicate.into();
        let mut matches: Vec<MemberRef> = public_members(owner)
            .into_iter()
            .filter(|member| predicate.matches(member))
            .collect();
        if !matches.is_empty() {
            if let Some(filter) = predicate.as_filter() {
                matches = filter.filter(matches);
            }
        }
        tracing::trace!(
            owner = %owner,
            predicate = %predicate,
            matched = matches.len(),
            "scanned members"
        );
        MemberLocator {
            owner: owner.clone(),
            predicate,
            matches,
        }
    }

    /// Every matching member, in enumeration order.
    pub fn all_matches(&self) -> &[MemberRef] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn owner(&self) -> &TypeRef {
        &self.owner
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The single best member.
    ///
    /// `Ok(None)` when nothing matched. Several matches are resolved by the
    /// predicate's tie-breaker; without one they are ambiguous.
    pub fn best_match(&self) -> MemberResult<Option<MemberRef>> {
        match self.matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only.clone())),
            several => match self.predicate.as_best_match() {
                Some(chooser) => chooser.best_match(&self.owner, several).map(Some),
                None => Err(MemberError::DuplicateCandidates {
                    type_name: self.owner.name().to_string(),
                    predicate: self.predicate.to_string(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TieBreak;
    use crate::error::Fault;
    use crate::member::Member;
    use crate::resolve::{ArgShape, SignaturePredicate};
    use crate::types::{builtins, TypeInfo};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn noop(_: &Value, _: &[Value]) -> Result<Value, Fault> {
        Ok(Value::Nothing)
    }

    fn shapes() -> TypeRef {
        let shape = TypeInfo::class("Shape").build();
        shape.declare(Member::new("area", vec![], noop));
        shape.declare(Member::new("scale", vec![builtins::number()], noop));
        shape.declare(Member::new("scale", vec![builtins::int64()], noop));
        shape.declare(Member::new("get_name", vec![], noop));
        shape.declare(Member::new("get_kind", vec![], noop));
        shape.declare(Member::new("get_secret", vec![], noop).restricted());
        shape
    }

    fn signatures(members: &[MemberRef]) -> Vec<String> {
        members.iter().map(|m| m.signature()).collect()
    }

    #[test]
    fn test_all_matches_in_declaration_order() {
        let locator = MemberLocator::new(&shapes(), Predicate::starts_with("get_"));
        assert_eq!(
            signatures(locator.all_matches()),
            vec!["get_name()", "get_kind()"]
        );
        assert_eq!(locator.match_count(), 2);
    }

    #[test]
    fn test_best_match_none_and_single() {
        let shape = shapes();
        assert!(MemberLocator::new(&shape, "missing")
            .best_match()
            .unwrap()
            .is_none());
        let area = MemberLocator::new(&shape, "area").best_match().unwrap();
        assert_eq!(area.map(|m| m.to_string()), Some("Shape.area()".to_string()));
    }

    #[test]
    fn test_several_matches_without_tie_breaker_are_ambiguous() {
        let err = MemberLocator::new(&shapes(), "scale")
            .best_match()
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"MemberError: ambiguous member in Shape; predicate is_equal(scale) cannot choose between candidates");
    }

    #[test]
    fn test_tie_breaker_picks_closest_overload() {
        let predicate = Predicate::new(SignaturePredicate::new(
            Predicate::is_equal("scale"),
            ArgShape::One(Some(builtins::int64())),
            TieBreak::Declaration,
        ));
        let best = MemberLocator::new(&shapes(), predicate).best_match().unwrap();
        assert_eq!(best.map(|m| m.signature()), Some("scale(Int64)".to_string()));
    }

    #[test]
    fn test_restricted_members_are_invisible() {
        let locator = MemberLocator::new(&shapes(), "get_secret");
        assert_eq!(locator.match_count(), 0);
    }

    #[test]
    fn test_filter_runs_once_on_matches() {
        let predicate = Predicate::first_of_each_name(Predicate::starts_with("s"));
        let locator = MemberLocator::new(&shapes(), predicate);
        assert_eq!(signatures(locator.all_matches()), vec!["scale(Number)"]);
        assert_eq!(
            locator.best_match().unwrap().map(|m| m.signature()),
            Some("scale(Number)".to_string())
        );
    }

    #[test]
    fn test_inherited_members_are_found() {
        let shape = shapes();
        let circle = TypeInfo::class("Circle").extends(&shape).build();
        circle.declare(Member::new("area", vec![], noop));
        let locator = MemberLocator::new(&circle, "area");
        assert_eq!(
            locator.all_matches().iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            vec!["Circle.area()"]
        );
        let inherited = MemberLocator::new(&circle, "get_name").best_match().unwrap();
        assert_eq!(inherited.map(|m| m.to_string()), Some("Shape.get_name()".to_string()));
    }
}
