//! Static lookup and execute entry points.
//!
//! Every `find*` function accepts anything convertible into a [`Predicate`];
//! a plain `&str` or `String` selects members by exact name. Lookups are
//! constrained to an argument shape:
//!
//! - `find` / `execute`: zero-parameter members only; several of them are
//!   ambiguous
//! - `*_with_arg`: one parameter compatible with the argument type
//! - `*_with_args`: as many parameters as arguments, each compatible
//!
//! Overloads that fit the shape are ranked by type distance.
//!
//! Resolutions, including "nothing found", are cached per thread (no locking
//! between threads). The cache is rebuilt after a configuration reload; it
//! does not notice members declared after a lookup, so call
//! [`clear_member_cache`] after extending a type that was already searched.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use memberkit_cache::{BoundedCache, CacheKey};

use crate::config::{self, TieBreak};
use crate::error::{MemberError, MemberResult};
use crate::execute::render_args;
use crate::locator::MemberLocator;
use crate::member::MemberRef;
use crate::predicate::Predicate;
use crate::resolve::{ArgShape, SignaturePredicate};
use crate::types::{public_members, TypeRef};
use crate::value::{ensure_present, types_of, Value};

pub use crate::execute::invoke;

/// Per-thread resolution cache, tied to one configuration generation.
struct MemberCache {
    generation: u64,
    tie_break: TieBreak,
    entries: BoundedCache<CacheKey<Value>, Option<MemberRef>>,
}

thread_local! {
    static MEMBER_CACHE: RefCell<Option<Rc<MemberCache>>> = const { RefCell::new(None) };
}

fn member_cache() -> Rc<MemberCache> {
    let generation = config::generation();
    MEMBER_CACHE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(cache) = slot.as_ref().filter(|c| c.generation == generation) {
            return Rc::clone(cache);
        }
        let config = config::current();
        let cache = Rc::new(MemberCache {
            generation,
            tie_break: config.tie_break,
            entries: BoundedCache::new(config.member_cache_capacity, Duration::MAX),
        });
        *slot = Some(Rc::clone(&cache));
        cache
    })
}

/// Drop every cached resolution of the current thread.
pub fn clear_member_cache() {
    MEMBER_CACHE.with(|slot| slot.borrow_mut().take());
}

/// Number of resolutions cached on the current thread.
pub fn member_cache_len() -> usize {
    MEMBER_CACHE.with(|slot| slot.borrow().as_ref().map_or(0, |c| c.entries.len()))
}

fn resolve(predicate: Predicate, owner: &TypeRef, shape: ArgShape) -> MemberResult<Option<MemberRef>> {
    // The cache handle is cloned out so a predicate may itself call back into the API.
    let cache = member_cache();
    let mut parts = vec![predicate.key_part(), Value::Type(owner.clone())];
    parts.extend(shape.key_parts());
    let key = CacheKey::build(&parts);

    if let Some(found) = cache.entries.get(&key) {
        tracing::trace!(owner = %owner, predicate = %predicate, "member cache hit");
        return Ok(found);
    }
    tracing::trace!(owner = %owner, predicate = %predicate, "member cache miss");

    let signature = SignaturePredicate::new(predicate, shape, cache.tie_break);
    let found = MemberLocator::new(owner, Predicate::new(signature)).best_match()?;
    cache.entries.put(key, found.clone());
    Ok(found)
}

fn runtime_type_of(target: &Value) -> MemberResult<TypeRef> {
    ensure_present(target, "target")?;
    target.runtime_type().ok_or_else(|| MemberError::MissingArgument {
        name: "target".to_string(),
    })
}

// ========== find ==========

/// The zero-parameter member of `owner` selected by `predicate`.
pub fn find(predicate: impl Into<Predicate>, owner: &TypeRef) -> MemberResult<Option<MemberRef>> {
    resolve(predicate.into(), owner, ArgShape::None)
}

/// The one-parameter member of `owner` that best fits `arg`. `None` is an
/// argument of unknown type.
pub fn find_with_arg(
    predicate: impl Into<Predicate>,
    owner: &TypeRef,
    arg: Option<&TypeRef>,
) -> MemberResult<Option<MemberRef>> {
    resolve(predicate.into(), owner, ArgShape::One(arg.cloned()))
}

/// The member of `owner` whose parameters best fit `args`.
pub fn find_with_args(
    predicate: impl Into<Predicate>,
    owner: &TypeRef,
    args: &[Option<TypeRef>],
) -> MemberResult<Option<MemberRef>> {
    resolve(predicate.into(), owner, ArgShape::Many(args.to_vec()))
}

/// [`find`] on the runtime type of `target`.
pub fn find_for(predicate: impl Into<Predicate>, target: &Value) -> MemberResult<Option<MemberRef>> {
    let owner = runtime_type_of(target)?;
    find(predicate, &owner)
}

/// [`find_with_arg`] on the runtime types of `target` and `arg`.
pub fn find_for_with_arg(
    predicate: impl Into<Predicate>,
    target: &Value,
    arg: &Value,
) -> MemberResult<Option<MemberRef>> {
    let owner = runtime_type_of(target)?;
    find_with_arg(predicate, &owner, arg.runtime_type().as_ref())
}

/// [`find_with_args`] on the runtime types of `target` and `args`.
pub fn find_for_with_args(
    predicate: impl Into<Predicate>,
    target: &Value,
    args: &[Value],
) -> MemberResult<Option<MemberRef>> {
    let owner = runtime_type_of(target)?;
    find_with_args(predicate, &owner, &types_of(args))
}

/// Every public member of `owner` matching `predicate`, without an argument
/// shape and without caching.
pub fn find_all(predicate: impl Into<Predicate>, owner: &TypeRef) -> Vec<MemberRef> {
    MemberLocator::new(owner, predicate).all_matches().to_vec()
}

/// [`find_all`] on the runtime type of `target`.
pub fn find_all_for(predicate: impl Into<Predicate>, target: &Value) -> MemberResult<Vec<MemberRef>> {
    let owner = runtime_type_of(target)?;
    Ok(find_all(predicate, &owner))
}

// ========== execute ==========

fn no_such_member(predicate: &Predicate, target: &Value, args: &[Value]) -> MemberError {
    MemberError::NoSuchMember {
        description: predicate.to_string(),
        target: target.to_string(),
        args: render_args(args),
    }
}

/// Find the zero-parameter member on `target` and run it.
pub fn execute(predicate: impl Into<Predicate>, target: &Value) -> MemberResult<Value> {
    let predicate = predicate.into();
    match find_for(&predicate, target)? {
        Some(member) => invoke(&member, target, &[]),
        None => Err(no_such_member(&predicate, target, &[])),
    }
}

/// Find the one-parameter member fitting `arg` on `target` and run it.
pub fn execute_with_arg(
    predicate: impl Into<Predicate>,
    target: &Value,
    arg: &Value,
) -> MemberResult<Value> {
    let predicate = predicate.into();
    let args = std::slice::from_ref(arg);
    match find_for_with_arg(&predicate, target, arg)? {
        Some(member) => invoke(&member, target, args),
        None => Err(no_such_member(&predicate, target, args)),
    }
}

/// Find the member fitting `args` on `target` and run it.
pub fn execute_with_args(
    predicate: impl Into<Predicate>,
    target: &Value,
    args: &[Value],
) -> MemberResult<Value> {
    let predicate = predicate.into();
    match find_for_with_args(&predicate, target, args)? {
        Some(member) => invoke(&member, target, args),
        None => Err(no_such_member(&predicate, target, args)),
    }
}

/// Like [`execute`], but `Ok(None)` when no member matches.
pub fn execute_if_present(
    predicate: impl Into<Predicate>,
    target: &Value,
) -> MemberResult<Option<Value>> {
    find_for(predicate, target)?
        .map(|member| invoke(&member, target, &[]))
        .transpose()
}

/// Like [`execute_with_arg`], but `Ok(None)` when no member matches.
pub fn execute_if_present_with_arg(
    predicate: impl Into<Predicate>,
    target: &Value,
    arg: &Value,
) -> MemberResult<Option<Value>> {
    find_for_with_arg(predicate, target, arg)?
        .map(|member| invoke(&member, target, std::slice::from_ref(arg)))
        .transpose()
}

/// Like [`execute_with_args`], but `Ok(None)` when no member matches.
pub fn execute_if_present_with_args(
    predicate: impl Into<Predicate>,
    target: &Value,
    args: &[Value],
) -> MemberResult<Option<Value>> {
    find_for_with_args(predicate, target, args)?
        .map(|member| invoke(&member, target, args))
        .transpose()
}

/// Return `name` if `owner` has a public member with that name.
pub fn validate_member_name<'a>(name: &'a str, owner: &TypeRef) -> MemberResult<&'a str> {
    if public_members(owner).iter().any(|m| m.name() == name) {
        return Ok(name);
    }
    Err(MemberError::UnknownMemberName {
        name: name.to_string(),
        type_name: owner.name().to_string(),
    })
}
