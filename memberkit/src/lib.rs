//! memberkit: late-bound member lookup over host-supplied type metadata.
//!
//! The host describes its types ([`types::TypeInfo`]) and their callable
//! members ([`member::Member`]). Lookups select members by predicate and
//! argument shape, rank overloads by type distance, cache the resolution per
//! thread and invoke the result with every failure mapped to a
//! [`error::MemberError`].
//!
//! ```
//! use memberkit::prelude::*;
//!
//! let len = execute("length", &Value::from("hello")).unwrap();
//! assert_eq!(len, Value::I64(5));
//! ```

// Library code logs through `tracing`, never straight to stderr.
#![deny(clippy::print_stderr)]

// Core modules
pub mod error;
pub mod member;
pub mod predicate;
pub mod types;
pub mod value;

// Resolution and invocation
pub mod execute;
pub mod locator;
pub mod resolve;

// Configuration
pub mod config;

// Static entry points
pub mod api;

pub use memberkit_cache as cache;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{
        clear_member_cache, execute, execute_if_present, execute_if_present_with_arg,
        execute_if_present_with_args, execute_with_arg, execute_with_args, find, find_all,
        find_all_for, find_for, find_for_with_arg, find_for_with_args, find_with_arg,
        find_with_args, invoke, validate_member_name,
    };
    pub use crate::config::{Config, ConfigError, TieBreak};
    pub use crate::error::{Fault, MemberError, MemberResult};
    pub use crate::locator::MemberLocator;
    pub use crate::member::{Member, MemberRef, Visibility};
    pub use crate::predicate::{BestMatch, MemberFilter, MemberPredicate, Predicate, PredicateId};
    pub use crate::resolve::{best_fit, best_fit_all, ArgShape, SignaturePredicate};
    pub use crate::types::{builtins, Distance, TypeInfo, TypeKind, TypeRef};
    pub use crate::value::{ensure_present, Object, ObjectRef, Value};
}

pub use prelude::*;
