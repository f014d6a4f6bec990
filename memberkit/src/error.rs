//! Error types for member lookup and invocation.

use thiserror::Error;

/// Result alias used by the lookup and execute entry points.
pub type MemberResult<T> = Result<T, MemberError>;

/// Failure raised by a member body or by the invocation wrapper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// The member body reported an error.
    #[error("{0}")]
    Raised(String),

    /// The host refused access to the member.
    #[error("AccessDenied: {0}")]
    AccessDenied(String),

    /// Wrong arity or argument values the member cannot accept.
    #[error("ArgumentError: {0}")]
    IllegalArgument(String),

    /// A fault raised by code the member delegated to.
    /// The invocation wrapper unwraps exactly one level of this.
    #[error("{0}")]
    InvocationTarget(Box<Fault>),

    /// The member body panicked.
    #[error("panic: {0}")]
    Panicked(String),
}

impl Fault {
    pub fn raised(message: impl Into<String>) -> Self {
        Fault::Raised(message.into())
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Fault::IllegalArgument(message.into())
    }

    /// Wrap a fault the way a delegating member reports it.
    pub fn wrapped(inner: Fault) -> Self {
        Fault::InvocationTarget(Box::new(inner))
    }
}

/// Errors of the lookup and execute entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemberError {
    /// An execute variant found no member.
    #[error("MemberError: no member matching {description} for arguments ({args}) in {target}")]
    NoSuchMember {
        description: String,
        target: String,
        args: String,
    },

    /// Several members matched and the predicate cannot break the tie.
    #[error("MemberError: ambiguous member in {type_name}; predicate {predicate} cannot choose between candidates")]
    DuplicateCandidates {
        type_name: String,
        predicate: String,
    },

    /// The resolved member failed while executing.
    #[error("MemberError: error while executing {member}({args}) in {target}: {cause}")]
    Execution {
        member: String,
        target: String,
        args: String,
        #[source]
        cause: Fault,
    },

    /// A required argument was `Nothing`.
    #[error("ArgumentError: {name} must not be nothing")]
    MissingArgument { name: String },

    /// `validate_member_name` found no public member with the name.
    #[error("MemberError: {type_name} has no public member named {name}")]
    UnknownMemberName { name: String, type_name: String },
}

impl MemberError {
    /// The fault behind an `Execution` error.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            MemberError::Execution { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
