//! Callable members and their signatures.

use std::fmt;
use std::sync::Arc;

use crate::error::Fault;
use crate::types::TypeRef;
use crate::value::Value;

/// Callback that runs a member against a target and its arguments.
pub type Invoker = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, Fault> + Send + Sync>;

/// Shared handle to a declared member.
pub type MemberRef = Arc<Member>;

/// Who may see a member. Only public members take part in lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Restricted,
}

/// A callable member of a type: name, ordered parameter types and invoker.
///
/// Members are immutable once declared on a type with
/// [`TypeInfo::declare`](crate::types::TypeInfo::declare).
pub struct Member {
    name: String,
    params: Vec<TypeRef>,
    declaring_type: String,
    visibility: Visibility,
    invoker: Invoker,
}

impl Member {
    pub fn new<F>(name: impl Into<String>, params: Vec<TypeRef>, invoker: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Member {
            name: name.into(),
            params,
            declaring_type: String::new(),
            visibility: Visibility::Public,
            invoker: Arc::new(invoker),
        }
    }

    /// Hide the member from lookups. It can still be invoked directly.
    pub fn restricted(mut self) -> Self {
        self.visibility = Visibility::Restricted;
        self
    }

    pub(crate) fn declared_by(mut self, type_name: &str) -> Self {
        self.declaring_type = type_name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// `name(P1, P2)`
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.name()).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// Same name and same parameter types, regardless of declaring type.
    pub fn same_signature(&self, other: &Member) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declaring_type.is_empty() {
            write!(f, "{}", self.signature())
        } else {
            write!(f, "{}.{}", self.declaring_type, self.signature())
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("declaring_type", &self.declaring_type)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}
