//! Type metadata supplied by the host.
//!
//! Rust has no runtime reflection, so the host describes its types up front:
//! a name, a kind, the single concrete ancestor of a class, the capability-sets
//! (interfaces) it declares, and the callable members it declares. Members
//! may be declared after the type exists, so a member can mention its own
//! type in its parameter list.
//!
//! Types are expected to live as long as the host that described them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, RwLock};

use crate::member::{Member, MemberRef};

/// What kind of type a `TypeInfo` describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A concrete or abstract class with at most one concrete ancestor.
    Class,
    /// An interface-like set of capabilities; has no concrete ancestor.
    CapabilitySet,
    /// A primitive with a class counterpart (`i64` boxes to `Int64`).
    Primitive { boxed: TypeRef },
}

/// Metadata of one type.
pub struct TypeInfo {
    name: String,
    kind: TypeKind,
    superclass: Option<TypeRef>,
    capability_sets: Vec<TypeRef>,
    members: RwLock<Vec<MemberRef>>,
}

/// Shared handle to a [`TypeInfo`]. Equality and hashing use the type name.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeInfo>);

enum Superclass {
    Default,
    Explicit(TypeRef),
    Root,
}

/// Builder returned by [`TypeInfo::class`] and [`TypeInfo::capability_set`].
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    superclass: Superclass,
    capability_sets: Vec<TypeRef>,
}

impl TypeInfo {
    /// Start describing a class. Unless `extends` or `root` is called, the
    /// class extends the builtin root type `Any`.
    pub fn class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            kind: TypeKind::Class,
            superclass: Superclass::Default,
            capability_sets: Vec::new(),
        }
    }

    /// Start describing a capability-set. Parent capability-sets are listed
    /// with `implements`.
    pub fn capability_set(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            kind: TypeKind::CapabilitySet,
            superclass: Superclass::Root,
            capability_sets: Vec::new(),
        }
    }

    /// Describe a primitive whose class counterpart is `boxed`.
    pub fn primitive(name: impl Into<String>, boxed: &TypeRef) -> TypeRef {
        TypeRef(Arc::new(TypeInfo {
            name: name.into(),
            kind: TypeKind::Primitive {
                boxed: boxed.clone(),
            },
            superclass: None,
            capability_sets: Vec::new(),
            members: RwLock::new(Vec::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// The single concrete ancestor, if any.
    pub fn superclass(&self) -> Option<&TypeRef> {
        self.superclass.as_ref()
    }

    /// Directly declared capability-sets, in declaration order.
    pub fn capability_sets(&self) -> &[TypeRef] {
        &self.capability_sets
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class)
    }

    pub fn is_capability_set(&self) -> bool {
        matches!(self.kind, TypeKind::CapabilitySet)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive { .. })
    }

    /// A class without a concrete ancestor.
    pub fn is_root(&self) -> bool {
        self.is_class() && self.superclass.is_none()
    }

    /// The class counterpart of a primitive.
    pub fn boxed(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::Primitive { boxed } => Some(boxed),
            _ => None,
        }
    }

    /// Register a member declared by this type.
    pub fn declare(&self, member: Member) -> MemberRef {
        let member = Arc::new(member.declared_by(&self.name));
        self.members
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::clone(&member));
        member
    }

    /// Members declared by this type itself, in declaration order.
    pub fn declared_members(&self) -> Vec<MemberRef> {
        self.members
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass)
            .field("capability_sets", &self.capability_sets)
            .finish_non_exhaustive()
    }
}

impl TypeBuilder {
    /// Set the concrete ancestor of a class.
    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.superclass = Superclass::Explicit(parent.clone());
        self
    }

    /// Make the class a root: it has no concrete ancestor. Only its own
    /// descendants are assignable to it.
    pub fn root(mut self) -> Self {
        self.superclass = Superclass::Root;
        self
    }

    /// Add a declared capability-set.
    pub fn implements(mut self, capability_set: &TypeRef) -> Self {
        self.capability_sets.push(capability_set.clone());
        self
    }

    pub fn build(self) -> TypeRef {
        let superclass = match (self.superclass, &self.kind) {
            (_, TypeKind::CapabilitySet) | (Superclass::Root, _) => None,
            (Superclass::Explicit(parent), _) => Some(parent),
            (Superclass::Default, _) => Some(super::builtins::any()),
        };
        TypeRef(Arc::new(TypeInfo {
            name: self.name,
            kind: self.kind,
            superclass,
            capability_sets: self.capability_sets,
            members: RwLock::new(Vec::new()),
        }))
    }
}

impl fmt::Debug for TypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl TypeRef {
    /// Whether both handles point at the same metadata instance.
    pub fn ptr_eq(a: &TypeRef, b: &TypeRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for TypeRef {
    type Target = TypeInfo;

    fn deref(&self) -> &TypeInfo {
        &self.0
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        TypeRef::ptr_eq(self, other) || self.0.name == other.0.name
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.name)
    }
}
