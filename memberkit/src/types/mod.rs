//! Type metadata, lineage and distance for member resolution.
//!
//! # Module Organization
//!
//! - `type_info.rs`: TypeInfo, TypeRef and the TypeBuilder the host describes types with
//! - `builtins.rs`: Builtin types (Any, Number, Int64, String, primitives, ...)
//! - `lineage.rs`: Lineage order, assignability, compatibility, common supertype
//! - `distance.rs`: Distance score between related types
//! - `indexer.rs`: First/last position index used by the distance score

pub mod builtins;
mod distance;
mod indexer;
mod lineage;
mod type_info;


pub use distance::{distance, Distance};
pub use indexer::Indexer;
pub use lineage::{
    common_supertype, compatible, compatible_with_value, is_assignable_from, lineage,
    public_members,
};
pub use type_info::{TypeBuilder, TypeInfo, TypeKind, TypeRef};
