//! Value-semantics cache keys built from heterogeneous, nested tuples.
//!
//! A key is the flattened list of scalar leaves of its parts: every part that
//! is a sequence is unwrapped depth-first, left to right. Two keys built from
//! structurally equal parts hash and compare equal, so a tuple such as
//! `(predicate, type, [arg types...])` can serve as a key directly.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A part of a cache key.
pub trait KeyPart: Hash + Sized {
    /// The elements of this part if it is a sequence, `None` for a scalar leaf.
    fn as_sequence(&self) -> Option<&[Self]>;

    /// Deep (array-aware) equality between two leaves.
    fn deep_eq(&self, other: &Self) -> bool;
}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Flattened composite key with a precomputed hash.
#[derive(Debug, Clone)]
pub struct CacheKey<T> {
    leaves: Vec<T>,
    leaf_hashes: Vec<u64>,
    hash: u64,
}

impl<T: KeyPart + Clone> CacheKey<T> {
    /// Build a key from a tuple of parts, flattening nested sequences.
    pub fn build(parts: &[T]) -> Self {
        let mut leaves = Vec::new();
        for part in parts {
            unwrap_into(part, &mut leaves);
        }
        let leaf_hashes: Vec<u64> = leaves.iter().map(hash_one).collect();
        let hash = leaf_hashes
            .iter()
            .fold(1u64, |acc, h| acc.wrapping_mul(31).wrapping_add(*h));
        CacheKey {
            leaves,
            leaf_hashes,
            hash,
        }
    }
}

fn unwrap_into<T: KeyPart + Clone>(part: &T, out: &mut Vec<T>) {
    match part.as_sequence() {
        Some(items) => {
            for item in items {
                unwrap_into(item, out);
            }
        }
        None => out.push(part.clone()),
    }
}

impl<T> CacheKey<T> {
    /// The flattened leaves in order.
    pub fn leaves(&self) -> &[T] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The precomputed combined hash.
    pub fn hash_code(&self) -> u64 {
        self.hash
    }
}

impl<T: KeyPart> PartialEq for CacheKey<T> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.hash != other.hash || self.leaves.len() != other.leaves.len() {
            return false;
        }
        self.leaves
            .iter()
            .zip(&other.leaves)
            .zip(self.leaf_hashes.iter().zip(&other.leaf_hashes))
            .all(|((a, b), (ha, hb))| ha == hb && a.deep_eq(b))
    }
}

impl<T: KeyPart> Eq for CacheKey<T> {}

impl<T> Hash for CacheKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Hash)]
    enum Part {
        Int(i64),
        Str(&'static str),
        Seq(Vec<Part>),
    }

    impl KeyPart for Part {
        fn as_sequence(&self) -> Option<&[Self]> {
            match self {
                Part::Seq(items) => Some(items),
                _ => None,
            }
        }

        fn deep_eq(&self, other: &Self) -> bool {
            self == other
        }
    }

    #[test]
    fn test_build_flattens_nested_sequences_in_order() {
        let key = CacheKey::build(&[
            Part::Str("p"),
            Part::Seq(vec![Part::Int(1), Part::Seq(vec![Part::Int(2), Part::Int(3)])]),
            Part::Int(4),
        ]);
        assert_eq!(
            key.leaves(),
            &[
                Part::Str("p"),
                Part::Int(1),
                Part::Int(2),
                Part::Int(3),
                Part::Int(4)
            ]
        );
    }

    #[test]
    fn test_structurally_equal_parts_give_equal_keys() {
        let a = CacheKey::build(&[Part::Str("find"), Part::Seq(vec![Part::Int(1), Part::Int(2)])]);
        let b = CacheKey::build(&[Part::Str("find"), Part::Int(1), Part::Int(2)]);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());

        let mut map = HashMap::new();
        map.insert(a, "resolved");
        assert_eq!(map.get(&b), Some(&"resolved"));
    }

    #[test]
    fn test_order_and_length_matter() {
        let a = CacheKey::build(&[Part::Int(1), Part::Int(2)]);
        let b = CacheKey::build(&[Part::Int(2), Part::Int(1)]);
        let c = CacheKey::build(&[Part::Int(1), Part::Int(2), Part::Int(3)]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_sequences_vanish() {
        let a = CacheKey::build(&[Part::Str("x"), Part::Seq(vec![])]);
        let b = CacheKey::build(&[Part::Str("x")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }
}
