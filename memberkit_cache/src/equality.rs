//! Null-aware, array-aware equality.
//!
//! `equal` is the comparison used by the cache checksum gate: two absent
//! values are equal, an absent value never equals a present one, and present
//! values compare with `PartialEq` (which is element-wise for slices and
//! vectors).

/// Compare two optional values.
///
/// ```
/// use memberkit_cache::equality::equal;
///
/// assert!(equal::<i32>(None, None));
/// assert!(!equal(Some(&1), None));
/// assert!(equal(Some(&vec![1, 2]), Some(&vec![1, 2])));
/// ```
pub fn equal<T: PartialEq + ?Sized>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::eq(a, b) || a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_absent_and_present() {
        assert!(equal::<str>(None, None));
        assert!(!equal(Some("a"), None));
        assert!(!equal(None, Some("a")));
        assert!(equal(Some("a"), Some("a")));
        assert!(!equal(Some("a"), Some("b")));
    }

    #[test]
    fn test_equal_compares_nested_arrays_by_content() {
        let a = vec![vec![1, 2], vec![3]];
        let b = vec![vec![1, 2], vec![3]];
        let c = vec![vec![1, 2], vec![4]];
        assert!(equal(Some(&a), Some(&b)));
        assert!(!equal(Some(&a), Some(&c)));
    }
}
