/// Mix `value` into `seed` (the classic `hash_combine` recipe).
///
/// ```text
/// seed ^ (value + 0x9e3779b97f4a7c15 + (seed << 6) + (seed >> 2))
/// ```
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Fold a sequence of values into a single hash.
pub fn hash_all(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, hash_combine)
}

/// Check whether two weights are equal up to the given tolerance.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    a == b || (a - b).abs() <= tolerance
}

pub trait MyHash {
    /// Structural hash function.
    fn hash(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_combine_order_matters() {
        assert_ne!(hash_all([1, 2]), hash_all([2, 1]));
        assert_eq!(hash_all([1, 2, 3]), hash_combine(hash_combine(hash_combine(0, 1), 2), 3));
    }

    #[test]
    fn test_hash_combine_no_overflow() {
        let h = hash_all([u64::MAX, u64::MAX, u64::MAX]);
        assert_eq!(h, hash_all([u64::MAX, u64::MAX, u64::MAX]));
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.1 + 0.2, 0.3, 1e-12));
        assert!(!approx_eq(0.1, 0.2, 1e-12));
        assert!(approx_eq(0.1, 0.2, 0.5));
        assert!(approx_eq(f64::INFINITY, f64::INFINITY, 0.0));
    }
}
