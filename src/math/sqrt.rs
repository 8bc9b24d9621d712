//! Integer square root.

/// Floor of the square root of `n`, by Newton's method.
///
/// Used to size the initial LP supply as `isqrt(amount_a * amount_b)`.
///
/// ```
/// use hook_amm::math::isqrt;
///
/// assert_eq!(isqrt(0), 0);
/// assert_eq!(isqrt(15), 3);
/// assert_eq!(isqrt(16), 4);
/// ```
#[must_use]
pub const fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = n.div_ceil(2);
    while y < x {
        x = y;
        // x < n here, so n / x >= 1 and x + n / x cannot exceed n.
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(2), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(99), 9);
        assert_eq!(isqrt(100), 10);
    }

    #[test]
    fn pool_sized_product() {
        // 1_000 * 50_000
        assert_eq!(isqrt(50_000_000), 7_071);
    }

    #[test]
    fn u64_square_is_exact() {
        let m = u128::from(u64::MAX);
        assert_eq!(isqrt(m * m), m);
    }

    #[test]
    fn u128_max() {
        assert_eq!(isqrt(u128::MAX), u128::from(u64::MAX));
    }

    #[test]
    fn floor_property() {
        for n in [5u128, 26, 1_000_001, 123_456_789_012] {
            let r = isqrt(n);
            assert!(r * r <= n);
            assert!((r + 1) * (r + 1) > n);
        }
    }
}
