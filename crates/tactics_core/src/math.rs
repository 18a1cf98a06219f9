//! Fixed-point helpers for deterministic percentage math.
//!
//! Combat formulas are integer based. The few multiplicative modifiers
//! (height bonus) go through fixed-point so no float ever touches a
//! combat result.

use fixed::types::I32F32;

/// Fixed-point number type for all modifier math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Scale `value` by `percent` / 100 and round toward negative infinity.
///
/// The multiplication happens before the division so whole-number
/// products (e.g. `20 * 115 / 100 = 23`) are exact.
///
/// ```
/// use tactics_core::math::scale_percent_floor;
///
/// assert_eq!(scale_percent_floor(20, 115), 23);
/// assert_eq!(scale_percent_floor(12, 115), 13);
/// assert_eq!(scale_percent_floor(0, 115), 0);
/// ```
#[must_use]
pub fn scale_percent_floor(value: i32, percent: i32) -> i32 {
    let scaled = Fixed::from_num(value) * Fixed::from_num(percent) / Fixed::from_num(100);
    scaled.floor().to_num::<i32>()
}

/// Floor division that rounds toward negative infinity for negative numerators.
///
/// `denominator` must be positive.
#[must_use]
pub const fn floor_div(numerator: i32, denominator: i32) -> i32 {
    numerator.div_euclid(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_percent_exact_products() {
        assert_eq!(scale_percent_floor(100, 115), 115);
        assert_eq!(scale_percent_floor(20, 115), 23);
        assert_eq!(scale_percent_floor(40, 115), 46);
    }

    #[test]
    fn test_scale_percent_truncates() {
        // 12 * 1.15 = 13.8
        assert_eq!(scale_percent_floor(12, 115), 13);
        // 6 * 1.15 = 6.9
        assert_eq!(scale_percent_floor(6, 115), 6);
        assert_eq!(scale_percent_floor(7, 115), 8);
    }

    #[test]
    fn test_floor_div_negative() {
        assert_eq!(floor_div(-15, 2), -8);
        assert_eq!(floor_div(15, 2), 7);
        assert_eq!(floor_div(0, 20), 0);
    }

    #[test]
    fn test_fixed_determinism() {
        let a = scale_percent_floor(37, 115);
        let b = scale_percent_floor(37, 115);
        assert_eq!(a, b);
        assert_eq!(a, 42);
    }
}
