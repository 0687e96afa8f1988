//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 half away from zero and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Multiply an integer delta by `factor` and round the product.
#[must_use]
pub fn scale_i32(value: i32, factor: f64) -> i32 {
    round_f64_to_i32(f64::from(value) * factor)
}

/// Scale `value` only when it is strictly positive; zero and negatives pass through.
#[must_use]
pub fn scale_positive(value: i32, factor: f64) -> i32 {
    if value > 0 {
        scale_i32(value, factor)
    } else {
        value
    }
}

/// Convert a collection length to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Map a unit-interval draw onto an index in `0..len`.
#[must_use]
pub fn unit_to_index(unit: f64, len: usize) -> usize {
    if len == 0 || !unit.is_finite() {
        return 0;
    }
    let scaled = (unit.clamp(0.0, 1.0) * usize_to_f64(len)).floor();
    cast::<f64, usize>(scaled).unwrap_or(0).min(len - 1)
}

/// Widen a non-negative i32 gain into the lifetime counters.
#[must_use]
pub fn gain_to_u64(value: i32) -> u64 {
    u64::try_from(value.max(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_f64_to_i32(2.5), 3);
        assert_eq!(round_f64_to_i32(-2.5), -3);
        assert_eq!(round_f64_to_i32(2.25), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn scale_positive_leaves_penalties_alone() {
        assert_eq!(scale_positive(10, 2.0), 20);
        assert_eq!(scale_positive(-10, 2.0), -10);
        assert_eq!(scale_positive(0, 2.0), 0);
        assert_eq!(scale_positive(3, 0.75), 2);
    }

    #[test]
    fn unit_to_index_stays_in_bounds() {
        assert_eq!(unit_to_index(0.0, 4), 0);
        assert_eq!(unit_to_index(0.999, 4), 3);
        assert_eq!(unit_to_index(1.0, 4), 3);
        assert_eq!(unit_to_index(0.5, 0), 0);
        assert_eq!(unit_to_index(f64::NAN, 3), 0);
    }

    #[test]
    fn gains_never_go_negative() {
        assert_eq!(gain_to_u64(-5), 0);
        assert_eq!(gain_to_u64(12), 12);
    }
}
