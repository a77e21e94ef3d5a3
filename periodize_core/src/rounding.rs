//! Plate rounding shared by both generation paths.

/// Smallest load jump on a standard barbell setup (two 1.25 kg plates)
pub const DEFAULT_INCREMENT_KG: f64 = 2.5;

/// Round a load to the nearest multiple of `increment`
///
/// Never returns a negative value and is idempotent:
/// `round_to_increment(round_to_increment(x, i), i) == round_to_increment(x, i)`.
/// A non-positive or non-finite increment falls back to [`DEFAULT_INCREMENT_KG`].
pub fn round_to_increment(weight: f64, increment: f64) -> f64 {
    let step = if increment.is_finite() && increment > 0.0 {
        increment
    } else {
        DEFAULT_INCREMENT_KG
    };
    if !weight.is_finite() || weight <= 0.0 {
        return 0.0;
    }
    let steps = (weight / step).round();
    // Normalise to exactly `steps * step` so repeated rounding cannot drift
    steps * step
}

/// Round to two decimals (used for estimated maxima and statistics)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_step() {
        assert_eq!(round_to_increment(101.2, 2.5), 100.0);
        assert_eq!(round_to_increment(101.3, 2.5), 102.5);
        assert_eq!(round_to_increment(82.0, 2.5), 82.5);
        assert_eq!(round_to_increment(83.0, 5.0), 85.0);
    }

    #[test]
    fn test_never_negative() {
        assert_eq!(round_to_increment(-10.0, 2.5), 0.0);
        assert_eq!(round_to_increment(0.0, 2.5), 0.0);
        assert_eq!(round_to_increment(f64::NAN, 2.5), 0.0);
    }

    #[test]
    fn test_idempotent_and_multiple_of_step() {
        let mut x = 0.0;
        while x < 400.0 {
            let once = round_to_increment(x, 2.5);
            assert_eq!(round_to_increment(once, 2.5), once);
            assert!(once >= 0.0);
            let ratio = once / 2.5;
            assert!((ratio - ratio.round()).abs() < 1e-9, "{once} not a multiple");
            x += 0.37;
        }
    }

    #[test]
    fn test_bad_increment_uses_default() {
        assert_eq!(round_to_increment(101.3, 0.0), 102.5);
        assert_eq!(round_to_increment(101.3, -1.0), 102.5);
    }
}
