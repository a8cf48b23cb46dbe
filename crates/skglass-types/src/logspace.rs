// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Log-Space Arithmetic
// ─────────────────────────────────────────────────────────────────────
//! Addition and subtraction of quantities stored as natural logarithms.
//!
//! A weight `w` represents the probability `exp(w)`; `-inf` is zero mass.
//! Nothing here converts back to linear space for the sum itself.

/// `ln(exp(a) + exp(b))`.
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// `ln(Σ exp(w_i))`. Empty input is zero mass (`-inf`).
pub fn log_sum_exp<I>(weights: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = weights.into_iter();
    let max = iter.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let mut sum = 0.0;
    for w in iter {
        if w.is_nan() {
            return f64::NAN;
        }
        sum += (w - max).exp();
    }
    max + sum.ln()
}

/// `ln(exp(a) − exp(b))`.
///
/// Defined for `b ≤ a`; returns `None` when `b > a` since the result
/// would be the log of a negative mass. Equal inputs give `-inf`.
#[inline]
pub fn log_sub_exp(a: f64, b: f64) -> Option<f64> {
    if a.is_nan() || b.is_nan() || b > a {
        return None;
    }
    if b == f64::NEG_INFINITY {
        return Some(a);
    }
    if b == a {
        return Some(f64::NEG_INFINITY);
    }
    Some(a + (-(b - a).exp_m1()).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_log_add_matches_linear() {
        let v = log_add_exp(0.3f64.ln(), 0.5f64.ln());
        assert!((v - 0.8f64.ln()).abs() < TOL);
    }

    #[test]
    fn test_log_add_zero_mass_identity() {
        assert_eq!(log_add_exp(f64::NEG_INFINITY, -3.0), -3.0);
        assert_eq!(log_add_exp(-3.0, f64::NEG_INFINITY), -3.0);
        assert_eq!(
            log_add_exp(f64::NEG_INFINITY, f64::NEG_INFINITY),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_log_add_no_overflow() {
        let v = log_add_exp(1000.0, 1000.0);
        assert!((v - (1000.0 + 2f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_log_sum_exp_underflow_safe() {
        let v = log_sum_exp([-1000.0, -1000.0, -1000.0]);
        assert!((v - (-1000.0 + 3f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_log_sum_exp_empty() {
        assert_eq!(log_sum_exp(std::iter::empty::<f64>()), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_sum_exp_skips_zero_mass() {
        let v = log_sum_exp([f64::NEG_INFINITY, 0.0]);
        assert!(v.abs() < TOL);
    }

    #[test]
    fn test_log_sub_exp_domain() {
        assert_eq!(log_sub_exp(-1.0, 0.0), None);
        assert_eq!(log_sub_exp(0.0, 0.0), Some(f64::NEG_INFINITY));
        assert_eq!(log_sub_exp(0.0, f64::NEG_INFINITY), Some(0.0));
    }

    #[test]
    fn test_log_sub_exp_matches_linear() {
        let v = log_sub_exp(0.8f64.ln(), 0.5f64.ln()).unwrap();
        assert!((v - 0.3f64.ln()).abs() < TOL);
    }

    #[test]
    fn test_sub_inverts_add() {
        let (a, b) = (-2.5, -4.0);
        let sum = log_add_exp(a, b);
        let back = log_sub_exp(sum, b).unwrap();
        assert!((back - a).abs() < 1e-12);
    }
}
