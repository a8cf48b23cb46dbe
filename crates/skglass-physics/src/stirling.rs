// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Stirling Log-Binomial
// ─────────────────────────────────────────────────────────────────────

use std::f64::consts::TAU;

/// Stirling's approximation of `ln C(a, b)`.
///
/// Defined for `0 < b < a`. Everywhere else returns 0, which is exact for
/// `b = 0` and `b = a` and a neutral default for `b > a`.
pub fn log_binomial(a: usize, b: usize) -> f64 {
    if b == 0 || b >= a {
        return 0.0;
    }
    let a = a as f64;
    let b = b as f64;
    let c = a - b;
    a * a.ln() - b * b.ln() - c * c.ln() + 0.5 * (a.ln() - b.ln() - c.ln() - TAU.ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exact ln C(a, b) by direct summation.
    fn ln_choose(a: usize, b: usize) -> f64 {
        (0..b)
            .map(|i| ((a - i) as f64).ln() - ((i + 1) as f64).ln())
            .sum()
    }

    #[test]
    fn test_symmetry() {
        for a in 2..200 {
            for b in 1..a {
                let l = log_binomial(a, b);
                let r = log_binomial(a, a - b);
                assert!((l - r).abs() < 1e-9, "a={a} b={b}: {l} vs {r}");
            }
        }
    }

    #[test]
    fn test_degenerate_domain_is_zero() {
        assert_eq!(log_binomial(10, 0), 0.0);
        assert_eq!(log_binomial(10, 10), 0.0);
        assert_eq!(log_binomial(10, 11), 0.0);
        assert_eq!(log_binomial(0, 0), 0.0);
    }

    #[test]
    fn test_close_to_exact_for_large_arguments() {
        for &(a, b) in &[(100, 50), (200, 30), (1000, 400)] {
            let approx = log_binomial(a, b);
            let exact = ln_choose(a, b);
            assert!(
                (approx - exact).abs() < 1e-2,
                "ln C({a},{b}): stirling {approx} exact {exact}"
            );
        }
    }

    #[test]
    fn test_peak_at_half() {
        let mid = log_binomial(60, 30);
        assert!(log_binomial(60, 29) < mid);
        assert!(log_binomial(60, 31) < mid);
    }
}
