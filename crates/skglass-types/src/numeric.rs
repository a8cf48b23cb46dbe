// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Numerical Guards
// ─────────────────────────────────────────────────────────────────────
//! Domain guards for trig and division in the coordinate pipeline.
//!
//! Each guard returns the guarded value plus a flag telling the caller
//! whether a correction was applied.

use std::f64::consts::TAU;

/// Replacement for a denominator that evaluates to exactly zero.
pub const DENOMINATOR_GUARD: f64 = 1e-6;

/// Replace an exactly-zero denominator with [`DENOMINATOR_GUARD`].
#[inline]
pub fn guard_denominator(value: f64) -> (f64, bool) {
    if value == 0.0 {
        (DENOMINATOR_GUARD, true)
    } else {
        (value, false)
    }
}

/// Clamp a value to [lo, hi], mapping NaN to lo.
#[inline]
pub fn clamp_checked(value: f64, lo: f64, hi: f64) -> (f64, bool) {
    if value.is_nan() {
        log::warn!("clamp_checked: NaN detected, clamping to {lo:.4}");
        return (lo, true);
    }
    if value < lo {
        (lo, true)
    } else if value > hi {
        (hi, true)
    } else {
        (value, false)
    }
}

/// `acos` with its argument clamped into [-1, 1].
#[inline]
pub fn acos_clamped(value: f64) -> (f64, bool) {
    let (arg, corrected) = clamp_checked(value, -1.0, 1.0);
    (arg.acos(), corrected)
}

/// Reduce an angle into [0, 2π).
///
/// `rem_euclid` can return exactly 2π for tiny negative inputs; that
/// case folds back to 0.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}
