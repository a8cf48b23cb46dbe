// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Two-Point Shell Embedding
// ─────────────────────────────────────────────────────────────────────
//! (m, n) → two-point → spherical → Cartesian.
//!
//! Two-point coordinates (s1, s2) are the angular distances from the
//! poles p1 (φ = 0) and p2 (φ = s0), both on the equator θ_e = 0.
//! From the spherical law of cosines
//!
//!   cos s1 = cos θ_e · cos φ
//!   cos s2 = cos θ_e · cos(φ − s0)
//!
//! so `tan φ = cos s2 / (cos s1 · sin s0) − cot s0`. Dividing by cos s1
//! is ill-conditioned near s1 = π/2, so each point is solved in the chart
//! centred on whichever pole has the larger |cos s|. The comparison
//! |cos s1| ≥ |cos s2| factors into `s1 ≤ s2` and `s1 ≤ π − s2`, which
//! split the (s1, s2) square into four quadrants.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use skglass_types::numeric::{acos_clamped, clamp_checked, guard_denominator, normalize_angle};

use crate::lattice::{SkGeometry, R0};

/// Angular distances to the two poles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPoint {
    pub s1: f64,
    pub s2: f64,
}

/// A point on the shell. `theta_e` is elevation above the equator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub r: f64,
    pub phi: f64,
    pub theta_e: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cartesian {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian {
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Domain corrections applied while computing a coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    /// `s1 + s2` was outside `[s0, 2π − s0]` and was shifted back.
    pub sum_clamped: bool,
    /// A zero denominator was replaced by the guard epsilon.
    pub denominator_guarded: bool,
    /// An `acos` argument fell outside [-1, 1].
    pub acos_clamped: bool,
    /// θ_e fell outside [0, π/2] after `acos`.
    pub theta_clamped: bool,
}

impl Corrections {
    pub fn any(&self) -> bool {
        self.sum_clamped || self.denominator_guarded || self.acos_clamped || self.theta_clamped
    }
}

/// A value together with the corrections made while computing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corrected<T> {
    pub value: T,
    pub corrections: Corrections,
}

/// Position of (s1, s2) relative to the bisectors `s1 = s2` (left/right)
/// and `s1 = π − s2` (lower/upper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    /// `s1 ≤ s2`, `s1 ≤ π − s2`
    LowerLeft,
    /// `s1 > s2`, `s1 ≤ π − s2`
    LowerRight,
    /// `s1 ≤ s2`, `s1 > π − s2`
    UpperLeft,
    /// `s1 > s2`, `s1 > π − s2`
    UpperRight,
}

impl Quadrant {
    pub fn classify(tp: TwoPoint) -> Self {
        let left = tp.s1 <= tp.s2;
        let lower = tp.s1 <= PI - tp.s2;
        match (left, lower) {
            (true, true) => Quadrant::LowerLeft,
            (false, true) => Quadrant::LowerRight,
            (true, false) => Quadrant::UpperLeft,
            (false, false) => Quadrant::UpperRight,
        }
    }

    /// The chart that is well-conditioned in this quadrant.
    pub fn chart(self) -> Chart {
        match self {
            Quadrant::LowerLeft | Quadrant::UpperRight => Chart::PoleOne,
            Quadrant::LowerRight | Quadrant::UpperLeft => Chart::PoleTwo,
        }
    }
}

/// Closed-form inversion centred on one of the poles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chart {
    /// G1: divide by cos s1.
    PoleOne,
    /// G2: divide by cos s2, φ measured back from p2.
    PoleTwo,
}

impl Chart {
    /// Solve (φ, θ_e) for an in-range (s1, s2).
    fn solve(self, s0: f64, tp: TwoPoint, corr: &mut Corrections) -> (f64, f64) {
        // Pole-two is pole-one with the roles of s1 and s2 swapped and
        // φ reflected about s0.
        let (near, far) = match self {
            Chart::PoleOne => (tp.s1, tp.s2),
            Chart::PoleTwo => (tp.s2, tp.s1),
        };

        let (den, guarded) = guard_denominator(near.cos() * s0.sin());
        corr.denominator_guarded |= guarded;
        let cot_s0 = s0.cos() / s0.sin();
        let mut psi = (far.cos() / den - cot_s0).atan();
        if near > FRAC_PI_2 {
            psi += PI;
        }

        let phi = match self {
            Chart::PoleOne => normalize_angle(psi),
            Chart::PoleTwo => normalize_angle(s0 - psi),
        };
        let offset = match self {
            Chart::PoleOne => phi,
            Chart::PoleTwo => s0 - phi,
        };

        let (cos_offset, guarded) = guard_denominator(offset.cos());
        corr.denominator_guarded |= guarded;
        let (theta, clamped) = acos_clamped(near.cos() / cos_offset);
        corr.acos_clamped |= clamped;
        let (theta, clamped) = clamp_checked(theta, 0.0, FRAC_PI_2);
        corr.theta_clamped |= clamped;

        (phi, theta)
    }
}

impl SkGeometry {
    /// Two-point coordinates of a lattice node.
    pub fn sk_to_two_point(&self, m: usize, n: usize) -> TwoPoint {
        let unit = self.angle_unit();
        TwoPoint {
            s1: unit * (n + m) as f64,
            s2: unit * (self.k() + n - m) as f64,
        }
    }

    /// Spherical coordinates of a two-point pair, with corrections.
    pub fn two_point_to_spherical_checked(&self, s1: f64, s2: f64) -> Corrected<Spherical> {
        let s0 = self.s0();
        let mut corrections = Corrections::default();

        let sum = s1 + s2;
        let (lo, hi) = (s0, TAU - s0);
        let shift = if sum < lo {
            0.5 * (lo - sum)
        } else if sum > hi {
            0.5 * (hi - sum)
        } else {
            0.0
        };
        if shift != 0.0 {
            corrections.sum_clamped = true;
        }
        let tp = TwoPoint {
            s1: s1 + shift,
            s2: s2 + shift,
        };

        let chart = Quadrant::classify(tp).chart();
        let (phi, theta_e) = chart.solve(s0, tp, &mut corrections);

        if corrections.any() {
            log::trace!(
                "two_point_to_spherical: ({s1:.6}, {s2:.6}) corrected {corrections:?} via {chart:?}"
            );
        }

        Corrected {
            value: Spherical {
                r: R0,
                phi,
                theta_e,
            },
            corrections,
        }
    }

    /// Spherical coordinates of a two-point pair.
    pub fn two_point_to_spherical(&self, s1: f64, s2: f64) -> Spherical {
        self.two_point_to_spherical_checked(s1, s2).value
    }

    /// Standard spherical → Cartesian with polar angle `π/2 − θ_e`.
    pub fn spherical_to_cartesian(r: f64, phi: f64, theta_e: f64) -> Cartesian {
        let polar = FRAC_PI_2 - theta_e;
        Cartesian {
            x: r * polar.sin() * phi.cos(),
            y: r * polar.sin() * phi.sin(),
            z: r * polar.cos(),
        }
    }

    pub fn sk_to_spherical_checked(&self, m: usize, n: usize) -> Corrected<Spherical> {
        let tp = self.sk_to_two_point(m, n);
        self.two_point_to_spherical_checked(tp.s1, tp.s2)
    }

    pub fn sk_to_spherical(&self, m: usize, n: usize) -> Spherical {
        self.sk_to_spherical_checked(m, n).value
    }

    pub fn sk_to_cartesian_checked(&self, m: usize, n: usize) -> Corrected<Cartesian> {
        let Corrected { value: s, corrections } = self.sk_to_spherical_checked(m, n);
        Corrected {
            value: Self::spherical_to_cartesian(s.r, s.phi, s.theta_e),
            corrections,
        }
    }

    pub fn sk_to_cartesian(&self, m: usize, n: usize) -> Cartesian {
        self.sk_to_cartesian_checked(m, n).value
    }

    /// Cartesian positions of every node, in node-index order.
    pub fn cartesian_points(&self) -> Vec<Cartesian> {
        self.nodes().map(|(_, p)| self.sk_to_cartesian(p.m, p.n)).collect()
    }
}
