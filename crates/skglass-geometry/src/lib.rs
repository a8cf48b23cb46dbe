// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Lattice Geometry
// (C) 2026 The skglass-kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Lattice geometry for the SK configuration space.
//!
//! A configuration of N spins split at k is summarised by the pair
//! (m, n): m flipped spins among the first k, n among the remaining
//! N − k. The (m, n) lattice is embedded on a unit shell through the
//! pipeline
//!
//!   (m, n) → two-point (s1, s2) → spherical (r, φ, θ_e) → Cartesian
//!
//! where s1 and s2 are angular distances to two poles on the equator.
//!
//! # Invariants
//!
//! 1. `node_index` is a bijection between valid (m, n) and
//!    `[0, node_count)`.
//! 2. The change number increments exactly once per effective change of
//!    N or k, never on a no-op assignment.
//! 3. The coordinate pipeline never fails. Out-of-domain values are
//!    clamped and reported through [`Corrections`].

pub mod coords;
pub mod lattice;

pub use coords::{Cartesian, Chart, Corrected, Corrections, Quadrant, Spherical, TwoPoint};
pub use lattice::{Neighbors, SkGeometry, SkPoint, R0};
