// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Physics Model
// (C) 2026 The skglass-kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Scalar fields over the (m, n) lattice:
//!
//!   E(m, n)  = α1·d1² + α2·d2²,  d1 = N/2 − (m+n),  d2 = N/2 − (k+n−m)
//!   S(m, n)  = ln C(k, m) + ln C(N−k, n)   (Stirling)
//!   L(m, n)  = S − β·E
//!
//! Lattice-wide bounds are cached under the geometry and physics change
//! numbers and rebuilt in full on first use after either changes.

pub mod bounds;
pub mod model;
pub mod stirling;

pub use bounds::{Bounds, PhysicalProperty};
pub use model::SkPhysics;
pub use stirling::log_binomial;
