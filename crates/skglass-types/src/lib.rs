// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Types
// (C) 2026 The skglass-kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions shared by every layer of the SK spin-glass kernel:
//! configuration, the error hierarchy, change-number stamps for derived
//! caches, log-space arithmetic, and the numerical guards used by the
//! coordinate pipeline.

pub mod config;
pub mod error;
pub mod logspace;
pub mod numeric;
pub mod stamp;

pub use config::SkConfig;
pub use error::{SkError, SkResult};
pub use stamp::{Stamp, Stamped};
