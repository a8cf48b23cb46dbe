// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Change-Number Stamps
// ─────────────────────────────────────────────────────────────────────
//! Generation ids for derived caches.
//!
//! Geometry and physics each carry a monotonically increasing change
//! number. Anything derived from them records both numbers at
//! construction and is discarded on mismatch, never patched in place.
//!
//! Change numbers alone do not tell two lattices apart (every fresh
//! geometry starts at 0), so the stamp also carries the lattice shape.

use serde::{Deserialize, Serialize};

/// The geometry and physics change numbers a derived value was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stamp {
    pub geometry: u64,
    pub physics: u64,
    /// Lattice shape `(N, k)`.
    pub lattice: (usize, usize),
}

impl Stamp {
    pub fn new(geometry: u64, physics: u64) -> Self {
        Self {
            geometry,
            physics,
            lattice: (0, 0),
        }
    }

    /// Attach the lattice shape `(N, k)`.
    pub fn with_lattice(mut self, n: usize, k: usize) -> Self {
        self.lattice = (n, k);
        self
    }

    /// Whether the lattice changed between `self` and `current`, either by
    /// a size change or by being a different lattice altogether.
    pub fn geometry_changed(&self, current: &Stamp) -> bool {
        self.geometry != current.geometry || self.lattice != current.lattice
    }

    /// Whether a field-value change happened between `self` and `current`.
    pub fn physics_changed(&self, current: &Stamp) -> bool {
        self.physics != current.physics
    }
}

/// A cached snapshot together with the stamp it was computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub stamp: Stamp,
    pub value: T,
}

impl<T> Stamped<T> {
    pub fn new(stamp: Stamp, value: T) -> Self {
        Self { stamp, value }
    }

    pub fn is_current(&self, current: &Stamp) -> bool {
        self.stamp == *current
    }

    /// The cached value, or `None` if it was built under another stamp.
    pub fn get(&self, current: &Stamp) -> Option<&T> {
        self.is_current(current).then_some(&self.value)
    }
}
