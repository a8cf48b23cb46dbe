// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Lattice Parameters and Indexing
// ─────────────────────────────────────────────────────────────────────
//! The (m, n) lattice: parameters N and k, the node-index bijection,
//! 4-neighbourhoods, and the change number that guards derived caches.
//!
//! Nodes are laid out row-major with m as the row:
//! `index = m * (n_max + 1) + n`. There is no wraparound; nodes on the
//! lattice edge simply have fewer neighbours.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use skglass_types::config::{k_max, K_MIN, N_MAX, N_MIN};
use skglass_types::{SkConfig, SkError, SkResult};

/// Shell radius. Every embedded point lies at exactly this distance.
pub const R0: f64 = 1.0;

/// A lattice node by its spin-flip counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkPoint {
    pub m: usize,
    pub n: usize,
}

impl SkPoint {
    pub fn new(m: usize, n: usize) -> Self {
        Self { m, n }
    }
}

/// Up to four lattice neighbours of a node, in the order
/// (m−1, n), (m+1, n), (m, n−1), (m, n+1) with absent ones skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    items: [usize; 4],
    len: usize,
}

impl Neighbors {
    fn push(&mut self, index: usize) {
        self.items[self.len] = index;
        self.len += 1;
    }
}

impl Deref for Neighbors {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.items[..self.len]
    }
}

impl<'a> IntoIterator for &'a Neighbors {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.items[..self.len].iter()
    }
}

/// Lattice geometry with change tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkGeometry {
    n: usize,
    k: usize,
    change_number: u64,
}

impl SkGeometry {
    /// Create a geometry, clamping `n` and `k` to their admissible ranges.
    pub fn new(n: usize, k: usize) -> Self {
        let n = n.clamp(N_MIN, N_MAX);
        let k = k.clamp(K_MIN, k_max(n));
        Self {
            n,
            k,
            change_number: 0,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &SkConfig) -> SkResult<Self> {
        config.validate()?;
        Ok(Self::new(config.n, config.k))
    }

    /// Total spin count N.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Split point k.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn m_max(&self) -> usize {
        self.k
    }

    pub fn n_max(&self) -> usize {
        self.n - self.k
    }

    /// Number of lattice nodes, `(k + 1)(N − k + 1)`.
    pub fn node_count(&self) -> usize {
        (self.m_max() + 1) * (self.n_max() + 1)
    }

    /// Counter of effective N/k changes. Derived caches compare against it.
    pub fn change_number(&self) -> u64 {
        self.change_number
    }

    /// Angular separation of the two poles, `π k / N`.
    pub fn s0(&self) -> f64 {
        self.angle_unit() * self.k as f64
    }

    /// Angle per spin flip, `π / N`.
    pub(crate) fn angle_unit(&self) -> f64 {
        std::f64::consts::PI / self.n as f64
    }

    /// The poles `p1 = (0, 0)` and `p2 = (k, 0)`.
    pub fn poles(&self) -> (SkPoint, SkPoint) {
        (SkPoint::new(0, 0), SkPoint::new(self.k, 0))
    }

    /// Set N. `k` is re-clamped to the new `[1, N/2]` under the same
    /// change. Returns whether anything changed.
    pub fn set_n(&mut self, n: usize) -> bool {
        self.set_n_and_k(n, self.k)
    }

    /// Set k, clamped to `[1, N/2]`. Returns whether it changed.
    pub fn set_k(&mut self, k: usize) -> bool {
        self.set_n_and_k(self.n, k)
    }

    /// Set N and k together as one logical change.
    pub fn set_n_and_k(&mut self, n: usize, k: usize) -> bool {
        let new_n = n.clamp(N_MIN, N_MAX);
        let new_k = k.clamp(K_MIN, k_max(new_n));
        if new_n != n || new_k != k {
            log::debug!("geometry: requested (N={n}, k={k}) clamped to (N={new_n}, k={new_k})");
        }
        if new_n == self.n && new_k == self.k {
            return false;
        }
        self.n = new_n;
        self.k = new_k;
        self.change_number += 1;
        log::debug!(
            "geometry: N={} k={} nodes={} (change #{})",
            self.n,
            self.k,
            self.node_count(),
            self.change_number
        );
        true
    }

    /// Whether (m, n) lies on the lattice.
    pub fn contains(&self, m: usize, n: usize) -> bool {
        m <= self.m_max() && n <= self.n_max()
    }

    /// Node index of (m, n). The pair must lie on the lattice.
    #[inline]
    pub fn sk_to_node_index(&self, m: usize, n: usize) -> usize {
        debug_assert!(self.contains(m, n), "({m}, {n}) outside lattice");
        m * (self.n_max() + 1) + n
    }

    /// Node index of (m, n), rejecting pairs off the lattice.
    pub fn try_node_index(&self, m: usize, n: usize) -> SkResult<usize> {
        if self.contains(m, n) {
            Ok(self.sk_to_node_index(m, n))
        } else {
            Err(SkError::Validation(format!(
                "({m}, {n}) outside lattice m <= {}, n <= {}",
                self.m_max(),
                self.n_max()
            )))
        }
    }

    /// (m, n) of a node index.
    #[inline]
    pub fn node_index_to_sk(&self, index: usize) -> SkPoint {
        debug_assert!(index < self.node_count(), "node {index} out of range");
        let stride = self.n_max() + 1;
        SkPoint::new(index / stride, index % stride)
    }

    /// (m, n) of a node index, rejecting indices past the end.
    pub fn try_node_point(&self, index: usize) -> SkResult<SkPoint> {
        if index < self.node_count() {
            Ok(self.node_index_to_sk(index))
        } else {
            Err(SkError::Lattice {
                index,
                node_count: self.node_count(),
            })
        }
    }

    /// The 4-neighbourhood of a node (no wraparound).
    pub fn neighbors(&self, index: usize) -> Neighbors {
        let SkPoint { m, n } = self.node_index_to_sk(index);
        let stride = self.n_max() + 1;
        let mut out = Neighbors {
            items: [0; 4],
            len: 0,
        };
        if m > 0 {
            out.push(index - stride);
        }
        if m < self.m_max() {
            out.push(index + stride);
        }
        if n > 0 {
            out.push(index - 1);
        }
        if n < self.n_max() {
            out.push(index + 1);
        }
        out
    }

    /// Iterate over all nodes as (index, point) in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, SkPoint)> + '_ {
        (0..self.node_count()).map(move |i| (i, self.node_index_to_sk(i)))
    }
}

impl Default for SkGeometry {
    fn default() -> Self {
        let cfg = SkConfig::default();
        Self::new(cfg.n, cfg.k)
    }
}
