// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — SK Physics Model
// ─────────────────────────────────────────────────────────────────────
//! Parameters α1, α2, T (β = 1/T), field evaluators, and the bounds cache.
//!
//! Every effective parameter change bumps the change number exactly once.
//! Setting T and setting β are the same logical change seen from two
//! sides, so each recomputes the other under a single increment.

use parking_lot::Mutex;

use skglass_geometry::SkGeometry;
use skglass_types::config::{ALPHA_MAX, ALPHA_MIN, T_MAX, T_MIN};
use skglass_types::logspace::log_sum_exp;
use skglass_types::{SkConfig, SkResult, Stamp, Stamped};

use crate::bounds::{Bounds, PhysicalProperty};
use crate::stirling::log_binomial;

/// Derived lattice-wide values, keyed by [`Stamp`].
#[derive(Debug, Default)]
struct FieldCache {
    bounds: [Option<Bounds>; 3],
    log_partition: Option<Stamped<f64>>,
    /// Full-lattice bounds scans performed so far.
    scans: u64,
}

/// SK physics parameters and fields.
///
/// Thread-safe for readers: the cache is guarded by a `parking_lot::Mutex`.
#[derive(Debug)]
pub struct SkPhysics {
    alpha1: f64,
    alpha2: f64,
    temperature: f64,
    beta: f64,
    change_number: u64,
    cache: Mutex<FieldCache>,
}

impl SkPhysics {
    /// Create with clamped parameters.
    pub fn new(alpha1: f64, alpha2: f64, temperature: f64) -> Self {
        let temperature = clamp_param("T", temperature, T_MIN, T_MAX).unwrap_or(T_MAX);
        Self {
            alpha1: clamp_param("alpha1", alpha1, ALPHA_MIN, ALPHA_MAX).unwrap_or(0.0),
            alpha2: clamp_param("alpha2", alpha2, ALPHA_MIN, ALPHA_MAX).unwrap_or(0.0),
            temperature,
            beta: 1.0 / temperature,
            change_number: 0,
            cache: Mutex::new(FieldCache::default()),
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &SkConfig) -> SkResult<Self> {
        config.validate()?;
        Ok(Self::new(config.alpha1, config.alpha2, config.temperature))
    }

    pub fn alpha1(&self) -> f64 {
        self.alpha1
    }

    pub fn alpha2(&self) -> f64 {
        self.alpha2
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Counter of effective parameter changes.
    pub fn change_number(&self) -> u64 {
        self.change_number
    }

    /// The (geometry, physics) stamp that derived values are keyed by.
    pub fn stamp(&self, geometry: &SkGeometry) -> Stamp {
        Stamp::new(geometry.change_number(), self.change_number)
            .with_lattice(geometry.n(), geometry.k())
    }

    fn bump(&mut self) {
        self.change_number += 1;
        log::debug!(
            "physics: alpha1={} alpha2={} T={} beta={} (change #{})",
            self.alpha1,
            self.alpha2,
            self.temperature,
            self.beta,
            self.change_number
        );
    }

    /// Set α1. Returns whether it changed.
    pub fn set_alpha1(&mut self, alpha1: f64) -> bool {
        match clamp_param("alpha1", alpha1, ALPHA_MIN, ALPHA_MAX) {
            Some(v) if v != self.alpha1 => {
                self.alpha1 = v;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Set α2. Returns whether it changed.
    pub fn set_alpha2(&mut self, alpha2: f64) -> bool {
        match clamp_param("alpha2", alpha2, ALPHA_MIN, ALPHA_MAX) {
            Some(v) if v != self.alpha2 => {
                self.alpha2 = v;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Set T; β follows under the same change.
    pub fn set_temperature(&mut self, temperature: f64) -> bool {
        match clamp_param("T", temperature, T_MIN, T_MAX) {
            Some(t) if t != self.temperature => {
                self.temperature = t;
                self.beta = 1.0 / t;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Set β; T follows under the same change.
    pub fn set_beta(&mut self, beta: f64) -> bool {
        match clamp_param("beta", beta, 1.0 / T_MAX, 1.0 / T_MIN) {
            Some(b) if b != self.beta => {
                self.beta = b;
                self.temperature = 1.0 / b;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Set all three parameters as one logical change.
    pub fn set_parameters(&mut self, alpha1: f64, alpha2: f64, temperature: f64) -> bool {
        let a1 = clamp_param("alpha1", alpha1, ALPHA_MIN, ALPHA_MAX).unwrap_or(self.alpha1);
        let a2 = clamp_param("alpha2", alpha2, ALPHA_MIN, ALPHA_MAX).unwrap_or(self.alpha2);
        let t = clamp_param("T", temperature, T_MIN, T_MAX).unwrap_or(self.temperature);
        if a1 == self.alpha1 && a2 == self.alpha2 && t == self.temperature {
            return false;
        }
        self.alpha1 = a1;
        self.alpha2 = a2;
        self.temperature = t;
        self.beta = 1.0 / t;
        self.bump();
        true
    }

    // ── Fields ──────────────────────────────────────────────────────

    /// `α1·d1² + α2·d2²`.
    pub fn energy(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        let half_n = 0.5 * geometry.n() as f64;
        let d1 = half_n - (m + n) as f64;
        let d2 = half_n - (geometry.k() + n - m) as f64;
        self.alpha1 * d1 * d1 + self.alpha2 * d2 * d2
    }

    /// `ln C(k, m) + ln C(N − k, n)`.
    pub fn entropy(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        log_binomial(geometry.k(), m) + log_binomial(geometry.n() - geometry.k(), n)
    }

    /// `S − β·E`.
    pub fn log_occupation(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        self.entropy(geometry, m, n) - self.beta * self.energy(geometry, m, n)
    }

    /// Evaluate the selected field.
    pub fn value(&self, geometry: &SkGeometry, property: PhysicalProperty, m: usize, n: usize) -> f64 {
        match property {
            PhysicalProperty::Energy => self.energy(geometry, m, n),
            PhysicalProperty::Entropy => self.entropy(geometry, m, n),
            PhysicalProperty::LogOccupation => self.log_occupation(geometry, m, n),
        }
    }

    /// Field value mapped onto [0, 1] by the current bounds.
    pub fn normalized_value(
        &self,
        geometry: &SkGeometry,
        property: PhysicalProperty,
        m: usize,
        n: usize,
    ) -> f64 {
        let bounds = self.bounds(geometry, property);
        bounds.normalize(self.value(geometry, property, m, n))
    }

    pub fn normalized_energy(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        self.normalized_value(geometry, PhysicalProperty::Energy, m, n)
    }

    pub fn normalized_entropy(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        self.normalized_value(geometry, PhysicalProperty::Entropy, m, n)
    }

    pub fn normalized_log_occupation(&self, geometry: &SkGeometry, m: usize, n: usize) -> f64 {
        self.normalized_value(geometry, PhysicalProperty::LogOccupation, m, n)
    }

    // ── Lattice-wide values ─────────────────────────────────────────

    /// Bounds of a field over the whole lattice.
    ///
    /// Served from cache while the stamp matches; otherwise rescanned in
    /// full, O(node_count).
    pub fn bounds(&self, geometry: &SkGeometry, property: PhysicalProperty) -> Bounds {
        let stamp = self.stamp(geometry);
        let mut cache = self.cache.lock();
        if let Some(b) = cache.bounds[property.slot()] {
            if b.is_current(&stamp) {
                return b;
            }
        }
        let b = self.scan_bounds(geometry, property, stamp);
        cache.scans += 1;
        cache.bounds[property.slot()] = Some(b);
        b
    }

    /// Number of full-lattice bounds scans performed.
    pub fn bounds_scan_count(&self) -> u64 {
        self.cache.lock().scans
    }

    fn scan_bounds(&self, geometry: &SkGeometry, property: PhysicalProperty, stamp: Stamp) -> Bounds {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for m in 0..=geometry.m_max() {
            for n in 0..=geometry.n_max() {
                let v = self.value(geometry, property, m, n);
                if !v.is_finite() {
                    log::warn!("bounds: non-finite {} at ({m}, {n}), skipped", property.name());
                    continue;
                }
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min > max {
            min = 0.0;
            max = 0.0;
        }
        log::debug!(
            "bounds: {} in [{min:.6e}, {max:.6e}] over {} nodes",
            property.name(),
            geometry.node_count()
        );
        Bounds::new(min, max, stamp)
    }

    /// `ln Z = ln Σ exp(S − β·E)` over the lattice, cached like bounds.
    pub fn log_partition_function(&self, geometry: &SkGeometry) -> f64 {
        let stamp = self.stamp(geometry);
        let mut cache = self.cache.lock();
        if let Some(&z) = cache.log_partition.as_ref().and_then(|s| s.get(&stamp)) {
            return z;
        }
        let z = log_sum_exp((0..geometry.node_count()).map(|i| {
            let p = geometry.node_index_to_sk(i);
            self.log_occupation(geometry, p.m, p.n)
        }));
        cache.log_partition = Some(Stamped::new(stamp, z));
        z
    }
}

impl Default for SkPhysics {
    fn default() -> Self {
        let cfg = SkConfig::default();
        Self::new(cfg.alpha1, cfg.alpha2, cfg.temperature)
    }
}

/// Clamp a parameter into range; NaN is rejected with `None`.
fn clamp_param(name: &str, value: f64, lo: f64, hi: f64) -> Option<f64> {
    if value.is_nan() {
        log::warn!("physics: {name} = NaN ignored");
        return None;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::debug!("physics: {name} = {value} clamped to {clamped}");
    }
    Some(clamped)
}
