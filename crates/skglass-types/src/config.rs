// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{SkError, SkResult};

/// Smallest admissible spin count.
pub const N_MIN: usize = 3;
/// Largest admissible spin count.
pub const N_MAX: usize = 10_000;
/// Smallest admissible split point. The largest is `N / 2`.
pub const K_MIN: usize = 1;

/// Temperature range. `beta` is clamped to the reciprocal range.
pub const T_MIN: f64 = 1e-6;
pub const T_MAX: f64 = 1e6;

/// Well-depth range for `alpha1` and `alpha2`.
pub const ALPHA_MIN: f64 = -1.0;
pub const ALPHA_MAX: f64 = 1.0;

/// Largest admissible split point for a given spin count.
#[inline]
pub fn k_max(n: usize) -> usize {
    n / 2
}

/// Runtime parameters for the kernel.
///
/// Parameter setters on the geometry and physics objects clamp silently;
/// this struct is the outer layer and rejects out-of-range values instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkConfig {
    /// Total spin count N.
    pub n: usize,

    /// Split point k: spins `[0, k)` are measured against pole 1.
    pub k: usize,

    /// Depth of the well centred on pole 1.
    pub alpha1: f64,

    /// Depth of the well centred on pole 2.
    pub alpha2: f64,

    /// Temperature T. `beta = 1 / T`.
    pub temperature: f64,

    /// Potential differences with magnitude below this count as equal
    /// in the Metropolis flow rule.
    pub flow_equality_threshold: f64,

    /// Safety cap on basin expansion passes.
    pub basin_max_passes: usize,
}

impl Default for SkConfig {
    fn default() -> Self {
        Self {
            n: 100,
            k: 50,
            alpha1: -1.0,
            alpha2: -1.0,
            temperature: 1000.0,
            flow_equality_threshold: 1e-12,
            basin_max_passes: 1_000_000,
        }
    }
}

impl SkConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> SkResult<()> {
        if !(N_MIN..=N_MAX).contains(&self.n) {
            return Err(SkError::Config(format!(
                "n must be in [{N_MIN}, {N_MAX}], got {}",
                self.n
            )));
        }
        if !(K_MIN..=k_max(self.n)).contains(&self.k) {
            return Err(SkError::Config(format!(
                "k must be in [{K_MIN}, {}], got {}",
                k_max(self.n),
                self.k
            )));
        }
        for (name, value) in [("alpha1", self.alpha1), ("alpha2", self.alpha2)] {
            if !value.is_finite() || !(ALPHA_MIN..=ALPHA_MAX).contains(&value) {
                return Err(SkError::Config(format!(
                    "{name} must be in [{ALPHA_MIN}, {ALPHA_MAX}], got {value}"
                )));
            }
        }
        if !self.temperature.is_finite() || !(T_MIN..=T_MAX).contains(&self.temperature) {
            return Err(SkError::Config(format!(
                "temperature must be in [{T_MIN}, {T_MAX}], got {}",
                self.temperature
            )));
        }
        if !self.flow_equality_threshold.is_finite() || self.flow_equality_threshold < 0.0 {
            return Err(SkError::Config(format!(
                "flow_equality_threshold must be finite and >= 0, got {}",
                self.flow_equality_threshold
            )));
        }
        if self.basin_max_passes == 0 {
            return Err(SkError::Config(
                "basin_max_passes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SkResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SkError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise to a JSON string.
    pub fn to_json(&self) -> SkResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SkError::Config(format!("JSON encode error: {e}")))
    }
}
