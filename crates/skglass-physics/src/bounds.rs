// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Field Selection and Bounds
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use skglass_types::Stamp;

/// A scalar field over the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalProperty {
    Energy,
    Entropy,
    LogOccupation,
}

impl PhysicalProperty {
    pub const ALL: [PhysicalProperty; 3] = [
        PhysicalProperty::Energy,
        PhysicalProperty::Entropy,
        PhysicalProperty::LogOccupation,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PhysicalProperty::Energy => "Energy",
            PhysicalProperty::Entropy => "Entropy",
            PhysicalProperty::LogOccupation => "Log Occupation",
        }
    }

    /// Slot in the per-property bounds cache.
    pub(crate) fn slot(self) -> usize {
        match self {
            PhysicalProperty::Energy => 0,
            PhysicalProperty::Entropy => 1,
            PhysicalProperty::LogOccupation => 2,
        }
    }
}

/// Lattice-wide extent of one field.
///
/// `factor` maps the field onto [0, 1] via `(v − min) · factor`; it is 0
/// for a flat field rather than infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub factor: f64,
    /// Change numbers the scan ran under.
    pub stamp: Stamp,
}

impl Bounds {
    /// Bounds from an observed min/max.
    pub fn new(min: f64, max: f64, stamp: Stamp) -> Self {
        let factor = if max > min { 1.0 / (max - min) } else { 0.0 };
        Self {
            min,
            max,
            factor,
            stamp,
        }
    }

    /// Whether these bounds were computed under `current`.
    pub fn is_current(&self, current: &Stamp) -> bool {
        self.stamp == *current
    }

    /// Map a field value onto [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) * self.factor
    }
}
