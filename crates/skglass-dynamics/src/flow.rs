// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Metropolis Flow Rule
// ─────────────────────────────────────────────────────────────────────
//! Moves one node's probability mass onto its neighbours.
//!
//! All weights are natural logarithms of probability mass; `-inf` is an
//! empty node. Each neighbour i is weighted by
//!
//!   w_i = entropy_i + ln p_accept(Δ_i),   Δ_i = potential_i − potential
//!
//! with the Metropolis acceptance
//!
//!   p = 0.5          if |Δ| < threshold
//!   p = 1            if Δ < 0
//!   p = exp(−β·Δ)    if Δ > 0
//!
//! and receives the share `w_curr + w_i − ln Σ exp(w_j)` of the node's
//! mass. Whatever the shares do not account for stays on the node.

use serde::{Deserialize, Serialize};

use skglass_physics::SkPhysics;
use skglass_types::logspace::{log_add_exp, log_sub_exp, log_sum_exp};
use skglass_types::{SkConfig, SkError, SkResult};

/// Flow state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Log-space probability mass.
    pub w_curr: f64,
    pub entropy: f64,
    /// Field value the flow runs down, usually energy.
    pub potential: f64,
}

impl FlowNode {
    pub fn new(w_curr: f64, entropy: f64, potential: f64) -> Self {
        Self {
            w_curr,
            entropy,
            potential,
        }
    }

    /// A node carrying no mass.
    pub fn empty(entropy: f64, potential: f64) -> Self {
        Self::new(f64::NEG_INFINITY, entropy, potential)
    }

    /// Linear-space mass.
    pub fn probability(&self) -> f64 {
        self.w_curr.exp()
    }
}

/// Result of applying the rule to one node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTransfer {
    /// Log mass sent to each neighbour, in neighbour order. `-inf` for a
    /// neighbour with zero acceptance.
    pub portions: Vec<f64>,
    /// `log_sum_exp` of the portions.
    pub emptied: f64,
    /// Log mass left on the node.
    pub retained: f64,
}

/// The Metropolis flow rule. Holds only β and the equality threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetropolisFlow {
    beta: f64,
    equality_threshold: f64,
}

impl MetropolisFlow {
    pub fn new(beta: f64, equality_threshold: f64) -> Self {
        Self {
            beta,
            equality_threshold: equality_threshold.abs(),
        }
    }

    /// Rule using the physics β and the configured threshold.
    pub fn from_config(config: &SkConfig, physics: &SkPhysics) -> SkResult<Self> {
        config.validate()?;
        Ok(Self::new(physics.beta(), config.flow_equality_threshold))
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    pub fn equality_threshold(&self) -> f64 {
        self.equality_threshold
    }

    /// Metropolis acceptance for a potential difference `Δ`.
    #[inline]
    pub fn acceptance(&self, delta: f64) -> f64 {
        if delta.abs() < self.equality_threshold {
            0.5
        } else if delta < 0.0 {
            1.0
        } else {
            (-self.beta * delta).exp().clamp(0.0, 1.0)
        }
    }

    /// Split `node`'s mass across `neighbors`. Neighbour weights are not
    /// read, only their entropy and potential.
    pub fn apply(&self, node: &FlowNode, neighbors: &[FlowNode]) -> SkResult<FlowTransfer> {
        validate(node)?;
        for nb in neighbors {
            validate(nb)?;
        }

        let weights: Vec<Option<f64>> = neighbors
            .iter()
            .map(|nb| {
                let p = self.acceptance(nb.potential - node.potential);
                (p > 0.0).then(|| nb.entropy + p.ln())
            })
            .collect();
        let total = log_sum_exp(weights.iter().flatten().copied());

        let portions: Vec<f64> = weights
            .iter()
            .map(|w| match w {
                Some(w) if total > f64::NEG_INFINITY => node.w_curr + w - total,
                _ => f64::NEG_INFINITY,
            })
            .collect();
        let emptied = log_sum_exp(portions.iter().copied());

        let retained = if emptied < node.w_curr {
            log_sub_exp(node.w_curr, emptied).unwrap_or(f64::NEG_INFINITY)
        } else {
            f64::NEG_INFINITY
        };

        Ok(FlowTransfer {
            portions,
            emptied,
            retained,
        })
    }

    /// [`apply`](Self::apply), then add the portions into the neighbours
    /// and leave the retained mass on the node.
    pub fn apply_in_place(&self, node: &mut FlowNode, neighbors: &mut [FlowNode]) -> SkResult<()> {
        let transfer = self.apply(node, neighbors)?;
        for (nb, portion) in neighbors.iter_mut().zip(&transfer.portions) {
            nb.w_curr = log_add_exp(nb.w_curr, *portion);
        }
        node.w_curr = transfer.retained;
        Ok(())
    }
}

fn validate(node: &FlowNode) -> SkResult<()> {
    if node.w_curr.is_nan() || node.w_curr == f64::INFINITY {
        return Err(SkError::Numerical(format!(
            "flow weight must be finite or -inf, got {}",
            node.w_curr
        )));
    }
    if !node.entropy.is_finite() || !node.potential.is_finite() {
        return Err(SkError::Numerical(format!(
            "flow node has non-finite entropy {} or potential {}",
            node.entropy, node.potential
        )));
    }
    Ok(())
}
