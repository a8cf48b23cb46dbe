// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Flow Simulation
// ─────────────────────────────────────────────────────────────────────
//! Lattice-wide scheduler for [`MetropolisFlow`].
//!
//! Each step applies the rule once to every node against the weights of
//! the previous step and accumulates the results into a second buffer,
//! so the outcome does not depend on visiting order. A failed step leaves
//! the weights untouched.

use serde::{Deserialize, Serialize};

use skglass_geometry::{Neighbors, SkGeometry};
use skglass_physics::{PhysicalProperty, SkPhysics};
use skglass_types::logspace::{log_add_exp, log_sum_exp};
use skglass_types::{SkResult, Stamp};

use crate::flow::{FlowNode, MetropolisFlow};

/// Starting distribution of probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowInit {
    /// Equal mass on every node.
    Uniform,
    /// Boltzmann weights `exp(log_occupation) / Z`.
    Equilibrium,
    /// All mass on one node index.
    Point(usize),
}

/// Flow of probability mass over the whole lattice.
#[derive(Debug, Clone)]
pub struct FlowSimulation {
    rule: MetropolisFlow,
    potential: PhysicalProperty,
    init: FlowInit,
    nodes: Vec<FlowNode>,
    neighbors: Vec<Neighbors>,
    next: Vec<f64>,
    scratch: Vec<FlowNode>,
    steps: u64,
    stamp: Stamp,
}

impl FlowSimulation {
    /// Build over the current lattice. The rule's β is taken from
    /// `physics`; `potential` selects the field the mass flows down.
    pub fn new(
        geometry: &SkGeometry,
        physics: &SkPhysics,
        rule: MetropolisFlow,
        potential: PhysicalProperty,
        init: FlowInit,
    ) -> SkResult<Self> {
        let mut sim = Self {
            rule,
            potential,
            init,
            nodes: Vec::new(),
            neighbors: Vec::new(),
            next: Vec::new(),
            scratch: Vec::with_capacity(4),
            steps: 0,
            stamp: physics.stamp(geometry),
        };
        sim.rebuild(geometry, physics)?;
        Ok(sim)
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn rule(&self) -> &MetropolisFlow {
        &self.rule
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Linear-space mass of one node.
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.nodes.get(index).map(FlowNode::probability)
    }

    /// `ln` of the total mass; 0 while mass is conserved.
    pub fn total_log_mass(&self) -> f64 {
        log_sum_exp(self.nodes.iter().map(|n| n.w_curr))
    }

    fn rebuild(&mut self, geometry: &SkGeometry, physics: &SkPhysics) -> SkResult<()> {
        let count = geometry.node_count();
        self.neighbors = (0..count).map(|i| geometry.neighbors(i)).collect();
        self.next = vec![f64::NEG_INFINITY; count];
        self.load_fields(geometry, physics);
        self.initialize(geometry, physics)
    }

    fn load_fields(&mut self, geometry: &SkGeometry, physics: &SkPhysics) {
        self.nodes = geometry
            .nodes()
            .map(|(_, p)| {
                FlowNode::empty(
                    physics.entropy(geometry, p.m, p.n),
                    physics.value(geometry, self.potential, p.m, p.n),
                )
            })
            .collect();
        self.rule.set_beta(physics.beta());
        self.stamp = physics.stamp(geometry);
    }

    fn initialize(&mut self, geometry: &SkGeometry, physics: &SkPhysics) -> SkResult<()> {
        match self.init {
            FlowInit::Uniform => {
                let w = -(self.nodes.len() as f64).ln();
                for node in &mut self.nodes {
                    node.w_curr = w;
                }
            }
            FlowInit::Equilibrium => {
                let log_z = physics.log_partition_function(geometry);
                for (node, (_, p)) in self.nodes.iter_mut().zip(geometry.nodes()) {
                    node.w_curr = physics.log_occupation(geometry, p.m, p.n) - log_z;
                }
            }
            FlowInit::Point(index) => {
                geometry.try_node_point(index)?;
                for node in &mut self.nodes {
                    node.w_curr = f64::NEG_INFINITY;
                }
                self.nodes[index].w_curr = 0.0;
            }
        }
        self.steps = 0;
        Ok(())
    }

    /// Restart from the initial distribution on the current fields.
    pub fn reset(&mut self, geometry: &SkGeometry, physics: &SkPhysics) -> SkResult<()> {
        self.initialize(geometry, physics)
    }

    /// Follow geometry and physics changes: rebuild on a lattice change,
    /// reload fields and restart on a parameter change. Returns whether
    /// anything was discarded.
    pub fn refresh(&mut self, geometry: &SkGeometry, physics: &SkPhysics) -> SkResult<bool> {
        let current = physics.stamp(geometry);
        if self.stamp.geometry_changed(&current) {
            log::debug!(
                "flow: lattice changed, rebuilding for {} nodes",
                geometry.node_count()
            );
            self.rebuild(geometry, physics)?;
            Ok(true)
        } else if self.stamp.physics_changed(&current) {
            log::debug!("flow: parameters changed, resetting");
            self.load_fields(geometry, physics);
            self.initialize(geometry, physics)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Apply the rule once to every node.
    pub fn step(&mut self) -> SkResult<()> {
        self.next.fill(f64::NEG_INFINITY);
        for i in 0..self.nodes.len() {
            self.scratch.clear();
            self.scratch
                .extend(self.neighbors[i].iter().map(|&j| self.nodes[j]));
            let transfer = self.rule.apply(&self.nodes[i], &self.scratch)?;
            for (&j, &portion) in self.neighbors[i].iter().zip(&transfer.portions) {
                self.next[j] = log_add_exp(self.next[j], portion);
            }
            self.next[i] = log_add_exp(self.next[i], transfer.retained);
        }
        for (node, &w) in self.nodes.iter_mut().zip(&self.next) {
            node.w_curr = w;
        }
        self.steps += 1;
        log::trace!("flow: step {} total log mass {:.3e}", self.steps, self.total_log_mass());
        Ok(())
    }

    /// Run `n_steps` steps, stopping at the first failure.
    pub fn run(&mut self, n_steps: u64) -> SkResult<()> {
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(())
    }
}
