// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Basin Classifier
// ─────────────────────────────────────────────────────────────────────
//! Basins of attraction of the energy landscape.
//!
//! Strict local minima seed the basins. Each expansion pass then looks
//! at unclassified nodes and their "downhill or equal" neighbours (energy
//! ≤ the node's own):
//!
//! - any of them still unclassified → wait for a later pass
//! - downhill neighbours in two different basins, or any boundary
//!   neighbour → boundary
//! - otherwise → join the single basin, one step further from its
//!   attractor than the closest such neighbour
//!
//! Equal energy counts as downhill. Two adjacent unclassified nodes of
//! equal energy therefore wait on each other, and a plateau with no
//! classified member stays unclassified when the run converges.
//! [`BasinClassifier::with_plateau_propagation`] relaxes the wait to
//! strictly lower neighbours, letting plateaus take the basin of
//! whichever classified node reaches them first.
//!
//! Passes are Jacobi-style: every decision in a pass reads the state as
//! it was when the pass began. After the first pass only the unclassified
//! neighbours of nodes classified in the previous pass are revisited,
//! since no other node can see a different neighbourhood.

use serde::{Deserialize, Serialize};

use skglass_geometry::{Neighbors, SkGeometry, SkPoint};
use skglass_physics::SkPhysics;
use skglass_types::{SkConfig, SkResult, Stamp};

/// Classification of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Unclassified,
    Assigned { basin_id: usize, distance: usize },
    Boundary,
}

/// Per-node record. `energy` is NaN until loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasinNode {
    pub energy: f64,
    pub state: NodeState,
}

impl Default for BasinNode {
    fn default() -> Self {
        Self {
            energy: f64::NAN,
            state: NodeState::Unclassified,
        }
    }
}

impl BasinNode {
    pub fn is_classified(&self) -> bool {
        self.state != NodeState::Unclassified
    }

    /// `None` while unclassified.
    pub fn is_boundary(&self) -> Option<bool> {
        match self.state {
            NodeState::Unclassified => None,
            NodeState::Assigned { .. } => Some(false),
            NodeState::Boundary => Some(true),
        }
    }

    pub fn basin_id(&self) -> Option<usize> {
        match self.state {
            NodeState::Assigned { basin_id, .. } => Some(basin_id),
            _ => None,
        }
    }

    /// Steps from the basin's attractor; 0 for the attractor itself.
    pub fn distance_to_attractor(&self) -> Option<usize> {
        match self.state {
            NodeState::Assigned { distance, .. } => Some(distance),
            _ => None,
        }
    }
}

/// One basin of attraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basin {
    pub id: usize,
    /// Node index of the local minimum that seeded it.
    pub attractor: usize,
    /// Nodes assigned so far, attractor included.
    pub size: usize,
}

/// Progress of a classification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    AttractorsFound,
    Iterating,
    Converged,
}

/// Classifier over one lattice and one energy field.
#[derive(Debug, Clone)]
pub struct BasinClassifier {
    nodes: Vec<BasinNode>,
    neighbors: Vec<Neighbors>,
    basins: Vec<Basin>,
    iteration: i64,
    done: bool,
    /// Nodes to visit next pass; `None` visits every unclassified node.
    frontier: Option<Vec<usize>>,
    max_passes: usize,
    propagate_plateaus: bool,
    /// `None` for a caller-supplied field.
    stamp: Option<Stamp>,
}

impl BasinClassifier {
    /// Classifier over the physics energy field.
    pub fn new(geometry: &SkGeometry, physics: &SkPhysics) -> Self {
        let mut c = Self::with_field(geometry, |p| physics.energy(geometry, p.m, p.n));
        c.stamp = Some(physics.stamp(geometry));
        c
    }

    /// Classifier over an arbitrary field. The first
    /// [`refresh`](Self::refresh) replaces it with the physics energy.
    pub fn with_field<F>(geometry: &SkGeometry, field: F) -> Self
    where
        F: Fn(SkPoint) -> f64,
    {
        let nodes = geometry
            .nodes()
            .map(|(_, p)| BasinNode {
                energy: field(p),
                state: NodeState::Unclassified,
            })
            .collect();
        let neighbors = (0..geometry.node_count())
            .map(|i| geometry.neighbors(i))
            .collect();
        Self {
            nodes,
            neighbors,
            basins: Vec::new(),
            iteration: -1,
            done: false,
            frontier: None,
            max_passes: SkConfig::default().basin_max_passes,
            propagate_plateaus: false,
            stamp: None,
        }
    }

    /// Classifier with the pass limit taken from `config`.
    pub fn from_config(
        geometry: &SkGeometry,
        physics: &SkPhysics,
        config: &SkConfig,
    ) -> SkResult<Self> {
        config.validate()?;
        Ok(Self::new(geometry, physics).with_max_passes(config.basin_max_passes))
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Let unclassified equal-energy neighbours stop blocking a decision.
    /// Off by default.
    pub fn with_plateau_propagation(mut self, enabled: bool) -> Self {
        self.propagate_plateaus = enabled;
        self
    }

    pub fn node_data(&self) -> &[BasinNode] {
        &self.nodes
    }

    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    /// −1 before attractors are found, then the number of expansion passes.
    pub fn iteration(&self) -> i64 {
        self.iteration
    }

    pub fn is_iteration_done(&self) -> bool {
        self.done
    }

    pub fn phase(&self) -> Phase {
        match (self.iteration, self.done) {
            (i, _) if i < 0 => Phase::NotStarted,
            (_, true) => Phase::Converged,
            (0, false) => Phase::AttractorsFound,
            _ => Phase::Iterating,
        }
    }

    /// Nodes still unclassified.
    pub fn unclassified_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_classified()).count()
    }

    /// Clear every classification and return to `NotStarted`.
    /// Energies are kept.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.state = NodeState::Unclassified;
        }
        self.basins.clear();
        self.iteration = -1;
        self.done = false;
        self.frontier = None;
    }

    /// Follow geometry and physics changes: rebuild on a lattice change,
    /// reload energies and reset on a parameter change. Returns whether
    /// anything was discarded.
    pub fn refresh(&mut self, geometry: &SkGeometry, physics: &SkPhysics) -> bool {
        let current = physics.stamp(geometry);
        let rebuild = match self.stamp {
            None => true,
            Some(stamp) => stamp.geometry_changed(&current),
        };
        if rebuild {
            log::debug!(
                "basins: rebuilding energy field for {} nodes",
                geometry.node_count()
            );
            *self = Self::new(geometry, physics)
                .with_max_passes(self.max_passes)
                .with_plateau_propagation(self.propagate_plateaus);
            true
        } else if self.stamp.is_some_and(|stamp| stamp.physics_changed(&current)) {
            log::debug!("basins: parameters changed, resetting");
            for (i, node) in self.nodes.iter_mut().enumerate() {
                let p = geometry.node_index_to_sk(i);
                node.energy = physics.energy(geometry, p.m, p.n);
            }
            self.reset();
            self.stamp = Some(current);
            true
        } else {
            false
        }
    }

    /// Seed a basin at every unclassified node whose neighbours all have
    /// strictly greater energy. Returns the number of new attractors.
    pub fn find_attractors(&mut self) -> usize {
        let mut found = 0;
        for i in 0..self.nodes.len() {
            if self.nodes[i].is_classified() {
                continue;
            }
            let e = self.nodes[i].energy;
            let strict_min = self.neighbors[i]
                .iter()
                .all(|&j| self.nodes[j].energy > e);
            if strict_min && !e.is_nan() {
                let id = self.basins.len();
                self.basins.push(Basin {
                    id,
                    attractor: i,
                    size: 1,
                });
                self.nodes[i].state = NodeState::Assigned {
                    basin_id: id,
                    distance: 0,
                };
                found += 1;
            }
        }
        self.iteration = 0;
        self.done = false;
        self.frontier = None;
        log::debug!("basins: {found} attractors");
        found
    }

    /// One expansion pass. Finds attractors first if that has not
    /// happened yet. Returns the number of nodes classified; 0 means
    /// converged.
    pub fn expand_basins(&mut self) -> usize {
        if self.iteration < 0 {
            self.find_attractors();
        }
        if self.done {
            return 0;
        }

        let candidates: Vec<usize> = match self.frontier.take() {
            Some(frontier) => frontier,
            None => (0..self.nodes.len()).collect(),
        };
        let decisions: Vec<(usize, NodeState)> = candidates
            .into_iter()
            .filter(|&i| !self.nodes[i].is_classified())
            .filter_map(|i| self.decide(i).map(|s| (i, s)))
            .collect();

        let mut frontier = Vec::new();
        for &(i, state) in &decisions {
            self.nodes[i].state = state;
            if let NodeState::Assigned { basin_id, .. } = state {
                self.basins[basin_id].size += 1;
            }
        }
        for &(i, _) in &decisions {
            for &j in &self.neighbors[i] {
                if !self.nodes[j].is_classified() {
                    frontier.push(j);
                }
            }
        }
        frontier.sort_unstable();
        frontier.dedup();

        self.iteration += 1;
        self.done = decisions.is_empty();
        self.frontier = Some(frontier);
        log::trace!(
            "basins: pass {} classified {}",
            self.iteration,
            decisions.len()
        );
        decisions.len()
    }

    /// Decision for unclassified node `i` against the current state.
    fn decide(&self, i: usize) -> Option<NodeState> {
        let e = self.nodes[i].energy;
        let mut joined: Option<(usize, usize)> = None;
        let mut boundary = false;
        for &j in &self.neighbors[i] {
            let nb = &self.nodes[j];
            let downhill = nb.energy <= e;
            if !downhill {
                continue;
            }
            match nb.state {
                NodeState::Unclassified if self.propagate_plateaus && nb.energy == e => {}
                NodeState::Unclassified => return None,
                NodeState::Boundary => boundary = true,
                NodeState::Assigned { basin_id, distance } => match joined {
                    None => joined = Some((basin_id, distance)),
                    Some((b, d)) if b == basin_id => joined = Some((b, d.min(distance))),
                    Some(_) => boundary = true,
                },
            }
        }
        if boundary {
            Some(NodeState::Boundary)
        } else {
            joined.map(|(basin_id, d)| NodeState::Assigned {
                basin_id,
                distance: d + 1,
            })
        }
    }

    /// Find attractors if needed, then expand until converged or the pass
    /// limit is hit. Returns the number of nodes classified by this call.
    pub fn find_basins(&mut self) -> usize {
        let mut total = 0;
        if self.iteration < 0 {
            total += self.find_attractors();
        }
        let mut passes = 0;
        while !self.done {
            if passes >= self.max_passes {
                log::warn!(
                    "basins: stopped after {passes} passes without converging"
                );
                break;
            }
            total += self.expand_basins();
            passes += 1;
        }
        let left = self.unclassified_count();
        if self.done && left > 0 {
            log::warn!("basins: converged with {left} nodes unclassified");
        }
        log::debug!(
            "basins: {} basins, {} nodes classified in {} passes",
            self.basins.len(),
            total,
            self.iteration
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// 5 × 5 lattice.
    fn grid() -> SkGeometry {
        SkGeometry::new(8, 4)
    }

    fn manhattan(p: SkPoint, m: usize, n: usize) -> usize {
        p.m.abs_diff(m) + p.n.abs_diff(n)
    }

    #[test]
    fn test_initial_state() {
        let c = BasinClassifier::with_field(&grid(), |_| 0.0);
        assert_eq!(c.iteration(), -1);
        assert_eq!(c.phase(), Phase::NotStarted);
        assert_eq!(c.node_data().len(), 25);
        assert!(c.node_data().iter().all(|n| n.is_boundary().is_none()));
    }

    #[test]
    fn test_single_minimum_fills_lattice() {
        let g = grid();
        let mut c = BasinClassifier::with_field(&g, |p| manhattan(p, 2, 2) as f64);
        let total = c.find_basins();
        assert_eq!(total, 25);
        assert_eq!(c.phase(), Phase::Converged);
        assert_eq!(c.basins().len(), 1);
        assert_eq!(c.basins()[0].size, 25);
        assert_eq!(c.basins()[0].attractor, g.sk_to_node_index(2, 2));

        for (i, p) in g.nodes() {
            let node = c.node_data()[i];
            assert_eq!(node.basin_id(), Some(0));
            assert_eq!(node.distance_to_attractor(), Some(manhattan(p, 2, 2)));
        }
    }

    #[test]
    fn test_distance_non_decreasing_outward() {
        let g = grid();
        let mut c = BasinClassifier::with_field(&g, |p| {
            let dm = p.m as f64 - 2.0;
            let dn = p.n as f64 - 2.0;
            dm * dm + dn * dn
        });
        c.find_basins();
        assert_eq!(c.unclassified_count(), 0);
        assert_eq!(c.basins().len(), 1);
        for (i, p) in g.nodes() {
            let d = c.node_data()[i].distance_to_attractor();
            for &j in &g.neighbors(i) {
                let q = g.node_index_to_sk(j);
                if manhattan(q, 2, 2) == manhattan(p, 2, 2) + 1 {
                    assert!(c.node_data()[j].distance_to_attractor() >= d);
                }
            }
        }
    }

    #[test]
    fn test_iteration_counter() {
        let g = grid();
        let mut c = BasinClassifier::with_field(&g, |p| manhattan(p, 0, 0) as f64);
        assert_eq!(c.find_attractors(), 1);
        assert_eq!(c.iteration(), 0);
        assert_eq!(c.phase(), Phase::AttractorsFound);
        assert_eq!(c.expand_basins(), 2);
        assert_eq!(c.iteration(), 1);
        assert_eq!(c.phase(), Phase::Iterating);
        c.find_basins();
        // Eight diagonals to fill, then one empty pass.
        assert_eq!(c.iteration(), 9);
        assert!(c.is_iteration_done());
        assert_eq!(c.expand_basins(), 0);
    }

    #[test]
    fn test_two_minima_split_by_boundary() {
        let g = grid();
        let ridge = [0.0, 1.0, 2.0, 1.0, 0.0];
        let mut c = BasinClassifier::with_field(&g, |p| {
            ridge[p.n] + 0.1 * (p.m as f64 - 2.0).abs()
        });
        c.find_basins();
        assert_eq!(c.basins().len(), 2);
        assert_eq!(c.unclassified_count(), 0);

        for (i, p) in g.nodes() {
            let node = c.node_data()[i];
            match p.n {
                2 => assert_eq!(node.is_boundary(), Some(true), "{p:?}"),
                n => {
                    let attractor = c.basins()[node.basin_id().unwrap()].attractor;
                    let seed = g.node_index_to_sk(attractor);
                    assert_eq!(seed.n < 2, n < 2, "{p:?}");
                }
            }
        }
        assert_eq!(c.basins()[0].size + c.basins()[1].size, 20);
    }

    /// 2 × 4 lattice: a minimum at (0, 0), a flat shelf along the rest
    /// of row 0, and row 1 above both.
    fn shelf() -> (SkGeometry, impl Fn(SkPoint) -> f64) {
        let field = |p: SkPoint| match (p.m, p.n) {
            (0, 0) => 0.0,
            (0, _) => 1.0,
            _ => 2.0,
        };
        (SkGeometry::new(4, 1), field)
    }

    #[test]
    fn test_unclassified_equal_neighbour_blocks() {
        let (g, field) = shelf();
        let mut c = BasinClassifier::with_field(&g, field);
        assert_eq!(c.find_attractors(), 1);

        // (0, 1) has the attractor below it, but its equal neighbour
        // (0, 2) is still unclassified.
        assert_eq!(c.expand_basins(), 0);
        let shelf_start = c.node_data()[g.sk_to_node_index(0, 1)];
        assert_eq!(shelf_start.state, NodeState::Unclassified);
        assert!(c.is_iteration_done());
        assert_eq!(c.phase(), Phase::Converged);
        assert_eq!(c.unclassified_count(), 7);
        assert_eq!(c.basins()[0].size, 1);
    }

    #[test]
    fn test_lower_neighbour_resolves_next_pass() {
        let g = SkGeometry::new(4, 1);
        let row = [[0.0, 1.0, 2.0, 3.0], [5.0, 6.0, 7.0, 8.0]];
        let mut c = BasinClassifier::with_field(&g, |p| row[p.m][p.n]);
        c.find_attractors();
        let at = |c: &BasinClassifier, n: usize| c.node_data()[g.sk_to_node_index(0, n)].state;

        c.expand_basins();
        assert_eq!(at(&c, 1), NodeState::Assigned { basin_id: 0, distance: 1 });
        assert_eq!(at(&c, 2), NodeState::Unclassified);

        c.expand_basins();
        assert_eq!(at(&c, 2), NodeState::Assigned { basin_id: 0, distance: 2 });
        assert_eq!(at(&c, 3), NodeState::Unclassified);

        c.find_basins();
        assert_eq!(c.unclassified_count(), 0);
    }

    #[test]
    fn test_plateau_propagation_opt_in() {
        let (g, field) = shelf();
        let mut c = BasinClassifier::with_field(&g, field).with_plateau_propagation(true);
        c.find_basins();
        assert_eq!(c.basins().len(), 1);
        assert_eq!(c.unclassified_count(), 0);
        for n in 1..=3 {
            let node = c.node_data()[g.sk_to_node_index(0, n)];
            assert_eq!(node.distance_to_attractor(), Some(n));
        }
    }

    #[test]
    fn test_boundary_neighbour_downhill_makes_boundary() {
        // 3 × 5: two minima in row 0 split by a ridge at n = 2; (1, 2)
        // drains only into the ridge node (0, 2).
        let g = SkGeometry::new(6, 2);
        let field = [
            [0.0, 1.0, 2.0, 1.0, 0.0],
            [10.0, 11.0, 3.0, 12.0, 13.0],
            [20.0, 21.0, 22.0, 23.0, 24.0],
        ];
        let mut c = BasinClassifier::with_field(&g, |p| field[p.m][p.n]);
        c.find_basins();
        assert_eq!(c.basins().len(), 2);
        assert_eq!(c.unclassified_count(), 0);

        let ridge = c.node_data()[g.sk_to_node_index(0, 2)];
        assert_eq!(ridge.is_boundary(), Some(true));
        let above = c.node_data()[g.sk_to_node_index(1, 2)];
        assert_eq!(above.is_boundary(), Some(true));
        assert_eq!(above.basin_id(), None);
        let side = c.node_data()[g.sk_to_node_index(1, 0)];
        assert_eq!(side.basin_id(), Some(0));
    }

    #[test]
    fn test_flat_field_has_no_attractors() {
        let mut c = BasinClassifier::with_field(&grid(), |_| 1.0);
        assert_eq!(c.find_basins(), 0);
        assert!(c.is_iteration_done());
        assert_eq!(c.unclassified_count(), 25);
    }

    #[test]
    fn test_random_field_fully_classified() {
        let mut rng = StdRng::seed_from_u64(0xba51);
        let g = SkGeometry::new(30, 12);
        let energies: Vec<f64> = (0..g.node_count()).map(|_| rng.gen::<f64>()).collect();
        let mut c = BasinClassifier::with_field(&g, |p| energies[g.sk_to_node_index(p.m, p.n)]);
        c.find_basins();
        assert_eq!(c.unclassified_count(), 0);

        let sizes: usize = c.basins().iter().map(|b| b.size).sum();
        let boundaries = c
            .node_data()
            .iter()
            .filter(|n| n.is_boundary() == Some(true))
            .count();
        assert_eq!(sizes + boundaries, g.node_count());

        for (i, node) in c.node_data().iter().enumerate() {
            match node.state {
                NodeState::Assigned { distance: 0, basin_id } => {
                    assert_eq!(c.basins()[basin_id].attractor, i);
                }
                NodeState::Assigned { basin_id, distance } => {
                    let parent = g.neighbors(i).iter().any(|&j| {
                        let nb = c.node_data()[j];
                        nb.energy <= node.energy
                            && nb.state
                                == NodeState::Assigned {
                                    basin_id,
                                    distance: distance - 1,
                                }
                    });
                    assert!(parent, "node {i} has no parent");
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_pass_limit() {
        let g = grid();
        let mut c =
            BasinClassifier::with_field(&g, |p| manhattan(p, 0, 0) as f64).with_max_passes(2);
        c.find_basins();
        assert_eq!(c.iteration(), 2);
        assert!(!c.is_iteration_done());
        assert_eq!(c.phase(), Phase::Iterating);
    }

    #[test]
    fn test_reset_keeps_energies() {
        let g = grid();
        let mut c = BasinClassifier::with_field(&g, |p| manhattan(p, 2, 2) as f64);
        c.find_basins();
        c.reset();
        assert_eq!(c.iteration(), -1);
        assert!(c.basins().is_empty());
        assert_eq!(c.unclassified_count(), 25);
        assert_eq!(c.node_data()[0].energy, 4.0);
    }

    #[test]
    fn test_refresh_lifecycle() {
        let mut g = SkGeometry::new(12, 4);
        let mut p = SkPhysics::new(1.0, 0.5, 1.0);
        let mut c = BasinClassifier::new(&g, &p);
        c.find_basins();
        assert!(!c.refresh(&g, &p));
        assert_eq!(c.phase(), Phase::Converged);

        p.set_alpha1(-1.0);
        assert!(c.refresh(&g, &p));
        assert_eq!(c.phase(), Phase::NotStarted);
        assert_eq!(
            c.node_data()[g.sk_to_node_index(1, 0)].energy,
            p.energy(&g, 1, 0)
        );

        g.set_n(20);
        assert!(c.refresh(&g, &p));
        assert_eq!(c.node_data().len(), g.node_count());
        assert!(!c.refresh(&g, &p));
    }

    #[test]
    fn test_refresh_replaces_custom_field() {
        let g = SkGeometry::new(12, 4);
        let p = SkPhysics::new(1.0, 0.5, 1.0);
        let mut c = BasinClassifier::with_field(&g, |_| 0.0).with_max_passes(7);
        assert!(c.refresh(&g, &p));
        for (i, pt) in g.nodes() {
            assert_eq!(c.node_data()[i].energy, p.energy(&g, pt.m, pt.n));
        }
        assert_eq!(c.max_passes, 7);
        assert!(!c.refresh(&g, &p));
    }

    #[test]
    fn test_refresh_follows_other_lattice() {
        let p = SkPhysics::default();
        let small = SkGeometry::new(10, 2);
        let large = SkGeometry::new(40, 10);
        let mut c = BasinClassifier::new(&small, &p);
        assert!(c.refresh(&large, &p));
        assert_eq!(c.node_data().len(), large.node_count());
    }

    #[test]
    fn test_physics_energy_classified() {
        let g = SkGeometry::new(40, 20);
        let p = SkPhysics::new(1.0, 1.0, 1.0);
        let mut c = BasinClassifier::new(&g, &p);
        c.find_basins();
        assert!(c.is_iteration_done());
        assert!(!c.basins().is_empty());
        assert_eq!(c.unclassified_count(), 0);
    }
}
