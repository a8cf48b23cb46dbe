// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Dynamics
// (C) 2026 The skglass-kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Processes that run over the lattice fields:
//!
//! - [`basin`]: partitions nodes into basins of attraction of the energy
//!   landscape, separated by boundary nodes.
//! - [`flow`]: the stateless Metropolis rule that moves a node's
//!   log-space probability mass onto its neighbours.
//! - [`simulation`]: a lattice-wide scheduler applying the flow rule once
//!   per node per step.
//!
//! Both stateful components follow the same lifecycle: rebuilt when the
//! geometry change number advances, reset when only the physics change
//! number does.

pub mod basin;
pub mod flow;
pub mod simulation;

pub use basin::{Basin, BasinClassifier, BasinNode, NodeState, Phase};
pub use flow::{FlowNode, FlowTransfer, MetropolisFlow};
pub use simulation::{FlowInit, FlowSimulation};
