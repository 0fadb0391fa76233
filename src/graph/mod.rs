//! # Graph Observations
//!
//! A [`GraphObs`] is the per-step observation of the whole team: one node per
//! agent plus any number of other entities (goals, obstacles, ...), and
//! directed edges carrying relative features. Agents are the nodes tagged with
//! [`AGENT_NODE_TYPE`], in node order.

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

use crate::error::{PhalanxError, Result};

/// Node type tag of per-agent nodes
pub const AGENT_NODE_TYPE: usize = 0;

/// A single graph observation
///
/// Deserialized graphs go through [`GraphObs::new`], so a stored rollout or
/// JSON observation can never hold out-of-range edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraphObs")]
pub struct GraphObs {
    nodes: Array2<f32>,
    edges: Array2<f32>,
    senders: Vec<usize>,
    receivers: Vec<usize>,
    node_type: Vec<usize>,
}

/// Unchecked wire form of [`GraphObs`]
#[derive(Deserialize)]
struct RawGraphObs {
    nodes: Array2<f32>,
    edges: Array2<f32>,
    senders: Vec<usize>,
    receivers: Vec<usize>,
    node_type: Vec<usize>,
}

impl TryFrom<RawGraphObs> for GraphObs {
    type Error = PhalanxError;

    fn try_from(raw: RawGraphObs) -> Result<Self> {
        GraphObs::new(raw.nodes, raw.edges, raw.senders, raw.receivers, raw.node_type)
    }
}

impl GraphObs {
    /// Build a graph observation, checking that every array agrees on sizes
    ///
    /// * `nodes` - `(n_nodes, node_dim)` node features
    /// * `edges` - `(n_edges, edge_dim)` edge features
    /// * `senders`, `receivers` - node indices of each edge
    /// * `node_type` - type tag of each node
    pub fn new(
        nodes: Array2<f32>,
        edges: Array2<f32>,
        senders: Vec<usize>,
        receivers: Vec<usize>,
        node_type: Vec<usize>,
    ) -> Result<Self> {
        let n_nodes = nodes.nrows();
        let n_edges = edges.nrows();

        if node_type.len() != n_nodes {
            return Err(PhalanxError::dimension_mismatch(
                format!("{} node types", n_nodes),
                format!("{} node types", node_type.len()),
            ));
        }
        if senders.len() != n_edges || receivers.len() != n_edges {
            return Err(PhalanxError::dimension_mismatch(
                format!("{} senders and receivers", n_edges),
                format!("{} senders and {} receivers", senders.len(), receivers.len()),
            ));
        }
        if let Some(&bad) = senders.iter().chain(&receivers).find(|&&idx| idx >= n_nodes) {
            return Err(PhalanxError::InvalidGraph(format!(
                "edge endpoint {} out of range for {} nodes",
                bad, n_nodes
            )));
        }

        Ok(GraphObs { nodes, edges, senders, receivers, node_type })
    }

    /// Parse a JSON graph observation, reporting malformed graphs as
    /// [`PhalanxError::InvalidGraph`] or [`PhalanxError::DimensionMismatch`]
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawGraphObs = serde_json::from_str(json)?;
        GraphObs::try_from(raw)
    }

    /// A graph without edges
    pub fn without_edges(nodes: Array2<f32>, edge_dim: usize, node_type: Vec<usize>) -> Result<Self> {
        Self::new(nodes, Array2::zeros((0, edge_dim)), Vec::new(), Vec::new(), node_type)
    }

    /// Same topology with replaced node features
    pub fn with_node_features(&self, nodes: Array2<f32>) -> Result<Self> {
        if nodes.nrows() != self.n_nodes() {
            return Err(PhalanxError::dimension_mismatch(
                format!("{} nodes", self.n_nodes()),
                format!("{} nodes", nodes.nrows()),
            ));
        }
        Ok(GraphObs { nodes, ..self.clone() })
    }

    pub fn nodes(&self) -> ArrayView2<'_, f32> {
        self.nodes.view()
    }

    pub fn edges(&self) -> ArrayView2<'_, f32> {
        self.edges.view()
    }

    pub fn senders(&self) -> &[usize] {
        &self.senders
    }

    pub fn receivers(&self) -> &[usize] {
        &self.receivers
    }

    pub fn node_types(&self) -> &[usize] {
        &self.node_type
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.nrows()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.nrows()
    }

    pub fn node_dim(&self) -> usize {
        self.nodes.ncols()
    }

    pub fn edge_dim(&self) -> usize {
        self.edges.ncols()
    }

    /// Indices of the nodes of type `node_type`, in node order
    pub fn type_indices(&self, node_type: usize) -> Vec<usize> {
        self.node_type
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == node_type)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of nodes per type
    pub fn type_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &t in &self.node_type {
            *counts.entry(t).or_insert(0) += 1;
        }
        counts
    }

    /// Number of agent nodes
    pub fn n_agents(&self) -> usize {
        self.type_counts().get(&AGENT_NODE_TYPE).copied().unwrap_or(0)
    }
}
