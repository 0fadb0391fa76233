use ndarray::Array2;
use crate::error::{Result, PhalanxError};
use crate::graph::GraphObs;

/// Incremental construction of a [`GraphObs`]
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    node_dim: usize,
    edge_dim: usize,
    nodes: Vec<f32>,
    node_type: Vec<usize>,
    edges: Vec<f32>,
    senders: Vec<usize>,
    receivers: Vec<usize>,
}

impl GraphBuilder {
    pub fn new(node_dim: usize, edge_dim: usize) -> Self {
        GraphBuilder {
            node_dim,
            edge_dim,
            nodes: Vec::new(),
            node_type: Vec::new(),
            edges: Vec::new(),
            senders: Vec::new(),
            receivers: Vec::new(),
        }
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, features: &[f32], node_type: usize) -> Result<usize> {
        if features.len() != self.node_dim {
            return Err(PhalanxError::dimension_mismatch(
                format!("{} node features", self.node_dim),
                format!("{} node features", features.len()),
            ));
        }
        self.nodes.extend_from_slice(features);
        self.node_type.push(node_type);
        Ok(self.node_type.len() - 1)
    }

    /// Add a directed edge from `sender` to `receiver`
    pub fn add_edge(&mut self, sender: usize, receiver: usize, features: &[f32]) -> Result<()> {
        if features.len() != self.edge_dim {
            return Err(PhalanxError::dimension_mismatch(
                format!("{} edge features", self.edge_dim),
                format!("{} edge features", features.len()),
            ));
        }
        self.edges.extend_from_slice(features);
        self.senders.push(sender);
        self.receivers.push(receiver);
        Ok(())
    }

    pub fn build(self) -> Result<GraphObs> {
        let nodes = Array2::from_shape_vec((self.node_type.len(), self.node_dim), self.nodes)
            .map_err(|e| PhalanxError::InvalidGraph(e.to_string()))?;
        let edges = Array2::from_shape_vec((self.senders.len(), self.edge_dim), self.edges)
            .map_err(|e| PhalanxError::InvalidGraph(e.to_string()))?;
        GraphObs::new(nodes, edges, self.senders, self.receivers, self.node_type)
    }
}
