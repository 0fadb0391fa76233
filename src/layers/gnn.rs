//! Graph transformer message passing
//!
//! Each layer runs multi-head dot-product attention over the incoming edges of
//! every node. Keys and values of an edge are the sender's projection plus the
//! projected edge features; the attended message goes through an output
//! projection and is added to a skip projection of the receiver's own state.

use ndarray::{s, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;
use crate::graph::GraphObs;
use super::dense::{Dense, DenseParams};
use super::traits::{FeatureModule, Module, ParamCount};

/// Attention-based graph neural network definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTransformer {
    pub node_dim: usize,
    pub edge_dim: usize,
    pub msg_dim: usize,
    pub out_dim: usize,
    pub n_heads: usize,
    pub n_layers: usize,
}

/// Weights of one attention layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionParams {
    pub query: DenseParams,
    pub key: DenseParams,
    pub value: DenseParams,
    pub edge: DenseParams,
    pub out: DenseParams,
    pub skip: DenseParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnnParams {
    pub node_encoder: DenseParams,
    pub edge_encoder: DenseParams,
    pub layers: Vec<AttentionParams>,
    pub output: DenseParams,
}

impl GraphTransformer {
    pub fn new(node_dim: usize, edge_dim: usize, msg_dim: usize, out_dim: usize, n_heads: usize, n_layers: usize) -> Self {
        GraphTransformer { node_dim, edge_dim, msg_dim, out_dim, n_heads, n_layers }
    }

    fn node_encoder(&self) -> Dense {
        Dense::new(self.node_dim, self.msg_dim, Activation::Relu)
    }

    fn edge_encoder(&self) -> Dense {
        Dense::new(self.edge_dim, self.msg_dim, Activation::Relu)
    }

    fn head_projection(&self) -> Dense {
        Dense::linear(self.msg_dim, self.n_heads * self.msg_dim)
    }

    fn merge_heads(&self) -> Dense {
        Dense::linear(self.n_heads * self.msg_dim, self.msg_dim)
    }

    fn skip(&self) -> Dense {
        Dense::linear(self.msg_dim, self.msg_dim)
    }

    fn output(&self) -> Dense {
        Dense::linear(self.msg_dim, self.out_dim)
    }

    /// Embeddings of every node, `(n_nodes, out_dim)`
    pub fn embed_nodes(&self, params: &GnnParams, graph: &GraphObs) -> Array2<f32> {
        assert_eq!(graph.node_dim(), self.node_dim, "Graph node features have the wrong width");
        assert_eq!(graph.edge_dim(), self.edge_dim, "Graph edge features have the wrong width");
        assert_eq!(params.layers.len(), self.n_layers, "GNN parameter tree has wrong depth");

        let mut h = self.node_encoder().apply(&params.node_encoder, graph.nodes());
        let e = self.edge_encoder().apply(&params.edge_encoder, graph.edges());

        for layer in &params.layers {
            h = self.attend(layer, h.view(), e.view(), graph);
        }

        self.output().apply(&params.output, h.view())
    }

    /// Embeddings of the `n_type` nodes of type `node_type`, `(n_type, out_dim)`
    ///
    /// # Panics
    /// When the graph does not hold exactly `n_type` nodes of that type.
    pub fn apply(&self, params: &GnnParams, graph: &GraphObs, node_type: usize, n_type: usize) -> Array2<f32> {
        let indices = graph.type_indices(node_type);
        assert_eq!(
            indices.len(),
            n_type,
            "Expected {} nodes of type {}, graph has {}",
            n_type,
            node_type,
            indices.len()
        );

        self.embed_nodes(params, graph).select(Axis(0), &indices)
    }

    fn attend(&self, params: &AttentionParams, h: ArrayView2<f32>, e: ArrayView2<f32>, graph: &GraphObs) -> Array2<f32> {
        let n_nodes = h.nrows();
        let (n_heads, d) = (self.n_heads, self.msg_dim);
        let proj = self.head_projection();
        let scale = 1.0 / (d as f32).sqrt();

        let q = proj.apply(&params.query, h);
        let k = proj.apply(&params.key, h);
        let v = proj.apply(&params.value, h);
        let ep = proj.apply(&params.edge, e);

        let senders = graph.senders();
        let receivers = graph.receivers();

        // Scaled dot-product logits per edge and head
        let mut logits = Array2::<f32>::zeros((senders.len(), n_heads));
        for (idx, (&src, &dst)) in senders.iter().zip(receivers).enumerate() {
            for head in 0..n_heads {
                let cols = s![head * d..(head + 1) * d];
                let key = &k.slice(s![src, head * d..(head + 1) * d]) + &ep.slice(s![idx, head * d..(head + 1) * d]);
                logits[[idx, head]] = q.row(dst).slice(cols).dot(&key) * scale;
            }
        }

        // Softmax over the incoming edges of each receiver
        let mut max = Array2::from_elem((n_nodes, n_heads), f32::NEG_INFINITY);
        for (idx, &dst) in receivers.iter().enumerate() {
            for head in 0..n_heads {
                max[[dst, head]] = max[[dst, head]].max(logits[[idx, head]]);
            }
        }
        let mut denom = Array2::<f32>::zeros((n_nodes, n_heads));
        for (idx, &dst) in receivers.iter().enumerate() {
            for head in 0..n_heads {
                let w = (logits[[idx, head]] - max[[dst, head]]).exp();
                logits[[idx, head]] = w;
                denom[[dst, head]] += w;
            }
        }

        // Nodes without incoming edges receive a zero message
        let mut messages = Array2::<f32>::zeros((n_nodes, n_heads * d));
        for (idx, (&src, &dst)) in senders.iter().zip(receivers).enumerate() {
            for head in 0..n_heads {
                let alpha = logits[[idx, head]] / denom[[dst, head]];
                let value = &v.slice(s![src, head * d..(head + 1) * d]) + &ep.slice(s![idx, head * d..(head + 1) * d]);
                messages
                    .slice_mut(s![dst, head * d..(head + 1) * d])
                    .scaled_add(alpha, &value);
            }
        }

        let merged = self.merge_heads().apply(&params.out, messages.view());
        let skipped = self.skip().apply(&params.skip, h);
        Activation::Relu.applied(merged + skipped)
    }
}

impl Module for GraphTransformer {
    type Params = GnnParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> GnnParams {
        let node_encoder = self.node_encoder().init_params(rng);
        let edge_encoder = self.edge_encoder().init_params(rng);
        let layers = (0..self.n_layers)
            .map(|_| AttentionParams {
                query: self.head_projection().init_params(rng),
                key: self.head_projection().init_params(rng),
                value: self.head_projection().init_params(rng),
                edge: self.head_projection().init_params(rng),
                out: self.merge_heads().init_params(rng),
                skip: self.skip().init_params(rng),
            })
            .collect();
        let output = self.output().init_params(rng);

        GnnParams { node_encoder, edge_encoder, layers, output }
    }
}

impl ParamCount for AttentionParams {
    fn num_parameters(&self) -> usize {
        [&self.query, &self.key, &self.value, &self.edge, &self.out, &self.skip]
            .iter()
            .map(|p| p.num_parameters())
            .sum()
    }
}

impl ParamCount for GnnParams {
    fn num_parameters(&self) -> usize {
        self.node_encoder.num_parameters()
            + self.edge_encoder.num_parameters()
            + self.layers.num_parameters()
            + self.output.num_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn line_graph() -> GraphObs {
        // agent0 <- goal -> agent1, agent2 isolated
        GraphObs::new(
            array![[1.0, 0.5], [0.2, -0.4], [0.9, 0.1], [-1.0, 1.0]],
            array![[0.3, 0.1], [-0.2, 0.7]],
            vec![3, 3],
            vec![0, 1],
            vec![0, 0, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_apply_selects_agent_rows() {
        let gnn = GraphTransformer::new(2, 2, 8, 5, 3, 2);
        let params = gnn.init_params(&mut StdRng::seed_from_u64(0));
        let graph = line_graph();

        let all = gnn.embed_nodes(&params, &graph);
        let agents = gnn.apply(&params, &graph, 0, 3);
        assert_eq!(all.dim(), (4, 5));
        assert_eq!(agents.dim(), (3, 5));
        assert_eq!(agents, all.slice(s![0..3, ..]));
    }

    #[test]
    fn test_messages_only_flow_along_edges() {
        let gnn = GraphTransformer::new(2, 2, 8, 4, 3, 1);
        let params = gnn.init_params(&mut StdRng::seed_from_u64(1));
        let graph = line_graph();
        let before = gnn.embed_nodes(&params, &graph);

        // Perturb the isolated agent: nobody else may notice
        let mut nodes = graph.nodes().to_owned();
        nodes.row_mut(2).fill(0.0);
        let after = gnn.embed_nodes(&params, &graph.with_node_features(nodes).unwrap());

        assert_eq!(before.row(0), after.row(0));
        assert_eq!(before.row(1), after.row(1));
        assert_eq!(before.row(3), after.row(3));
    }

    #[test]
    #[should_panic(expected = "Expected 2 nodes of type 0")]
    fn test_apply_panics_on_agent_count_mismatch() {
        let gnn = GraphTransformer::new(2, 2, 4, 4, 1, 1);
        let params = gnn.init_params(&mut StdRng::seed_from_u64(0));
        gnn.apply(&params, &line_graph(), 0, 2);
    }
}
