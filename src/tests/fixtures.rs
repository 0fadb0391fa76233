//! Shared graphs and networks for the unit tests
use ndarray::Array2;
use crate::graph::GraphObs;
use crate::value::{ValueNet, ValueNetConfig};

pub const NODE_DIM: usize = 4;
pub const EDGE_DIM: usize = 2;
pub const GOAL_NODE_TYPE: usize = 1;

fn feature(i: usize, j: usize) -> f32 {
    ((i * 7 + j * 3) as f32 * 0.37).sin()
}

/// `n_agents` agents followed by one goal per agent; each goal sends a single
/// edge to its own agent, so agents never exchange messages.
pub fn team_graph(n_agents: usize) -> GraphObs {
    let n_nodes = 2 * n_agents;
    let nodes = Array2::from_shape_fn((n_nodes, NODE_DIM), |(i, j)| feature(i, j));
    let edges = Array2::from_shape_fn((n_agents, EDGE_DIM), |(i, j)| feature(i + 11, j));
    let senders = (n_agents..n_nodes).collect();
    let receivers = (0..n_agents).collect();
    let mut node_type = vec![0; n_agents];
    node_type.extend(vec![GOAL_NODE_TYPE; n_agents]);

    GraphObs::new(nodes, edges, senders, receivers, node_type).unwrap()
}

/// Same topology as `graph` with node `node`'s features shifted by `delta`
pub fn perturb_node(graph: &GraphObs, node: usize, delta: f32) -> GraphObs {
    let mut nodes = graph.nodes().to_owned();
    nodes.row_mut(node).mapv_inplace(|v| v + delta);
    graph.with_node_features(nodes).unwrap()
}

pub fn config(n_agents: usize) -> ValueNetConfig {
    ValueNetConfig::new(NODE_DIM, EDGE_DIM, n_agents)
}

pub fn net(config: ValueNetConfig) -> ValueNet {
    ValueNet::new(config).unwrap()
}
