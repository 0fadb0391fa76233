use ndarray::{Array2, Array4};
use rand::SeedableRng;
use rand::rngs::StdRng;
use crate::activations::Activation;
use crate::layers::{CellKind, Dense, FeatureModule, GraphTransformer, Mlp, Module, ParamCount, Rnn};
use super::fixtures::{team_graph, perturb_node, EDGE_DIM, NODE_DIM};

#[test]
fn test_dense_param_count() {
    let layer = Dense::new(5, 3, Activation::Relu);
    let params = layer.init_params(&mut StdRng::seed_from_u64(1));
    assert_eq!(params.num_parameters(), 5 * 3 + 3);
}

#[test]
fn test_mlp_shapes() {
    let mlp = Mlp::new(6, &[64, 64], Activation::Relu, true);
    let params = mlp.init_params(&mut StdRng::seed_from_u64(1));
    let out = mlp.apply(&params, Array2::ones((3, 6)).view());
    assert_eq!(out.dim(), (3, 64));
    assert!(out.iter().all(|&v| v >= 0.0));
    assert_eq!(mlp.output_size(), 64);
}

#[test]
fn test_mlp_linear_final_layer() {
    let mlp = Mlp::new(2, &[8, 1], Activation::Relu, false);
    assert_eq!(mlp.layers()[1].activation, Activation::Linear);
}

#[test]
fn test_seeded_init_is_reproducible() {
    let mlp = Mlp::new(4, &[16, 16], Activation::Tanh, true);
    let a = mlp.init_params(&mut StdRng::seed_from_u64(7));
    let b = mlp.init_params(&mut StdRng::seed_from_u64(7));
    let c = mlp.init_params(&mut StdRng::seed_from_u64(8));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_rnn_carry_shapes() {
    let gru = Rnn::new(CellKind::Gru, 8, 16, 2);
    let lstm = Rnn::new(CellKind::Lstm, 8, 16, 3);
    assert_eq!(gru.carry_shape(4), (4, 2, 1, 16));
    assert_eq!(lstm.carry_shape(1), (1, 3, 2, 16));
    assert_eq!(lstm.initialize_carry(2), Array4::<f32>::zeros((2, 3, 2, 16)));
}

#[test]
fn test_rnn_rows_are_independent() {
    let rnn = Rnn::new(CellKind::Lstm, 3, 5, 2);
    let params = rnn.init_params(&mut StdRng::seed_from_u64(3));

    let mut x = Array2::from_shape_fn((2, 3), |(i, j)| (i + j) as f32 * 0.5);
    let (out, carry) = rnn.apply(&params, x.view(), rnn.initialize_carry(2).view());
    assert_eq!(out.dim(), (2, 5));
    assert_eq!(carry.dim(), (2, 2, 2, 5));

    x.row_mut(1).fill(-2.0);
    let (out2, _) = rnn.apply(&params, x.view(), rnn.initialize_carry(2).view());
    assert_eq!(out.row(0), out2.row(0));
    assert_ne!(out.row(1), out2.row(1));
}

#[test]
#[should_panic(expected = "Recurrent state has shape")]
fn test_rnn_rejects_wrong_carry() {
    let rnn = Rnn::new(CellKind::Gru, 3, 5, 1);
    let params = rnn.init_params(&mut StdRng::seed_from_u64(3));
    rnn.apply(&params, Array2::zeros((2, 3)).view(), Array4::zeros((2, 1, 2, 5)).view());
}

#[test]
fn test_gnn_embeds_agents() {
    let gnn = GraphTransformer::new(NODE_DIM, EDGE_DIM, 32, 16, 3, 2);
    let params = gnn.init_params(&mut StdRng::seed_from_u64(0));
    let graph = team_graph(3);

    let all = gnn.embed_nodes(&params, &graph);
    assert_eq!(all.dim(), (6, 16));

    let agents = gnn.apply(&params, &graph, 0, 3);
    assert_eq!(agents.dim(), (3, 16));
    assert_eq!(agents.row(2), all.row(2));
    assert!(agents.iter().all(|v| v.is_finite()));
}

#[test]
fn test_gnn_messages_follow_edges() {
    let gnn = GraphTransformer::new(NODE_DIM, EDGE_DIM, 32, 16, 3, 1);
    let params = gnn.init_params(&mut StdRng::seed_from_u64(0));
    let graph = team_graph(2);

    // Goal 3 only talks to agent 1
    let before = gnn.apply(&params, &graph, 0, 2);
    let after = gnn.apply(&params, &perturb_node(&graph, 3, 5.0), 0, 2);
    assert_eq!(before.row(0), after.row(0));
}

#[test]
#[should_panic(expected = "Expected 4 nodes of type 0")]
fn test_gnn_rejects_wrong_agent_count() {
    let gnn = GraphTransformer::new(NODE_DIM, EDGE_DIM, 32, 16, 3, 1);
    let params = gnn.init_params(&mut StdRng::seed_from_u64(0));
    gnn.apply(&params, &team_graph(3), 0, 4);
}
