use ndarray::{s, stack, Array1, Array2, Array3, Array4, ArrayD, Axis};
use phalanx::{
    builders::{GraphBuilder, ValueNetBuilder},
    graph::GraphObs,
    value::{ValueFnParams, ValueNetConfig},
    PhalanxError, Rollout, ValueNet,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two agents chasing their goals; goals send one edge to their agent
fn step_graph(t: usize) -> GraphObs {
    let shift = t as f32 * 0.1;
    let mut builder = GraphBuilder::new(3, 2);
    let a0 = builder.add_node(&[shift, 0.0, 1.0], 0).unwrap();
    let a1 = builder.add_node(&[0.0, -shift, 1.0], 0).unwrap();
    let g0 = builder.add_node(&[1.0, 1.0, 0.0], 1).unwrap();
    let g1 = builder.add_node(&[-1.0, 1.0, 0.0], 1).unwrap();
    builder.add_edge(g0, a0, &[1.0 - shift, 1.0]).unwrap();
    builder.add_edge(g1, a1, &[-1.0, 1.0 + shift]).unwrap();
    builder.build().unwrap()
}

#[test]
fn test_recurrent_rollout_end_to_end() {
    init_logging();

    let net = ValueNetBuilder::new()
        .node_dim(3)
        .edge_dim(2)
        .n_agents(2)
        .with_lstm(1)
        .decomposed(true)
        .latent_conditioned(true)
        .build()
        .unwrap();
    let params = net.init_params(11);
    let z = Array1::from_vec(vec![0.0, 2.0]);

    let horizon = 6;
    let mut state = net.initialize_carry(0);
    let mut states = Vec::new();
    let mut values = Vec::new();
    let mut graphs = Vec::new();
    for t in 0..horizon {
        let graph = step_graph(t);
        states.push(state.clone());
        let (value, next) = net.get_value(&params, &graph, state.view(), Some(z.view()));
        assert_eq!(value.shape(), &[2, 1]);
        assert!(value.iter().all(|v| v.is_finite()));
        values.push(value);
        graphs.push(graph);
        state = next;
    }
    assert_eq!(state.shape(), &[2, 1, 2, 64]);

    let state_views: Vec<_> = states.iter().map(ArrayD::view).collect();
    let rnn_states = stack(Axis(0), &state_views).unwrap().insert_axis(Axis(0));
    let graph = Array2::from_shape_vec((1, horizon), graphs.clone()).unwrap();
    let next_graph = Array2::from_shape_vec((1, horizon), graphs[1..].iter().chain(&graphs[horizon - 1..]).cloned().collect()).unwrap();
    let value_views: Vec<_> = values.iter().map(|v| v.index_axis(Axis(1), 0)).collect();
    let rewards = stack(Axis(0), &value_views).unwrap().insert_axis(Axis(0)).into_dimensionality().unwrap();

    let rollout = Rollout::checked(
        graph,
        Array4::zeros((1, horizon, 2, 2)),
        rnn_states,
        rewards,
        Array4::zeros((1, horizon, 2, 1)),
        Array3::from_elem((1, horizon, 2), false),
        Array3::zeros((1, horizon, 2)),
        next_graph,
        Some(Array3::from_shape_fn((1, horizon, 2), |(_, _, a)| z[a])),
        None,
    )
    .unwrap();
    assert_eq!(rollout.n_data(), horizon);

    // Replaying the stored states reproduces the recorded values
    let t = 3;
    let (replayed, _) = net.get_value(
        &params,
        &rollout.graph[[0, t]],
        rollout.rnn_states.index_axis(Axis(0), 0).index_axis_move(Axis(0), t),
        Some(z.view()),
    );
    let replayed: Vec<f32> = replayed.iter().copied().collect();
    assert_eq!(replayed, rollout.rewards.slice(s![0, t, ..]).to_vec());
}

#[test]
fn test_config_file_and_params_roundtrip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("value.json");
    std::fs::write(
        &config_path,
        r#"{"node_dim": 3, "edge_dim": 2, "n_agents": 2, "use_rnn": false, "n_out": 3}"#,
    )
    .unwrap();
    let config = ValueNetConfig::from_file(&config_path).unwrap();
    let net = ValueNet::new(config).unwrap();
    assert!(!net.is_recurrent());

    let params = net.init_params(0);
    let params_path = dir.path().join("value.bin");
    params.save(&params_path).unwrap();
    let loaded = ValueFnParams::load(&params_path).unwrap();

    let graph = step_graph(0);
    let state = net.initialize_carry(0);
    let (a, _) = net.get_value(&params, &graph, state.view(), None);
    let (b, _) = net.get_value(&loaded, &graph, state.view(), None);
    assert_eq!(a.shape(), &[3]);
    assert_eq!(a, b);
}

#[test]
fn test_invalid_inputs_are_errors() {
    let err = ValueNetBuilder::new().edge_dim(2).n_agents(2).build().unwrap_err();
    assert!(matches!(err, PhalanxError::InvalidParameter { .. }));

    let mut builder = GraphBuilder::new(3, 2);
    builder.add_node(&[0.0, 0.0, 0.0], 0).unwrap();
    assert!(builder.add_node(&[0.0, 0.0], 0).is_err());
    builder.add_edge(0, 5, &[0.0, 0.0]).unwrap();
    assert!(matches!(builder.build(), Err(PhalanxError::InvalidGraph(_))));

    assert!(ValueNetConfig::from_json("{\"node_dim\": 3}").is_err());
}
