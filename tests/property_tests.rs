#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use phalanx::layers::{Module, ParamCount};
    use phalanx::value::{LatentEncoder, ValueNetConfig};
    use phalanx::ValueNet;
    use ndarray::{Array1, Array2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn latent_strategy(size: usize) -> impl Strategy<Value = Array1<f32>> {
        prop::collection::vec(-1e3f32..1e3, size).prop_map(Array1::from_vec)
    }

    proptest! {
        #[test]
        fn test_latent_embedding_is_bounded(z in latent_strategy(6), nz in 1usize..16, seed in any::<u64>()) {
            let encoder = LatentEncoder::new(nz, 1.0, 1.0);
            let params = encoder.init_params(&mut StdRng::seed_from_u64(seed));
            let enc = encoder.encode(&params, z.view());

            prop_assert_eq!(enc.dim(), (6, nz));
            for &v in enc.iter() {
                prop_assert!((-1.0..=1.0).contains(&v));
            }
        }

        #[test]
        fn test_value_shape_matches_config(
            n_agents in 1usize..5,
            n_out in 1usize..4,
            use_rnn in any::<bool>(),
            decompose in any::<bool>(),
            use_global_info in any::<bool>(),
        ) {
            let config = ValueNetConfig {
                n_out,
                use_rnn,
                decompose,
                use_global_info,
                ..ValueNetConfig::new(2, 1, n_agents)
            };
            let net = ValueNet::new(config).unwrap();
            let params = net.init_params(0);
            prop_assert!(params.num_parameters() > 0);

            let nodes = Array2::from_shape_fn((n_agents, 2), |(i, j)| (i + j) as f32);
            let graph = phalanx::GraphObs::without_edges(nodes, 1, vec![0; n_agents]).unwrap();
            let state = net.initialize_carry(0);
            let (value, next) = net.get_value(&params, &graph, state.view(), None);

            if decompose {
                prop_assert_eq!(value.shape(), &[n_agents, n_out][..]);
            } else {
                prop_assert_eq!(value.shape(), &[n_out][..]);
            }
            prop_assert_eq!(next.shape(), state.shape());
        }
    }
}
