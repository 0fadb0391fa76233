//! # Phalanx - Graph Value Networks for Multi-Agent Reinforcement Learning
//!
//! Phalanx provides the value-function side of a multi-agent actor-critic
//! trainer: graph neural network encoders over team observations, recurrent
//! memories, centralized and per-agent value heads, latent-code conditioning,
//! and the rollout container the trainer fills.
//!
//! ## Key Features
//!
//! - **Graph Encoders**: multi-head attention message passing over [`graph::GraphObs`]
//! - **Recurrent Memory**: stacked GRU or LSTM cells with caller-held carries
//! - **Value Heads**: centralized team values or decomposed per-agent values
//! - **Latent Conditioning**: strategy codes fused into any feature network
//! - **Functional Models**: definitions never own weights; parameters are
//!   plain serializable structs passed into every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phalanx::builders::{GraphBuilder, ValueNetBuilder};
//!
//! let net = ValueNetBuilder::new()
//!     .node_dim(4)
//!     .edge_dim(2)
//!     .n_agents(2)
//!     .with_gru(1)
//!     .decomposed(true)
//!     .build()
//!     .unwrap();
//! let params = net.init_params(42);
//!
//! let mut graph = GraphBuilder::new(4, 2);
//! let a = graph.add_node(&[0.0, 0.0, 1.0, 0.0], 0).unwrap();
//! let b = graph.add_node(&[1.0, 0.0, 0.0, 1.0], 0).unwrap();
//! graph.add_edge(a, b, &[1.0, 0.0]).unwrap();
//! let graph = graph.build().unwrap();
//!
//! let carry = net.initialize_carry(0);
//! let (values, carry) = net.get_value(&params, &graph, carry.view(), None);
//! assert_eq!(values.shape(), &[2, 1]);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, Linear)
//! - [`builders`] - Builder patterns for value networks and graphs
//! - [`error`] - Error types and result handling
//! - [`graph`] - Graph observations
//! - [`layers`] - Dense, MLP, recurrent and graph transformer layers
//! - [`rollout`] - Trajectory batches
//! - [`value`] - Value functions and the value network facade

pub mod activations;
pub mod builders;
pub mod error;
pub mod graph;
pub mod layers;
pub mod rollout;
pub mod value;

pub use error::{PhalanxError, Result};
pub use graph::GraphObs;
pub use rollout::Rollout;
pub use value::{ValueNet, ValueNetConfig};

#[cfg(test)]
mod tests;
