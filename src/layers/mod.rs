//! # Layers Module
//!
//! Forward-only building blocks. Each layer is a definition implementing
//! [`Module`]; its weights live in a separate `*Params` struct.
//!
//! - [`Dense`] and [`Mlp`]: feature-to-feature layers ([`FeatureModule`])
//! - [`GruCell`], [`LstmCell`] and the stacked [`Rnn`]: recurrent state carriers
//! - [`GraphTransformer`]: attention message passing over a [`GraphObs`](crate::graph::GraphObs)
//! - [`WeightInit`]: seeded weight initialization strategies

pub mod traits;
pub mod initialization;
pub mod dense;
pub mod mlp;
pub mod gru;
pub mod lstm;
pub mod rnn;
pub mod gnn;

pub use traits::{FeatureModule, Module, ParamCount};
pub use initialization::WeightInit;
pub use dense::{Dense, DenseParams};
pub use mlp::{Mlp, MlpParams};
pub use gru::{GruCell, GruParams};
pub use lstm::{LstmCell, LstmParams};
pub use rnn::{CellKind, CellParams, Rnn, RnnParams};
pub use gnn::{AttentionParams, GnnParams, GraphTransformer};
