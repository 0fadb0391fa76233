//! Latent-code conditioning
//!
//! A latent code `z` is one scalar per row (the team, or one agent) that
//! identifies a strategy. [`LatentEncoder`] turns it into a bounded embedding
//! and [`LatentWrapper`] lets any feature network consume `(obs, z)` pairs.

use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewD, Axis, IxDyn};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;
use crate::layers::{Dense, DenseParams, FeatureModule, Module, ParamCount};
use super::hstack;

/// Normalizes a scalar latent code and projects it to `nz` features
///
/// `encode(z) = tanh(Dense(nz)((z - z_mean) / z_scale))`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatentEncoder {
    pub nz: usize,
    pub z_mean: f32,
    pub z_scale: f32,
}

impl LatentEncoder {
    pub fn new(nz: usize, z_mean: f32, z_scale: f32) -> Self {
        LatentEncoder { nz, z_mean, z_scale }
    }

    fn dense(&self) -> Dense {
        Dense::new(1, self.nz, Activation::Tanh)
    }

    /// Encode one latent scalar per row into `(rows, nz)`
    pub fn encode(&self, params: &DenseParams, z: ArrayView1<f32>) -> Array2<f32> {
        let z = z.insert_axis(Axis(1));
        self.apply(params, z)
    }
}

impl Module for LatentEncoder {
    type Params = DenseParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> DenseParams {
        self.dense().init_params(rng)
    }
}

impl FeatureModule for LatentEncoder {
    /// `inputs` is `(rows, 1)`
    fn apply(&self, params: &DenseParams, inputs: ArrayView2<f32>) -> Array2<f32> {
        let norm_z = inputs.mapv(|z| (z - self.z_mean) / self.z_scale);
        self.dense().apply(params, norm_z.view())
    }

    fn input_size(&self) -> usize {
        1
    }

    fn output_size(&self) -> usize {
        self.nz
    }
}

/// Encode the latent codes of a value function with `rows` rows
///
/// # Panics
/// When the code or the encoder parameters are missing, or the code does not
/// hold one entry per row.
pub(crate) fn encode_latent(
    encoder: &LatentEncoder,
    params: Option<&DenseParams>,
    z: Option<ArrayView1<f32>>,
    rows: usize,
) -> Array2<f32> {
    let z = match z {
        Some(z) => z,
        None => panic!("Latent-conditioned value function needs a latent code"),
    };
    let params = match params {
        Some(params) => params,
        None => panic!("Latent-conditioned value function needs encoder parameters"),
    };
    assert_eq!(z.len(), rows, "Expected {} latent codes, got {}", rows, z.len());
    encoder.encode(params, z)
}

/// Wraps an observation-only network so it also takes a latent code
///
/// The encoded latent is appended to the observation features and the fused
/// matrix is handed to the base network, which is therefore built for
/// `obs_dim + nz` inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatentWrapper<B> {
    base: B,
    encoder: LatentEncoder,
    obs_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentWrapperParams<P> {
    pub encoder: DenseParams,
    pub base: P,
}

impl<B: FeatureModule> LatentWrapper<B> {
    /// Build the wrapper, constructing the base network for the fused width
    ///
    /// `base_factory` receives `obs_dim + encoder.nz`.
    pub fn new<F>(obs_dim: usize, encoder: LatentEncoder, base_factory: F) -> Self
    where
        F: FnOnce(usize) -> B,
    {
        let base = base_factory(obs_dim + encoder.nz);
        assert_eq!(
            base.input_size(),
            obs_dim + encoder.nz,
            "Base network must accept observation plus latent features"
        );
        LatentWrapper { base, encoder, obs_dim }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn encoder(&self) -> &LatentEncoder {
        &self.encoder
    }

    /// Apply the base network to `obs` conditioned on `z`
    ///
    /// `obs` has shape `(..., obs_dim)` and `z` the same leading shape without
    /// the feature axis. The output keeps the leading shape of `obs`.
    ///
    /// # Panics
    /// When `obs.ndim() != z.ndim() + 1` or the leading shapes differ.
    pub fn apply(&self, params: &LatentWrapperParams<B::Params>, obs: ArrayViewD<f32>, z: ArrayViewD<f32>) -> ArrayD<f32> {
        assert_eq!(
            obs.ndim(),
            z.ndim() + 1,
            "Observation rank {} must be latent rank {} plus one",
            obs.ndim(),
            z.ndim()
        );
        let lead = &obs.shape()[..obs.ndim() - 1];
        assert_eq!(lead, z.shape(), "Observation and latent leading shapes differ");
        assert_eq!(obs.shape()[obs.ndim() - 1], self.obs_dim, "Observation feature width mismatch");

        let rows: usize = lead.iter().product();
        let flat_obs = obs
            .to_shape((rows, self.obs_dim))
            .expect("Contiguous reshape of observation")
            .into_owned();
        let flat_z = z.to_shape((rows, 1)).expect("Contiguous reshape of latent").into_owned();

        let enc_z = self.encoder.apply(&params.encoder, flat_z.view());
        let feat = hstack(flat_obs.view(), enc_z.view());
        let out = self.base.apply(&params.base, feat.view());

        let mut out_shape = lead.to_vec();
        out_shape.push(self.base.output_size());
        out.into_shape(IxDyn(&out_shape))
            .expect("Base output has one row per observation")
    }
}

impl<B: FeatureModule> Module for LatentWrapper<B> {
    type Params = LatentWrapperParams<B::Params>;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Params {
        LatentWrapperParams {
            encoder: self.encoder.init_params(rng),
            base: self.base.init_params(rng),
        }
    }
}

impl<P: ParamCount> ParamCount for LatentWrapperParams<P> {
    fn num_parameters(&self) -> usize {
        self.encoder.num_parameters() + self.base.num_parameters()
    }
}
