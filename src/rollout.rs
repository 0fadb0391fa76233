//! # Rollout
//!
//! A fixed-length batch of recorded trajectories. Arrays are indexed
//! `(batch, time, agent, ...)`; the shape accessors read the reward array, so
//! every other field must share its leading dimensions. [`Rollout::new`] trusts
//! the caller, [`Rollout::checked`] and [`Rollout::validate`] verify it.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use bincode::{serialize, deserialize};
use ndarray::{Array2, Array3, Array4, ArrayD, Axis};
use serde::{Serialize, Deserialize};

use crate::error::{PhalanxError, Result};
use crate::graph::GraphObs;

/// An immutable trajectory batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    /// `(length, time_horizon)` graph observations
    pub graph: Array2<GraphObs>,
    /// `(length, time_horizon, num_agents, action_dim)`
    pub actions: Array4<f32>,
    /// `(length, time_horizon, ...)` recurrent states fed to the networks
    pub rnn_states: ArrayD<f32>,
    /// `(length, time_horizon, num_agents)`
    pub rewards: Array3<f32>,
    /// `(length, time_horizon, num_agents, n_costs)`
    pub costs: Array4<f32>,
    /// `(length, time_horizon, num_agents)`
    pub dones: Array3<bool>,
    /// `(length, time_horizon, num_agents)`
    pub log_pis: Array3<f32>,
    /// `(length, time_horizon)` successor observations
    pub next_graph: Array2<GraphObs>,
    /// `(length, time_horizon, num_agents)` per-agent latent codes
    pub zs: Option<Array3<f32>>,
    /// `(length, time_horizon)` team latent codes
    pub z_global: Option<Array2<f32>>,
}

impl Rollout {
    /// Assemble a rollout without checking shapes
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: Array2<GraphObs>,
        actions: Array4<f32>,
        rnn_states: ArrayD<f32>,
        rewards: Array3<f32>,
        costs: Array4<f32>,
        dones: Array3<bool>,
        log_pis: Array3<f32>,
        next_graph: Array2<GraphObs>,
        zs: Option<Array3<f32>>,
        z_global: Option<Array2<f32>>,
    ) -> Self {
        Rollout { graph, actions, rnn_states, rewards, costs, dones, log_pis, next_graph, zs, z_global }
    }

    /// Assemble a rollout and [`validate`](Self::validate) it
    #[allow(clippy::too_many_arguments)]
    pub fn checked(
        graph: Array2<GraphObs>,
        actions: Array4<f32>,
        rnn_states: ArrayD<f32>,
        rewards: Array3<f32>,
        costs: Array4<f32>,
        dones: Array3<bool>,
        log_pis: Array3<f32>,
        next_graph: Array2<GraphObs>,
        zs: Option<Array3<f32>>,
        z_global: Option<Array2<f32>>,
    ) -> Result<Self> {
        let rollout = Self::new(graph, actions, rnn_states, rewards, costs, dones, log_pis, next_graph, zs, z_global);
        rollout.validate()?;
        Ok(rollout)
    }

    /// Number of trajectories in the batch
    pub fn length(&self) -> usize {
        self.rewards.shape()[0]
    }

    /// Steps per trajectory
    pub fn time_horizon(&self) -> usize {
        self.rewards.shape()[1]
    }

    pub fn num_agents(&self) -> usize {
        self.rewards.shape()[2]
    }

    /// Total number of recorded steps
    pub fn n_data(&self) -> usize {
        self.length() * self.time_horizon()
    }

    /// Check that every field shares the leading shape of `rewards`
    pub fn validate(&self) -> Result<()> {
        let step = [self.length(), self.time_horizon()];
        let agent = [self.length(), self.time_horizon(), self.num_agents()];

        let mut checks: Vec<(&str, &[usize], &[usize])> = vec![
            ("graph", self.graph.shape(), &step[..]),
            ("next_graph", self.next_graph.shape(), &step[..]),
            ("actions", self.actions.shape(), &agent[..]),
            ("costs", self.costs.shape(), &agent[..]),
            ("dones", self.dones.shape(), &agent[..]),
            ("log_pis", self.log_pis.shape(), &agent[..]),
            ("rnn_states", self.rnn_states.shape(), &step[..]),
        ];
        if let Some(zs) = &self.zs {
            checks.push(("zs", zs.shape(), &agent[..]));
        }
        if let Some(z_global) = &self.z_global {
            checks.push(("z_global", z_global.shape(), &step[..]));
        }

        for (name, shape, expected) in checks {
            let lead = &shape[..expected.len().min(shape.len())];
            if lead != expected {
                log::warn!("rollout field '{}' has leading shape {:?}, expected {:?}", name, lead, expected);
                return Err(PhalanxError::dimension_mismatch(
                    format!("{} leading shape {:?}", name, expected),
                    format!("{:?}", shape),
                ));
            }
        }
        Ok(())
    }

    /// A new rollout holding the trajectories at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Rollout {
        let batch = Axis(0);
        Rollout {
            graph: self.graph.select(batch, indices),
            actions: self.actions.select(batch, indices),
            rnn_states: self.rnn_states.select(batch, indices),
            rewards: self.rewards.select(batch, indices),
            costs: self.costs.select(batch, indices),
            dones: self.dones.select(batch, indices),
            log_pis: self.log_pis.select(batch, indices),
            next_graph: self.next_graph.select(batch, indices),
            zs: self.zs.as_ref().map(|zs| zs.select(batch, indices)),
            z_global: self.z_global.as_ref().map(|z| z.select(batch, indices)),
        }
    }

    /// Save the rollout to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load a rollout previously written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(deserialize(&buffer)?)
    }
}
