use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use bincode::{serialize, deserialize};
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::layers::{DenseParams, GnnParams, MlpParams, ParamCount, RnnParams};

/// Parameter tree shared by [`RStateFn`](super::RStateFn) and
/// [`DecRStateFn`](super::DecRStateFn)
///
/// `latent` and `rnn` are present exactly when the function was built with a
/// latent encoder or a recurrent cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFnParams {
    pub gnn: GnnParams,
    pub latent: Option<DenseParams>,
    pub head: MlpParams,
    pub rnn: Option<RnnParams>,
    pub out: DenseParams,
}

impl ValueFnParams {
    /// Save the parameters to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load parameters previously written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(deserialize(&buffer)?)
    }
}

impl ParamCount for ValueFnParams {
    fn num_parameters(&self) -> usize {
        self.gnn.num_parameters()
            + self.latent.num_parameters()
            + self.head.num_parameters()
            + self.rnn.num_parameters()
            + self.out.num_parameters()
    }
}
