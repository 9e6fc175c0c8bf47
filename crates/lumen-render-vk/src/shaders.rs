// SPDX-License-Identifier: CEPL-1.0
//! Triangle shaders compiled into the crate by the build script.
use lumen_render::{ShaderLoadError, ShaderSource};

static VERT_SPV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/vert.spv"));
static FRAG_SPV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/frag.spv"));

/// Serves `vert.spv` and `frag.spv` from the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedShaders;

impl ShaderSource for EmbeddedShaders {
    fn load(&self, name: &str) -> Result<Vec<u8>, ShaderLoadError> {
        match name {
            "vert.spv" => Ok(VERT_SPV.to_vec()),
            "frag.spv" => Ok(FRAG_SPV.to_vec()),
            other => Err(ShaderLoadError::NotFound(other.to_owned())),
        }
    }
}
