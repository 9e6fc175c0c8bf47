// SPDX-License-Identifier: CEPL-1.0
//! Collaborator seams shared by the platform layer and the render backends.
use raw_window_handle::{HandleError, RawDisplayHandle, RawWindowHandle};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Something a backend can present into.
pub trait SurfaceSource {
    fn raw_handles(&self) -> Result<(RawDisplayHandle, RawWindowHandle), HandleError>;

    /// Backing framebuffer size in physical pixels, which may differ from the
    /// logical window size on scaled displays.
    fn framebuffer_size(&self) -> RenderSize;
}

#[derive(Debug, Error)]
pub enum ShaderLoadError {
    #[error("shader artifact `{0}` not found")]
    NotFound(String),
    #[error("could not read shader artifact `{name}`: {source}")]
    Io { name: String, source: io::Error },
}

/// Provides raw shader bytecode by logical artifact name.
pub trait ShaderSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, ShaderLoadError>;
}

/// Reads artifacts as files under a root directory.
#[derive(Clone, Debug)]
pub struct FsShaderSource {
    root: PathBuf,
}

impl FsShaderSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsShaderSource { root: root.into() }
    }
}

impl ShaderSource for FsShaderSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, ShaderLoadError> {
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("read {} ({} bytes)", path.display(), bytes.len());
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ShaderLoadError::NotFound(path.display().to_string()))
            }
            Err(source) => Err(ShaderLoadError::Io {
                name: path.display().to_string(),
                source,
            }),
        }
    }
}
