// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Every way the bootstrap chain can stop. None of these are retried.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not load the Vulkan runtime: {0}")]
    Loader(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("capability query `{what}` failed: {result}")]
    Query { what: &'static str, result: vk::Result },
    #[error("failed to create Vulkan instance: {0}")]
    ContextCreation(vk::Result),
    #[error("failed to register diagnostics subscriber: {0}")]
    DiagnosticsSubscriber(vk::Result),
    #[error("failed to create window surface: {0}")]
    SurfaceCreation(String),
    #[error("no Vulkan-capable adapter found")]
    NoAdapter,
    #[error("none of the {0} adapter(s) supports graphics, presentation and the required extensions")]
    NoSuitableAdapter(usize),
    #[error("failed to create logical device: {0}")]
    DeviceCreation(vk::Result),
    #[error("failed to create swapchain: {0}")]
    SwapchainCreation(vk::Result),
    #[error("failed to create swapchain image view {index}: {result}")]
    ViewCreation { index: usize, result: vk::Result },
    #[error("failed to create render pass: {0}")]
    RenderTargetCreation(vk::Result),
    #[error("could not load {stage} shader `{name}`: {source}")]
    ShaderSource {
        stage: ShaderStage,
        name: String,
        source: lumen_render::ShaderLoadError,
    },
    #[error("failed to create {stage} shader module: {reason}")]
    ShaderModule { stage: ShaderStage, reason: String },
    #[error("failed to create pipeline layout: {0}")]
    PipelineLayout(vk::Result),
    #[error("failed to create graphics pipeline: {0}")]
    PipelineCreation(vk::Result),
    #[error("failed to create framebuffer {index}: {result}")]
    FramebufferCreation { index: usize, result: vk::Result },
    #[error("failed to create command pool: {0}")]
    CommandPoolCreation(vk::Result),
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;

/// Wraps a failing capability query with the name of what was asked.
pub(crate) fn query<T>(what: &'static str, r: ash::prelude::VkResult<T>) -> Result<T> {
    r.map_err(|result| BootstrapError::Query { what, result })
}
