// SPDX-License-Identifier: CEPL-1.0
//! Vulkan bring-up for the triangle demo: capability probing, adapter selection, device,
//! swapchain, render pass, pipeline and framebuffers, torn down in reverse.
//!
//! Everything talks to Vulkan through [`VkDriver`]; [`AshDriver`] is the real one.
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adapter;
mod ash_driver;
pub mod bootstrap;
pub mod command;
pub mod context;
pub mod debug;
pub mod device;
pub mod driver;
pub mod error;
pub mod framebuffer;
pub mod pipeline;
pub mod probe;
#[cfg(feature = "embedded-shaders")]
mod shaders;
pub mod swapchain;

#[cfg(test)]
pub(crate) mod mock;

pub use ash::vk;
pub use ash_driver::AshDriver;
pub use bootstrap::{BootstrapConfig, Bootstrapper, Stage};
pub use driver::VkDriver;
pub use error::{BootstrapError, Result, ShaderStage};
#[cfg(feature = "embedded-shaders")]
pub use shaders::EmbeddedShaders;
