// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result};

/// Pool for the graphics family; buffers from it may be reset individually.
pub fn create_command_pool(driver: &mut impl VkDriver, graphics_family: u32) -> Result<vk::CommandPool> {
    let info = vk::CommandPoolCreateInfo::default()
        .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
        .queue_family_index(graphics_family);
    let pool = driver
        .create_command_pool(&info)
        .map_err(BootstrapError::CommandPoolCreation)?;
    tracing::info!("command pool created on family {graphics_family}");
    Ok(pool)
}
