// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

use crate::adapter::{QueueFamilyAssignment, SelectedAdapter};
use crate::context::{c_ptrs, c_strings};
use crate::driver::VkDriver;
use crate::error::{query, BootstrapError, Result};

const PORTABILITY_SUBSET_EXTENSION: &str = "VK_KHR_portability_subset";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceQueues {
    pub graphics: vk::Queue,
    pub present: vk::Queue,
}

#[derive(Clone, Debug)]
pub struct LogicalDevice {
    pub handle: vk::Device,
    pub queues: DeviceQueues,
    pub enabled_extensions: Vec<String>,
}

/// One queue request per distinct family: `(family, priorities)`.
pub fn queue_requests(assignment: &QueueFamilyAssignment) -> Vec<(u32, [f32; 1])> {
    assignment
        .unique_families()
        .into_iter()
        .map(|family| (family, [1.0_f32]))
        .collect()
}

/// `diagnostic_layers` is forwarded for runtimes that still honour device layers.
pub fn create_logical_device(
    driver: &mut impl VkDriver,
    adapter: &SelectedAdapter,
    required_extensions: &[String],
    diagnostic_layers: Option<&[String]>,
) -> Result<LogicalDevice> {
    let requests = queue_requests(&adapter.queues);
    let queue_infos: Vec<vk::DeviceQueueCreateInfo<'_>> = requests
        .iter()
        .map(|(family, priorities)| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(*family)
                .queue_priorities(priorities)
        })
        .collect();

    let mut extensions = required_extensions.to_vec();
    if adapter.extensions.iter().any(|e| e.name == PORTABILITY_SUBSET_EXTENSION)
        && !extensions.iter().any(|e| e == PORTABILITY_SUBSET_EXTENSION)
    {
        extensions.push(PORTABILITY_SUBSET_EXTENSION.to_owned());
    }
    let extension_names = c_strings(&extensions)?;
    let extension_ptrs = c_ptrs(&extension_names);
    let layer_names = c_strings(diagnostic_layers.unwrap_or_default())?;
    let layer_ptrs = c_ptrs(&layer_names);

    let features = vk::PhysicalDeviceFeatures::default();
    #[allow(deprecated)]
    let info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_infos)
        .enabled_extension_names(&extension_ptrs)
        .enabled_layer_names(&layer_ptrs)
        .enabled_features(&features);

    let handle = driver
        .create_device(adapter.handle, &info)
        .map_err(BootstrapError::DeviceCreation)?;

    let queues = DeviceQueues {
        graphics: query("graphics queue", driver.device_queue(adapter.queues.graphics, 0))?,
        present: query("present queue", driver.device_queue(adapter.queues.present, 0))?,
    };
    tracing::info!(
        "logical device created with {} queue request(s), extensions {:?}",
        requests.len(),
        extensions
    );

    Ok(LogicalDevice {
        handle,
        queues,
        enabled_extensions: extensions,
    })
}
