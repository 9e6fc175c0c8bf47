// SPDX-License-Identifier: CEPL-1.0
//! Adapter selection: first adapter that passes every check wins.
use ash::vk;

use crate::driver::{AdapterInfo, ExtensionProperty, VkDriver};
use crate::error::{query, BootstrapError, Result};
use crate::probe::{self, SurfaceSupport, SwapchainCapable};

/// Queue family index per role. Both roles may name the same family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFamilyAssignment {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyAssignment {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct families in `[graphics, present]` order.
    pub fn unique_families(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectedAdapter {
    pub handle: vk::PhysicalDevice,
    pub info: AdapterInfo,
    pub queues: QueueFamilyAssignment,
    pub extensions: Vec<ExtensionProperty>,
    pub surface: SurfaceSupport,
}

pub fn enumerate_adapters(driver: &impl VkDriver) -> Result<Vec<vk::PhysicalDevice>> {
    let adapters = query("physical devices", driver.enumerate_adapters())?;
    if adapters.is_empty() {
        return Err(BootstrapError::NoAdapter);
    }
    tracing::debug!("{} adapter(s) enumerated", adapters.len());
    Ok(adapters)
}

/// Scans families in index order, taking the first graphics family and, independently,
/// the first family that can present to `surface`. Stops once both are known.
pub fn find_queue_families(
    driver: &impl VkDriver,
    adapter: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> Result<Option<QueueFamilyAssignment>> {
    let families = query("queue family properties", driver.queue_families(adapter))?;
    let mut graphics = None;
    let mut present = None;

    for (i, props) in families.iter().enumerate() {
        let index = i as u32;
        if graphics.is_none() && props.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            graphics = Some(index);
        }
        if present.is_none() && query("surface support", driver.surface_support(adapter, index, surface))? {
            present = Some(index);
        }
        if graphics.is_some() && present.is_some() {
            break;
        }
    }

    Ok(graphics.zip(present).map(|(graphics, present)| QueueFamilyAssignment { graphics, present }))
}

fn device_type_name(ty: vk::PhysicalDeviceType) -> &'static str {
    match ty {
        vk::PhysicalDeviceType::DISCRETE_GPU => "discrete",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "integrated",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "virtual",
        vk::PhysicalDeviceType::CPU => "cpu",
        _ => "other",
    }
}

/// Checks one adapter; `None` means it does not qualify.
fn evaluate(
    driver: &impl VkDriver,
    adapter: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    required_extensions: &[String],
) -> Result<Option<(QueueFamilyAssignment, Vec<ExtensionProperty>, SurfaceSupport)>> {
    let Some(queues) = find_queue_families(driver, adapter, surface)? else {
        tracing::debug!("adapter {adapter:?}: no graphics/present queue family");
        return Ok(None);
    };

    let extensions = probe::list_device_extensions(driver, adapter)?;
    let missing = probe::missing_extensions(&extensions, required_extensions);
    if !missing.is_empty() {
        tracing::debug!("adapter {adapter:?}: missing device extensions {missing:?}");
        return Ok(None);
    }

    let Some(capable) = SwapchainCapable::check(adapter, &extensions) else {
        tracing::debug!("adapter {adapter:?}: no swapchain support");
        return Ok(None);
    };
    let support = probe::query_surface_support(driver, capable, surface)?;
    if !support.is_adequate() {
        tracing::debug!("adapter {adapter:?}: no surface formats or present modes");
        return Ok(None);
    }

    Ok(Some((queues, extensions, support)))
}

pub fn select(
    driver: &impl VkDriver,
    surface: vk::SurfaceKHR,
    required_extensions: &[String],
) -> Result<SelectedAdapter> {
    let adapters = enumerate_adapters(driver)?;

    for &handle in &adapters {
        if let Some((queues, extensions, surface_support)) =
            evaluate(driver, handle, surface, required_extensions)?
        {
            let info = query("physical device properties", driver.adapter_info(handle))?;
            tracing::info!(
                "selected adapter \"{}\" ({}, Vulkan {}.{}.{}), graphics family {}, present family {}",
                info.name,
                device_type_name(info.device_type),
                vk::api_version_major(info.api_version),
                vk::api_version_minor(info.api_version),
                vk::api_version_patch(info.api_version),
                queues.graphics,
                queues.present,
            );
            return Ok(SelectedAdapter {
                handle,
                info,
                queues,
                extensions,
                surface: surface_support,
            });
        }
    }

    for &handle in &adapters {
        match driver.adapter_info(handle) {
            Ok(info) => tracing::debug!(
                "rejected adapter \"{}\" ({})",
                info.name,
                device_type_name(info.device_type)
            ),
            Err(e) => tracing::debug!("rejected adapter {handle:?} (properties unavailable: {e})"),
        }
    }
    Err(BootstrapError::NoSuitableAdapter(adapters.len()))
}
