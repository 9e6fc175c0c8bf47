// SPDX-License-Identifier: CEPL-1.0
//! Read-only capability queries. Nothing here creates or mutates a handle.
use ash::vk;
use lumen_render::SurfaceSource;
use std::collections::BTreeSet;

use crate::driver::{ExtensionProperty, VkDriver};
use crate::error::{query, BootstrapError, Result};

pub const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

pub fn list_diagnostic_layers(driver: &impl VkDriver) -> Result<BTreeSet<String>> {
    Ok(query("instance layers", driver.instance_layers())?.into_iter().collect())
}

pub fn list_instance_extensions(driver: &impl VkDriver) -> Result<Vec<ExtensionProperty>> {
    query("instance extensions", driver.instance_extensions())
}

/// Instance extensions the window's platform needs, in the order the platform lists them.
pub fn list_required_platform_extensions(
    driver: &impl VkDriver,
    window: &dyn SurfaceSource,
) -> Result<Vec<String>> {
    let (display, _) = window
        .raw_handles()
        .map_err(|e| BootstrapError::SurfaceCreation(e.to_string()))?;
    query("platform surface extensions", driver.surface_extensions(display))
}

pub fn diagnostic_layers_available(driver: &impl VkDriver, requested: &[String]) -> Result<bool> {
    let available = list_diagnostic_layers(driver)?;
    tracing::debug!("instance layers available: {available:?}");
    Ok(requested.iter().all(|layer| available.contains(layer)))
}

pub fn list_device_extensions(
    driver: &impl VkDriver,
    adapter: vk::PhysicalDevice,
) -> Result<Vec<ExtensionProperty>> {
    query("device extensions", driver.device_extensions(adapter))
}

/// Names in `required` that `available` does not report.
pub fn missing_extensions<'a>(available: &[ExtensionProperty], required: &'a [String]) -> Vec<&'a str> {
    let have: BTreeSet<&str> = available.iter().map(|e| e.name.as_str()).collect();
    required
        .iter()
        .map(String::as_str)
        .filter(|name| !have.contains(name))
        .collect()
}

pub fn extensions_satisfied(
    driver: &impl VkDriver,
    adapter: vk::PhysicalDevice,
    required: &[String],
) -> Result<bool> {
    let available = list_device_extensions(driver, adapter)?;
    Ok(missing_extensions(&available, required).is_empty())
}

/// Proof that an adapter exposes the swapchain extension. Surface support may only be
/// queried through one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainCapable(vk::PhysicalDevice);

impl SwapchainCapable {
    pub fn check(adapter: vk::PhysicalDevice, available: &[ExtensionProperty]) -> Option<Self> {
        available
            .iter()
            .any(|e| e.name == SWAPCHAIN_EXTENSION)
            .then_some(SwapchainCapable(adapter))
    }

    pub fn adapter(&self) -> vk::PhysicalDevice {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupport {
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

pub fn query_surface_support(
    driver: &impl VkDriver,
    adapter: SwapchainCapable,
    surface: vk::SurfaceKHR,
) -> Result<SurfaceSupport> {
    let adapter = adapter.adapter();
    Ok(SurfaceSupport {
        capabilities: query("surface capabilities", driver.surface_capabilities(adapter, surface))?,
        formats: query("surface formats", driver.surface_formats(adapter, surface))?,
        present_modes: query("surface present modes", driver.surface_present_modes(adapter, surface))?,
    })
}
