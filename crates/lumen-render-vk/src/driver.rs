// SPDX-License-Identifier: CEPL-1.0
//! The seam between the bootstrap chain and the Vulkan runtime.
//!
//! Each method corresponds to one Vulkan entry point. Creation calls take the same
//! `ash::vk` create-info structures the runtime does and hand back plain handles, so the
//! factories in this crate read like ordinary ash code while staying testable.
use ash::{prelude::VkResult, vk};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionProperty {
    pub name: String,
    pub spec_version: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterInfo {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
}

pub trait VkDriver {
    fn instance_layers(&self) -> VkResult<Vec<String>>;
    fn instance_extensions(&self) -> VkResult<Vec<ExtensionProperty>>;
    /// Instance extensions the platform needs to present to `display`.
    fn surface_extensions(&self, display: RawDisplayHandle) -> VkResult<Vec<String>>;

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance>;

    /// Whether the debug-utils entry points resolved for the current instance.
    fn diagnostics_supported(&self) -> bool;
    fn create_debug_messenger(
        &mut self,
        info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT>;

    fn create_surface(
        &mut self,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR>;

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn adapter_info(&self, adapter: vk::PhysicalDevice) -> VkResult<AdapterInfo>;
    fn queue_families(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<vk::QueueFamilyProperties>>;
    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;
    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<ExtensionProperty>>;
    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    fn create_device(
        &mut self,
        adapter: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device>;
    fn device_queue(&self, family: u32, index: u32) -> VkResult<vk::Queue>;
    fn device_wait_idle(&self) -> VkResult<()>;

    fn create_swapchain(&mut self, info: &vk::SwapchainCreateInfoKHR<'_>) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    fn create_image_view(&mut self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView>;
    fn create_render_pass(&mut self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass>;
    fn create_shader_module(&mut self, info: &vk::ShaderModuleCreateInfo<'_>) -> VkResult<vk::ShaderModule>;
    fn create_pipeline_layout(
        &mut self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout>;
    fn create_graphics_pipeline(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline>;
    fn create_framebuffer(&mut self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer>;
    fn create_command_pool(&mut self, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool>;

    // Destruction.
    //
    // # Safety
    // The handle must have been created by this driver, must not have been destroyed
    // already, and nothing created from it may still be alive.

    unsafe fn destroy_instance(&mut self, instance: vk::Instance);
    unsafe fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT);
    unsafe fn destroy_surface(&mut self, surface: vk::SurfaceKHR);
    unsafe fn destroy_device(&mut self, device: vk::Device);
    unsafe fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);
    unsafe fn destroy_image_view(&mut self, view: vk::ImageView);
    unsafe fn destroy_render_pass(&mut self, render_pass: vk::RenderPass);
    unsafe fn destroy_shader_module(&mut self, module: vk::ShaderModule);
    unsafe fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout);
    unsafe fn destroy_pipeline(&mut self, pipeline: vk::Pipeline);
    unsafe fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer);
    unsafe fn destroy_command_pool(&mut self, pool: vk::CommandPool);
}
