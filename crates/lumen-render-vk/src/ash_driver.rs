// SPDX-License-Identifier: CEPL-1.0
use ash::khr::{surface, swapchain};
use ash::{ext::debug_utils, prelude::VkResult, vk, Entry, Instance};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::CStr;

use crate::driver::{AdapterInfo, ExtensionProperty, VkDriver};
use crate::error::BootstrapError;

/// [`VkDriver`] backed by the system Vulkan loader.
///
/// Holds the function tables for the single instance and device it creates; calls that
/// need one before it exists fail with `ERROR_INITIALIZATION_FAILED`.
pub struct AshDriver {
    entry: Entry,
    instance: Option<Instance>,
    surface_loader: Option<surface::Instance>,
    debug_utils: Option<debug_utils::Instance>,
    device: Option<ash::Device>,
    swapchain_loader: Option<swapchain::Device>,
}

const NOT_READY: vk::Result = vk::Result::ERROR_INITIALIZATION_FAILED;

fn c_name(name: Result<&CStr, std::ffi::FromBytesUntilNulError>) -> String {
    name.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

impl AshDriver {
    pub fn load() -> Result<Self, BootstrapError> {
        // SAFETY: loading libvulkan runs the loader's initialisation code; there is nothing
        // else we can check up front.
        let entry = unsafe { Entry::load() }.map_err(|e| BootstrapError::Loader(e.to_string()))?;
        Ok(AshDriver {
            entry,
            instance: None,
            surface_loader: None,
            debug_utils: None,
            device: None,
            swapchain_loader: None,
        })
    }

    fn instance(&self) -> VkResult<&Instance> {
        self.instance.as_ref().ok_or(NOT_READY)
    }

    fn surface_loader(&self) -> VkResult<&surface::Instance> {
        self.surface_loader.as_ref().ok_or(NOT_READY)
    }

    fn device(&self) -> VkResult<&ash::Device> {
        self.device.as_ref().ok_or(NOT_READY)
    }

    fn swapchain_loader(&self) -> VkResult<&swapchain::Device> {
        self.swapchain_loader.as_ref().ok_or(NOT_READY)
    }
}

impl VkDriver for AshDriver {
    fn instance_layers(&self) -> VkResult<Vec<String>> {
        // SAFETY: plain loader query
        let props = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(props.iter().map(|p| c_name(p.layer_name_as_c_str())).collect())
    }

    fn instance_extensions(&self) -> VkResult<Vec<ExtensionProperty>> {
        // SAFETY: plain loader query
        let props = unsafe { self.entry.enumerate_instance_extension_properties(None)? };
        Ok(props
            .iter()
            .map(|p| ExtensionProperty {
                name: c_name(p.extension_name_as_c_str()),
                spec_version: p.spec_version,
            })
            .collect())
    }

    fn surface_extensions(&self, display: RawDisplayHandle) -> VkResult<Vec<String>> {
        let exts = ash_window::enumerate_required_extensions(display)?;
        Ok(exts
            .iter()
            // SAFETY: ash_window hands out static nul-terminated names
            .map(|p| unsafe { CStr::from_ptr(*p) }.to_string_lossy().into_owned())
            .collect())
    }

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
        // SAFETY: every pointer in `info` borrows from the caller for the duration of the call
        let instance = unsafe { self.entry.create_instance(info, None)? };
        let handle = instance.handle();
        self.surface_loader = Some(surface::Instance::new(&self.entry, &instance));
        self.debug_utils = Some(debug_utils::Instance::new(&self.entry, &instance));
        self.instance = Some(instance);
        Ok(handle)
    }

    fn diagnostics_supported(&self) -> bool {
        let Some(instance) = &self.instance else {
            return false;
        };
        // SAFETY: querying a function pointer by static name on a live instance
        let create = unsafe {
            self.entry
                .get_instance_proc_addr(instance.handle(), c"vkCreateDebugUtilsMessengerEXT".as_ptr())
        };
        // SAFETY: as above
        let destroy = unsafe {
            self.entry
                .get_instance_proc_addr(instance.handle(), c"vkDestroyDebugUtilsMessengerEXT".as_ptr())
        };
        create.is_some() && destroy.is_some()
    }

    fn create_debug_messenger(
        &mut self,
        info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        let loader = self.debug_utils.as_ref().ok_or(NOT_READY)?;
        // SAFETY: the loader belongs to the live instance
        unsafe { loader.create_debug_utils_messenger(info, None) }
    }

    fn create_surface(
        &mut self,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR> {
        let instance = self.instance()?;
        // SAFETY: the handles come from a live window that outlives the surface
        unsafe { ash_window::create_surface(&self.entry, instance, display, window, None) }
    }

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        // SAFETY: live instance
        unsafe { self.instance()?.enumerate_physical_devices() }
    }

    fn adapter_info(&self, adapter: vk::PhysicalDevice) -> VkResult<AdapterInfo> {
        // SAFETY: `adapter` was enumerated from this instance
        let props = unsafe { self.instance()?.get_physical_device_properties(adapter) };
        Ok(AdapterInfo {
            name: c_name(props.device_name_as_c_str()),
            device_type: props.device_type,
            api_version: props.api_version,
        })
    }

    fn queue_families(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        // SAFETY: `adapter` was enumerated from this instance
        Ok(unsafe { self.instance()?.get_physical_device_queue_family_properties(adapter) })
    }

    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        // SAFETY: adapter and surface belong to this instance
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_support(adapter, family, surface)
        }
    }

    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<ExtensionProperty>> {
        // SAFETY: `adapter` was enumerated from this instance
        let props = unsafe { self.instance()?.enumerate_device_extension_properties(adapter)? };
        Ok(props
            .iter()
            .map(|p| ExtensionProperty {
                name: c_name(p.extension_name_as_c_str()),
                spec_version: p.spec_version,
            })
            .collect())
    }

    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        // SAFETY: adapter and surface belong to this instance
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_capabilities(adapter, surface)
        }
    }

    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        // SAFETY: adapter and surface belong to this instance
        unsafe { self.surface_loader()?.get_physical_device_surface_formats(adapter, surface) }
    }

    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        // SAFETY: adapter and surface belong to this instance
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_present_modes(adapter, surface)
        }
    }

    fn create_device(
        &mut self,
        adapter: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device> {
        let instance = self.instance()?;
        // SAFETY: `adapter` was enumerated from this instance; `info` borrows from the caller
        let device = unsafe { instance.create_device(adapter, info, None)? };
        let handle = device.handle();
        let loader = swapchain::Device::new(instance, &device);
        self.swapchain_loader = Some(loader);
        self.device = Some(device);
        Ok(handle)
    }

    fn device_queue(&self, family: u32, index: u32) -> VkResult<vk::Queue> {
        // SAFETY: family/index were part of the device creation request
        Ok(unsafe { self.device()?.get_device_queue(family, index) })
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        // SAFETY: live device, no other thread submits work
        unsafe { self.device()?.device_wait_idle() }
    }

    fn create_swapchain(&mut self, info: &vk::SwapchainCreateInfoKHR<'_>) -> VkResult<vk::SwapchainKHR> {
        // SAFETY: surface in `info` belongs to this instance
        unsafe { self.swapchain_loader()?.create_swapchain(info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        // SAFETY: swapchain created by this device
        unsafe { self.swapchain_loader()?.get_swapchain_images(swapchain) }
    }

    fn create_image_view(&mut self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        // SAFETY: image in `info` is a swapchain image of this device
        unsafe { self.device()?.create_image_view(info, None) }
    }

    fn create_render_pass(&mut self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        // SAFETY: `info` borrows from the caller for the duration of the call
        unsafe { self.device()?.create_render_pass(info, None) }
    }

    fn create_shader_module(&mut self, info: &vk::ShaderModuleCreateInfo<'_>) -> VkResult<vk::ShaderModule> {
        // SAFETY: bytecode was checked for alignment and magic before reaching here
        unsafe { self.device()?.create_shader_module(info, None) }
    }

    fn create_pipeline_layout(
        &mut self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        // SAFETY: `info` borrows from the caller for the duration of the call
        unsafe { self.device()?.create_pipeline_layout(info, None) }
    }

    fn create_graphics_pipeline(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        // SAFETY: modules, layout and render pass in `info` are live handles of this device
        let pipelines = unsafe {
            self.device()?.create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(info),
                None,
            )
        }
        .map_err(|(_, result)| result)?;
        pipelines.into_iter().next().ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn create_framebuffer(&mut self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer> {
        // SAFETY: render pass and attachments in `info` are live handles of this device
        unsafe { self.device()?.create_framebuffer(info, None) }
    }

    fn create_command_pool(&mut self, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool> {
        // SAFETY: queue family in `info` was requested at device creation
        unsafe { self.device()?.create_command_pool(info, None) }
    }

    unsafe fn destroy_instance(&mut self, _instance: vk::Instance) {
        self.debug_utils = None;
        self.surface_loader = None;
        if let Some(instance) = self.instance.take() {
            // SAFETY: caller guarantees every child object is gone
            unsafe { instance.destroy_instance(None) };
        }
    }

    unsafe fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        if let Some(loader) = &self.debug_utils {
            // SAFETY: forwarded from the caller
            unsafe { loader.destroy_debug_utils_messenger(messenger, None) };
        }
    }

    unsafe fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        if let Some(loader) = &self.surface_loader {
            // SAFETY: forwarded from the caller
            unsafe { loader.destroy_surface(surface, None) };
        }
    }

    unsafe fn destroy_device(&mut self, _device: vk::Device) {
        self.swapchain_loader = None;
        if let Some(device) = self.device.take() {
            // SAFETY: forwarded from the caller
            unsafe { device.destroy_device(None) };
        }
    }

    unsafe fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        if let Some(loader) = &self.swapchain_loader {
            // SAFETY: forwarded from the caller
            unsafe { loader.destroy_swapchain(swapchain, None) };
        }
    }

    unsafe fn destroy_image_view(&mut self, view: vk::ImageView) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_image_view(view, None) };
        }
    }

    unsafe fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_render_pass(render_pass, None) };
        }
    }

    unsafe fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_shader_module(module, None) };
        }
    }

    unsafe fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_pipeline_layout(layout, None) };
        }
    }

    unsafe fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_pipeline(pipeline, None) };
        }
    }

    unsafe fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_framebuffer(framebuffer, None) };
        }
    }

    unsafe fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        if let Some(d) = &self.device {
            // SAFETY: forwarded from the caller
            unsafe { d.destroy_command_pool(pool, None) };
        }
    }
}
