// SPDX-License-Identifier: CEPL-1.0
//! Recording in-memory [`VkDriver`] used by the unit tests.
#![allow(dead_code)]

use ash::{prelude::VkResult, vk, vk::Handle};
use lumen_render::{RenderSize, ShaderLoadError, ShaderSource, SurfaceSource};
use raw_window_handle::{
    HandleError, RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_char, CStr};

use crate::driver::{AdapterInfo, ExtensionProperty, VkDriver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Instance,
    Messenger,
    Surface,
    Device,
    Swapchain,
    ImageView,
    RenderPass,
    ShaderModule,
    PipelineLayout,
    Pipeline,
    Framebuffer,
    CommandPool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Create(Kind, u64),
    Destroy(Kind, u64),
}

#[derive(Clone, Copy, Debug)]
pub struct MockFamily {
    pub graphics: bool,
    pub present: bool,
}

#[derive(Clone, Debug)]
pub struct MockAdapter {
    pub name: String,
    pub families: Vec<MockFamily>,
    pub extensions: Vec<String>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
}

impl MockAdapter {
    /// One family doing both graphics and present, the swapchain extension, MAILBOX.
    pub fn suitable(name: &str) -> Self {
        MockAdapter {
            name: name.to_owned(),
            families: vec![MockFamily {
                graphics: true,
                present: true,
            }],
            extensions: vec!["VK_KHR_swapchain".to_owned()],
            formats: vec![
                vk::SurfaceFormatKHR {
                    format: vk::Format::R8G8B8A8_UNORM,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                },
                vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_SRGB,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                },
            ],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: vk::Extent2D {
                    width: 800,
                    height: 600,
                },
                min_image_extent: vk::Extent2D { width: 1, height: 1 },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                max_image_array_layers: 1,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InstanceRequest {
    pub app_name: String,
    pub api_version: u32,
    pub layers: Vec<String>,
    pub extensions: Vec<String>,
    pub chained_debug_messenger: bool,
    pub flags: vk::InstanceCreateFlags,
}

#[derive(Clone, Debug, Default)]
pub struct DeviceRequest {
    /// `(family, queue count, first priority)`
    pub queues: Vec<(u32, u32, f32)>,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SwapchainRequest {
    pub surface: vk::SurfaceKHR,
    pub min_image_count: u32,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub extent: vk::Extent2D,
    pub array_layers: u32,
    pub usage: vk::ImageUsageFlags,
    pub sharing_mode: vk::SharingMode,
    pub families: Vec<u32>,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
    pub present_mode: vk::PresentModeKHR,
    pub clipped: bool,
    pub old_swapchain_null: bool,
}

#[derive(Clone, Debug)]
pub struct ViewRequest {
    pub image: vk::Image,
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub aspect: vk::ImageAspectFlags,
    pub level_count: u32,
    pub layer_count: u32,
    pub swizzle_identity: bool,
}

#[derive(Clone, Debug)]
pub struct RenderPassRequest {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub bind_point: vk::PipelineBindPoint,
    pub color_refs: Vec<vk::AttachmentReference>,
    pub has_depth: bool,
    pub subpass_count: u32,
    pub dependency_count: u32,
}

#[derive(Clone, Debug)]
pub struct PipelineRequest {
    pub stages: Vec<(vk::ShaderStageFlags, vk::ShaderModule, String)>,
    pub vertex_bindings: u32,
    pub vertex_attributes: u32,
    pub topology: vk::PrimitiveTopology,
    pub primitive_restart: bool,
    pub viewport_count: u32,
    pub scissor_count: u32,
    pub dynamic_states: Vec<vk::DynamicState>,
    pub depth_clamp: bool,
    pub rasterizer_discard: bool,
    pub polygon_mode: vk::PolygonMode,
    pub line_width: f32,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub depth_bias: bool,
    pub samples: vk::SampleCountFlags,
    pub sample_shading: bool,
    pub has_depth_stencil: bool,
    pub logic_op: bool,
    pub blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
}

#[derive(Clone, Debug)]
pub struct FramebufferRequest {
    pub render_pass: vk::RenderPass,
    pub attachments: Vec<vk::ImageView>,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

pub struct MockDriver {
    pub layers: Vec<String>,
    pub instance_extensions: Vec<String>,
    pub platform_extensions: Vec<String>,
    pub diagnostics_supported: bool,
    pub adapters: Vec<MockAdapter>,
    pub images_per_swapchain: usize,
    pub fail_swapchain_images: Option<vk::Result>,

    pub events: Vec<Event>,
    pub instance_request: Option<InstanceRequest>,
    pub device_request: Option<DeviceRequest>,
    pub swapchain_request: Option<SwapchainRequest>,
    pub view_requests: Vec<ViewRequest>,
    pub render_pass_request: Option<RenderPassRequest>,
    /// SPIR-V words handed to each shader module creation, in order.
    pub shader_code: Vec<Vec<u32>>,
    pub layout_request: Option<(u32, u32)>,
    pub pipeline_request: Option<PipelineRequest>,
    pub framebuffer_requests: Vec<FramebufferRequest>,
    pub command_pool_request: Option<(vk::CommandPoolCreateFlags, u32)>,
    pub idle_waits: Cell<usize>,

    next_handle: u64,
    attempts: HashMap<Kind, usize>,
    failures: HashMap<(Kind, usize), vk::Result>,
    queue_fetches: RefCell<Vec<(u32, u32)>>,
    surface_support_calls: RefCell<Vec<u32>>,
    queries: RefCell<Vec<(vk::PhysicalDevice, &'static str)>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        MockDriver {
            layers: vec!["VK_LAYER_KHRONOS_validation".to_owned()],
            instance_extensions: vec![
                "VK_KHR_surface".to_owned(),
                "VK_KHR_xlib_surface".to_owned(),
                "VK_EXT_debug_utils".to_owned(),
            ],
            platform_extensions: vec!["VK_KHR_surface".to_owned(), "VK_KHR_xlib_surface".to_owned()],
            diagnostics_supported: true,
            adapters: Vec::new(),
            images_per_swapchain: 3,
            fail_swapchain_images: None,
            events: Vec::new(),
            instance_request: None,
            device_request: None,
            swapchain_request: None,
            view_requests: Vec::new(),
            render_pass_request: None,
            shader_code: Vec::new(),
            layout_request: None,
            pipeline_request: None,
            framebuffer_requests: Vec::new(),
            command_pool_request: None,
            idle_waits: Cell::new(0),
            next_handle: 0x1000,
            attempts: HashMap::new(),
            failures: HashMap::new(),
            queue_fetches: RefCell::new(Vec::new()),
            surface_support_calls: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
        }
    }
}

unsafe fn c_names(ptrs: *const *const c_char, count: u32) -> Vec<String> {
    if ptrs.is_null() || count == 0 {
        return Vec::new();
    }
    // SAFETY: `count` nul-terminated names, as the create info promises
    unsafe {
        std::slice::from_raw_parts(ptrs, count as usize)
            .iter()
            .map(|p| CStr::from_ptr(*p).to_string_lossy().into_owned())
            .collect()
    }
}

unsafe fn slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    if ptr.is_null() || count == 0 {
        &[]
    } else {
        // SAFETY: `count` elements, as the create info promises
        unsafe { std::slice::from_raw_parts(ptr, count as usize) }
    }
}

impl MockDriver {
    pub fn with_adapters(adapters: Vec<MockAdapter>) -> Self {
        MockDriver {
            adapters,
            ..Default::default()
        }
    }

    /// Makes the `nth` (0-based) creation of `kind` fail with `result`.
    pub fn fail_on(&mut self, kind: Kind, nth: usize, result: vk::Result) {
        self.failures.insert((kind, nth), result);
    }

    /// Raw handles successfully created for `kind`, in creation order.
    pub fn created(&self, kind: Kind) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Create(k, h) if *k == kind => Some(*h),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<(Kind, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Destroy(k, h) => Some((*k, *h)),
                _ => None,
            })
            .collect()
    }

    /// Everything created but not destroyed.
    pub fn live(&self) -> Vec<(Kind, u64)> {
        let gone = self.destroyed();
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Create(k, h) if !gone.contains(&(*k, *h)) => Some((*k, *h)),
                _ => None,
            })
            .collect()
    }

    pub fn queue_fetches(&self) -> Vec<(u32, u32)> {
        self.queue_fetches.borrow().clone()
    }

    /// Family indices passed to `surface_support`, in call order.
    pub fn surface_support_calls(&self) -> Vec<u32> {
        self.surface_support_calls.borrow().clone()
    }

    /// Names of the per-adapter queries made against `adapter`.
    pub fn queries_for(&self, adapter: vk::PhysicalDevice) -> Vec<&'static str> {
        self.queries
            .borrow()
            .iter()
            .filter(|(a, _)| *a == adapter)
            .map(|(_, q)| *q)
            .collect()
    }

    fn make(&mut self, kind: Kind) -> VkResult<u64> {
        let attempt = self.attempts.entry(kind).or_default();
        let nth = *attempt;
        *attempt += 1;
        if let Some(&result) = self.failures.get(&(kind, nth)) {
            return Err(result);
        }
        self.next_handle += 1;
        self.events.push(Event::Create(kind, self.next_handle));
        Ok(self.next_handle)
    }

    fn drop_handle(&mut self, kind: Kind, raw: u64) {
        self.events.push(Event::Destroy(kind, raw));
    }

    fn adapter(&self, handle: vk::PhysicalDevice, what: &'static str) -> VkResult<&MockAdapter> {
        self.queries.borrow_mut().push((handle, what));
        (handle.as_raw() as usize)
            .checked_sub(1)
            .and_then(|i| self.adapters.get(i))
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }
}

impl VkDriver for MockDriver {
    fn instance_layers(&self) -> VkResult<Vec<String>> {
        Ok(self.layers.clone())
    }

    fn instance_extensions(&self) -> VkResult<Vec<ExtensionProperty>> {
        Ok(self
            .instance_extensions
            .iter()
            .map(|name| ExtensionProperty {
                name: name.clone(),
                spec_version: 1,
            })
            .collect())
    }

    fn surface_extensions(&self, _display: RawDisplayHandle) -> VkResult<Vec<String>> {
        Ok(self.platform_extensions.clone())
    }

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
        // SAFETY: the create info borrows live data for the duration of the call
        let request = unsafe {
            let app = info.p_application_info.as_ref();
            let mut chained = false;
            let mut next = info.p_next as *const vk::BaseInStructure<'_>;
            while let Some(s) = next.as_ref() {
                chained |= s.s_type == vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT;
                next = s.p_next;
            }
            InstanceRequest {
                app_name: app
                    .filter(|a| !a.p_application_name.is_null())
                    .map(|a| CStr::from_ptr(a.p_application_name).to_string_lossy().into_owned())
                    .unwrap_or_default(),
                api_version: app.map(|a| a.api_version).unwrap_or_default(),
                layers: c_names(info.pp_enabled_layer_names, info.enabled_layer_count),
                extensions: c_names(info.pp_enabled_extension_names, info.enabled_extension_count),
                chained_debug_messenger: chained,
                flags: info.flags,
            }
        };
        self.instance_request = Some(request);
        self.make(Kind::Instance).map(vk::Instance::from_raw)
    }

    fn diagnostics_supported(&self) -> bool {
        self.diagnostics_supported
    }

    fn create_debug_messenger(
        &mut self,
        _info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        self.make(Kind::Messenger).map(vk::DebugUtilsMessengerEXT::from_raw)
    }

    fn create_surface(
        &mut self,
        _display: RawDisplayHandle,
        _window: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR> {
        self.make(Kind::Surface).map(vk::SurfaceKHR::from_raw)
    }

    fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok((1..=self.adapters.len() as u64).map(vk::PhysicalDevice::from_raw).collect())
    }

    fn adapter_info(&self, adapter: vk::PhysicalDevice) -> VkResult<AdapterInfo> {
        let a = self.adapter(adapter, "adapter_info")?;
        Ok(AdapterInfo {
            name: a.name.clone(),
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            api_version: vk::API_VERSION_1_3,
        })
    }

    fn queue_families(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        let a = self.adapter(adapter, "queue_families")?;
        Ok(a.families
            .iter()
            .map(|f| vk::QueueFamilyProperties {
                queue_flags: if f.graphics {
                    vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER
                } else {
                    vk::QueueFlags::TRANSFER
                },
                queue_count: 1,
                ..Default::default()
            })
            .collect())
    }

    fn surface_support(
        &self,
        adapter: vk::PhysicalDevice,
        family: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.surface_support_calls.borrow_mut().push(family);
        let a = self.adapter(adapter, "surface_support")?;
        Ok(a.families.get(family as usize).is_some_and(|f| f.present))
    }

    fn device_extensions(&self, adapter: vk::PhysicalDevice) -> VkResult<Vec<ExtensionProperty>> {
        let a = self.adapter(adapter, "device_extensions")?;
        Ok(a.extensions
            .iter()
            .map(|name| ExtensionProperty {
                name: name.clone(),
                spec_version: 1,
            })
            .collect())
    }

    fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.adapter(adapter, "surface_capabilities")?.capabilities)
    }

    fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.adapter(adapter, "surface_formats")?.formats.clone())
    }

    fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.adapter(adapter, "surface_present_modes")?.present_modes.clone())
    }

    fn create_device(
        &mut self,
        _adapter: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device> {
        // SAFETY: the create info borrows live data for the duration of the call
        #[allow(deprecated)]
        let request = unsafe {
            DeviceRequest {
                queues: slice(info.p_queue_create_infos, info.queue_create_info_count)
                    .iter()
                    .map(|q| {
                        let priorities = slice(q.p_queue_priorities, q.queue_count);
                        (q.queue_family_index, q.queue_count, priorities.first().copied().unwrap_or(0.0))
                    })
                    .collect(),
                extensions: c_names(info.pp_enabled_extension_names, info.enabled_extension_count),
                layers: c_names(info.pp_enabled_layer_names, info.enabled_layer_count),
            }
        };
        self.device_request = Some(request);
        self.make(Kind::Device).map(vk::Device::from_raw)
    }

    fn device_queue(&self, family: u32, index: u32) -> VkResult<vk::Queue> {
        self.queue_fetches.borrow_mut().push((family, index));
        Ok(vk::Queue::from_raw(0x9000 + family as u64))
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.idle_waits.set(self.idle_waits.get() + 1);
        Ok(())
    }

    fn create_swapchain(&mut self, info: &vk::SwapchainCreateInfoKHR<'_>) -> VkResult<vk::SwapchainKHR> {
        // SAFETY: as in create_instance
        let families = unsafe { slice(info.p_queue_family_indices, info.queue_family_index_count) }.to_vec();
        self.swapchain_request = Some(SwapchainRequest {
            surface: info.surface,
            min_image_count: info.min_image_count,
            format: info.image_format,
            color_space: info.image_color_space,
            extent: info.image_extent,
            array_layers: info.image_array_layers,
            usage: info.image_usage,
            sharing_mode: info.image_sharing_mode,
            families,
            pre_transform: info.pre_transform,
            composite_alpha: info.composite_alpha,
            present_mode: info.present_mode,
            clipped: info.clipped == vk::TRUE,
            old_swapchain_null: info.old_swapchain == vk::SwapchainKHR::null(),
        });
        self.make(Kind::Swapchain).map(vk::SwapchainKHR::from_raw)
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        if let Some(result) = self.fail_swapchain_images {
            return Err(result);
        }
        let base = swapchain.as_raw() << 8;
        Ok((0..self.images_per_swapchain as u64)
            .map(|i| vk::Image::from_raw(base + i + 1))
            .collect())
    }

    fn create_image_view(&mut self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        let c = info.components;
        let identity = [c.r, c.g, c.b, c.a]
            .iter()
            .all(|s| *s == vk::ComponentSwizzle::IDENTITY);
        self.view_requests.push(ViewRequest {
            image: info.image,
            view_type: info.view_type,
            format: info.format,
            aspect: info.subresource_range.aspect_mask,
            level_count: info.subresource_range.level_count,
            layer_count: info.subresource_range.layer_count,
            swizzle_identity: identity,
        });
        self.make(Kind::ImageView).map(vk::ImageView::from_raw)
    }

    fn create_render_pass(&mut self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        // SAFETY: as in create_instance
        let request = unsafe {
            let subpasses = slice(info.p_subpasses, info.subpass_count);
            let first = subpasses.first();
            RenderPassRequest {
                attachments: slice(info.p_attachments, info.attachment_count).to_vec(),
                bind_point: first.map(|s| s.pipeline_bind_point).unwrap_or_default(),
                color_refs: first
                    .map(|s| slice(s.p_color_attachments, s.color_attachment_count).to_vec())
                    .unwrap_or_default(),
                has_depth: first.is_some_and(|s| !s.p_depth_stencil_attachment.is_null()),
                subpass_count: info.subpass_count,
                dependency_count: info.dependency_count,
            }
        };
        self.render_pass_request = Some(request);
        self.make(Kind::RenderPass).map(vk::RenderPass::from_raw)
    }

    fn create_shader_module(&mut self, info: &vk::ShaderModuleCreateInfo<'_>) -> VkResult<vk::ShaderModule> {
        // SAFETY: code_size is in bytes and always a multiple of four here
        let words = unsafe { slice(info.p_code, (info.code_size / 4) as u32) }.to_vec();
        self.shader_code.push(words);
        self.make(Kind::ShaderModule).map(vk::ShaderModule::from_raw)
    }

    fn create_pipeline_layout(
        &mut self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        self.layout_request = Some((info.set_layout_count, info.push_constant_range_count));
        self.make(Kind::PipelineLayout).map(vk::PipelineLayout::from_raw)
    }

    fn create_graphics_pipeline(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        // SAFETY: as in create_instance; every state pointer the factory sets is non-null
        let request = unsafe {
            let vertex = &*info.p_vertex_input_state;
            let assembly = &*info.p_input_assembly_state;
            let viewport = &*info.p_viewport_state;
            let raster = &*info.p_rasterization_state;
            let multisample = &*info.p_multisample_state;
            let blend = &*info.p_color_blend_state;
            let dynamic = info.p_dynamic_state.as_ref();
            PipelineRequest {
                stages: slice(info.p_stages, info.stage_count)
                    .iter()
                    .map(|s| {
                        (s.stage, s.module, CStr::from_ptr(s.p_name).to_string_lossy().into_owned())
                    })
                    .collect(),
                vertex_bindings: vertex.vertex_binding_description_count,
                vertex_attributes: vertex.vertex_attribute_description_count,
                topology: assembly.topology,
                primitive_restart: assembly.primitive_restart_enable == vk::TRUE,
                viewport_count: viewport.viewport_count,
                scissor_count: viewport.scissor_count,
                dynamic_states: dynamic
                    .map(|d| slice(d.p_dynamic_states, d.dynamic_state_count).to_vec())
                    .unwrap_or_default(),
                depth_clamp: raster.depth_clamp_enable == vk::TRUE,
                rasterizer_discard: raster.rasterizer_discard_enable == vk::TRUE,
                polygon_mode: raster.polygon_mode,
                line_width: raster.line_width,
                cull_mode: raster.cull_mode,
                front_face: raster.front_face,
                depth_bias: raster.depth_bias_enable == vk::TRUE,
                samples: multisample.rasterization_samples,
                sample_shading: multisample.sample_shading_enable == vk::TRUE,
                has_depth_stencil: !info.p_depth_stencil_state.is_null(),
                logic_op: blend.logic_op_enable == vk::TRUE,
                blend_attachments: slice(blend.p_attachments, blend.attachment_count).to_vec(),
                layout: info.layout,
                render_pass: info.render_pass,
                subpass: info.subpass,
            }
        };
        self.pipeline_request = Some(request);
        self.make(Kind::Pipeline).map(vk::Pipeline::from_raw)
    }

    fn create_framebuffer(&mut self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer> {
        // SAFETY: as in create_instance
        let attachments = unsafe { slice(info.p_attachments, info.attachment_count) }.to_vec();
        self.framebuffer_requests.push(FramebufferRequest {
            render_pass: info.render_pass,
            attachments,
            width: info.width,
            height: info.height,
            layers: info.layers,
        });
        self.make(Kind::Framebuffer).map(vk::Framebuffer::from_raw)
    }

    fn create_command_pool(&mut self, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool> {
        self.command_pool_request = Some((info.flags, info.queue_family_index));
        self.make(Kind::CommandPool).map(vk::CommandPool::from_raw)
    }

    unsafe fn destroy_instance(&mut self, instance: vk::Instance) {
        self.drop_handle(Kind::Instance, instance.as_raw());
    }

    unsafe fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        self.drop_handle(Kind::Messenger, messenger.as_raw());
    }

    unsafe fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        self.drop_handle(Kind::Surface, surface.as_raw());
    }

    unsafe fn destroy_device(&mut self, device: vk::Device) {
        self.drop_handle(Kind::Device, device.as_raw());
    }

    unsafe fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        self.drop_handle(Kind::Swapchain, swapchain.as_raw());
    }

    unsafe fn destroy_image_view(&mut self, view: vk::ImageView) {
        self.drop_handle(Kind::ImageView, view.as_raw());
    }

    unsafe fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        self.drop_handle(Kind::RenderPass, render_pass.as_raw());
    }

    unsafe fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        self.drop_handle(Kind::ShaderModule, module.as_raw());
    }

    unsafe fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        self.drop_handle(Kind::PipelineLayout, layout.as_raw());
    }

    unsafe fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        self.drop_handle(Kind::Pipeline, pipeline.as_raw());
    }

    unsafe fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        self.drop_handle(Kind::Framebuffer, framebuffer.as_raw());
    }

    unsafe fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        self.drop_handle(Kind::CommandPool, pool.as_raw());
    }
}

/// A window of fixed size with made-up Xlib handles. Only the mock driver ever sees them.
pub struct FixedWindow(pub RenderSize);

impl SurfaceSource for FixedWindow {
    fn raw_handles(&self) -> Result<(RawDisplayHandle, RawWindowHandle), HandleError> {
        Ok((
            RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0)),
            RawWindowHandle::Xlib(XlibWindowHandle::new(1)),
        ))
    }

    fn framebuffer_size(&self) -> RenderSize {
        self.0
    }
}

/// Window whose handles are not available yet.
pub struct HandlelessWindow;

impl SurfaceSource for HandlelessWindow {
    fn raw_handles(&self) -> Result<(RawDisplayHandle, RawWindowHandle), HandleError> {
        Err(HandleError::Unavailable)
    }

    fn framebuffer_size(&self) -> RenderSize {
        RenderSize { width: 0, height: 0 }
    }
}

#[derive(Default)]
pub struct MemoryShaders(pub HashMap<String, Vec<u8>>);

impl MemoryShaders {
    pub fn with(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.0.insert(name.to_owned(), bytes);
        self
    }

    /// `vert.spv` and `frag.spv` as minimal well-formed SPIR-V headers.
    pub fn triangle() -> Self {
        MemoryShaders::default()
            .with("vert.spv", spirv(&[1, 2, 3]))
            .with("frag.spv", spirv(&[4, 5]))
    }
}

impl ShaderSource for MemoryShaders {
    fn load(&self, name: &str) -> Result<Vec<u8>, ShaderLoadError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderLoadError::NotFound(name.to_owned()))
    }
}

/// Little-endian bytes of the SPIR-V magic followed by `body`.
pub fn spirv(body: &[u32]) -> Vec<u8> {
    std::iter::once(0x0723_0203u32)
        .chain(body.iter().copied())
        .flat_map(u32::to_le_bytes)
        .collect()
}
