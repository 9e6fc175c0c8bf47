// SPDX-License-Identifier: CEPL-1.0
//! Ordered bring-up of every Vulkan object the triangle needs, and its exact reverse.
use ash::vk;
use lumen_render::{ShaderSource, SurfaceSource};

use crate::adapter::{self, SelectedAdapter};
use crate::command::create_command_pool;
use crate::context::{attach_diagnostics, create_context, ContextRequest, ExecutionContext};
use crate::device::{create_logical_device, LogicalDevice};
use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result, ShaderStage};
use crate::framebuffer::create_framebuffers;
use crate::pipeline::{create_pipeline, create_render_target, load_stage, GraphicsPipeline};
use crate::probe::{self, SWAPCHAIN_EXTENSION};
use crate::swapchain::{create_image_views, create_presentation_chain, PresentationChain};

/// Everything the bootstrap chain needs to know up front. Immutable once handed over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub app_name: String,
    pub app_version: u32,
    pub engine_name: String,
    pub api_version: u32,
    pub enable_diagnostics: bool,
    pub diagnostic_layers: Vec<String>,
    pub device_extensions: Vec<String>,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            app_name: "Hello Triangle".into(),
            app_version: vk::make_api_version(0, 1, 0, 0),
            engine_name: "No Engine".into(),
            api_version: vk::API_VERSION_1_3,
            enable_diagnostics: cfg!(debug_assertions),
            diagnostic_layers: vec!["VK_LAYER_KHRONOS_validation".into()],
            device_extensions: vec![SWAPCHAIN_EXTENSION.into()],
            vertex_shader: "vert.spv".into(),
            fragment_shader: "frag.spv".into(),
        }
    }
}

/// Bring-up progress. Each stage is only entered after the previous one succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    ContextCreated,
    DiagnosticsAttached,
    SurfaceAcquired,
    AdapterSelected,
    DeviceCreated,
    ChainCreated,
    ViewsCreated,
    RenderTargetDescribed,
    PipelineCreated,
    FramebuffersCreated,
    CommandPoolCreated,
    Running,
}

/// Handles that need an explicit release. The adapter, the queues and the swapchain
/// images die with their parents and never appear here.
#[derive(Debug)]
enum Owned {
    Instance(vk::Instance),
    Messenger(vk::DebugUtilsMessengerEXT),
    Surface(vk::SurfaceKHR),
    Device(vk::Device),
    Swapchain(vk::SwapchainKHR),
    ImageViews(Vec<vk::ImageView>),
    RenderPass(vk::RenderPass),
    Pipeline(GraphicsPipeline),
    Framebuffers(Vec<vk::Framebuffer>),
    CommandPool(vk::CommandPool),
}

impl Owned {
    fn name(&self) -> &'static str {
        match self {
            Owned::Instance(_) => "instance",
            Owned::Messenger(_) => "diagnostics subscriber",
            Owned::Surface(_) => "surface",
            Owned::Device(_) => "logical device",
            Owned::Swapchain(_) => "swapchain",
            Owned::ImageViews(_) => "image views",
            Owned::RenderPass(_) => "render pass",
            Owned::Pipeline(_) => "graphics pipeline",
            Owned::Framebuffers(_) => "framebuffers",
            Owned::CommandPool(_) => "command pool",
        }
    }

    /// # Safety
    /// Everything acquired after this handle must already be released.
    unsafe fn release(self, driver: &mut impl VkDriver) {
        // SAFETY: forwarded from the caller
        unsafe {
            match self {
                Owned::Instance(h) => driver.destroy_instance(h),
                Owned::Messenger(h) => driver.destroy_debug_messenger(h),
                Owned::Surface(h) => driver.destroy_surface(h),
                Owned::Device(h) => driver.destroy_device(h),
                Owned::Swapchain(h) => driver.destroy_swapchain(h),
                Owned::ImageViews(views) => {
                    for v in views.into_iter().rev() {
                        driver.destroy_image_view(v);
                    }
                }
                Owned::RenderPass(h) => driver.destroy_render_pass(h),
                Owned::Pipeline(p) => {
                    driver.destroy_pipeline(p.pipeline);
                    driver.destroy_pipeline_layout(p.layout);
                }
                Owned::Framebuffers(fbs) => {
                    for fb in fbs.into_iter().rev() {
                        driver.destroy_framebuffer(fb);
                    }
                }
                Owned::CommandPool(h) => driver.destroy_command_pool(h),
            }
        }
    }
}

/// Owns the driver and every handle created through it.
///
/// [`Bootstrapper::run`] walks the stages in order; on failure it releases whatever had
/// been built and returns the error. [`Bootstrapper::teardown`] (also run on drop)
/// releases a fully or partially built chain in strict reverse order.
pub struct Bootstrapper<D: VkDriver> {
    driver: D,
    config: BootstrapConfig,
    stage: Stage,
    owned: Vec<Owned>,

    context: Option<ExecutionContext>,
    surface: vk::SurfaceKHR,
    adapter: Option<SelectedAdapter>,
    device: Option<LogicalDevice>,
    chain: Option<PresentationChain>,
    views: Vec<vk::ImageView>,
    render_pass: vk::RenderPass,
    pipeline: Option<GraphicsPipeline>,
    framebuffers: Vec<vk::Framebuffer>,
    command_pool: vk::CommandPool,
}

impl<D: VkDriver> Bootstrapper<D> {
    pub fn new(driver: D, config: BootstrapConfig) -> Self {
        Self {
            driver,
            config,
            stage: Stage::Uninitialized,
            owned: Vec::new(),
            context: None,
            surface: vk::SurfaceKHR::null(),
            adapter: None,
            device: None,
            chain: None,
            views: Vec::new(),
            render_pass: vk::RenderPass::null(),
            pipeline: None,
            framebuffers: Vec::new(),
            command_pool: vk::CommandPool::null(),
        }
    }

    pub fn run(&mut self, window: &dyn SurfaceSource, shaders: &dyn ShaderSource) -> Result<()> {
        if self.stage != Stage::Uninitialized {
            return Err(BootstrapError::Configuration(format!(
                "bootstrap already ran (stage {:?})",
                self.stage
            )));
        }
        match self.bring_up(window, shaders) {
            Ok(()) => {
                self.enter(Stage::Running);
                Ok(())
            }
            Err(e) => {
                tracing::error!("bootstrap failed after {:?}: {e}", self.stage);
                self.teardown();
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("bootstrap stage: {stage:?}");
        self.stage = stage;
    }

    fn acquired(&mut self, stage: Stage, handle: Owned) {
        self.owned.push(handle);
        self.enter(stage);
    }

    fn bring_up(&mut self, window: &dyn SurfaceSource, shaders: &dyn ShaderSource) -> Result<()> {
        let cfg = self.config.clone();

        let required_extensions = probe::list_required_platform_extensions(&self.driver, window)?;
        tracing::debug!("platform requires instance extensions {required_extensions:?}");
        let context = create_context(
            &mut self.driver,
            ContextRequest {
                app_name: &cfg.app_name,
                app_version: cfg.app_version,
                engine_name: &cfg.engine_name,
                api_version: cfg.api_version,
                enable_diagnostics: cfg.enable_diagnostics,
                diagnostic_layers: &cfg.diagnostic_layers,
                required_extensions,
            },
        )?;
        self.acquired(Stage::ContextCreated, Owned::Instance(context.instance));
        self.context = Some(context);

        if cfg.enable_diagnostics {
            let messenger = attach_diagnostics(&mut self.driver)?;
            self.acquired(Stage::DiagnosticsAttached, Owned::Messenger(messenger));
        }

        let (display, raw_window) = window
            .raw_handles()
            .map_err(|e| BootstrapError::SurfaceCreation(e.to_string()))?;
        let surface = self
            .driver
            .create_surface(display, raw_window)
            .map_err(|r| BootstrapError::SurfaceCreation(r.to_string()))?;
        tracing::info!("window surface created");
        self.acquired(Stage::SurfaceAcquired, Owned::Surface(surface));
        self.surface = surface;

        let selected = adapter::select(&self.driver, surface, &cfg.device_extensions)?;
        self.enter(Stage::AdapterSelected);

        let layers = cfg.enable_diagnostics.then_some(cfg.diagnostic_layers.as_slice());
        let device = create_logical_device(&mut self.driver, &selected, &cfg.device_extensions, layers)?;
        self.acquired(Stage::DeviceCreated, Owned::Device(device.handle));
        self.device = Some(device);

        let chain = create_presentation_chain(&mut self.driver, &selected, surface, window)?;
        self.acquired(Stage::ChainCreated, Owned::Swapchain(chain.handle));
        let (format, extent) = (chain.format.format, chain.extent);
        let images = chain.images.clone();
        self.chain = Some(chain);
        let graphics_family = selected.queues.graphics;
        self.adapter = Some(selected);

        let views = create_image_views(&mut self.driver, &images, format)?;
        self.views = views.clone();
        self.acquired(Stage::ViewsCreated, Owned::ImageViews(views));

        let render_pass = create_render_target(&mut self.driver, format)?;
        self.render_pass = render_pass;
        self.acquired(Stage::RenderTargetDescribed, Owned::RenderPass(render_pass));

        let vertex = load_stage(shaders, ShaderStage::Vertex, &cfg.vertex_shader)?;
        let fragment = load_stage(shaders, ShaderStage::Fragment, &cfg.fragment_shader)?;
        let pipeline = create_pipeline(&mut self.driver, render_pass, extent, &vertex, &fragment)?;
        self.pipeline = Some(pipeline);
        self.acquired(Stage::PipelineCreated, Owned::Pipeline(pipeline));

        let framebuffers = create_framebuffers(&mut self.driver, render_pass, &self.views, extent)?;
        self.framebuffers = framebuffers.clone();
        self.acquired(Stage::FramebuffersCreated, Owned::Framebuffers(framebuffers));

        let pool = create_command_pool(&mut self.driver, graphics_family)?;
        self.command_pool = pool;
        self.acquired(Stage::CommandPoolCreated, Owned::CommandPool(pool));

        Ok(())
    }

    /// Releases everything acquired so far, newest first. Safe to call at any stage and
    /// more than once.
    pub fn teardown(&mut self) {
        if self.owned.is_empty() {
            return;
        }
        if self.owned.iter().any(|o| matches!(o, Owned::Device(_))) {
            if let Err(e) = self.driver.device_wait_idle() {
                tracing::warn!("device_wait_idle before teardown failed: {e}");
            }
        }
        while let Some(handle) = self.owned.pop() {
            tracing::debug!("releasing {}", handle.name());
            // SAFETY: handles are popped in reverse acquisition order, so every dependent
            // has already been released
            unsafe { handle.release(&mut self.driver) };
        }

        self.context = None;
        self.surface = vk::SurfaceKHR::null();
        self.adapter = None;
        self.device = None;
        self.chain = None;
        self.views.clear();
        self.render_pass = vk::RenderPass::null();
        self.pipeline = None;
        self.framebuffers.clear();
        self.command_pool = vk::CommandPool::null();
        self.stage = Stage::Uninitialized;
        tracing::info!("vulkan teardown complete");
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn context(&self) -> Option<&ExecutionContext> {
        self.context.as_ref()
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn adapter(&self) -> Option<&SelectedAdapter> {
        self.adapter.as_ref()
    }

    pub fn device(&self) -> Option<&LogicalDevice> {
        self.device.as_ref()
    }

    pub fn chain(&self) -> Option<&PresentationChain> {
        self.chain.as_ref()
    }

    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.views
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn pipeline(&self) -> Option<GraphicsPipeline> {
        self.pipeline
    }

    pub fn framebuffers(&self) -> &[vk::Framebuffer] {
        &self.framebuffers
    }

    pub fn command_pool(&self) -> vk::CommandPool {
        self.command_pool
    }
}

impl<D: VkDriver> Drop for Bootstrapper<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
