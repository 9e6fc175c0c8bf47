// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{init_tracing, AppConfig};
use lumen_platform::{PlatformWindow, WindowSettings};
use lumen_render::{FsShaderSource, ShaderSource};
use lumen_render_vk::{AshDriver, BootstrapConfig, Bootstrapper};
use std::path::PathBuf;
use tracing::{error, info};

use lumen_platform::winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowId,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Vulkan triangle bootstrap", long_about = None)]
struct Args {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, default_value = "lumen.toml")]
    config: PathBuf,
    /// Force validation layers and the debug messenger on
    #[arg(long, conflicts_with = "no_diagnostics")]
    diagnostics: bool,
    /// Force them off
    #[arg(long)]
    no_diagnostics: bool,
    /// Directory holding vert.spv / frag.spv
    #[arg(long)]
    shader_dir: Option<PathBuf>,
    /// Use the shaders compiled into the binary
    #[cfg(feature = "embedded-shaders")]
    #[arg(long)]
    embedded_shaders: bool,
}

impl Args {
    fn diagnostics_override(&self) -> Option<bool> {
        if self.diagnostics {
            Some(true)
        } else if self.no_diagnostics {
            Some(false)
        } else {
            None
        }
    }

    fn shader_source(&self, cfg: &AppConfig) -> Box<dyn ShaderSource> {
        #[cfg(feature = "embedded-shaders")]
        if self.embedded_shaders {
            return Box::new(lumen_render_vk::EmbeddedShaders);
        }
        let dir = self
            .shader_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&cfg.shaders.dir));
        info!("shaders from {}", dir.display());
        Box::new(FsShaderSource::new(dir))
    }
}

fn bootstrap_config(cfg: &AppConfig, diagnostics: Option<bool>) -> BootstrapConfig {
    let defaults = BootstrapConfig::default();
    BootstrapConfig {
        app_name: cfg.bootstrap.app_name.clone(),
        enable_diagnostics: diagnostics
            .or(cfg.bootstrap.diagnostics)
            .unwrap_or(defaults.enable_diagnostics),
        diagnostic_layers: cfg.bootstrap.layers.clone(),
        device_extensions: cfg.bootstrap.device_extensions.clone(),
        vertex_shader: cfg.shaders.vertex.clone(),
        fragment_shader: cfg.shaders.fragment.clone(),
        ..defaults
    }
}

struct App {
    settings: WindowSettings,
    bootstrap: BootstrapConfig,
    shaders: Box<dyn ShaderSource>,

    // Declared before the window so the surface goes first when dropped.
    vulkan: Option<Bootstrapper<AshDriver>>,
    window: Option<PlatformWindow>,

    failure: Option<anyhow::Error>,
}

impl App {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = PlatformWindow::create(event_loop, &self.settings).context("create window")?;
        let driver = AshDriver::load()?;
        let mut vulkan = Bootstrapper::new(driver, self.bootstrap.clone());
        let outcome = vulkan.run(&window, self.shaders.as_ref());
        self.window = Some(window);
        outcome?;
        self.vulkan = Some(vulkan);
        info!("vulkan ready; entering event loop");
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut vulkan) = self.vulkan.take() {
            vulkan.teardown();
        }
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            error!("startup failed: {e:#}");
            self.failure = Some(e);
            self.shutdown(event_loop);
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if let Some(window) = &self.window {
            if window_id != window.id() {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("CloseRequested");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!("Escape pressed");
                self.shutdown(event_loop);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut vulkan) = self.vulkan.take() {
            vulkan.teardown();
        }
        self.window = None;
    }
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let cfg = AppConfig::load(&args.config)?;

    let mut app = App {
        settings: WindowSettings {
            title: cfg.window.title.clone(),
            width: cfg.window.width,
            height: cfg.window.height,
            resizable: cfg.window.resizable,
        },
        bootstrap: bootstrap_config(&cfg, args.diagnostics_override()),
        shaders: args.shader_source(&cfg),
        vulkan: None,
        window: None,
        failure: None,
    };

    let event_loop: EventLoop<()> = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
