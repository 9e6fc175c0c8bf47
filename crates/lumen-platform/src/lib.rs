// SPDX-License-Identifier: CEPL-1.0
pub use winit;

use lumen_render::{RenderSize, SurfaceSource};
use winit::{
    dpi::LogicalSize,
    error::OsError,
    event_loop::ActiveEventLoop,
    raw_window_handle::{
        HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
    },
    window::{Window, WindowId},
};

#[derive(Clone, Debug)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

/// A winit window that render backends can create surfaces for.
pub struct PlatformWindow {
    window: Window,
}

impl PlatformWindow {
    pub fn create(event_loop: &ActiveEventLoop, settings: &WindowSettings) -> Result<Self, OsError> {
        let attrs = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height))
            .with_resizable(settings.resizable);
        let window = event_loop.create_window(attrs)?;
        let size = window.inner_size();
        tracing::info!(
            "window \"{}\" created ({}x{} physical)",
            settings.title,
            size.width,
            size.height
        );
        Ok(PlatformWindow { window })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }
}

impl SurfaceSource for PlatformWindow {
    fn raw_handles(&self) -> Result<(RawDisplayHandle, RawWindowHandle), HandleError> {
        Ok((
            self.window.display_handle()?.as_raw(),
            self.window.window_handle()?.as_raw(),
        ))
    }

    fn framebuffer_size(&self) -> RenderSize {
        let size = self.window.inner_size();
        RenderSize {
            width: size.width,
            height: size.height,
        }
    }
}
