// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use std::ffi::{c_char, CString};

use crate::debug::{messenger_create_info, DEBUG_UTILS_EXTENSION};
use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result};
use crate::probe;

#[cfg(target_os = "macos")]
const PORTABILITY_EXTENSIONS: &[&str] = &[
    "VK_KHR_portability_enumeration",
    "VK_KHR_get_physical_device_properties2",
];

pub struct ContextRequest<'a> {
    pub app_name: &'a str,
    pub app_version: u32,
    pub engine_name: &'a str,
    pub api_version: u32,
    pub enable_diagnostics: bool,
    pub diagnostic_layers: &'a [String],
    pub required_extensions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ExecutionContext {
    pub instance: vk::Instance,
    pub enabled_layers: Vec<String>,
    pub enabled_extensions: Vec<String>,
    pub diagnostics: bool,
}

pub(crate) fn c_strings(names: &[String]) -> Result<Vec<CString>> {
    names
        .iter()
        .map(|n| {
            CString::new(n.as_str())
                .map_err(|_| BootstrapError::Configuration(format!("name {n:?} contains a nul byte")))
        })
        .collect()
}

pub(crate) fn c_ptrs(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|n| n.as_ptr()).collect()
}

pub fn create_context(driver: &mut impl VkDriver, req: ContextRequest<'_>) -> Result<ExecutionContext> {
    let available = probe::list_instance_extensions(driver)?;
    tracing::debug!(
        "{} instance extensions available: {:?}",
        available.len(),
        available.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
    );

    let mut extensions = req.required_extensions;
    let mut layers = Vec::new();

    if req.enable_diagnostics {
        if !probe::diagnostic_layers_available(driver, req.diagnostic_layers)? {
            let present = probe::list_diagnostic_layers(driver)?;
            let missing: Vec<&str> = req
                .diagnostic_layers
                .iter()
                .filter(|l| !present.contains(*l))
                .map(String::as_str)
                .collect();
            return Err(BootstrapError::Configuration(format!(
                "diagnostics requested but unavailable: missing layer(s) {missing:?}"
            )));
        }
        if !available.iter().any(|e| e.name == DEBUG_UTILS_EXTENSION) {
            return Err(BootstrapError::Configuration(format!(
                "diagnostics requested but unavailable: {DEBUG_UTILS_EXTENSION} not present"
            )));
        }
        layers.extend(req.diagnostic_layers.iter().cloned());
        if !extensions.iter().any(|e| e == DEBUG_UTILS_EXTENSION) {
            extensions.push(DEBUG_UTILS_EXTENSION.to_owned());
        }
    }

    #[cfg(target_os = "macos")]
    for ext in PORTABILITY_EXTENSIONS {
        if !extensions.iter().any(|e| e == ext) {
            extensions.push((*ext).to_owned());
        }
    }

    let app_name = CString::new(req.app_name)
        .map_err(|_| BootstrapError::Configuration("application name contains a nul byte".into()))?;
    let engine_name = CString::new(req.engine_name)
        .map_err(|_| BootstrapError::Configuration("engine name contains a nul byte".into()))?;
    let layer_names = c_strings(&layers)?;
    let extension_names = c_strings(&extensions)?;
    let layer_ptrs = c_ptrs(&layer_names);
    let extension_ptrs = c_ptrs(&extension_names);

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(req.app_version)
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(req.api_version);

    // Chained so messages emitted while the instance itself is being created are captured.
    let mut creation_messages = messenger_create_info();
    let mut info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&layer_ptrs)
        .enabled_extension_names(&extension_ptrs);
    if req.enable_diagnostics {
        info = info.push_next(&mut creation_messages);
    }

    #[cfg(target_os = "macos")]
    let info = info.flags(vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR);

    let instance = driver
        .create_instance(&info)
        .map_err(BootstrapError::ContextCreation)?;
    tracing::info!(
        "Vulkan instance created ({} layer(s), {} extension(s))",
        layers.len(),
        extensions.len()
    );

    Ok(ExecutionContext {
        instance,
        enabled_layers: layers,
        enabled_extensions: extensions,
        diagnostics: req.enable_diagnostics,
    })
}

/// Registers the standing subscriber used after instance creation.
pub fn attach_diagnostics(driver: &mut impl VkDriver) -> Result<vk::DebugUtilsMessengerEXT> {
    if !driver.diagnostics_supported() {
        return Err(BootstrapError::Configuration(
            "diagnostics requested but the debug-utils entry points are unavailable".into(),
        ));
    }
    let messenger = driver
        .create_debug_messenger(&messenger_create_info())
        .map_err(BootstrapError::DiagnosticsSubscriber)?;
    tracing::info!("diagnostics subscriber attached");
    Ok(messenger)
}
