// SPDX-License-Identifier: CEPL-1.0
//! Diagnostics sink: driver messages are forwarded into `tracing`.
use ash::vk;
use std::borrow::Cow;
use std::ffi::{c_void, CStr};

pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

/// Subscriber descriptor used both chained into instance creation and for the standing
/// messenger registered afterwards.
pub fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
}

fn category(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "performance"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        "general"
    } else {
        "unknown"
    }
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    //SAFETY: Vulkan guarantees p_callback_data is valid for the duration of the callback
    let data = unsafe { &*p_callback_data };
    let message: Cow<'_, str> = if data.p_message.is_null() {
        "<no message>".into()
    } else {
        //SAFETY: p_message is a nul-terminated string owned by the driver
        unsafe { CStr::from_ptr(data.p_message) }.to_string_lossy()
    };
    let kind = category(message_type);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => {
            tracing::trace!(target: "lumen::vk-debug", "[{kind}] {message}");
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            tracing::info!(target: "lumen::vk-debug", "[{kind}] {message}");
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            tracing::warn!(target: "lumen::vk-debug", "[{kind}] {message}");
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            tracing::error!(target: "lumen::vk-debug", "[{kind}] {message}");
        }
        _ => {
            tracing::debug!(target: "lumen::vk-debug", "[{kind}] {message}");
        }
    }

    vk::FALSE
}
