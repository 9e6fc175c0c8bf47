// SPDX-License-Identifier: CEPL-1.0
//! Presentation chain negotiation and creation.
use ash::vk;
use lumen_render::{RenderSize, SurfaceSource};

use crate::adapter::{QueueFamilyAssignment, SelectedAdapter};
use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result};
use crate::probe::{self, SwapchainCapable};

#[derive(Clone, Debug)]
pub struct PresentationChain {
    pub handle: vk::SwapchainKHR,
    /// Owned by the swapchain; released with it.
    pub images: Vec<vk::Image>,
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
}

/// Prefers BGRA8 sRGB, otherwise the first format reported.
///
/// `formats` must not be empty; surface support is checked for that before any chain is
/// negotiated.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| f.format == vk::Format::B8G8R8A8_SRGB && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .unwrap_or_else(|| formats[0])
}

/// MAILBOX when offered, else FIFO (always available).
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.iter().any(|&m| m == vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, want: RenderSize) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: want.width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: want.height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

/// One more than the minimum, capped by the maximum unless that is 0 (no cap).
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let want = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        want.min(caps.max_image_count)
    } else {
        want
    }
}

pub fn sharing_mode(queues: &QueueFamilyAssignment) -> (vk::SharingMode, Vec<u32>) {
    if queues.is_shared() {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (vk::SharingMode::CONCURRENT, vec![queues.graphics, queues.present])
    }
}

pub fn create_presentation_chain(
    driver: &mut impl VkDriver,
    adapter: &SelectedAdapter,
    surface: vk::SurfaceKHR,
    window: &dyn SurfaceSource,
) -> Result<PresentationChain> {
    // Re-query: support is scoped to (adapter, surface) and may have moved since selection.
    let capable = SwapchainCapable::check(adapter.handle, &adapter.extensions)
        .ok_or(BootstrapError::SwapchainCreation(vk::Result::ERROR_EXTENSION_NOT_PRESENT))?;
    let support = probe::query_surface_support(driver, capable, surface)?;
    if !support.is_adequate() {
        return Err(BootstrapError::SwapchainCreation(vk::Result::ERROR_FORMAT_NOT_SUPPORTED));
    }
    let caps = &support.capabilities;

    let format = choose_surface_format(&support.formats);
    let present_mode = choose_present_mode(&support.present_modes);
    let extent = choose_extent(caps, window.framebuffer_size());
    let image_count = choose_image_count(caps);
    let (sharing, families) = sharing_mode(&adapter.queues);

    let info = vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(format.format)
        .image_color_space(format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(sharing)
        .queue_family_indices(&families)
        .pre_transform(caps.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(vk::SwapchainKHR::null());

    let handle = driver
        .create_swapchain(&info)
        .map_err(BootstrapError::SwapchainCreation)?;

    let images = match driver.swapchain_images(handle) {
        Ok(images) => images,
        Err(result) => {
            // SAFETY: just created, nothing derived from it yet
            unsafe { driver.destroy_swapchain(handle) };
            return Err(BootstrapError::SwapchainCreation(result));
        }
    };

    tracing::info!(
        "swapchain created: {} image(s) (asked {}), {:?}/{:?}, {:?}, {}x{}, {:?}",
        images.len(),
        image_count,
        format.format,
        format.color_space,
        present_mode,
        extent.width,
        extent.height,
        sharing,
    );

    Ok(PresentationChain {
        handle,
        images,
        format,
        present_mode,
        extent,
    })
}

/// One colour view per image. On failure every view made so far is destroyed.
pub fn create_image_views(
    driver: &mut impl VkDriver,
    images: &[vk::Image],
    format: vk::Format,
) -> Result<Vec<vk::ImageView>> {
    let mut views = Vec::with_capacity(images.len());
    for (index, &image) in images.iter().enumerate() {
        let info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        match driver.create_image_view(&info) {
            Ok(view) => views.push(view),
            Err(result) => {
                for &view in views.iter().rev() {
                    // SAFETY: created above and not handed out
                    unsafe { driver.destroy_image_view(view) };
                }
                return Err(BootstrapError::ViewCreation { index, result });
            }
        }
    }
    tracing::info!("{} swapchain image view(s) created", views.len());
    Ok(views)
}
