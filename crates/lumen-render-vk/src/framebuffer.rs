// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result};

/// One single-attachment framebuffer per view. All or nothing.
pub fn create_framebuffers(
    driver: &mut impl VkDriver,
    render_pass: vk::RenderPass,
    views: &[vk::ImageView],
    extent: vk::Extent2D,
) -> Result<Vec<vk::Framebuffer>> {
    let mut framebuffers = Vec::with_capacity(views.len());
    for (index, view) in views.iter().enumerate() {
        let attachments = [*view];
        let info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);
        match driver.create_framebuffer(&info) {
            Ok(fb) => framebuffers.push(fb),
            Err(result) => {
                for &fb in framebuffers.iter().rev() {
                    // SAFETY: created above and never handed out
                    unsafe { driver.destroy_framebuffer(fb) };
                }
                return Err(BootstrapError::FramebufferCreation { index, result });
            }
        }
    }
    tracing::info!("{} framebuffer(s) created", framebuffers.len());
    Ok(framebuffers)
}
