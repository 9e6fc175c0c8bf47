// SPDX-License-Identifier: CEPL-1.0
//! Render pass description and the fixed-function triangle pipeline.
use ash::vk;
use lumen_render::ShaderSource;

use crate::driver::VkDriver;
use crate::error::{BootstrapError, Result, ShaderStage};

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphicsPipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
}

/// Single colour attachment cleared on load and presented afterwards.
pub fn create_render_target(driver: &mut impl VkDriver, color_format: vk::Format) -> Result<vk::RenderPass> {
    let color = vk::AttachmentDescription::default()
        .format(color_format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);
    let color_ref = vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    };
    let color_refs = [color_ref];
    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs);

    let attachments = [color];
    let subpasses = [subpass];
    let info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses);

    let render_pass = driver
        .create_render_pass(&info)
        .map_err(BootstrapError::RenderTargetCreation)?;
    tracing::info!("render pass created for {color_format:?}");
    Ok(render_pass)
}

/// Fetches one stage's bytecode from the shader collaborator.
pub fn load_stage(source: &dyn ShaderSource, stage: ShaderStage, name: &str) -> Result<Vec<u8>> {
    source.load(name).map_err(|e| BootstrapError::ShaderSource {
        stage,
        name: name.to_owned(),
        source: e,
    })
}

/// Reinterprets raw bytes as SPIR-V words, rejecting anything that cannot be a module.
pub fn spirv_words(stage: ShaderStage, bytes: &[u8]) -> Result<Vec<u32>> {
    let reject = |reason: String| BootstrapError::ShaderModule { stage, reason };
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(reject(format!(
            "bytecode length {} is not a positive multiple of 4",
            bytes.len()
        )));
    }
    let words: Vec<u32> = bytemuck::pod_collect_to_vec(bytes);
    if words[0] != SPIRV_MAGIC {
        return Err(reject(format!("bad SPIR-V magic {:#010x}", words[0])));
    }
    Ok(words)
}

fn create_module(driver: &mut impl VkDriver, stage: ShaderStage, bytes: &[u8]) -> Result<vk::ShaderModule> {
    let words = spirv_words(stage, bytes)?;
    let info = vk::ShaderModuleCreateInfo::default().code(&words);
    driver
        .create_shader_module(&info)
        .map_err(|result| BootstrapError::ShaderModule {
            stage,
            reason: result.to_string(),
        })
}

pub fn create_pipeline(
    driver: &mut impl VkDriver,
    render_pass: vk::RenderPass,
    extent: vk::Extent2D,
    vertex_code: &[u8],
    fragment_code: &[u8],
) -> Result<GraphicsPipeline> {
    let vert = create_module(driver, ShaderStage::Vertex, vertex_code)?;
    let frag = match create_module(driver, ShaderStage::Fragment, fragment_code) {
        Ok(frag) => frag,
        Err(e) => {
            // SAFETY: nothing references the module yet
            unsafe { driver.destroy_shader_module(vert) };
            return Err(e);
        }
    };

    let built = build_pipeline(driver, render_pass, vert, frag);

    // Modules are only needed while the pipeline is built.
    // SAFETY: pipeline creation has returned; the modules are no longer referenced
    unsafe {
        driver.destroy_shader_module(frag);
        driver.destroy_shader_module(vert);
    }

    let pipeline = built?;
    tracing::info!(
        "graphics pipeline created (extent {}x{}, viewport and scissor dynamic)",
        extent.width,
        extent.height
    );
    Ok(pipeline)
}

fn build_pipeline(
    driver: &mut impl VkDriver,
    render_pass: vk::RenderPass,
    vert: vk::ShaderModule,
    frag: vk::ShaderModule,
) -> Result<GraphicsPipeline> {
    let stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vert)
            .name(c"main"),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(frag)
            .name(c"main"),
    ];

    // Geometry lives in the vertex shader.
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);
    let viewport = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);

    let raster = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::CLOCKWISE)
        .depth_bias_enable(false);

    let multisample = vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::TYPE_1);

    let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(false)];
    let blend = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .attachments(&blend_attachments);

    let layout_info = vk::PipelineLayoutCreateInfo::default();
    let layout = driver
        .create_pipeline_layout(&layout_info)
        .map_err(BootstrapError::PipelineLayout)?;

    let info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport)
        .rasterization_state(&raster)
        .multisample_state(&multisample)
        .color_blend_state(&blend)
        .dynamic_state(&dynamic)
        .layout(layout)
        .render_pass(render_pass)
        .subpass(0);

    match driver.create_graphics_pipeline(&info) {
        Ok(pipeline) => Ok(GraphicsPipeline { pipeline, layout }),
        Err(result) => {
            // SAFETY: the failed pipeline never took a reference to the layout
            unsafe { driver.destroy_pipeline_layout(layout) };
            Err(BootstrapError::PipelineCreation(result))
        }
    }
}
