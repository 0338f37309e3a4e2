//! Pipeline create-info population.
//!
//! [`PipelineDescription::capture`] snapshots the pipeline-relevant state into Vulkan-typed
//! arrays; the `*_state` methods hand out create-info structs that borrow from the snapshot, so
//! a caller can fill a `vk::GraphicsPipelineCreateInfo` without extra allocation. Shader stages,
//! the pipeline layout and the render pass belong to the caller.

use ash::vk;
use tracing::debug;

use crate::state::{
    GlState, StencilFaceState, MAX_COLOR_ATTACHMENTS, MAX_VERTEX_ATTRIBS, MAX_VERTEX_BINDINGS,
};
use crate::translate::{self, PrimitiveTopologyTranslation};
use crate::types::PrimitiveMode;

/// State set with per-draw commands instead of being baked into the pipeline.
pub static DYNAMIC_STATES: [vk::DynamicState; 9] = [
    vk::DynamicState::VIEWPORT,
    vk::DynamicState::SCISSOR,
    vk::DynamicState::LINE_WIDTH,
    vk::DynamicState::DEPTH_BIAS,
    vk::DynamicState::BLEND_CONSTANTS,
    vk::DynamicState::DEPTH_BOUNDS,
    vk::DynamicState::STENCIL_COMPARE_MASK,
    vk::DynamicState::STENCIL_WRITE_MASK,
    vk::DynamicState::STENCIL_REFERENCE,
];

#[derive(Clone, Debug)]
pub struct PipelineDescription {
    bindings: [vk::VertexInputBindingDescription; MAX_VERTEX_BINDINGS],
    binding_count: usize,
    attributes: [vk::VertexInputAttributeDescription; MAX_VERTEX_ATTRIBS],
    attribute_count: usize,
    /// `(binding, divisor)` for instanced bindings stepping slower than once per instance.
    /// Needs `VK_EXT_vertex_attribute_divisor`, which the caller chains in.
    pub instance_divisors: Vec<(u32, u32)>,

    pub topology: PrimitiveTopologyTranslation,
    pub primitive_restart: bool,
    pub patch_control_points: Option<u32>,

    pub rasterizer_discard: bool,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub depth_clamp: bool,
    pub depth_bias: bool,

    pub samples: vk::SampleCountFlags,
    pub sample_shading: bool,
    pub min_sample_shading: f32,
    sample_mask: [vk::SampleMask; 1],
    pub alpha_to_coverage: bool,
    pub alpha_to_one: bool,

    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare: vk::CompareOp,
    pub depth_bounds_test: bool,
    pub stencil_test: bool,
    pub stencil_front: vk::StencilOpState,
    pub stencil_back: vk::StencilOpState,

    blend_attachments: [vk::PipelineColorBlendAttachmentState; MAX_COLOR_ATTACHMENTS],
    pub logic_op: Option<vk::LogicOp>,
    pub blend_constants: [f32; 4],

    pub viewport_count: u32,
}

fn stencil_op_state(face: &StencilFaceState) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: translate::stencil_op(face.fail),
        pass_op: translate::stencil_op(face.pass),
        depth_fail_op: translate::stencil_op(face.depth_fail),
        compare_op: translate::compare_op(face.func),
        compare_mask: face.compare_mask,
        write_mask: face.write_mask,
        reference: face.reference,
    }
}

impl PipelineDescription {
    pub fn capture(state: &GlState) -> Self {
        let layout = state.vertex_layout();
        let mut attributes = [vk::VertexInputAttributeDescription::default(); MAX_VERTEX_ATTRIBS];
        let mut attribute_count = 0;
        let mut used = [false; MAX_VERTEX_BINDINGS];
        for (location, attribute) in layout.attributes.iter().enumerate() {
            if !attribute.enabled {
                continue;
            }
            let Some(format) = translate::vertex_format(attribute.ty, attribute.size, attribute.kind)
            else {
                debug!(location, ?attribute, "no vertex format for attribute");
                continue;
            };
            attributes[attribute_count] = vk::VertexInputAttributeDescription {
                location: location as u32,
                binding: attribute.binding,
                format,
                offset: attribute.relative_offset,
            };
            attribute_count += 1;
            used[attribute.binding as usize] = true;
        }

        let mut bindings = [vk::VertexInputBindingDescription::default(); MAX_VERTEX_BINDINGS];
        let mut binding_count = 0;
        let mut instance_divisors = Vec::new();
        for (index, binding) in layout.bindings.iter().enumerate() {
            if !used[index] {
                continue;
            }
            bindings[binding_count] = vk::VertexInputBindingDescription {
                binding: index as u32,
                stride: binding.stride,
                input_rate: if binding.divisor == 0 {
                    vk::VertexInputRate::VERTEX
                } else {
                    vk::VertexInputRate::INSTANCE
                },
            };
            binding_count += 1;
            if binding.divisor > 1 {
                instance_divisors.push((index as u32, binding.divisor));
            }
        }

        let ia = state.input_assembly();
        let raster = state.raster();
        let ms = state.multisample();
        let depth = state.depth();
        let stencil = state.stencil();
        let blend = state.blend();

        let mut blend_attachments =
            [vk::PipelineColorBlendAttachmentState::default(); MAX_COLOR_ATTACHMENTS];
        for (out, a) in blend_attachments.iter_mut().zip(&blend.attachments) {
            *out = vk::PipelineColorBlendAttachmentState::default()
                .blend_enable(a.enabled)
                .src_color_blend_factor(translate::blend_factor(a.src_color))
                .dst_color_blend_factor(translate::blend_factor(a.dst_color))
                .color_blend_op(translate::blend_op(a.color_op))
                .src_alpha_blend_factor(translate::blend_factor(a.src_alpha))
                .dst_alpha_blend_factor(translate::blend_factor(a.dst_alpha))
                .alpha_blend_op(translate::blend_op(a.alpha_op))
                .color_write_mask(translate::color_write_mask(a.write_mask));
        }

        Self {
            bindings,
            binding_count,
            attributes,
            attribute_count,
            instance_divisors,
            topology: translate::primitive_topology(ia.mode),
            primitive_restart: ia.restart_enabled(),
            patch_control_points: (ia.mode == PrimitiveMode::Patches)
                .then_some(ia.patch_control_points),
            rasterizer_discard: raster.rasterizer_discard,
            polygon_mode: translate::polygon_mode(raster.polygon_mode),
            cull_mode: translate::cull_mode(raster.cull_enabled, raster.cull_face),
            front_face: translate::front_face(raster.front_face),
            depth_clamp: raster.depth_clamp,
            depth_bias: raster.depth_bias_enabled(),
            samples: translate::sample_count(ms.samples).unwrap_or(vk::SampleCountFlags::TYPE_1),
            sample_shading: ms.sample_shading,
            min_sample_shading: ms.min_sample_shading,
            sample_mask: [ms.effective_sample_mask()],
            alpha_to_coverage: ms.alpha_to_coverage,
            alpha_to_one: ms.alpha_to_one,
            depth_test: depth.test_enabled,
            depth_write: depth.write_enabled,
            depth_compare: translate::compare_op(depth.func),
            depth_bounds_test: depth.bounds_test_enabled,
            stencil_test: stencil.enabled,
            stencil_front: stencil_op_state(&stencil.front),
            stencil_back: stencil_op_state(&stencil.back),
            blend_attachments,
            logic_op: blend
                .logic_op_enabled
                .then(|| translate::logic_op(blend.logic_op)),
            blend_constants: blend.constants,
            viewport_count: state.viewport_count(),
        }
    }

    pub fn vertex_bindings(&self) -> &[vk::VertexInputBindingDescription] {
        &self.bindings[..self.binding_count]
    }

    pub fn vertex_attributes(&self) -> &[vk::VertexInputAttributeDescription] {
        &self.attributes[..self.attribute_count]
    }

    pub fn blend_attachments(&self) -> &[vk::PipelineColorBlendAttachmentState] {
        &self.blend_attachments
    }

    pub fn vertex_input_state(&self) -> vk::PipelineVertexInputStateCreateInfo<'_> {
        vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(self.vertex_bindings())
            .vertex_attribute_descriptions(self.vertex_attributes())
    }

    pub fn input_assembly_state(&self) -> vk::PipelineInputAssemblyStateCreateInfo<'static> {
        vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(self.topology.topology)
            .primitive_restart_enable(self.primitive_restart)
    }

    /// `None` unless the topology is a patch list.
    pub fn tessellation_state(&self) -> Option<vk::PipelineTessellationStateCreateInfo<'static>> {
        self.patch_control_points.map(|points| {
            vk::PipelineTessellationStateCreateInfo::default().patch_control_points(points)
        })
    }

    /// Depth-bias factors and line width are dynamic; the values here are placeholders.
    pub fn rasterization_state(&self) -> vk::PipelineRasterizationStateCreateInfo<'static> {
        vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(self.depth_clamp)
            .rasterizer_discard_enable(self.rasterizer_discard)
            .polygon_mode(self.polygon_mode)
            .cull_mode(self.cull_mode)
            .front_face(self.front_face)
            .depth_bias_enable(self.depth_bias)
            .line_width(1.0)
    }

    pub fn multisample_state(&self) -> vk::PipelineMultisampleStateCreateInfo<'_> {
        vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(self.samples)
            .sample_shading_enable(self.sample_shading)
            .min_sample_shading(self.min_sample_shading)
            .sample_mask(&self.sample_mask)
            .alpha_to_coverage_enable(self.alpha_to_coverage)
            .alpha_to_one_enable(self.alpha_to_one)
    }

    pub fn depth_stencil_state(&self) -> vk::PipelineDepthStencilStateCreateInfo<'static> {
        vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(self.depth_test)
            .depth_write_enable(self.depth_write)
            .depth_compare_op(self.depth_compare)
            .depth_bounds_test_enable(self.depth_bounds_test)
            .stencil_test_enable(self.stencil_test)
            .front(self.stencil_front)
            .back(self.stencil_back)
            .min_depth_bounds(0.0)
            .max_depth_bounds(1.0)
    }

    /// Blend state for a render target with `color_attachments` color attachments.
    pub fn color_blend_state(
        &self,
        color_attachments: usize,
    ) -> vk::PipelineColorBlendStateCreateInfo<'_> {
        let count = color_attachments.min(MAX_COLOR_ATTACHMENTS);
        vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(self.logic_op.is_some())
            .logic_op(self.logic_op.unwrap_or(vk::LogicOp::COPY))
            .attachments(&self.blend_attachments[..count])
            .blend_constants(self.blend_constants)
    }

    /// Counts only; viewports and scissors are dynamic.
    pub fn viewport_state(&self) -> vk::PipelineViewportStateCreateInfo<'static> {
        vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(self.viewport_count)
            .scissor_count(self.viewport_count)
    }

    pub fn dynamic_state(&self) -> vk::PipelineDynamicStateCreateInfo<'static> {
        vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&DYNAMIC_STATES)
    }
}
