use ash::vk;
use tracing::warn;

use super::CommandSink;
use crate::handle::Handle;
use crate::state::{MAX_DESCRIPTOR_SETS, MAX_VERTEX_BINDINGS};

/// Maps legacy handles to the API objects backing them.
pub trait HandleResolver {
    fn buffer(&self, handle: Handle) -> Option<vk::Buffer>;
    fn descriptor_set(&self, handle: Handle) -> Option<vk::DescriptorSet>;
    fn pipeline_layout(&self, handle: Handle) -> Option<vk::PipelineLayout>;
}

/// Records synchronization commands straight into a command buffer.
///
/// A command naming a handle the resolver does not know is dropped with a warning.
pub struct AshCommandSink<'a, R> {
    device: &'a ash::Device,
    cmd: vk::CommandBuffer,
    bind_point: vk::PipelineBindPoint,
    resolver: &'a R,
}

impl<'a, R: HandleResolver> AshCommandSink<'a, R> {
    /// `cmd` must be in the recording state for as long as the sink is used.
    pub fn new(device: &'a ash::Device, cmd: vk::CommandBuffer, resolver: &'a R) -> Self {
        Self {
            device,
            cmd,
            bind_point: vk::PipelineBindPoint::GRAPHICS,
            resolver,
        }
    }

    pub fn with_bind_point(mut self, bind_point: vk::PipelineBindPoint) -> Self {
        self.bind_point = bind_point;
        self
    }

    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.cmd
    }

    fn layout(&self, layout: Handle) -> Option<vk::PipelineLayout> {
        let resolved = self.resolver.pipeline_layout(layout);
        if resolved.is_none() {
            warn!(?layout, "unresolved pipeline layout");
        }
        resolved
    }
}

impl<R: HandleResolver> CommandSink for AshCommandSink<'_, R> {
    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[Handle], offsets: &[u64]) {
        let mut resolved = [vk::Buffer::null(); MAX_VERTEX_BINDINGS];
        let count = buffers.len().min(MAX_VERTEX_BINDINGS);
        for (out, &handle) in resolved.iter_mut().zip(&buffers[..count]) {
            let Some(buffer) = self.resolver.buffer(handle) else {
                warn!(?handle, first_binding, "unresolved vertex buffer");
                return;
            };
            *out = buffer;
        }
        // SAFETY: the command buffer is recording (constructor contract) and every buffer
        // handle came from the resolver, which owns them.
        unsafe {
            self.device.cmd_bind_vertex_buffers(
                self.cmd,
                first_binding,
                &resolved[..count],
                &offsets[..count],
            );
        }
    }

    fn bind_index_buffer(&mut self, buffer: Handle, offset: u64, index_type: vk::IndexType) {
        let Some(resolved) = self.resolver.buffer(buffer) else {
            warn!(?buffer, "unresolved index buffer");
            return;
        };
        // SAFETY: see `bind_vertex_buffers`.
        unsafe {
            self.device
                .cmd_bind_index_buffer(self.cmd, resolved, offset, index_type);
        }
    }

    fn bind_descriptor_sets(
        &mut self,
        layout: Handle,
        first_set: u32,
        sets: &[Handle],
        dynamic_offsets: &[u32],
    ) {
        let Some(layout) = self.layout(layout) else {
            return;
        };
        let mut resolved = [vk::DescriptorSet::null(); MAX_DESCRIPTOR_SETS];
        let count = sets.len().min(MAX_DESCRIPTOR_SETS);
        for (out, &handle) in resolved.iter_mut().zip(&sets[..count]) {
            let Some(set) = self.resolver.descriptor_set(handle) else {
                warn!(?handle, first_set, "unresolved descriptor set");
                return;
            };
            *out = set;
        }
        // SAFETY: see `bind_vertex_buffers`.
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.cmd,
                self.bind_point,
                layout,
                first_set,
                &resolved[..count],
                dynamic_offsets,
            );
        }
    }

    fn push_constants(
        &mut self,
        layout: Handle,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        let Some(layout) = self.layout(layout) else {
            return;
        };
        // SAFETY: see `bind_vertex_buffers`. `offset + data.len()` stays within the 128-byte
        // push-constant block the state store maintains.
        unsafe {
            self.device
                .cmd_push_constants(self.cmd, layout, stages, offset, data);
        }
    }

    fn set_viewports(&mut self, first: u32, viewports: &[vk::Viewport]) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_viewport(self.cmd, first, viewports) }
    }

    fn set_scissors(&mut self, first: u32, scissors: &[vk::Rect2D]) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_scissor(self.cmd, first, scissors) }
    }

    fn set_line_width(&mut self, width: f32) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_line_width(self.cmd, width) }
    }

    fn set_depth_bias(&mut self, constant: f32, clamp: f32, slope: f32) {
        // SAFETY: the command buffer is recording.
        unsafe {
            self.device
                .cmd_set_depth_bias(self.cmd, constant, clamp, slope)
        }
    }

    fn set_blend_constants(&mut self, constants: [f32; 4]) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_blend_constants(self.cmd, &constants) }
    }

    fn set_depth_bounds(&mut self, min: f32, max: f32) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_depth_bounds(self.cmd, min, max) }
    }

    fn set_stencil_compare_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32) {
        // SAFETY: the command buffer is recording.
        unsafe {
            self.device
                .cmd_set_stencil_compare_mask(self.cmd, faces, mask)
        }
    }

    fn set_stencil_write_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32) {
        // SAFETY: the command buffer is recording.
        unsafe { self.device.cmd_set_stencil_write_mask(self.cmd, faces, mask) }
    }

    fn set_stencil_reference(&mut self, faces: vk::StencilFaceFlags, reference: u32) {
        // SAFETY: the command buffer is recording.
        unsafe {
            self.device
                .cmd_set_stencil_reference(self.cmd, faces, reference)
        }
    }
}
