//! Draw-time synchronization: turning dirty categories into explicit-API commands.
//!
//! Each entry point atomically clears the bits it owns, emits commands for the ones that were
//! set, and returns them. None of them touches bits owned by another entry point, so callers
//! may run any subset in any combination. [`GlState::sync_before_draw`] runs all of them in the
//! fixed order vertex buffers, index buffer, descriptor sets, push constants, dynamic state.

mod ash_sink;

pub use ash_sink::{AshCommandSink, HandleResolver};

use ash::vk;
use tracing::{debug, trace};

use crate::dirty::StateMask;
use crate::handle::Handle;
use crate::state::{
    FramebufferStatus, GlState, ScissorRect, StencilFaceState, Viewport, MAX_DESCRIPTOR_SETS,
    MAX_VERTEX_BINDINGS, MAX_VIEWPORTS,
};
use crate::translate;
use crate::types::IndexType;
use crate::validation::ValidationError;

/// Receiver of synchronization commands, usually a command buffer being recorded.
///
/// Resource arguments are legacy handles; mapping them to API objects is the sink's job.
pub trait CommandSink {
    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[Handle], offsets: &[u64]);
    fn bind_index_buffer(&mut self, buffer: Handle, offset: u64, index_type: vk::IndexType);
    fn bind_descriptor_sets(
        &mut self,
        layout: Handle,
        first_set: u32,
        sets: &[Handle],
        dynamic_offsets: &[u32],
    );
    fn push_constants(
        &mut self,
        layout: Handle,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    );
    fn set_viewports(&mut self, first: u32, viewports: &[vk::Viewport]);
    fn set_scissors(&mut self, first: u32, scissors: &[vk::Rect2D]);
    fn set_line_width(&mut self, width: f32);
    fn set_depth_bias(&mut self, constant: f32, clamp: f32, slope: f32);
    fn set_blend_constants(&mut self, constants: [f32; 4]);
    fn set_depth_bounds(&mut self, min: f32, max: f32);
    fn set_stencil_compare_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32);
    fn set_stencil_write_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32);
    fn set_stencil_reference(&mut self, faces: vk::StencilFaceFlags, reference: u32);
}

/// An owned copy of one [`CommandSink`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCommand {
    BindVertexBuffers {
        first_binding: u32,
        buffers: Vec<Handle>,
        offsets: Vec<u64>,
    },
    BindIndexBuffer {
        buffer: Handle,
        offset: u64,
        index_type: vk::IndexType,
    },
    BindDescriptorSets {
        layout: Handle,
        first_set: u32,
        sets: Vec<Handle>,
        dynamic_offsets: Vec<u32>,
    },
    PushConstants {
        layout: Handle,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: Vec<u8>,
    },
    SetViewports {
        first: u32,
        viewports: Vec<Viewport>,
    },
    SetScissors {
        first: u32,
        scissors: Vec<ScissorRect>,
    },
    SetLineWidth(f32),
    SetDepthBias {
        constant: f32,
        clamp: f32,
        slope: f32,
    },
    SetBlendConstants([f32; 4]),
    SetDepthBounds {
        min: f32,
        max: f32,
    },
    SetStencilCompareMask {
        faces: vk::StencilFaceFlags,
        mask: u32,
    },
    SetStencilWriteMask {
        faces: vk::StencilFaceFlags,
        mask: u32,
    },
    SetStencilReference {
        faces: vk::StencilFaceFlags,
        reference: u32,
    },
}

/// A [`CommandSink`] that keeps every call, for replay and tests.
#[derive(Clone, Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<RecordedCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<RecordedCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandSink for CommandRecorder {
    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[Handle], offsets: &[u64]) {
        self.commands.push(RecordedCommand::BindVertexBuffers {
            first_binding,
            buffers: buffers.to_vec(),
            offsets: offsets.to_vec(),
        });
    }

    fn bind_index_buffer(&mut self, buffer: Handle, offset: u64, index_type: vk::IndexType) {
        self.commands.push(RecordedCommand::BindIndexBuffer {
            buffer,
            offset,
            index_type,
        });
    }

    fn bind_descriptor_sets(
        &mut self,
        layout: Handle,
        first_set: u32,
        sets: &[Handle],
        dynamic_offsets: &[u32],
    ) {
        self.commands.push(RecordedCommand::BindDescriptorSets {
            layout,
            first_set,
            sets: sets.to_vec(),
            dynamic_offsets: dynamic_offsets.to_vec(),
        });
    }

    fn push_constants(
        &mut self,
        layout: Handle,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        self.commands.push(RecordedCommand::PushConstants {
            layout,
            stages,
            offset,
            data: data.to_vec(),
        });
    }

    fn set_viewports(&mut self, first: u32, viewports: &[vk::Viewport]) {
        self.commands.push(RecordedCommand::SetViewports {
            first,
            viewports: viewports.iter().copied().map(Viewport::from).collect(),
        });
    }

    fn set_scissors(&mut self, first: u32, scissors: &[vk::Rect2D]) {
        self.commands.push(RecordedCommand::SetScissors {
            first,
            scissors: scissors.iter().copied().map(ScissorRect::from).collect(),
        });
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(RecordedCommand::SetLineWidth(width));
    }

    fn set_depth_bias(&mut self, constant: f32, clamp: f32, slope: f32) {
        self.commands.push(RecordedCommand::SetDepthBias {
            constant,
            clamp,
            slope,
        });
    }

    fn set_blend_constants(&mut self, constants: [f32; 4]) {
        self.commands.push(RecordedCommand::SetBlendConstants(constants));
    }

    fn set_depth_bounds(&mut self, min: f32, max: f32) {
        self.commands.push(RecordedCommand::SetDepthBounds { min, max });
    }

    fn set_stencil_compare_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32) {
        self.commands
            .push(RecordedCommand::SetStencilCompareMask { faces, mask });
    }

    fn set_stencil_write_mask(&mut self, faces: vk::StencilFaceFlags, mask: u32) {
        self.commands
            .push(RecordedCommand::SetStencilWriteMask { faces, mask });
    }

    fn set_stencil_reference(&mut self, faces: vk::StencilFaceFlags, reference: u32) {
        self.commands
            .push(RecordedCommand::SetStencilReference { faces, reference });
    }
}

/// Emit `emit` once for both faces when they agree, otherwise once per face.
fn per_face(
    front: &StencilFaceState,
    back: &StencilFaceState,
    field: impl Fn(&StencilFaceState) -> u32,
    mut emit: impl FnMut(vk::StencilFaceFlags, u32),
) {
    let (f, b) = (field(front), field(back));
    if f == b {
        emit(vk::StencilFaceFlags::FRONT_AND_BACK, f);
    } else {
        emit(vk::StencilFaceFlags::FRONT, f);
        emit(vk::StencilFaceFlags::BACK, b);
    }
}

impl GlState {
    /// Bind every vertex buffer slot that holds a buffer, one call per contiguous run.
    pub fn sync_vertex_buffers(&mut self, sink: &mut dyn CommandSink) -> StateMask {
        let consumed = self.tracker.clear(StateMask::VERTEX_BINDINGS);
        if consumed.is_empty() {
            return consumed;
        }

        let bindings = &self.vertex.bindings;
        let mut start = 0;
        while start < bindings.len() {
            if bindings[start].buffer.is_none() {
                start += 1;
                continue;
            }
            let end = bindings[start..]
                .iter()
                .position(|b| b.buffer.is_none())
                .map_or(bindings.len(), |n| start + n);

            let mut buffers = [Handle::NONE; MAX_VERTEX_BINDINGS];
            let mut offsets = [0u64; MAX_VERTEX_BINDINGS];
            for (i, binding) in bindings[start..end].iter().enumerate() {
                buffers[i] = binding.buffer;
                offsets[i] = binding.offset;
            }
            let count = end - start;
            trace!(first = start, count, "bind vertex buffers");
            sink.bind_vertex_buffers(start as u32, &buffers[..count], &offsets[..count]);
            start = end;
        }
        consumed
    }

    /// Bind the element buffer for a draw using `index_type`. Re-emits when the index type
    /// differs from the last bind even if the buffer did not change.
    pub fn sync_index_buffer(&mut self, sink: &mut dyn CommandSink, index_type: u32) -> StateMask {
        let Some(index_type) = IndexType::from_gl(index_type) else {
            debug!(index_type, "unknown index type");
            return StateMask::empty();
        };
        let type_changed = self.last_index_type != Some(index_type);
        let consumed = self.tracker.clear(StateMask::ELEMENT_BUFFER);
        if consumed.is_empty() && !type_changed {
            return consumed;
        }

        let buffer = self.vertex.element_buffer;
        if buffer.is_none() {
            self.last_index_type = None;
            return consumed;
        }
        let translated = translate::index_type(index_type);
        trace!(?buffer, ?index_type, "bind index buffer");
        sink.bind_index_buffer(buffer, 0, translated.index_type);
        self.last_index_type = Some(index_type);
        consumed
    }

    /// Rebind descriptor sets if the set table changed. Texture and buffer binding bits are
    /// consumed here too; the returned mask tells the caller which descriptor contents to
    /// rewrite.
    pub fn sync_descriptor_sets(&mut self, sink: &mut dyn CommandSink) -> StateMask {
        let consumed = self.tracker.clear(StateMask::DESCRIPTOR_SETS);
        if !consumed.contains(StateMask::DESCRIPTORS) {
            return consumed;
        }
        let layout = self.descriptors.layout;
        if layout.is_none() {
            debug!("descriptor sets dirty with no pipeline layout bound");
            return consumed;
        }

        let sets = &self.descriptors.sets;
        let mut start = 0;
        while start < MAX_DESCRIPTOR_SETS {
            if sets[start].set.is_none() {
                start += 1;
                continue;
            }
            let end = sets[start..]
                .iter()
                .position(|s| s.set.is_none())
                .map_or(MAX_DESCRIPTOR_SETS, |n| start + n);

            let mut handles = [Handle::NONE; MAX_DESCRIPTOR_SETS];
            let mut offsets = Vec::new();
            for (i, binding) in sets[start..end].iter().enumerate() {
                handles[i] = binding.set;
                offsets.extend_from_slice(binding.dynamic_offsets());
            }
            trace!(first = start, count = end - start, "bind descriptor sets");
            sink.bind_descriptor_sets(layout, start as u32, &handles[..end - start], &offsets);
            start = end;
        }
        consumed
    }

    /// Upload the push-constant bytes written since the last upload.
    pub fn sync_push_constants(&mut self, sink: &mut dyn CommandSink) -> StateMask {
        let consumed = self.tracker.clear(StateMask::PUSH_CONSTANTS);
        if consumed.is_empty() {
            return consumed;
        }
        let layout = self.descriptors.layout;
        let stages = self.push_constants.stages;
        if layout.is_none() || stages.is_empty() {
            return consumed;
        }
        if let Some(range) = self.push_constants.take_dirty() {
            let data = &self.push_constants.data[range.start as usize..range.end as usize];
            trace!(offset = range.start, len = data.len(), "push constants");
            sink.push_constants(layout, stages, range.start, data);
        }
        consumed
    }

    /// Emit one command per dirty dynamic category (two for stencil masks that differ per face).
    pub fn sync_dynamic_state(&mut self, sink: &mut dyn CommandSink) -> StateMask {
        let consumed = self.tracker.clear(StateMask::DYNAMIC);
        if consumed.is_empty() {
            return consumed;
        }
        let count = self.viewports.count as usize;

        if consumed.contains(StateMask::VIEWPORT) {
            let mut viewports = [vk::Viewport::default(); MAX_VIEWPORTS];
            for (out, vp) in viewports.iter_mut().zip(self.viewports.active_viewports()) {
                *out = vk::Viewport::from(*vp);
            }
            trace!(count, "set viewports");
            sink.set_viewports(0, &viewports[..count]);
        }
        if consumed.contains(StateMask::SCISSOR) {
            let mut scissors = [vk::Rect2D::default(); MAX_VIEWPORTS];
            for (out, rect) in scissors.iter_mut().zip(self.viewports.effective_scissors()) {
                *out = vk::Rect2D::from(rect);
            }
            trace!(count, "set scissors");
            sink.set_scissors(0, &scissors[..count]);
        }
        if consumed.contains(StateMask::LINE_WIDTH) {
            sink.set_line_width(self.raster.line_width);
        }
        if consumed.contains(StateMask::DEPTH_BIAS) {
            let r = &self.raster;
            sink.set_depth_bias(r.depth_bias_constant, r.depth_bias_clamp, r.depth_bias_slope);
        }
        if consumed.contains(StateMask::BLEND_CONSTANTS) {
            sink.set_blend_constants(self.blend.constants);
        }
        if consumed.contains(StateMask::DEPTH_BOUNDS) {
            sink.set_depth_bounds(self.depth.bounds_min, self.depth.bounds_max);
        }
        let (front, back) = (&self.stencil.front, &self.stencil.back);
        if consumed.contains(StateMask::STENCIL_STATE) {
            per_face(front, back, |s| s.compare_mask, |faces, mask| {
                sink.set_stencil_compare_mask(faces, mask)
            });
            per_face(front, back, |s| s.write_mask, |faces, mask| {
                sink.set_stencil_write_mask(faces, mask)
            });
        }
        if consumed.contains(StateMask::STENCIL_REFERENCE) {
            per_face(front, back, |s| s.reference, |faces, reference| {
                sink.set_stencil_reference(faces, reference)
            });
        }
        trace!(categories = ?consumed, "synced dynamic state");
        consumed
    }

    /// Everything a draw needs, in the fixed order. `index_type` is the raw GL index type of an
    /// indexed draw, or `None` for a non-indexed one. Validation, when enabled, runs first and
    /// only reports.
    pub fn sync_before_draw(
        &mut self,
        sink: &mut dyn CommandSink,
        index_type: Option<u32>,
    ) -> StateMask {
        if self.validator.enabled() {
            self.validate_draw();
        }
        let mut consumed = self.sync_vertex_buffers(sink);
        if let Some(index_type) = index_type {
            consumed |= self.sync_index_buffer(sink, index_type);
        }
        consumed |= self.sync_descriptor_sets(sink);
        consumed |= self.sync_push_constants(sink);
        consumed |= self.sync_dynamic_state(sink);
        consumed
    }

    fn validate_draw(&mut self) {
        let mut errors = Vec::new();
        match self.objects.programs.get(self.program) {
            None => errors.push(ValidationError::NoProgram),
            Some(program) if !program.linked => {
                errors.push(ValidationError::ProgramNotLinked(self.program))
            }
            Some(_) => {}
        }
        for (index, attribute) in self.vertex.attributes.iter().enumerate() {
            if !attribute.enabled {
                continue;
            }
            let bound = self
                .vertex
                .bindings
                .get(attribute.binding as usize)
                .is_some_and(|b| b.buffer.is_some());
            if !bound {
                errors.push(ValidationError::AttributeWithoutBuffer {
                    attribute: index as u32,
                    binding: attribute.binding,
                });
            }
        }
        let framebuffer = self.draw_framebuffer;
        if let Some(status) = self.framebuffer_status(framebuffer) {
            if status != FramebufferStatus::Complete {
                errors.push(ValidationError::FramebufferIncomplete {
                    framebuffer,
                    status: status.to_gl(),
                });
            }
        }
        for error in &errors {
            self.validator.report(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gl;

    fn clean_state() -> GlState {
        let state = GlState::default();
        state.tracker.clear(StateMask::all());
        state
    }

    #[test]
    fn vertex_buffers_are_grouped_in_runs() {
        let mut state = clean_state();
        let a = state.create_buffer();
        let b = state.create_buffer();
        state.bind_vertex_buffer(0, a, 0, 16);
        state.bind_vertex_buffer(1, b, 64, 16);
        state.bind_vertex_buffer(5, a, 128, 16);

        let mut sink = CommandRecorder::new();
        assert_eq!(state.sync_vertex_buffers(&mut sink), StateMask::VERTEX_BINDINGS);
        assert_eq!(
            sink.take(),
            vec![
                RecordedCommand::BindVertexBuffers {
                    first_binding: 0,
                    buffers: vec![a, b],
                    offsets: vec![0, 64],
                },
                RecordedCommand::BindVertexBuffers {
                    first_binding: 5,
                    buffers: vec![a],
                    offsets: vec![128],
                },
            ]
        );
        assert_eq!(state.sync_vertex_buffers(&mut sink), StateMask::empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn index_buffer_rebinds_on_type_change() {
        let mut state = clean_state();
        let ibo = state.create_buffer();
        state.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ibo);

        let mut sink = CommandRecorder::new();
        state.sync_index_buffer(&mut sink, gl::UNSIGNED_SHORT);
        state.sync_index_buffer(&mut sink, gl::UNSIGNED_SHORT);
        assert_eq!(sink.len(), 1);

        state.sync_index_buffer(&mut sink, gl::UNSIGNED_INT);
        assert_eq!(
            sink.take().last(),
            Some(&RecordedCommand::BindIndexBuffer {
                buffer: ibo,
                offset: 0,
                index_type: vk::IndexType::UINT32,
            })
        );
    }

    #[test]
    fn descriptor_sets_need_a_layout() {
        let mut state = clean_state();
        state.bind_descriptor_set(0, Handle::from_raw(10), &[]);
        state.bind_descriptor_set(1, Handle::from_raw(11), &[64]);

        let mut sink = CommandRecorder::new();
        assert_eq!(state.sync_descriptor_sets(&mut sink), StateMask::DESCRIPTORS);
        assert!(sink.is_empty());

        let layout = Handle::from_raw(1);
        state.bind_pipeline_layout(layout);
        state.sync_descriptor_sets(&mut sink);
        assert_eq!(
            sink.take(),
            vec![RecordedCommand::BindDescriptorSets {
                layout,
                first_set: 0,
                sets: vec![Handle::from_raw(10), Handle::from_raw(11)],
                dynamic_offsets: vec![64],
            }]
        );
    }

    #[test]
    fn texture_changes_are_consumed_without_rebinding() {
        let mut state = clean_state();
        let texture = state.create_texture();
        state.bind_texture(gl::TEXTURE_2D, texture);

        let mut sink = CommandRecorder::new();
        assert_eq!(
            state.sync_descriptor_sets(&mut sink),
            StateMask::TEXTURE_BINDINGS
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn push_constants_upload_dirty_range() {
        let mut state = clean_state();
        let layout = Handle::from_raw(2);
        state.bind_pipeline_layout(layout);
        state.push_constants(vk::ShaderStageFlags::VERTEX, 4, &[7; 4]);

        let mut sink = CommandRecorder::new();
        state.sync_push_constants(&mut sink);
        assert_eq!(
            sink.take(),
            vec![RecordedCommand::PushConstants {
                layout,
                stages: vk::ShaderStageFlags::VERTEX,
                offset: 4,
                data: vec![7; 4],
            }]
        );
        assert_eq!(state.push_constant_state().dirty_range(), None);
    }

    #[test]
    fn stencil_masks_split_per_face() {
        let mut state = clean_state();
        state.stencil_mask_separate(gl::FRONT, 0x0F);

        let mut sink = CommandRecorder::new();
        state.sync_dynamic_state(&mut sink);
        assert_eq!(
            sink.take(),
            vec![
                RecordedCommand::SetStencilCompareMask {
                    faces: vk::StencilFaceFlags::FRONT_AND_BACK,
                    mask: !0,
                },
                RecordedCommand::SetStencilWriteMask {
                    faces: vk::StencilFaceFlags::FRONT,
                    mask: 0x0F,
                },
                RecordedCommand::SetStencilWriteMask {
                    faces: vk::StencilFaceFlags::BACK,
                    mask: !0,
                },
            ]
        );
    }

    #[test]
    fn sync_leaves_pipeline_only_bits_alone() {
        let mut state = GlState::default();
        let mut sink = CommandRecorder::new();
        state.sync_before_draw(&mut sink, Some(gl::UNSIGNED_SHORT));
        let left = state.dirty();
        assert!(left.contains(StateMask::PROGRAM | StateMask::BLEND_STATE | StateMask::CLEAR_VALUES));
        assert!(!left.intersects(StateMask::DYNAMIC | StateMask::VERTEX_BINDINGS));
    }

    #[test]
    fn validation_reports_through_callback() {
        let mut state = clean_state();
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink_reports = Arc::clone(&reports);
        state.set_validation_enabled(true);
        state.set_validation_callback(Box::new(move |e| {
            sink_reports.lock().unwrap().push(e.to_string());
        }));
        state.enable_vertex_attrib_array(2);

        state.sync_before_draw(&mut CommandRecorder::new(), None);
        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[1],
            "vertex attribute 2 is enabled but binding 2 has no buffer"
        );
    }
}
