use tracing::debug;

use super::{
    BufferRecord, FramebufferRecord, GlState, ProgramRecord, SamplerRecord, ShaderRecord,
    TextureRecord,
};
use crate::deferred::ResourceDestroyer;
use crate::dirty::StateMask;
use crate::handle::{Handle, HandleAllocator, ResourceKind};
use crate::handle_table::HandleTable;
use crate::types::{QueryTarget, ShaderStage};
use crate::vertex_array::VertexLayoutSnapshot;

/// A handle table plus the allocator that names its entries.
#[derive(Debug)]
pub struct Registry<V> {
    table: HandleTable<V>,
    ids: HandleAllocator,
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self {
            table: HandleTable::new(),
            ids: HandleAllocator::new(),
        }
    }

    pub fn create(&mut self, record: V) -> Handle {
        let handle = self.ids.alloc();
        self.table.put(handle, record);
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&V> {
        self.table.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut V> {
        self.table.get_mut(handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.table.contains(handle)
    }

    /// `true` for [`Handle::NONE`] and for live handles: the values a bind call accepts.
    pub fn is_bindable(&self, handle: Handle) -> bool {
        handle.is_none() || self.table.contains(handle)
    }

    pub fn remove(&mut self, handle: Handle) -> Option<V> {
        self.table.remove(handle)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &V)> {
        self.table.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.table.values_mut()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryRecord {
    /// Fixed by the first `begin_query`.
    pub target: Option<QueryTarget>,
    pub active: bool,
}

impl GlState {
    pub fn create_texture(&mut self) -> Handle {
        let handle = self.objects.textures.create(TextureRecord::default());
        debug!(?handle, "created texture");
        handle
    }

    pub fn create_buffer(&mut self) -> Handle {
        let handle = self.objects.buffers.create(BufferRecord::default());
        debug!(?handle, "created buffer");
        handle
    }

    /// Returns [`Handle::NONE`] for an unknown stage.
    pub fn create_shader(&mut self, stage: u32) -> Handle {
        let Some(stage) = ShaderStage::from_gl(stage) else {
            debug!(stage, "unknown shader stage");
            return Handle::NONE;
        };
        let handle = self.objects.shaders.create(ShaderRecord::new(stage));
        debug!(?handle, ?stage, "created shader");
        handle
    }

    pub fn create_program(&mut self) -> Handle {
        let handle = self.objects.programs.create(ProgramRecord::default());
        debug!(?handle, "created program");
        handle
    }

    pub fn create_sampler(&mut self) -> Handle {
        let handle = self.objects.samplers.create(SamplerRecord::default());
        debug!(?handle, "created sampler");
        handle
    }

    pub fn create_framebuffer(&mut self) -> Handle {
        let handle = self.objects.framebuffers.create(FramebufferRecord::default());
        debug!(?handle, "created framebuffer");
        handle
    }

    pub fn create_vertex_array(&mut self) -> Handle {
        let handle = self
            .objects
            .vertex_arrays
            .create(VertexLayoutSnapshot::default());
        debug!(?handle, "created vertex array");
        handle
    }

    pub fn create_query(&mut self) -> Handle {
        let handle = self.objects.queries.create(QueryRecord::default());
        debug!(?handle, "created query");
        handle
    }

    pub fn texture(&self, handle: Handle) -> Option<&TextureRecord> {
        self.objects.textures.get(handle)
    }

    pub fn buffer(&self, handle: Handle) -> Option<&BufferRecord> {
        self.objects.buffers.get(handle)
    }

    pub fn shader(&self, handle: Handle) -> Option<&ShaderRecord> {
        self.objects.shaders.get(handle)
    }

    pub fn program(&self, handle: Handle) -> Option<&ProgramRecord> {
        self.objects.programs.get(handle)
    }

    pub fn sampler(&self, handle: Handle) -> Option<&SamplerRecord> {
        self.objects.samplers.get(handle)
    }

    pub fn framebuffer(&self, handle: Handle) -> Option<&FramebufferRecord> {
        self.objects.framebuffers.get(handle)
    }

    pub fn vertex_array(&self, handle: Handle) -> Option<&VertexLayoutSnapshot> {
        self.objects.vertex_arrays.get(handle)
    }

    pub fn query(&self, handle: Handle) -> Option<&QueryRecord> {
        self.objects.queries.get(handle)
    }

    /// Unbind `texture` from every unit and framebuffer attachment, then retire it.
    pub fn delete_texture(&mut self, texture: Handle) {
        if !self.objects.textures.contains(texture) {
            return;
        }

        let mut mask = StateMask::empty();
        for unit in &mut self.texture_units {
            for bound in &mut unit.textures {
                if *bound == texture {
                    *bound = Handle::NONE;
                    mask |= StateMask::TEXTURE_BINDINGS;
                }
            }
        }
        for framebuffer in self.objects.framebuffers.values_mut() {
            framebuffer.detach_texture(texture);
        }
        self.mark(mask);

        self.objects.textures.remove(texture);
        self.deletions.retire(ResourceKind::Texture, texture);
        debug!(handle = ?texture, touched = ?mask, "deleted texture");
    }

    /// Unbind `buffer` from every generic target, indexed slot, vertex binding and element
    /// buffer (live and stored in vertex arrays), then retire it.
    pub fn delete_buffer(&mut self, buffer: Handle) {
        if !self.objects.buffers.contains(buffer) {
            return;
        }

        let mut mask = self.buffers.detach(buffer);
        for binding in &mut self.vertex.bindings {
            if binding.buffer == buffer {
                binding.buffer = Handle::NONE;
                mask |= StateMask::VERTEX_BINDINGS;
            }
        }
        if self.vertex.element_buffer == buffer {
            self.vertex.element_buffer = Handle::NONE;
            mask |= StateMask::ELEMENT_BUFFER;
        }
        // Stored layouts are detached silently; they are not live state.
        for layout in self.objects.vertex_arrays.values_mut() {
            layout.detach_buffer(buffer);
        }
        self.mark(mask);

        self.objects.buffers.remove(buffer);
        self.deletions.retire(ResourceKind::Buffer, buffer);
        debug!(handle = ?buffer, touched = ?mask, "deleted buffer");
    }

    pub fn delete_shader(&mut self, shader: Handle) {
        if self.objects.shaders.remove(shader).is_none() {
            return;
        }
        for program in self.objects.programs.values_mut() {
            program.detach(shader);
        }
        self.deletions.retire(ResourceKind::Shader, shader);
        debug!(handle = ?shader, "deleted shader");
    }

    pub fn delete_program(&mut self, program: Handle) {
        if !self.objects.programs.contains(program) {
            return;
        }
        if self.program == program {
            self.program = Handle::NONE;
            self.mark(StateMask::PROGRAM);
        }
        self.objects.programs.remove(program);
        self.deletions.retire(ResourceKind::Program, program);
        debug!(handle = ?program, "deleted program");
    }

    pub fn delete_sampler(&mut self, sampler: Handle) {
        if !self.objects.samplers.contains(sampler) {
            return;
        }
        let mut mask = StateMask::empty();
        for unit in &mut self.texture_units {
            if unit.sampler == sampler {
                unit.sampler = Handle::NONE;
                mask |= StateMask::TEXTURE_BINDINGS;
            }
        }
        self.mark(mask);
        self.objects.samplers.remove(sampler);
        self.deletions.retire(ResourceKind::Sampler, sampler);
        debug!(handle = ?sampler, "deleted sampler");
    }

    pub fn delete_framebuffer(&mut self, framebuffer: Handle) {
        if !self.objects.framebuffers.contains(framebuffer) {
            return;
        }
        if self.draw_framebuffer == framebuffer {
            self.draw_framebuffer = Handle::NONE;
        }
        if self.read_framebuffer == framebuffer {
            self.read_framebuffer = Handle::NONE;
        }
        self.objects.framebuffers.remove(framebuffer);
        self.deletions.retire(ResourceKind::Framebuffer, framebuffer);
        debug!(handle = ?framebuffer, "deleted framebuffer");
    }

    /// Deleting the bound vertex array first binds 0, which resets the live layout.
    pub fn delete_vertex_array(&mut self, vertex_array: Handle) {
        if !self.objects.vertex_arrays.contains(vertex_array) {
            return;
        }
        if self.vertex_array == vertex_array {
            self.bind_vertex_array(Handle::NONE);
        }
        self.objects.vertex_arrays.remove(vertex_array);
        self.deletions.retire(ResourceKind::VertexArray, vertex_array);
        debug!(handle = ?vertex_array, "deleted vertex array");
    }

    pub fn delete_query(&mut self, query: Handle) {
        if !self.objects.queries.contains(query) {
            return;
        }
        for active in &mut self.active_queries {
            if *active == query {
                *active = Handle::NONE;
            }
        }
        self.objects.queries.remove(query);
        self.deletions.retire(ResourceKind::Query, query);
        debug!(handle = ?query, "deleted query");
    }

    /// Start `query` on `target`. Ignored if the target already has an active query or the
    /// query was first used with a different target.
    pub fn begin_query(&mut self, target: u32, query: Handle) {
        let Some(target) = QueryTarget::from_gl(target) else {
            return;
        };
        if self.active_queries[target.slot()].is_some() {
            return;
        }
        let Some(record) = self.objects.queries.get_mut(query) else {
            return;
        };
        if record.target.is_some_and(|t| t != target) {
            return;
        }
        record.target = Some(target);
        record.active = true;
        self.active_queries[target.slot()] = query;
    }

    pub fn end_query(&mut self, target: u32) {
        let Some(target) = QueryTarget::from_gl(target) else {
            return;
        };
        let query = std::mem::replace(&mut self.active_queries[target.slot()], Handle::NONE);
        if let Some(record) = self.objects.queries.get_mut(query) {
            record.active = false;
        }
    }

    pub fn active_query(&self, target: u32) -> Handle {
        QueryTarget::from_gl(target).map_or(Handle::NONE, |t| self.active_queries[t.slot()])
    }

    /// Advance the frame counter and destroy objects whose deletion delay has elapsed.
    pub fn end_frame(&mut self, destroyer: &mut dyn ResourceDestroyer) -> usize {
        self.deletions.advance_frame(destroyer)
    }

    /// Destroy every pending deletion after waiting for the device to go idle.
    pub fn flush_deletions(&mut self, destroyer: &mut dyn ResourceDestroyer) -> usize {
        self.deletions.flush(destroyer)
    }
}
