use tracing::debug;

use super::{
    index_in, replace, GlState, MAX_ATOMIC_COUNTER_BUFFER_BINDINGS, MAX_STORAGE_BUFFER_BINDINGS,
    MAX_TRANSFORM_FEEDBACK_BUFFERS, MAX_UNIFORM_BUFFER_BINDINGS,
};
use crate::dirty::StateMask;
use crate::handle::Handle;
use crate::types::BufferTarget;

/// One slot of an indexed binding table. Equality is over all three fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndexedBinding {
    pub buffer: Handle,
    pub offset: u64,
    pub size: u64,
}

impl IndexedBinding {
    /// `size` value meaning "from `offset` to the end of the buffer".
    pub const WHOLE_SIZE: u64 = u64::MAX;

    pub const UNBOUND: IndexedBinding = IndexedBinding {
        buffer: Handle::NONE,
        offset: 0,
        size: 0,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferRecord {
    pub size: u64,
    pub usage: u32,
}

/// Generic binding points plus the four indexed tables.
///
/// The element-array binding is vertex-array state and lives in the vertex layout instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferBindings {
    pub targets: [Handle; BufferTarget::COUNT],
    pub uniform: [IndexedBinding; MAX_UNIFORM_BUFFER_BINDINGS],
    pub storage: [IndexedBinding; MAX_STORAGE_BUFFER_BINDINGS],
    pub transform_feedback: [IndexedBinding; MAX_TRANSFORM_FEEDBACK_BUFFERS],
    pub atomic_counter: [IndexedBinding; MAX_ATOMIC_COUNTER_BUFFER_BINDINGS],
}

impl Default for BufferBindings {
    fn default() -> Self {
        Self {
            targets: [Handle::NONE; BufferTarget::COUNT],
            uniform: [IndexedBinding::UNBOUND; MAX_UNIFORM_BUFFER_BINDINGS],
            storage: [IndexedBinding::UNBOUND; MAX_STORAGE_BUFFER_BINDINGS],
            transform_feedback: [IndexedBinding::UNBOUND; MAX_TRANSFORM_FEEDBACK_BUFFERS],
            atomic_counter: [IndexedBinding::UNBOUND; MAX_ATOMIC_COUNTER_BUFFER_BINDINGS],
        }
    }
}

impl BufferBindings {
    /// The indexed table behind `target` and the category its slots belong to.
    ///
    /// Transform-feedback and atomic-counter buffers are written by shaders, so they are
    /// synchronized with the storage buffers.
    fn indexed_mut(&mut self, target: BufferTarget) -> Option<(&mut [IndexedBinding], StateMask)> {
        let (table, category) = match target {
            BufferTarget::Uniform => (
                self.uniform.as_mut_slice(),
                StateMask::UNIFORM_BUFFER_BINDINGS,
            ),
            BufferTarget::ShaderStorage => (
                self.storage.as_mut_slice(),
                StateMask::STORAGE_BUFFER_BINDINGS,
            ),
            BufferTarget::TransformFeedback => (
                self.transform_feedback.as_mut_slice(),
                StateMask::STORAGE_BUFFER_BINDINGS,
            ),
            BufferTarget::AtomicCounter => (
                self.atomic_counter.as_mut_slice(),
                StateMask::STORAGE_BUFFER_BINDINGS,
            ),
            _ => return None,
        };
        Some((table, category))
    }

    pub fn indexed(&self, target: BufferTarget) -> Option<&[IndexedBinding]> {
        match target {
            BufferTarget::Uniform => Some(self.uniform.as_slice()),
            BufferTarget::ShaderStorage => Some(self.storage.as_slice()),
            BufferTarget::TransformFeedback => Some(self.transform_feedback.as_slice()),
            BufferTarget::AtomicCounter => Some(self.atomic_counter.as_slice()),
            _ => None,
        }
    }

    /// Categories whose indexed tables currently reference `buffer`.
    pub(crate) fn references(&self, buffer: Handle) -> StateMask {
        let mut mask = StateMask::empty();
        if self.uniform.iter().any(|b| b.buffer == buffer) {
            mask |= StateMask::UNIFORM_BUFFER_BINDINGS;
        }
        if self
            .storage
            .iter()
            .chain(&self.transform_feedback)
            .chain(&self.atomic_counter)
            .any(|b| b.buffer == buffer)
        {
            mask |= StateMask::STORAGE_BUFFER_BINDINGS;
        }
        mask
    }

    /// Reset every generic target and indexed slot holding `buffer`. Returns the categories of
    /// the indexed tables that changed; generic targets carry no category.
    pub(crate) fn detach(&mut self, buffer: Handle) -> StateMask {
        for target in &mut self.targets {
            if *target == buffer {
                *target = Handle::NONE;
            }
        }
        let mask = self.references(buffer);
        for slot in self
            .uniform
            .iter_mut()
            .chain(&mut self.storage)
            .chain(&mut self.transform_feedback)
            .chain(&mut self.atomic_counter)
        {
            if slot.buffer == buffer {
                *slot = IndexedBinding::UNBOUND;
            }
        }
        mask
    }
}

impl GlState {
    /// `glBindBuffer`. Binding `GL_ELEMENT_ARRAY_BUFFER` changes the vertex layout's element
    /// buffer and marks `ElementBuffer`; every other target is a latch read by later calls and
    /// marks nothing.
    pub fn bind_buffer(&mut self, target: u32, buffer: Handle) {
        let Some(target) = BufferTarget::from_gl(target) else {
            debug!(target, "unknown buffer target");
            return;
        };
        if !self.objects.buffers.is_bindable(buffer) {
            return;
        }
        if target == BufferTarget::ElementArray {
            if replace(&mut self.vertex.element_buffer, buffer) {
                self.mark(StateMask::ELEMENT_BUFFER);
            }
            return;
        }
        self.buffers.targets[target.slot()] = buffer;
    }

    pub fn bound_buffer(&self, target: u32) -> Handle {
        match BufferTarget::from_gl(target) {
            Some(BufferTarget::ElementArray) => self.vertex.element_buffer,
            Some(target) => self.buffers.targets[target.slot()],
            None => Handle::NONE,
        }
    }

    pub fn bind_buffer_base(&mut self, target: u32, index: u32, buffer: Handle) {
        self.bind_buffer_range(target, index, buffer, 0, IndexedBinding::WHOLE_SIZE);
    }

    /// `glBindBufferRange`. Also updates the generic binding point of `target`, as the legacy
    /// API does. `size == 0` with a non-zero buffer is rejected.
    pub fn bind_buffer_range(
        &mut self,
        target: u32,
        index: u32,
        buffer: Handle,
        offset: u64,
        size: u64,
    ) {
        let Some(target) = BufferTarget::from_gl(target) else {
            return;
        };
        if !self.objects.buffers.is_bindable(buffer) || (buffer.is_some() && size == 0) {
            return;
        }
        let Some((table, category)) = self.buffers.indexed_mut(target) else {
            return;
        };
        let Some(slot) = index_in(index, table.len()) else {
            debug!(?target, index, "ignoring out-of-range indexed buffer binding");
            return;
        };
        let binding = if buffer.is_none() {
            IndexedBinding::UNBOUND
        } else {
            IndexedBinding {
                buffer,
                offset,
                size,
            }
        };
        let changed = replace(&mut table[slot], binding);
        self.buffers.targets[target.slot()] = buffer;
        if changed {
            self.mark(category);
        }
    }

    pub fn indexed_binding(&self, target: u32, index: u32) -> Option<&IndexedBinding> {
        let table = self.buffers.indexed(BufferTarget::from_gl(target)?)?;
        table.get(index as usize)
    }

    /// `glBufferData` on the buffer bound to `target`. A size or usage change reallocates the
    /// backing object, so every live binding of the buffer is marked.
    pub fn buffer_data(&mut self, target: u32, size: u64, usage: u32) {
        let buffer = self.bound_buffer(target);
        let Some(record) = self.objects.buffers.get_mut(buffer) else {
            return;
        };
        let changed = replace(&mut record.size, size) | replace(&mut record.usage, usage);
        if changed {
            let mask = self.live_buffer_references(buffer);
            self.mark(mask);
        }
    }

    /// Categories of live state that reference `buffer`.
    pub(crate) fn live_buffer_references(&self, buffer: Handle) -> StateMask {
        let mut mask = self.buffers.references(buffer);
        if self.vertex.bindings.iter().any(|b| b.buffer == buffer) {
            mask |= StateMask::VERTEX_BINDINGS;
        }
        if self.vertex.element_buffer == buffer {
            mask |= StateMask::ELEMENT_BUFFER;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl;

    fn clean_state() -> GlState {
        let state = GlState::default();
        state.tracker.clear(StateMask::all());
        state
    }

    #[test]
    fn indexed_binding_marks_its_table_only() {
        let mut state = clean_state();
        let buf = state.create_buffer();

        state.bind_buffer_range(gl::UNIFORM_BUFFER, 3, buf, 256, 64);
        assert_eq!(state.dirty(), StateMask::UNIFORM_BUFFER_BINDINGS);
        assert_eq!(
            state.indexed_binding(gl::UNIFORM_BUFFER, 3),
            Some(&IndexedBinding {
                buffer: buf,
                offset: 256,
                size: 64
            })
        );
        assert_eq!(state.bound_buffer(gl::UNIFORM_BUFFER), buf);

        state.tracker.clear(StateMask::all());
        state.bind_buffer_range(gl::UNIFORM_BUFFER, 3, buf, 256, 64);
        assert_eq!(state.dirty(), StateMask::empty());

        state.bind_buffer_base(gl::TRANSFORM_FEEDBACK_BUFFER, 0, buf);
        assert_eq!(state.dirty(), StateMask::STORAGE_BUFFER_BINDINGS);
    }

    #[test]
    fn offset_alone_is_a_change() {
        let mut state = clean_state();
        let buf = state.create_buffer();
        state.bind_buffer_range(gl::SHADER_STORAGE_BUFFER, 0, buf, 0, 16);
        state.tracker.clear(StateMask::all());
        state.bind_buffer_range(gl::SHADER_STORAGE_BUFFER, 0, buf, 16, 16);
        assert_eq!(state.dirty(), StateMask::STORAGE_BUFFER_BINDINGS);
    }

    #[test]
    fn out_of_range_and_unknown_handles_are_ignored() {
        let mut state = clean_state();
        let buf = state.create_buffer();
        state.bind_buffer_base(gl::UNIFORM_BUFFER, MAX_UNIFORM_BUFFER_BINDINGS as u32, buf);
        state.bind_buffer_base(gl::UNIFORM_BUFFER, 0, Handle::from_raw(999));
        state.bind_buffer(gl::ARRAY_BUFFER, Handle::from_raw(999));
        state.bind_buffer(0xdead, buf);
        assert_eq!(state.dirty(), StateMask::empty());
        assert_eq!(state.bound_buffer(gl::ARRAY_BUFFER), Handle::NONE);
    }

    #[test]
    fn generic_targets_do_not_mark() {
        let mut state = clean_state();
        let buf = state.create_buffer();
        state.bind_buffer(gl::ARRAY_BUFFER, buf);
        state.bind_buffer(gl::COPY_READ_BUFFER, buf);
        assert_eq!(state.dirty(), StateMask::empty());

        state.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buf);
        assert_eq!(state.dirty(), StateMask::ELEMENT_BUFFER);
    }

    #[test]
    fn reallocation_marks_live_references() {
        let mut state = clean_state();
        let buf = state.create_buffer();
        state.bind_buffer_base(gl::UNIFORM_BUFFER, 1, buf);
        state.tracker.clear(StateMask::all());

        state.buffer_data(gl::UNIFORM_BUFFER, 1024, 0x88E4);
        assert_eq!(state.dirty(), StateMask::UNIFORM_BUFFER_BINDINGS);

        state.tracker.clear(StateMask::all());
        state.buffer_data(gl::UNIFORM_BUFFER, 1024, 0x88E4);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    fn delete_scans_every_table() {
        let mut state = clean_state();
        let buf = state.create_buffer();
        state.bind_buffer(gl::ARRAY_BUFFER, buf);
        state.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buf);
        state.bind_buffer_base(gl::UNIFORM_BUFFER, 0, buf);
        state.bind_buffer_base(gl::ATOMIC_COUNTER_BUFFER, 2, buf);
        state.bind_vertex_buffer(4, buf, 0, 16);
        state.tracker.clear(StateMask::all());

        state.delete_buffer(buf);
        assert_eq!(
            state.dirty(),
            StateMask::UNIFORM_BUFFER_BINDINGS
                | StateMask::STORAGE_BUFFER_BINDINGS
                | StateMask::VERTEX_BINDINGS
                | StateMask::ELEMENT_BUFFER
        );
        assert_eq!(state.bound_buffer(gl::ARRAY_BUFFER), Handle::NONE);
        assert_eq!(state.indexed_binding(gl::UNIFORM_BUFFER, 0), Some(&IndexedBinding::UNBOUND));
        assert!(state.buffer(buf).is_none());
        assert_eq!(state.deletion_queue().len(), 1);
    }
}
