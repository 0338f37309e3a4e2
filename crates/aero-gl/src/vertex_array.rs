//! Vertex array objects as copy-on-bind snapshots.
//!
//! The live vertex layout sits in [`GlState`]; a vertex array object only stores a snapshot of
//! it. Binding a different object saves the live layout into the outgoing object's record and
//! loads the incoming one.

use tracing::debug;

use crate::dirty::StateMask;
use crate::handle::Handle;
use crate::state::{
    GlState, VertexAttribute, VertexBinding, MAX_VERTEX_ATTRIBS, MAX_VERTEX_BINDINGS,
};

/// Everything a vertex array object captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexLayoutSnapshot {
    pub attributes: [VertexAttribute; MAX_VERTEX_ATTRIBS],
    pub bindings: [VertexBinding; MAX_VERTEX_BINDINGS],
    pub element_buffer: Handle,
}

impl Default for VertexLayoutSnapshot {
    fn default() -> Self {
        Self {
            attributes: std::array::from_fn(|i| VertexAttribute::new(i as u32)),
            bindings: [VertexBinding::default(); MAX_VERTEX_BINDINGS],
            element_buffer: Handle::NONE,
        }
    }
}

impl VertexLayoutSnapshot {
    /// Forget `buffer` wherever the snapshot names it.
    pub(crate) fn detach_buffer(&mut self, buffer: Handle) {
        for binding in &mut self.bindings {
            if binding.buffer == buffer {
                binding.buffer = Handle::NONE;
            }
        }
        if self.element_buffer == buffer {
            self.element_buffer = Handle::NONE;
        }
    }
}

pub fn capture(state: &GlState) -> VertexLayoutSnapshot {
    state.vertex
}

/// Replace the live vertex layout with `snapshot` and mark the whole layout dirty, even when
/// the two are equal.
pub fn restore(state: &mut GlState, snapshot: &VertexLayoutSnapshot) {
    state.vertex = *snapshot;
    state.mark(
        StateMask::VERTEX_INPUT
            | StateMask::VERTEX_BINDINGS
            | StateMask::ELEMENT_BUFFER
            | StateMask::VERTEX_ARRAY_OBJECT,
    );
}

impl GlState {
    /// `glBindVertexArray`. Rebinding the current object is a no-op and an unknown handle is
    /// ignored. Any actual switch goes through [`restore`], so it marks the whole vertex layout.
    pub fn bind_vertex_array(&mut self, vertex_array: Handle) {
        if vertex_array == self.vertex_array {
            return;
        }
        let incoming = if vertex_array.is_none() {
            VertexLayoutSnapshot::default()
        } else {
            match self.objects.vertex_arrays.get(vertex_array) {
                Some(snapshot) => *snapshot,
                None => {
                    debug!(?vertex_array, "ignoring bind of unknown vertex array");
                    return;
                }
            }
        };

        let outgoing = capture(self);
        if let Some(record) = self.objects.vertex_arrays.get_mut(self.vertex_array) {
            *record = outgoing;
        }
        restore(self, &incoming);
        debug!(from = ?self.vertex_array, to = ?vertex_array, "switched vertex array");
        self.vertex_array = vertex_array;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gl;
    use crate::translate::AttribKind;
    use crate::types::VertexType;

    #[test]
    fn default_snapshot_routes_attributes_to_matching_bindings() {
        let snapshot = VertexLayoutSnapshot::default();
        for (i, attribute) in snapshot.attributes.iter().enumerate() {
            assert_eq!(attribute.binding, i as u32);
            assert!(!attribute.enabled);
        }
    }

    #[test]
    fn switch_saves_and_restores() {
        let mut state = GlState::default();
        let a = state.create_vertex_array();
        let b = state.create_vertex_array();

        state.bind_vertex_array(a);
        state.vertex_attrib_format(0, 2, gl::SHORT, AttribKind::Normalized, 4);
        state.bind_vertex_array(b);
        assert_eq!(state.vertex_attribute(0).unwrap().ty, VertexType::Float);

        state.bind_vertex_array(a);
        let attribute = state.vertex_attribute(0).unwrap();
        assert_eq!(attribute.ty, VertexType::Short);
        assert_eq!(attribute.relative_offset, 4);
    }

    #[test]
    fn rebinding_current_is_clean_and_unknown_is_ignored() {
        let mut state = GlState::default();
        let a = state.create_vertex_array();
        state.bind_vertex_array(a);
        state.tracker().clear(StateMask::all());

        state.bind_vertex_array(a);
        state.bind_vertex_array(Handle::from_raw(999));
        assert_eq!(state.dirty(), StateMask::empty());
        assert_eq!(state.bound_vertex_array(), a);
    }

    #[test]
    fn switch_marks_layout_categories() {
        let mut state = GlState::default();
        let a = state.create_vertex_array();
        state.tracker().clear(StateMask::all());
        state.bind_vertex_array(a);
        assert_eq!(
            state.dirty(),
            StateMask::VERTEX_INPUT
                | StateMask::VERTEX_BINDINGS
                | StateMask::ELEMENT_BUFFER
                | StateMask::VERTEX_ARRAY_OBJECT
        );
    }

    #[test]
    fn deleting_bound_array_falls_back_to_default() {
        let mut state = GlState::default();
        let a = state.create_vertex_array();
        state.bind_vertex_array(a);
        state.enable_vertex_attrib_array(3);
        state.delete_vertex_array(a);

        assert_eq!(state.bound_vertex_array(), Handle::NONE);
        assert!(!state.vertex_attribute(3).unwrap().enabled);
        assert!(state.vertex_array(a).is_none());
    }

    #[test]
    fn element_buffer_belongs_to_the_array() {
        let mut state = GlState::default();
        let a = state.create_vertex_array();
        let ibo = state.create_buffer();
        state.bind_vertex_array(a);
        state.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
        state.bind_vertex_array(Handle::NONE);
        assert_eq!(state.element_buffer(), Handle::NONE);
        state.bind_vertex_array(a);
        assert_eq!(state.element_buffer(), ibo);
    }
}
