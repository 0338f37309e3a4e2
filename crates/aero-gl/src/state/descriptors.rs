use std::ops::Range;

use ash::vk;
use bytemuck::Pod;
use tracing::debug;

use super::{
    index_in, replace, GlState, MAX_DESCRIPTOR_SETS, MAX_DYNAMIC_OFFSETS, PUSH_CONSTANT_BYTES,
};
use crate::dirty::StateMask;
use crate::handle::Handle;

/// Shadow copy of the push-constant block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushConstantState {
    pub data: [u8; PUSH_CONSTANT_BYTES],
    /// Bytes written since the last upload.
    pub(crate) dirty: Option<Range<u32>>,
    /// Every byte written since creation; re-uploaded after a layout switch.
    pub(crate) written: Option<Range<u32>>,
    pub stages: vk::ShaderStageFlags,
}

impl Default for PushConstantState {
    fn default() -> Self {
        Self {
            data: [0; PUSH_CONSTANT_BYTES],
            dirty: None,
            written: None,
            stages: vk::ShaderStageFlags::empty(),
        }
    }
}

impl PushConstantState {
    pub fn dirty_range(&self) -> Option<Range<u32>> {
        self.dirty.clone()
    }

    pub fn written_range(&self) -> Option<Range<u32>> {
        self.written.clone()
    }

    pub(crate) fn take_dirty(&mut self) -> Option<Range<u32>> {
        self.dirty.take()
    }
}

fn union(range: &mut Option<Range<u32>>, add: Range<u32>) {
    *range = Some(match range.take() {
        Some(r) => r.start.min(add.start)..r.end.max(add.end),
        None => add,
    });
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DescriptorSetBinding {
    pub set: Handle,
    pub dynamic_offsets: [u32; MAX_DYNAMIC_OFFSETS],
    pub dynamic_offset_count: u8,
}

impl DescriptorSetBinding {
    pub fn dynamic_offsets(&self) -> &[u32] {
        &self.dynamic_offsets[..self.dynamic_offset_count as usize]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DescriptorState {
    /// Pipeline layout the sets are bound against. Owned by the caller.
    pub layout: Handle,
    pub sets: [DescriptorSetBinding; MAX_DESCRIPTOR_SETS],
}

impl GlState {
    /// Write `bytes` at `offset` into the push-constant block. Writes that run past the block
    /// are ignored.
    pub fn push_constants(&mut self, stages: vk::ShaderStageFlags, offset: u32, bytes: &[u8]) {
        let Some(end) = push_constant_end(offset, bytes.len()) else {
            debug!(offset, len = bytes.len(), "ignoring out-of-range push constants");
            return;
        };
        if bytes.is_empty() {
            return;
        }

        let pc = &mut self.push_constants;
        let range = offset..end;
        let slot = &mut pc.data[offset as usize..end as usize];
        let new_stages = pc.stages | stages;
        if slot == bytes && new_stages == pc.stages {
            return;
        }
        slot.copy_from_slice(bytes);
        pc.stages = new_stages;
        union(&mut pc.dirty, range.clone());
        union(&mut pc.written, range);
        self.mark(StateMask::PUSH_CONSTANTS);
    }

    pub fn push_constants_pod<T: Pod>(
        &mut self,
        stages: vk::ShaderStageFlags,
        offset: u32,
        value: &T,
    ) {
        self.push_constants(stages, offset, bytemuck::bytes_of(value));
    }

    /// Switch the pipeline layout. Sets stay recorded but must be rebound, and every written
    /// push-constant byte is uploaded again.
    pub fn bind_pipeline_layout(&mut self, layout: Handle) {
        if !replace(&mut self.descriptors.layout, layout) {
            return;
        }
        self.push_constants.dirty = self.push_constants.written.clone();
        self.mark(StateMask::DESCRIPTORS | StateMask::PUSH_CONSTANTS);
    }

    /// # Panics
    ///
    /// Panics if more than [`MAX_DYNAMIC_OFFSETS`] dynamic offsets are supplied.
    pub fn bind_descriptor_set(&mut self, index: u32, set: Handle, dynamic_offsets: &[u32]) {
        assert!(
            dynamic_offsets.len() <= MAX_DYNAMIC_OFFSETS,
            "bind_descriptor_set: {} dynamic offsets exceed the limit of {MAX_DYNAMIC_OFFSETS}",
            dynamic_offsets.len()
        );
        let Some(i) = index_in(index, MAX_DESCRIPTOR_SETS) else {
            debug!(index, "ignoring out-of-range descriptor set");
            return;
        };
        let mut binding = DescriptorSetBinding {
            set,
            dynamic_offset_count: dynamic_offsets.len() as u8,
            ..DescriptorSetBinding::default()
        };
        binding.dynamic_offsets[..dynamic_offsets.len()].copy_from_slice(dynamic_offsets);
        if replace(&mut self.descriptors.sets[i], binding) {
            self.mark(StateMask::DESCRIPTORS);
        }
    }
}

/// End of a `len`-byte write at `offset`, if it fits inside the push-constant block.
fn push_constant_end(offset: u32, len: usize) -> Option<u32> {
    u32::try_from(len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .filter(|&end| end as usize <= PUSH_CONSTANT_BYTES)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn clean_state() -> GlState {
        let state = GlState::default();
        state.tracker.clear(StateMask::all());
        state
    }

    #[test]
    fn push_constant_ranges_accumulate() {
        let mut state = clean_state();
        state.push_constants(vk::ShaderStageFlags::VERTEX, 16, &[1, 2, 3, 4]);
        state.push_constants(vk::ShaderStageFlags::VERTEX, 64, &[5; 8]);
        assert_eq!(state.dirty(), StateMask::PUSH_CONSTANTS);
        assert_eq!(state.push_constant_state().dirty_range(), Some(16..72));
        assert_eq!(&state.push_constant_state().data[16..20], &[1, 2, 3, 4]);
    }

    #[test]
    fn identical_push_is_clean() {
        let mut state = clean_state();
        state.push_constants(vk::ShaderStageFlags::FRAGMENT, 0, &[0; 16]);
        assert_eq!(state.push_constant_state().dirty_range(), Some(0..16));

        let mut state = clean_state();
        state.push_constants(vk::ShaderStageFlags::FRAGMENT, 0, &[9; 4]);
        state.tracker.clear(StateMask::all());
        state.push_constants.take_dirty();
        state.push_constants(vk::ShaderStageFlags::FRAGMENT, 0, &[9; 4]);
        assert_eq!(state.dirty(), StateMask::empty());
        assert_eq!(state.push_constant_state().dirty_range(), None);
    }

    #[test]
    fn out_of_range_push_is_ignored() {
        let mut state = clean_state();
        state.push_constants(vk::ShaderStageFlags::VERTEX, 120, &[0; 16]);
        state.push_constants(vk::ShaderStageFlags::VERTEX, u32::MAX, &[1]);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    fn push_constant_end_rejects_lengths_past_u32() {
        assert_eq!(push_constant_end(0, PUSH_CONSTANT_BYTES), Some(128));
        assert_eq!(push_constant_end(4, PUSH_CONSTANT_BYTES), None);
        assert_eq!(push_constant_end(u32::MAX, 1), None);
        // Would wrap to 4 when truncated to 32 bits.
        #[cfg(target_pointer_width = "64")]
        assert_eq!(push_constant_end(0, (1usize << 32) + 4), None);
    }

    #[test]
    fn pod_upload() {
        let mut state = clean_state();
        state.push_constants_pod(vk::ShaderStageFlags::VERTEX, 0, &[1.0f32, 2.0, 3.0, 4.0]);
        assert_eq!(state.push_constant_state().dirty_range(), Some(0..16));
        assert_eq!(&state.push_constant_state().data[4..8], &2.0f32.to_le_bytes());
    }

    #[test]
    fn layout_switch_replays_written_range() {
        let mut state = clean_state();
        state.push_constants(vk::ShaderStageFlags::VERTEX, 8, &[1; 8]);
        state.push_constants.take_dirty();
        state.tracker.clear(StateMask::all());

        state.bind_pipeline_layout(Handle::from_raw(3));
        assert_eq!(state.dirty(), StateMask::DESCRIPTORS | StateMask::PUSH_CONSTANTS);
        assert_eq!(state.push_constant_state().dirty_range(), Some(8..16));
    }

    #[test]
    fn descriptor_set_binding() {
        let mut state = clean_state();
        state.bind_descriptor_set(1, Handle::from_raw(9), &[256, 512]);
        assert_eq!(state.dirty(), StateMask::DESCRIPTORS);
        assert_eq!(state.descriptors().sets[1].dynamic_offsets(), &[256, 512]);

        state.tracker.clear(StateMask::all());
        state.bind_descriptor_set(1, Handle::from_raw(9), &[256, 512]);
        state.bind_descriptor_set(MAX_DESCRIPTOR_SETS as u32, Handle::from_raw(9), &[]);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    #[should_panic(expected = "dynamic offsets exceed")]
    fn too_many_dynamic_offsets_panics() {
        let mut state = clean_state();
        state.bind_descriptor_set(0, Handle::from_raw(1), &[0; MAX_DYNAMIC_OFFSETS + 1]);
    }
}
