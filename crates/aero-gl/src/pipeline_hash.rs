//! Stable 64-bit key over every piece of state that ends up baked into a pipeline object.
//!
//! The fold reads fixed-index arrays in a fixed order and feeds little-endian bytes to xxh3, so
//! equal logical states hash equally across runs and processes. The result is memoized against
//! the tracker's pipeline epoch; the vertex-input part has its own memo against the
//! vertex-input epoch since it is the most expensive piece and changes least often.

use std::cell::Cell;

use xxhash_rust::xxh3::xxh3_64;

use crate::state::{GlState, StencilFaceState, MAX_COLOR_ATTACHMENTS};
use crate::types::PrimitiveMode;
use crate::vertex_array::VertexLayoutSnapshot;

pub type PipelineStateHash = u64;

/// Fixed-capacity little-endian byte sink.
struct Fold<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Fold<N> {
    fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        self
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    fn bool(&mut self, v: bool) -> &mut Self {
        self.bytes(&[u8::from(v)])
    }

    fn f32(&mut self, v: f32) -> &mut Self {
        self.u32(v.to_bits())
    }

    fn finish(&self) -> u64 {
        xxh3_64(&self.buf[..self.len])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Memo {
    epoch: u64,
    viewport_count: u32,
    hash: u64,
}

/// Memoizing pipeline-state hasher owned by a [`GlState`].
#[derive(Debug, Default)]
pub struct PipelineStateHasher {
    memo: Cell<Option<Memo>>,
    vertex_memo: Cell<Option<(u64, u64)>>,
    computations: Cell<u64>,
}

impl PipelineStateHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full recomputations so far.
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }

    pub fn compute(&self, state: &GlState) -> PipelineStateHash {
        let tracker = state.tracker();
        let epoch = tracker.pipeline_epoch();
        let viewport_count = state.viewport_count();
        if let Some(memo) = self.memo.get() {
            if memo.epoch == epoch && memo.viewport_count == viewport_count {
                return memo.hash;
            }
        }

        let vertex_epoch = tracker.vertex_input_epoch();
        let vertex_hash = match self.vertex_memo.get() {
            Some((e, h)) if e == vertex_epoch => h,
            _ => {
                let h = vertex_input_hash(state.vertex_layout());
                self.vertex_memo.set(Some((vertex_epoch, h)));
                h
            }
        };

        let hash = fold_pipeline(state, vertex_hash);
        self.computations.set(self.computations.get() + 1);
        self.memo.set(Some(Memo {
            epoch,
            viewport_count,
            hash,
        }));
        hash
    }
}

/// Hash of the vertex input layout: enabled attribute formats plus the stride and step rate of
/// every binding an enabled attribute reads. Buffers and offsets are bound per draw and are not
/// part of it.
pub fn vertex_input_hash(layout: &VertexLayoutSnapshot) -> u64 {
    let mut fold = Fold::<512>::new();
    let mut used = 0u32;
    for attribute in &layout.attributes {
        if attribute.enabled {
            used |= 1 << attribute.binding;
            fold.bool(true)
                .u32(attribute.size)
                .u32(attribute.ty.to_gl())
                .bytes(&[attribute.kind as u8])
                .u32(attribute.binding)
                .u32(attribute.relative_offset);
        } else {
            fold.bool(false);
        }
    }
    for (i, binding) in layout.bindings.iter().enumerate() {
        if used & (1 << i) != 0 {
            fold.u32(binding.stride).u32(binding.divisor);
        } else {
            fold.u64(0);
        }
    }
    fold.finish()
}

/// Ops and compare functions of both faces. Masks and the reference are dynamic state.
fn stencil_faces_hash(front: &StencilFaceState, back: &StencilFaceState) -> u64 {
    let mut fold = Fold::<32>::new();
    for face in [front, back] {
        fold.u32(face.fail.to_gl())
            .u32(face.depth_fail.to_gl())
            .u32(face.pass.to_gl())
            .u32(face.func.to_gl());
    }
    fold.finish()
}

fn fold_pipeline(state: &GlState, vertex_hash: u64) -> u64 {
    let mut fold = Fold::<256>::new();

    let program = state.current_program();
    let generation = state.program(program).map_or(0, |p| p.link_generation);
    fold.u64(program.raw()).u64(generation);

    fold.u64(vertex_hash);

    let ia = state.input_assembly();
    fold.u32(ia.mode.to_gl()).bool(ia.restart_enabled());

    let raster = state.raster();
    fold.bool(raster.rasterizer_discard)
        .u32(raster.polygon_mode.to_gl())
        .bool(raster.cull_enabled)
        .u32(raster.cull_face.to_gl())
        .u32(raster.front_face.to_gl())
        .bool(raster.depth_clamp)
        .bool(raster.depth_bias_enabled());

    let depth = state.depth();
    let stencil = state.stencil();
    fold.bool(depth.test_enabled)
        .bool(depth.write_enabled)
        .u32(depth.func.to_gl())
        .bool(depth.bounds_test_enabled)
        .bool(stencil.enabled)
        .u64(stencil_faces_hash(&stencil.front, &stencil.back));

    let blend = state.blend();
    for attachment in &blend.attachments {
        fold.u64(attachment.blend_hash());
    }
    let mut masks = [0u8; MAX_COLOR_ATTACHMENTS];
    for (mask, attachment) in masks.iter_mut().zip(&blend.attachments) {
        *mask = attachment.write_mask;
    }
    fold.bytes(&masks)
        .bool(blend.logic_op_enabled)
        .u32(blend.logic_op.to_gl());

    let ms = state.multisample();
    fold.u32(ms.samples)
        .bool(ms.sample_shading)
        .f32(ms.min_sample_shading)
        .u32(ms.effective_sample_mask())
        .bool(ms.alpha_to_coverage)
        .bool(ms.alpha_to_one);

    if ia.mode == PrimitiveMode::Patches {
        fold.u32(ia.patch_control_points);
    }
    fold.u32(state.viewport_count());

    fold.finish()
}

impl GlState {
    /// Key for the pipeline object the next draw needs.
    pub fn pipeline_hash(&self) -> PipelineStateHash {
        self.hasher.compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirty::StateMask;
    use crate::gl;

    #[test]
    fn memoized_until_pipeline_state_changes() {
        let mut state = GlState::default();
        let first = state.pipeline_hash();
        assert_eq!(state.pipeline_hash(), first);
        assert_eq!(state.hasher.computations(), 1);

        // Dynamic-only state leaves the memo alone.
        state.blend_color(1.0, 0.0, 0.0, 1.0);
        state.line_width(4.0);
        assert_eq!(state.pipeline_hash(), first);
        assert_eq!(state.hasher.computations(), 1);

        state.enable(gl::DEPTH_TEST);
        assert_ne!(state.pipeline_hash(), first);
        assert_eq!(state.hasher.computations(), 2);
    }

    #[test]
    fn clearing_bits_does_not_invalidate() {
        let state = GlState::default();
        let first = state.pipeline_hash();
        state.tracker().clear(StateMask::all());
        assert_eq!(state.pipeline_hash(), first);
        assert_eq!(state.hasher.computations(), 1);
    }

    #[test]
    fn reverting_a_change_restores_the_hash() {
        let mut state = GlState::default();
        let first = state.pipeline_hash();
        state.cull_face(gl::FRONT);
        assert_ne!(state.pipeline_hash(), first);
        state.cull_face(gl::BACK);
        assert_eq!(state.pipeline_hash(), first);
    }

    #[test]
    fn patch_size_only_counts_for_patches() {
        let mut state = GlState::default();
        let first = state.pipeline_hash();
        state.patch_parameter_i(gl::PATCH_VERTICES, 4);
        assert_eq!(state.pipeline_hash(), first);

        state.set_primitive_mode(gl::PATCHES);
        let four = state.pipeline_hash();
        state.patch_parameter_i(gl::PATCH_VERTICES, 5);
        assert_ne!(state.pipeline_hash(), four);
    }

    #[test]
    fn viewport_count_is_part_of_the_key() {
        let mut state = GlState::default();
        let first = state.pipeline_hash();
        state.viewport_indexed(2, 0.0, 0.0, 16.0, 16.0);
        assert_ne!(state.pipeline_hash(), first);
    }

    #[test]
    fn stencil_reference_is_dynamic() {
        let mut state = GlState::default();
        state.enable(gl::STENCIL_TEST);
        let first = state.pipeline_hash();
        state.stencil_func(gl::ALWAYS, 7, !0);
        assert_eq!(state.pipeline_hash(), first);
        state.stencil_func(gl::EQUAL, 7, !0);
        assert_ne!(state.pipeline_hash(), first);
    }

    #[test]
    fn vertex_buffer_binding_does_not_change_layout_hash() {
        let mut state = GlState::default();
        state.enable_vertex_attrib_array(0);
        let first = vertex_input_hash(state.vertex_layout());
        let buf = state.create_buffer();
        state.bind_vertex_buffer(0, buf, 256, 0);
        assert_eq!(vertex_input_hash(state.vertex_layout()), first);

        state.bind_vertex_buffer(0, buf, 256, 32);
        assert_ne!(vertex_input_hash(state.vertex_layout()), first);
    }
}
