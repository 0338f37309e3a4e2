//! The legacy state store.
//!
//! [`GlState`] holds every piece of legacy-API state in fixed-size arrays. Mutation goes through
//! setters that follow one rule: compare against the stored value, write only on change, and
//! mark the owning [`StateCategory`](crate::dirty::StateCategory) only on change. Enumeration
//! arguments arrive as raw GL values; anything unknown, any out-of-range index and any handle
//! that is not live turns the call into a no-op with nothing marked.
//!
//! Getters are plain reads and never touch the dirty mask.

mod blend;
mod buffers;
mod capability;
mod depth_stencil;
mod descriptors;
mod framebuffer;
mod objects;
mod program;
mod raster;
mod textures;
mod vertex;
mod viewport;

use std::sync::Arc;

pub use blend::{AttachmentBlendState, BlendState};
pub use buffers::{BufferBindings, BufferRecord, IndexedBinding};
pub use depth_stencil::{DepthState, StencilFaceState, StencilState};
pub use descriptors::{DescriptorSetBinding, DescriptorState, PushConstantState};
pub use framebuffer::{ClearValues, FramebufferAttachment, FramebufferRecord, FramebufferStatus};
pub use objects::{QueryRecord, Registry};
pub use program::{ProgramRecord, ShaderRecord};
pub use raster::{InputAssemblyState, MultisampleState, RasterState};
pub use textures::{SamplerParams, SamplerRecord, TextureRecord, TextureUnit};
pub use vertex::{VertexAttribute, VertexBinding};
pub use viewport::{ScissorRect, Viewport, ViewportState};

use crate::config::StateConfig;
use crate::deferred::DeferredDeletionQueue;
use crate::dirty::{DirtyTracker, StateMask};
use crate::handle::Handle;
use crate::pipeline_hash::PipelineStateHasher;
use crate::types::{IndexType, QueryTarget};
use crate::validation::{ValidationCallback, Validator};
use crate::vertex_array::VertexLayoutSnapshot;

pub const MAX_TEXTURE_UNITS: usize = 32;
pub const MAX_VERTEX_ATTRIBS: usize = 16;
pub const MAX_VERTEX_BINDINGS: usize = 16;
pub const MAX_COLOR_ATTACHMENTS: usize = 8;
pub const MAX_VIEWPORTS: usize = 16;
pub const MAX_UNIFORM_BUFFER_BINDINGS: usize = 36;
pub const MAX_STORAGE_BUFFER_BINDINGS: usize = 16;
pub const MAX_TRANSFORM_FEEDBACK_BUFFERS: usize = 4;
pub const MAX_ATOMIC_COUNTER_BUFFER_BINDINGS: usize = 8;
pub const PUSH_CONSTANT_BYTES: usize = 128;
pub const MAX_DESCRIPTOR_SETS: usize = 4;
pub const MAX_DYNAMIC_OFFSETS: usize = 8;

/// Every object registry, each with its own handle namespace.
#[derive(Debug, Default)]
pub(crate) struct Objects {
    pub(crate) textures: Registry<TextureRecord>,
    pub(crate) buffers: Registry<BufferRecord>,
    pub(crate) shaders: Registry<ShaderRecord>,
    pub(crate) programs: Registry<ProgramRecord>,
    pub(crate) samplers: Registry<SamplerRecord>,
    pub(crate) framebuffers: Registry<FramebufferRecord>,
    pub(crate) vertex_arrays: Registry<VertexLayoutSnapshot>,
    pub(crate) queries: Registry<QueryRecord>,
}

/// The complete legacy state of one context.
///
/// Constructed explicitly and passed by reference; there is no process-wide instance. A fresh
/// store has every dirty bit set, so the first round of syncs emits everything.
#[derive(Debug)]
pub struct GlState {
    pub(crate) tracker: Arc<DirtyTracker>,
    pub(crate) validator: Validator,
    pub(crate) deletions: DeferredDeletionQueue,
    pub(crate) objects: Objects,

    pub(crate) active_texture_unit: usize,
    pub(crate) texture_units: [TextureUnit; MAX_TEXTURE_UNITS],
    pub(crate) buffers: BufferBindings,
    pub(crate) vertex: VertexLayoutSnapshot,
    pub(crate) vertex_array: Handle,
    pub(crate) program: Handle,

    pub(crate) blend: BlendState,
    pub(crate) depth: DepthState,
    pub(crate) stencil: StencilState,
    pub(crate) raster: RasterState,
    pub(crate) viewports: ViewportState,
    pub(crate) multisample: MultisampleState,
    pub(crate) input_assembly: InputAssemblyState,
    pub(crate) push_constants: PushConstantState,
    pub(crate) descriptors: DescriptorState,
    pub(crate) clear_values: ClearValues,

    pub(crate) draw_framebuffer: Handle,
    pub(crate) read_framebuffer: Handle,
    pub(crate) active_queries: [Handle; QueryTarget::COUNT],

    pub(crate) hasher: PipelineStateHasher,
    /// Index type of the last emitted index-buffer bind; a change forces a rebind.
    pub(crate) last_index_type: Option<IndexType>,
}

impl GlState {
    pub fn new(config: &StateConfig) -> Self {
        Self::with_tracker(config, Arc::new(DirtyTracker::new()))
    }

    pub(crate) fn with_tracker(config: &StateConfig, tracker: Arc<DirtyTracker>) -> Self {
        Self {
            tracker,
            validator: Validator::new(config.validation),
            deletions: DeferredDeletionQueue::new(config.deletion_delay_frames),
            objects: Objects::default(),
            active_texture_unit: 0,
            texture_units: [TextureUnit::default(); MAX_TEXTURE_UNITS],
            buffers: BufferBindings::default(),
            vertex: VertexLayoutSnapshot::default(),
            vertex_array: Handle::NONE,
            program: Handle::NONE,
            blend: BlendState::default(),
            depth: DepthState::default(),
            stencil: StencilState::default(),
            raster: RasterState::default(),
            viewports: ViewportState::default(),
            multisample: MultisampleState::default(),
            input_assembly: InputAssemblyState::default(),
            push_constants: PushConstantState::default(),
            descriptors: DescriptorState::default(),
            clear_values: ClearValues::default(),
            draw_framebuffer: Handle::NONE,
            read_framebuffer: Handle::NONE,
            active_queries: [Handle::NONE; QueryTarget::COUNT],
            hasher: PipelineStateHasher::new(),
            last_index_type: None,
        }
    }

    /// The dirty tracker. Cloning the `Arc` lets another thread poll the mask without going
    /// through whatever lock guards this store.
    pub fn tracker(&self) -> &Arc<DirtyTracker> {
        &self.tracker
    }

    pub fn is_dirty(&self, mask: impl Into<StateMask>) -> bool {
        self.tracker.is_dirty(mask)
    }

    pub fn dirty(&self) -> StateMask {
        self.tracker.all()
    }

    #[inline]
    pub(crate) fn mark(&self, mask: StateMask) {
        self.tracker.mark(mask);
    }

    #[inline]
    pub(crate) fn mark_dynamic(&self, mask: StateMask) {
        self.tracker.mark_dynamic(mask);
    }

    pub fn set_validation_enabled(&mut self, enabled: bool) {
        self.validator.set_enabled(enabled);
    }

    pub fn set_validation_callback(&mut self, callback: ValidationCallback) {
        self.validator.set_callback(callback);
    }

    pub fn deletion_queue(&self) -> &DeferredDeletionQueue {
        &self.deletions
    }

    pub fn blend(&self) -> &BlendState {
        &self.blend
    }

    pub fn depth(&self) -> &DepthState {
        &self.depth
    }

    pub fn stencil(&self) -> &StencilState {
        &self.stencil
    }

    pub fn raster(&self) -> &RasterState {
        &self.raster
    }

    pub fn viewports(&self) -> &ViewportState {
        &self.viewports
    }

    pub fn multisample(&self) -> &MultisampleState {
        &self.multisample
    }

    pub fn input_assembly(&self) -> &InputAssemblyState {
        &self.input_assembly
    }

    pub fn push_constant_state(&self) -> &PushConstantState {
        &self.push_constants
    }

    pub fn descriptors(&self) -> &DescriptorState {
        &self.descriptors
    }

    pub fn clear_values(&self) -> &ClearValues {
        &self.clear_values
    }

    pub fn buffer_bindings(&self) -> &BufferBindings {
        &self.buffers
    }

    pub fn vertex_layout(&self) -> &VertexLayoutSnapshot {
        &self.vertex
    }

    pub fn current_program(&self) -> Handle {
        self.program
    }

    pub fn bound_vertex_array(&self) -> Handle {
        self.vertex_array
    }
}

impl Default for GlState {
    fn default() -> Self {
        Self::new(&StateConfig::default())
    }
}

/// Store `value` into `slot` if it differs. Returns whether it did.
#[inline]
pub(crate) fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Bounds-check a legacy index against a fixed table size.
#[inline]
pub(crate) fn index_in(index: u32, len: usize) -> Option<usize> {
    let index = index as usize;
    (index < len).then_some(index)
}
