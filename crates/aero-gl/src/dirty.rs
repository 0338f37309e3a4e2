//! Per-category dirty tracking.
//!
//! Every independently synchronizable group of state owns one bit in a 64-bit mask. Setters
//! mark bits; each sync entry point clears only the bits it consumes. The mask and the counters
//! next to it are atomics so that a reader holding only a `&DirtyTracker` (for example one that
//! skipped the store lock for an optimistic check) always sees a consistent value.

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

/// One independently dirtiable group of legacy state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum StateCategory {
    Viewport = 0,
    Scissor = 1,
    BlendState = 2,
    BlendConstants = 3,
    DepthState = 4,
    DepthBounds = 5,
    DepthBias = 6,
    StencilState = 7,
    StencilReference = 8,
    CullState = 9,
    LineWidth = 10,
    VertexInput = 11,
    VertexBindings = 12,
    TextureBindings = 13,
    UniformBufferBindings = 14,
    StorageBufferBindings = 15,
    Program = 16,
    Descriptors = 17,
    PushConstants = 18,
    ColorMask = 19,
    PolygonMode = 20,
    SampleState = 21,
    LogicOp = 22,
    PrimitiveTopology = 23,
    PrimitiveRestart = 24,
    RasterizerDiscard = 25,
    DepthClamp = 26,
    FrontFace = 27,
    PatchControlPoints = 28,
    SampleMask = 29,
    ClearValues = 30,
    VertexArrayObject = 31,
    ElementBuffer = 32,
}

impl StateCategory {
    pub const COUNT: usize = 33;

    pub const ALL: [StateCategory; Self::COUNT] = [
        Self::Viewport,
        Self::Scissor,
        Self::BlendState,
        Self::BlendConstants,
        Self::DepthState,
        Self::DepthBounds,
        Self::DepthBias,
        Self::StencilState,
        Self::StencilReference,
        Self::CullState,
        Self::LineWidth,
        Self::VertexInput,
        Self::VertexBindings,
        Self::TextureBindings,
        Self::UniformBufferBindings,
        Self::StorageBufferBindings,
        Self::Program,
        Self::Descriptors,
        Self::PushConstants,
        Self::ColorMask,
        Self::PolygonMode,
        Self::SampleState,
        Self::LogicOp,
        Self::PrimitiveTopology,
        Self::PrimitiveRestart,
        Self::RasterizerDiscard,
        Self::DepthClamp,
        Self::FrontFace,
        Self::PatchControlPoints,
        Self::SampleMask,
        Self::ClearValues,
        Self::VertexArrayObject,
        Self::ElementBuffer,
    ];

    pub const fn mask(self) -> StateMask {
        StateMask::from_bits_retain(1u64 << self as u8)
    }
}

impl From<StateCategory> for StateMask {
    fn from(category: StateCategory) -> Self {
        category.mask()
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct StateMask: u64 {
        const VIEWPORT = 1 << 0;
        const SCISSOR = 1 << 1;
        const BLEND_STATE = 1 << 2;
        const BLEND_CONSTANTS = 1 << 3;
        const DEPTH_STATE = 1 << 4;
        const DEPTH_BOUNDS = 1 << 5;
        const DEPTH_BIAS = 1 << 6;
        const STENCIL_STATE = 1 << 7;
        const STENCIL_REFERENCE = 1 << 8;
        const CULL_STATE = 1 << 9;
        const LINE_WIDTH = 1 << 10;
        const VERTEX_INPUT = 1 << 11;
        const VERTEX_BINDINGS = 1 << 12;
        const TEXTURE_BINDINGS = 1 << 13;
        const UNIFORM_BUFFER_BINDINGS = 1 << 14;
        const STORAGE_BUFFER_BINDINGS = 1 << 15;
        const PROGRAM = 1 << 16;
        const DESCRIPTORS = 1 << 17;
        const PUSH_CONSTANTS = 1 << 18;
        const COLOR_MASK = 1 << 19;
        const POLYGON_MODE = 1 << 20;
        const SAMPLE_STATE = 1 << 21;
        const LOGIC_OP = 1 << 22;
        const PRIMITIVE_TOPOLOGY = 1 << 23;
        const PRIMITIVE_RESTART = 1 << 24;
        const RASTERIZER_DISCARD = 1 << 25;
        const DEPTH_CLAMP = 1 << 26;
        const FRONT_FACE = 1 << 27;
        const PATCH_CONTROL_POINTS = 1 << 28;
        const SAMPLE_MASK = 1 << 29;
        const CLEAR_VALUES = 1 << 30;
        const VERTEX_ARRAY_OBJECT = 1 << 31;
        const ELEMENT_BUFFER = 1 << 32;
    }
}

impl StateMask {
    /// Categories that feed the pipeline-state hash. Marking any of them invalidates it.
    pub const PIPELINE: StateMask = StateMask::from_bits_retain(
        StateMask::PROGRAM.bits()
            | StateMask::VERTEX_INPUT.bits()
            | StateMask::VERTEX_BINDINGS.bits()
            | StateMask::PRIMITIVE_TOPOLOGY.bits()
            | StateMask::PRIMITIVE_RESTART.bits()
            | StateMask::RASTERIZER_DISCARD.bits()
            | StateMask::POLYGON_MODE.bits()
            | StateMask::CULL_STATE.bits()
            | StateMask::FRONT_FACE.bits()
            | StateMask::DEPTH_CLAMP.bits()
            | StateMask::DEPTH_BIAS.bits()
            | StateMask::DEPTH_STATE.bits()
            | StateMask::STENCIL_STATE.bits()
            | StateMask::BLEND_STATE.bits()
            | StateMask::COLOR_MASK.bits()
            | StateMask::LOGIC_OP.bits()
            | StateMask::SAMPLE_STATE.bits()
            | StateMask::SAMPLE_MASK.bits()
            | StateMask::PATCH_CONTROL_POINTS.bits(),
    );

    /// Categories folded into the vertex-input sub-hash.
    pub const VERTEX_INPUT_LAYOUT: StateMask = StateMask::from_bits_retain(
        StateMask::VERTEX_INPUT.bits() | StateMask::VERTEX_BINDINGS.bits(),
    );

    /// Categories set with per-draw commands rather than baked into the pipeline.
    ///
    /// `DEPTH_BIAS` and `STENCIL_STATE` are also in [`StateMask::PIPELINE`]: the enables and ops
    /// are pipeline state, the factors and masks are dynamic.
    pub const DYNAMIC: StateMask = StateMask::from_bits_retain(
        StateMask::VIEWPORT.bits()
            | StateMask::SCISSOR.bits()
            | StateMask::LINE_WIDTH.bits()
            | StateMask::DEPTH_BIAS.bits()
            | StateMask::BLEND_CONSTANTS.bits()
            | StateMask::DEPTH_BOUNDS.bits()
            | StateMask::STENCIL_STATE.bits()
            | StateMask::STENCIL_REFERENCE.bits(),
    );

    /// Bits the descriptor-set sync entry point consumes.
    pub const DESCRIPTOR_SETS: StateMask = StateMask::from_bits_retain(
        StateMask::DESCRIPTORS.bits()
            | StateMask::TEXTURE_BINDINGS.bits()
            | StateMask::UNIFORM_BUFFER_BINDINGS.bits()
            | StateMask::STORAGE_BUFFER_BINDINGS.bits(),
    );

    pub fn contains_category(self, category: StateCategory) -> bool {
        self.contains(category.mask())
    }

    /// Categories present in the mask, in declaration order.
    pub fn categories(self) -> impl Iterator<Item = StateCategory> {
        StateCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(c.mask()))
    }
}

/// Atomic dirty mask plus the counters derived caches key on.
///
/// * `version` advances on every effective [`DirtyTracker::mark`], for external caches that
///   only need "something changed".
/// * `pipeline_epoch` advances when a [`StateMask::PIPELINE`] bit is marked through
///   [`DirtyTracker::mark`] and keys the memoized pipeline hash.
///   [`DirtyTracker::mark_dynamic`] leaves it alone.
/// * `vertex_input_epoch` advances when a [`StateMask::VERTEX_INPUT_LAYOUT`] bit is marked and
///   keys the vertex-input sub-hash.
///
/// Clearing bits never touches the epochs, so a sync entry point consuming `DEPTH_BIAS` does not
/// make a stale pipeline hash look fresh.
#[derive(Debug)]
pub struct DirtyTracker {
    mask: AtomicU64,
    version: AtomicU64,
    pipeline_epoch: AtomicU64,
    vertex_input_epoch: AtomicU64,
}

impl DirtyTracker {
    /// A fresh tracker has every category dirty so the first sync emits everything.
    pub fn new() -> Self {
        Self {
            mask: AtomicU64::new(StateMask::all().bits()),
            version: AtomicU64::new(1),
            pipeline_epoch: AtomicU64::new(1),
            vertex_input_epoch: AtomicU64::new(1),
        }
    }

    pub fn mark(&self, mask: StateMask) {
        if mask.is_empty() {
            return;
        }
        // Epochs first: a reader that observes the new bit must not pair it with an old epoch.
        if mask.intersects(StateMask::PIPELINE) {
            self.pipeline_epoch.fetch_add(1, Ordering::AcqRel);
        }
        if mask.intersects(StateMask::VERTEX_INPUT_LAYOUT) {
            self.vertex_input_epoch.fetch_add(1, Ordering::AcqRel);
        }
        self.mask.fetch_or(mask.bits(), Ordering::AcqRel);
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Mark `mask` without advancing either epoch.
    ///
    /// For changes confined to per-draw values of a category that also feeds the pipeline hash
    /// (stencil masks, depth-bias factors). The memoized hashes stay valid because none of
    /// those values is hashed.
    pub fn mark_dynamic(&self, mask: StateMask) {
        if mask.is_empty() {
            return;
        }
        self.mask.fetch_or(mask.bits(), Ordering::AcqRel);
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    pub fn mark_category(&self, category: StateCategory) {
        self.mark(category.mask());
    }

    /// Clear `mask` and return which of its bits were set beforehand.
    pub fn clear(&self, mask: StateMask) -> StateMask {
        if mask.is_empty() {
            return StateMask::empty();
        }
        let previous = self.mask.fetch_and(!mask.bits(), Ordering::AcqRel);
        StateMask::from_bits_retain(previous) & mask
    }

    /// True when any bit of `mask` is set.
    pub fn is_dirty(&self, mask: impl Into<StateMask>) -> bool {
        self.all().intersects(mask.into())
    }

    pub fn all(&self) -> StateMask {
        StateMask::from_bits_retain(self.mask.load(Ordering::Acquire))
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn pipeline_epoch(&self) -> u64 {
        self.pipeline_epoch.load(Ordering::Acquire)
    }

    pub fn vertex_input_epoch(&self) -> u64 {
        self.vertex_input_epoch.load(Ordering::Acquire)
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn category_bits_match_flag_names() {
        assert_eq!(StateCategory::Viewport.mask(), StateMask::VIEWPORT);
        assert_eq!(StateCategory::ClearValues.mask(), StateMask::CLEAR_VALUES);
        assert_eq!(StateCategory::ElementBuffer.mask(), StateMask::ELEMENT_BUFFER);
        let union = StateCategory::ALL
            .iter()
            .fold(StateMask::empty(), |acc, c| acc | c.mask());
        assert_eq!(union, StateMask::all());
        assert_eq!(StateMask::all().bits().count_ones() as usize, StateCategory::COUNT);
    }

    #[test]
    fn starts_fully_dirty() {
        let tracker = DirtyTracker::new();
        assert_eq!(tracker.all(), StateMask::all());
    }

    #[test]
    fn clear_returns_previously_set_subset() {
        let tracker = DirtyTracker::new();
        tracker.clear(StateMask::all());
        tracker.mark(StateMask::VIEWPORT | StateMask::LINE_WIDTH);

        let cleared = tracker.clear(StateMask::VIEWPORT | StateMask::SCISSOR);
        assert_eq!(cleared, StateMask::VIEWPORT);
        assert_eq!(tracker.all(), StateMask::LINE_WIDTH);
        assert_eq!(tracker.clear(StateMask::VIEWPORT), StateMask::empty());
    }

    #[test]
    fn epochs_follow_subsets() {
        let tracker = DirtyTracker::new();
        let pipeline = tracker.pipeline_epoch();
        let vertex = tracker.vertex_input_epoch();
        let version = tracker.version();

        tracker.mark(StateMask::VIEWPORT);
        assert_eq!(tracker.pipeline_epoch(), pipeline);
        assert_eq!(tracker.vertex_input_epoch(), vertex);
        assert_eq!(tracker.version(), version + 1);

        tracker.mark(StateMask::BLEND_STATE);
        assert_eq!(tracker.pipeline_epoch(), pipeline + 1);
        assert_eq!(tracker.vertex_input_epoch(), vertex);

        tracker.mark(StateMask::VERTEX_BINDINGS);
        assert_eq!(tracker.pipeline_epoch(), pipeline + 2);
        assert_eq!(tracker.vertex_input_epoch(), vertex + 1);
    }

    #[test]
    fn dynamic_marks_skip_the_epochs() {
        let tracker = DirtyTracker::new();
        tracker.clear(StateMask::all());
        let pipeline = tracker.pipeline_epoch();
        let version = tracker.version();

        tracker.mark_dynamic(StateMask::STENCIL_STATE);
        assert_eq!(tracker.all(), StateMask::STENCIL_STATE);
        assert_eq!(tracker.pipeline_epoch(), pipeline);
        assert_eq!(tracker.version(), version + 1);
    }

    #[test]
    fn clearing_does_not_touch_epochs() {
        let tracker = DirtyTracker::new();
        let epoch = tracker.pipeline_epoch();
        tracker.clear(StateMask::all());
        assert_eq!(tracker.pipeline_epoch(), epoch);
    }

    #[test]
    fn empty_mark_is_a_no_op() {
        let tracker = DirtyTracker::new();
        let version = tracker.version();
        tracker.mark(StateMask::empty());
        assert_eq!(tracker.version(), version);
    }

    #[test]
    fn shared_subsets_overlap_where_documented() {
        assert_eq!(
            StateMask::PIPELINE & StateMask::DYNAMIC,
            StateMask::DEPTH_BIAS | StateMask::STENCIL_STATE
        );
        assert!(StateMask::PIPELINE.contains(StateMask::VERTEX_INPUT_LAYOUT));
    }

    #[test]
    fn concurrent_marks_are_never_lost() {
        let tracker = Arc::new(DirtyTracker::new());
        tracker.clear(StateMask::all());

        std::thread::scope(|scope| {
            for category in StateCategory::ALL {
                let tracker = Arc::clone(&tracker);
                scope.spawn(move || {
                    for _ in 0..100 {
                        tracker.mark_category(category);
                    }
                });
            }
        });

        assert_eq!(tracker.all(), StateMask::all());
        assert_eq!(tracker.version(), 1 + 100 * StateCategory::COUNT as u64);
    }
}
