use tracing::debug;

use super::{replace, GlState};
use crate::dirty::StateMask;
use crate::gl;
use crate::types::{CompareFunc, CullFace, StencilOp};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthState {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub func: CompareFunc,
    pub bounds_test_enabled: bool,
    pub bounds_min: f32,
    pub bounds_max: f32,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test_enabled: false,
            write_enabled: true,
            func: CompareFunc::Less,
            bounds_test_enabled: false,
            bounds_min: 0.0,
            bounds_max: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
    pub func: CompareFunc,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            pass: StencilOp::Keep,
            func: CompareFunc::Always,
            compare_mask: !0,
            write_mask: !0,
            reference: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StencilState {
    pub enabled: bool,
    pub front: StencilFaceState,
    pub back: StencilFaceState,
}

impl GlState {
    pub fn depth_mask(&mut self, write: bool) {
        if replace(&mut self.depth.write_enabled, write) {
            self.mark(StateMask::DEPTH_STATE);
        }
    }

    pub fn depth_func(&mut self, func: u32) {
        let Some(func) = CompareFunc::from_gl(func) else {
            debug!(func, "unknown depth func");
            return;
        };
        if replace(&mut self.depth.func, func) {
            self.mark(StateMask::DEPTH_STATE);
        }
    }

    /// `glDepthBoundsEXT`. Bounds outside `[0, 1]` or with `min > max` are ignored.
    pub fn depth_bounds(&mut self, min: f32, max: f32) {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            debug!(min, max, "ignoring invalid depth bounds");
            return;
        }
        let changed = replace(&mut self.depth.bounds_min, min);
        if replace(&mut self.depth.bounds_max, max) || changed {
            self.mark(StateMask::DEPTH_BOUNDS);
        }
    }

    pub(crate) fn set_depth_test_enabled(&mut self, enabled: bool) {
        if replace(&mut self.depth.test_enabled, enabled) {
            self.mark(StateMask::DEPTH_STATE);
        }
    }

    pub(crate) fn set_depth_bounds_test_enabled(&mut self, enabled: bool) {
        if replace(&mut self.depth.bounds_test_enabled, enabled) {
            self.mark(StateMask::DEPTH_STATE);
        }
    }

    pub(crate) fn set_stencil_test_enabled(&mut self, enabled: bool) {
        if replace(&mut self.stencil.enabled, enabled) {
            self.mark(StateMask::STENCIL_STATE);
        }
    }

    /// Apply `f` to the faces `face` selects and mark the categories whose fields changed.
    fn update_stencil(&mut self, face: u32, f: impl Fn(&mut StencilFaceState)) {
        let Some(face) = CullFace::from_gl(face) else {
            debug!(face, "unknown stencil face");
            return;
        };
        let mut changes = StencilChanges::default();
        if face != CullFace::Back {
            changes.merge(stencil_changes(&mut self.stencil.front, &f));
        }
        if face != CullFace::Front {
            changes.merge(stencil_changes(&mut self.stencil.back, &f));
        }
        if changes.ops {
            self.mark(changes.mask);
        } else {
            self.mark_dynamic(changes.mask);
        }
    }

    pub fn stencil_func(&mut self, func: u32, reference: u32, mask: u32) {
        self.stencil_func_separate(gl::FRONT_AND_BACK, func, reference, mask);
    }

    /// The comparison and its mask are stencil state; the reference is dynamic and marks
    /// `STENCIL_REFERENCE` alone.
    pub fn stencil_func_separate(&mut self, face: u32, func: u32, reference: u32, mask: u32) {
        let Some(func) = CompareFunc::from_gl(func) else {
            debug!(func, "unknown stencil func");
            return;
        };
        self.update_stencil(face, |s| {
            s.func = func;
            s.reference = reference;
            s.compare_mask = mask;
        });
    }

    pub fn stencil_op(&mut self, fail: u32, depth_fail: u32, pass: u32) {
        self.stencil_op_separate(gl::FRONT_AND_BACK, fail, depth_fail, pass);
    }

    pub fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, pass: u32) {
        let (Some(fail), Some(depth_fail), Some(pass)) = (
            StencilOp::from_gl(fail),
            StencilOp::from_gl(depth_fail),
            StencilOp::from_gl(pass),
        ) else {
            debug!(fail, depth_fail, pass, "unknown stencil op");
            return;
        };
        self.update_stencil(face, |s| {
            s.fail = fail;
            s.depth_fail = depth_fail;
            s.pass = pass;
        });
    }

    pub fn stencil_mask(&mut self, mask: u32) {
        self.stencil_mask_separate(gl::FRONT_AND_BACK, mask);
    }

    pub fn stencil_mask_separate(&mut self, face: u32, mask: u32) {
        self.update_stencil(face, |s| s.write_mask = mask);
    }
}

#[derive(Default)]
struct StencilChanges {
    mask: StateMask,
    /// An op or compare function changed, so the pipeline hash is stale.
    ops: bool,
}

impl StencilChanges {
    fn merge(&mut self, other: StencilChanges) {
        self.mask |= other.mask;
        self.ops |= other.ops;
    }
}

/// Apply `f` to `face` and report which categories the change touches.
fn stencil_changes(
    face: &mut StencilFaceState,
    f: &impl Fn(&mut StencilFaceState),
) -> StencilChanges {
    let mut next = *face;
    f(&mut next);
    let mut changes = StencilChanges::default();
    if next.reference != face.reference {
        changes.mask |= StateMask::STENCIL_REFERENCE;
    }
    let without_ref = |s: &StencilFaceState| StencilFaceState { reference: 0, ..*s };
    if without_ref(&next) != without_ref(face) {
        changes.mask |= StateMask::STENCIL_STATE;
    }
    let ops = |s: &StencilFaceState| (s.fail, s.depth_fail, s.pass, s.func);
    changes.ops = ops(&next) != ops(face);
    *face = next;
    changes
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
    fn depth_setters_mark_depth_state() {
        let mut state = clean_state();
        state.depth_func(gl::LESS);
        state.depth_mask(true);
        assert_eq!(state.dirty(), StateMask::empty());

        state.depth_func(gl::GEQUAL);
        assert_eq!(state.dirty(), StateMask::DEPTH_STATE);
        assert_eq!(state.depth().func, CompareFunc::GreaterEqual);
    }

    #[test]
    fn depth_bounds_validates_range() {
        let mut state = clean_state();
        state.depth_bounds(0.75, 0.25);
        state.depth_bounds(-1.0, 0.5);
        assert_eq!(state.dirty(), StateMask::empty());

        state.depth_bounds(0.25, 0.75);
        assert_eq!(state.dirty(), StateMask::DEPTH_BOUNDS);
    }

    #[test]
    fn reference_alone_marks_only_stencil_reference() {
        let mut state = clean_state();
        state.stencil_func(gl::ALWAYS, 0x80, !0);
        assert_eq!(state.dirty(), StateMask::STENCIL_REFERENCE);
        assert_eq!(state.stencil().front.reference, 0x80);
        assert_eq!(state.stencil().back.reference, 0x80);
    }

    #[test]
    fn separate_face_touches_one_face() {
        let mut state = clean_state();
        state.stencil_op_separate(gl::BACK, gl::KEEP, gl::INCR_WRAP, gl::REPLACE);
        assert_eq!(state.dirty(), StateMask::STENCIL_STATE);
        assert_eq!(state.stencil().front, StencilFaceState::default());
        assert_eq!(state.stencil().back.pass, StencilOp::Replace);
    }

    #[test]
    fn mask_changes_keep_the_pipeline_epoch() {
        let mut state = clean_state();
        let epoch = state.tracker().pipeline_epoch();
        state.stencil_mask(0x0F);
        state.stencil_func(gl::ALWAYS, 3, 0xF0);
        assert_eq!(
            state.dirty(),
            StateMask::STENCIL_STATE | StateMask::STENCIL_REFERENCE
        );
        assert_eq!(state.tracker().pipeline_epoch(), epoch);

        state.stencil_func(gl::LESS, 3, 0xF0);
        assert!(state.tracker().pipeline_epoch() > epoch);
    }

    #[test]
    fn unknown_face_or_op_is_ignored() {
        let mut state = clean_state();
        state.stencil_mask_separate(0x1234, 0xF0);
        state.stencil_op(gl::KEEP, 0x1234, gl::KEEP);
        assert_eq!(state.dirty(), StateMask::empty());
    }
}
