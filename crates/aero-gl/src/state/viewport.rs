use ash::vk;
use tracing::debug;

use super::{index_in, replace, GlState, MAX_VIEWPORTS};
use crate::dirty::StateMask;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    const INITIAL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        min_depth: 0.0,
        max_depth: 1.0,
    };
}

impl From<Viewport> for vk::Viewport {
    fn from(vp: Viewport) -> Self {
        vk::Viewport {
            x: vp.x,
            y: vp.y,
            width: vp.width,
            height: vp.height,
            min_depth: vp.min_depth,
            max_depth: vp.max_depth,
        }
    }
}

impl From<vk::Viewport> for Viewport {
    fn from(vp: vk::Viewport) -> Self {
        Viewport {
            x: vp.x,
            y: vp.y,
            width: vp.width,
            height: vp.height,
            min_depth: vp.min_depth,
            max_depth: vp.max_depth,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<ScissorRect> for vk::Rect2D {
    fn from(rect: ScissorRect) -> Self {
        vk::Rect2D {
            offset: vk::Offset2D {
                x: rect.x,
                y: rect.y,
            },
            extent: vk::Extent2D {
                width: rect.width,
                height: rect.height,
            },
        }
    }
}

impl From<vk::Rect2D> for ScissorRect {
    fn from(rect: vk::Rect2D) -> Self {
        ScissorRect {
            x: rect.offset.x,
            y: rect.offset.y,
            width: rect.extent.width,
            height: rect.extent.height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub viewports: [Viewport; MAX_VIEWPORTS],
    pub scissors: [ScissorRect; MAX_VIEWPORTS],
    pub scissor_test: [bool; MAX_VIEWPORTS],
    /// Number of viewports the pipeline declares. Starts at 1 and grows with indexed setters.
    pub count: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            viewports: [Viewport::INITIAL; MAX_VIEWPORTS],
            scissors: [ScissorRect::default(); MAX_VIEWPORTS],
            scissor_test: [false; MAX_VIEWPORTS],
            count: 1,
        }
    }
}

impl ViewportState {
    /// The scissor rectangle a draw uses for viewport `index`. With the scissor test off that is
    /// the viewport rectangle itself.
    pub fn effective_scissor(&self, index: usize) -> Option<ScissorRect> {
        if self.scissor_test.get(index).copied()? {
            return self.scissors.get(index).copied();
        }
        let vp = self.viewports.get(index)?;
        Some(ScissorRect {
            x: vp.x.floor() as i32,
            y: vp.y.floor() as i32,
            width: vp.width.max(0.0) as u32,
            height: vp.height.max(0.0) as u32,
        })
    }

    pub fn active_viewports(&self) -> &[Viewport] {
        &self.viewports[..self.count as usize]
    }

    pub fn effective_scissors(&self) -> impl Iterator<Item = ScissorRect> + '_ {
        (0..self.count as usize).filter_map(|i| self.effective_scissor(i))
    }
}

impl GlState {
    pub fn viewport_count(&self) -> u32 {
        self.viewports.count
    }

    /// Apply `f` to one viewport or to all, marking `VIEWPORT` on change plus `SCISSOR` for any
    /// changed index whose effective scissor follows the viewport.
    fn update_viewports(&mut self, index: Option<u32>, f: impl Fn(&mut Viewport)) {
        let range = match index {
            None => 0..MAX_VIEWPORTS,
            Some(index) => match index_in(index, MAX_VIEWPORTS) {
                Some(i) => i..i + 1,
                None => {
                    debug!(index, "ignoring out-of-range viewport");
                    return;
                }
            },
        };
        let mut mask = StateMask::empty();
        for i in range.clone() {
            let mut next = self.viewports.viewports[i];
            f(&mut next);
            if replace(&mut self.viewports.viewports[i], next) {
                mask |= StateMask::VIEWPORT;
                if !self.viewports.scissor_test[i] {
                    mask |= StateMask::SCISSOR;
                }
            }
        }
        if index.is_some() {
            mask |= self.grow_viewport_count(range.end);
        }
        self.mark(mask);
    }

    fn grow_viewport_count(&mut self, count: usize) -> StateMask {
        let count = count as u32;
        if count > self.viewports.count {
            self.viewports.count = count;
            StateMask::VIEWPORT | StateMask::SCISSOR
        } else {
            StateMask::empty()
        }
    }

    /// `glViewport`: sets every viewport. Negative sizes are ignored.
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width < 0 || height < 0 {
            debug!(width, height, "ignoring negative viewport size");
            return;
        }
        self.update_viewports(None, |vp| {
            vp.x = x as f32;
            vp.y = y as f32;
            vp.width = width as f32;
            vp.height = height as f32;
        });
    }

    pub fn viewport_indexed(&mut self, index: u32, x: f32, y: f32, width: f32, height: f32) {
        if !(width >= 0.0 && height >= 0.0) || !x.is_finite() || !y.is_finite() {
            return;
        }
        self.update_viewports(Some(index), |vp| {
            vp.x = x;
            vp.y = y;
            vp.width = width;
            vp.height = height;
        });
    }

    /// `glDepthRange`: sets every viewport. Values are clamped to `[0, 1]`.
    pub fn depth_range(&mut self, near: f32, far: f32) {
        if near.is_nan() || far.is_nan() {
            return;
        }
        let (near, far) = (near.clamp(0.0, 1.0), far.clamp(0.0, 1.0));
        self.update_viewports(None, |vp| {
            vp.min_depth = near;
            vp.max_depth = far;
        });
    }

    pub fn depth_range_indexed(&mut self, index: u32, near: f32, far: f32) {
        if near.is_nan() || far.is_nan() {
            return;
        }
        let (near, far) = (near.clamp(0.0, 1.0), far.clamp(0.0, 1.0));
        self.update_viewports(Some(index), |vp| {
            vp.min_depth = near;
            vp.max_depth = far;
        });
    }

    /// `glScissor`: sets every scissor rectangle. Negative sizes are ignored.
    pub fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            debug!(width, height, "ignoring negative scissor size");
            return;
        };
        let rect = ScissorRect {
            x,
            y,
            width,
            height,
        };
        let mut changed = false;
        for slot in &mut self.viewports.scissors {
            changed |= replace(slot, rect);
        }
        if changed {
            self.mark(StateMask::SCISSOR);
        }
    }

    pub fn scissor_indexed(&mut self, index: u32, x: i32, y: i32, width: i32, height: i32) {
        let Some(i) = index_in(index, MAX_VIEWPORTS) else {
            return;
        };
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return;
        };
        let rect = ScissorRect {
            x,
            y,
            width,
            height,
        };
        let mut mask = StateMask::empty();
        if replace(&mut self.viewports.scissors[i], rect) {
            mask |= StateMask::SCISSOR;
        }
        mask |= self.grow_viewport_count(i + 1);
        self.mark(mask);
    }

    pub(crate) fn set_scissor_test(&mut self, index: Option<u32>, enabled: bool) {
        let range = match index {
            None => 0..MAX_VIEWPORTS,
            Some(index) => match index_in(index, MAX_VIEWPORTS) {
                Some(i) => i..i + 1,
                None => return,
            },
        };
        let mut changed = false;
        for slot in &mut self.viewports.scissor_test[range] {
            changed |= replace(slot, enabled);
        }
        if changed {
            self.mark(StateMask::SCISSOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gl;

    fn clean_state() -> GlState {
        let state = GlState::default();
        state.tracker.clear(StateMask::all());
        state
    }

    #[test]
    fn viewport_follows_into_scissor_when_test_disabled() {
        let mut state = clean_state();
        state.viewport(0, 0, 1920, 1080);
        assert_eq!(state.dirty(), StateMask::VIEWPORT | StateMask::SCISSOR);
        assert_eq!(
            state.viewports().effective_scissor(0),
            Some(ScissorRect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080
            })
        );
    }

    #[test]
    fn viewport_leaves_scissor_alone_when_test_enabled() {
        let mut state = clean_state();
        state.enable(gl::SCISSOR_TEST);
        state.tracker.clear(StateMask::all());
        state.viewport(0, 0, 640, 480);
        assert_eq!(state.dirty(), StateMask::VIEWPORT);
        assert_eq!(state.viewports().effective_scissor(0), Some(ScissorRect::default()));
    }

    #[test]
    fn indexed_viewport_grows_count() {
        let mut state = clean_state();
        assert_eq!(state.viewport_count(), 1);
        state.viewport_indexed(3, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(state.viewport_count(), 4);
        assert_eq!(state.dirty(), StateMask::VIEWPORT | StateMask::SCISSOR);

        state.tracker.clear(StateMask::all());
        state.viewport_indexed(1, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(state.viewport_count(), 4);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    fn out_of_range_and_negative_are_ignored() {
        let mut state = clean_state();
        state.viewport_indexed(MAX_VIEWPORTS as u32, 0.0, 0.0, 8.0, 8.0);
        state.viewport(0, 0, -1, 4);
        state.scissor(0, 0, 4, -4);
        state.depth_range_indexed(99, 0.0, 1.0);
        assert_eq!(state.dirty(), StateMask::empty());
        assert_eq!(state.viewport_count(), 1);
    }

    #[test]
    fn depth_range_clamps() {
        let mut state = clean_state();
        state.depth_range(-1.0, 2.0);
        assert_eq!(state.dirty(), StateMask::empty());
        state.depth_range(0.25, 0.75);
        assert!(state.is_dirty(StateMask::VIEWPORT));
        assert!(state
            .viewports()
            .viewports
            .iter()
            .all(|vp| vp.min_depth == 0.25 && vp.max_depth == 0.75));
    }

    #[test]
    fn scissor_indexed_sets_one_rect() {
        let mut state = clean_state();
        state.scissor_indexed(1, 4, 4, 16, 16);
        assert_eq!(state.dirty(), StateMask::SCISSOR | StateMask::VIEWPORT);
        assert_eq!(state.viewports().scissors[0], ScissorRect::default());
        assert_eq!(state.viewports().scissors[1].width, 16);
    }
}
