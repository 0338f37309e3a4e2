use std::cell::Cell;

use tracing::debug;

use super::{index_in, replace, GlState, MAX_COLOR_ATTACHMENTS};
use crate::dirty::StateMask;
use crate::gl;
use crate::handle::Handle;
use crate::types::FramebufferTarget;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FramebufferAttachment {
    pub texture: Handle,
    pub level: u32,
    pub layer: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
}

impl FramebufferStatus {
    pub const fn to_gl(self) -> u32 {
        match self {
            Self::Complete => gl::FRAMEBUFFER_COMPLETE,
            Self::IncompleteAttachment => gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            Self::MissingAttachment => gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
            Self::IncompleteDimensions => gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS,
        }
    }
}

/// Attachments of one framebuffer object. Completeness is computed on demand and cached until
/// an attachment, or the storage of an attached texture, changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramebufferRecord {
    pub color: [FramebufferAttachment; MAX_COLOR_ATTACHMENTS],
    pub depth: FramebufferAttachment,
    pub stencil: FramebufferAttachment,
    completeness: Cell<Option<FramebufferStatus>>,
}

impl FramebufferRecord {
    fn attachments(&self) -> impl Iterator<Item = &FramebufferAttachment> {
        self.color
            .iter()
            .chain([&self.depth, &self.stencil])
            .filter(|a| a.texture.is_some())
    }

    fn attachments_mut(&mut self) -> impl Iterator<Item = &mut FramebufferAttachment> {
        self.color
            .iter_mut()
            .chain([&mut self.depth, &mut self.stencil])
    }

    pub fn references(&self, texture: Handle) -> bool {
        texture.is_some() && self.attachments().any(|a| a.texture == texture)
    }

    /// Clear every attachment naming `texture`.
    pub(crate) fn detach_texture(&mut self, texture: Handle) {
        let mut changed = false;
        for attachment in self.attachments_mut() {
            if attachment.texture == texture {
                *attachment = FramebufferAttachment::default();
                changed = true;
            }
        }
        if changed {
            self.invalidate_completeness();
        }
    }

    pub(crate) fn invalidate_completeness(&self) {
        self.completeness.set(None);
    }

    pub fn cached_status(&self) -> Option<FramebufferStatus> {
        self.completeness.get()
    }
}

impl GlState {
    pub fn draw_framebuffer(&self) -> Handle {
        self.draw_framebuffer
    }

    pub fn read_framebuffer(&self) -> Handle {
        self.read_framebuffer
    }

    /// `GL_FRAMEBUFFER` binds both the draw and read framebuffer.
    pub fn bind_framebuffer(&mut self, target: u32, framebuffer: Handle) {
        let Some(target) = FramebufferTarget::from_gl(target) else {
            debug!(target, "unknown framebuffer target");
            return;
        };
        if !self.objects.framebuffers.is_bindable(framebuffer) {
            debug!(?framebuffer, "ignoring bind of unknown framebuffer");
            return;
        }
        if target != FramebufferTarget::Read {
            self.draw_framebuffer = framebuffer;
        }
        if target != FramebufferTarget::Draw {
            self.read_framebuffer = framebuffer;
        }
    }

    fn target_framebuffer(&self, target: u32) -> Option<Handle> {
        match FramebufferTarget::from_gl(target)? {
            FramebufferTarget::Framebuffer | FramebufferTarget::Draw => Some(self.draw_framebuffer),
            FramebufferTarget::Read => Some(self.read_framebuffer),
        }
    }

    pub fn framebuffer_texture(&mut self, target: u32, attachment: u32, texture: Handle, level: u32) {
        self.framebuffer_texture_layer(target, attachment, texture, level, 0);
    }

    /// Attach a texture image to the framebuffer bound to `target`. Ignored for the default
    /// framebuffer, unknown attachment points and textures that are not live.
    pub fn framebuffer_texture_layer(
        &mut self,
        target: u32,
        attachment: u32,
        texture: Handle,
        level: u32,
        layer: u32,
    ) {
        let Some(framebuffer) = self.target_framebuffer(target) else {
            return;
        };
        if !self.objects.textures.is_bindable(texture) {
            debug!(?texture, "ignoring attachment of unknown texture");
            return;
        }
        let Some(record) = self.objects.framebuffers.get_mut(framebuffer) else {
            debug!(target, "no framebuffer object bound");
            return;
        };
        let value = FramebufferAttachment {
            texture,
            level,
            layer,
        };

        let changed = match attachment {
            gl::DEPTH_ATTACHMENT => replace(&mut record.depth, value),
            gl::STENCIL_ATTACHMENT => replace(&mut record.stencil, value),
            gl::DEPTH_STENCIL_ATTACHMENT => {
                let depth = replace(&mut record.depth, value);
                replace(&mut record.stencil, value) || depth
            }
            _ => {
                let Some(i) = attachment
                    .checked_sub(gl::COLOR_ATTACHMENT0)
                    .and_then(|i| index_in(i, MAX_COLOR_ATTACHMENTS))
                else {
                    debug!(attachment, "unknown attachment point");
                    return;
                };
                replace(&mut record.color[i], value)
            }
        };
        if changed {
            record.invalidate_completeness();
        }
    }

    /// `glCheckFramebufferStatus` for the framebuffer bound to `target`. Returns 0 for an
    /// unknown target.
    pub fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.target_framebuffer(target)
            .and_then(|fb| self.framebuffer_status(fb))
            .map_or(0, FramebufferStatus::to_gl)
    }

    /// Completeness of `framebuffer`. The default framebuffer is always complete; an unknown
    /// handle yields `None`.
    pub fn framebuffer_status(&self, framebuffer: Handle) -> Option<FramebufferStatus> {
        if framebuffer.is_none() {
            return Some(FramebufferStatus::Complete);
        }
        let record = self.objects.framebuffers.get(framebuffer)?;
        if let Some(status) = record.completeness.get() {
            return Some(status);
        }
        let status = self.evaluate_completeness(record);
        record.completeness.set(Some(status));
        Some(status)
    }

    fn evaluate_completeness(&self, record: &FramebufferRecord) -> FramebufferStatus {
        let mut extent = None;
        let mut any = false;
        for attachment in record.attachments() {
            any = true;
            let Some(size) = self
                .objects
                .textures
                .get(attachment.texture)
                .filter(|t| attachment.layer < t.depth.max(1))
                .and_then(|t| t.level_extent(attachment.level))
            else {
                return FramebufferStatus::IncompleteAttachment;
            };
            match extent {
                None => extent = Some(size),
                Some(e) if e != size => return FramebufferStatus::IncompleteDimensions,
                Some(_) => {}
            }
        }
        if any {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::MissingAttachment
        }
    }

    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        let next = [r, g, b, a];
        if self.clear_values.color.map(f32::to_bits) != next.map(f32::to_bits) {
            self.clear_values.color = next;
            self.mark(StateMask::CLEAR_VALUES);
        }
    }

    pub fn clear_depth(&mut self, depth: f32) {
        if depth.is_nan() {
            return;
        }
        if replace(&mut self.clear_values.depth, depth.clamp(0.0, 1.0)) {
            self.mark(StateMask::CLEAR_VALUES);
        }
    }

    pub fn clear_stencil(&mut self, stencil: i32) {
        if replace(&mut self.clear_values.stencil, stencil) {
            self.mark(StateMask::CLEAR_VALUES);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearValues {
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: i32,
}

impl Default for ClearValues {
    fn default() -> Self {
        Self {
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state_with_framebuffer() -> (GlState, Handle) {
        let mut state = GlState::default();
        let fb = state.create_framebuffer();
        state.bind_framebuffer(gl::FRAMEBUFFER, fb);
        (state, fb)
    }

    fn texture_2d(state: &mut GlState, width: u32, height: u32) -> Handle {
        let texture = state.create_texture();
        state.bind_texture(gl::TEXTURE_2D, texture);
        state.tex_storage(gl::TEXTURE_2D, 1, width, height, 1);
        texture
    }

    #[test]
    fn empty_framebuffer_is_missing_attachments() {
        let (state, fb) = state_with_framebuffer();
        assert_eq!(state.draw_framebuffer(), fb);
        assert_eq!(state.read_framebuffer(), fb);
        assert_eq!(
            state.check_framebuffer_status(gl::DRAW_FRAMEBUFFER),
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
        );
    }

    #[test]
    fn completeness_follows_attachment_changes() {
        let (mut state, fb) = state_with_framebuffer();
        let color = texture_2d(&mut state, 64, 64);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, color, 0);
        assert_eq!(state.framebuffer_status(fb), Some(FramebufferStatus::Complete));
        assert_eq!(
            state.framebuffer(fb).and_then(FramebufferRecord::cached_status),
            Some(FramebufferStatus::Complete)
        );

        let depth = texture_2d(&mut state, 32, 32);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, depth, 0);
        assert_eq!(state.framebuffer(fb).unwrap().cached_status(), None);
        assert_eq!(
            state.framebuffer_status(fb),
            Some(FramebufferStatus::IncompleteDimensions)
        );

        state.framebuffer_texture(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, color, 3);
        assert_eq!(
            state.framebuffer_status(fb),
            Some(FramebufferStatus::IncompleteAttachment)
        );
    }

    #[test]
    fn deleting_attached_texture_invalidates() {
        let (mut state, fb) = state_with_framebuffer();
        let color = texture_2d(&mut state, 16, 16);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0 + 1, color, 0);
        assert_eq!(state.framebuffer_status(fb), Some(FramebufferStatus::Complete));

        state.delete_texture(color);
        assert!(!state.framebuffer(fb).unwrap().references(color));
        assert_eq!(
            state.framebuffer_status(fb),
            Some(FramebufferStatus::MissingAttachment)
        );
    }

    #[test]
    fn storage_change_invalidates() {
        let (mut state, fb) = state_with_framebuffer();
        let color = texture_2d(&mut state, 16, 16);
        let other = texture_2d(&mut state, 8, 8);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, color, 0);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0 + 1, other, 0);
        assert_eq!(
            state.framebuffer_status(fb),
            Some(FramebufferStatus::IncompleteDimensions)
        );

        state.tex_storage(gl::TEXTURE_2D, 1, 16, 16, 1);
        assert_eq!(state.framebuffer_status(fb), Some(FramebufferStatus::Complete));
    }

    #[test]
    fn default_framebuffer_ignores_attachments() {
        let mut state = GlState::default();
        let color = texture_2d(&mut state, 4, 4);
        state.framebuffer_texture(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, color, 0);
        assert_eq!(
            state.check_framebuffer_status(gl::FRAMEBUFFER),
            gl::FRAMEBUFFER_COMPLETE
        );
        assert_eq!(state.check_framebuffer_status(0x1234), 0);
    }

    #[test]
    fn clear_values_mark_on_change() {
        let mut state = GlState::default();
        state.tracker.clear(StateMask::all());
        state.clear_depth(1.0);
        state.clear_stencil(0);
        assert_eq!(state.dirty(), StateMask::empty());
        state.clear_color(0.1, 0.2, 0.3, 1.0);
        assert_eq!(state.dirty(), StateMask::CLEAR_VALUES);
    }
}
