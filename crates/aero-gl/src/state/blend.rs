use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use super::{index_in, replace, GlState, MAX_COLOR_ATTACHMENTS};
use crate::dirty::StateMask;
use crate::types::{BlendFactor, BlendOp, LogicOp};

/// Blend configuration of one color attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentBlendState {
    pub enabled: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub color_op: BlendOp,
    pub alpha_op: BlendOp,
    /// RGBA in bits 0..4.
    pub write_mask: u8,
}

impl Default for AttachmentBlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::Zero,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            color_op: BlendOp::Add,
            alpha_op: BlendOp::Add,
            write_mask: 0xF,
        }
    }
}

impl AttachmentBlendState {
    /// Hash of the blend equation. Zero when blending is disabled and never zero otherwise, so a
    /// disabled attachment cannot collide with an enabled one.
    ///
    /// The write mask is excluded; it is hashed separately.
    pub fn blend_hash(&self) -> u64 {
        if !self.enabled {
            return 0;
        }
        let mut bytes = [0u8; 28];
        let words = [
            1,
            self.src_color.to_gl(),
            self.dst_color.to_gl(),
            self.src_alpha.to_gl(),
            self.dst_alpha.to_gl(),
            self.color_op.to_gl(),
            self.alpha_op.to_gl(),
        ];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        match xxh3_64(&bytes) {
            0 => 1,
            h => h,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendState {
    pub attachments: [AttachmentBlendState; MAX_COLOR_ATTACHMENTS],
    pub constants: [f32; 4],
    pub logic_op_enabled: bool,
    pub logic_op: LogicOp,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            attachments: [AttachmentBlendState::default(); MAX_COLOR_ATTACHMENTS],
            constants: [0.0; 4],
            logic_op_enabled: false,
            logic_op: LogicOp::Copy,
        }
    }
}

impl GlState {
    /// Apply `f` to one attachment (`Some(index)`) or to all of them (`None`), marking `mask`
    /// if any attachment changed. Out-of-range indices are ignored.
    fn modify_attachments(
        &mut self,
        index: Option<u32>,
        mask: StateMask,
        f: impl Fn(&mut AttachmentBlendState),
    ) {
        let range = match index {
            None => 0..MAX_COLOR_ATTACHMENTS,
            Some(index) => match index_in(index, MAX_COLOR_ATTACHMENTS) {
                Some(i) => i..i + 1,
                None => {
                    debug!(index, "ignoring out-of-range color attachment");
                    return;
                }
            },
        };
        let mut changed = false;
        for attachment in &mut self.blend.attachments[range] {
            let mut next = *attachment;
            f(&mut next);
            changed |= replace(attachment, next);
        }
        if changed {
            self.mark(mask);
        }
    }

    pub(crate) fn set_blend_enabled(&mut self, index: Option<u32>, enabled: bool) {
        self.modify_attachments(index, StateMask::BLEND_STATE, |a| a.enabled = enabled);
    }

    fn blend_factors(
        &mut self,
        index: Option<u32>,
        src_color: u32,
        dst_color: u32,
        src_alpha: u32,
        dst_alpha: u32,
    ) {
        let (Some(src_color), Some(dst_color), Some(src_alpha), Some(dst_alpha)) = (
            BlendFactor::from_gl(src_color),
            BlendFactor::from_gl(dst_color),
            BlendFactor::from_gl(src_alpha),
            BlendFactor::from_gl(dst_alpha),
        ) else {
            debug!(src_color, dst_color, src_alpha, dst_alpha, "unknown blend factor");
            return;
        };
        self.modify_attachments(index, StateMask::BLEND_STATE, |a| {
            a.src_color = src_color;
            a.dst_color = dst_color;
            a.src_alpha = src_alpha;
            a.dst_alpha = dst_alpha;
        });
    }

    fn blend_equations(&mut self, index: Option<u32>, color: u32, alpha: u32) {
        let (Some(color), Some(alpha)) = (BlendOp::from_gl(color), BlendOp::from_gl(alpha)) else {
            debug!(color, alpha, "unknown blend equation");
            return;
        };
        self.modify_attachments(index, StateMask::BLEND_STATE, |a| {
            a.color_op = color;
            a.alpha_op = alpha;
        });
    }

    pub fn blend_func(&mut self, src: u32, dst: u32) {
        self.blend_factors(None, src, dst, src, dst);
    }

    pub fn blend_func_i(&mut self, index: u32, src: u32, dst: u32) {
        self.blend_factors(Some(index), src, dst, src, dst);
    }

    pub fn blend_func_separate(
        &mut self,
        src_color: u32,
        dst_color: u32,
        src_alpha: u32,
        dst_alpha: u32,
    ) {
        self.blend_factors(None, src_color, dst_color, src_alpha, dst_alpha);
    }

    pub fn blend_func_separate_i(
        &mut self,
        index: u32,
        src_color: u32,
        dst_color: u32,
        src_alpha: u32,
        dst_alpha: u32,
    ) {
        self.blend_factors(Some(index), src_color, dst_color, src_alpha, dst_alpha);
    }

    pub fn blend_equation(&mut self, mode: u32) {
        self.blend_equations(None, mode, mode);
    }

    pub fn blend_equation_i(&mut self, index: u32, mode: u32) {
        self.blend_equations(Some(index), mode, mode);
    }

    pub fn blend_equation_separate(&mut self, color: u32, alpha: u32) {
        self.blend_equations(None, color, alpha);
    }

    pub fn blend_equation_separate_i(&mut self, index: u32, color: u32, alpha: u32) {
        self.blend_equations(Some(index), color, alpha);
    }

    pub fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        let mask = pack_color_mask(r, g, b, a);
        self.modify_attachments(None, StateMask::COLOR_MASK, |at| at.write_mask = mask);
    }

    pub fn color_mask_i(&mut self, index: u32, r: bool, g: bool, b: bool, a: bool) {
        let mask = pack_color_mask(r, g, b, a);
        self.modify_attachments(Some(index), StateMask::COLOR_MASK, |at| at.write_mask = mask);
    }

    pub fn blend_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        let next = [r, g, b, a];
        // Compare bit patterns so a NaN component does not mark on every call.
        if self.blend.constants.map(f32::to_bits) == next.map(f32::to_bits) {
            return;
        }
        self.blend.constants = next;
        self.mark(StateMask::BLEND_CONSTANTS);
    }

    pub fn logic_op(&mut self, op: u32) {
        let Some(op) = LogicOp::from_gl(op) else {
            debug!(op, "unknown logic op");
            return;
        };
        if replace(&mut self.blend.logic_op, op) {
            self.mark(StateMask::LOGIC_OP);
        }
    }

    pub(crate) fn set_logic_op_enabled(&mut self, enabled: bool) {
        if replace(&mut self.blend.logic_op_enabled, enabled) {
            self.mark(StateMask::LOGIC_OP);
        }
    }
}

fn pack_color_mask(r: bool, g: bool, b: bool, a: bool) -> u8 {
    u8::from(r) | u8::from(g) << 1 | u8::from(b) << 2 | u8::from(a) << 3
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
    fn enabling_one_attachment_hashes_only_that_attachment() {
        let mut state = clean_state();
        state.enable_i(gl::BLEND, 2);
        state.blend_func_i(2, gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);

        assert!(state.is_dirty(StateMask::BLEND_STATE));
        assert_eq!(state.blend().attachments[0].blend_hash(), 0);

        let expected = AttachmentBlendState {
            enabled: true,
            src_color: BlendFactor::SrcAlpha,
            dst_color: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::SrcAlpha,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            ..AttachmentBlendState::default()
        };
        let hash = state.blend().attachments[2].blend_hash();
        assert_ne!(hash, 0);
        assert_eq!(hash, expected.blend_hash());
    }

    #[test]
    fn write_mask_is_not_part_of_blend_hash() {
        let a = AttachmentBlendState {
            enabled: true,
            ..AttachmentBlendState::default()
        };
        let b = AttachmentBlendState {
            write_mask: 0b0101,
            ..a
        };
        assert_eq!(a.blend_hash(), b.blend_hash());
    }

    #[test]
    fn unknown_factor_is_ignored() {
        let mut state = clean_state();
        state.blend_func(0xDEAD, gl::ONE);
        assert_eq!(state.dirty(), StateMask::empty());
        assert_eq!(state.blend(), &BlendState::default());
    }

    #[test]
    fn out_of_range_attachment_is_ignored() {
        let mut state = clean_state();
        state.blend_equation_i(MAX_COLOR_ATTACHMENTS as u32, gl::MIN);
        state.color_mask_i(9, false, false, false, false);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    fn color_mask_marks_its_own_category() {
        let mut state = clean_state();
        state.color_mask(true, false, true, false);
        assert_eq!(state.dirty(), StateMask::COLOR_MASK);
        assert!(state
            .blend()
            .attachments
            .iter()
            .all(|a| a.write_mask == 0b0101));

        state.tracker.clear(StateMask::all());
        state.color_mask(true, false, true, false);
        assert_eq!(state.dirty(), StateMask::empty());
    }

    #[test]
    fn blend_color_and_logic_op() {
        let mut state = clean_state();
        state.blend_color(0.25, 0.5, 0.75, 1.0);
        assert_eq!(state.dirty(), StateMask::BLEND_CONSTANTS);

        state.tracker.clear(StateMask::all());
        state.blend_color(0.25, 0.5, 0.75, 1.0);
        state.logic_op(gl::COPY);
        assert_eq!(state.dirty(), StateMask::empty());

        state.logic_op(gl::XOR);
        assert_eq!(state.dirty(), StateMask::LOGIC_OP);
        assert_eq!(state.blend().logic_op, LogicOp::Xor);
    }
}
