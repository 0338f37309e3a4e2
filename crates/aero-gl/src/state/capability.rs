use tracing::debug;

use super::{replace, GlState};
use crate::dirty::StateMask;
use crate::types::Capability;

impl GlState {
    pub fn enable(&mut self, cap: u32) {
        self.set_capability(cap, true);
    }

    pub fn disable(&mut self, cap: u32) {
        self.set_capability(cap, false);
    }

    pub fn enable_i(&mut self, cap: u32, index: u32) {
        self.set_capability_indexed(cap, index, true);
    }

    pub fn disable_i(&mut self, cap: u32, index: u32) {
        self.set_capability_indexed(cap, index, false);
    }

    /// `glEnable` / `glDisable`. Each switch lands in the setter that owns its category.
    pub fn set_capability(&mut self, cap: u32, enabled: bool) {
        let Some(cap) = Capability::from_gl(cap) else {
            debug!(cap, enabled, "unknown capability");
            return;
        };
        match cap {
            Capability::Blend => self.set_blend_enabled(None, enabled),
            Capability::ScissorTest => self.set_scissor_test(None, enabled),
            Capability::CullFace => {
                if replace(&mut self.raster.cull_enabled, enabled) {
                    self.mark(StateMask::CULL_STATE);
                }
            }
            Capability::DepthTest => self.set_depth_test_enabled(enabled),
            Capability::DepthBoundsTest => self.set_depth_bounds_test_enabled(enabled),
            Capability::StencilTest => self.set_stencil_test_enabled(enabled),
            Capability::ColorLogicOp => self.set_logic_op_enabled(enabled),
            Capability::PolygonOffsetPoint => {
                self.set_flag(|s| &mut s.raster.polygon_offset_point, enabled, StateMask::DEPTH_BIAS)
            }
            Capability::PolygonOffsetLine => {
                self.set_flag(|s| &mut s.raster.polygon_offset_line, enabled, StateMask::DEPTH_BIAS)
            }
            Capability::PolygonOffsetFill => {
                self.set_flag(|s| &mut s.raster.polygon_offset_fill, enabled, StateMask::DEPTH_BIAS)
            }
            Capability::Multisample => {
                self.set_flag(|s| &mut s.multisample.enabled, enabled, StateMask::SAMPLE_STATE)
            }
            Capability::SampleAlphaToCoverage => self.set_flag(
                |s| &mut s.multisample.alpha_to_coverage,
                enabled,
                StateMask::SAMPLE_STATE,
            ),
            Capability::SampleAlphaToOne => self.set_flag(
                |s| &mut s.multisample.alpha_to_one,
                enabled,
                StateMask::SAMPLE_STATE,
            ),
            Capability::SampleShading => self.set_flag(
                |s| &mut s.multisample.sample_shading,
                enabled,
                StateMask::SAMPLE_STATE,
            ),
            Capability::SampleMask => self.set_flag(
                |s| &mut s.multisample.sample_mask_enabled,
                enabled,
                StateMask::SAMPLE_MASK,
            ),
            Capability::DepthClamp => {
                self.set_flag(|s| &mut s.raster.depth_clamp, enabled, StateMask::DEPTH_CLAMP)
            }
            Capability::RasterizerDiscard => self.set_flag(
                |s| &mut s.raster.rasterizer_discard,
                enabled,
                StateMask::RASTERIZER_DISCARD,
            ),
            Capability::PrimitiveRestart => self.set_flag(
                |s| &mut s.input_assembly.primitive_restart,
                enabled,
                StateMask::PRIMITIVE_RESTART,
            ),
            Capability::PrimitiveRestartFixedIndex => self.set_flag(
                |s| &mut s.input_assembly.primitive_restart_fixed_index,
                enabled,
                StateMask::PRIMITIVE_RESTART,
            ),
        }
    }

    /// `glEnablei` / `glDisablei`. Only blending and the scissor test have indexed forms.
    pub fn set_capability_indexed(&mut self, cap: u32, index: u32, enabled: bool) {
        match Capability::from_gl(cap) {
            Some(Capability::Blend) => self.set_blend_enabled(Some(index), enabled),
            Some(Capability::ScissorTest) => self.set_scissor_test(Some(index), enabled),
            _ => debug!(cap, index, enabled, "capability has no indexed form"),
        }
    }

    pub fn is_enabled(&self, cap: u32) -> bool {
        let Some(cap) = Capability::from_gl(cap) else {
            return false;
        };
        match cap {
            Capability::Blend => self.blend.attachments[0].enabled,
            Capability::ScissorTest => self.viewports.scissor_test[0],
            Capability::CullFace => self.raster.cull_enabled,
            Capability::DepthTest => self.depth.test_enabled,
            Capability::DepthBoundsTest => self.depth.bounds_test_enabled,
            Capability::StencilTest => self.stencil.enabled,
            Capability::ColorLogicOp => self.blend.logic_op_enabled,
            Capability::PolygonOffsetPoint => self.raster.polygon_offset_point,
            Capability::PolygonOffsetLine => self.raster.polygon_offset_line,
            Capability::PolygonOffsetFill => self.raster.polygon_offset_fill,
            Capability::Multisample => self.multisample.enabled,
            Capability::SampleAlphaToCoverage => self.multisample.alpha_to_coverage,
            Capability::SampleAlphaToOne => self.multisample.alpha_to_one,
            Capability::SampleShading => self.multisample.sample_shading,
            Capability::SampleMask => self.multisample.sample_mask_enabled,
            Capability::DepthClamp => self.raster.depth_clamp,
            Capability::RasterizerDiscard => self.raster.rasterizer_discard,
            Capability::PrimitiveRestart => self.input_assembly.primitive_restart,
            Capability::PrimitiveRestartFixedIndex => {
                self.input_assembly.primitive_restart_fixed_index
            }
        }
    }

    pub fn is_enabled_i(&self, cap: u32, index: u32) -> bool {
        let index = index as usize;
        match Capability::from_gl(cap) {
            Some(Capability::Blend) => self.blend.attachments.get(index).is_some_and(|a| a.enabled),
            Some(Capability::ScissorTest) => {
                self.viewports.scissor_test.get(index).copied().unwrap_or(false)
            }
            _ => false,
        }
    }

    fn set_flag(&mut self, field: impl FnOnce(&mut Self) -> &mut bool, enabled: bool, mask: StateMask) {
        if replace(field(self), enabled) {
            self.mark(mask);
        }
    }
}
