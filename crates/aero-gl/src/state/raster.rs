use tracing::debug;

use super::{index_in, replace, GlState};
use crate::dirty::StateMask;
use crate::gl;
use crate::translate::sample_count;
use crate::types::{CullFace, FrontFace, PolygonMode, PrimitiveMode};

/// Largest patch size accepted by `glPatchParameteri(GL_PATCH_VERTICES, _)`.
pub const MAX_PATCH_VERTICES: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterState {
    pub rasterizer_discard: bool,
    pub polygon_mode: PolygonMode,
    pub cull_enabled: bool,
    pub cull_face: CullFace,
    pub front_face: FrontFace,
    pub depth_clamp: bool,
    pub polygon_offset_point: bool,
    pub polygon_offset_line: bool,
    pub polygon_offset_fill: bool,
    pub depth_bias_constant: f32,
    pub depth_bias_slope: f32,
    pub depth_bias_clamp: f32,
    pub line_width: f32,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            rasterizer_discard: false,
            polygon_mode: PolygonMode::Fill,
            cull_enabled: false,
            cull_face: CullFace::Back,
            front_face: FrontFace::Ccw,
            depth_clamp: false,
            polygon_offset_point: false,
            polygon_offset_line: false,
            polygon_offset_fill: false,
            depth_bias_constant: 0.0,
            depth_bias_slope: 0.0,
            depth_bias_clamp: 0.0,
            line_width: 1.0,
        }
    }
}

impl RasterState {
    /// Whether polygon offset applies to the current polygon mode. The explicit API has one
    /// depth-bias switch where the legacy API has one per mode.
    pub fn depth_bias_enabled(&self) -> bool {
        match self.polygon_mode {
            PolygonMode::Point => self.polygon_offset_point,
            PolygonMode::Line => self.polygon_offset_line,
            PolygonMode::Fill => self.polygon_offset_fill,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputAssemblyState {
    /// Primitive mode of the draw being prepared.
    pub mode: PrimitiveMode,
    pub primitive_restart: bool,
    pub primitive_restart_fixed_index: bool,
    pub patch_control_points: u32,
}

impl Default for InputAssemblyState {
    fn default() -> Self {
        Self {
            mode: PrimitiveMode::Triangles,
            primitive_restart: false,
            primitive_restart_fixed_index: false,
            patch_control_points: 3,
        }
    }
}

impl InputAssemblyState {
    /// The explicit API restarts at the all-ones index only, so either legacy switch enables it.
    pub fn restart_enabled(&self) -> bool {
        self.primitive_restart || self.primitive_restart_fixed_index
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultisampleState {
    /// `GL_MULTISAMPLE`. Tracked for queries; the sample count alone decides rasterization.
    pub enabled: bool,
    pub samples: u32,
    pub sample_shading: bool,
    pub min_sample_shading: f32,
    pub sample_mask_enabled: bool,
    pub sample_mask: u32,
    pub alpha_to_coverage: bool,
    pub alpha_to_one: bool,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 1,
            sample_shading: false,
            min_sample_shading: 0.0,
            sample_mask_enabled: false,
            sample_mask: u32::MAX,
            alpha_to_coverage: false,
            alpha_to_one: false,
        }
    }
}

impl MultisampleState {
    /// The coverage mask the pipeline sees: all ones unless `GL_SAMPLE_MASK` is enabled.
    pub fn effective_sample_mask(&self) -> u32 {
        if self.sample_mask_enabled {
            self.sample_mask
        } else {
            u32::MAX
        }
    }
}

impl GlState {
    /// Only `GL_FRONT_AND_BACK` is accepted; the explicit API has one polygon mode.
    pub fn polygon_mode(&mut self, face: u32, mode: u32) {
        if face != gl::FRONT_AND_BACK {
            debug!(face, "ignoring single-face polygon mode");
            return;
        }
        let Some(mode) = PolygonMode::from_gl(mode) else {
            debug!(mode, "unknown polygon mode");
            return;
        };
        let offset_enabled = self.raster.depth_bias_enabled();
        if replace(&mut self.raster.polygon_mode, mode) {
            let mut mask = StateMask::POLYGON_MODE;
            if self.raster.depth_bias_enabled() != offset_enabled {
                mask |= StateMask::DEPTH_BIAS;
            }
            self.mark(mask);
        }
    }

    pub fn cull_face(&mut self, face: u32) {
        let Some(face) = CullFace::from_gl(face) else {
            debug!(face, "unknown cull face");
            return;
        };
        if replace(&mut self.raster.cull_face, face) {
            self.mark(StateMask::CULL_STATE);
        }
    }

    pub fn front_face(&mut self, face: u32) {
        let Some(face) = FrontFace::from_gl(face) else {
            debug!(face, "unknown front face");
            return;
        };
        if replace(&mut self.raster.front_face, face) {
            self.mark(StateMask::FRONT_FACE);
        }
    }

    /// Widths that are not finite and positive are ignored.
    pub fn line_width(&mut self, width: f32) {
        if !(width.is_finite() && width > 0.0) {
            debug!(width, "ignoring invalid line width");
            return;
        }
        if replace(&mut self.raster.line_width, width) {
            self.mark(StateMask::LINE_WIDTH);
        }
    }

    pub fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.polygon_offset_clamp(factor, units, 0.0);
    }

    pub fn polygon_offset_clamp(&mut self, factor: f32, units: f32, clamp: f32) {
        if !(factor.is_finite() && units.is_finite() && clamp.is_finite()) {
            return;
        }
        let raster = &mut self.raster;
        let changed = replace(&mut raster.depth_bias_slope, factor)
            | replace(&mut raster.depth_bias_constant, units)
            | replace(&mut raster.depth_bias_clamp, clamp);
        if changed {
            // Only the enable is hashed; the factors are set per draw.
            self.mark_dynamic(StateMask::DEPTH_BIAS);
        }
    }

    /// Record the primitive mode of the next draw.
    pub fn set_primitive_mode(&mut self, mode: u32) {
        let Some(mode) = PrimitiveMode::from_gl(mode) else {
            debug!(mode, "unknown primitive mode");
            return;
        };
        let was_patches = self.input_assembly.mode == PrimitiveMode::Patches;
        if replace(&mut self.input_assembly.mode, mode) {
            let mut mask = StateMask::PRIMITIVE_TOPOLOGY;
            if was_patches != (mode == PrimitiveMode::Patches) {
                mask |= StateMask::PATCH_CONTROL_POINTS;
            }
            self.mark(mask);
        }
    }

    /// `glPatchParameteri`. Only `GL_PATCH_VERTICES` with a count in `1..=32` is accepted.
    pub fn patch_parameter_i(&mut self, pname: u32, value: u32) {
        if pname != gl::PATCH_VERTICES || !(1..=MAX_PATCH_VERTICES).contains(&value) {
            debug!(pname, value, "ignoring patch parameter");
            return;
        }
        if replace(&mut self.input_assembly.patch_control_points, value) {
            self.mark(StateMask::PATCH_CONTROL_POINTS);
        }
    }

    pub fn min_sample_shading(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        if replace(&mut self.multisample.min_sample_shading, value.clamp(0.0, 1.0)) {
            self.mark(StateMask::SAMPLE_STATE);
        }
    }

    /// `glSampleMaski`. Only mask word 0 exists; no supported sample count needs more.
    pub fn sample_mask_i(&mut self, index: u32, mask: u32) {
        if index_in(index, 1).is_none() {
            return;
        }
        if replace(&mut self.multisample.sample_mask, mask) {
            self.mark(StateMask::SAMPLE_MASK);
        }
    }

    /// Sample count of the render target the next draw goes to. Counts that are not a power of
    /// two the explicit API supports are ignored.
    pub fn set_sample_count(&mut self, samples: u32) {
        if !samples.is_power_of_two() || sample_count(samples).is_none() {
            debug!(samples, "unsupported sample count");
            return;
        }
        if replace(&mut self.multisample.samples, samples) {
            self.mark(StateMask::SAMPLE_STATE);
        }
    }
}
