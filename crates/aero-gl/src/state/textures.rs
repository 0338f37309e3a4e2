use tracing::debug;

use super::{index_in, replace, GlState, MAX_TEXTURE_UNITS};
use crate::dirty::StateMask;
use crate::gl;
use crate::handle::Handle;
use crate::types::{CompareFunc, CompareMode, MagFilter, MinFilter, TextureTarget, WrapMode};

/// Sampling parameters, shared by texture objects and sampler objects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerParams {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub max_anisotropy: f32,
    pub compare_mode: CompareMode,
    pub compare_func: CompareFunc,
    pub border_color: [f32; 4],
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            min_filter: MinFilter::NearestMipmapLinear,
            mag_filter: MagFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            min_lod: -1000.0,
            max_lod: 1000.0,
            lod_bias: 0.0,
            max_anisotropy: 1.0,
            compare_mode: CompareMode::None,
            compare_func: CompareFunc::LessEqual,
            border_color: [0.0; 4],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ParamValue {
    Int(i32),
    Float(f32),
    Vec4([f32; 4]),
}

impl ParamValue {
    fn as_enum(self) -> Option<u32> {
        match self {
            Self::Int(v) => u32::try_from(v).ok(),
            Self::Float(v) if v >= 0.0 && v.fract() == 0.0 => Some(v as u32),
            _ => None,
        }
    }

    fn as_f32(self) -> Option<f32> {
        let v = match self {
            Self::Int(v) => v as f32,
            Self::Float(v) => v,
            Self::Vec4(_) => return None,
        };
        (!v.is_nan()).then_some(v)
    }
}

impl SamplerParams {
    /// Apply one `glTexParameter*` / `glSamplerParameter*` call. Returns whether a field
    /// changed; unknown names and values change nothing.
    pub(crate) fn apply(&mut self, pname: u32, value: ParamValue) -> bool {
        match pname {
            gl::TEXTURE_MIN_FILTER => value
                .as_enum()
                .and_then(MinFilter::from_gl)
                .is_some_and(|f| replace(&mut self.min_filter, f)),
            gl::TEXTURE_MAG_FILTER => value
                .as_enum()
                .and_then(MagFilter::from_gl)
                .is_some_and(|f| replace(&mut self.mag_filter, f)),
            gl::TEXTURE_WRAP_S => value
                .as_enum()
                .and_then(WrapMode::from_gl)
                .is_some_and(|m| replace(&mut self.wrap_s, m)),
            gl::TEXTURE_WRAP_T => value
                .as_enum()
                .and_then(WrapMode::from_gl)
                .is_some_and(|m| replace(&mut self.wrap_t, m)),
            gl::TEXTURE_WRAP_R => value
                .as_enum()
                .and_then(WrapMode::from_gl)
                .is_some_and(|m| replace(&mut self.wrap_r, m)),
            gl::TEXTURE_COMPARE_MODE => value
                .as_enum()
                .and_then(CompareMode::from_gl)
                .is_some_and(|m| replace(&mut self.compare_mode, m)),
            gl::TEXTURE_COMPARE_FUNC => value
                .as_enum()
                .and_then(CompareFunc::from_gl)
                .is_some_and(|f| replace(&mut self.compare_func, f)),
            gl::TEXTURE_MIN_LOD => value.as_f32().is_some_and(|v| replace(&mut self.min_lod, v)),
            gl::TEXTURE_MAX_LOD => value.as_f32().is_some_and(|v| replace(&mut self.max_lod, v)),
            gl::TEXTURE_LOD_BIAS => value
                .as_f32()
                .is_some_and(|v| replace(&mut self.lod_bias, v)),
            gl::TEXTURE_MAX_ANISOTROPY => value
                .as_f32()
                .filter(|v| *v >= 1.0)
                .is_some_and(|v| replace(&mut self.max_anisotropy, v)),
            gl::TEXTURE_BORDER_COLOR => match value {
                ParamValue::Vec4(rgba) if rgba.iter().all(|c| !c.is_nan()) => {
                    replace(&mut self.border_color, rgba)
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureRecord {
    /// Fixed by the first bind; later binds to another target are rejected.
    pub target: Option<TextureTarget>,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub levels: u32,
    pub params: SamplerParams,
}

impl TextureRecord {
    pub fn has_storage(&self) -> bool {
        self.width > 0 && self.height > 0 && self.levels > 0
    }

    /// Size of mip `level`, or `None` past the last level.
    pub fn level_extent(&self, level: u32) -> Option<(u32, u32)> {
        (self.has_storage() && level < self.levels)
            .then(|| ((self.width >> level).max(1), (self.height >> level).max(1)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplerRecord {
    pub params: SamplerParams,
}

/// One texture image unit: a texture per target plus an optional sampler object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureUnit {
    pub textures: [Handle; TextureTarget::COUNT],
    pub sampler: Handle,
}

impl TextureUnit {
    pub fn texture(&self, target: TextureTarget) -> Handle {
        self.textures[target.slot()]
    }
}

impl GlState {
    /// `glActiveTexture`; takes `GL_TEXTURE0 + unit`.
    pub fn active_texture(&mut self, texture: u32) {
        match texture
            .checked_sub(gl::TEXTURE0)
            .and_then(|unit| index_in(unit, MAX_TEXTURE_UNITS))
        {
            Some(unit) => self.active_texture_unit = unit,
            None => debug!(texture, "ignoring out-of-range texture unit"),
        }
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.active_texture_unit as u32
    }

    pub fn texture_unit(&self, unit: u32) -> Option<&TextureUnit> {
        index_in(unit, MAX_TEXTURE_UNITS).map(|i| &self.texture_units[i])
    }

    pub fn texture_units(&self) -> &[TextureUnit; MAX_TEXTURE_UNITS] {
        &self.texture_units
    }

    pub fn bind_texture(&mut self, target: u32, texture: Handle) {
        let Some(target) = TextureTarget::from_gl(target) else {
            debug!(target, "unknown texture target");
            return;
        };
        if texture.is_some() {
            let Some(record) = self.objects.textures.get_mut(texture) else {
                return;
            };
            match record.target {
                None => record.target = Some(target),
                Some(existing) if existing != target => {
                    debug!(?texture, ?existing, ?target, "texture bound to a second target");
                    return;
                }
                Some(_) => {}
            }
        }

        let unit = &mut self.texture_units[self.active_texture_unit];
        if replace(&mut unit.textures[target.slot()], texture) {
            self.mark(StateMask::TEXTURE_BINDINGS);
        }
    }

    pub fn bind_sampler(&mut self, unit: u32, sampler: Handle) {
        let Some(unit) = index_in(unit, MAX_TEXTURE_UNITS) else {
            return;
        };
        if !self.objects.samplers.is_bindable(sampler) {
            return;
        }
        if replace(&mut self.texture_units[unit].sampler, sampler) {
            self.mark(StateMask::TEXTURE_BINDINGS);
        }
    }

    pub fn tex_parameter_i(&mut self, target: u32, pname: u32, value: i32) {
        self.tex_parameter(target, pname, ParamValue::Int(value));
    }

    pub fn tex_parameter_f(&mut self, target: u32, pname: u32, value: f32) {
        self.tex_parameter(target, pname, ParamValue::Float(value));
    }

    pub fn tex_parameter_fv(&mut self, target: u32, pname: u32, value: [f32; 4]) {
        self.tex_parameter(target, pname, ParamValue::Vec4(value));
    }

    fn tex_parameter(&mut self, target: u32, pname: u32, value: ParamValue) {
        let Some(target) = TextureTarget::from_gl(target) else {
            return;
        };
        let texture = self.texture_units[self.active_texture_unit].texture(target);
        let Some(record) = self.objects.textures.get_mut(texture) else {
            return;
        };
        if record.params.apply(pname, value) {
            self.mark(StateMask::TEXTURE_BINDINGS);
        }
    }

    pub fn sampler_parameter_i(&mut self, sampler: Handle, pname: u32, value: i32) {
        self.sampler_parameter(sampler, pname, ParamValue::Int(value));
    }

    pub fn sampler_parameter_f(&mut self, sampler: Handle, pname: u32, value: f32) {
        self.sampler_parameter(sampler, pname, ParamValue::Float(value));
    }

    pub fn sampler_parameter_fv(&mut self, sampler: Handle, pname: u32, value: [f32; 4]) {
        self.sampler_parameter(sampler, pname, ParamValue::Vec4(value));
    }

    fn sampler_parameter(&mut self, sampler: Handle, pname: u32, value: ParamValue) {
        let Some(record) = self.objects.samplers.get_mut(sampler) else {
            return;
        };
        if record.params.apply(pname, value) {
            self.mark(StateMask::TEXTURE_BINDINGS);
        }
    }

    /// `glTexStorage*` on the texture bound to `target` on the active unit.
    pub fn tex_storage(&mut self, target: u32, levels: u32, width: u32, height: u32, depth: u32) {
        let Some(target) = TextureTarget::from_gl(target) else {
            return;
        };
        if levels == 0 || width == 0 || height == 0 || depth == 0 {
            return;
        }
        let texture = self.texture_units[self.active_texture_unit].texture(target);
        let Some(record) = self.objects.textures.get_mut(texture) else {
            return;
        };
        let changed = replace(&mut record.levels, levels)
            | replace(&mut record.width, width)
            | replace(&mut record.height, height)
            | replace(&mut record.depth, depth);
        if !changed {
            return;
        }

        for framebuffer in self.objects.framebuffers.values_mut() {
            if framebuffer.references(texture) {
                framebuffer.invalidate_completeness();
            }
        }
        if self
            .texture_units
            .iter()
            .any(|unit| unit.textures.contains(&texture))
        {
            self.mark(StateMask::TEXTURE_BINDINGS);
        }
    }

    /// Parameters a draw samples `target` on `unit` with: the bound sampler object's if any,
    /// else the texture's own.
    pub fn effective_sampler_params(&self, unit: u32, target: u32) -> Option<SamplerParams> {
        let unit = self.texture_unit(unit)?;
        if let Some(sampler) = self.objects.samplers.get(unit.sampler) {
            return Some(sampler.params);
        }
        let target = TextureTarget::from_gl(target)?;
        self.objects
            .textures
            .get(unit.texture(target))
            .map(|t| t.params)
    }
}
