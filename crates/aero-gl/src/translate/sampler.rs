use ash::vk;

use super::compare_op;
use crate::state::SamplerParams;
use crate::types::{CompareMode, MagFilter, MinFilter, WrapMode};

/// Which fixed border color a legacy RGBA border color maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderColorClass {
    TransparentBlack,
    OpaqueBlack,
    OpaqueWhite,
    /// Arbitrary color; rendered as opaque black. True custom border colors need
    /// `VK_EXT_custom_border_color`, which this tracker does not model.
    Approximated,
}

impl BorderColorClass {
    pub fn to_vk(self) -> vk::BorderColor {
        match self {
            Self::TransparentBlack => vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
            Self::OpaqueBlack | Self::Approximated => vk::BorderColor::FLOAT_OPAQUE_BLACK,
            Self::OpaqueWhite => vk::BorderColor::FLOAT_OPAQUE_WHITE,
        }
    }
}

/// Classify by exact equality; no tolerance is applied.
#[allow(clippy::float_cmp)]
pub fn border_color(rgba: [f32; 4]) -> BorderColorClass {
    let [r, g, b, a] = rgba;
    let black = r == 0.0 && g == 0.0 && b == 0.0;
    if black && a == 0.0 {
        BorderColorClass::TransparentBlack
    } else if black && a == 1.0 {
        BorderColorClass::OpaqueBlack
    } else if r == 1.0 && g == 1.0 && b == 1.0 && a == 1.0 {
        BorderColorClass::OpaqueWhite
    } else {
        BorderColorClass::Approximated
    }
}

pub fn address_mode(mode: WrapMode) -> vk::SamplerAddressMode {
    match mode {
        WrapMode::Repeat => vk::SamplerAddressMode::REPEAT,
        WrapMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        WrapMode::MirrorClampToEdge => vk::SamplerAddressMode::MIRROR_CLAMP_TO_EDGE,
    }
}

pub fn mag_filter(filter: MagFilter) -> vk::Filter {
    match filter {
        MagFilter::Nearest => vk::Filter::NEAREST,
        MagFilter::Linear => vk::Filter::LINEAR,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinFilterTranslation {
    pub filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    /// GL's non-mipmapped minification filters sample only the base level.
    pub mipmapped: bool,
}

pub fn min_filter(filter: MinFilter) -> MinFilterTranslation {
    let (filter, mipmap_mode, mipmapped) = match filter {
        MinFilter::Nearest => (vk::Filter::NEAREST, vk::SamplerMipmapMode::NEAREST, false),
        MinFilter::Linear => (vk::Filter::LINEAR, vk::SamplerMipmapMode::NEAREST, false),
        MinFilter::NearestMipmapNearest => {
            (vk::Filter::NEAREST, vk::SamplerMipmapMode::NEAREST, true)
        }
        MinFilter::LinearMipmapNearest => (vk::Filter::LINEAR, vk::SamplerMipmapMode::NEAREST, true),
        MinFilter::NearestMipmapLinear => (vk::Filter::NEAREST, vk::SamplerMipmapMode::LINEAR, true),
        MinFilter::LinearMipmapLinear => (vk::Filter::LINEAR, vk::SamplerMipmapMode::LINEAR, true),
    };
    MinFilterTranslation {
        filter,
        mipmap_mode,
        mipmapped,
    }
}

/// Clamp for non-mipmapped filters; keeps sampling on level 0 while still letting the
/// min/mag switch happen.
const BASE_LEVEL_ONLY_MAX_LOD: f32 = 0.25;

pub fn sampler_create_info(params: &SamplerParams) -> vk::SamplerCreateInfo<'static> {
    let min = min_filter(params.min_filter);
    let (min_lod, max_lod) = if min.mipmapped {
        (params.min_lod, params.max_lod)
    } else {
        (0.0, BASE_LEVEL_ONLY_MAX_LOD)
    };
    let anisotropy = params.max_anisotropy > 1.0;

    vk::SamplerCreateInfo::default()
        .mag_filter(mag_filter(params.mag_filter))
        .min_filter(min.filter)
        .mipmap_mode(min.mipmap_mode)
        .address_mode_u(address_mode(params.wrap_s))
        .address_mode_v(address_mode(params.wrap_t))
        .address_mode_w(address_mode(params.wrap_r))
        .mip_lod_bias(params.lod_bias)
        .anisotropy_enable(anisotropy)
        .max_anisotropy(if anisotropy { params.max_anisotropy } else { 1.0 })
        .compare_enable(params.compare_mode == CompareMode::CompareRefToTexture)
        .compare_op(compare_op(params.compare_func))
        .min_lod(min_lod)
        .max_lod(max_lod)
        .border_color(border_color(params.border_color).to_vk())
        .unnormalized_coordinates(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_color_exact_classes() {
        assert_eq!(border_color([0.0; 4]), BorderColorClass::TransparentBlack);
        assert_eq!(border_color([0.0, 0.0, 0.0, 1.0]), BorderColorClass::OpaqueBlack);
        assert_eq!(border_color([1.0; 4]), BorderColorClass::OpaqueWhite);
    }

    #[test]
    fn border_color_falls_back_to_opaque_black() {
        let class = border_color([0.5, 0.25, 1.0, 1.0]);
        assert_eq!(class, BorderColorClass::Approximated);
        assert_eq!(class.to_vk(), vk::BorderColor::FLOAT_OPAQUE_BLACK);
        // Near-misses are not rounded.
        assert_eq!(
            border_color([1.0, 1.0, 1.0, 0.999_999]),
            BorderColorClass::Approximated
        );
    }

    #[test]
    fn default_params_translate_to_repeat_with_mipmaps() {
        let info = sampler_create_info(&SamplerParams::default());
        assert_eq!(info.address_mode_u, vk::SamplerAddressMode::REPEAT);
        assert_eq!(info.min_filter, vk::Filter::NEAREST);
        assert_eq!(info.mipmap_mode, vk::SamplerMipmapMode::LINEAR);
        assert_eq!(info.mag_filter, vk::Filter::LINEAR);
        assert_eq!(info.compare_enable, vk::FALSE);
        assert_eq!(info.anisotropy_enable, vk::FALSE);
    }

    #[test]
    fn non_mipmapped_min_filter_clamps_lod() {
        let params = SamplerParams {
            min_filter: MinFilter::Linear,
            ..SamplerParams::default()
        };
        let info = sampler_create_info(&params);
        assert_eq!(info.min_lod, 0.0);
        assert_eq!(info.max_lod, BASE_LEVEL_ONLY_MAX_LOD);
    }
}
