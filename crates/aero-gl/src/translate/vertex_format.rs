use ash::vk;

use crate::gl;
use crate::types::VertexType;

/// How the shader sees an attribute's components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttribKind {
    /// `glVertexAttribPointer(normalized = false)`: integers convert to float as-is.
    #[default]
    Float = 0,
    /// `glVertexAttribPointer(normalized = true)`.
    Normalized = 1,
    /// `glVertexAttribIPointer`: integers stay integers.
    Integer = 2,
    /// `glVertexAttribLPointer`: 64-bit floats stay 64-bit.
    Double = 3,
}

fn component_count(size: u32) -> Option<usize> {
    match size {
        1..=4 => Some(size as usize),
        gl::BGRA => Some(4),
        _ => None,
    }
}

/// Byte footprint of one attribute element. Packed types are one 32-bit word whatever `size`
/// says; everything else is `components * component_bytes`.
pub fn attribute_byte_size(ty: VertexType, size: u32) -> u32 {
    if ty.is_packed() {
        return 4;
    }
    let components = component_count(size).unwrap_or(4) as u32;
    components * ty.component_bytes()
}

fn pick(components: usize, formats: [vk::Format; 4]) -> vk::Format {
    formats[components - 1]
}

/// Vulkan format for an attribute, or `None` when the combination has no direct equivalent
/// (32-bit normalized integers, fixed point, BGRA on anything but bytes and packed words).
pub fn vertex_format(ty: VertexType, size: u32, kind: AttribKind) -> Option<vk::Format> {
    use vk::Format as F;

    let components = component_count(size)?;
    let bgra = size == gl::BGRA;

    if ty.is_packed() {
        return packed_format(ty, components, bgra, kind);
    }
    if bgra {
        return match (ty, kind) {
            (VertexType::UnsignedByte, AttribKind::Normalized) => Some(F::B8G8R8A8_UNORM),
            _ => None,
        };
    }

    let format = match (kind, ty) {
        (AttribKind::Double, VertexType::Double) => pick(
            components,
            [F::R64_SFLOAT, F::R64G64_SFLOAT, F::R64G64B64_SFLOAT, F::R64G64B64A64_SFLOAT],
        ),
        (AttribKind::Double, _) => return None,

        (AttribKind::Integer, VertexType::Byte) => pick(
            components,
            [F::R8_SINT, F::R8G8_SINT, F::R8G8B8_SINT, F::R8G8B8A8_SINT],
        ),
        (AttribKind::Integer, VertexType::UnsignedByte) => pick(
            components,
            [F::R8_UINT, F::R8G8_UINT, F::R8G8B8_UINT, F::R8G8B8A8_UINT],
        ),
        (AttribKind::Integer, VertexType::Short) => pick(
            components,
            [F::R16_SINT, F::R16G16_SINT, F::R16G16B16_SINT, F::R16G16B16A16_SINT],
        ),
        (AttribKind::Integer, VertexType::UnsignedShort) => pick(
            components,
            [F::R16_UINT, F::R16G16_UINT, F::R16G16B16_UINT, F::R16G16B16A16_UINT],
        ),
        (AttribKind::Integer, VertexType::Int) => pick(
            components,
            [F::R32_SINT, F::R32G32_SINT, F::R32G32B32_SINT, F::R32G32B32A32_SINT],
        ),
        (AttribKind::Integer, VertexType::UnsignedInt) => pick(
            components,
            [F::R32_UINT, F::R32G32_UINT, F::R32G32B32_UINT, F::R32G32B32A32_UINT],
        ),
        (AttribKind::Integer, _) => return None,

        // Normalization is meaningless for float sources.
        (_, VertexType::Float) => pick(
            components,
            [F::R32_SFLOAT, F::R32G32_SFLOAT, F::R32G32B32_SFLOAT, F::R32G32B32A32_SFLOAT],
        ),
        (_, VertexType::HalfFloat) => pick(
            components,
            [F::R16_SFLOAT, F::R16G16_SFLOAT, F::R16G16B16_SFLOAT, F::R16G16B16A16_SFLOAT],
        ),

        (AttribKind::Normalized, VertexType::Byte) => pick(
            components,
            [F::R8_SNORM, F::R8G8_SNORM, F::R8G8B8_SNORM, F::R8G8B8A8_SNORM],
        ),
        (AttribKind::Normalized, VertexType::UnsignedByte) => pick(
            components,
            [F::R8_UNORM, F::R8G8_UNORM, F::R8G8B8_UNORM, F::R8G8B8A8_UNORM],
        ),
        (AttribKind::Normalized, VertexType::Short) => pick(
            components,
            [F::R16_SNORM, F::R16G16_SNORM, F::R16G16B16_SNORM, F::R16G16B16A16_SNORM],
        ),
        (AttribKind::Normalized, VertexType::UnsignedShort) => pick(
            components,
            [F::R16_UNORM, F::R16G16_UNORM, F::R16G16B16_UNORM, F::R16G16B16A16_UNORM],
        ),

        (AttribKind::Float, VertexType::Byte) => pick(
            components,
            [F::R8_SSCALED, F::R8G8_SSCALED, F::R8G8B8_SSCALED, F::R8G8B8A8_SSCALED],
        ),
        (AttribKind::Float, VertexType::UnsignedByte) => pick(
            components,
            [F::R8_USCALED, F::R8G8_USCALED, F::R8G8B8_USCALED, F::R8G8B8A8_USCALED],
        ),
        (AttribKind::Float, VertexType::Short) => pick(
            components,
            [F::R16_SSCALED, F::R16G16_SSCALED, F::R16G16B16_SSCALED, F::R16G16B16A16_SSCALED],
        ),
        (AttribKind::Float, VertexType::UnsignedShort) => pick(
            components,
            [F::R16_USCALED, F::R16G16_USCALED, F::R16G16B16_USCALED, F::R16G16B16A16_USCALED],
        ),

        _ => return None,
    };
    Some(format)
}

fn packed_format(
    ty: VertexType,
    components: usize,
    bgra: bool,
    kind: AttribKind,
) -> Option<vk::Format> {
    use vk::Format as F;

    let format = match ty {
        VertexType::UnsignedInt10F11F11FRev => {
            if components != 3 || bgra || kind == AttribKind::Integer {
                return None;
            }
            F::B10G11R11_UFLOAT_PACK32
        }
        VertexType::Int2_10_10_10Rev => {
            if components != 4 {
                return None;
            }
            match (kind, bgra) {
                (AttribKind::Normalized, false) => F::A2B10G10R10_SNORM_PACK32,
                (AttribKind::Normalized, true) => F::A2R10G10B10_SNORM_PACK32,
                (AttribKind::Float, false) => F::A2B10G10R10_SSCALED_PACK32,
                (AttribKind::Float, true) => F::A2R10G10B10_SSCALED_PACK32,
                (AttribKind::Integer, false) => F::A2B10G10R10_SINT_PACK32,
                _ => return None,
            }
        }
        VertexType::UnsignedInt2_10_10_10Rev => {
            if components != 4 {
                return None;
            }
            match (kind, bgra) {
                (AttribKind::Normalized, false) => F::A2B10G10R10_UNORM_PACK32,
                (AttribKind::Normalized, true) => F::A2R10G10B10_UNORM_PACK32,
                (AttribKind::Float, false) => F::A2B10G10R10_USCALED_PACK32,
                (AttribKind::Float, true) => F::A2R10G10B10_USCALED_PACK32,
                (AttribKind::Integer, false) => F::A2B10G10R10_UINT_PACK32,
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sizes() {
        assert_eq!(attribute_byte_size(VertexType::Float, 3), 12);
        assert_eq!(attribute_byte_size(VertexType::HalfFloat, 2), 4);
        assert_eq!(attribute_byte_size(VertexType::UnsignedByte, gl::BGRA), 4);
        assert_eq!(attribute_byte_size(VertexType::Double, 4), 32);
    }

    #[test]
    fn packed_types_are_four_bytes_regardless_of_size() {
        for size in 1..=4 {
            assert_eq!(attribute_byte_size(VertexType::Int2_10_10_10Rev, size), 4);
            assert_eq!(attribute_byte_size(VertexType::UnsignedInt10F11F11FRev, size), 4);
        }
    }

    #[test]
    fn float_formats() {
        assert_eq!(
            vertex_format(VertexType::Float, 3, AttribKind::Float),
            Some(vk::Format::R32G32B32_SFLOAT)
        );
        assert_eq!(
            vertex_format(VertexType::Float, 4, AttribKind::Normalized),
            Some(vk::Format::R32G32B32A32_SFLOAT)
        );
    }

    #[test]
    fn normalized_versus_scaled_versus_integer() {
        assert_eq!(
            vertex_format(VertexType::UnsignedByte, 4, AttribKind::Normalized),
            Some(vk::Format::R8G8B8A8_UNORM)
        );
        assert_eq!(
            vertex_format(VertexType::UnsignedByte, 4, AttribKind::Float),
            Some(vk::Format::R8G8B8A8_USCALED)
        );
        assert_eq!(
            vertex_format(VertexType::UnsignedByte, 4, AttribKind::Integer),
            Some(vk::Format::R8G8B8A8_UINT)
        );
    }

    #[test]
    fn packed_formats() {
        assert_eq!(
            vertex_format(VertexType::Int2_10_10_10Rev, 4, AttribKind::Normalized),
            Some(vk::Format::A2B10G10R10_SNORM_PACK32)
        );
        assert_eq!(
            vertex_format(VertexType::UnsignedInt2_10_10_10Rev, gl::BGRA, AttribKind::Normalized),
            Some(vk::Format::A2R10G10B10_UNORM_PACK32)
        );
        assert_eq!(
            vertex_format(VertexType::UnsignedInt10F11F11FRev, 3, AttribKind::Float),
            Some(vk::Format::B10G11R11_UFLOAT_PACK32)
        );
        assert_eq!(
            vertex_format(VertexType::UnsignedInt10F11F11FRev, 4, AttribKind::Float),
            None
        );
    }

    #[test]
    fn bgra_bytes() {
        assert_eq!(
            vertex_format(VertexType::UnsignedByte, gl::BGRA, AttribKind::Normalized),
            Some(vk::Format::B8G8R8A8_UNORM)
        );
        assert_eq!(vertex_format(VertexType::Short, gl::BGRA, AttribKind::Normalized), None);
    }

    #[test]
    fn unsupported_combinations() {
        assert_eq!(vertex_format(VertexType::Int, 4, AttribKind::Normalized), None);
        assert_eq!(vertex_format(VertexType::Fixed, 2, AttribKind::Float), None);
        assert_eq!(vertex_format(VertexType::Float, 5, AttribKind::Float), None);
        assert_eq!(vertex_format(VertexType::Float, 2, AttribKind::Double), None);
    }
}
