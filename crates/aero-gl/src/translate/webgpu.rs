//! The same legacy enumerations mapped onto WebGPU, for the browser backend.
//!
//! WebGPU is narrower than Vulkan: there are no line loops, triangle fans, adjacency or patch
//! topologies, no dual-source or constant-alpha factors and no mirror-once addressing. Those
//! inputs come back as `None` or carry an emulation flag.

use crate::types::{
    BlendFactor, BlendOp, CompareFunc, CullFace, FrontFace, IndexType, PolygonMode,
    PrimitiveMode, StencilOp, VertexType, WrapMode,
};

use super::{AttribKind, BorderColorClass};

pub fn blend_factor(factor: BlendFactor) -> Option<wgpu::BlendFactor> {
    Some(match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturate => wgpu::BlendFactor::SrcAlphaSaturated,
        BlendFactor::ConstantColor => wgpu::BlendFactor::Constant,
        BlendFactor::OneMinusConstantColor => wgpu::BlendFactor::OneMinusConstant,
        BlendFactor::ConstantAlpha
        | BlendFactor::OneMinusConstantAlpha
        | BlendFactor::Src1Color
        | BlendFactor::OneMinusSrc1Color
        | BlendFactor::Src1Alpha
        | BlendFactor::OneMinusSrc1Alpha => return None,
    })
}

pub fn blend_op(op: BlendOp) -> wgpu::BlendOperation {
    match op {
        BlendOp::Add => wgpu::BlendOperation::Add,
        BlendOp::Subtract => wgpu::BlendOperation::Subtract,
        BlendOp::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendOp::Min => wgpu::BlendOperation::Min,
        BlendOp::Max => wgpu::BlendOperation::Max,
    }
}

pub fn compare_function(func: CompareFunc) -> wgpu::CompareFunction {
    match func {
        CompareFunc::Never => wgpu::CompareFunction::Never,
        CompareFunc::Less => wgpu::CompareFunction::Less,
        CompareFunc::Equal => wgpu::CompareFunction::Equal,
        CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunc::Greater => wgpu::CompareFunction::Greater,
        CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunc::Always => wgpu::CompareFunction::Always,
    }
}

pub fn stencil_operation(op: StencilOp) -> wgpu::StencilOperation {
    match op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Zero => wgpu::StencilOperation::Zero,
        StencilOp::Replace => wgpu::StencilOperation::Replace,
        StencilOp::Incr => wgpu::StencilOperation::IncrementClamp,
        StencilOp::Decr => wgpu::StencilOperation::DecrementClamp,
        StencilOp::Invert => wgpu::StencilOperation::Invert,
        StencilOp::IncrWrap => wgpu::StencilOperation::IncrementWrap,
        StencilOp::DecrWrap => wgpu::StencilOperation::DecrementWrap,
    }
}

pub fn address_mode(mode: WrapMode) -> Option<wgpu::AddressMode> {
    match mode {
        WrapMode::Repeat => Some(wgpu::AddressMode::Repeat),
        WrapMode::MirroredRepeat => Some(wgpu::AddressMode::MirrorRepeat),
        WrapMode::ClampToEdge => Some(wgpu::AddressMode::ClampToEdge),
        WrapMode::ClampToBorder => Some(wgpu::AddressMode::ClampToBorder),
        WrapMode::MirrorClampToEdge => None,
    }
}

pub fn border_color(class: BorderColorClass) -> wgpu::SamplerBorderColor {
    match class {
        BorderColorClass::TransparentBlack => wgpu::SamplerBorderColor::TransparentBlack,
        BorderColorClass::OpaqueBlack | BorderColorClass::Approximated => {
            wgpu::SamplerBorderColor::OpaqueBlack
        }
        BorderColorClass::OpaqueWhite => wgpu::SamplerBorderColor::OpaqueWhite,
    }
}

/// Inverted for the same reason as the Vulkan table: the framebuffer is Y-flipped.
pub fn front_face(face: FrontFace) -> wgpu::FrontFace {
    match face {
        FrontFace::Ccw => wgpu::FrontFace::Cw,
        FrontFace::Cw => wgpu::FrontFace::Ccw,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CullTranslation {
    pub cull_mode: Option<wgpu::Face>,
    /// `GL_FRONT_AND_BACK` culls every polygon; WebGPU cannot express that, so the caller skips
    /// triangle draws instead.
    pub discard_polygons: bool,
}

pub fn cull_mode(enabled: bool, face: CullFace) -> CullTranslation {
    let (cull_mode, discard_polygons) = match (enabled, face) {
        (false, _) => (None, false),
        (true, CullFace::Front) => (Some(wgpu::Face::Front), false),
        (true, CullFace::Back) => (Some(wgpu::Face::Back), false),
        (true, CullFace::FrontAndBack) => (None, true),
    };
    CullTranslation {
        cull_mode,
        discard_polygons,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> wgpu::PolygonMode {
    match mode {
        PolygonMode::Point => wgpu::PolygonMode::Point,
        PolygonMode::Line => wgpu::PolygonMode::Line,
        PolygonMode::Fill => wgpu::PolygonMode::Fill,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveTopologyTranslation {
    pub topology: wgpu::PrimitiveTopology,
    /// Fans are drawn as lists; the caller rewrites indices.
    pub needs_fan_expansion: bool,
    /// Loops are drawn as strips; the caller appends the first vertex.
    pub needs_line_loop_emulation: bool,
}

pub fn primitive_topology(mode: PrimitiveMode) -> Option<PrimitiveTopologyTranslation> {
    let (topology, fan, line_loop) = match mode {
        PrimitiveMode::Points => (wgpu::PrimitiveTopology::PointList, false, false),
        PrimitiveMode::Lines => (wgpu::PrimitiveTopology::LineList, false, false),
        PrimitiveMode::LineStrip => (wgpu::PrimitiveTopology::LineStrip, false, false),
        PrimitiveMode::LineLoop => (wgpu::PrimitiveTopology::LineStrip, false, true),
        PrimitiveMode::Triangles => (wgpu::PrimitiveTopology::TriangleList, false, false),
        PrimitiveMode::TriangleStrip => (wgpu::PrimitiveTopology::TriangleStrip, false, false),
        PrimitiveMode::TriangleFan => (wgpu::PrimitiveTopology::TriangleList, true, false),
        PrimitiveMode::LinesAdjacency
        | PrimitiveMode::LineStripAdjacency
        | PrimitiveMode::TrianglesAdjacency
        | PrimitiveMode::TriangleStripAdjacency
        | PrimitiveMode::Patches => return None,
    };
    Some(PrimitiveTopologyTranslation {
        topology,
        needs_fan_expansion: fan,
        needs_line_loop_emulation: line_loop,
    })
}

/// 8-bit indices are widened to 16-bit; the `bool` says so.
pub fn index_format(ty: IndexType) -> (wgpu::IndexFormat, bool) {
    match ty {
        IndexType::UnsignedByte => (wgpu::IndexFormat::Uint16, true),
        IndexType::UnsignedShort => (wgpu::IndexFormat::Uint16, false),
        IndexType::UnsignedInt => (wgpu::IndexFormat::Uint32, false),
    }
}

/// WebGPU vertex formats only come in 2- and 4-wide variants for 8/16-bit components, and there
/// is no scaled (integer-to-float without normalization) format at all.
pub fn vertex_format(ty: VertexType, size: u32, kind: AttribKind) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    let format = match (ty, kind, size) {
        (VertexType::Float, AttribKind::Float | AttribKind::Normalized, 1) => F::Float32,
        (VertexType::Float, AttribKind::Float | AttribKind::Normalized, 2) => F::Float32x2,
        (VertexType::Float, AttribKind::Float | AttribKind::Normalized, 3) => F::Float32x3,
        (VertexType::Float, AttribKind::Float | AttribKind::Normalized, 4) => F::Float32x4,
        (VertexType::HalfFloat, AttribKind::Float | AttribKind::Normalized, 2) => F::Float16x2,
        (VertexType::HalfFloat, AttribKind::Float | AttribKind::Normalized, 4) => F::Float16x4,
        (VertexType::Double, AttribKind::Double, 1) => F::Float64,
        (VertexType::Double, AttribKind::Double, 2) => F::Float64x2,
        (VertexType::Double, AttribKind::Double, 3) => F::Float64x3,
        (VertexType::Double, AttribKind::Double, 4) => F::Float64x4,

        (VertexType::UnsignedByte, AttribKind::Normalized, 2) => F::Unorm8x2,
        (VertexType::UnsignedByte, AttribKind::Normalized, 4) => F::Unorm8x4,
        (VertexType::Byte, AttribKind::Normalized, 2) => F::Snorm8x2,
        (VertexType::Byte, AttribKind::Normalized, 4) => F::Snorm8x4,
        (VertexType::UnsignedByte, AttribKind::Integer, 2) => F::Uint8x2,
        (VertexType::UnsignedByte, AttribKind::Integer, 4) => F::Uint8x4,
        (VertexType::Byte, AttribKind::Integer, 2) => F::Sint8x2,
        (VertexType::Byte, AttribKind::Integer, 4) => F::Sint8x4,

        (VertexType::UnsignedShort, AttribKind::Normalized, 2) => F::Unorm16x2,
        (VertexType::UnsignedShort, AttribKind::Normalized, 4) => F::Unorm16x4,
        (VertexType::Short, AttribKind::Normalized, 2) => F::Snorm16x2,
        (VertexType::Short, AttribKind::Normalized, 4) => F::Snorm16x4,
        (VertexType::UnsignedShort, AttribKind::Integer, 2) => F::Uint16x2,
        (VertexType::UnsignedShort, AttribKind::Integer, 4) => F::Uint16x4,
        (VertexType::Short, AttribKind::Integer, 2) => F::Sint16x2,
        (VertexType::Short, AttribKind::Integer, 4) => F::Sint16x4,

        (VertexType::UnsignedInt, AttribKind::Integer, 1) => F::Uint32,
        (VertexType::UnsignedInt, AttribKind::Integer, 2) => F::Uint32x2,
        (VertexType::UnsignedInt, AttribKind::Integer, 3) => F::Uint32x3,
        (VertexType::UnsignedInt, AttribKind::Integer, 4) => F::Uint32x4,
        (VertexType::Int, AttribKind::Integer, 1) => F::Sint32,
        (VertexType::Int, AttribKind::Integer, 2) => F::Sint32x2,
        (VertexType::Int, AttribKind::Integer, 3) => F::Sint32x3,
        (VertexType::Int, AttribKind::Integer, 4) => F::Sint32x4,
        _ => return None,
    };
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_face_is_flipped() {
        assert_eq!(front_face(FrontFace::Ccw), wgpu::FrontFace::Cw);
        assert_eq!(front_face(FrontFace::Cw), wgpu::FrontFace::Ccw);
    }

    #[test]
    fn fans_and_loops_need_emulation() {
        let fan = primitive_topology(PrimitiveMode::TriangleFan).unwrap();
        assert_eq!(fan.topology, wgpu::PrimitiveTopology::TriangleList);
        assert!(fan.needs_fan_expansion);

        let line_loop = primitive_topology(PrimitiveMode::LineLoop).unwrap();
        assert_eq!(line_loop.topology, wgpu::PrimitiveTopology::LineStrip);
        assert!(line_loop.needs_line_loop_emulation);

        assert!(primitive_topology(PrimitiveMode::Patches).is_none());
    }

    #[test]
    fn unsupported_factors_are_rejected() {
        assert_eq!(blend_factor(BlendFactor::ConstantAlpha), None);
        assert_eq!(blend_factor(BlendFactor::Src1Color), None);
        assert_eq!(
            blend_factor(BlendFactor::OneMinusSrcAlpha),
            Some(wgpu::BlendFactor::OneMinusSrcAlpha)
        );
    }

    #[test]
    fn front_and_back_culling_discards() {
        let cull = cull_mode(true, CullFace::FrontAndBack);
        assert_eq!(cull.cull_mode, None);
        assert!(cull.discard_polygons);
        assert_eq!(cull_mode(false, CullFace::Back).cull_mode, None);
    }

    #[test]
    fn vertex_formats_follow_kind() {
        assert_eq!(
            vertex_format(VertexType::UnsignedByte, 4, AttribKind::Normalized),
            Some(wgpu::VertexFormat::Unorm8x4)
        );
        assert_eq!(vertex_format(VertexType::UnsignedByte, 4, AttribKind::Float), None);
        assert_eq!(vertex_format(VertexType::UnsignedByte, 3, AttribKind::Normalized), None);
        assert_eq!(
            vertex_format(VertexType::Float, 3, AttribKind::Float),
            Some(wgpu::VertexFormat::Float32x3)
        );
    }
}
