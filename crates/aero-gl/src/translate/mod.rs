//! Legacy enumeration to Vulkan translation tables.
//!
//! Everything here is a pure function. Unknown raw GL values are rejected earlier by the
//! `from_gl` constructors in [`crate::types`], so these tables are total.

mod float16;
mod sampler;
mod vertex_format;
#[cfg(feature = "wgpu")]
pub mod webgpu;

pub use float16::{float_to_half, half_to_float};
pub use sampler::{
    address_mode, border_color, mag_filter, min_filter, sampler_create_info, BorderColorClass,
    MinFilterTranslation,
};
pub use vertex_format::{attribute_byte_size, vertex_format, AttribKind};

use ash::vk;

use crate::types::{
    BlendFactor, BlendOp, CompareFunc, CullFace, FrontFace, IndexType, LogicOp, PolygonMode,
    PrimitiveMode, ShaderStage, StencilOp,
};

pub fn blend_factor(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        BlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        BlendFactor::OneMinusDstColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlphaSaturate => vk::BlendFactor::SRC_ALPHA_SATURATE,
        BlendFactor::ConstantColor => vk::BlendFactor::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => vk::BlendFactor::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => vk::BlendFactor::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::Src1Color => vk::BlendFactor::SRC1_COLOR,
        BlendFactor::OneMinusSrc1Color => vk::BlendFactor::ONE_MINUS_SRC1_COLOR,
        BlendFactor::Src1Alpha => vk::BlendFactor::SRC1_ALPHA,
        BlendFactor::OneMinusSrc1Alpha => vk::BlendFactor::ONE_MINUS_SRC1_ALPHA,
    }
}

pub fn blend_op(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOp::Min => vk::BlendOp::MIN,
        BlendOp::Max => vk::BlendOp::MAX,
    }
}

pub fn compare_op(func: CompareFunc) -> vk::CompareOp {
    match func {
        CompareFunc::Never => vk::CompareOp::NEVER,
        CompareFunc::Less => vk::CompareOp::LESS,
        CompareFunc::Equal => vk::CompareOp::EQUAL,
        CompareFunc::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareFunc::Greater => vk::CompareOp::GREATER,
        CompareFunc::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareFunc::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareFunc::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn stencil_op(op: StencilOp) -> vk::StencilOp {
    match op {
        StencilOp::Keep => vk::StencilOp::KEEP,
        StencilOp::Zero => vk::StencilOp::ZERO,
        StencilOp::Replace => vk::StencilOp::REPLACE,
        // GL `INCR`/`DECR` saturate; the `_WRAP` variants wrap.
        StencilOp::Incr => vk::StencilOp::INCREMENT_AND_CLAMP,
        StencilOp::Decr => vk::StencilOp::DECREMENT_AND_CLAMP,
        StencilOp::Invert => vk::StencilOp::INVERT,
        StencilOp::IncrWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        StencilOp::DecrWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

pub fn logic_op(op: LogicOp) -> vk::LogicOp {
    match op {
        LogicOp::Clear => vk::LogicOp::CLEAR,
        LogicOp::And => vk::LogicOp::AND,
        LogicOp::AndReverse => vk::LogicOp::AND_REVERSE,
        LogicOp::Copy => vk::LogicOp::COPY,
        LogicOp::AndInverted => vk::LogicOp::AND_INVERTED,
        LogicOp::Noop => vk::LogicOp::NO_OP,
        LogicOp::Xor => vk::LogicOp::XOR,
        LogicOp::Or => vk::LogicOp::OR,
        LogicOp::Nor => vk::LogicOp::NOR,
        LogicOp::Equiv => vk::LogicOp::EQUIVALENT,
        LogicOp::Invert => vk::LogicOp::INVERT,
        LogicOp::OrReverse => vk::LogicOp::OR_REVERSE,
        LogicOp::CopyInverted => vk::LogicOp::COPY_INVERTED,
        LogicOp::OrInverted => vk::LogicOp::OR_INVERTED,
        LogicOp::Nand => vk::LogicOp::NAND,
        LogicOp::Set => vk::LogicOp::SET,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Point => vk::PolygonMode::POINT,
        PolygonMode::Line => vk::PolygonMode::LINE,
        PolygonMode::Fill => vk::PolygonMode::FILL,
    }
}

pub fn cull_mode(enabled: bool, face: CullFace) -> vk::CullModeFlags {
    if !enabled {
        return vk::CullModeFlags::NONE;
    }
    match face {
        CullFace::Front => vk::CullModeFlags::FRONT,
        CullFace::Back => vk::CullModeFlags::BACK,
        CullFace::FrontAndBack => vk::CullModeFlags::FRONT_AND_BACK,
    }
}

/// GL's window origin is bottom-left and Vulkan's is top-left; the rasterizer sees the image
/// Y-flipped, which swaps the apparent winding.
pub fn front_face(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::Ccw => vk::FrontFace::CLOCKWISE,
        FrontFace::Cw => vk::FrontFace::COUNTER_CLOCKWISE,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveTopologyTranslation {
    pub topology: vk::PrimitiveTopology,
    /// Vulkan has no line loops; callers must close the strip by appending the first vertex.
    pub needs_line_loop_emulation: bool,
}

pub fn primitive_topology(mode: PrimitiveMode) -> PrimitiveTopologyTranslation {
    let (topology, needs_line_loop_emulation) = match mode {
        PrimitiveMode::Points => (vk::PrimitiveTopology::POINT_LIST, false),
        PrimitiveMode::Lines => (vk::PrimitiveTopology::LINE_LIST, false),
        PrimitiveMode::LineLoop => (vk::PrimitiveTopology::LINE_STRIP, true),
        PrimitiveMode::LineStrip => (vk::PrimitiveTopology::LINE_STRIP, false),
        PrimitiveMode::Triangles => (vk::PrimitiveTopology::TRIANGLE_LIST, false),
        PrimitiveMode::TriangleStrip => (vk::PrimitiveTopology::TRIANGLE_STRIP, false),
        PrimitiveMode::TriangleFan => (vk::PrimitiveTopology::TRIANGLE_FAN, false),
        PrimitiveMode::LinesAdjacency => (vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY, false),
        PrimitiveMode::LineStripAdjacency => {
            (vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY, false)
        }
        PrimitiveMode::TrianglesAdjacency => {
            (vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY, false)
        }
        PrimitiveMode::TriangleStripAdjacency => {
            (vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY, false)
        }
        PrimitiveMode::Patches => (vk::PrimitiveTopology::PATCH_LIST, false),
    };
    PrimitiveTopologyTranslation {
        topology,
        needs_line_loop_emulation,
    }
}

/// Map a legacy sample count (0 meaning "single sampled") to the Vulkan flag bit.
///
/// Non power-of-two counts round up to the next supported count; anything above 64 is
/// rejected.
pub fn sample_count(samples: u32) -> Option<vk::SampleCountFlags> {
    let flags = match samples.max(1).next_power_of_two() {
        1 => vk::SampleCountFlags::TYPE_1,
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        32 => vk::SampleCountFlags::TYPE_32,
        64 => vk::SampleCountFlags::TYPE_64,
        _ => return None,
    };
    Some(flags)
}

/// `mask` bit 0 = red, 1 = green, 2 = blue, 3 = alpha.
pub fn color_write_mask(mask: u8) -> vk::ColorComponentFlags {
    vk::ColorComponentFlags::from_raw(u32::from(mask & 0xF))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexTypeTranslation {
    pub index_type: vk::IndexType,
    /// 8-bit indices are optional in Vulkan; callers widen them to 16 bits.
    pub needs_u8_widening: bool,
}

pub fn index_type(ty: IndexType) -> IndexTypeTranslation {
    match ty {
        IndexType::UnsignedByte => IndexTypeTranslation {
            index_type: vk::IndexType::UINT16,
            needs_u8_widening: true,
        },
        IndexType::UnsignedShort => IndexTypeTranslation {
            index_type: vk::IndexType::UINT16,
            needs_u8_widening: false,
        },
        IndexType::UnsignedInt => IndexTypeTranslation {
            index_type: vk::IndexType::UINT32,
            needs_u8_widening: false,
        },
    }
}

pub fn shader_stage(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::TessControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
        ShaderStage::TessEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
        ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
    }
}
