//! Semantic enums for the legacy API's enumerations.
//!
//! Each enum is `#[repr(u32)]` with the GL value as its discriminant, so `to_gl` is free and the
//! discriminant is stable input for hashing. `from_gl` returns `None` for anything the tracker
//! does not understand; setters treat that as a no-op.

use crate::gl;

macro_rules! gl_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:path),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const fn from_gl(value: u32) -> Option<Self> {
                match value {
                    $(v if v == $value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn to_gl(self) -> u32 {
                self as u32
            }
        }
    };
}

gl_enum! {
    pub enum BlendFactor {
        Zero = gl::ZERO,
        One = gl::ONE,
        SrcColor = gl::SRC_COLOR,
        OneMinusSrcColor = gl::ONE_MINUS_SRC_COLOR,
        SrcAlpha = gl::SRC_ALPHA,
        OneMinusSrcAlpha = gl::ONE_MINUS_SRC_ALPHA,
        DstAlpha = gl::DST_ALPHA,
        OneMinusDstAlpha = gl::ONE_MINUS_DST_ALPHA,
        DstColor = gl::DST_COLOR,
        OneMinusDstColor = gl::ONE_MINUS_DST_COLOR,
        SrcAlphaSaturate = gl::SRC_ALPHA_SATURATE,
        ConstantColor = gl::CONSTANT_COLOR,
        OneMinusConstantColor = gl::ONE_MINUS_CONSTANT_COLOR,
        ConstantAlpha = gl::CONSTANT_ALPHA,
        OneMinusConstantAlpha = gl::ONE_MINUS_CONSTANT_ALPHA,
        Src1Alpha = gl::SRC1_ALPHA,
        Src1Color = gl::SRC1_COLOR,
        OneMinusSrc1Color = gl::ONE_MINUS_SRC1_COLOR,
        OneMinusSrc1Alpha = gl::ONE_MINUS_SRC1_ALPHA,
    }
}

gl_enum! {
    pub enum BlendOp {
        Add = gl::FUNC_ADD,
        Subtract = gl::FUNC_SUBTRACT,
        ReverseSubtract = gl::FUNC_REVERSE_SUBTRACT,
        Min = gl::MIN,
        Max = gl::MAX,
    }
}

gl_enum! {
    pub enum CompareFunc {
        Never = gl::NEVER,
        Less = gl::LESS,
        Equal = gl::EQUAL,
        LessEqual = gl::LEQUAL,
        Greater = gl::GREATER,
        NotEqual = gl::NOTEQUAL,
        GreaterEqual = gl::GEQUAL,
        Always = gl::ALWAYS,
    }
}

gl_enum! {
    pub enum StencilOp {
        Keep = gl::KEEP,
        Zero = gl::ZERO,
        Replace = gl::REPLACE,
        Incr = gl::INCR,
        Decr = gl::DECR,
        Invert = gl::INVERT,
        IncrWrap = gl::INCR_WRAP,
        DecrWrap = gl::DECR_WRAP,
    }
}

gl_enum! {
    pub enum LogicOp {
        Clear = gl::CLEAR,
        And = gl::AND,
        AndReverse = gl::AND_REVERSE,
        Copy = gl::COPY,
        AndInverted = gl::AND_INVERTED,
        Noop = gl::NOOP,
        Xor = gl::XOR,
        Or = gl::OR,
        Nor = gl::NOR,
        Equiv = gl::EQUIV,
        Invert = gl::INVERT,
        OrReverse = gl::OR_REVERSE,
        CopyInverted = gl::COPY_INVERTED,
        OrInverted = gl::OR_INVERTED,
        Nand = gl::NAND,
        Set = gl::SET,
    }
}

gl_enum! {
    pub enum WrapMode {
        Repeat = gl::REPEAT,
        MirroredRepeat = gl::MIRRORED_REPEAT,
        ClampToEdge = gl::CLAMP_TO_EDGE,
        ClampToBorder = gl::CLAMP_TO_BORDER,
        MirrorClampToEdge = gl::MIRROR_CLAMP_TO_EDGE,
    }
}

gl_enum! {
    pub enum MagFilter {
        Nearest = gl::NEAREST,
        Linear = gl::LINEAR,
    }
}

gl_enum! {
    pub enum MinFilter {
        Nearest = gl::NEAREST,
        Linear = gl::LINEAR,
        NearestMipmapNearest = gl::NEAREST_MIPMAP_NEAREST,
        LinearMipmapNearest = gl::LINEAR_MIPMAP_NEAREST,
        NearestMipmapLinear = gl::NEAREST_MIPMAP_LINEAR,
        LinearMipmapLinear = gl::LINEAR_MIPMAP_LINEAR,
    }
}

gl_enum! {
    pub enum CompareMode {
        None = gl::NONE,
        CompareRefToTexture = gl::COMPARE_REF_TO_TEXTURE,
    }
}

gl_enum! {
    /// Component type of a vertex attribute.
    pub enum VertexType {
        Byte = gl::BYTE,
        UnsignedByte = gl::UNSIGNED_BYTE,
        Short = gl::SHORT,
        UnsignedShort = gl::UNSIGNED_SHORT,
        Int = gl::INT,
        UnsignedInt = gl::UNSIGNED_INT,
        Float = gl::FLOAT,
        Double = gl::DOUBLE,
        HalfFloat = gl::HALF_FLOAT,
        Fixed = gl::FIXED,
        /// Packed signed 2-10-10-10, reversed component order.
        Int2_10_10_10Rev = gl::INT_2_10_10_10_REV,
        /// Packed unsigned 2-10-10-10, reversed component order.
        UnsignedInt2_10_10_10Rev = gl::UNSIGNED_INT_2_10_10_10_REV,
        /// Packed 10F-11F-11F, reversed component order.
        UnsignedInt10F11F11FRev = gl::UNSIGNED_INT_10F_11F_11F_REV,
    }
}

impl VertexType {
    /// Whether all components share one 32-bit word.
    pub const fn is_packed(self) -> bool {
        matches!(
            self,
            Self::Int2_10_10_10Rev | Self::UnsignedInt2_10_10_10Rev | Self::UnsignedInt10F11F11FRev
        )
    }

    /// Size of one component in bytes. Packed formats report the whole word.
    pub const fn component_bytes(self) -> u32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort | Self::HalfFloat => 2,
            Self::Int | Self::UnsignedInt | Self::Float | Self::Fixed => 4,
            Self::Double => 8,
            Self::Int2_10_10_10Rev | Self::UnsignedInt2_10_10_10Rev | Self::UnsignedInt10F11F11FRev => 4,
        }
    }
}

gl_enum! {
    pub enum PrimitiveMode {
        Points = gl::POINTS,
        Lines = gl::LINES,
        LineLoop = gl::LINE_LOOP,
        LineStrip = gl::LINE_STRIP,
        Triangles = gl::TRIANGLES,
        TriangleStrip = gl::TRIANGLE_STRIP,
        TriangleFan = gl::TRIANGLE_FAN,
        LinesAdjacency = gl::LINES_ADJACENCY,
        LineStripAdjacency = gl::LINE_STRIP_ADJACENCY,
        TrianglesAdjacency = gl::TRIANGLES_ADJACENCY,
        TriangleStripAdjacency = gl::TRIANGLE_STRIP_ADJACENCY,
        Patches = gl::PATCHES,
    }
}

gl_enum! {
    pub enum PolygonMode {
        Point = gl::POINT,
        Line = gl::LINE,
        Fill = gl::FILL,
    }
}

gl_enum! {
    pub enum CullFace {
        Front = gl::FRONT,
        Back = gl::BACK,
        FrontAndBack = gl::FRONT_AND_BACK,
    }
}

gl_enum! {
    pub enum FrontFace {
        Cw = gl::CW,
        Ccw = gl::CCW,
    }
}

gl_enum! {
    pub enum IndexType {
        UnsignedByte = gl::UNSIGNED_BYTE,
        UnsignedShort = gl::UNSIGNED_SHORT,
        UnsignedInt = gl::UNSIGNED_INT,
    }
}

gl_enum! {
    pub enum ShaderStage {
        Vertex = gl::VERTEX_SHADER,
        TessControl = gl::TESS_CONTROL_SHADER,
        TessEvaluation = gl::TESS_EVALUATION_SHADER,
        Geometry = gl::GEOMETRY_SHADER,
        Fragment = gl::FRAGMENT_SHADER,
        Compute = gl::COMPUTE_SHADER,
    }
}

impl ShaderStage {
    pub const COUNT: usize = 6;

    pub const fn slot(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::TessControl => 1,
            Self::TessEvaluation => 2,
            Self::Geometry => 3,
            Self::Fragment => 4,
            Self::Compute => 5,
        }
    }
}

gl_enum! {
    pub enum BufferTarget {
        Array = gl::ARRAY_BUFFER,
        ElementArray = gl::ELEMENT_ARRAY_BUFFER,
        Uniform = gl::UNIFORM_BUFFER,
        ShaderStorage = gl::SHADER_STORAGE_BUFFER,
        TransformFeedback = gl::TRANSFORM_FEEDBACK_BUFFER,
        AtomicCounter = gl::ATOMIC_COUNTER_BUFFER,
        CopyRead = gl::COPY_READ_BUFFER,
        CopyWrite = gl::COPY_WRITE_BUFFER,
        DrawIndirect = gl::DRAW_INDIRECT_BUFFER,
        DispatchIndirect = gl::DISPATCH_INDIRECT_BUFFER,
        PixelPack = gl::PIXEL_PACK_BUFFER,
        PixelUnpack = gl::PIXEL_UNPACK_BUFFER,
        Texture = gl::TEXTURE_BUFFER,
        Query = gl::QUERY_BUFFER,
    }
}

impl BufferTarget {
    pub const COUNT: usize = 14;

    /// Dense index for the generic binding point table.
    pub const fn slot(self) -> usize {
        match self {
            Self::Array => 0,
            Self::ElementArray => 1,
            Self::Uniform => 2,
            Self::ShaderStorage => 3,
            Self::TransformFeedback => 4,
            Self::AtomicCounter => 5,
            Self::CopyRead => 6,
            Self::CopyWrite => 7,
            Self::DrawIndirect => 8,
            Self::DispatchIndirect => 9,
            Self::PixelPack => 10,
            Self::PixelUnpack => 11,
            Self::Texture => 12,
            Self::Query => 13,
        }
    }
}

gl_enum! {
    pub enum TextureTarget {
        Texture1D = gl::TEXTURE_1D,
        Texture2D = gl::TEXTURE_2D,
        Texture3D = gl::TEXTURE_3D,
        Rectangle = gl::TEXTURE_RECTANGLE,
        CubeMap = gl::TEXTURE_CUBE_MAP,
        Texture1DArray = gl::TEXTURE_1D_ARRAY,
        Texture2DArray = gl::TEXTURE_2D_ARRAY,
        CubeMapArray = gl::TEXTURE_CUBE_MAP_ARRAY,
        Texture2DMultisample = gl::TEXTURE_2D_MULTISAMPLE,
    }
}

impl TextureTarget {
    pub const COUNT: usize = 9;

    /// Dense index into a texture unit's per-target bindings.
    pub const fn slot(self) -> usize {
        match self {
            Self::Texture1D => 0,
            Self::Texture2D => 1,
            Self::Texture3D => 2,
            Self::Rectangle => 3,
            Self::CubeMap => 4,
            Self::Texture1DArray => 5,
            Self::Texture2DArray => 6,
            Self::CubeMapArray => 7,
            Self::Texture2DMultisample => 8,
        }
    }
}

gl_enum! {
    pub enum FramebufferTarget {
        Framebuffer = gl::FRAMEBUFFER,
        Draw = gl::DRAW_FRAMEBUFFER,
        Read = gl::READ_FRAMEBUFFER,
    }
}

gl_enum! {
    pub enum QueryTarget {
        SamplesPassed = gl::SAMPLES_PASSED,
        AnySamplesPassed = gl::ANY_SAMPLES_PASSED,
        PrimitivesGenerated = gl::PRIMITIVES_GENERATED,
        TimeElapsed = gl::TIME_ELAPSED,
    }
}

impl QueryTarget {
    pub const COUNT: usize = 4;

    pub const fn slot(self) -> usize {
        match self {
            Self::SamplesPassed => 0,
            Self::AnySamplesPassed => 1,
            Self::PrimitivesGenerated => 2,
            Self::TimeElapsed => 3,
        }
    }
}

gl_enum! {
    /// Switches accepted by `glEnable` / `glDisable`.
    pub enum Capability {
        Blend = gl::BLEND,
        CullFace = gl::CULL_FACE,
        DepthTest = gl::DEPTH_TEST,
        StencilTest = gl::STENCIL_TEST,
        ScissorTest = gl::SCISSOR_TEST,
        ColorLogicOp = gl::COLOR_LOGIC_OP,
        PolygonOffsetPoint = gl::POLYGON_OFFSET_POINT,
        PolygonOffsetLine = gl::POLYGON_OFFSET_LINE,
        PolygonOffsetFill = gl::POLYGON_OFFSET_FILL,
        Multisample = gl::MULTISAMPLE,
        SampleAlphaToCoverage = gl::SAMPLE_ALPHA_TO_COVERAGE,
        SampleAlphaToOne = gl::SAMPLE_ALPHA_TO_ONE,
        SampleShading = gl::SAMPLE_SHADING,
        SampleMask = gl::SAMPLE_MASK,
        DepthClamp = gl::DEPTH_CLAMP,
        DepthBoundsTest = gl::DEPTH_BOUNDS_TEST_EXT,
        RasterizerDiscard = gl::RASTERIZER_DISCARD,
        PrimitiveRestart = gl::PRIMITIVE_RESTART,
        PrimitiveRestartFixedIndex = gl::PRIMITIVE_RESTART_FIXED_INDEX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_gl_round_trips_known_values() {
        assert_eq!(BlendFactor::from_gl(gl::SRC_ALPHA), Some(BlendFactor::SrcAlpha));
        assert_eq!(BlendFactor::SrcAlpha.to_gl(), gl::SRC_ALPHA);
        assert_eq!(StencilOp::from_gl(gl::ZERO), Some(StencilOp::Zero));
        assert_eq!(LogicOp::from_gl(gl::INVERT), Some(LogicOp::Invert));
        assert_eq!(StencilOp::from_gl(gl::INVERT), Some(StencilOp::Invert));
    }

    #[test]
    fn from_gl_rejects_unknown_values() {
        assert_eq!(BlendFactor::from_gl(0xdead), None);
        assert_eq!(CompareFunc::from_gl(gl::KEEP), None);
        assert_eq!(Capability::from_gl(0), None);
    }

    #[test]
    fn packed_vertex_types_are_one_word() {
        for ty in [
            VertexType::Int2_10_10_10Rev,
            VertexType::UnsignedInt2_10_10_10Rev,
            VertexType::UnsignedInt10F11F11FRev,
        ] {
            assert!(ty.is_packed());
            assert_eq!(ty.component_bytes(), 4);
        }
        assert!(!VertexType::Float.is_packed());
    }

    #[test]
    fn buffer_target_slots_are_dense() {
        let targets = [
            BufferTarget::Array,
            BufferTarget::ElementArray,
            BufferTarget::Uniform,
            BufferTarget::ShaderStorage,
            BufferTarget::TransformFeedback,
            BufferTarget::AtomicCounter,
            BufferTarget::CopyRead,
            BufferTarget::CopyWrite,
            BufferTarget::DrawIndirect,
            BufferTarget::DispatchIndirect,
            BufferTarget::PixelPack,
            BufferTarget::PixelUnpack,
            BufferTarget::Texture,
            BufferTarget::Query,
        ];
        let mut seen = [false; BufferTarget::COUNT];
        for t in targets {
            assert!(!seen[t.slot()]);
            seen[t.slot()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
