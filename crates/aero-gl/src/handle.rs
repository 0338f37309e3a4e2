use std::fmt;

/// Opaque name for a legacy-API object (texture, buffer, program, ...).
///
/// Zero is reserved for "unbound"; every allocated handle is non-zero.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    pub const NONE: Handle = Handle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("Handle(none)")
        } else {
            write!(f, "Handle({})", self.0)
        }
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

/// Resource classes that own a handle namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Buffer,
    Shader,
    Program,
    Sampler,
    Framebuffer,
    VertexArray,
    Query,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        Self::Texture,
        Self::Buffer,
        Self::Shader,
        Self::Program,
        Self::Sampler,
        Self::Framebuffer,
        Self::VertexArray,
        Self::Query,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Texture => "texture",
            Self::Buffer => "buffer",
            Self::Shader => "shader",
            Self::Program => "program",
            Self::Sampler => "sampler",
            Self::Framebuffer => "framebuffer",
            Self::VertexArray => "vertex_array",
            Self::Query => "query",
        };
        f.write_str(s)
    }
}

/// Monotonic handle generator for one resource class. Handles are never reused.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    pub fn alloc(&mut self) -> Handle {
        let handle = Handle(self.next);
        self.next = self
            .next
            .checked_add(1)
            .expect("handle namespace exhausted");
        handle
    }

    /// Number of handles handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}
