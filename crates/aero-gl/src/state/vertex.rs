use tracing::debug;

use super::{index_in, replace, GlState, MAX_VERTEX_ATTRIBS, MAX_VERTEX_BINDINGS};
use crate::dirty::StateMask;
use crate::gl;
use crate::handle::Handle;
use crate::translate::{attribute_byte_size, AttribKind};
use crate::types::{BufferTarget, VertexType};

/// Format of one vertex attribute and the binding it reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub enabled: bool,
    /// Component count, 1 to 4, or `GL_BGRA`.
    pub size: u32,
    pub ty: VertexType,
    pub kind: AttribKind,
    pub binding: u32,
    pub relative_offset: u32,
}

impl VertexAttribute {
    /// Initial state of attribute `index`: disabled, four floats, reading binding `index`.
    pub const fn new(index: u32) -> Self {
        Self {
            enabled: false,
            size: 4,
            ty: VertexType::Float,
            kind: AttribKind::Float,
            binding: index,
            relative_offset: 0,
        }
    }

    pub fn byte_size(&self) -> u32 {
        attribute_byte_size(self.ty, self.size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexBinding {
    pub buffer: Handle,
    pub offset: u64,
    pub stride: u32,
    pub divisor: u32,
}

/// Whether `(size, ty, kind)` names an attribute format the legacy API accepts.
fn valid_format(size: u32, ty: VertexType, kind: AttribKind) -> bool {
    let bgra = size == gl::BGRA;
    if !(1..=4).contains(&size) && !bgra {
        return false;
    }
    match ty {
        VertexType::UnsignedInt10F11F11FRev => size == 3 && kind != AttribKind::Integer,
        VertexType::Int2_10_10_10Rev | VertexType::UnsignedInt2_10_10_10Rev => {
            (size == 4 || bgra) && kind != AttribKind::Double
        }
        _ if bgra => ty == VertexType::UnsignedByte && kind == AttribKind::Normalized,
        VertexType::Double => kind != AttribKind::Integer,
        VertexType::Float | VertexType::HalfFloat | VertexType::Fixed => {
            !matches!(kind, AttribKind::Integer | AttribKind::Double)
        }
        _ => kind != AttribKind::Double,
    }
}

impl GlState {
    pub fn vertex_attribute(&self, index: u32) -> Option<&VertexAttribute> {
        self.vertex.attributes.get(index as usize)
    }

    pub fn vertex_binding(&self, index: u32) -> Option<&VertexBinding> {
        self.vertex.bindings.get(index as usize)
    }

    pub fn element_buffer(&self) -> Handle {
        self.vertex.element_buffer
    }

    pub fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.set_vertex_attrib_enabled(index, true);
    }

    pub fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.set_vertex_attrib_enabled(index, false);
    }

    fn set_vertex_attrib_enabled(&mut self, index: u32, enabled: bool) {
        let Some(i) = index_in(index, MAX_VERTEX_ATTRIBS) else {
            return;
        };
        if replace(&mut self.vertex.attributes[i].enabled, enabled) {
            self.mark(StateMask::VERTEX_INPUT);
        }
    }

    /// `glVertexAttribPointer`: float attribute, optionally normalized.
    pub fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: u32,
        ty: u32,
        normalized: bool,
        stride: u32,
        offset: u64,
    ) {
        let kind = if normalized {
            AttribKind::Normalized
        } else {
            AttribKind::Float
        };
        self.attrib_pointer(index, size, ty, kind, stride, offset);
    }

    /// `glVertexAttribIPointer`: integer attribute.
    pub fn vertex_attrib_i_pointer(
        &mut self,
        index: u32,
        size: u32,
        ty: u32,
        stride: u32,
        offset: u64,
    ) {
        self.attrib_pointer(index, size, ty, AttribKind::Integer, stride, offset);
    }

    /// `glVertexAttribLPointer`: 64-bit float attribute.
    pub fn vertex_attrib_l_pointer(
        &mut self,
        index: u32,
        size: u32,
        ty: u32,
        stride: u32,
        offset: u64,
    ) {
        self.attrib_pointer(index, size, ty, AttribKind::Double, stride, offset);
    }

    /// The legacy pointer calls in terms of separate format and binding state: attribute
    /// `index` reads binding `index`, which takes the current `GL_ARRAY_BUFFER`.
    fn attrib_pointer(
        &mut self,
        index: u32,
        size: u32,
        ty: u32,
        kind: AttribKind,
        stride: u32,
        offset: u64,
    ) {
        let Some(i) = index_in(index, MAX_VERTEX_ATTRIBS.min(MAX_VERTEX_BINDINGS)) else {
            debug!(index, "ignoring out-of-range vertex attribute");
            return;
        };
        let Some(ty) = VertexType::from_gl(ty) else {
            debug!(index, ty, "unknown vertex attribute type");
            return;
        };
        if !valid_format(size, ty, kind) {
            debug!(index, size, ?ty, ?kind, "rejecting vertex attribute format");
            return;
        }

        let current = self.vertex.attributes[i];
        let attribute = VertexAttribute {
            enabled: current.enabled,
            size,
            ty,
            kind,
            binding: index,
            relative_offset: 0,
        };
        let binding = VertexBinding {
            buffer: self.buffers.targets[BufferTarget::Array.slot()],
            offset,
            stride: if stride == 0 {
                attribute.byte_size()
            } else {
                stride
            },
            divisor: self.vertex.bindings[i].divisor,
        };

        let mut mask = StateMask::empty();
        if replace(&mut self.vertex.attributes[i], attribute) {
            mask |= StateMask::VERTEX_INPUT;
        }
        if replace(&mut self.vertex.bindings[i], binding) {
            mask |= StateMask::VERTEX_BINDINGS;
        }
        self.mark(mask);
    }

    /// `glVertexAttribFormat` and its `I`/`L` variants, selected by `kind`.
    pub fn vertex_attrib_format(
        &mut self,
        index: u32,
        size: u32,
        ty: u32,
        kind: AttribKind,
        relative_offset: u32,
    ) {
        let Some(i) = index_in(index, MAX_VERTEX_ATTRIBS) else {
            return;
        };
        let Some(ty) = VertexType::from_gl(ty) else {
            return;
        };
        if !valid_format(size, ty, kind) {
            return;
        }
        let current = self.vertex.attributes[i];
        let attribute = VertexAttribute {
            size,
            ty,
            kind,
            relative_offset,
            ..current
        };
        if replace(&mut self.vertex.attributes[i], attribute) {
            self.mark(StateMask::VERTEX_INPUT);
        }
    }

    pub fn vertex_attrib_binding(&mut self, index: u32, binding: u32) {
        let Some(i) = index_in(index, MAX_VERTEX_ATTRIBS) else {
            return;
        };
        if index_in(binding, MAX_VERTEX_BINDINGS).is_none() {
            return;
        }
        if replace(&mut self.vertex.attributes[i].binding, binding) {
            self.mark(StateMask::VERTEX_INPUT);
        }
    }

    pub fn bind_vertex_buffer(&mut self, binding: u32, buffer: Handle, offset: u64, stride: u32) {
        let Some(i) = index_in(binding, MAX_VERTEX_BINDINGS) else {
            return;
        };
        if !self.objects.buffers.is_bindable(buffer) {
            return;
        }
        let current = self.vertex.bindings[i];
        let next = VertexBinding {
            buffer,
            offset,
            stride,
            ..current
        };
        if replace(&mut self.vertex.bindings[i], next) {
            self.mark(StateMask::VERTEX_BINDINGS);
        }
    }

    /// `glBindVertexBuffers`. The whole call is ignored if the range runs past the binding
    /// table or any handle is not live.
    ///
    /// # Panics
    ///
    /// Panics if the three slices differ in length.
    pub fn bind_vertex_buffers(
        &mut self,
        first: u32,
        buffers: &[Handle],
        offsets: &[u64],
        strides: &[u32],
    ) {
        assert!(
            buffers.len() == offsets.len() && buffers.len() == strides.len(),
            "bind_vertex_buffers: mismatched array lengths (buffers {}, offsets {}, strides {})",
            buffers.len(),
            offsets.len(),
            strides.len()
        );
        let first = first as usize;
        if first
            .checked_add(buffers.len())
            .map_or(true, |end| end > MAX_VERTEX_BINDINGS)
        {
            return;
        }
        if !buffers.iter().all(|b| self.objects.buffers.is_bindable(*b)) {
            return;
        }

        let mut changed = false;
        for (i, ((&buffer, &offset), &stride)) in
            buffers.iter().zip(offsets).zip(strides).enumerate()
        {
            let slot = &mut self.vertex.bindings[first + i];
            let next = VertexBinding {
                buffer,
                offset,
                stride,
                ..*slot
            };
            changed |= replace(slot, next);
        }
        if changed {
            self.mark(StateMask::VERTEX_BINDINGS);
        }
    }

    pub fn vertex_binding_divisor(&mut self, binding: u32, divisor: u32) {
        let Some(i) = index_in(binding, MAX_VERTEX_BINDINGS) else {
            return;
        };
        if replace(&mut self.vertex.bindings[i].divisor, divisor) {
            self.mark(StateMask::VERTEX_BINDINGS);
        }
    }

    /// `glVertexAttribDivisor`: routes attribute `index` to binding `index` and sets that
    /// binding's divisor.
    pub fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
        let Some(i) = index_in(index, MAX_VERTEX_ATTRIBS.min(MAX_VERTEX_BINDINGS)) else {
            return;
        };
        let mut mask = StateMask::empty();
        if replace(&mut self.vertex.attributes[i].binding, index) {
            mask |= StateMask::VERTEX_INPUT;
        }
        if replace(&mut self.vertex.bindings[i].divisor, divisor) {
            mask |= StateMask::VERTEX_BINDINGS;
        }
        self.mark(mask);
    }
}
