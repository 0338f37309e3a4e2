use aero_gl::translate::AttribKind;
use aero_gl::types::VertexType;
use aero_gl::vertex_array::{capture, restore};
use aero_gl::{gl, GlState, Handle, HandleTable, PipelineDescription, StateMask};
use ash::vk;
use pretty_assertions::assert_eq;

fn interleaved_layout(state: &mut GlState, vbo: Handle) {
    state.bind_buffer(gl::ARRAY_BUFFER, vbo);
    state.enable_vertex_attrib_array(0);
    state.vertex_attrib_pointer(0, 3, gl::FLOAT, false, 24, 0);
    state.enable_vertex_attrib_array(1);
    state.vertex_attrib_pointer(1, 4, gl::UNSIGNED_BYTE, true, 24, 12);
    state.enable_vertex_attrib_array(2);
    state.vertex_attrib_i_pointer(2, 2, gl::SHORT, 24, 16);
}

#[test]
fn vertex_array_round_trip() {
    let mut state = GlState::default();
    let vao = state.create_vertex_array();
    let vbo = state.create_buffer();
    let ibo = state.create_buffer();

    state.bind_vertex_array(vao);
    interleaved_layout(&mut state, vbo);
    state.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
    let expected = capture(&state);

    state.bind_vertex_array(Handle::NONE);
    assert_ne!(capture(&state), expected);
    assert_eq!(state.element_buffer(), Handle::NONE);

    state.bind_vertex_array(vao);
    assert_eq!(capture(&state), expected);
    assert_eq!(state.element_buffer(), ibo);
}

#[test]
fn pointer_calls_latch_the_array_buffer() {
    let mut state = GlState::default();
    let vbo = state.create_buffer();
    interleaved_layout(&mut state, vbo);

    // Rebinding GL_ARRAY_BUFFER afterwards does not move existing attributes.
    let other = state.create_buffer();
    state.bind_buffer(gl::ARRAY_BUFFER, other);

    for index in 0..3 {
        let binding = state.vertex_binding(index).unwrap();
        assert_eq!(binding.buffer, vbo);
        assert_eq!(binding.stride, 24);
    }
    assert_eq!(state.vertex_binding(1).unwrap().offset, 12);

    let normal = state.vertex_attribute(1).unwrap();
    assert_eq!(normal.ty, VertexType::UnsignedByte);
    assert_eq!(normal.kind, AttribKind::Normalized);
    assert_eq!(state.vertex_attribute(2).unwrap().kind, AttribKind::Integer);
}

#[test]
fn tight_stride_is_computed_from_the_format() {
    let mut state = GlState::default();
    let vbo = state.create_buffer();
    state.bind_buffer(gl::ARRAY_BUFFER, vbo);
    state.vertex_attrib_pointer(0, 3, gl::FLOAT, false, 0, 0);
    state.vertex_attrib_pointer(1, 4, gl::HALF_FLOAT, false, 0, 0);
    assert_eq!(state.vertex_binding(0).unwrap().stride, 12);
    assert_eq!(state.vertex_binding(1).unwrap().stride, 8);
}

#[test]
fn invalid_formats_are_ignored() {
    let mut state = GlState::default();
    state.tracker().clear(StateMask::all());
    state.vertex_attrib_format(0, 5, gl::FLOAT, AttribKind::Float, 0);
    state.vertex_attrib_format(0, 4, 0x1234, AttribKind::Float, 0);
    state.vertex_attrib_format(16, 4, gl::FLOAT, AttribKind::Float, 0);
    assert_eq!(state.dirty(), StateMask::empty());
}

#[test]
fn description_from_a_vertex_array() {
    let mut state = GlState::default();
    let vao = state.create_vertex_array();
    let vbo = state.create_buffer();
    state.bind_vertex_array(vao);
    interleaved_layout(&mut state, vbo);
    state.vertex_attrib_divisor(1, 1);

    let desc = PipelineDescription::capture(&state);
    let formats: Vec<_> = desc.vertex_attributes().iter().map(|a| a.format).collect();
    assert_eq!(
        formats,
        [
            vk::Format::R32G32B32_SFLOAT,
            vk::Format::R8G8B8A8_UNORM,
            vk::Format::R16G16_SINT,
        ]
    );
    let rates: Vec<_> = desc.vertex_bindings().iter().map(|b| b.input_rate).collect();
    assert_eq!(
        rates,
        [
            vk::VertexInputRate::VERTEX,
            vk::VertexInputRate::INSTANCE,
            vk::VertexInputRate::VERTEX,
        ]
    );
    assert!(desc.instance_divisors.is_empty());
}

#[test]
fn snapshot_restore_is_exact() {
    let mut a = GlState::default();
    let vbo = a.create_buffer();
    interleaved_layout(&mut a, vbo);
    let snapshot = capture(&a);

    let mut b = GlState::default();
    let default_hash = b.pipeline_hash();
    let epoch = b.tracker().pipeline_epoch();
    b.tracker().clear(StateMask::all());

    restore(&mut b, &snapshot);
    assert_eq!(b.vertex_layout(), &snapshot);
    assert_eq!(
        b.dirty(),
        StateMask::VERTEX_INPUT
            | StateMask::VERTEX_BINDINGS
            | StateMask::ELEMENT_BUFFER
            | StateMask::VERTEX_ARRAY_OBJECT
    );
    assert!(b.tracker().pipeline_epoch() > epoch);
    assert_ne!(b.pipeline_hash(), default_hash);
    assert_eq!(b.pipeline_hash(), a.pipeline_hash());
}

#[test]
fn restoring_the_same_layout_still_marks() {
    let mut state = GlState::default();
    let snapshot = capture(&state);
    state.tracker().clear(StateMask::all());
    restore(&mut state, &snapshot);
    assert!(state.is_dirty(StateMask::VERTEX_INPUT | StateMask::ELEMENT_BUFFER));
}

#[test]
fn handle_table_remove_is_idempotent() {
    let mut table = HandleTable::new();
    let h = Handle::from_raw(42);
    assert_eq!(table.remove(h), None);
    assert_eq!(table.len(), 0);

    table.put(h, "first");
    assert_eq!(table.put(h, "second"), Some("first"));
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(h), Some(&"second"));

    assert_eq!(table.remove(h), Some("second"));
    assert_eq!(table.remove(h), None);
    assert_eq!(table.len(), 0);
}
