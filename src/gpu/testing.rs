//! A recording, in-memory [`GlContext`] for unit tests.
//!
//! `FakeGl` hands out incrementing handles, tracks which objects are
//! live, mirrors buffer contents so upload paths can be verified, and can
//! be programmed to fail compiles (sources containing `#error`) or the
//! next link. Call recording keeps the driver-facing order observable:
//! slot replay order, bind/unbind pairing, and the barrier between
//! dispatch and draw are all asserted against [`FakeGl::calls`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use glam::{IVec2, Mat2, Mat3, Mat4, UVec3, Vec2, Vec3, Vec4};

use super::context::{BufferUsage, ClearFormat, GlContext, RawHandle};
use super::shader::ShaderStage;

/// A uniform value as observed by the fake driver.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec2(IVec2),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader { shader: RawHandle, stage: ShaderStage },
    ShaderSource { shader: RawHandle },
    CompileShader { shader: RawHandle, ok: bool },
    DeleteShader(RawHandle),
    CreateProgram(RawHandle),
    AttachShader { program: RawHandle, shader: RawHandle },
    DetachShader { program: RawHandle, shader: RawHandle },
    LinkProgram { program: RawHandle, ok: bool },
    DeleteProgram(RawHandle),
    UseProgram(Option<RawHandle>),
    CreateVertexArray(RawHandle),
    BindVertexArray(Option<RawHandle>),
    EnableVertexAttrib(u32),
    DeleteVertexArray(RawHandle),
    CreateBuffer(RawHandle),
    BindStorageBuffer(Option<RawHandle>),
    BufferData { len: usize, usage: BufferUsage },
    BufferSubData { offset: usize, len: usize },
    BindStorageBufferBase { index: u32, buffer: RawHandle },
    ClearStorageBuffer(ClearFormat),
    DeleteBuffer(RawHandle),
    SetUniform { program: RawHandle, name: String, value: UniformValue },
    DispatchCompute(UVec3),
    StorageMemoryBarrier,
    DrawTriangles(i32),
}

/// Recording in-memory GL driver.
#[derive(Default)]
pub struct FakeGl {
    calls: RefCell<Vec<Call>>,
    next_handle: Cell<RawHandle>,
    next_location: Cell<i32>,

    live_shaders: RefCell<HashSet<RawHandle>>,
    live_programs: RefCell<HashSet<RawHandle>>,
    live_buffers: RefCell<HashSet<RawHandle>>,
    live_vertex_arrays: RefCell<HashSet<RawHandle>>,

    shader_sources: RefCell<HashMap<RawHandle, String>>,
    bound_storage: Cell<Option<RawHandle>>,
    buffer_contents: RefCell<HashMap<RawHandle, Vec<u8>>>,

    uniform_locations: RefCell<HashMap<(RawHandle, String), i32>>,
    ignored_uniforms: RefCell<HashSet<String>>,
    storage_blocks: RefCell<HashMap<String, u32>>,

    fail_next_link: Cell<bool>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    // -- test configuration ----------------------------------------------

    /// Declare a storage block visible through reflection on every
    /// program, at the given binding point.
    pub fn define_storage_block(&self, name: &str, binding: u32) {
        let _ = self
            .storage_blocks
            .borrow_mut()
            .insert(name.to_owned(), binding);
    }

    /// Make a uniform name unresolvable, as when a shader variant does
    /// not declare it.
    pub fn ignore_uniform(&self, name: &str) {
        let _ = self.ignored_uniforms.borrow_mut().insert(name.to_owned());
    }

    /// Fail the next `link_program` with a diagnostic log.
    pub fn fail_next_link(&self) {
        self.fail_next_link.set(true);
    }

    // -- observation -----------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn calls_matching(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    pub fn live_shader_count(&self) -> usize {
        self.live_shaders.borrow().len()
    }

    pub fn live_program_count(&self) -> usize {
        self.live_programs.borrow().len()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.live_buffers.borrow().len()
    }

    pub fn live_vertex_array_count(&self) -> usize {
        self.live_vertex_arrays.borrow().len()
    }

    /// The bytes last committed to a buffer.
    pub fn buffer_contents(&self, buffer: RawHandle) -> Vec<u8> {
        self.buffer_contents
            .borrow()
            .get(&buffer)
            .cloned()
            .unwrap_or_default()
    }

    // -- internals -------------------------------------------------------

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn fresh_handle(&self) -> RawHandle {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        handle
    }

    fn uniform_name(&self, program: RawHandle, location: i32) -> String {
        let locations = self.uniform_locations.borrow();
        for ((p, name), l) in locations.iter() {
            if *p == program && *l == location {
                return name.clone();
            }
        }
        format!("location#{location}")
    }

    fn record_uniform(
        &self,
        program: RawHandle,
        location: i32,
        value: UniformValue,
    ) {
        let name = self.uniform_name(program, location);
        self.record(Call::SetUniform { program, name, value });
    }
}

impl GlContext for FakeGl {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        let shader = self.fresh_handle();
        let _ = self.live_shaders.borrow_mut().insert(shader);
        self.record(Call::CreateShader { shader, stage });
        shader
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        let _ = self
            .shader_sources
            .borrow_mut()
            .insert(shader, source.to_owned());
        self.record(Call::ShaderSource { shader });
    }

    fn compile_shader(&self, shader: RawHandle) -> bool {
        // The `#error` directive is the test hook for a failing source.
        let ok = self
            .shader_sources
            .borrow()
            .get(&shader)
            .map_or(true, |source| !source.contains("#error"));
        self.record(Call::CompileShader { shader, ok });
        ok
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        let failed = self
            .shader_sources
            .borrow()
            .get(&shader)
            .is_some_and(|source| source.contains("#error"));
        if failed {
            "0:1: error: encountered #error directive".to_owned()
        } else {
            String::new()
        }
    }

    fn delete_shader(&self, shader: RawHandle) {
        let _ = self.live_shaders.borrow_mut().remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> RawHandle {
        let program = self.fresh_handle();
        let _ = self.live_programs.borrow_mut().insert(program);
        self.record(Call::CreateProgram(program));
        program
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        self.record(Call::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: RawHandle, shader: RawHandle) {
        self.record(Call::DetachShader { program, shader });
    }

    fn link_program(&self, program: RawHandle) -> bool {
        let ok = !self.fail_next_link.replace(false);
        self.record(Call::LinkProgram { program, ok });
        ok
    }

    fn program_info_log(&self, _program: RawHandle) -> String {
        "error: undefined reference in stage linkage".to_owned()
    }

    fn delete_program(&self, program: RawHandle) {
        let _ = self.live_programs.borrow_mut().remove(&program);
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<RawHandle>) {
        self.record(Call::UseProgram(program));
    }

    fn create_vertex_array(&self) -> RawHandle {
        let vao = self.fresh_handle();
        let _ = self.live_vertex_arrays.borrow_mut().insert(vao);
        self.record(Call::CreateVertexArray(vao));
        vao
    }

    fn bind_vertex_array(&self, vao: Option<RawHandle>) {
        self.record(Call::BindVertexArray(vao));
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.record(Call::EnableVertexAttrib(index));
    }

    fn delete_vertex_array(&self, vao: RawHandle) {
        let _ = self.live_vertex_arrays.borrow_mut().remove(&vao);
        self.record(Call::DeleteVertexArray(vao));
    }

    fn create_buffer(&self) -> RawHandle {
        let buffer = self.fresh_handle();
        let _ = self.live_buffers.borrow_mut().insert(buffer);
        self.record(Call::CreateBuffer(buffer));
        buffer
    }

    fn bind_storage_buffer(&self, buffer: Option<RawHandle>) {
        self.bound_storage.set(buffer);
        self.record(Call::BindStorageBuffer(buffer));
    }

    fn storage_buffer_data(&self, data: &[u8], usage: BufferUsage) {
        if let Some(buffer) = self.bound_storage.get() {
            let _ = self
                .buffer_contents
                .borrow_mut()
                .insert(buffer, data.to_vec());
        }
        self.record(Call::BufferData { len: data.len(), usage });
    }

    fn storage_buffer_sub_data(&self, offset: usize, data: &[u8]) {
        if let Some(buffer) = self.bound_storage.get() {
            let mut contents = self.buffer_contents.borrow_mut();
            let bytes = contents.entry(buffer).or_default();
            if bytes.len() < offset + data.len() {
                bytes.resize(offset + data.len(), 0);
            }
            bytes[offset..offset + data.len()].copy_from_slice(data);
        }
        self.record(Call::BufferSubData { offset, len: data.len() });
    }

    fn bind_storage_buffer_base(&self, index: u32, buffer: RawHandle) {
        self.record(Call::BindStorageBufferBase { index, buffer });
    }

    fn clear_storage_buffer(&self, format: ClearFormat) {
        if let Some(buffer) = self.bound_storage.get() {
            if let Some(bytes) =
                self.buffer_contents.borrow_mut().get_mut(&buffer)
            {
                bytes.fill(0);
            }
        }
        self.record(Call::ClearStorageBuffer(format));
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        let _ = self.live_buffers.borrow_mut().remove(&buffer);
        let _ = self.buffer_contents.borrow_mut().remove(&buffer);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<i32> {
        if self.ignored_uniforms.borrow().contains(name) {
            return None;
        }
        let mut locations = self.uniform_locations.borrow_mut();
        let location = *locations
            .entry((program, name.to_owned()))
            .or_insert_with(|| {
                let location = self.next_location.get();
                self.next_location.set(location + 1);
                location
            });
        Some(location)
    }

    fn set_uniform_i32(&self, program: RawHandle, location: i32, value: i32) {
        self.record_uniform(program, location, UniformValue::I32(value));
    }

    fn set_uniform_f32(&self, program: RawHandle, location: i32, value: f32) {
        self.record_uniform(program, location, UniformValue::F32(value));
    }

    fn set_uniform_vec2(&self, program: RawHandle, location: i32, value: Vec2) {
        self.record_uniform(program, location, UniformValue::Vec2(value));
    }

    fn set_uniform_vec3(&self, program: RawHandle, location: i32, value: Vec3) {
        self.record_uniform(program, location, UniformValue::Vec3(value));
    }

    fn set_uniform_vec4(&self, program: RawHandle, location: i32, value: Vec4) {
        self.record_uniform(program, location, UniformValue::Vec4(value));
    }

    fn set_uniform_ivec2(
        &self,
        program: RawHandle,
        location: i32,
        value: IVec2,
    ) {
        self.record_uniform(program, location, UniformValue::IVec2(value));
    }

    fn set_uniform_mat2(&self, program: RawHandle, location: i32, value: &Mat2) {
        self.record_uniform(program, location, UniformValue::Mat2(*value));
    }

    fn set_uniform_mat3(&self, program: RawHandle, location: i32, value: &Mat3) {
        self.record_uniform(program, location, UniformValue::Mat3(*value));
    }

    fn set_uniform_mat4(&self, program: RawHandle, location: i32, value: &Mat4) {
        self.record_uniform(program, location, UniformValue::Mat4(*value));
    }

    fn storage_block_binding(
        &self,
        _program: RawHandle,
        block_name: &str,
    ) -> Option<u32> {
        self.storage_blocks.borrow().get(block_name).copied()
    }

    fn dispatch_compute(&self, groups: UVec3) {
        self.record(Call::DispatchCompute(groups));
    }

    fn storage_memory_barrier(&self) {
        self.record(Call::StorageMemoryBarrier);
    }

    fn draw_triangles(&self, vertex_count: i32) {
        self.record(Call::DrawTriangles(vertex_count));
    }
}
