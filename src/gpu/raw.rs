//! The production [`GlContext`] backend over raw OpenGL entry points.
//!
//! Requires a current OpenGL 4.3+ context (shader storage buffers, compute
//! dispatch, program interface queries). The embedding window layer owns
//! context creation and hands its proc-address loader to [`RawGl::load`].

use std::ffi::CString;

use gl::types::{GLchar, GLenum, GLint, GLintptr, GLsizei, GLsizeiptr};
use glam::{IVec2, Mat2, Mat3, Mat4, UVec3, Vec2, Vec3, Vec4};

use super::context::{BufferUsage, ClearFormat, GlContext, RawHandle};
use super::shader::ShaderStage;

fn stage_to_gl(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        ShaderStage::Geometry => gl::GEOMETRY_SHADER,
        ShaderStage::Compute => gl::COMPUTE_SHADER,
    }
}

fn usage_to_gl(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::StreamDraw => gl::STREAM_DRAW,
    }
}

/// Driver entry points loaded from the current OpenGL context.
///
/// The loaded function pointers are process-global (the `gl` crate's
/// model), so this type is a zero-sized witness that loading happened;
/// constructing it any other way is not possible.
pub struct RawGl {
    _priv: (),
}

impl RawGl {
    /// Load the OpenGL entry points through the window layer's
    /// proc-address lookup and return the context witness.
    pub fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const std::ffi::c_void,
    {
        gl::load_with(loader);
        Self { _priv: () }
    }
}

impl GlContext for RawGl {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        unsafe { gl::CreateShader(stage_to_gl(stage)) }
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        let ptr = source.as_ptr().cast::<GLchar>();
        let len = source.len() as GLint;
        unsafe {
            gl::ShaderSource(shader, 1, &ptr, &len);
        }
    }

    fn compile_shader(&self, shader: RawHandle) -> bool {
        let mut status: GLint = 0;
        unsafe {
            gl::CompileShader(shader);
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        }
        status == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        let mut len: GLint = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        }
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                len,
                &mut written,
                buf.as_mut_ptr().cast::<GLchar>(),
            );
        }
        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn delete_shader(&self, shader: RawHandle) {
        unsafe {
            gl::DeleteShader(shader);
        }
    }

    fn create_program(&self) -> RawHandle {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        unsafe {
            gl::AttachShader(program, shader);
        }
    }

    fn detach_shader(&self, program: RawHandle, shader: RawHandle) {
        unsafe {
            gl::DetachShader(program, shader);
        }
    }

    fn link_program(&self, program: RawHandle) -> bool {
        let mut status: GLint = 0;
        unsafe {
            gl::LinkProgram(program);
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        }
        status == GLint::from(gl::TRUE)
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        let mut len: GLint = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        }
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                len,
                &mut written,
                buf.as_mut_ptr().cast::<GLchar>(),
            );
        }
        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn delete_program(&self, program: RawHandle) {
        unsafe {
            gl::DeleteProgram(program);
        }
    }

    fn use_program(&self, program: Option<RawHandle>) {
        unsafe {
            gl::UseProgram(program.unwrap_or(0));
        }
    }

    fn create_vertex_array(&self) -> RawHandle {
        let mut vao: RawHandle = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        vao
    }

    fn bind_vertex_array(&self, vao: Option<RawHandle>) {
        unsafe {
            gl::BindVertexArray(vao.unwrap_or(0));
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe {
            gl::EnableVertexAttribArray(index);
        }
    }

    fn delete_vertex_array(&self, vao: RawHandle) {
        unsafe {
            gl::DeleteVertexArrays(1, &vao);
        }
    }

    fn create_buffer(&self) -> RawHandle {
        let mut buffer: RawHandle = 0;
        unsafe {
            gl::GenBuffers(1, &mut buffer);
        }
        buffer
    }

    fn bind_storage_buffer(&self, buffer: Option<RawHandle>) {
        unsafe {
            gl::BindBuffer(gl::SHADER_STORAGE_BUFFER, buffer.unwrap_or(0));
        }
    }

    fn storage_buffer_data(&self, data: &[u8], usage: BufferUsage) {
        unsafe {
            gl::BufferData(
                gl::SHADER_STORAGE_BUFFER,
                data.len() as GLsizeiptr,
                data.as_ptr().cast(),
                usage_to_gl(usage),
            );
        }
    }

    fn storage_buffer_sub_data(&self, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                gl::SHADER_STORAGE_BUFFER,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr().cast(),
            );
        }
    }

    fn bind_storage_buffer_base(&self, index: u32, buffer: RawHandle) {
        unsafe {
            gl::BindBufferBase(gl::SHADER_STORAGE_BUFFER, index, buffer);
        }
    }

    fn clear_storage_buffer(&self, format: ClearFormat) {
        let (internal, layout, ty) = match format {
            ClearFormat::Rg32Ui => {
                (gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT)
            }
            ClearFormat::Rgba32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
        };
        unsafe {
            // Null data zero-fills the whole buffer.
            gl::ClearBufferData(
                gl::SHADER_STORAGE_BUFFER,
                internal,
                layout,
                ty,
                std::ptr::null(),
            );
        }
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        unsafe {
            gl::DeleteBuffers(1, &buffer);
        }
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<i32> {
        let cname = CString::new(name).ok()?;
        let location =
            unsafe { gl::GetUniformLocation(program, cname.as_ptr()) };
        (location >= 0).then_some(location)
    }

    fn set_uniform_i32(&self, program: RawHandle, location: i32, value: i32) {
        unsafe {
            gl::ProgramUniform1i(program, location, value);
        }
    }

    fn set_uniform_f32(&self, program: RawHandle, location: i32, value: f32) {
        unsafe {
            gl::ProgramUniform1f(program, location, value);
        }
    }

    fn set_uniform_vec2(&self, program: RawHandle, location: i32, value: Vec2) {
        let v = value.to_array();
        unsafe {
            gl::ProgramUniform2fv(program, location, 1, v.as_ptr());
        }
    }

    fn set_uniform_vec3(&self, program: RawHandle, location: i32, value: Vec3) {
        let v = value.to_array();
        unsafe {
            gl::ProgramUniform3fv(program, location, 1, v.as_ptr());
        }
    }

    fn set_uniform_vec4(&self, program: RawHandle, location: i32, value: Vec4) {
        let v = value.to_array();
        unsafe {
            gl::ProgramUniform4fv(program, location, 1, v.as_ptr());
        }
    }

    fn set_uniform_ivec2(
        &self,
        program: RawHandle,
        location: i32,
        value: IVec2,
    ) {
        let v = value.to_array();
        unsafe {
            gl::ProgramUniform2iv(program, location, 1, v.as_ptr());
        }
    }

    fn set_uniform_mat2(&self, program: RawHandle, location: i32, value: &Mat2) {
        let m = value.to_cols_array();
        unsafe {
            gl::ProgramUniformMatrix2fv(
                program,
                location,
                1,
                gl::FALSE,
                m.as_ptr(),
            );
        }
    }

    fn set_uniform_mat3(&self, program: RawHandle, location: i32, value: &Mat3) {
        let m = value.to_cols_array();
        unsafe {
            gl::ProgramUniformMatrix3fv(
                program,
                location,
                1,
                gl::FALSE,
                m.as_ptr(),
            );
        }
    }

    fn set_uniform_mat4(&self, program: RawHandle, location: i32, value: &Mat4) {
        let m = value.to_cols_array();
        unsafe {
            gl::ProgramUniformMatrix4fv(
                program,
                location,
                1,
                gl::FALSE,
                m.as_ptr(),
            );
        }
    }

    fn storage_block_binding(
        &self,
        program: RawHandle,
        block_name: &str,
    ) -> Option<u32> {
        let cname = CString::new(block_name).ok()?;
        let index = unsafe {
            gl::GetProgramResourceIndex(
                program,
                gl::SHADER_STORAGE_BLOCK,
                cname.as_ptr(),
            )
        };
        if index == gl::INVALID_INDEX {
            return None;
        }

        let prop: GLenum = gl::BUFFER_BINDING;
        let mut written: GLsizei = 0;
        let mut binding: GLint = -1;
        unsafe {
            gl::GetProgramResourceiv(
                program,
                gl::SHADER_STORAGE_BLOCK,
                index,
                1,
                &prop,
                1,
                &mut written,
                &mut binding,
            );
        }
        u32::try_from(binding).ok()
    }

    fn dispatch_compute(&self, groups: UVec3) {
        unsafe {
            gl::DispatchCompute(groups.x, groups.y, groups.z);
        }
    }

    fn storage_memory_barrier(&self) {
        unsafe {
            gl::MemoryBarrier(gl::SHADER_STORAGE_BARRIER_BIT);
        }
    }

    fn draw_triangles(&self, vertex_count: i32) {
        unsafe {
            gl::DrawArrays(gl::TRIANGLES, 0, vertex_count);
        }
    }
}
