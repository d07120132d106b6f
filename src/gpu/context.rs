//! The seam between the resource layer and the graphics driver.
//!
//! Every raw GL call the crate issues goes through the [`GlContext`] trait.
//! Production code uses the FFI-backed [`crate::gpu::raw::RawGl`]; unit
//! tests substitute a recording fake. All GPU state touched here is global
//! single-slot context state (bound buffer, bound program, binding points),
//! mutated from exactly one thread, so the trait takes `&self` throughout
//! and objects share it via `Rc`.

use glam::{IVec2, Mat2, Mat3, Mat4, UVec3, Vec2, Vec3, Vec4};

use super::shader::ShaderStage;

/// A native GL object name. Zero is the invalid/uninitialized name.
pub type RawHandle = u32;

/// How the GPU should expect a buffer to be read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    /// Written once per frame or less, read by the GPU many times.
    #[default]
    DynamicDraw,
    /// Written once, read many times.
    StaticDraw,
    /// Written and consumed roughly once per frame.
    StreamDraw,
}

/// Texel layout used when zero-filling a storage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearFormat {
    /// Two 32-bit unsigned integers per element (pixel accumulation).
    Rg32Ui,
    /// Four 32-bit floats per element (particle state).
    Rgba32F,
}

/// Raw graphics entry points used by the resource layer and the frame
/// orchestrator.
///
/// Object-safe by design: wrappers hold `Rc<dyn GlContext>` so buffers can
/// be shared across programs while still reaching the driver on drop.
/// Creation calls return the raw name, with `0` signalling that the
/// platform refused the allocation.
pub trait GlContext {
    // -- shader objects --------------------------------------------------

    /// Create a shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> RawHandle;
    /// Replace the shader's source text.
    fn shader_source(&self, shader: RawHandle, source: &str);
    /// Compile the shader; returns the compile status.
    fn compile_shader(&self, shader: RawHandle) -> bool;
    /// The compile diagnostic log (empty when the driver has nothing to say).
    fn shader_info_log(&self, shader: RawHandle) -> String;
    /// Delete a shader object.
    fn delete_shader(&self, shader: RawHandle);

    // -- programs --------------------------------------------------------

    /// Create an empty program object.
    fn create_program(&self) -> RawHandle;
    /// Attach a compiled shader to a program.
    fn attach_shader(&self, program: RawHandle, shader: RawHandle);
    /// Detach a shader from a program.
    fn detach_shader(&self, program: RawHandle, shader: RawHandle);
    /// Link the program; returns the link status.
    fn link_program(&self, program: RawHandle) -> bool;
    /// The link diagnostic log.
    fn program_info_log(&self, program: RawHandle) -> String;
    /// Delete a program object.
    fn delete_program(&self, program: RawHandle);
    /// Make a program current, or clear the active program with `None`.
    fn use_program(&self, program: Option<RawHandle>);

    // -- vertex arrays ---------------------------------------------------

    /// Create a vertex-array object.
    fn create_vertex_array(&self) -> RawHandle;
    /// Bind a vertex-array object, or clear the binding with `None`.
    fn bind_vertex_array(&self, vao: Option<RawHandle>);
    /// Enable a generic vertex attribute on the bound vertex array.
    fn enable_vertex_attrib(&self, index: u32);
    /// Delete a vertex-array object.
    fn delete_vertex_array(&self, vao: RawHandle);

    // -- buffers (shader-storage target) ---------------------------------

    /// Create a buffer name (no backing allocation yet).
    fn create_buffer(&self) -> RawHandle;
    /// Bind a buffer to the shader-storage target, or clear it with `None`.
    fn bind_storage_buffer(&self, buffer: Option<RawHandle>);
    /// (Re)allocate the bound buffer and upload `data` in full.
    fn storage_buffer_data(&self, data: &[u8], usage: BufferUsage);
    /// Overwrite part of the bound buffer in place.
    fn storage_buffer_sub_data(&self, offset: usize, data: &[u8]);
    /// Attach a buffer to an indexed storage binding point.
    fn bind_storage_buffer_base(&self, index: u32, buffer: RawHandle);
    /// Zero-fill the bound buffer.
    fn clear_storage_buffer(&self, format: ClearFormat);
    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: RawHandle);

    // -- uniforms --------------------------------------------------------

    /// Resolve a uniform name to its location, `None` when the linked
    /// program has no active uniform of that name.
    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<i32>;
    /// Set an `int` (also carries `bool` as 0/1).
    fn set_uniform_i32(&self, program: RawHandle, location: i32, value: i32);
    /// Set a `float`.
    fn set_uniform_f32(&self, program: RawHandle, location: i32, value: f32);
    /// Set a `vec2`.
    fn set_uniform_vec2(&self, program: RawHandle, location: i32, value: Vec2);
    /// Set a `vec3`.
    fn set_uniform_vec3(&self, program: RawHandle, location: i32, value: Vec3);
    /// Set a `vec4`.
    fn set_uniform_vec4(&self, program: RawHandle, location: i32, value: Vec4);
    /// Set an `ivec2`.
    fn set_uniform_ivec2(&self, program: RawHandle, location: i32, value: IVec2);
    /// Set a `mat2`.
    fn set_uniform_mat2(&self, program: RawHandle, location: i32, value: &Mat2);
    /// Set a `mat3`.
    fn set_uniform_mat3(&self, program: RawHandle, location: i32, value: &Mat3);
    /// Set a `mat4`.
    fn set_uniform_mat4(&self, program: RawHandle, location: i32, value: &Mat4);

    // -- reflection ------------------------------------------------------

    /// The binding point assigned to a named shader storage block, `None`
    /// when the linked program declares no block of that name.
    fn storage_block_binding(
        &self,
        program: RawHandle,
        block_name: &str,
    ) -> Option<u32>;

    // -- direct pipeline calls (frame orchestration) ---------------------

    /// Launch the active compute program over a 3-D work-group grid.
    fn dispatch_compute(&self, groups: UVec3);
    /// Order shader-storage writes before subsequent reads.
    fn storage_memory_barrier(&self);
    /// Draw `vertex_count` vertices as non-indexed triangles.
    fn draw_triangles(&self, vertex_count: i32);
}
