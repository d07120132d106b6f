//! GPU resource and program lifecycle management.
//!
//! Owns the scarce, externally-allocated driver objects — compiled shader
//! stages, linked programs, and shader storage buffers — and guarantees
//! each is released exactly once, including on the error paths of failed
//! compiles and links. All driver traffic goes through the [`context::GlContext`]
//! seam so the layer runs against the FFI backend in production and a
//! recording fake under test.

/// The driver entry-point seam and buffer usage/clear hints.
pub mod context;
/// Linked programs: uniforms, activation, storage slot table.
pub mod program;
/// FFI backend over raw OpenGL 4.3+ entry points.
pub mod raw;
/// Shader stages, source resolution, compiled units.
pub mod shader;
/// Shared shader storage buffers with create-or-resize updates.
pub mod storage_buffer;

#[cfg(test)]
pub(crate) mod testing;
