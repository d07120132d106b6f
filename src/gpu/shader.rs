//! Compiled shader units and source-name resolution.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::context::{GlContext, RawHandle};
use crate::error::SwirlError;

/// One stage of a GPU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Per-vertex processing.
    Vertex,
    /// Per-fragment processing.
    Fragment,
    /// Primitive amplification between vertex and fragment.
    Geometry,
    /// General-purpose compute.
    Compute,
}

impl ShaderStage {
    /// Human-readable stage name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::Compute => "compute",
        }
    }
}

/// Resolve a shader name against the search order rooted at `base`:
/// `base/name`, then `base/Shaders/name`, then the name taken directly as
/// a path. First existing entry wins.
fn resolve_in(base: &Path, name: &str) -> Option<PathBuf> {
    let direct = base.join(name);
    if direct.exists() {
        return Some(direct);
    }

    let in_shader_dir = base.join("Shaders").join(name);
    if in_shader_dir.exists() {
        return Some(in_shader_dir);
    }

    let as_path = PathBuf::from(name);
    if as_path.exists() {
        return Some(as_path);
    }

    None
}

/// Locate a shader source file by name relative to the current working
/// directory: the name itself, then a `Shaders/` subdirectory, then the
/// name taken directly as a path.
pub fn resolve_source_path(name: &str) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    resolve_in(&cwd, name)
}

/// One compiled shader stage.
///
/// Construction either yields a valid non-zero handle with successfully
/// compiled source, or fails; there is no partially-compiled state. The
/// handle is released exactly once on drop.
pub struct Shader {
    ctx: Rc<dyn GlContext>,
    handle: RawHandle,
    stage: ShaderStage,
    origin: Option<String>,
}

impl Shader {
    /// Compile a shader from a source file located by name.
    ///
    /// # Errors
    ///
    /// `ShaderNotFound` when the search order yields no existing file,
    /// `Io` when the file cannot be read, and the [`Self::from_source`]
    /// errors thereafter.
    pub fn from_name(
        ctx: Rc<dyn GlContext>,
        name: &str,
        stage: ShaderStage,
    ) -> Result<Self, SwirlError> {
        let path = resolve_source_path(name)
            .ok_or_else(|| SwirlError::ShaderNotFound(name.to_owned()))?;
        let source = std::fs::read_to_string(&path)?;
        let mut shader = Self::from_source(ctx, stage, &source)?;
        shader.origin = Some(name.to_owned());
        Ok(shader)
    }

    /// Compile a shader from literal source text.
    ///
    /// # Errors
    ///
    /// `ResourceAllocation` when the driver refuses a shader object, and
    /// `ShaderCompile` (carrying the driver log) when compilation fails.
    /// On the failure path the temporary shader object is deleted before
    /// the error returns.
    pub fn from_source(
        ctx: Rc<dyn GlContext>,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self, SwirlError> {
        let handle = ctx.create_shader(stage);
        if handle == 0 {
            return Err(SwirlError::ResourceAllocation("shader object"));
        }

        ctx.shader_source(handle, source);
        if !ctx.compile_shader(handle) {
            let log = ctx.shader_info_log(handle);
            ctx.delete_shader(handle);
            return Err(SwirlError::ShaderCompile {
                stage: stage.name(),
                log,
            });
        }

        Ok(Self {
            ctx,
            handle,
            stage,
            origin: None,
        })
    }

    /// The stage this unit was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The locator the source was resolved from; `None` for literal text.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// The underlying GL shader name, for direct driver calls.
    pub fn handle(&self) -> RawHandle {
        self.handle
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.ctx.delete_shader(self.handle);
    }
}
