//! Linked GPU programs: uniforms, activation, and the storage slot table.

use std::rc::Rc;

use glam::{IVec2, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::context::{GlContext, RawHandle};
use super::shader::Shader;
use super::storage_buffer::StorageBuffer;
use crate::error::SwirlError;

/// Capacity of the per-program storage-buffer slot table.
pub const STORAGE_SLOTS: usize = 8;

/// One linked graphics or compute program.
///
/// Graphics programs additionally own the vertex-array object required by
/// the attribute-less full-screen draw; compute programs have none. The
/// slot table maps binding points 0..[`STORAGE_SLOTS`] to optionally-empty
/// shared buffer references and is replayed on every [`Self::activate`].
///
/// A program is linked at construction or not at all; there is no relink.
/// A failed or replaced program is discarded and a new one constructed.
pub struct ShaderProgram {
    ctx: Rc<dyn GlContext>,
    handle: RawHandle,
    vao: Option<RawHandle>,
    slots: [Option<Rc<StorageBuffer>>; STORAGE_SLOTS],
    // Not needed after linking; held for the program's lifetime.
    _stages: Vec<Rc<Shader>>,
}

impl ShaderProgram {
    /// Link a graphics program from vertex + fragment (+ optional
    /// geometry) stages, and allocate the vertex-array object for the
    /// full-screen pass.
    ///
    /// # Errors
    ///
    /// `ProgramLink` (carrying the driver log) when linking fails; no
    /// vertex-array object is allocated on that path.
    /// `ResourceAllocation` when the driver refuses an object.
    pub fn link_graphics(
        ctx: Rc<dyn GlContext>,
        vertex: Rc<Shader>,
        fragment: Rc<Shader>,
        geometry: Option<Rc<Shader>>,
    ) -> Result<Self, SwirlError> {
        let mut stages = vec![vertex, fragment];
        if let Some(geometry) = geometry {
            stages.push(geometry);
        }
        let handle = Self::link_stages(&ctx, &stages)?;

        let vao = ctx.create_vertex_array();
        if vao == 0 {
            ctx.delete_program(handle);
            return Err(SwirlError::ResourceAllocation("vertex array object"));
        }
        ctx.bind_vertex_array(Some(vao));
        ctx.enable_vertex_attrib(0);

        Ok(Self {
            ctx,
            handle,
            vao: Some(vao),
            slots: std::array::from_fn(|_| None),
            _stages: stages,
        })
    }

    /// Link a compute program from exactly one compute stage. No
    /// vertex-array object is created; compute has no vertex pipeline.
    ///
    /// # Errors
    ///
    /// See [`Self::link_graphics`].
    pub fn link_compute(
        ctx: Rc<dyn GlContext>,
        compute: Rc<Shader>,
    ) -> Result<Self, SwirlError> {
        let stages = vec![compute];
        let handle = Self::link_stages(&ctx, &stages)?;

        Ok(Self {
            ctx,
            handle,
            vao: None,
            slots: std::array::from_fn(|_| None),
            _stages: stages,
        })
    }

    fn link_stages(
        ctx: &Rc<dyn GlContext>,
        stages: &[Rc<Shader>],
    ) -> Result<RawHandle, SwirlError> {
        let handle = ctx.create_program();
        if handle == 0 {
            return Err(SwirlError::ResourceAllocation("program object"));
        }

        for stage in stages {
            ctx.attach_shader(handle, stage.handle());
        }
        let linked = ctx.link_program(handle);
        for stage in stages {
            ctx.detach_shader(handle, stage.handle());
        }

        if !linked {
            let log = ctx.program_info_log(handle);
            ctx.delete_program(handle);
            return Err(SwirlError::ProgramLink { log });
        }
        Ok(handle)
    }

    /// Make this program current and replay its storage bindings.
    ///
    /// Binds the vertex-array object when one exists, then walks the slot
    /// table in ascending index order: a filled slot binds its buffer to
    /// the storage target and to the binding point equal to the slot
    /// index; an empty slot issues the shared storage-target unbind. The
    /// unbind clears the global target regardless of the empty slot's own
    /// index; see DESIGN.md before changing that. One trailing unbind
    /// leaves the storage target clean.
    ///
    /// Runs once per frame per active program: O(capacity), no side
    /// effects beyond the driver calls it intentionally makes.
    pub fn activate(&self) {
        self.ctx.use_program(Some(self.handle));
        if let Some(vao) = self.vao {
            self.ctx.bind_vertex_array(Some(vao));
        }

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(buffer) => {
                    buffer.bind();
                    self.ctx
                        .bind_storage_buffer_base(index as u32, buffer.handle());
                }
                None => StorageBuffer::unbind(self.ctx.as_ref()),
            }
        }
        StorageBuffer::unbind(self.ctx.as_ref());
    }

    /// Clear the active program.
    pub fn unbind(ctx: &dyn GlContext) {
        ctx.use_program(None);
    }

    // -- uniforms --------------------------------------------------------
    //
    // Locations are resolved by name on every call, and misses are silent
    // no-ops: shader variants legitimately use subsets of a common
    // uniform set.

    /// Set a `bool` uniform (as 0/1).
    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_i32(name, i32::from(value));
    }

    /// Set an `int` uniform.
    pub fn set_i32(&self, name: &str, value: i32) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_i32(self.handle, location, value);
        }
    }

    /// Set a `float` uniform.
    pub fn set_f32(&self, name: &str, value: f32) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_f32(self.handle, location, value);
        }
    }

    /// Set a `vec2` uniform.
    pub fn set_vec2(&self, name: &str, value: Vec2) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_vec2(self.handle, location, value);
        }
    }

    /// Set a `vec3` uniform.
    pub fn set_vec3(&self, name: &str, value: Vec3) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_vec3(self.handle, location, value);
        }
    }

    /// Set a `vec4` uniform.
    pub fn set_vec4(&self, name: &str, value: Vec4) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_vec4(self.handle, location, value);
        }
    }

    /// Set an `ivec2` uniform.
    pub fn set_ivec2(&self, name: &str, value: IVec2) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_ivec2(self.handle, location, value);
        }
    }

    /// Set a `mat2` uniform.
    pub fn set_mat2(&self, name: &str, value: &Mat2) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_mat2(self.handle, location, value);
        }
    }

    /// Set a `mat3` uniform.
    pub fn set_mat3(&self, name: &str, value: &Mat3) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_mat3(self.handle, location, value);
        }
    }

    /// Set a `mat4` uniform.
    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        if let Some(location) = self.location(name) {
            self.ctx.set_uniform_mat4(self.handle, location, value);
        }
    }

    fn location(&self, name: &str) -> Option<i32> {
        self.ctx.uniform_location(self.handle, name)
    }

    // -- storage buffers -------------------------------------------------

    /// The binding point the linked program assigned to a named storage
    /// block, from reflection data. Deterministic for a given program.
    pub fn storage_block_binding(&self, block_name: &str) -> Option<u32> {
        self.ctx.storage_block_binding(self.handle, block_name)
    }

    /// Write a shared buffer reference (or `None` to clear) into a slot.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange` for indices outside the slot table; the table is
    /// left untouched in that case.
    pub fn set_storage_buffer(
        &mut self,
        index: usize,
        buffer: Option<Rc<StorageBuffer>>,
    ) -> Result<(), SwirlError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SwirlError::SlotOutOfRange { index })?;
        *slot = buffer;
        Ok(())
    }

    /// Attach a buffer to the slot named by a storage block, resolving
    /// the index through reflection. Unresolved or out-of-range names are
    /// ignored.
    pub fn set_storage_buffer_by_name(
        &mut self,
        block_name: &str,
        buffer: Option<Rc<StorageBuffer>>,
    ) {
        let Some(index) = self.storage_block_binding(block_name) else {
            log::debug!(
                "storage block '{block_name}' not declared by the program; \
                 attach skipped"
            );
            return;
        };

        let index = index as usize;
        if index < STORAGE_SLOTS {
            self.slots[index] = buffer;
        } else {
            log::debug!(
                "storage block '{block_name}' resolves to binding {index}, \
                 beyond the slot table; attach skipped"
            );
        }
    }

    /// Empty every slot.
    pub fn clear_storage_buffers(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// The buffer currently attached at `index`, if any.
    pub fn storage_buffer(&self, index: usize) -> Option<&Rc<StorageBuffer>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The underlying GL program name, for direct driver calls.
    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    /// The vertex-array object owned by a graphics program, `None` for
    /// compute.
    pub fn vao(&self) -> Option<RawHandle> {
        self.vao
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(vao) = self.vao {
            self.ctx.delete_vertex_array(vao);
        }
        self.ctx.delete_program(self.handle);
    }
}
