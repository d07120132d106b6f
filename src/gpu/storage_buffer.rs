//! Shader storage buffer objects.

use std::cell::Cell;
use std::rc::Rc;

use super::context::{BufferUsage, ClearFormat, GlContext, RawHandle};
use crate::error::SwirlError;

/// One GPU-resident byte buffer used for shader-storage read/write access.
///
/// The recorded size always reflects the last committed byte length; a
/// buffer of size 0 has no backing allocation yet. Buffers are shared
/// across programs via `Rc` (the simulation stage writes what the display
/// stage reads), so the size is interior-mutable and `update` takes
/// `&self`.
pub struct StorageBuffer {
    ctx: Rc<dyn GlContext>,
    handle: RawHandle,
    size: Cell<usize>,
    usage: BufferUsage,
}

impl StorageBuffer {
    /// Allocate a buffer name with the given usage hint. No storage is
    /// committed until the first [`Self::update`].
    ///
    /// # Errors
    ///
    /// `ResourceAllocation` when the driver refuses a buffer object.
    pub fn new(
        ctx: Rc<dyn GlContext>,
        usage: BufferUsage,
    ) -> Result<Self, SwirlError> {
        let handle = ctx.create_buffer();
        if handle == 0 {
            return Err(SwirlError::ResourceAllocation("buffer object"));
        }
        Ok(Self {
            ctx,
            handle,
            size: Cell::new(0),
            usage,
        })
    }

    /// Commit `bytes` to the buffer.
    ///
    /// A changed byte length performs a full reallocation (handles growing
    /// and shrinking alike); an unchanged length performs an in-place
    /// partial write from offset 0, preserving the allocation across
    /// equally-sized successive frames. Either way the recorded size
    /// equals `bytes.len()` afterwards.
    pub fn update(&self, bytes: &[u8]) {
        self.bind();
        if self.size.get() == bytes.len() {
            self.ctx.storage_buffer_sub_data(0, bytes);
        } else {
            self.ctx.storage_buffer_data(bytes, self.usage);
        }
        self.size.set(bytes.len());
        Self::unbind(self.ctx.as_ref());
    }

    /// Typed bulk update; commits `data` as its raw byte representation.
    pub fn update_slice<T: bytemuck::Pod>(&self, data: &[T]) {
        self.update(bytemuck::cast_slice(data));
    }

    /// Zero-fill the committed range.
    pub fn clear(&self, format: ClearFormat) {
        self.bind();
        self.ctx.clear_storage_buffer(format);
        Self::unbind(self.ctx.as_ref());
    }

    /// Make this buffer the bound shader-storage buffer.
    pub fn bind(&self) {
        self.ctx.bind_storage_buffer(Some(self.handle));
    }

    /// Clear the global shader-storage buffer binding.
    pub fn unbind(ctx: &dyn GlContext) {
        ctx.bind_storage_buffer(None);
    }

    /// Committed size in bytes.
    pub fn len(&self) -> usize {
        self.size.get()
    }

    /// Whether the buffer has no backing allocation.
    pub fn is_empty(&self) -> bool {
        self.size.get() == 0
    }

    /// The usage hint supplied at construction.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The underlying GL buffer name, for direct driver calls.
    pub fn handle(&self) -> RawHandle {
        self.handle
    }
}

impl Drop for StorageBuffer {
    fn drop(&mut self) {
        self.ctx.delete_buffer(self.handle);
    }
}
