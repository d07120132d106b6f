// -- Lint policy ---------------------------------------------------------
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Documentation
#![deny(rustdoc::broken_intra_doc_links)]
// GPU / graphics allowances — casts between GL integer widths are
// intentional and bounded
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]

//! Real-time GPU particle attractor visualizer core.
//!
//! A compute-shader simulation iterates millions of particles through a
//! strange-attractor map and accumulates per-pixel density into a shader
//! storage buffer; a full-screen fragment pass maps that buffer to a
//! cold/hot color gradient. This crate is the resource and orchestration
//! layer: shader compilation and linking, storage buffer lifecycle and
//! sharing, uniform binding, and the per-frame dispatch/draw sequence.
//! The window, input, and UI layers live in the embedding application.
//!
//! # Key entry points
//!
//! - [`engine::ParticleEngine`] - the frame driver
//! - [`gpu::program::ShaderProgram`] - linked programs with uniform and
//!   storage-slot management
//! - [`gpu::storage_buffer::StorageBuffer`] - shared GPU byte buffers
//! - [`gpu::raw::RawGl`] - the production OpenGL backend
//! - [`sim::params::SimParams`] - tweakable parameters with TOML presets
//!
//! # Architecture
//!
//! All driver traffic flows through the [`gpu::context::GlContext`] seam.
//! The embedding application creates a 4.3+ context, loads
//! [`gpu::raw::RawGl`] from its proc-address loader, and hands the engine
//! per-frame time/seed values plus UI-originated parameter changes. GPU
//! objects are shared single-threaded via `Rc`; the last owner releases
//! the underlying driver handle.

pub mod engine;
pub mod error;
pub mod gpu;
pub mod sim;
