//! Frame orchestration: owns the two pipeline stages and their shared
//! buffers, and drives the clear -> dispatch -> barrier -> draw sequence.

use std::rc::Rc;

use glam::{IVec2, UVec3, Vec3, Vec4};

use crate::error::SwirlError;
use crate::gpu::context::{BufferUsage, ClearFormat, GlContext};
use crate::gpu::program::ShaderProgram;
use crate::gpu::shader::{Shader, ShaderStage};
use crate::gpu::storage_buffer::StorageBuffer;
use crate::sim::camera;
use crate::sim::params::SimParams;

const SIMULATION_SHADER: &str = "particles.comp";
const VERTEX_SHADER: &str = "output.vert";
const FRAGMENT_SHADER: &str = "output.frag";

// Embedded copies let the engine run without an on-disk shader tree;
// files found through the search path take precedence (hot editing).
const SIMULATION_FALLBACK: &str =
    include_str!("../assets/shaders/particles.comp");
const VERTEX_FALLBACK: &str = include_str!("../assets/shaders/output.vert");
const FRAGMENT_FALLBACK: &str = include_str!("../assets/shaders/output.frag");

/// Bytes per pixel accumulator (`uvec2`).
const PIXEL_STRIDE: usize = 8;

/// The visualizer frame driver.
///
/// Owns the simulation (compute) and display (graphics) programs plus the
/// two storage buffers they share: the pixel accumulation buffer written
/// by the simulation and read by the display pass, and the particle state
/// buffer. A failed shader rebuild leaves the previously-working programs
/// in place (or `None` on the first build), so a bad shader edit merely
/// logs its diagnostic instead of taking the visualization down.
pub struct ParticleEngine {
    ctx: Rc<dyn GlContext>,
    simulation: Option<ShaderProgram>,
    display: Option<ShaderProgram>,
    pixel_buffer: Rc<StorageBuffer>,
    particle_buffer: Rc<StorageBuffer>,
    params: SimParams,
    viewport: IVec2,
}

impl ParticleEngine {
    /// Build the engine: allocate the shared buffers, compile and link
    /// both stages, and commit zero-filled initial buffer contents.
    ///
    /// # Errors
    ///
    /// `ResourceAllocation` when the driver refuses a buffer object.
    /// Shader failures are not errors here; they leave the corresponding
    /// stage disabled (see [`Self::reload_shaders`]).
    pub fn new(
        ctx: Rc<dyn GlContext>,
        width: i32,
        height: i32,
        params: SimParams,
    ) -> Result<Self, SwirlError> {
        let pixel_buffer = Rc::new(StorageBuffer::new(
            Rc::clone(&ctx),
            BufferUsage::DynamicDraw,
        )?);
        let particle_buffer = Rc::new(StorageBuffer::new(
            Rc::clone(&ctx),
            BufferUsage::DynamicDraw,
        )?);

        let mut engine = Self {
            ctx,
            simulation: None,
            display: None,
            pixel_buffer,
            particle_buffer,
            params,
            viewport: IVec2::new(width, height),
        };
        engine.reload_shaders();
        engine.rebuild_pixel_buffer();
        engine.rebuild_particle_buffer();
        Ok(engine)
    }

    /// Rebuild both programs from source.
    ///
    /// Sources are located through the filesystem search order first and
    /// fall back to the embedded copies. On any compile or link failure
    /// the half-built programs are discarded, the diagnostic goes to the
    /// log, and the previous programs (if any) keep running.
    pub fn reload_shaders(&mut self) {
        match self.build_programs() {
            Ok((simulation, display)) => {
                self.simulation = Some(simulation);
                self.display = Some(display);
                log::info!("shader programs rebuilt");
                self.apply_all();
            }
            Err(e) => {
                log::error!("shader reload failed: {e}");
            }
        }
    }

    fn build_programs(
        &self,
    ) -> Result<(ShaderProgram, ShaderProgram), SwirlError> {
        let compute = Rc::new(self.load_shader(
            SIMULATION_SHADER,
            ShaderStage::Compute,
            SIMULATION_FALLBACK,
        )?);
        let simulation =
            ShaderProgram::link_compute(Rc::clone(&self.ctx), compute)?;

        let vertex = Rc::new(self.load_shader(
            VERTEX_SHADER,
            ShaderStage::Vertex,
            VERTEX_FALLBACK,
        )?);
        let fragment = Rc::new(self.load_shader(
            FRAGMENT_SHADER,
            ShaderStage::Fragment,
            FRAGMENT_FALLBACK,
        )?);
        let display = ShaderProgram::link_graphics(
            Rc::clone(&self.ctx),
            vertex,
            fragment,
            None,
        )?;

        Ok((simulation, display))
    }

    fn load_shader(
        &self,
        name: &str,
        stage: ShaderStage,
        fallback: &str,
    ) -> Result<Shader, SwirlError> {
        match Shader::from_name(Rc::clone(&self.ctx), name, stage) {
            Err(SwirlError::ShaderNotFound(_)) => {
                log::debug!(
                    "no on-disk source for '{name}', using the embedded copy"
                );
                Shader::from_source(Rc::clone(&self.ctx), stage, fallback)
            }
            other => other,
        }
    }

    /// Push the whole parameter state into the current programs: MVP,
    /// attractors, colors, scaling, and both buffer attachments.
    fn apply_all(&mut self) {
        self.apply_view_projection();
        self.apply_attractors();
        self.apply_colors();
        self.attach_pixel_buffer();
        self.attach_particle_buffer();
    }

    fn apply_view_projection(&self) {
        if let Some(simulation) = &self.simulation {
            let aspect =
                self.viewport.x as f32 / self.viewport.y.max(1) as f32;
            let mvp = camera::view_projection(
                Vec3::from_array(self.params.eye),
                aspect,
            );
            simulation.set_mat4("MVP", &mvp);
        }
    }

    fn apply_attractors(&self) {
        // Coefficient changes restart the orbits.
        self.particle_buffer.clear(ClearFormat::Rgba32F);
        if let Some(simulation) = &self.simulation {
            simulation.set_vec4(
                "attractors",
                Vec4::from_array(self.params.attractors),
            );
        }
    }

    fn apply_colors(&self) {
        if let Some(display) = &self.display {
            display
                .set_vec3("ColdColor", Vec3::from_array(self.params.cold_color));
            display
                .set_vec3("HotColor", Vec3::from_array(self.params.hot_color));
        }
    }

    fn attach_pixel_buffer(&mut self) {
        let dimensions = self.viewport;
        let e_max = self.params.e_max;
        let output_scalar = self.params.output_scalar;

        if let Some(simulation) = &mut self.simulation {
            simulation.set_storage_buffer_by_name(
                "PixelBufferSSBO",
                Some(Rc::clone(&self.pixel_buffer)),
            );
            simulation.set_ivec2("RenderTextureDimensions", dimensions);
            simulation.set_f32("eMax", e_max);
        }
        if let Some(display) = &mut self.display {
            display.set_storage_buffer_by_name(
                "PixelBufferSSBO",
                Some(Rc::clone(&self.pixel_buffer)),
            );
            display.set_ivec2("RenderTextureDimensions", dimensions);
            display.set_f32("outputScalar", output_scalar);
        }
    }

    fn attach_particle_buffer(&mut self) {
        if let Some(simulation) = &mut self.simulation {
            simulation.set_storage_buffer_by_name(
                "ParticleBufferSSBO",
                Some(Rc::clone(&self.particle_buffer)),
            );
        }
    }

    /// Re-commit the pixel accumulation buffer for the current viewport
    /// (zero-filled) and refresh the attachments that depend on it.
    pub fn rebuild_pixel_buffer(&mut self) {
        let pixels = (self.viewport.x.max(0) as usize)
            * (self.viewport.y.max(0) as usize);
        self.pixel_buffer.update(&vec![0u8; pixels * PIXEL_STRIDE]);
        self.attach_pixel_buffer();
    }

    /// Re-commit the particle state buffer for the current dispatch size
    /// (zero-filled) and re-attach it to the simulation stage.
    pub fn rebuild_particle_buffer(&mut self) {
        let count = self.params.particle_count();
        self.particle_buffer.update_slice(&vec![[0.0f32; 4]; count]);
        self.attach_particle_buffer();
    }

    /// Track a viewport change: MVP aspect and pixel buffer sizing.
    /// Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.viewport = IVec2::new(width, height);
        self.apply_view_projection();
        self.rebuild_pixel_buffer();
    }

    /// Run one frame: clear the accumulation buffer, dispatch the
    /// simulation, fence its writes, then draw the full-screen pass.
    /// Stages whose program is unavailable are skipped.
    pub fn frame(&self, time: f32, seed: i32) {
        self.pixel_buffer.clear(ClearFormat::Rg32Ui);

        if let Some(simulation) = &self.simulation {
            simulation.activate();
            simulation.set_f32("Time", time);
            simulation.set_i32("Seed", seed);
            self.ctx
                .dispatch_compute(UVec3::from_array(self.params.dispatch_size));
        }

        // Simulation writes must land before the display pass reads them.
        self.ctx.storage_memory_barrier();

        if let Some(display) = &self.display {
            display.activate();
            self.ctx.draw_triangles(3);
        }
    }

    /// Advance the animated eye orbit, when enabled.
    pub fn advance_eye(&mut self, time: f32) {
        if !self.params.animate_eye {
            return;
        }
        let eye =
            camera::orbit_eye(time, self.params.normalize_eye_distance);
        self.params.eye = eye.to_array();
        self.apply_view_projection();
    }

    // -- parameter channel (UI-originated changes) -----------------------

    /// Replace the attractor coefficients and restart the orbits.
    pub fn set_attractors(&mut self, attractors: Vec4) {
        self.params.attractors = attractors.to_array();
        self.apply_attractors();
    }

    /// Replace the gradient endpoint colors.
    pub fn set_colors(&mut self, cold: Vec3, hot: Vec3) {
        self.params.cold_color = cold.to_array();
        self.params.hot_color = hot.to_array();
        self.apply_colors();
    }

    /// Replace the particle energy cap.
    pub fn set_e_max(&mut self, e_max: f32) {
        self.params.e_max = e_max;
        if let Some(simulation) = &self.simulation {
            simulation.set_f32("eMax", e_max);
        }
    }

    /// Replace the display brightness multiplier.
    pub fn set_output_scalar(&mut self, output_scalar: f32) {
        self.params.output_scalar = output_scalar;
        if let Some(display) = &self.display {
            display.set_f32("outputScalar", output_scalar);
        }
    }

    /// Replace the dispatch grid and resize the particle buffer to match.
    pub fn set_dispatch_size(&mut self, size: UVec3) {
        self.params.dispatch_size = size.to_array();
        self.rebuild_particle_buffer();
    }

    /// Move the camera eye.
    pub fn set_eye(&mut self, eye: Vec3) {
        self.params.eye = eye.to_array();
        self.apply_view_projection();
    }

    /// Replace the whole parameter set (e.g. a loaded preset) and push
    /// everything to the GPU.
    pub fn set_params(&mut self, params: SimParams) {
        self.params = params;
        self.rebuild_pixel_buffer();
        self.rebuild_particle_buffer();
        self.apply_all();
    }

    /// The current parameter state.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// The current viewport in pixels.
    pub fn viewport(&self) -> IVec2 {
        self.viewport
    }

    /// Whether both pipeline stages are linked and ready.
    pub fn is_renderable(&self) -> bool {
        self.simulation.is_some() && self.display.is_some()
    }

    /// The shared pixel accumulation buffer.
    pub fn pixel_buffer(&self) -> &Rc<StorageBuffer> {
        &self.pixel_buffer
    }

    /// The shared particle state buffer.
    pub fn particle_buffer(&self) -> &Rc<StorageBuffer> {
        &self.particle_buffer
    }
}
