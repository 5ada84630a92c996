use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::core::{Result, Vec3};
use crate::domain::{ParticleId, ParticleSpec, SimConfig};

use super::perf_stats::PerfStats;
use super::Simulation;

/// JS-facing handle. Errors are logged and reported as `false` / `undefined`.
#[wasm_bindgen]
pub struct Engine {
    core: Simulation,
}

fn accepted<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(call = what, error = %err, "engine call rejected");
            None
        }
    }
}

fn to_js_id(id: ParticleId) -> Option<u32> {
    u32::try_from(id).ok()
}

#[wasm_bindgen]
impl Engine {
    /// Default settings, spawner seeded with `seed`
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Self {
        let mut core = Simulation::with_seed(seed);
        core.refresh_render_buffers();
        Self { core }
    }

    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Option<Engine> {
        let mut core = accepted("from_config_json", Simulation::from_config_json(json))?;
        core.refresh_render_buffers();
        Some(Self { core })
    }

    /// Replace all settings from a JSON config
    pub fn load_config(&mut self, json: &str) -> bool {
        let result = SimConfig::from_json(json).and_then(|config| self.core.apply_config(config));
        accepted("load_config", result).is_some()
    }

    pub fn config_json(&self) -> String {
        self.core.config().to_json()
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 {
        self.core.particle_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 {
        self.core.frame()
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    pub fn configure(
        &mut self,
        gravity_x: f64,
        gravity_y: f64,
        gravity_z: f64,
        cell_size: f64,
        sub_steps: u32,
        sim_dt: f64,
    ) -> bool {
        let gravity = Vec3::new(gravity_x, gravity_y, gravity_z);
        accepted("configure", self.core.configure(gravity, cell_size, sub_steps, sim_dt)).is_some()
    }

    pub fn set_gravity(&mut self, x: f64, y: f64, z: f64) -> bool {
        accepted("set_gravity", self.core.set_gravity(Vec3::new(x, y, z))).is_some()
    }

    pub fn set_collisions_enabled(&mut self, enabled: bool) {
        self.core.set_collisions_enabled(enabled);
    }

    pub fn set_spawn_per_tick(&mut self, count: u32) {
        self.core.set_spawn_per_tick(count);
    }

    /// Spawn a moving particle; returns its ID
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        vx: f64,
        vy: f64,
        vz: f64,
        radius: f64,
        mass: f64,
        material_id: u32,
    ) -> Option<u32> {
        let spec = ParticleSpec::new(Vec3::new(x, y, z), radius)
            .with_velocity(Vec3::new(vx, vy, vz))
            .with_mass(mass)
            .with_material(material_id);
        self.spawn_spec("spawn", spec)
    }

    /// Spawn static geometry
    pub fn spawn_frozen(&mut self, x: f64, y: f64, z: f64, radius: f64, material_id: u32) -> Option<u32> {
        let spec = ParticleSpec::new(Vec3::new(x, y, z), radius)
            .with_material(material_id)
            .frozen();
        self.spawn_spec("spawn_frozen", spec)
    }

    /// Spawn `count` particles from the seeded spawner; returns how many were added
    pub fn spawn_random(&mut self, count: u32) -> u32 {
        let ids = self.core.spawn_random(count as usize);
        self.core.refresh_render_buffers();
        ids.len() as u32
    }

    /// Link two particles. Without a target the current distance is kept.
    pub fn link(&mut self, a: u32, b: u32, target_distance: Option<f64>) -> bool {
        let result = self.core.link(a as ParticleId, b as ParticleId, target_distance);
        accepted("link", result).is_some()
    }

    /// Advance by `dt_wall` seconds of wall time; returns whether a step ran
    pub fn tick(&mut self, dt_wall: f64) -> bool {
        let stepped = self.core.advance(dt_wall);
        if stepped {
            self.core.refresh_render_buffers();
        }
        stepped
    }

    /// Get pointer to xyz position triples (for JS rendering)
    pub fn positions_ptr(&self) -> *const f32 {
        self.core.render_buffers().positions.as_ptr()
    }

    /// Number of f32 values behind `positions_ptr` (3 per particle)
    pub fn positions_len(&self) -> usize {
        self.core.render_buffers().positions.len()
    }

    pub fn radii_ptr(&self) -> *const f32 {
        self.core.render_buffers().radii.as_ptr()
    }

    pub fn radii_len(&self) -> usize {
        self.core.render_buffers().radii.len()
    }

    pub fn materials_ptr(&self) -> *const u32 {
        self.core.render_buffers().materials.as_ptr()
    }

    pub fn materials_len(&self) -> usize {
        self.core.render_buffers().materials.len()
    }
}

impl Engine {
    fn spawn_spec(&mut self, what: &str, spec: ParticleSpec) -> Option<u32> {
        let id = accepted(what, self.core.spawn(spec))?;
        self.core.refresh_render_buffers();
        to_js_id(id)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.core
    }
}
