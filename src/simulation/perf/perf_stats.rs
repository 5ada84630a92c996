use wasm_bindgen::prelude::*;

/// Timings (ms) and counters of the last step. All zero while perf metrics are off.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) spawn_ms: f64,
    pub(super) hash_ms: f64,
    pub(super) resolve_ms: f64,
    pub(super) integrate_ms: f64,
    pub(super) links_ms: f64,
    pub(super) particle_count: u32,
    pub(super) spawned: u32,
    pub(super) occupied_cells: u32,
    pub(super) search_radius: u32,
    pub(super) resolved_particles: u32,
    pub(super) candidates: u32,
    pub(super) contacts: u32,
    pub(super) degenerate_pairs: u32,
    pub(super) degenerate_links: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[inline]
pub(super) fn saturate_u32(v: u64) -> u32 {
    v.min(u32::MAX as u64) as u32
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn spawn_ms(&self) -> f64 { self.spawn_ms }
    #[wasm_bindgen(getter)]
    pub fn hash_ms(&self) -> f64 { self.hash_ms }
    #[wasm_bindgen(getter)]
    pub fn resolve_ms(&self) -> f64 { self.resolve_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn links_ms(&self) -> f64 { self.links_ms }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
    #[wasm_bindgen(getter)]
    pub fn spawned(&self) -> u32 { self.spawned }
    #[wasm_bindgen(getter)]
    pub fn occupied_cells(&self) -> u32 { self.occupied_cells }
    #[wasm_bindgen(getter)]
    pub fn search_radius(&self) -> u32 { self.search_radius }
    #[wasm_bindgen(getter)]
    pub fn resolved_particles(&self) -> u32 { self.resolved_particles }
    #[wasm_bindgen(getter)]
    pub fn candidates(&self) -> u32 { self.candidates }
    #[wasm_bindgen(getter)]
    pub fn contacts(&self) -> u32 { self.contacts }
    #[wasm_bindgen(getter)]
    pub fn degenerate_pairs(&self) -> u32 { self.degenerate_pairs }
    #[wasm_bindgen(getter)]
    pub fn degenerate_links(&self) -> u32 { self.degenerate_links }
}
