use serde::{Deserialize, Serialize};

use crate::core::{Result, SimError, Vec3};

use super::particle::IntegrationScheme;

/// Simulation settings, loadable from a JSON document.
///
/// Every field has a default, so a partial document such as
/// `{"subSteps": 4}` is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    pub gravity: [f64; 3],
    pub cell_size: f64,
    pub sub_steps: u32,
    pub sim_dt: f64,
    pub scheme: IntegrationScheme,
    /// Neighbor search window in cells; derived from the largest radius when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_radius: Option<u32>,
    pub collisions_enabled: bool,
    /// Particles added by the spawner at the start of every step
    pub spawn_per_tick: u32,
    pub spawner: SpawnerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            cell_size: 1.0,
            sub_steps: 8,
            sim_dt: 1.0 / 60.0,
            scheme: IntegrationScheme::PositionBased,
            search_radius: None,
            collisions_enabled: true,
            spawn_per_tick: 0,
            spawner: SpawnerConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)
            .map_err(|e| SimError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn gravity_vec(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    /// Length of one integration sub-step
    #[inline]
    pub fn sub_dt(&self) -> f64 {
        self.sim_dt / self.sub_steps.max(1) as f64
    }

    /// Errors: `SimError::InvalidConfiguration` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        validate_step(self.gravity_vec(), self.cell_size, self.sub_steps, self.sim_dt)?;
        if self.search_radius == Some(0) {
            return Err(SimError::InvalidConfiguration("searchRadius must be >= 1".into()));
        }
        self.spawner.validate()
    }

    /// Search window in cells for the current largest radius.
    ///
    /// Default is `ceil(max_radius / cell_size) * 2`, at least 1. With
    /// `cell_size == 2 * max_radius` this is a ±2 window (5×5×5 cells).
    pub fn resolved_search_radius(&self, max_radius: f64) -> u32 {
        if let Some(r) = self.search_radius {
            return r.max(1);
        }
        let cells = (max_radius / self.cell_size).ceil();
        if !cells.is_finite() || cells <= 0.0 {
            return 1;
        }
        ((cells as u32).saturating_mul(2)).max(1)
    }
}

/// Shared check for `configure` and full config loads
pub(crate) fn validate_step(gravity: Vec3, cell_size: f64, sub_steps: u32, sim_dt: f64) -> Result<()> {
    if !gravity.is_finite() {
        return Err(SimError::InvalidConfiguration("gravity must be finite".into()));
    }
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(SimError::InvalidConfiguration("cellSize must be finite and > 0".into()));
    }
    if sub_steps == 0 {
        return Err(SimError::InvalidConfiguration("subSteps must be >= 1".into()));
    }
    if !sim_dt.is_finite() || sim_dt <= 0.0 {
        return Err(SimError::InvalidConfiguration("simDt must be finite and > 0".into()));
    }
    Ok(())
}

/// Random particle generator settings.
///
/// Particles appear at `center + random_direction * random(distance_min..distance_max)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpawnerConfig {
    pub seed: u64,
    pub center: [f64; 3],
    pub distance_min: f64,
    pub distance_max: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    pub material_count: u32,
    pub mass: f64,
    pub drag_coefficient: f64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            center: [0.0, 10.0, 0.0],
            distance_min: 0.0,
            distance_max: 5.0,
            radius_min: 0.25,
            radius_max: 0.5,
            material_count: 2,
            mass: 1.0,
            drag_coefficient: 0.0,
        }
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<()> {
        if !Vec3::from_array(self.center).is_finite() {
            return Err(SimError::InvalidConfiguration("spawner.center must be finite".into()));
        }
        if !(self.distance_min.is_finite() && self.distance_max.is_finite())
            || self.distance_min < 0.0
            || self.distance_min > self.distance_max
        {
            return Err(SimError::InvalidConfiguration(
                "spawner distance range must satisfy 0 <= distanceMin <= distanceMax".into(),
            ));
        }
        if !(self.radius_min.is_finite() && self.radius_max.is_finite())
            || self.radius_min <= 0.0
            || self.radius_min > self.radius_max
        {
            return Err(SimError::InvalidConfiguration(
                "spawner radius range must satisfy 0 < radiusMin <= radiusMax".into(),
            ));
        }
        if self.material_count == 0 {
            return Err(SimError::InvalidConfiguration("spawner.materialCount must be >= 1".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::InvalidConfiguration("spawner.mass must be > 0".into()));
        }
        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(SimError::InvalidConfiguration("spawner.dragCoefficient must be >= 0".into()));
        }
        Ok(())
    }
}
