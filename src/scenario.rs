use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    config::{LoggingConfig, SimulationConfig},
    engine::{Engine, EngineBuilder, EngineSettings},
    error::ScenarioError,
    grid::{Grid, PlacedBuilding},
    registry::{BuildingRegistry, BuildingTemplate},
    resources::ResourceVector,
};

fn default_dt_seconds() -> f64 {
    0.5
}

fn default_population() -> u32 {
    3
}

fn default_capacity() -> ResourceVector {
    ResourceVector::splat(100.0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub snapshot_interval_ticks: u64,
    #[serde(default = "default_population")]
    pub population: u32,
    #[serde(default)]
    pub resources: ResourceVector,
    /// Base storage before any building adds to it.
    #[serde(default = "default_capacity")]
    pub capacity: ResourceVector,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub buildings: Vec<BuildingTemplate>,
    #[serde(default)]
    pub placements: Vec<PlacedBuilding>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut known = HashSet::new();
        for template in &self.buildings {
            if !known.insert(template.id.as_str()) {
                return Err(ScenarioError::Validation(format!(
                    "building '{}' defined more than once",
                    template.id
                )));
            }
        }

        let mut origins = HashSet::new();
        for placement in &self.placements {
            if !known.contains(placement.building_id.as_str()) {
                return Err(ScenarioError::Validation(format!(
                    "placement at ({}, {}) references unknown building '{}'",
                    placement.x, placement.y, placement.building_id
                )));
            }
            if !origins.insert((placement.x, placement.y)) {
                return Err(ScenarioError::Validation(format!(
                    "more than one building placed at ({}, {})",
                    placement.x, placement.y
                )));
            }
        }

        let sim = &self.simulation;
        for (field, value) in [
            ("growth_interval", sim.growth_interval),
            ("death_no_food_interval", sim.death_no_food_interval),
            ("death_no_water_interval", sim.death_no_water_interval),
            ("workforce_ratio", sim.workforce_ratio),
            ("per_capita.food", sim.per_capita.food),
            ("per_capita.water", sim.per_capita.water),
            ("per_capita.power", sim.per_capita.power),
            ("happiness.decay_rate", sim.happiness.decay_rate),
            ("happiness.recovery_rate", sim.happiness.recovery_rate),
            ("happiness.power_bonus", sim.happiness.power_bonus),
            ("happiness.medicine_bonus", sim.happiness.medicine_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScenarioError::Validation(format!(
                    "simulation.{field} must be a finite, non-negative number"
                )));
            }
        }
        for (field, value) in [
            ("growth_happiness_min", sim.growth_happiness_min),
            ("happiness.initial", sim.happiness.initial),
        ] {
            if !value.is_finite() {
                return Err(ScenarioError::Validation(format!(
                    "simulation.{field} must be finite"
                )));
            }
        }

        let max_tick = sim.max_tick_seconds;
        if !max_tick.is_finite() || max_tick <= 0.0 {
            return Err(ScenarioError::Validation(
                "simulation.max_tick_seconds must be greater than zero".into(),
            ));
        }
        if !self.dt_seconds.is_finite() || self.dt_seconds <= 0.0 {
            return Err(ScenarioError::Validation(
                "dt_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }

    pub fn registry(&self) -> BuildingRegistry {
        BuildingRegistry::new(self.buildings.iter().cloned())
    }

    pub fn build_grid(&self) -> Grid {
        let mut grid = Grid::new();
        for placement in &self.placements {
            grid.place(placement.building_id.clone(), placement.x, placement.y);
        }
        grid
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            snapshot_interval_ticks: self.snapshot_interval_ticks,
            ..EngineSettings::new(self.name.clone(), self.simulation.clone())
        }
    }

    /// Builder preloaded with the registry, stock and starting population.
    /// Pre-placed buildings are free; their storage and housing already count.
    pub fn builder(&self, settings: EngineSettings) -> EngineBuilder {
        let registry = self.registry();
        let mut capacity = self.capacity;
        let mut housing = 0u32;
        for placement in &self.placements {
            if let Some(template) = registry.lookup(&placement.building_id) {
                capacity.add_scaled(&template.storage, 1.0);
                housing = housing.saturating_add(template.housing_capacity);
            }
        }
        EngineBuilder::new(settings)
            .with_registry(registry)
            .with_resources(self.resources, capacity)
            .with_population(self.population)
            .with_housing(housing)
    }

    pub fn build(&self) -> (Engine, Grid) {
        let engine = self.builder(self.settings()).build();
        (engine, self.build_grid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: test_outpost
population: 4
resources: { scrap: 20, food: 10, water: 10 }
capacity: { scrap: 50, food: 50, water: 50, power: 50, medicine: 50, caps: 50 }
buildings:
  - id: shack
    housing_capacity: 3
  - id: crate
    storage: { scrap: 25 }
placements:
  - { building_id: shack, x: 0, y: 0 }
  - { building_id: crate, x: 1, y: 0 }
"#;

    #[test]
    fn parses_with_defaults() {
        let scenario = Scenario::from_yaml(YAML).unwrap();
        assert_eq!(scenario.dt_seconds, 0.5);
        assert_eq!(scenario.ticks(None), 600);
        assert_eq!(scenario.ticks(Some(5)), 5);
        assert_eq!(scenario.simulation, SimulationConfig::default());
        assert_eq!(scenario.logging.level, "info");
    }

    #[test]
    fn preplaced_buildings_count_toward_storage_and_housing() {
        let scenario = Scenario::from_yaml(YAML).unwrap();
        let (engine, grid) = scenario.build();
        assert_eq!(grid.len(), 2);
        assert_eq!(engine.store().capacity().scrap, 75.0);
        let base = scenario.simulation.base_max_population;
        assert_eq!(engine.population().max(), base + 3);
        assert_eq!(engine.population().current(), 4);
    }

    #[test]
    fn rejects_duplicate_templates() {
        let yaml = "name: dup\nbuildings:\n  - id: a\n  - id: a\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("defined more than once"));
    }

    #[test]
    fn rejects_unknown_placements() {
        let yaml = "name: bad\nplacements:\n  - { building_id: ghost, x: 0, y: 0 }\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("unknown building 'ghost'"));
    }

    #[test]
    fn rejects_non_finite_intervals() {
        let yaml = "name: bad\nsimulation:\n  growth_interval: .nan\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("growth_interval"));

        let yaml = "name: bad\nsimulation:\n  death_no_food_interval: -5\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("death_no_food_interval"));

        let yaml = "name: bad\nsimulation:\n  death_no_water_interval: .inf\n";
        assert!(Scenario::from_yaml(yaml).is_err());

        let yaml = "name: bad\nsimulation:\n  workforce_ratio: .nan\n";
        assert!(Scenario::from_yaml(yaml).is_err());

        let yaml = "name: bad\nsimulation:\n  growth_happiness_min: .nan\n";
        assert!(Scenario::from_yaml(yaml).is_err());
    }

    #[test]
    fn rejects_non_positive_tick_clamp() {
        let yaml = "name: bad\nsimulation:\n  max_tick_seconds: 0\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::Validation(_))
        ));
    }
}
