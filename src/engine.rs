use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    buildings::BuildingInstance,
    config::SimulationConfig,
    error::PlacementError,
    grid::{Grid, PlacedBuilding, WorldGrid},
    population::{PopulationController, PopulationEvent, PopulationSummary},
    registry::{BuildingRegistry, BuildingTemplate},
    resources::{finite_or_zero, ResourceSnapshot, ResourceStore, ResourceVector},
    snapshot::{SavedState, SnapshotWriter},
    workers::{WorkerAllocator, WorkerAssignment, WorkerStats},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub config: SimulationConfig,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

impl EngineSettings {
    pub fn new(scenario_name: impl Into<String>, config: SimulationConfig) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            config,
            snapshot_interval_ticks: 0,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

/// Receives every completed tick. Closures taking `&TickResult` qualify.
pub trait TickObserver {
    fn on_tick(&mut self, result: &TickResult);
}

impl<F> TickObserver for F
where
    F: FnMut(&TickResult),
{
    fn on_tick(&mut self, result: &TickResult) {
        self(result)
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    registry: BuildingRegistry,
    initial_resources: ResourceVector,
    capacity: ResourceVector,
    initial_population: u32,
    housing_capacity: u32,
    observers: Vec<Box<dyn TickObserver>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            registry: BuildingRegistry::default(),
            initial_resources: ResourceVector::zero(),
            capacity: ResourceVector::zero(),
            initial_population: 1,
            housing_capacity: 0,
            observers: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: BuildingRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_resources(mut self, initial: ResourceVector, capacity: ResourceVector) -> Self {
        self.initial_resources = initial;
        self.capacity = capacity;
        self
    }

    pub fn with_population(mut self, population: u32) -> Self {
        self.initial_population = population;
        self
    }

    /// Housing already standing when the engine starts.
    pub fn with_housing(mut self, housing_capacity: u32) -> Self {
        self.housing_capacity = housing_capacity;
        self
    }

    pub fn with_observer(mut self, observer: impl TickObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> Engine {
        let population = PopulationController::with_housing(
            self.settings.config.clone(),
            self.initial_population,
            self.housing_capacity,
        );
        let mut store = ResourceStore::new(self.initial_resources, self.capacity);
        let summary = population.summary();
        store.set_demographics(summary.current, summary.max, summary.happiness);
        Engine {
            registry: self.registry,
            store,
            allocator: WorkerAllocator::new(),
            population,
            observers: self.observers,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
            tick: 0,
            unknown_ids: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTotals {
    pub production: ResourceVector,
    pub consumption: ResourceVector,
}

/// Everything a tick changed, handed to observers and returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub delta_seconds: f64,
    pub resources: ResourceSnapshot,
    pub flow: FlowTotals,
    pub workers: WorkerStats,
    pub assignments: Vec<WorkerAssignment>,
    pub population: PopulationSummary,
    pub events: Vec<PopulationEvent>,
}

pub struct Engine {
    registry: BuildingRegistry,
    store: ResourceStore,
    allocator: WorkerAllocator,
    population: PopulationController,
    observers: Vec<Box<dyn TickObserver>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    tick: u64,
    unknown_ids: HashSet<String>,
}

impl Engine {
    /// Advances the settlement by one step. Order matters: population reads the
    /// stock before it moves, workers are allocated against the post-death
    /// headcount, and the flow uses those fresh efficiencies.
    pub fn tick<G>(&mut self, grid: &G, delta_seconds: f64) -> TickResult
    where
        G: WorldGrid + ?Sized,
    {
        let dt = self.clamp_delta(delta_seconds);
        self.tick += 1;
        let buildings = self.active_instances(grid);

        let population_tick = self.population.advance(self.store.amounts(), dt);

        let summary = self.population.summary();
        self.store
            .set_demographics(summary.current, summary.max, summary.happiness);

        self.allocator
            .recompute(self.population.workforce(), &buildings);

        let flow = self.flow_totals(&buildings, &population_tick.demand);
        self.store
            .apply_flow(&flow.production, &flow.consumption, dt);

        let result = TickResult {
            tick: self.tick,
            elapsed_seconds: self.population.state().elapsed,
            delta_seconds: dt,
            resources: self.store.snapshot(),
            flow,
            workers: self.allocator.stats(),
            assignments: self.allocator.assignments().to_vec(),
            population: summary,
            events: population_tick.events,
        };
        debug!(
            tick = result.tick,
            population = summary.current,
            happiness = summary.happiness,
            assigned = result.workers.assigned,
            understaffed = result.workers.understaffed,
            "tick complete"
        );
        for observer in &mut self.observers {
            observer.on_tick(&result);
        }
        result
    }

    /// Runs `ticks` fixed steps, writing snapshots on the configured interval.
    pub fn run<G>(&mut self, grid: &G, ticks: u64, delta_seconds: f64) -> Result<()>
    where
        G: WorldGrid + ?Sized,
    {
        self.run_with_hook(grid, ticks, delta_seconds, |_| {})
    }

    pub fn run_with_hook<G, F>(
        &mut self,
        grid: &G,
        ticks: u64,
        delta_seconds: f64,
        mut hook: F,
    ) -> Result<()>
    where
        G: WorldGrid + ?Sized,
        F: FnMut(&TickResult),
    {
        for _ in 0..ticks {
            let result = self.tick(grid, delta_seconds);
            self.snapshot_writer
                .maybe_write(&result, &self.settings.scenario_name)?;
            hook(&result);
        }
        Ok(())
    }

    /// Recomputes the population ceiling from every placed building's housing.
    /// Returns the number of residents evicted.
    pub fn grid_changed<G>(&mut self, grid: &G) -> u32
    where
        G: WorldGrid + ?Sized,
    {
        let housing: u32 = self
            .active_instances(grid)
            .iter()
            .fold(0u32, |sum, b| sum.saturating_add(b.housing_capacity));
        let evicted = self.population.recompute_max(housing);
        self.sync_demographics();
        evicted
    }

    /// Pays the template cost, records the placement and applies its storage
    /// and housing. Nothing is charged when the placement is rejected.
    pub fn place_building(
        &mut self,
        grid: &mut Grid,
        building_id: &str,
        x: i32,
        y: i32,
    ) -> Result<BuildingInstance, PlacementError> {
        let template = self
            .registry
            .lookup(building_id)
            .cloned()
            .ok_or_else(|| PlacementError::UnknownBuilding(building_id.to_string()))?;
        if grid.is_occupied(x, y) {
            return Err(PlacementError::Occupied { x, y });
        }
        if !self.store.spend(&template.cost) {
            return Err(PlacementError::InsufficientFunds {
                building: building_id.to_string(),
            });
        }
        grid.place(building_id, x, y);
        self.store.increase_capacity(&template.storage);
        self.grid_changed(grid);
        info!(building = template.display_name(), x, y, "building placed");
        Ok(BuildingInstance::from_template(&template, x, y))
    }

    /// Removes whatever stands at `(x, y)`. Storage capacity goes with it; the
    /// build cost is not refunded.
    pub fn remove_building(
        &mut self,
        grid: &mut Grid,
        x: i32,
        y: i32,
    ) -> Result<PlacedBuilding, PlacementError> {
        let removed = grid.remove(x, y).ok_or(PlacementError::NotFound { x, y })?;
        if let Some(template) = self.registry.lookup(&removed.building_id) {
            self.store.reduce_capacity(&template.storage);
        }
        self.grid_changed(grid);
        info!(building = %removed.building_id, x, y, "building removed");
        Ok(removed)
    }

    pub fn save_state(&self) -> SavedState {
        SavedState {
            scenario: self.settings.scenario_name.clone(),
            tick: self.tick,
            resources: self.store.snapshot(),
            population: self.population.state().clone(),
        }
    }

    pub fn restore(&mut self, state: SavedState) {
        self.tick = state.tick;
        self.store = ResourceStore::from_snapshot(&state.resources);
        self.population =
            PopulationController::from_state(self.settings.config.clone(), state.population);
        self.allocator = WorkerAllocator::new();
        self.sync_demographics();
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn registry(&self) -> &BuildingRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Direct stock access for hosts: trading, random events, disasters.
    pub fn store_mut(&mut self) -> &mut ResourceStore {
        &mut self.store
    }

    pub fn allocator(&self) -> &WorkerAllocator {
        &self.allocator
    }

    pub fn population(&self) -> &PopulationController {
        &self.population
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        self.store.snapshot()
    }

    fn clamp_delta(&self, delta_seconds: f64) -> f64 {
        let max = finite_or_zero(self.settings.config.max_tick_seconds).max(0.0);
        finite_or_zero(delta_seconds).clamp(0.0, max)
    }

    fn sync_demographics(&mut self) {
        let summary = self.population.summary();
        self.store
            .set_demographics(summary.current, summary.max, summary.happiness);
    }

    fn active_instances<G>(&mut self, grid: &G) -> Vec<BuildingInstance>
    where
        G: WorldGrid + ?Sized,
    {
        grid.list_active_buildings()
            .into_iter()
            .map(|placed| match self.registry.lookup(&placed.building_id) {
                Some(template) => BuildingInstance::from_template(template, placed.x, placed.y),
                None => {
                    if self.unknown_ids.insert(placed.building_id.clone()) {
                        warn!(
                            building = %placed.building_id,
                            "unknown building id, treating as inert"
                        );
                    }
                    let inert = BuildingTemplate::inert(placed.building_id);
                    BuildingInstance::from_template(&inert, placed.x, placed.y)
                }
            })
            .collect()
    }

    /// Sums every building's rates scaled by its staffing efficiency. Production
    /// and consumption share the same scalar. Population demand is added on top.
    fn flow_totals(
        &self,
        buildings: &[BuildingInstance],
        population_demand: &ResourceVector,
    ) -> FlowTotals {
        let mut production = ResourceVector::zero();
        let mut consumption = *population_demand;
        for building in buildings {
            let efficiency = self.allocator.efficiency_of(&building.id);
            production.add_scaled(&building.production_rates, efficiency);
            consumption.add_scaled(&building.consumption_rates, efficiency);
        }
        FlowTotals {
            production,
            consumption,
        }
    }
}
