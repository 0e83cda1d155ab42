//! Settlement headcount, ceiling and happiness.
//!
//! Each tick reads the stock *before* it is mutated, moves happiness up or
//! down, fires at most one death per depleted resource and at most one growth
//! per growth interval. There is no catch-up for long deltas; the engine
//! clamps `delta_seconds` instead.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::resources::{finite_or_zero, ResourceVector, MAX_HAPPINESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starvation,
    Dehydration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopulationEvent {
    Growth,
    Death { cause: DeathCause, count: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationState {
    pub current: u32,
    pub max: u32,
    pub happiness: f64,
    /// Simulated seconds since the controller was created.
    pub elapsed: f64,
    pub last_growth_check: f64,
    pub food_depleted_at: Option<f64>,
    pub water_depleted_at: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub current: u32,
    pub max: u32,
    pub happiness: f64,
}

/// Whether the stock on hand covered this tick's demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sufficiency {
    pub food: bool,
    pub water: bool,
    pub power: bool,
    pub medicine: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationTick {
    /// Per-second consumption of the headcount at the start of the tick.
    pub demand: ResourceVector,
    pub sufficiency: Sufficiency,
    pub events: Vec<PopulationEvent>,
}

#[derive(Debug, Clone)]
pub struct PopulationController {
    config: SimulationConfig,
    state: PopulationState,
}

impl PopulationController {
    pub fn new(config: SimulationConfig, initial_population: u32) -> Self {
        Self::with_housing(config, initial_population, 0)
    }

    /// Starts with a ceiling of `base + housing_capacity`.
    pub fn with_housing(
        config: SimulationConfig,
        initial_population: u32,
        housing_capacity: u32,
    ) -> Self {
        let max = config
            .base_max_population
            .saturating_add(housing_capacity)
            .max(1);
        let happiness = finite_or_zero(config.happiness.initial).clamp(0.0, MAX_HAPPINESS);
        Self {
            state: PopulationState {
                current: initial_population.clamp(1, max),
                max,
                happiness,
                elapsed: 0.0,
                last_growth_check: 0.0,
                food_depleted_at: None,
                water_depleted_at: None,
            },
            config,
        }
    }

    /// Restores a saved state, pulling every field back into range.
    pub fn from_state(config: SimulationConfig, state: PopulationState) -> Self {
        let max = state.max.max(1);
        let elapsed = finite_or_zero(state.elapsed).max(0.0);
        let state = PopulationState {
            current: state.current.clamp(1, max),
            max,
            happiness: finite_or_zero(state.happiness).clamp(0.0, MAX_HAPPINESS),
            elapsed,
            last_growth_check: finite_or_zero(state.last_growth_check).clamp(0.0, elapsed),
            food_depleted_at: state.food_depleted_at.map(|t| clamp_stamp(t, elapsed)),
            water_depleted_at: state.water_depleted_at.map(|t| clamp_stamp(t, elapsed)),
        };
        Self { config, state }
    }

    pub fn state(&self) -> &PopulationState {
        &self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current(&self) -> u32 {
        self.state.current
    }

    pub fn max(&self) -> u32 {
        self.state.max
    }

    pub fn happiness(&self) -> f64 {
        self.state.happiness
    }

    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary {
            current: self.state.current,
            max: self.state.max,
            happiness: self.state.happiness,
        }
    }

    /// Headcount available for work this tick.
    pub fn workforce(&self) -> i64 {
        let ratio = finite_or_zero(self.config.workforce_ratio).max(0.0);
        (f64::from(self.state.current) * ratio).floor() as i64
    }

    /// `current * per_capita` for food, water and power; other fields stay zero.
    pub fn demand(&self) -> ResourceVector {
        let headcount = f64::from(self.state.current);
        let rates = &self.config.per_capita;
        ResourceVector {
            food: headcount * rates.food,
            water: headcount * rates.water,
            power: headcount * rates.power,
            ..ResourceVector::zero()
        }
    }

    /// Sets the ceiling to `base + housing` and clamps the headcount under it.
    /// Returns how many residents were evicted.
    pub fn recompute_max(&mut self, housing_capacity: u32) -> u32 {
        let max = self
            .config
            .base_max_population
            .saturating_add(housing_capacity)
            .max(1);
        self.state.max = max;
        let evicted = self.state.current.saturating_sub(max);
        if evicted > 0 {
            self.state.current = max;
            info!(evicted, max, "housing shrank, residents evicted");
        }
        evicted
    }

    /// Happiness, death and growth for one tick, judged against `stock` as it
    /// stood before this tick's flow.
    pub fn advance(&mut self, stock: &ResourceVector, delta_seconds: f64) -> PopulationTick {
        let demand = self.demand();
        let dt = finite_or_zero(delta_seconds).max(0.0);
        let sufficiency = Sufficiency {
            food: stock.food >= demand.food * dt,
            water: stock.water >= demand.water * dt,
            power: stock.power >= demand.power * dt,
            medicine: stock.medicine > 0.0,
        };
        let mut events = Vec::new();
        if dt == 0.0 {
            return PopulationTick {
                demand,
                sufficiency,
                events,
            };
        }

        let started = self.state.elapsed;
        self.state.elapsed += dt;
        let now = self.state.elapsed;

        self.update_happiness(sufficiency, dt);
        self.evaluate_deaths(sufficiency, started, now, &mut events);
        self.evaluate_growth(now, &mut events);

        PopulationTick {
            demand,
            sufficiency,
            events,
        }
    }

    fn update_happiness(&mut self, sufficiency: Sufficiency, dt: f64) {
        let tuning = &self.config.happiness;
        let delta = if sufficiency.food && sufficiency.water {
            let mut gain = tuning.recovery_rate;
            if sufficiency.power {
                gain += tuning.power_bonus;
            }
            if sufficiency.medicine {
                gain += tuning.medicine_bonus;
            }
            gain * dt
        } else {
            -tuning.decay_rate * dt
        };
        self.state.happiness =
            (self.state.happiness + finite_or_zero(delta)).clamp(0.0, MAX_HAPPINESS);
    }

    fn evaluate_deaths(
        &mut self,
        sufficiency: Sufficiency,
        started: f64,
        now: f64,
        events: &mut Vec<PopulationEvent>,
    ) {
        let starved = shortage_elapsed(
            &mut self.state.food_depleted_at,
            sufficiency.food,
            started,
            now,
            self.config.death_no_food_interval,
        );
        let parched = shortage_elapsed(
            &mut self.state.water_depleted_at,
            sufficiency.water,
            started,
            now,
            self.config.death_no_water_interval,
        );
        for (fired, cause) in [
            (starved, DeathCause::Starvation),
            (parched, DeathCause::Dehydration),
        ] {
            if fired && self.state.current > 1 {
                self.state.current -= 1;
                info!(?cause, population = self.state.current, "settler died");
                events.push(PopulationEvent::Death { cause, count: 1 });
            }
        }
    }

    fn evaluate_growth(&mut self, now: f64, events: &mut Vec<PopulationEvent>) {
        if now - self.state.last_growth_check < self.config.growth_interval {
            return;
        }
        self.state.last_growth_check = now;
        if self.state.happiness >= self.config.growth_happiness_min
            && self.state.current < self.state.max
        {
            self.state.current += 1;
            info!(population = self.state.current, "new settler arrived");
            events.push(PopulationEvent::Growth);
        }
    }
}

fn clamp_stamp(stamp: f64, elapsed: f64) -> f64 {
    finite_or_zero(stamp).clamp(0.0, elapsed)
}

/// Tracks one depletion timestamp. The stamp is the start of the first tick
/// that saw the shortage; once it is `interval` old it fires and restarts.
fn shortage_elapsed(
    depleted_at: &mut Option<f64>,
    sufficient: bool,
    started: f64,
    now: f64,
    interval: f64,
) -> bool {
    if sufficient {
        *depleted_at = None;
        return false;
    }
    let since = *depleted_at.get_or_insert(started);
    if now - since >= interval {
        *depleted_at = Some(now);
        true
    } else {
        false
    }
}
