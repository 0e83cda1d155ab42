//! Settlement stockpile: six material resources bounded by a capacity vector,
//! plus the demographic fields mirrored from the population controller.
//!
//! Every mutation clamps into `[0, capacity]`. Out-of-range requests are never
//! rejected, so callers (events, disasters, the tick itself) can push raw deltas.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub const MAX_HAPPINESS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Scrap,
    Food,
    Water,
    Power,
    Medicine,
    Caps,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Scrap,
        ResourceKind::Food,
        ResourceKind::Water,
        ResourceKind::Power,
        ResourceKind::Medicine,
        ResourceKind::Caps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Scrap => "scrap",
            ResourceKind::Food => "food",
            ResourceKind::Water => "water",
            ResourceKind::Power => "power",
            ResourceKind::Medicine => "medicine",
            ResourceKind::Caps => "caps",
        }
    }
}

/// Named quantities for the six material resources. Used for stock, capacity,
/// per-second rates and one-off costs alike; absent fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceVector {
    pub scrap: f64,
    pub food: f64,
    pub water: f64,
    pub power: f64,
    pub medicine: f64,
    pub caps: f64,
}

impl ResourceVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Vector with every field set to `value`.
    pub fn splat(value: f64) -> Self {
        Self {
            scrap: value,
            food: value,
            water: value,
            power: value,
            medicine: value,
            caps: value,
        }
    }

    pub fn with(mut self, kind: ResourceKind, value: f64) -> Self {
        self[kind] = value;
        self
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        self[kind]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        ResourceKind::ALL.into_iter().map(move |kind| (kind, self[kind]))
    }

    pub fn is_zero(&self) -> bool {
        self.iter().all(|(_, value)| value == 0.0)
    }

    /// `self += other * factor`, field by field.
    pub fn add_scaled(&mut self, other: &ResourceVector, factor: f64) {
        for kind in ResourceKind::ALL {
            self[kind] += other[kind] * factor;
        }
    }

    fn sanitized(&self) -> Self {
        let mut out = *self;
        for kind in ResourceKind::ALL {
            out[kind] = finite_or_zero(out[kind]);
        }
        out
    }
}

impl Index<ResourceKind> for ResourceVector {
    type Output = f64;

    fn index(&self, kind: ResourceKind) -> &f64 {
        match kind {
            ResourceKind::Scrap => &self.scrap,
            ResourceKind::Food => &self.food,
            ResourceKind::Water => &self.water,
            ResourceKind::Power => &self.power,
            ResourceKind::Medicine => &self.medicine,
            ResourceKind::Caps => &self.caps,
        }
    }
}

impl IndexMut<ResourceKind> for ResourceVector {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Scrap => &mut self.scrap,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Water => &mut self.water,
            ResourceKind::Power => &mut self.power,
            ResourceKind::Medicine => &mut self.medicine,
            ResourceKind::Caps => &mut self.caps,
        }
    }
}

/// Demographic fields pushed in from the population controller each tick.
/// `max_population` doubles as the capacity of `population`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub population: u32,
    pub max_population: u32,
    pub happiness: f64,
}

impl Default for Demographics {
    fn default() -> Self {
        Self {
            population: 1,
            max_population: 1,
            happiness: 50.0,
        }
    }
}

/// Tick-boundary view of the store, consumed by the UI and by save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resources: ResourceVector,
    pub capacity: ResourceVector,
    pub demographics: Demographics,
}

#[derive(Debug, Clone)]
pub struct ResourceStore {
    amounts: ResourceVector,
    capacity: ResourceVector,
    demographics: Demographics,
}

impl ResourceStore {
    pub fn new(initial: ResourceVector, capacity: ResourceVector) -> Self {
        let mut capacity = capacity.sanitized();
        for kind in ResourceKind::ALL {
            capacity[kind] = capacity[kind].max(0.0);
        }
        let mut store = Self {
            amounts: ResourceVector::zero(),
            capacity,
            demographics: Demographics::default(),
        };
        store.add(&initial);
        store
    }

    /// Rebuilds a store from a saved snapshot, clamping anything out of range.
    pub fn from_snapshot(snapshot: &ResourceSnapshot) -> Self {
        let mut store = Self::new(snapshot.resources, snapshot.capacity);
        let demo = snapshot.demographics;
        store.set_demographics(demo.population, demo.max_population, demo.happiness);
        store
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        self.amounts[kind]
    }

    pub fn capacity_of(&self, kind: ResourceKind) -> f64 {
        self.capacity[kind]
    }

    pub fn amounts(&self) -> &ResourceVector {
        &self.amounts
    }

    pub fn capacity(&self) -> &ResourceVector {
        &self.capacity
    }

    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    /// `clamp(old + production*dt - consumption*dt, 0, capacity)` for every field.
    pub fn apply_flow(
        &mut self,
        production: &ResourceVector,
        consumption: &ResourceVector,
        delta_seconds: f64,
    ) {
        let dt = finite_or_zero(delta_seconds).max(0.0);
        let production = production.sanitized();
        let consumption = consumption.sanitized();
        for kind in ResourceKind::ALL {
            let next = self.amounts[kind] + production[kind] * dt - consumption[kind] * dt;
            self.amounts[kind] = clamp_field(next, self.capacity[kind]);
        }
    }

    /// Deducts `cost` only if every field is covered. Never debits partially.
    pub fn spend(&mut self, cost: &ResourceVector) -> bool {
        let mut cost = cost.sanitized();
        for kind in ResourceKind::ALL {
            cost[kind] = cost[kind].max(0.0);
        }
        if ResourceKind::ALL
            .iter()
            .any(|&kind| cost[kind] > self.amounts[kind])
        {
            return false;
        }
        for kind in ResourceKind::ALL {
            self.amounts[kind] = clamp_field(self.amounts[kind] - cost[kind], self.capacity[kind]);
        }
        true
    }

    /// Adds signed amounts, clamping each field into `[0, capacity]`.
    pub fn add(&mut self, amounts: &ResourceVector) {
        let amounts = amounts.sanitized();
        for kind in ResourceKind::ALL {
            self.amounts[kind] = clamp_field(self.amounts[kind] + amounts[kind], self.capacity[kind]);
        }
    }

    pub fn increase_capacity(&mut self, amounts: &ResourceVector) {
        let amounts = amounts.sanitized();
        for kind in ResourceKind::ALL {
            self.capacity[kind] += amounts[kind].max(0.0);
        }
    }

    /// Lowers capacity (floored at zero) and clamps current stock under it.
    pub fn reduce_capacity(&mut self, amounts: &ResourceVector) {
        let amounts = amounts.sanitized();
        for kind in ResourceKind::ALL {
            self.capacity[kind] = (self.capacity[kind] - amounts[kind].max(0.0)).max(0.0);
            self.amounts[kind] = clamp_field(self.amounts[kind], self.capacity[kind]);
        }
    }

    pub fn set_demographics(&mut self, population: u32, max_population: u32, happiness: f64) {
        let max_population = max_population.max(1);
        self.demographics = Demographics {
            population: population.clamp(1, max_population),
            max_population,
            happiness: finite_or_zero(happiness).clamp(0.0, MAX_HAPPINESS),
        };
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            resources: self.amounts,
            capacity: self.capacity,
            demographics: self.demographics,
        }
    }
}

fn clamp_field(value: f64, capacity: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, capacity)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ResourceStore {
        ResourceStore::new(
            ResourceVector {
                scrap: 100.0,
                food: 10.0,
                water: 10.0,
                power: 20.0,
                medicine: 0.0,
                caps: 50.0,
            },
            ResourceVector::splat(200.0),
        )
    }

    #[test]
    fn spend_fails_without_partial_deduction() {
        let mut store = store();
        let cost = ResourceVector::zero()
            .with(ResourceKind::Scrap, 1000.0)
            .with(ResourceKind::Caps, 10.0);
        assert!(!store.spend(&cost));
        assert_eq!(store.get(ResourceKind::Scrap), 100.0);
        assert_eq!(store.get(ResourceKind::Caps), 50.0);
    }

    #[test]
    fn spend_deducts_every_field_on_success() {
        let mut store = store();
        let cost = ResourceVector::zero()
            .with(ResourceKind::Scrap, 40.0)
            .with(ResourceKind::Caps, 50.0);
        assert!(store.spend(&cost));
        assert_eq!(store.get(ResourceKind::Scrap), 60.0);
        assert_eq!(store.get(ResourceKind::Caps), 0.0);
    }

    #[test]
    fn add_clamps_to_capacity_and_zero() {
        let mut store = store();
        store.add(&ResourceVector::zero().with(ResourceKind::Food, 1_000.0));
        assert_eq!(store.get(ResourceKind::Food), 200.0);
        store.add(&ResourceVector::zero().with(ResourceKind::Water, -1_000.0));
        assert_eq!(store.get(ResourceKind::Water), 0.0);
    }

    #[test]
    fn add_empty_is_noop() {
        let mut store = store();
        let before = store.snapshot();
        store.add(&ResourceVector::zero());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn apply_flow_clamps_per_field() {
        let mut store = store();
        let production = ResourceVector::zero().with(ResourceKind::Scrap, 500.0);
        let consumption = ResourceVector::zero().with(ResourceKind::Power, 50.0);
        store.apply_flow(&production, &consumption, 1.0);
        assert_eq!(store.get(ResourceKind::Scrap), 200.0);
        assert_eq!(store.get(ResourceKind::Power), 0.0);
        assert_eq!(store.get(ResourceKind::Food), 10.0);
    }

    #[test]
    fn non_finite_inputs_are_ignored() {
        let mut store = store();
        store.add(&ResourceVector::zero().with(ResourceKind::Scrap, f64::NAN));
        store.apply_flow(
            &ResourceVector::splat(f64::INFINITY),
            &ResourceVector::zero(),
            1.0,
        );
        assert_eq!(store.get(ResourceKind::Scrap), 100.0);
        store.apply_flow(&ResourceVector::splat(1.0), &ResourceVector::zero(), f64::NAN);
        assert_eq!(store.get(ResourceKind::Scrap), 100.0);
    }

    #[test]
    fn reducing_capacity_clamps_stock() {
        let mut store = store();
        store.reduce_capacity(&ResourceVector::zero().with(ResourceKind::Scrap, 150.0));
        assert_eq!(store.capacity_of(ResourceKind::Scrap), 50.0);
        assert_eq!(store.get(ResourceKind::Scrap), 50.0);
        store.reduce_capacity(&ResourceVector::zero().with(ResourceKind::Scrap, 500.0));
        assert_eq!(store.capacity_of(ResourceKind::Scrap), 0.0);
        assert_eq!(store.get(ResourceKind::Scrap), 0.0);
    }

    #[test]
    fn increase_capacity_leaves_stock_untouched() {
        let mut store = store();
        store.increase_capacity(&ResourceVector::zero().with(ResourceKind::Food, 100.0));
        assert_eq!(store.capacity_of(ResourceKind::Food), 300.0);
        assert_eq!(store.get(ResourceKind::Food), 10.0);
    }

    #[test]
    fn demographics_are_clamped() {
        let mut store = store();
        store.set_demographics(0, 10, 250.0);
        assert_eq!(store.demographics().population, 1);
        assert_eq!(store.demographics().happiness, 100.0);
        store.set_demographics(40, 10, -3.0);
        assert_eq!(store.demographics().population, 10);
        assert_eq!(store.demographics().happiness, 0.0);
    }

    #[test]
    fn initial_stock_is_clamped_to_capacity() {
        let store = ResourceStore::new(ResourceVector::splat(50.0), ResourceVector::splat(20.0));
        assert_eq!(store.get(ResourceKind::Medicine), 20.0);
    }
}
