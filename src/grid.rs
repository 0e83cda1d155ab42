//! Boundary to the host's world grid. The simulation only ever reads the list
//! of active placements; tile storage, footprints and rendering live elsewhere.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedBuilding {
    pub building_id: String,
    pub x: i32,
    pub y: i32,
}

impl PlacedBuilding {
    pub fn new(building_id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            building_id: building_id.into(),
            x,
            y,
        }
    }
}

pub trait WorldGrid {
    /// Active placements in stable discovery order.
    fn list_active_buildings(&self) -> Vec<PlacedBuilding>;
}

impl WorldGrid for [PlacedBuilding] {
    fn list_active_buildings(&self) -> Vec<PlacedBuilding> {
        self.to_vec()
    }
}

impl WorldGrid for Vec<PlacedBuilding> {
    fn list_active_buildings(&self) -> Vec<PlacedBuilding> {
        self.clone()
    }
}

/// Minimal in-memory grid for headless hosts and tests: one building per origin,
/// kept in placement order.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    placements: Vec<PlacedBuilding>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(&self, x: i32, y: i32) -> Option<&PlacedBuilding> {
        self.placements.iter().find(|p| p.x == x && p.y == y)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.at(x, y).is_some()
    }

    /// Returns false if the origin is already taken.
    pub fn place(&mut self, building_id: impl Into<String>, x: i32, y: i32) -> bool {
        if self.is_occupied(x, y) {
            return false;
        }
        self.placements.push(PlacedBuilding::new(building_id, x, y));
        true
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<PlacedBuilding> {
        let index = self.placements.iter().position(|p| p.x == x && p.y == y)?;
        Some(self.placements.remove(index))
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

impl WorldGrid for Grid {
    fn list_active_buildings(&self) -> Vec<PlacedBuilding> {
        self.placements.clone()
    }
}
