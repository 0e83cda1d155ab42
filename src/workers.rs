//! Greedy priority-ordered worker allocation.
//!
//! The assignment table is rebuilt from scratch on every pass. Buildings are
//! served in ascending priority (ties keep discovery order) and each takes
//! `min(required, remaining)`. Low-priority buildings may starve indefinitely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingInstance, InstanceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    pub instance: InstanceId,
    pub assigned: u32,
    pub required: u32,
    pub priority: i32,
}

impl WorkerAssignment {
    pub fn efficiency(&self) -> f64 {
        if self.required == 0 {
            1.0
        } else {
            f64::from(self.assigned) / f64::from(self.required)
        }
    }

    pub fn is_understaffed(&self) -> bool {
        self.assigned < self.required
    }
}

/// Aggregate view of the latest allocation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub total: u32,
    pub assigned: u32,
    pub available: u32,
    pub understaffed: u32,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerAllocator {
    assignments: Vec<WorkerAssignment>,
    index: HashMap<InstanceId, usize>,
    stats: WorkerStats,
}

impl WorkerAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the table for `total_workers`. Non-positive totals count as zero.
    pub fn recompute(
        &mut self,
        total_workers: i64,
        buildings: &[BuildingInstance],
    ) -> &[WorkerAssignment] {
        let total = u32::try_from(total_workers.max(0)).unwrap_or(u32::MAX);

        let mut staffed: Vec<&BuildingInstance> = buildings
            .iter()
            .filter(|b| b.workforce_requirement > 0)
            .collect();
        // stable: equal priorities keep discovery order
        staffed.sort_by_key(|b| b.priority);

        let mut remaining = total;
        let mut assignments = Vec::with_capacity(staffed.len());
        for building in staffed {
            let assigned = building.workforce_requirement.min(remaining);
            remaining -= assigned;
            assignments.push(WorkerAssignment {
                instance: building.id.clone(),
                assigned,
                required: building.workforce_requirement,
                priority: building.priority,
            });
        }

        let understaffed = assignments.iter().filter(|a| a.is_understaffed()).count();
        self.stats = WorkerStats {
            total,
            assigned: total - remaining,
            available: remaining,
            understaffed: u32::try_from(understaffed).unwrap_or(u32::MAX),
        };
        self.index = assignments
            .iter()
            .enumerate()
            .map(|(i, a)| (a.instance.clone(), i))
            .collect();
        self.assignments = assignments;
        &self.assignments
    }

    /// Assigned/required for the instance at `(building_id, x, y)`. Buildings
    /// that need no workers, or are not in the table, run at 1.0.
    pub fn efficiency(&self, building_id: &str, x: i32, y: i32) -> f64 {
        self.efficiency_of(&InstanceId::new(building_id, x, y))
    }

    pub fn efficiency_of(&self, instance: &InstanceId) -> f64 {
        self.assignment(instance)
            .map_or(1.0, WorkerAssignment::efficiency)
    }

    pub fn assignment(&self, instance: &InstanceId) -> Option<&WorkerAssignment> {
        self.index.get(instance).map(|&i| &self.assignments[i])
    }

    pub fn assignments(&self) -> &[WorkerAssignment] {
        &self.assignments
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
    }
}
