use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::BuildingTemplate;
use crate::resources::ResourceVector;

/// A placed building is identified by its template id and grid origin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId {
    pub building_id: String,
    pub x: i32,
    pub y: i32,
}

impl InstanceId {
    pub fn new(building_id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            building_id: building_id.into(),
            x,
            y,
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {})", self.building_id, self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingInstance {
    pub id: InstanceId,
    /// Resource deltas per second at full staffing.
    pub production_rates: ResourceVector,
    pub consumption_rates: ResourceVector,
    pub workforce_requirement: u32,
    pub priority: i32,
    pub housing_capacity: u32,
}

impl BuildingInstance {
    pub fn from_template(template: &BuildingTemplate, x: i32, y: i32) -> Self {
        Self {
            id: InstanceId::new(template.id.clone(), x, y),
            production_rates: template.produces,
            consumption_rates: template.consumes,
            workforce_requirement: template.workers_required,
            priority: template.priority,
            housing_capacity: template.housing_capacity,
        }
    }

    pub fn is_automated(&self) -> bool {
        self.workforce_requirement == 0
    }
}
