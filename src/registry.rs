use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resources::ResourceVector;

/// Priority assigned to templates that do not name one. Lower is served first.
pub const DEFAULT_PRIORITY: i32 = 100;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// Immutable template data for one kind of building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub produces: ResourceVector,
    #[serde(default)]
    pub consumes: ResourceVector,
    #[serde(default)]
    pub workers_required: u32,
    #[serde(default)]
    pub housing_capacity: u32,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub cost: ResourceVector,
    #[serde(default)]
    pub storage: ResourceVector,
}

impl BuildingTemplate {
    /// Zero-rate, zero-requirement template used for ids the registry does not know.
    pub fn inert(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            produces: ResourceVector::zero(),
            consumes: ResourceVector::zero(),
            workers_required: 0,
            housing_capacity: 0,
            priority: DEFAULT_PRIORITY,
            cost: ResourceVector::zero(),
            storage: ResourceVector::zero(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Read-only building lookup, built once and handed to the engine.
#[derive(Debug, Clone, Default)]
pub struct BuildingRegistry {
    templates: HashMap<String, BuildingTemplate>,
}

impl BuildingRegistry {
    /// Later duplicates replace earlier ones; scenario validation rejects them first.
    pub fn new(templates: impl IntoIterator<Item = BuildingTemplate>) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect();
        Self { templates }
    }

    pub fn lookup(&self, building_id: &str) -> Option<&BuildingTemplate> {
        self.templates.get(building_id)
    }

    pub fn contains(&self, building_id: &str) -> bool {
        self.templates.contains_key(building_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
