pub mod buildings;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod population;
pub mod registry;
pub mod resources;
pub mod scenario;
pub mod snapshot;
pub mod workers;

pub use config::SimulationConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings, TickObserver, TickResult};
pub use resources::{ResourceKind, ResourceStore, ResourceVector};
pub use scenario::{Scenario, ScenarioLoader};
