mod climate;
mod companion;
mod layout;
mod plants;
mod schedule;
mod types;
mod visualize;

pub use climate::ClimateLookupTool;
pub use companion::CompanionCompatibilityTool;
pub use layout::PlanterLayoutTool;
pub use plants::{PlantSearchTool, builtin_plant_database};
pub use schedule::PlantingScheduleTool;
pub use types::{
    ClimateInfo, Plant, PlantType, PlantingMethod, Relationship, SpaceCategory, SunRequirement,
    WaterNeeds,
};
pub use visualize::GardenVisualizationTool;

use crate::application::tooling::ToolRegistry;
use std::sync::Arc;

/// Registry preloaded with the full garden tool suite.
pub fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ClimateLookupTool::new()));
    registry.register(Arc::new(PlantSearchTool::new()));
    registry.register(Arc::new(CompanionCompatibilityTool::new()));
    registry.register(Arc::new(PlanterLayoutTool::new()));
    registry.register(Arc::new(PlantingScheduleTool::new()));
    registry.register(Arc::new(GardenVisualizationTool::new()));
    registry
}
