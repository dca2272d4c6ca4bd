use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

use super::types::{Plant, PlantType, PlantingMethod, SpaceCategory, SunRequirement, WaterNeeds};

pub struct PlantSearchTool {
    spec: ToolSpec,
    database: Vec<Plant>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    hardiness_zone: String,
    sun_requirement: SunRequirement,
    #[serde(default)]
    plant_type: Option<PlantType>,
    #[serde(default)]
    whitelist: Vec<String>,
    #[serde(default)]
    blacklist: Vec<String>,
}

impl Default for PlantSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PlantSearchTool {
    pub fn new() -> Self {
        Self::with_database(builtin_plant_database())
    }

    pub fn with_database(database: Vec<Plant>) -> Self {
        Self {
            spec: ToolSpec::new(
                "query_plant_database",
                "Searches for plants matching growing requirements",
            )
            .with_param(
                "hardiness_zone",
                ParamSpec::required(ParamKind::String, "USDA hardiness zone (e.g., '7b')"),
            )
            .with_param(
                "sun_requirement",
                ParamSpec::required(ParamKind::String, "Sunlight needs").with_allowed(&[
                    "full_sun",
                    "partial_shade",
                    "full_shade",
                ]),
            )
            .with_param(
                "plant_type",
                ParamSpec::optional(ParamKind::String, "Type of plant").with_allowed(&[
                    "vegetable",
                    "herb",
                    "flower",
                    "fruit",
                    "perennial",
                    "annual",
                ]),
            )
            .with_param(
                "space_category",
                ParamSpec::optional(ParamKind::String, "Space requirement").with_allowed(&[
                    "small", "medium", "large",
                ]),
            )
            .with_param(
                "growing_goal",
                ParamSpec::optional(ParamKind::String, "User's growing goal"),
            )
            .with_param(
                "whitelist",
                ParamSpec::optional(ParamKind::Array, "Specific plants user wants"),
            )
            .with_param(
                "blacklist",
                ParamSpec::optional(ParamKind::Array, "Plants to exclude"),
            ),
            database,
        }
    }

    fn matches(&self, plant: &Plant, args: &SearchArgs, zone_digits: &str) -> bool {
        let name = plant.common_name.to_lowercase();

        if args
            .blacklist
            .iter()
            .any(|entry| entry.to_lowercase() == name)
        {
            return false;
        }

        if !args.whitelist.is_empty()
            && !args
                .whitelist
                .iter()
                .any(|entry| entry.to_lowercase() == name)
        {
            return false;
        }

        if !plant
            .hardiness_zones
            .iter()
            .any(|zone| zone == zone_digits)
        {
            return false;
        }

        // Partial-shade beds see enough light for most sun preferences.
        let sun_ok = plant.sun_requirement == args.sun_requirement
            || args.sun_requirement == SunRequirement::PartialShade;
        if !sun_ok {
            return false;
        }

        if let Some(plant_type) = args.plant_type {
            if plant.plant_type != plant_type {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl Tool for PlantSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let args: SearchArgs = serde_json::from_value(Value::Object(args))?;
        let zone_digits: String = args
            .hardiness_zone
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        let results: Vec<&Plant> = self
            .database
            .iter()
            .filter(|plant| self.matches(plant, &args, &zone_digits))
            .collect();

        if results.is_empty() {
            return Ok(json!({
                "plant_list": [],
                "message": "No plants found matching criteria. Consider relaxing constraints.",
                "source": "builtin"
            }));
        }

        Ok(json!({
            "plant_list": results,
            "source": "builtin"
        }))
    }
}

fn strs(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn builtin_plant_database() -> Vec<Plant> {
    vec![
        Plant {
            common_name: "Tomato".to_string(),
            scientific_name: "Solanum lycopersicum".to_string(),
            plant_type: PlantType::Vegetable,
            hardiness_zones: strs(&["3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::FullSun,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Medium,
            spacing_inches: 24.0,
            days_to_maturity: 70,
            planting_method: PlantingMethod::Transplant,
            height_inches: 48.0,
            spread_inches: 24.0,
            continuous_harvest: true,
            companion_plants: strs(&["basil", "marigold", "carrot"]),
            antagonist_plants: strs(&["cabbage", "fennel"]),
            notes: None,
        },
        Plant {
            common_name: "Basil".to_string(),
            scientific_name: "Ocimum basilicum".to_string(),
            plant_type: PlantType::Herb,
            hardiness_zones: strs(&["4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::FullSun,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Small,
            spacing_inches: 12.0,
            days_to_maturity: 60,
            planting_method: PlantingMethod::Both,
            height_inches: 18.0,
            spread_inches: 12.0,
            continuous_harvest: true,
            companion_plants: strs(&["tomato", "pepper"]),
            antagonist_plants: Vec::new(),
            notes: None,
        },
        Plant {
            common_name: "Lettuce".to_string(),
            scientific_name: "Lactuca sativa".to_string(),
            plant_type: PlantType::Vegetable,
            hardiness_zones: strs(&["2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::PartialShade,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Small,
            spacing_inches: 8.0,
            days_to_maturity: 45,
            planting_method: PlantingMethod::Both,
            height_inches: 8.0,
            spread_inches: 10.0,
            continuous_harvest: true,
            companion_plants: strs(&["carrot", "radish"]),
            antagonist_plants: Vec::new(),
            notes: None,
        },
        Plant {
            common_name: "Marigold".to_string(),
            scientific_name: "Tagetes".to_string(),
            plant_type: PlantType::Flower,
            hardiness_zones: strs(&["2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::FullSun,
            water_needs: WaterNeeds::Low,
            space_category: SpaceCategory::Small,
            spacing_inches: 10.0,
            days_to_maturity: 50,
            planting_method: PlantingMethod::Both,
            height_inches: 12.0,
            spread_inches: 10.0,
            continuous_harvest: true,
            companion_plants: strs(&["tomato", "pepper", "most vegetables"]),
            antagonist_plants: Vec::new(),
            notes: None,
        },
        Plant {
            common_name: "Parsley".to_string(),
            scientific_name: "Petroselinum crispum".to_string(),
            plant_type: PlantType::Herb,
            hardiness_zones: strs(&["5", "6", "7", "8", "9", "10"]),
            sun_requirement: SunRequirement::PartialShade,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Small,
            spacing_inches: 8.0,
            days_to_maturity: 70,
            planting_method: PlantingMethod::Both,
            height_inches: 12.0,
            spread_inches: 10.0,
            continuous_harvest: true,
            companion_plants: strs(&["tomato", "asparagus"]),
            antagonist_plants: Vec::new(),
            notes: None,
        },
        Plant {
            common_name: "Pepper".to_string(),
            scientific_name: "Capsicum annuum".to_string(),
            plant_type: PlantType::Vegetable,
            hardiness_zones: strs(&["3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::FullSun,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Medium,
            spacing_inches: 18.0,
            days_to_maturity: 70,
            planting_method: PlantingMethod::Transplant,
            height_inches: 24.0,
            spread_inches: 18.0,
            continuous_harvest: true,
            companion_plants: strs(&["basil", "onion"]),
            antagonist_plants: strs(&["fennel"]),
            notes: None,
        },
        Plant {
            common_name: "Mint".to_string(),
            scientific_name: "Mentha".to_string(),
            plant_type: PlantType::Herb,
            hardiness_zones: strs(&["3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::PartialShade,
            water_needs: WaterNeeds::High,
            space_category: SpaceCategory::Small,
            spacing_inches: 12.0,
            days_to_maturity: 60,
            planting_method: PlantingMethod::Transplant,
            height_inches: 12.0,
            spread_inches: 24.0,
            continuous_harvest: true,
            companion_plants: strs(&["cabbage", "tomato"]),
            antagonist_plants: Vec::new(),
            notes: Some("Invasive - best grown in containers".to_string()),
        },
        Plant {
            common_name: "Cilantro".to_string(),
            scientific_name: "Coriandrum sativum".to_string(),
            plant_type: PlantType::Herb,
            hardiness_zones: strs(&["2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]),
            sun_requirement: SunRequirement::PartialShade,
            water_needs: WaterNeeds::Medium,
            space_category: SpaceCategory::Small,
            spacing_inches: 6.0,
            days_to_maturity: 50,
            planting_method: PlantingMethod::Seed,
            height_inches: 18.0,
            spread_inches: 8.0,
            continuous_harvest: false,
            companion_plants: strs(&["beans", "peas"]),
            antagonist_plants: Vec::new(),
            notes: None,
        },
    ]
}
