use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Vegetable,
    Herb,
    Flower,
    Fruit,
    Perennial,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunRequirement {
    FullSun,
    PartialShade,
    FullShade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterNeeds {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceCategory {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantingMethod {
    Seed,
    Transplant,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub common_name: String,
    pub scientific_name: String,
    pub plant_type: PlantType,
    pub hardiness_zones: Vec<String>,
    pub sun_requirement: SunRequirement,
    pub water_needs: WaterNeeds,
    pub space_category: SpaceCategory,
    pub spacing_inches: f64,
    pub days_to_maturity: i64,
    pub planting_method: PlantingMethod,
    pub height_inches: f64,
    pub spread_inches: f64,
    pub continuous_harvest: bool,
    pub companion_plants: Vec<String>,
    pub antagonist_plants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Frost dates are `None` in frost-free climates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateInfo {
    pub hardiness_zone: String,
    pub last_spring_frost: Option<NaiveDate>,
    pub first_fall_frost: Option<NaiveDate>,
    pub growing_season_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Beneficial,
    Antagonistic,
    Neutral,
}
