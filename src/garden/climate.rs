use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

use super::types::ClimateInfo;

pub struct ClimateLookupTool {
    spec: ToolSpec,
    table: HashMap<String, ClimateInfo>,
}

impl Default for ClimateLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimateLookupTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "get_climate_data",
                "Retrieves USDA hardiness zone and frost dates for a zipcode",
            )
            .with_param(
                "zipcode",
                ParamSpec::required(ParamKind::String, "5-digit US postal code"),
            ),
            table: builtin_climate_table(),
        }
    }
}

#[async_trait]
impl Tool for ClimateLookupTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let zipcode = args
            .get("zipcode")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if zipcode.len() != 5 || !zipcode.chars().all(|c| c.is_ascii_digit()) {
            return Ok(json!({
                "error": "Invalid zipcode format. Please provide a 5-digit US postal code."
            }));
        }

        match self.table.get(zipcode) {
            Some(climate) => {
                serde_json::to_value(climate).map_err(|err| ToolInvokeError::failed(err.to_string()))
            }
            None => Ok(json!({
                "error": format!(
                    "Zipcode {zipcode} not found in database. Please provide a different zipcode or your USDA zone manually."
                )
            })),
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn builtin_climate_table() -> HashMap<String, ClimateInfo> {
    HashMap::from([
        (
            "94102".to_string(),
            ClimateInfo {
                hardiness_zone: "10a".to_string(),
                last_spring_frost: None,
                first_fall_frost: None,
                growing_season_days: 365,
            },
        ),
        (
            "10001".to_string(),
            ClimateInfo {
                hardiness_zone: "7b".to_string(),
                last_spring_frost: date(2024, 4, 15),
                first_fall_frost: date(2024, 11, 15),
                growing_season_days: 214,
            },
        ),
        (
            "55401".to_string(),
            ClimateInfo {
                hardiness_zone: "5a".to_string(),
                last_spring_frost: date(2024, 5, 10),
                first_fall_frost: date(2024, 10, 1),
                growing_season_days: 144,
            },
        ),
        (
            "78701".to_string(),
            ClimateInfo {
                hardiness_zone: "9a".to_string(),
                last_spring_frost: date(2024, 3, 1),
                first_fall_frost: date(2024, 12, 1),
                growing_season_days: 275,
            },
        ),
    ])
}
