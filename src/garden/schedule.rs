use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

use super::types::PlantingMethod;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct ScheduleArgs {
    plants: Vec<SchedulePlant>,
    frost_dates: FrostDates,
    #[serde(default)]
    current_date: Option<String>,
    #[serde(default)]
    succession_planting: bool,
}

#[derive(Debug, Deserialize)]
struct SchedulePlant {
    #[serde(default = "SchedulePlant::default_name")]
    common_name: String,
    #[serde(default = "SchedulePlant::default_maturity")]
    days_to_maturity: i64,
    #[serde(default = "SchedulePlant::default_method")]
    planting_method: PlantingMethod,
    #[serde(default)]
    continuous_harvest: bool,
}

impl SchedulePlant {
    fn default_name() -> String {
        "Unknown".to_string()
    }

    fn default_maturity() -> i64 {
        60
    }

    fn default_method() -> PlantingMethod {
        PlantingMethod::Seed
    }
}

#[derive(Debug, Deserialize)]
struct FrostDates {
    #[serde(default)]
    last_spring_frost: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    first_fall_frost: Option<String>,
}

struct PlantingWindow {
    start: NaiveDate,
    end: NaiveDate,
    action: &'static str,
}

pub struct PlantingScheduleTool {
    spec: ToolSpec,
}

impl Default for PlantingScheduleTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PlantingScheduleTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "generate_planting_schedule",
                "Creates temporal planting plan based on frost dates",
            )
            .with_param(
                "plants",
                ParamSpec::required(ParamKind::Array, "Selected plants with maturity data"),
            )
            .with_param(
                "frost_dates",
                ParamSpec::required(ParamKind::Object, "Last spring and first fall frost dates"),
            )
            .with_param(
                "current_date",
                ParamSpec::optional(ParamKind::String, "Current date for schedule relevance"),
            )
            .with_param(
                "succession_planting",
                ParamSpec::optional(ParamKind::Boolean, "Whether to plan multiple harvests"),
            ),
        }
    }
}

// Frost-free climates (and unparseable dates) plant from today; everywhere
// else transplants start indoors 6-4 weeks before the last frost and seeds go
// in 1-3 weeks after it.
fn planting_window(
    method: PlantingMethod,
    last_frost: Option<NaiveDate>,
    today: NaiveDate,
) -> PlantingWindow {
    match last_frost {
        None => PlantingWindow {
            start: today,
            end: today + Duration::days(14),
            action: match method {
                PlantingMethod::Seed | PlantingMethod::Both => "direct_sow",
                PlantingMethod::Transplant => "transplant",
            },
        },
        Some(frost) => match method {
            PlantingMethod::Transplant => PlantingWindow {
                start: frost - Duration::days(42),
                end: frost - Duration::days(28),
                action: "start_indoors",
            },
            PlantingMethod::Seed | PlantingMethod::Both => PlantingWindow {
                start: frost + Duration::days(7),
                end: frost + Duration::days(21),
                action: "direct_sow",
            },
        },
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, DATE_FORMAT).ok()
}

#[async_trait]
impl Tool for PlantingScheduleTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let args: ScheduleArgs = serde_json::from_value(Value::Object(args))?;

        let today = parse_date(args.current_date.as_deref())
            .unwrap_or_else(|| Utc::now().date_naive());
        let last_frost = parse_date(args.frost_dates.last_spring_frost.as_deref());

        let mut schedule = Vec::new();

        for plant in &args.plants {
            let window = planting_window(plant.planting_method, last_frost, today);
            let harvest = window.end + Duration::days(plant.days_to_maturity);

            schedule.push(json!({
                "plant_name": plant.common_name,
                "action": window.action,
                "date_range_start": window.start.format(DATE_FORMAT).to_string(),
                "date_range_end": window.end.format(DATE_FORMAT).to_string(),
                "expected_harvest": harvest.format(DATE_FORMAT).to_string(),
                "notes": format!(
                    "Plant {} approximately {} days before harvest",
                    plant.common_name, plant.days_to_maturity
                ),
            }));

            if args.succession_planting && plant.continuous_harvest {
                let second_start = window.end + Duration::days(21);
                let second_harvest = second_start + Duration::days(plant.days_to_maturity);
                schedule.push(json!({
                    "plant_name": format!("{} (succession)", plant.common_name),
                    "action": window.action,
                    "date_range_start": second_start.format(DATE_FORMAT).to_string(),
                    "date_range_end": (second_start + Duration::days(7))
                        .format(DATE_FORMAT)
                        .to_string(),
                    "expected_harvest": second_harvest.format(DATE_FORMAT).to_string(),
                    "notes": "Succession planting for extended harvest",
                }));
            }
        }

        schedule.sort_by(|a, b| {
            a["date_range_start"]
                .as_str()
                .cmp(&b["date_range_start"].as_str())
        });

        Ok(json!({ "schedule": schedule }))
    }
}
