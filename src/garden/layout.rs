use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

#[derive(Debug, Deserialize)]
struct LayoutArgs {
    planter_dimensions: PlanterDimensions,
    selected_plants: Vec<SelectedPlant>,
    #[serde(default)]
    #[allow(dead_code)]
    optimization_goal: Option<OptimizationGoal>,
}

#[derive(Debug, Deserialize)]
pub struct PlanterDimensions {
    #[serde(default)]
    pub length_inches: f64,
    #[serde(default)]
    pub width_inches: f64,
    #[serde(default)]
    pub diameter_inches: Option<f64>,
    #[serde(default = "PlanterDimensions::default_shape")]
    pub shape: PlanterShape,
}

impl PlanterDimensions {
    fn default_shape() -> PlanterShape {
        PlanterShape::Rectangular
    }

    fn area(&self) -> f64 {
        match self.shape {
            PlanterShape::Circular => {
                let diameter = self.diameter_inches.unwrap_or(self.length_inches);
                std::f64::consts::PI * (diameter / 2.0).powi(2)
            }
            PlanterShape::Rectangular => self.length_inches * self.width_inches,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanterShape {
    Rectangular,
    Circular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    MaximizeYield,
    MaximizeDiversity,
    AestheticArrangement,
}

#[derive(Debug, Deserialize)]
struct SelectedPlant {
    common_name: String,
    #[serde(default = "SelectedPlant::default_spacing")]
    spacing_inches: f64,
    #[serde(default = "SelectedPlant::default_quantity")]
    quantity: usize,
    #[serde(default)]
    notes: Option<String>,
}

impl SelectedPlant {
    fn default_spacing() -> f64 {
        12.0
    }

    fn default_quantity() -> usize {
        1
    }
}

pub struct PlanterLayoutTool {
    spec: ToolSpec,
}

impl Default for PlanterLayoutTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanterLayoutTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "calculate_planter_layout",
                "Computes spatial arrangement of plants in planter",
            )
            .with_param(
                "planter_dimensions",
                ParamSpec::required(ParamKind::Object, "Planter size and shape"),
            )
            .with_param(
                "selected_plants",
                ParamSpec::required(ParamKind::Array, "List of plants with spacing requirements"),
            )
            .with_param(
                "optimization_goal",
                ParamSpec::optional(ParamKind::String, "Layout optimization strategy")
                    .with_allowed(&[
                        "maximize_yield",
                        "maximize_diversity",
                        "aesthetic_arrangement",
                    ]),
            ),
        }
    }
}

#[async_trait]
impl Tool for PlanterLayoutTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let args: LayoutArgs = serde_json::from_value(Value::Object(args))?;
        let planter = &args.planter_dimensions;
        let area = planter.area();

        let mut layout = Vec::new();
        let mut used_area = 0.0;
        let mut warnings = Vec::new();

        for plant in &args.selected_plants {
            let spacing = plant.spacing_inches;
            let plant_area = spacing * spacing;
            let mut quantity = plant.quantity;

            if used_area + plant_area * quantity as f64 > area * 0.9 {
                warnings.push(format!(
                    "Insufficient space for all {} plants",
                    plant.common_name
                ));
                quantity = ((area * 0.9 - used_area) / plant_area).floor().max(0.0) as usize;
                if quantity < 1 {
                    continue;
                }
            }

            // Plants fill the bed row by row at their own spacing.
            let columns = ((planter.length_inches / spacing) as usize).max(1);
            let positions: Vec<Value> = (0..quantity)
                .map(|index| {
                    let x = (index % columns) as f64 * spacing + spacing / 2.0;
                    let y = (index / columns) as f64 * spacing + spacing / 2.0;
                    json!({ "x": x, "y": y })
                })
                .collect();

            layout.push(json!({
                "plant_name": plant.common_name,
                "quantity": quantity,
                "positions": positions,
                "notes": plant.notes.clone().unwrap_or_default(),
            }));

            used_area += plant_area * quantity as f64;
        }

        let utilization = if area > 0.0 {
            used_area / area * 100.0
        } else {
            0.0
        };

        if utilization > 90.0 {
            warnings.push("Planter may be overcrowded".to_string());
        }

        Ok(json!({
            "layout": layout,
            "utilization_percentage": (utilization * 100.0).round() / 100.0,
            "warnings": warnings,
        }))
    }
}
