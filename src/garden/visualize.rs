use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

const SVG_SCALE: f64 = 4.0;
const SVG_COLORS: [&str; 6] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F",
];

#[derive(Debug, Deserialize)]
struct VisualizationArgs {
    layout_data: LayoutData,
    planter_config: PlanterConfig,
    #[serde(default = "VisualizationArgs::default_format")]
    format: OutputFormat,
}

impl VisualizationArgs {
    fn default_format() -> OutputFormat {
        OutputFormat::Ascii
    }
}

#[derive(Debug, Deserialize)]
struct LayoutData {
    #[serde(default)]
    layout: Vec<LayoutEntry>,
}

#[derive(Debug, Deserialize)]
struct LayoutEntry {
    plant_name: String,
    #[serde(default)]
    positions: Vec<Position>,
}

#[derive(Debug, Deserialize)]
struct Position {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct PlanterConfig {
    #[serde(default = "PlanterConfig::default_length")]
    length_inches: f64,
    #[serde(default = "PlanterConfig::default_width")]
    width_inches: f64,
}

impl PlanterConfig {
    fn default_length() -> f64 {
        48.0
    }

    fn default_width() -> f64 {
        48.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Ascii,
}

pub struct GardenVisualizationTool {
    spec: ToolSpec,
}

impl Default for GardenVisualizationTool {
    fn default() -> Self {
        Self::new()
    }
}

impl GardenVisualizationTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "generate_garden_visualization",
                "Creates visual representation of garden layout",
            )
            .with_param(
                "layout_data",
                ParamSpec::required(ParamKind::Object, "Output from calculate_planter_layout"),
            )
            .with_param(
                "planter_config",
                ParamSpec::required(ParamKind::Object, "Planter dimensions and shape"),
            )
            .with_param(
                "format",
                ParamSpec::optional(ParamKind::String, "Output format").with_allowed(&[
                    "svg", "ascii",
                ]),
            )
            .with_param(
                "style",
                ParamSpec::optional(ParamKind::String, "Visualization style").with_allowed(&[
                    "top_down",
                    "labeled_diagram",
                ]),
            ),
        }
    }
}

fn plant_symbol(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn ascii_layout(layout: &[LayoutEntry], length: f64, width: f64) -> String {
    let grid_width = ((length / 2.0) as usize).clamp(1, 40);
    let grid_height = ((width / 2.0) as usize).clamp(1, 20);

    let mut grid = vec![vec![' '; grid_width]; grid_height];

    for (index, entry) in layout.iter().enumerate() {
        let symbol = plant_symbol(index);
        for position in &entry.positions {
            let x = (position.x / length * grid_width as f64) as usize;
            let y = (position.y / width * grid_height as f64) as usize;
            if y < grid_height && x < grid_width {
                grid[y][x] = symbol;
            }
        }
    }

    let border: String = format!("+{}+\n", "-".repeat(grid_width));
    let mut result = border.clone();
    for row in grid {
        result.push('|');
        result.extend(row);
        result.push_str("|\n");
    }
    result.push_str(&border);
    result
}

fn svg_layout(layout: &[LayoutEntry], length: f64, width: f64) -> String {
    let svg_width = length * SVG_SCALE;
    let svg_height = width * SVG_SCALE;

    let mut svg = format!(
        "<svg width=\"{svg_width}\" height=\"{svg_height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );
    svg.push_str(&format!(
        "  <rect width=\"{svg_width}\" height=\"{svg_height}\" fill=\"#8B7355\" stroke=\"black\" stroke-width=\"2\"/>\n"
    ));

    for (index, entry) in layout.iter().enumerate() {
        let color = SVG_COLORS[index % SVG_COLORS.len()];
        for position in &entry.positions {
            let x = position.x * SVG_SCALE;
            let y = position.y * SVG_SCALE;
            svg.push_str(&format!(
                "  <circle cx=\"{x}\" cy=\"{y}\" r=\"8\" fill=\"{color}\" stroke=\"black\" stroke-width=\"1\"/>\n"
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

#[async_trait]
impl Tool for GardenVisualizationTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let args: VisualizationArgs = serde_json::from_value(Value::Object(args))?;
        let layout = &args.layout_data.layout;
        let length = args.planter_config.length_inches;
        let width = args.planter_config.width_inches;

        let visualization = match args.format {
            OutputFormat::Ascii => ascii_layout(layout, length, width),
            OutputFormat::Svg => svg_layout(layout, length, width),
        };

        let legend: Map<String, Value> = layout
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                (
                    plant_symbol(index).to_string(),
                    json!(entry.plant_name.clone()),
                )
            })
            .collect();

        Ok(json!({
            "visualization": visualization,
            "legend": legend,
            "format": match args.format {
                OutputFormat::Ascii => "ascii",
                OutputFormat::Svg => "svg",
            },
        }))
    }
}
