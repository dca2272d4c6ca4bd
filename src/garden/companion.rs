use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolInvokeError, ToolSpec};

use super::types::Relationship;

struct Interaction {
    relationship: Relationship,
    reason: &'static str,
    confidence: f64,
}

// Pairs are stored once; lookup checks both orders.
const INTERACTIONS: &[(&str, &str, Relationship, &str, f64)] = &[
    (
        "tomato",
        "basil",
        Relationship::Beneficial,
        "Basil repels aphids and improves tomato flavor",
        0.9,
    ),
    (
        "tomato",
        "marigold",
        Relationship::Beneficial,
        "Marigolds deter nematodes and whiteflies",
        0.85,
    ),
    (
        "tomato",
        "cabbage",
        Relationship::Antagonistic,
        "Both are heavy feeders and compete for nutrients",
        0.7,
    ),
    (
        "tomato",
        "fennel",
        Relationship::Antagonistic,
        "Fennel inhibits growth of most plants",
        0.95,
    ),
    (
        "basil",
        "pepper",
        Relationship::Beneficial,
        "Basil repels aphids and thrips that harm peppers",
        0.85,
    ),
    (
        "pepper",
        "fennel",
        Relationship::Antagonistic,
        "Fennel inhibits pepper growth",
        0.8,
    ),
];

fn lookup(plant_a: &str, plant_b: &str) -> Option<Interaction> {
    INTERACTIONS
        .iter()
        .find(|(a, b, ..)| {
            (*a == plant_a && *b == plant_b) || (*a == plant_b && *b == plant_a)
        })
        .map(|(_, _, relationship, reason, confidence)| Interaction {
            relationship: *relationship,
            reason,
            confidence: *confidence,
        })
}

pub struct CompanionCompatibilityTool {
    spec: ToolSpec,
}

impl Default for CompanionCompatibilityTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanionCompatibilityTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "check_companion_compatibility",
                "Validates companion planting relationships between plants",
            )
            .with_param(
                "plant_a",
                ParamSpec::required(ParamKind::String, "First plant name"),
            )
            .with_param(
                "plant_b",
                ParamSpec::required(ParamKind::String, "Second plant name"),
            ),
        }
    }
}

#[async_trait]
impl Tool for CompanionCompatibilityTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        let plant_a = args
            .get("plant_a")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let plant_b = args
            .get("plant_b")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();

        let interaction = lookup(&plant_a, &plant_b).unwrap_or(Interaction {
            relationship: Relationship::Neutral,
            reason: "No known interaction between these plants",
            confidence: 0.5,
        });

        Ok(json!({
            "relationship": interaction.relationship,
            "reason": interaction.reason,
            "confidence": interaction.confidence,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(plant_a: &str, plant_b: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("plant_a".to_string(), json!(plant_a));
        map.insert("plant_b".to_string(), json!(plant_b));
        map
    }

    #[tokio::test]
    async fn known_pair_is_beneficial() {
        let tool = CompanionCompatibilityTool::new();
        let result = tool
            .invoke(args("tomato", "basil"))
            .await
            .expect("lookup succeeds");

        assert_eq!(result["relationship"], json!("beneficial"));
        assert_eq!(result["confidence"], json!(0.9));
    }

    #[tokio::test]
    async fn lookup_is_symmetric_and_case_insensitive() {
        let tool = CompanionCompatibilityTool::new();
        let forward = tool
            .invoke(args("Tomato", "Fennel"))
            .await
            .expect("lookup succeeds");
        let reverse = tool
            .invoke(args("fennel", "tomato"))
            .await
            .expect("lookup succeeds");

        assert_eq!(forward, reverse);
        assert_eq!(forward["relationship"], json!("antagonistic"));
    }

    #[tokio::test]
    async fn unknown_pair_defaults_to_neutral() {
        let tool = CompanionCompatibilityTool::new();
        let result = tool
            .invoke(args("lettuce", "mint"))
            .await
            .expect("lookup succeeds");

        assert_eq!(result["relationship"], json!("neutral"));
        assert_eq!(result["confidence"], json!(0.5));
    }
}
