use crate::application::tooling::ToolSpec;

use super::trajectory::Trajectory;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant that uses tools to solve problems.
You follow the ReAct (Reasoning + Acting) framework to think through problems step by step.

Always structure your responses as follows:
Thought: [Your reasoning about what to do next]
Action: [The tool to use]
Action Input: [The input to the tool in JSON format]
Observation: [The result will be provided here]
... (repeat Thought/Action/Observation as needed)
Thought: I now know the final answer
Final Answer: [Your final response to the user]";

pub const DEFAULT_REACT_FORMAT: &str = "\
Follow this format:

Thought: Your reasoning about the current situation and what action to take
Action: The name of the tool to use (must be one of the available tools)
Action Input: The input for the tool as a JSON object
Observation: [This will be filled in with the tool result]

Repeat the Thought/Action/Observation cycle as many times as needed.

When you have enough information to answer the user's question, provide:
Thought: I now have all the information needed to provide a final answer
Final Answer: [Your complete answer to the user]";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    react_format: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            react_format: DEFAULT_REACT_FORMAT.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_react_format(mut self, react_format: impl Into<String>) -> Self {
        self.react_format = react_format.into();
        self
    }

    pub fn build_prompt(
        &self,
        user_input: &str,
        tools: &[ToolSpec],
        trajectory: &Trajectory,
    ) -> String {
        let mut parts = vec![self.system_prompt.clone()];

        if !tools.is_empty() {
            parts.push("\nAvailable Tools:".to_string());
            for tool in tools {
                let schema =
                    serde_json::to_string(&tool.parameters).unwrap_or_else(|_| "{}".to_string());
                parts.push(format!(
                    "\n- {}: {}\n  Parameters: {}",
                    tool.name, tool.description, schema
                ));
            }
        }

        parts.push(self.react_format.clone());

        if !trajectory.steps.is_empty() {
            parts.push("\nPrevious Steps:".to_string());
            for (index, step) in trajectory.steps.iter().enumerate() {
                parts.push(format!("\nStep {}:", index + 1));
                parts.push(format!("Thought: {}", step.thought));
                if let Some(action) = &step.action {
                    parts.push(format!("Action: {action}"));
                }
                if let Some(input) = &step.action_input {
                    parts.push(format!("Action Input: {input}"));
                }
                if let Some(observation) = &step.observation {
                    parts.push(format!("Observation: {observation}"));
                }
            }
        }

        parts.push(format!("\nUser Input: {user_input}"));
        parts.push(
            "\nNow provide your next Thought, Action, and Action Input (or Final Answer if ready):"
                .to_string(),
        );

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agent::trajectory::Step;
    use crate::application::tooling::{ParamKind, ParamSpec};
    use serde_json::json;

    fn climate_spec() -> ToolSpec {
        ToolSpec::new(
            "get_climate_data",
            "Retrieves USDA hardiness zone and frost dates for a zipcode",
        )
        .with_param(
            "zipcode",
            ParamSpec::required(ParamKind::String, "5-digit US postal code"),
        )
    }

    #[test]
    fn includes_system_prompt_and_user_input() {
        let builder = PromptBuilder::new();
        let prompt = builder.build_prompt("Plan my garden", &[], &Trajectory::new());

        assert!(prompt.contains("ReAct"));
        assert!(prompt.contains("User Input: Plan my garden"));
        assert!(prompt.ends_with("(or Final Answer if ready):"));
    }

    #[test]
    fn renders_tool_catalog_with_schema() {
        let builder = PromptBuilder::new();
        let prompt = builder.build_prompt("hi", &[climate_spec()], &Trajectory::new());

        assert!(prompt.contains("Available Tools:"));
        assert!(prompt.contains("- get_climate_data: Retrieves USDA hardiness zone"));
        assert!(prompt.contains("\"zipcode\""));
        assert!(prompt.contains("\"required\":true"));
    }

    #[test]
    fn omits_tool_section_when_registry_is_empty() {
        let builder = PromptBuilder::new();
        let prompt = builder.build_prompt("hi", &[], &Trajectory::new());
        assert!(!prompt.contains("Available Tools:"));
    }

    #[test]
    fn replays_previous_steps_in_order() {
        let mut trajectory = Trajectory::new();
        trajectory.add_step(
            Step::new("look up climate")
                .with_action("get_climate_data", json!({"zipcode": "10001"}))
                .with_observation("zone 7b"),
        );
        trajectory.add_step(Step::new("now pick plants"));

        let builder = PromptBuilder::new();
        let prompt = builder.build_prompt("continue", &[], &trajectory);

        assert!(prompt.contains("Previous Steps:"));
        assert!(prompt.contains("Step 1:"));
        assert!(prompt.contains("Thought: look up climate"));
        assert!(prompt.contains("Action: get_climate_data"));
        assert!(prompt.contains("Observation: zone 7b"));
        assert!(prompt.contains("Step 2:"));
        assert!(prompt.contains("Thought: now pick plants"));
        let step1 = prompt.find("Step 1:").expect("step 1 present");
        let step2 = prompt.find("Step 2:").expect("step 2 present");
        assert!(step1 < step2);
    }

    #[test]
    fn custom_system_prompt_replaces_default() {
        let builder = PromptBuilder::new().with_system_prompt("You plan gardens.");
        let prompt = builder.build_prompt("hi", &[], &Trajectory::new());
        assert!(prompt.starts_with("You plan gardens."));
        assert!(!prompt.contains("helpful AI assistant"));
    }
}
