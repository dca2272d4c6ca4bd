use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::MessageRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub thought: String,
    pub action: Option<String>,
    pub action_input: Option<Value>,
    pub observation: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Step {
    pub fn new(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: None,
            action_input: None,
            observation: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>, input: Value) -> Self {
        self.action = Some(action.into());
        self.action_input = Some(input);
        self
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub input: Value,
    pub output: Option<Value>,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub steps: Vec<Step>,
    pub messages: Vec<Message>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub final_output: Option<String>,
    pub metadata: Map<String, Value>,
    pub is_complete: bool,
    pub error: Option<String>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn record_tool_call(
        &mut self,
        tool_name: impl Into<String>,
        input: Value,
        output: Option<Value>,
        success: bool,
        error: Option<String>,
    ) {
        self.tool_calls.push(ToolCallRecord {
            tool_name: tool_name.into(),
            input,
            output,
            success,
            error,
            timestamp: Utc::now(),
        });
    }

    pub fn set_final_output(&mut self, output: impl Into<String>) {
        self.final_output = Some(output.into());
        self.is_complete = true;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.is_complete = true;
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
