use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::tooling::ToolRegistry;
use crate::config::AgentConfig;
use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::model::{
    ModelError, ModelProvider, ModelRequest, ToolCallingProvider, ToolRunRequest, TraceEvent,
};

use super::decision::Decision;
use super::parser;
use super::prompt::PromptBuilder;
use super::trajectory::{Step, Trajectory};

/// How a run plans and acts: parse free-text ReAct replies ourselves, or
/// hand the whole cycle to a backend with native tool calling. Chosen at
/// construction, never switched mid-run.
#[derive(Clone)]
pub enum PlanningStrategy {
    TextReact,
    NativeToolCalling(Arc<dyn ToolCallingProvider>),
}

pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    model: String,
    registry: ToolRegistry,
    prompts: PromptBuilder,
    config: AgentConfig,
    strategy: PlanningStrategy,
    trajectory: Trajectory,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, model: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            model: model.into(),
            registry,
            prompts: PromptBuilder::default(),
            config: AgentConfig::default(),
            strategy: PlanningStrategy::TextReact,
            trajectory: Trajectory::new(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_strategy(mut self, strategy: PlanningStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Drives one full run. Always returns a string: the final answer on
    /// success, otherwise a human-readable failure description that is also
    /// recorded in `trajectory().error`.
    pub async fn run(&mut self, input: &str) -> String {
        info!("Agent run started");
        self.trajectory = Trajectory::new();
        self.trajectory
            .metadata
            .insert("run_id".to_string(), json!(Uuid::new_v4().to_string()));
        self.trajectory.add_message(MessageRole::User, input);

        let native_executor = match &self.strategy {
            PlanningStrategy::NativeToolCalling(executor) => Some(executor.clone()),
            PlanningStrategy::TextReact => None,
        };
        if let Some(executor) = native_executor {
            return self.run_native(executor, input).await;
        }

        let mut current_step = 0;
        while current_step < self.config.max_steps {
            current_step += 1;
            debug!(step = current_step, "Planning next agent action");

            let decision = match self.plan(input).await {
                Ok(decision) => decision,
                Err(err) => {
                    let message = format!("Model backend error: {err}");
                    warn!(error = %err, "Model backend failed during planning");
                    self.trajectory.set_error(message.clone());
                    return message;
                }
            };

            if let Some(final_answer) = decision.final_answer {
                self.trajectory.add_step(Step::new(decision.thought));
                self.trajectory.set_final_output(final_answer.clone());
                info!("Agent produced final answer");
                return final_answer;
            }

            let Some(action) = decision.action else {
                // Thinking-only turn: costs a step, no tool call.
                self.trajectory.add_step(Step::new(decision.thought));
                continue;
            };

            let args = decision.action_input.unwrap_or_default();
            let result = self.act(&action, args.clone()).await;
            let observation = render_observation(&result);

            self.trajectory.add_step(
                Step::new(decision.thought)
                    .with_action(action.clone(), Value::Object(args))
                    .with_observation(observation),
            );

            if let Some(error_text) = error_text(&result) {
                if self.config.stop_on_error {
                    let message = format!("Stopped due to error: {error_text}");
                    warn!(tool = %action, "Stopping run on tool error");
                    self.trajectory.set_error(message.clone());
                    return message;
                }
            }
        }

        let message = format!(
            "Reached maximum steps ({}) without finding final answer",
            self.config.max_steps
        );
        warn!(max_steps = self.config.max_steps, "Agent exhausted step budget");
        self.trajectory.set_error(message.clone());
        message
    }

    async fn plan(&self, input: &str) -> Result<Decision, ModelError> {
        let prompt = self
            .prompts
            .build_prompt(input, &self.registry.list_all(), &self.trajectory);
        // The configured stop markers shape the prompt text, not generation:
        // sending "Final Answer:" as a stop token would cut replies off right
        // before the answer the parser is looking for.
        let request = ModelRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::new(MessageRole::User, prompt)],
            stop: Vec::new(),
        };
        let response = self.provider.invoke(request).await?;
        Ok(parser::parse_response(&response.message.content))
    }

    // Dispatches one tool call. Failures never escape: they come back as an
    // `{"error": ...}` payload after being logged as a failed ToolCallRecord.
    async fn act(&mut self, action: &str, args: Map<String, Value>) -> Value {
        info!(tool = %action, "Agent requested tool execution");
        match self.registry.execute(action, args.clone()).await {
            Ok(output) => {
                self.trajectory.record_tool_call(
                    action,
                    Value::Object(args),
                    Some(output.clone()),
                    true,
                    None,
                );
                output
            }
            Err(err) => {
                let message = err.to_string();
                warn!(tool = %action, error = %message, "Tool execution failed");
                self.trajectory.record_tool_call(
                    action,
                    Value::Object(args),
                    None,
                    false,
                    Some(message.clone()),
                );
                json!({ "error": message })
            }
        }
    }

    async fn run_native(&mut self, executor: Arc<dyn ToolCallingProvider>, input: &str) -> String {
        info!("Delegating run to native tool-calling executor");
        let request = ToolRunRequest {
            input: input.to_string(),
            tools: self.registry.list_all(),
            system_prompt: None,
        };

        match executor.run_with_tools(request).await {
            Ok(trace) => {
                let mut final_text = None;
                for event in trace {
                    match event {
                        TraceEvent::ToolCall { name, arguments } => {
                            self.trajectory.add_step(
                                Step::new("")
                                    .with_action(name, Value::Object(arguments))
                                    .with_observation(""),
                            );
                        }
                        TraceEvent::Assistant { content } => final_text = Some(content),
                    }
                }
                match final_text {
                    Some(content) => {
                        self.trajectory.set_final_output(content.clone());
                        info!("Native executor produced final answer");
                        content
                    }
                    None => {
                        let message =
                            "Agent execution error: native executor returned no final message"
                                .to_string();
                        warn!("Native executor trace had no assistant message");
                        self.trajectory.set_error(message.clone());
                        message
                    }
                }
            }
            Err(err) => {
                let message = format!("Agent execution error: {err}");
                warn!(error = %err, "Native executor failed");
                self.trajectory.set_error(message.clone());
                message
            }
        }
    }
}

fn render_observation(result: &Value) -> String {
    if let Some(error_text) = error_text(result) {
        return format!("Error: {error_text}");
    }
    match result {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn error_text(result: &Value) -> Option<String> {
    let error = result.as_object()?.get("error")?;
    Some(match error {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}
