use super::*;
use crate::application::tooling::{
    FunctionTool, ParamKind, ParamSpec, ToolInvokeError, ToolRegistry, ToolSpec,
};
use crate::config::AgentConfig;
use crate::garden;
use crate::infrastructure::model::{
    ModelError, ModelProvider, ModelRequest, ModelResponse, ToolCallingProvider, ToolRunRequest,
    TraceEvent,
};
use async_trait::async_trait;
use crate::domain::types::{ChatMessage, MessageRole};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<String>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let mut responses = self.responses.lock().await;
        let response = responses.remove(0);
        let mut recordings = self.recordings.lock().await;
        recordings.push(request);
        Ok(ModelResponse {
            message: ChatMessage::new(MessageRole::Assistant, response),
        })
    }
}

struct FailingProvider;

#[async_trait]
impl ModelProvider for FailingProvider {
    async fn invoke(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        Err(ModelError::Backend("boom".into()))
    }
}

fn echo_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let spec = ToolSpec::new("echo", "Echoes its arguments back").with_param(
        "text",
        ParamSpec::required(ParamKind::String, "Text to echo"),
    );
    registry.register(Arc::new(FunctionTool::new(spec, |args| {
        Ok(Value::Object(args))
    })));
    registry
}

#[tokio::test]
async fn returns_final_answer_without_tools() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: nothing to do\nFinal Answer: done",
    ]));
    let mut agent = Agent::new(provider.clone(), "llama3", ToolRegistry::new());

    let result = agent.run("hello world").await;

    assert_eq!(result, "done");
    assert!(agent.trajectory().is_complete);
    assert_eq!(agent.trajectory().final_output.as_deref(), Some("done"));
    assert_eq!(agent.trajectory().steps().len(), 1);
    assert_eq!(agent.trajectory().steps()[0].thought, "nothing to do");
    assert!(agent.trajectory().tool_calls.is_empty());

    let records = provider.requests().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].messages[0].content.contains("hello world"));
}

#[tokio::test]
async fn tool_call_then_final_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: echo it\nAction: echo\nAction Input: {\"text\": \"hi\"}",
        "Thought: got it\nFinal Answer: done",
    ]));
    let mut agent = Agent::new(provider.clone(), "llama3", echo_registry());

    let result = agent.run("please echo hi").await;

    assert_eq!(result, "done");
    assert!(agent.trajectory().is_complete);
    assert_eq!(agent.trajectory().tool_calls.len(), 1);
    assert!(agent.trajectory().tool_calls[0].success);
    assert_eq!(agent.trajectory().tool_calls[0].tool_name, "echo");
    assert_eq!(agent.trajectory().steps().len(), 2);
    assert_eq!(agent.trajectory().steps()[0].action.as_deref(), Some("echo"));
    assert_eq!(
        agent.trajectory().steps()[0].observation.as_deref(),
        Some("{\n  \"text\": \"hi\"\n}")
    );

    // The second planning prompt replays the first step.
    let records = provider.requests().await;
    assert_eq!(records.len(), 2);
    assert!(records[1].messages[0].content.contains("Previous Steps:"));
    assert!(records[1].messages[0].content.contains("Action: echo"));
}

#[tokio::test]
async fn thought_only_turn_costs_a_step_without_tool_call() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: still thinking",
        "Final Answer: ok",
    ]));
    let mut agent = Agent::new(provider, "llama3", echo_registry());

    let result = agent.run("ponder").await;

    assert_eq!(result, "ok");
    assert_eq!(agent.trajectory().steps().len(), 2);
    assert!(agent.trajectory().tool_calls.is_empty());
    assert!(agent.trajectory().steps()[0].action.is_none());
}

#[tokio::test]
async fn missing_tool_exhausts_step_budget() {
    let response = "Thought: try it\nAction: nonexistent_tool\nAction Input: {}";
    let provider = Arc::new(ScriptedProvider::new(vec![response; 5]));
    let config = AgentConfig {
        max_steps: 3,
        ..AgentConfig::default()
    };
    let mut agent = Agent::new(provider, "llama3", echo_registry()).with_config(config);

    let result = agent.run("test").await;

    assert!(result.contains("maximum steps"));
    assert!(agent.trajectory().error.is_some());
    assert!(agent.trajectory().is_complete);
    assert_eq!(agent.trajectory().tool_calls.len(), 3);
    assert!(agent.trajectory().tool_calls.iter().all(|call| !call.success));
    let error = agent.trajectory().tool_calls[0]
        .error
        .as_deref()
        .expect("error recorded");
    assert!(error.contains("not found"));
    assert!(error.contains("echo"));
}

#[tokio::test]
async fn stop_on_error_halts_after_first_failed_call() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: try it\nAction: nonexistent_tool\nAction Input: {}",
        "Final Answer: never reached",
    ]));
    let config = AgentConfig {
        stop_on_error: true,
        ..AgentConfig::default()
    };
    let mut agent = Agent::new(provider, "llama3", echo_registry()).with_config(config);

    let result = agent.run("test").await;

    assert!(result.starts_with("Stopped due to error:"));
    assert_eq!(agent.trajectory().tool_calls.len(), 1);
    assert!(!agent.trajectory().tool_calls[0].success);
    assert!(agent.trajectory().error.is_some());
    // The failed step is still recorded with its error observation.
    assert_eq!(agent.trajectory().steps().len(), 1);
    assert!(
        agent.trajectory().steps()[0]
            .observation
            .as_deref()
            .expect("observation present")
            .starts_with("Error:")
    );
}

#[tokio::test]
async fn missing_required_parameter_fails_without_invoking() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: call with nothing\nAction: echo\nAction Input: {}",
        "Final Answer: recovered",
    ]));
    let mut agent = Agent::new(provider, "llama3", echo_registry());

    let result = agent.run("test").await;

    assert_eq!(result, "recovered");
    assert_eq!(agent.trajectory().tool_calls.len(), 1);
    assert!(!agent.trajectory().tool_calls[0].success);
    assert!(
        agent.trajectory().tool_calls[0]
            .error
            .as_deref()
            .expect("error recorded")
            .contains("missing required parameters: text")
    );
}

#[tokio::test]
async fn tool_failure_becomes_observation_and_run_continues() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FunctionTool::new(
        ToolSpec::new("broken", "Always fails"),
        |_| Err(ToolInvokeError::failed("disk on fire")),
    )));
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: poke it\nAction: broken\nAction Input: {}",
        "Thought: that failed, give up\nFinal Answer: could not complete",
    ]));
    let mut agent = Agent::new(provider, "llama3", registry);

    let result = agent.run("test").await;

    assert_eq!(result, "could not complete");
    assert!(agent.trajectory().error.is_none());
    let observation = agent.trajectory().steps()[0]
        .observation
        .as_deref()
        .expect("observation present");
    assert!(observation.contains("Error:"));
    assert!(observation.contains("disk on fire"));
}

#[tokio::test]
async fn backend_failure_terminates_run_without_panicking() {
    let mut agent = Agent::new(Arc::new(FailingProvider), "llama3", ToolRegistry::new());

    let result = agent.run("test").await;

    assert!(result.starts_with("Model backend error:"));
    assert!(result.contains("boom"));
    assert_eq!(agent.trajectory().error.as_deref(), Some(result.as_str()));
    assert!(agent.trajectory().is_complete);
}

#[tokio::test]
async fn run_resets_trajectory_between_invocations() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Final Answer: first",
        "Final Answer: second",
    ]));
    let mut agent = Agent::new(provider, "llama3", ToolRegistry::new());

    let first = agent.run("one").await;
    let first_run_id = agent.trajectory().metadata["run_id"].clone();
    let second = agent.run("two").await;

    assert_eq!(first, "first");
    assert_eq!(second, "second");
    assert_eq!(agent.trajectory().steps().len(), 1);
    assert_eq!(agent.trajectory().messages.len(), 1);
    assert_eq!(agent.trajectory().messages[0].content, "two");
    assert_ne!(agent.trajectory().metadata["run_id"], first_run_id);
}

#[tokio::test]
async fn garden_tools_drive_a_full_run() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Thought: I need to get climate data for the zipcode\n\
         Action: get_climate_data\n\
         Action Input: {\"zipcode\": \"94102\"}",
        "Thought: I have the climate data\nFinal Answer: Zone 10a, frost-free climate",
    ]));
    let mut agent = Agent::new(provider, "llama3", garden::registry());

    let result = agent.run("What is the climate for zipcode 94102?").await;

    assert!(result.contains("Zone 10a"));
    assert_eq!(agent.trajectory().tool_calls.len(), 1);
    assert!(agent.trajectory().tool_calls[0].success);
    let output = agent.trajectory().tool_calls[0]
        .output
        .as_ref()
        .expect("tool output recorded");
    assert_eq!(output["hardiness_zone"], json!("10a"));
}

#[derive(Clone)]
struct ScriptedExecutor {
    result: Result<Vec<TraceEvent>, String>,
}

#[async_trait]
impl ToolCallingProvider for ScriptedExecutor {
    async fn run_with_tools(
        &self,
        _request: ToolRunRequest,
    ) -> Result<Vec<TraceEvent>, ModelError> {
        self.result.clone().map_err(ModelError::Backend)
    }
}

#[tokio::test]
async fn native_strategy_translates_trace_into_steps() {
    let mut arguments = serde_json::Map::new();
    arguments.insert("zipcode".to_string(), json!("94102"));
    let executor = Arc::new(ScriptedExecutor {
        result: Ok(vec![
            TraceEvent::ToolCall {
                name: "get_climate_data".to_string(),
                arguments,
            },
            TraceEvent::Assistant {
                content: "Zone 10a, plant year-round".to_string(),
            },
        ]),
    });
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let mut agent = Agent::new(provider, "llama3", garden::registry())
        .with_strategy(PlanningStrategy::NativeToolCalling(executor));

    let result = agent.run("climate for 94102?").await;

    assert_eq!(result, "Zone 10a, plant year-round");
    assert!(agent.trajectory().is_complete);
    assert_eq!(agent.trajectory().steps().len(), 1);
    assert_eq!(
        agent.trajectory().steps()[0].action.as_deref(),
        Some("get_climate_data")
    );
}

#[tokio::test]
async fn native_strategy_failure_marks_run_errored() {
    let executor = Arc::new(ScriptedExecutor {
        result: Err("executor crashed".to_string()),
    });
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let mut agent = Agent::new(provider, "llama3", ToolRegistry::new())
        .with_strategy(PlanningStrategy::NativeToolCalling(executor));

    let result = agent.run("test").await;

    assert!(result.starts_with("Agent execution error:"));
    assert!(result.contains("executor crashed"));
    assert!(agent.trajectory().error.is_some());
}
