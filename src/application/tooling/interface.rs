use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::error::ToolInvokeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParamSpec {
    pub fn required(kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            required: true,
            allowed: None,
        }
    }

    pub fn optional(kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            required: false,
            allowed: None,
        }
    }

    pub fn with_allowed(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|value| value.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    pub fn missing_required(&self, args: &Map<String, Value>) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|(name, spec)| spec.required && !args.contains_key(*name))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn validate_input(&self, args: &Map<String, Value>) -> bool {
        self.missing_required(args).is_empty()
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError>;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn description(&self) -> &str {
        &self.spec().description
    }
}

pub struct FunctionTool<F>
where
    F: Fn(Map<String, Value>) -> Result<Value, ToolInvokeError> + Send + Sync,
{
    spec: ToolSpec,
    func: F,
}

impl<F> FunctionTool<F>
where
    F: Fn(Map<String, Value>) -> Result<Value, ToolInvokeError> + Send + Sync,
{
    pub fn new(spec: ToolSpec, func: F) -> Self {
        Self { spec, func }
    }
}

#[async_trait]
impl<F> Tool for FunctionTool<F>
where
    F: Fn(Map<String, Value>) -> Result<Value, ToolInvokeError> + Send + Sync,
{
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, ToolInvokeError> {
        (self.func)(args)
    }
}
