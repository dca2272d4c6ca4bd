use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::ToolError;
use super::interface::{Tool, ToolSpec};

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn unregister(&mut self, name: &str) {
        if self.tools.remove(name).is_some() {
            self.order.retain(|entry| entry != name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn list_all(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn clear(&mut self) {
        self.tools.clear();
        self.order.clear();
    }

    pub async fn execute(&self, name: &str, args: Map<String, Value>) -> Result<Value, ToolError> {
        let Some(tool) = self.get(name) else {
            warn!(requested_tool = %name, "Unknown tool requested");
            return Err(ToolError::NotFound {
                name: name.to_string(),
                available: self.names(),
            });
        };

        let missing = tool.spec().missing_required(&args);
        if !missing.is_empty() {
            warn!(tool = %name, missing = ?missing, "Tool invoked without required parameters");
            return Err(ToolError::InvalidInput {
                tool: name.to_string(),
                missing,
            });
        }

        debug!(tool = %name, "Dispatching tool");
        tool.invoke(args).await.map_err(|source| ToolError::Execution {
            tool: name.to_string(),
            source,
        })
    }
}
