use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("{0}")]
    Failed(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
}

impl ToolInvokeError {
    pub fn failed(message: impl Into<String>) -> Self {
        ToolInvokeError::Failed(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input for tool '{tool}': missing required parameters: {}", .missing.join(", "))]
    InvalidInput { tool: String, missing: Vec<String> },
    #[error("tool '{name}' not found. Available tools: {}", .available.join(", "))]
    NotFound { name: String, available: Vec<String> },
    #[error("error executing tool '{tool}': {source}")]
    Execution {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
}

impl ToolError {
    pub fn user_message(&self) -> String {
        match self {
            ToolError::InvalidInput { tool, missing } => {
                format!(
                    "Tool \"{tool}\" was called without required parameters: {}.",
                    missing.join(", ")
                )
            }
            ToolError::NotFound { name, .. } => {
                format!("Tool \"{name}\" is not registered.")
            }
            ToolError::Execution { tool, source } => {
                format!("Tool \"{tool}\" failed: {source}")
            }
        }
    }
}
