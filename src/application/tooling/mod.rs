mod error;
mod interface;
mod registry;

pub use error::{ToolError, ToolInvokeError};
pub use interface::{FunctionTool, ParamKind, ParamSpec, Tool, ToolSpec};
pub use registry::ToolRegistry;
