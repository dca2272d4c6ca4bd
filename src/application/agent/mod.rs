mod decision;
mod parser;
mod prompt;
mod runner;
mod trajectory;

#[cfg(test)]
mod tests;

pub use decision::Decision;
pub use parser::parse_response;
pub use prompt::{DEFAULT_REACT_FORMAT, DEFAULT_SYSTEM_PROMPT, PromptBuilder};
pub use runner::{Agent, PlanningStrategy};
pub use trajectory::{Message, Step, ToolCallRecord, Trajectory};
