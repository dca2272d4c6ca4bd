use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decision {
    pub thought: String,
    pub action: Option<String>,
    pub action_input: Option<Map<String, Value>>,
    pub final_answer: Option<String>,
}

impl Decision {
    pub fn is_final(&self) -> bool {
        self.final_answer.is_some()
    }
}
