use serde_json::{Map, Value, json};

use super::decision::Decision;

const THOUGHT: &str = "Thought:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";
const FINAL_ANSWER: &str = "Final Answer:";

// Keyword prefixes that end each multi-line capture.
const THOUGHT_TERMINATORS: [&str; 2] = [ACTION, FINAL_ANSWER];
const INPUT_TERMINATORS: [&str; 3] = [THOUGHT, OBSERVATION, FINAL_ANSWER];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Thought,
    ActionInput,
    FinalAnswer,
}

/// Lenient line-oriented scan of one model reply. Never fails: unparseable
/// input degrades to an empty decision rather than an error.
pub fn parse_response(response: &str) -> Decision {
    let mut state = ScanState::Scanning;
    let mut thought = String::new();
    let mut action = None;
    let mut input_text = String::new();
    let mut has_input = false;
    let mut final_answer = String::new();
    let mut has_final = false;

    for raw_line in response.trim().lines() {
        let line = raw_line.trim();

        // Capture states absorb lines until one of their terminators shows up.
        match state {
            ScanState::FinalAnswer => {
                final_answer.push(' ');
                final_answer.push_str(line);
                continue;
            }
            ScanState::Thought if !starts_with_any(line, &THOUGHT_TERMINATORS) => {
                thought.push(' ');
                thought.push_str(line);
                continue;
            }
            ScanState::ActionInput if !starts_with_any(line, &INPUT_TERMINATORS) => {
                input_text.push(' ');
                input_text.push_str(line);
                continue;
            }
            _ => state = ScanState::Scanning,
        }

        if let Some(rest) = line.strip_prefix(THOUGHT) {
            thought = rest.trim().to_string();
            state = ScanState::Thought;
        } else if let Some(rest) = line.strip_prefix(ACTION_INPUT) {
            input_text = rest.trim().to_string();
            has_input = true;
            state = ScanState::ActionInput;
        } else if let Some(rest) = line.strip_prefix(ACTION) {
            action = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(FINAL_ANSWER) {
            final_answer = rest.trim().to_string();
            has_final = true;
            state = ScanState::FinalAnswer;
        }
        // Anything else (including a bare "Observation:") is skipped.
    }

    Decision {
        thought,
        action,
        action_input: has_input.then(|| decode_action_input(&input_text)),
        final_answer: has_final.then_some(final_answer),
    }
}

// The captured text is expected to be a JSON object. Valid JSON of any other
// shape, or text that fails to decode at all, is wrapped so the caller always
// receives a key-value map.
fn decode_action_input(text: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("raw_input".to_string(), json!(text));
            map
        }
    }
}

fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| line.starts_with(prefix))
}
