use serde::{Deserialize, Serialize};
use serde_json::Map;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use super::agent::{Message, Step, ToolCallRecord, Trajectory};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord {
    pub input: String,
    pub final_output: String,
    pub steps: Vec<Step>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub messages: Vec<Message>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to access trajectory file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize trajectories: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Default)]
pub struct TrajectoryRecorder {
    records: Vec<TrajectoryRecord>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        input: impl Into<String>,
        trajectory: &Trajectory,
        final_output: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> &TrajectoryRecord {
        self.records.push(TrajectoryRecord {
            input: input.into(),
            final_output: final_output.into(),
            steps: trajectory.steps.clone(),
            tool_calls: trajectory.tool_calls.clone(),
            messages: trajectory.messages.clone(),
            metadata,
        });
        self.records.last().expect("record just pushed")
    }

    pub fn all(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), RecorderError> {
        let serialized = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), RecorderError> {
        let content = fs::read_to_string(path)?;
        self.records = serde_json::from_str(&content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub input: String,
    pub final_output: String,
    pub scores: BTreeMap<String, f64>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub overall_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub results: Vec<EvaluationReport>,
    pub aggregate_scores: BTreeMap<String, ScoreSummary>,
    pub total_evaluations: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Expectation {
    pub expected_output: Option<String>,
    pub expected_actions: Option<Vec<String>>,
}

type Evaluator = Box<dyn Fn(&TrajectoryRecord) -> f64 + Send + Sync>;

/// Weighted-checklist scoring over recorded trajectories. Built-in checks
/// cover output overlap, expected-action coverage, step coherence, tool-call
/// success rate, and hallucinated tool names; callers can register extra
/// named evaluators.
#[derive(Default)]
pub struct TrajectoryEvaluator {
    evaluators: Vec<(String, Evaluator)>,
}

impl TrajectoryEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_evaluator(
        &mut self,
        name: impl Into<String>,
        evaluator: impl Fn(&TrajectoryRecord) -> f64 + Send + Sync + 'static,
    ) {
        self.evaluators.push((name.into(), Box::new(evaluator)));
    }

    pub fn evaluate(&self, record: &TrajectoryRecord, expectation: &Expectation) -> EvaluationReport {
        let mut scores = BTreeMap::new();
        let mut errors = Vec::new();
        let warnings = Vec::new();

        if let Some(expected) = &expectation.expected_output {
            scores.insert(
                "final_correctness".to_string(),
                output_overlap(&record.final_output, expected),
            );
        }

        if let Some(expected_actions) = &expectation.expected_actions {
            scores.insert(
                "trajectory_correctness".to_string(),
                action_coverage(&record.steps, expected_actions),
            );
        }

        scores.insert("coherence".to_string(), coherence(&record.steps));
        scores.insert(
            "tool_usage_accuracy".to_string(),
            tool_usage(&record.tool_calls),
        );

        let hallucination = hallucination_check(record);
        scores.insert("hallucination_free".to_string(), hallucination.score);
        errors.extend(hallucination.issues);

        for (name, evaluator) in &self.evaluators {
            scores.insert(name.clone(), evaluator(record));
        }

        let overall_score = if scores.is_empty() {
            0.0
        } else {
            scores.values().sum::<f64>() / scores.len() as f64
        };

        EvaluationReport {
            input: record.input.clone(),
            final_output: record.final_output.clone(),
            scores,
            errors,
            warnings,
            overall_score,
        }
    }

    pub fn evaluate_dataset(
        &self,
        records: &[TrajectoryRecord],
        expectations: &[Expectation],
    ) -> DatasetSummary {
        if records.len() != expectations.len() {
            warn!(
                records = records.len(),
                expectations = expectations.len(),
                "Dataset size mismatch; evaluating the overlapping prefix"
            );
        }

        let results: Vec<_> = records
            .iter()
            .zip(expectations.iter())
            .map(|(record, expectation)| self.evaluate(record, expectation))
            .collect();

        let mut aggregate: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for report in &results {
            for (name, score) in &report.scores {
                aggregate.entry(name.clone()).or_default().push(*score);
            }
        }

        let aggregate_scores = aggregate
            .into_iter()
            .map(|(name, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (name, ScoreSummary { mean, min, max })
            })
            .collect();

        DatasetSummary {
            total_evaluations: results.len(),
            results,
            aggregate_scores,
        }
    }
}

fn output_overlap(actual: &str, expected: &str) -> f64 {
    if actual.trim().eq_ignore_ascii_case(expected.trim()) {
        return 1.0;
    }

    let actual_words: std::collections::HashSet<String> = actual
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    let expected_words: std::collections::HashSet<String> = expected
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();

    if expected_words.is_empty() {
        return 0.0;
    }

    let overlap = actual_words.intersection(&expected_words).count();
    overlap as f64 / expected_words.len() as f64
}

fn action_coverage(steps: &[Step], expected_actions: &[String]) -> f64 {
    if expected_actions.is_empty() {
        return 1.0;
    }

    let matches = expected_actions
        .iter()
        .filter(|expected| {
            steps
                .iter()
                .any(|step| step.action.as_deref() == Some(expected.as_str()))
        })
        .count();

    matches as f64 / expected_actions.len() as f64
}

fn coherence(steps: &[Step]) -> f64 {
    if steps.is_empty() {
        return 0.0;
    }

    let mut score: f64 = 1.0;
    for step in steps {
        if step.thought.is_empty() {
            score -= 0.1;
        }
        if step.action.is_some() && step.action_input.is_none() {
            score -= 0.1;
        }
        if step.action.is_some() && step.observation.is_none() {
            score -= 0.05;
        }
    }

    score.clamp(0.0, 1.0)
}

fn tool_usage(tool_calls: &[ToolCallRecord]) -> f64 {
    if tool_calls.is_empty() {
        return 1.0;
    }

    let successful = tool_calls.iter().filter(|call| call.success).count();
    successful as f64 / tool_calls.len() as f64
}

struct HallucinationCheck {
    score: f64,
    issues: Vec<String>,
}

fn hallucination_check(record: &TrajectoryRecord) -> HallucinationCheck {
    let mut issues = Vec::new();

    for call in &record.tool_calls {
        if !call.success {
            let error = call.error.as_deref().unwrap_or_default();
            if error.to_lowercase().contains("not found") {
                issues.push(format!("Hallucinated tool: {}", call.tool_name));
            }
        }
    }

    for step in &record.steps {
        if let Some(action) = &step.action {
            let executed = record
                .tool_calls
                .iter()
                .any(|call| call.tool_name == *action);
            if !executed {
                issues.push(format!("Action '{action}' not executed properly"));
            }
        }
    }

    let score = (1.0 - issues.len() as f64 * 0.2).clamp(0.0, 1.0);
    HallucinationCheck { score, issues }
}
