use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_MAX_STEPS: usize = 15;
const DEFAULT_RETRY_COUNT: u32 = 3;
const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

pub const CONFIG_PATH: &str = DEFAULT_CONFIG_PATH;

fn default_stop_sequences() -> Vec<String> {
    vec!["Final Answer:".to_string(), "FINAL ANSWER:".to_string()]
}

/// Loop policy knobs. `retry_count` is advisory for tool implementations (the
/// loop itself never retries), and `stop_sequences` are prompt markers, never
/// sent to the backend as generation stops.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_steps: usize,
    pub stop_on_error: bool,
    pub retry_count: u32,
    pub stop_sequences: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            stop_on_error: false,
            retry_count: DEFAULT_RETRY_COUNT,
            stop_sequences: default_stop_sequences(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub system_prompt: Option<String>,
    pub agent: AgentConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    system_prompt: Option<String>,
    #[serde(default)]
    agent: RawAgent,
}

#[derive(Debug, Deserialize, Default)]
struct RawAgent {
    max_steps: Option<usize>,
    stop_on_error: Option<bool>,
    retry_count: Option<u32>,
    stop_sequences: Option<Vec<String>>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }

    pub fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            agent: AgentConfig::default(),
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let defaults = AgentConfig::default();
    Ok(AppConfig {
        model: parsed.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        system_prompt: parsed.system_prompt,
        agent: AgentConfig {
            max_steps: parsed.agent.max_steps.unwrap_or(defaults.max_steps),
            stop_on_error: parsed.agent.stop_on_error.unwrap_or(defaults.stop_on_error),
            retry_count: parsed.agent.retry_count.unwrap_or(defaults.retry_count),
            stop_sequences: parsed
                .agent
                .stop_sequences
                .unwrap_or_else(default_stop_sequences),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        let err = AppConfig::load(Some(&path)).expect_err("missing explicit path fails");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.system_prompt.is_none());
        assert_eq!(config.agent.max_steps, 15);
        assert!(!config.agent.stop_on_error);
        assert_eq!(config.agent.retry_count, 3);
        assert_eq!(
            config.agent.stop_sequences,
            vec!["Final Answer:".to_string(), "FINAL ANSWER:".to_string()]
        );
    }

    #[test]
    fn reads_model_and_system_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        let mut file = File::create(&path).expect("create config");
        writeln!(
            file,
            r#"
model = "mistral"
system_prompt = "keep short"
"#
        )
        .expect("write");

        let config = AppConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.system_prompt.as_deref(), Some("keep short"));
        assert_eq!(config.agent.max_steps, 15);
    }

    #[test]
    fn reads_agent_section_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            r#"
model = "mistral"

[agent]
max_steps = 5
stop_on_error = true
retry_count = 1
stop_sequences = ["Final Answer:"]
"#,
        )
        .expect("write agent config");

        let config = AppConfig::load(Some(&path)).expect("load");
        assert_eq!(config.agent.max_steps, 5);
        assert!(config.agent.stop_on_error);
        assert_eq!(config.agent.retry_count, 1);
        assert_eq!(
            config.agent.stop_sequences,
            vec!["Final Answer:".to_string()]
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(&path, "model = [not toml").expect("write");

        let err = AppConfig::load(Some(&path)).expect_err("parse fails");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
