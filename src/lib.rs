pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod garden;
pub mod infrastructure;

pub use application::{agent, evaluation, tooling};
pub use cli::Cli;
pub use config::{AgentConfig, AppConfig};
pub use domain::types;
pub use infrastructure::model;

use agent::{Agent, PromptBuilder};
use model::OllamaClient;
use serde_json::json;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting trellis");
    debug!(config = ?cli.config, system = ?cli.system, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let file_config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration using default path or defaults");
    }

    let mut agent_config = file_config.agent.clone();
    if let Some(max_steps) = cli.max_steps {
        agent_config.max_steps = max_steps;
    }
    if cli.stop_on_error {
        agent_config.stop_on_error = true;
    }

    let mut prompts = PromptBuilder::default();
    if let Some(system_prompt) = cli.system.clone().or(file_config.system_prompt.clone()) {
        prompts = prompts.with_system_prompt(system_prompt);
    }

    debug!(ollama_url = %cli.ollama_url, "Creating Ollama provider");
    let provider = Arc::new(OllamaClient::new(cli.ollama_url.clone()));
    let mut agent = Agent::new(provider, file_config.model.clone(), garden::registry())
        .with_config(agent_config)
        .with_prompts(prompts);

    let prompt = load_prompt(&cli)?;
    info!("Executing agent run");
    let response = agent.run(&prompt).await;

    let trajectory = agent.trajectory();
    if let Some(path) = &cli.trajectory_out {
        fs::write(path, trajectory.to_json()?)?;
        info!(path = %path, "Saved trajectory");
    }

    let output = json!({
        "response": response,
        "is_complete": trajectory.is_complete,
        "error": trajectory.error,
        "tool_calls": trajectory.tool_calls.len(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    info!("Agent run finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.prompt_file {
        info!(path = %path, "Loading prompt from file");
        let content = fs::read_to_string(path)?;
        return Ok(content.trim().to_string());
    }

    if !cli.prompt.is_empty() {
        info!("Using prompt provided through CLI arguments");
        return Ok(cli.prompt.join(" ").trim().to_string());
    }

    warn!("Prompt not provided via arguments or file");
    Err("prompt required via arguments or --prompt-file".into())
}
