use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "trellis",
    version,
    about = "ReAct garden-planning agent powered by Ollama"
)]
pub struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:11434")]
    pub ollama_url: String,
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub prompt_file: Option<String>,
    #[arg(long)]
    pub max_steps: Option<usize>,
    #[arg(long)]
    pub stop_on_error: bool,
    #[arg(long)]
    pub trajectory_out: Option<String>,
    #[arg()]
    pub prompt: Vec<String>,
}
