use clap::Parser;
use std::error::Error;
use trellis::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    trellis::run(Cli::parse()).await
}
