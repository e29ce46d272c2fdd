use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "newsreel",
    version,
    about = "Multi-LLM content collection and analysis pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect and analyze content from configured sources
    Collect {
        /// Use every configured validator model for relevance voting
        #[arg(long, short = 'm')]
        multi_llm: bool,
        /// Output directory for collected content
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// List configured content sources
    Sources {
        /// Show full source details
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}
