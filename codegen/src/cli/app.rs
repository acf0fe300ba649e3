use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "codegen",
    version,
    about = "AI code generator - turn a prompt into code in the language you ask for",
    long_about = "Codegen sends natural-language requirements to Gemini, returns cleaned-up code, and keeps a history of every attempt. Run it as an HTTP API or use the one-shot commands."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    #[command(about = "Serve the code generation API over HTTP")]
    Serve(ServeArgs),

    /// Generate code once and print it
    #[command(about = "Generate code for a single prompt")]
    Generate(GenerateArgs),

    /// List recorded generation attempts
    #[command(about = "Show generation history")]
    History(HistoryArgs),

    /// Print usage statistics
    #[command(about = "Show generation statistics as JSON")]
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind; overrides the configured host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on; overrides the configured port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Target programming language (e.g., Java, Python, Rust)
    #[arg(short, long)]
    pub language: String,

    /// What the code should do
    #[arg(help = "Natural-language requirement")]
    pub prompt: String,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Number of most recent records to show (1-100)
    #[arg(short = 'n', long, default_value = "10", allow_negative_numbers = true)]
    pub limit: i64,

    /// Only records for this language
    #[arg(long, conflicts_with = "search")]
    pub language: Option<String>,

    /// Only records whose prompt contains this keyword
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Include the last 24 hours of records
    #[arg(long)]
    pub detailed: bool,
}
