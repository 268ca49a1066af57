//! CLI application for Vietnamese identity card OCR.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, detect, parse, process, serve};

/// Vietnamese ID card OCR - Extract structured fields from CCCD images
#[derive(Parser)]
#[command(name = "cccd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single card image
    Process(process::ProcessArgs),

    /// Process multiple card images
    Batch(batch::BatchArgs),

    /// Extract fields from already recognized text
    Parse(parse::ParseArgs),

    /// Crop every detected region of a card image
    Detect(detect::DetectArgs),

    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Detect(args) => detect::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args).await,
    }
}
