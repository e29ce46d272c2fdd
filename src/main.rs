use clap::Parser;
use newsreel::cli::{Cli, Commands};
use newsreel::pipeline::{CollectionPipeline, RunOutcome};
use newsreel::settings::Settings;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            multi_llm,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            run_collection(multi_llm, output).await?;
        }
        Commands::Sources { verbose } => {
            init_tracing(verbose);
            let settings = Settings::load()?;
            list_sources(&settings, verbose);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "newsreel=debug"
    } else {
        "newsreel=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_collection(multi_llm: bool, output: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Starting collection (multi_llm={})", multi_llm);

    let settings = Settings::load()?;
    let pipeline = CollectionPipeline::from_settings(&settings, multi_llm, output)?;

    let outcome = tokio::select! {
        outcome = pipeline.run() => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Collection interrupted by user");
            eprintln!("Collection interrupted by user");
            std::process::exit(130);
        }
    };

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    let stats = &outcome.stats;

    if stats.collected == 0 {
        println!("No content collected.");
        return;
    }

    println!("Collected {} items", stats.collected);
    println!("{} candidates after filtering", stats.filtered);
    println!("{} items passed validation", stats.validated);
    println!("{} summaries generated", stats.summarized);

    match &outcome.report {
        Some(paths) => println!("Report written to {}", paths.markdown.display()),
        None => println!("No relevant content found after processing."),
    }
}

fn list_sources(settings: &Settings, verbose: bool) {
    if !settings.has_sources() {
        println!("No sources configured.");
        return;
    }

    println!("Configured sources");

    if !settings.rss_feeds.is_empty() {
        println!("\nRSS feeds:");
        if verbose {
            for feed in &settings.rss_feeds {
                println!("  {}", feed);
            }
        } else {
            println!("  {} feeds configured", settings.rss_feeds.len());
        }
    }

    if !settings.reddit.channels.is_empty() {
        println!("\nReddit channels:");
        if verbose {
            for channel in &settings.reddit.channels {
                println!("  r/{}", channel);
            }
        } else {
            println!(
                "  {} reddit channels configured",
                settings.reddit.channels.len()
            );
        }
    }
}
