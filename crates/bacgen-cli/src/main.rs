//! Command-line interface for the driver config generator.

mod json_backend;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bacgen_core::{ConfigGenerator, Hierarchy, RawConfig, DEFAULT_DRIVER_VIP};
use json_backend::JsonBackend;

/// Generate platform driver configurations for a building-automation site.
#[derive(Parser, Debug)]
#[command(name = "bacgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Generate driver configs from a site configuration file.
    Generate {
        /// Path to the site configuration (JSON, `//` and `#` comments allowed).
        config: PathBuf,
    },
    /// Parse a site configuration file and report what would be generated.
    Check {
        /// Path to the site configuration.
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if args.verbose { "debug" } else { "info" };
        tracing_subscriber::EnvFilter::new(format!("bacgen={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Generate { config } => run_generate(&config),
        Command::Check { config } => run_check(&config),
    }
}

fn run_generate(config: &PathBuf) -> Result<()> {
    tracing::debug!("loading site configuration {}", config.display());
    let raw = RawConfig::from_file(config)?;
    let backend = JsonBackend::from_config(&raw);
    let mut generator = ConfigGenerator::new(raw, backend)?;
    let outcome = generator.generate()?;

    if let Some(message) = outcome.failure_message() {
        eprintln!("\n{message}");
    }
    std::process::exit(outcome.exit_code());
}

fn run_check(config: &PathBuf) -> Result<()> {
    let raw = RawConfig::from_file(config)?;

    println!("site_id:     {}", raw.site_id);
    println!(
        "building:    {}",
        raw.building.as_deref().unwrap_or("(derived from site_id)")
    );
    println!(
        "campus:      {}",
        raw.campus.as_deref().unwrap_or("(derived from site_id)")
    );
    println!(
        "driver_vip:  {}",
        raw.driver_vip.as_deref().unwrap_or(DEFAULT_DRIVER_VIP)
    );
    println!(
        "template:    {}",
        if raw.config_template.is_some() {
            "present"
        } else {
            "missing"
        }
    );
    match raw.extra.get("equipment") {
        Some(equipment) => {
            let hierarchy = Hierarchy::from_value(equipment)?;
            let vavs: usize = hierarchy.groups().iter().map(|g| g.vav_ids.len()).sum();
            println!("equipment:   {} AHU group(s), {} VAV(s)", hierarchy.len(), vavs);
        }
        None => println!("equipment:   missing"),
    }
    println!(
        "power meter: {}",
        raw.power_meter_id.as_deref().unwrap_or("(not configured)")
    );
    Ok(())
}
