use blendshape_baker::app::{RunOptions, run_cli};
use blendshape_baker::io::config::Config;
use blendshape_baker::pipeline::settings::BlendshapeSelector;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

/// Bakes one blendshape frame into a new static mesh asset.
#[derive(Parser, Debug)]
#[command(name = "blendshape-baker")]
#[command(about = "Bake a blendshape frame into a mesh's base geometry")]
struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: String,

    /// Blendshape to bake, by index or name (overrides the config)
    #[arg(short, long, value_name = "NAME|INDEX")]
    blendshape: Option<BlendshapeSelector>,

    /// Frame of the blendshape to bake (overrides the config)
    #[arg(short, long)]
    frame: Option<usize>,

    /// List the source mesh's blendshapes and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_level(true)
        .init();

    info!("Loading config: {}", cli.config);
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        blendshape: cli.blendshape,
        frame: cli.frame,
        list_only: cli.list,
    };

    match run_cli(config, options) {
        Ok(Some(outcome)) => {
            println!("{}", outcome.asset_path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Bake failed: {e}");
            ExitCode::FAILURE
        }
    }
}
