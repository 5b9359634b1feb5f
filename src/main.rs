//! Replay a recorded squat session and print its report.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use squat_analysis::config::{Config, EXAMPLE_CONFIG};
use squat_analysis::session::{Recording, Session};
use squat_analysis::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded session to replay (YAML)
    #[arg(short, long)]
    session: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path).and_then(|cfg| cfg.validate().map(|()| cfg)) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let Some(session_path) = args.session else {
        anyhow::bail!("No session given; pass --session <file> or --print-config");
    };

    let recording = Recording::from_file(&session_path)
        .with_context(|| format!("Failed to load recording {session_path}"))?;
    info!("Replaying {} frames from {session_path}", recording.frames.len());

    let mut session = Session::new(config)?;
    let live = session.replay(&recording);
    info!(
        "Live counter saw {} reps",
        live.last().map_or(0, |output| output.rep_count)
    );

    match session.finish() {
        Ok(outcome) => {
            print!("{}", serde_yaml::to_string(&outcome.report)?);
            Ok(())
        }
        Err(Error::NoValidReps) => {
            println!("No valid repetitions detected.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
