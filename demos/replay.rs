extern crate poker_tracker;

use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Parser;
use poker_tracker::history::{DirectorySink, JsonLinesSink, StatsSink};
use poker_tracker::tracker::{
    ConfigError, HandStateMachine, JsonLinesSource, TableSession, TrackerConfig,
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "replay",
    about = "Replay recorded table observations into hand histories",
    long_about = "Reads one JSON observation per line, reconstructs hands from them\n\
                  and writes every completed hand to the chosen outputs."
)]
struct Args {
    /// Observation log, one JSON object per line
    input: PathBuf,

    /// Tracker config file (JSON). Defaults are used when omitted.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Directory to write one JSON file per hand into
    #[arg(short = 'd', long, default_value = "data/hands")]
    output_dir: PathBuf,

    /// Also append every hand to this JSON Lines file
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Emit the last hand even if the log ends mid-hand
    #[arg(long)]
    complete_on_shutdown: bool,

    /// Replay without waiting between observations
    #[arg(long)]
    fast: bool,
}

type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
enum ReplayError {
    #[error("failed to open observation log {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };
    config.complete_on_shutdown |= args.complete_on_shutdown;
    if args.fast {
        config.poll_interval_ms = 1;
    }

    let file = File::open(&args.input).map_err(|source| ReplayError::Open {
        path: args.input.clone(),
        source,
    })?;
    let source = JsonLinesSource::new(BufReader::new(file));

    let stats = StatsSink::new();
    let stats_storage = stats.get_storage();

    let machine = HandStateMachine::new(config)?;
    let mut session = TableSession::new(source, machine)
        .with_sink(DirectorySink::new(&args.output_dir))
        .with_sink(stats);
    if let Some(path) = &args.jsonl {
        session = session.with_sink(JsonLinesSink::new(path));
    }

    let emitted = session.run();

    println!("Replayed {} observations", session.ticks());
    println!("Hands written: {emitted}");
    println!("Output directory: {}", args.output_dir.display());
    println!();
    println!(
        "{:<20} {:>6} {:>7} {:>7} {:>6}",
        "Player", "Hands", "VPIP%", "PFR%", "AF"
    );
    for (name, player) in stats_storage.borrow().players() {
        println!(
            "{:<20} {:>6} {:>7.1} {:>7.1} {:>6.2}",
            name,
            player.hands_played,
            player.vpip_percent(),
            player.pfr_percent(),
            player.aggression_factor()
        );
    }

    Ok(())
}
