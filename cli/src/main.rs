use anyhow::Context;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io;
use std::path::PathBuf;
use sweeper_core::{DEFAULT_RECORDS_PATH, Difficulty, StartTile, Tier};
use tracing_subscriber::filter::LevelFilter;

mod command;
mod shell;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TierArg {
    Easy,
    Normal,
    Hard,
    Custom,
}

impl From<TierArg> for Tier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Easy => Tier::Easy,
            TierArg::Normal => Tier::Normal,
            TierArg::Hard => Tier::Hard,
            TierArg::Custom => Tier::Custom,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Difficulty tier
    #[arg(short, long, value_enum, default_value_t = TierArg::Easy)]
    tier: TierArg,

    /// Custom board width (1..=34)
    #[arg(long, required_if_eq("tier", "custom"))]
    width: Option<u8>,

    /// Custom board height (5..=19)
    #[arg(long, required_if_eq("tier", "custom"))]
    height: Option<u8>,

    /// Custom mine count
    #[arg(long, required_if_eq("tier", "custom"))]
    mines: Option<u16>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Keep the neighbours of the first opened cell free of mines
    #[arg(long)]
    zero_start: bool,

    /// File holding the best times
    #[arg(long, default_value = DEFAULT_RECORDS_PATH)]
    records: PathBuf,
}

impl Args {
    fn difficulty(&self) -> anyhow::Result<Difficulty> {
        match Difficulty::preset(self.tier.into()) {
            Some(preset) => Ok(preset),
            None => {
                let (Some(width), Some(height), Some(mines)) = (self.width, self.height, self.mines)
                else {
                    anyhow::bail!("custom games need --width, --height and --mines");
                };
                Difficulty::custom(width, height, mines).context("invalid custom level")
            }
        }
    }

    fn settings(&self) -> anyhow::Result<shell::Settings> {
        Ok(shell::Settings {
            difficulty: self.difficulty()?,
            seed: self.seed,
            start_tile: if self.zero_start {
                StartTile::AlwaysZero
            } else {
                StartTile::SimpleSafe
            },
            records: self.records.clone(),
        })
    }
}

fn level_filter(filter: log::LevelFilter) -> LevelFilter {
    match filter {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(level_filter(args.verbose.log_level_filter()))
        .with_writer(io::stderr)
        .init();
    log::debug!("{:?}", args);

    let settings = args.settings()?;
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    shell::Shell::new(settings, stdin, stdout)?.run()
}
