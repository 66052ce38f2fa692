// Pelada manager entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (stderr, stdout is reserved for command output)
// 3. Load config
// 4. Load the roster file
// 5. Run the command and print its output

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use pelada_core::config::{self, Config};
use pelada_core::draw::{seeded_rng, BalanceMode};
use pelada_core::roster::import::load_roster;

use commands::DrawOptions;

#[derive(Parser)]
#[command(name = "pelada")]
#[command(about = "Roster, attendance and team draws for a weekly pelada", long_about = None)]
struct Cli {
    /// Config file. Defaults to config/pelada.toml, then the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show attendance, payments and ratings
    Status {
        /// Roster CSV file
        roster: PathBuf,
    },

    /// Suggest a team count for the confirmed players
    Suggest {
        /// Roster CSV file
        roster: PathBuf,
    },

    /// Draw teams from the confirmed players
    Draw {
        /// Roster CSV file
        roster: PathBuf,

        /// Number of teams (clamped to the configured bounds)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        teams: Option<u16>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// "independent" or "interleaved"
        #[arg(long, value_parser = parse_mode)]
        mode: Option<BalanceMode>,

        /// Session date printed in the share text (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print teams as JSON instead of share text
        #[arg(long)]
        json: bool,
    },
}

fn parse_mode(s: &str) -> Result<BalanceMode, String> {
    BalanceMode::from_str_mode(s)
        .ok_or_else(|| format!("unknown mode '{s}', expected 'independent' or 'interleaved'"))
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing()?;
    debug!("pelada starting up");

    // 3. Load config
    let config = resolve_config(cli.config.as_deref()).context("failed to load configuration")?;
    info!(
        "Config loaded: teams {}..={}, {} players per team minimum",
        config.draw.min_teams, config.draw.max_teams, config.draw.min_players_per_team
    );

    // 4-5. Load roster and run the command
    let output = match cli.command {
        Commands::Status { roster } => {
            let roster = load_roster(&roster).context("failed to load roster")?;
            commands::status(&roster)
        }
        Commands::Suggest { roster } => {
            let roster = load_roster(&roster).context("failed to load roster")?;
            commands::suggest(&config, &roster)
        }
        Commands::Draw {
            roster,
            teams,
            seed,
            mode,
            date,
            json,
        } => {
            let roster = load_roster(&roster).context("failed to load roster")?;
            let opts = DrawOptions {
                teams: teams.map(usize::from),
                mode,
                date,
                json,
            };
            match seed {
                Some(seed) => {
                    info!("Using seed {}", seed);
                    commands::draw(&config, &roster, &opts, &mut seeded_rng(seed))?
                }
                None => commands::draw(&config, &roster, &opts, &mut rand::thread_rng())?,
            }
        }
    };

    print!("{output}");
    Ok(())
}

/// Pick the config file: explicit `--config`, then `config/pelada.toml` in
/// the working directory, then `config/pelada.toml` under the user config
/// directory (written from defaults on first run).
fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Ok(config::load_config_file(path)?);
    }

    let cwd = std::env::current_dir()?;
    let local = cwd.join(config::CONFIG_DIR).join(config::CONFIG_FILE);
    if local.is_file() {
        return Ok(config::load_config_from(&cwd)?);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "pelada") {
        let base = dirs.config_dir();
        if let Some(written) = config::ensure_config_file(base)? {
            info!("Created {}", written.display());
        }
        return Ok(config::load_config_from(base)?);
    }

    debug!("no home directory, using built-in defaults");
    Ok(Config::default())
}

/// Initialize tracing to stderr so command output on stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pelada=info,pelada_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
