//! Imperialism session host CLI.
//!
//! - `imperialism-server new` - write a blank all-water scenario
//! - `imperialism-server run` - replay an intent script against a scenario
//! - `imperialism-server inspect` - list nations and what they own

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use imperialism_core::{load_rules, load_scenario, save_scenario, RulesSource, ServerScenario};
use imperialism_protocol::{ClientIntent, NationId, TurnEvent};
use imperialism_server::{GameSession, ServerConfig};

#[derive(Parser)]
#[command(name = "imperialism-server")]
#[command(about = "Headless host for the Imperialism turn engine", version)]
struct Cli {
    /// Host configuration (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ruleset document, overriding the configured one
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blank scenario
    New {
        #[arg(long)]
        rows: u32,
        #[arg(long)]
        columns: u32,
        /// Output path; `.msgpack` selects MessagePack
        #[arg(long)]
        out: PathBuf,
    },

    /// Replay a YAML list of intents
    Run {
        #[arg(long)]
        scenario: Option<PathBuf>,
        #[arg(long)]
        intents: PathBuf,
        /// Save the final state here
        #[arg(long)]
        save: Option<PathBuf>,
        /// Nation whose plan receives map intents
        #[arg(long)]
        nation: Option<u8>,
    },

    /// Print nations and their assets
    Inspect {
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if cli.rules.is_some() {
        config.rules = cli.rules.clone();
    }
    config.json_logs |= cli.json;
    init_logging(&config);

    match cli.command {
        Commands::New { rows, columns, out } => new_scenario(&config, rows, columns, &out),
        Commands::Run {
            scenario,
            intents,
            save,
            nation,
        } => {
            if scenario.is_some() {
                config.scenario = scenario;
            }
            if save.is_some() {
                config.save_path = save;
            }
            if let Some(nation) = nation {
                config.active_nation = NationId(nation);
            }
            run_script(config, &intents)
        }
        Commands::Inspect { scenario } => {
            if scenario.is_some() {
                config.scenario = scenario;
            }
            inspect(config)
        }
    }
}

fn init_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = fmt().with_env_filter(filter).with_target(false);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn rules_source(config: &ServerConfig) -> RulesSource<'static> {
    match &config.rules {
        Some(path) => RulesSource::Path(path.clone()),
        None => RulesSource::Embedded,
    }
}

fn new_scenario(config: &ServerConfig, rows: u32, columns: u32, out: &Path) -> Result<()> {
    let rules = load_rules(rules_source(config)).context("loading ruleset")?;
    let scenario = ServerScenario::new(rows, columns, rules)?;
    save_scenario(&scenario, out).with_context(|| format!("writing {}", out.display()))?;
    println!("wrote {rows}x{columns} scenario to {}", out.display());
    Ok(())
}

fn run_script(config: ServerConfig, intents: &Path) -> Result<()> {
    let text = std::fs::read_to_string(intents)
        .with_context(|| format!("reading {}", intents.display()))?;
    let script: Vec<ClientIntent> =
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", intents.display()))?;

    let save_path = config.save_path.clone();
    let mut session = GameSession::from_config(config).context("starting session")?;
    info!(intents = script.len(), "replaying script");

    for (index, intent) in script.into_iter().enumerate() {
        match session.handle(intent) {
            Ok(ack) => println!("{}", serde_json::to_string(&ack)?),
            Err(err) => println!("intent {index} failed: {err}"),
        }
        for event in session.drain_events() {
            print_event(&event);
        }
    }

    if let Some(path) = save_path {
        save_scenario(session.scenario(), &path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("saved to {}", path.display());
    }
    session.shutdown();
    Ok(())
}

fn print_event(event: &TurnEvent) {
    match event {
        TurnEvent::TurnCompleted { result } => {
            println!(
                "turn {} resolved: {} accepted, {} rejected, {} roads, {} structures, {} prospected",
                result.turn,
                result.accepted.len(),
                result.rejected.len(),
                result.roads.len(),
                result.structures.len(),
                result.prospected.len()
            );
        }
        TurnEvent::OrderRejected {
            nation,
            workforce,
            reason,
            ..
        } => println!("  {nation} order for {workforce} skipped: {reason}"),
    }
}

fn inspect(config: ServerConfig) -> Result<()> {
    let rules = load_rules(rules_source(&config)).context("loading ruleset")?;
    let path = config
        .scenario
        .context("no scenario given (--scenario or config)")?;
    let scenario = load_scenario(&path, rules).with_context(|| format!("loading {}", path.display()))?;

    println!(
        "{}: {}x{} tiles, turn {}, {} roads",
        path.display(),
        scenario.map().rows(),
        scenario.map().columns(),
        scenario.turn(),
        scenario.roads().len()
    );
    for (id, nation) in scenario.nations() {
        let asset = scenario.get_nation_asset(*id)?;
        println!(
            "{id} {}: {} workforces, {} structures",
            nation.name,
            asset.get_workforces().len(),
            asset.get_structures().len()
        );
        for workforce in asset.get_workforces().values() {
            println!(
                "  {} {} at {} ({})",
                workforce.get_id(),
                workforce.get_type(),
                workforce.get_current_position(),
                workforce.get_action()
            );
        }
        for structure in asset.get_structures().values() {
            println!(
                "  {} level {} at {}",
                structure.get_type(),
                structure.get_level(),
                structure.get_position()
            );
        }
    }
    Ok(())
}
