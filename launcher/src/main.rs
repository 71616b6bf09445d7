use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use stockpile::logging;
use stockpile::memory::{FreezeState, IndexedValue, Trainer};
use stockpile::process::ProcFs;
use stockpile::slots::SlotTable;

use crate::error::LaunchError;
use crate::profile::LaunchProfile;

const DEFAULT_LAUNCH_PROFILE_PATH: &str = "./stockpile.toml";
const FREEZE_POLL_INTERVAL: Duration = Duration::from_millis(250);

mod error;
mod profile;

/// Mirrors and edits the storage of a running Cultures game.
#[derive(Debug, Parser)]
#[command(name = "stockpile", version)]
struct Cli {
    /// Launch profile to read
    #[arg(long, env = "STOCKPILE_PROFILE", default_value = DEFAULT_LAUNCH_PROFILE_PATH)]
    profile: String,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the slot table
    Slots,
    /// Print every slot value
    Read,
    /// Write the given slots once
    Write {
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, i32)>,
    },
    /// Keep the given slots pinned until the game exits or time runs out
    Freeze {
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, i32)>,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), LaunchError> {
    let launch_profile = profile::read_launch_profile(&cli.profile)?;

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    logging::init(launch_profile.log_file.as_deref(), level)?;
    launch_profile.log_fallback();

    let table = launch_profile.slot_table()?;

    match cli.command {
        Command::Slots => {
            print_slots(&table);
            Ok(())
        }
        Command::Read => {
            let trainer = attach(&launch_profile, &table)?;
            let values = trainer.read_all_slots()
                .map_err(LaunchError::ReadError)?;
            print_values(&table, &values);
            Ok(())
        }
        Command::Write { assignments } => {
            let targets = resolve(&table, &assignments)?;
            let trainer = attach(&launch_profile, &table)?;
            trainer.write_indexed_values(&targets)
                .map_err(LaunchError::WriteError)?;
            println!("Wrote {} values", targets.len());
            Ok(())
        }
        Command::Freeze { assignments, seconds } => {
            let targets = resolve(&table, &assignments)?;
            let mut trainer = attach(&launch_profile, &table)?;
            freeze(&mut trainer, targets, seconds.map(Duration::from_secs));
            Ok(())
        }
    }
}

fn attach(launch_profile: &LaunchProfile, table: &SlotTable) -> Result<Trainer, LaunchError> {
    let base = launch_profile.storage_base(table)?;
    let trainer = Trainer::attach_to(&ProcFs::default(), &launch_profile.executable, base.as_usize(), table.len())?
        .with_freeze_interval(launch_profile.freeze_interval());

    info!("Attached to pid {} with storage at {:?}", trainer.pid(), base);
    Ok(trainer)
}

fn freeze(trainer: &mut Trainer, targets: Vec<IndexedValue>, duration: Option<Duration>) {
    let started = Instant::now();
    trainer.freeze_start(targets);
    println!("Freezing {} values", trainer.frozen_targets().len());

    loop {
        thread::sleep(FREEZE_POLL_INTERVAL);

        if trainer.freeze_state() != FreezeState::Running {
            println!("Game exited, freeze ended");
            return;
        }

        if duration.is_some_and(|d| started.elapsed() >= d) {
            trainer.freeze_stop();
            println!("Freeze stopped after {}s", started.elapsed().as_secs());
            return;
        }
    }
}

fn resolve(table: &SlotTable, assignments: &[(String, i32)]) -> Result<Vec<IndexedValue>, LaunchError> {
    assignments.iter()
        .map(|(name, value)| -> Result<IndexedValue, LaunchError> {
            Ok(IndexedValue::new(table.index_of(name)?, *value))
        })
        .collect()
}

fn parse_assignment(input: &str) -> Result<(String, i32), String> {
    let (name, value) = input.rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", input))?;
    let value = value.trim().parse::<i32>()
        .map_err(|e| format!("invalid value {:?}: {}", value, e))?;

    Ok((name.trim().to_string(), value))
}

fn print_slots(table: &SlotTable) {
    if table.categories().is_empty() {
        for (index, name) in table.names().iter().enumerate() {
            println!("{:>3}  {}", index, name);
        }
        return;
    }

    for category in table.categories() {
        println!("{}", category.name);
        for index in &category.slots {
            println!("  {:>3}  {}", index, table.name(*index).unwrap_or("?"));
        }
    }
}

fn print_values(table: &SlotTable, values: &[i32]) {
    let width = table.names().iter().map(|n| n.chars().count()).max().unwrap_or(0);

    for (name, value) in table.names().iter().zip(values) {
        println!("{:<width$}  {}", name, value, width = width);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use stockpile::memory::IndexedValue;
    use stockpile::slots::SlotTable;

    use crate::{parse_assignment, resolve, Cli, Command};

    #[test]
    fn assignments_split_on_the_last_equals_sign() {
        assert_eq!(parse_assignment("Holz=500").unwrap(), ("Holz".to_string(), 500));
        assert_eq!(parse_assignment("Kleiner Heiltrank = -3").unwrap(), ("Kleiner Heiltrank".to_string(), -3));
        assert!(parse_assignment("Holz").is_err());
        assert!(parse_assignment("Holz=lots").is_err());
        assert!(parse_assignment("Holz=99999999999").is_err());
    }

    #[test]
    fn assignments_resolve_to_slot_indices() {
        let table = SlotTable::cultures();
        let targets = resolve(&table, &[("Holz".to_string(), 500), ("Nahrung".to_string(), 1)]).unwrap();

        assert_eq!(targets, vec![IndexedValue::new(7, 500), IndexedValue::new(0, 1)]);
        assert!(resolve(&table, &[("Mithril".to_string(), 1)]).is_err());
    }

    #[test]
    fn the_command_line_parses() {
        let cli = Cli::try_parse_from(["stockpile", "--profile", "p.toml", "freeze", "Holz=5", "--seconds", "3"]).unwrap();

        assert_eq!(cli.profile, "p.toml");
        match cli.command {
            Command::Freeze { assignments, seconds } => {
                assert_eq!(assignments, vec![("Holz".to_string(), 5)]);
                assert_eq!(seconds, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
