#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that validates, spins, and simulates Fortune Wheel definitions.

mod logging;
mod wheel_file;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fortune_wheel_core::{Command, Event, Prize, PrizeId, SpinRequest, SpinResult};
use fortune_wheel_system_statistics::Statistics;
use fortune_wheel_world::{self as world, query, validate_distribution, Wheel};
use serde::Serialize;

use crate::wheel_file::WheelFile;

#[derive(Parser)]
#[command(name = "fortune-wheel", about = "Fortune Wheel spin engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a wheel's prize distribution and print the validation report
    Validate {
        /// Path to the TOML wheel file
        file: PathBuf,
    },
    /// Run one spin from start to resolution and print its result
    Spin {
        /// Path to the TOML wheel file
        file: PathBuf,
        /// Force the spin to land on this prize
        #[arg(long)]
        prize_id: Option<u32>,
        /// Seed for the wheel's random generator
        #[arg(long)]
        seed: Option<u64>,
        /// Redirect the spin to this prize while it is in flight
        #[arg(long = "override")]
        override_id: Option<u32>,
    },
    /// Run many resolved spins and print the win tally
    Simulate {
        /// Path to the TOML wheel file
        file: PathBuf,
        /// Number of spins to run
        #[arg(long, default_value_t = 1_000)]
        spins: u64,
        /// Seed for the wheel's random generator
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct SpinReport<'a> {
    result: SpinResult,
    prize: Option<&'a Prize>,
    resting_angle: f64,
}

/// Entry point for the Fortune Wheel command-line interface.
fn main() -> Result<()> {
    logging::setup();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => validate(&WheelFile::load(file)?),
        Commands::Spin {
            file,
            prize_id,
            seed,
            override_id,
        } => spin(
            WheelFile::load(file)?,
            prize_id.map(PrizeId::new),
            seed,
            override_id.map(PrizeId::new),
        ),
        Commands::Simulate { file, spins, seed } => simulate(WheelFile::load(file)?, spins, seed),
    }
}

fn validate(wheel: &WheelFile) -> Result<()> {
    let report = validate_distribution(&wheel.prizes, wheel.config.use_weight);
    print_json(&report)?;
    if !report.is_valid() {
        bail!(
            "prize distribution has {} validation error(s)",
            report.errors().len()
        );
    }
    Ok(())
}

fn spin(
    wheel_file: WheelFile,
    forced: Option<PrizeId>,
    seed: Option<u64>,
    override_id: Option<PrizeId>,
) -> Result<()> {
    let WheelFile { config, prizes } = wheel_file;
    let settle = config.duration();
    let model = config.model();
    let mut wheel = seeded_wheel(seed);
    let _ = drive(&mut wheel, Command::ConfigureWheel { config })?;

    let _ = drive(
        &mut wheel,
        Command::StartSpin {
            prizes,
            model,
            request: forced.map_or_else(SpinRequest::random, SpinRequest::forced),
        },
    )?;
    if let Some(prize_id) = override_id {
        let _ = drive(&mut wheel, Command::OverridePrize { prize_id })?;
    }
    let _ = drive(&mut wheel, Command::Tick { dt: settle })?;
    let result = resolve(&mut wheel)?;

    let prize = query::current_prize(&wheel);
    print_json(&SpinReport {
        result,
        prize,
        resting_angle: query::resting_angle(&wheel),
    })
}

fn simulate(wheel_file: WheelFile, spins: u64, seed: Option<u64>) -> Result<()> {
    let WheelFile { config, prizes } = wheel_file;
    let model = config.model();
    let mut wheel = seeded_wheel(seed);
    wheel.configure(config);
    let mut statistics = Statistics::with_prizes(&prizes);

    for _ in 0..spins {
        let _ = drive(
            &mut wheel,
            Command::StartSpin {
                prizes: prizes.clone(),
                model,
                request: SpinRequest::random(),
            },
        )?;
        let events = drive(&mut wheel, Command::EndSpin)?;
        statistics.handle(&events);
    }

    tracing::info!(spins, "simulation finished");
    print_json(&statistics.report())
}

fn seeded_wheel(seed: Option<u64>) -> Wheel {
    seed.map_or_else(Wheel::new, Wheel::with_seed)
}

fn drive(wheel: &mut Wheel, command: Command) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    world::apply(wheel, command, &mut events);
    for event in &events {
        if let Event::SpinRejected { operation, reason } = event {
            bail!("{operation} rejected: {reason}");
        }
    }
    Ok(events)
}

fn resolve(wheel: &mut Wheel) -> Result<SpinResult> {
    let events = drive(wheel, Command::EndSpin)?;
    events
        .into_iter()
        .find_map(|event| match event {
            Event::SpinResolved { result } => Some(result),
            _ => None,
        })
        .context("spin ended without a result")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize report as json")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use fortune_wheel_core::{PrizeSet, SelectionModel, WheelConfig};

    fn wheel_file() -> WheelFile {
        WheelFile {
            config: WheelConfig::default(),
            prizes: PrizeSet::new(vec![
                Prize::new(PrizeId::new(1), "a").with_probability(50.0),
                Prize::new(PrizeId::new(2), "b").with_probability(50.0),
            ]),
        }
    }

    #[test]
    fn drive_surfaces_rejections_as_errors() {
        let mut wheel = Wheel::with_seed(1);

        let error = drive(&mut wheel, Command::EndSpin).expect_err("nothing is spinning");

        assert_eq!(error.to_string(), "end rejected: cannot end while the wheel is idle");
    }

    #[test]
    fn resolve_returns_the_committed_result() {
        let wheel_file = wheel_file();
        let mut wheel = Wheel::with_seed(1);
        let _ = drive(
            &mut wheel,
            Command::StartSpin {
                prizes: wheel_file.prizes,
                model: SelectionModel::Probability,
                request: SpinRequest::forced(PrizeId::new(2)),
            },
        )
        .expect("spin starts");

        let result = resolve(&mut wheel).expect("spin resolves");

        assert_eq!(result.prize_id(), PrizeId::new(2));
        assert!(resolve(&mut wheel).is_err());
    }

    #[test]
    fn subcommands_run_against_an_in_memory_wheel() {
        validate(&wheel_file()).expect("distribution is valid");
        spin(wheel_file(), None, Some(5), Some(PrizeId::new(1))).expect("spin runs");
        simulate(wheel_file(), 25, Some(5)).expect("simulation runs");
    }

    #[test]
    fn override_delay_fits_inside_the_default_animation() {
        let config = WheelConfig::default();
        assert!(config.override_delay() < config.duration());
        assert!(config.duration() > Duration::ZERO);
    }
}
