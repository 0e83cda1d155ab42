use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outpost::{scenario::ScenarioLoader, snapshot::SavedState};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless settlement economy runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/outpost.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override seconds simulated per tick
    #[arg(long)]
    dt: Option<f64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Restore resource and population state from a save file before running
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final resource and population state to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(
        scenario = %scenario.name,
        path = %cli.scenario.display(),
        buildings = scenario.buildings.len(),
        placements = scenario.placements.len(),
        "scenario loaded"
    );

    let ticks = scenario.ticks(cli.ticks);
    let dt = cli.dt.unwrap_or(scenario.dt_seconds);
    let mut settings = scenario.settings();
    if let Some(interval) = cli.snapshot_interval {
        settings.snapshot_interval_ticks = interval;
    }
    if let Some(dir) = cli.snapshot_dir {
        settings.snapshot_dir = dir;
    }

    let grid = scenario.build_grid();
    let mut engine = scenario.builder(settings).build();
    if let Some(path) = &cli.load {
        let state = SavedState::read_from(path)?;
        engine.restore(state);
        engine.grid_changed(&grid);
        info!(path = %path.display(), tick = engine.current_tick(), "save restored");
    }

    let report_every = scenario.logging.report_every_ticks;
    engine.run_with_hook(&grid, ticks, dt, |result| {
        if report_every > 0 && result.tick % report_every == 0 {
            let stock = &result.resources.resources;
            info!(
                tick = result.tick,
                population = result.population.current,
                max_population = result.population.max,
                happiness = result.population.happiness,
                scrap = stock.scrap,
                food = stock.food,
                water = stock.water,
                power = stock.power,
                workers_available = result.workers.available,
                understaffed = result.workers.understaffed,
                "settlement report"
            );
        }
    })?;

    if let Some(path) = &cli.save {
        engine.save_state().write_to(path)?;
        info!(path = %path.display(), "state saved");
    }

    println!(
        "Scenario '{}' completed for {} ticks. Final population: {} (happiness {:.1})",
        scenario.name,
        ticks,
        engine.population().current(),
        engine.population().happiness()
    );
    Ok(())
}
