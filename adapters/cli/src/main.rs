#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that analyses dumped item wheel tables.

mod config;
mod export;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use item_wheel_core::{GlobalStatsTable, ItemId, Layout, RaceState};
use item_wheel_dump::load_tables;
use item_wheel_rendering::{save_heatmap, StateReport};
use item_wheel_system_aggregation::aggregate;
use item_wheel_system_heatmap::build_layout_grid;
use item_wheel_system_lookup::{resolve_state, trace_wheels};
use item_wheel_system_statistics::{build_global_stats, build_global_stats_parallel};
use item_wheel_tables::ItemTables;
use log::{info, warn};

use crate::{
    config::{FileConfig, Settings, DEFAULT_CONFIG_PATH},
    export::StatsExport,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults to ./item-wheel.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wheel dump: one wheel of comma separated hex item ids per line
    #[arg(long)]
    wheels: Option<PathBuf>,

    /// Redirect dump: one hex wheel offset per line
    #[arg(long)]
    redirects: Option<PathBuf>,

    /// Evaluate race states on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the wheels and encounter rates of every race state (default)
    Report {
        /// Only print the encounter rate tables
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the wheels and encounter rates of a single race state
    Lookup {
        /// Zero-based lap count
        #[arg(long)]
        lap: u8,
        /// Race position as used by the dumped layout
        #[arg(long)]
        position: u8,
        /// The halfway marker of the lap has been passed
        #[arg(long)]
        halfway: bool,
    },
    /// Render one encounter rate heatmap per item
    Heatmaps {
        /// Output directory (overrides the config file)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Render only this item, given as a hex id
        #[arg(long, value_parser = parse_item)]
        item: Option<ItemId>,
    },
    /// Write the statistics table as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Entry point for the item wheel command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file_config = FileConfig::load(args.config.as_deref())?;
    if args.config.is_none() && file_config != FileConfig::default() {
        info!("using config from {DEFAULT_CONFIG_PATH}");
    }
    let settings = Settings::resolve(file_config, args.wheels, args.redirects);

    let tables = load_tables(&settings.wheel_dump, &settings.redirect_dump)
        .context("failed to load item wheel dumps")?;
    tables
        .validate()
        .context("redirect dump references a wheel missing from the wheel dump")?;

    match args.command.unwrap_or(Commands::Report { quiet: false }) {
        Commands::Report { quiet } => {
            for state in settings.layout.states() {
                print_state(&tables, &settings.layout, state, quiet)?;
            }
        }
        Commands::Lookup {
            lap,
            position,
            halfway,
        } => {
            let state = RaceState::new(lap, halfway, position, &settings.layout)?;
            print_state(&tables, &settings.layout, state, false)?;
        }
        Commands::Heatmaps { out, item } => {
            let stats = build_stats(&tables, &settings.layout, args.parallel)?;
            let dir = out.unwrap_or(settings.heatmap_dir);
            let items: Vec<ItemId> = match item {
                Some(item) => {
                    if !item.is_applicable() {
                        warn!("{} is not available in normal play", item.name());
                    }
                    vec![item]
                }
                None => ItemId::applicable().collect(),
            };
            for item in items {
                let grid = build_layout_grid(&stats, item, &settings.layout);
                let _ = save_heatmap(&grid, &dir)?;
            }
        }
        Commands::Export { out } => {
            let stats = build_stats(&tables, &settings.layout, args.parallel)?;
            let json = StatsExport::new(settings.layout, &stats)
                .to_json()
                .context("failed to encode statistics")?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("wrote {} records to {}", stats.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn print_state(tables: &ItemTables, layout: &Layout, state: RaceState, quiet: bool) -> Result<()> {
    let start_index = resolve_state(layout, state);
    let slots = trace_wheels(tables, layout, start_index)
        .with_context(|| format!("failed to fetch wheels for {state:?}"))?;
    let stats = aggregate(slots.iter().map(|slot| slot.wheel));

    let report = StateReport::new(state, start_index, slots, stats, layout.wheels_per_state);
    if quiet {
        print!("{}", report.without_wheels());
    } else {
        print!("{report}");
    }
    Ok(())
}

fn build_stats(tables: &ItemTables, layout: &Layout, parallel: bool) -> Result<GlobalStatsTable> {
    let stats = if parallel {
        build_global_stats_parallel(tables, layout)
    } else {
        build_global_stats(tables, layout)
    }
    .context("failed to build statistics table")?;
    info!(
        "evaluated {} race states into {} entries",
        layout.state_count(),
        stats.len()
    );
    Ok(stats)
}

fn parse_item(value: &str) -> Result<ItemId, String> {
    ItemId::from_hex(value).map_err(|error| error.to_string())
}
