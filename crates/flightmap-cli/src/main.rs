// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flightmap_core::builder::{build_points, build_routes};
use flightmap_core::locator::locate_flight_array;
use flightmap_core::render::RecordingAdapter;
use flightmap_core::report::Report;
use flightmap_core::{AirportDirectory, Dataset, FlightmapConfig, ViewMode, ViewState};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the JSON snapshots
    #[arg(short, long, env = "FLIGHTMAP_DATA")]
    data: Option<PathBuf>,

    /// Fetch snapshots from this base URL instead of a directory
    #[arg(long)]
    url: Option<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ViewArgs {
    #[arg(long)]
    radius: Option<u32>,
    #[arg(long)]
    blur: Option<u32>,
    #[arg(long)]
    max_routes: Option<usize>,
    #[arg(long)]
    route_strength: Option<f64>,
    /// airports, routes or combined
    #[arg(long)]
    mode: Option<ViewMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print KPIs and the top airports/countries/routes
    Stats {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
        /// Rows per table (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print the layer plan the map view would draw
    Render {
        #[command(flatten)]
        view: ViewArgs,
        /// Parameter edits applied after the initial render, e.g. `--set radius=40`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        edits: Vec<String>,
    },
    /// Generate flights_points.json, airports_missing.json and flights_routes.json
    Build {
        /// Flight log payload (any wrapper layout)
        #[arg(long)]
        flights: PathBuf,
        /// Airport directory (airports.json)
        #[arg(long)]
        airports: PathBuf,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
    /// Convert an OurAirports airports.csv into airports.json
    Airports {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => FlightmapConfig::load(path)?,
        None => FlightmapConfig::default(),
    };
    if let Some(dir) = &cli.data {
        config.data_dir = dir.clone();
        config.base_url = None;
    }
    if let Some(url) = &cli.url {
        config.base_url = Some(url.clone());
    }
    log::debug!(
        "Effective config — data_dir={} base_url={:?} top_n={}",
        config.data_dir.display(),
        config.base_url,
        config.top_n
    );

    match cli.command {
        Commands::Stats { json, top } => {
            let dataset = load(&config)?;
            let report = Report::compute(&dataset, top.unwrap_or(config.top_n));
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, &config);
            }
        }
        Commands::Render { view, edits } => {
            apply_view_args(&mut config, &view);
            let dataset = load(&config)?;
            let mut state = ViewState::new(
                &dataset.points,
                dataset.routes.clone(),
                config.view.clone(),
                config.render.clone(),
                RecordingAdapter::new(),
            )?;
            for edit in &edits {
                let (name, value) = edit
                    .split_once('=')
                    .with_context(|| format!("Expected NAME=VALUE, got '{}'", edit))?;
                state.set_parameter(name.trim(), value)?;
            }
            println!("{}", serde_json::to_string_pretty(state.adapter())?);
        }
        Commands::Build {
            flights,
            airports,
            out,
        } => build(&flights, &airports, &out)?,
        Commands::Airports { csv, out } => {
            let directory = AirportDirectory::parse_ourairports_file(&csv)
                .with_context(|| format!("Failed to import {}", csv.display()))?;
            write_json(&out, &directory)?;
            println!("Wrote {} ({} airports)", out.display(), directory.len());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_target_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

fn load(config: &FlightmapConfig) -> Result<Dataset> {
    let source = config.source()?;
    Dataset::load(&source, &config.files).context("Could not load flight map data")
}

fn apply_view_args(config: &mut FlightmapConfig, args: &ViewArgs) {
    let view = &mut config.view;
    if let Some(v) = args.radius {
        view.radius = v;
    }
    if let Some(v) = args.blur {
        view.blur = v;
    }
    if let Some(v) = args.max_routes {
        view.max_routes = v;
    }
    if let Some(v) = args.route_strength {
        view.route_strength = v;
    }
    if let Some(v) = args.mode {
        view.mode = v;
    }
}

fn print_report(report: &Report, config: &FlightmapConfig) {
    let sep = config.locale.thousands_separator();

    for (label, value) in report.kpis(config.locale) {
        println!("{:<16} {}", label, value);
    }

    let tables = [
        ("Top airports", &report.top_airports),
        ("Top countries", &report.top_countries),
        ("Top routes", &report.top_routes),
    ];
    for (title, rows) in tables {
        println!();
        println!("{}", title);
        for row in rows.iter() {
            println!(
                "  {:<12} {:>10}",
                row.label,
                flightmap_core::report::format_int(row.value, sep)
            );
        }
    }
}

fn build(flights_path: &Path, airports_path: &Path, out: &Path) -> Result<()> {
    let flights_text = fs::read_to_string(flights_path)
        .with_context(|| format!("Missing input: {}", flights_path.display()))?;
    let airports_text = fs::read_to_string(airports_path).with_context(|| {
        format!(
            "Missing input: {} (run `flightmap airports` first)",
            airports_path.display()
        )
    })?;

    let payload: serde_json::Value =
        serde_json::from_str(&flights_text).context("Failed to parse flights payload")?;
    let directory: AirportDirectory =
        serde_json::from_str(&airports_text).context("Failed to parse airport directory")?;

    let flights = locate_flight_array(&payload);
    let points = build_points(flights, &directory);
    let routes = build_routes(flights, &directory);

    fs::create_dir_all(out).context("Failed to create output directory")?;
    write_json(&out.join("flights_points.json"), &points.points)?;
    write_json(&out.join("airports_missing.json"), &points.missing)?;
    write_json(&out.join("flights_routes.json"), &routes)?;

    println!("segments: {}", flights.len());
    println!("points: {}", points.points.len());
    println!("routes: {}", routes.len());
    println!("missing airports: {}", points.missing.len());
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content + "\n").with_context(|| format!("Failed to write {}", path.display()))
}
