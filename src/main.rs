use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::process::ExitCode;

use sat_o_track::config::Config;
use sat_o_track::predict::{ground_track, next_pass, predict_passes};
use sat_o_track::propagate::Propagator;
use sat_o_track::tle::{read_records, Catalog, CatalogEntry};
use sat_o_track::web::run_server;

#[derive(Parser)]
#[command(name = "sat-o-track")]
#[command(about = "Satellite position, ground track and pass predictions")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded satellites
    Satellites,
    /// Parse a TLE file and report each record
    Validate { file: String },
    /// Sub-satellite point at an instant
    Position {
        satellite: String,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
    /// Ground track centred on an instant
    GroundTrack {
        satellite: String,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_duration)]
        window: Option<Duration>,
        #[arg(long, value_parser = parse_duration)]
        step: Option<Duration>,
    },
    /// Next pass over the observer within 24 hours
    NextPass {
        satellite: String,
        #[arg(long, value_parser = parse_time)]
        from: Option<DateTime<Utc>>,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// All passes over the observer in a time range
    Passes {
        satellite: String,
        #[arg(long, value_parser = parse_time)]
        from: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_duration, default_value = "24h")]
        duration: Duration,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// Tracking snapshot for the whole catalog
    Status {
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
    /// Print a fresh snapshot every refresh interval until Ctrl-C
    Watch,
    /// Start the HTTP query interface
    Serve,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Validate { file } => validate(&file),
        Commands::Serve => serve(config),
        Commands::Watch => watch(config),
        command => query(&config, command),
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC3339 time: {}", e))
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let d = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    Duration::from_std(d).map_err(|e| e.to_string())
}

fn validate(path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let records = read_records(&content);
    if records.is_empty() {
        eprintln!("No TLE records found in {}", path);
        return ExitCode::FAILURE;
    }

    let mut failures = 0;
    for record in &records {
        match record.parse() {
            Ok(elements) => println!(
                "  line {}: {} ({}) epoch {} period {:.1} min",
                record.line_number,
                elements.display_name(),
                elements.norad_id,
                elements.epoch.to_rfc3339(),
                elements.period_minutes()
            ),
            Err(e) => {
                failures += 1;
                println!("  line {}: invalid: {}", record.line_number, e);
            }
        }
    }

    if failures > 0 {
        eprintln!("{} invalid record(s)", failures);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn query(config: &Config, command: Commands) -> ExitCode {
    let catalog = match config.load_catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (observer, settings) = match (config.observer(), config.tracking_settings()) {
        (Ok(o), Ok(s)) => (o, s),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Commands::Satellites => {
            let infos: Vec<_> = catalog.entries().map(|e| e.info()).collect();
            to_json(&infos)
        }
        Commands::Position { satellite, at } => {
            with_propagator(config, &catalog, &satellite, |propagator| {
                let position = propagator
                    .position_at(at.unwrap_or_else(Utc::now))
                    .map_err(|e| e.to_string())?;
                to_json(&position)
            })
        }
        Commands::GroundTrack {
            satellite,
            at,
            window,
            step,
        } => with_propagator(config, &catalog, &satellite, |propagator| {
            let track = ground_track(
                propagator,
                at.unwrap_or_else(Utc::now),
                window.unwrap_or(settings.ground_track_window),
                step.unwrap_or(settings.ground_track_step),
            )
            .map_err(|e| e.to_string())?;
            to_json(&track)
        }),
        Commands::NextPass {
            satellite,
            from,
            min_elevation,
        } => with_propagator(config, &catalog, &satellite, |propagator| {
            let pass = next_pass(
                propagator,
                &observer,
                min_elevation.unwrap_or(settings.min_elevation_deg),
                from.unwrap_or_else(Utc::now),
            )
            .map_err(|e| e.to_string())?;
            to_json(&pass)
        }),
        Commands::Passes {
            satellite,
            from,
            duration,
            min_elevation,
        } => with_propagator(config, &catalog, &satellite, |propagator| {
            let start = from.unwrap_or_else(Utc::now);
            let end = start
                .checked_add_signed(duration)
                .ok_or_else(|| "--duration runs past the representable time range".to_string())?;
            let passes = predict_passes(
                propagator,
                &observer,
                min_elevation.unwrap_or(settings.min_elevation_deg),
                start,
                end,
            )
            .map_err(|e| e.to_string())?;
            to_json(&passes)
        }),
        Commands::Status { at } => {
            match config.tracker() {
                Ok(mut tracker) => {
                    to_json(&tracker.snapshot(&catalog, at.unwrap_or_else(Utc::now)))
                }
                Err(e) => Err(e.to_string()),
            }
        }
        Commands::Validate { .. } | Commands::Watch | Commands::Serve => {
            Err("not a query command".to_string())
        }
    };

    match result {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn with_propagator<F>(
    config: &Config,
    catalog: &Catalog,
    satellite: &str,
    f: F,
) -> Result<String, String>
where
    F: FnOnce(&Propagator) -> Result<String, String>,
{
    let entry: &CatalogEntry = catalog
        .find(satellite)
        .ok_or_else(|| format!("unknown satellite: {}", satellite))?;
    let propagator =
        Propagator::new(&entry.elements, config.propagation.model).map_err(|e| e.to_string())?;
    f(&propagator)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

fn serve(config: Config) -> ExitCode {
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn watch(config: Config) -> ExitCode {
    let setup = config.load_catalog().map_err(|e| e.to_string()).and_then(|catalog| {
        let tracker = config.tracker().map_err(|e| e.to_string())?;
        Ok((catalog, tracker))
    });
    let (catalog, mut tracker) = match setup {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let refresh = config.tracking.refresh_interval;
    log::info!(
        "Watching {} satellites every {}",
        catalog.len(),
        humantime::format_duration(refresh)
    );

    rt.block_on(async move {
        let mut interval = tokio::time::interval(refresh);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let snapshot = tracker.snapshot(&catalog, Utc::now());
                    for sat in &snapshot.satellites {
                        let position = match &sat.position {
                            Some(p) => format!(
                                "{:>8.3} {:>9.3} {:>7.1} km",
                                p.latitude_deg, p.longitude_deg, p.altitude_km
                            ),
                            None => "position unavailable".to_string(),
                        };
                        println!(
                            "{:<14} {:<8} {:<10} {}",
                            sat.name, sat.status, sat.next_pass_label, position
                        );
                    }
                    println!();
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Stopping watch");
                    break;
                }
            }
        }
    });

    ExitCode::SUCCESS
}
