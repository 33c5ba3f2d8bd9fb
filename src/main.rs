//! bikegarage - bicycle component wear and maintenance tracking.
//!
//! Command-line front end over the library stores: create a garage, log
//! rides, and work through the due-for-service list.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bikegarage::alerts::evaluator::NotificationSink;
use bikegarage::format;
use bikegarage::garage::bike_store::BikeStore;
use bikegarage::garage::catalog;
use bikegarage::garage::component_store::ComponentStore;
use bikegarage::garage::types::{Bike, ComponentKind};
use bikegarage::rides::aggregator::RideAggregator;
use bikegarage::rides::types::{Ride, RideSource};
use bikegarage::service::due_list::{DueListFilter, DueListPlanner, SortOrder};
use bikegarage::storage::database::Database;

#[derive(Parser)]
#[command(name = "bikegarage", version, about = "Bicycle component wear and maintenance tracking")]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a bike and seed its default parts
    Init {
        /// Bike name
        name: String,
        #[arg(long, default_value = "")]
        make: String,
        #[arg(long, default_value = "")]
        model: String,
        /// Skip seeding the default parts catalog
        #[arg(long)]
        no_seed: bool,
    },
    /// Log a completed ride and roll it into the wear totals
    Ride {
        /// Bike id
        #[arg(long)]
        bike: i64,
        /// Distance in km
        #[arg(long)]
        distance: f64,
        /// Duration as H:MM:SS, M:SS, or seconds
        #[arg(long)]
        duration: String,
        #[arg(long, default_value_t = 0.0)]
        max_speed: f64,
        #[arg(long, default_value_t = 0.0)]
        elev_gain: f64,
        #[arg(long, default_value_t = 0.0)]
        elev_loss: f64,
    },
    /// List components due for service
    Due {
        #[arg(long)]
        bike: Option<i64>,
        /// Component kind key, e.g. "chain" or "brake_pads"
        #[arg(long)]
        kind: Option<String>,
        /// Substring match on component names
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Health)]
        sort: SortArg,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Mark components as replaced
    Replace {
        /// Component ids
        ids: Vec<i64>,
    },
    /// Mark components' inspections as complete
    Inspect {
        /// Component ids
        ids: Vec<i64>,
    },
    /// Print the plain-text health summary for a bike
    Summary {
        /// Bike id
        bike: i64,
    },
    /// List the suggested component types and their default lifespans
    Types,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    TypeAz,
    NextService,
    Health,
}

impl std::fmt::Display for SortArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortArg::TypeAz => "type-az",
            SortArg::NextService => "next-service",
            SortArg::Health => "health",
        };
        write!(f, "{name}")
    }
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::TypeAz => SortOrder::TypeAz,
            SortArg::NextService => SortOrder::NextService,
            SortArg::Health => SortOrder::Health,
        }
    }
}

/// Alerts print to stderr; the CLI has no push channel.
struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&self, title: &str, body: &str) {
        eprintln!("[alert] {title}: {body}");
    }
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "bikegarage", "BikeGarage")
        .map(|dirs| dirs.data_dir().join("garage.db"))
        .unwrap_or_else(|| PathBuf::from("garage.db"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(default_db_path);
    let db = Database::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let conn = db.connection();

    match cli.command {
        Command::Init {
            name,
            make,
            model,
            no_seed,
        } => {
            let mut bike = Bike::new(name);
            bike.make = make;
            bike.model = model;
            let bike_id = BikeStore::new(conn).insert(&bike)?;
            println!("Created bike {bike_id}: {}", bike.name);
            if !no_seed {
                let seeded = ComponentStore::new(conn).seed_defaults_if_empty(bike_id)?;
                println!("Seeded {seeded} default parts");
            }
        }
        Command::Ride {
            bike,
            distance,
            duration,
            max_speed,
            elev_gain,
            elev_loss,
        } => {
            let seconds = format::parse_duration_seconds(&duration)
                .ok_or_else(|| anyhow!("Invalid duration: {duration}"))?;
            let ended_at = Utc::now();
            let mut ride = Ride::new(
                Some(bike),
                ended_at - chrono::Duration::seconds(seconds),
                ended_at,
            );
            ride.distance_km = distance;
            ride.duration_ms = seconds * 1000;
            ride.max_speed_kmh = max_speed;
            ride.avg_speed_kmh = if seconds > 0 {
                distance / (seconds as f64 / 3600.0)
            } else {
                0.0
            };
            ride.elev_gain_m = elev_gain;
            ride.elev_loss_m = elev_loss;
            ride.source = RideSource::Manual;

            let outcome = RideAggregator::new(conn).apply_notifying(&ride, &StderrSink)?;
            println!(
                "Recorded ride {} ({distance} km, {}); {} components updated",
                outcome.ride_id,
                format::format_duration_seconds(seconds),
                outcome.components_updated
            );
        }
        Command::Due {
            bike,
            kind,
            search,
            sort,
            json,
        } => {
            let filter = DueListFilter {
                bike_id: bike,
                kind: kind.as_deref().map(ComponentKind::parse),
                search,
            };
            let items = DueListPlanner::new(conn).build_due_list(&filter, sort.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("Nothing due for service");
            } else {
                for item in &items {
                    println!(
                        "#{:<4} {:<24} {:>3}%  {}",
                        item.component.id,
                        item.component.name,
                        item.health_percent,
                        item.next_service.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Command::Replace { ids } => {
            let outcome = DueListPlanner::new(conn).replace_selected(&ids, Utc::now())?;
            println!("Replaced {} components", outcome.completed);
            for (id, reason) in &outcome.failures {
                eprintln!("Component {id} failed: {reason}");
            }
        }
        Command::Inspect { ids } => {
            let outcome = DueListPlanner::new(conn).inspect_selected(&ids)?;
            println!("Marked {} inspections complete", outcome.completed);
            for (id, reason) in &outcome.failures {
                eprintln!("Component {id} failed: {reason}");
            }
        }
        Command::Summary { bike } => {
            print!("{}", DueListPlanner::new(conn).health_summary(bike)?);
        }
        Command::Types => {
            for suggestion in catalog::suggested_types() {
                let lifespan = if suggestion.default_lifespan_km > 0.0 {
                    format!("{:.0} km", suggestion.default_lifespan_km)
                } else {
                    "time-based".to_string()
                };
                println!(
                    "{:<24} {:<28} {lifespan}",
                    suggestion.kind.as_str(),
                    suggestion.display_name
                );
            }
        }
    }

    Ok(())
}
