// Moves staff events between the legacy staff_locations.csv format and the SQLite store.
// Usage: cargo run --bin fieldtrack-csv -- import staff_locations.csv
//        cargo run --bin fieldtrack-csv -- export out.csv --staff-id staff1

use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldtrack_core::{csv_io, EventLog, SqliteEventStore, StaffId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fieldtrack-csv", about = "Import or export staff events as CSV")]
struct Cli {
    /// SQLite database file (defaults to DATABASE_PATH or fieldtrack.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append every row of a CSV file to the store
    Import { csv: PathBuf },
    /// Write stored events to a CSV file
    Export {
        csv: PathBuf,
        #[arg(long)]
        staff_id: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldtrack_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let db = match cli.db {
        Some(path) => path,
        None => fieldtrack_api::Config::from_env()?.database_path,
    };
    let store = SqliteEventStore::open(&db).with_context(|| format!("opening {}", db.display()))?;

    match cli.command {
        Command::Import { csv } => {
            let events = csv_io::read_file(&csv).with_context(|| format!("reading {}", csv.display()))?;
            let count = csv_io::import_into(&store, events)?;
            println!("Imported {} events into {}", count, db.display());
        }
        Command::Export { csv, staff_id } => {
            let events = match staff_id {
                Some(raw) => store.history_for(&StaffId::parse(&raw)?)?,
                None => store.all_events()?,
            };
            csv_io::write_file(&csv, &events).with_context(|| format!("writing {}", csv.display()))?;
            println!("Exported {} events to {}", events.len(), csv.display());
        }
    }
    Ok(())
}
