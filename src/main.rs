//! incidencias CLI: incident record store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use incidencias::config::AppConfig;
use incidencias::convert::csv_to_store;
use incidencias::export::ExportMode;
use incidencias::mutate::EditableField;
use incidencias::record::{Record, fields};
use incidencias::session::{Session, SessionConfig};

#[derive(Parser)]
#[command(name = "incidencias", version, about = "Incident record store")]
struct Cli {
    /// Config file (defaults to ./incidencias.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record store location; overrides the config file.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV export into the hierarchical record store.
    Convert {
        /// Path to the CSV file with a header row.
        #[arg(long)]
        input: PathBuf,
    },

    /// List valid records, optionally filtered by a field value.
    List {
        /// Field selector (tipo, prioridad, ubicación, or a raw tag).
        #[arg(long)]
        field: Option<String>,

        /// Value to filter on; use "(sin <field>)" for empty values.
        #[arg(long, requires = "field")]
        value: Option<String>,
    },

    /// Grouped frequency counts over one field.
    By {
        /// Field selector (tipo, prioridad, ubicación, or a raw tag).
        field: String,
    },

    /// General statistics: temporal breakdown plus the main groupings.
    Stats,

    /// Edit one record's priority or type.
    Set {
        /// Record identity.
        #[arg(long)]
        id: String,

        /// Editable field: priority (prioridad) or type (tipo).
        #[arg(long)]
        field: String,

        /// New text value.
        #[arg(long)]
        value: String,
    },

    /// Export the valid set to the secondary JSON collection.
    Export {
        /// Destination; overrides the config file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export mode: create, overwrite, or merge.
        #[arg(long, default_value = "create")]
        mode: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;
    let store_path = cli.store.unwrap_or(config.store_path);

    match cli.command {
        Commands::Convert { input } => {
            let report = csv_to_store(&input, &store_path).into_diagnostic()?;
            println!(
                "Converted {} records ({} fields each) into {}",
                report.records,
                report.fields,
                store_path.display()
            );
        }

        Commands::List { field, value } => {
            let session = open_session(store_path)?;
            match (field, value) {
                (Some(name), Some(value)) => {
                    let (tag, label) = resolve_field(&name);
                    let hits = session.filter_by(tag, label, &value);
                    println!("Resultados: {label} = {value} ({})", hits.len());
                    print_table(hits.into_iter());
                }
                (Some(name), None) => {
                    let (tag, label) = resolve_field(&name);
                    for group in session.count_by(tag, label) {
                        let hits = session.filter_by(tag, label, &group.value);
                        println!("{label} = {} ({})", group.value, group.count);
                        print_table(hits.into_iter());
                        println!();
                    }
                }
                _ => {
                    println!("Registros válidos: {}", session.valid().len());
                    print_table(session.valid().iter());
                }
            }
        }

        Commands::By { field } => {
            let session = open_session(store_path)?;
            let (tag, label) = resolve_field(&field);
            let groups = session.count_by(tag, label);
            println!("Incidencias por {label} ({} registros)", session.valid().len());
            for group in &groups {
                println!(
                    "  {:<28} {:>3}% | {} items",
                    group.value, group.pct, group.count
                );
            }
        }

        Commands::Stats => {
            let session = open_session(store_path)?;
            let breakdown = session.breakdown();
            println!("Distribución temporal ({} registros)", breakdown.total());
            println!(
                "  descartadas (futuras):  {:>3}% | {}",
                breakdown.future_pct(),
                breakdown.future
            );
            println!(
                "  sin fecha/hora:         {:>3}% | {}",
                breakdown.undated_pct(),
                breakdown.undated
            );
            println!(
                "  válidas:                {:>3}% | {}",
                breakdown.valid_pct(),
                breakdown.valid
            );

            for (tag, label) in [
                (fields::INCIDENT_TYPE, "tipo"),
                (fields::PRIORITY, "prioridad"),
                (fields::LOCATION, "ubicación"),
            ] {
                println!("\nPor {label}");
                for group in session.count_by(tag, label) {
                    println!(
                        "  {:<28} {:>3}%  ({})",
                        group.value, group.pct, group.count
                    );
                }
            }
        }

        Commands::Set { id, field, value } => {
            let field: EditableField = field.parse().into_diagnostic()?;
            let mut session = open_session(store_path)?;
            session.set_field(&id, field, &value).into_diagnostic()?;
            println!("Incidencia {id}: {field} = {value}");
        }

        Commands::Export { output, mode } => {
            let mode: ExportMode = mode.parse().into_diagnostic()?;
            let output = output.unwrap_or(config.export_path);
            let session = open_session(store_path)?;
            let report = session.export(&output, mode).into_diagnostic()?;
            println!("Export ({mode}) -> {}", output.display());
            println!("  admitted:     {}", report.admitted);
            println!("  duplicates:   {}", report.skipped_duplicates);
            println!("  unidentified: {}", report.unidentified);
            println!("  total:        {}", report.total);
        }
    }

    Ok(())
}

fn open_session(store_path: PathBuf) -> Result<Session> {
    Session::open(SessionConfig {
        store_path,
        now: chrono::Local::now().naive_local(),
    })
    .into_diagnostic()
}

/// Map a friendly selector to `(store tag, placeholder label)`; unknown
/// selectors are taken as raw tags.
fn resolve_field(name: &str) -> (&str, &str) {
    match name.trim().to_lowercase().as_str() {
        "tipo" | "type" => (fields::INCIDENT_TYPE, "tipo"),
        "prioridad" | "priority" => (fields::PRIORITY, "prioridad"),
        "ubicacion" | "ubicación" | "location" => (fields::LOCATION, "ubicación"),
        "equipo" => (fields::EQUIPMENT_KIND, "equipo"),
        _ => (name, name),
    }
}

fn print_table<'a>(records: impl Iterator<Item = &'a Record>) {
    println!(
        "{:<4} | {:<13} | {:<8} | {:<22} | {:<16} | {:<9} | {}",
        "ID", "Fecha", "Hora", "Tipo", "Ubicación", "Prioridad", "Equipo"
    );
    for record in records {
        println!(
            "{:<4} | {:<13} | {:<8} | {:<22} | {:<16} | {:<9} | {}",
            record.id,
            record.field(fields::DATE),
            record.field(fields::TIME),
            record.field(fields::INCIDENT_TYPE),
            record.field(fields::LOCATION),
            record.field(fields::PRIORITY),
            record.field(fields::EQUIPMENT_NAME),
        );
    }
}
