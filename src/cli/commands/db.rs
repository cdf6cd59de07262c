use anyhow::Context;
use clap::Subcommand;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::state::AppState;

const KNOWN_TABLES: &[&str] = &["profiles", "practitioners", "sessions"];

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Fetch a sample row per table and print its columns")]
    Probe {
        #[arg(help = "Table to probe (defaults to all known tables)")]
        table: Option<String>,
    },

    #[command(about = "Run an ad-hoc filtered query against one table")]
    Query {
        #[arg(help = "Table name")]
        table: String,
        #[arg(
            long = "filter",
            help = "Predicate as column=op.value (e.g. phase=eq.waiting), repeatable"
        )]
        filters: Vec<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

pub async fn handle(
    cmd: DbCommands,
    state: &AppState,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Probe { table } => {
            let tables: Vec<String> = match table {
                Some(t) => vec![t],
                None => KNOWN_TABLES.iter().map(|t| t.to_string()).collect(),
            };

            for table in tables {
                let rows: Vec<Value> = state.db.from(&table).limit(1).fetch().await?;
                let mut columns: Vec<&str> = rows
                    .first()
                    .and_then(Value::as_object)
                    .map(|obj| obj.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                columns.sort_unstable();

                match output_format {
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "table": table, "columns": columns })
                    ),
                    OutputFormat::Text => {
                        if columns.is_empty() {
                            println!("{}: (no rows to probe)", table);
                        } else {
                            println!("{}: {}", table, columns.join(", "));
                        }
                    }
                }
            }
            Ok(())
        }
        DbCommands::Query {
            table,
            filters,
            limit,
        } => {
            let mut query = state.db.from(&table).limit(limit);
            for raw in &filters {
                let (column, predicate) = raw
                    .split_once('=')
                    .with_context(|| format!("filter `{raw}` is not column=op.value"))?;
                query = query.filter(column, predicate);
            }

            let rows: Vec<Value> = query.fetch().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                OutputFormat::Text => {
                    for row in &rows {
                        println!("{row}");
                    }
                    println!("({} rows)", rows.len());
                }
            }
            Ok(())
        }
    }
}
