use std::path::PathBuf;

use clap::Parser;

/// Infer the body type (`tipo_vehiculo`) of every vehicle in a spreadsheet.
///
/// Writes `<name>-inferido.<ext>` next to the input and keeps
/// `<name>-progreso.txt` updated while running.
#[derive(Debug, Parser)]
#[command(name = "inferidor", version)]
pub struct Cli {
    /// Spreadsheet to classify (.xlsx or .csv)
    pub input: PathBuf,

    /// TOML config file (defaults to ./inferidor.toml when present)
    #[arg(long, env = "INFERIDOR_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Identifier embedded in the progress file name, for concurrent runs on one input
    #[arg(long)]
    pub run_id: Option<String>,
}
