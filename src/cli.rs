use std::path::PathBuf;

use clap::{Parser, Subcommand};
use osm_shaper::audit::AuditReport;

#[derive(Parser)]
#[command(name = "osm_shaper", version, about = "Shape an OSM export into CSV tables")]
pub struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true, default_value = "config/austin_sample.json")]
    pub config: PathBuf,

    /// Source document, overriding `data_path` from the configuration.
    #[arg(short, long, global = true)]
    pub input: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the nine CSV tables into the destination directory.
    Process {
        /// Rebuild the tables even if they already exist.
        #[arg(long)]
        force: bool,
    },
    /// Write a smaller document holding every k-th entity. An existing sample
    /// is reused only when it was taken with the same interval.
    Sample {
        /// Keep every k-th entity, overriding `sample_every`.
        #[arg(short = 'k', long)]
        every: Option<usize>,

        /// Rebuild the sample even if one with this interval exists.
        #[arg(long)]
        force: bool,
    },
    /// Print an audit report as JSON.
    Audit {
        #[arg(value_enum)]
        report: AuditReport,
    },
}
