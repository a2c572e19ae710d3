use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prepare county-level vehicle, population, income and accident statistics",
    long_about = None
)]
pub struct Cli {
    /// Data directory containing raw/, interim/ and processed/
    #[arg(long = "data-dir", default_value = "data")]
    pub data_dir: PathBuf,
    /// YAML file overriding source files, column specs, category remaps or backfill rules
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Print a column profile of the combined table
    #[arg(long)]
    pub profile: bool,
    /// Number of combined rows to print after the run
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}
