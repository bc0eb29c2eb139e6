use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "orbitstack",
    version,
    about = "Single-orbit Sentinel-1 GRD batch pipeline"
)]
pub struct CliArgs {
    /// JSON run configuration (root, AOI, grid size, gpt path, directory names)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
