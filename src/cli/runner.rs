use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use orbitstack::{PipelineConfig, run_pipeline};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let config_path = args.config.ok_or(AppError::MissingArgument {
        arg: "--config".to_string(),
    })?;
    if !config_path.is_file() {
        return Err(AppError::ConfigNotFound { path: config_path }.into());
    }

    let config = PipelineConfig::load(&config_path).map_err(AppError::from)?;
    info!("Root directory: {:?}", config.root);
    info!("Grid: {}x{} over {:?}", config.grid_x, config.grid_y, config.aoi);

    match run_pipeline(&config) {
        Ok(report) => {
            info!("Pipeline complete!");
            info!("Archives extracted: {}", report.extracted);
            info!("Dates calibrated: {}", report.calibrated);
            info!("Tiles stacked: {}", report.stacked);
            info!("Products written: {}", report.products);
            Ok(())
        }
        Err(e) => {
            warn!("Rerun after fixing the cause; finished artifacts are reused");
            Err(AppError::from(e).into())
        }
    }
}
