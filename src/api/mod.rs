//! High-level entry points: run the whole single-orbit pipeline from a
//! `PipelineConfig`, with the real engine and GDAL or with caller-supplied
//! implementations of the external collaborators.
use std::path::Path;

use tracing::{error, info};

use crate::core::assembly::assemble_products;
use crate::core::calibration::calibrate_dates;
use crate::core::grid::GridTile;
use crate::core::grouping::{Grouping, group_acquisitions};
use crate::core::layout::Layout;
use crate::core::params::PipelineConfig;
use crate::core::stacking::stack_tiles;
use crate::core::tiling::{calibrated_dates, cut_tiles};
use crate::error::{Error, Result};
use crate::io::vector::ensure_grid;
use crate::io::{ArtifactStore, GdalRaster, GptEngine, ProcessingEngine, RasterLibrary, RunLedger};
use crate::types::Stage;

/// Counts of the work done by one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub grid_tiles: usize,
    pub extracted: usize,
    pub calibrated: usize,
    pub dates: usize,
    pub subimages: usize,
    pub stacked: usize,
    pub assembled_tiles: usize,
    pub products: usize,
}

/// Source of the tile grid: built from the AOI, or supplied directly.
pub enum GridSource<'a> {
    /// Build `grid` from `aoi` if absent, then read it back
    Vector { aoi: &'a Path, grid: &'a Path },
    Tiles(Vec<GridTile>),
}

/// Create the working directories and an empty ledger if they are missing.
pub fn prepare_layout(layout: &Layout, store: &ArtifactStore) -> Result<()> {
    store.create_dir(&layout.download)?;
    store.create_dir(&layout.preprocessing)?;
    store.create_dir(&layout.tiles)?;
    store.create_dir(&layout.result)?;
    store.create_file(&layout.ledger())
}

/// Run all stages with SNAP `gpt` and GDAL as configured.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;
    let engine = GptEngine::new(config.gpt_command(), config.graph_dir());
    let aoi = config.resolve(&config.aoi);
    let grid = config.resolve(&config.grid);
    run_pipeline_with(
        config,
        GridSource::Vector {
            aoi: &aoi,
            grid: &grid,
        },
        &engine,
        &GdalRaster,
    )
}

/// Run all stages in order. Each stage finishes for every date and tile
/// before the next begins. On failure the error names the failing stage and
/// the last one that completed.
pub fn run_pipeline_with<E, R>(
    config: &PipelineConfig,
    grid_source: GridSource<'_>,
    engine: &E,
    raster: &R,
) -> Result<RunReport>
where
    E: ProcessingEngine + ?Sized,
    R: RasterLibrary + ?Sized,
{
    let layout = Layout::from_config(config);
    let store = ArtifactStore::new();
    let mut report = RunReport::default();
    let mut completed: Option<Stage> = None;

    let checkpoint = |stage: Stage, completed: Option<Stage>| {
        move |source: Error| {
            error!("Run halted in {} stage: {}", stage, source);
            Error::StageFailed {
                stage,
                completed,
                source: Box::new(source),
            }
        }
    };

    let grid = (|| -> Result<Vec<GridTile>> {
        prepare_layout(&layout, &store)?;
        match grid_source {
            GridSource::Vector { aoi, grid } => ensure_grid(aoi, grid, config.grid_x, config.grid_y),
            GridSource::Tiles(tiles) => Ok(tiles),
        }
    })()
    .map_err(checkpoint(Stage::Grid, completed))?;
    report.grid_tiles = grid.len();
    info!("Grid: {} tile(s)", grid.len());
    completed = Some(Stage::Grid);

    let grouping = (|| -> Result<Grouping> {
        let mut ledger = RunLedger::open(&layout.ledger())?;
        group_acquisitions(&layout, &store, &mut ledger, &config.archive_suffix)
    })()
    .map_err(checkpoint(Stage::Grouping, completed))?;
    report.extracted = grouping.extracted;
    completed = Some(Stage::Grouping);

    report.calibrated = calibrate_dates(&layout, &store, engine, &grouping.groups)
        .map_err(checkpoint(Stage::Calibration, completed))?;
    completed = Some(Stage::Calibration);

    let dates = calibrated_dates(&layout, &store).map_err(checkpoint(Stage::Tiling, completed))?;
    report.dates = dates.len();
    report.subimages = cut_tiles(&layout, &store, engine, &grid, &dates)
        .map_err(checkpoint(Stage::Tiling, completed))?;
    completed = Some(Stage::Tiling);

    report.stacked = stack_tiles(&layout, &store, engine, &grid, &dates)
        .map_err(checkpoint(Stage::Stacking, completed))?;
    completed = Some(Stage::Stacking);

    let assembly = assemble_products(&layout, &store, raster)
        .map_err(checkpoint(Stage::Assembly, completed))?;
    report.assembled_tiles = assembly.tiles;
    report.products = assembly.products;

    info!(
        "Run complete: {} date(s), {} sub-image(s), {} tile(s) stacked, {} product(s)",
        report.dates, report.subimages, report.stacked, report.products
    );
    Ok(report)
}
