#![doc = r#"
ORBITSTACK — single-orbit Sentinel-1 GRD batch orchestrator.

This crate drives ESA SNAP's Graph Processing Tool (`gpt`) and GDAL to turn a
time series of Sentinel-1 GRD archives from one relative orbit into tiled,
multi-temporally filtered GeoTIFF products. Radiometry lives in the engine;
this crate owns the orchestration: tiling the area of interest, extracting
and grouping archives by acquisition date, keeping repeated runs idempotent,
and fanning tiles and dates out to the engine and back into a result tree.

Requirements
------------
- GDAL development headers and runtime available on your system.
- ESA SNAP with `gpt`, and the four graph templates (`calibration.xml`,
  `assembly_and_calibration.xml`, `subset.xml`, `filter.xml`).
- Rust 2024 edition toolchain.

Pipeline
--------
1. Grid: split the AOI bounding box into `grid_x × grid_y` cells and keep
   those intersecting the AOI (`grid.shp`, built once).
2. Grouping: extract new archives from `download/` into `preprocessings/`,
   record them in `done.txt`, group manifests by acquisition date.
3. Calibration: one `gpt` run per date not yet calibrated.
4. Tiling: one subset per (tile, date) into `tiles/{i}_{j}/`.
5. Stacking: one multi-temporal filter per tile; per-date subsets are deleted.
6. Assembly: per date, VV, VH and VV − VH GeoTIFFs into `result/{i}_{j}/`.

Quick start
-----------
```rust,no_run
use std::path::Path;
use orbitstack::{run_pipeline, PipelineConfig};

fn main() -> orbitstack::Result<()> {
    let config = PipelineConfig::load(Path::new("/data/orbit8/orbitstack.json"))?;
    let report = run_pipeline(&config)?;
    println!("{} products written", report.products);
    Ok(())
}
```

Error handling
--------------
All public functions return `orbitstack::Result<T>`. A failed run returns
`Error::StageFailed`, naming the stage that failed and the last one that
completed; rerunning resumes from the on-disk idempotency markers.

Useful modules
--------------
- [`api`] — run the whole pipeline.
- [`core`] — individual stages, grid planning and artifact layout.
- [`io`] — artifact store, ledger, archive/manifest readers, GDAL and engine adapters.
- [`types`] — `Polarization`, `AcquisitionDate`, `TileId`, `ProductKind`, `Stage`.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use crate::core::grid::{Extent, GridTile};
pub use crate::core::layout::Layout;
pub use crate::core::params::PipelineConfig;
pub use crate::error::{Error, Result};
pub use crate::types::{AcquisitionDate, Polarization, ProductKind, Stage, TileId};

pub use crate::io::{
    ArtifactStore, EngineError, EngineRequest, GdalRaster, GptEngine, Graph, ProcessingEngine,
    RasterLibrary, RunLedger,
};

pub use crate::api::{GridSource, RunReport, run_pipeline, run_pipeline_with};
