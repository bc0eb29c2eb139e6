//! I/O layer: the filesystem artifact store, run ledger, archive extraction,
//! SAFE manifest reading, GDAL vector/raster adapters and the external
//! processing engine.
pub mod archive;
pub mod engine;
pub mod gdal;
pub mod ledger;
pub mod manifest;
pub mod store;
pub mod vector;

pub use self::engine::{EngineError, EngineRequest, GptEngine, Graph, ProcessingEngine};
pub use self::gdal::{GdalRaster, RasterBand, RasterLibrary};
pub use self::ledger::RunLedger;
pub use self::store::ArtifactStore;
