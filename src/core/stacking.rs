//! Multi-temporal stacking: one joint speckle-filter run per tile over all of
//! its date sub-images, which are consumed by the run.
use tracing::{info, warn};

use crate::core::grid::GridTile;
use crate::core::layout::Layout;
use crate::error::{Error, Result};
use crate::io::{ArtifactStore, EngineRequest, Graph, ProcessingEngine};
use crate::types::{AcquisitionDate, TileId};

/// Filter request for one tile; `sources` keep the order of `dates`.
pub fn filter_request(layout: &Layout, tile: TileId, dates: &[AcquisitionDate]) -> EngineRequest {
    EngineRequest::new(Graph::MultitemporalFilter)
        .path_param("output", &layout.filtered_target(tile))
        .path_param("outputLog", &layout.filtered_db_target(tile))
        .sources(dates.iter().map(|&d| layout.tile_subimage(tile, d)))
}

/// Run the multi-temporal filter for every tile, then delete the tile's
/// per-date sub-images. Returns the number of tiles filtered.
///
/// A tile with none of its sub-images left and an existing dB stack was
/// filtered by an earlier run and is skipped. A tile with only some of its
/// sub-images is an error: the filter cannot be applied incrementally.
pub fn stack_tiles<E: ProcessingEngine + ?Sized>(
    layout: &Layout,
    store: &ArtifactStore,
    engine: &E,
    grid: &[GridTile],
    dates: &[AcquisitionDate],
) -> Result<usize> {
    if dates.is_empty() {
        warn!("No calibrated dates; nothing to stack");
        return Ok(0);
    }

    let mut stacked = 0;
    for tile in grid {
        let tile = tile.tile;
        let inputs: Vec<_> = dates
            .iter()
            .map(|&d| (d, layout.tile_subimage(tile, d)))
            .collect();
        let missing: Vec<_> = inputs.iter().filter(|(_, p)| !store.exists(p)).collect();

        if missing.len() == inputs.len() {
            if store.exists(&layout.filtered_db_product(tile)) {
                info!("Tile {} already stacked", tile);
            } else {
                warn!("Tile {} has no sub-images to stack", tile);
            }
            continue;
        }
        if let Some((date, path)) = missing.first() {
            return Err(Error::MissingSubImage {
                tile: tile.to_string(),
                date: date.to_string(),
                path: path.clone(),
            });
        }

        info!("Filtering tile {} over {} date(s)", tile, dates.len());
        engine
            .run(&filter_request(layout, tile, dates))
            .map_err(|e| Error::engine(format!("tile {}", tile), e))?;
        if !store.exists(&layout.filtered_db_product(tile)) {
            return Err(Error::MissingEngineOutput(layout.filtered_db_product(tile)));
        }

        for (_, subimage) in &inputs {
            store.delete_dimap(subimage)?;
        }
        stacked += 1;
    }
    Ok(stacked)
}
