//! Tile cutting: one geometry-bounded subset per (tile, calibrated date).
use tracing::{debug, info};

use crate::core::grid::GridTile;
use crate::core::layout::{DIMAP_EXT, Layout};
use crate::error::{Error, Result};
use crate::io::{ArtifactStore, EngineRequest, Graph, ProcessingEngine};
use crate::types::AcquisitionDate;

/// Calibrated date products found in the preprocessing directory, in date
/// order. Only `.dim` headers whose stem is a `YYYYMMDD` date count.
pub fn calibrated_dates(layout: &Layout, store: &ArtifactStore) -> Result<Vec<AcquisitionDate>> {
    let mut dates = Vec::new();
    for path in store.entries(&layout.preprocessing)? {
        if path.extension().and_then(|e| e.to_str()) != Some(DIMAP_EXT) {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Some(date) = AcquisitionDate::parse_compact(&stem) {
            dates.push(date);
        }
    }
    dates.sort();
    Ok(dates)
}

/// Make a footprint WKT acceptable to the engine's 2-D geometry parser:
/// vertices carrying a zero elevation (`x y 0`) lose the third ordinate and
/// a `Z` dimension marker is dropped.
pub fn georegion_wkt(wkt: &str) -> String {
    let mut out = String::with_capacity(wkt.len());
    let mut vertex = String::new();
    for c in wkt.chars() {
        match c {
            '(' | ')' | ',' => {
                out.push_str(&strip_zero_elevation(&vertex));
                vertex.clear();
                out.push(c);
            }
            _ => vertex.push(c),
        }
    }
    out.push_str(&strip_zero_elevation(&vertex));
    out.replace(" Z ", " ")
}

fn strip_zero_elevation(vertex: &str) -> String {
    let parts: Vec<&str> = vertex.split_whitespace().collect();
    let numeric = parts.iter().all(|p| p.parse::<f64>().is_ok());
    if parts.len() == 3 && numeric && parts[2].parse::<f64>() == Ok(0.0) {
        let lead = &vertex[..vertex.len() - vertex.trim_start().len()];
        format!("{}{} {}", lead, parts[0], parts[1])
    } else {
        vertex.to_string()
    }
}

/// Subset every calibrated date to every grid tile, skipping sub-images that
/// already exist and tiles whose filtered stack is already built. Returns the
/// number of sub-images produced.
pub fn cut_tiles<E: ProcessingEngine + ?Sized>(
    layout: &Layout,
    store: &ArtifactStore,
    engine: &E,
    grid: &[GridTile],
    dates: &[AcquisitionDate],
) -> Result<usize> {
    let mut cut = 0;
    for &date in dates {
        let product = layout.calibrated_product(date);
        info!("Cutting {:?} into {} tile(s)", product, grid.len());
        for tile in grid {
            if store.exists(&layout.filtered_db_product(tile.tile)) {
                debug!("Tile {} already stacked", tile.tile);
                continue;
            }
            store.create_dir(&layout.tile_dir(tile.tile))?;
            let destination = layout.tile_subimage(tile.tile, date);
            if store.exists(&destination) {
                debug!("Sub-image {:?} already present", destination);
                continue;
            }
            let request = EngineRequest::new(Graph::Subset)
                .path_param("input", &product)
                .param("georegion", georegion_wkt(&tile.footprint_wkt))
                .path_param("output", &destination);
            engine
                .run(&request)
                .map_err(|e| Error::engine(format!("tile {} date {}", tile.tile, date), e))?;
            if !store.exists(&destination) {
                return Err(Error::MissingEngineOutput(destination));
            }
            cut += 1;
        }
    }
    Ok(cut)
}
