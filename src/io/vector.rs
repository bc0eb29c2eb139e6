//! GDAL/OGR vector access: the area of interest and the persisted tile grid.
use std::path::Path;

use gdal::vector::{
    FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType,
};
use gdal::{Dataset, DriverManager};
use tracing::{debug, info};

use crate::core::grid::{Extent, GridTile, plan_grid};
use crate::error::{Error, Result};
use crate::types::TileId;

const GRID_DRIVER: &str = "ESRI Shapefile";
const GRID_FIELDS: [&str; 3] = ["id", "i", "j"];

/// Geometry of the first feature of the first layer.
pub fn read_aoi(path: &Path) -> Result<Geometry> {
    let dataset = Dataset::open(path)?;
    let mut layer = dataset.layer(0)?;
    let feature = layer
        .features()
        .next()
        .ok_or_else(|| Error::EmptyAoi(path.to_path_buf()))?;
    let geometry = feature
        .geometry()
        .ok_or_else(|| Error::MissingGeometry {
            path: path.to_path_buf(),
            id: feature.fid().unwrap_or(0),
        })?
        .clone();
    Ok(geometry)
}

pub fn geometry_extent(geometry: &Geometry) -> Extent {
    let env = geometry.envelope();
    Extent {
        x_left: env.MinX,
        x_right: env.MaxX,
        y_bottom: env.MinY,
        y_top: env.MaxY,
    }
}

/// Tile the bounding box of `aoi` into `nx × ny` cells, keeping cells whose
/// rectangle intersects `aoi` (OGR `Intersects`, touching included).
pub fn grid_for_geometry(aoi: &Geometry, nx: u32, ny: u32) -> Result<Vec<GridTile>> {
    let extent = geometry_extent(aoi);
    debug!(
        "AOI extent: x [{}, {}], y [{}, {}]",
        extent.x_left, extent.x_right, extent.y_bottom, extent.y_top
    );
    plan_grid(&extent, nx, ny, |cell| {
        let rect = Geometry::from_wkt(&cell.to_wkt())?;
        Ok(rect.intersects(aoi))
    })
}

/// Persist tiles as polygons with integer `id`, `i`, `j` fields.
pub fn write_grid(path: &Path, tiles: &[GridTile]) -> Result<()> {
    let driver = DriverManager::get_driver_by_name(GRID_DRIVER)?;
    let mut dataset = driver.create_vector_only(path)?;
    let mut layer = dataset.create_layer(LayerOptions {
        name: &layer_name(path),
        ty: OGRwkbGeometryType::wkbPolygon,
        ..Default::default()
    })?;
    layer.create_defn_fields(&[
        ("id", OGRFieldType::OFTInteger),
        ("i", OGRFieldType::OFTInteger),
        ("j", OGRFieldType::OFTInteger),
    ])?;

    for tile in tiles {
        let geometry = Geometry::from_wkt(&tile.footprint_wkt)?;
        layer.create_feature_fields(
            geometry,
            &GRID_FIELDS,
            &[
                FieldValue::IntegerValue(tile.id as i32),
                FieldValue::IntegerValue(tile.tile.i as i32),
                FieldValue::IntegerValue(tile.tile.j as i32),
            ],
        )?;
    }
    info!("Wrote {} grid tiles to {:?}", tiles.len(), path);
    Ok(())
}

/// Load the persisted grid, ordered by tile id. The layer is looked up by the
/// file name without extension.
pub fn read_grid(path: &Path) -> Result<Vec<GridTile>> {
    let dataset = Dataset::open(path)?;
    let mut layer = dataset.layer_by_name(&layer_name(path))?;

    let mut tiles = Vec::new();
    for feature in layer.features() {
        let fid = feature.fid().unwrap_or(0);
        let field = |name: &'static str| -> Result<u32> {
            match feature.field_as_integer_by_name(name)? {
                Some(v) if v >= 0 => Ok(v as u32),
                _ => Err(Error::MissingField {
                    path: path.to_path_buf(),
                    id: fid,
                    field: name,
                }),
            }
        };
        let id = field("id")?;
        let tile = TileId::new(field("i")?, field("j")?);
        let footprint_wkt = feature
            .geometry()
            .ok_or_else(|| Error::MissingGeometry {
                path: path.to_path_buf(),
                id: fid,
            })?
            .wkt()?;
        tiles.push(GridTile {
            id,
            tile,
            footprint_wkt,
        });
    }
    tiles.sort_by_key(|t| t.id);
    Ok(tiles)
}

/// Build the grid from the AOI unless `grid_path` already exists, then load it.
pub fn ensure_grid(aoi_path: &Path, grid_path: &Path, nx: u32, ny: u32) -> Result<Vec<GridTile>> {
    if grid_path.exists() {
        info!("Reusing existing grid {:?}", grid_path);
    } else {
        info!("Building {}x{} grid over {:?}", nx, ny, aoi_path);
        let aoi = read_aoi(aoi_path)?;
        let tiles = grid_for_geometry(&aoi, nx, ny)?;
        if let Some(parent) = grid_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
        }
        write_grid(grid_path, &tiles)?;
    }
    read_grid(grid_path)
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "grid".to_string())
}
