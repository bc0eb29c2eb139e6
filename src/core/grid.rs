//! Rectangular tiling of an area of interest.
//!
//! Ordering contract: candidate cells are generated row-major with the outer
//! loop over `i` (x direction) and the inner loop over `j` (y direction).
//! Surviving cells receive dense, zero-based ids in that order. Downstream
//! stages iterate tiles in id order.
use crate::error::{Error, Result};
use crate::types::TileId;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_left: f64,
    pub x_right: f64,
    pub y_bottom: f64,
    pub y_top: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.x_right - self.x_left
    }

    pub fn height(&self) -> f64 {
        self.y_top - self.y_bottom
    }

    /// Closed-interval overlap; shared edges count as intersecting.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.x_left <= other.x_right
            && other.x_left <= self.x_right
            && self.y_bottom <= other.y_top
            && other.y_bottom <= self.y_top
    }

    /// Closed ring, counter-clockwise from the lower-left corner.
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.x_left, self.y_bottom),
            (self.x_right, self.y_bottom),
            (self.x_right, self.y_top),
            (self.x_left, self.y_top),
            (self.x_left, self.y_bottom),
        ]
    }

    pub fn to_wkt(&self) -> String {
        let coords: Vec<String> = self
            .ring()
            .iter()
            .map(|(x, y)| format!("{} {}", x, y))
            .collect();
        format!("POLYGON (({}))", coords.join(","))
    }
}

/// One persisted grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTile {
    pub id: u32,
    pub tile: TileId,
    /// Polygon footprint as well-known text
    pub footprint_wkt: String,
}

/// Candidate cell `(i, j)` of an `nx × ny` division of `extent`.
pub fn cell_bounds(extent: &Extent, nx: u32, ny: u32, i: u32, j: u32) -> Extent {
    let w = extent.width() / nx as f64;
    let h = extent.height() / ny as f64;
    let x = extent.x_left + i as f64 * w;
    let y = extent.y_bottom + j as f64 * h;
    Extent {
        x_left: x,
        x_right: x + w,
        y_bottom: y,
        y_top: y + h,
    }
}

/// Divide `extent` into `nx × ny` cells and keep those for which
/// `intersects` holds, numbering survivors densely in generation order.
pub fn plan_grid<F>(extent: &Extent, nx: u32, ny: u32, mut intersects: F) -> Result<Vec<GridTile>>
where
    F: FnMut(&Extent) -> Result<bool>,
{
    if nx == 0 {
        return Err(Error::InvalidArgument {
            arg: "grid_x",
            value: nx.to_string(),
        });
    }
    if ny == 0 {
        return Err(Error::InvalidArgument {
            arg: "grid_y",
            value: ny.to_string(),
        });
    }

    let mut tiles = Vec::new();
    let mut id = 0;
    for i in 0..nx {
        for j in 0..ny {
            let cell = cell_bounds(extent, nx, ny, i, j);
            if !intersects(&cell)? {
                continue;
            }
            tiles.push(GridTile {
                id,
                tile: TileId::new(i, j),
                footprint_wkt: cell.to_wkt(),
            });
            id += 1;
        }
    }
    Ok(tiles)
}
