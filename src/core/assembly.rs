//! Product assembly: split each tile's filtered dB stack into per-date
//! GeoTIFFs for VV, VH and the VV - VH difference, then drop the tile's
//! working directory.
use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use ndarray::{Array2, Zip};
use tracing::{debug, info, warn};

use crate::core::layout::Layout;
use crate::error::{Error, Result};
use crate::io::{ArtifactStore, RasterLibrary};
use crate::types::{Polarization, ProductKind, TileId};

const BAND_PREFIX: &str = "Sigma0_";
const BAND_EXT: &str = ".img";

fn is_nodata(value: f64, nodata: Option<f64>) -> bool {
    match nodata {
        Some(nd) if nd.is_nan() => value.is_nan(),
        Some(nd) => value == nd,
        None => false,
    }
}

/// Element-wise difference `a - b` with NoData propagation.
///
/// A pixel that is NoData in either input is NoData in the output. The output
/// NoData value is `a`'s, falling back to `b`'s.
pub fn band_difference(
    a: &Array2<f64>,
    a_nodata: Option<f64>,
    b: &Array2<f64>,
    b_nodata: Option<f64>,
) -> Result<(Array2<f64>, Option<f64>)> {
    if a.dim() != b.dim() {
        let ((ar, ac), (br, bc)) = (a.dim(), b.dim());
        return Err(Error::DimensionMismatch(ac, ar, bc, br));
    }
    let nodata = a_nodata.or(b_nodata);
    let mut out = a - b;
    if let Some(nd) = nodata {
        Zip::from(&mut out)
            .and(a)
            .and(b)
            .for_each(|o, &x, &y| {
                if is_nodata(x, a_nodata) || is_nodata(y, b_nodata) {
                    *o = nd;
                }
            });
    }
    Ok((out, nodata))
}

/// Convert a `ddMmmyyyy` band date (e.g. `03Jan2020`) to sortable `YYMMDD`.
pub fn band_date(token: &str) -> Option<String> {
    NaiveDate::parse_from_str(token, "%d%b%Y")
        .ok()
        .map(|d| d.format("%y%m%d").to_string())
}

/// Classify a band file of the dB stack, e.g. `Sigma0_VH_mst_03Jan2020_db.img`.
///
/// Returns `None` for files that are not `Sigma0_<pol>` `.img` rasters of a
/// recognized polarization; a recognized band without a readable date is an
/// error.
pub fn classify_band(file_name: &str, tile: TileId) -> Result<Option<(Polarization, String)>> {
    let Some(stem) = file_name.strip_suffix(BAND_EXT) else {
        return Ok(None);
    };
    let Some(rest) = stem.strip_prefix(BAND_PREFIX) else {
        return Ok(None);
    };
    let Some(pol) = rest.get(..2).and_then(Polarization::from_tag) else {
        return Ok(None);
    };
    let stem = stem.strip_suffix("_db").unwrap_or(stem);
    let token = stem.rsplit('_').next().unwrap_or_default();
    match band_date(token) {
        Some(date) => Ok(Some((pol, date))),
        None => Err(Error::MalformedBandName {
            name: file_name.to_string(),
            tile: tile.to_string(),
            reason: format!("`{}` is not a ddMmmyyyy date", token),
        }),
    }
}

/// Date-indexed band files, one map per polarization.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BandIndex {
    pub vv: BTreeMap<String, PathBuf>,
    pub vh: BTreeMap<String, PathBuf>,
}

impl BandIndex {
    /// Read the `.data` directory of a tile's dB stack.
    pub fn scan(layout: &Layout, store: &ArtifactStore, tile: TileId) -> Result<Self> {
        let dir = layout.filtered_db_bands(tile);
        let names: Vec<String> = store
            .entries(&dir)?
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();

        let mut index = BandIndex::default();
        for name in names {
            match classify_band(&name, tile)? {
                Some((Polarization::Vv, date)) => {
                    index.vv.insert(date, dir.join(&name));
                }
                Some((Polarization::Vh, date)) => {
                    index.vh.insert(date, dir.join(&name));
                }
                None => debug!("Ignoring {} in tile {}", name, tile),
            }
        }
        Ok(index)
    }

    /// Dates present for both polarizations, in date order.
    pub fn paired_dates(&self) -> Vec<String> {
        self.vh
            .keys()
            .filter(|d| self.vv.contains_key(*d))
            .cloned()
            .collect()
    }

    /// Dates present for only one polarization.
    pub fn unpaired_dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = self
            .vv
            .keys()
            .filter(|d| !self.vh.contains_key(*d))
            .chain(self.vh.keys().filter(|d| !self.vv.contains_key(*d)))
            .cloned()
            .collect();
        dates.sort();
        dates
    }
}

/// Write VV, VH and VV - VH products for every paired date of one tile.
/// Returns the number of files written.
pub fn assemble_tile<R: RasterLibrary + ?Sized>(
    layout: &Layout,
    store: &ArtifactStore,
    raster: &R,
    tile: TileId,
) -> Result<usize> {
    let index = BandIndex::scan(layout, store, tile)?;
    let unpaired = index.unpaired_dates();
    if !unpaired.is_empty() {
        warn!(
            "Tile {}: dates {:?} lack one polarization and produce no products",
            tile, unpaired
        );
    }

    store.create_dir(&layout.result_dir(tile))?;
    let mut written = 0;
    for date in index.paired_dates() {
        let vv = &index.vv[&date];
        let vh = &index.vh[&date];
        raster.difference(vv, vh, &layout.product(tile, ProductKind::VvVh, &date))?;
        raster.translate(vh, &layout.product(tile, ProductKind::Vh, &date))?;
        raster.translate(vv, &layout.product(tile, ProductKind::Vv, &date))?;
        written += 3;
    }
    info!("Tile {}: {} product(s) written", tile, written);
    Ok(written)
}

/// Outcome of the assembly stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyReport {
    pub tiles: usize,
    pub products: usize,
    pub skipped: usize,
}

/// Assemble every tile working directory that holds a dB stack, deleting the
/// working directory afterwards. Tile directories are visited in `(i, j)` order.
pub fn assemble_products<R: RasterLibrary + ?Sized>(
    layout: &Layout,
    store: &ArtifactStore,
    raster: &R,
) -> Result<AssemblyReport> {
    let mut tiles: Vec<TileId> = Vec::new();
    if store.exists(&layout.tiles) {
        for path in store.entries(&layout.tiles)? {
            if !path.is_dir() {
                continue;
            }
            let name = path.file_name().map(|n| n.to_string_lossy().to_string());
            if let Some(tile) = name.as_deref().and_then(TileId::parse) {
                tiles.push(tile);
            }
        }
    }
    tiles.sort();

    let mut report = AssemblyReport::default();
    for tile in tiles {
        if !store.exists(&layout.filtered_db_bands(tile)) {
            warn!("Tile {} has no filtered dB stack; leaving it in place", tile);
            report.skipped += 1;
            continue;
        }
        report.products += assemble_tile(layout, store, raster, tile)?;
        report.tiles += 1;
        info!("Removing {:?}", layout.tile_dir(tile));
        store.delete(&layout.tile_dir(tile))?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn difference_is_exact() {
        let vv = array![[-7.5, -10.0], [0.0, 3.25]];
        let vh = array![[-15.0, -12.5], [-1.0, 3.25]];
        let (d, nodata) = band_difference(&vv, None, &vh, None).unwrap();
        assert_eq!(d, array![[7.5, 2.5], [1.0, 0.0]]);
        assert_eq!(nodata, None);
    }

    #[test]
    fn difference_rejects_shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            band_difference(&a, None, &b, None),
            Err(Error::DimensionMismatch(3, 2, 2, 3))
        ));
    }

    #[test]
    fn nodata_in_either_band_masks_the_difference() {
        let vv = array![[0.0, -7.5], [-9.0, -6.0]];
        let vh = array![[-15.25, -15.25], [-9999.0, -12.0]];
        let (d, nodata) = band_difference(&vv, Some(0.0), &vh, Some(-9999.0)).unwrap();
        assert_eq!(nodata, Some(0.0));
        assert_eq!(d, array![[0.0, 7.75], [0.0, 6.0]]);

        let nan = array![[f64::NAN, -7.5]];
        let (d, nodata) = band_difference(&nan, Some(f64::NAN), &array![[-1.0, -1.0]], None).unwrap();
        assert!(nodata.is_some_and(f64::is_nan));
        assert!(d[[0, 0]].is_nan());
        assert_eq!(d[[0, 1]], -6.5);
    }

    #[test]
    fn month_name_dates_become_yymmdd() {
        assert_eq!(band_date("03Jan2020").as_deref(), Some("200103"));
        assert_eq!(band_date("28Dec2019").as_deref(), Some("191228"));
        assert_eq!(band_date("31Feb2020"), None);
    }

    #[test]
    fn band_names_are_classified() {
        let tile = TileId::new(0, 1);
        assert_eq!(
            classify_band("Sigma0_VH_mst_03Jan2020_db.img", tile).unwrap(),
            Some((Polarization::Vh, "200103".to_string()))
        );
        assert_eq!(
            classify_band("Sigma0_VV_slv1_15Jan2020_db.img", tile).unwrap(),
            Some((Polarization::Vv, "200115".to_string()))
        );
        assert_eq!(classify_band("Sigma0_VV_mst_03Jan2020_db.hdr", tile).unwrap(), None);
        assert_eq!(classify_band("Sigma0_HH_mst_03Jan2020_db.img", tile).unwrap(), None);
        assert_eq!(classify_band("tie_point_grids.img", tile).unwrap(), None);
        assert!(matches!(
            classify_band("Sigma0_VV_mst_db.img", tile),
            Err(Error::MalformedBandName { .. })
        ));
    }

    #[test]
    fn only_dates_with_both_polarizations_pair() {
        let mut index = BandIndex::default();
        index.vv.insert("200103".into(), PathBuf::from("vv1"));
        index.vv.insert("200115".into(), PathBuf::from("vv2"));
        index.vh.insert("200103".into(), PathBuf::from("vh1"));
        index.vh.insert("200127".into(), PathBuf::from("vh3"));
        assert_eq!(index.paired_dates(), vec!["200103"]);
        assert_eq!(index.unpaired_dates(), vec!["200115", "200127"]);
    }
}
