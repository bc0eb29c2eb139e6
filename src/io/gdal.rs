//! Raster primitives used by product assembly: format conversion and
//! pixel-wise band difference, backed by GDAL.
use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use tracing::debug;

use crate::core::assembly::band_difference;
use crate::error::{Error, Result};

/// Exchange format written to the result area.
pub const EXCHANGE_DRIVER: &str = "GTiff";

/// Raster operations the assembler needs from the external raster library.
pub trait RasterLibrary {
    /// Copy band 1 of `src` to `dst` in the exchange format.
    fn translate(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Write `minuend - subtrahend` (band 1 of each) to `dst` in the exchange format.
    fn difference(&self, minuend: &Path, subtrahend: &Path, dst: &Path) -> Result<()>;
}

/// Single band loaded from a GDAL-readable raster, with its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterBand {
    pub data: Array2<f64>,
    /// Affine geotransform ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: Option<[f64; 6]>,
    /// Projection in WKT format; empty when unknown
    pub projection: String,
    /// Band NoData value, if the source declares one
    pub nodata: Option<f64>,
}

impl RasterBand {
    /// Read band 1 of a GDAL-supported dataset (e.g. ENVI `.img`, GeoTIFF).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let band = dataset.rasterband(1)?;
        let nodata = band.no_data_value();
        let buf = band.read_as::<f64>((0, 0), (size_x, size_y), (size_x, size_y), None)?;
        let data = Array2::from_shape_vec((size_y, size_x), buf.data().to_vec())
            .map_err(|_| Error::DimensionMismatch(size_x, size_y, size_x, size_y))?;
        Ok(Self {
            data,
            geotransform: dataset.geo_transform().ok(),
            projection: dataset.projection(),
            nodata,
        })
    }

    /// Write as a single Float32 band in the exchange format, keeping
    /// georeferencing and NoData.
    pub fn write(&self, output: &Path) -> Result<()> {
        let (rows, cols) = self.data.dim();
        let driver = DriverManager::get_driver_by_name(EXCHANGE_DRIVER)?;
        let mut ds = driver.create_with_band_type::<f32, _>(output, cols, rows, 1)?;
        if let Some(gt) = self.geotransform {
            ds.set_geo_transform(&gt)?;
        }
        if !self.projection.is_empty() {
            ds.set_projection(&self.projection)?;
        }
        let values: Vec<f32> = self.data.iter().map(|&v| v as f32).collect();
        let mut buf = Buffer::new((cols, rows), values);
        let mut band = ds.rasterband(1)?;
        if self.nodata.is_some() {
            band.set_no_data_value(self.nodata)?;
        }
        band.write((0, 0), (cols, rows), &mut buf)?;
        Ok(())
    }
}

/// `RasterLibrary` implemented on the GDAL bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalRaster;

impl RasterLibrary for GdalRaster {
    fn translate(&self, src: &Path, dst: &Path) -> Result<()> {
        debug!("Translating {:?} -> {:?}", src, dst);
        RasterBand::open(src)?.write(dst)
    }

    fn difference(&self, minuend: &Path, subtrahend: &Path, dst: &Path) -> Result<()> {
        debug!("Computing {:?} - {:?} -> {:?}", minuend, subtrahend, dst);
        let a = RasterBand::open(minuend)?;
        let b = RasterBand::open(subtrahend)?;
        let (data, nodata) = band_difference(&a.data, a.nodata, &b.data, b.nodata)?;
        RasterBand { data, nodata, ..a }.write(dst)
    }
}
