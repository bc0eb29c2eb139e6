//! Shared types used across the pipeline.
//! Includes `Polarization`, `AcquisitionDate`, `TileId`, `ProductKind` and the
//! `Stage` marker used to report the last completed checkpoint of a run.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The two polarizations carried by a dual-pol IW GRD acquisition.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Polarization {
    Vv,
    Vh,
}

impl Polarization {
    /// Parse the two-letter tag used in band and manifest names (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "VV" => Some(Polarization::Vv),
            "VH" => Some(Polarization::Vh),
            _ => None,
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::Vv => write!(f, "VV"),
            Polarization::Vh => write!(f, "VH"),
        }
    }
}

/// Day-granularity acquisition date, rendered as `YYYYMMDD`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct AcquisitionDate(pub NaiveDate);

impl AcquisitionDate {
    /// Parse a compact `YYYYMMDD` string.
    pub fn parse_compact(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .ok()
            .map(AcquisitionDate)
    }

    /// Extract the acquisition date from a Sentinel-1 archive file name.
    ///
    /// The fifth underscore-delimited field holds the start timestamp
    /// (`YYYYMMDDThhmmss`); its first eight characters are the date, e.g.
    /// `S1A_IW_GRDH_1SDV_20200103T170815_..._DADE.zip` -> `20200103`.
    pub fn from_archive_name(name: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedArchiveName {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let token = name
            .split('_')
            .nth(4)
            .ok_or_else(|| malformed("missing start timestamp field"))?;
        let date = token
            .get(..8)
            .ok_or_else(|| malformed("start timestamp shorter than 8 characters"))?;
        Self::parse_compact(date)
            .ok_or_else(|| malformed(&format!("`{}` is not a YYYYMMDD date", date)))
    }
}

impl std::fmt::Display for AcquisitionDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// Grid cell index `(i, j)`; its directory name is `"{i}_{j}"`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TileId {
    pub i: u32,
    pub j: u32,
}

impl TileId {
    pub fn new(i: u32, j: u32) -> Self {
        Self { i, j }
    }

    /// Inverse of `Display`: accepts only `"{i}_{j}"` with two unsigned integers.
    pub fn parse(name: &str) -> Option<Self> {
        let (i, j) = name.split_once('_')?;
        Some(Self {
            i: i.parse().ok()?,
            j: j.parse().ok()?,
        })
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.i, self.j)
    }
}

/// Final product bands written to the result area.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum ProductKind {
    Vv,
    Vh,
    /// Cross-polarization difference VV - VH (dB).
    VvVh,
}

impl ProductKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ProductKind::Vv => "vv",
            ProductKind::Vh => "vh",
            ProductKind::VvVh => "vvvh",
        }
    }
}

impl From<Polarization> for ProductKind {
    fn from(pol: Polarization) -> Self {
        match pol {
            Polarization::Vv => ProductKind::Vv,
            Polarization::Vh => ProductKind::Vh,
        }
    }
}

/// Pipeline stages in execution order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Stage {
    Grid,
    Grouping,
    Calibration,
    Tiling,
    Stacking,
    Assembly,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Grid => write!(f, "Grid"),
            Stage::Grouping => write!(f, "Grouping"),
            Stage::Calibration => write!(f, "Calibration"),
            Stage::Tiling => write!(f, "Tiling"),
            Stage::Stacking => write!(f, "Stacking"),
            Stage::Assembly => write!(f, "Assembly"),
        }
    }
}
