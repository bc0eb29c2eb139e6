//! Pipeline stages and their building blocks: configuration, artifact layout,
//! grid planning, acquisition grouping, calibration dispatch, tile cutting,
//! multi-temporal stacking and product assembly. These are consumed by the
//! high-level `api` module.
pub mod assembly;
pub mod calibration;
pub mod grid;
pub mod grouping;
pub mod layout;
pub mod params;
pub mod stacking;
pub mod tiling;
