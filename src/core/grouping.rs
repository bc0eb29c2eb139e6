//! Acquisition grouping: extract each downloaded archive once and group scene
//! manifests by acquisition date.
//!
//! Ordering contract: archives are visited in file-name order, and manifests
//! within a date group keep that order. Slice assembly in the engine mosaics
//! scenes in the order it receives them, so this order must stay stable
//! between runs.
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::core::layout::Layout;
use crate::error::{Error, Result};
use crate::io::archive::extract_archive;
use crate::io::manifest::read_manifest_polarizations;
use crate::io::{ArtifactStore, RunLedger};
use crate::types::{AcquisitionDate, Polarization};

/// One raw scene ready for calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub archive: String,
    pub date: AcquisitionDate,
    pub manifest: PathBuf,
    /// Polarization mode read from the manifest
    pub polarizations: Vec<Polarization>,
}

/// Scenes sharing one acquisition date, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: AcquisitionDate,
    pub acquisitions: Vec<Acquisition>,
}

impl DateGroup {
    pub fn manifests(&self) -> Vec<PathBuf> {
        self.acquisitions.iter().map(|a| a.manifest.clone()).collect()
    }
}

/// Result of scanning the download directory.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Date groups still needing calibration, in date order
    pub groups: Vec<DateGroup>,
    /// Archives extracted during this scan
    pub extracted: usize,
    /// Archives skipped because their date is already calibrated
    pub already_calibrated: usize,
}

/// Archive file names in `layout.download` ending with `suffix`, sorted.
pub fn list_archives(layout: &Layout, store: &ArtifactStore, suffix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for path in store.entries(&layout.download)? {
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if name.ends_with(suffix) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Extract new archives (recording them in the ledger) and group the
/// manifests of dates that have no calibrated product yet.
pub fn group_acquisitions(
    layout: &Layout,
    store: &ArtifactStore,
    ledger: &mut RunLedger,
    archive_suffix: &str,
) -> Result<Grouping> {
    let mut outcome = Grouping::default();
    let mut by_date: BTreeMap<AcquisitionDate, Vec<Acquisition>> = BTreeMap::new();

    for name in list_archives(layout, store, archive_suffix)? {
        info!("Archive: {}", name);
        let date = AcquisitionDate::from_archive_name(&name)?;
        let manifest = layout.scene_manifest(&name, archive_suffix);
        let calibrated = store.exists(&layout.calibrated_product(date));

        if ledger.contains(&name) {
            if store.exists(&manifest) || calibrated {
                debug!("{} already extracted", name);
            } else {
                warn!(
                    "{} is recorded in {:?} but {:?} is missing; extracting again",
                    name,
                    ledger.path(),
                    manifest
                );
                extract_archive(&layout.archive(&name), &layout.preprocessing)?;
                outcome.extracted += 1;
            }
        } else {
            extract_archive(&layout.archive(&name), &layout.preprocessing)?;
            ledger.record(&name)?;
            outcome.extracted += 1;
        }

        if calibrated {
            debug!("Date {} already calibrated, skipping {}", date, name);
            outcome.already_calibrated += 1;
            continue;
        }

        if !store.exists(&manifest) {
            return Err(Error::MissingManifest {
                archive: name,
                path: manifest,
            });
        }
        let polarizations = read_manifest_polarizations(&manifest)?;
        if !(polarizations.contains(&Polarization::Vv) && polarizations.contains(&Polarization::Vh)) {
            warn!(
                "{} carries {:?}; no VV-VH product can be derived for {}",
                name, polarizations, date
            );
        }

        by_date.entry(date).or_default().push(Acquisition {
            archive: name,
            date,
            manifest,
            polarizations,
        });
    }

    outcome.groups = by_date
        .into_iter()
        .map(|(date, acquisitions)| DateGroup { date, acquisitions })
        .collect();
    info!(
        "{} date group(s) to calibrate, {} archive(s) extracted, {} already calibrated",
        outcome.groups.len(),
        outcome.extracted,
        outcome.already_calibrated
    );
    Ok(outcome)
}
