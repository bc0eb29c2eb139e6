use tracing::info;

use crate::core::grouping::DateGroup;
use crate::core::layout::Layout;
use crate::error::{Error, Result};
use crate::io::{ArtifactStore, EngineRequest, Graph, ProcessingEngine};

/// Engine request for one date: single-scene calibration, or slice assembly
/// followed by calibration when several scenes share the date.
pub fn calibration_request(layout: &Layout, group: &DateGroup) -> EngineRequest {
    let target = layout.calibrated_target(group.date);
    let manifests = group.manifests();
    if manifests.len() == 1 {
        EngineRequest::new(Graph::Calibration)
            .path_param("source", &manifests[0])
            .path_param("output", &target)
    } else {
        EngineRequest::new(Graph::AssemblyAndCalibration)
            .path_param("output", &target)
            .sources(manifests)
    }
}

/// Calibrate every date group, skipping dates whose product already exists.
/// Returns the number of dates calibrated in this run.
pub fn calibrate_dates<E: ProcessingEngine + ?Sized>(
    layout: &Layout,
    store: &ArtifactStore,
    engine: &E,
    groups: &[DateGroup],
) -> Result<usize> {
    let mut calibrated = 0;
    for group in groups {
        let product = layout.calibrated_product(group.date);
        if store.exists(&product) {
            info!("Date {} already calibrated", group.date);
            continue;
        }
        if group.acquisitions.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "date group",
                value: format!("{} has no scenes", group.date),
            });
        }
        info!(
            "Calibrating {} from {} scene(s)",
            group.date,
            group.acquisitions.len()
        );
        engine
            .run(&calibration_request(layout, group))
            .map_err(|e| Error::engine(format!("date {}", group.date), e))?;
        if !store.exists(&product) {
            return Err(Error::MissingEngineOutput(product));
        }
        info!("Calibrated {} -> {:?}", group.date, product);
        calibrated += 1;
    }
    Ok(calibrated)
}
