mod common;

use std::fs;

use orbitstack::core::grouping::group_acquisitions;
use orbitstack::{AcquisitionDate, ArtifactStore, Error, Layout, Polarization, RunLedger};
use tempfile::TempDir;

use common::{archive_name, write_archive, write_archive_with};

fn setup() -> (TempDir, Layout) {
    let tmp = TempDir::new().expect("Failed to create temp directory");
    let layout = Layout::under(tmp.path());
    fs::create_dir_all(&layout.download).unwrap();
    fs::create_dir_all(&layout.preprocessing).unwrap();
    (tmp, layout)
}

#[test]
fn second_scan_does_not_extract_again() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    write_archive(&layout.download, &archive_name("20200103", "170815", "DADE"));
    write_archive(&layout.download, &archive_name("20200115", "170815", "F00D"));

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let first = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();
    assert_eq!(first.extracted, 2);

    // Mark extracted trees so a re-extraction would be visible.
    let marker = layout
        .preprocessing
        .join(format!("{}.SAFE", archive_name("20200103", "170815", "DADE").trim_end_matches(".zip")))
        .join("marker");
    fs::write(&marker, b"kept").unwrap();

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let second = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();
    assert_eq!(second.extracted, 0);
    assert_eq!(second.groups, first.groups);
    assert!(marker.exists());

    let ledger_text = fs::read_to_string(layout.ledger()).unwrap();
    let lines: Vec<&str> = ledger_text.lines().collect();
    assert_eq!(
        lines,
        vec![
            archive_name("20200103", "170815", "DADE"),
            archive_name("20200115", "170815", "F00D"),
        ]
    );
}

#[test]
fn scenes_sharing_a_date_form_one_ordered_group() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    let north = archive_name("20200103", "170750", "AAAA");
    let south = archive_name("20200103", "170815", "BBBB");
    write_archive(&layout.download, &south);
    write_archive(&layout.download, &north);

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let grouping = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();

    assert_eq!(grouping.groups.len(), 1);
    let group = &grouping.groups[0];
    assert_eq!(group.date, AcquisitionDate::parse_compact("20200103").unwrap());
    assert_eq!(
        group.manifests(),
        vec![
            layout.scene_manifest(&north, ".zip"),
            layout.scene_manifest(&south, ".zip"),
        ]
    );
    assert_eq!(
        group.acquisitions[0].polarizations,
        vec![Polarization::Vv, Polarization::Vh]
    );
}

#[test]
fn calibrated_dates_are_not_regrouped() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    write_archive(&layout.download, &archive_name("20200103", "170815", "DADE"));
    write_archive(&layout.download, &archive_name("20200115", "170815", "F00D"));
    let done = AcquisitionDate::parse_compact("20200103").unwrap();
    fs::write(layout.calibrated_product(done), b"<Dimap_Document/>").unwrap();

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let grouping = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();

    assert_eq!(grouping.already_calibrated, 1);
    let dates: Vec<String> = grouping.groups.iter().map(|g| g.date.to_string()).collect();
    assert_eq!(dates, vec!["20200115"]);
}

#[test]
fn malformed_name_is_rejected_before_extraction() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    write_archive(&layout.download, "S1A_IW_GRDH.zip");

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let err = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap_err();

    assert!(matches!(err, Error::MalformedArchiveName { ref name, .. } if name == "S1A_IW_GRDH.zip"));
    assert!(ledger.is_empty());
    assert!(!layout.preprocessing.join("S1A_IW_GRDH.SAFE").exists());
}

#[test]
fn corrupt_archive_is_not_recorded() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    let name = archive_name("20200103", "170815", "DADE");
    fs::write(layout.download.join(&name), b"truncated download").unwrap();

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let err = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap_err();

    assert!(matches!(err, Error::Archive { .. }));
    assert!(!ledger.contains(&name));
    assert_eq!(fs::read_to_string(layout.ledger()).unwrap_or_default(), "");
}

#[test]
fn ledger_entry_without_data_is_extracted_again() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    let name = archive_name("20200103", "170815", "DADE");
    write_archive(&layout.download, &name);
    fs::write(layout.ledger(), format!("{}\n", name)).unwrap();

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let grouping = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();

    assert_eq!(grouping.extracted, 1);
    assert!(layout.scene_manifest(&name, ".zip").is_file());
    assert_eq!(fs::read_to_string(layout.ledger()).unwrap().lines().count(), 1);
}

#[test]
fn single_pol_scene_is_still_grouped() {
    let (_tmp, layout) = setup();
    let store = ArtifactStore::new();
    write_archive_with(
        &layout.download,
        &archive_name("20200103", "170815", "DADE"),
        &["VV"],
    );

    let mut ledger = RunLedger::open(&layout.ledger()).unwrap();
    let grouping = group_acquisitions(&layout, &store, &mut ledger, ".zip").unwrap();
    assert_eq!(grouping.groups[0].acquisitions[0].polarizations, vec![Polarization::Vv]);
}
