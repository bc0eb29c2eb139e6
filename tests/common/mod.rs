#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use chrono::NaiveDate;
use orbitstack::{EngineError, EngineRequest, Graph, PipelineConfig, ProcessingEngine, RasterLibrary};

pub const VV_DB: f64 = -7.5;
pub const VH_DB: f64 = -15.25;

pub fn manifest_xml(pols: &[&str]) -> String {
    let mut body = String::new();
    for pol in pols {
        body.push_str(&format!(
            "<s1sarl1:transmitterReceiverPolarisation>{}</s1sarl1:transmitterReceiverPolarisation>",
            pol
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:s1sarl1="http://www.esa.int/safe/sentinel-1.0/sentinel-1/sar/level-1">
<metadataSection><s1sarl1:standAloneProductInformation>{}</s1sarl1:standAloneProductInformation></metadataSection>
</xfdu:XFDU>"#,
        body
    )
}

pub fn archive_name(date: &str, time: &str, tag: &str) -> String {
    format!(
        "S1A_IW_GRDH_1SDV_{d}T{t}_{d}T{t}_030639_0382D5_{tag}.zip",
        d = date,
        t = time,
        tag = tag
    )
}

/// Write a zipped SAFE product into `download` with a dual-pol manifest.
pub fn write_archive(download: &Path, name: &str) -> PathBuf {
    write_archive_with(download, name, &["VV", "VH"])
}

pub fn write_archive_with(download: &Path, name: &str, pols: &[&str]) -> PathBuf {
    fs::create_dir_all(download).unwrap();
    let path = download.join(name);
    let safe = format!("{}.SAFE", name.trim_end_matches(".zip"));
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::FileOptions::default();
    zip.start_file(format!("{}/manifest.safe", safe), options)
        .unwrap();
    zip.write_all(manifest_xml(pols).as_bytes()).unwrap();
    zip.start_file(format!("{}/measurement/vv.tiff", safe), options)
        .unwrap();
    zip.write_all(b"raw").unwrap();
    zip.finish().unwrap();
    path
}

pub fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        root: root.to_path_buf(),
        grid_x: 2,
        grid_y: 2,
        ..Default::default()
    }
}

fn touch_dimap(target: &Path) {
    let header = if target.extension().map(|e| e == "dim").unwrap_or(false) {
        target.to_path_buf()
    } else {
        PathBuf::from(format!("{}.dim", target.display()))
    };
    if let Some(parent) = header.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&header, b"<Dimap_Document/>").unwrap();
    fs::create_dir_all(header.with_extension("data")).unwrap();
}

fn band_date(source: &Path) -> String {
    let stem = source.file_stem().unwrap().to_string_lossy().to_string();
    NaiveDate::parse_from_str(&stem, "%Y%m%d")
        .unwrap()
        .format("%d%b%Y")
        .to_string()
}

/// Engine double: records requests and materializes the outputs a real
/// `gpt` run would leave on disk. Bands are one-number text files.
#[derive(Default)]
pub struct FakeEngine {
    pub calls: RefCell<Vec<EngineRequest>>,
    /// Graph that exits non-zero
    pub fail_on: Option<Graph>,
    /// Only the n-th call (1-based) of this graph exits non-zero
    pub fail_nth: Option<(Graph, usize)>,
    /// Dates (`YYYYMMDD`) whose filtered stack lacks the VH band
    pub drop_vh: HashSet<String>,
}

impl FakeEngine {
    pub fn graphs(&self) -> Vec<Graph> {
        self.calls.borrow().iter().map(|r| r.graph).collect()
    }

    pub fn count(&self, graph: Graph) -> usize {
        self.calls.borrow().iter().filter(|r| r.graph == graph).count()
    }
}

#[cfg(unix)]
fn failed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(1 << 8)
}

impl ProcessingEngine for FakeEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(request.clone());
        let nth = self.count(request.graph);
        if self.fail_on == Some(request.graph) || self.fail_nth == Some((request.graph, nth)) {
            return Err(EngineError::Failed {
                graph: request.graph,
                status: failed_status(),
            });
        }
        match request.graph {
            Graph::Calibration | Graph::AssemblyAndCalibration | Graph::Subset => {
                touch_dimap(Path::new(request.get("output").unwrap()));
            }
            Graph::MultitemporalFilter => {
                touch_dimap(Path::new(request.get("output").unwrap()));
                let log = Path::new(request.get("outputLog").unwrap());
                touch_dimap(log);
                let data = PathBuf::from(format!("{}.data", log.display()));
                for (n, source) in request.sources.iter().enumerate() {
                    let role = if n == 0 { "mst".to_string() } else { format!("slv{}", n) };
                    let date = band_date(source);
                    let compact = source.file_stem().unwrap().to_string_lossy().to_string();
                    fs::write(
                        data.join(format!("Sigma0_VV_{}_{}_db.img", role, date)),
                        VV_DB.to_string(),
                    )
                    .unwrap();
                    fs::write(data.join(format!("Sigma0_VV_{}_{}_db.hdr", role, date)), "ENVI")
                        .unwrap();
                    if !self.drop_vh.contains(&compact) {
                        fs::write(
                            data.join(format!("Sigma0_VH_{}_{}_db.img", role, date)),
                            VH_DB.to_string(),
                        )
                        .unwrap();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Raster double over one-number text files.
#[derive(Default)]
pub struct FakeRaster {
    pub ops: RefCell<Vec<(String, PathBuf)>>,
}

fn read_value(path: &Path) -> orbitstack::Result<f64> {
    let text = fs::read_to_string(path)?;
    text.trim()
        .parse()
        .map_err(|_| orbitstack::Error::DimensionMismatch(1, 1, 0, 0))
}

impl RasterLibrary for FakeRaster {
    fn translate(&self, src: &Path, dst: &Path) -> orbitstack::Result<()> {
        self.ops.borrow_mut().push(("translate".into(), dst.to_path_buf()));
        fs::copy(src, dst)?;
        Ok(())
    }

    fn difference(&self, minuend: &Path, subtrahend: &Path, dst: &Path) -> orbitstack::Result<()> {
        self.ops.borrow_mut().push(("difference".into(), dst.to_path_buf()));
        let value = read_value(minuend)? - read_value(subtrahend)?;
        fs::write(dst, value.to_string())?;
        Ok(())
    }
}

pub fn read_number(path: &Path) -> f64 {
    fs::read_to_string(path).unwrap().trim().parse().unwrap()
}
