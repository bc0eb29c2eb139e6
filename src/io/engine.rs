//! External processing engine (ESA SNAP Graph Processing Tool).
//!
//! The pipeline only knows graph names and parameters; everything radiometric
//! happens inside the engine. A call either succeeds (exit code 0) or fails
//! the run.
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while invoking the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch {program:?} for {graph}: {source}")]
    Spawn {
        program: PathBuf,
        graph: Graph,
        #[source]
        source: std::io::Error,
    },
    #[error("{graph} exited with {status}")]
    Failed { graph: Graph, status: ExitStatus },
}

/// Graph templates known to the pipeline.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Graph {
    /// Apply-Orbit-File, Calibration, Terrain-Correction on one scene
    Calibration,
    /// Slice-Assembly of adjacent scenes, then the calibration chain
    AssemblyAndCalibration,
    /// Geometry-bounded subset of a calibrated product
    Subset,
    /// Multi-temporal speckle filter over a tile's date stack
    MultitemporalFilter,
}

impl Graph {
    /// Graph XML file name inside the graph directory.
    pub fn template(&self) -> &'static str {
        match self {
            Graph::Calibration => "calibration.xml",
            Graph::AssemblyAndCalibration => "assembly_and_calibration.xml",
            Graph::Subset => "subset.xml",
            Graph::MultitemporalFilter => "filter.xml",
        }
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template())
    }
}

/// One engine invocation: a graph, `-P<key>=<value>` parameters and ordered
/// positional source products.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub graph: Graph,
    pub params: Vec<(&'static str, String)>,
    pub sources: Vec<PathBuf>,
}

impl EngineRequest {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            params: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn param<V: AsRef<str>>(mut self, key: &'static str, value: V) -> Self {
        self.params.push((key, value.as_ref().to_string()));
        self
    }

    pub fn path_param(self, key: &'static str, value: &Path) -> Self {
        let value = value.to_string_lossy().to_string();
        self.param(key, value)
    }

    pub fn sources<I: IntoIterator<Item = PathBuf>>(mut self, sources: I) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Command-line arguments following the executable.
    pub fn args(&self, graph_dir: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(1 + self.params.len() + self.sources.len());
        args.push(
            graph_dir
                .join(self.graph.template())
                .to_string_lossy()
                .to_string(),
        );
        for (key, value) in &self.params {
            args.push(format!("-P{}={}", key, value));
        }
        for source in &self.sources {
            args.push(source.to_string_lossy().to_string());
        }
        args
    }
}

/// Blocking engine invocation.
pub trait ProcessingEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineError>;
}

/// SNAP `gpt` launched as a child process.
#[derive(Debug, Clone)]
pub struct GptEngine {
    pub executable: PathBuf,
    pub graph_dir: PathBuf,
}

impl GptEngine {
    pub fn new(executable: PathBuf, graph_dir: PathBuf) -> Self {
        Self {
            executable,
            graph_dir,
        }
    }
}

impl ProcessingEngine for GptEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineError> {
        let args = request.args(&self.graph_dir);
        info!("gpt {}", request.graph);
        debug!("{:?} {}", self.executable, args.join(" "));
        let status = Command::new(&self.executable)
            .args(&args)
            .status()
            .map_err(|source| EngineError::Spawn {
                program: self.executable.clone(),
                graph: request.graph,
                source,
            })?;
        if !status.success() {
            return Err(EngineError::Failed {
                graph: request.graph,
                status,
            });
        }
        Ok(())
    }
}
