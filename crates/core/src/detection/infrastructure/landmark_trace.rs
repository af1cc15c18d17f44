//! Recorded landmark traces in JSON Lines form.
//!
//! One record per captured frame:
//!
//! ```text
//! {"frame": 0, "faces": [[[x, y], ...68 points], ...]}
//! {"frame": 1, "t": 0.0625, "faces": []}
//! {"frame": 2, "camera_error": "device disconnected"}
//! ```
//!
//! `t` is the capture time in seconds; when absent, replay derives it from
//! the frame rate. A `camera_error` record ends the stream with a failure.
//! Frame indices must be unique within a trace.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::clock::Timestamp;
use crate::shared::point::Point;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid capture time {t} on line {line}")]
    InvalidTime { line: usize, t: f64 },
    #[error("duplicate frame {frame} on line {line}")]
    DuplicateFrame { line: usize, frame: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub frame: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(default)]
    pub faces: Vec<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkTrace {
    records: Vec<TraceRecord>,
}

impl LandmarkTrace {
    /// Wraps records as given; only `parse` checks them.
    pub fn new(records: Vec<TraceRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let file = File::open(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file)).map_err(|e| match e {
            TraceError::Io { source, .. } => TraceError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses JSON Lines, skipping blank lines. Line numbers are 1-based.
    ///
    /// Rejects a `t` outside the clock's range and any repeated frame index.
    pub fn parse(reader: impl BufRead) -> Result<Self, TraceError> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TraceError::Io {
                path: PathBuf::new(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 1;
            let record: TraceRecord =
                serde_json::from_str(&line).map_err(|source| TraceError::Parse {
                    line: line_no,
                    source,
                })?;
            if let Some(t) = record.t {
                if Timestamp::try_from_secs_f64(t).is_none() {
                    return Err(TraceError::InvalidTime { line: line_no, t });
                }
            }
            if !seen.insert(record.frame) {
                return Err(TraceError::DuplicateFrame {
                    line: line_no,
                    frame: record.frame,
                });
            }
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw face shapes keyed by frame index.
    pub fn faces_by_frame(&self) -> HashMap<usize, Vec<Vec<Point>>> {
        self.records
            .iter()
            .filter(|r| !r.faces.is_empty())
            .map(|r| (r.frame, r.faces.clone()))
            .collect()
    }
}
