#![forbid(unsafe_code)]

//! Trace export: a flat CSV table and a self-describing JSON document.
//!
//! # CSV
//!
//! ```text
//! idx,op,indices,payload
//! 0,compare,0.1,
//! 1,swap,0.1,5;3
//! ```
//!
//! # JSON
//!
//! [`TraceDocument`] carries the initial array and every step, so a loaded
//! document can be replayed and checked against an expected result.

use std::fmt::Write as _;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};
use crate::replay::{replay, replay_checked};
use crate::step::{Payload, STEP_SCHEMA_VERSION, Step, StepRecord};

/// Version of the playback callback interface recorded in exports.
pub const PLAYER_API_VERSION: u32 = 2;

/// CSV header line.
pub const CSV_HEADER: &str = "idx,op,indices,payload";

// ---------------------------------------------------------------------------
// Flat rows
// ---------------------------------------------------------------------------

/// One flattened step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub idx: usize,
    pub op: &'static str,
    pub indices: String,
    pub payload: String,
}

impl ExportRow {
    /// Flatten `step` at position `idx`.
    #[must_use]
    pub fn new(idx: usize, step: &Step) -> Self {
        let mut indices = String::new();
        for (n, i) in step.indices().iter().enumerate() {
            if n > 0 {
                indices.push('.');
            }
            let _ = write!(indices, "{i}");
        }
        Self {
            idx,
            op: step.op().as_str(),
            indices,
            payload: step.payload().map(Payload::to_string).unwrap_or_default(),
        }
    }

    fn write_csv(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{},{},{},{}",
            self.idx,
            self.op,
            self.indices,
            csv_field(&self.payload)
        )
    }
}

/// Flatten a step log into rows.
#[must_use]
pub fn export_rows(steps: &[Step]) -> Vec<ExportRow> {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| ExportRow::new(idx, step))
        .collect()
}

/// Write the CSV table for `steps`, header first.
pub fn write_csv(out: &mut impl Write, steps: &[Step]) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for row in export_rows(steps) {
        row.write_csv(out)?;
    }
    Ok(())
}

/// The CSV table as a string.
#[must_use]
pub fn to_csv(steps: &[Step]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(&mut buf, steps);
    String::from_utf8_lossy(&buf).into_owned()
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// JSON document
// ---------------------------------------------------------------------------

/// Dataset parameters recorded alongside a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    pub n: usize,
    pub min: i64,
    pub max: i64,
    pub fps: u32,
}

/// Caller-supplied description of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceMeta {
    pub algo: String,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub config: TraceConfig,
}

/// A step with its position in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedStep {
    pub idx: usize,
    pub op: String,
    pub indices: Vec<usize>,
    #[serde(default)]
    pub payload: Option<Payload>,
}

/// Exported run: metadata, initial array and the full step log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    pub schema_version: u32,
    #[serde(default = "default_api_version")]
    pub player_api_version: u32,
    pub algo: String,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub config: TraceConfig,
    pub initial: Vec<i64>,
    pub steps: Vec<IndexedStep>,
    #[serde(default)]
    pub logical_seconds: f64,
}

fn default_api_version() -> u32 {
    PLAYER_API_VERSION
}

impl TraceDocument {
    /// Assemble a document from a run's log.
    #[must_use]
    pub fn new(meta: TraceMeta, initial: &[i64], steps: &[Step], logical_seconds: f64) -> Self {
        let steps = steps
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                let record = StepRecord::from(step.clone());
                IndexedStep {
                    idx,
                    op: record.op,
                    indices: record.indices,
                    payload: record.payload,
                }
            })
            .collect();
        Self {
            schema_version: STEP_SCHEMA_VERSION,
            player_api_version: PLAYER_API_VERSION,
            algo: meta.algo,
            preset: meta.preset,
            seed: meta.seed,
            config: meta.config,
            initial: initial.to_vec(),
            steps,
            logical_seconds,
        }
    }

    /// Parse a document, rejecting unknown schema versions.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text)?;
        if doc.schema_version != STEP_SCHEMA_VERSION {
            return Err(TraceError::Json(format!(
                "unsupported schema_version {} (expected {STEP_SCHEMA_VERSION})",
                doc.schema_version
            )));
        }
        Ok(doc)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate every step, in order.
    pub fn decode_steps(&self) -> Result<Vec<Step>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(pos, entry)| {
                if entry.idx != pos {
                    return Err(TraceError::malformed(
                        entry.op.clone(),
                        format!("entry {pos} carries idx {}", entry.idx),
                    ));
                }
                Step::try_from(StepRecord {
                    op: entry.op.clone(),
                    indices: entry.indices.clone(),
                    payload: entry.payload.clone(),
                })
            })
            .collect()
    }

    /// Replay the whole document and return the final array.
    pub fn final_array(&self) -> Result<Vec<i64>> {
        replay(&self.initial, &self.decode_steps()?)
    }

    /// Replay the document and require the result to equal `expected`.
    pub fn verify(&self, expected: &[i64]) -> Result<Vec<i64>> {
        replay_checked(&self.initial, &self.decode_steps()?, expected)
    }
}
