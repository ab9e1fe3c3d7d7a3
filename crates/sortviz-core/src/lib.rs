#![forbid(unsafe_code)]

//! Data model for the sortviz playback engine.
//!
//! A sorting algorithm is recorded as an ordered list of immutable [`Step`]s.
//! This crate holds everything that does not depend on time:
//!
//! - [`step`]: the step value type, its operations and wire form
//! - [`replay`]: pure step application and prefix replay
//! - [`checkpoint`]: periodic snapshots for bounded-cost seeking
//! - [`source`]: precomputed and on-demand step sources
//! - [`run`]: the mutable state of one run (array, log, metrics, highlights)
//! - [`export`]: CSV rows and the JSON trace document

pub mod checkpoint;
pub mod error;
pub mod export;
pub mod replay;
pub mod run;
pub mod source;
pub mod step;

pub use checkpoint::{Checkpoint, CheckpointStore, DEFAULT_CHECKPOINT_STRIDE};
pub use error::{Result, TraceError};
pub use export::{
    CSV_HEADER, ExportRow, IndexedStep, PLAYER_API_VERSION, TraceConfig, TraceDocument, TraceMeta,
    export_rows, to_csv, write_csv,
};
pub use replay::{apply_step, replay, replay_checked};
pub use run::{Advance, HighlightKind, Highlights, Metrics, RunConfig, RunState};
pub use source::{
    Algorithm, DEFAULT_PRECOMPUTE_CAP, Pull, SourceMode, StepIter, StepSource, algorithm,
    drain_capped,
};
pub use step::{Indices, Op, Payload, STEP_SCHEMA_VERSION, Step, StepRecord};
