#![forbid(unsafe_code)]

//! Headless driver for the sortviz playback engine.
//!
//! The `sortviz` binary parses arguments with [`cli::Cli`], builds runs
//! from the builtin [`AlgorithmRegistry`](sortviz_algos::AlgorithmRegistry)
//! and plays them through [`driver::drive`]. Playback uses a simulated clock
//! unless `--realtime` is given, so results are deterministic and immediate.

pub mod cli;
pub mod commands;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod logging;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};
