#![forbid(unsafe_code)]

//! `sortviz compare`: two algorithms on one dataset, side by side.

use std::io::Write;

use serde::Serialize;
use sortviz_algos::AlgorithmRegistry;
use sortviz_runtime::{CompareController, PlaybackConfig, PlaybackState, stopwatch};
use tracing::info;

use super::{apply_playback, is_sorted};
use crate::cli::CompareArgs;
use crate::dataset::{self, Dataset};
use crate::driver::{Pacing, drive};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct SideReport {
    algo: &'static str,
    name: &'static str,
    sorted: bool,
    state: PlaybackState,
}

#[derive(Debug, Serialize)]
struct CompareReport<'a> {
    dataset: &'a Dataset,
    fps: u32,
    left: SideReport,
    right: SideReport,
    /// Side that needed fewer steps; `None` on a tie.
    faster: Option<&'static str>,
}

pub fn run(
    args: &CompareArgs,
    registry: &AlgorithmRegistry,
    config: &PlaybackConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let (left_info, left_alg) = registry.get(&args.left)?;
    let (right_info, right_alg) = registry.get(&args.right)?;
    let data = dataset::resolve(&args.dataset, config, 0)?;
    let pacing = Pacing::new(args.playback.realtime);

    let mut cc = CompareController::new(left_alg, right_alg, &data.values, config, pacing.clock());
    apply_playback(cc.left_mut(), &args.playback, config);
    apply_playback(cc.right_mut(), &args.playback, config);
    cc.play();
    drive(&mut cc, &pacing)?;

    let states = cc.states();
    let side = |info: sortviz_algos::AlgorithmInfo, state: PlaybackState| SideReport {
        algo: info.key,
        name: info.name,
        sorted: is_sorted(&state.array),
        state,
    };
    let report = CompareReport {
        dataset: &data,
        fps: cc.left().fps(),
        faster: faster(&states.left, &states.right, left_info.key, right_info.key),
        left: side(left_info, states.left),
        right: side(right_info, states.right),
    };
    info!(
        left = report.left.algo,
        right = report.right.algo,
        faster = report.faster.unwrap_or("tie"),
        "compare finished"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "dataset      {}", data.describe())?;
    writeln!(out, "fps          {}", report.fps)?;
    writeln!(out)?;
    writeln!(out, "{:<12} {:>22} {:>22}", "", report.left.name, report.right.name)?;
    let row = |out: &mut dyn Write, label: &str, l: String, r: String| {
        writeln!(out, "{label:<12} {l:>22} {r:>22}")
    };
    let (l, r) = (&report.left.state, &report.right.state);
    row(&mut *out, "steps", l.step_index.to_string(), r.step_index.to_string())?;
    row(&mut *out, "comparisons", l.comparisons.to_string(), r.comparisons.to_string())?;
    row(&mut *out, "swaps", l.swaps.to_string(), r.swaps.to_string())?;
    row(
        &mut *out,
        "logical",
        stopwatch::format_seconds(l.logical_elapsed_seconds),
        stopwatch::format_seconds(r.logical_elapsed_seconds),
    )?;
    row(
        &mut *out,
        "sorted",
        yes_no(report.left.sorted).into(),
        yes_no(report.right.sorted).into(),
    )?;
    writeln!(out)?;
    match report.faster {
        Some(key) => writeln!(out, "faster       {key}")?,
        None => writeln!(out, "faster       tie")?,
    }
    Ok(())
}

fn faster(
    left: &PlaybackState,
    right: &PlaybackState,
    left_key: &'static str,
    right_key: &'static str,
) -> Option<&'static str> {
    use std::cmp::Ordering;
    match left.step_index.cmp(&right.step_index) {
        Ordering::Less => Some(left_key),
        Ordering::Greater => Some(right_key),
        Ordering::Equal => None,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
