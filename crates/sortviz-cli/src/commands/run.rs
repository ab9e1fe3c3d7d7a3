#![forbid(unsafe_code)]

//! `sortviz run`: play one algorithm to the end and report.

use std::io::Write;

use serde::Serialize;
use sortviz_algos::AlgorithmRegistry;
use sortviz_core::apply_step;
use sortviz_runtime::{Pane, PlaybackConfig, PlaybackState, stopwatch};
use tracing::info;

use super::{apply_playback, is_sorted};
use crate::cli::RunArgs;
use crate::dataset::{self, Dataset};
use crate::driver::{Pacing, drive};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    algo: &'static str,
    name: &'static str,
    dataset: &'a Dataset,
    fps: u32,
    source: String,
    sorted: bool,
    state: PlaybackState,
}

pub fn run(
    args: &RunArgs,
    registry: &AlgorithmRegistry,
    config: &PlaybackConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let (info, algorithm) = registry.get(&args.algo)?;
    let data = dataset::resolve(&args.dataset, config, 0)?;
    let pacing = Pacing::new(args.playback.realtime);

    let mut pane = Pane::with_clock(algorithm, data.values.clone(), config.clone(), pacing.clock());
    apply_playback(&mut pane, &args.playback, config);
    pane.play();
    let polls = drive(&mut pane, &pacing)?;

    let state = pane.state();
    let sorted = is_sorted(&state.array);
    info!(
        algo = info.key,
        steps = state.step_index,
        polls,
        sorted,
        "run finished"
    );

    if args.narrate {
        let mut array = data.values.clone();
        for (idx, step) in pane.steps().iter().enumerate() {
            writeln!(out, "{idx:>6}  {}", step.narrate(&array))?;
            apply_step(&mut array, step)?;
        }
    }

    if args.json {
        let report = RunReport {
            algo: info.key,
            name: info.name,
            dataset: &data,
            fps: pane.fps(),
            source: format!("{:?}", pane.run().source_mode()),
            sorted,
            state,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "algorithm    {} ({})", info.name, info.key)?;
    writeln!(out, "dataset      {}", data.describe())?;
    writeln!(out, "fps          {}", pane.fps())?;
    writeln!(out, "steps        {}", state.step_index)?;
    writeln!(out, "comparisons  {}", state.comparisons)?;
    writeln!(out, "swaps        {}", state.swaps)?;
    writeln!(
        out,
        "logical      {}",
        stopwatch::format_clock(pane.player().logical())
    )?;
    if pacing.is_realtime() {
        writeln!(
            out,
            "wall         {}",
            stopwatch::format_clock(pane.player().elapsed())
        )?;
    }
    writeln!(out, "sorted       {}", if sorted { "yes" } else { "no" })?;
    Ok(())
}
