#![forbid(unsafe_code)]

//! `sortviz export`: play a run and write its step log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sortviz_algos::AlgorithmRegistry;
use sortviz_core::{TraceMeta, write_csv};
use sortviz_runtime::{Pane, PlaybackConfig};
use tracing::info;

use crate::cli::{ExportArgs, ExportFormat};
use crate::dataset;
use crate::driver::{Pacing, drive};
use crate::error::{CliError, Result};

pub fn run(
    args: &ExportArgs,
    registry: &AlgorithmRegistry,
    config: &PlaybackConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let (info, algorithm) = registry.get(&args.algo)?;
    let data = dataset::resolve(&args.dataset, config, 0)?;
    let pacing = Pacing::new(false);

    let mut pane = Pane::with_clock(algorithm, data.values.clone(), config.clone(), pacing.clock());
    pane.set_fps(args.fps.unwrap_or(config.fps_default));
    pane.play();
    drive(&mut pane, &pacing)?;

    let meta = TraceMeta {
        algo: info.key.to_string(),
        preset: data.preset.clone(),
        seed: data.seed,
        config: data.trace_config(pane.fps()),
    };
    let steps = pane.steps().len();

    if args.out.as_os_str() == "-" {
        write_trace(&pane, meta, args.format, out)?;
        return Ok(());
    }

    let path = args.out.as_path();
    let file = File::create(path).map_err(|e| CliError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_trace(&pane, meta, args.format, &mut writer).map_err(|e| with_path(e, path))?;
    writer.flush().map_err(|e| CliError::io(path, e))?;
    info!(path = %path.display(), steps, format = ?args.format, "trace exported");
    writeln!(out, "wrote {steps} steps to {}", path.display())?;
    Ok(())
}

fn write_trace(
    pane: &Pane,
    meta: TraceMeta,
    format: ExportFormat,
    mut out: &mut dyn Write,
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(&mut out, pane.steps())?,
        ExportFormat::Json => {
            let doc = pane.export_trace(meta);
            writeln!(out, "{}", doc.to_json_pretty()?)?;
        }
    }
    Ok(())
}

fn with_path(err: CliError, path: &Path) -> CliError {
    match err {
        CliError::Output(source) => CliError::io(path, source),
        other => other,
    }
}
