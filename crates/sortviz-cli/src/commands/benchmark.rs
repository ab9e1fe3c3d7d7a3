#![forbid(unsafe_code)]

//! `sortviz benchmark`: every algorithm over seeded datasets, as CSV.
//!
//! Steps are pulled and applied without a player, so `duration_cpu_ms` is
//! the cost of producing and applying the trace. `duration_visual_ms` is
//! what playback would take at the chosen rate, one step per frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sortviz_algos::{AlgorithmInfo, AlgorithmRegistry};
use sortviz_core::{Algorithm, Metrics, apply_step};
use sortviz_runtime::PlaybackConfig;
use tracing::{debug, info, warn};
use web_time::Instant;

use super::is_sorted;
use crate::cli::BenchmarkArgs;
use crate::dataset::{self, Dataset};
use crate::error::{CliError, Result};

pub const HEADER: &str = "algo,run,preset,seed,n,steps,comparisons,swaps,duration_cpu_ms,duration_visual_ms,sorted,error";

/// One measured run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRow {
    pub algo: &'static str,
    pub run: u32,
    pub preset: String,
    pub seed: Option<u64>,
    pub n: usize,
    pub steps: u64,
    pub metrics: Metrics,
    pub duration_cpu_ms: f64,
    pub duration_visual_ms: f64,
    pub sorted: bool,
    pub error: Option<String>,
}

impl BenchRow {
    fn write_csv(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{:.3},{:.1},{},{}",
            self.algo,
            self.run,
            self.preset,
            self.seed.map(|s| s.to_string()).unwrap_or_default(),
            self.n,
            self.steps,
            self.metrics.comparisons,
            self.metrics.swaps,
            self.duration_cpu_ms,
            self.duration_visual_ms,
            self.sorted,
            self.error.as_deref().map(quote).unwrap_or_default()
        )
    }
}

fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// Milliseconds one frame lasts at `fps`.
fn frame_ms(fps: u32) -> f64 {
    (1000 / fps.max(1)).max(1) as f64
}

/// Measure `algorithm` on `data`. Failures land in the row, not in `Err`.
#[must_use]
pub fn measure(
    info: &AlgorithmInfo,
    algorithm: &Algorithm,
    data: &Dataset,
    run: u32,
    fps: u32,
) -> BenchRow {
    let mut array = data.values.clone();
    let mut metrics = Metrics::default();
    let mut steps = 0u64;
    let mut error = None;

    let started = Instant::now();
    for step in algorithm(data.values.clone()) {
        if let Err(err) = apply_step(&mut array, &step) {
            warn!(algo = info.key, run, step = steps, %err, "benchmark step failed");
            error = Some(err.to_string());
            break;
        }
        metrics.record(step.op());
        steps += 1;
    }
    let duration_cpu_ms = started.elapsed().as_secs_f64() * 1000.0;

    BenchRow {
        algo: info.key,
        run,
        preset: data.preset.clone().unwrap_or_else(|| "custom".to_string()),
        seed: data.seed,
        n: data.len(),
        steps,
        metrics,
        duration_cpu_ms,
        duration_visual_ms: steps as f64 * frame_ms(fps),
        sorted: error.is_none() && is_sorted(&array),
        error,
    }
}

/// All rows, algorithms ordered by key, runs in order.
pub fn rows(
    args: &BenchmarkArgs,
    registry: &AlgorithmRegistry,
    config: &PlaybackConfig,
) -> Result<Vec<BenchRow>> {
    if args.runs == 0 {
        return Err(CliError::invalid("--runs must be at least 1"));
    }
    let fps = config.clamp_fps(args.fps.unwrap_or(config.fps_default));
    let mut infos: Vec<&AlgorithmInfo> = registry.infos().collect();
    infos.sort_by_key(|info| info.key);

    let mut out = Vec::with_capacity(infos.len() * args.runs as usize);
    for run in 0..args.runs {
        let data = dataset::resolve(&args.dataset, config, u64::from(run))?;
        for info in &infos {
            let (_, algorithm) = registry.get(info.key)?;
            let row = measure(info, &algorithm, &data, run, fps);
            debug!(algo = row.algo, run, steps = row.steps, sorted = row.sorted, "measured");
            out.push(row);
        }
    }
    out.sort_by(|a, b| a.algo.cmp(b.algo).then(a.run.cmp(&b.run)));
    Ok(out)
}

pub fn run(
    args: &BenchmarkArgs,
    registry: &AlgorithmRegistry,
    config: &PlaybackConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = rows(args, registry, config)?;
    let failures = rows.iter().filter(|r| !r.sorted).count();
    info!(rows = rows.len(), failures, "benchmark complete");

    match &args.out {
        None => write_rows(&rows, out)?,
        Some(path) => {
            let file = File::create(path).map_err(|e| CliError::io(path, e))?;
            let mut writer = BufWriter::new(file);
            write_rows(&rows, &mut writer)
                .and_then(|()| writer.flush())
                .map_err(|e| CliError::io(path, e))?;
            report_written(out, path, rows.len())?;
        }
    }
    Ok(())
}

fn write_rows(rows: &[BenchRow], out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for row in rows {
        row.write_csv(out)?;
    }
    Ok(())
}

fn report_written(out: &mut dyn Write, path: &Path, rows: usize) -> std::io::Result<()> {
    writeln!(out, "wrote {rows} rows to {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DatasetArgs;
    use sortviz_core::{Step, StepIter, algorithm};

    fn args(runs: u32) -> BenchmarkArgs {
        BenchmarkArgs {
            dataset: DatasetArgs {
                preset: "few_unique".into(),
                n: Some(10),
                seed: 5,
                ..DatasetArgs::default()
            },
            runs,
            fps: Some(50),
            out: None,
        }
    }

    #[test]
    fn every_builtin_sorts_every_run() {
        let registry = AlgorithmRegistry::builtin();
        let rows = rows(&args(2), &registry, &PlaybackConfig::default()).unwrap();
        assert_eq!(rows.len(), registry.len() * 2);
        for row in &rows {
            assert!(row.sorted, "{} run {} unsorted", row.algo, row.run);
            assert!(row.error.is_none());
            assert_eq!(row.seed, Some(5 + u64::from(row.run)));
            assert_eq!(row.duration_visual_ms, row.steps as f64 * 20.0);
        }
        let keys: Vec<_> = rows.iter().map(|r| (r.algo, r.run)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn failing_algorithm_is_reported_in_its_row() {
        let info = *AlgorithmRegistry::builtin().info("bubble").unwrap();
        let broken = algorithm(|_a: Vec<i64>| -> StepIter {
            Box::new([Step::compare(0, 1), Step::swap(0, 99)].into_iter())
        });
        let data = Dataset {
            preset: None,
            seed: None,
            min: 1,
            max: 3,
            values: vec![3, 1, 2],
        };
        let row = measure(&info, &broken, &data, 0, 24);
        assert_eq!(row.steps, 1);
        assert_eq!(row.metrics.comparisons, 1);
        assert!(!row.sorted);
        assert!(row.error.is_some());
        assert_eq!(row.preset, "custom");

        let mut buf = Vec::new();
        row.write_csv(&mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with("bubble,0,custom,,3,1,1,0,"), "{line}");
        assert!(line.trim_end().ends_with('"'));
    }

    #[test]
    fn zero_runs_is_rejected() {
        let err = rows(&args(0), &AlgorithmRegistry::builtin(), &PlaybackConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn csv_goes_to_the_requested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.csv");
        let mut a = args(1);
        a.out = Some(path.clone());
        let mut buf = Vec::new();
        run(&a, &AlgorithmRegistry::builtin(), &PlaybackConfig::default(), &mut buf).unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv.lines().next(), Some(HEADER));
        assert_eq!(csv.lines().count(), 1 + AlgorithmRegistry::builtin().len());
        assert!(String::from_utf8(buf).unwrap().starts_with("wrote 10 rows"));
    }
}
