#![forbid(unsafe_code)]

//! Turning dataset flags into an array.

use serde::Serialize;
use sortviz_algos::presets;
use sortviz_core::TraceConfig;
use sortviz_runtime::PlaybackConfig;

use crate::cli::DatasetArgs;
use crate::error::{CliError, Result};

/// A resolved dataset and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Preset key, or `None` for explicit `--values`.
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub min: i64,
    pub max: i64,
    pub values: Vec<i64>,
}

impl Dataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn trace_config(&self, fps: u32) -> TraceConfig {
        TraceConfig {
            n: self.values.len(),
            min: self.min,
            max: self.max,
            fps,
        }
    }

    /// `random n=32 seed=7`, or `custom n=5`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.preset, self.seed) {
            (Some(preset), Some(seed)) => format!("{preset} n={} seed={seed}", self.len()),
            _ => format!("custom n={}", self.len()),
        }
    }
}

/// Build the dataset for `args`, offsetting the seed by `run`.
///
/// Explicit values ignore the preset, the seed and the offset.
pub fn resolve(args: &DatasetArgs, config: &PlaybackConfig, run: u64) -> Result<Dataset> {
    if let Some(raw) = &args.values {
        let values = parse_values(raw)?;
        let min = values.iter().copied().min().unwrap_or(config.min_val);
        let max = values.iter().copied().max().unwrap_or(config.max_val);
        return Ok(Dataset {
            preset: None,
            seed: None,
            min,
            max,
            values,
        });
    }

    let n = args.n.unwrap_or(config.default_n);
    if n < config.min_n || n > config.max_n {
        return Err(CliError::invalid(format!(
            "--n {n} is outside {}..={}",
            config.min_n, config.max_n
        )));
    }
    let min = args.min.unwrap_or(config.min_val);
    let max = args.max.unwrap_or(config.max_val);
    let seed = args.seed.wrapping_add(run);
    let values = presets::generate(&args.preset, n, min, max, &mut presets::seeded_rng(seed))?;
    tracing::debug!(preset = %args.preset, n, min, max, seed, "dataset generated");
    Ok(Dataset {
        preset: Some(args.preset.clone()),
        seed: Some(seed),
        min,
        max,
        values,
    })
}

/// Parse `5,3,-1` into values. Whitespace around items is ignored.
pub fn parse_values(raw: &str) -> Result<Vec<i64>> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|_| CliError::invalid(format!("--values: {item:?} is not an integer")))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        return Err(CliError::invalid("--values needs at least one integer"));
    }
    Ok(values)
}
