#![forbid(unsafe_code)]

use std::io::Write;

use serde::Serialize;
use sortviz_algos::{AlgorithmInfo, AlgorithmRegistry, Preset};

use crate::cli::ListArgs;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct PresetEntry {
    key: &'static str,
    label: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    algorithms: Vec<&'a AlgorithmInfo>,
    presets: Vec<PresetEntry>,
}

pub fn run(args: &ListArgs, registry: &AlgorithmRegistry, out: &mut dyn Write) -> Result<()> {
    let mut algorithms: Vec<&AlgorithmInfo> = registry.infos().collect();
    algorithms.sort_by_key(|info| info.key);
    let presets = Preset::ALL
        .into_iter()
        .map(|p| PresetEntry {
            key: p.key(),
            label: p.label(),
            description: p.description(),
        })
        .collect::<Vec<_>>();

    if args.json {
        let listing = Listing {
            algorithms,
            presets,
        };
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Algorithms:")?;
    for info in &algorithms {
        let mut traits = Vec::new();
        if info.stable {
            traits.push("stable");
        }
        if info.in_place {
            traits.push("in-place");
        }
        if !info.comparison {
            traits.push("non-comparison");
        }
        writeln!(
            out,
            "  {:<10} {:<16} avg {:<12} {}",
            info.key,
            info.name,
            info.complexity.avg,
            traits.join(", ")
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Presets:")?;
    for preset in &presets {
        writeln!(out, "  {:<15} {}", preset.key, preset.description)?;
    }
    Ok(())
}
