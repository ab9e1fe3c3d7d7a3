#![forbid(unsafe_code)]

//! `sortviz verify`: replay an exported JSON trace.

use std::io::Write;

use sortviz_core::TraceDocument;
use tracing::debug;

use crate::cli::VerifyArgs;
use crate::error::{CliError, Result};

/// Replays the document and requires the result to equal its sorted input.
pub fn run(args: &VerifyArgs, out: &mut dyn Write) -> Result<()> {
    let text = std::fs::read_to_string(&args.path).map_err(|e| CliError::io(&args.path, e))?;
    let doc = TraceDocument::from_json(&text)?;
    let mut expected = doc.initial.clone();
    expected.sort_unstable();
    doc.verify(&expected)?;
    debug!(path = %args.path.display(), steps = doc.steps.len(), "trace verified");
    writeln!(
        out,
        "ok: {} sorted {} values in {} steps",
        doc.algo,
        doc.initial.len(),
        doc.steps.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortviz_core::{Step, TraceConfig, TraceMeta};
    use std::path::Path;

    fn write_doc(dir: &Path, initial: &[i64], steps: &[Step]) -> VerifyArgs {
        let meta = TraceMeta {
            algo: "manual".into(),
            preset: None,
            seed: None,
            config: TraceConfig {
                n: initial.len(),
                min: 1,
                max: 9,
                fps: 24,
            },
        };
        let doc = TraceDocument::new(meta, initial, steps, 0.0);
        let path = dir.join("trace.json");
        std::fs::write(&path, doc.to_json_pretty().unwrap()).unwrap();
        VerifyArgs { path }
    }

    #[test]
    fn sorting_trace_passes() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_doc(dir.path(), &[2, 1], &[Step::compare(0, 1), Step::swap(0, 1)]);
        let mut buf = Vec::new();
        run(&args, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "ok: manual sorted 2 values in 2 steps\n"
        );
    }

    #[test]
    fn unsorted_result_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_doc(dir.path(), &[2, 1], &[Step::compare(0, 1)]);
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let args = VerifyArgs {
            path: "/nonexistent/trace.json".into(),
        };
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    }
}
