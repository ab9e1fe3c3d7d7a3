#![forbid(unsafe_code)]

//! One module per subcommand. Each writes only to the `out` it is given.

pub mod benchmark;
pub mod compare;
pub mod export;
pub mod list;
pub mod run;
pub mod verify;

use sortviz_runtime::{Pane, PlaybackConfig};

use crate::cli::PlaybackArgs;

/// Apply `--fps`, `--per-tick` and `--per-second` to a pane.
pub(crate) fn apply_playback(pane: &mut Pane, args: &PlaybackArgs, config: &PlaybackConfig) {
    pane.set_fps(args.fps.unwrap_or(config.fps_default));
    if args.per_tick.is_some() || args.per_second.is_some() {
        pane.set_step_caps(args.per_tick, args.per_second);
    }
}

/// Whether `values` is in non-decreasing order.
pub(crate) fn is_sorted(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
