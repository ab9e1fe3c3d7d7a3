#![forbid(unsafe_code)]

//! Time-driven playback for sortviz runs.
//!
//! - [`player`]: the frame-paced timing engine and its [`Transport`] seam
//! - [`pane`]: one run bound to one player ([`Pane`], a.k.a. [`RunHandle`])
//! - [`compare`]: two panes driven side by side
//! - [`config`]: [`PlaybackConfig`] loading and validation
//! - [`clock`], [`stopwatch`], [`ticker`]: time plumbing
//! - [`notify`]: playback events and observer registration
//!
//! Nothing here spawns threads or sleeps. `play()` arms a ticker; the host
//! calls `poll()` at or after [`Pane::next_deadline`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sortviz_core::{Step, StepIter, algorithm};
//! use sortviz_runtime::{ManualClock, Pane, PlaybackConfig};
//!
//! let swap_once = algorithm(|_a: Vec<i64>| -> StepIter { Box::new(std::iter::once(Step::swap(0, 1))) });
//! let clock = Arc::new(ManualClock::new());
//! let mut pane = Pane::with_clock(swap_once, vec![2, 1], PlaybackConfig::default(), clock.clone());
//! pane.play();
//! while let Some(deadline) = pane.next_deadline() {
//!     clock.set(deadline);
//!     pane.poll().unwrap();
//! }
//! assert_eq!(pane.array(), &[1, 2]);
//! assert!(pane.is_finished());
//! ```

pub mod clock;
pub mod compare;
pub mod config;
pub mod notify;
pub mod pane;
pub mod player;
pub mod stopwatch;
pub mod ticker;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use compare::{CompareController, Sides};
pub use config::{ConfigError, ENV_PREFIX, PlaybackConfig};
pub use notify::{
    Backpressure, BackpressureReason, Observers, PlaybackEvent, SubscriptionId,
};
pub use pane::{Pane, PlaybackState, RunHandle, ViewFlags};
pub use player::{Capabilities, Capability, Player, PlayerState, StepCaps, Transport};
pub use stopwatch::Stopwatch;
pub use ticker::Ticker;
