#![forbid(unsafe_code)]

//! One playable run: a [`Player`] bound to a [`RunState`].
//!
//! [`Pane`] is the handle hosts hold. It owns the run exclusively, adapts it
//! to the engine's [`Transport`] seam, keeps the view flags a renderer reads,
//! and drives the post-finish confirm sweep from the same `poll()` call as
//! playback.

use std::time::Duration;

use serde::Serialize;
use sortviz_core::{
    Advance, Algorithm, ExportRow, Highlights, RunState, SourceMode, Step, TraceDocument,
    TraceError, TraceMeta, export_rows,
};

use crate::clock::{MonotonicClock, SharedClock};
use crate::config::PlaybackConfig;
use crate::notify::{PlaybackEvent, SubscriptionId};
use crate::player::{Capabilities, Capability, Player, PlayerState, Transport};
use crate::ticker::Ticker;

/// The external name for a pane.
pub type RunHandle = Pane;

/// Snapshot of a pane for display or assertions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub step_index: usize,
    /// `None` while the source has not been drained.
    pub total_steps: Option<usize>,
    pub comparisons: u64,
    pub swaps: u64,
    pub wall_elapsed_seconds: f64,
    pub logical_elapsed_seconds: f64,
    pub array: Vec<i64>,
}

/// Renderer-facing toggles. Playback ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewFlags {
    pub hud: bool,
    pub details: bool,
    pub values: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            hud: true,
            details: false,
            values: false,
        }
    }
}

/// Borrowed adapter from [`RunState`] to [`Transport`].
struct RunTransport<'a> {
    run: &'a mut RunState,
}

impl Transport for RunTransport<'_> {
    fn step_forward(&mut self) -> Result<bool, TraceError> {
        Ok(matches!(self.run.forward()?, Advance::Applied(_)))
    }

    fn step_back(&mut self) -> Result<bool, TraceError> {
        let moved = self.run.back()?;
        if moved {
            self.run.reopen();
        }
        Ok(moved)
    }

    fn step_index(&self) -> usize {
        self.run.step_index()
    }

    fn total_steps(&self) -> usize {
        self.run.total().unwrap_or(0)
    }

    fn on_finished(&mut self) {
        self.run.finish();
    }
}

pub struct Pane {
    player: Player,
    run: RunState,
    algorithm: Algorithm,
    config: PlaybackConfig,
    sweep: Ticker,
    view: ViewFlags,
    last_error: Option<TraceError>,
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("player", &self.player)
            .field("run", &self.run)
            .field("view", &self.view)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Pane {
    /// Build a pane on the real monotonic clock.
    #[must_use]
    pub fn create(algorithm: Algorithm, initial: Vec<i64>, config: PlaybackConfig) -> Self {
        Self::with_clock(algorithm, initial, config, MonotonicClock::shared())
    }

    #[must_use]
    pub fn with_clock(
        algorithm: Algorithm,
        initial: Vec<i64>,
        config: PlaybackConfig,
        clock: SharedClock,
    ) -> Self {
        let run = RunState::prime(&algorithm, initial, config.run_config());
        let mut pane = Self {
            player: Player::new(&config, clock),
            run,
            algorithm,
            sweep: Ticker::with_hz(config.confirm_sweep_hz),
            config,
            view: ViewFlags::default(),
            last_error: None,
        };
        pane.sync_capabilities();
        pane
    }

    // --- transport ---------------------------------------------------------

    pub fn play(&mut self) {
        self.player.play();
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn toggle_pause(&mut self) {
        self.player.toggle_pause();
    }

    /// Discard the run and start over on the same input and algorithm.
    pub fn reset(&mut self) {
        self.player.reset();
        let initial = self.run.initial().to_vec();
        self.run = RunState::prime(&self.algorithm, initial, self.config.run_config());
        self.sweep.stop();
        self.last_error = None;
        self.sync_capabilities();
    }

    /// Apply one step while paused. `false` when finished or exhausted.
    pub fn step_forward(&mut self) -> Result<bool, TraceError> {
        let mut transport = RunTransport { run: &mut self.run };
        let moved = self.player.step_forward(&mut transport)?;
        self.arm_sweep();
        Ok(moved)
    }

    /// Undo one step while paused. `false` at index 0 or without the
    /// `step_back` capability.
    pub fn step_back(&mut self) -> Result<bool, TraceError> {
        let mut transport = RunTransport { run: &mut self.run };
        let moved = self.player.step_back(&mut transport)?;
        if moved {
            self.sweep.stop();
        }
        Ok(moved)
    }

    /// Jump to `target` steps, pausing playback.
    ///
    /// Targets past the applied log pull new steps from the source; targets
    /// past the end of the trace stop there. Returns the index reached.
    /// A step that fails on the way leaves the pane at the last good step,
    /// with the error kept in [`last_error`](Self::last_error).
    pub fn seek(&mut self, target: usize) -> Result<usize, TraceError> {
        self.player.pause();
        let logged = self.run.log().len();
        if target <= logged {
            self.run.seek(target)?;
        } else {
            self.run.seek(logged)?;
            while self.run.step_index() < target {
                match self.run.forward() {
                    Ok(Advance::Exhausted) => break,
                    Ok(_) => {}
                    Err(err) => {
                        let reached = self.run.step_index();
                        self.player.sync_to_step(reached);
                        tracing::warn!(requested = target, reached, error = %err, "seek aborted");
                        self.last_error = Some(err.clone());
                        return Err(err);
                    }
                }
            }
        }
        let reached = self.run.step_index();
        if reached < self.run.log().len() {
            self.run.reopen();
            self.sweep.stop();
        }
        self.player.sync_to_step(reached);
        tracing::debug!(requested = target, reached, "seek");
        Ok(reached)
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.player.set_visual_fps(fps);
    }

    pub fn set_step_caps(&mut self, per_tick: Option<u32>, per_second: Option<u32>) {
        self.player.set_step_caps(per_tick, per_second);
    }

    /// Host loop entry point: runs a playback tick and a sweep tick when due.
    ///
    /// Returns the number of steps applied. A failing step pauses playback;
    /// the error is returned and kept in [`last_error`](Self::last_error).
    pub fn poll(&mut self) -> Result<usize, TraceError> {
        let mut transport = RunTransport { run: &mut self.run };
        let applied = match self.player.poll(&mut transport) {
            Ok(n) => n,
            Err(err) => {
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        self.arm_sweep();
        let now = self.player.clock().now_mono();
        if self.sweep.fire(now) && !self.run.advance_sweep() {
            self.sweep.stop();
        }
        if !self.run.is_sweeping() {
            self.sweep.stop();
        }
        Ok(applied)
    }

    fn arm_sweep(&mut self) {
        if self.run.is_sweeping() && !self.sweep.is_active() {
            self.sweep.start(self.player.clock().now_mono());
        }
    }

    // --- run replacement ---------------------------------------------------

    /// Swap the algorithm; the current run is discarded.
    pub fn replace_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
        self.reset();
    }

    /// Swap the input array; the current run is discarded.
    pub fn load_array(&mut self, array: Vec<i64>) {
        self.player.reset();
        self.run = RunState::prime(&self.algorithm, array, self.config.run_config());
        self.sweep.stop();
        self.last_error = None;
        self.sync_capabilities();
    }

    fn sync_capabilities(&mut self) {
        let precomputed = self.run.source_mode() == SourceMode::Precomputed;
        self.player.set_capability(Capability::TrueTotal, precomputed);
    }

    // --- queries -----------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        let metrics = self.run.metrics();
        PlaybackState {
            step_index: self.run.step_index(),
            total_steps: self.run.total(),
            comparisons: metrics.comparisons,
            swaps: metrics.swaps,
            wall_elapsed_seconds: self.player.elapsed_seconds(),
            logical_elapsed_seconds: self.player.logical_seconds(),
            array: self.run.array().to_vec(),
        }
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.run.step_index()
    }

    /// Total steps, or 0 while unknown.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.run.total().unwrap_or(0)
    }

    #[must_use]
    pub fn array(&self) -> &[i64] {
        self.run.array()
    }

    #[must_use]
    pub fn run(&self) -> &RunState {
        &self.run
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.player.is_running()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.player.is_finished()
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.player.fps()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.player.elapsed_seconds()
    }

    #[must_use]
    pub fn logical_seconds(&self) -> f64 {
        self.player.logical_seconds()
    }

    #[must_use]
    pub fn highlights(&self) -> &Highlights {
        self.run.highlights()
    }

    #[must_use]
    pub fn narration(&self) -> &str {
        self.run.narration()
    }

    /// Indices revealed by the confirm sweep so far.
    #[must_use]
    pub fn confirmed(&self) -> std::ops::Range<usize> {
        self.run.confirmed()
    }

    /// Error from the last failed automatic tick.
    #[must_use]
    pub fn last_error(&self) -> Option<&TraceError> {
        self.last_error.as_ref()
    }

    /// Earliest time the host needs to call [`poll`](Self::poll) again.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.player.next_deadline(), self.sweep.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // --- capabilities and observers ----------------------------------------

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.player.capabilities()
    }

    pub fn set_capability(&mut self, cap: Capability, value: bool) {
        self.player.set_capability(cap, value);
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + Send + 'static,
    {
        self.player.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.player.unsubscribe(id)
    }

    // --- view flags --------------------------------------------------------

    #[must_use]
    pub fn view(&self) -> ViewFlags {
        self.view
    }

    pub fn set_hud_visible(&mut self, show: bool) {
        self.view.hud = show;
    }

    #[must_use]
    pub fn hud_visible(&self) -> bool {
        self.view.hud
    }

    pub fn toggle_details(&mut self, on: bool) {
        self.view.details = on;
    }

    #[must_use]
    pub fn details_visible(&self) -> bool {
        self.view.details
    }

    pub fn set_show_values(&mut self, show: bool) {
        self.view.values = show;
    }

    #[must_use]
    pub fn show_values(&self) -> bool {
        self.view.values
    }

    // --- export ------------------------------------------------------------

    /// The applied steps, as a trace document.
    #[must_use]
    pub fn export_trace(&self, meta: TraceMeta) -> TraceDocument {
        TraceDocument::new(
            meta,
            self.run.initial(),
            self.run.log(),
            self.player.logical_seconds(),
        )
    }

    #[must_use]
    pub fn export_rows(&self) -> Vec<ExportRow> {
        export_rows(self.run.log())
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        self.run.log()
    }
}
