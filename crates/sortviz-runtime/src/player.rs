#![forbid(unsafe_code)]

//! Frame-paced playback engine.
//!
//! [`Player`] decides *when* steps happen; a [`Transport`] decides *what* a
//! step is. The engine never touches array state: it asks the transport to
//! move, records the nominal duration of every step it applies, and reports
//! progress through [`PlaybackEvent`]s.
//!
//! # Timing model
//!
//! - Wall-clock time comes from a [`Stopwatch`] that excludes paused spans.
//!   It is for live display only.
//! - Logical time is the sum of `1/fps` at the moment each step was applied.
//!   It is deterministic and is what exports carry.
//!
//! A tick computes ideal step times from an anchor taken on `play()` rather
//! than from timer callbacks, so late ticks catch up (up to `per_tick` steps)
//! and early ticks do not double-step.
//!
//! # Rate limiting
//!
//! Every step applied by a tick is first admitted by a rolling one-second
//! window holding at most `per_second` steps. A full window raises
//! backpressure once; the next window clears it once.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use sortviz_core::TraceError;

use crate::clock::SharedClock;
use crate::config::PlaybackConfig;
use crate::notify::{Backpressure, Observers, PlaybackEvent, SubscriptionId};
use crate::stopwatch::Stopwatch;
use crate::ticker::Ticker;

const WINDOW: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// What the engine drives.
pub trait Transport {
    /// Apply the next step. `Ok(false)` means nothing is left.
    fn step_forward(&mut self) -> Result<bool, TraceError>;
    /// Undo the last step. `Ok(false)` at the start of the run.
    fn step_back(&mut self) -> Result<bool, TraceError>;
    fn step_index(&self) -> usize;
    /// Total number of steps, or 0 while unknown.
    fn total_steps(&self) -> usize;
    /// Called once when the run completes, before `Finished` is emitted.
    fn on_finished(&mut self);
}

// ---------------------------------------------------------------------------
// State, caps, capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Running,
    Paused,
    /// Terminal until `reset()`, a step back or a seek.
    Finished,
}

/// Per-tick and per-second step limits. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepCaps {
    pub per_tick: u32,
    pub per_second: u32,
}

impl Default for StepCaps {
    fn default() -> Self {
        Self {
            per_tick: 8,
            per_second: 1000,
        }
    }
}

/// Capability keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    StepBack,
    TrueTotal,
    TrueTime,
    Detach,
}

impl Capability {
    pub const ALL: [Self; 4] = [Self::StepBack, Self::TrueTotal, Self::TrueTime, Self::Detach];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::StepBack => "step_back",
            Self::TrueTotal => "true_total",
            Self::TrueTime => "true_time",
            Self::Detach => "detach",
        }
    }
}

/// Features a host may offer for this player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub step_back: bool,
    /// The total step count is known up front.
    pub true_total: bool,
    /// Logical time is exact.
    pub true_time: bool,
    pub detach: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            step_back: true,
            true_total: true,
            true_time: true,
            detach: false,
        }
    }
}

impl Capabilities {
    #[must_use]
    pub const fn get(&self, cap: Capability) -> bool {
        match cap {
            Capability::StepBack => self.step_back,
            Capability::TrueTotal => self.true_total,
            Capability::TrueTime => self.true_time,
            Capability::Detach => self.detach,
        }
    }

    pub fn set(&mut self, cap: Capability, value: bool) {
        let slot = match cap {
            Capability::StepBack => &mut self.step_back,
            Capability::TrueTotal => &mut self.true_total,
            Capability::TrueTime => &mut self.true_time,
            Capability::Detach => &mut self.detach,
        };
        *slot = value;
    }
}

/// Result of asking the transport for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Advanced,
    /// The step reached the known total; the run is now finished.
    Completed,
    /// Nothing was left; the run is now finished.
    Exhausted,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub struct Player {
    clock: SharedClock,
    state: PlayerState,
    fps: u32,
    fps_min: u32,
    fps_max: u32,
    jitter: Duration,
    caps: StepCaps,
    capabilities: Capabilities,
    ticker: Ticker,
    stopwatch: Stopwatch,
    /// Nominal duration of every applied step, most recent last.
    durations: Vec<Duration>,
    logical: Duration,
    anchor: Duration,
    frames: u64,
    window_start: Duration,
    steps_in_window: u32,
    under_backpressure: bool,
    observers: Observers,
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state)
            .field("fps", &self.fps)
            .field("caps", &self.caps)
            .field("logical", &self.logical)
            .field("durations", &self.durations.len())
            .field("frames", &self.frames)
            .field("under_backpressure", &self.under_backpressure)
            .field("observers", &self.observers)
            .finish()
    }
}

impl Player {
    #[must_use]
    pub fn new(config: &PlaybackConfig, clock: SharedClock) -> Self {
        let fps = config.clamp_fps(config.fps_default);
        let now = clock.now_mono();
        Self {
            clock,
            state: PlayerState::Idle,
            fps,
            fps_min: config.fps_min.max(1),
            fps_max: config.fps_max.max(config.fps_min).max(1),
            jitter: config.jitter_budget(),
            caps: StepCaps {
                per_tick: config.per_tick.max(1),
                per_second: config.per_second.max(1),
            },
            capabilities: Capabilities::default(),
            ticker: Ticker::new(interval_for(fps)),
            stopwatch: Stopwatch::new(),
            durations: Vec::new(),
            logical: Duration::ZERO,
            anchor: now,
            frames: 0,
            window_start: now,
            steps_in_window: 0,
            under_backpressure: false,
            observers: Observers::new(),
        }
    }

    // --- queries -----------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == PlayerState::Running
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == PlayerState::Finished
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Ticker period: `1000 / fps` milliseconds, at least 1.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.ticker.interval()
    }

    #[must_use]
    pub fn caps(&self) -> StepCaps {
        self.caps
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.get(cap)
    }

    pub fn set_capability(&mut self, cap: Capability, value: bool) {
        self.capabilities.set(cap, value);
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed(self.clock.now_mono())
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    #[must_use]
    pub fn logical(&self) -> Duration {
        self.logical
    }

    #[must_use]
    pub fn logical_seconds(&self) -> f64 {
        self.logical.as_secs_f64()
    }

    #[must_use]
    pub fn under_backpressure(&self) -> bool {
        self.under_backpressure
    }

    /// When the host should next call [`poll`](Self::poll), if running.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.ticker.next_deadline()
    }

    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Duration of one step at the current rate.
    #[must_use]
    pub fn nominal_step(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    // --- observers ---------------------------------------------------------

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // --- configuration -----------------------------------------------------

    /// Change the frame rate, clamped to the configured range.
    ///
    /// A running player restarts its ticker and re-anchors at the new rate;
    /// already recorded step durations are kept.
    pub fn set_visual_fps(&mut self, fps: u32) {
        let fps = fps.clamp(self.fps_min, self.fps_max);
        if fps == self.fps {
            return;
        }
        let now = self.clock.now_mono();
        self.fps = fps;
        self.ticker.set_interval(interval_for(fps), now);
        if self.is_running() {
            self.anchor = now;
            self.frames = 0;
        }
        tracing::debug!(fps, interval_ms = interval_for(fps).as_millis() as u64, "fps changed");
    }

    /// Update the step caps. `None` keeps the current value; zero becomes 1.
    pub fn set_step_caps(&mut self, per_tick: Option<u32>, per_second: Option<u32>) {
        if let Some(n) = per_tick {
            self.caps.per_tick = n.max(1);
        }
        if let Some(n) = per_second {
            self.caps.per_second = n.max(1);
        }
        tracing::debug!(per_tick = self.caps.per_tick, per_second = self.caps.per_second, "step caps");
    }

    // --- transport ---------------------------------------------------------

    /// Start or resume. No-op while running or finished.
    ///
    /// The per-second window and its count survive a pause, so toggling
    /// playback cannot admit more than `per_second` steps per window.
    pub fn play(&mut self) {
        if matches!(self.state, PlayerState::Running | PlayerState::Finished) {
            return;
        }
        let now = self.clock.now_mono();
        self.anchor = now;
        self.frames = 0;
        self.stopwatch.start(now);
        self.ticker.start(now);
        self.state = PlayerState::Running;
        tracing::info!(fps = self.fps, "play");
        self.emit_elapsed();
    }

    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        let now = self.clock.now_mono();
        self.ticker.stop();
        self.stopwatch.pause(now);
        self.state = PlayerState::Paused;
        tracing::info!(elapsed_s = self.elapsed_seconds(), "pause");
        self.emit_elapsed();
    }

    pub fn toggle_pause(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Back to `Idle` with zeroed clocks. Active backpressure is cleared
    /// with a notification.
    pub fn reset(&mut self) {
        self.pause();
        let now = self.clock.now_mono();
        self.stopwatch.reset();
        self.logical = Duration::ZERO;
        self.durations.clear();
        self.anchor = now;
        self.frames = 0;
        self.window_start = now;
        self.steps_in_window = 0;
        if self.under_backpressure {
            self.under_backpressure = false;
            self.observers
                .emit(&PlaybackEvent::Backpressure(Backpressure::cleared()));
        }
        self.state = PlayerState::Idle;
        tracing::info!("reset");
        self.emit_elapsed();
        self.emit_logical();
    }

    /// Pause and apply exactly one step.
    ///
    /// Returns `false` when already finished or when nothing was left.
    pub fn step_forward(&mut self, transport: &mut impl Transport) -> Result<bool, TraceError> {
        self.pause();
        if self.is_finished() {
            return Ok(false);
        }
        if self.state == PlayerState::Idle {
            self.state = PlayerState::Paused;
        }
        Ok(self.step_once(transport)? != StepOutcome::Exhausted)
    }

    /// Pause and undo one step, restoring its logical duration.
    ///
    /// No-op without the `step_back` capability.
    pub fn step_back(&mut self, transport: &mut impl Transport) -> Result<bool, TraceError> {
        if !self.capabilities.step_back {
            return Ok(false);
        }
        self.pause();
        if !transport.step_back()? {
            return Ok(false);
        }
        let dt = self.durations.pop().unwrap_or_else(|| self.nominal_step());
        self.logical = self.logical.saturating_sub(dt);
        if matches!(self.state, PlayerState::Finished | PlayerState::Idle) {
            self.state = PlayerState::Paused;
        }
        let index = transport.step_index();
        tracing::debug!(step_index = index, logical_s = self.logical_seconds(), "step back");
        self.observers.emit(&PlaybackEvent::Stepped(index));
        self.emit_elapsed();
        self.emit_logical();
        Ok(true)
    }

    /// Re-align logical time with an externally seeked step index.
    ///
    /// Durations recorded for steps before `target` are kept; missing ones
    /// are filled with the current nominal duration. Clears `Finished`.
    pub fn sync_to_step(&mut self, target: usize) {
        if target <= self.durations.len() {
            self.durations.truncate(target);
        } else {
            let dt = self.nominal_step();
            self.durations.resize(target, dt);
        }
        self.logical = self.durations.iter().sum();
        let now = self.clock.now_mono();
        self.anchor = now;
        self.frames = 0;
        if self.is_finished() {
            self.state = PlayerState::Paused;
        }
        tracing::debug!(step_index = target, logical_s = self.logical_seconds(), "sync to step");
        self.emit_logical();
    }

    /// Run one tick if the ticker is due. Returns the number of steps applied.
    pub fn poll(&mut self, transport: &mut impl Transport) -> Result<usize, TraceError> {
        let now = self.clock.now_mono();
        if !self.ticker.fire(now) {
            return Ok(0);
        }
        self.tick(transport)
    }

    /// Apply the steps owed at the current time.
    ///
    /// Catches up at most `per_tick` steps when behind schedule by more than
    /// the jitter budget, otherwise applies one. Each step must be admitted
    /// by the per-second window. No-op unless running.
    pub fn tick(&mut self, transport: &mut impl Transport) -> Result<usize, TraceError> {
        if !self.is_running() {
            return Ok(0);
        }
        let now = self.clock.now_mono();
        let _span = tracing::debug_span!("tick", frames = self.frames, fps = self.fps).entered();

        let mut applied = 0usize;
        let mut throttled = false;
        while applied < self.caps.per_tick as usize {
            if now <= self.ideal_time(self.frames).saturating_add(self.jitter) {
                break;
            }
            if !self.admit(now) {
                throttled = true;
                break;
            }
            match self.step_once(transport)? {
                StepOutcome::Advanced => {}
                StepOutcome::Completed => return Ok(applied + 1),
                StepOutcome::Exhausted => return Ok(applied),
            }
            applied += 1;
            self.frames += 1;
        }
        if applied == 0 && !throttled && self.admit(now) {
            match self.step_once(transport)? {
                StepOutcome::Advanced => {
                    applied = 1;
                    self.frames += 1;
                }
                StepOutcome::Completed => return Ok(1),
                StepOutcome::Exhausted => return Ok(0),
            }
        }
        tracing::trace!(applied, throttled, "tick done");
        self.emit_elapsed();
        Ok(applied)
    }

    // --- internals ---------------------------------------------------------

    /// When frame `frames` (counted from the anchor) is due.
    fn ideal_time(&self, frames: u64) -> Duration {
        let nanos = u128::from(frames) * 1_000_000_000 / u128::from(self.fps);
        self.anchor
            .saturating_add(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    fn roll_window(&mut self, now: Duration) {
        self.window_start = now;
        self.steps_in_window = 0;
        if self.under_backpressure {
            self.under_backpressure = false;
            tracing::debug!("backpressure cleared");
            self.observers
                .emit(&PlaybackEvent::Backpressure(Backpressure::cleared()));
        }
    }

    /// Admit one step into the rolling window.
    fn admit(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.window_start) >= WINDOW {
            self.roll_window(now);
        }
        if self.steps_in_window >= self.caps.per_second {
            if !self.under_backpressure {
                self.under_backpressure = true;
                tracing::warn!(limit = self.caps.per_second, "per-second step cap reached");
                self.observers.emit(&PlaybackEvent::Backpressure(
                    Backpressure::per_second_cap(self.caps.per_second),
                ));
            }
            return false;
        }
        self.steps_in_window += 1;
        true
    }

    fn step_once(&mut self, transport: &mut impl Transport) -> Result<StepOutcome, TraceError> {
        let advanced = match transport.step_forward() {
            Ok(advanced) => advanced,
            Err(err) => {
                self.pause();
                tracing::warn!(
                    step_index = transport.step_index(),
                    error = %err,
                    "playback aborted"
                );
                return Err(err);
            }
        };
        if !advanced {
            self.finish(transport);
            return Ok(StepOutcome::Exhausted);
        }
        let index = transport.step_index();
        let dt = self.nominal_step();
        self.logical = self.logical.saturating_add(dt);
        self.durations.push(dt);
        self.observers.emit(&PlaybackEvent::Stepped(index));
        let total = transport.total_steps();
        if total > 0 && index >= total {
            self.finish(transport);
            return Ok(StepOutcome::Completed);
        }
        self.emit_logical();
        Ok(StepOutcome::Advanced)
    }

    /// Enter `Finished`. Idempotent.
    fn finish(&mut self, transport: &mut impl Transport) {
        if self.is_finished() {
            return;
        }
        let now = self.clock.now_mono();
        self.ticker.stop();
        self.stopwatch.pause(now);
        self.state = PlayerState::Finished;
        transport.on_finished();
        tracing::info!(
            steps = transport.step_index(),
            logical_s = self.logical_seconds(),
            elapsed_s = self.elapsed_seconds(),
            "finished"
        );
        self.observers.emit(&PlaybackEvent::Finished);
        self.emit_elapsed();
        self.emit_logical();
    }

    fn emit_elapsed(&mut self) {
        let seconds = self.elapsed_seconds();
        self.observers.emit(&PlaybackEvent::ElapsedUpdated(seconds));
    }

    fn emit_logical(&mut self) {
        let seconds = self.logical_seconds();
        self.observers
            .emit(&PlaybackEvent::LogicalElapsedUpdated(seconds));
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_millis(u64::from((1000 / fps.max(1)).max(1)))
}
