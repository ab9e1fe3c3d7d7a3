#![forbid(unsafe_code)]

//! Side-by-side playback of two algorithms on the same dataset.
//!
//! The two panes share a clock source but nothing else: each side owns its
//! own copy of the data, its own wall and logical time, and finishes on its
//! own schedule. Commands fan out; results come back per side.

use std::time::Duration;

use sortviz_core::{Algorithm, TraceError};

use crate::clock::SharedClock;
use crate::config::PlaybackConfig;
use crate::pane::{Pane, PlaybackState};
use crate::player::Capability;

/// A value for each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sides<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sides<U> {
        Sides {
            left: f(self.left),
            right: f(self.right),
        }
    }

    pub fn as_ref(&self) -> Sides<&T> {
        Sides {
            left: &self.left,
            right: &self.right,
        }
    }
}

#[derive(Debug)]
pub struct CompareController {
    left: Pane,
    right: Pane,
}

impl CompareController {
    #[must_use]
    pub fn new(
        left: Algorithm,
        right: Algorithm,
        dataset: &[i64],
        config: &PlaybackConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            left: Pane::with_clock(left, dataset.to_vec(), config.clone(), clock.clone()),
            right: Pane::with_clock(right, dataset.to_vec(), config.clone(), clock),
        }
    }

    #[must_use]
    pub fn left(&self) -> &Pane {
        &self.left
    }

    #[must_use]
    pub fn right(&self) -> &Pane {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut Pane {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut Pane {
        &mut self.right
    }

    fn each<U>(&mut self, mut f: impl FnMut(&mut Pane) -> U) -> Sides<U> {
        Sides {
            left: f(&mut self.left),
            right: f(&mut self.right),
        }
    }

    pub fn play(&mut self) {
        self.each(Pane::play);
    }

    pub fn pause(&mut self) {
        self.each(Pane::pause);
    }

    /// Toggles each side independently, so a finished side stays finished
    /// while the other keeps its own running state.
    pub fn toggle_pause(&mut self) {
        self.each(Pane::toggle_pause);
    }

    pub fn reset(&mut self) {
        self.each(Pane::reset);
    }

    pub fn step_forward(&mut self) -> Sides<Result<bool, TraceError>> {
        self.each(Pane::step_forward)
    }

    /// Steps back only on sides that have the capability.
    pub fn step_back(&mut self) -> Sides<Result<bool, TraceError>> {
        self.each(|pane| {
            if pane.capabilities().get(Capability::StepBack) {
                pane.step_back()
            } else {
                Ok(false)
            }
        })
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.each(|pane| pane.set_fps(fps));
    }

    pub fn poll(&mut self) -> Sides<Result<usize, TraceError>> {
        self.each(Pane::poll)
    }

    /// True while either side plays.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.left.is_running() || self.right.is_running()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.left.is_finished() && self.right.is_finished()
    }

    #[must_use]
    pub fn states(&self) -> Sides<PlaybackState> {
        Sides {
            left: self.left.state(),
            right: self.right.state(),
        }
    }

    /// Earliest deadline across both sides.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.left.next_deadline(), self.right.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
