#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "merge",
    name: "Merge Sort",
    stable: true,
    in_place: false,
    comparison: true,
    complexity: Complexity {
        best: "O(n log n)",
        avg: "O(n log n)",
        worst: "O(n log n)",
    },
    description: "Bottom-up merge sort that merges adjacent runs of doubling width \
                  until the whole array is one run.",
    notes: &[
        "Stable",
        "Deterministic iteration order",
        "Copies each merge window into a scratch buffer",
    ],
};

/// Bottom-up merge sort.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Merge {
        a,
        width: 1,
        lo: 0,
        window: None,
    })
}

/// One merge of `aux[..left_len]` and `aux[left_len..]` back into `lo..`.
pub(super) struct Window {
    lo: usize,
    aux: Vec<i64>,
    left_len: usize,
    i: usize,
    j: usize,
    k: usize,
}

impl Window {
    /// Merge the sorted halves `a[lo..mid]` and `a[mid..end]`, queueing the
    /// `merge_mark` that opens it.
    pub(super) fn open(a: &[i64], lo: usize, mid: usize, end: usize, out: &mut VecDeque<Step>) -> Self {
        out.push_back(Step::merge_mark(lo, end - 1));
        Self {
            lo,
            aux: a[lo..end].to_vec(),
            left_len: mid - lo,
            i: 0,
            j: mid - lo,
            k: 0,
        }
    }

    /// Write the next merged value into `a`. Returns `false` once the window
    /// is fully written.
    pub(super) fn advance(&mut self, a: &mut [i64], out: &mut VecDeque<Step>) -> bool {
        if self.k >= self.aux.len() {
            return false;
        }
        let dest = self.lo + self.k;
        let take_left = if self.i >= self.left_len {
            false
        } else if self.j >= self.aux.len() {
            true
        } else {
            out.push_back(Step::merge_compare(self.lo + self.i, self.lo + self.j, dest));
            self.aux[self.i] <= self.aux[self.j]
        };
        let value = if take_left {
            self.i += 1;
            self.aux[self.i - 1]
        } else {
            self.j += 1;
            self.aux[self.j - 1]
        };
        out.push_back(Step::set(dest, value));
        a[dest] = value;
        self.k += 1;
        true
    }
}

struct Merge {
    a: Vec<i64>,
    width: usize,
    lo: usize,
    window: Option<Window>,
}

impl Stepper for Merge {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        if let Some(w) = &mut self.window {
            if !w.advance(&mut self.a, out) {
                self.window = None;
            }
            return true;
        }

        let n = self.a.len();
        if self.width >= n {
            confirm_all(n, out);
            return false;
        }
        if self.lo >= n {
            self.width *= 2;
            self.lo = 0;
            return true;
        }
        let lo = self.lo;
        let mid = (lo + self.width).min(n);
        let end = (lo + 2 * self.width).min(n);
        self.lo += 2 * self.width;
        if mid < end {
            self.window = Some(Window::open(&self.a, lo, mid, end, out));
        }
        true
    }
}
