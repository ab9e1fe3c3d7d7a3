#![forbid(unsafe_code)]

//! The [`Step`] value type: one elementary operation of a sorting algorithm.
//!
//! Steps are immutable and stateless. They describe an action (compare two
//! slots, swap them, write a value) but never carry a before/after snapshot,
//! so the step log can be cloned freely for checkpoint replay.
//!
//! # Wire form
//!
//! ```json
//! { "op": "swap", "indices": [2, 5], "payload": [42, 17] }
//! ```
//!
//! Decoding validates the operation name against the closed [`Op`] set and
//! each operation's arity/payload contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, TraceError};

/// Version of the step data structure carried in exported traces.
pub const STEP_SCHEMA_VERSION: u32 = 1;

/// Index list of a step. Every operation uses at most two indices.
pub type Indices = SmallVec<[usize; 2]>;

// ---------------------------------------------------------------------------
// Operation kinds
// ---------------------------------------------------------------------------

/// The closed set of step operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Compare two elements.
    Compare,
    /// Swap two elements. Optional payload: the two old values.
    Swap,
    /// Move a value into a slot during insertion. Requires an integer payload.
    Shift,
    /// Write a value into a slot. Requires an integer payload.
    #[serde(alias = "write")]
    Set,
    /// Mark the pivot element.
    Pivot,
    /// Mark an inclusive `(lo, hi)` range being merged.
    MergeMark,
    /// Compare two elements during a merge. Optional payload: destination.
    MergeCompare,
    /// Track the key being inserted.
    Key,
    /// Mark an element as being in its final position.
    Confirm,
    /// Free-form annotation.
    Note,
}

impl Op {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Compare,
        Self::Swap,
        Self::Shift,
        Self::Set,
        Self::Pivot,
        Self::MergeMark,
        Self::MergeCompare,
        Self::Key,
        Self::Confirm,
        Self::Note,
    ];

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compare => "compare",
            Self::Swap => "swap",
            Self::Shift => "shift",
            Self::Set => "set",
            Self::Pivot => "pivot",
            Self::MergeMark => "merge_mark",
            Self::MergeCompare => "merge_compare",
            Self::Key => "key",
            Self::Confirm => "confirm",
            Self::Note => "note",
        }
    }

    /// Whether applying this operation changes array contents.
    #[must_use]
    pub const fn mutates_array(self) -> bool {
        matches!(self, Self::Swap | Self::Shift | Self::Set)
    }

    /// Whether this operation counts as one comparison.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Compare | Self::MergeCompare)
    }

    /// Allowed number of indices, as an inclusive range.
    #[must_use]
    pub const fn arity(self) -> (usize, usize) {
        match self {
            Self::Compare | Self::Swap | Self::MergeMark | Self::MergeCompare => (2, 2),
            Self::Shift | Self::Set | Self::Pivot | Self::Confirm => (1, 1),
            Self::Key => (0, 1),
            Self::Note => (0, 2),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "compare" => Ok(Self::Compare),
            "swap" => Ok(Self::Swap),
            "shift" => Ok(Self::Shift),
            "set" | "write" => Ok(Self::Set),
            "pivot" => Ok(Self::Pivot),
            "merge_mark" => Ok(Self::MergeMark),
            "merge_compare" => Ok(Self::MergeCompare),
            "key" => Ok(Self::Key),
            "confirm" => Ok(Self::Confirm),
            "note" => Ok(Self::Note),
            other => Err(TraceError::UnsupportedOperation {
                op: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Operation-specific extra data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A single integer: written value, key value, or merge destination.
    Int(i64),
    /// A pair of integers: the old values of a swap.
    Pair(i64, i64),
    /// Free text for notes.
    Text(String),
}

impl Payload {
    /// The integer value, if this payload is [`Payload::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Pair(a, b) => write!(f, "{a};{b}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One elementary, replayable algorithm operation.
///
/// Fields are private; a `Step` cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepRecord", into = "StepRecord")]
pub struct Step {
    op: Op,
    indices: Indices,
    payload: Option<Payload>,
}

impl Step {
    /// Build a step without checking its contract.
    ///
    /// Use [`validate`](Self::validate) to check arity and payload; the
    /// array-mutating contract is also enforced by
    /// [`apply_step`](crate::replay::apply_step).
    #[must_use]
    pub fn new(op: Op, indices: &[usize], payload: Option<Payload>) -> Self {
        Self {
            op,
            indices: Indices::from_slice(indices),
            payload,
        }
    }

    /// `compare(i, j)`.
    #[must_use]
    pub fn compare(i: usize, j: usize) -> Self {
        Self::new(Op::Compare, &[i, j], None)
    }

    /// `swap(i, j)` without narration values.
    #[must_use]
    pub fn swap(i: usize, j: usize) -> Self {
        Self::new(Op::Swap, &[i, j], None)
    }

    /// `swap(i, j)` carrying the values held before the swap.
    #[must_use]
    pub fn swap_values(i: usize, j: usize, left: i64, right: i64) -> Self {
        Self::new(Op::Swap, &[i, j], Some(Payload::Pair(left, right)))
    }

    /// `set(k) = value`.
    #[must_use]
    pub fn set(k: usize, value: i64) -> Self {
        Self::new(Op::Set, &[k], Some(Payload::Int(value)))
    }

    /// `shift(k) = value`.
    #[must_use]
    pub fn shift(k: usize, value: i64) -> Self {
        Self::new(Op::Shift, &[k], Some(Payload::Int(value)))
    }

    /// `pivot(p)`.
    #[must_use]
    pub fn pivot(p: usize) -> Self {
        Self::new(Op::Pivot, &[p], None)
    }

    /// `merge_mark(lo, hi)`, inclusive.
    #[must_use]
    pub fn merge_mark(lo: usize, hi: usize) -> Self {
        Self::new(Op::MergeMark, &[lo, hi], None)
    }

    /// `merge_compare(i, j)` writing into `dest`.
    #[must_use]
    pub fn merge_compare(i: usize, j: usize, dest: usize) -> Self {
        Self::new(Op::MergeCompare, &[i, j], Some(Payload::Int(dest as i64)))
    }

    /// `key(i)` tracking `value`.
    #[must_use]
    pub fn key(i: usize, value: i64) -> Self {
        Self::new(Op::Key, &[i], Some(Payload::Int(value)))
    }

    /// `key()` with no index: the tracked key has been placed.
    #[must_use]
    pub fn key_done() -> Self {
        Self::new(Op::Key, &[], None)
    }

    /// `confirm(i)`.
    #[must_use]
    pub fn confirm(i: usize) -> Self {
        Self::new(Op::Confirm, &[i], None)
    }

    /// Free-text annotation.
    #[must_use]
    pub fn note(text: impl Into<String>) -> Self {
        Self::new(Op::Note, &[], Some(Payload::Text(text.into())))
    }

    /// The operation kind.
    #[must_use]
    pub fn op(&self) -> Op {
        self.op
    }

    /// Affected indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Optional payload.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// The payload as an integer, if present and integral.
    #[must_use]
    pub fn int_payload(&self) -> Option<i64> {
        self.payload.as_ref().and_then(Payload::as_int)
    }

    /// Check arity and payload shape against the operation's contract.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.op.arity();
        let n = self.indices.len();
        if n < min || n > max {
            return Err(TraceError::malformed(
                self.op.as_str(),
                format!("expected {min}..={max} indices, got {n}"),
            ));
        }
        match (self.op, &self.payload) {
            (Op::Set | Op::Shift, Some(Payload::Int(_))) => {}
            (Op::Set | Op::Shift, _) => {
                return Err(TraceError::malformed(
                    self.op.as_str(),
                    "requires an integer payload",
                ));
            }
            (Op::Swap, None | Some(Payload::Pair(..))) => {}
            (Op::MergeCompare | Op::Key, None | Some(Payload::Int(_))) => {}
            (Op::Note, _) => {}
            (Op::Compare | Op::Pivot | Op::MergeMark | Op::Confirm, None) => {}
            (op, Some(payload)) => {
                return Err(TraceError::malformed(
                    op.as_str(),
                    format!("unexpected payload {payload}"),
                ));
            }
        }
        if self.op == Op::MergeMark && self.indices[0] > self.indices[1] {
            return Err(TraceError::malformed(
                "merge_mark",
                format!("range {}..={} is inverted", self.indices[0], self.indices[1]),
            ));
        }
        Ok(())
    }

    /// Describe this step against the array as it is *before* the step applies.
    #[must_use]
    pub fn narrate(&self, array: &[i64]) -> String {
        let at = |i: usize| -> String {
            array
                .get(i)
                .map_or_else(|| "?".to_string(), ToString::to_string)
        };
        let idx = &self.indices;
        match (self.op, idx.as_slice()) {
            (Op::Compare, [i, j]) => {
                format!("Comparing {} (index {i}) with {} (index {j}).", at(*i), at(*j))
            }
            (Op::MergeCompare, [i, j]) => {
                let dest = self
                    .int_payload()
                    .map_or_else(|| "?".to_string(), |d| d.to_string());
                format!(
                    "Comparing {} (index {i}) with {} (index {j}) for position {dest}.",
                    at(*i),
                    at(*j)
                )
            }
            (Op::Swap, [i, j]) => match self.payload {
                Some(Payload::Pair(a, b)) => {
                    format!("Swapping {a} (index {i}) with {b} (index {j}).")
                }
                _ => format!("Swapping elements at indices {i} and {j}."),
            },
            (Op::Set, [k]) => match self.int_payload() {
                Some(v) => format!("Setting index {k} from {} to {v}.", at(*k)),
                None => String::new(),
            },
            (Op::Shift, [k]) => match self.int_payload() {
                Some(v) => format!("Shifting {v} into index {k}."),
                None => String::new(),
            },
            (Op::Pivot, [p]) => format!("Selecting {} at index {p} as the pivot.", at(*p)),
            (Op::MergeMark, [lo, hi]) => format!("Marking merge range {lo} to {hi}."),
            (Op::Key, []) => "Key placement complete.".to_string(),
            (Op::Key, [target]) => match self.int_payload() {
                Some(v) => format!("Tracking key {v} (target index {target})."),
                None => format!("Tracking key at index {target}."),
            },
            (Op::Confirm, [i]) => format!("Confirming index {i} as sorted."),
            (Op::Note, _) => match &self.payload {
                Some(Payload::Text(text)) => text.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.op, self.indices.as_slice())?;
        if let Some(payload) = &self.payload {
            write!(f, " -> {payload}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serde bridge
// ---------------------------------------------------------------------------

/// Loosely typed wire form of a [`Step`]; validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub op: String,
    pub indices: Vec<usize>,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl TryFrom<StepRecord> for Step {
    type Error = TraceError;

    fn try_from(record: StepRecord) -> Result<Self> {
        let op: Op = record.op.parse()?;
        let step = Self::new(op, &record.indices, record.payload);
        step.validate()?;
        Ok(step)
    }
}

impl From<Step> for StepRecord {
    fn from(step: Step) -> Self {
        Self {
            op: step.op.as_str().to_string(),
            indices: step.indices.to_vec(),
            payload: step.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_names_round_trip_through_from_str() {
        for op in Op::ALL {
            assert_eq!(op.as_str().parse::<Op>().unwrap(), op);
        }
    }

    #[test]
    fn write_is_an_alias_for_set() {
        assert_eq!("write".parse::<Op>().unwrap(), Op::Set);
        let step: Step =
            serde_json::from_str(r#"{"op":"write","indices":[0],"payload":7}"#).unwrap();
        assert_eq!(step, Step::set(0, 7));
    }

    #[test]
    fn unknown_op_is_unsupported() {
        let err = "rotate".parse::<Op>().unwrap_err();
        assert_eq!(
            err,
            TraceError::UnsupportedOperation {
                op: "rotate".into()
            }
        );
        let err = serde_json::from_str::<Step>(r#"{"op":"rotate","indices":[0,1]}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported step operation"));
    }

    #[test]
    fn set_without_payload_fails_validation() {
        let step = Step::new(Op::Set, &[2], None);
        assert!(matches!(
            step.validate(),
            Err(TraceError::MalformedStep { .. })
        ));
    }

    #[test]
    fn swap_arity_is_checked() {
        let step = Step::new(Op::Swap, &[1], None);
        assert!(step.validate().is_err());
        assert!(Step::swap_values(0, 1, 5, 3).validate().is_ok());
    }

    #[test]
    fn inverted_merge_range_is_rejected() {
        assert!(Step::new(Op::MergeMark, &[4, 1], None).validate().is_err());
        assert!(Step::merge_mark(1, 4).validate().is_ok());
    }

    #[test]
    fn serializes_payload_shapes() {
        let json = serde_json::to_string(&Step::swap_values(2, 5, 42, 17)).unwrap();
        assert_eq!(json, r#"{"op":"swap","indices":[2,5],"payload":[42,17]}"#);
        let json = serde_json::to_string(&Step::compare(0, 1)).unwrap();
        assert_eq!(json, r#"{"op":"compare","indices":[0,1],"payload":null}"#);
    }

    #[test]
    fn narration_reads_values_before_the_step() {
        let arr = [5, 3, 1];
        assert_eq!(
            Step::compare(0, 1).narrate(&arr),
            "Comparing 5 (index 0) with 3 (index 1)."
        );
        assert_eq!(
            Step::set(2, 9).narrate(&arr),
            "Setting index 2 from 1 to 9."
        );
        assert_eq!(Step::pivot(7).narrate(&arr), "Selecting ? at index 7 as the pivot.");
    }

    #[test]
    fn display_includes_payload() {
        assert_eq!(Step::shift(3, 8).to_string(), "shift: [3] -> 8");
        assert_eq!(Step::confirm(0).to_string(), "confirm: [0]");
    }
}
