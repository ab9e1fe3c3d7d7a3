#![forbid(unsafe_code)]

//! Pure step application and prefix replay.

use crate::error::{Result, TraceError};
use crate::step::{Op, Step};

/// Apply one step to `array` in place.
///
/// Only `swap`, `set` and `shift` touch the array; every other operation is
/// a no-op here. The step is fully checked before anything is written, so a
/// failing step leaves `array` untouched.
pub fn apply_step(array: &mut [i64], step: &Step) -> Result<()> {
    let op = step.op();
    if !op.mutates_array() {
        return Ok(());
    }
    let len = array.len();
    let check = |i: usize| -> Result<usize> {
        if i < len {
            Ok(i)
        } else {
            Err(TraceError::malformed(
                op.as_str(),
                format!("index {i} out of bounds for length {len}"),
            ))
        }
    };

    match (op, step.indices()) {
        (Op::Swap, &[i, j]) => {
            let (i, j) = (check(i)?, check(j)?);
            array.swap(i, j);
            Ok(())
        }
        (Op::Set | Op::Shift, &[k]) => {
            let k = check(k)?;
            let value = step
                .int_payload()
                .ok_or_else(|| TraceError::malformed(op.as_str(), "requires an integer payload"))?;
            array[k] = value;
            Ok(())
        }
        (_, indices) => Err(TraceError::malformed(
            op.as_str(),
            format!("unexpected index count {}", indices.len()),
        )),
    }
}

/// Fold [`apply_step`] over `steps`, starting from a copy of `initial`.
///
/// Inputs are not modified.
pub fn replay(initial: &[i64], steps: &[Step]) -> Result<Vec<i64>> {
    let mut array = initial.to_vec();
    for step in steps {
        apply_step(&mut array, step)?;
    }
    Ok(array)
}

/// Replay `steps` and require the result to equal `expected`.
///
/// Reports the first differing index.
pub fn replay_checked(initial: &[i64], steps: &[Step], expected: &[i64]) -> Result<Vec<i64>> {
    let actual = replay(initial, steps)?;
    if actual.len() != expected.len() {
        return Err(TraceError::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    if let Some((index, (&e, &a))) = expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .find(|(_, (e, a))| e != a)
    {
        return Err(TraceError::ReplayMismatch {
            index,
            expected: e,
            actual: a,
        });
    }
    Ok(actual)
}
