#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sortviz_core::{Payload, RunState, Step, StepRecord, StepSource, replay};

#[derive(Debug, Arbitrary)]
struct RawStep {
    op: u8,
    indices: Vec<u8>,
    value: Option<i16>,
}

#[derive(Debug, Arbitrary)]
enum Move {
    Forward,
    Back,
    Seek(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    initial: Vec<i16>,
    steps: Vec<RawStep>,
    moves: Vec<Move>,
    stride: u8,
}

const OPS: [&str; 12] = [
    "compare", "swap", "shift", "set", "write", "pivot", "merge_mark", "merge_compare", "key",
    "confirm", "note", "rotate",
];

fn decode(raw: RawStep) -> Option<Step> {
    let record = StepRecord {
        op: OPS[usize::from(raw.op) % OPS.len()].to_string(),
        indices: raw.indices.into_iter().take(3).map(usize::from).collect(),
        payload: raw.value.map(|v| Payload::Int(i64::from(v))),
    };
    Step::try_from(record).ok()
}

fuzz_target!(|input: Input| {
    let initial: Vec<i64> = input.initial.iter().copied().map(i64::from).take(64).collect();
    let steps: Vec<Step> = input.steps.into_iter().take(256).filter_map(decode).collect();
    let stride = usize::from(input.stride).max(1);

    let mut run = RunState::new(initial.clone(), StepSource::from_steps(steps), stride);
    for mv in input.moves.into_iter().take(128) {
        match mv {
            Move::Forward => {
                let _ = run.forward();
            }
            Move::Back => {
                let _ = run.back();
            }
            Move::Seek(target) => {
                let _ = run.seek(usize::from(target));
            }
        }

        // The array always equals the replay of the applied prefix.
        let k = run.step_index();
        assert!(k <= run.log().len(), "step index past log");
        let expected = replay(&initial, &run.log()[..k]).expect("logged steps replay");
        assert_eq!(run.array(), expected.as_slice(), "array diverged from replay");
    }
});
