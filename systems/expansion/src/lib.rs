#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure loop expansion system that flattens programs into action traces.

use bunny_hop_core::{
    Action, ActionTrace, Command, EmptyLoopPolicy, Event, Instruction, LoopError, Unbalanced,
};
use tracing::debug;

/// Result of flattening a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    /// Loop-free actions in dispatch order.
    pub trace: ActionTrace,
    /// Non-fatal diagnostic raised while flattening, if any.
    pub notice: Option<LoopError>,
}

/// Validates the loop region of `program` and flattens it into a trace.
///
/// Programs without loop markers pass through unchanged. A single loop region
/// expands to `before ++ body * iterations ++ after`. Under
/// [`EmptyLoopPolicy::Continue`] a loop without a body drops its markers and
/// reports [`LoopError::EmptyLoop`] as a notice instead of failing.
pub fn expand(program: &[Instruction], policy: EmptyLoopPolicy) -> Result<Expansion, LoopError> {
    let start = program.iter().position(|instruction| instruction.is_loop_start());
    let end = program.iter().position(|instruction| instruction.is_loop_end());

    let (start, end) = match (start, end) {
        (None, None) => {
            return Ok(Expansion {
                trace: ActionTrace::new(primitives(program)),
                notice: None,
            });
        }
        (Some(_), None) => return Err(LoopError::UnbalancedLoop(Unbalanced::Unterminated)),
        (None, Some(_)) => return Err(LoopError::UnbalancedLoop(Unbalanced::NotOpened)),
        (Some(start), Some(end)) if end < start => return Err(LoopError::MalformedLoopOrder),
        (Some(start), Some(end)) => (start, end),
    };

    let before = primitives(&program[..start]);
    let body = primitives(&program[start + 1..end]);
    let after = primitives(&program[end + 1..]);

    if body.is_empty() {
        return match policy {
            EmptyLoopPolicy::Reject => Err(LoopError::EmptyLoop),
            EmptyLoopPolicy::Continue => Ok(Expansion {
                trace: ActionTrace::new([before, after].concat()),
                notice: Some(LoopError::EmptyLoop),
            }),
        };
    }

    let iterations = match program[start] {
        Instruction::LoopStart {
            iterations: Some(iterations),
        } => iterations,
        _ => return Err(LoopError::MissingIterationCount),
    };

    let mut actions =
        Vec::with_capacity(before.len() + body.len() * iterations.count() + after.len());
    actions.extend_from_slice(&before);
    for _ in 0..iterations.count() {
        actions.extend_from_slice(&body);
    }
    actions.extend_from_slice(&after);

    Ok(Expansion {
        trace: ActionTrace::new(actions),
        notice: None,
    })
}

fn primitives(instructions: &[Instruction]) -> Vec<Action> {
    instructions
        .iter()
        .filter_map(|instruction| instruction.action())
        .collect()
}

/// System that answers run requests with a trace or a validation failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct Expander {
    policy: EmptyLoopPolicy,
}

impl Expander {
    /// Creates a new expander applying the provided empty-loop policy.
    #[must_use]
    pub const fn new(policy: EmptyLoopPolicy) -> Self {
        Self { policy }
    }

    /// Consumes world events and emits run commands for every run request.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::RunRequested { program } = event else {
                continue;
            };

            match expand(program, self.policy) {
                Ok(expansion) => out.push(Command::StartRun {
                    trace: expansion.trace,
                    diagnostic: expansion.notice,
                }),
                Err(error) => {
                    debug!(%error, "program failed loop validation");
                    out.push(Command::RejectRun { error });
                }
            }
        }
    }
}
