use std::{error::Error, fmt};

use bunny_hop_core::{Instruction, LoopIterations};

/// Parses whitespace-separated program tokens into editor instructions.
///
/// Accepted tokens are `forward`/`f`, `left`/`l`, `right`/`r`, `end`, `loop`
/// (default iteration count) and `loop2`/`loop3`/`loop4`.
pub(crate) fn parse_program<S>(tokens: &[S]) -> Result<Vec<Instruction>, ProgramTextError>
where
    S: AsRef<str>,
{
    let mut program = Vec::new();
    for (position, chunk) in tokens.iter().enumerate() {
        for token in chunk.as_ref().split_whitespace() {
            program.push(parse_token(token).map_err(|kind| ProgramTextError { position, kind })?);
        }
    }

    if program.is_empty() {
        return Err(ProgramTextError {
            position: 0,
            kind: ProgramTextErrorKind::Empty,
        });
    }

    Ok(program)
}

fn parse_token(token: &str) -> Result<Instruction, ProgramTextErrorKind> {
    let lowered = token.to_ascii_lowercase();
    let instruction = match lowered.as_str() {
        "forward" | "f" => Instruction::Forward,
        "left" | "l" => Instruction::Left,
        "right" | "r" => Instruction::Right,
        "end" => Instruction::LoopEnd,
        "loop" => Instruction::LoopStart { iterations: None },
        other => {
            let Some(count) = other.strip_prefix("loop") else {
                return Err(ProgramTextErrorKind::UnknownToken(token.to_owned()));
            };
            let count: u8 = count
                .parse()
                .map_err(|_| ProgramTextErrorKind::UnknownToken(token.to_owned()))?;
            let iterations = LoopIterations::try_from(count)
                .map_err(|_| ProgramTextErrorKind::InvalidIterations(count))?;
            Instruction::LoopStart {
                iterations: Some(iterations),
            }
        }
    };
    Ok(instruction)
}

/// Error raised when a textual program cannot be parsed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ProgramTextError {
    position: usize,
    kind: ProgramTextErrorKind,
}

#[derive(Debug, PartialEq, Eq)]
enum ProgramTextErrorKind {
    Empty,
    UnknownToken(String),
    InvalidIterations(u8),
}

impl fmt::Display for ProgramTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProgramTextErrorKind::Empty => f.write_str("program contains no instructions"),
            ProgramTextErrorKind::UnknownToken(token) => write!(
                f,
                "argument {}: unknown instruction `{token}`",
                self.position + 1
            ),
            ProgramTextErrorKind::InvalidIterations(count) => write!(
                f,
                "argument {}: loops repeat 2, 3 or 4 times, not {count}",
                self.position + 1
            ),
        }
    }
}

impl Error for ProgramTextError {}
