//! Bounded program editing.

use bunny_hop_core::{EditRejection, Instruction, LoopIterations};

/// Loop availability applied when appending instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopGate {
    /// Indicates whether loop markers may be placed.
    pub unlocked: bool,
    /// Iteration count given to a freshly placed loop start.
    pub default_iterations: Option<LoopIterations>,
}

/// Ordered instructions together with their slot bookkeeping.
///
/// A program holds at most `capacity` instructions and at most one loop start
/// and one loop end. The used-slot counter survives [`Program::clear_instructions`]
/// so a concluded run can still report how many blocks it used.
#[derive(Clone, Debug)]
pub struct Program {
    instructions: Vec<Instruction>,
    capacity: usize,
    slots_used: usize,
}

impl Program {
    /// Creates an empty program with the provided slot capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instructions: Vec::with_capacity(capacity),
            capacity,
            slots_used: 0,
        }
    }

    /// Instructions in program order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of slots allocated since the last reset.
    #[must_use]
    pub const fn slots_used(&self) -> usize {
        self.slots_used
    }

    /// Reports whether the program holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Reports whether a loop start was placed.
    #[must_use]
    pub fn has_loop_start(&self) -> bool {
        self.instructions.iter().any(|instruction| instruction.is_loop_start())
    }

    /// Reports whether a loop end was placed.
    #[must_use]
    pub fn has_loop_end(&self) -> bool {
        self.instructions.iter().any(|instruction| instruction.is_loop_end())
    }

    /// Appends an instruction, returning the slot it occupies and the stored
    /// instruction.
    pub fn append(
        &mut self,
        instruction: Instruction,
        gate: LoopGate,
    ) -> Result<(usize, Instruction), EditRejection> {
        if self.slots_used >= self.capacity {
            return Err(EditRejection::CapacityReached {
                capacity: self.capacity,
            });
        }

        let stored = match instruction {
            Instruction::LoopStart { iterations } => {
                if !gate.unlocked {
                    return Err(EditRejection::LoopsLocked);
                }
                if self.has_loop_start() {
                    return Err(EditRejection::LoopStartPresent);
                }
                Instruction::LoopStart {
                    iterations: iterations.or(gate.default_iterations),
                }
            }
            Instruction::LoopEnd => {
                if !gate.unlocked {
                    return Err(EditRejection::LoopsLocked);
                }
                if self.has_loop_end() {
                    return Err(EditRejection::LoopEndPresent);
                }
                Instruction::LoopEnd
            }
            primitive => primitive,
        };

        let slot = self.slots_used;
        self.instructions.push(stored);
        self.slots_used += 1;
        Ok((slot, stored))
    }

    /// Stores a new iteration count on the existing loop start.
    pub fn set_loop_iterations(&mut self, iterations: LoopIterations) -> Result<(), EditRejection> {
        let loop_start = self
            .instructions
            .iter_mut()
            .find(|instruction| instruction.is_loop_start())
            .ok_or(EditRejection::NoLoopStart)?;
        *loop_start = Instruction::LoopStart {
            iterations: Some(iterations),
        };
        Ok(())
    }

    /// Removes the last instruction, releasing its slot.
    pub fn undo(&mut self) -> Result<(usize, Instruction), EditRejection> {
        let instruction = self
            .instructions
            .pop()
            .ok_or(EditRejection::NothingToUndo)?;
        self.slots_used = self.slots_used.saturating_sub(1);
        Ok((self.slots_used, instruction))
    }

    /// Drops the instructions while keeping the used-slot count.
    pub fn clear_instructions(&mut self) {
        self.instructions.clear();
    }

    /// Clears instructions and slots.
    pub fn reset(&mut self) {
        self.instructions.clear();
        self.slots_used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNLOCKED: LoopGate = LoopGate {
        unlocked: true,
        default_iterations: Some(LoopIterations::Two),
    };

    const LOCKED: LoopGate = LoopGate {
        unlocked: false,
        default_iterations: Some(LoopIterations::Two),
    };

    #[test]
    fn append_respects_capacity() {
        let mut program = Program::with_capacity(2);
        assert_eq!(
            program.append(Instruction::Forward, LOCKED),
            Ok((0, Instruction::Forward))
        );
        assert_eq!(
            program.append(Instruction::Left, LOCKED),
            Ok((1, Instruction::Left))
        );
        assert_eq!(
            program.append(Instruction::Right, LOCKED),
            Err(EditRejection::CapacityReached { capacity: 2 })
        );
        assert_eq!(program.instructions().len(), 2);
    }

    #[test]
    fn loop_markers_require_unlock() {
        let mut program = Program::with_capacity(10);
        assert_eq!(
            program.append(Instruction::LoopStart { iterations: None }, LOCKED),
            Err(EditRejection::LoopsLocked)
        );
        assert_eq!(
            program.append(Instruction::LoopEnd, LOCKED),
            Err(EditRejection::LoopsLocked)
        );
        assert!(program.is_empty());
    }

    #[test]
    fn loop_start_receives_default_iterations() {
        let mut program = Program::with_capacity(10);
        let (_, stored) = program
            .append(Instruction::LoopStart { iterations: None }, UNLOCKED)
            .expect("loop start accepted");
        assert_eq!(
            stored,
            Instruction::LoopStart {
                iterations: Some(LoopIterations::Two)
            }
        );
    }

    #[test]
    fn single_loop_start_and_end_allowed() {
        let mut program = Program::with_capacity(10);
        assert!(program
            .append(Instruction::LoopStart { iterations: None }, UNLOCKED)
            .is_ok());
        assert_eq!(
            program.append(Instruction::LoopStart { iterations: None }, UNLOCKED),
            Err(EditRejection::LoopStartPresent)
        );
        assert!(program.append(Instruction::LoopEnd, UNLOCKED).is_ok());
        assert_eq!(
            program.append(Instruction::LoopEnd, UNLOCKED),
            Err(EditRejection::LoopEndPresent)
        );
    }

    #[test]
    fn undo_clears_loop_guard() {
        let mut program = Program::with_capacity(10);
        assert!(program.append(Instruction::Forward, UNLOCKED).is_ok());
        assert!(program
            .append(Instruction::LoopStart { iterations: None }, UNLOCKED)
            .is_ok());
        let (slot, popped) = program.undo().expect("undo succeeds");
        assert_eq!(slot, 1);
        assert!(popped.is_loop_start());
        assert!(!program.has_loop_start());
        assert!(program
            .append(Instruction::LoopStart { iterations: None }, UNLOCKED)
            .is_ok());
        assert_eq!(program.slots_used(), 2);
    }

    #[test]
    fn undo_on_empty_program_is_rejected() {
        let mut program = Program::with_capacity(10);
        assert_eq!(program.undo(), Err(EditRejection::NothingToUndo));
    }

    #[test]
    fn set_loop_iterations_needs_loop_start() {
        let mut program = Program::with_capacity(10);
        assert_eq!(
            program.set_loop_iterations(LoopIterations::Four),
            Err(EditRejection::NoLoopStart)
        );
        assert!(program.append(Instruction::Forward, UNLOCKED).is_ok());
        assert!(program
            .append(Instruction::LoopStart { iterations: None }, UNLOCKED)
            .is_ok());
        assert_eq!(program.set_loop_iterations(LoopIterations::Four), Ok(()));
        assert_eq!(
            program.instructions()[1],
            Instruction::LoopStart {
                iterations: Some(LoopIterations::Four)
            }
        );
    }

    #[test]
    fn clear_keeps_slots_until_reset() {
        let mut program = Program::with_capacity(10);
        assert!(program.append(Instruction::Forward, UNLOCKED).is_ok());
        assert!(program.append(Instruction::Forward, UNLOCKED).is_ok());
        program.clear_instructions();
        assert!(program.is_empty());
        assert_eq!(program.slots_used(), 2);
        program.reset();
        assert_eq!(program.slots_used(), 0);
    }
}
