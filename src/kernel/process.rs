use super::instruction::Instruction;

/// Immutable instruction payload for one process: everything between an
/// `A{begin}` and its matching `A{finish}`, exclusive. The bracketing
/// markers are kept alongside so the dispatch loop can honor their wait
/// times and log phrases, and so the original flat sequence can be
/// reconstructed.
pub struct Process {
    pid: u32,
    begin: Instruction,
    instructions: Vec<Instruction>,
    finish: Instruction,
}

impl Process {
    pub fn new(
        pid: u32,
        begin: Instruction,
        instructions: Vec<Instruction>,
        finish: Instruction,
    ) -> Process {
        Process {
            pid,
            begin,
            instructions,
            finish,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn begin(&self) -> &Instruction {
        &self.begin
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn finish(&self) -> &Instruction {
        &self.finish
    }
}
