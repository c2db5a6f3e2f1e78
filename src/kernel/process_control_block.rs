/// Process lifecycle states. Start is creation-only and never
/// revisited; Ready, Running and Waiting may cycle; Exit is terminal
/// and the block is discarded once it is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Start,
    Ready,
    Running,
    Waiting,
    Exit,
}

/// The process control block. Holds the mutable scheduling metadata for
/// one process; the instruction payload lives in `Process`, joined to
/// this block by pid.
pub struct ProcessControlBlock {
    pub program_counter: usize,
    pub state: ProcessState,

    pid: u32,
    instruction_count: u32,
    io_instruction_count: u32,
}

impl ProcessControlBlock {
    pub fn new(pid: u32, instruction_count: u32, io_instruction_count: u32) -> ProcessControlBlock {
        ProcessControlBlock {
            program_counter: 0,
            state: ProcessState::Start,
            pid,
            instruction_count,
            io_instruction_count,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Total instruction count, the shortest-job-first sort key.
    pub fn instruction_count(&self) -> u32 {
        self.instruction_count
    }

    /// Count of input/output instructions, the priority-scheduling
    /// sort key.
    pub fn io_instruction_count(&self) -> u32 {
        self.io_instruction_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcb_starts_in_start_state() {
        let pcb = ProcessControlBlock::new(1, 8, 3);
        assert_eq!(pcb.state, ProcessState::Start);
        assert_eq!(pcb.program_counter, 0);
        assert_eq!(pcb.pid(), 1);
        assert_eq!(pcb.instruction_count(), 8);
        assert_eq!(pcb.io_instruction_count(), 3);
    }

    #[test]
    fn test_pcb_state_cycling() {
        let mut pcb = ProcessControlBlock::new(1, 2, 0);
        pcb.state = ProcessState::Ready;
        pcb.state = ProcessState::Running;
        pcb.state = ProcessState::Waiting;
        pcb.state = ProcessState::Running;
        pcb.state = ProcessState::Exit;
        assert_eq!(pcb.state, ProcessState::Exit);
    }
}
