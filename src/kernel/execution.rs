use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::debug;

use super::instruction::{Descriptor, Instruction, Opcode};
use super::memory::MemoryManager;
use super::process::Process;
use super::process_control_block::{ProcessControlBlock, ProcessState};
use super::timer::{wait_ms, Timer};

use crate::error::Result;
use crate::io::logger::LogSink;

/// The dispatch loop. Consumes the ready queue one process at a time,
/// runs each process's entire instruction sequence to completion, and
/// emits the timestamped execution log.
///
/// Instructions within a process execute strictly in script order;
/// processes execute strictly in ready-queue order. Every wait runs to
/// completion - there is no preemption, cancellation or timeout.
pub struct ExecutionEngine {
    memory: Arc<MemoryManager>,
    pcbs: HashMap<u32, ProcessControlBlock>,
    sink: LogSink,
    timer: Timer,
}

impl ExecutionEngine {
    pub fn new(
        memory: Arc<MemoryManager>,
        pcbs: HashMap<u32, ProcessControlBlock>,
        sink: LogSink,
    ) -> ExecutionEngine {
        ExecutionEngine {
            memory,
            pcbs,
            sink,
            timer: Timer::start(),
        }
    }

    /// Runs the whole simulation: program begin marker, every queued
    /// process in order, program end marker, trailing blank line.
    pub fn run(
        mut self,
        program_begin: Option<Instruction>,
        mut ready_queue: VecDeque<Process>,
        program_end: Option<Instruction>,
    ) -> Result<()> {
        self.timer = Timer::start();

        if let Some(instr) = &program_begin {
            self.emit(instr.log_string(true, 0))?;
            wait_ms(instr.wait_time_ms());
        }

        while let Some(process) = ready_queue.pop_front() {
            self.run_process(&process)?;
        }

        if let Some(instr) = &program_end {
            self.emit(instr.log_string(true, 0))?;
            wait_ms(instr.wait_time_ms());
        }

        self.sink.write_line("")?;
        Ok(())
    }

    /// Dispatches one process to completion and retires its PCB.
    fn run_process(&mut self, process: &Process) -> Result<()> {
        let pid = process.pid();
        debug!("dispatching process {}", pid);

        let begin = process.begin();
        self.emit(begin.log_string(true, pid))?;
        wait_ms(begin.wait_time_ms());
        self.set_state(pid, ProcessState::Ready);
        self.emit(begin.log_string(false, pid))?;

        for instr in process.instructions() {
            self.step(pid, instr)?;
        }

        let finish = process.finish();
        self.emit(finish.log_string(true, pid))?;
        wait_ms(finish.wait_time_ms());
        self.set_state(pid, ProcessState::Exit);
        self.pcbs.remove(&pid);

        Ok(())
    }

    /// Executes a single instruction: start line, opcode-specific wait
    /// with its resource coordination, end line.
    fn step(&mut self, pid: u32, instr: &Instruction) -> Result<()> {
        if let Some(pcb) = self.pcbs.get_mut(&pid) {
            pcb.program_counter += 1;
        }

        let mut start_line = instr.log_string(true, pid);
        if instr.is_io() {
            if let Some(device) = instr.device() {
                match instr.descriptor() {
                    Descriptor::HardDrive => {
                        start_line.push_str(&format!(" on HDD {}", device.next_index()));
                    }
                    Descriptor::Projector => {
                        start_line.push_str(&format!(" on PROJ {}", device.next_index()));
                    }
                    _ => {}
                }
            }
        }

        let mut allocated_address = None;

        match instr.opcode() {
            Opcode::CpuBurst => {
                self.set_state(pid, ProcessState::Running);
                self.emit(start_line)?;
                wait_ms(instr.wait_time_ms());
            }
            Opcode::Input | Opcode::Output => {
                self.emit(start_line)?;
                self.set_state(pid, ProcessState::Waiting);
                let _guard = instr.device().map(|device| device.acquire());
                wait_ms(instr.wait_time_ms());
            }
            Opcode::Memory => {
                self.emit(start_line)?;
                allocated_address = self
                    .memory
                    .execute(instr.descriptor(), || wait_ms(instr.wait_time_ms()));
            }
            _ => {
                self.emit(start_line)?;
                wait_ms(instr.wait_time_ms());
            }
        }

        self.set_state(pid, ProcessState::Ready);

        let mut end_line = instr.log_string(false, pid);
        if let Some(address) = allocated_address {
            end_line.push_str(&format!(" 0x{:08x}", address));
        }
        self.emit(end_line)
    }

    fn emit(&mut self, phrase: String) -> Result<()> {
        let elapsed = self.timer.elapsed_seconds();
        self.sink.write_timestamped(elapsed, &phrase)
    }

    fn set_state(&mut self, pid: u32, state: ProcessState) {
        if let Some(pcb) = self.pcbs.get_mut(&pid) {
            pcb.state = state;
        }
    }
}
