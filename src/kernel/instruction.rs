use std::fmt;
use std::sync::Arc;

use super::devices::DevicePool;

use crate::error::{Result, SimulationError};

/// Single-letter instruction class from the metadata script.
///
/// `P` is a CPU burst ("process" in the script grammar, but it never
/// names a process of its own - it runs inside the enclosing one).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Program,
    Application,
    CpuBurst,
    Input,
    Output,
    Memory,
}

impl Opcode {
    pub fn from_char(code: char) -> Result<Opcode> {
        match code {
            'S' => Ok(Opcode::Program),
            'A' => Ok(Opcode::Application),
            'P' => Ok(Opcode::CpuBurst),
            'I' => Ok(Opcode::Input),
            'O' => Ok(Opcode::Output),
            'M' => Ok(Opcode::Memory),
            '{' => Err(SimulationError::parse("missing metadata code")),
            _ => Err(SimulationError::parse("invalid metadata code")),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Opcode::Program => 'S',
            Opcode::Application => 'A',
            Opcode::CpuBurst => 'P',
            Opcode::Input => 'I',
            Opcode::Output => 'O',
            Opcode::Memory => 'M',
        }
    }
}

/// Resource or action name qualifying an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Descriptor {
    Begin,
    Finish,
    HardDrive,
    Keyboard,
    Scanner,
    Monitor,
    Run,
    Allocate,
    Projector,
    Block,
}

impl Descriptor {
    /// Parses a descriptor name. `harddrive` is accepted as a spelling
    /// of `hard drive` and normalized to it.
    pub fn from_name(name: &str) -> Result<Descriptor> {
        match name {
            "begin" => Ok(Descriptor::Begin),
            "finish" => Ok(Descriptor::Finish),
            "hard drive" | "harddrive" => Ok(Descriptor::HardDrive),
            "keyboard" => Ok(Descriptor::Keyboard),
            "scanner" => Ok(Descriptor::Scanner),
            "monitor" => Ok(Descriptor::Monitor),
            "run" => Ok(Descriptor::Run),
            "allocate" => Ok(Descriptor::Allocate),
            "projector" => Ok(Descriptor::Projector),
            "block" => Ok(Descriptor::Block),
            _ => Err(SimulationError::parse("invalid descriptor")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Descriptor::Begin => "begin",
            Descriptor::Finish => "finish",
            Descriptor::HardDrive => "hard drive",
            Descriptor::Keyboard => "keyboard",
            Descriptor::Scanner => "scanner",
            Descriptor::Monitor => "monitor",
            Descriptor::Run => "run",
            Descriptor::Allocate => "allocate",
            Descriptor::Projector => "projector",
            Descriptor::Block => "block",
        }
    }

    /// Maps the descriptor to the config setting holding its cycle time.
    /// Memory instructions share the Memory time, CPU bursts use the
    /// Processor time, everything else uses its capitalized name.
    /// Begin/finish resolve to settings that never exist, so their cycle
    /// time reads as 0.
    pub fn config_key(self) -> &'static str {
        match self {
            Descriptor::Allocate | Descriptor::Block => "Memory",
            Descriptor::Run => "Processor",
            Descriptor::HardDrive => "Hard drive",
            Descriptor::Keyboard => "Keyboard",
            Descriptor::Scanner => "Scanner",
            Descriptor::Monitor => "Monitor",
            Descriptor::Projector => "Projector",
            Descriptor::Begin => "Begin",
            Descriptor::Finish => "Finish",
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One metadata instruction. Immutable once the loader has filled in the
/// derived wait time and (for pooled devices) the semaphore handle;
/// copied freely afterwards.
#[derive(Clone)]
pub struct Instruction {
    opcode: Opcode,
    descriptor: Descriptor,
    num_cycles: u64,
    wait_time_ms: f32,
    device: Option<Arc<DevicePool>>,
}

impl Instruction {
    pub fn new(opcode: Opcode, descriptor: Descriptor, num_cycles: u64) -> Instruction {
        Instruction {
            opcode,
            descriptor,
            num_cycles,
            wait_time_ms: 0.0,
            device: None,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    /// Derives the wait time from the per-cycle time for this
    /// instruction's resource. Called once at load time.
    pub fn set_wait_time(&mut self, cycle_time_ms: u32) {
        self.wait_time_ms = (self.num_cycles * cycle_time_ms as u64) as f32;
    }

    pub fn wait_time_ms(&self) -> f32 {
        self.wait_time_ms
    }

    pub fn set_device(&mut self, device: Arc<DevicePool>) {
        self.device = Some(device);
    }

    pub fn device(&self) -> Option<&Arc<DevicePool>> {
        self.device.as_ref()
    }

    pub fn is_io(&self) -> bool {
        matches!(self.opcode, Opcode::Input | Opcode::Output)
    }

    /// Generates the human-readable action phrase for the start or end
    /// log line of this instruction. Timestamp prefix and the HDD/PROJ
    /// unit index suffix are the execution engine's business.
    pub fn log_string(&self, is_start: bool, pid: u32) -> String {
        let phase = if is_start { "start" } else { "end" };

        match (self.opcode, self.descriptor) {
            (Opcode::Program, Descriptor::Begin) => "Simulator program starting".to_string(),
            (Opcode::Program, _) => "Simulator program ending".to_string(),
            (Opcode::Application, Descriptor::Finish) => format!("OS: removing process {}", pid),
            (Opcode::Application, _) => {
                if is_start {
                    format!("OS: preparing process {}", pid)
                } else {
                    format!("OS: starting process {}", pid)
                }
            }
            (Opcode::CpuBurst, _) => format!("Process {}: {} processing action", pid, phase),
            (Opcode::Memory, Descriptor::Allocate) => {
                if is_start {
                    format!("Process {}: allocating memory", pid)
                } else {
                    format!("Process {}: memory allocated at", pid)
                }
            }
            (Opcode::Memory, _) => format!("Process {}: {} memory blocking", pid, phase),
            (Opcode::Input, descriptor) => {
                format!("Process {}: {} {} input", pid, phase, descriptor)
            }
            (Opcode::Output, descriptor) => {
                format!("Process {}: {} {} output", pid, phase, descriptor)
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{{}}}{}",
            self.opcode.to_char(),
            self.descriptor,
            self.num_cycles
        )
    }
}
