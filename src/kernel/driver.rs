use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use super::devices::Devices;
use super::execution::ExecutionEngine;
use super::memory::MemoryManager;
use super::scheduler::{Scheduler, SchedulingPolicy};

use crate::error::{Result, SimulationError};
use crate::io::config::Config;
use crate::io::loader::{self, LoadedProgram};
use crate::io::logger::LogSink;

/// Holds the virtual system environment and wires the subsystems
/// together: configuration, device pools, program loading, scheduling
/// and the execution engine.
pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config_path: &Path) -> Result<Driver> {
        let config = Config::from_file(config_path)?;
        Ok(Driver { config })
    }

    pub fn start(&mut self) -> Result<()> {
        let metadata_path = self
            .config
            .get("File Path")
            .filter(|path| !path.is_empty())
            .ok_or_else(|| {
                SimulationError::config("Error: 'File Path' missing from config file")
            })?
            .to_string();

        let devices = Devices::from_config(&self.config)?;

        info!("loading metadata script {}", metadata_path);
        let program = loader::load_program(Path::new(&metadata_path), &self.config, &devices)?;

        let LoadedProgram {
            instructions,
            processes,
            pcbs,
            program_begin,
            program_end,
        } = program;

        info!(
            "loaded {} instructions across {} processes",
            instructions.len(),
            processes.len()
        );

        let memory = Arc::new(MemoryManager::from_config(&self.config));

        let policy = self
            .config
            .get("CPU Scheduling Code")
            .and_then(SchedulingPolicy::from_code);
        debug!("scheduling policy: {:?}", policy);

        let scheduler = Scheduler::new(policy);
        let ready_queue = scheduler.build_ready_queue(processes, &pcbs);

        let sink = LogSink::from_config(&self.config)?;
        let engine = ExecutionEngine::new(memory, pcbs, sink);

        engine.run(program_begin, ready_queue, program_end)
    }
}
