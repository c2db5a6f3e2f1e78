use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SimulationError};
use crate::io::config::Config;
use crate::kernel::devices::Devices;
use crate::kernel::instruction::{Descriptor, Instruction, Opcode};
use crate::kernel::process::Process;
use crate::kernel::process_control_block::ProcessControlBlock;

const METADATA_HEADER: &str = "Start Program Meta-Data Code:";
const METADATA_FOOTER: &str = "End Program Meta-Data Code.";

/// Everything the loader produces from one metadata script: the flat
/// chronological instruction sequence, the processes grouped out of it
/// with their control blocks, and the program-level begin/finish
/// markers.
pub struct LoadedProgram {
    pub instructions: Vec<Instruction>,
    pub processes: Vec<Process>,
    pub pcbs: HashMap<u32, ProcessControlBlock>,
    pub program_begin: Option<Instruction>,
    pub program_end: Option<Instruction>,
}

/// Loads a metadata script file into the virtual system. Fails fast on
/// any malformed input; there is no partial simulation.
pub fn load_program(path: &Path, config: &Config, devices: &Devices) -> Result<LoadedProgram> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("mdf") {
        return Err(SimulationError::config(
            "Error: invalid extension for metadata file",
        ));
    }

    if !path.exists() {
        return Err(SimulationError::config(format!(
            "Error: metadata file \"{}\" does not exist",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    parse_script(&contents, config, devices)
}

/// Parses a whole metadata script (header line through terminal `.`)
/// into a grouped program.
pub fn parse_script(contents: &str, config: &Config, devices: &Devices) -> Result<LoadedProgram> {
    if contents.is_empty() {
        return Err(SimulationError::config("Error: metadata file empty"));
    }

    let mut lines = contents.lines();

    if lines.next() != Some(METADATA_HEADER) {
        return Err(SimulationError::config(
            "Error: invalid metadata file header",
        ));
    }

    let mut instructions = Vec::new();
    let mut reached_end = false;

    for line in lines {
        if line == METADATA_FOOTER || reached_end {
            break;
        }

        let stripped: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        let mut start = 0;

        while start < stripped.len() {
            let rest = &stripped[start..];
            let end = match rest.find(';') {
                Some(end) => end,
                None => {
                    // The terminal instruction of the script ends in
                    // '.' instead of ';'.
                    let end = rest.find('.').ok_or_else(|| {
                        SimulationError::parse("missing ';' or '.'")
                    })?;
                    reached_end = true;
                    end
                }
            };

            let mut instr = parse_instruction(&rest[..end])?;
            instr.set_wait_time(config.cycle_time_for(instr.descriptor()));
            if let Some(pool) = devices.pool_for(instr.descriptor()) {
                instr.set_device(pool);
            }
            instructions.push(instr);

            start += end + 1;
            if reached_end {
                break;
            }
        }
    }

    group_processes(instructions)
}

/// Parses one `<opcode>{<descriptor>}<cycles>` fragment.
fn parse_instruction(fragment: &str) -> Result<Instruction> {
    let code = fragment
        .chars()
        .next()
        .ok_or_else(|| SimulationError::parse("missing metadata code"))?;
    let opcode = Opcode::from_char(code)?;

    let rest = &fragment[code.len_utf8()..];
    let rest = rest
        .strip_prefix('{')
        .ok_or_else(|| SimulationError::parse("missing start '{'"))?;

    let close = rest
        .find('}')
        .ok_or_else(|| SimulationError::parse("missing end '}'"))?;
    let descriptor = Descriptor::from_name(&rest[..close])?;

    let cycles = &rest[close + 1..];
    if cycles.is_empty() {
        return Err(SimulationError::parse("missing number of cycles"));
    }
    if !cycles.chars().all(|c| c.is_ascii_digit()) {
        return Err(SimulationError::parse(format!(
            "invalid cycle number \"{}\"",
            cycles
        )));
    }
    let num_cycles: u64 = cycles.parse().map_err(|_| {
        SimulationError::parse(format!("invalid cycle number \"{}\"", cycles))
    })?;

    Ok(Instruction::new(opcode, descriptor, num_cycles))
}

/// Groups the flat instruction sequence into processes at
/// `A{begin}`/`A{finish}` boundaries, assigning sequential pids from 1
/// and tallying the per-process instruction counts as it scans.
fn group_processes(instructions: Vec<Instruction>) -> Result<LoadedProgram> {
    let mut processes = Vec::new();
    let mut pcbs = HashMap::new();
    let mut program_begin = None;
    let mut program_end = None;

    let mut current: Option<(u32, Instruction, Vec<Instruction>)> = None;
    let mut next_pid = 1u32;

    for instr in &instructions {
        match (instr.opcode(), instr.descriptor()) {
            (Opcode::Application, Descriptor::Begin) => {
                if current.is_some() {
                    return Err(SimulationError::parse(
                        "process begin inside another process",
                    ));
                }
                current = Some((next_pid, instr.clone(), Vec::new()));
                next_pid += 1;
            }
            (Opcode::Application, Descriptor::Finish) => {
                let (pid, begin, body) = current.take().ok_or_else(|| {
                    SimulationError::parse("process finish without matching begin")
                })?;

                let instruction_count = body.len() as u32;
                let io_instruction_count =
                    body.iter().filter(|instr| instr.is_io()).count() as u32;

                pcbs.insert(
                    pid,
                    ProcessControlBlock::new(pid, instruction_count, io_instruction_count),
                );
                processes.push(Process::new(pid, begin, body, instr.clone()));
            }
            (Opcode::Program, Descriptor::Begin) => {
                program_begin = Some(instr.clone());
            }
            (Opcode::Program, _) => {
                program_end = Some(instr.clone());
            }
            _ => match current.as_mut() {
                Some((_, _, body)) => body.push(instr.clone()),
                None => {
                    return Err(SimulationError::parse(
                        "instruction outside any process",
                    ))
                }
            },
        }
    }

    if current.is_some() {
        return Err(SimulationError::parse("process missing finish"));
    }

    Ok(LoadedProgram {
        instructions,
        processes,
        pcbs,
        program_begin,
        program_end,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn test_config() -> Config {
        Config::parse(
            "Start Simulator Configuration File\n\
             File Path: data/test_1.mdf\n\
             Monitor display time {msec}: 20\n\
             Processor cycle time {msec}: 10\n\
             Scanner cycle time {msec}: 40\n\
             Hard drive cycle time {msec}: 15\n\
             Keyboard cycle time {msec}: 50\n\
             Memory cycle time {msec}: 30\n\
             Projector cycle time {msec}: 25\n\
             System memory {kbytes}: 2048\n\
             Memory block size {kbytes}: 256\n\
             Projector quantity: 2\n\
             Hard drive quantity: 2\n\
             Log: Log to Monitor\n\
             End Simulator Configuration File",
        )
        .unwrap()
    }

    fn test_devices(config: &Config) -> Devices {
        Devices::from_config(config).unwrap()
    }

    fn load(script: &str) -> Result<LoadedProgram> {
        let config = test_config();
        let devices = test_devices(&config);
        parse_script(script, &config, &devices)
    }

    fn wrap(body: &str) -> String {
        format!("{}\n{}\n{}", METADATA_HEADER, body, METADATA_FOOTER)
    }

    #[test]
    fn test_parse_instruction_round_trip() {
        for fragment in ["P{run}50", "I{hard drive}6", "M{allocate}2", "S{begin}0"] {
            let instr = parse_instruction(fragment).unwrap();
            assert_eq!(instr.to_string(), fragment);
        }
    }

    #[test]
    fn test_wait_time_from_config() {
        let program = load(&wrap("S{begin}0; A{begin}0; P{run}50; A{finish}0; S{finish}0.")).unwrap();
        let burst = &program.processes[0].instructions()[0];
        // 50 cycles at 10 ms/cycle
        assert_eq!(burst.wait_time_ms(), 500.0);
    }

    #[test]
    fn test_grouping_assigns_sequential_pids_and_counts() {
        let script = wrap(
            "S{begin}0; A{begin}0; P{run}5; I{keyboard}3; O{monitor}2; A{finish}0;\n\
             A{begin}0; P{run}9; A{finish}0; S{finish}0.",
        );
        let program = load(&script).unwrap();

        assert_eq!(program.processes.len(), 2);
        assert_eq!(program.processes[0].pid(), 1);
        assert_eq!(program.processes[1].pid(), 2);

        let first = &program.pcbs[&1];
        assert_eq!(first.instruction_count(), 3);
        assert_eq!(first.io_instruction_count(), 2);

        let second = &program.pcbs[&2];
        assert_eq!(second.instruction_count(), 1);
        assert_eq!(second.io_instruction_count(), 0);
    }

    #[test]
    fn test_grouping_reconstructs_flat_sequence() {
        let script = wrap(
            "S{begin}0; A{begin}0; P{run}5; M{allocate}2; A{finish}0;\n\
             A{begin}0; I{hard drive}4; A{finish}0; S{finish}0.",
        );
        let program = load(&script).unwrap();

        let mut rebuilt = Vec::new();
        rebuilt.push(program.program_begin.as_ref().unwrap().to_string());
        for process in &program.processes {
            rebuilt.push(process.begin().to_string());
            for instr in process.instructions() {
                rebuilt.push(instr.to_string());
            }
            rebuilt.push(process.finish().to_string());
        }
        rebuilt.push(program.program_end.as_ref().unwrap().to_string());

        let flat: Vec<String> = program
            .instructions
            .iter()
            .map(|instr| instr.to_string())
            .collect();
        assert_eq!(rebuilt, flat);
    }

    #[test]
    fn test_device_handles_assigned_to_pooled_resources() {
        let script = wrap("S{begin}0; A{begin}0; I{hard drive}4; P{run}5; A{finish}0; S{finish}0.");
        let program = load(&script).unwrap();
        let body = program.processes[0].instructions();

        assert!(body[0].device().is_some());
        assert!(body[1].device().is_none());
    }

    #[test]
    fn test_interior_whitespace_is_stripped() {
        let script = wrap("S{begin}0;  A{begin} 0 ; P{ run }50; A{finish}0; S{finish}0.");
        let program = load(&script).unwrap();
        assert_eq!(program.processes[0].instructions()[0].to_string(), "P{run}50");
    }

    #[test]
    fn test_harddrive_spelling_normalized() {
        let script = wrap("S{begin}0; A{begin}0; I{harddrive}4; A{finish}0; S{finish}0.");
        let program = load(&script).unwrap();
        assert_eq!(
            program.processes[0].instructions()[0].descriptor(),
            Descriptor::HardDrive
        );
    }

    #[test]
    fn test_invalid_opcode_is_fatal() {
        let result = load(&wrap("S{begin}0; A{begin}0; X{run}5; A{finish}0; S{finish}0."));
        assert!(matches!(result, Err(SimulationError::Parse(_))));
    }

    #[test]
    fn test_missing_terminator_is_fatal() {
        let result = load(&wrap("S{begin}0; A{begin}0; P{run}5"));
        assert!(matches!(result, Err(SimulationError::Parse(_))));
    }

    #[test]
    fn test_missing_braces_are_fatal() {
        assert!(matches!(
            load(&wrap("Sbegin}0.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin0.")),
            Err(SimulationError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_cycle_counts_are_fatal() {
        assert!(matches!(
            load(&wrap("S{begin}.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin}-1.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin}ten.")),
            Err(SimulationError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_descriptor_is_fatal() {
        let result = load(&wrap("S{begin}0; A{begin}0; P{sprint}5; A{finish}0; S{finish}0."));
        assert!(matches!(result, Err(SimulationError::Parse(_))));
    }

    #[test]
    fn test_unbalanced_process_markers_are_fatal() {
        assert!(matches!(
            load(&wrap("S{begin}0; A{begin}0; A{begin}0; S{finish}0.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin}0; A{finish}0; S{finish}0.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin}0; A{begin}0; S{finish}0.")),
            Err(SimulationError::Parse(_))
        ));
        assert!(matches!(
            load(&wrap("S{begin}0; P{run}5; S{finish}0.")),
            Err(SimulationError::Parse(_))
        ));
    }

    #[test]
    fn test_load_program_requires_mdf_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        fs::write(&path, wrap("S{begin}0; S{finish}0.")).unwrap();

        let config = test_config();
        let devices = test_devices(&config);
        assert!(matches!(
            load_program(&path, &config, &devices),
            Err(SimulationError::Config(_))
        ));
    }

    #[test]
    fn test_load_program_reads_mdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.mdf");
        fs::write(
            &path,
            wrap("S{begin}0; A{begin}0; P{run}50; A{finish}0; S{finish}0."),
        )
        .unwrap();

        let config = test_config();
        let devices = test_devices(&config);
        let program = load_program(&path, &config, &devices).unwrap();
        assert_eq!(program.processes.len(), 1);
    }
}
