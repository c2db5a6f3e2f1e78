use std::collections::{HashMap, VecDeque};

use super::process::Process;
use super::process_control_block::ProcessControlBlock;

/// Ready-queue ordering policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// First come, first served: ascending pid (arrival order).
    Fifo,
    /// Priority by I/O weight: descending I/O instruction count.
    PriorityScheduling,
    /// Shortest job first: ascending total instruction count.
    ShortestJobFirst,
}

impl SchedulingPolicy {
    /// Maps a scheduling code from the config file to a policy. Returns
    /// None for unrecognized codes, in which case the ready queue keeps
    /// its arrival order untouched.
    pub fn from_code(code: &str) -> Option<SchedulingPolicy> {
        match code {
            "FIFO" => Some(SchedulingPolicy::Fifo),
            "PS" => Some(SchedulingPolicy::PriorityScheduling),
            "SJF" => Some(SchedulingPolicy::ShortestJobFirst),
            _ => None,
        }
    }
}

/// Orders loaded processes into the ready queue the execution engine
/// consumes. Every sort here is stable, so processes with equal keys
/// keep their arrival order.
pub struct Scheduler {
    policy: Option<SchedulingPolicy>,
}

impl Scheduler {
    pub fn new(policy: Option<SchedulingPolicy>) -> Scheduler {
        Scheduler { policy }
    }

    pub fn policy(&self) -> Option<SchedulingPolicy> {
        self.policy
    }

    pub fn build_ready_queue(
        &self,
        mut processes: Vec<Process>,
        pcbs: &HashMap<u32, ProcessControlBlock>,
    ) -> VecDeque<Process> {
        self.apply_policy(&mut processes, pcbs);
        processes.into()
    }

    pub fn apply_policy(
        &self,
        processes: &mut Vec<Process>,
        pcbs: &HashMap<u32, ProcessControlBlock>,
    ) {
        let io_weight = |process: &Process| {
            pcbs.get(&process.pid())
                .map(|pcb| pcb.io_instruction_count())
                .unwrap_or(0)
        };
        let job_length = |process: &Process| {
            pcbs.get(&process.pid())
                .map(|pcb| pcb.instruction_count())
                .unwrap_or(0)
        };

        match self.policy {
            Some(SchedulingPolicy::Fifo) => processes.sort_by_key(|p| p.pid()),
            Some(SchedulingPolicy::PriorityScheduling) => {
                processes.sort_by(|a, b| io_weight(b).cmp(&io_weight(a)))
            }
            Some(SchedulingPolicy::ShortestJobFirst) => processes.sort_by_key(job_length),
            None => {}
        }
    }
}
