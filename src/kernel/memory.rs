use std::sync::Mutex;

use super::instruction::Descriptor;

use crate::io::config::Config;

/// Mutex-guarded bump allocator over the simulated system memory.
///
/// Allocation hands out block-aligned addresses from a monotonically
/// advancing next-free-block pointer. When the remaining memory cannot
/// fit another block the allocator wraps: it returns address 0 and
/// resets the pointer to one block size. `block` (deallocate) is a
/// no-op; real deallocation would change the observable address
/// sequence.
pub struct MemoryManager {
    system_memory: u32,
    block_size: u32,
    next_block: Mutex<u32>,
}

impl MemoryManager {
    pub fn new(system_memory: u32, block_size: u32) -> MemoryManager {
        MemoryManager {
            system_memory,
            block_size,
            next_block: Mutex::new(0),
        }
    }

    pub fn from_config(config: &Config) -> MemoryManager {
        MemoryManager::new(
            config.get_u32("System memory"),
            config.get_u32("Memory block size"),
        )
    }

    /// Runs one memory instruction. The lock is held across both the
    /// address computation and the simulated hold time, so the whole
    /// instruction is one critical section. Returns the allocated
    /// address for `allocate`, None otherwise.
    pub fn execute<F: FnOnce()>(&self, descriptor: Descriptor, hold: F) -> Option<u32> {
        let mut next_block = self.next_block.lock().unwrap();

        let address = match descriptor {
            Descriptor::Allocate => {
                let remaining = self.system_memory.saturating_sub(*next_block);
                if remaining >= self.block_size {
                    let address = *next_block;
                    *next_block += self.block_size;
                    Some(address)
                } else {
                    *next_block = self.block_size;
                    Some(0)
                }
            }
            _ => None,
        };

        hold();

        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocate(memory: &MemoryManager) -> u32 {
        memory.execute(Descriptor::Allocate, || {}).unwrap()
    }

    #[test]
    fn test_allocate_advances_by_block_size() {
        let memory = MemoryManager::new(1024, 256);
        assert_eq!(allocate(&memory), 0);
        assert_eq!(allocate(&memory), 256);
        assert_eq!(allocate(&memory), 512);
        assert_eq!(allocate(&memory), 768);
    }

    #[test]
    fn test_allocate_wraps_when_memory_exhausted() {
        let memory = MemoryManager::new(1024, 256);
        for _ in 0..4 {
            allocate(&memory);
        }

        // Exhausted: address 0 comes back and the pointer resets past
        // the first block.
        assert_eq!(allocate(&memory), 0);
        assert_eq!(allocate(&memory), 256);
    }

    #[test]
    fn test_block_is_a_no_op() {
        let memory = MemoryManager::new(1024, 256);
        assert_eq!(memory.execute(Descriptor::Block, || {}), None);
        assert_eq!(allocate(&memory), 0);
    }

    #[test]
    fn test_hold_runs_inside_critical_section() {
        let mut held = false;
        let memory = MemoryManager::new(1024, 256);
        memory.execute(Descriptor::Allocate, || held = true);
        assert!(held);
    }
}
