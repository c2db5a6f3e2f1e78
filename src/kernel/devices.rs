use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use super::instruction::Descriptor;

use crate::error::{Result, SimulationError};
use crate::io::config::Config;

/// Counting-semaphore-gated pool of interchangeable device units.
///
/// Acquisition blocks while the pool is fully utilized and never times
/// out; the run-to-completion dispatch loop keeps a single waiter at a
/// time, the semaphore exists for correctness under any future
/// concurrent extension.
pub struct DevicePool {
    units: usize,
    permits: Mutex<usize>,
    available: Condvar,
    next_unit: AtomicUsize,
}

impl DevicePool {
    pub fn new(units: usize) -> DevicePool {
        DevicePool {
            units,
            permits: Mutex::new(units),
            available: Condvar::new(),
            next_unit: AtomicUsize::new(0),
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Takes one unit out of the pool, blocking until one is free.
    /// The unit is returned when the guard drops.
    pub fn acquire(&self) -> DeviceGuard<'_> {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;

        DeviceGuard { pool: self }
    }

    /// Round-robin unit index for log lines (`counter++ % pool size`).
    pub fn next_index(&self) -> usize {
        self.next_unit.fetch_add(1, Ordering::Relaxed) % self.units
    }
}

pub struct DeviceGuard<'a> {
    pool: &'a DevicePool,
}

impl Drop for DeviceGuard<'_> {
    fn drop(&mut self) {
        let mut permits = self.pool.permits.lock().unwrap();
        *permits += 1;
        self.pool.available.notify_one();
    }
}

/// Registry of the per-device-class pools, built once at simulation
/// start from the configured quantities. Hard drives and projectors may
/// have several units; keyboard, monitor and scanner are exclusive.
pub struct Devices {
    hard_drive: Arc<DevicePool>,
    projector: Arc<DevicePool>,
    keyboard: Arc<DevicePool>,
    monitor: Arc<DevicePool>,
    scanner: Arc<DevicePool>,
}

impl Devices {
    pub fn from_config(config: &Config) -> Result<Devices> {
        let num_hard_drives = config.get_u32("Hard drive quantity") as usize;
        let num_projectors = config.get_u32("Projector quantity") as usize;

        if num_hard_drives == 0 {
            return Err(SimulationError::config(
                "Error: 'Hard drive quantity' missing or zero in config file",
            ));
        }
        if num_projectors == 0 {
            return Err(SimulationError::config(
                "Error: 'Projector quantity' missing or zero in config file",
            ));
        }

        Ok(Devices {
            hard_drive: Arc::new(DevicePool::new(num_hard_drives)),
            projector: Arc::new(DevicePool::new(num_projectors)),
            keyboard: Arc::new(DevicePool::new(1)),
            monitor: Arc::new(DevicePool::new(1)),
            scanner: Arc::new(DevicePool::new(1)),
        })
    }

    /// The pool servicing a descriptor, or None for descriptors that
    /// name no shared device.
    pub fn pool_for(&self, descriptor: Descriptor) -> Option<Arc<DevicePool>> {
        match descriptor {
            Descriptor::HardDrive => Some(self.hard_drive.clone()),
            Descriptor::Projector => Some(self.projector.clone()),
            Descriptor::Keyboard => Some(self.keyboard.clone()),
            Descriptor::Monitor => Some(self.monitor.clone()),
            Descriptor::Scanner => Some(self.scanner.clone()),
            _ => None,
        }
    }
}
