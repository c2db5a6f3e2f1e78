pub mod devices;
pub mod execution;
pub mod instruction;
pub mod memory;
pub mod process;
pub mod process_control_block;
pub mod scheduler;
pub mod timer;

pub mod driver;

pub use driver::Driver;
