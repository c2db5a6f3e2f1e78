pub mod error;
pub mod io;
pub mod kernel;

pub use error::{Result, SimulationError};
