pub mod config;
pub mod loader;
pub mod logger;

pub use config::Config;
pub use logger::LogSink;
