use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SimulationError};
use crate::io::config::Config;

/// Where the simulation log goes, from the `Log` config setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Monitor,
    File,
    Both,
}

impl LogTarget {
    pub fn from_setting(setting: &str) -> Result<LogTarget> {
        match setting {
            "Log to Monitor" => Ok(LogTarget::Monitor),
            "Log to File" => Ok(LogTarget::File),
            "Log to Both" => Ok(LogTarget::Both),
            _ => Err(SimulationError::config(
                "Error: cannot log data - invalid or missing log type",
            )),
        }
    }
}

/// Sink for the timestamped execution log. The simulation's product
/// output; diagnostics go through the `log` macros instead.
pub struct LogSink {
    to_monitor: bool,
    file: Option<File>,
}

impl LogSink {
    pub fn from_config(config: &Config) -> Result<LogSink> {
        let target = LogTarget::from_setting(config.get("Log").unwrap_or(""))?;

        let file = match target {
            LogTarget::Monitor => None,
            LogTarget::File | LogTarget::Both => {
                let path = config
                    .get("Log File Path")
                    .filter(|path| !path.is_empty())
                    .ok_or_else(|| {
                        SimulationError::config(
                            "Error: cannot log to file - filename missing",
                        )
                    })?;
                Some(File::create(path)?)
            }
        };

        Ok(LogSink {
            to_monitor: matches!(target, LogTarget::Monitor | LogTarget::Both),
            file,
        })
    }

    /// File-only sink, used by tests that read the log back.
    pub fn to_file(path: &Path) -> Result<LogSink> {
        Ok(LogSink {
            to_monitor: false,
            file: Some(File::create(path)?),
        })
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if self.to_monitor {
            println!("{}", line);
        }
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Renders `"<elapsed seconds, 6 decimal places> - <phrase>"`.
    pub fn write_timestamped(&mut self, elapsed_seconds: f32, phrase: &str) -> Result<()> {
        self.write_line(&format!("{:.6} - {}", elapsed_seconds, phrase))
    }
}
