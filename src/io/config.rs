use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SimulationError};
use crate::kernel::instruction::Descriptor;

const CONFIG_HEADER: &str = "Start Simulator Configuration File";
const CONFIG_FOOTER: &str = "End Simulator Configuration File";

/// Long setting names as they appear in the config file.
const SETTING_NAMES: [&str; 16] = [
    "Version/Phase",
    "File Path",
    "Monitor display time {msec}",
    "Processor cycle time {msec}",
    "Scanner cycle time {msec}",
    "Hard drive cycle time {msec}",
    "Keyboard cycle time {msec}",
    "Memory cycle time {msec}",
    "Projector cycle time {msec}",
    "System memory {kbytes}",
    "Memory block size {kbytes}",
    "Projector quantity",
    "Hard drive quantity",
    "CPU Scheduling Code",
    "Log",
    "Log File Path",
];

/// Settings whose values are free text rather than positive integers.
const TEXT_SETTINGS: [&str; 5] = [
    "Version/Phase",
    "File Path",
    "Log",
    "Log File Path",
    "CPU Scheduling Code",
];

/// Configuration settings, stored under their shortened names
/// ("Processor cycle time {msec}" is looked up as "Processor").
pub struct Config {
    settings: HashMap<String, String>,
}

impl Config {
    /// Opens, validates and parses a `.conf` file.
    pub fn from_file(path: &Path) -> Result<Config> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("conf") {
            return Err(SimulationError::config(
                "Error: invalid extension for config file",
            ));
        }

        if !path.exists() {
            return Err(SimulationError::config(format!(
                "Error: config file \"{}\" does not exist",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        Config::parse(&contents)
    }

    /// Parses the config file body: header line, `Key: value` settings,
    /// footer line.
    pub fn parse(contents: &str) -> Result<Config> {
        if contents.is_empty() {
            return Err(SimulationError::config("Error: config file empty"));
        }

        let mut lines = contents.lines();

        if lines.next() != Some(CONFIG_HEADER) {
            return Err(SimulationError::config("Error: invalid config file header"));
        }

        let mut settings = HashMap::new();
        for line in lines {
            if line == CONFIG_FOOTER {
                break;
            }
            if line.is_empty() {
                continue;
            }
            let (key, value) = parse_config_line(line)?;
            settings.insert(key, value);
        }

        Ok(Config { settings })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Numeric lookup. Missing keys and non-numeric garbage both read
    /// as 0; validation happened at config-parse time.
    pub fn get_u32(&self, key: &str) -> u32 {
        self.get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    /// Cycle time in milliseconds for the resource a descriptor names.
    pub fn cycle_time_for(&self, descriptor: Descriptor) -> u32 {
        self.get_u32(descriptor.config_key())
    }
}

/// Parses one `Key: value` line, validating the key against the known
/// setting names and numeric values as positive integers.
fn parse_config_line(line: &str) -> Result<(String, String)> {
    let (key, rest) = line
        .split_once(':')
        .ok_or_else(|| SimulationError::config("Error: unable to parse config file"))?;

    if !SETTING_NAMES.contains(&key) {
        return Err(SimulationError::config(format!(
            "Error: invalid setting \"{}\"",
            key
        )));
    }

    let value = rest.trim_start_matches(' ');
    if value.is_empty() {
        return Err(SimulationError::config("Error: unable to parse config file"));
    }

    if !TEXT_SETTINGS.contains(&key) && !is_positive_integer(value) {
        return Err(SimulationError::config(format!(
            "Error: invalid cycle/display time \"{}\"",
            value
        )));
    }

    Ok((short_setting_name(key), value.to_string()))
}

/// Shortens a long setting name to its lookup key.
fn short_setting_name(long_name: &str) -> String {
    if TEXT_SETTINGS.contains(&long_name) || long_name.contains("quantity") {
        return long_name.to_string();
    }

    if long_name.starts_with("Memory block size") {
        return "Memory block size".to_string();
    }

    let first_word = long_name.split(' ').next().unwrap_or(long_name);
    match first_word {
        "Hard" => "Hard drive".to_string(),
        "System" => "System memory".to_string(),
        _ => first_word.to_string(),
    }
}

fn is_positive_integer(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| c.is_ascii_digit())
        && value.parse::<u32>().map(|n| n != 0).unwrap_or(false)
}
