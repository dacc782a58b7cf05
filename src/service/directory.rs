//! # Device Directory
//!
//! Read-only mapping from device id to a human-readable name, loaded once
//! at startup from a `deviceId:deviceName` text file. Devices the listener
//! hears from but the file does not mention resolve to a fixed sentinel;
//! they are never rejected.

use crate::error::{ListenerError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Name returned for ids absent from the directory.
pub const UNKNOWN_DEVICE: &str = "Unknown device";

/// Id-to-name lookup table. Immutable after construction, so it can be
/// shared across tasks without synchronization.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    names: HashMap<u16, String>,
}

impl DeviceDirectory {
    /// Create an empty directory; every lookup falls back to the sentinel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the directory from a description file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            ListenerError::Directory(format!(
                "Failed to open device description file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parse `deviceId:deviceName` lines. Malformed lines are logged with
    /// their line number and skipped; blank lines and `#` comments are
    /// ignored.
    pub fn parse(contents: &str) -> Self {
        let mut names = HashMap::new();

        for (idx, raw) in contents.lines().enumerate() {
            let line_num = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((id_part, name_part)) = line.split_once(':') else {
                warn!(line = line_num, "Wrong device description format");
                continue;
            };

            match id_part.trim().parse::<u16>() {
                Ok(device_id) => {
                    let name = name_part.trim().to_string();
                    info!(device_id, name = %name, "Added device");
                    names.insert(device_id, name);
                }
                Err(_) => warn!(line = line_num, "Wrong device ID"),
            }
        }

        Self { names }
    }

    /// Name for a device id, if the directory knows it.
    pub fn lookup(&self, device_id: u16) -> Option<&str> {
        self.names.get(&device_id).map(String::as_str)
    }

    /// Name for a device id, falling back to [`UNKNOWN_DEVICE`].
    pub fn name(&self, device_id: u16) -> &str {
        self.lookup(device_id).unwrap_or(UNKNOWN_DEVICE)
    }

    /// Number of known devices.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the directory knows no devices.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lines() {
        let directory = DeviceDirectory::parse("1:Thermometer\n17:Flow sensor\n");
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup(1), Some("Thermometer"));
        assert_eq!(directory.name(17), "Flow sensor");
    }

    #[test]
    fn skips_malformed_lines_and_keeps_the_rest() {
        let input = "1:Thermometer\nno separator here\nxyz:Broken id\n2:Valve\n";
        let directory = DeviceDirectory::parse(input);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup(1), Some("Thermometer"));
        assert_eq!(directory.lookup(2), Some("Valve"));
    }

    #[test]
    fn ignores_blank_lines_and_comments() {
        let directory = DeviceDirectory::parse("\n# fleet A\n3:Pump\n\n");
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup(3), Some("Pump"));
    }

    #[test]
    fn name_keeps_extra_colons() {
        let directory = DeviceDirectory::parse("4:rack:3:slot:1\n");
        assert_eq!(directory.name(4), "rack:3:slot:1");
    }

    #[test]
    fn unknown_ids_resolve_to_sentinel() {
        let directory = DeviceDirectory::new();
        assert_eq!(directory.lookup(9), None);
        assert_eq!(directory.name(9), UNKNOWN_DEVICE);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = DeviceDirectory::from_file("/nonexistent/devices.conf");
        assert!(result.is_err());
    }
}
