use std::io;
use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::Deserialize;
use stockpile::address::{self, Base};
use stockpile::memory::GAME_EXECUTABLE;
use stockpile::slots::SlotTable;

use crate::error::LaunchError;

#[derive(Debug, thiserror::Error)]
pub(crate) enum LaunchProfileError {
    #[error("could not read launch profile: {0}")]
    FileReadError(io::Error),
    #[error("could not parse launch profile: {0}")]
    ConfigParseError(toml::de::Error),
    #[error("freeze_interval_ms must be at least 1")]
    ZeroFreezeInterval,
}

/// Reads the profile at `path`, falling back to defaults when it does not exist.
pub(crate) fn read_launch_profile(path: &str) -> Result<LaunchProfile, LaunchProfileError> {
    if !Path::new(path).exists() {
        let mut launch_profile = parse_launch_profile("")?;
        launch_profile.fallback_from = Some(path.to_string());
        return Ok(launch_profile);
    }

    let launch_profile_contents = std::fs::read_to_string(path)
        .map_err(LaunchProfileError::FileReadError)?;

    parse_launch_profile(launch_profile_contents.as_str())
}

pub(crate) fn parse_launch_profile(contents: &str) -> Result<LaunchProfile, LaunchProfileError> {
    let launch_profile: LaunchProfile = toml::from_str(contents)
        .map_err(LaunchProfileError::ConfigParseError)?;

    if launch_profile.freeze_interval_ms == 0 {
        return Err(LaunchProfileError::ZeroFreezeInterval);
    }

    Ok(launch_profile)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LaunchProfile {
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Address of `address_slot` in the game, as shown by a memory viewer.
    pub address: Option<String>,
    pub address_slot: Option<String>,

    #[serde(default = "default_freeze_interval_ms")]
    pub freeze_interval_ms: u64,

    pub log_file: Option<String>,

    /// Replaces the built-in slot names, in storage order.
    pub slots: Option<Vec<String>>,

    /// Path that was looked up when the defaults had to be used.
    #[serde(skip)]
    pub fallback_from: Option<String>,
}

impl LaunchProfile {
    pub fn slot_table(&self) -> Result<SlotTable, LaunchError> {
        match &self.slots {
            Some(names) => Ok(SlotTable::new(names.iter().cloned())?),
            None => Ok(SlotTable::cultures()),
        }
    }

    /// Base of the slot table, derived from the address of one known slot.
    pub fn storage_base(&self, table: &SlotTable) -> Result<Base, LaunchError> {
        let slot_address = self.address.as_deref()
            .ok_or(LaunchError::MissingAddress)?;
        let slot_address = address::parse_hex(slot_address)?;
        let index = match &self.address_slot {
            Some(name) => table.index_of(name)?,
            None => 0,
        };

        Ok(Base::from_slot_address(slot_address, index)?)
    }

    pub fn freeze_interval(&self) -> Duration {
        Duration::from_millis(self.freeze_interval_ms)
    }

    /// Reports the fallback to defaults. Call once logging is up.
    pub fn log_fallback(&self) {
        if let Some(path) = &self.fallback_from {
            warn!("No launch profile at {}, using defaults", path);
        }
    }
}

fn default_executable() -> String {
    GAME_EXECUTABLE.to_string()
}

fn default_freeze_interval_ms() -> u64 {
    200
}
