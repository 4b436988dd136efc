//! Device configuration.
//!
//! Physical placement of the register and memory windows. The defaults are
//! the addresses the fabric bitstream uses on the Zynq board; a TOML file
//! can override any subset of them.
//!
//! ```toml
//! device_path = "/dev/mem"
//! register_base = 0x43C00000
//! register_len = 8192
//! memory_base = 0x43C10000
//! memory_len = 4096
//! max_dipoles = 256
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AinedError, Result};
use crate::grid::NUM_WORDS;
use crate::regs::{dipole, dipole_reg, NUM_REGS};

/// Mapping granularity of `/dev/mem`.
pub const PAGE_SIZE: u64 = 4096;

/// Where and how to map the fabric.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Device node giving access to physical memory.
    pub device_path: PathBuf,
    /// Physical address of the register window.
    pub register_base: u64,
    /// Register window length in bytes.
    pub register_len: usize,
    /// Physical address of the memory plane.
    pub memory_base: u64,
    /// Memory plane length in bytes.
    pub memory_len: usize,
    /// Upper bound for the dipole scan at open.
    pub max_dipoles: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/mem"),
            register_base: 0x43C0_0000,
            register_len: 1 << 13,
            memory_base: 0x43C1_0000,
            memory_len: 1 << 12,
            max_dipoles: dipole::MAX,
        }
    }
}

impl DeviceConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`AinedError::ConfigParse`] for malformed TOML or unknown keys,
    /// [`AinedError::Config`] if the result fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`AinedError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Checks that both windows are page aligned and large enough.
    ///
    /// # Errors
    ///
    /// [`AinedError::Config`] naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(AinedError::Config(msg));

        if self.register_base % PAGE_SIZE != 0 {
            return fail(format!(
                "register_base {:#x} is not {PAGE_SIZE}-byte aligned",
                self.register_base
            ));
        }
        if self.memory_base % PAGE_SIZE != 0 {
            return fail(format!(
                "memory_base {:#x} is not {PAGE_SIZE}-byte aligned",
                self.memory_base
            ));
        }
        if self.max_dipoles > dipole::MAX {
            return fail(format!(
                "max_dipoles {} exceeds the register window limit of {}",
                self.max_dipoles,
                dipole::MAX
            ));
        }
        let regs_needed = NUM_REGS.max(dipole_reg(self.max_dipoles, 0)) * 4;
        if self.register_len < regs_needed {
            return fail(format!(
                "register_len {} too small for {} dipoles (need {regs_needed})",
                self.register_len, self.max_dipoles
            ));
        }
        let words_needed = NUM_WORDS * 8;
        if self.memory_len < words_needed {
            return fail(format!(
                "memory_len {} too small for the grid (need {words_needed})",
                self.memory_len
            ));
        }
        let overlap = self.register_base < self.memory_base.saturating_add(self.memory_len as u64)
            && self.memory_base < self.register_base.saturating_add(self.register_len as u64);
        if overlap {
            return fail("register and memory windows overlap".to_string());
        }
        Ok(())
    }
}
