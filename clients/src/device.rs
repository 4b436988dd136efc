//! Device selection for the binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use ained::{Ained, DeviceConfig, Fabric, SimFabric};

/// A handle over whichever fabric was selected.
pub type Device = Ained<Box<dyn Fabric>>;

/// Dipoles modelled by `--simulate` when `--dipoles` is not given.
pub const DEFAULT_SIM_DIPOLES: usize = 16;

/// Flags choosing between the memory-mapped device and the simulator.
#[derive(Args, Clone, Debug)]
pub struct DeviceArgs {
    /// Use the in-memory fabric instead of mapping the device.
    #[arg(long)]
    pub simulate: bool,

    /// Number of dipoles modelled by the simulated fabric.
    #[arg(long, default_value_t = DEFAULT_SIM_DIPOLES)]
    pub dipoles: usize,

    /// Device configuration file (TOML). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl DeviceArgs {
    /// Loads `--config`, or the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load_config(&self) -> Result<DeviceConfig> {
        match &self.config {
            Some(path) => DeviceConfig::from_toml_file(path)
                .with_context(|| format!("failed to load device config {}", path.display())),
            None => Ok(DeviceConfig::default()),
        }
    }

    /// Opens the selected fabric.
    ///
    /// # Errors
    ///
    /// Fails on a bad config or when the device cannot be mapped.
    pub fn open(&self) -> Result<Device> {
        let config = self.load_config()?;
        if self.simulate {
            info!(dipoles = self.dipoles, "using simulated fabric");
            let fabric: Box<dyn Fabric> = Box::new(SimFabric::new(self.dipoles));
            return Ok(Ained::with_dipole_limit(fabric, config.max_dipoles));
        }
        open_mapped(&config)
    }
}

#[cfg(target_os = "linux")]
fn open_mapped(config: &DeviceConfig) -> Result<Device> {
    let fabric = ained::MmioFabric::open(config)
        .with_context(|| format!("failed to open {}", config.device_path.display()))?;
    let fabric: Box<dyn Fabric> = Box::new(fabric);
    Ok(Ained::with_dipole_limit(fabric, config.max_dipoles))
}

#[cfg(not(target_os = "linux"))]
fn open_mapped(_config: &DeviceConfig) -> Result<Device> {
    anyhow::bail!("memory-mapped access is only available on Linux; pass --simulate")
}
