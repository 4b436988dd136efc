//! The real fabric: `/dev/mem` mapped through `mmap`, one live mapping per
//! process.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{io, ptr};

use tracing::{debug, warn};

use crate::config::DeviceConfig;
use crate::error::{AinedError, Result};
use crate::regs::MASK_LO;

use super::Fabric;

/// Set while an [`MmioFabric`] is alive in this process.
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide exclusive claim on the physical device.
#[derive(Debug)]
struct Claim(());

impl Claim {
    fn acquire() -> Result<Self> {
        CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| AinedError::AlreadyOpen)
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

/// One `mmap`ed window of physical address space.
#[derive(Debug)]
struct Window {
    base: NonNull<libc::c_void>,
    len: usize,
}

impl Window {
    fn map(file: &File, path: &Path, name: &'static str, phys: u64, len: usize) -> Result<Self> {
        let mapping_error = |source: io::Error| AinedError::Mapping {
            window: name,
            path: path.to_path_buf(),
            source,
        };
        let offset = libc::off_t::try_from(phys).map_err(|_| {
            mapping_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("physical address {phys:#x} exceeds off_t"),
            ))
        })?;

        // SAFETY: fresh shared mapping of a device file; the kernel picks the
        // address and the result is checked against MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                offset,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(mapping_error(io::Error::last_os_error()));
        }
        let base = NonNull::new(raw).ok_or_else(|| {
            mapping_error(io::Error::other("mmap returned null"))
        })?;
        debug!(window = name, phys = format_args!("{phys:#x}"), len, "mapped");
        Ok(Self { base, len })
    }

    fn as_ptr<T>(&self) -> *mut T {
        self.base.as_ptr().cast()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        // SAFETY: `base`/`len` are exactly what mmap returned and the window
        // is unmapped once.
        if unsafe { libc::munmap(self.base.as_ptr(), self.len) } != 0 {
            warn!(error = %io::Error::last_os_error(), "munmap failed");
        }
    }
}

/// Register and memory windows mapped from `/dev/mem`.
///
/// Only one instance may be alive per process; a second
/// [`open`](Self::open) fails with [`AinedError::AlreadyOpen`] until the
/// first is dropped.
#[derive(Debug)]
pub struct MmioFabric {
    registers: Window,
    memory: Window,
    register_count: usize,
    word_count: usize,
    _file: File,
    _claim: Claim,
}

impl MmioFabric {
    /// Opens the device node and maps both windows.
    ///
    /// # Errors
    ///
    /// [`AinedError::AlreadyOpen`] if another handle is live,
    /// [`AinedError::Config`] for an invalid configuration, or
    /// [`AinedError::Mapping`] if the node cannot be opened or mapped.
    pub fn open(config: &DeviceConfig) -> Result<Self> {
        config.validate()?;
        let claim = Claim::acquire()?;
        let path = config.device_path.as_path();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| AinedError::Mapping {
                window: "register",
                path: path.to_path_buf(),
                source,
            })?;

        let registers = Window::map(
            &file,
            path,
            "register",
            config.register_base,
            config.register_len,
        )?;
        let memory = Window::map(&file, path, "memory", config.memory_base, config.memory_len)?;

        Ok(Self {
            register_count: registers.len / 4,
            word_count: memory.len / 8,
            registers,
            memory,
            _file: file,
            _claim: claim,
        })
    }
}

impl Fabric for MmioFabric {
    fn register_count(&self) -> usize {
        self.register_count
    }

    fn read_reg(&self, index: usize) -> u32 {
        if index >= self.register_count {
            return 0;
        }
        // SAFETY: index is inside the mapped register window.
        unsafe { self.registers.as_ptr::<u32>().add(index).read_volatile() }
    }

    fn write_reg(&mut self, index: usize, value: u32) {
        if index < self.register_count {
            // SAFETY: index is inside the mapped register window.
            unsafe { self.registers.as_ptr::<u32>().add(index).write_volatile(value) }
        }
    }

    fn word_count(&self) -> usize {
        self.word_count
    }

    fn read_word(&self, index: usize) -> u64 {
        if index >= self.word_count {
            return 0;
        }
        // SAFETY: index is inside the mapped memory window.
        unsafe { self.memory.as_ptr::<u64>().add(index).read_volatile() }
    }

    fn write_word(&mut self, index: usize, value: u64) {
        if index < self.word_count {
            // SAFETY: index is inside the mapped memory window.
            unsafe { self.memory.as_ptr::<u64>().add(index).write_volatile(value) }
        }
    }

    /// The mask is one 64-bit register on the bus; a single store keeps the
    /// two halves from being observed apart.
    fn write_mask(&mut self, mask: u64) {
        // SAFETY: the window is page aligned and at least two registers long
        // (checked by `DeviceConfig::validate`).
        unsafe { self.registers.as_ptr::<u64>().add(MASK_LO).write_volatile(mask) }
    }
}
