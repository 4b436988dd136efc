//! Memory and register images.
//!
//! A saved device is two files sharing a stem:
//!
//! ```text
//! <name>.mem     128 × u64 LE    the grid, word 0 first
//! <name>.state    15 × u32 LE    base registers (mask, coefficients, bypass)
//!              4·D × u32 LE      dipole blocks (output, seed0..2), D = num_dipoles
//! ```
//!
//! Transfers run one word at a time. A stream that ends early or fails
//! yields [`AinedError::PersistenceShortIo`] with the number of words that
//! did move; those stay in place on the device or in the file.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::device::{report, Ained};
use crate::error::{AinedError, Result};
use crate::fabric::Fabric;
use crate::grid::NUM_WORDS;
use crate::regs::{dipole, NUM_REGS};

/// Extension of the memory image.
pub const MEMORY_EXT: &str = "mem";

/// Extension of the register image.
pub const STATE_EXT: &str = "state";

/// `<name>.mem`. The extension is appended, never substituted.
#[must_use]
pub fn memory_image_path(name: impl AsRef<Path>) -> PathBuf {
    with_ext(name.as_ref(), MEMORY_EXT)
}

/// `<name>.state`. The extension is appended, never substituted.
#[must_use]
pub fn state_image_path(name: impl AsRef<Path>) -> PathBuf {
    with_ext(name.as_ref(), STATE_EXT)
}

fn with_ext(name: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(name.as_os_str());
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

/// Progress through one image section.
struct Section {
    image: &'static str,
    expected: usize,
    done: usize,
}

impl Section {
    const fn new(image: &'static str, expected: usize) -> Self {
        Self {
            image,
            expected,
            done: 0,
        }
    }

    fn put(&mut self, w: &mut impl Write, bytes: &[u8]) -> Result<()> {
        w.write_all(bytes).map_err(|source| self.short(source))?;
        self.done += 1;
        Ok(())
    }

    fn take<const N: usize>(&mut self, r: &mut impl Read) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        r.read_exact(&mut buf).map_err(|source| self.short(source))?;
        self.done += 1;
        Ok(buf)
    }

    fn short(&self, source: io::Error) -> AinedError {
        AinedError::PersistenceShortIo {
            image: self.image,
            expected: self.expected,
            actual: self.done,
            source,
        }
    }
}

impl<F: Fabric> Ained<F> {
    /// Writes `<name>.mem` and `<name>.state`.
    ///
    /// # Errors
    ///
    /// [`AinedError::Io`] if a file cannot be created,
    /// [`AinedError::PersistenceShortIo`] if a write stops early.
    pub fn store(&self, name: impl AsRef<Path>) -> Result<()> {
        let name = name.as_ref();
        report(self.store_files(name))?;
        info!(name = %name.display(), "stored device image");
        Ok(())
    }

    // Unbuffered, so a failing device surfaces inside the section that hit it.
    fn store_files(&self, name: &Path) -> Result<()> {
        self.store_memory_to(File::create(memory_image_path(name))?)?;
        self.store_state_to(File::create(state_image_path(name))?)
    }

    /// Reads `<name>.mem` into the grid (under bypass, restored afterwards)
    /// and `<name>.state` into the register file.
    ///
    /// # Errors
    ///
    /// [`AinedError::Io`] if a file cannot be opened,
    /// [`AinedError::PersistenceShortIo`] if an image is short. Words read
    /// before the failure stay written.
    pub fn restore(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let name = name.as_ref();
        report(self.restore_files(name))?;
        info!(name = %name.display(), "restored device image");
        Ok(())
    }

    fn restore_files(&mut self, name: &Path) -> Result<()> {
        let mut mem = BufReader::new(File::open(memory_image_path(name))?);
        self.restore_memory_from(&mut mem)?;

        let mut state = BufReader::new(File::open(state_image_path(name))?);
        self.restore_state_from(&mut state)
    }

    /// Writes the memory image to `w`.
    ///
    /// # Errors
    ///
    /// [`AinedError::PersistenceShortIo`] with the number of words written.
    pub fn store_memory_to(&self, mut w: impl Write) -> Result<()> {
        let mut section = Section::new("memory", NUM_WORDS);
        for word in 0..NUM_WORDS {
            section.put(&mut w, &self.read_word(word).to_le_bytes())?;
        }
        Ok(())
    }

    /// Writes the register image to `w`.
    ///
    /// # Errors
    ///
    /// [`AinedError::PersistenceShortIo`] with the number of registers
    /// written in the failing section.
    pub fn store_state_to(&self, mut w: impl Write) -> Result<()> {
        let mut base = Section::new("register", NUM_REGS);
        for reg in 0..NUM_REGS {
            base.put(&mut w, &self.read_reg(reg).to_le_bytes())?;
        }
        let count = self.num_dipoles() * dipole::STRIDE;
        let mut dipoles = Section::new("dipole", count);
        for reg in dipole::BASE..dipole::BASE + count {
            dipoles.put(&mut w, &self.read_reg(reg).to_le_bytes())?;
        }
        Ok(())
    }

    /// Loads the memory image from `r` under bypass. The bypass flag ends
    /// as it was.
    ///
    /// # Errors
    ///
    /// [`AinedError::PersistenceShortIo`] with the number of words loaded.
    pub fn restore_memory_from(&mut self, mut r: impl Read) -> Result<()> {
        self.with_bypass(|device| {
            let mut section = Section::new("memory", NUM_WORDS);
            for word in 0..NUM_WORDS {
                let value = u64::from_le_bytes(section.take(&mut r)?);
                device.write_word(word, value);
            }
            Ok(())
        })
    }

    /// Loads the register image from `r`. The bypass flag follows the
    /// restored bypass register.
    ///
    /// # Errors
    ///
    /// [`AinedError::PersistenceShortIo`] with the number of registers
    /// loaded in the failing section.
    pub fn restore_state_from(&mut self, mut r: impl Read) -> Result<()> {
        let result = self.load_registers(&mut r);
        self.sync_bypass();
        result
    }

    fn load_registers(&mut self, r: &mut impl Read) -> Result<()> {
        let mut base = Section::new("register", NUM_REGS);
        for reg in 0..NUM_REGS {
            let value = u32::from_le_bytes(base.take(r)?);
            self.write_reg(reg, value);
        }
        let count = self.num_dipoles() * dipole::STRIDE;
        let mut dipoles = Section::new("dipole", count);
        for reg in dipole::BASE..dipole::BASE + count {
            let value = u32::from_le_bytes(dipoles.take(r)?);
            self.write_reg(reg, value);
        }
        Ok(())
    }
}
