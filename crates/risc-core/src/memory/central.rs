use tracing::{info, warn};

use super::loader::{read_program, LoadError, LoadReport, ProgramAssembler};
use super::ADDRESS_SPACE_BYTES;
use crate::bus::SystemBus;
use crate::config::InterpreterSettings;

/// Flat RAM of at most 64 KiB.
///
/// Word transfers are little-endian: the low byte lives at `address`, the
/// high byte at `address + 1`. Accesses at or beyond the end of RAM are
/// silently ignored; a word access at the last byte only moves the low byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CentralMemory {
    cells: Vec<u8>,
}

impl CentralMemory {
    /// Allocates `size` zeroed bytes (clamped to the address space).
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![0; size.min(ADDRESS_SPACE_BYTES)],
        }
    }

    /// Reallocates to `size` bytes (clamped to the address space) and zero-fills.
    pub fn reset(&mut self, size: usize) {
        self.cells.clear();
        self.cells.resize(size.min(ADDRESS_SPACE_BYTES), 0);
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Peeks one byte; out-of-range addresses read as zero.
    #[must_use]
    pub fn get(&self, address: u16) -> u8 {
        self.cells.get(usize::from(address)).copied().unwrap_or(0)
    }

    /// Peeks a little-endian word with the same out-of-range rule as [`Self::get`].
    #[must_use]
    pub fn get_word(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.get(address), self.get(address.wrapping_add(1))])
    }

    /// Read-only view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Answers the transaction currently latched on the bus.
    ///
    /// Does nothing unless the bus selects memory and the address is in range.
    /// Reads place the result on the data lines; writes store the data lines.
    pub fn operate(&mut self, bus: &mut SystemBus) {
        let control = bus.get_control();
        if !control.memory_select {
            return;
        }

        let address = usize::from(bus.get_address());
        let Some(&low) = self.cells.get(address) else {
            return;
        };

        if control.read {
            let high = if control.word_width {
                self.cells.get(address + 1).copied().unwrap_or(0)
            } else {
                0
            };
            bus.write_data(u16::from_le_bytes([low, high]));
        } else {
            let [low, high] = bus.get_data().to_le_bytes();
            self.cells[address] = low;
            if control.word_width {
                if let Some(cell) = self.cells.get_mut(address + 1) {
                    *cell = high;
                }
            }
        }
    }

    /// Copies `image` to address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ImageTooLarge`] (and writes nothing) when the
    /// image does not fit.
    pub fn write_image(&mut self, image: &[u8]) -> Result<(), LoadError> {
        let capacity = self.cells.len();
        let target = self
            .cells
            .get_mut(..image.len())
            .ok_or(LoadError::ImageTooLarge {
                len: image.len(),
                capacity,
            })?;
        target.copy_from_slice(image);
        Ok(())
    }

    /// Loads the program named by `settings`.
    ///
    /// The image is read and validated completely before memory is touched.
    /// On success memory is resized to the effective RAM size (which may have
    /// grown to fit an assembled program), zero-filled, and the image copied
    /// to address 0.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] from reading, parsing or assembling; memory
    /// is left as it was.
    pub fn load_program(
        &mut self,
        settings: &InterpreterSettings,
        assembler: Option<&dyn ProgramAssembler>,
    ) -> Result<LoadReport, LoadError> {
        let image = read_program(settings, assembler)?;

        self.reset(usize::try_from(image.ram_size).unwrap_or(ADDRESS_SPACE_BYTES));
        self.write_image(&image.bytes)?;

        let report = image.report();
        info!(
            format = %report.format,
            bytes = report.bytes,
            ram_size = report.ram_size,
            start = report.start,
            "program loaded"
        );
        Ok(report)
    }

    /// Like [`Self::load_program`] but logs a failure instead of returning it.
    ///
    /// Returns `None` when nothing was loaded; memory then stays zero-filled
    /// at its current size.
    pub fn load_program_or_warn(
        &mut self,
        settings: &InterpreterSettings,
        assembler: Option<&dyn ProgramAssembler>,
    ) -> Option<LoadReport> {
        match self.load_program(settings, assembler) {
            Ok(report) => Some(report),
            Err(error) => {
                warn!(path = %settings.program_path().display(), %error, "program load skipped");
                None
            }
        }
    }
}
