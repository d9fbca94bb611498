use std::fmt::Display;

use crate::error::{LoadError, VmError};

pub const MEM_SIZE: usize = 256;

/// The machine's entire address space: 256 byte cells, zero-initialized.
///
/// Addresses are `u16` so that a program counter that has walked past the
/// last cell is representable; any access at or beyond `MEM_SIZE` is a fatal
/// `AddressOutOfRange` error rather than a silent wrap.
pub struct Memory {
    pub(crate) data: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: [0; MEM_SIZE],
        }
    }

    pub fn read(&self, addr: u16) -> Result<u8, VmError> {
        self.data
            .get(addr as usize)
            .copied()
            .ok_or(VmError::AddressOutOfRange(addr))
    }

    /// Lookahead read for operand fetch: addresses past the end of memory
    /// read as zero, matching the zero-filled cells past the loaded program.
    pub fn peek(&self, addr: u16) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn write(&mut self, addr: u16, byte: u8) -> Result<(), VmError> {
        match self.data.get_mut(addr as usize) {
            Some(cell) => {
                *cell = byte;
                Ok(())
            }
            None => Err(VmError::AddressOutOfRange(addr)),
        }
    }

    /// Write `program` into memory starting at address 0.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > self.data.len() {
            return Err(LoadError::TooLarge(program.len()));
        }
        self.data[..program.len()].copy_from_slice(program);
        Ok(())
    }
}

impl Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const BYTES_PER_LINE: usize = 16;
        for (line, chunk) in self.data.chunks(BYTES_PER_LINE).enumerate() {
            write!(f, "{:02X}: ", line * BYTES_PER_LINE)?;
            for byte in chunk {
                write!(f, "{:02X} ", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, MEM_SIZE};
    use crate::error::{LoadError, VmError};

    #[test]
    fn test_read_write() {
        let mut memory = Memory::new();
        memory.write(0xF3, 42).unwrap();
        assert_eq!(memory.read(0xF3).unwrap(), 42);
        assert_eq!(memory.read(0x00).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut memory = Memory::new();
        assert!(matches!(
            memory.read(MEM_SIZE as u16),
            Err(VmError::AddressOutOfRange(0x100))
        ));
        assert!(matches!(
            memory.write(0x300, 1),
            Err(VmError::AddressOutOfRange(0x300))
        ));
        assert_eq!(memory.peek(MEM_SIZE as u16), 0);
    }

    #[test]
    fn test_load_too_large() {
        let mut memory = Memory::new();
        let program = [0u8; MEM_SIZE + 1];
        assert!(matches!(
            memory.load(&program),
            Err(LoadError::TooLarge(257))
        ));
    }
}
