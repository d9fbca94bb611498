use crate::error::VmError;

pub const REGISTER_COUNT: usize = 8;

/// Stack pointer, register 7. Registers 5 and 6 are reserved for the
/// interrupt mask and interrupt status; with interrupts unsupported they
/// behave as ordinary registers.
pub const SP: u8 = 7;

/// The stack grows downward from here.
pub const STACK_START: u8 = 0xF4;

/// Eight 8-bit general-purpose registers, zero-initialized except SP.
///
/// Register indices come straight out of operand bytes, so indexing is
/// fallible: anything outside [0, 7] is a fatal `InvalidRegister` error.
pub struct Registers(pub(crate) [u8; REGISTER_COUNT]);

impl Registers {
    pub fn new() -> Self {
        let mut registers = [0; REGISTER_COUNT];
        registers[SP as usize] = STACK_START;
        Self(registers)
    }

    pub fn get(&self, index: u8) -> Result<u8, VmError> {
        self.0
            .get(index as usize)
            .copied()
            .ok_or(VmError::InvalidRegister(index))
    }

    pub fn set(&mut self, index: u8, value: u8) -> Result<(), VmError> {
        match self.0.get_mut(index as usize) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(VmError::InvalidRegister(index)),
        }
    }

    pub fn sp(&self) -> u8 {
        self.0[SP as usize]
    }

    pub fn set_sp(&mut self, value: u8) {
        self.0[SP as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{Registers, SP, STACK_START};
    use crate::error::VmError;

    #[test]
    fn test_initial_state() {
        let registers = Registers::new();
        for index in 0..SP {
            assert_eq!(registers.get(index).unwrap(), 0);
        }
        assert_eq!(registers.sp(), STACK_START);
    }

    #[test]
    fn test_invalid_index() {
        let mut registers = Registers::new();
        assert!(matches!(registers.get(8), Err(VmError::InvalidRegister(8))));
        assert!(matches!(
            registers.set(0xFF, 1),
            Err(VmError::InvalidRegister(0xFF))
        ));
    }
}
