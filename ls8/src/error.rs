use thiserror::Error;

/// Errors raised while reading a program into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid binary literal {text:?}")]
    InvalidLiteral { line: usize, text: String },
    #[error("program is {} bytes but memory holds {}", .0, crate::memory::MEM_SIZE)]
    TooLarge(usize),
}

/// Fatal errors raised during execution. None of these are recoverable;
/// the run loop stops at the first one.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("unknown opcode {opcode:#010b} at address {addr:#04X}")]
    UnknownOpcode { opcode: u8, addr: u16 },
    #[error("register index {0} out of range")]
    InvalidRegister(u8),
    #[error("address {0:#06X} out of range")]
    AddressOutOfRange(u16),
    #[error("cannot divide by 0")]
    DivisionByZero,
}
