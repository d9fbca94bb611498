//! LS-8 instruction encoding.
//!
//! The opcode byte carries its own framing: the top two bits are the operand
//! count, and bit 4 marks instructions that write PC themselves, suppressing
//! the engine's default advance.

pub const NOP: u8 = 0b00000000;
pub const HLT: u8 = 0b00000001;
pub const RET: u8 = 0b00010001;
pub const IRET: u8 = 0b00010011;
pub const PUSH: u8 = 0b01000101;
pub const POP: u8 = 0b01000110;
pub const PRN: u8 = 0b01000111;
pub const PRA: u8 = 0b01001000;
pub const CALL: u8 = 0b01010000;
pub const JMP: u8 = 0b01010100;
pub const JEQ: u8 = 0b01010101;
pub const JNE: u8 = 0b01010110;
pub const JGT: u8 = 0b01010111;
pub const JLT: u8 = 0b01011000;
pub const JLE: u8 = 0b01011001;
pub const JGE: u8 = 0b01011010;
pub const INC: u8 = 0b01100101;
pub const DEC: u8 = 0b01100110;
pub const NOT: u8 = 0b01101001;
pub const LDI: u8 = 0b10000010;
pub const LD: u8 = 0b10000011;
pub const ST: u8 = 0b10000100;
pub const ADD: u8 = 0b10100000;
pub const SUB: u8 = 0b10100001;
pub const MUL: u8 = 0b10100010;
pub const DIV: u8 = 0b10100011;
pub const MOD: u8 = 0b10100100;
pub const ADDI: u8 = 0b10100101;
pub const CMP: u8 = 0b10100111;
pub const AND: u8 = 0b10101000;
pub const OR: u8 = 0b10101010;
pub const XOR: u8 = 0b10101011;
pub const SHL: u8 = 0b10101100;
pub const SHR: u8 = 0b10101101;

/// One variant per instruction the machine implements. Decoding resolves a
/// raw byte to a variant exactly once per step; everything after that is an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    Hlt,
    Ret,
    Iret,
    Push,
    Pop,
    Prn,
    Pra,
    Call,
    Jmp,
    Jeq,
    Jne,
    Jgt,
    Jlt,
    Jle,
    Jge,
    Inc,
    Dec,
    Not,
    Ldi,
    Ld,
    St,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Addi,
    Cmp,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl Opcode {
    pub fn decode(byte: u8) -> Option<Self> {
        match byte {
            NOP => Some(Self::Nop),
            HLT => Some(Self::Hlt),
            RET => Some(Self::Ret),
            IRET => Some(Self::Iret),
            PUSH => Some(Self::Push),
            POP => Some(Self::Pop),
            PRN => Some(Self::Prn),
            PRA => Some(Self::Pra),
            CALL => Some(Self::Call),
            JMP => Some(Self::Jmp),
            JEQ => Some(Self::Jeq),
            JNE => Some(Self::Jne),
            JGT => Some(Self::Jgt),
            JLT => Some(Self::Jlt),
            JLE => Some(Self::Jle),
            JGE => Some(Self::Jge),
            INC => Some(Self::Inc),
            DEC => Some(Self::Dec),
            NOT => Some(Self::Not),
            LDI => Some(Self::Ldi),
            LD => Some(Self::Ld),
            ST => Some(Self::St),
            ADD => Some(Self::Add),
            SUB => Some(Self::Sub),
            MUL => Some(Self::Mul),
            DIV => Some(Self::Div),
            MOD => Some(Self::Mod),
            ADDI => Some(Self::Addi),
            CMP => Some(Self::Cmp),
            AND => Some(Self::And),
            OR => Some(Self::Or),
            XOR => Some(Self::Xor),
            SHL => Some(Self::Shl),
            SHR => Some(Self::Shr),
            _ => None,
        }
    }
}

pub fn operand_count(opcode: u8) -> u8 {
    opcode >> 6
}

pub fn instruction_length(opcode: u8) -> u8 {
    operand_count(opcode) + 1
}

pub fn sets_pc(opcode: u8) -> bool {
    (opcode >> 4) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_count() {
        assert_eq!(operand_count(HLT), 0);
        assert_eq!(operand_count(PUSH), 1);
        assert_eq!(operand_count(LDI), 2);
        assert_eq!(instruction_length(LDI), 3);
    }

    #[test]
    fn test_sets_pc() {
        for byte in [CALL, RET, IRET, JMP, JEQ, JNE, JGT, JLT, JLE, JGE] {
            assert!(sets_pc(byte), "{byte:#010b} should set PC");
        }
        for byte in [NOP, HLT, PUSH, POP, PRN, PRA, LDI, LD, ST, ADD, CMP] {
            assert!(!sets_pc(byte), "{byte:#010b} should not set PC");
        }
    }

    #[test]
    fn test_decode_unknown_byte() {
        assert_eq!(Opcode::decode(0b11111111), None);
        assert_eq!(Opcode::decode(ADD), Some(Opcode::Add));
    }
}
