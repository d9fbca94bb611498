mod error;
mod loader;
mod memory;
pub mod opcode;
mod registers;

use std::cmp::Ordering;
use std::fmt::Display as FmtDisplay;
use std::path::Path;

use log::trace;

pub use crate::error::{LoadError, VmError};
use crate::memory::Memory;
pub use crate::memory::MEM_SIZE;
use crate::opcode::{instruction_length, sets_pc, Opcode};
use crate::registers::Registers;
pub use crate::registers::{REGISTER_COUNT, SP, STACK_START};

pub use crate::opcode as isa;

/// Flag bits written by CMP and tested by the conditional jumps. CMP sets
/// exactly one of them per comparison.
pub const FL_EQ: u8 = 0b001;
pub const FL_GT: u8 = 0b010;
pub const FL_LT: u8 = 0b100;

/// Engine state reported by each step. The run loop is the only place that
/// acts on `Halted`; handlers never terminate the process themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

pub struct Cpu {
    /// The full 256-byte address space, holding both code and the stack
    memory: Memory,
    /// 8 general-purpose byte registers; register 7 is the stack pointer
    registers: Registers,
    /// Address of the next instruction to fetch
    pc: u16,
    /// Condition flags, written by CMP and read by conditional jumps
    fl: u8,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            memory: Memory::new(),
            registers: Registers::new(),
            pc: 0,
            fl: 0,
        }
    }

    /// Write a raw program into memory starting at address 0 and reset PC.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.memory.load(program)?;
        self.pc = 0;
        Ok(())
    }

    /// Parse a text program file and load it.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let program = loader::read(path)?;
        self.load(&program)
    }

    /// Step until the program halts or a fatal error occurs.
    pub fn run(&mut self) -> Result<(), VmError> {
        loop {
            if self.step()? == State::Halted {
                return Ok(());
            }
        }
    }

    /// Fetch, decode, and execute a single instruction.
    pub fn step(&mut self) -> Result<State, VmError> {
        let ir = self.memory.read(self.pc)?;
        // Operands are always fetched; 0- and 1-operand instructions ignore
        // the excess bytes.
        let operand_a = self.memory.peek(self.pc + 1);
        let operand_b = self.memory.peek(self.pc + 2);

        let opcode = Opcode::decode(ir).ok_or(VmError::UnknownOpcode {
            opcode: ir,
            addr: self.pc,
        })?;

        trace!(
            "PC={:02X} FL={:02X} | {:02X} {:02X} {:02X} | {:02X?}",
            self.pc,
            self.fl,
            ir,
            operand_a,
            operand_b,
            self.registers.0
        );

        let state = self.execute(opcode, operand_a, operand_b)?;

        if !sets_pc(ir) {
            self.pc += u16::from(instruction_length(ir));
        }

        Ok(state)
    }

    fn execute(&mut self, opcode: Opcode, a: u8, b: u8) -> Result<State, VmError> {
        match opcode {
            Opcode::Hlt => return Ok(State::Halted),
            Opcode::Nop => {}
            Opcode::Ldi => self.op_ldi(a, b)?,
            Opcode::Ld => self.op_ld(a, b)?,
            Opcode::St => self.op_st(a, b)?,
            Opcode::Push => self.op_push(a)?,
            Opcode::Pop => self.op_pop(a)?,
            Opcode::Call => self.op_call(a)?,
            Opcode::Ret => self.op_ret()?,
            Opcode::Iret => self.op_iret()?,
            Opcode::Jmp => self.op_jmp(a)?,
            Opcode::Jeq => self.op_jeq(a)?,
            Opcode::Jne => self.op_jne(a)?,
            Opcode::Jgt => self.op_jgt(a)?,
            Opcode::Jlt => self.op_jlt(a)?,
            Opcode::Jle => self.op_jle(a)?,
            Opcode::Jge => self.op_jge(a)?,
            Opcode::Add => self.op_add(a, b)?,
            Opcode::Addi => self.op_addi(a, b)?,
            Opcode::Sub => self.op_sub(a, b)?,
            Opcode::Mul => self.op_mul(a, b)?,
            Opcode::Div => self.op_div(a, b)?,
            Opcode::Mod => self.op_mod(a, b)?,
            Opcode::Inc => self.op_inc(a)?,
            Opcode::Dec => self.op_dec(a)?,
            Opcode::Cmp => self.op_cmp(a, b)?,
            Opcode::And => self.op_and(a, b)?,
            Opcode::Or => self.op_or(a, b)?,
            Opcode::Xor => self.op_xor(a, b)?,
            Opcode::Not => self.op_not(a)?,
            Opcode::Shl => self.op_shl(a, b)?,
            Opcode::Shr => self.op_shr(a, b)?,
            Opcode::Prn => self.op_prn(a)?,
            Opcode::Pra => self.op_pra(a)?,
        }
        Ok(State::Running)
    }

    /* Stack helpers */

    fn push(&mut self, value: u8) -> Result<(), VmError> {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        self.memory.write(u16::from(sp), value)
    }

    fn pop(&mut self) -> Result<u8, VmError> {
        let sp = self.registers.sp();
        let value = self.memory.read(u16::from(sp))?;
        self.registers.set_sp(sp.wrapping_add(1));
        Ok(value)
    }

    /* Data movement */

    /// LDI Ra, imm
    fn op_ldi(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        self.registers.set(a, b)
    }

    /// LD Ra, Rb
    fn op_ld(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let addr = self.registers.get(b)?;
        let value = self.memory.read(u16::from(addr))?;
        self.registers.set(a, value)
    }

    /// ST Ra, Rb
    fn op_st(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let addr = self.registers.get(a)?;
        let value = self.registers.get(b)?;
        self.memory.write(u16::from(addr), value)
    }

    /// PUSH Ra
    fn op_push(&mut self, a: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?;
        self.push(value)
    }

    /// POP Ra
    fn op_pop(&mut self, a: u8) -> Result<(), VmError> {
        let value = self.pop()?;
        self.registers.set(a, value)
    }

    /* Control flow */

    /// CALL Ra
    fn op_call(&mut self, a: u8) -> Result<(), VmError> {
        let ret = self.pc + 2;
        let ret = u8::try_from(ret).map_err(|_| VmError::AddressOutOfRange(ret))?;
        self.push(ret)?;
        self.pc = u16::from(self.registers.get(a)?);
        Ok(())
    }

    /// RET
    fn op_ret(&mut self) -> Result<(), VmError> {
        self.pc = u16::from(self.pop()?);
        Ok(())
    }

    /// IRET: pop R6..R0 in that order, then FL, then PC. Re-enabling
    /// interrupts is a no-op since interrupts are unsupported.
    fn op_iret(&mut self) -> Result<(), VmError> {
        for index in (0..=6u8).rev() {
            let value = self.pop()?;
            self.registers.set(index, value)?;
        }
        self.fl = self.pop()?;
        self.pc = u16::from(self.pop()?);
        Ok(())
    }

    /// JMP Ra
    fn op_jmp(&mut self, a: u8) -> Result<(), VmError> {
        self.pc = u16::from(self.registers.get(a)?);
        Ok(())
    }

    /// JEQ Ra
    fn op_jeq(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & FL_EQ != 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    /// JNE Ra
    fn op_jne(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & FL_EQ == 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    /// JGT Ra
    fn op_jgt(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & FL_GT != 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    /// JLT Ra
    fn op_jlt(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & FL_LT != 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    /// JLE Ra
    fn op_jle(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & (FL_EQ | FL_LT) != 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    /// JGE Ra
    fn op_jge(&mut self, a: u8) -> Result<(), VmError> {
        if self.fl & (FL_EQ | FL_GT) != 0 {
            self.op_jmp(a)
        } else {
            self.skip_jump();
            Ok(())
        }
    }

    // Conditional jumps own PC even when not taken.
    fn skip_jump(&mut self) {
        self.pc += 2;
    }

    /* ALU */

    /// ADD Ra, Rb
    fn op_add(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_add(self.registers.get(b)?);
        self.registers.set(a, value)
    }

    /// ADDI Ra, imm
    fn op_addi(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_add(b);
        self.registers.set(a, value)
    }

    /// SUB Ra, Rb
    fn op_sub(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_sub(self.registers.get(b)?);
        self.registers.set(a, value)
    }

    /// MUL Ra, Rb
    fn op_mul(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_mul(self.registers.get(b)?);
        self.registers.set(a, value)
    }

    /// DIV Ra, Rb (integer division)
    fn op_div(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let divisor = self.registers.get(b)?;
        if divisor == 0 {
            return Err(VmError::DivisionByZero);
        }
        let value = self.registers.get(a)? / divisor;
        self.registers.set(a, value)
    }

    /// MOD Ra, Rb
    fn op_mod(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let divisor = self.registers.get(b)?;
        if divisor == 0 {
            return Err(VmError::DivisionByZero);
        }
        let value = self.registers.get(a)? % divisor;
        self.registers.set(a, value)
    }

    /// INC Ra
    fn op_inc(&mut self, a: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_add(1);
        self.registers.set(a, value)
    }

    /// DEC Ra
    fn op_dec(&mut self, a: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)?.wrapping_sub(1);
        self.registers.set(a, value)
    }

    /// CMP Ra, Rb: exactly one flag bit ends up set.
    fn op_cmp(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let lhs = self.registers.get(a)?;
        let rhs = self.registers.get(b)?;
        self.fl = match lhs.cmp(&rhs) {
            Ordering::Equal => FL_EQ,
            Ordering::Greater => FL_GT,
            Ordering::Less => FL_LT,
        };
        Ok(())
    }

    /// AND Ra, Rb
    fn op_and(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)? & self.registers.get(b)?;
        self.registers.set(a, value)
    }

    /// OR Ra, Rb
    fn op_or(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)? | self.registers.get(b)?;
        self.registers.set(a, value)
    }

    /// XOR Ra, Rb
    fn op_xor(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let value = self.registers.get(a)? ^ self.registers.get(b)?;
        self.registers.set(a, value)
    }

    /// NOT Ra
    fn op_not(&mut self, a: u8) -> Result<(), VmError> {
        let value = !self.registers.get(a)?;
        self.registers.set(a, value)
    }

    /// SHL Ra, Rb: shifts of 8 or more clear the register.
    fn op_shl(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let shift = self.registers.get(b)?;
        let value = self
            .registers
            .get(a)?
            .checked_shl(u32::from(shift))
            .unwrap_or(0);
        self.registers.set(a, value)
    }

    /// SHR Ra, Rb
    fn op_shr(&mut self, a: u8, b: u8) -> Result<(), VmError> {
        let shift = self.registers.get(b)?;
        let value = self
            .registers
            .get(a)?
            .checked_shr(u32::from(shift))
            .unwrap_or(0);
        self.registers.set(a, value)
    }

    /* I/O */

    /// PRN Ra: decimal value on its own line
    fn op_prn(&mut self, a: u8) -> Result<(), VmError> {
        println!("{}", self.registers.get(a)?);
        Ok(())
    }

    /// PRA Ra: register value as a character code on its own line
    fn op_pra(&mut self, a: u8) -> Result<(), VmError> {
        println!("{}", char::from(self.registers.get(a)?));
        Ok(())
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl FmtDisplay for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "=== Memory ===\n{}", self.memory)
    }
}
