//! Host ARM register identities used by the emitter.

use std::fmt::Display;

use num_derive::FromPrimitive;

/// One of the sixteen ARM general-purpose registers.
///
/// `R13`/`R14`/`R15` double as `SP`/`LR`/`PC` under the EABI; both names are
/// kept as associated constants so call sites can read either naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl Reg {
    pub const SP: Reg = Reg::R13;
    pub const LR: Reg = Reg::R14;
    pub const PC: Reg = Reg::R15;

    /// R11 permanently holds the base address of the guest register block
    /// across all translated code (invariant I2).
    pub const REGS_BASE: Reg = Reg::R11;

    /// Scratch registers the emitter may clobber within a single IR op.
    /// Never assigned to a guest value by the front-end's register allocator (invariant I3).
    pub const WORK1: Reg = Reg::R2;
    pub const WORK2: Reg = Reg::R3;
    pub const WORK3: Reg = Reg::R12;

    pub fn from_u4(value: u32) -> Reg {
        <Reg as num_traits::FromPrimitive>::from_u32(value & 0xF).unwrap()
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reg::R13 => write!(f, "SP"),
            Reg::R14 => write!(f, "LR"),
            Reg::R15 => write!(f, "PC"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// A VFP double-precision register (D0-D15). Single-precision views (S0-S31)
/// address the same physical bank as half-width slices; this emitter only
/// needs the double-word addressing mode (§4.1 of the design).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DReg(pub u8);

impl DReg {
    pub const D0: DReg = DReg(0);
    pub const D1: DReg = DReg(1);

    pub fn as_u32(self) -> u32 {
        self.0 as u32
    }
}

impl Display for DReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}

use bitflags::bitflags;

bitflags! {
    /// Bitmask of registers to push/pop, as used by block prologue/epilogue and `STM`/`LDM`.
    ///
    /// Grounded on the teacher's `Instr::BlockTransfer { registers: u16, .. }` representation
    /// (`examples/zeramorphic-armul/armul/src/instr/ty.rs`), generalized into a `bitflags` set
    /// since this crate never needs the general block-transfer instruction, only register-set
    /// masks for PUSH/POP.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegSet: u16 {
        const R0 = 1 << 0;
        const R1 = 1 << 1;
        const R2 = 1 << 2;
        const R3 = 1 << 3;
        const R4 = 1 << 4;
        const R5 = 1 << 5;
        const R6 = 1 << 6;
        const R7 = 1 << 7;
        const R8 = 1 << 8;
        const R9 = 1 << 9;
        const R10 = 1 << 10;
        const R11 = 1 << 11;
        const R12 = 1 << 12;
        const SP = 1 << 13;
        const LR = 1 << 14;
        const PC = 1 << 15;
    }
}

impl RegSet {
    pub fn with(self, r: Reg) -> RegSet {
        self | RegSet::from_bits_retain(1 << r.as_u32())
    }

    pub fn contains_reg(self, r: Reg) -> bool {
        self.contains(RegSet::from_bits_retain(1 << r.as_u32()))
    }

    /// The preserve-mask used by the block prologue/epilogue: R4-R12, excluding
    /// SP/LR/PC, matching the callee-saved set of the EABI (§6 Host ABI).
    pub fn preserve_mask() -> RegSet {
        RegSet::R4
            | RegSet::R5
            | RegSet::R6
            | RegSet::R7
            | RegSet::R8
            | RegSet::R9
            | RegSet::R10
            | RegSet::R11
            | RegSet::R12
    }
}
