//! The ARM barrel shifter, as applied to a data-processing instruction's second operand.
//!
//! Grounded on `examples/zeramorphic-armul/armul/src/instr/ty.rs`'s `Shift`/`ShiftType`/
//! `ShiftAmount` and `examples/zeramorphic-armul/armul/src/instr/encode.rs`'s `encode_shift`
//! (the RRX-as-ROR-#0 and shift-by-32-encoded-as-0 quirks below are load-bearing encoding
//! detail carried over verbatim from that function).

use std::fmt::Display;

use num_derive::FromPrimitive;

use crate::reg::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum ShiftType {
    /// Arithmetic left is the same as logical left.
    LogicalLeft,
    LogicalRight,
    ArithmeticRight,
    RotateRight,
    /// Rotate right by one bit position the 33-bit quantity obtained by appending
    /// the CPSR carry flag to the most significant end of the argument.
    RotateRightExtended,
}

impl Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::LogicalLeft => write!(f, "LSL"),
            ShiftType::LogicalRight => write!(f, "LSR"),
            ShiftType::ArithmeticRight => write!(f, "ASR"),
            ShiftType::RotateRight => write!(f, "ROR"),
            ShiftType::RotateRightExtended => write!(f, "RRX"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftAmount {
    /// Shift by the given 5-bit unsigned integer (0-31; 32 is accepted for LSR/ASR
    /// and re-encoded as 0 per the ARM ISA's overloaded encoding).
    Constant(u8),
    /// Shift by the amount specified in the bottom byte of the given register.
    Register(Reg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift {
    pub shift_type: ShiftType,
    pub shift_amount: ShiftAmount,
}

impl Shift {
    pub const NONE: Shift = Shift {
        shift_type: ShiftType::LogicalLeft,
        shift_amount: ShiftAmount::Constant(0),
    };

    pub fn lsl(amount: u8) -> Shift {
        Shift {
            shift_type: ShiftType::LogicalLeft,
            shift_amount: ShiftAmount::Constant(amount),
        }
    }

    /// Encodes this shift in bits 11..4 of a data-processing/transfer instruction.
    /// Panics (programmer error, §7) on an out-of-range constant shift amount.
    pub fn encode(mut self) -> u32 {
        match self.shift_amount {
            ShiftAmount::Constant(0) => 0,
            ShiftAmount::Constant(mut shift_amount) => {
                if self.shift_type == ShiftType::RotateRightExtended {
                    self.shift_type = ShiftType::RotateRight;
                    shift_amount = 0;
                } else if shift_amount == 32
                    && matches!(
                        self.shift_type,
                        ShiftType::LogicalRight | ShiftType::ArithmeticRight
                    )
                {
                    shift_amount = 0;
                } else if shift_amount >= 32 {
                    panic!("shift amount {shift_amount} out of range 0..=31");
                }
                (shift_amount as u32) << 7 | (self.shift_type as u32) << 5
            }
            ShiftAmount::Register(register) => {
                assert!(
                    self.shift_type != ShiftType::RotateRightExtended,
                    "RRX cannot take a register-specified shift amount"
                );
                (register.as_u32()) << 8 | (self.shift_type as u32) << 5 | (1 << 4)
            }
        }
    }
}

impl Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.shift_type == ShiftType::RotateRightExtended {
            write!(f, ",RRX")
        } else if self.shift_amount == ShiftAmount::Constant(0) {
            Ok(())
        } else {
            match self.shift_amount {
                ShiftAmount::Constant(i) => write!(f, ",{} #{i}", self.shift_type),
                ShiftAmount::Register(r) => write!(f, ",{} {r}", self.shift_type),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsl_zero_encodes_to_zero() {
        assert_eq!(Shift::NONE.encode(), 0);
    }

    #[test]
    fn lsl_two_encodes_shift_amount_and_type() {
        assert_eq!(Shift::lsl(2).encode(), 2 << 7);
    }

    #[test]
    fn lsr_by_32_encodes_as_zero() {
        let s = Shift {
            shift_type: ShiftType::LogicalRight,
            shift_amount: ShiftAmount::Constant(32),
        };
        assert_eq!(s.encode(), (ShiftType::LogicalRight as u32) << 5);
    }

    #[test]
    fn rrx_encodes_as_ror_zero() {
        let s = Shift {
            shift_type: ShiftType::RotateRightExtended,
            shift_amount: ShiftAmount::Constant(0),
        };
        assert_eq!(s.encode(), (ShiftType::RotateRight as u32) << 5);
    }

    #[test]
    #[should_panic]
    fn out_of_range_shift_panics() {
        let s = Shift {
            shift_type: ShiftType::LogicalLeft,
            shift_amount: ShiftAmount::Constant(40),
        };
        s.encode();
    }
}
