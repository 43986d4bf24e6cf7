//! ARM condition codes and the synthesized IEEE-unordered FPU predicates built on top of them.
//!
//! Grounded on `examples/zeramorphic-armul/armul/src/instr/ty.rs`'s `Cond` enum (the sixteen
//! native codes, doc comments describing each flag test, and `Display`); the FPU predicate set
//! is new to this crate (§3, §4.5 of the design) and is not present in the teacher, so it is
//! modeled the same way: a small `#[repr(u8)]` enum with a `Display` impl in the teacher's style.

use std::fmt::Display;

use num_derive::FromPrimitive;

/// The sixteen native ARM condition codes that can prefix any instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Cond {
    /// Z set (equal)
    EQ,
    /// Z clear (not equal)
    NE,
    /// C set (unsigned higher or same)
    CS,
    /// C clear (unsigned lower)
    CC,
    /// N set (negative)
    MI,
    /// N clear (positive or zero)
    PL,
    /// V set (overflow)
    VS,
    /// V clear (no overflow)
    VC,
    /// C set and Z clear (unsigned higher)
    HI,
    /// C clear or Z set (unsigned lower or same)
    LS,
    /// N equals V (greater or equal)
    GE,
    /// N not equal to V (less than)
    LT,
    /// Z clear AND (N equals V) (greater than)
    GT,
    /// Z set OR (N not equal to V) (less than or equal)
    LE,
    /// (ignored) (always)
    AL,
}

impl Cond {
    /// The condition that tests the opposite of `self`. Used when synthesizing a
    /// long-range branch as "skip over an unconditional jump unless cond holds".
    pub fn invert(self) -> Cond {
        match self {
            Cond::EQ => Cond::NE,
            Cond::NE => Cond::EQ,
            Cond::CS => Cond::CC,
            Cond::CC => Cond::CS,
            Cond::MI => Cond::PL,
            Cond::PL => Cond::MI,
            Cond::VS => Cond::VC,
            Cond::VC => Cond::VS,
            Cond::HI => Cond::LS,
            Cond::LS => Cond::HI,
            Cond::GE => Cond::LT,
            Cond::LT => Cond::GE,
            Cond::GT => Cond::LE,
            Cond::LE => Cond::GT,
            Cond::AL => Cond::AL,
        }
    }
}

impl Display for Cond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cond::AL => Ok(()),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// IEEE-754 unordered-aware floating point predicates, synthesized from the ARM
/// N/Z/C/V flags that `VCMP` + `VMRS` deposit into the CPSR (§3, §4.5).
///
/// Ordered variants (`F_O*`) require the "valid" (not-NaN) check before testing the
/// ARM flags; unordered variants (`F_U*`) treat a NaN operand as a positive match.
/// `F_NEVER` has no native ARM encoding and is handled entirely within the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpCond {
    /// Ordered greater-than.
    OGT,
    /// Ordered greater-than-or-equal.
    OGE,
    /// Ordered less-than.
    OLT,
    /// Ordered less-than-or-equal.
    OLE,
    /// Ordered greater-or-less (not equal, neither is NaN).
    OGL,
    /// Ordered (neither operand is NaN).
    OR,
    /// Unordered (at least one operand is NaN).
    UN,
    /// Unordered or equal.
    UEQ,
    /// Unordered or greater-than.
    UGT,
    /// Unordered or greater-than-or-equal.
    UGE,
    /// Unordered or less-than.
    ULT,
    /// Unordered or less-than-or-equal.
    ULE,
    /// Never jump.
    NEVER,
}

impl Display for FpCond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_is_involution() {
        let all = [
            Cond::EQ,
            Cond::NE,
            Cond::CS,
            Cond::CC,
            Cond::MI,
            Cond::PL,
            Cond::VS,
            Cond::VC,
            Cond::HI,
            Cond::LS,
            Cond::GE,
            Cond::LT,
            Cond::GT,
            Cond::LE,
        ];
        for c in all {
            assert_eq!(c.invert().invert(), c);
            assert_ne!(c.invert(), c);
        }
    }

    #[test]
    fn al_displays_empty() {
        assert_eq!(Cond::AL.to_string(), "");
        assert_eq!(Cond::EQ.to_string(), "EQ");
    }
}
