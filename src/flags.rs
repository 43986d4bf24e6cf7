//! The flag bridge (§4.6, §4.7): moving host CPSR flags into and out of the guest CCR slot,
//! and keeping a `FrontEnd`'s flag mirror honest across that movement.
//!
//! Grounded on §4.6's direct description (`MRS`/`MSR` pairs around the guest CCR word) and on
//! the teacher's `Instr::Msr`/`Instr::Mrs` variants (`examples/zeramorphic-armul/armul/src/instr/
//! ty.rs`) for the instruction shapes; the front-end notification half is new (§4.7) and is
//! wired through the `FrontEnd` trait from `frontend.rs`.

use crate::cond::Cond;
use crate::encode;
use crate::frontend::FrontEnd;
use crate::guest::RegBlockLayout;
use crate::reg::Reg;

/// `raw_reg_to_flags` (§4.6): restores host CPSR flags from a general-purpose register:
/// `MSR CPSR_f, Rm`. Notifies the front-end via [`FrontEnd::clobber_flags`] first, since
/// this instruction overwrites whatever flags were live before it.
pub fn raw_reg_to_flags<F: FrontEnd>(buf: &mut crate::buffer::CodeBuffer, front_end: &mut F, src: Reg) {
    front_end.clobber_flags();
    encode::msr_reg_flags(buf, Cond::AL, src);
}

/// `raw_flags_to_reg` (§4.6): spills host flags to `dest`, stores `dest` into the guest
/// CCR word, and notifies the front-end that its flag mirror (if any) has just moved out
/// of `dest` and into guest memory, per §4.7.
pub fn raw_flags_to_reg<F: FrontEnd>(
    buf: &mut crate::buffer::CodeBuffer,
    front_end: &mut F,
    layout: &RegBlockLayout,
    dest: Reg,
) {
    encode::mrs(buf, Cond::AL, dest);
    encode::str_imm(buf, Cond::AL, dest, Reg::REGS_BASE, layout.ccr as i32, false);
    front_end.mirror_flag_eviction(dest);
}

/// `raw_load_flagreg` (§4.6): loads the guest CCR word into `dest` without touching host
/// flags. Used to read 68k condition codes back out of memory after they were mirrored
/// there by [`raw_flags_to_reg`].
pub fn raw_load_flagreg(buf: &mut crate::buffer::CodeBuffer, layout: &RegBlockLayout, dest: Reg) {
    encode::ldr_imm(buf, Cond::AL, dest, Reg::REGS_BASE, layout.ccr as i32, false);
}

/// `raw_load_flagx` (§4.6): loads the guest X-flag word (68k extend bit, stored separately
/// from the other four condition bits at `layout.x_flag`) into `dest`.
pub fn raw_load_flagx(buf: &mut crate::buffer::CodeBuffer, layout: &RegBlockLayout, dest: Reg) {
    encode::ldr_imm(buf, Cond::AL, dest, Reg::REGS_BASE, layout.x_flag as i32, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CodeBuffer;
    use crate::frontend::NullFrontEnd;
    use crate::guest::RegBlockLayout;

    #[test]
    fn raw_flags_to_reg_notifies_the_front_end() {
        struct Spy {
            evicted_from: Option<Reg>,
        }
        impl FrontEnd for Spy {
            fn clobber_flags(&mut self) {}
            fn mirror_flag_eviction(&mut self, held_in: Reg) {
                self.evicted_from = Some(held_in);
            }
        }
        let mut buf = CodeBuffer::new();
        let layout = RegBlockLayout::standard();
        let mut spy = Spy { evicted_from: None };
        raw_flags_to_reg(&mut buf, &mut spy, &layout, Reg::WORK1);
        assert_eq!(spy.evicted_from, Some(Reg::WORK1));
        assert_eq!(buf.len_words(), 2);
    }

    #[test]
    fn raw_reg_to_flags_clobbers_before_msr() {
        let mut buf = CodeBuffer::new();
        let mut fe = NullFrontEnd;
        raw_reg_to_flags(&mut buf, &mut fe, Reg::WORK1);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn ccr_and_x_flag_loads_use_distinct_offsets() {
        let mut buf = CodeBuffer::new();
        let layout = RegBlockLayout::standard();
        raw_load_flagreg(&mut buf, &layout, Reg::R0);
        raw_load_flagx(&mut buf, &layout, Reg::R0);
        assert_ne!(buf.words()[0] & 0xFFF, buf.words()[1] & 0xFFF);
    }
}
