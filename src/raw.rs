//! Raw integer operations (§4.2, §4.4): immediate synthesis, register/immediate arithmetic,
//! byte/half/word moves, scaled-address `lea`, bitfield merge/tag-mask, and the 68k
//! sub-word-immediate carry-polarity fixup.
//!
//! Grounded on §4.2's literal description of the three immediate-synthesis strategies and on
//! the teacher's `DataOp`-driven instruction shapes (`examples/zeramorphic-armul/armul/src/
//! instr/ty.rs`) generalized to the `encode.rs` primitives built here; the `SIGNED*_REG_2_REG`
//! sign/zero-extension helpers and the memory-immediate compare/add forms are the
//! `original_source/`-supplemented operations named in SPEC_FULL.md §4.2/§4.4.

use crate::buffer::CodeBuffer;
use crate::cond::Cond;
use crate::config::EmitterConfig;
use crate::encode::{self, DataOp};
use crate::frontend::FrontEnd;
use crate::imm::{high16, low16, RotatedConstant};
use crate::pool::LiteralPool;
use crate::reg::Reg;
use crate::shift::Shift;

/// Synthesizes `Rd = value` using the cheapest strategy available under `cfg` (§4.2):
/// a single `MOV` when `CHECK32(value)` holds, `MVN` when the bitwise complement does,
/// `MOVW`/`MOVT` when ARMv6T2 is enabled, and a literal-pool load otherwise.
pub fn mov_l_ri(buf: &mut CodeBuffer, pool: &mut LiteralPool, cfg: &EmitterConfig, dest: Reg, value: u32) {
    if RotatedConstant::check32(value) {
        encode::mov_ri(buf, Cond::AL, false, dest, value);
    } else if RotatedConstant::check32(!value) {
        encode::mvn_ri(buf, Cond::AL, false, dest, !value);
    } else if cfg.armv6t2 {
        encode::movw(buf, Cond::AL, dest, low16(value));
        if high16(value) != 0 {
            encode::movt(buf, Cond::AL, dest, high16(value));
        }
    } else {
        pool.data_long_offs(buf, Cond::AL, dest, value);
    }
}

pub fn mov_l_rr(buf: &mut CodeBuffer, dest: Reg, src: Reg) {
    encode::mov_rr(buf, Cond::AL, false, dest, src, Shift::NONE);
}

/// `ADD{S} Rd, Rn, Rm`. Calls [`FrontEnd::clobber_flags`] first iff `set_flags`.
pub fn add_l_rr<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, set_flags: bool, dest: Reg, rn: Reg, rm: Reg) {
    if set_flags {
        front_end.clobber_flags();
    }
    encode::dp_rr(buf, Cond::AL, DataOp::Add, set_flags, dest, rn, rm, Shift::NONE);
}

/// `SUB{S} Rd, Rn, Rm`.
pub fn sub_l_rr<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, set_flags: bool, dest: Reg, rn: Reg, rm: Reg) {
    if set_flags {
        front_end.clobber_flags();
    }
    encode::dp_rr(buf, Cond::AL, DataOp::Sub, set_flags, dest, rn, rm, Shift::NONE);
}

/// `ADD{S} Rd, Rn, #value` when `value` is `CHECK32`-representable; otherwise synthesizes
/// `value` into a scratch register first (§4.2's fallback path applied to arithmetic, not
/// just `mov`).
pub fn add_l_ri<F: FrontEnd>(
    buf: &mut CodeBuffer,
    pool: &mut LiteralPool,
    cfg: &EmitterConfig,
    front_end: &mut F,
    set_flags: bool,
    dest: Reg,
    rn: Reg,
    value: u32,
) {
    if set_flags {
        front_end.clobber_flags();
    }
    if RotatedConstant::check32(value) {
        encode::dp_ri(buf, Cond::AL, DataOp::Add, set_flags, dest, rn, value);
    } else {
        mov_l_ri(buf, pool, cfg, Reg::WORK1, value);
        encode::dp_rr(buf, Cond::AL, DataOp::Add, set_flags, dest, rn, Reg::WORK1, Shift::NONE);
    }
}

pub fn sub_l_ri<F: FrontEnd>(
    buf: &mut CodeBuffer,
    pool: &mut LiteralPool,
    cfg: &EmitterConfig,
    front_end: &mut F,
    set_flags: bool,
    dest: Reg,
    rn: Reg,
    value: u32,
) {
    if set_flags {
        front_end.clobber_flags();
    }
    if RotatedConstant::check32(value) {
        encode::dp_ri(buf, Cond::AL, DataOp::Sub, set_flags, dest, rn, value);
    } else {
        mov_l_ri(buf, pool, cfg, Reg::WORK1, value);
        encode::dp_rr(buf, Cond::AL, DataOp::Sub, set_flags, dest, rn, Reg::WORK1, Shift::NONE);
    }
}

/// The C flag's position in CPSR.
const CPSR_C_BIT: u32 = 1 << 29;

/// `sub_w_mi` (§4.2): subtracting an immediate from a 16-bit guest word. A `SUBS` at the
/// top of the word (after `LSL #16`) produces an ARM carry whose polarity is the *inverse*
/// of the 68k borrow it must feed, so after repacking the result with `PKHTB` the carry is
/// explicitly inverted via `MRS`/`EOR #C`/`MSR` before the caller reads it.
pub fn sub_w_mi<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, dest: Reg, src: Reg, value: u16) {
    front_end.clobber_flags();
    encode::dp_rr(
        buf,
        Cond::AL,
        DataOp::Mov,
        false,
        Reg::WORK1,
        Reg::R0,
        src,
        Shift::lsl(16),
    );
    let rotated = RotatedConstant::encode((value as u32) << 16)
        .unwrap_or_else(|| crate::error::abort(format!("{value:#x} << 16 is not CHECK32-representable")));
    encode::dp_ri(buf, Cond::AL, DataOp::Sub, true, Reg::WORK1, Reg::WORK1, rotated.value().0);
    encode::pkhtb(buf, Cond::AL, dest, src, Reg::WORK1, 16);
    encode::mrs(buf, Cond::AL, Reg::WORK2);
    encode::dp_ri(buf, Cond::AL, DataOp::Eor, false, Reg::WORK2, Reg::WORK2, CPSR_C_BIT);
    encode::msr_reg_flags(buf, Cond::AL, Reg::WORK2);
}

/// `cmp_l_mi` (supplemental, §4.4): `LDR Rwork, [Rn, #offset]` then `CMP Rwork, #value`.
pub fn cmp_l_mi<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, base: Reg, offset: i32, value: u32) {
    front_end.clobber_flags();
    encode::ldr_imm(buf, Cond::AL, Reg::WORK1, base, offset, false);
    encode::dp_ri(buf, Cond::AL, DataOp::Cmp, true, Reg::R0, Reg::WORK1, value);
}

/// `add_l_mi` (supplemental, §4.4): `LDR Rwork, [Rn, #offset]`, `ADD Rwork, Rwork, #value`,
/// `STR Rwork, [Rn, #offset]` — an in-place memory add.
pub fn add_l_mi<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, set_flags: bool, base: Reg, offset: i32, value: u32) {
    if set_flags {
        front_end.clobber_flags();
    }
    encode::ldr_imm(buf, Cond::AL, Reg::WORK1, base, offset, false);
    encode::dp_ri(buf, Cond::AL, DataOp::Add, set_flags, Reg::WORK1, Reg::WORK1, value);
    encode::str_imm(buf, Cond::AL, Reg::WORK1, base, offset, false);
}

/// `lea` with a scale factor of 1, 2, 4, or 8: `Rd = Rbase + Rindex * scale`.
/// Panics (programmer error) on any other scale.
pub fn lea_scaled(buf: &mut CodeBuffer, dest: Reg, base: Reg, index: Reg, scale: u8) {
    let shift_amount = match scale {
        1 => 0,
        2 => 1,
        4 => 2,
        8 => 3,
        other => crate::error::abort(format!("unsupported lea scale factor {other}")),
    };
    encode::dp_rr(buf, Cond::AL, DataOp::Add, false, dest, base, index, Shift::lsl(shift_amount));
}

/// `merge` (§4.4): packs the bottom half of `lo` with the bottom half of `hi` shifted to
/// the top, via `PKHBT`. Used to recombine a 68k word write into a 32-bit register without
/// disturbing the untouched half.
pub fn merge(buf: &mut CodeBuffer, dest: Reg, lo: Reg, hi: Reg) {
    encode::pkhbt(buf, Cond::AL, dest, lo, hi, 16);
}

/// `tag_mask` (§4.4): clears the bottom `width` bits of `dest`, via `BFC` (ARMv6T2) or a
/// double `BIC` with two rotated-immediate masks otherwise.
pub fn tag_mask(buf: &mut CodeBuffer, cfg: &EmitterConfig, dest: Reg, width: u32) {
    if cfg.armv6t2 {
        encode::bfc(buf, Cond::AL, dest, 0, width);
    } else {
        let mask = !0u32 << width;
        if let Some(rotated) = RotatedConstant::encode(mask) {
            encode::dp_ri(buf, Cond::AL, DataOp::And, false, dest, dest, rotated.value().0);
        } else {
            // Two BICs with the complementary halves of the low `width` bits.
            let clear_lo = (1u32 << (width / 2)) - 1;
            let clear_hi = ((1u32 << width) - 1) & !clear_lo;
            encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, dest, dest, clear_lo);
            encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, dest, dest, clear_hi);
        }
    }
}

/// `TST Rn, Rm` / `CMP Rn, Rm` (§4.4's compare/test forms).
pub fn test_rr<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, rn: Reg, rm: Reg) {
    front_end.clobber_flags();
    encode::dp_rr(buf, Cond::AL, DataOp::Tst, true, Reg::R0, rn, rm, Shift::NONE);
}

pub fn cmp_rr<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, rn: Reg, rm: Reg) {
    front_end.clobber_flags();
    encode::dp_rr(buf, Cond::AL, DataOp::Cmp, true, Reg::R0, rn, rm, Shift::NONE);
}

/// `SIGNED8_REG_2_REG` / `UNSIGNED8_REG_2_REG` / `SIGNED16_REG_2_REG` / `UNSIGNED16_REG_2_REG`
/// (supplemental, §4.2): sign- or zero-extends the bottom byte/halfword of `src` into `dest`.
pub fn signed8_reg_2_reg(buf: &mut CodeBuffer, dest: Reg, src: Reg) {
    encode::sxtb(buf, Cond::AL, dest, src);
}
pub fn unsigned8_reg_2_reg(buf: &mut CodeBuffer, dest: Reg, src: Reg) {
    encode::uxtb(buf, Cond::AL, dest, src);
}
pub fn signed16_reg_2_reg(buf: &mut CodeBuffer, dest: Reg, src: Reg) {
    encode::sxth(buf, Cond::AL, dest, src);
}
pub fn unsigned16_reg_2_reg(buf: &mut CodeBuffer, dest: Reg, src: Reg) {
    encode::uxth(buf, Cond::AL, dest, src);
}

/// `mov_b_rr` (§4.4): copies `src`'s low byte into `dest`'s low byte, leaving the rest of
/// `dest` untouched. A single `BFI` under ARMv6T2; otherwise an isolate-then-mask-then-OR
/// sequence through [`Reg::WORK1`].
pub fn mov_b_rr(buf: &mut CodeBuffer, cfg: &EmitterConfig, dest: Reg, src: Reg) {
    if cfg.armv6t2 {
        encode::bfi(buf, Cond::AL, dest, src, 0, 8);
    } else {
        encode::uxtb(buf, Cond::AL, Reg::WORK1, src);
        tag_mask(buf, cfg, dest, 8);
        encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, dest, dest, Reg::WORK1, Shift::NONE);
    }
}

/// `mov_w_rr` (§4.4): the halfword form of [`mov_b_rr`].
pub fn mov_w_rr(buf: &mut CodeBuffer, cfg: &EmitterConfig, dest: Reg, src: Reg) {
    if cfg.armv6t2 {
        encode::bfi(buf, Cond::AL, dest, src, 0, 16);
    } else {
        encode::uxth(buf, Cond::AL, Reg::WORK1, src);
        tag_mask(buf, cfg, dest, 16);
        encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, dest, dest, Reg::WORK1, Shift::NONE);
    }
}

/// `mov_w_mi` (§4.4): writes a 16-bit immediate into `dest`'s bottom halfword via
/// [`Reg::WORK1`] and `PKHBT`, preserving `dest`'s top halfword.
pub fn mov_w_mi(buf: &mut CodeBuffer, pool: &mut LiteralPool, cfg: &EmitterConfig, dest: Reg, value: u16) {
    mov_l_ri(buf, pool, cfg, Reg::WORK1, value as u32);
    encode::pkhbt(buf, Cond::AL, dest, Reg::WORK1, dest, 0);
}

/// `mov_b_mi` (§4.4): byte-immediate moves clear the low byte via `BIC #0xff` and `ORR` the
/// new byte in, skipping the `ORR` entirely when the new byte is zero.
pub fn mov_b_mi(buf: &mut CodeBuffer, dest: Reg, value: u8) {
    encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, dest, dest, 0xFF);
    if value != 0 {
        encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, dest, dest, value as u32);
    }
}

/// `raw_emit_nop_filler(bytes)` (supplemental, §4.4): pads the buffer with `MOV R0, R0`
/// no-ops. `bytes` must be a multiple of 4.
pub fn raw_emit_nop_filler(buf: &mut CodeBuffer, bytes: usize) {
    assert_eq!(bytes % 4, 0, "nop filler length must be word-aligned");
    for _ in 0..(bytes / 4) {
        encode::mov_rr(buf, Cond::AL, false, Reg::R0, Reg::R0, Shift::NONE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::NullFrontEnd;

    #[test]
    fn mov_l_ri_prefers_a_single_mov_when_possible() {
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(false);
        mov_l_ri(&mut buf, &mut pool, &cfg, Reg::R0, 0x12);
        assert_eq!(buf.len_words(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn mov_l_ri_uses_movw_movt_under_armv6t2() {
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(true);
        mov_l_ri(&mut buf, &mut pool, &cfg, Reg::R0, 0x1234_5678);
        assert_eq!(buf.len_words(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn mov_l_ri_falls_back_to_the_literal_pool_without_armv6t2() {
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(false);
        mov_l_ri(&mut buf, &mut pool, &cfg, Reg::R0, 0x1234_5678);
        assert!(!pool.is_empty());
    }

    #[test]
    fn add_l_ri_clobbers_flags_only_when_s_suffixed() {
        struct Counter(u32);
        impl FrontEnd for Counter {
            fn clobber_flags(&mut self) {
                self.0 += 1;
            }
            fn mirror_flag_eviction(&mut self, _held_in: Reg) {}
        }
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(false);
        let mut counter = Counter(0);
        add_l_ri(&mut buf, &mut pool, &cfg, &mut counter, false, Reg::R0, Reg::R0, 1);
        assert_eq!(counter.0, 0);
        add_l_ri(&mut buf, &mut pool, &cfg, &mut counter, true, Reg::R0, Reg::R0, 1);
        assert_eq!(counter.0, 1);
    }

    #[test]
    fn lea_scaled_rejects_unsupported_scale() {
        let mut buf = CodeBuffer::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            lea_scaled(&mut buf, Reg::R0, Reg::R1, Reg::R2, 3);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn tag_mask_uses_bfc_under_armv6t2() {
        let mut buf = CodeBuffer::new();
        let cfg = EmitterConfig::new(true);
        tag_mask(&mut buf, &cfg, Reg::R0, 8);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn nop_filler_emits_one_word_per_four_bytes() {
        let mut buf = CodeBuffer::new();
        raw_emit_nop_filler(&mut buf, 12);
        assert_eq!(buf.len_words(), 3);
    }

    #[test]
    fn test_rr_and_cmp_rr_both_clobber_flags() {
        let mut buf = CodeBuffer::new();
        let mut fe = NullFrontEnd;
        test_rr(&mut buf, &mut fe, Reg::R0, Reg::R1);
        cmp_rr(&mut buf, &mut fe, Reg::R0, Reg::R1);
        assert_eq!(buf.len_words(), 2);
    }

    #[test]
    fn sub_w_mi_inverts_carry_after_repacking() {
        let mut buf = CodeBuffer::new();
        let mut fe = NullFrontEnd;
        sub_w_mi(&mut buf, &mut fe, Reg::R0, Reg::R1, 1);
        // MOV, SUBS, PKHTB, MRS, EOR, MSR.
        assert_eq!(buf.len_words(), 6);
        let eor = buf.words()[4];
        assert_eq!((eor >> 21) & 0xF, DataOp::Eor as u32);
    }

    #[test]
    fn mov_b_rr_uses_a_single_bfi_under_armv6t2() {
        let mut buf = CodeBuffer::new();
        let cfg = EmitterConfig::new(true);
        mov_b_rr(&mut buf, &cfg, Reg::R0, Reg::R1);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn mov_b_rr_falls_back_without_armv6t2() {
        let mut buf = CodeBuffer::new();
        let cfg = EmitterConfig::new(false);
        mov_b_rr(&mut buf, &cfg, Reg::R0, Reg::R1);
        assert_eq!(buf.len_words(), 3);
    }

    #[test]
    fn mov_w_rr_uses_a_single_bfi_under_armv6t2() {
        let mut buf = CodeBuffer::new();
        let cfg = EmitterConfig::new(true);
        mov_w_rr(&mut buf, &cfg, Reg::R0, Reg::R1);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn mov_w_mi_loads_the_halfword_then_packs_it_in() {
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(false);
        mov_w_mi(&mut buf, &mut pool, &cfg, Reg::R0, 0x1234);
        assert_eq!(buf.len_words(), 2);
    }

    #[test]
    fn mov_b_mi_skips_the_orr_for_a_zero_byte() {
        let mut buf = CodeBuffer::new();
        mov_b_mi(&mut buf, Reg::R0, 0);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn mov_b_mi_clears_then_ors_a_nonzero_byte() {
        let mut buf = CodeBuffer::new();
        mov_b_mi(&mut buf, Reg::R0, 0x42);
        assert_eq!(buf.len_words(), 2);
        assert_eq!(buf.words()[1] & 0xFF, 0x42);
    }
}
