//! The FPU/VFP layer (§4.8, §4.9): scalar double-precision arithmetic, integer/single
//! conversions, immediate constants, the `frem1`/`fmod` remainder forms, the `ffunc`/`fpowx`
//! host-math trampolines, the 80-bit extended round-trip, and the FPU `Scc` form.
//!
//! Grounded on §4.8's operation list and the teacher's condition/flag-bridge idioms carried
//! over from `cond.rs`/`flags.rs`; VFP has no analogue in the teacher (`armul` never emits
//! floating point), so the instruction sequences here follow §4.8/§4.9's literal descriptions
//! directly, composed from the primitives in `encode.rs`.

use crate::buffer::CodeBuffer;
use crate::cond::{Cond, FpCond};
use crate::config::{EmitterConfig, FFunc, MathFnResolution, MathLibrary};
use crate::control;
use crate::encode::{self, DataOp};
use crate::frontend::FrontEnd;
use crate::pool::LiteralPool;
use crate::raw;
use crate::reg::{DReg, Reg};

/// The four VFP rounding modes, matching FPSCR's `RMode` field (bits 23:22).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RoundingMode {
    Nearest = 0,
    TowardPlusInfinity = 1,
    TowardMinusInfinity = 2,
    TowardZero = 3,
}

/// A scratch single-precision register reserved for conversions that must stage an
/// integer through the single bank before `VCVT` can see it (§4.8). Never assigned a
/// live guest value, matching the role `Reg::WORK1`..`WORK3` play for the core bank.
const SCRATCH_SINGLE: DReg = DReg(0);

pub fn fmov_rr(buf: &mut CodeBuffer, dd: DReg, dm: DReg) {
    encode::vmov_f64_rr(buf, Cond::AL, dd, dm);
}
pub fn fabs_rr(buf: &mut CodeBuffer, dd: DReg, dm: DReg) {
    encode::vabs_f64(buf, Cond::AL, dd, dm);
}
pub fn fneg_rr(buf: &mut CodeBuffer, dd: DReg, dm: DReg) {
    encode::vneg_f64(buf, Cond::AL, dd, dm);
}
pub fn fsqrt_rr(buf: &mut CodeBuffer, dd: DReg, dm: DReg) {
    encode::vsqrt_f64(buf, Cond::AL, dd, dm);
}
pub fn fadd_rrr(buf: &mut CodeBuffer, dd: DReg, dn: DReg, dm: DReg) {
    encode::vadd_f64(buf, Cond::AL, dd, dn, dm);
}
pub fn fsub_rrr(buf: &mut CodeBuffer, dd: DReg, dn: DReg, dm: DReg) {
    encode::vsub_f64(buf, Cond::AL, dd, dn, dm);
}
pub fn fmul_rrr(buf: &mut CodeBuffer, dd: DReg, dn: DReg, dm: DReg) {
    encode::vmul_f64(buf, Cond::AL, dd, dn, dm);
}
pub fn fdiv_rrr(buf: &mut CodeBuffer, dd: DReg, dn: DReg, dm: DReg) {
    encode::vdiv_f64(buf, Cond::AL, dd, dn, dm);
}

/// `VCMP.F64` + `VMRS APSR_nzcv, FPSCR`, ready for [`control::branch_fp_cc`] to test.
pub fn fcmp_rr(buf: &mut CodeBuffer, dd: DReg, dm: DReg) {
    encode::vcmp_f64(buf, Cond::AL, dd, dm);
    encode::vmrs(buf, Cond::AL, Reg::PC);
}

/// Converts the 32-bit signed integer in `src` to double precision in `dd`.
pub fn int_to_double(buf: &mut CodeBuffer, dd: DReg, src: Reg) {
    encode::vmov_to_single(buf, Cond::AL, SCRATCH_SINGLE, src);
    encode::vcvt_f64_s32(buf, Cond::AL, dd, SCRATCH_SINGLE);
}

/// Converts `dm` to a 32-bit signed integer in `dest`, rounding to nearest and then
/// saturating to the 32-bit range (§4.8: "with SSAT saturation" — `VCVTR` already
/// saturates out-of-range values to `i32::MIN`/`MAX`, and the explicit `SSAT` is kept as
/// a second, redundant guard matching the literal instruction sequence described there).
pub fn double_to_int_saturating(buf: &mut CodeBuffer, dest: Reg, dm: DReg) {
    encode::vcvtr_s32_f64(buf, Cond::AL, SCRATCH_SINGLE, dm);
    encode::vmov_from_single(buf, Cond::AL, dest, SCRATCH_SINGLE);
    encode::ssat(buf, Cond::AL, dest, 32, dest);
}

/// `raw_fmov_to_b_rr` (§4.8): converts `dm` to the nearest integer and narrows it to a
/// signed byte via `SSAT #8`, matching 68k `FMOVE.B`'s truncated-width destination.
pub fn double_to_byte_saturating(buf: &mut CodeBuffer, dest: Reg, dm: DReg) {
    encode::vcvtr_s32_f64(buf, Cond::AL, SCRATCH_SINGLE, dm);
    encode::vmov_from_single(buf, Cond::AL, dest, SCRATCH_SINGLE);
    encode::ssat(buf, Cond::AL, dest, 8, dest);
}

/// `raw_fmov_to_w_rr` (§4.8): the halfword-sized sibling of
/// [`double_to_byte_saturating`], narrowing via `SSAT #16`.
pub fn double_to_word_saturating(buf: &mut CodeBuffer, dest: Reg, dm: DReg) {
    encode::vcvtr_s32_f64(buf, Cond::AL, SCRATCH_SINGLE, dm);
    encode::vmov_from_single(buf, Cond::AL, dest, SCRATCH_SINGLE);
    encode::ssat(buf, Cond::AL, dest, 16, dest);
}

pub fn single_to_double(buf: &mut CodeBuffer, dd: DReg, sm: DReg) {
    encode::vcvt_f64_f32(buf, Cond::AL, dd, sm);
}
pub fn double_to_single(buf: &mut CodeBuffer, sd: DReg, dm: DReg) {
    encode::vcvt_f32_f64(buf, Cond::AL, sd, dm);
}

/// The FPU immediate constants named in §4.8: `#0.0`, `#1.0`, `#10.0`, `#100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpImmediate {
    Zero,
    One,
    Ten,
    Hundred,
}

impl FpImmediate {
    fn bits(self) -> u64 {
        match self {
            FpImmediate::Zero => 0.0f64.to_bits(),
            FpImmediate::One => 1.0f64.to_bits(),
            FpImmediate::Ten => 10.0f64.to_bits(),
            FpImmediate::Hundred => 100.0f64.to_bits(),
        }
    }
}

/// Materializes an [`FpImmediate`] into `dd`. Rather than relying on VFP's narrow 8-bit
/// immediate encoding (which cannot express `100.0` at all, and round-trips `0.0` only
/// through a separate NEON-immediate instruction this crate does not otherwise need),
/// every constant here is synthesized the same way: its IEEE-754 bit pattern split across
/// two scratch core registers and joined with `VMOV Dd, Rlo, Rhi`. One mechanism, no
/// special-cased encoding paths per constant.
pub fn fmov_imm(buf: &mut CodeBuffer, pool: &mut LiteralPool, cfg: &EmitterConfig, dd: DReg, constant: FpImmediate) {
    let bits = constant.bits();
    raw::mov_l_ri(buf, pool, cfg, Reg::WORK1, bits as u32);
    raw::mov_l_ri(buf, pool, cfg, Reg::WORK2, (bits >> 32) as u32);
    encode::vmov_to_double(buf, Cond::AL, dd, Reg::WORK1, Reg::WORK2);
}

/// `frem1` (§4.8, §9's Design Note): IEEE remainder, rounding the intermediate quotient
/// per `mode` rather than always truncating. Brackets the operation in a saved/restored
/// FPSCR rounding-mode pair, restoring *exactly* bits 23:22 on the way out so any
/// exception flags the division itself raised are left for the caller to observe.
pub fn frem1<F: FrontEnd>(
    buf: &mut CodeBuffer,
    front_end: &mut F,
    dd_result: DReg,
    dividend: DReg,
    divisor: DReg,
    mode: RoundingMode,
    scratch1: DReg,
    scratch2: DReg,
) {
    front_end.clobber_flags();
    encode::vmrs(buf, Cond::AL, Reg::WORK1); // WORK1 = original FPSCR
    encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, Reg::WORK2, Reg::WORK1, 0b11 << 22);
    encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, Reg::WORK2, Reg::WORK2, (mode as u32) << 22);
    encode::vmsr(buf, Cond::AL, Reg::WORK2);

    encode::vdiv_f64(buf, Cond::AL, scratch1, dividend, divisor);
    encode::vcvtr_s32_f64(buf, Cond::AL, SCRATCH_SINGLE, scratch1);
    encode::vcvt_f64_s32(buf, Cond::AL, scratch2, SCRATCH_SINGLE);
    encode::vmul_f64(buf, Cond::AL, scratch2, scratch2, divisor);
    encode::vsub_f64(buf, Cond::AL, dd_result, dividend, scratch2);

    // Restore exactly bits 23:22 of FPSCR, keeping whatever exception flags the
    // division set in the rest of the register.
    encode::vmrs(buf, Cond::AL, Reg::WORK3);
    encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, Reg::WORK3, Reg::WORK3, 0b11 << 22);
    encode::dp_ri(buf, Cond::AL, DataOp::And, false, Reg::WORK1, Reg::WORK1, 0b11 << 22);
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::WORK3, Reg::WORK3, Reg::WORK1, crate::shift::Shift::NONE);
    encode::vmsr(buf, Cond::AL, Reg::WORK3);
}

/// `fmod` (§4.8): truncating remainder, no FPSCR read or write.
pub fn fmod1(buf: &mut CodeBuffer, dd_result: DReg, dividend: DReg, divisor: DReg, scratch1: DReg, scratch2: DReg) {
    encode::vdiv_f64(buf, Cond::AL, scratch1, dividend, divisor);
    encode::vcvt_s32_f64(buf, Cond::AL, SCRATCH_SINGLE, scratch1);
    encode::vcvt_f64_s32(buf, Cond::AL, scratch2, SCRATCH_SINGLE);
    encode::vmul_f64(buf, Cond::AL, scratch2, scratch2, divisor);
    encode::vsub_f64(buf, Cond::AL, dd_result, dividend, scratch2);
}

/// `raw_roundingmode` (§4.8): clears FPSCR[23:22] and ORs in `mode`'s two-bit field,
/// using `scratch` to stage the read-modify-write.
pub fn raw_roundingmode(buf: &mut CodeBuffer, scratch: Reg, mode: RoundingMode) {
    encode::vmrs(buf, Cond::AL, scratch);
    encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, scratch, scratch, 0b11 << 22);
    encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, scratch, scratch, (mode as u32) << 22);
    encode::vmsr(buf, Cond::AL, scratch);
}

/// `ffunc` (§4.8): the host-math trampoline for every unary transcendental. Moves the
/// argument into `D0` if it isn't already there (the EABI-VFP convention this emitter
/// targets), materializes the resolved function pointer, and calls it with `BLX`. The
/// emitter knows only this calling convention, never the transcendental itself.
pub fn raw_ffunc_rr(
    buf: &mut CodeBuffer,
    pool: &mut LiteralPool,
    cfg: &EmitterConfig,
    lib: &dyn MathLibrary,
    func: FFunc,
    dd_result: DReg,
    dd_arg: DReg,
) {
    if dd_arg != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, DReg::D0, dd_arg);
    }
    match lib.resolve(func) {
        MathFnResolution::Unary(f) => {
            raw::mov_l_ri(buf, pool, cfg, Reg::WORK1, f as usize as u32);
            encode::blx_reg(buf, Cond::AL, Reg::WORK1);
            if dd_result != DReg::D0 {
                encode::vmov_f64_rr(buf, Cond::AL, dd_result, DReg::D0);
            }
        }
        MathFnResolution::Pair(_, _) => {
            crate::error::abort(format!("{func:?} resolves to a function pair; use raw_fsincos_rr"))
        }
    }
}

/// `SinCos`'s two-output form of [`raw_ffunc_rr`].
pub fn raw_fsincos_rr(
    buf: &mut CodeBuffer,
    pool: &mut LiteralPool,
    cfg: &EmitterConfig,
    lib: &dyn MathLibrary,
    dd_sin: DReg,
    dd_cos: DReg,
    dd_arg: DReg,
) {
    let MathFnResolution::Pair(sin_fn, cos_fn) = lib.resolve(FFunc::SinCos) else {
        crate::error::abort("FFunc::SinCos must resolve to a function pair")
    };
    if dd_arg != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, DReg::D0, dd_arg);
    }
    raw::mov_l_ri(buf, pool, cfg, Reg::WORK1, sin_fn as usize as u32);
    encode::blx_reg(buf, Cond::AL, Reg::WORK1);
    if dd_sin != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, dd_sin, DReg::D0);
    }
    if dd_arg != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, DReg::D0, dd_arg);
    }
    raw::mov_l_ri(buf, pool, cfg, Reg::WORK1, cos_fn as usize as u32);
    encode::blx_reg(buf, Cond::AL, Reg::WORK1);
    if dd_cos != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, dd_cos, DReg::D0);
    }
}

/// `fpowx` (§4.8): `base * 2^exponent`, via `MathLibrary::powx`. `D0`/`D1` in, `D0` out.
pub fn raw_fpowx_rr(
    buf: &mut CodeBuffer,
    pool: &mut LiteralPool,
    cfg: &EmitterConfig,
    lib: &dyn MathLibrary,
    dd_result: DReg,
    dd_base: DReg,
    dd_exponent: DReg,
) {
    if dd_base != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, DReg::D0, dd_base);
    }
    if dd_exponent != DReg::D1 {
        encode::vmov_f64_rr(buf, Cond::AL, DReg::D1, dd_exponent);
    }
    raw::mov_l_ri(buf, pool, cfg, Reg::WORK1, lib.powx() as usize as u32);
    encode::blx_reg(buf, Cond::AL, Reg::WORK1);
    if dd_result != DReg::D0 {
        encode::vmov_f64_rr(buf, Cond::AL, dd_result, DReg::D0);
    }
}

/// The rebias between an 80-bit extended exponent (16383) and a double's (1023).
const EXTENDED_TO_DOUBLE_BIAS_SHIFT: i64 = 15360;

/// `raw_fp_from_exten_mr` (§4.8): loads a 96-bit (80-bit + 16 pad bits) 68k extended value
/// from `[base, #offset]` and narrows it to a double in `dd_result`. Uses
/// [`control::compemu_raw_jcc_l_oponly`]/`patch_branch_target` (symbolic, buffer-measured
/// skip counts) rather than a hardcoded instruction-count skip, per §9's Design Note.
pub fn raw_fp_from_exten_mr<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, dd_result: DReg, base: Reg, offset: i32) {
    front_end.clobber_flags();
    // Word 0: [sign:1][exponent:15][pad:16]; word 1: mantissa[63:32]; word 2: mantissa[31:0].
    encode::ldr_imm(buf, Cond::AL, Reg::WORK1, base, offset, false);
    encode::ldr_imm(buf, Cond::AL, Reg::WORK2, base, offset + 4, false);
    encode::ldr_imm(buf, Cond::AL, Reg::WORK3, base, offset + 8, false);
    encode::rev(buf, Cond::AL, Reg::WORK1, Reg::WORK1);
    encode::rev(buf, Cond::AL, Reg::WORK2, Reg::WORK2);
    encode::rev(buf, Cond::AL, Reg::WORK3, Reg::WORK3);

    // sign:exponent now sit in WORK1's top 16 bits after the REV. Isolate them.
    encode::dp_rr(buf, Cond::AL, DataOp::Mov, false, Reg::WORK1, Reg::R0, Reg::WORK1, crate::shift::Shift::lsl(16));
    encode::ubfx(buf, Cond::AL, Reg::R0, Reg::WORK1, 31 - 15, 16);

    // Branch around the rebias when the exponent field is entirely zero (68k's encoding
    // of +/-0.0 and subnormals, which this emitter flushes to zero rather than
    // reproducing subnormal extended semantics exactly).
    encode::dp_ri(buf, Cond::AL, DataOp::Tst, true, Reg::R0, Reg::R0, 0x7FFF);
    let skip_site = control::compemu_raw_jcc_l_oponly(buf, Cond::EQ);
    encode::dp_ri(buf, Cond::AL, DataOp::Sub, false, Reg::R0, Reg::R0, EXTENDED_TO_DOUBLE_BIAS_SHIFT as u32 & 0x7FF);
    let after_rebias = buf.cursor();
    control::patch_branch_target(buf, skip_site, Cond::EQ, after_rebias);

    // Pack double bit-pattern: sign(1) | exponent(11) | mantissa-high(20) in the top word,
    // mantissa-low(32) in the bottom word. The 64-bit extended mantissa's top 52 bits
    // become the double's mantissa (its implicit leading 1 already present in bit 63).
    encode::dp_ri(buf, Cond::AL, DataOp::And, false, Reg::WORK1, Reg::WORK1, 1 << 31);
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::WORK1, Reg::WORK1, Reg::R0, crate::shift::Shift::lsl(20));
    encode::dp_rr(buf, Cond::AL, DataOp::Mov, false, Reg::R0, Reg::R0, Reg::WORK2, crate::shift::Shift::lsl(31));
    encode::ubfx(buf, Cond::AL, Reg::WORK2, Reg::WORK2, 1, 20);
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::WORK1, Reg::WORK1, Reg::WORK2, crate::shift::Shift::NONE);
    encode::dp_rr(buf, Cond::AL, DataOp::Mov, false, Reg::WORK3, Reg::R0, Reg::WORK3, crate::shift::Shift::lsl(1));
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::WORK3, Reg::WORK3, Reg::R0, crate::shift::Shift::NONE);
    encode::vmov_to_double(buf, Cond::AL, dd_result, Reg::WORK3, Reg::WORK1);
}

/// `raw_fp_to_exten_rm` (§4.8): the inverse of [`raw_fp_from_exten_mr`] — widens a double
/// in `dd_value` to 96-bit extended form and stores it at `[base, #offset]`.
pub fn raw_fp_to_exten_rm<F: FrontEnd>(buf: &mut CodeBuffer, front_end: &mut F, dd_value: DReg, base: Reg, offset: i32) {
    front_end.clobber_flags();
    encode::vmov_from_double(buf, Cond::AL, Reg::WORK3, Reg::WORK1, dd_value);
    // WORK1 = double's top word (sign:1 exponent:11 mantissa-hi:20), WORK3 = bottom word.
    encode::ubfx(buf, Cond::AL, Reg::WORK2, Reg::WORK1, 20, 11);
    let zero_check = buf.cursor();
    encode::dp_ri(buf, Cond::AL, DataOp::Tst, true, Reg::R0, Reg::WORK2, 0x7FF);
    let skip_site = control::compemu_raw_jcc_l_oponly(buf, Cond::EQ);
    encode::dp_ri(
        buf,
        Cond::AL,
        DataOp::Add,
        false,
        Reg::WORK2,
        Reg::WORK2,
        EXTENDED_TO_DOUBLE_BIAS_SHIFT as u32 & 0x7FF,
    );
    let after_rebias = buf.cursor();
    control::patch_branch_target(buf, skip_site, Cond::EQ, after_rebias);
    debug_assert!(buf.words_between(zero_check, after_rebias) >= 2);

    encode::dp_ri(buf, Cond::AL, DataOp::And, false, Reg::R0, Reg::WORK1, 1 << 31);
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::R0, Reg::R0, Reg::WORK2, crate::shift::Shift::lsl(16));
    encode::rev(buf, Cond::AL, Reg::R0, Reg::R0);
    encode::str_imm(buf, Cond::AL, Reg::R0, base, offset, false);

    encode::dp_ri(buf, Cond::AL, DataOp::Mov, false, Reg::R0, Reg::R0, 0);
    encode::dp_rr(buf, Cond::AL, DataOp::Orr, false, Reg::R0, Reg::R0, Reg::WORK1, crate::shift::Shift::lsl(11));
    encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, Reg::R0, Reg::R0, 1 << 31);
    encode::rev(buf, Cond::AL, Reg::R0, Reg::R0);
    encode::str_imm(buf, Cond::AL, Reg::R0, base, offset + 4, false);

    encode::dp_rr(buf, Cond::AL, DataOp::Mov, false, Reg::R0, Reg::R0, Reg::WORK3, crate::shift::Shift::lsl(11));
    encode::rev(buf, Cond::AL, Reg::R0, Reg::R0);
    encode::str_imm(buf, Cond::AL, Reg::R0, base, offset + 8, false);
}

/// `raw_fp_fscc_ri` (§4.9): the FPU analogue of integer `Scc` — sets `dest`'s low byte to
/// `0xFF` or `0x00` based on whether `fp_cond` held at the most recent `fcmp_rr`, matching
/// 68k `FScc`'s byte-sized destination. Unconditionally clears the byte first.
///
/// `OR`/`UN` are defined purely by the `V` flag, so a single predicated `ORR` is the whole
/// story. Every other predicate needs the same `BVS`/`BVC`-guarded shape as
/// [`control::branch_fp_cc`] (mirrored here as an `ORR` that does or doesn't execute,
/// rather than a branch that does or doesn't fire), since no single ARM condition captures
/// "native condition, but not on NaN" or "native condition, or on NaN".
pub fn raw_fp_fscc_ri(buf: &mut CodeBuffer, dest: Reg, fp_cond: FpCond) {
    encode::dp_ri(buf, Cond::AL, DataOp::Bic, false, dest, dest, 0xFF);
    match fp_cond {
        FpCond::NEVER => {}
        FpCond::OGT => ordered_fscc(buf, dest, Cond::GT),
        FpCond::OGE => ordered_fscc(buf, dest, Cond::GE),
        FpCond::OLT => ordered_fscc(buf, dest, Cond::MI),
        FpCond::OLE => ordered_fscc(buf, dest, Cond::LS),
        FpCond::OGL => ordered_fscc(buf, dest, Cond::NE),
        FpCond::OR => encode::dp_ri(buf, Cond::VC, DataOp::Orr, false, dest, dest, 0xFF),
        FpCond::UN => encode::dp_ri(buf, Cond::VS, DataOp::Orr, false, dest, dest, 0xFF),
        FpCond::UEQ => unordered_fscc(buf, dest, Cond::EQ),
        FpCond::UGT => unordered_fscc(buf, dest, Cond::HI),
        FpCond::UGE => unordered_fscc(buf, dest, Cond::CS),
        FpCond::ULT => unordered_fscc(buf, dest, Cond::LT),
        FpCond::ULE => unordered_fscc(buf, dest, Cond::LE),
    }
}

/// `BVS <after>; B<!native> <after>; ORR dest,dest,#0xFF`: sets the byte iff `native`
/// holds and the operand was ordered.
fn ordered_fscc(buf: &mut CodeBuffer, dest: Reg, native: Cond) {
    let vs_site = control::compemu_raw_jcc_l_oponly(buf, Cond::VS);
    let false_site = control::compemu_raw_jcc_l_oponly(buf, native.invert());
    encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, dest, dest, 0xFF);
    let after = buf.cursor();
    control::patch_branch_target(buf, vs_site, Cond::VS, after);
    control::patch_branch_target(buf, false_site, native.invert(), after);
}

/// `BVS <orr>; B<!native> <after>; ORR dest,dest,#0xFF`: sets the byte iff the operand was
/// unordered (NaN) or `native` holds.
fn unordered_fscc(buf: &mut CodeBuffer, dest: Reg, native: Cond) {
    let vs_site = control::compemu_raw_jcc_l_oponly(buf, Cond::VS);
    let false_site = control::compemu_raw_jcc_l_oponly(buf, native.invert());
    let orr_site = buf.cursor();
    encode::dp_ri(buf, Cond::AL, DataOp::Orr, false, dest, dest, 0xFF);
    control::patch_branch_target(buf, vs_site, Cond::VS, orr_site);
    let after = buf.cursor();
    control::patch_branch_target(buf, false_site, native.invert(), after);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmov_imm_materializes_the_ieee_bit_pattern() {
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(true);
        fmov_imm(&mut buf, &mut pool, &cfg, DReg::D0, FpImmediate::Hundred);
        assert!(buf.len_words() >= 3);
    }

    #[test]
    fn frem1_restores_rounding_bits_and_clobbers_flags() {
        struct Counter(u32);
        impl FrontEnd for Counter {
            fn clobber_flags(&mut self) {
                self.0 += 1;
            }
            fn mirror_flag_eviction(&mut self, _held_in: Reg) {}
        }
        let mut buf = CodeBuffer::new();
        let mut counter = Counter(0);
        frem1(
            &mut buf,
            &mut counter,
            DReg::D0,
            DReg::D1,
            DReg(2),
            RoundingMode::TowardZero,
            DReg(3),
            DReg(4),
        );
        assert_eq!(counter.0, 1);
    }

    #[test]
    fn fmod1_never_touches_fpscr() {
        let mut buf = CodeBuffer::new();
        fmod1(&mut buf, DReg::D0, DReg::D1, DReg(2), DReg(3), DReg(4));
        for word in buf.words() {
            // VMRS/VMSR both carry the 0xEx1 fixed nibble pattern at bits 27..16; none of
            // fmod1's instructions should match it.
            assert_ne!((word >> 16) & 0xFFF, 0xEF1);
            assert_ne!((word >> 16) & 0xFFF, 0xEE1);
        }
    }

    #[test]
    fn int_to_double_stages_through_the_scratch_single() {
        let mut buf = CodeBuffer::new();
        int_to_double(&mut buf, DReg::D0, Reg::R0);
        assert_eq!(buf.len_words(), 2);
    }

    #[test]
    fn raw_ffunc_rr_rejects_sincos_directly() {
        struct Lib;
        impl MathLibrary for Lib {
            fn resolve(&self, _f: FFunc) -> MathFnResolution {
                extern "C" fn sin(x: f64) -> f64 {
                    x
                }
                extern "C" fn cos(x: f64) -> f64 {
                    x
                }
                MathFnResolution::Pair(sin, cos)
            }
            fn powx(&self) -> crate::config::MathFn2 {
                extern "C" fn p(b: f64, _e: f64) -> f64 {
                    b
                }
                p
            }
        }
        let mut buf = CodeBuffer::new();
        let mut pool = LiteralPool::new();
        let cfg = EmitterConfig::new(true);
        let lib = Lib;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            raw_ffunc_rr(&mut buf, &mut pool, &cfg, &lib, FFunc::SinCos, DReg::D0, DReg::D0);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn raw_roundingmode_clears_and_ors_bits_23_22() {
        let mut buf = CodeBuffer::new();
        raw_roundingmode(&mut buf, Reg::WORK1, RoundingMode::TowardZero);
        assert_eq!(buf.len_words(), 4);
        let words = buf.words();
        // BIC immediate #(0b11 << 22) == 0xC00000.
        assert_eq!(words[1] & 0xFF, 0xC0);
        // ORR immediate #(TowardZero << 22) == 0b11 << 22 == 0xC00000 too (3 == 0b11).
        assert_eq!(words[2] & 0xFF, 0xC0);
    }

    #[test]
    fn raw_fp_fscc_ri_clears_low_byte_unconditionally() {
        let mut buf = CodeBuffer::new();
        raw_fp_fscc_ri(&mut buf, Reg::R0, FpCond::OR);
        assert_eq!(buf.len_words(), 2);
        let bic = buf.words()[0];
        assert_eq!((bic >> 28) & 0xF, Cond::AL as u32);
        assert_eq!(bic & 0xFF, 0xFF);
        let orr = buf.words()[1];
        assert_eq!((orr >> 28) & 0xF, Cond::VC as u32);
        assert_eq!(orr & 0xFF, 0xFF);
    }

    #[test]
    fn raw_fp_fscc_ri_never_emits_only_the_clear() {
        let mut buf = CodeBuffer::new();
        raw_fp_fscc_ri(&mut buf, Reg::R0, FpCond::NEVER);
        assert_eq!(buf.len_words(), 1);
    }

    #[test]
    fn raw_fp_fscc_ri_ogt_uses_the_bvs_guarded_form() {
        let mut buf = CodeBuffer::new();
        raw_fp_fscc_ri(&mut buf, Reg::R0, FpCond::OGT);
        // BIC; BVS; BLE; ORR
        assert_eq!(buf.len_words(), 4);
        assert_eq!((buf.words()[1] >> 28) as u8, Cond::VS as u8);
        assert_eq!((buf.words()[2] >> 28) as u8, Cond::LE as u8);
        assert_eq!((buf.words()[3] >> 28) as u8, Cond::AL as u8);
    }

    #[test]
    fn raw_fp_fscc_ri_ueq_sets_the_byte_on_nan() {
        let mut buf = CodeBuffer::new();
        raw_fp_fscc_ri(&mut buf, Reg::R0, FpCond::UEQ);
        assert_eq!(buf.len_words(), 4);
        assert_eq!((buf.words()[1] >> 28) as u8, Cond::VS as u8);
        // The BVS guard lands directly on the ORR, not past it.
        let vs_field = ((buf.words()[1] & 0x00FF_FFFF) as i32) << 8 >> 8;
        assert_eq!(vs_field, 1);
    }

    #[test]
    fn double_to_byte_and_word_saturating_narrow_correctly() {
        let mut buf = CodeBuffer::new();
        double_to_byte_saturating(&mut buf, Reg::R0, DReg::D0);
        assert_eq!(buf.len_words(), 3);
        let ssat = buf.words()[2];
        assert_eq!((ssat >> 16) & 0x1F, 7); // SSAT encodes sat_bits - 1

        let mut buf = CodeBuffer::new();
        double_to_word_saturating(&mut buf, Reg::R0, DReg::D0);
        let ssat = buf.words()[2];
        assert_eq!((ssat >> 16) & 0x1F, 15);
    }
}
