//! The guest (68k) register block layout and the "in-regs" addressing classification of §4.3.
//!
//! The original back-end (`examples/original_source/src/jit/codegen_arm.cpp`) addresses this
//! block through `#define`d byte offsets of a C `struct regstruct`; this module gives the same
//! layout a typed Rust home so offset arithmetic can't silently drift, while keeping the exact
//! slot indices the spec calls out (CCR at word 16, X flag at word 17, FPU registers following).

/// Number of 68k data/address registers (D0-D7, A0-A7).
pub const NUM_DATA_REGS: usize = 8;
pub const NUM_ADDR_REGS: usize = 8;
/// Number of 68k FPU registers (FP0-FP7), each a double-precision word pair.
pub const NUM_FPU_REGS: usize = 8;

/// Byte offsets into the guest register block (`regs`), matching §3's Data Model.
///
/// All offsets are word offsets (×4) unless stated otherwise; `ccr` and `x_flag` sit
/// at word indices 16 and 17 as spec'd, immediately after D0-D7/A0-A7 (16 words).
#[derive(Debug, Clone, Copy)]
pub struct RegBlockLayout {
    pub data_regs: usize,
    pub addr_regs: usize,
    pub ccr: usize,
    pub x_flag: usize,
    pub pc_p: usize,
    pub countdown: usize,
    pub natmem_offsetx: usize,
    pub fpu_regs: usize,
    /// Total size of the block in bytes, used by the in-regs classification.
    pub size_bytes: usize,
}

impl RegBlockLayout {
    /// The canonical layout described by §3: D0-D7 then A0-A7 (16 words, word indices
    /// 0-15), CCR at word 16, X flag at word 17, followed by the scalar fields and the
    /// FPU register file.
    pub const fn standard() -> Self {
        let data_regs = 0;
        let addr_regs = data_regs + NUM_DATA_REGS * 4;
        let ccr = 16 * 4;
        let x_flag = 17 * 4;
        let pc_p = x_flag + 4;
        let countdown = pc_p + 4;
        let natmem_offsetx = countdown + 4;
        let fpu_regs = natmem_offsetx + 4;
        let size_bytes = fpu_regs + NUM_FPU_REGS * 8;
        RegBlockLayout {
            data_regs,
            addr_regs,
            ccr,
            x_flag,
            pc_p,
            countdown,
            natmem_offsetx,
            fpu_regs,
            size_bytes,
        }
    }

    pub fn data_reg_offset(&self, n: usize) -> usize {
        assert!(n < NUM_DATA_REGS, "data register index {n} out of range");
        self.data_regs + n * 4
    }

    pub fn addr_reg_offset(&self, n: usize) -> usize {
        assert!(n < NUM_ADDR_REGS, "address register index {n} out of range");
        self.addr_regs + n * 4
    }

    pub fn fpu_reg_offset(&self, n: usize) -> usize {
        assert!(n < NUM_FPU_REGS, "FPU register index {n} out of range");
        self.fpu_regs + n * 8
    }
}

/// Whether a guest-memory address falls inside the register block, and if so, at
/// what displacement. `(&regs) <= a < (&regs) + sizeof(regs)` per §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `a - base` fits as a single LDR/STR immediate displacement.
    InRegs { displacement: i32 },
    /// `a` must be materialized into a scratch register first.
    OutOfRegs { absolute: u32 },
}

/// Classifies `address` relative to the guest register block based at `regs_base`,
/// with the block's size taken from `layout`.
pub fn classify(address: u32, regs_base: u32, layout: &RegBlockLayout) -> Addressing {
    let end = regs_base.wrapping_add(layout.size_bytes as u32);
    if regs_base <= address && address < end {
        Addressing::InRegs {
            displacement: address.wrapping_sub(regs_base) as i32,
        }
    } else {
        Addressing::OutOfRegs { absolute: address }
    }
}
