//! The literal pool manager (§4.1 layer 3): `data_long_offs`/`data_word_offs`/`data_check_end`,
//! the branch-over-embedded-literal idiom, and invariant I5 (a literal is only ever reached by
//! falling through a forward branch that jumps over it, or by following an already-terminating
//! branch instruction).
//!
//! No direct teacher analogue — `examples/zeramorphic-armul` assembles symbolic instructions and
//! never needs a PC-relative literal pool — so this follows §4.1/§4.2/§9's description directly:
//! reserve a placeholder word at the `LDR` site, record the pending value, and patch the `LDR`'s
//! immediate field once the pool is flushed and the literal's final position is known. `encode::b`
//! supplies the branch-over-pool instruction; `encode::ldr_imm` re-encodes each patched `LDR`.

use crate::buffer::{CodeBuffer, Cursor};
use crate::cond::Cond;
use crate::encode;
use crate::error::EmitError;
use crate::reg::Reg;

/// A `LDR`/`LDRH` site whose displacement cannot be known until the pool is flushed.
#[derive(Debug, Clone, Copy)]
struct PendingEntry {
    ldr_site: Cursor,
    dest: Reg,
    cond: Cond,
    value: u32,
    half: bool,
}

/// The farthest an ARM `LDR`/`LDRH` with a positive immediate offset can reach from its own
/// `PC` (instruction address + 8). Flushing is forced before any pending entry would fall
/// outside this window.
const MAX_REACH_BYTES: i64 = 4092;

/// Accumulates pending PC-relative literal loads until they are flushed into the buffer.
#[derive(Debug, Default)]
pub struct LiteralPool {
    pending: Vec<PendingEntry>,
}

impl LiteralPool {
    pub fn new() -> Self {
        LiteralPool { pending: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Bytes the pending literals will occupy once flushed (one word each).
    pub fn pending_bytes(&self) -> usize {
        self.pending.len() * 4
    }

    /// Reserves a placeholder `LDR Rdest, [PC, #?]` and registers `value` to be written
    /// into it once the pool flushes. Returns the site for diagnostic purposes only;
    /// callers never patch it directly (`flush` does).
    pub fn data_long_offs(&mut self, buf: &mut CodeBuffer, cond: Cond, dest: Reg, value: u32) -> Cursor {
        let site = buf.skip();
        self.pending.push(PendingEntry {
            ldr_site: site,
            dest,
            cond,
            value,
            half: false,
        });
        site
    }

    /// Like [`LiteralPool::data_long_offs`] but for a 16-bit constant loaded via `LDRH`.
    pub fn data_word_offs(&mut self, buf: &mut CodeBuffer, cond: Cond, dest: Reg, value: u16) -> Cursor {
        let site = buf.skip();
        self.pending.push(PendingEntry {
            ldr_site: site,
            dest,
            cond,
            value: value as u32,
            half: true,
        });
        site
    }

    /// Flush hint (§6): if emitting `additional_code_bytes` more code followed by
    /// `additional_pool_bytes` more literals would push the oldest pending entry out of
    /// `LDR`'s ±4KiB reach, flush the pool now instead of waiting for it to overflow.
    pub fn data_check_end(&mut self, buf: &mut CodeBuffer, additional_code_bytes: usize, additional_pool_bytes: usize) {
        let Some(oldest) = self.pending.first() else {
            return;
        };
        let projected_end_words = buf.cursor().0
            + additional_code_bytes.div_ceil(4)
            + additional_pool_bytes.div_ceil(4)
            + self.pending.len();
        let distance_bytes = (projected_end_words as i64 - oldest.ldr_site.0 as i64) * 4;
        if distance_bytes > MAX_REACH_BYTES {
            self.flush(buf);
        }
    }

    /// Unconditionally emits a branch over the pending literals followed by the literals
    /// themselves, then patches every pending `LDR`/`LDRH` site with its final PC-relative
    /// displacement. Invariant I5 is satisfied by construction: the branch just emitted is
    /// the only fall-through path into the pool, and it jumps over every word in it.
    pub fn flush(&mut self, buf: &mut CodeBuffer) {
        if self.pending.is_empty() {
            return;
        }
        encode::b(buf, Cond::AL, false, self.pending.len() as i32);
        let literal_base = buf.cursor();
        for entry in &self.pending {
            buf.emit(entry.value);
        }
        for (i, entry) in self.pending.iter().enumerate() {
            let literal_word = Cursor(literal_base.0 + i);
            let pc_words = entry.ldr_site.0 as i64 + 2; // ARM PC = instruction address + 8 bytes
            let offset_bytes = (literal_word.0 as i64 - pc_words) * 4;
            if offset_bytes.unsigned_abs() > MAX_REACH_BYTES as u64 {
                crate::error::abort(EmitError::LiteralOutOfRange(offset_bytes as i32).to_string());
            }
            let mut scratch = CodeBuffer::new();
            if entry.half {
                encode::ldrh_imm(&mut scratch, entry.cond, entry.dest, Reg::PC, offset_bytes as u8);
            } else {
                encode::ldr_imm(&mut scratch, entry.cond, entry.dest, Reg::PC, offset_bytes as i32, false);
            }
            buf.patch(entry.ldr_site, scratch.words()[0]);
        }
        self.pending.clear();
    }
}
