//! The narrow callback interface the emitter uses to stay decoupled from the front-end's
//! concrete register-allocator state (§4.7, §9's Design Notes).
//!
//! §6 describes a longer list of "front-end callbacks", but most of them (`get_target`,
//! `emit_long`, `skip_long`, `data_long_offs`/`data_word_offs`, `data_check_end`) are, per
//! §2's layer ordering, actually this crate's own encoding-primitives/literal-pool layers
//! (implemented in `buffer.rs`/`pool.rs`) — the original back-end simply called them as
//! free functions defined in a sibling compilation unit. The Design Notes resolve this
//! explicitly: "abstract the front-end behind a small callback interface (two hooks —
//! `clobber_flags` and `mirror_flag_eviction`)". Only those two are modeled as a trait here;
//! everything else is owned by the emitter itself. See DESIGN.md for the full resolution.

use crate::reg::Reg;

/// Callbacks into the (out-of-scope) front-end's register-state mirror.
///
/// The emitter is generic over this trait (or holds a `&mut dyn FrontEnd`) so it never
/// reaches into concrete front-end state, per the Design Notes.
pub trait FrontEnd {
    /// Invoked before emitting any instruction that clobbers host CPSR flags, so the
    /// front-end can evict a live flag mirror it may be tracking (§4.4, final paragraph).
    fn clobber_flags(&mut self);

    /// Invoked immediately after the emitter spills host flags into the guest register
    /// block's CCR slot (§4.6's `raw_flags_to_reg`), so the front-end's mirror stays in
    /// sync (§4.7): the flag-temporary's status becomes `INMEM`, and `held_in` is the
    /// host register that is asserted to have been holding the flags until now (a
    /// mismatch here is a programmer error per §7 and is the caller's responsibility to
    /// detect and abort on, since only the front-end knows its own mirror state).
    fn mirror_flag_eviction(&mut self, held_in: Reg);
}

/// A `FrontEnd` that performs no bookkeeping. Useful for tests and for embedders that
/// don't maintain a register-state mirror (e.g. when every guest value is always in
/// memory and flags are never cached in a host register across IR ops).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFrontEnd;

impl FrontEnd for NullFrontEnd {
    fn clobber_flags(&mut self) {
        log::trace!("clobber_flags (null front-end)");
    }

    fn mirror_flag_eviction(&mut self, held_in: Reg) {
        log::trace!("flag mirror evicted from {held_in}");
    }
}
