//! Error handling, per §7: two tiers.
//!
//! Programmer errors (unreachable scale factor, flag-eviction mismatch, unsupported IR op)
//! are fatal and abort the process; no `Result` is involved. A narrow set of constructor-time
//! queries (does this value fit the rotated-8-bit form, is this displacement in branch range)
//! are genuinely fallible from a caller's point of view and return `EmitError`, grounded on
//! `examples/StephanvanSchaik-hy-rs`'s `thiserror`-derived error enum style and, in shape, on
//! the teacher's own `LineError` (`examples/zeramorphic-armul/armul/src/assemble/mod.rs`) —
//! a flat enum of specific, narrowly-named variants rather than a single opaque string.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    #[error("branch displacement {0} is out of ARM's 24-bit signed word range")]
    BranchOutOfRange(i32),
    #[error("branch displacement {0} is not 4-byte aligned")]
    MisalignedBranch(i32),
    #[error("immediate {0:#x} cannot be expressed as an ARM rotated-8-bit constant")]
    NotRotatable(u32),
    #[error("displacement {0} exceeds the ±4KiB PC-relative literal load range")]
    LiteralOutOfRange(i32),
    #[error("VFP displacement {0} is not 4-byte aligned or exceeds the ±1KiB VLDR/VSTR range")]
    VfpDisplacementOutOfRange(i32),
}

/// Logs `message` at `error` level and then panics with it.
///
/// Used at every programmer-error boundary named in §7, so that an embedding
/// application's log sink retains the diagnostic that explains *why* the process
/// is about to abort, even though the panic itself unwinds past the log call.
#[track_caller]
pub fn abort(message: impl AsRef<str>) -> ! {
    log::error!("{}", message.as_ref());
    panic!("{}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offending_value() {
        let e = EmitError::NotRotatable(0x1_2345);
        assert!(e.to_string().contains("12345"));
    }

    #[test]
    #[should_panic(expected = "scratch register collision")]
    fn abort_panics_with_message() {
        abort("scratch register collision");
    }
}
