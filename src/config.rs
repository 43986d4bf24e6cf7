//! Emitter configuration: the runtime counterpart of the `armv6t2` Cargo feature, plus the
//! addressing and host-math-function information the emitter needs but cannot derive itself.
//!
//! This replaces the distilled spec's bare "CLI/configuration... out of scope" framing (§1) with
//! the ambient-stack requirement (SPEC_FULL.md §2a): a plain struct consumed programmatically,
//! not an argv/env parser — the emitter never reads process configuration on its own.

use crate::guest::RegBlockLayout;

/// Host function pointer used by the `ffunc`/`fpowx` trampolines of §4.8. The emitter does not
/// implement transcendentals itself; it only knows how to materialize this pointer into a
/// scratch register and `BLX` it under the EABI calling convention (D0(/D1) in, D0 out).
pub type MathFn1 = extern "C" fn(f64) -> f64;
pub type MathFn2 = extern "C" fn(f64, f64) -> f64;

/// Which transcendental/host-math operation `raw_ffunc_rr` should call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FFunc {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Etan,
    Etanh,
    Exp,
    Log2,
    Log10,
    LogN,
    GetExp,
    GetMan,
    TwoToX,
    TenToX,
    /// Computes both sine and cosine; the emitter places results in two destination
    /// D-registers rather than one.
    SinCos,
}

/// Resolves the host function pointer(s) backing each `FFunc` variant. An embedding
/// application supplies this so the emitter stays decoupled from any particular libm.
pub trait MathLibrary {
    fn resolve(&self, func: FFunc) -> MathFnResolution;
    /// `FSCALE`'s binary power function: `base * 2^exponent`, called by `raw_fpowx_rr`.
    fn powx(&self) -> MathFn2;
}

#[derive(Debug, Clone, Copy)]
pub enum MathFnResolution {
    Unary(MathFn1),
    /// `SinCos` resolves to a pair: (sin, cos).
    Pair(MathFn1, MathFn1),
}

/// Runtime configuration for an `Emitter`. Carries the ARMv6T2 capability switch as a value
/// (in addition to the `armv6t2` Cargo feature gating which code paths are compiled in at
/// all) so a build that compiles in both capability levels can still pick one at setup time,
/// per §6's "Configuration switch" and the workspace-shape Design Note in SPEC_FULL.md §9.
#[derive(Debug, Clone, Copy)]
pub struct EmitterConfig {
    /// Selects MOVW/MOVT/BFI/BFC synthesis when true, literal-pool/double-BIC when false.
    pub armv6t2: bool,
    /// The guest register block's layout (§3's Data Model).
    pub layout: RegBlockLayout,
}

impl EmitterConfig {
    pub fn new(armv6t2: bool) -> Self {
        EmitterConfig {
            armv6t2,
            layout: RegBlockLayout::standard(),
        }
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        // Mirrors the Cargo feature default: classic ARM (no ARMv6T2) unless the caller
        // (or the `armv6t2` feature, via `cfg!`) opts in.
        EmitterConfig::new(cfg!(feature = "armv6t2"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tracks_compiled_feature() {
        let cfg = EmitterConfig::default();
        assert_eq!(cfg.armv6t2, cfg!(feature = "armv6t2"));
    }

    #[test]
    fn explicit_config_overrides_feature_default() {
        let cfg = EmitterConfig::new(true);
        assert!(cfg.armv6t2);
        let cfg = EmitterConfig::new(false);
        assert!(!cfg.armv6t2);
    }
}
