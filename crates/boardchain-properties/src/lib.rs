//! # boardchain-properties: ALWAYS/SOMETIMES/NEVER property annotations
//!
//! A thin sugar layer over `assert!`/`debug_assert!` for the kind of
//! claim a deterministic-simulation run wants to track across many
//! iterations rather than fail fast on: "this condition always held",
//! "this branch was exercised at least once", "this condition never
//! held". Outside the `sim` feature these compile down to plain
//! assertions with no bookkeeping; `boardchain-test-harness`'s scenario
//! runs enable `sim` to get the hit-count registry.

#[cfg(feature = "sim")]
mod registry;

#[cfg(feature = "sim")]
pub use registry::{report, reset, Report};

/// Asserts `cond` and, under the `sim` feature, records that `name` was
/// checked and whether it held.
#[macro_export]
macro_rules! always {
    ($name:expr, $cond:expr) => {{
        let held = $cond;
        #[cfg(feature = "sim")]
        $crate::registry::record($name, held);
        assert!(held, "ALWAYS[{}] violated", $name);
    }};
}

/// Records, under the `sim` feature, that the branch or condition named by
/// `name` was reached at least once during this run. A no-op outside
/// `sim` — `sometimes!` never fails on its own, it only documents intent
/// and (with `sim`) lets a scenario runner assert coverage afterward.
#[macro_export]
macro_rules! sometimes {
    ($name:expr, $cond:expr) => {{
        #[cfg(feature = "sim")]
        if $cond {
            $crate::registry::record($name, true);
        }
        #[cfg(not(feature = "sim"))]
        let _ = $cond;
    }};
}

/// Asserts `!cond` and, under the `sim` feature, records the check.
#[macro_export]
macro_rules! never {
    ($name:expr, $cond:expr) => {{
        let violated = $cond;
        #[cfg(feature = "sim")]
        $crate::registry::record($name, !violated);
        assert!(!violated, "NEVER[{}] violated", $name);
    }};
}
