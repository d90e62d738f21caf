//! Deterministic resource-name derivation
//!
//! Every generated resource name is a pure function of a base name and a
//! fixed role suffix. There are no counters, timestamps or random parts, so
//! two compilations of the same declaration always derive the same names.
//! Collisions between applications sharing a base name are a caller error
//! and are not detected here.

/// Derive a resource name from a base name and a role suffix
pub fn derived(base: &str, suffix: &str) -> String {
    format!("{base}-{suffix}")
}
