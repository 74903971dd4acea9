//! Binary-side wiring: credentials, progress UI and the two-phase run.

pub(crate) mod progress;
pub(crate) mod runtime;
