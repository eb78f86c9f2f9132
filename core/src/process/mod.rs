//! Process execution for shell probes
//!
//! Commands run in their own process group so a probe that hangs can be
//! killed together with anything it spawned.

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::*;
