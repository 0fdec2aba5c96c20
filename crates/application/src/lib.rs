//! Application layer for NoSilence.
//!
//! Wires the mixer sampler, the arming state machine and the player client
//! into a polling monitor, and exposes the control commands front ends use
//! to change settings at runtime.

pub mod commands;
mod poller;
mod resume;

#[cfg(test)]
mod fakes;

pub use commands::{
    dispatch, lookup, Command, CommandError, CommandId, CommandOutcome, COMMANDS,
};
pub use poller::{MonitorLoop, MonitorPoller};
pub use resume::{ResumeError, ResumeOrchestrator, ResumeOutcome, ResumeSource};
