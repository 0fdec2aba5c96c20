//! Interruption monitor for NoSilence.
//!
//! Turns noisy per-poll loudness samples into a single debounced decision:
//! resume the player once an interrupting sound has been heard long enough
//! to count (arming) and has then stayed quiet for the silence timeout.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  state.rs  - Sample, MonitorConfig, MonitorState::tick      │
//! │  status.rs - MonitorStatus text and IconState tag           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate does no I/O and never reads the clock: callers pass `now` into
//! every tick, which keeps the machine deterministic under test.

mod state;
mod status;

pub use state::{Decision, MonitorConfig, MonitorState, Sample};
pub use status::{IconState, MonitorStatus};
