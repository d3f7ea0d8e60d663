//! Application core — the resilience supervisor, zero I/O.
//!
//! This module contains the logic with real invariants: the boot-loop guard,
//! the connectivity-recovery state machine, the deadline escalation, and the
//! per-tick orchestration that couples them to the sample-and-publish cycle.
//! All interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod boot;
pub mod connectivity;
pub mod escalation;
pub mod events;
pub mod measurement;
pub mod ports;
pub mod service;
