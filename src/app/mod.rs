//! Application core: pure domain logic, zero I/O.
//!
//! The wake cycle, gesture dispatch and sync session all talk to the board
//! through the **port traits** in [`ports`], so this layer runs unchanged
//! on the host against mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
