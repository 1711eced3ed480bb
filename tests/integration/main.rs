//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the wake cycle against
//! mock adapters.  All tests run on the host with no real hardware.

#![cfg(not(target_os = "espidf"))]

mod mock_hw;
mod sync_session_tests;
mod wake_cycle_tests;
