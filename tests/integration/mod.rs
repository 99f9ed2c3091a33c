//! Integration test modules.

mod telemetry_relay_test;
