//! Integration tests — exercised against the in-memory mock bus.

mod aggregator_tests;
mod heater_loop_tests;
