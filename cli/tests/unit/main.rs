//! Unit tests for the isovpc CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod architecture;
mod engine;
mod property_tests;
mod stack_ops;
mod synth_service;
