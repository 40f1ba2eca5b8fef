//! Integration tests for the isovpc CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every test points `ISOVPC_CONFIG` at a temp file and clears the AWS
//! region variables so the host environment never leaks in.

mod check_command;
mod cli_tests;
mod config_command;
mod synth_command;
