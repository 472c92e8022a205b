//! Integration tests for plugmetrics-telemetry
//!
//! Starts several reporter instances against a shared temp directory and a
//! wiremock collector, and verifies election, registration and the bytes
//! that reach the collector.

mod common;

mod test_config;
mod test_election;
mod test_submission;
