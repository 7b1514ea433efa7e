//! Presentation of aggregation results.
//!
//! Turns a finished run, a latency comparison, or a fatal failure into text
//! or JSON for the terminal.

pub mod generator;

pub use generator::*;
