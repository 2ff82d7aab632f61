//! Debugging aids for the compiler passes.

pub mod config;

pub use config::{Tracing, TracingConfig};
