//! CLI Commands

pub mod config;
pub mod graph;
pub mod outputs;
pub mod synth;
