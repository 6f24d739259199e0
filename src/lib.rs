//! Visual-state-driven automation bot.
//!
//! Captures the screen, recognizes which stage of the target application
//! is showing by matching reference images, and drives mouse actions until
//! the next stage's signature appears. The poll-and-dispatch engine in
//! [`engine`] and the stage state machine in [`stages`] are the core;
//! everything else wires them to the live screen and pointer.

pub mod config;
pub mod engine;
pub mod orchestrator;
pub mod pointer;
pub mod stages;
