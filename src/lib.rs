//! Bench Teleport - bench discovery, categorization, and teleport travel
//!
//! The game-facing side is a set of host traits (`host`); everything else is
//! driven by explicit ticks with the current `Instant` passed in.

pub mod app;
pub mod bench;
pub mod category;
pub mod config;
pub mod error;
pub mod file_store;
pub mod geometry;
pub mod host;
pub mod input;
pub mod logging;
pub mod respawn;
pub mod scheduler;
pub mod sim;
pub mod teleport;
