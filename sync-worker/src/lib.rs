#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod ack;
pub mod assets;
pub mod attributes;
pub mod health;
pub mod marketplace;
pub mod state_recorder;
pub mod sync_processor;
pub mod telemetry;
pub mod transport;
pub mod types;
pub mod workflow;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
