//! LD1125H library — portable driver for the HLK-LD1125H mmWave radar.
//!
//! The radar reports what it sees as short ASCII lines (`mov, dis=1.23`,
//! `occ, dis=4.39`) and takes its configuration as `key=value` commands that
//! it acknowledges with a `received message: ...` line. This crate decodes
//! the report stream one byte at a time, paces the configuration commands
//! against those acknowledgments, and clears presence after a quiet period.
//! It has no platform dependencies and is testable on any host with
//! `cargo test`. Firmware binaries are thin consumers that provide the UART,
//! the clock and an output sink.
//!
//! Modules:
//! - `decoder`, `sequencer`, `timeout`, `driver` — the radar driver proper,
//!   `no_std`, no allocator.
//! - `config`, `defaults` — parameters, compiled-in defaults, JSON loading.
//! - `protocol`, `comm`, `board` — NDJSON host protocol and board wiring
//!   used by the relay firmware.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod comm;
pub mod config;
pub mod decoder;
pub mod defaults;
pub mod driver;
pub mod protocol;
pub mod sequencer;
pub mod timeout;

pub use config::{ConfigError, DriverConfig, RadarConfig};
pub use driver::{Error, EventSink, Ld1125h, Presence};
