//! Core types and constants for RSSI localization

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
