//! Error taxonomy for localization solves

pub mod error;

pub use error::{LocalizationError, LocalizationResult};
