//! Generic utilities shared by the `inject-*` crates but not specific to
//! the injection processor itself.
//!
//! The main purpose of this crate is to keep the logging backend choice out
//! of `inject-hal` and `inject-engine`.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod log;

#[cfg(any(feature = "defmt", feature = "log"))]
pub use log::*;
