//! The keystroke-injection task queue and state machine.
//!
//! This crate is deliberately silent about *how* tasks get onto the air:
//! it consumes the narrow [`inject_hal`] ports (`RadioControl`, `Timer`,
//! `HidMap`, `DeviceInventory`) and is itself driven by whatever owns the
//! real radio/timer interrupts. See [`lifecycle::InjectionProcessor`] for
//! the top-level handle most callers want.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod buffer;
pub mod constants;
pub mod engine;
pub mod lifecycle;
pub mod provider;
pub mod task;

pub use buffer::{PushError, TaskBuffer, RING_BUFFER_SIZE};
pub use engine::{EngineState, InjectionEngine};
pub use lifecycle::{AlreadyInitialized, InjectionProcessor};
pub use task::{TaskHeader, TaskKind, MAX_TASK_PAYLOAD};
