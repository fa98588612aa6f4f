//! Core types and trait definitions for the Stride gait analysis engine.
//!
//! This crate is deliberately free of I/O. Footsteps, wearable assignments
//! and fall risk profiles are handed in by a [`source::GaitSource`]
//! implementation; everything here is a pure function of its inputs.

pub mod assessment;
pub mod assignment;
pub mod error;
pub mod footstep;
pub mod indicator;
pub mod interval;
pub mod profile;
pub mod scoring;
pub mod source;
pub mod time;

pub use error::{Error, Result};
pub use time::TimeWindow;
