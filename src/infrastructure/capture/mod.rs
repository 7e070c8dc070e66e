//! Capture infrastructure module
//!
//! Microphone input via cpal.

mod cpal_input;

pub use cpal_input::{CpalInput, CpalStream, PREFERRED_SAMPLE_RATE};
