//! Barlight Control - Art-Net Output for Spectrum Lighting
//!
//! This crate drives RGB fixtures from a live audio spectrum:
//! - **Color**: HSV to RGB conversion for band hues
//! - **Mapping**: per-group band-to-hue tables
//! - **Devices**: fixtures bucketed by group, channels resolved to offsets
//! - **Art-Net**: one ArtDmx packet buffer per universe
//! - **Transport**: one peer-bound UDP socket per universe
//! - **Engine**: renders and sends a frame, keeps counters
//!
//! ## Modules
//!
//! - [`dmx`] - DMX output via Art-Net
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Error types
pub mod error;

/// DMX output (Art-Net)
pub mod dmx;

// Re-exports
pub use error::{ControlError, Result};

pub use dmx::{Engine, EngineOptions, EngineState, FrameReport, Stats};
