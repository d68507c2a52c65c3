//! Barlight Core - Lighting Topology and Configuration
//!
//! This crate contains the static description of a spectrum lighting rig:
//! - Art-Net universes and their network endpoints
//! - RGB devices and the DMX channels they occupy
//! - Color-mapping groups assigning spectrum bands to hues
//! - TOML configuration loading and validation
//! - Logging configuration shared by the application

#![warn(missing_docs)]

use thiserror::Error;

pub mod config;
pub mod hue;
pub mod logging;
pub mod topology;

// --- Re-exports grouped by category ---

// Configuration
pub use config::{
    ColorMappingSection, Config, ConfigIssue, DeviceSection, HueSpec, MappingEntrySection,
    UniverseSection,
};

// Logging
pub use logging::LogConfig;

// Topology
pub use topology::{
    ColorMapping, Device, MappingEntry, Topology, Universe, DEFAULT_ARTNET_PORT, DMX_CHANNELS,
    MAX_UNIVERSE_ID,
};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration file could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file is not valid TOML or has the wrong shape
    #[error("Config parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {}", config::format_issues(.0))]
    InvalidConfig(Vec<ConfigIssue>),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
