//! TOML configuration
//!
//! The file format numbers universes, devices and color mappings from 1, the
//! way a user counts sections. [`Config::topology`] converts these references
//! into the 0-based [`Topology`] used by the DMX engine.
//!
//! ```toml
//! bars = 24
//! min_value = 0
//!
//! [[universe]]
//! id = 0
//! host = "192.168.1.50"
//!
//! [[device]]
//! universe = 1
//! color_mapping = 1
//! channel_red = 1
//! channel_green = 2
//! channel_blue = 3
//!
//! [[color_mapping]]
//! entries = [{ band = 0, hue = "red" }, { band = 12, hue = 200 }]
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hue::{parse_hue, MAX_HUE};
use crate::topology::{
    ColorMapping, Device, MappingEntry, Topology, Universe, DMX_CHANNELS, MAX_UNIVERSE_ID,
};
use crate::{CoreError, Result};

/// Root of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spectrum bands per frame
    pub bars: usize,
    /// Darkness floor (0-255, 0 disables)
    #[serde(default)]
    pub min_value: u32,
    /// `[[universe]]` sections
    #[serde(default, rename = "universe")]
    pub universes: Vec<UniverseSection>,
    /// `[[device]]` sections
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceSection>,
    /// `[[color_mapping]]` sections
    #[serde(default, rename = "color_mapping")]
    pub color_mappings: Vec<ColorMappingSection>,
}

/// A `[[universe]]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseSection {
    /// Art-Net port-address
    pub id: u32,
    /// Node host name or IP address
    pub host: String,
    /// UDP port override
    #[serde(default)]
    pub port: Option<u16>,
}

/// A `[[device]]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSection {
    /// 1-based universe section number
    pub universe: usize,
    /// 1-based color-mapping section number
    pub color_mapping: usize,
    /// Red DMX channel
    pub channel_red: u32,
    /// Green DMX channel
    pub channel_green: u32,
    /// Blue DMX channel
    pub channel_blue: u32,
}

/// A `[[color_mapping]]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorMappingSection {
    /// Band-to-hue entries in order
    #[serde(default)]
    pub entries: Vec<MappingEntrySection>,
}

/// One entry of a color mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntrySection {
    /// 0-based spectrum band
    pub band: usize,
    /// Hue as degrees or color name
    pub hue: HueSpec,
}

/// Hue as written in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HueSpec {
    /// Degrees, 0-360
    Degrees(i64),
    /// Color name or numeric string, optionally prefixed (`"kick:red"`)
    Name(String),
}

impl HueSpec {
    /// Resolve to degrees
    pub fn degrees(&self) -> Option<u16> {
        match self {
            HueSpec::Degrees(d) => u16::try_from(*d).ok().filter(|d| *d <= MAX_HUE),
            HueSpec::Name(name) => parse_hue(name),
        }
    }
}

impl fmt::Display for HueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HueSpec::Degrees(d) => write!(f, "{}", d),
            HueSpec::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// A validation problem, attributed to a configuration section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Section name, e.g. `device-2`
    pub section: String,
    /// Human-readable description
    pub message: String,
}

impl ConfigIssue {
    fn new(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.message)
    }
}

pub(crate) fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn channel_in_range(channel: u32) -> bool {
    (1..=DMX_CHANNELS as u32).contains(&channel)
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            "Loaded config {:?}: {} universes, {} devices, {} color mappings",
            path,
            config.universes.len(),
            config.devices.len(),
            config.color_mappings.len()
        );
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration, collecting every problem found
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidConfig(issues))
        }
    }

    /// All validation problems, empty when the configuration is usable
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.bars == 0 {
            issues.push(ConfigIssue::new("root", "'bars' must be a positive number"));
        }
        if self.min_value > u8::MAX as u32 {
            issues.push(ConfigIssue::new(
                "root",
                format!("'min_value' must be between 0 and 255, but is {}", self.min_value),
            ));
        }
        if self.universes.is_empty() {
            issues.push(ConfigIssue::new("root", "at least one [[universe]] is required"));
        }
        if self.devices.is_empty() {
            issues.push(ConfigIssue::new("root", "at least one [[device]] is required"));
        }
        if self.color_mappings.is_empty() {
            issues.push(ConfigIssue::new(
                "root",
                "at least one [[color_mapping]] is required",
            ));
        }

        let mut seen_ids = HashSet::new();
        for (i, universe) in self.universes.iter().enumerate() {
            let section = format!("universe-{}", i + 1);
            if universe.host.trim().is_empty() {
                issues.push(ConfigIssue::new(&section, "missing 'host'"));
            }
            if universe.id > MAX_UNIVERSE_ID as u32 {
                issues.push(ConfigIssue::new(
                    &section,
                    format!("'id' {} exceeds {}", universe.id, MAX_UNIVERSE_ID),
                ));
            } else if !seen_ids.insert(universe.id) {
                issues.push(ConfigIssue::new(
                    &section,
                    format!("duplicate universe 'id' {}", universe.id),
                ));
            }
        }

        for (i, device) in self.devices.iter().enumerate() {
            let section = format!("device-{}", i + 1);
            if device.universe == 0 || device.universe > self.universes.len() {
                issues.push(ConfigIssue::new(
                    &section,
                    format!(
                        "invalid 'universe' {}, must be 1-{}",
                        device.universe,
                        self.universes.len()
                    ),
                ));
            }
            if device.color_mapping == 0 || device.color_mapping > self.color_mappings.len() {
                issues.push(ConfigIssue::new(
                    &section,
                    format!(
                        "invalid 'color_mapping' {}, must be 1-{}",
                        device.color_mapping,
                        self.color_mappings.len()
                    ),
                ));
            }
            for (name, channel) in [
                ("channel_red", device.channel_red),
                ("channel_green", device.channel_green),
                ("channel_blue", device.channel_blue),
            ] {
                if !channel_in_range(channel) {
                    issues.push(ConfigIssue::new(
                        &section,
                        format!("'{}' {} outside 1-{}", name, channel, DMX_CHANNELS),
                    ));
                }
            }
        }

        for (i, mapping) in self.color_mappings.iter().enumerate() {
            let section = format!("color_mapping-{}", i + 1);
            if mapping.entries.is_empty() {
                issues.push(ConfigIssue::new(&section, "no entries"));
            }
            for entry in &mapping.entries {
                if entry.hue.degrees().is_none() {
                    issues.push(ConfigIssue::new(
                        &section,
                        format!(
                            "illegal hue {}, must be 0-360 or red, green, blue, cyan, magenta, yellow",
                            entry.hue
                        ),
                    ));
                }
                if self.bars > 0 && entry.band >= self.bars {
                    issues.push(ConfigIssue::new(
                        &section,
                        format!("band {} outside 0-{}", entry.band, self.bars - 1),
                    ));
                }
            }
        }

        issues
    }

    /// Build the engine topology (validates first)
    pub fn topology(&self) -> Result<Topology> {
        self.validate()?;

        let universes = self
            .universes
            .iter()
            .map(|u| Universe {
                id: u.id as u16,
                hostname: u.host.clone(),
                port: u.port,
            })
            .collect();

        let devices = self
            .devices
            .iter()
            .map(|d| {
                Device::new(
                    d.universe - 1,
                    d.color_mapping - 1,
                    [
                        d.channel_red as u16,
                        d.channel_green as u16,
                        d.channel_blue as u16,
                    ],
                )
            })
            .collect();

        let groups = self
            .color_mappings
            .iter()
            .map(|m| ColorMapping {
                entries: m
                    .entries
                    .iter()
                    .filter_map(|e| e.hue.degrees().map(|hue| MappingEntry::new(e.band, hue)))
                    .collect(),
            })
            .collect();

        Ok(Topology {
            bars_count: self.bars,
            darkness_floor: self.min_value as u8,
            universes,
            devices,
            groups,
        })
    }
}
