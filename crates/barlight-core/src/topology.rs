//! Static lighting topology
//!
//! The topology is built once from validated configuration and handed to the
//! DMX engine by value. All references between tables are plain 0-based
//! indices: a [`Device`] names its universe by position in
//! [`Topology::universes`] and its color-mapping group by position in
//! [`Topology::groups`].

use serde::{Deserialize, Serialize};

/// Default Art-Net UDP port
pub const DEFAULT_ARTNET_PORT: u16 = 6454;

/// Highest Art-Net port-address (15 bit)
pub const MAX_UNIVERSE_ID: u16 = 32767;

/// Number of channels in one DMX512 universe
pub const DMX_CHANNELS: usize = 512;

/// An Art-Net universe and the network endpoint receiving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    /// Art-Net port-address (0-32767)
    pub id: u16,
    /// Host name or IP address of the node
    pub hostname: String,
    /// UDP port, `None` means [`DEFAULT_ARTNET_PORT`]
    pub port: Option<u16>,
}

impl Universe {
    /// Create a universe on the default Art-Net port
    pub fn new(id: u16, hostname: impl Into<String>) -> Self {
        Self {
            id,
            hostname: hostname.into(),
            port: None,
        }
    }

    /// Override the UDP port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Effective UDP port
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_ARTNET_PORT)
    }
}

/// One RGB fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Index into [`Topology::universes`]
    pub universe: usize,
    /// Red DMX channel (1-512)
    pub channel_r: u16,
    /// Green DMX channel (1-512)
    pub channel_g: u16,
    /// Blue DMX channel (1-512)
    pub channel_b: u16,
    /// Index into [`Topology::groups`]
    pub group: usize,
}

impl Device {
    /// Create a device with explicit channels
    pub fn new(universe: usize, group: usize, channels: [u16; 3]) -> Self {
        Self {
            universe,
            channel_r: channels[0],
            channel_g: channels[1],
            channel_b: channels[2],
            group,
        }
    }

    /// Create a device occupying three consecutive channels starting at `start_address`
    pub fn rgb(universe: usize, group: usize, start_address: u16) -> Self {
        Self::new(
            universe,
            group,
            [
                start_address,
                start_address.saturating_add(1),
                start_address.saturating_add(2),
            ],
        )
    }

    /// Channels in red, green, blue order
    pub fn channels(&self) -> [u16; 3] {
        [self.channel_r, self.channel_g, self.channel_b]
    }
}

/// A single band-to-hue assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Spectrum band index (0-based)
    pub band: usize,
    /// Hue in degrees (0-360)
    pub hue: u16,
}

impl MappingEntry {
    /// Create a new entry
    pub fn new(band: usize, hue: u16) -> Self {
        Self { band, hue }
    }
}

/// A color-mapping group: ordered band-to-hue assignments shared by devices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapping {
    /// Entries in configured order, duplicates allowed
    pub entries: Vec<MappingEntry>,
}

impl ColorMapping {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn with_entry(mut self, band: usize, hue: u16) -> Self {
        self.entries.push(MappingEntry::new(band, hue));
        self
    }
}

/// Complete static description of the rig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of spectrum bands per frame
    pub bars_count: usize,
    /// Minimum intensity substituted when every band is below it (0 disables)
    pub darkness_floor: u8,
    /// Universes in configured order
    pub universes: Vec<Universe>,
    /// Devices in configured order
    pub devices: Vec<Device>,
    /// Color-mapping groups in configured order
    pub groups: Vec<ColorMapping>,
}

impl Topology {
    /// Create an empty topology for `bars_count` bands
    pub fn new(bars_count: usize) -> Self {
        Self {
            bars_count,
            ..Self::default()
        }
    }

    /// Set the darkness floor
    pub fn with_darkness_floor(mut self, floor: u8) -> Self {
        self.darkness_floor = floor;
        self
    }

    /// Add a universe, returning its index
    pub fn add_universe(&mut self, universe: Universe) -> usize {
        self.universes.push(universe);
        self.universes.len() - 1
    }

    /// Add a color-mapping group, returning its index
    pub fn add_group(&mut self, group: ColorMapping) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Add a device, returning its index
    pub fn add_device(&mut self, device: Device) -> usize {
        self.devices.push(device);
        self.devices.len() - 1
    }
}
