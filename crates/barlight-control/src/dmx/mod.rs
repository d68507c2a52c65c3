//! DMX output system
//!
//! This module turns per-band loudness values into Art-Net packets.
//!
//! ## Pipeline
//!
//! For every frame the [`Engine`] zeroes all universe payloads, walks each
//! color-mapping group, converts every `(band, hue)` entry into an RGB color
//! scaled by the band's loudness, and adds that color into the channels of
//! every device in the group. Channel values saturate at 255. Universes that
//! received light are then sent, one UDP datagram each.
//!
//! ## Art-Net
//!
//! Art-Net is a UDP protocol for DMX transmission over Ethernet.
//! - Default port 6454
//! - Supports 32768 universes
//! - One ArtDmx packet (18-byte header + 512 channels) per universe
//!
//! ## Example Usage
//!
//! ```rust
//! use barlight_control::dmx::{Engine, EngineOptions};
//! use barlight_core::{ColorMapping, Device, Topology, Universe};
//!
//! # fn main() -> barlight_control::Result<()> {
//! let mut topology = Topology::new(8);
//! let universe = topology.add_universe(Universe::new(0, "127.0.0.1"));
//! let bass = topology.add_group(ColorMapping::new().with_entry(0, 0).with_entry(1, 30));
//! topology.add_device(Device::rgb(universe, bass, 1));
//!
//! let mut engine = Engine::with_options(topology, EngineOptions { connect: false });
//! engine.update_colors(&[200, 40, 0, 0, 0, 0, 0, 0])?;
//!
//! let buffer = engine.buffers().get(0).unwrap();
//! assert_eq!(buffer.channel(1), Some(240));
//! # Ok(())
//! # }
//! ```

pub mod artnet;
pub mod color;
pub mod directory;
pub mod engine;
pub mod mapping;
pub mod stats;
pub mod transport;

pub use artnet::{UniverseBuffer, UniverseBufferSet};
pub use color::{hsv_to_rgb, Rgb8};
pub use directory::{DeviceDirectory, DeviceSlot};
pub use engine::{Engine, EngineOptions, EngineState, FrameReport, GroupSummary};
pub use mapping::ColorMapTable;
pub use stats::Stats;
pub use transport::Transport;
