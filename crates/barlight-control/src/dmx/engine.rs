//! Spectrum-to-DMX engine
//!
//! The engine owns a private copy of the topology, one packet buffer and one
//! socket per universe, and the frame counters. [`Engine::update_colors`]
//! renders one frame of band intensities and sends every universe that
//! received light.

use barlight_core::{MappingEntry, Topology, Universe};

use super::artnet::UniverseBufferSet;
use super::directory::DeviceDirectory;
use super::mapping::ColorMapTable;
use super::stats::Stats;
use super::transport::Transport;
use crate::{error::ControlError, Result};

/// Upper bound on render passes per frame: the normal pass plus at most one
/// darkness-floor pass
const MAX_RENDER_PASSES: u8 = 2;

/// Construction options
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Open UDP sockets; when false every universe is treated as unusable
    pub connect: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { connect: true }
    }
}

/// Lifecycle state
///
/// There is no uninitialized state (an `Engine` only exists once built) and
/// no shut-down state ([`Engine::shutdown`] consumes it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Buffers allocated and sockets opened, no frame rendered yet
    Initialized,
    /// At least one frame rendered
    Running,
}

/// Outcome of one `update_colors` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Render passes performed (2 when the darkness floor kicked in)
    pub passes: u8,
    /// Whether the frame was replaced by the darkness floor
    pub floor_applied: bool,
    /// Input values above 255 clamped in this frame
    pub clamped: usize,
    /// Mapping entries skipped because their band is out of range
    pub skipped_entries: usize,
    /// Universe ids sent
    pub sent: Vec<u16>,
    /// Universe ids that had light but no usable socket
    pub skipped: Vec<u16>,
    /// Universe ids whose send failed, with the error
    pub failed: Vec<(u16, String)>,
}

/// Summary of one color-mapping group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Group index
    pub group: usize,
    /// Device indices in the group
    pub devices: Vec<usize>,
    /// Band-to-hue entries
    pub entries: Vec<MappingEntry>,
}

/// Art-Net rendering engine
pub struct Engine {
    bars_count: usize,
    darkness_floor: u8,
    universes: Vec<Universe>,
    mapping: ColorMapTable,
    directory: DeviceDirectory,
    buffers: UniverseBufferSet,
    transport: Transport,
    stats: Stats,
    state: EngineState,
    // Clamped intensities of the frame being rendered
    frame: Vec<u8>,
}

impl Engine {
    /// Build the engine and open sockets
    pub fn new(topology: Topology) -> Self {
        Self::with_options(topology, EngineOptions::default())
    }

    /// Build the engine with explicit options
    pub fn with_options(topology: Topology, options: EngineOptions) -> Self {
        let Topology {
            bars_count,
            darkness_floor,
            universes,
            devices,
            groups,
        } = topology;

        tracing::info!(
            "Initializing Art-Net engine: {} bands, {} universes, {} devices, {} color mappings",
            bars_count,
            universes.len(),
            devices.len(),
            groups.len()
        );

        let mapping = ColorMapTable::new(&groups);
        let directory = DeviceDirectory::build(&devices, groups.len(), universes.len());
        let buffers = UniverseBufferSet::new(universes.iter().map(|u| u.id));
        let transport = if options.connect {
            Transport::open(&universes)
        } else {
            tracing::info!("Art-Net engine is offline, no packets will be sent");
            Transport::offline(&universes)
        };

        if options.connect && !universes.is_empty() && transport.usable_count() == 0 {
            tracing::warn!("No Art-Net universe could be opened, output stays dark");
        }

        Self {
            bars_count,
            darkness_floor,
            universes,
            mapping,
            directory,
            buffers,
            transport,
            stats: Stats::default(),
            state: EngineState::Initialized,
            frame: Vec::with_capacity(bars_count),
        }
    }

    /// Render one frame and send every universe that received light
    ///
    /// `frame` must hold exactly `bars_count` loudness values, nominally
    /// 0-255. Values outside that range are clamped; values above 255 are
    /// counted in [`Stats::value_exceed_count`]. Send failures are reported in
    /// the returned [`FrameReport`], never as an error.
    pub fn update_colors(&mut self, frame: &[i32]) -> Result<FrameReport> {
        if frame.len() != self.bars_count {
            return Err(ControlError::InvalidFrame {
                expected: self.bars_count,
                actual: frame.len(),
            });
        }
        self.state = EngineState::Running;

        let mut report = FrameReport::default();

        self.frame.clear();
        for &value in frame {
            if value > u8::MAX as i32 {
                report.clamped += 1;
            }
            self.frame.push(value.clamp(0, u8::MAX as i32) as u8);
        }
        self.stats.value_exceed_count += report.clamped as u64;

        loop {
            report.skipped_entries +=
                render_pass(&mut self.mapping, &self.directory, &mut self.buffers, &self.frame);
            report.passes += 1;

            if report.passes >= MAX_RENDER_PASSES || !self.below_floor() {
                break;
            }
            tracing::trace!("All bands below {}, substituting floor", self.darkness_floor);
            self.frame.fill(self.darkness_floor);
            report.floor_applied = true;
            self.stats.floor_substitutions += 1;
        }

        self.send_dirty(&mut report);
        self.stats.frames_sent += 1;

        Ok(report)
    }

    /// Whether every band of the current frame is below the darkness floor
    fn below_floor(&self) -> bool {
        self.darkness_floor > 0
            && !self.frame.is_empty()
            && self.frame.iter().all(|v| *v < self.darkness_floor)
    }

    fn send_dirty(&mut self, report: &mut FrameReport) {
        for index in self.buffers.dirty_indices() {
            let Some(buffer) = self.buffers.get(index) else {
                continue;
            };
            let universe = buffer.universe();
            buffer.dump();

            match self.transport.send(index, buffer.as_bytes()) {
                Ok(true) => {
                    self.stats.packets_sent += 1;
                    report.sent.push(universe);
                }
                Ok(false) => report.skipped.push(universe),
                Err(e) => {
                    tracing::warn!("Failed to send Art-Net packet: {}", e);
                    self.stats.send_failures += 1;
                    report.failed.push((universe, e.to_string()));
                }
            }
        }
    }

    /// Frame counters
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn bars_count(&self) -> usize {
        self.bars_count
    }

    pub fn darkness_floor(&self) -> u8 {
        self.darkness_floor
    }

    /// Universes in configured order
    pub fn universes(&self) -> &[Universe] {
        &self.universes
    }

    /// Packet buffers as rendered by the last frame
    pub fn buffers(&self) -> &UniverseBufferSet {
        &self.buffers
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    /// Which devices and entries each color-mapping group drives
    pub fn describe_mapping(&self) -> Vec<GroupSummary> {
        (0..self.mapping.group_count())
            .map(|group| GroupSummary {
                group,
                devices: self.directory.devices_in_group(group).to_vec(),
                entries: self.mapping.entries(group).to_vec(),
            })
            .collect()
    }

    /// Close all sockets and release the buffers, returning the final counters
    pub fn shutdown(mut self) -> Stats {
        tracing::info!(
            "Shutting down Art-Net engine after {} frames ({} packets, {} send failures)",
            self.stats.frames_sent,
            self.stats.packets_sent,
            self.stats.send_failures
        );
        self.transport.close();
        self.stats
    }
}

/// Zero all payloads, then add every group's colors into its devices' channels
///
/// Returns the number of mapping entries skipped.
fn render_pass(
    mapping: &mut ColorMapTable,
    directory: &DeviceDirectory,
    buffers: &mut UniverseBufferSet,
    frame: &[u8],
) -> usize {
    buffers.reset_all();

    let mut skipped = 0;
    for group in 0..mapping.group_count() {
        let devices = directory.devices_in_group(group);
        skipped += mapping.for_each_color(group, frame, |rgb| {
            for &device in devices {
                let Some(slot) = directory.slot(device) else {
                    continue;
                };
                for (offset, value) in slot.offsets.iter().zip(rgb.channels()) {
                    if let Some(offset) = offset {
                        buffers.accumulate(slot.universe, *offset, value);
                    }
                }
                buffers.mark_dirty(slot.universe);
            }
        });
    }
    skipped
}
