//! Art-Net packet buffers (ArtDmx)
//!
//! Every universe owns one fixed-size packet: an 18-byte ArtDmx header written
//! once at construction, followed by 512 DMX channel bytes that are cleared
//! and refilled every frame.

use barlight_core::DMX_CHANNELS;

/// Art-Net packet identifier
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// OpDmx opcode (transmitted little-endian)
pub const OP_DMX: u16 = 0x5000;

/// Art-Net protocol revision (transmitted big-endian)
pub const PROTOCOL_VERSION: u16 = 14;

/// Length of the ArtDmx header
pub const HEADER_LEN: usize = 18;

/// Length of a complete ArtDmx packet with a full universe
pub const PACKET_LEN: usize = HEADER_LEN + DMX_CHANNELS;

/// Payload index for a 1-based DMX channel, `None` if outside 1-512
pub fn channel_index(channel: u16) -> Option<usize> {
    let index = (channel as usize).checked_sub(1)?;
    (index < DMX_CHANNELS).then_some(index)
}

/// Packet buffer for one universe
#[derive(Clone)]
pub struct UniverseBuffer {
    universe: u16,
    packet: [u8; PACKET_LEN],
}

impl UniverseBuffer {
    /// Create a buffer with the header filled in for `universe`
    pub fn new(universe: u16) -> Self {
        let mut packet = [0u8; PACKET_LEN];

        // Header: "Art-Net\0"
        packet[0..8].copy_from_slice(ARTNET_ID);

        // OpCode: OpDmx (0x5000)
        packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());

        // Protocol version (14)
        packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());

        // Sequence disabled, physical port 0
        packet[12] = 0;
        packet[13] = 0;

        // Universe (Port-Address)
        packet[14..16].copy_from_slice(&universe.to_le_bytes());

        // Length (512 channels, big-endian)
        packet[16..18].copy_from_slice(&(DMX_CHANNELS as u16).to_be_bytes());

        Self { universe, packet }
    }

    /// Art-Net universe id
    pub fn universe(&self) -> u16 {
        self.universe
    }

    /// The 18 header bytes
    pub fn header(&self) -> &[u8] {
        &self.packet[..HEADER_LEN]
    }

    /// The 512 DMX channel bytes
    pub fn payload(&self) -> &[u8] {
        &self.packet[HEADER_LEN..]
    }

    /// The complete packet as sent on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.packet
    }

    /// Value of a 1-based DMX channel
    pub fn channel(&self, channel: u16) -> Option<u8> {
        channel_index(channel).map(|i| self.packet[HEADER_LEN + i])
    }

    /// Zero the payload, leaving the header untouched
    pub fn reset(&mut self) {
        self.packet[HEADER_LEN..].fill(0);
    }

    /// Add `value` to a payload byte, saturating at 255
    pub fn accumulate(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.packet[HEADER_LEN..].get_mut(index) {
            *slot = slot.saturating_add(value);
        }
    }

    /// Log non-zero channels at trace level
    pub fn dump(&self) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        let lit: Vec<String> = self
            .payload()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, v)| format!("{}={}", i + 1, v))
            .collect();
        tracing::trace!("Universe {} channels: [{}]", self.universe, lit.join(" "));
    }
}

impl std::fmt::Debug for UniverseBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniverseBuffer")
            .field("universe", &self.universe)
            .field("lit_channels", &self.payload().iter().filter(|v| **v != 0).count())
            .finish()
    }
}

/// One buffer per configured universe, plus per-frame dirty flags
#[derive(Debug, Clone, Default)]
pub struct UniverseBufferSet {
    buffers: Vec<UniverseBuffer>,
    dirty: Vec<bool>,
}

impl UniverseBufferSet {
    /// Allocate buffers for the given universe ids, in order
    pub fn new(universe_ids: impl IntoIterator<Item = u16>) -> Self {
        let buffers: Vec<UniverseBuffer> =
            universe_ids.into_iter().map(UniverseBuffer::new).collect();
        let dirty = vec![false; buffers.len()];
        Self { buffers, dirty }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Buffer by universe index
    pub fn get(&self, index: usize) -> Option<&UniverseBuffer> {
        self.buffers.get(index)
    }

    /// Zero all payloads and clear dirty flags
    pub fn reset_all(&mut self) {
        for buffer in &mut self.buffers {
            buffer.reset();
        }
        self.dirty.fill(false);
    }

    /// Mark a universe as needing to be sent this frame
    pub fn mark_dirty(&mut self, index: usize) {
        if let Some(flag) = self.dirty.get_mut(index) {
            *flag = true;
        }
    }

    /// Saturating add into a payload byte of one universe
    pub fn accumulate(&mut self, index: usize, offset: usize, value: u8) {
        if let Some(buffer) = self.buffers.get_mut(index) {
            buffer.accumulate(offset, value);
        }
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.get(index).copied().unwrap_or(false)
    }

    /// Indices of universes marked dirty this frame
    pub fn dirty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty
            .iter()
            .enumerate()
            .filter_map(|(i, dirty)| dirty.then_some(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniverseBuffer> {
        self.buffers.iter()
    }
}
